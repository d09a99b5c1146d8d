// Pipeline logic independent of any UI framework

pub mod encoder;
pub mod normalizer;
pub mod presentation;

pub use encoder::encode;
pub use normalizer::normalize;
pub use presentation::{AnalysisTicket, Applied, Phase, PresentationState};
