pub mod errors;

pub mod logging;
