// Device and network adapters

pub mod acquisition;
pub mod api;
