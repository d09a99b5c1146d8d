// Waste photo classification pipeline: acquire, encode, detect, normalize

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;
