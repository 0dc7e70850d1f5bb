// gxtract - GroundX metadata cache and tool server
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod groundx;
pub mod metrics;
pub mod server;
pub mod tools;
pub mod utils;
