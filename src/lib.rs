pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod handler;
pub mod model;
pub mod rpc;
pub mod utils;
pub mod watcher;

pub use error::*;

pub use error::Result;
