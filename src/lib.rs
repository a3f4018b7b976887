pub mod analysis;
pub mod config;
pub mod error;
pub mod server;
pub mod speech;
pub mod vision;

pub use error::{Error, Result};
