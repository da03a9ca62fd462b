pub mod codec;
pub mod config;
pub mod engines;
pub mod error;
pub mod export;
pub mod services;

pub use error::{MusigenError, Result};
