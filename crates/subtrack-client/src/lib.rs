pub mod commands;
pub mod config;
pub mod contracts;
pub mod currency;
pub mod detection;
pub mod error;
pub mod import;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
