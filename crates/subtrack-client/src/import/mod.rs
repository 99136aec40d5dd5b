mod amount;
#[cfg(feature = "xlsx")]
pub mod handelsbanken;
pub mod registry;
pub mod simple_csv;
pub mod simple_json;

use std::fs;
use std::path::Path;

pub use registry::{FileArg, ParserRegistry, TransactionParser};

use crate::{ClientError, ClientResult};

pub(crate) fn read_source(path: &Path) -> ClientResult<String> {
    fs::read_to_string(path)
        .map_err(|error| ClientError::source_read_failed(path, &error.to_string()))
}
