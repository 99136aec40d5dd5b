use crate::ClientResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{SourceRow, SourcesData};
use crate::import::ParserRegistry;

pub const COMMAND: &str = "sources";

pub fn run() -> ClientResult<SuccessEnvelope> {
    run_with_registry(&ParserRegistry::with_builtin())
}

#[doc(hidden)]
pub fn run_with_registry(registry: &ParserRegistry) -> ClientResult<SuccessEnvelope> {
    let mut sources = registry
        .parsers()
        .map(|parser| SourceRow {
            name: parser.name().to_string(),
            description: parser.description().to_string(),
            extensions: parser
                .extensions()
                .iter()
                .map(|extension| (*extension).to_string())
                .collect(),
        })
        .collect::<Vec<SourceRow>>();
    sources.sort_by(|left, right| left.name.cmp(&right.name));
    success(COMMAND, SourcesData { sources })
}
