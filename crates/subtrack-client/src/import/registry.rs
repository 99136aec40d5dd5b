use std::path::{Path, PathBuf};

use tracing::debug;

use crate::detection::types::Transaction;
use crate::{ClientError, ClientResult};

/// A bank export format that can be turned into transactions.
pub trait TransactionParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Lowercase file extensions this format is inferred from.
    fn extensions(&self) -> &'static [&'static str];

    fn parse(&self, path: &Path) -> ClientResult<Vec<Transaction>>;
}

/// A file argument, optionally carrying a `format:` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArg {
    pub source: Option<&'static str>,
    pub path: PathBuf,
}

/// Parsers available to a run, looked up by name.
///
/// Built explicitly at startup and passed by reference; there is no global
/// registration.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: Vec<Box<dyn TransactionParser>>,
}

impl ParserRegistry {
    pub fn with_builtin() -> Self {
        let mut registry = Self::default();
        registry.register(Box::new(crate::import::simple_json::SimpleJsonParser));
        registry.register(Box::new(crate::import::simple_csv::SimpleCsvParser));
        #[cfg(feature = "xlsx")]
        registry.register(Box::new(
            crate::import::handelsbanken::HandelsbankenXlsxParser,
        ));
        registry
    }

    /// Adds a parser, replacing any existing parser with the same name.
    pub fn register(&mut self, parser: Box<dyn TransactionParser>) {
        self.parsers.retain(|existing| existing.name() != parser.name());
        self.parsers.push(parser);
    }

    pub fn get(&self, name: &str) -> Option<&dyn TransactionParser> {
        self.parsers
            .iter()
            .find(|parser| parser.name() == name)
            .map(|parser| parser.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names = self
            .parsers
            .iter()
            .map(|parser| parser.name())
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn parsers(&self) -> impl Iterator<Item = &dyn TransactionParser> {
        self.parsers.iter().map(|parser| parser.as_ref())
    }

    /// Splits `format:path`. Prefixes that are not registered formats stay
    /// part of the path, so `C:\data.xlsx` is a plain path.
    pub fn split_file_arg(&self, arg: &str) -> FileArg {
        if let Some((prefix, rest)) = arg.split_once(':')
            && let Some(parser) = self.get(prefix)
        {
            return FileArg {
                source: Some(parser.name()),
                path: PathBuf::from(rest),
            };
        }
        FileArg {
            source: None,
            path: PathBuf::from(arg),
        }
    }

    /// File prefix first, then the run-wide `--source`, then the extension.
    pub fn resolve(
        &self,
        file: &FileArg,
        default_source: Option<&str>,
    ) -> ClientResult<&dyn TransactionParser> {
        if let Some(name) = file.source.or(default_source) {
            return self
                .get(name)
                .ok_or_else(|| ClientError::unknown_source(name, &self.names()));
        }

        let extension = file
            .path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        extension
            .and_then(|extension| {
                self.parsers()
                    .find(|parser| parser.extensions().contains(&extension.as_str()))
            })
            .ok_or_else(|| ClientError::undetected_source(&file.path))
    }

    /// Parses every file argument into one combined transaction list.
    pub fn load_files(
        &self,
        files: &[String],
        default_source: Option<&str>,
    ) -> ClientResult<Vec<Transaction>> {
        if let Some(name) = default_source
            && self.get(name).is_none()
        {
            return Err(ClientError::unknown_source(name, &self.names()));
        }

        let mut transactions = Vec::new();
        for arg in files {
            let file = self.split_file_arg(arg);
            let parser = self.resolve(&file, default_source)?;
            let parsed = parser.parse(&file.path)?;
            debug!(
                path = %file.path.display(),
                source = parser.name(),
                transactions = parsed.len(),
                "parsed transaction file"
            );
            transactions.extend(parsed);
        }
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::ClientResult;
    use crate::detection::types::{Transaction, tx};

    use super::{FileArg, ParserRegistry, TransactionParser};

    struct FixedParser;

    impl TransactionParser for FixedParser {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn description(&self) -> &'static str {
            "Test parser"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["fixed"]
        }

        fn parse(&self, _path: &Path) -> ClientResult<Vec<Transaction>> {
            Ok(vec![tx("2024-01-01", "Fixed", -1.0)])
        }
    }

    #[test]
    fn prefixes_only_split_for_registered_formats() {
        let registry = ParserRegistry::with_builtin();
        assert_eq!(
            registry.split_file_arg("simple-json:data.json"),
            FileArg {
                source: Some("simple-json"),
                path: PathBuf::from("data.json"),
            }
        );
        assert_eq!(
            registry.split_file_arg("C:\\exports\\data.xlsx"),
            FileArg {
                source: None,
                path: PathBuf::from("C:\\exports\\data.xlsx"),
            }
        );
    }

    #[test]
    fn resolution_prefers_prefix_then_flag_then_extension() {
        let mut registry = ParserRegistry::with_builtin();
        registry.register(Box::new(FixedParser));

        let prefixed = registry.split_file_arg("fixed:data.json");
        let parser = registry.resolve(&prefixed, Some("simple-csv"));
        assert!(matches!(parser.map(|value| value.name()), Ok("fixed")));

        let plain = registry.split_file_arg("data.json");
        let parser = registry.resolve(&plain, Some("simple-csv"));
        assert!(matches!(parser.map(|value| value.name()), Ok("simple-csv")));

        let parser = registry.resolve(&plain, None);
        assert!(matches!(parser.map(|value| value.name()), Ok("simple-json")));

        let unknown = registry.split_file_arg("data.txt");
        let parser = registry.resolve(&unknown, None);
        assert!(parser.is_err());
    }

    #[test]
    fn unknown_default_source_is_rejected_before_parsing() {
        let registry = ParserRegistry::with_builtin();
        let result = registry.load_files(&["missing.json".to_string()], Some("ofx"));
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "unknown_source");
        }
    }

    #[test]
    fn registering_same_name_replaces_parser() {
        let mut registry = ParserRegistry::default();
        registry.register(Box::new(FixedParser));
        registry.register(Box::new(FixedParser));
        assert_eq!(registry.names(), vec!["fixed"]);
        let loaded = registry.load_files(&["anything.fixed".to_string()], None);
        assert!(matches!(loaded.map(|rows| rows.len()), Ok(1)));
    }
}
