use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::date::parse_iso_date_field;
use crate::detection::known::{KnownSubscriptionRule, default_rules};
use crate::detection::types::{Subscription, Transaction};
use crate::{ClientError, ClientResult};

pub const CONFIG_ENV_VAR: &str = "SUBTRACK_CONFIG";

/// On-disk YAML shape of `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_default_known: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub known: Vec<KnownEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<ExcludeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub name: String,
    pub patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownEntry {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// An exclusion is either a bare pattern or a pattern with date bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludeEntry {
    Pattern(String),
    Bounded {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        before: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<String>,
    },
}

impl ConfigFile {
    pub fn to_yaml(&self) -> ClientResult<String> {
        serde_yaml::to_string(self)
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))
    }

    /// Writes the file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ClientResult<()> {
        let body = self.to_yaml()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|error| ClientError::config_write_failed(path, &error.to_string()))?;
        }
        fs::write(path, body)
            .map_err(|error| ClientError::config_write_failed(path, &error.to_string()))
    }
}

#[derive(Debug, Clone)]
struct CompiledGroup {
    name: String,
    regexes: Vec<Regex>,
    tolerance: Option<f64>,
}

#[derive(Debug, Clone)]
struct ExcludeRule {
    regex: Regex,
    before: Option<NaiveDate>,
    after: Option<NaiveDate>,
}

impl ExcludeRule {
    /// `before` keeps subscriptions still running on that date; `after` keeps
    /// subscriptions that started earlier.
    fn excludes(&self, subscription: &Subscription) -> bool {
        if !self.regex.is_match(&subscription.name) {
            return false;
        }
        if let Some(before) = self.before
            && subscription.last_date >= before
        {
            return false;
        }
        if let Some(after) = self.after
            && subscription.start_date < after
        {
            return false;
        }
        true
    }
}

/// Transactions after group renaming, with any per-group tolerances keyed by
/// lowercased group name.
#[derive(Debug, Clone, Default)]
pub struct GroupedTransactions {
    pub transactions: Vec<Transaction>,
    pub tolerances: HashMap<String, f64>,
}

/// A validated configuration with every pattern compiled.
#[derive(Debug, Clone)]
pub struct Config {
    file: ConfigFile,
    path: Option<PathBuf>,
    groups: Vec<CompiledGroup>,
    known: Vec<KnownSubscriptionRule>,
    excludes: Vec<ExcludeRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: ConfigFile::default(),
            path: None,
            groups: Vec::new(),
            known: default_rules(),
            excludes: Vec::new(),
        }
    }
}

impl Config {
    /// Loads `explicit` when given, otherwise the default location if it
    /// exists, otherwise built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> ClientResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("no config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load(path: &Path) -> ClientResult<Self> {
        let body = fs::read_to_string(path).map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                ClientError::config_not_found(path)
            } else {
                ClientError::config_invalid(&format!(
                    "Could not read config file `{}`: {error}",
                    path.display()
                ))
            }
        })?;
        let mut config = Self::from_yaml_str(&body)?;
        config.path = Some(path.to_path_buf());
        debug!(
            path = %path.display(),
            groups = config.groups.len(),
            known_rules = config.known.len(),
            excludes = config.excludes.len(),
            "loaded config"
        );
        Ok(config)
    }

    pub fn from_yaml_str(body: &str) -> ClientResult<Self> {
        if !has_yaml_content(body) {
            return Self::from_file(ConfigFile::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(body).map_err(|error| {
            ClientError::config_invalid(&format!("Config is not valid YAML: {error}"))
        })?;
        if value.is_null() {
            return Self::from_file(ConfigFile::default());
        }
        let file: ConfigFile = serde_yaml::from_value(value).map_err(|error| {
            ClientError::config_invalid(&format!("Config has an unexpected shape: {error}"))
        })?;
        Self::from_file(file)
    }

    pub fn from_file(file: ConfigFile) -> ClientResult<Self> {
        let mut groups = Vec::with_capacity(file.groups.len());
        for group in &file.groups {
            if let Some(tolerance) = group.tolerance
                && !(tolerance.is_finite() && tolerance >= 0.0)
            {
                return Err(ClientError::config_invalid(&format!(
                    "Group `{}` has an invalid tolerance; use a non-negative number.",
                    group.name
                )));
            }
            let regexes = group
                .patterns
                .iter()
                .map(|pattern| compile_case_insensitive(pattern, "group"))
                .collect::<ClientResult<Vec<Regex>>>()?;
            groups.push(CompiledGroup {
                name: group.name.clone(),
                regexes,
                tolerance: group.tolerance,
            });
        }

        let mut known = if file.use_default_known.unwrap_or(true) {
            default_rules()
        } else {
            Vec::new()
        };
        for entry in &file.known {
            known.push(compile_known(entry)?);
        }

        let excludes = file
            .exclude
            .iter()
            .map(compile_exclude)
            .collect::<ClientResult<Vec<ExcludeRule>>>()?;

        Ok(Self {
            file,
            path: None,
            groups,
            known,
            excludes,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file(&self) -> &ConfigFile {
        &self.file
    }

    pub fn known_rules(&self) -> &[KnownSubscriptionRule] {
        &self.known
    }

    /// Renames transactions matching a group pattern to the group name.
    ///
    /// Groups are tried in file order and the first group with a matching
    /// pattern wins.
    pub fn apply_groups(&self, transactions: &[Transaction]) -> GroupedTransactions {
        let mut tolerances = HashMap::new();
        for group in &self.groups {
            if let Some(tolerance) = group.tolerance {
                tolerances.insert(group.name.to_lowercase(), tolerance);
            }
        }

        let transactions = transactions
            .iter()
            .map(|transaction| {
                let group = self.groups.iter().find(|group| {
                    group
                        .regexes
                        .iter()
                        .any(|regex| regex.is_match(&transaction.text))
                });
                match group {
                    Some(group) => Transaction::new(transaction.date, &group.name, transaction.amount),
                    None => transaction.clone(),
                }
            })
            .collect();

        GroupedTransactions {
            transactions,
            tolerances,
        }
    }

    pub fn should_exclude(&self, subscription: &Subscription) -> bool {
        self.excludes.iter().any(|rule| rule.excludes(subscription))
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.file
            .descriptions
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn tags(&self, name: &str) -> &[String] {
        self.file
            .tags
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Starter config listing each detected subscription with an empty description.
pub fn generate_template(subscriptions: &[Subscription]) -> ConfigFile {
    ConfigFile {
        descriptions: subscriptions
            .iter()
            .map(|subscription| (subscription.name.clone(), String::new()))
            .collect(),
        ..ConfigFile::default()
    }
}

/// `$SUBTRACK_CONFIG`, else `~/.subtrack/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV_VAR)
        && !value.trim().is_empty()
    {
        return Some(PathBuf::from(value));
    }
    home::home_dir().map(|home| home.join(".subtrack").join("config.yaml"))
}

fn has_yaml_content(body: &str) -> bool {
    body.lines().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#') && trimmed != "---"
    })
}

fn compile_case_insensitive(pattern: &str, kind: &str) -> ClientResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|error| {
            ClientError::config_invalid(&format!("Invalid {kind} pattern `{pattern}`: {error}"))
        })
}

fn compile_known(entry: &KnownEntry) -> ClientResult<KnownSubscriptionRule> {
    let rule = KnownSubscriptionRule::new(&entry.pattern).map_err(|error| {
        ClientError::config_invalid(&format!(
            "Invalid known pattern `{}`: {error}",
            entry.pattern
        ))
    })?;
    Ok(rule
        .with_amount_bounds(entry.min_amount, entry.max_amount)
        .with_date_bounds(
            optional_date(entry.before.as_deref(), "known.before")?,
            optional_date(entry.after.as_deref(), "known.after")?,
        ))
}

fn compile_exclude(entry: &ExcludeEntry) -> ClientResult<ExcludeRule> {
    let (pattern, before, after) = match entry {
        ExcludeEntry::Pattern(pattern) => (pattern, None, None),
        ExcludeEntry::Bounded {
            pattern,
            before,
            after,
        } => (pattern, before.as_deref(), after.as_deref()),
    };
    let regex = Regex::new(pattern).map_err(|error| {
        ClientError::config_invalid(&format!("Invalid exclude pattern `{pattern}`: {error}"))
    })?;
    Ok(ExcludeRule {
        regex,
        before: optional_date(before, "exclude.before")?,
        after: optional_date(after, "exclude.after")?,
    })
}

fn optional_date(value: Option<&str>, field_name: &str) -> ClientResult<Option<NaiveDate>> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_iso_date_field(raw, field_name))
        .transpose()
}
