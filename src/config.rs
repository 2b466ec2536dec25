//! Configuration for the search daemon.
//!
//! Settings are read from `seedsearch.toml` (all keys optional) and resolved
//! into a runtime `Settings` with paths made relative to the config file.
//!
//! ```toml
//! [oracle]
//! binary = "/tmp/john-jumbo/run/john"
//! hash_file = "nist-seeds-john.txt"
//! format = "Raw-SHA1"
//! rules = "Jumbo"
//! timeout_secs = 86400
//! pot_files = ["/root/.john/john.pot"]
//!
//! [paths]
//! ledger = "seedsearch_state.log"
//! discoveries = "seedsearch_FOUND.txt"
//! artifact_dir = "tmp"
//!
//! [search]
//! max_counter = 2500
//! phase1_batch_size = 10
//! phase2_batch_size = 500
//! phase3_batch_size = 20000
//! phase3_status_interval_secs = 14400
//! retry_passes = 2
//! stop_on_match = false
//!
//! [alert]
//! command = "mail -s \"$SEEDSEARCH_ALERT_SUBJECT\" ops@example.com"
//! timeout_secs = 60
//! ```

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "seedsearch.toml";
pub const ORACLE_ENV: &str = "SEEDSEARCH_ORACLE";
pub const LOCK_FILE: &str = ".seedsearch.lock";
const DEFAULT_ORACLE_BINARY: &str = "/tmp/john-jumbo/run/john";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSection {
    /// Falls back to `SEEDSEARCH_ORACLE`, then the default build location.
    #[serde(default)]
    pub binary: Option<PathBuf>,
    #[serde(default = "default_hash_file")]
    pub hash_file: PathBuf,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_rules")]
    pub rules: String,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
    /// Result-store locations; `None` means the well-known set.
    #[serde(default)]
    pub pot_files: Option<Vec<PathBuf>>,
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            binary: None,
            hash_file: default_hash_file(),
            format: default_format(),
            rules: default_rules(),
            timeout_secs: default_oracle_timeout(),
            pot_files: None,
        }
    }
}

fn default_hash_file() -> PathBuf {
    PathBuf::from("nist-seeds-john.txt")
}

fn default_format() -> String {
    "Raw-SHA1".to_string()
}

fn default_rules() -> String {
    "Jumbo".to_string()
}

fn default_oracle_timeout() -> u64 {
    86_400
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_ledger")]
    pub ledger: PathBuf,
    #[serde(default = "default_discoveries")]
    pub discoveries: PathBuf,
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            ledger: default_ledger(),
            discoveries: default_discoveries(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

fn default_ledger() -> PathBuf {
    PathBuf::from("seedsearch_state.log")
}

fn default_discoveries() -> PathBuf {
    PathBuf::from("seedsearch_FOUND.txt")
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("tmp")
}

/// Search-space and batching parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_max_counter")]
    pub max_counter: u32,
    #[serde(default = "default_phase1_batch")]
    pub phase1_batch_size: u32,
    #[serde(default = "default_phase2_batch")]
    pub phase2_batch_size: u32,
    /// Candidates per Phase-3 artifact.
    #[serde(default = "default_phase3_batch")]
    pub phase3_batch_size: u64,
    #[serde(default = "default_status_interval")]
    pub phase3_status_interval_secs: u64,
    /// Passes over a phase's pending batches within one run.
    #[serde(default = "default_retry_passes")]
    pub retry_passes: u32,
    #[serde(default)]
    pub stop_on_match: bool,
    /// Seed for a reproducible Phase 3; entropy-seeded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase3_seed: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_counter: default_max_counter(),
            phase1_batch_size: default_phase1_batch(),
            phase2_batch_size: default_phase2_batch(),
            phase3_batch_size: default_phase3_batch(),
            phase3_status_interval_secs: default_status_interval(),
            retry_passes: default_retry_passes(),
            stop_on_match: false,
            phase3_seed: None,
        }
    }
}

fn default_max_counter() -> u32 {
    2500
}

fn default_phase1_batch() -> u32 {
    10
}

fn default_phase2_batch() -> u32 {
    500
}

fn default_phase3_batch() -> u64 {
    20_000
}

fn default_status_interval() -> u64 {
    14_400
}

fn default_retry_passes() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Shell command run once per discovery. Alerts only go to the journal
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default = "default_alert_timeout")]
    pub timeout_secs: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: default_alert_timeout(),
        }
    }
}

fn default_alert_timeout() -> u64 {
    60
}

/// The on-disk configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchToml {
    #[serde(default)]
    pub oracle: OracleSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub alert: AlertSettings,
}

impl SearchToml {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|message| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Missing file means all defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Oracle binary: file, then environment, then default.
    fn oracle_binary(&self) -> PathBuf {
        self.oracle
            .binary
            .clone()
            .or_else(|| std::env::var_os(ORACLE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ORACLE_BINARY))
    }
}

/// Fully resolved oracle invocation settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleSettings {
    pub binary: PathBuf,
    pub hash_file: PathBuf,
    pub format: String,
    pub rules: String,
    pub timeout_secs: u64,
    pub pot_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSettings {
    pub ledger: PathBuf,
    pub discoveries: PathBuf,
    pub artifact_dir: PathBuf,
}

impl PathSettings {
    pub fn lock_file(&self) -> PathBuf {
        self.artifact_dir.join(LOCK_FILE)
    }
}

/// Runtime configuration with every path resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub oracle: OracleSettings,
    pub paths: PathSettings,
    pub search: SearchSettings,
    pub alert: AlertSettings,
}

impl Settings {
    /// Load `config_path` (or defaults if absent) and resolve relative paths
    /// against its directory.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let toml = SearchToml::load_or_default(config_path)?;
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::resolve(toml, base))
    }

    pub fn resolve(toml: SearchToml, base: &Path) -> Self {
        let at = |p: &Path| -> PathBuf {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };

        let binary = at(&toml.oracle_binary());
        let pot_files = match &toml.oracle.pot_files {
            Some(files) => files.iter().map(|p| at(p)).collect(),
            None => default_pot_files(&binary),
        };

        Self {
            oracle: OracleSettings {
                hash_file: at(&toml.oracle.hash_file),
                format: toml.oracle.format,
                rules: toml.oracle.rules,
                timeout_secs: toml.oracle.timeout_secs,
                pot_files,
                binary,
            },
            paths: PathSettings {
                ledger: at(&toml.paths.ledger),
                discoveries: at(&toml.paths.discoveries),
                artifact_dir: at(&toml.paths.artifact_dir),
            },
            search: toml.search,
            alert: toml.alert,
        }
    }

    /// Reject values that would stall a phase or make it meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, u64); 7] = [
            ("search.phase1_batch_size", u64::from(self.search.phase1_batch_size)),
            ("search.phase2_batch_size", u64::from(self.search.phase2_batch_size)),
            ("search.phase3_batch_size", self.search.phase3_batch_size),
            ("search.phase3_status_interval_secs", self.search.phase3_status_interval_secs),
            ("search.retry_passes", u64::from(self.search.retry_passes)),
            ("oracle.timeout_secs", self.oracle.timeout_secs),
            ("alert.timeout_secs", self.alert.timeout_secs),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue { name, value });
            }
        }
        Ok(())
    }

    /// Create the artifact directory and the ledger's parent directory.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.paths.artifact_dir)?;
        for file in [&self.paths.ledger, &self.paths.discoveries] {
            if let Some(parent) = file.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `~/.john/john.pot`, `/root/.john/john.pot`, and `john.pot` next to the binary.
fn default_pot_files(binary: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Some(home) = dirs::home_dir() {
        files.push(home.join(".john").join("john.pot"));
    }
    files.push(PathBuf::from("/root/.john/john.pot"));
    if let Some(dir) = binary.parent() {
        files.push(dir.join("john.pot"));
    }
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let toml = SearchToml::parse("").unwrap();
        assert_eq!(toml.search, SearchSettings::default());
        assert_eq!(toml.search.max_counter, 2500);
        assert_eq!(toml.search.phase1_batch_size, 10);
        assert_eq!(toml.search.phase2_batch_size, 500);
        assert_eq!(toml.search.phase3_batch_size, 20_000);
        assert_eq!(toml.search.phase3_status_interval_secs, 14_400);
        assert_eq!(toml.oracle.format, "Raw-SHA1");
        assert_eq!(toml.oracle.rules, "Jumbo");
        assert_eq!(toml.oracle.timeout_secs, 86_400);
        assert_eq!(toml.paths.artifact_dir, PathBuf::from("tmp"));
        assert!(toml.alert.command.is_none());
    }

    #[test]
    fn test_missing_oracle_table_keeps_oracle_defaults() {
        let toml = SearchToml::parse("[search]\nmax_counter = 5\n").unwrap();
        assert_eq!(toml.search.max_counter, 5);
        assert_eq!(toml.oracle.hash_file, PathBuf::from("nist-seeds-john.txt"));
        assert_eq!(toml.oracle.format, "Raw-SHA1");
        assert_eq!(toml.oracle.rules, "Jumbo");
        assert_eq!(toml.oracle.timeout_secs, 86_400);

        let settings = Settings::resolve(toml, Path::new("/srv/seeds"));
        assert!(settings.validate().is_ok());
        assert_eq!(settings.oracle.hash_file, PathBuf::from("/srv/seeds/nist-seeds-john.txt"));
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let toml = SearchToml::parse(
            r#"
[search]
max_counter = 200
stop_on_match = true

[oracle]
binary = "/opt/john/run/john"
"#,
        )
        .unwrap();
        assert_eq!(toml.search.max_counter, 200);
        assert!(toml.search.stop_on_match);
        assert_eq!(toml.search.phase2_batch_size, 500);
        assert_eq!(toml.oracle_binary(), PathBuf::from("/opt/john/run/john"));
    }

    #[test]
    fn test_unparseable_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seedsearch.toml");
        std::fs::write(&path, "[search\nmax_counter = ").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.oracle.format, "Raw-SHA1");
        assert_eq!(settings.oracle.timeout_secs, 86_400);
        assert_eq!(settings.search, SearchSettings::default());
        assert_eq!(settings.paths.ledger, dir.path().join("seedsearch_state.log"));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let dir = tempdir().unwrap();
        let toml = SearchToml::parse(
            r#"
[oracle]
binary = "john/run/john"
hash_file = "/srv/hashes.txt"

[paths]
artifact_dir = "work/tmp"
"#,
        )
        .unwrap();
        let settings = Settings::resolve(toml, dir.path());
        assert_eq!(settings.oracle.binary, dir.path().join("john/run/john"));
        assert_eq!(settings.oracle.hash_file, PathBuf::from("/srv/hashes.txt"));
        assert_eq!(settings.paths.artifact_dir, dir.path().join("work/tmp"));
        assert_eq!(settings.paths.lock_file(), dir.path().join("work/tmp/.seedsearch.lock"));
        assert!(settings.oracle.pot_files.contains(&dir.path().join("john/run/john.pot")));
        assert!(settings.oracle.pot_files.contains(&PathBuf::from("/root/.john/john.pot")));
    }

    #[test]
    fn test_explicit_pot_files_replace_defaults() {
        let toml = SearchToml::parse("[oracle]\npot_files = [\"a.pot\"]\n").unwrap();
        let settings = Settings::resolve(toml, Path::new("/etc/seeds"));
        assert_eq!(settings.oracle.pot_files, vec![PathBuf::from("/etc/seeds/a.pot")]);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut settings = Settings::resolve(SearchToml::default(), Path::new("/x"));
        assert!(settings.validate().is_ok());

        settings.search.phase2_batch_size = 0;
        match settings.validate().unwrap_err() {
            ConfigError::InvalidValue { name, value } => {
                assert_eq!(name, "search.phase2_batch_size");
                assert_eq!(value, 0);
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }

        let mut settings = Settings::resolve(SearchToml::default(), Path::new("/x"));
        settings.search.retry_passes = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_effective_config_renders_as_toml() {
        let settings = Settings::resolve(SearchToml::default(), Path::new("/srv/seeds"));
        let rendered = settings.to_toml().unwrap();
        assert!(rendered.contains("[search]"));
        assert!(rendered.contains("max_counter = 2500"));
        assert!(rendered.contains("/srv/seeds/seedsearch_state.log"));
        assert!(!rendered.contains("phase3_seed"));
    }

    #[test]
    fn test_ensure_directories_creates_artifact_and_ledger_dirs() {
        let dir = tempdir().unwrap();
        let toml =
            SearchToml::parse("[paths]\nledger = \"logs/state.log\"\nartifact_dir = \"a/b\"\n")
                .unwrap();
        let settings = Settings::resolve(toml, dir.path());
        settings.ensure_directories().unwrap();
        assert!(dir.path().join("a/b").is_dir());
        assert!(dir.path().join("logs").is_dir());
    }
}
