// Configuration module for slim
// Reads from environment variables with sensible defaults

use crate::impact::Conventions;
use std::env;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Version-control executable (SLIM_GIT_BIN)
    pub git_bin: String,

    /// Go toolchain executable (SLIM_GO_BIN)
    pub go_bin: String,

    /// Suffix of buildable source files (SLIM_SOURCE_SUFFIX)
    pub source_suffix: String,

    /// Suffix of test files (SLIM_TEST_SUFFIX)
    pub test_suffix: String,

    /// Name of fixture directories (SLIM_FIXTURE_DIR)
    pub fixture_dir: String,

    /// Single-revision diffs include every pending status entry, not just
    /// untracked files (SLIM_INCLUDE_STAGED)
    pub include_staged: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            git_bin: "git".to_string(),
            go_bin: "go".to_string(),
            source_suffix: ".go".to_string(),
            test_suffix: "_test.go".to_string(),
            fixture_dir: "testdata".to_string(),
            include_staged: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        let text_vars: [(&str, &mut String); 5] = [
            ("SLIM_GIT_BIN", &mut config.git_bin),
            ("SLIM_GO_BIN", &mut config.go_bin),
            ("SLIM_SOURCE_SUFFIX", &mut config.source_suffix),
            ("SLIM_TEST_SUFFIX", &mut config.test_suffix),
            ("SLIM_FIXTURE_DIR", &mut config.fixture_dir),
        ];
        for (key, slot) in text_vars {
            if let Some(val) = lookup(key) {
                let val = val.trim();
                if val.is_empty() {
                    tracing::warn!("Empty {} value, using default: {}", key, slot);
                } else {
                    *slot = val.to_string();
                }
            }
        }

        if let Some(val) = lookup("SLIM_INCLUDE_STAGED") {
            match parse_bool(&val) {
                Some(parsed) => config.include_staged = parsed,
                None => tracing::warn!(
                    "Invalid SLIM_INCLUDE_STAGED value: {}, using default: {}",
                    val,
                    config.include_staged
                ),
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }

    /// File-naming conventions used by classification and pruning.
    pub fn conventions(&self) -> Conventions {
        Conventions {
            source_suffix: self.source_suffix.clone(),
            test_suffix: self.test_suffix.clone(),
            fixture_dir: self.fixture_dir.clone(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
