//! Builds the [`Config`] from layered sources
//!
//! Lowest precedence first:
//! - `appsettings.json` (required)
//! - `appsettings_dev.json` (optional)
//! - environment variables, the `.env` file being loaded by `main()`
//! - command line arguments
//!
//! Both JSON files expose their values in a `GitLabConfig` section.
//! Section and key names are matched case-insensitively.

use core::fmt::{Debug, Formatter};
use reqwest::Url;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::ConfigError;

/// Required configuration file
pub const PRIMARY_FILE: &str = "appsettings.json";
/// Optional configuration file, its values override the ones of [`PRIMARY_FILE`]
pub const OVERRIDE_FILE: &str = "appsettings_dev.json";
/// Name of the JSON section holding our keys
const SECTION: &str = "GitLabConfig";

/// Values taking precedence over the configuration files
///
/// Empty strings are considered as not set
#[derive(Debug, Default)]
pub struct Overrides {
    /// `GITLAB_BASE_URL`
    pub base_url: Option<String>,
    /// `GITLAB_TOKEN`
    pub access_token: Option<String>,
    /// `GITLAB_TARGET_BRANCH`, or the branch given on the command line
    pub target_branch: Option<String>,
    /// `ACCEPT_INVALID_CERTS`
    pub accept_invalid_certs: Option<String>,
}

impl Overrides {
    /// Reads the overrides from the environment
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|value| !value.is_empty());
        Self {
            base_url: var("GITLAB_BASE_URL"),
            access_token: var("GITLAB_TOKEN"),
            target_branch: var("GITLAB_TARGET_BRANCH"),
            accept_invalid_certs: var("ACCEPT_INVALID_CERTS"),
        }
    }
}

/// Validated configuration, it doesn't change once loaded
pub struct Config {
    /// Gitlab root URL, `/api/v4/...` is appended to it
    pub base_url: Url,
    /// Sent as a bearer token
    pub access_token: String,
    /// The branch we are looking for
    pub target_branch: String,
    /// Disables TLS certificates validation
    pub accept_invalid_certs: bool,
}

impl Debug for Config {
    #[expect(clippy::absolute_paths, reason = "Use a specific Result type")]
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"<redacted>")
            .field("target_branch", &self.target_branch)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl Config {
    /// Reads the configuration files located in `dir`, applies `overrides` and validates the result
    #[instrument(skip(overrides), err)]
    pub fn load(dir: &Path, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut settings = read_json(&dir.join(PRIMARY_FILE))?;

        let override_path = dir.join(OVERRIDE_FILE);
        if override_path.is_file() {
            debug!("applying {}", override_path.display());
            merge(&mut settings, read_json(&override_path)?);
        }

        let section = get_ignore_case(&settings, SECTION);
        let lookup = |key: &str| {
            section
                .and_then(|values| get_ignore_case(values, key))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };

        let base_url = required(
            overrides.base_url.or_else(|| lookup("BaseUrl")),
            "GitLabConfig:BaseUrl",
        )?;
        let access_token = required(
            overrides.access_token.or_else(|| lookup("AccessToken")),
            "GitLabConfig:AccessToken",
        )?;
        let target_branch = required(
            overrides.target_branch.or_else(|| lookup("TargetBranch")),
            "target branch",
        )?;

        let accept_invalid_certs = match overrides.accept_invalid_certs {
            None => false,
            Some(value) if value == "yes" => true,
            Some(value) => return Err(ConfigError::InvalidAcceptInvalidCerts(value)),
        };

        Ok(Self {
            base_url: parse_base_url(base_url)?,
            access_token,
            target_branch,
            accept_invalid_certs,
        })
    }
}

/// Returns `value` if it is defined and not empty
fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|val| !val.is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Only absolute `http(s)` URLs are accepted
fn parse_base_url(value: String) -> Result<Url, ConfigError> {
    let url = match Url::parse(&value) {
        Ok(url) => url,
        Err(err) => {
            return Err(ConfigError::InvalidBaseUrl {
                value,
                reason: err.to_string(),
            });
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            reason: format!("unsupported scheme '{}'", url.scheme()),
            value,
        });
    }

    if url.cannot_be_a_base() || !url.has_host() {
        return Err(ConfigError::InvalidBaseUrl {
            value,
            reason: "no host".to_owned(),
        });
    }

    Ok(url)
}

/// Reads and parses a JSON file
fn read_json(path: &Path) -> Result<Value, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Gets `key` from a JSON object, ignoring ASCII case
fn get_ignore_case<'value>(value: &'value Value, key: &str) -> Option<&'value Value> {
    value
        .as_object()?
        .iter()
        .find(|&(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, val)| val)
}

/// Recursively merges `overlay` into `base`
///
/// Objects are merged key by key (ignoring ASCII case), anything else is replaced
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let existing_key = base_map
                    .keys()
                    .find(|name| name.eq_ignore_ascii_case(&key))
                    .cloned();
                match existing_key.and_then(|name| base_map.get_mut(&name)) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

//-------------------------------------------
//
// Unit tests
//
// ------------------------------------------

#[cfg(test)]
mod tests {

    use std::fs;
    use tempfile::TempDir;

    use super::{Config, Overrides, OVERRIDE_FILE, PRIMARY_FILE};
    use crate::error::ConfigError;

    /*
     * Utility functions
     */
    fn config_dir(primary: Option<&str>, dev: Option<&str>) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        if let Some(content) = primary {
            fs::write(dir.path().join(PRIMARY_FILE), content).unwrap();
        }
        if let Some(content) = dev {
            fs::write(dir.path().join(OVERRIDE_FILE), content).unwrap();
        }
        dir
    }

    fn branch(name: &str) -> Overrides {
        Overrides {
            target_branch: Some(name.to_owned()),
            ..Overrides::default()
        }
    }

    const VALID: &str = r#"{
        "GitLabConfig": {
            "BaseUrl": "https://gitlab.example.com",
            "AccessToken": "glpat-primary"
        }
    }"#;

    /*
     * Tests
     */
    #[test]
    fn primary_file_only() {
        let dir = config_dir(Some(VALID), None);
        let config = Config::load(dir.path(), branch("LEM-1294")).unwrap();

        assert_eq!(config.base_url.as_str(), "https://gitlab.example.com/");
        assert_eq!(config.access_token, "glpat-primary");
        assert_eq!(config.target_branch, "LEM-1294");
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn dev_file_overrides_primary() {
        let dir = config_dir(
            Some(VALID),
            Some(r#"{ "GitLabConfig": { "AccessToken": "glpat-dev" } }"#),
        );
        let config = Config::load(dir.path(), branch("main")).unwrap();

        assert_eq!(config.base_url.as_str(), "https://gitlab.example.com/");
        assert_eq!(config.access_token, "glpat-dev");
    }

    #[test]
    fn keys_are_case_insensitive() {
        let dir = config_dir(
            Some(r#"{ "gitlabconfig": { "baseurl": "http://localhost:8080", "ACCESSTOKEN": "t" } }"#),
            Some(r#"{ "GITLABCONFIG": { "TargetBranch": "feature/x" } }"#),
        );
        let config = Config::load(dir.path(), Overrides::default()).unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.access_token, "t");
        assert_eq!(config.target_branch, "feature/x");
    }

    #[test]
    fn overrides_beat_files() {
        let dir = config_dir(
            Some(r#"{ "GitLabConfig": { "BaseUrl": "https://a.example.com", "AccessToken": "a", "TargetBranch": "a" } }"#),
            None,
        );
        let overrides = Overrides {
            base_url: Some("https://b.example.com/gitlab".to_owned()),
            access_token: Some("b".to_owned()),
            target_branch: Some("b".to_owned()),
            accept_invalid_certs: Some("yes".to_owned()),
        };
        let config = Config::load(dir.path(), overrides).unwrap();

        assert_eq!(config.base_url.as_str(), "https://b.example.com/gitlab");
        assert_eq!(config.access_token, "b");
        assert_eq!(config.target_branch, "b");
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn missing_primary_file_is_fatal() {
        let dir = config_dir(None, Some(VALID));
        let err = Config::load(dir.path(), branch("main")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }), "{err:?}");
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = config_dir(Some(VALID), Some("{ not json"));
        let err = Config::load(dir.path(), branch("main")).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }), "{err:?}");
    }

    #[test]
    fn empty_token_is_fatal() {
        let dir = config_dir(
            Some(r#"{ "GitLabConfig": { "BaseUrl": "https://gitlab.example.com", "AccessToken": "" } }"#),
            None,
        );
        let err = Config::load(dir.path(), branch("main")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GitLabConfig:AccessToken")), "{err:?}");
    }

    #[test]
    fn absent_base_url_is_fatal() {
        let dir = config_dir(Some(r#"{ "GitLabConfig": { "AccessToken": "t" } }"#), None);
        let err = Config::load(dir.path(), branch("main")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GitLabConfig:BaseUrl")), "{err:?}");
    }

    #[test]
    fn dev_file_can_blank_a_value() {
        let dir = config_dir(
            Some(VALID),
            Some(r#"{ "GitLabConfig": { "BaseUrl": null } }"#),
        );
        let err = Config::load(dir.path(), branch("main")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GitLabConfig:BaseUrl")), "{err:?}");
    }

    #[test]
    fn missing_target_branch_is_fatal() {
        let dir = config_dir(Some(VALID), None);
        let err = Config::load(dir.path(), Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("target branch")), "{err:?}");
    }

    #[test]
    fn base_url_must_be_http() {
        for base_url in ["ftp://gitlab.example.com", "gitlab.example.com", "mailto:me@example.com"] {
            let dir = config_dir(Some(VALID), None);
            let overrides = Overrides {
                base_url: Some(base_url.to_owned()),
                ..branch("main")
            };
            let err = Config::load(dir.path(), overrides).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }), "{base_url}: {err:?}");
        }
    }

    #[test]
    fn accept_invalid_certs_only_accepts_yes() {
        let dir = config_dir(Some(VALID), None);
        let overrides = Overrides {
            accept_invalid_certs: Some("true".to_owned()),
            ..branch("main")
        };
        let err = Config::load(dir.path(), overrides).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAcceptInvalidCerts(_)), "{err:?}");
    }

    #[test]
    fn debug_hides_the_token() {
        let dir = config_dir(Some(VALID), None);
        let config = Config::load(dir.path(), branch("main")).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("glpat-primary"));
        assert!(debug.contains("<redacted>"));
    }
}
