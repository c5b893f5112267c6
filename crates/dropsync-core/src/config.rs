//! Configuration module for Dropsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Dropsync.
///
/// Every section carries `#[serde(default)]` so a partial YAML file fills
/// the missing sections from defaults instead of failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub transfers: TransfersConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub content_types: ContentTypesConfig,
}

/// Directory watching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Local directory mirrored into Drive.
    pub root: PathBuf,
    /// Milliseconds a new entry's size must hold steady before it is
    /// considered fully written.
    pub settle_delay_ms: u64,
    /// Capacity of the filesystem event channel.
    pub event_buffer: usize,
}

/// Remote destination settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Candidate destination folder names offered when a new top-level
    /// entry appears.
    pub destinations: Vec<String>,
}

/// Transfer strategy and chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransfersConfig {
    /// Files at or below this size (in MiB) go through a single-request
    /// upload; anything larger uses a resumable session.
    pub simple_limit_mb: u64,
    /// Size of each resumable upload chunk (in MiB). Whole-MiB chunks keep
    /// the 256 KiB alignment the Drive API requires.
    pub chunk_size_mb: u64,
    /// Maximum file transfers in flight at once.
    pub max_concurrent: u32,
    /// Reserved for cross-restart resume of interrupted sessions. Not yet
    /// supported; validation rejects `true`.
    pub persist_resume_state: bool,
}

/// Post-upload local cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Ask before deleting a local file whose upload completed. When
    /// false, local files are always kept.
    pub prompt_delete: bool,
}

/// Authentication / OAuth settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Google OAuth client ID. `None` until the user runs `dropsync auth login`.
    pub client_id: Option<String>,
    /// Google OAuth client secret (installed-app flows treat this as
    /// non-confidential).
    pub client_secret: Option<String>,
}

/// Content type mapping settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentTypesConfig {
    /// Extension-to-MIME overrides merged over the built-in table.
    /// Keys are extensions without the leading dot, e.g. `"log": "text/plain"`.
    pub overrides: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/dropsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("dropsync")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

// Config derives Default because all its fields implement Default.
// (clippy::derivable_impls)

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("Dropsync"),
            settle_delay_ms: 500,
            event_buffer: 1024,
        }
    }
}

impl Default for TransfersConfig {
    fn default() -> Self {
        Self {
            simple_limit_mb: 5,
            chunk_size_mb: 8,
            max_concurrent: 8,
            persist_resume_state: false,
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self { prompt_delete: true }
    }
}

impl WatchConfig {
    /// Watch root with a leading `~` component expanded to the home
    /// directory. Paths without the tilde are returned unchanged.
    #[must_use]
    pub fn expanded_root(&self) -> PathBuf {
        match (self.root.strip_prefix("~"), dirs::home_dir()) {
            (Ok(stripped), Some(home)) => home.join(stripped),
            _ => self.root.clone(),
        }
    }
}

impl TransfersConfig {
    /// Simple-transfer limit in bytes.
    #[must_use]
    pub fn simple_limit_bytes(&self) -> u64 {
        self.simple_limit_mb * 1024 * 1024
    }

    /// Resumable chunk size in bytes.
    #[must_use]
    pub fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_mb * 1024 * 1024
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"transfers.chunk_size_mb"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- watch ---
        if self.watch.settle_delay_ms == 0 {
            errors.push(ValidationError {
                field: "watch.settle_delay_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.watch.event_buffer == 0 {
            errors.push(ValidationError {
                field: "watch.event_buffer".into(),
                message: "must be greater than 0".into(),
            });
        }

        // Check watch root only when it does not start with `~` (tilde is expanded at runtime).
        let root_str = self.watch.root.to_string_lossy();
        if !root_str.starts_with('~') && !self.watch.root.exists() {
            errors.push(ValidationError {
                field: "watch.root".into(),
                message: format!("directory does not exist: {}", self.watch.root.display()),
            });
        }

        // --- drive ---
        let mut seen = std::collections::HashSet::new();
        for name in &self.drive.destinations {
            if name.trim().is_empty() {
                errors.push(ValidationError {
                    field: "drive.destinations".into(),
                    message: "destination names must be non-empty".into(),
                });
            } else if !seen.insert(name.as_str()) {
                errors.push(ValidationError {
                    field: "drive.destinations".into(),
                    message: format!("duplicate destination '{name}'"),
                });
            }
        }

        // --- transfers ---
        if self.transfers.simple_limit_mb == 0 {
            errors.push(ValidationError {
                field: "transfers.simple_limit_mb".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.transfers.chunk_size_mb == 0 {
            errors.push(ValidationError {
                field: "transfers.chunk_size_mb".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.transfers.max_concurrent == 0 {
            errors.push(ValidationError {
                field: "transfers.max_concurrent".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.transfers.persist_resume_state {
            errors.push(ValidationError {
                field: "transfers.persist_resume_state".into(),
                message: "cross-restart resume is not supported yet; must be false".into(),
            });
        }

        // --- content_types ---
        for (ext, mime) in &self.content_types.overrides {
            if ext.is_empty() || ext.starts_with('.') {
                errors.push(ValidationError {
                    field: "content_types.overrides".into(),
                    message: format!("extension key '{ext}' must be non-empty and without a leading dot"),
                });
            }
            if mime.is_empty() {
                errors.push(ValidationError {
                    field: "content_types.overrides".into(),
                    message: format!("override for '{ext}' has an empty MIME type"),
                });
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use dropsync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .watch_root(PathBuf::from("/home/user/Dropsync"))
///     .drive_destination("Reports")
///     .transfers_simple_limit_mb(10)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- watch ---

    pub fn watch_root(mut self, root: PathBuf) -> Self {
        self.config.watch.root = root;
        self
    }

    pub fn watch_settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.watch.settle_delay_ms = ms;
        self
    }

    pub fn watch_event_buffer(mut self, capacity: usize) -> Self {
        self.config.watch.event_buffer = capacity;
        self
    }

    // --- drive ---

    /// Append one destination name to the candidate list.
    pub fn drive_destination(mut self, name: impl Into<String>) -> Self {
        self.config.drive.destinations.push(name.into());
        self
    }

    pub fn drive_destinations(mut self, names: Vec<String>) -> Self {
        self.config.drive.destinations = names;
        self
    }

    // --- transfers ---

    pub fn transfers_simple_limit_mb(mut self, mb: u64) -> Self {
        self.config.transfers.simple_limit_mb = mb;
        self
    }

    pub fn transfers_chunk_size_mb(mut self, mb: u64) -> Self {
        self.config.transfers.chunk_size_mb = mb;
        self
    }

    pub fn transfers_max_concurrent(mut self, n: u32) -> Self {
        self.config.transfers.max_concurrent = n;
        self
    }

    pub fn transfers_persist_resume_state(mut self, persist: bool) -> Self {
        self.config.transfers.persist_resume_state = persist;
        self
    }

    // --- cleanup ---

    pub fn cleanup_prompt_delete(mut self, prompt: bool) -> Self {
        self.config.cleanup.prompt_delete = prompt;
        self
    }

    // --- auth ---

    pub fn auth_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.auth.client_id = Some(client_id.into());
        self
    }

    pub fn auth_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.config.auth.client_secret = Some(client_secret.into());
        self
    }

    // --- content_types ---

    pub fn content_type_override(
        mut self,
        ext: impl Into<String>,
        mime: impl Into<String>,
    ) -> Self {
        self.config
            .content_types
            .overrides
            .insert(ext.into(), mime.into());
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert!(cfg.watch.root.to_string_lossy().contains("Dropsync"));
        assert_eq!(cfg.watch.settle_delay_ms, 500);
        assert_eq!(cfg.watch.event_buffer, 1024);
        assert!(cfg.drive.destinations.is_empty());
        assert_eq!(cfg.transfers.simple_limit_mb, 5);
        assert_eq!(cfg.transfers.chunk_size_mb, 8);
        assert_eq!(cfg.transfers.max_concurrent, 8);
        assert!(!cfg.transfers.persist_resume_state);
        assert!(cfg.cleanup.prompt_delete);
        assert!(cfg.auth.client_id.is_none());
        assert!(cfg.auth.client_secret.is_none());
        assert!(cfg.content_types.overrides.is_empty());
    }

    #[test]
    fn default_config_passes_validation() {
        let cfg = Config::default();
        let errors = cfg.validate();
        // watch.root may not exist on a CI/test machine, filter that out
        let non_root_errors: Vec<_> = errors.iter().filter(|e| e.field != "watch.root").collect();
        assert!(
            non_root_errors.is_empty(),
            "unexpected validation errors: {non_root_errors:?}"
        );
    }

    #[test]
    fn byte_helpers_convert_mib() {
        let transfers = TransfersConfig::default();
        assert_eq!(transfers.simple_limit_bytes(), 5 * 1024 * 1024);
        assert_eq!(transfers.chunk_size_bytes(), 8 * 1024 * 1024);
    }

    #[test]
    fn expanded_root_resolves_leading_tilde() {
        let watch = WatchConfig {
            root: PathBuf::from("~/Drop"),
            ..WatchConfig::default()
        };
        let expanded = watch.expanded_root();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("Drop"));
    }

    #[test]
    fn expanded_root_leaves_absolute_paths_alone() {
        let watch = WatchConfig {
            root: PathBuf::from("/srv/drop"),
            ..WatchConfig::default()
        };
        assert_eq!(watch.expanded_root(), PathBuf::from("/srv/drop"));
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
watch:
  root: /tmp/test-dropsync
  settle_delay_ms: 250
  event_buffer: 64
drive:
  destinations:
    - Reports
    - Archive
transfers:
  simple_limit_mb: 10
  chunk_size_mb: 4
  max_concurrent: 2
  persist_resume_state: false
cleanup:
  prompt_delete: false
auth:
  client_id: "test-client-id-123"
  client_secret: "test-secret"
content_types:
  overrides:
    log: text/plain
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.watch.root, PathBuf::from("/tmp/test-dropsync"));
        assert_eq!(cfg.watch.settle_delay_ms, 250);
        assert_eq!(cfg.watch.event_buffer, 64);
        assert_eq!(cfg.drive.destinations, vec!["Reports", "Archive"]);
        assert_eq!(cfg.transfers.simple_limit_mb, 10);
        assert_eq!(cfg.transfers.chunk_size_mb, 4);
        assert_eq!(cfg.transfers.max_concurrent, 2);
        assert!(!cfg.cleanup.prompt_delete);
        assert_eq!(cfg.auth.client_id, Some("test-client-id-123".to_string()));
        assert_eq!(cfg.auth.client_secret, Some("test-secret".to_string()));
        assert_eq!(
            cfg.content_types.overrides.get("log"),
            Some(&"text/plain".to_string())
        );
    }

    #[test]
    fn partial_yaml_fills_missing_sections_with_defaults() {
        let yaml = r#"
drive:
  destinations:
    - Inbox
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load partial config");
        assert_eq!(cfg.drive.destinations, vec!["Inbox"]);
        assert_eq!(cfg.watch.settle_delay_ms, 500);
        assert_eq!(cfg.transfers.simple_limit_mb, 5);
        assert!(cfg.cleanup.prompt_delete);
    }

    #[test]
    fn load_or_default_returns_default_on_missing_file() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(cfg.watch.settle_delay_ms, 500);
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"not: [valid: yaml: {{{").unwrap();
        tmp.flush().unwrap();

        let result = Config::load(tmp.path());
        assert!(result.is_err());
    }

    // -- Validation --

    #[test]
    fn validate_catches_zero_settle_delay() {
        let mut cfg = Config::default();
        cfg.watch.settle_delay_ms = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "watch.settle_delay_ms"));
    }

    #[test]
    fn validate_catches_zero_event_buffer() {
        let mut cfg = Config::default();
        cfg.watch.event_buffer = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "watch.event_buffer"));
    }

    #[test]
    fn validate_catches_empty_destination_name() {
        let mut cfg = Config::default();
        cfg.drive.destinations = vec!["Reports".into(), "  ".into()];
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "drive.destinations" && e.message.contains("non-empty")));
    }

    #[test]
    fn validate_catches_duplicate_destinations() {
        let mut cfg = Config::default();
        cfg.drive.destinations = vec!["Reports".into(), "Archive".into(), "Reports".into()];
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "drive.destinations" && e.message.contains("duplicate")));
    }

    #[test]
    fn validate_catches_zero_transfer_values() {
        let mut cfg = Config::default();
        cfg.transfers.simple_limit_mb = 0;
        cfg.transfers.chunk_size_mb = 0;
        cfg.transfers.max_concurrent = 0;
        let errors = cfg.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"transfers.simple_limit_mb"));
        assert!(fields.contains(&"transfers.chunk_size_mb"));
        assert!(fields.contains(&"transfers.max_concurrent"));
    }

    #[test]
    fn validate_rejects_persist_resume_state() {
        let mut cfg = Config::default();
        cfg.transfers.persist_resume_state = true;
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "transfers.persist_resume_state"
                && e.message.contains("not supported")));
    }

    #[test]
    fn validate_catches_bad_content_type_overrides() {
        let mut cfg = Config::default();
        cfg.content_types
            .overrides
            .insert(".log".to_string(), "text/plain".to_string());
        cfg.content_types
            .overrides
            .insert("dat".to_string(), String::new());
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "content_types.overrides" && e.message.contains("leading dot")));
        assert!(errors
            .iter()
            .any(|e| e.field == "content_types.overrides" && e.message.contains("empty MIME")));
    }

    // -- Builder --

    #[test]
    fn builder_starts_from_defaults() {
        let cfg = ConfigBuilder::new().build();
        assert_eq!(cfg.watch.settle_delay_ms, 500);
        assert_eq!(cfg.transfers.simple_limit_mb, 5);
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConfigBuilder::new()
            .watch_root(PathBuf::from("/custom/path"))
            .watch_settle_delay_ms(100)
            .watch_event_buffer(256)
            .drive_destination("Reports")
            .drive_destination("Archive")
            .transfers_simple_limit_mb(20)
            .transfers_chunk_size_mb(16)
            .transfers_max_concurrent(4)
            .cleanup_prompt_delete(false)
            .auth_client_id("my-client-id")
            .auth_client_secret("my-secret")
            .content_type_override("log", "text/plain")
            .build();

        assert_eq!(cfg.watch.root, PathBuf::from("/custom/path"));
        assert_eq!(cfg.watch.settle_delay_ms, 100);
        assert_eq!(cfg.watch.event_buffer, 256);
        assert_eq!(cfg.drive.destinations, vec!["Reports", "Archive"]);
        assert_eq!(cfg.transfers.simple_limit_mb, 20);
        assert_eq!(cfg.transfers.chunk_size_mb, 16);
        assert_eq!(cfg.transfers.max_concurrent, 4);
        assert!(!cfg.cleanup.prompt_delete);
        assert_eq!(cfg.auth.client_id, Some("my-client-id".to_string()));
        assert_eq!(cfg.auth.client_secret, Some("my-secret".to_string()));
        assert_eq!(
            cfg.content_types.overrides.get("log"),
            Some(&"text/plain".to_string())
        );
    }

    #[test]
    fn builder_build_validated_succeeds_for_valid_config() {
        let result = ConfigBuilder::new()
            .watch_root(PathBuf::from("~/Dropsync"))
            .build_validated();
        assert!(result.is_ok());
    }

    #[test]
    fn builder_build_validated_fails_for_invalid_config() {
        let result = ConfigBuilder::new()
            .watch_settle_delay_ms(0)
            .transfers_persist_resume_state(true)
            .build_validated();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.len() >= 2);
    }

    // -- default_path --

    #[test]
    fn default_path_ends_with_config_yaml() {
        let p = Config::default_path();
        assert!(p.ends_with("dropsync/config.yaml"));
    }

    // -- ValidationError Display --

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "transfers.chunk_size_mb".into(),
            message: "must be greater than 0".into(),
        };
        assert_eq!(
            err.to_string(),
            "transfers.chunk_size_mb: must be greater than 0"
        );
    }
}
