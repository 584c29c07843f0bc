use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use taskdeck_core::StatusFilter;
use time::UtcOffset;
use time::macros::format_description;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "taskdeck.toml";

/// Top-level configuration loaded from `taskdeck.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Backend settings.
    #[serde(default)]
    pub data: DataConfig,
    /// Presentation settings.
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// `[data]` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    /// Seed file for the in-memory backend.
    #[serde(default)]
    pub seed: Option<PathBuf>,
    /// Simulated latency per data service call, in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

/// `[view]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    /// Status filter applied when a session starts.
    #[serde(default = "default_filter")]
    pub default_filter: String,
    /// Offset (`±HH:MM`) used to decide calendar days.
    #[serde(default = "default_offset")]
    pub utc_offset: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_filter: default_filter(),
            utc_offset: default_offset(),
        }
    }
}

fn default_filter() -> String {
    StatusFilter::All.as_str().to_owned()
}

fn default_offset() -> String {
    "+00:00".to_owned()
}

impl AppConfig {
    /// Load configuration from `path`. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        if !path.exists() {
            return Ok(Self {
                base_dir,
                ..Self::default()
            });
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents, base_dir)
            .with_context(|| format!("failed to load {}", path.display()))
    }

    /// Parse configuration text; relative paths resolve against `base_dir`.
    ///
    /// # Errors
    /// Returns an error for malformed TOML or invalid values.
    pub fn from_toml(contents: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Self = toml::from_str(contents).context("failed to parse configuration")?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.view
            .default_filter
            .parse::<StatusFilter>()
            .context("invalid view.default_filter")?;
        parse_utc_offset(&self.view.utc_offset)?;
        Ok(())
    }

    /// Point the in-memory backend at a different seed file.
    ///
    /// A relative `seed` resolves against `cwd`, not the configuration directory.
    #[must_use]
    pub fn with_seed(mut self, seed: PathBuf, cwd: &Path) -> Self {
        self.data.seed = Some(if seed.is_absolute() {
            seed
        } else {
            cwd.join(seed)
        });
        self
    }

    /// Seed file path, resolved against the configuration directory.
    #[must_use]
    pub fn seed_path(&self) -> Option<PathBuf> {
        let seed = self.data.seed.as_ref()?;
        if seed.is_absolute() {
            Some(seed.clone())
        } else {
            Some(self.base_dir.join(seed))
        }
    }

    /// Simulated per-call latency.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.data.latency_ms)
    }

    /// Initial status filter.
    #[must_use]
    pub fn status_filter(&self) -> StatusFilter {
        self.view.default_filter.parse().unwrap_or_default()
    }

    /// Calendar-day offset.
    #[must_use]
    pub fn utc_offset(&self) -> UtcOffset {
        parse_utc_offset(&self.view.utc_offset).unwrap_or(UtcOffset::UTC)
    }
}

/// Parse an offset written as `±HH:MM`.
///
/// # Errors
/// Returns an error when the text is not a valid offset.
pub fn parse_utc_offset(text: &str) -> Result<UtcOffset> {
    UtcOffset::parse(
        text.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("invalid utc_offset '{text}' (expected ±HH:MM)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::macros::offset;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap_or_else(|err| panic!("must create temp dir: {err}"));
        let config = AppConfig::load(dir.path().join(CONFIG_FILE))
            .unwrap_or_else(|err| panic!("missing config must load: {err}"));
        assert_eq!(config.status_filter(), StatusFilter::All);
        assert_eq!(config.utc_offset(), UtcOffset::UTC);
        assert_eq!(config.latency(), Duration::ZERO);
        assert!(config.seed_path().is_none());
    }

    #[test]
    fn loads_values_and_resolves_relative_seed() {
        let dir = tempdir().unwrap_or_else(|err| panic!("must create temp dir: {err}"));
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[data]
seed = "tasks.json"
latency_ms = 300

[view]
default_filter = "pending"
utc_offset = "+09:00"
"#,
        )
        .unwrap_or_else(|err| panic!("must write config: {err}"));

        let config = AppConfig::load(&path).unwrap_or_else(|err| panic!("config must load: {err}"));
        assert_eq!(config.seed_path(), Some(dir.path().join("tasks.json")));
        assert_eq!(config.latency(), Duration::from_millis(300));
        assert_eq!(config.status_filter(), StatusFilter::Pending);
        assert_eq!(config.utc_offset(), offset!(+9));
    }

    #[test]
    fn seed_override_replaces_configured_seed() {
        let config = AppConfig::from_toml("[data]\nseed = \"a.json\"\n", "/etc/taskdeck")
            .unwrap_or_else(|err| panic!("config must parse: {err}"))
            .with_seed(PathBuf::from("/tmp/b.json"), Path::new("/home/user"));
        assert_eq!(config.seed_path(), Some(PathBuf::from("/tmp/b.json")));
    }

    #[test]
    fn relative_seed_override_resolves_against_working_directory() {
        let config_dir = tempdir().unwrap_or_else(|err| panic!("must create temp dir: {err}"));
        let work_dir = tempdir().unwrap_or_else(|err| panic!("must create temp dir: {err}"));
        let path = config_dir.path().join(CONFIG_FILE);
        fs::write(&path, "[data]\nseed = \"configured.json\"\n")
            .unwrap_or_else(|err| panic!("must write config: {err}"));

        let config = AppConfig::load(&path)
            .unwrap_or_else(|err| panic!("config must load: {err}"))
            .with_seed(PathBuf::from("tasks.json"), work_dir.path());
        assert_eq!(config.seed_path(), Some(work_dir.path().join("tasks.json")));
    }

    #[test]
    fn rejects_unknown_filter() {
        let Err(err) = AppConfig::from_toml("[view]\ndefault_filter = \"someday\"\n", ".") else {
            panic!("unknown filter must be rejected");
        };
        assert!(format!("{err:#}").contains("default_filter"));
    }

    #[test]
    fn rejects_malformed_offset() {
        let Err(err) = AppConfig::from_toml("[view]\nutc_offset = \"9\"\n", ".") else {
            panic!("bad offset must be rejected");
        };
        assert!(format!("{err:#}").contains("utc_offset"));
    }

    #[test]
    fn parses_negative_offsets() {
        let parsed = parse_utc_offset("-05:30").unwrap_or_else(|err| panic!("must parse: {err}"));
        assert_eq!(parsed, offset!(-5:30));
    }
}
