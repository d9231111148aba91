//! Layered configuration loading with figment.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. Built-in defaults ([`HearsayConfig::default`])
//! 2. Programmatic configuration passed to [`ConfigLoader::merge`]
//! 3. The profile overlay next to the main file, e.g. `hearsay.production.toml`
//! 4. The main file, e.g. `hearsay.toml`
//! 5. `HEARSAY_*` environment variables, `__` separating nested keys
//!
//! ```text
//! HEARSAY_LOGGING__LEVEL=debug         → logging.level = "debug"
//! HEARSAY_SLACK__BOT_TOKEN=xoxb-...    → slack.bot_token = "xoxb-..."
//! HEARSAY_WEBHOOK__PORT=8080           → webhook.port = 8080
//! ```
//!
//! File formats are opt-in: `toml-config` enables `.toml`, `yaml-config`
//! enables `.yaml`/`.yml`. Without a file, the defaults are used.
//!
//! ```rust,ignore
//! use hearsay_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/hearsay.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::HearsayConfig;

const ENV_PREFIX: &str = "HEARSAY_";
const PROFILE_VAR: &str = "HEARSAY_PROFILE";

/// File stems searched in each directory, in order.
const FILE_STEMS: &[&str] = &["hearsay", "config"];

/// Configuration profile selecting the overlay file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `prod` and `dev` are accepted as short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `HEARSAY_PROFILE`, defaulting to [`Profile::Development`].
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration file format enabled at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    /// Enabled formats in search order.
    const ENABLED: &'static [FileFormat] = &[
        #[cfg(feature = "toml-config")]
        FileFormat::Toml,
        #[cfg(feature = "yaml-config")]
        FileFormat::Yaml,
    ];

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))
    }

    fn merge_into(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(figment::providers::Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(figment::providers::Yaml::file(path)),
        }
    }
}

/// Main file plus its optional profile overlay.
#[derive(Debug)]
struct ConfigFiles {
    format: FileFormat,
    main: PathBuf,
    overlay: Option<PathBuf>,
}

impl ConfigFiles {
    fn resolve(format: FileFormat, main: PathBuf, profile: &Profile) -> Self {
        let overlay = match (main.file_stem(), main.extension()) {
            (Some(stem), Some(ext)) => {
                let name = format!(
                    "{}.{}.{}",
                    stem.to_string_lossy(),
                    profile,
                    ext.to_string_lossy()
                );
                Some(main.with_file_name(name)).filter(|p| p.exists())
            }
            _ => None,
        };
        Self {
            format,
            main,
            overlay,
        }
    }

    fn merge_into(&self, mut figment: Figment) -> Figment {
        if let Some(overlay) = &self.overlay {
            debug!(path = %overlay.display(), "Loading profile overlay");
            figment = self.format.merge_into(figment, overlay);
        }
        info!(path = %self.main.display(), "Loading configuration file");
        self.format.merge_into(figment, &self.main)
    }
}

/// Builder for loading a [`HearsayConfig`] from layered sources.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader reading `HEARSAY_PROFILE` and the environment.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a directory to search for `hearsay.*` or `config.*`.
    ///
    /// With no search paths, the current directory and
    /// `<user config dir>/hearsay` are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join("hearsay")),
            None => self,
        }
    }

    /// Loads this file instead of searching; it must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Layers `config` over the built-in defaults.
    ///
    /// Files and environment variables still take precedence.
    pub fn merge(mut self, config: HearsayConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Merges every source and extracts the configuration.
    pub fn load(self) -> ConfigResult<HearsayConfig> {
        let files = self.locate_files()?;

        let mut figment = Figment::from(Serialized::defaults(HearsayConfig::default()))
            .merge(self.figment);

        match &files {
            Some(files) => figment = files.merge_into(figment),
            None => warn!(profile = %self.profile, "No configuration file found, using defaults"),
        }

        if self.load_env {
            figment = figment.merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["PROFILE"])
                    .split("__"),
            );
        }

        let config: HearsayConfig = figment.extract()?;

        debug!(
            profile = %self.profile,
            logging_level = %config.logging.level,
            webhook_addr = %config.webhook.bind_addr(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn locate_files(&self) -> ConfigResult<Option<ConfigFiles>> {
        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            let format = FileFormat::from_path(path)?;
            return Ok(Some(ConfigFiles::resolve(
                format,
                path.clone(),
                &self.profile,
            )));
        }

        for dir in self.effective_search_paths() {
            for stem in FILE_STEMS {
                for &format in FileFormat::ENABLED {
                    for ext in format.extensions() {
                        let main = dir.join(format!("{stem}.{ext}"));
                        if main.exists() {
                            return Ok(Some(ConfigFiles::resolve(format, main, &self.profile)));
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    fn effective_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("hearsay")))
            .collect()
    }
}

/// Loads configuration from the default search paths.
pub fn load_config() -> ConfigResult<HearsayConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<HearsayConfig> {
    ConfigLoader::new().file(path).load()
}
