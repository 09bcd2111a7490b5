use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCE_DIR: &str = "content";
pub const DEFAULT_OUTPUT_DIR: &str = "site";
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
pub const DEFAULT_SITE_TITLE: &str = "My Blog";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML in config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Raw site configuration as written in `config.yml`.
///
/// Every key is optional; unknown keys are ignored so a config file can carry
/// settings meant for other tools.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    pub site_title: Option<String>,
    pub base_url: Option<String>,
    pub site_description: Option<String>,
}

impl SiteConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a YAML document. An empty document yields the defaults.
    pub fn from_yaml_str(data: &str) -> Result<Self, serde_yaml::Error> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: serde_yaml::Value = serde_yaml::from_str(data)?;
        if value.is_null() {
            return Ok(Self::default());
        }

        serde_yaml::from_value(value)
    }

    pub fn site_meta(&self) -> SiteMeta {
        SiteMeta {
            site_title: self
                .site_title
                .clone()
                .unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
            site_description: self.site_description.clone(),
            base_url: self
                .base_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }
}

/// Site-wide values handed to templates and artifact generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMeta {
    pub site_title: String,
    pub site_description: Option<String>,
    /// `None` when the config leaves `base_url` unset or blank.
    pub base_url: Option<String>,
}

/// Every filesystem location a build touches, already resolved against the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub root: PathBuf,
    pub source: PathBuf,
    pub output: PathBuf,
    pub config: PathBuf,
}

impl BuildPaths {
    pub fn new<R, S, O, C>(root: R, source: S, output: O, config: C) -> Self
    where
        R: AsRef<Path>,
        S: AsRef<Path>,
        O: AsRef<Path>,
        C: AsRef<Path>,
    {
        let root = root.as_ref().to_path_buf();
        Self {
            source: resolve_path(source, &root),
            output: resolve_path(output, &root),
            config: resolve_path(config, &root),
            root,
        }
    }

    /// Project layout with the default `content`, `site` and `config.yml`.
    pub fn with_defaults<R: AsRef<Path>>(root: R) -> Self {
        Self::new(root, DEFAULT_SOURCE_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_CONFIG_FILE)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }
}

/// Absolute paths pass through; relative ones are joined onto `root`.
pub fn resolve_path<P: AsRef<Path>>(path: P, root: &Path) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
