use clap::ArgMatches;
use quire_core::BuildPaths;
use quire_core::config::{DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR};
use std::path::{Path, PathBuf};

/// Paths as given on the command line, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArgs {
    pub source: PathBuf,
    pub output: PathBuf,
    pub config: PathBuf,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

impl BuildArgs {
    pub fn from_matches(args: &ArgMatches) -> Self {
        let defaults = Self::default();
        let get = |name: &str, fallback: PathBuf| {
            args.get_one::<String>(name)
                .map(PathBuf::from)
                .unwrap_or(fallback)
        };

        Self {
            source: get("src", defaults.source),
            output: get("out", defaults.output),
            config: get("config", defaults.config),
        }
    }

    /// Resolve every path against the project root found from `cwd`.
    pub fn resolve(&self, cwd: &Path) -> BuildPaths {
        let root = find_project_root(cwd, &self.config);
        BuildPaths::new(root, &self.source, &self.output, &self.config)
    }
}

/// The project root is the directory the config file lives in.
///
/// An absolute config path gives its parent directory. A relative one is
/// looked up from `cwd` upwards; the first ancestor containing it wins. When
/// nothing matches, `cwd` is used and loading the config reports it missing.
pub fn find_project_root(cwd: &Path, config: &Path) -> PathBuf {
    if config.is_absolute() {
        return config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());
    }

    cwd.ancestors()
        .find(|dir| dir.join(config).is_file())
        .unwrap_or(cwd)
        .to_path_buf()
}
