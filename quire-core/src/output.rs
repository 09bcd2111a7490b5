use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Assets are copied to this directory under the output root.
pub const ASSETS_DIR: &str = "assets";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to scan assets in {}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Failed to copy {} to {}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    debug!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Remove `path` if it exists and recreate it empty.
pub fn reset_dir(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)
}

/// Copy `assets_dir` verbatim to `<output_dir>/assets`.
///
/// Returns the number of files copied. A missing assets directory copies
/// nothing and creates nothing.
pub fn copy_assets(assets_dir: &Path, output_dir: &Path) -> Result<usize, AssetError> {
    if !assets_dir.is_dir() {
        debug!(dir = %assets_dir.display(), "No assets directory");
        return Ok(0);
    }

    let target_root = output_dir.join(ASSETS_DIR);
    let mut copied = 0;

    for entry in WalkDir::new(assets_dir).sort_by_file_name() {
        let entry = entry.map_err(|source| AssetError::Walk {
            path: assets_dir.to_path_buf(),
            source,
        })?;
        let from = entry.path();
        let relative = from.strip_prefix(assets_dir).unwrap_or(from);
        let to = target_root.join(relative);

        let result = if from.is_dir() {
            fs::create_dir_all(&to)
        } else {
            copy_file(from, &to)
        };
        result.map_err(|source| AssetError::Copy {
            from: from.to_path_buf(),
            to: to.clone(),
            source,
        })?;

        if from.is_file() {
            copied += 1;
        }
    }

    debug!(count = copied, to = %target_root.display(), "Copied assets");
    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).map(|_| ())
}
