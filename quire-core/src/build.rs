use std::path::{Path, PathBuf};

use tracing::info;

use crate::artifacts::{ArtifactError, effective_base_url, write_artifacts};
use crate::config::{BuildPaths, ConfigError, SiteConfig};
use crate::loader::{LoadError, PostLoader};
use crate::output::{AssetError, copy_assets, reset_dir};
use crate::renderer::{RenderError, SiteRenderer};
use crate::template::{TemplateError, TemplateRenderer};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(
        "Refusing to reset output directory {}: it contains {}",
        output.display(),
        protected.display()
    )]
    UnsafeOutputDir { output: PathBuf, protected: PathBuf },
    #[error("Failed to reset output directory {}", path.display())]
    ResetOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub posts: usize,
    /// Every page written, index first.
    pub routes: Vec<String>,
    pub assets: usize,
}

/// Run a full build: the output directory is wiped and regenerated from the
/// source tree, templates, assets and config.
///
/// Any failure aborts the build. Once the output directory has been reset a
/// failure leaves it partially populated.
pub fn build_site(paths: &BuildPaths) -> Result<BuildReport, BuildError> {
    let config = SiteConfig::read(&paths.config)?;
    let site = config.site_meta();
    info!(config = %paths.config.display(), title = %site.site_title, "Loaded config");

    ensure_safe_output(paths)?;

    let templates = TemplateRenderer::new(paths.templates_dir())?;
    let renderer = SiteRenderer::new(&templates, &site, &paths.output)?;

    reset_dir(&paths.output).map_err(|source| BuildError::ResetOutput {
        path: paths.output.clone(),
        source,
    })?;

    let posts = PostLoader::new(&paths.source).load()?;
    let routes = renderer.render_all(&posts)?;
    let assets = copy_assets(&paths.assets_dir(), &paths.output)?;

    let base_url = effective_base_url(site.base_url.as_deref());
    write_artifacts(&paths.output, base_url, &routes)?;

    info!(
        posts = posts.len(),
        pages = routes.len(),
        assets,
        out = %paths.output.display(),
        "Build complete"
    );

    Ok(BuildReport {
        output_dir: paths.output.clone(),
        posts: posts.len(),
        routes,
        assets,
    })
}

/// The output directory gets deleted, so it must not hold any project input.
fn ensure_safe_output(paths: &BuildPaths) -> Result<(), BuildError> {
    let output = normalize(&paths.output);
    let protected = [
        paths.root.clone(),
        paths.source.clone(),
        paths.templates_dir(),
        paths.assets_dir(),
        paths.config.clone(),
    ];

    for path in protected {
        if normalize(&path).starts_with(&output) {
            return Err(BuildError::UnsafeOutputDir {
                output: paths.output.clone(),
                protected: path,
            });
        }
    }

    Ok(())
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
