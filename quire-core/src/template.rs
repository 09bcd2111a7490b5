use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use tracing::debug;

use crate::output::write_file;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Templates directory not found: {}", .0.display())]
    MissingDir(PathBuf),
    #[error("Template '{0}' not found")]
    Missing(String),
    #[error("Template error")]
    Tera(#[from] tera::Error),
    #[error("Failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Named templates loaded from a directory.
///
/// Templates ending in `.html`, `.htm` or `.xml` are auto-escaped.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new<P: AsRef<Path>>(templates_dir: P) -> Result<Self, TemplateError> {
        let dir = templates_dir.as_ref();
        if !dir.is_dir() {
            return Err(TemplateError::MissingDir(dir.to_path_buf()));
        }

        let glob = dir.join("**").join("*");
        let tera = Tera::new(&glob.to_string_lossy())?;
        debug!(
            dir = %dir.display(),
            count = tera.get_template_names().count(),
            "Loaded templates"
        );

        Ok(Self { tera })
    }

    /// Wrap an already configured engine, e.g. one built from raw templates.
    pub fn from_tera(tera: Tera) -> Self {
        Self { tera }
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|loaded| loaded == name)
    }

    /// Fail unless every named template was loaded.
    pub fn require(&self, names: &[&str]) -> Result<(), TemplateError> {
        match names.iter().find(|name| !self.has_template(name)) {
            Some(missing) => Err(TemplateError::Missing((*missing).to_string())),
            None => Ok(()),
        }
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(self.tera.render(template, context)?)
    }

    /// Render a template and write it to `output_path`, creating parent
    /// directories and replacing any existing file.
    pub fn render_to_file(
        &self,
        template: &str,
        context: &Context,
        output_path: &Path,
    ) -> Result<(), TemplateError> {
        let rendered = self.render(template, context)?;

        write_file(output_path, &rendered).map_err(|source| TemplateError::Io {
            path: output_path.to_path_buf(),
            source,
        })
    }
}
