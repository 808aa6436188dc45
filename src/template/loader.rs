//! Template loader module.
//!
//! Reads page templates from the configured directory.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Result, TemplateContext, TemplateEngine, TemplateError};

/// Loads templates by file name from a base directory.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    base_path: PathBuf,
}

impl TemplateLoader {
    /// Create a new template loader rooted at `base_path`.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn template_path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        if name.is_empty()
            || relative.is_absolute()
            || relative
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(TemplateError::NotFound(format!(
                "Invalid template name '{name}'"
            )));
        }
        Ok(self.base_path.join(relative))
    }

    /// Load a template by file name (e.g. `mail_draft.html`).
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.template_path(name)?;

        if path.is_file() {
            fs::read_to_string(&path).map_err(|e| {
                TemplateError::Render(format!("Failed to read template '{name}': {e}"))
            })
        } else {
            Err(TemplateError::NotFound(format!(
                "Template '{name}' not found at {path:?}"
            )))
        }
    }

    /// Load and render a template.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let content = self.load(name)?;
        TemplateEngine::render_string(&content, context)
    }

    /// Check if a template exists.
    pub fn has_template(&self, name: &str) -> bool {
        self.template_path(name).is_ok_and(|p| p.is_file())
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
