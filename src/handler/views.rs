//! View rendering module
//!
//! Templates are rendered through the [`ViewRenderer`] capability. The
//! bundled [`TemplateRegistry`] compiles every template below a base
//! directory at startup, so rendering never touches the file system.

use crate::handler::errors::ErrorTags;
use minijinja::{AutoEscape, Environment};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Values exposed to a template
pub type ViewLocals = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("no view renderer configured")]
    Unavailable,

    #[error("view not found: {0}")]
    NotFound(String),

    #[error("failed to render view '{path}': {source}")]
    Render {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to load views from '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

impl ErrorTags for ViewError {
    fn name(&self) -> Option<&str> {
        Some(match self {
            Self::Unavailable => "ViewsUnavailable",
            Self::NotFound(_) => "ViewNotFound",
            Self::Render { .. } => "ViewRenderError",
            Self::Load { .. } | Self::Template { .. } => "ViewLoadError",
        })
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Renders a template path with locals into HTML
pub trait ViewRenderer: Send + Sync {
    fn render(&self, path: &str, locals: &ViewLocals) -> Result<String, ViewError>;
}

/// Precompiled templates keyed by their path relative to the views directory
#[derive(Debug)]
pub struct TemplateRegistry {
    env: Environment<'static>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        Self { env }
    }

    /// Compile every file below `basedir`
    ///
    /// Each template is registered under its relative path and, when it has
    /// an extension, under the path without it: `pages/index.html` is
    /// reachable as `pages/index` too.
    pub fn from_dir(basedir: impl AsRef<Path>) -> Result<Self, ViewError> {
        let basedir = basedir.as_ref();
        let mut registry = Self::new();
        let mut pending = vec![basedir.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = fs::read_dir(&dir).map_err(|source| ViewError::Load {
                path: dir.display().to_string(),
                source,
            })?;

            for entry in entries {
                let path = entry
                    .map_err(|source| ViewError::Load {
                        path: dir.display().to_string(),
                        source,
                    })?
                    .path();

                if path.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Ok(relative) = path.strip_prefix(basedir) else {
                    continue;
                };
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let source = fs::read_to_string(&path).map_err(|source| ViewError::Load {
                    path: path.display().to_string(),
                    source,
                })?;

                if let Some((stem, _)) = name.rsplit_once('.') {
                    if !stem.is_empty() && !stem.ends_with('/') {
                        registry.add_template(stem.to_string(), source.clone())?;
                    }
                }
                registry.add_template(name, source)?;
            }
        }

        tracing::info!(
            basedir = %basedir.display(),
            templates = registry.len(),
            "Views loaded"
        );
        Ok(registry)
    }

    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), ViewError> {
        let name = name.into();
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|source| ViewError::Template { name, source })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.env.get_template(path).is_ok()
    }

    pub fn len(&self) -> usize {
        self.env.templates().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRenderer for TemplateRegistry {
    fn render(&self, path: &str, locals: &ViewLocals) -> Result<String, ViewError> {
        let template = self.env.get_template(path).map_err(|source| {
            if source.kind() == minijinja::ErrorKind::TemplateNotFound {
                ViewError::NotFound(path.to_string())
            } else {
                ViewError::Render {
                    path: path.to_string(),
                    source,
                }
            }
        })?;

        template.render(locals).map_err(|source| ViewError::Render {
            path: path.to_string(),
            source,
        })
    }
}
