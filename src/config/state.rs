// Application state module
// Built once at startup and shared read-only between connections

use std::sync::Arc;

use super::types::Config;
use super::ConfigError;
use crate::handler::resolver::DirectoryResolver;
use crate::handler::responder::{Responder, ResponderConfig};
use crate::handler::static_files::StaticFileHandler;
use crate::handler::views::TemplateRegistry;
use crate::http::cache::CachingPolicy;

/// Application state
pub struct AppState {
    pub config: Config,
    pub responder: Responder,
    /// `None` when no static base directory is configured
    pub statics: Option<StaticFileHandler<DirectoryResolver>>,
}

impl AppState {
    /// Build the responder, template registry and static handler
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let responses = &config.responses;
        let mut responder = Responder::new(ResponderConfig {
            handlers: responses.handler_table()?,
            default_headers: responses.default_headers(),
            locals: config.views.locals.clone(),
            nonce: responses.nonce,
        });

        if let Some(basedir) = &config.views.basedir {
            responder = responder.with_views(Arc::new(TemplateRegistry::from_dir(basedir)?));
        }

        let statics = match &config.statics.basedir {
            Some(basedir) => {
                let policy = CachingPolicy::with_headers(
                    config.statics.etag,
                    config.statics.headers.iter().map(|h| (h.name.clone(), h.value.clone())),
                );
                Some(StaticFileHandler::new(DirectoryResolver::new(basedir)?, policy))
            }
            None => None,
        };

        Ok(Self {
            config: config.clone(),
            responder,
            statics,
        })
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::load_from("/definitely/not/here/config").unwrap()
    }

    #[test]
    fn test_minimal_state() {
        let state = AppState::from_config(&base_config()).unwrap();
        assert!(state.statics.is_none());
        assert!(state.responder.config().handlers.is_none());
    }

    #[test]
    fn test_state_with_directories() {
        let views = tempfile::tempdir().unwrap();
        std::fs::write(views.path().join("index.html"), "<html></html>").unwrap();
        let statics = tempfile::tempdir().unwrap();

        let mut cfg = base_config();
        cfg.views.basedir = Some(views.path().display().to_string());
        cfg.statics.basedir = Some(statics.path().display().to_string());
        cfg.statics.etag = false;

        let state = AppState::from_config(&cfg).unwrap();
        let handler = state.statics.as_ref().unwrap();
        assert!(!handler.policy().with_etag);
        assert_eq!(state.responder.render("index", None).status_code, 200);
    }

    #[test]
    fn test_missing_static_dir_is_an_error() {
        let mut cfg = base_config();
        cfg.statics.basedir = Some("/definitely/not/here".to_string());
        assert!(matches!(
            AppState::from_config(&cfg),
            Err(ConfigError::Statics(_))
        ));
    }

    #[test]
    fn test_missing_views_dir_is_an_error() {
        let mut cfg = base_config();
        cfg.views.basedir = Some("/definitely/not/here".to_string());
        assert!(matches!(
            AppState::from_config(&cfg),
            Err(ConfigError::Views(_))
        ));
    }
}
