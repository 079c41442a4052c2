//! Response handler module
//!
//! Everything above the codec: error mapping, static assets, view rendering
//! and the [`Responder`] facade tying them to one configuration.

pub mod errors;
pub mod nonce;
pub mod resolver;
pub mod responder;
pub mod static_files;
pub mod views;

pub use errors::{handle, ErrorHandlerTable, ErrorKey, ErrorTags, TaggedError};
pub use nonce::{NoncePolicy, NonceSizeError, NonceSource, RandomNonce};
pub use resolver::DirectoryResolver;
pub use responder::{Responder, ResponderConfig};
pub use static_files::{AssetResolver, ResolveError, StaticFileHandler, StaticFileMetadata};
pub use views::{TemplateRegistry, ViewError, ViewLocals, ViewRenderer};
