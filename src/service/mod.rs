//! Host object model: the service document and its placeholder population.
//!
//! A service document declares the service, free-form `custom` settings and a
//! set of functions, each optionally carrying `environment` and `tags` maps:
//!
//! ```yaml
//! service: my-service
//! custom:
//!   exportGitVariables: true
//!   gitVariablesTagsWhitelist: [GIT_BRANCH]
//!   release: ${git:describe}
//! functions:
//!   hello:
//!     handler: handler.hello
//!     environment:
//!       GIT_BRANCH: pinned   # kept; exported values never overwrite
//! ```
//!
//! [`populate_document`] replaces `${source:address}` placeholders through the
//! resolver chain; [`HostResolver`] is the base of that chain.

mod host_resolver;
mod model;
mod placeholder;
mod settings;

pub use host_resolver::HostResolver;
pub use model::{FunctionDefinition, ServiceConfig, ServiceFormat};
pub use placeholder::{PlaceholderScanner, populate_document, populate_pass};
pub use settings::GitVariablesSettings;
