//! Podlet Core
//!
//! Server-side helper for podlets, independently deployed page fragments
//! composed into a page by a layout:
//! - Validates the podlet's identity and routes
//! - Keeps the ordered registry of CSS and JS assets
//! - Builds the request context in development, reads it in production
//! - Registers up to four proxy targets
//! - Tags every request with its assets and mode in [`Podlet::process`]
//! - Serializes the manifest document
//!
//! Framework adapters build an [`Incoming`] per request, call
//! [`Podlet::process`] and answer with [`Podlet::render`].
//!
//! # Example
//!
//! ```rust
//! use podlet_core::{Incoming, Podlet, PodletOptions, ProcessOptions};
//! use podlet_schema::CssInput;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut podlet = Podlet::new(
//!     PodletOptions::new("header", "1.0.0", "/header").with_content("/"),
//! )?;
//! podlet.css(CssInput::new("/css/header.css"))?;
//!
//! let incoming = Incoming::parse("http://localhost:7100/header/", Default::default())?;
//! let incoming = podlet.process(incoming, ProcessOptions::default()).await?;
//! let html = podlet.render(&incoming, "<header>hi</header>", &[])?;
//!
//! assert_eq!(html, "<header>hi</header>");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod context;
pub mod error;
pub mod incoming;
pub mod options;
pub mod podlet;
pub mod proxy;
pub mod registry;
pub mod scope;
pub mod telemetry;
pub mod template;

// Re-exports for convenience
pub use context::{base_context, merge_for_request, ContextBuilder, ContextDeserializer, PodiumHeaderContext};
pub use error::{PodletError, ProxyError};
pub use incoming::{Incoming, LAYOUT_USER_AGENT};
pub use options::{PodletOptions, ProcessOptions, ProxyOptions, RouteOptions};
pub use podlet::Podlet;
pub use proxy::{LocalProxy, ProxyRegistry, ProxyService, MAX_PROXY_TARGETS};
pub use registry::AssetRegistry;
pub use scope::classify;
pub use template::{document, DocumentTemplate, SHADOW_DOM_POLYFILL};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building a podlet
    pub use crate::{
        DocumentTemplate, Incoming, Podlet, PodletError, PodletOptions, ProcessOptions,
        ProxyOptions, RouteOptions,
    };
    pub use podlet_schema::{Context, CssInput, JsInput, JsType, Scope, Strategy};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
