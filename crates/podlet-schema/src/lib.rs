//! Podlet Schema
//!
//! Value types shared by every podlet component.
//!
//! # Core Concepts
//!
//! - [`validation`]: name, version, pathname and URI rules
//! - [`CssAsset`] / [`JsAsset`]: normalized asset declarations with a [`Scope`]
//! - [`Context`]: flat request context and its `podium-*` header codec
//! - [`Manifest`]: the document a layout reads from a podlet
//!
//! # Example
//!
//! ```rust
//! use podlet_schema::{CssInput, Scope};
//!
//! let asset = CssInput::new("/css/main.css")
//!     .with_scope(Scope::Content)
//!     .prefixed()
//!     .normalize("/foo")
//!     .unwrap();
//!
//! assert_eq!(asset.value(), "/foo/css/main.css");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod asset;
mod context;
mod manifest;
mod path;
pub mod validation;

// Re-exports
pub use asset::{
    escape_attr, AssetBatch, CssAsset, CssInput, CssLike, JsAsset, JsData, JsDataInput, JsInput, JsLike,
    JsType, PartialJsData, Scope, Strategy,
};
pub use context::{keys, Context, HEADER_PREFIX};
pub use manifest::{Manifest, ManifestError};
pub use path::{pathname_builder, resolve_against, uri_is_relative};
pub use validation::ValidationError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
