//! Context building
//!
//! In development the podlet synthesizes its own request context from a base
//! computed at construction plus caller overrides. In production the layout
//! sends the context along with the request and it is deserialized instead.

use http::HeaderMap;
use podlet_schema::{keys, pathname_builder, Context};

/// Compute the base context of a podlet
///
/// `publicPathname` joins the proxy mount pathname, the proxy prefix and the
/// podlet name, in that order.
#[must_use]
pub fn base_context(name: &str, pathname: &str, proxy_pathname: &str, proxy_prefix: &str) -> Context {
    Context::new()
        .with(keys::DEBUG, "false")
        .with(keys::LOCALE, "en-US")
        .with(keys::DEVICE_TYPE, "desktop")
        .with(keys::REQUESTED_BY, name)
        .with(keys::MOUNT_ORIGIN, "")
        .with(keys::MOUNT_PATHNAME, pathname)
        .with(
            keys::PUBLIC_PATHNAME,
            pathname_builder([proxy_pathname, proxy_prefix, name]),
        )
}

/// Effective context of one development-mode request
///
/// The request origin replaces the empty base `mountOrigin`; overrides win
/// over both.
#[must_use]
pub fn merge_for_request(base: &Context, overrides: &Context, origin: &str) -> Context {
    let mut context = base.clone();
    context.insert(keys::MOUNT_ORIGIN, origin);
    context.overlay(overrides)
}

/// Base context plus the caller's default overrides
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    base: Context,
    overrides: Context,
}

impl ContextBuilder {
    /// Create a builder around a base context
    #[inline]
    #[must_use]
    pub fn new(base: Context) -> Self {
        Self {
            base,
            overrides: Context::new(),
        }
    }

    /// The base context
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Context {
        &self.base
    }

    /// Replace the base, keeping overrides
    pub(crate) fn rebase(&mut self, base: Context) {
        self.base = base;
    }

    /// Base merged with the current overrides
    #[must_use]
    pub fn defaults(&self) -> Context {
        self.base.overlay(&self.overrides)
    }

    /// Replace the overrides wholesale and return the merged defaults
    pub fn set_defaults(&mut self, overrides: Context) -> Context {
        self.overrides = overrides;
        self.defaults()
    }

    /// Effective context for a development-mode request from `origin`
    #[must_use]
    pub fn for_request(&self, origin: &str) -> Context {
        merge_for_request(&self.base, &self.overrides, origin)
    }
}

/// Reads the layout-supplied context from an inbound request
pub trait ContextDeserializer: Send + Sync + std::fmt::Debug {
    /// Deserialize the context carried by `headers`
    fn deserialize(&self, headers: &HeaderMap) -> Context;
}

/// Default deserializer for `podium-*` request headers
#[derive(Debug, Clone, Copy, Default)]
pub struct PodiumHeaderContext;

impl ContextDeserializer for PodiumHeaderContext {
    fn deserialize(&self, headers: &HeaderMap) -> Context {
        Context::from_headers(headers)
    }
}
