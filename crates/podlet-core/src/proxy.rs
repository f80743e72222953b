//! Proxy registration and the proxy collaborator contract
//!
//! A podlet may expose up to [`MAX_PROXY_TARGETS`] backends through the
//! layout's proxy. The registrations end up in the manifest; in development
//! the podlet also hands them to a [`ProxyService`] so requests under the
//! proxy prefix can be recognized locally.

use crate::error::{PodletError, ProxyError};
use crate::incoming::Incoming;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use podlet_schema::validation::{validate_name, validate_uri};
use podlet_schema::{pathname_builder, uri_is_relative, Manifest};

/// Maximum number of proxy targets per podlet
pub const MAX_PROXY_TARGETS: usize = 4;

/// Bounded name → target map, insertion ordered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRegistry {
    targets: IndexMap<String, String>,
}

impl ProxyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target under `name`
    ///
    /// Re-registering an existing name overwrites its target in place, also
    /// when the registry is full.
    ///
    /// # Errors
    /// Returns [`PodletError::Validation`] for an invalid name or target and
    /// [`PodletError::ProxyCapacity`] when a new name would exceed the limit.
    pub fn register(&mut self, name: &str, target: &str) -> Result<(), PodletError> {
        validate_uri("target", target)?;
        validate_name("name", name)?;

        if !self.targets.contains_key(name) && self.targets.len() >= MAX_PROXY_TARGETS {
            return Err(PodletError::ProxyCapacity {
                max: MAX_PROXY_TARGETS,
            });
        }

        self.targets.insert(name.to_string(), target.to_string());
        Ok(())
    }

    /// Target registered under `name`
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.targets.get(name).map(String::as_str)
    }

    /// All registrations in insertion order
    #[inline]
    #[must_use]
    pub fn targets(&self) -> &IndexMap<String, String> {
        &self.targets
    }

    /// Number of registrations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// The proxy collaborator
///
/// Implementations decide whether a request belongs to a registered proxy
/// target. Forwarding the request is up to the implementation or the adapter.
#[async_trait]
pub trait ProxyService: Send + Sync + std::fmt::Debug {
    /// Mount path of the proxy
    fn pathname(&self) -> &str;

    /// Path segment proxied routes live under
    fn prefix(&self) -> &str;

    /// Record the current manifest of podlet `name`
    fn register(&self, name: &str, manifest: &Manifest);

    /// Inspect a development-mode request
    ///
    /// Sets `incoming.proxy` when the request was taken over.
    async fn process(&self, incoming: &mut Incoming) -> Result<(), ProxyError>;
}

/// In-process proxy that resolves proxied paths to their targets
///
/// Matches `{pathname}{prefix}/{podlet}/{proxy name}/{rest}` against the
/// registered manifests and stores the resolved destination on the request.
/// Relative targets resolve against the request origin.
#[derive(Debug)]
pub struct LocalProxy {
    pathname: String,
    prefix: String,
    manifests: RwLock<IndexMap<String, Manifest>>,
}

impl LocalProxy {
    /// Create a proxy mounted at `pathname` under `prefix`
    #[must_use]
    pub fn new(pathname: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            prefix: prefix.into(),
            manifests: RwLock::new(IndexMap::new()),
        }
    }

    /// Names of podlets with registered manifests
    #[must_use]
    pub fn registered(&self) -> Vec<String> {
        self.manifests.read().keys().cloned().collect()
    }

    /// Resolve a request path to its proxy destination
    fn resolve(&self, path: &str, origin: &str) -> Option<String> {
        let mount = pathname_builder([self.pathname.as_str(), self.prefix.as_str()]);
        let rest = path.strip_prefix(mount.trim_end_matches('/'))?;
        let rest = rest.strip_prefix('/')?;

        let mut segments = rest.splitn(3, '/');
        let podlet = segments.next().filter(|s| !s.is_empty())?;
        let name = segments.next().filter(|s| !s.is_empty())?;
        let remainder = segments.next().unwrap_or("");

        let manifests = self.manifests.read();
        let target = manifests.get(podlet)?.proxy.get(name)?;

        let destination = if uri_is_relative(target) {
            format!("{origin}{}", pathname_builder([target.as_str(), remainder]))
        } else {
            pathname_builder([target.as_str(), remainder])
        };
        Some(destination)
    }
}

#[async_trait]
impl ProxyService for LocalProxy {
    fn pathname(&self) -> &str {
        &self.pathname
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn register(&self, name: &str, manifest: &Manifest) {
        tracing::debug!(podlet = name, targets = manifest.proxy.len(), "proxy registered manifest");
        self.manifests
            .write()
            .insert(name.to_string(), manifest.clone());
    }

    async fn process(&self, incoming: &mut Incoming) -> Result<(), ProxyError> {
        let Some(mut destination) = self.resolve(incoming.pathname(), &incoming.origin()) else {
            return Ok(());
        };
        if let Some(query) = incoming.url().query() {
            destination.push('?');
            destination.push_str(query);
        }
        url::Url::parse(&destination).map_err(|e| ProxyError::InvalidTarget(e.to_string()))?;

        tracing::debug!(path = incoming.pathname(), %destination, "request matched proxy target");
        incoming.proxy = true;
        incoming.proxy_target = Some(destination);
        Ok(())
    }
}
