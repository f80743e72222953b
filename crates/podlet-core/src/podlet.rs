//! The podlet descriptor
//!
//! [`Podlet`] owns everything configured at startup: identity, routes,
//! assets, proxy targets and default context. Configuration happens through
//! `&mut self` methods before the podlet is shared; request handling through
//! [`Podlet::process`] and [`Podlet::render`] only reads it.

use crate::context::{base_context, ContextBuilder, ContextDeserializer, PodiumHeaderContext};
use crate::error::PodletError;
use crate::incoming::Incoming;
use crate::options::{PodletOptions, ProcessOptions, RouteOptions};
use crate::proxy::{LocalProxy, ProxyRegistry, ProxyService};
use crate::registry::AssetRegistry;
use crate::scope::classify;
use crate::telemetry;
use crate::template::{self, DocumentTemplate};
use podlet_schema::validation::{
    is_custom_element_name, validate_name, validate_pathname, validate_uri, validate_version,
};
use podlet_schema::{
    resolve_against, AssetBatch, Context, CssAsset, CssLike, JsAsset, JsLike, Manifest, Strategy,
};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// A podlet descriptor
pub struct Podlet {
    name: String,
    version: String,
    pathname: String,
    manifest: String,
    content: String,
    fallback: String,
    development: bool,
    use_shadow_dom: bool,
    context: ContextBuilder,
    assets: AssetRegistry,
    proxies: ProxyRegistry,
    proxy_service: Arc<dyn ProxyService>,
    deserializer: Arc<dyn ContextDeserializer>,
    view: Arc<dyn DocumentTemplate>,
}

impl Podlet {
    /// Create a podlet from options
    ///
    /// Routes are kept as configured and prefixed by the accessors. The proxy
    /// mounts at the podlet pathname unless the options say otherwise.
    ///
    /// # Errors
    /// Returns [`PodletError::Validation`] naming the first invalid field.
    pub fn new(options: PodletOptions) -> Result<Self, PodletError> {
        validate_name("name", &options.name)?;
        validate_version(&options.version)?;
        validate_pathname(&options.pathname)?;
        validate_uri("manifest", &options.manifest)?;
        validate_uri("content", &options.content)?;
        validate_uri("fallback", &options.fallback)?;

        let proxy_pathname = options
            .proxy
            .pathname
            .unwrap_or_else(|| options.pathname.clone());
        validate_uri("pathname", &proxy_pathname)?;
        validate_uri("prefix", &options.proxy.prefix)?;
        let proxy_service: Arc<dyn ProxyService> =
            Arc::new(LocalProxy::new(proxy_pathname, options.proxy.prefix));

        let base = base_context(
            &options.name,
            &options.pathname,
            proxy_service.pathname(),
            proxy_service.prefix(),
        );

        telemetry::record_version_info(&options.name, &options.version);
        tracing::info!(
            podlet = %options.name,
            version = %options.version,
            pathname = %options.pathname,
            development = options.development,
            "podlet created"
        );

        Ok(Self {
            name: options.name,
            version: options.version,
            pathname: options.pathname,
            manifest: options.manifest,
            content: options.content,
            fallback: options.fallback,
            development: options.development,
            use_shadow_dom: options.use_shadow_dom,
            context: ContextBuilder::new(base),
            assets: AssetRegistry::new(),
            proxies: ProxyRegistry::new(),
            proxy_service,
            deserializer: Arc::new(PodiumHeaderContext),
            view: Arc::new(template::document),
        })
    }

    /// Replace the proxy collaborator
    ///
    /// Recomputes the base context from the new mount. In development the
    /// current manifest is registered right away if targets exist.
    #[must_use]
    pub fn with_proxy_service(mut self, service: Arc<dyn ProxyService>) -> Self {
        self.context.rebase(base_context(
            &self.name,
            &self.pathname,
            service.pathname(),
            service.prefix(),
        ));
        if self.development && !self.proxies.is_empty() {
            service.register(&self.name, &self.to_manifest());
        }
        self.proxy_service = service;
        self
    }

    /// Replace how production requests carry their context
    #[must_use]
    pub fn with_context_deserializer(mut self, deserializer: Arc<dyn ContextDeserializer>) -> Self {
        self.deserializer = deserializer;
        self
    }

    /// Podlet name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Podlet version
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Mount path, never prefixed
    #[inline]
    #[must_use]
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Whether development mode is configured
    #[inline]
    #[must_use]
    pub fn development(&self) -> bool {
        self.development
    }

    /// Manifest route, prefixed with the pathname
    #[must_use]
    pub fn manifest(&self) -> String {
        self.manifest_with(RouteOptions::default())
    }

    /// Manifest route
    #[must_use]
    pub fn manifest_with(&self, options: RouteOptions) -> String {
        self.route(&self.manifest, options)
    }

    /// Content route, prefixed with the pathname
    #[must_use]
    pub fn content(&self) -> String {
        self.content_with(RouteOptions::default())
    }

    /// Content route
    #[must_use]
    pub fn content_with(&self, options: RouteOptions) -> String {
        self.route(&self.content, options)
    }

    /// Fallback route, prefixed with the pathname; empty when unset
    #[must_use]
    pub fn fallback(&self) -> String {
        self.fallback_with(RouteOptions::default())
    }

    /// Fallback route; empty when unset
    #[must_use]
    pub fn fallback_with(&self, options: RouteOptions) -> String {
        self.route(&self.fallback, options)
    }

    fn route(&self, route: &str, options: RouteOptions) -> String {
        if options.prefix {
            resolve_against(&self.pathname, route)
        } else {
            route.to_string()
        }
    }

    /// Register one or more CSS assets
    ///
    /// # Errors
    /// Returns [`PodletError::Validation`] for an invalid value; nothing from
    /// the failing batch is registered.
    pub fn css(&mut self, batch: impl Into<AssetBatch<CssLike>>) -> Result<(), PodletError> {
        self.assets.add_css(batch, &self.pathname)?;
        Ok(())
    }

    /// Register one or more JS assets
    ///
    /// # Errors
    /// Returns [`PodletError::Validation`] for an invalid value or incomplete
    /// `data` pair; nothing from the failing batch is registered.
    pub fn js(&mut self, batch: impl Into<AssetBatch<JsLike>>) -> Result<(), PodletError> {
        self.assets.add_js(batch, &self.pathname)?;
        Ok(())
    }

    /// Registered CSS assets in insertion order
    #[inline]
    #[must_use]
    pub fn css_assets(&self) -> &[CssAsset] {
        self.assets.css()
    }

    /// Registered JS assets in insertion order
    #[inline]
    #[must_use]
    pub fn js_assets(&self) -> &[JsAsset] {
        self.assets.js()
    }

    /// Register a proxy target and return it
    ///
    /// # Errors
    /// Returns [`PodletError::Validation`] for an invalid target or name and
    /// [`PodletError::ProxyCapacity`] when the limit is reached.
    pub fn proxy(&mut self, target: &str, name: &str) -> Result<String, PodletError> {
        self.proxies.register(name, target)?;
        tracing::debug!(podlet = %self.name, proxy = name, destination = target, "proxy target registered");

        if self.development {
            self.proxy_service.register(&self.name, &self.to_manifest());
        }
        Ok(target.to_string())
    }

    /// Registered proxy targets
    #[inline]
    #[must_use]
    pub fn proxies(&self) -> &ProxyRegistry {
        &self.proxies
    }

    /// Current default context
    #[must_use]
    pub fn defaults(&self) -> Context {
        self.context.defaults()
    }

    /// Replace the default context overrides and return the merged defaults
    pub fn set_defaults(&mut self, overrides: Context) -> Context {
        self.context.set_defaults(overrides)
    }

    /// Replace the development document template
    pub fn view(&mut self, template: impl DocumentTemplate + 'static) {
        self.view = Arc::new(template);
    }

    /// Render a fragment for a processed request
    ///
    /// With the shadow DOM wrapper enabled the fragment is wrapped first.
    /// Outside development the (wrapped) fragment is returned as is,
    /// otherwise the document template renders it.
    ///
    /// # Errors
    /// Returns [`PodletError::ShadowDomName`] if wrapping is enabled and the
    /// name is not a valid custom element name.
    pub fn render(
        &self,
        incoming: &Incoming,
        fragment: &str,
        args: &[&str],
    ) -> Result<String, PodletError> {
        let fragment = if self.use_shadow_dom {
            self.wrap_with_shadow_dom(fragment)?
        } else {
            fragment.to_string()
        };

        if !incoming.development {
            return Ok(fragment);
        }
        Ok(self.view.render(incoming, &fragment, args))
    }

    /// Wrap a fragment in a declarative shadow root
    ///
    /// Only assets with the shadow DOM strategy are embedded.
    ///
    /// # Errors
    /// Returns [`PodletError::ShadowDomName`] if the podlet name is not a
    /// valid custom element name.
    pub fn wrap_with_shadow_dom(&self, fragment: &str) -> Result<String, PodletError> {
        if !is_custom_element_name(&self.name) {
            return Err(PodletError::ShadowDomName {
                name: self.name.clone(),
            });
        }

        let styles: Vec<String> = self
            .assets
            .css_with_strategy(Strategy::ShadowDom)
            .map(CssAsset::to_html)
            .collect();
        let scripts: Vec<String> = self
            .assets
            .js_with_strategy(Strategy::ShadowDom)
            .map(JsAsset::to_html)
            .collect();

        Ok(template::shadow_dom(&self.name, fragment, &styles, &scripts))
    }

    /// Snapshot of the manifest document
    ///
    /// Routes are given as configured, unprefixed.
    #[must_use]
    pub fn to_manifest(&self) -> Manifest {
        Manifest {
            name: self.name.clone(),
            version: self.version.clone(),
            content: self.content.clone(),
            fallback: self.fallback.clone(),
            css: self.assets.css().to_vec(),
            js: self.assets.js().to_vec(),
            proxy: self.proxies.targets().clone(),
        }
    }

    /// Process an inbound request
    ///
    /// Tags the request with the podlet name and the assets for its scope,
    /// decides whether development behavior applies, resolves the context and,
    /// in development, lets the proxy collaborator take the request over. The
    /// adapter must stop route handling when `proxy` is set on the result.
    ///
    /// # Errors
    /// Returns [`PodletError::Proxy`] when the proxy collaborator fails.
    pub async fn process(
        &self,
        incoming: Incoming,
        options: ProcessOptions,
    ) -> Result<Incoming, PodletError> {
        let span = tracing::debug_span!(
            "podlet.process",
            podlet = %self.name,
            path = incoming.pathname()
        );
        let started = Instant::now();

        let incoming = self.run(incoming, options).instrument(span).await?;

        telemetry::record_process(
            &self.name,
            incoming.development,
            incoming.proxy,
            started.elapsed(),
        );
        Ok(incoming)
    }

    async fn run(
        &self,
        mut incoming: Incoming,
        options: ProcessOptions,
    ) -> Result<Incoming, PodletError> {
        incoming.name.clone_from(&self.name);

        let fallback = self.fallback();
        let scope = classify(incoming.pathname(), &self.content(), Some(fallback.as_str()));
        incoming.css = self.assets.css_for(scope);
        incoming.js = self.assets.js_for(scope);
        tracing::debug!(%scope, css = incoming.css.len(), js = incoming.js.len(), "request tagged");

        incoming.development = !incoming.is_from_layout() && self.development;

        incoming.context = if incoming.development {
            self.context.for_request(&incoming.origin())
        } else {
            self.deserializer.deserialize(incoming.headers())
        };

        if incoming.development && options.proxy {
            self.proxy_service.process(&mut incoming).await?;
            if incoming.proxy {
                tracing::debug!(destination = ?incoming.proxy_target, "request taken over by proxy");
            }
        }

        Ok(incoming)
    }
}

impl fmt::Debug for Podlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Podlet")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("pathname", &self.pathname)
            .field("manifest", &self.manifest)
            .field("content", &self.content)
            .field("fallback", &self.fallback)
            .field("development", &self.development)
            .field("use_shadow_dom", &self.use_shadow_dom)
            .field("assets", &self.assets)
            .field("proxies", &self.proxies)
            .field("proxy_service", &self.proxy_service)
            .finish_non_exhaustive()
    }
}

impl Serialize for Podlet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_manifest().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use podlet_schema::{keys, CssInput, Scope};

    fn podlet(development: bool) -> Podlet {
        Podlet::new(
            PodletOptions::new("foo", "1.0.0", "/")
                .with_content("/content")
                .with_fallback("/fallback")
                .with_development(development),
        )
        .unwrap()
    }

    #[test]
    fn construct_rejects_invalid_fields() {
        let err = Podlet::new(PodletOptions::new("foo bar", "1", "/")).unwrap_err();
        assert!(err.to_string().contains("\"name\""));
        assert!(err.to_string().contains("foo bar"));

        assert!(Podlet::new(PodletOptions::new("foo", "", "/")).is_err());
        assert!(Podlet::new(PodletOptions::new("foo", "1", "")).is_err());
        assert!(Podlet::new(PodletOptions::new("foo", "1", "/").with_content("/æ / ø")).is_err());
    }

    #[test]
    fn routes_prefix_with_pathname() {
        let podlet = Podlet::new(
            PodletOptions::new("foo", "1", "/bar")
                .with_content("/content")
                .with_fallback("https://cdn.example.com/fallback"),
        )
        .unwrap();
        assert_eq!(podlet.content(), "/bar/content");
        assert_eq!(podlet.content_with(RouteOptions::unprefixed()), "/content");
        assert_eq!(podlet.manifest(), "/bar/manifest.json");
        assert_eq!(podlet.fallback(), "https://cdn.example.com/fallback");
        assert_eq!(podlet.pathname(), "/bar");
    }

    #[test]
    fn debug_omits_view() {
        let text = format!("{:?}", podlet(false));
        assert!(text.starts_with("Podlet"));
        assert!(text.contains("\"foo\""));
    }

    #[tokio::test]
    async fn process_tags_and_filters() {
        let mut podlet = podlet(false);
        podlet
            .css(vec![
                CssInput::new("/content.css").with_scope(Scope::Content),
                CssInput::new("/fallback.css").with_scope(Scope::Fallback),
                CssInput::new("/all.css"),
            ])
            .unwrap();

        let incoming = Incoming::parse("http://localhost/fallback", HeaderMap::new()).unwrap();
        let incoming = podlet.process(incoming, ProcessOptions::default()).await.unwrap();

        assert_eq!(incoming.name, "foo");
        let values: Vec<_> = incoming.css.iter().map(CssAsset::value).collect();
        assert_eq!(values, ["/fallback.css", "/all.css"]);
    }

    #[tokio::test]
    async fn development_context_uses_request_origin() {
        let podlet = podlet(true);
        let incoming = Incoming::parse("http://localhost:7100/content", HeaderMap::new()).unwrap();
        let incoming = podlet.process(incoming, ProcessOptions::default()).await.unwrap();

        assert!(incoming.development);
        assert_eq!(
            incoming.context.get(keys::MOUNT_ORIGIN),
            Some("http://localhost:7100")
        );
    }

    #[test]
    fn shadow_dom_requires_custom_element_name() {
        let err = podlet(false).wrap_with_shadow_dom("<p>x</p>").unwrap_err();
        assert!(matches!(err, PodletError::ShadowDomName { .. }));
    }
}
