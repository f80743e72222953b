use indexmap::IndexMap;
use podlet_core::prelude::*;
use podlet_core::{LocalProxy, ProxyService, MAX_PROXY_TARGETS};
use podlet_schema::{keys, JsDataInput, Manifest, PartialJsData, ValidationError};
use podlet_test_utils::{
    incoming_for, layout_incoming_for, layout_incoming_with_context, test_dev_podlet,
    test_options, test_podlet, ProxyBehavior, RecordingProxy,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn values<T>(assets: &[T], value: impl Fn(&T) -> &str) -> Vec<String> {
    assets.iter().map(|a| value(a).to_string()).collect()
}

#[test]
fn construct_and_manifest_identity() {
    let podlet = test_podlet();
    let manifest = podlet.to_manifest();
    assert_eq!(manifest.name, "foo");
    assert_eq!(manifest.version, "1.0.0");
    assert_eq!(manifest.content, "/content");
    assert_eq!(manifest.fallback, "/fallback");
    assert!(manifest.proxy.is_empty());
}

#[test]
fn invalid_version_is_rejected() {
    let err = Podlet::new(PodletOptions::new("foo", "  ", "/")).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("version"));
}

#[test]
fn invalid_name_names_field_and_value() {
    for name in ["", "foo bar"] {
        let err = Podlet::new(PodletOptions::new(name, "1.0.0", "/")).unwrap_err();
        match err {
            PodletError::Validation(ValidationError::InvalidName { field, value }) => {
                assert_eq!(field, "name");
                assert_eq!(value, name);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn route_prefixing() {
    let podlet = Podlet::new(
        PodletOptions::new("foo", "1.0.0", "/foo")
            .with_content("/bar")
            .with_fallback("/fallback")
            .with_manifest("https://www.example.com/manifest.json"),
    )
    .unwrap();

    assert_eq!(podlet.content(), "/foo/bar");
    assert_eq!(podlet.content_with(RouteOptions::unprefixed()), "/bar");
    assert_eq!(podlet.fallback(), "/foo/fallback");
    assert_eq!(podlet.fallback_with(RouteOptions::unprefixed()), "/fallback");
    assert_eq!(podlet.manifest(), "https://www.example.com/manifest.json");
    assert_eq!(
        podlet.manifest_with(RouteOptions::unprefixed()),
        "https://www.example.com/manifest.json"
    );
    assert_eq!(podlet.pathname(), "/foo");
}

#[test]
fn unset_fallback_is_empty() {
    let podlet = Podlet::new(PodletOptions::new("foo", "1.0.0", "/foo")).unwrap();
    assert_eq!(podlet.fallback(), "");
}

#[test]
fn assets_keep_call_order() {
    let mut podlet = test_podlet();
    podlet.css(CssInput::new("/foo/bar")).unwrap();
    podlet.css(CssInput::new("/bar/foo")).unwrap();

    assert_eq!(
        values(podlet.css_assets(), |a| a.value()),
        ["/foo/bar", "/bar/foo"]
    );
}

#[test]
fn asset_with_space_is_rejected() {
    let mut podlet = test_podlet();
    let err = podlet.css(CssInput::new("/foo / bar")).unwrap_err();
    assert!(err.to_string().contains("/foo / bar"));
    assert!(podlet.css_assets().is_empty());

    assert!(podlet.js("/foo / bar").is_err());
    assert!(podlet.js_assets().is_empty());
}

#[test]
fn prefixed_assets_resolve_against_pathname() {
    let mut podlet = Podlet::new(PodletOptions::new("foo", "1.0.0", "/foo")).unwrap();
    podlet
        .css([CssInput::new("/a.css").prefixed(), CssInput::new("/b.css")])
        .unwrap();
    podlet
        .js(JsInput::new("https://cdn.example.com/a.js").prefixed())
        .unwrap();

    assert_eq!(
        values(podlet.css_assets(), |a| a.value()),
        ["/foo/a.css", "/b.css"]
    );
    assert_eq!(podlet.js_assets()[0].value(), "https://cdn.example.com/a.js");
}

#[test]
fn js_data_map_becomes_pairs() {
    let mut podlet = test_podlet();
    let mut data = IndexMap::new();
    data.insert("foo".to_string(), "bar".to_string());
    data.insert("baz".to_string(), "qux".to_string());
    podlet.js(JsInput::new("/a.js").with_data(data)).unwrap();

    let pairs: Vec<_> = podlet.js_assets()[0]
        .data()
        .iter()
        .map(|d| (d.key.as_str(), d.value.as_str()))
        .collect();
    assert_eq!(pairs, [("foo", "bar"), ("baz", "qux")]);
}

#[test]
fn js_data_pairs_must_be_complete() {
    let mut podlet = test_podlet();
    let data = JsDataInput::Pairs(vec![PartialJsData {
        key: Some("foo".to_string()),
        value: None,
    }]);
    let err = podlet.js(JsInput::new("/a.js").with_data(data)).unwrap_err();
    assert!(matches!(
        err,
        PodletError::Validation(ValidationError::InvalidJsData { index: 0 })
    ));
    assert!(podlet.js_assets().is_empty());
}

#[test]
fn defaults_replace_overrides() {
    let mut podlet = test_podlet();
    podlet.set_defaults(Context::new().with("foo", "bar"));

    let context = podlet.defaults();
    assert_eq!(context.get("foo"), Some("bar"));
    assert!(context.missing_required().is_empty());
    assert_eq!(podlet.defaults().get("foo"), Some("bar"));

    let replaced = podlet.set_defaults(Context::new().with(keys::LOCALE, "nb-NO"));
    assert_eq!(replaced.get("foo"), None);
    assert_eq!(replaced.get(keys::LOCALE), Some("nb-NO"));
}

#[test]
fn fifth_proxy_target_fails() {
    let mut podlet = test_podlet();
    for name in ["a", "b", "c", "d"] {
        assert_eq!(podlet.proxy("/api", name).unwrap(), "/api");
    }
    let err = podlet.proxy("/api", "e").unwrap_err();
    assert!(matches!(err, PodletError::ProxyCapacity { max: MAX_PROXY_TARGETS }));
    assert_eq!(podlet.proxies().len(), MAX_PROXY_TARGETS);
    assert_eq!(podlet.to_manifest().proxy.len(), MAX_PROXY_TARGETS);
}

#[test]
fn proxy_registration_notifies_in_development() {
    let recorder = Arc::new(RecordingProxy::new("/", "/podium-resource"));
    let mut podlet = test_dev_podlet().with_proxy_service(recorder.clone());
    podlet.proxy("/api", "api").unwrap();

    let registrations = recorder.registrations();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].0, "foo");
    assert_eq!(registrations[0].1.proxy.get("api").map(String::as_str), Some("/api"));
}

#[test]
fn proxy_registration_silent_in_production() {
    let recorder = Arc::new(RecordingProxy::new("/", "/podium-resource"));
    let mut podlet = test_podlet().with_proxy_service(recorder.clone());
    podlet.proxy("/api", "api").unwrap();
    assert!(recorder.registrations().is_empty());
}

#[test]
fn proxy_service_mount_feeds_public_pathname() {
    let recorder = Arc::new(RecordingProxy::new("/proxy", "/res"));
    let podlet = test_podlet().with_proxy_service(recorder);
    assert_eq!(podlet.defaults().get(keys::PUBLIC_PATHNAME), Some("/proxy/res/foo"));
}

fn scoped_podlet() -> Podlet {
    let mut podlet = test_podlet();
    podlet
        .css(vec![
            CssInput::new("/content.css").with_scope(Scope::Content),
            CssInput::new("/fallback.css").with_scope(Scope::Fallback),
            CssInput::new("/all.css"),
        ])
        .unwrap();
    podlet
        .js(vec![
            JsInput::new("/content.js").with_scope(Scope::Content),
            JsInput::new("/fallback.js").with_scope(Scope::Fallback),
            JsInput::new("/all.js").with_scope(Scope::All),
        ])
        .unwrap();
    podlet
}

#[tokio::test]
async fn fallback_request_filters_assets() {
    let podlet = scoped_podlet();
    let incoming = podlet
        .process(incoming_for("/fallback"), ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!(values(&incoming.css, |a| a.value()), ["/fallback.css", "/all.css"]);
    assert_eq!(values(&incoming.js, |a| a.value()), ["/fallback.js", "/all.js"]);
}

#[tokio::test]
async fn content_request_filters_assets() {
    let podlet = scoped_podlet();
    let incoming = podlet
        .process(incoming_for("/content/item/1"), ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!(values(&incoming.css, |a| a.value()), ["/content.css", "/all.css"]);
    assert_eq!(values(&incoming.js, |a| a.value()), ["/content.js", "/all.js"]);
}

#[tokio::test]
async fn other_request_gets_every_asset() {
    let podlet = scoped_podlet();
    let incoming = podlet
        .process(incoming_for("/elsewhere"), ProcessOptions::default())
        .await
        .unwrap();
    assert_eq!(incoming.css.len(), 3);
    assert_eq!(incoming.js.len(), 3);
}

#[tokio::test]
async fn layout_requests_are_never_development() {
    let podlet = test_dev_podlet();
    let incoming = podlet
        .process(layout_incoming_for("/content"), ProcessOptions::default())
        .await
        .unwrap();
    assert!(!incoming.development);

    let incoming = podlet
        .process(incoming_for("/content"), ProcessOptions::default())
        .await
        .unwrap();
    assert!(incoming.development);
}

#[tokio::test]
async fn production_context_comes_from_headers() {
    let mut podlet = test_podlet();
    podlet.set_defaults(Context::new().with(keys::LOCALE, "sv-SE"));
    let incoming = podlet
        .process(
            layout_incoming_with_context(
                "/content",
                &[("podium-locale", "nb-NO"), ("podium-device-type", "mobile")],
            ),
            ProcessOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(incoming.context.get(keys::LOCALE), Some("nb-NO"));
    assert_eq!(incoming.context.get(keys::DEVICE_TYPE), Some("mobile"));
    assert_eq!(incoming.context.get(keys::MOUNT_ORIGIN), None);
}

#[tokio::test]
async fn development_context_merges_defaults() {
    let mut podlet = test_dev_podlet();
    podlet.set_defaults(Context::new().with(keys::LOCALE, "sv-SE"));
    let incoming = podlet
        .process(incoming_for("/content"), ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!(incoming.context.get(keys::LOCALE), Some("sv-SE"));
    assert_eq!(
        incoming.context.get(keys::MOUNT_ORIGIN),
        Some("http://localhost:7100")
    );
    assert_eq!(incoming.context.get(keys::REQUESTED_BY), Some("foo"));
}

#[tokio::test]
async fn proxy_dispatch_only_in_development() {
    let recorder = Arc::new(
        RecordingProxy::new("/", "/podium-resource")
            .with_behavior(ProxyBehavior::TakeOver("http://api.local/x".to_string())),
    );
    let dev = test_dev_podlet().with_proxy_service(recorder.clone());
    let prod = test_podlet().with_proxy_service(recorder.clone());

    let incoming = dev
        .process(incoming_for("/podium-resource/foo/api"), ProcessOptions::default())
        .await
        .unwrap();
    assert!(incoming.proxy);
    assert_eq!(incoming.proxy_target.as_deref(), Some("http://api.local/x"));

    let incoming = dev
        .process(incoming_for("/content"), ProcessOptions::without_proxy())
        .await
        .unwrap();
    assert!(!incoming.proxy);

    let incoming = prod
        .process(incoming_for("/content"), ProcessOptions::default())
        .await
        .unwrap();
    assert!(!incoming.proxy);

    assert_eq!(recorder.processed(), ["/podium-resource/foo/api"]);
}

#[tokio::test]
async fn proxy_failure_propagates() {
    let recorder = Arc::new(
        RecordingProxy::new("/", "/podium-resource")
            .with_behavior(ProxyBehavior::Fail("connection refused".to_string())),
    );
    let podlet = test_dev_podlet().with_proxy_service(recorder);
    let err = podlet
        .process(incoming_for("/content"), ProcessOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_request_time());
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn local_proxy_end_to_end() {
    let mut podlet = test_dev_podlet();
    podlet.proxy("/api", "api").unwrap();

    let incoming = podlet
        .process(
            incoming_for("/podium-resource/foo/api/users?id=2"),
            ProcessOptions::default(),
        )
        .await
        .unwrap();
    assert!(incoming.proxy);
    assert_eq!(
        incoming.proxy_target.as_deref(),
        Some("http://localhost:7100/api/users?id=2")
    );
}

#[tokio::test]
async fn render_depends_on_mode() {
    let podlet = test_dev_podlet();

    let mut incoming = podlet
        .process(incoming_for("/content"), ProcessOptions::default())
        .await
        .unwrap();
    let html = podlet.render(&incoming, "<h1>x</h1>", &[]).unwrap();
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains("<h1>x</h1>"));

    incoming.development = false;
    assert_eq!(podlet.render(&incoming, "<h1>x</h1>", &[]).unwrap(), "<h1>x</h1>");
}

#[tokio::test]
async fn custom_view_replaces_document() {
    let mut podlet = test_dev_podlet();
    podlet.view(|incoming: &Incoming, fragment: &str, args: &[&str]| {
        format!("<div id=\"{}\">{fragment}{}</div>", incoming.name, args.join(""))
    });

    let incoming = podlet
        .process(incoming_for("/content"), ProcessOptions::default())
        .await
        .unwrap();
    assert_eq!(
        podlet.render(&incoming, "x", &["!"]).unwrap(),
        "<div id=\"foo\">x!</div>"
    );
}

#[tokio::test]
async fn shadow_dom_wraps_in_every_mode() {
    let mut podlet = Podlet::new(
        PodletOptions::new("my-podlet", "1.0.0", "/").with_shadow_dom(true),
    )
    .unwrap();
    podlet
        .css([
            CssInput::new("/shadow.css").with_strategy(Strategy::ShadowDom),
            CssInput::new("/page.css"),
        ])
        .unwrap();

    let incoming = podlet
        .process(incoming_for("/"), ProcessOptions::default())
        .await
        .unwrap();
    assert!(!incoming.development);

    let html = podlet.render(&incoming, "<p>x</p>", &[]).unwrap();
    assert!(html.starts_with("<my-podlet>"));
    assert!(html.contains("/shadow.css"));
    assert!(!html.contains("/page.css"));
    assert!(html.contains("<p>x</p>"));
}

#[test]
fn shadow_dom_rejects_plain_name() {
    let podlet = Podlet::new(test_options().with_shadow_dom(true)).unwrap();
    let incoming = incoming_for("/");
    let err = podlet.render(&incoming, "x", &[]).unwrap_err();
    assert!(matches!(err, PodletError::ShadowDomName { ref name } if name == "foo"));
}

#[test]
fn manifest_round_trip_matches_registry() {
    let mut podlet = test_podlet();
    podlet.css(["/a.css", "/b.css"]).unwrap();
    podlet
        .js(JsInput::new("/a.js").with_type(JsType::Module))
        .unwrap();
    podlet.proxy("https://api.example.com", "api").unwrap();

    let json = serde_json::to_string(&podlet).unwrap();
    let parsed = Manifest::from_json_str(&json).unwrap();

    assert_eq!(parsed, podlet.to_manifest());
    assert_eq!(
        values(&parsed.css, |a| a.value()),
        values(podlet.css_assets(), |a| a.value())
    );
    assert_eq!(parsed.js[0].type_(), JsType::Module);
    assert_eq!(serde_json::to_string(&podlet).unwrap(), json);
}

#[test]
fn typed_css_attributes_keep_manifest_parseable() {
    let mut podlet = test_podlet();
    podlet
        .css(
            CssInput::new("/a.css")
                .with_attribute("media", "screen, print")
                .with_attribute("data-theme", "dark"),
        )
        .unwrap();

    let json = serde_json::to_string(&podlet).unwrap();
    assert_eq!(json.matches("\"media\"").count(), 1);
    let parsed = Manifest::from_json_str(&json).unwrap();
    assert_eq!(parsed.css[0].media(), Some("screen, print"));
    assert_eq!(parsed, podlet.to_manifest());
}

#[test]
fn css_attribute_shadowing_scope_is_rejected() {
    let mut podlet = test_podlet();
    let err = podlet
        .css(CssInput::new("/a.css").with_attribute("scope", "content"))
        .unwrap_err();
    assert!(matches!(
        err,
        PodletError::Validation(ValidationError::ReservedAttribute { ref key }) if key == "scope"
    ));
    assert!(podlet.css_assets().is_empty());
    assert!(Manifest::from_json_str(&serde_json::to_string(&podlet).unwrap()).is_ok());
}

#[test]
fn empty_asset_value_is_rejected() {
    let mut podlet = test_podlet();
    let err = podlet.css("").unwrap_err();
    assert!(matches!(
        err,
        PodletError::Validation(ValidationError::MissingValue { field: "value" })
    ));
    assert!(podlet.js(JsInput::new("")).is_err());
    assert!(podlet.css_assets().is_empty());
    assert!(podlet.js_assets().is_empty());
}

#[test]
fn uppercase_name_is_rejected() {
    let err = Podlet::new(PodletOptions::new("Foo", "1.0.0", "/")).unwrap_err();
    assert!(matches!(
        err,
        PodletError::Validation(ValidationError::InvalidName { field: "name", .. })
    ));
}

#[tokio::test]
async fn concurrent_requests_share_configuration() {
    let podlet = Arc::new(scoped_podlet());
    let paths = ["/content", "/fallback", "/elsewhere", "/content/a"];

    let results = futures::future::join_all(paths.iter().map(|path| {
        let podlet = Arc::clone(&podlet);
        async move {
            podlet
                .process(incoming_for(path), ProcessOptions::default())
                .await
                .unwrap()
        }
    }))
    .await;

    let css: Vec<usize> = results.iter().map(|incoming| incoming.css.len()).collect();
    assert_eq!(css, [2, 2, 3, 2]);
}

#[test]
fn default_proxy_mounts_at_pathname() {
    let podlet = Podlet::new(PodletOptions::new("foo", "1.0.0", "/bar")).unwrap();
    assert_eq!(
        podlet.defaults().get(keys::PUBLIC_PATHNAME),
        Some("/bar/podium-resource/foo")
    );

    let proxy = LocalProxy::new("/bar", "/podium-resource");
    assert_eq!(proxy.pathname(), "/bar");
}

proptest! {
    #[test]
    fn valid_identity_round_trips(
        name in "[a-z][a-zA-Z0-9]{0,15}",
        version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
    ) {
        let podlet = Podlet::new(PodletOptions::new(name.clone(), version.clone(), "/")).unwrap();
        let manifest = podlet.to_manifest();
        prop_assert_eq!(manifest.name, name);
        prop_assert_eq!(manifest.version, version);
    }

    #[test]
    fn names_with_spaces_fail(left in "[a-z]{1,8}", right in "[a-z]{1,8}") {
        let name = format!("{left} {right}");
        let result = Podlet::new(PodletOptions::new(name, "1.0.0", "/"));
        prop_assert!(result.is_err());
    }
}
