//! Document rendering
//!
//! In development a podlet is viewed without a layout, so rendered fragments
//! are wrapped in a full HTML document. The wrapper is pluggable through
//! [`DocumentTemplate`]; [`document`] is the default.

use crate::incoming::Incoming;
use podlet_schema::{escape_attr, keys, Strategy};

/// Declarative shadow DOM bootstrap for browsers without native support
pub const SHADOW_DOM_POLYFILL: &str = include_str!("../assets/dsd-polyfill.js");

/// Renders a fragment into a full document
///
/// Implemented for every `Fn(&Incoming, &str, &[&str]) -> String`.
pub trait DocumentTemplate: Send + Sync {
    /// Render `fragment` for `incoming`; `args` are passed through from
    /// [`crate::Podlet::render`]
    fn render(&self, incoming: &Incoming, fragment: &str, args: &[&str]) -> String;
}

impl<F> DocumentTemplate for F
where
    F: Fn(&Incoming, &str, &[&str]) -> String + Send + Sync,
{
    fn render(&self, incoming: &Incoming, fragment: &str, args: &[&str]) -> String {
        self(incoming, fragment, args)
    }
}

/// Default development document
///
/// Uses the context locale as document language and the podlet name as
/// title. Scoped assets go into `<head>`, except scripts loading after
/// interactive or lazily, which close the body. `args[0]`, when given, is
/// extra markup for `<head>`.
#[must_use]
pub fn document(incoming: &Incoming, fragment: &str, args: &[&str]) -> String {
    let locale = incoming.context.get(keys::LOCALE).unwrap_or("en-US");
    let head_extra = args.first().copied().unwrap_or("");

    let styles: Vec<String> = incoming
        .css
        .iter()
        .filter(|css| css.strategy() != Some(Strategy::ShadowDom))
        .map(|css| css.to_html())
        .collect();

    let (late, early): (Vec<_>, Vec<_>) = incoming
        .js
        .iter()
        .filter(|js| js.strategy() != Some(Strategy::ShadowDom))
        .partition(|js| {
            matches!(
                js.strategy(),
                Some(Strategy::AfterInteractive | Strategy::Lazy)
            )
        });
    let early: Vec<String> = early.into_iter().map(|js| js.to_html()).collect();
    let late: Vec<String> = late.into_iter().map(|js| js.to_html()).collect();

    format!(
        "<!doctype html>
<html lang=\"{lang}\">
    <head>
        <meta charset=\"utf-8\">
        <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
        {styles}
        {early}
        <title>{title}</title>
        {head_extra}
    </head>
    <body>
        {fragment}
        {late}
    </body>
</html>",
        lang = escape_attr(locale),
        styles = styles.join("\n        "),
        early = early.join("\n        "),
        title = escape_attr(&incoming.name),
        late = late.join("\n        "),
    )
}

/// Wrap a fragment in a custom element with a declarative shadow root
///
/// `styles` and `scripts` are embedded inside the shadow root around the
/// fragment. The bootstrap script follows the element.
#[must_use]
pub fn shadow_dom(tag: &str, fragment: &str, styles: &[String], scripts: &[String]) -> String {
    format!(
        "<{tag}>
    <template shadowrootmode=\"open\">
        {styles}
        {fragment}
        {scripts}
    </template>
</{tag}>
<script>{SHADOW_DOM_POLYFILL}</script>",
        styles = styles.join("\n        "),
        scripts = scripts.join("\n        "),
    )
}
