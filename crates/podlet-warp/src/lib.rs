//! Podlet Warp
//!
//! Serves a [`podlet_core::Podlet`] through warp:
//! - [`filter::incoming`] builds and processes the per-request state
//! - [`reply`] attaches `Link` and `podlet-version` headers and renders
//! - [`routes`] wires the manifest, content and fallback routes together
//!
//! # Example
//!
//! ```rust,ignore
//! use podlet_core::{Podlet, PodletOptions};
//! use podlet_warp::{routes, Pages};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let podlet = Arc::new(Podlet::new(PodletOptions::new("header", "1.0.0", "/"))?);
//! let pages = Pages { content: "<header>Hello</header>".into(), fallback: String::new() };
//!
//! warp::serve(routes(podlet, pages)).run(([127, 0, 0, 1], 7100)).await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod filter;
pub mod reply;

pub use config::{DevConfig, Pages, ProxyEntry};
pub use error::{AdapterError, PodletRejection};

use http::{Response, StatusCode};
use podlet_core::{Incoming, Podlet};
use podlet_schema::Scope;
use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::Filter;

/// Answer a processed request with the configured pages
///
/// Requests the proxy took over are answered by [`reply::proxy`]; the
/// content and fallback routes get their fragment through
/// [`reply::podium_send`]; anything else is not found.
///
/// # Errors
/// Returns the adapter error if rendering or header encoding fails.
pub fn dispatch(
    podlet: &Podlet,
    pages: &Pages,
    incoming: &Incoming,
) -> Result<Response<String>, AdapterError> {
    if incoming.proxy {
        return reply::proxy(podlet, incoming);
    }

    let path = incoming.pathname();
    let fallback = podlet.fallback();
    if !fallback.is_empty() && path == fallback {
        return reply::podium_send(podlet, incoming, &pages.fallback, &[]);
    }
    if podlet_core::classify(path, &podlet.content(), None) == Scope::Content {
        return reply::podium_send(podlet, incoming, &pages.content, &[]);
    }

    let mut response = reply::status(StatusCode::NOT_FOUND, "Not Found");
    reply::decorate(&mut response, podlet, incoming)?;
    Ok(response)
}

/// All routes of a podlet, with errors recovered into responses
pub fn routes(podlet: Arc<Podlet>, pages: Pages) -> BoxedFilter<(Response<String>,)> {
    let pages = Arc::new(pages);
    let handler = {
        let podlet = Arc::clone(&podlet);
        warp::get()
            .and(filter::incoming(Arc::clone(&podlet)))
            .and_then(move |incoming: Incoming| {
                let podlet = Arc::clone(&podlet);
                let pages = Arc::clone(&pages);
                async move {
                    dispatch(&podlet, &pages, &incoming).map_err(PodletRejection::reject)
                }
            })
    };

    filter::manifest(podlet)
        .or(handler)
        .unify()
        .recover(reply::recover)
        .unify()
        .boxed()
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

