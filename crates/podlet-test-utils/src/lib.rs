//! Testing utilities for the podlet workspace
//!
//! Shared fixtures and a recording proxy collaborator.

#![allow(missing_docs)]

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, USER_AGENT};
use parking_lot::Mutex;
use podlet_core::{Incoming, Podlet, PodletOptions, ProxyError, ProxyService};
use podlet_schema::Manifest;

/// What [`RecordingProxy::process`] does with a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProxyBehavior {
    /// Leave the request alone
    #[default]
    PassThrough,
    /// Mark every request as taken over, pointing at the given target
    TakeOver(String),
    /// Fail every request
    Fail(String),
}

/// Proxy collaborator that records what it is handed
#[derive(Debug, Default)]
pub struct RecordingProxy {
    pathname: String,
    prefix: String,
    behavior: ProxyBehavior,
    registrations: Mutex<Vec<(String, Manifest)>>,
    processed: Mutex<Vec<String>>,
}

impl RecordingProxy {
    pub fn new(pathname: &str, prefix: &str) -> Self {
        Self {
            pathname: pathname.to_string(),
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    pub fn with_behavior(mut self, behavior: ProxyBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// `(podlet name, manifest)` per `register` call
    pub fn registrations(&self) -> Vec<(String, Manifest)> {
        self.registrations.lock().clone()
    }

    /// Request paths passed to `process`
    pub fn processed(&self) -> Vec<String> {
        self.processed.lock().clone()
    }
}

#[async_trait]
impl ProxyService for RecordingProxy {
    fn pathname(&self) -> &str {
        &self.pathname
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn register(&self, name: &str, manifest: &Manifest) {
        self.registrations
            .lock()
            .push((name.to_string(), manifest.clone()));
    }

    async fn process(&self, incoming: &mut Incoming) -> Result<(), ProxyError> {
        self.processed.lock().push(incoming.pathname().to_string());
        match &self.behavior {
            ProxyBehavior::PassThrough => Ok(()),
            ProxyBehavior::TakeOver(target) => {
                incoming.proxy = true;
                incoming.proxy_target = Some(target.clone());
                Ok(())
            }
            ProxyBehavior::Fail(reason) => Err(ProxyError::Unreachable(reason.clone())),
        }
    }
}

pub fn test_options() -> PodletOptions {
    PodletOptions::new("foo", "1.0.0", "/")
        .with_content("/content")
        .with_fallback("/fallback")
}

pub fn test_podlet() -> Podlet {
    Podlet::new(test_options()).unwrap()
}

pub fn test_dev_podlet() -> Podlet {
    Podlet::new(test_options().with_development(true)).unwrap()
}

/// Request from a browser to `path` on `http://localhost:7100`
pub fn incoming_for(path: &str) -> Incoming {
    Incoming::parse(&format!("http://localhost:7100{path}"), HeaderMap::new()).unwrap()
}

/// Request from the layout's client to `path`
pub fn layout_incoming_for(path: &str) -> Incoming {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("@podium/client 5.1.0"));
    Incoming::parse(&format!("http://localhost:7100{path}"), headers).unwrap()
}

/// Layout request carrying `podium-*` context headers
pub fn layout_incoming_with_context(path: &str, context: &[(&'static str, &'static str)]) -> Incoming {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("@podium/client 5.1.0"));
    for (name, value) in context {
        headers.insert(*name, HeaderValue::from_static(value));
    }
    Incoming::parse(&format!("http://localhost:7100{path}"), headers).unwrap()
}
