//! Captured path parameters.
//!
//! A successful match yields a fresh [`Params`] map. The dispatcher attaches
//! it to the request extensions under a private key type, so only the
//! accessors below can read it back.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::Request;

/// Parameter name to captured segment text for one match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured value for `name`, if the matched route bound it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl<'n, 'v> FromIterator<(&'n str, &'v str)> for Params {
    fn from_iter<I: IntoIterator<Item = (&'n str, &'v str)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Extension key. Private so unrelated code cannot read or overwrite it.
#[derive(Clone)]
struct RouteParams(Params);

/// Attach match parameters to a request, replacing earlier ones.
pub(crate) fn attach(req: &mut Request<Body>, params: Params) {
    req.extensions_mut().insert(RouteParams(params));
}

/// All parameters captured for this request, or `None` if it was never matched.
pub fn params(req: &Request<Body>) -> Option<&Params> {
    req.extensions().get::<RouteParams>().map(|p| &p.0)
}

/// One captured parameter. Empty when the request was not matched or the
/// route never bound `name`.
pub fn param<'r>(req: &'r Request<Body>, name: &str) -> &'r str {
    params(req).and_then(|p| p.get(name)).unwrap_or("")
}
