use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;

use url::Url;

use crate::config::{validate, ContainerConfig};
use crate::errors::ContainerError;
use crate::invocation::state::{InvocationState, RequestLine};
use crate::invocation::Invocation;

/// Collects the literal request data for one invocation.
///
/// Nothing is validated until [`InvocationBuilder::build`], which fails fast on
/// an unparseable method or a missing body so those mistakes never surface
/// halfway through a handler.
pub struct InvocationBuilder {
    method: String,
    url: Option<String>,
    scheme: String,
    host: String,
    port: u16,
    path: String,
    query: Option<String>,
    headers: HashMap<String, String>,
    body: Option<Box<dyn Read + Send>>,
}

impl std::fmt::Debug for InvocationBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationBuilder")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "Box<dyn Read>"))
            .finish()
    }
}

impl InvocationBuilder {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: None,
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 80,
            path: path.into(),
            query: None,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Takes scheme, host, port, path and query from an already parsed URL.
    pub fn from_url(method: impl Into<String>, url: &Url) -> Self {
        let mut builder = Self::new(method, url.path())
            .scheme(url.scheme())
            .url(&url[..url::Position::AfterPath]);

        if let Some(host) = url.host_str() {
            builder = builder.host(host);
        }
        if let Some(port) = url.port_or_known_default() {
            builder = builder.port(port);
        }
        if let Some(query) = url.query() {
            builder = builder.query(query);
        }
        builder
    }

    #[inline]
    fn map(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }

    /// Full request URL. Derived from the other parts when not set.
    pub fn url<S: Into<String>>(self, url: S) -> Self { self.map(|b| b.url = Some(url.into())) }
    pub fn scheme<S: Into<String>>(self, scheme: S) -> Self { self.map(|b| b.scheme = scheme.into()) }
    pub fn host<S: Into<String>>(self, host: S) -> Self { self.map(|b| b.host = host.into()) }
    pub fn port(self, port: u16) -> Self { self.map(|b| b.port = port) }
    pub fn query<S: Into<String>>(self, query: S) -> Self { self.map(|b| b.query = Some(query.into())) }

    pub fn header<K: Into<String>, V: Into<String>>(self, name: K, value: V) -> Self {
        self.map(|b| {
            b.headers.insert(name.into(), value.into());
        })
    }

    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.map(|b| {
            b.headers.extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        })
    }

    /// Request body stream. Read at most once by the handler.
    pub fn body<R: Read + Send + 'static>(self, body: R) -> Self {
        self.map(|b| b.body = Some(Box::new(body)))
    }

    pub fn body_bytes<B: Into<Vec<u8>>>(self, bytes: B) -> Self {
        self.body(Cursor::new(bytes.into()))
    }

    pub fn empty_body(self) -> Self {
        self.body(std::io::empty())
    }

    pub fn build(self, config: &ContainerConfig) -> Result<Invocation, ContainerError> {
        validate(config)?;
        let method = http::Method::from_bytes(self.method.as_bytes())
            .map_err(|_| ContainerError::InvalidMethod(self.method.clone()))?;
        let body = self.body.ok_or(ContainerError::MissingBody)?;

        let path = if self.path.starts_with('/') {
            self.path
        } else {
            format!("/{}", self.path)
        };
        let url = self
            .url
            .unwrap_or_else(|| compose_url(&self.scheme, &self.host, self.port, &path));

        let request = RequestLine {
            url,
            method,
            scheme: self.scheme,
            host: self.host,
            port: self.port,
            path,
            query: self.query,
            headers: self.headers,
        };

        let state = InvocationState::new(
            request,
            body,
            config.response_buffer_capacity,
            config.reported_buffer_size,
            config.default_error_message.clone(),
        );
        log::debug!(
            "Invocation[{}]: created for {} {}",
            state.id(),
            state.request().method,
            state.request().url
        );

        Ok(Invocation::from_state(Arc::new(state)))
    }
}

/// Request URL without the query string, leaving out the scheme's default port.
fn compose_url(scheme: &str, host: &str, port: u16, path: &str) -> String {
    let default_port = match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        _ => None,
    };

    // IPv6 literals need brackets in the authority
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_string()
    };

    if default_port == Some(port) {
        format!("{scheme}://{host}{path}")
    } else {
        format!("{scheme}://{host}:{port}{path}")
    }
}
