//! The transport collaborator contract.
//!
//! Endpoint wrappers never talk HTTP directly. They describe a request with
//! [`AdtRequest`] and hand it to a [`Transport`], which returns the response
//! text or fails with a [`TransportError`]. Failures are never retried here.

use std::sync::Arc;

use http::Method;

use crate::error::TransportError;

/// A single request against the ADT REST interface.
///
/// Paths are relative to the ADT root (`atc/runs`, not `/sap/bc/adt/atc/runs`).
///
/// # Examples
///
/// ```
/// use adtstack_core::AdtRequest;
/// use http::Method;
///
/// let request = AdtRequest::new(Method::POST, "atc/worklists")
///     .param("checkVariant", "DEFAULT")
///     .accept("text/plain");
///
/// assert_eq!(request.path(), "atc/worklists");
/// assert_eq!(request.accept_header().as_deref(), Some("text/plain"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdtRequest {
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    accept: Vec<String>,
    content_type: Option<String>,
    body: Option<String>,
}

impl AdtRequest {
    /// Create a request without parameters, headers, or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            accept: Vec::new(),
            content_type: None,
            body: None,
        }
    }

    /// Append a query parameter. Parameter order is preserved.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Append an accepted media type.
    #[must_use]
    pub fn accept(mut self, mime: impl Into<String>) -> Self {
        self.accept.push(mime.into());
        self
    }

    /// Set the body media type.
    #[must_use]
    pub fn content_type(mut self, mime: impl Into<String>) -> Self {
        self.content_type = Some(mime.into());
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the ADT root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Look up the first query parameter with the given name.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Accepted media types in insertion order.
    #[must_use]
    pub fn accepted(&self) -> &[String] {
        &self.accept
    }

    /// The `Accept` header value, or `None` when nothing was requested.
    #[must_use]
    pub fn accept_header(&self) -> Option<String> {
        if self.accept.is_empty() {
            None
        } else {
            Some(self.accept.join(", "))
        }
    }

    /// Body media type.
    #[must_use]
    pub fn content_type_header(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Request body.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// A successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdtResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded response body.
    pub text: String,
}

impl AdtResponse {
    /// Build a `200 OK` response with the given body.
    #[must_use]
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: 200,
            text: text.into(),
        }
    }
}

/// Executes [`AdtRequest`]s against a remote ADT service.
///
/// Implementations block until the response has been read completely.
pub trait Transport {
    /// Send the request and return the response body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on connection failures and non-success
    /// status codes.
    fn execute(&self, request: &AdtRequest) -> Result<AdtResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &AdtRequest) -> Result<AdtResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &AdtRequest) -> Result<AdtResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &AdtRequest) -> Result<AdtResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Transport for Echo {
        fn execute(&self, request: &AdtRequest) -> Result<AdtResponse, TransportError> {
            Ok(AdtResponse::ok(request.path()))
        }
    }

    #[test]
    fn test_should_keep_parameter_order() {
        let request = AdtRequest::new(Method::GET, "atc/worklists/1")
            .param("b", "2")
            .param("a", "1");

        assert_eq!(
            request.params(),
            &[
                ("b".to_owned(), "2".to_owned()),
                ("a".to_owned(), "1".to_owned())
            ]
        );
        assert_eq!(request.param_value("a"), Some("1"));
        assert_eq!(request.param_value("c"), None);
    }

    #[test]
    fn test_should_join_accepted_media_types() {
        let request = AdtRequest::new(Method::GET, "atc/customizing")
            .accept("application/xml")
            .accept("application/vnd.sap.atc.customizing-v1+xml");

        assert_eq!(
            request.accept_header().as_deref(),
            Some("application/xml, application/vnd.sap.atc.customizing-v1+xml")
        );
        assert!(AdtRequest::new(Method::GET, "x").accept_header().is_none());
    }

    #[test]
    fn test_should_delegate_through_smart_pointers() {
        let shared: Arc<dyn Transport> = Arc::new(Echo);
        let boxed: Box<dyn Transport> = Box::new(Echo);
        let request = AdtRequest::new(Method::GET, "discovery");

        assert_eq!(shared.execute(&request).expect("echo").text, "discovery");
        assert_eq!(boxed.execute(&request).expect("echo").text, "discovery");
        assert_eq!((&Echo).execute(&request).expect("echo").text, "discovery");
    }
}
