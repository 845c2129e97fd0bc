//! ADT connection over blocking `reqwest`.

use adtstack_core::{AdtRequest, AdtResponse, ConnectionConfig, Transport, TransportError};
use http::Method;
use parking_lot::Mutex;
use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, warn};

/// Header carrying the CSRF token.
const CSRF_HEADER: &str = "x-csrf-token";

/// Path used to obtain a CSRF token.
const DISCOVERY_PATH: &str = "core/discovery";

/// A session with one ADT system.
///
/// Every request carries the `sap-client` and `sap-language` parameters.
/// Modifying requests additionally carry a CSRF token, fetched once per
/// session and refetched after the server rejects it.
#[derive(Debug)]
pub struct AdtConnection {
    config: ConnectionConfig,
    base_url: String,
    client: Client,
    csrf_token: Mutex<Option<String>>,
}

impl AdtConnection {
    /// Create a connection. No request is sent until the first `execute`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Config`] if the HTTP client cannot be built.
    pub fn new(config: ConnectionConfig) -> Result<Self, TransportError> {
        Self::with_client_builder(config, Client::builder())
    }

    fn with_client_builder(
        config: ConnectionConfig,
        builder: ClientBuilder,
    ) -> Result<Self, TransportError> {
        let client = builder
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(|e| TransportError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url(),
            config,
            client,
            csrf_token: Mutex::new(None),
        })
    }

    /// The configuration the connection was built from.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Absolute URL of an ADT path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Query parameters of `request`, after the logon parameters.
    fn query<'a>(&'a self, request: &'a AdtRequest) -> Vec<(&'a str, &'a str)> {
        let mut query = vec![
            ("sap-client", self.config.client.as_str()),
            ("sap-language", self.config.language.as_str()),
        ];
        query.extend(
            request
                .params()
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        query
    }

    fn csrf_token(&self) -> Result<String, TransportError> {
        let mut cached = self.csrf_token.lock();
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let discovery = AdtRequest::new(Method::GET, DISCOVERY_PATH);
        let url = self.url(DISCOVERY_PATH);
        let response = self
            .authenticated(&discovery, &url)
            .header(CSRF_HEADER, "Fetch")
            .send()
            .map_err(|e| request_error(&discovery, &url, e))?;
        let response = check_status(&discovery, &url, response)?;

        let token = response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| TransportError::Status {
                method: discovery.method().to_string(),
                url: url.clone(),
                status: response.status().as_u16(),
                body: "response carries no CSRF token".to_owned(),
            })?;

        debug!(url = %url, "fetched CSRF token");
        *cached = Some(token.clone());
        Ok(token)
    }

    fn authenticated(&self, request: &AdtRequest, url: &str) -> reqwest::blocking::RequestBuilder {
        let builder = self
            .client
            .request(request.method().clone(), url)
            .query(&self.query(request));
        if self.config.user.is_empty() {
            builder
        } else {
            builder.basic_auth(&self.config.user, Some(&self.config.password))
        }
    }
}

impl Transport for AdtConnection {
    fn execute(&self, request: &AdtRequest) -> Result<AdtResponse, TransportError> {
        let url = self.url(request.path());
        let mut builder = self.authenticated(request, &url);

        if let Some(accept) = request.accept_header() {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(content_type) = request.content_type_header() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if is_modifying(request.method()) {
            builder = builder.header(CSRF_HEADER, self.csrf_token()?);
        }
        if let Some(body) = request.body_text() {
            builder = builder.body(body.to_owned());
        }

        debug!(method = %request.method(), url = %url, "sending ADT request");
        let response = builder
            .send()
            .map_err(|e| request_error(request, &url, e))?;

        if response.status() == reqwest::StatusCode::FORBIDDEN && is_modifying(request.method()) {
            warn!(url = %url, "request forbidden, dropping cached CSRF token");
            *self.csrf_token.lock() = None;
        }

        let response = check_status(request, &url, response)?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| request_error(request, &url, e))?;

        Ok(AdtResponse { status, text })
    }
}

fn is_modifying(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn request_error(request: &AdtRequest, url: &str, source: reqwest::Error) -> TransportError {
    TransportError::Request {
        method: request.method().to_string(),
        url: url.to_owned(),
        source: Box::new(source),
    }
}

fn check_status(
    request: &AdtRequest,
    url: &str,
    response: Response,
) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(TransportError::Status {
        method: request.method().to_string(),
        url: url.to_owned(),
        status: status.as_u16(),
        body,
    })
}
