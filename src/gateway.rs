//! Authenticated request gateway. One instance per identity domain, wrapping
//! every outbound call with the domain's bearer token and enforcing the
//! uniform 401 contract: invalidate the session, then surface the typed
//! [`Error::SessionExpired`] signal. The gateway never retries; retry policy
//! belongs to callers.

use crate::{
    config::Config,
    errors::{sanitize_body, Error, CONNECTIVITY_MESSAGE},
    session::{Domain, SessionController},
    APP_USER_AGENT,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

pub struct Gateway {
    domain: Domain,
    controller: Arc<SessionController>,
    base_url: String,
    http: Client,
}

impl Gateway {
    /// Builds a gateway for `domain` over a dedicated HTTP client carrying
    /// the crate user agent and the configured timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        config: &Config,
        domain: Domain,
        controller: Arc<SessionController>,
    ) -> reqwest::Result<Self> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            domain,
            controller,
            base_url: config.api_base_url.clone(),
            http,
        })
    }

    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// Starts a request against `path` with the domain's bearer token
    /// attached when a session is live. Without a session the request still
    /// goes out, unauthenticated, so callers may probe public-but-scoped
    /// endpoints. No content type is forced here: JSON helpers set one, raw
    /// and multipart bodies keep whatever the transport negotiates.
    #[must_use]
    pub fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let url = crate::config::join_url(&self.base_url, path);

        let request = self.http.request(method, url);
        match self.controller.token(self.domain) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a prepared request and applies the 401 contract.
    ///
    /// # Errors
    /// - [`Error::SessionExpired`] on HTTP 401, after the session has been
    ///   invalidated. Idempotent invalidation keeps concurrent in-flight
    ///   401s down to a single effective de-authentication.
    /// - [`Error::Network`] when no response reached the server; the message
    ///   is generic, transport details go to the logs.
    ///
    /// Any other status, success or not, is returned unaltered for the
    /// caller to interpret.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                debug!("Transport failure on {:?} gateway: {err}", self.domain);
                return Err(Error::Network(CONNECTIVITY_MESSAGE.to_string()));
            }
        };

        if response.status() == StatusCode::UNAUTHORIZED {
            self.controller.invalidate(self.domain);
            return Err(Error::SessionExpired);
        }

        Ok(response)
    }

    /// `GET path` through the gateway.
    ///
    /// # Errors
    /// See [`Gateway::execute`].
    pub async fn get(&self, path: &str) -> Result<Response, Error> {
        self.execute(self.builder(Method::GET, path)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    /// See [`Gateway::execute`].
    pub async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, Error> {
        self.execute(self.builder(Method::POST, path).json(body))
            .await
    }

    /// `POST path` with an empty body.
    ///
    /// # Errors
    /// See [`Gateway::execute`].
    pub async fn post_empty(&self, path: &str) -> Result<Response, Error> {
        self.execute(self.builder(Method::POST, path)).await
    }
}

/// Decodes a JSON response for a feature client: non-2xx statuses surface as
/// [`Error::Http`] with a sanitized body, shape mismatches as
/// [`Error::Parse`].
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            message: sanitize_body(body),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|err| Error::Parse(format!("Failed to decode response: {err}")))
}

/// Checks a response for success when no body is expected, surfacing non-2xx
/// statuses as [`Error::Http`] with a sanitized body.
pub(crate) async fn ensure_success(response: Response) -> Result<(), Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::Http {
        status: status.as_u16(),
        message: sanitize_body(body),
    })
}
