//! REST client for the portal backend, with the request/response policy
//! applied to every call.
//!
//! DESIGN
//! ======
//! The interceptor is stateless: the bearer token is read from the
//! [`TokenStore`] when each request is built, and a `401` on a session-bound
//! request is reported through the [`InvalidationHub`] instead of clearing
//! storage or navigating here. The report is skipped when the credential the
//! request carried is no longer the stored one.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx statuses map onto [`ApiError`]; a `422` keeps its body so forms
//! can show per-field messages.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, ValidationErrors, extract_message};
use super::events::{InvalidationHub, InvalidationReason, SessionInvalidated};
use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use super::types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, ProfileResponse, ProfileUpdate,
    UserRecord,
};
use crate::session::token_store::TokenStore;

const LOGIN_PATH: &str = "/auth/login";
const LOGOUT_PATH: &str = "/auth/logout";
const PROFILE_PATH: &str = "/profile";
const CHANGE_PASSWORD_PATH: &str = "/change-password";

/// Where the bearer credential of a request comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    /// Whatever the token store holds when the request is built.
    Stored,
    /// A token captured earlier, e.g. for the logout call after local teardown.
    Explicit(String),
}

/// One API call before interceptor policy is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub credential: Credential,
    /// Whether a `401` on this request means the current session expired.
    pub session_bound: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            credential: Credential::Stored,
            session_bound: true,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if `body` cannot be represented as JSON.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    /// A `401` on this request is an ordinary error, not a session expiry.
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.session_bound = false;
        self
    }
}

struct ClientInner {
    base_url: String,
    transport: Rc<dyn Transport>,
    tokens: TokenStore,
    events: InvalidationHub,
}

/// Shared API client. Clones share transport, token store and subscribers.
#[derive(Clone)]
pub struct ApiClient {
    inner: Rc<ClientInner>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: Rc<dyn Transport>, tokens: TokenStore) -> Self {
        Self {
            inner: Rc::new(ClientInner {
                base_url: base_url.into().trim_end_matches('/').to_owned(),
                transport,
                tokens,
                events: InvalidationHub::new(),
            }),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Invalidation events emitted on `401`.
    #[must_use]
    pub fn events(&self) -> &InvalidationHub {
        &self.inner.events
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// The bearer credential `request` would carry right now.
    fn bearer(&self, request: &ApiRequest) -> Option<String> {
        match &request.credential {
            Credential::Stored => self.inner.tokens.token(),
            Credential::Explicit(token) => Some(token.clone()).filter(|t| !t.is_empty()),
        }
    }

    /// Request phase: resolve URL, JSON headers and the bearer credential.
    fn prepare(&self, request: &ApiRequest, bearer: Option<&str>) -> HttpRequest {
        let mut headers = vec![("Accept".to_owned(), "application/json".to_owned())];
        if request.body.is_some() {
            headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
        }
        if let Some(token) = bearer {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        HttpRequest {
            method: request.method,
            url: self.endpoint(&request.path),
            headers,
            body: request.body.clone(),
        }
    }

    /// Response phase: map the status onto the error taxonomy.
    ///
    /// A `401` only invalidates the session whose credential was sent. If the
    /// stored token changed while the request was in flight, the answer
    /// belongs to an earlier session and is reported to the caller only.
    fn interpret(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
        response: HttpResponse,
    ) -> Result<String, ApiError> {
        if response.is_success() {
            return Ok(response.body);
        }
        let status = response.status;
        log::debug!("{} {} -> {status}", request.method.as_str(), request.path);
        match status {
            401 => {
                if request.session_bound {
                    if self.inner.tokens.token().as_deref() == bearer {
                        self.inner.events.emit(&SessionInvalidated {
                            reason: InvalidationReason::Unauthorized,
                            path: request.path.clone(),
                        });
                    } else {
                        log::debug!("ignoring 401 on {} sent with a superseded credential", request.path);
                    }
                }
                Err(ApiError::Unauthorized)
            }
            403 => Err(ApiError::Forbidden { message: extract_message(&response.body) }),
            422 => Err(ApiError::Validation(ValidationErrors::from_body(&response.body))),
            429 => Err(ApiError::RateLimited { message: extract_message(&response.body) }),
            _ => Err(ApiError::Status { status, message: extract_message(&response.body) }),
        }
    }

    /// Send `request` through the interceptor and return the raw 2xx body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when no response arrived, or the status
    /// mapping of a non-2xx response.
    pub async fn execute(&self, request: ApiRequest) -> Result<String, ApiError> {
        let bearer = self.bearer(&request);
        let http = self.prepare(&request, bearer.as_deref());
        let response = self
            .inner
            .transport
            .send(http)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        self.interpret(&request, bearer.as_deref(), response)
    }

    /// Like [`ApiClient::execute`], decoding the body as `T`.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::execute`], plus [`ApiError::Decode`] for a body that
    /// does not match `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `POST /auth/login`. A `401` here is a credential error, so it does not
    /// emit an invalidation event.
    ///
    /// # Errors
    ///
    /// Returns the mapped error for a failed login.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        self.execute_json(ApiRequest::post(LOGIN_PATH).json(&body)?.detached())
            .await
    }

    /// `GET /profile`, the "who am I" call.
    ///
    /// # Errors
    ///
    /// Returns the mapped error; a `401` also emits an invalidation event.
    pub async fn fetch_profile(&self) -> Result<UserRecord, ApiError> {
        let resp: ProfileResponse = self.execute_json(ApiRequest::get(PROFILE_PATH)).await?;
        Ok(resp.user)
    }

    /// `PUT /profile` with the changed fields.
    ///
    /// # Errors
    ///
    /// Returns the mapped error; a `422` carries field messages.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserRecord, ApiError> {
        let resp: ProfileResponse = self
            .execute_json(ApiRequest::put(PROFILE_PATH).json(update)?)
            .await?;
        Ok(resp.user)
    }

    /// `POST /change-password`.
    ///
    /// # Errors
    ///
    /// Returns the mapped error; a `422` carries field messages.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<String, ApiError> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_owned(),
            new_password: new_password.to_owned(),
        };
        let resp: MessageResponse = self
            .execute_json(ApiRequest::post(CHANGE_PASSWORD_PATH).json(&body)?)
            .await?;
        Ok(resp.message)
    }

    /// `POST /auth/logout` with an explicit token. The response body is
    /// ignored and a `401` is not treated as a session expiry.
    ///
    /// # Errors
    ///
    /// Returns the mapped error so callers can log it.
    pub async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post(LOGOUT_PATH)
            .with_credential(Credential::Explicit(token.to_owned()))
            .detached();
        self.execute(request).await.map(|_| ())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("tokens", &self.inner.tokens)
            .field("events", &self.inner.events)
            .finish_non_exhaustive()
    }
}
