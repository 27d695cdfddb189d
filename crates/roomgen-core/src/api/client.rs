//! API client for communicating with the roomgen REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests for profiles, saved designs and AI image generation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Method, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, error};

use crate::auth::validation::{
    validate_credentials, validate_generation_job, validate_registration, validate_reset_email,
};
use crate::auth::SessionStore;
use crate::config::Config;
use crate::models::{
    AuthResponse, Credentials, DesignRecord, DesignUpdate, GenerateResponse, GeneratedImage,
    GenerationJob, MessageResponse, NewDesign, ProfileRecord, Registration,
};

use super::{ApiError, ErrorKind};

// ============================================================================
// Constants
// ============================================================================

/// Base URL for all REST endpoints
pub const DEFAULT_BASE_URL: &str =
    "https://xsdjvd3q20.execute-api.ap-southeast-1.amazonaws.com/prod/api";

/// HTTP request timeout in seconds. Applies to every call, including
/// image generation.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path of the generation endpoint when no separate URL is configured.
/// The deployed mobile app posted generation jobs to a different host than
/// the REST base, so production setups usually set `generate_url`.
const GENERATE_PATH: [&str; 2] = ["designs", "generate"];

/// Multipart file name and type for the uploaded room photo
const IMAGE_FILE_NAME: &str = "room.jpg";
const IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Serialize)]
struct PasswordResetRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteToggle {
    is_favorite: bool,
}

// ============================================================================
// Request descriptor
// ============================================================================

pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

/// One outbound call: method, path below the base URL and body.
pub struct RequestDescriptor {
    method: Method,
    segments: Vec<String>,
    endpoint: Option<Url>,
    body: RequestBody,
}

impl RequestDescriptor {
    pub fn new<S: AsRef<str>>(method: Method, segments: &[S]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.as_ref().to_string()).collect(),
            endpoint: None,
            body: RequestBody::Empty,
        }
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Local(format!("Failed to encode request body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a multipart body; reqwest sets the boundary content type.
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Send to an absolute URL instead of a path below the base URL.
    pub fn at(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.endpoint {
            Some(ref url) => write!(f, "{} {}", self.method, url),
            None => write!(f, "{} /{}", self.method, self.segments.join("/")),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// API client for the roomgen backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    generate_url: Url,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a client for the default endpoint
    pub fn new(session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        Self::with_endpoints(DEFAULT_BASE_URL, None, session)
    }

    /// Create a client for a specific base URL and, optionally, a separate
    /// image generation URL.
    pub fn with_endpoints(
        base_url: &str,
        generate_url: Option<&str>,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        Self::build(
            base_url,
            generate_url,
            session,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn from_config(config: &Config, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        Self::with_endpoints(
            config.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            config.generate_url.as_deref(),
            session,
        )
    }

    fn build(
        base_url: &str,
        generate_url: Option<&str>,
        session: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = Self::parse_endpoint(base_url)?;
        let generate_url = match generate_url {
            Some(url) => Self::parse_endpoint(url)?,
            None => Self::join_segments(&base_url, &GENERATE_PATH)?,
        };

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .user_agent(concat!("roomgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Local(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            generate_url,
            session,
        })
    }

    fn parse_endpoint(raw: &str) -> Result<Url, ApiError> {
        let url = Url::parse(raw.trim())
            .map_err(|e| ApiError::Local(format!("Invalid endpoint URL '{}': {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ApiError::Local(format!(
                "Endpoint must be an http(s) URL: {}",
                raw
            )));
        }
        Ok(url)
    }

    /// Append percent-encoded path segments to a base URL.
    fn join_segments<S: AsRef<str>>(base: &Url, segments: &[S]) -> Result<Url, ApiError> {
        if segments.iter().any(|s| s.as_ref().is_empty()) {
            return Err(ApiError::Local("Request path contains an empty segment".to_string()));
        }
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Local(format!("Base URL cannot take a path: {}", base)))?
            .pop_if_empty()
            .extend(segments.iter().map(|s| s.as_ref()));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn generate_url(&self) -> &Url {
        &self.generate_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Headers carrying the stored bearer token, if any.
    async fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        let token = self
            .session
            .get()
            .await
            .map_err(|e| ApiError::Local(format!("Could not read session token: {}", e)))?;

        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| {
                    ApiError::Local("Session token is not a valid header value".to_string())
                })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send the request and return the status and body of a 2xx response.
    async fn dispatch(&self, request: RequestDescriptor) -> Result<(StatusCode, String), ApiError> {
        let url = match request.endpoint {
            Some(url) => url,
            None => Self::join_segments(&self.base_url, &request.segments)?,
        };
        let headers = self.auth_headers().await?;
        debug!(
            method = %request.method,
            url = %url,
            authenticated = headers.contains_key(header::AUTHORIZATION),
            "Dispatching request"
        );

        let builder = self.client.request(request.method, url).headers(headers);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let body = response.text().await;

        // Once a status line has arrived the failure is the server's, even
        // if the body is cut short.
        if !status.is_success() {
            let body = body.unwrap_or_else(|e| {
                debug!(status = %status, error = %e, "Error body could not be read");
                String::new()
            });
            return Err(ApiError::from_status(status, &body));
        }
        let body = body.map_err(|e| {
            ApiError::invalid_response(status, format!("Failed to read response body: {}", e))
        })?;
        debug!(status = %status, bytes = body.len(), "Request succeeded");
        Ok((status, body))
    }

    fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
        let text = if body.trim().is_empty() { "null" } else { body };
        serde_json::from_str(text).map_err(|e| {
            ApiError::invalid_response(status, format!("Failed to parse response body: {}", e))
        })
    }

    fn log_failure(label: &str, err: &ApiError) {
        match err.kind() {
            ErrorKind::ServerResponded => {
                error!(request = label, status = ?err.status(), error = %err, "API error")
            }
            ErrorKind::NoResponse => {
                error!(request = label, timed_out = err.is_timeout(), error = %err, "Network error")
            }
            ErrorKind::Local => error!(request = label, error = %err, "Request error"),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<(StatusCode, T), ApiError> {
        let label = request.to_string();
        let result = match self.dispatch(request).await {
            Ok((status, body)) => Self::decode(status, &body).map(|value| (status, value)),
            Err(e) => Err(e),
        };
        if let Err(ref e) = result {
            Self::log_failure(&label, e);
        }
        result
    }

    /// Run a request through the pipeline and decode the response body.
    pub async fn execute<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T, ApiError> {
        self.fetch(request).await.map(|(_, value)| value)
    }

    /// Reject input before anything is sent, logging like any other failure.
    fn precheck<E: Into<ApiError>>(label: &str, check: Result<(), E>) -> Result<(), ApiError> {
        check.map_err(|e| {
            let err = e.into();
            Self::log_failure(label, &err);
            err
        })
    }

    fn design_segments(prefix: &[&str], id: &str) -> Result<Vec<String>, ApiError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::Local("Design id must not be empty".to_string()));
        }
        let mut segments: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
        segments.push(id.to_string());
        Ok(segments)
    }

    // ===== Auth =====

    /// Log in. The caller is responsible for storing the returned token.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        Self::precheck("POST /auth/login", validate_credentials(credentials))?;
        let request = RequestDescriptor::new(Method::POST, &["auth", "login"]).json(credentials)?;
        self.execute(request).await
    }

    /// Create an account. The response may or may not carry a token.
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        Self::precheck("POST /auth/register", validate_registration(registration))?;
        let request =
            RequestDescriptor::new(Method::POST, &["auth", "register"]).json(registration)?;
        self.execute(request).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        Self::precheck("POST /auth/forgot-password", validate_reset_email(email))?;
        let request = RequestDescriptor::new(Method::POST, &["auth", "forgot-password"])
            .json(&PasswordResetRequest {
                email: email.trim(),
            })?;
        self.execute(request).await
    }

    // ===== Profile =====

    pub async fn get_profile(&self) -> Result<ProfileRecord, ApiError> {
        self.execute(RequestDescriptor::new(Method::GET, &["users", "profile"]))
            .await
    }

    pub async fn update_profile(&self, profile: &ProfileRecord) -> Result<ProfileRecord, ApiError> {
        let request = RequestDescriptor::new(Method::PUT, &["users", "profile"]).json(profile)?;
        self.execute(request).await
    }

    // ===== Designs =====

    pub async fn create_design(&self, design: &NewDesign) -> Result<DesignRecord, ApiError> {
        let request = RequestDescriptor::new(Method::POST, &["designs"]).json(design)?;
        self.execute(request).await
    }

    pub async fn get_my_designs(&self) -> Result<Vec<DesignRecord>, ApiError> {
        self.execute(RequestDescriptor::new(Method::GET, &["designs", "my-designs"]))
            .await
    }

    pub async fn get_design_by_id(&self, id: &str) -> Result<DesignRecord, ApiError> {
        let segments = Self::design_segments(&["designs", "design"], id)?;
        self.execute(RequestDescriptor::new(Method::GET, &segments))
            .await
    }

    pub async fn update_design(
        &self,
        id: &str,
        update: &DesignUpdate,
    ) -> Result<DesignRecord, ApiError> {
        let segments = Self::design_segments(&["designs"], id)?;
        let request = RequestDescriptor::new(Method::PUT, &segments).json(update)?;
        self.execute(request).await
    }

    pub async fn toggle_favorite(&self, id: &str, is_favorite: bool) -> Result<DesignRecord, ApiError> {
        let segments = Self::design_segments(&["designs", "design"], id)?;
        let request =
            RequestDescriptor::new(Method::PUT, &segments).json(&FavoriteToggle { is_favorite })?;
        self.execute(request).await
    }

    pub async fn get_favorites(&self) -> Result<Vec<DesignRecord>, ApiError> {
        self.execute(RequestDescriptor::new(Method::GET, &["designs", "favorites"]))
            .await
    }

    pub async fn delete_design(&self, id: &str) -> Result<(), ApiError> {
        let segments = Self::design_segments(&["designs", "design"], id)?;
        self.execute::<IgnoredAny>(RequestDescriptor::new(Method::DELETE, &segments))
            .await
            .map(|_| ())
    }

    // ===== Image generation =====

    /// Submit a room photo for AI restyling.
    ///
    /// Succeeds only if the response names both the generated and the
    /// original image URL, whatever the HTTP status.
    pub async fn generate_image(&self, job: GenerationJob) -> Result<GeneratedImage, ApiError> {
        let label = format!("POST {}", self.generate_url);
        Self::precheck(&label, validate_generation_job(&job))?;

        let image = Part::bytes(job.image)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(IMAGE_MIME)
            .map_err(ApiError::from_transport)?;
        let form = Form::new()
            .part("image", image)
            .text("prompt", job.prompt)
            .text("roomType", job.room_type)
            .text("style", job.style.id());

        let request = RequestDescriptor::new::<&str>(Method::POST, &[])
            .multipart(form)
            .at(self.generate_url.clone());
        let (status, raw): (StatusCode, GenerateResponse) = self.fetch(request).await?;

        GeneratedImage::try_from(raw).map_err(|reason| {
            let err = ApiError::invalid_response(status, reason);
            Self::log_failure(&label, &err);
            err
        })
    }
}
