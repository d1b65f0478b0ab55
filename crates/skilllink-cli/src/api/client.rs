//! HTTP client for the marketplace backend.
//!
//! Attaches the bearer token and CSRF header to every request, keeps the
//! `csrftoken` cookie in a shared jar mirrored to client storage, and turns
//! non-2xx responses into [`ApiError::Server`] with the server's message.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use skilllink_core::model::{
    AuthResponse, Bid, BidDraft, LoginRequest, Project, ProjectFilters, ProjectListing,
    Registration, UserProfile,
};
use tracing::{debug, warn};

use super::error::{ApiError, ErrorBody};
use super::{BidDecision, MarketplaceApi, ProfileUpdate, endpoints};
use crate::avatar::AvatarSelection;
use crate::csrf;
use crate::storage::ClientStorage;

/// Marketplace REST client. Cheap to clone; clones share the cookie jar.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
    storage: Arc<ClientStorage>,
}

impl ApiClient {
    /// Create a client for `base_url`, restoring the CSRF cookie from storage.
    pub fn new(base_url: &str, storage: Arc<ClientStorage>) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiError::Config("base_url is empty".into()));
        }
        let base_url = Url::parse(trimmed)
            .map_err(|e| ApiError::Config(format!("Invalid base_url {trimmed:?}: {e}")))?;

        let jar = Arc::new(Jar::default());
        if let Some(token) = storage.csrf_token() {
            jar.add_cookie_str(&format!("{}={token}; Path=/", csrf::COOKIE_NAME), &base_url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        // reqwest is built with rustls-no-provider; an `Err` means a provider
        // is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self {
            http,
            base_url,
            jar,
            storage,
        })
    }

    pub const fn storage(&self) -> &Arc<ClientStorage> {
        &self.storage
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint path.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| ApiError::Config(format!("Invalid endpoint {path:?}: {e}")))
    }

    /// Token carried by the `csrftoken` cookie currently in the jar.
    pub(crate) fn cookie_csrf(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        csrf::from_cookie_header(header.to_str().ok()?)
    }

    /// CSRF token to send: the live cookie first, then the stored value.
    pub fn csrf_token(&self) -> Option<String> {
        self.cookie_csrf().or_else(|| self.storage.csrf_token())
    }

    fn remember_csrf(&self, token: &str) {
        if let Err(e) = self.storage.set_csrf_token(token) {
            warn!(error = %e, "Failed to persist CSRF token");
        }
    }

    fn sync_csrf_cookie(&self) {
        if let Some(token) = self.cookie_csrf() {
            self.remember_csrf(&token);
        }
    }

    /// Fetch the page hosting a form so the backend issues a CSRF token.
    ///
    /// No-op when a token is already known. The cookie is preferred; the
    /// hidden form field is the fallback.
    pub async fn ensure_csrf(&self, page: &str) -> Result<(), ApiError> {
        if self.csrf_token().is_some() {
            return Ok(());
        }
        let url = self.endpoint(page)?;
        debug!(page, "Priming CSRF token");
        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "text/html")
            .send()
            .await?;
        let html = resp.text().await?;
        self.sync_csrf_cookie();
        if self.cookie_csrf().is_none() {
            match csrf::from_form_html(&html) {
                Some(token) => self.remember_csrf(&token),
                None => warn!(page, "Backend issued no CSRF token"),
            }
        }
        Ok(())
    }

    /// Build a request carrying the bearer token and CSRF header when known.
    pub(crate) fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, ApiError> {
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.storage.auth_token() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Config("Invalid token format".into()))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(token) = self.csrf_token() {
            builder = builder.header(csrf::HEADER_NAME, token);
        }
        Ok(builder)
    }

    fn require_token(&self) -> Result<(), ApiError> {
        if self.storage.auth_token().is_none() {
            return Err(ApiError::Unauthenticated);
        }
        Ok(())
    }

    /// Send and decode. Empty 2xx bodies decode to `None`.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let resp = builder.send().await.map_err(|e| {
            warn!(error = %e, "Request failed before a response");
            e
        })?;
        self.sync_csrf_cookie();

        let status = resp.status();
        let url = resp.url().path().to_string();
        let text = resp.text().await?;
        if !status.is_success() {
            let body = ErrorBody::parse(&text);
            warn!(path = %url, status = status.as_u16(), "Request rejected");
            return Err(ApiError::server(status.as_u16(), body));
        }
        debug!(path = %url, status = status.as_u16(), bytes = text.len(), "Request succeeded");
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, url)?;
        self.execute(builder).await?.ok_or(ApiError::EmptyBody)
    }

    async fn avatar_part(avatar: &AvatarSelection) -> Result<Part, ApiError> {
        let bytes = tokio::fs::read(&avatar.path).await?;
        Ok(Part::bytes(bytes)
            .file_name(avatar.file_name.clone())
            .mime_str(&avatar.mime)?)
    }
}

impl MarketplaceApi for ApiClient {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        self.ensure_csrf(endpoints::LOGIN).await?;
        let builder = self
            .request(Method::POST, self.endpoint(endpoints::LOGIN)?)?
            .json(&request);
        Ok(self.execute(builder).await?.unwrap_or_default())
    }

    async fn register(&self, registration: Registration) -> Result<AuthResponse, ApiError> {
        self.ensure_csrf(endpoints::REGISTER).await?;
        let builder = self
            .request(Method::POST, self.endpoint(endpoints::REGISTER)?)?
            .json(&registration);
        Ok(self.execute(builder).await?.unwrap_or_default())
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.get(self.endpoint(endpoints::PROFILE)?).await
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Option<UserProfile>, ApiError> {
        self.ensure_csrf(endpoints::PROFILE).await?;
        let builder = self.request(Method::PATCH, self.endpoint(endpoints::PROFILE)?)?;
        let builder = match update {
            ProfileUpdate::Fields { edit, avatar: None } => builder.json(&edit),
            ProfileUpdate::Fields {
                edit,
                avatar: Some(avatar),
            } => {
                let mut form = Form::new();
                for (name, value) in edit.fields() {
                    form = form.text(name, value.to_string());
                }
                builder.multipart(form.part("profile_picture", Self::avatar_part(&avatar).await?))
            }
            ProfileUpdate::Avatar(avatar) => builder.multipart(
                Form::new().part("profile_picture", Self::avatar_part(&avatar).await?),
            ),
            ProfileUpdate::Skills(skills) => builder.json(&skills),
        };
        self.execute(builder).await
    }

    async fn list_projects(&self, filters: ProjectFilters) -> Result<Vec<Project>, ApiError> {
        let mut url = self.endpoint(endpoints::AVAILABLE_PROJECTS)?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        let listing: ProjectListing = self.get(url).await?;
        Ok(listing.into_projects())
    }

    async fn project_detail(&self, id: u64) -> Result<Project, ApiError> {
        self.get(self.endpoint(&endpoints::project(id))?).await
    }

    async fn submit_bid(&self, project_id: u64, draft: BidDraft) -> Result<(), ApiError> {
        self.require_token()?;
        self.ensure_csrf(endpoints::MARKETPLACE_PAGE).await?;
        let builder = self
            .request(Method::POST, self.endpoint(&endpoints::create_bid(project_id))?)?
            .json(&draft);
        self.execute::<serde_json::Value>(builder).await?;
        Ok(())
    }

    async fn my_bids(&self) -> Result<Vec<Bid>, ApiError> {
        self.require_token()?;
        self.get(self.endpoint(endpoints::MY_BIDS)?).await
    }

    async fn project_bids(&self, project_id: u64) -> Result<Vec<Bid>, ApiError> {
        self.require_token()?;
        self.get(self.endpoint(&endpoints::project_bids(project_id))?)
            .await
    }

    async fn decide_bid(&self, bid_id: u64, decision: BidDecision) -> Result<(), ApiError> {
        self.require_token()?;
        self.ensure_csrf(endpoints::MARKETPLACE_PAGE).await?;
        debug!(bid_id, decision = decision.as_str(), "Deciding bid");
        let path = match decision {
            BidDecision::Accept => endpoints::accept_bid(bid_id),
            BidDecision::Reject => endpoints::reject_bid(bid_id),
        };
        let builder = self.request(Method::PUT, self.endpoint(&path)?)?;
        self.execute::<serde_json::Value>(builder).await?;
        Ok(())
    }
}
