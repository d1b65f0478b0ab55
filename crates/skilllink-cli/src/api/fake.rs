//! In-memory [`MarketplaceApi`] with canned replies, for controller tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::Value;
use skilllink_core::model::{
    AuthResponse, Bid, BidDraft, LoginRequest, Project, ProjectFilters, ProjectListing,
    Registration, UserProfile,
};

use super::{ApiError, BidDecision, ErrorBody, MarketplaceApi, ProfileUpdate};

/// Canned reply for one operation.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    /// 2xx with no body.
    Empty,
    /// Non-2xx with the given raw body.
    Status(u16, &'static str),
    /// Failure before any response.
    Offline,
    Unauthenticated,
}

/// Records every call and answers from a reply table. Unset operations reply
/// [`Reply::Empty`].
#[derive(Debug, Default)]
pub struct FakeApi {
    replies: HashMap<&'static str, Reply>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reply(mut self, op: &'static str, reply: Reply) -> Self {
        self.replies.insert(op, reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn answer<T: DeserializeOwned>(&self, op: &'static str, call: String) -> Result<Option<T>, ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(call);
        match self.replies.get(op).cloned().unwrap_or(Reply::Empty) {
            Reply::Json(value) => Ok(Some(serde_json::from_value(value)?)),
            Reply::Empty => Ok(None),
            Reply::Status(status, body) => Err(ApiError::server(status, ErrorBody::parse(body))),
            Reply::Offline => Err(ApiError::Io(std::io::Error::other("connection refused"))),
            Reply::Unauthenticated => Err(ApiError::Unauthenticated),
        }
    }
}

impl MarketplaceApi for FakeApi {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        Ok(self
            .answer("login", format!("login {}", request.email))?
            .unwrap_or_default())
    }

    async fn register(&self, registration: Registration) -> Result<AuthResponse, ApiError> {
        Ok(self
            .answer("register", format!("register {}", registration.email))?
            .unwrap_or_default())
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.answer("fetch_profile", "fetch_profile".into())?
            .ok_or(ApiError::EmptyBody)
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Option<UserProfile>, ApiError> {
        let call = match &update {
            ProfileUpdate::Fields { avatar: None, .. } => "update_profile json".to_string(),
            ProfileUpdate::Fields { avatar: Some(_), .. } => "update_profile multipart".to_string(),
            ProfileUpdate::Avatar(avatar) => format!("update_profile avatar {}", avatar.file_name),
            ProfileUpdate::Skills(skills) => {
                format!("update_profile skills {}", skills.skills.join(","))
            }
        };
        self.answer("update_profile", call)
    }

    async fn list_projects(&self, filters: ProjectFilters) -> Result<Vec<Project>, ApiError> {
        let query = filters
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self.answer::<ProjectListing>("list_projects", format!("list_projects {query}"))?
            .map(ProjectListing::into_projects)
            .ok_or(ApiError::EmptyBody)
    }

    async fn project_detail(&self, id: u64) -> Result<Project, ApiError> {
        self.answer("project_detail", format!("project_detail {id}"))?
            .ok_or(ApiError::EmptyBody)
    }

    async fn submit_bid(&self, project_id: u64, draft: BidDraft) -> Result<(), ApiError> {
        self.answer::<Value>(
            "submit_bid",
            format!("submit_bid {project_id} {} {}", draft.amount, draft.delivery_days),
        )?;
        Ok(())
    }

    async fn my_bids(&self) -> Result<Vec<Bid>, ApiError> {
        self.answer("my_bids", "my_bids".into())?
            .ok_or(ApiError::EmptyBody)
    }

    async fn project_bids(&self, project_id: u64) -> Result<Vec<Bid>, ApiError> {
        self.answer("project_bids", format!("project_bids {project_id}"))?
            .ok_or(ApiError::EmptyBody)
    }

    async fn decide_bid(&self, bid_id: u64, decision: BidDecision) -> Result<(), ApiError> {
        self.answer::<Value>("decide_bid", format!("decide_bid {bid_id} {}", decision.as_str()))?;
        Ok(())
    }
}

/// A project as the backend serializes it.
pub fn project_json(id: u64, title: &str, user_has_bid: bool) -> Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": format!("Description of {title}"),
        "budget": "15000.00",
        "status": "open",
        "client_name": "acme",
        "client_details": {"email": "client@acme.test"},
        "bid_count": 1,
        "created_at": "2026-10-19T08:30:00Z",
        "user_has_bid": user_has_bid
    })
}

pub fn profile_json() -> Value {
    serde_json::json!({
        "id": 1,
        "username": "ada",
        "email": "ada@example.test",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "title": "Analyst",
        "bio": "Writes programs for engines",
        "skills": ["Rust", "Math"],
        "role": "freelancer"
    })
}
