//! Marketplace REST API.
//!
//! A reqwest-based client for the backend's JSON endpoints, plus the
//! [`MarketplaceApi`] trait controllers are written against.

mod client;
pub mod endpoints;
mod error;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests;

use std::future::Future;

use skilllink_core::model::{
    AuthResponse, Bid, BidDraft, LoginRequest, ProfileEdit, Project, ProjectFilters,
    Registration, SkillsUpdate, UserProfile,
};

use crate::avatar::AvatarSelection;

pub use client::ApiClient;
pub use error::{ApiError, ErrorBody, first_message};

/// A partial update of the signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    /// Edit form submission; multipart when an avatar is staged alongside.
    Fields {
        edit: ProfileEdit,
        avatar: Option<AvatarSelection>,
    },
    /// Immediate avatar upload as the `profile_picture` part.
    Avatar(AvatarSelection),
    /// Full replacement of the skill set.
    Skills(SkillsUpdate),
}

/// Owner decision on a pending bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidDecision {
    Accept,
    Reject,
}

impl BidDecision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

/// Operations the marketplace backend offers.
///
/// Every call maps to exactly one request; no retries.
pub trait MarketplaceApi: Send + Sync {
    fn login(
        &self,
        request: LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn register(
        &self,
        registration: Registration,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn fetch_profile(&self) -> impl Future<Output = Result<UserProfile, ApiError>> + Send;

    /// Returns the updated profile when the server sends one back.
    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = Result<Option<UserProfile>, ApiError>> + Send;

    fn list_projects(
        &self,
        filters: ProjectFilters,
    ) -> impl Future<Output = Result<Vec<Project>, ApiError>> + Send;

    fn project_detail(&self, id: u64) -> impl Future<Output = Result<Project, ApiError>> + Send;

    fn submit_bid(
        &self,
        project_id: u64,
        draft: BidDraft,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn my_bids(&self) -> impl Future<Output = Result<Vec<Bid>, ApiError>> + Send;

    fn project_bids(
        &self,
        project_id: u64,
    ) -> impl Future<Output = Result<Vec<Bid>, ApiError>> + Send;

    fn decide_bid(
        &self,
        bid_id: u64,
        decision: BidDecision,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
