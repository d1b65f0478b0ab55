//! Asynchronous work requested by controllers.
//!
//! Controllers stay synchronous: they return a [`Task`], the caller runs it
//! against a [`MarketplaceApi`], and the [`TaskOutcome`] is handed back to
//! the controller that asked for it.

use skilllink_core::model::{
    AuthResponse, Bid, BidDraft, LoginRequest, Project, ProjectFilters, Registration,
    SkillsUpdate, UserProfile,
};
use tracing::debug;

use crate::api::{ApiError, BidDecision, MarketplaceApi, ProfileUpdate};
use crate::avatar::AvatarSelection;

/// A unit of asynchronous work.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Login(LoginRequest),
    Register(Registration),
    LoadProfile,
    SaveProfile(ProfileUpdate),
    UploadAvatar(AvatarSelection),
    SaveSkills(Vec<String>),
    /// Local file read for the avatar preview; no network.
    PreviewAvatar(AvatarSelection),
    LoadProjects(ProjectFilters),
    LoadProject(u64),
    SubmitBid { project_id: u64, draft: BidDraft },
    LoadMyBids,
    LoadProjectBids(u64),
    DecideBid { bid_id: u64, decision: BidDecision },
}

impl Task {
    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Register(_) => "register",
            Self::LoadProfile => "load_profile",
            Self::SaveProfile(_) => "save_profile",
            Self::UploadAvatar(_) => "upload_avatar",
            Self::SaveSkills(_) => "save_skills",
            Self::PreviewAvatar(_) => "preview_avatar",
            Self::LoadProjects(_) => "load_projects",
            Self::LoadProject(_) => "load_project",
            Self::SubmitBid { .. } => "submit_bid",
            Self::LoadMyBids => "load_my_bids",
            Self::LoadProjectBids(_) => "load_project_bids",
            Self::DecideBid { .. } => "decide_bid",
        }
    }
}

/// Result of a finished [`Task`].
#[derive(Debug)]
pub enum TaskOutcome {
    LoggedIn(Result<AuthResponse, ApiError>),
    Registered(Result<AuthResponse, ApiError>),
    ProfileLoaded(Result<UserProfile, ApiError>),
    ProfileSaved(Result<Option<UserProfile>, ApiError>),
    AvatarUploaded(Result<Option<UserProfile>, ApiError>),
    SkillsSaved(Result<Option<UserProfile>, ApiError>),
    AvatarPreviewed(std::io::Result<String>),
    ProjectsLoaded(Result<Vec<Project>, ApiError>),
    ProjectLoaded(Result<Project, ApiError>),
    BidSubmitted {
        project_id: u64,
        result: Result<(), ApiError>,
    },
    MyBidsLoaded(Result<Vec<Bid>, ApiError>),
    ProjectBidsLoaded {
        project_id: u64,
        result: Result<Vec<Bid>, ApiError>,
    },
    BidDecided {
        bid_id: u64,
        decision: BidDecision,
        result: Result<(), ApiError>,
    },
}

/// A [`Task`] stamped with the page mount that requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub mount: u64,
    pub task: Task,
}

/// The outcome of a [`Ticket`], still carrying its mount.
#[derive(Debug)]
pub struct Settled {
    pub mount: u64,
    pub outcome: TaskOutcome,
}

impl Ticket {
    pub async fn run<A: MarketplaceApi>(self, api: &A) -> Settled {
        Settled {
            mount: self.mount,
            outcome: run(api, self.task).await,
        }
    }
}

/// Run `task` to completion.
pub async fn run<A: MarketplaceApi>(api: &A, task: Task) -> TaskOutcome {
    debug!(task = task.name(), "Running task");
    match task {
        Task::Login(request) => TaskOutcome::LoggedIn(api.login(request).await),
        Task::Register(registration) => TaskOutcome::Registered(api.register(registration).await),
        Task::LoadProfile => TaskOutcome::ProfileLoaded(api.fetch_profile().await),
        Task::SaveProfile(update) => TaskOutcome::ProfileSaved(api.update_profile(update).await),
        Task::UploadAvatar(avatar) => {
            TaskOutcome::AvatarUploaded(api.update_profile(ProfileUpdate::Avatar(avatar)).await)
        }
        Task::SaveSkills(skills) => TaskOutcome::SkillsSaved(
            api.update_profile(ProfileUpdate::Skills(SkillsUpdate { skills }))
                .await,
        ),
        Task::PreviewAvatar(avatar) => TaskOutcome::AvatarPreviewed(avatar.read_data_url().await),
        Task::LoadProjects(filters) => TaskOutcome::ProjectsLoaded(api.list_projects(filters).await),
        Task::LoadProject(id) => TaskOutcome::ProjectLoaded(api.project_detail(id).await),
        Task::SubmitBid { project_id, draft } => TaskOutcome::BidSubmitted {
            project_id,
            result: api.submit_bid(project_id, draft).await,
        },
        Task::LoadMyBids => TaskOutcome::MyBidsLoaded(api.my_bids().await),
        Task::LoadProjectBids(project_id) => TaskOutcome::ProjectBidsLoaded {
            project_id,
            result: api.project_bids(project_id).await,
        },
        Task::DecideBid { bid_id, decision } => TaskOutcome::BidDecided {
            bid_id,
            decision,
            result: api.decide_bid(bid_id, decision).await,
        },
    }
}
