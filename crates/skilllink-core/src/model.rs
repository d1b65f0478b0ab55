//! Marketplace data model.
//!
//! Deserialization structs matching the backend's REST JSON, plus the
//! request bodies the client sends back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a posted project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Completed, Self::Cancelled];

    /// Wire value, also used as the `status` filter.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open for Bidding",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

/// Contact details of the client who posted a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetails {
    #[serde(default)]
    pub email: String,
}

/// A project as listed in the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub budget: f64,
    pub status: ProjectStatus,
    #[serde(default)]
    pub bid_count: u32,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_details: Option<ClientDetails>,
    pub created_at: DateTime<Utc>,
    /// Whether the current viewer already bid on this project.
    #[serde(default)]
    pub user_has_bid: bool,
}

impl Project {
    /// Bidding is offered only on open projects the viewer has not bid on.
    pub fn accepts_bid_from_viewer(&self) -> bool {
        !self.user_has_bid && self.status == ProjectStatus::Open
    }
}

/// Listing responses come either paginated or as a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProjectListing {
    Page {
        results: Vec<Project>,
        #[serde(default)]
        count: Option<u64>,
    },
    List(Vec<Project>),
}

impl ProjectListing {
    pub fn into_projects(self) -> Vec<Project> {
        match self {
            Self::Page { results, .. } => results,
            Self::List(projects) => projects,
        }
    }
}

/// Decision state of a bid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

/// A freelancer's proposal on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: u64,
    #[serde(default)]
    pub project: Option<u64>,
    #[serde(default)]
    pub freelancer: Option<u64>,
    #[serde(default)]
    pub freelancer_name: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub amount: f64,
    pub delivery_days: u32,
    #[serde(default)]
    pub proposal: String,
    #[serde(default)]
    pub status: BidStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /projects/api/{id}/bid/create/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidDraft {
    pub amount: f64,
    pub delivery_days: u32,
    pub proposal: String,
}

/// Account role chosen at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Freelancer,
    Client,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Freelancer => "freelancer",
            Self::Client => "client",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Freelancer => "Freelancer",
            Self::Client => "Client",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "freelancer" => Some(Self::Freelancer),
            "client" => Some(Self::Client),
            _ => None,
        }
    }
}

/// Freelancer specialisation offered at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Designer,
    Developer,
    Writer,
    Marketer,
    Translator,
    Consultant,
    Other,
}

impl Category {
    pub const ALL: [Self; 7] = [
        Self::Designer,
        Self::Developer,
        Self::Writer,
        Self::Marketer,
        Self::Translator,
        Self::Consultant,
        Self::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Designer => "Designer (UI/UX, Graphic, etc.)",
            Self::Developer => "Developer (Web, Mobile, Backend)",
            Self::Writer => "Writer (Content, Blog, Copy)",
            Self::Marketer => "Marketer (Digital, Social, SEO)",
            Self::Translator => "Translator",
            Self::Consultant => "Consultant & Specialist",
            Self::Other => "Other",
        }
    }

    /// Wire value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Designer => "designer",
            Self::Developer => "developer",
            Self::Writer => "writer",
            Self::Marketer => "marketer",
            Self::Translator => "translator",
            Self::Consultant => "consultant",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == s)
    }
}

/// The signed-in user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl UserProfile {
    /// First and last name joined, without falling back to the username.
    pub fn edit_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Name shown on the profile card.
    pub fn display_name(&self) -> String {
        let name = self.edit_name();
        if name.is_empty() {
            self.username.clone()
        } else {
            name
        }
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.profile_picture_url
            .as_deref()
            .or(self.profile_picture.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Body of `POST /users/login/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User summary returned alongside a token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response of login and registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Role reported by the server; unknown values count as absent.
    pub fn role(&self) -> Option<Role> {
        self.user
            .as_ref()
            .and_then(|u| u.role.as_deref())
            .and_then(Role::parse)
    }
}

/// Body of `POST /users/register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub role: Role,
}

/// Editable profile fields sent as a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileEdit {
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
}

impl ProfileEdit {
    /// Field name/value pairs in submission order, for multipart bodies.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("title", &self.title),
            ("bio", &self.bio),
            ("email", &self.email),
        ]
    }
}

/// Body of the skills-only partial update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillsUpdate {
    pub skills: Vec<String>,
}

/// Marketplace search filters. Empty values are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilters {
    pub search: String,
    pub status: Option<ProjectStatus>,
    pub min_budget: String,
    pub max_budget: String,
    pub ordering: String,
    pub page: Option<u32>,
}

impl ProjectFilters {
    /// Query parameters in the order the listing endpoint documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: &str| {
            let value = value.trim();
            if !value.is_empty() {
                pairs.push((key, value.to_string()));
            }
        };
        push("search", &self.search);
        push("status", self.status.map_or("", ProjectStatus::as_str));
        push("min_budget", &self.min_budget);
        push("max_budget", &self.max_budget);
        push("ordering", &self.ordering);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// Decimal fields arrive as JSON strings (`"15000.00"`) or plain numbers.
mod decimal {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid decimal: {s:?}"))),
        }
    }
}
