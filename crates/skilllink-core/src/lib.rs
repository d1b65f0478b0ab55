//! `SkillLink` Core Library
//!
//! Shared functionality for the `SkillLink` marketplace client:
//! - Marketplace data model (projects, bids, user profiles)
//! - Client-side validation rules for registration, avatars and bids
//! - Skills staging buffer
//! - Page routes and role-based dashboard lookup
//! - Configuration resolution and tracing setup

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod skills;
pub mod tracing_init;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{Bid, BidStatus, Category, Project, ProjectStatus, Role, UserProfile};
pub use routes::Route;
pub use skills::SkillsBuffer;
pub use validation::ValidationError;
