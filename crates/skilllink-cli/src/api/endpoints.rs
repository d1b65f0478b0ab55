//! REST endpoint paths, relative to the configured base URL.

pub const LOGIN: &str = "/users/login/";
pub const REGISTER: &str = "/users/register/";
pub const PROFILE: &str = "/users/profile/";
pub const AVAILABLE_PROJECTS: &str = "/projects/api/available/";
pub const MY_BIDS: &str = "/projects/api/my-bids/";

/// Server-rendered page that embeds the CSRF form field for bid actions.
pub const MARKETPLACE_PAGE: &str = "/projects/marketplace/";

pub fn project(id: u64) -> String {
    format!("/projects/api/{id}/")
}

pub fn create_bid(project_id: u64) -> String {
    format!("/projects/api/{project_id}/bid/create/")
}

pub fn project_bids(project_id: u64) -> String {
    format!("/projects/api/{project_id}/bids/")
}

pub fn accept_bid(bid_id: u64) -> String {
    format!("/projects/api/bids/{bid_id}/accept/")
}

pub fn reject_bid(bid_id: u64) -> String {
    format!("/projects/api/bids/{bid_id}/reject/")
}
