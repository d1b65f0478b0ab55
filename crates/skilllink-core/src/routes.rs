//! Page routes and role-based dashboard lookup.

use crate::model::Role;

/// A navigable page of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Marketplace,
    Profile,
    /// Dashboard for the given role; `None` is the generic dashboard.
    Dashboard(Option<Role>),
}

impl Route {
    /// Destination after a successful login or registration.
    pub const fn dashboard_for(role: Option<Role>) -> Self {
        Self::Dashboard(role)
    }

    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/users/login/",
            Self::Register => "/users/register/",
            Self::Marketplace => "/projects/marketplace/",
            Self::Profile => "/users/profile/",
            Self::Dashboard(None) => "/users/dashboard/",
            Self::Dashboard(Some(Role::Freelancer)) => "/users/dashboard/freelancer/",
            Self::Dashboard(Some(Role::Client)) => "/users/dashboard/client/",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        [
            Self::Login,
            Self::Register,
            Self::Marketplace,
            Self::Profile,
            Self::Dashboard(None),
            Self::Dashboard(Some(Role::Freelancer)),
            Self::Dashboard(Some(Role::Client)),
        ]
        .into_iter()
        .find(|route| route.path() == path)
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Log In",
            Self::Register => "Create Account",
            Self::Marketplace => "Marketplace",
            Self::Profile => "My Profile",
            Self::Dashboard(None) => "Dashboard",
            Self::Dashboard(Some(Role::Freelancer)) => "Freelancer Dashboard",
            Self::Dashboard(Some(Role::Client)) => "Client Dashboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_lookup_by_role() {
        assert_eq!(
            Route::dashboard_for(Some(Role::Freelancer)).path(),
            "/users/dashboard/freelancer/"
        );
        assert_eq!(
            Route::dashboard_for(Some(Role::Client)).path(),
            "/users/dashboard/client/"
        );
        assert_eq!(Route::dashboard_for(None).path(), "/users/dashboard/");
    }

    #[test]
    fn paths_round_trip() {
        for path in ["/users/login/", "/projects/marketplace/", "/users/dashboard/client/"] {
            assert_eq!(Route::from_path(path).map(Route::path), Some(path));
        }
        assert_eq!(Route::from_path("/nowhere/"), None);
    }
}
