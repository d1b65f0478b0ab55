//! Form controllers.
//!
//! Each controller owns the state of one form or page area. Its methods are
//! synchronous: `begin_*` validates input and returns the [`Task`] to run,
//! `finish_*` applies the task's outcome. Side effects the page has to carry
//! out are returned as [`Effect`]s.

pub mod login;
pub mod marketplace;
pub mod profile;
pub mod register;

use std::time::Duration;

use skilllink_core::Route;

use crate::api::ApiError;
use crate::tasks::Task;

pub use login::LoginController;
pub use marketplace::MarketplaceController;
pub use profile::ProfileController;
pub use register::RegisterController;

/// Shown when a form is submitted while its previous request is pending.
pub const BUSY_MESSAGE: &str = "Please wait for the current request to finish.";

/// Generic message for failures that never reached the server.
pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Work a controller schedules for later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    Navigate(Route),
    CloseEditModal,
    CloseSkillsModal,
}

/// Something the page must do on a controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notice),
    Run(Task),
    /// Carry out `Deferred` once the delay has elapsed.
    After(Duration, Deferred),
    Navigate(Route),
}

impl Effect {
    pub fn success(message: impl Into<String>) -> Self {
        Self::notify(NoticeKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::notify(NoticeKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::notify(NoticeKind::Info, message)
    }

    fn notify(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self::Notify(Notice {
            kind,
            message: message.into(),
        })
    }
}

/// Per-form guard allowing one outstanding request at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight {
    active: bool,
}

impl InFlight {
    /// Claim the form, or return the refusal notice if it is busy.
    pub fn try_begin(&mut self) -> Result<(), Effect> {
        if self.active {
            return Err(Effect::info(BUSY_MESSAGE));
        }
        self.active = true;
        Ok(())
    }

    pub fn settle(&mut self) {
        self.active = false;
    }

    pub const fn is_active(self) -> bool {
        self.active
    }
}

/// The `detail` message of a server rejection, taking a text body as the
/// detail.
fn server_detail(err: &ApiError) -> Option<String> {
    match err {
        ApiError::Server { body, .. } => body.detail(),
        _ => None,
    }
}

/// The `detail` field of a JSON server rejection.
fn json_detail(err: &ApiError) -> Option<String> {
    match err {
        ApiError::Server { body, .. } => body.field_message("detail"),
        _ => None,
    }
}

/// The extracted message of a JSON server rejection. Raw text bodies
/// (error pages) are not shown.
fn server_message(err: &ApiError) -> Option<String> {
    match err {
        ApiError::Server { body, message, .. } if body.is_json() => message.clone(),
        _ => None,
    }
}
