//! Registration form.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use skilllink_core::Route;
use skilllink_core::model::{AuthResponse, Category, Role};
use skilllink_core::validation::{PasswordStrength, RegistrationInput};
use tracing::{info, warn};

use super::{Deferred, Effect, GENERIC_ERROR, InFlight};
use crate::api::{ApiError, ErrorBody, first_message};
use crate::storage::ClientStorage;
use crate::tasks::Task;

pub const REGISTER_SUCCESS: &str = "Account created successfully! Redirecting to your dashboard...";
pub const REVIEW_INPUTS: &str = "Registration failed. Please review your inputs.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
pub const SERVER_ERROR: &str = "Server error. Please check the logs and try again.";

/// Fields whose error becomes the top-level message, highest priority first.
const MESSAGE_PRIORITY: [&str; 7] = [
    "email",
    "password",
    "confirm_password",
    "first_name",
    "last_name",
    "bio",
    "role",
];

/// Skills a freelancer can tick at sign-up.
pub const SKILL_OPTIONS: [&str; 10] = [
    "Web Development",
    "Mobile Development",
    "UI/UX Design",
    "Graphic Design",
    "Content Writing",
    "SEO",
    "Data Analysis",
    "Digital Marketing",
    "Translation",
    "Video Editing",
];

#[derive(Debug)]
pub struct RegisterController {
    pub input: RegistrationInput,
    /// Inline error per field, from the last server rejection.
    pub field_errors: BTreeMap<String, String>,
    in_flight: InFlight,
    storage: Arc<ClientStorage>,
    redirect_delay: Duration,
}

impl RegisterController {
    pub fn mount(storage: Arc<ClientStorage>, redirect_delay: Duration) -> Self {
        Self {
            input: RegistrationInput::default(),
            field_errors: BTreeMap::new(),
            in_flight: InFlight::default(),
            storage,
            redirect_delay,
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_active()
    }

    pub const fn set_role(&mut self, role: Role) {
        self.input.role = Some(role);
    }

    pub const fn set_category(&mut self, category: Option<Category>) {
        self.input.category = category;
    }

    /// Tick or untick a skill checkbox.
    pub fn toggle_skill(&mut self, skill: &str) {
        if let Some(pos) = self.input.skills.iter().position(|s| s == skill) {
            self.input.skills.remove(pos);
        } else {
            self.input.skills.push(skill.to_string());
        }
    }

    pub fn is_skill_checked(&self, skill: &str) -> bool {
        self.input.skills.iter().any(|s| s == skill)
    }

    /// Category and skills apply to freelancers only.
    pub fn shows_freelancer_fields(&self) -> bool {
        self.input.role != Some(Role::Client)
    }

    pub fn strength(&self) -> PasswordStrength {
        PasswordStrength::score(&self.input.password)
    }

    pub const fn submit_label(&self) -> &'static str {
        match self.input.role {
            Some(Role::Freelancer) => "Create Account & Start Earning",
            Some(Role::Client) => "Create Account & Start Hiring",
            None => "Create Account",
        }
    }

    pub fn begin_submit(&mut self) -> Vec<Effect> {
        self.field_errors.clear();
        let registration = match self.input.validate() {
            Ok(registration) => registration,
            Err(e) => return vec![Effect::error(e.message)],
        };
        if let Err(busy) = self.in_flight.try_begin() {
            return vec![busy];
        }
        vec![Effect::Run(Task::Register(registration))]
    }

    pub fn finish_submit(&mut self, result: Result<AuthResponse, ApiError>) -> Vec<Effect> {
        self.in_flight.settle();
        match result {
            Ok(response) => {
                if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty())
                    && let Err(e) = self.storage.set_auth_token(token)
                {
                    warn!(error = %e, "Failed to persist auth token");
                }
                let route = Route::dashboard_for(response.role().or(self.input.role));
                info!(destination = route.path(), "Registration succeeded");
                vec![
                    Effect::success(REGISTER_SUCCESS),
                    Effect::After(self.redirect_delay, Deferred::Navigate(route)),
                ]
            }
            Err(ApiError::Server { status, body, .. }) => {
                warn!(status, "Registration rejected");
                self.field_errors = body.field_errors().into_iter().collect();
                vec![Effect::error(registration_error_message(&body))]
            }
            Err(err) => {
                warn!(error = %err, "Registration request failed");
                vec![Effect::error(GENERIC_ERROR)]
            }
        }
    }
}

/// Choose the single top-level message for a rejected registration.
pub fn registration_error_message(body: &ErrorBody) -> String {
    let ErrorBody::Json(value) = body else {
        return SERVER_ERROR.to_string();
    };
    let Value::Object(map) = value else {
        return first_message(value).unwrap_or_else(|| REGISTER_FAILED.to_string());
    };
    let present = |key: &str| map.get(key).filter(|v| is_truthy(v));

    if let Some(message) = MESSAGE_PRIORITY
        .iter()
        .find_map(|key| present(key))
        .and_then(head_message)
    {
        return message;
    }
    if let Some(detail) = present("detail") {
        return detail
            .as_str()
            .map_or_else(|| REVIEW_INPUTS.to_string(), str::to_string);
    }
    present("non_field_errors")
        .and_then(head_message)
        .or_else(|| map.values().next().and_then(head_message))
        .unwrap_or_else(|| REGISTER_FAILED.to_string())
}

fn head_message(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(first_message),
        other => first_message(other),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
