//! Login form.

use std::sync::Arc;
use std::time::Duration;

use skilllink_core::Route;
use skilllink_core::model::{AuthResponse, LoginRequest};
use skilllink_core::validation::check_credentials;
use tracing::{info, warn};

use super::{Deferred, Effect, GENERIC_ERROR, InFlight, server_message};
use crate::api::ApiError;
use crate::storage::ClientStorage;
use crate::tasks::Task;

pub const LOGIN_SUCCESS: &str = "Login successful! Redirecting to dashboard...";
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Remember the email for the next visit.
    pub remember: bool,
}

#[derive(Debug)]
pub struct LoginController {
    pub form: LoginForm,
    in_flight: InFlight,
    storage: Arc<ClientStorage>,
    redirect_delay: Duration,
}

impl LoginController {
    /// Mount the form, pre-filling a remembered email.
    pub fn mount(storage: Arc<ClientStorage>, redirect_delay: Duration) -> Self {
        let mut form = LoginForm::default();
        if let Some(email) = storage.saved_email() {
            form.email = email;
            form.remember = true;
        }
        Self {
            form,
            in_flight: InFlight::default(),
            storage,
            redirect_delay,
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_active()
    }

    pub fn begin_submit(&mut self) -> Vec<Effect> {
        if let Err(e) = check_credentials(&self.form.email, &self.form.password) {
            return vec![Effect::error(e.message)];
        }
        if let Err(busy) = self.in_flight.try_begin() {
            return vec![busy];
        }
        vec![Effect::Run(Task::Login(LoginRequest {
            email: self.form.email.trim().to_string(),
            password: self.form.password.clone(),
        }))]
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
                let remembered = self.form.remember.then(|| self.form.email.trim());
                if let Err(e) = self.storage.remember_email(remembered) {
                    warn!(error = %e, "Failed to persist remembered email");
                }
                let route = Route::dashboard_for(response.role());
                info!(destination = route.path(), "Login succeeded");
                vec![
                    Effect::success(LOGIN_SUCCESS),
                    Effect::After(self.redirect_delay, Deferred::Navigate(route)),
                ]
            }
            Err(err) if err.is_rejection() => {
                warn!(status = ?err.status(), "Login rejected");
                vec![Effect::error(
                    server_message(&err).unwrap_or_else(|| LOGIN_FAILED.to_string()),
                )]
            }
            Err(err) => {
                warn!(error = %err, "Login request failed");
                vec![Effect::error(GENERIC_ERROR)]
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;
    use skilllink_core::model::Role;

    use super::*;
    use crate::api::fake::{FakeApi, Reply};
    use crate::controllers::NoticeKind;
    use crate::controllers::testing::{has_task, message, task};
    use crate::tasks::{self, TaskOutcome};

    const DELAY: Duration = Duration::from_millis(1500);

    fn controller(storage: &Arc<ClientStorage>) -> LoginController {
        let mut login = LoginController::mount(Arc::clone(storage), DELAY);
        login.form.email = "ada@example.test".into();
        login.form.password = "engine42".into();
        login
    }

    async fn submit(login: &mut LoginController, api: &FakeApi) -> Vec<Effect> {
        let effects = login.begin_submit();
        assert!(login.is_busy());
        match tasks::run(api, task(&effects)).await {
            TaskOutcome::LoggedIn(result) => login.finish_submit(result),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    fn destination(effects: &[Effect]) -> Route {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::After(delay, Deferred::Navigate(route)) => {
                    assert_eq!(*delay, DELAY);
                    Some(*route)
                }
                _ => None,
            })
            .expect("navigation scheduled")
    }

    #[tokio::test]
    async fn role_selects_dashboard() {
        for (role, expected) in [
            (json!("freelancer"), Route::Dashboard(Some(Role::Freelancer))),
            (json!("client"), Route::Dashboard(Some(Role::Client))),
            (json!(null), Route::Dashboard(None)),
        ] {
            let storage = Arc::new(ClientStorage::in_memory());
            let api = FakeApi::new().reply(
                "login",
                Reply::Json(json!({"token": "t1", "user": {"role": role}})),
            );
            let mut login = controller(&storage);
            let effects = submit(&mut login, &api).await;
            assert!(!login.is_busy());
            assert_eq!(message(&effects, NoticeKind::Success), LOGIN_SUCCESS);
            assert_eq!(destination(&effects), expected);
            assert_eq!(storage.auth_token().as_deref(), Some("t1"));
        }
    }

    #[tokio::test]
    async fn remember_me_persists_or_forgets_email() {
        let storage = Arc::new(ClientStorage::in_memory());
        storage.remember_email(Some("old@example.test")).unwrap();
        let api = FakeApi::new().reply("login", Reply::Json(json!({"token": "t"})));

        let mut login = controller(&storage);
        assert!(login.form.remember, "remembered email checks the box on mount");
        login.form.remember = false;
        submit(&mut login, &api).await;
        assert!(storage.saved_email().is_none());

        let mut login = controller(&storage);
        login.form.remember = true;
        submit(&mut login, &api).await;
        assert_eq!(storage.saved_email().as_deref(), Some("ada@example.test"));

        let remounted = LoginController::mount(Arc::clone(&storage), DELAY);
        assert_eq!(remounted.form.email, "ada@example.test");
    }

    #[tokio::test]
    async fn server_message_or_fallback_on_rejection() {
        let storage = Arc::new(ClientStorage::in_memory());
        let api = FakeApi::new().reply("login", Reply::Status(400, r#"{"error": "Account locked"}"#));
        let effects = submit(&mut controller(&storage), &api).await;
        assert_eq!(message(&effects, NoticeKind::Error), "Account locked");

        let api = FakeApi::new().reply("login", Reply::Status(401, "{}"));
        let effects = submit(&mut controller(&storage), &api).await;
        assert_eq!(message(&effects, NoticeKind::Error), LOGIN_FAILED);
        assert!(storage.auth_token().is_none());
    }

    #[tokio::test]
    async fn transport_failure_is_generic() {
        let storage = Arc::new(ClientStorage::in_memory());
        let api = FakeApi::new().reply("login", Reply::Offline);
        let mut login = controller(&storage);
        let effects = submit(&mut login, &api).await;
        assert_eq!(message(&effects, NoticeKind::Error), GENERIC_ERROR);
        assert!(!login.is_busy());
    }

    #[test]
    fn empty_credentials_never_request() {
        let storage = Arc::new(ClientStorage::in_memory());
        let mut login = controller(&storage);
        login.form.password.clear();
        let effects = login.begin_submit();
        assert!(!has_task(&effects));
        assert!(!login.is_busy());
    }

    #[test]
    fn second_submit_refused_while_pending() {
        let storage = Arc::new(ClientStorage::in_memory());
        let mut login = controller(&storage);
        assert!(has_task(&login.begin_submit()));
        let effects = login.begin_submit();
        assert!(!has_task(&effects));
        assert_eq!(
            message(&effects, NoticeKind::Info),
            crate::controllers::BUSY_MESSAGE
        );
    }
}
