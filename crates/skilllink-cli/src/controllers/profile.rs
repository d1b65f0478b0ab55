//! Profile page: loading, the edit modal, avatar upload and the skills modal.

use std::path::Path;
use std::time::Duration;

use skilllink_core::Route;
use skilllink_core::SkillsBuffer;
use skilllink_core::model::{ProfileEdit, UserProfile};
use skilllink_core::validation::split_display_name;
use tracing::{debug, info, warn};

use super::{Deferred, Effect, GENERIC_ERROR, InFlight, server_detail};
use crate::api::{ApiError, ProfileUpdate};
use crate::avatar::AvatarSelection;
use crate::tasks::Task;

pub const LOAD_FAILED: &str = "Failed to load profile data";
pub const LOAD_ERROR: &str = "An error occurred while loading your profile";
pub const PROFILE_SAVED: &str = "Profile updated successfully!";
pub const AVATAR_SAVED: &str = "Profile picture updated successfully!";
pub const AVATAR_FAILED: &str = "Failed to upload profile picture";
pub const AVATAR_ERROR: &str = "An error occurred while uploading. Please try again.";
pub const SKILLS_SAVED: &str = "Skills updated successfully!";
pub const SKILLS_FAILED: &str = "Failed to update skills.";

/// Contents of the edit modal. The name is a single field split on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
}

impl EditForm {
    pub fn prefill(profile: &UserProfile) -> Self {
        Self {
            name: profile.edit_name(),
            title: profile.title.clone().unwrap_or_default(),
            bio: profile.bio.clone().unwrap_or_default(),
            email: profile.email.clone(),
        }
    }

    pub fn to_edit(&self) -> ProfileEdit {
        let (first_name, last_name) = split_display_name(&self.name);
        ProfileEdit {
            first_name,
            last_name,
            title: self.title.clone(),
            bio: self.bio.clone(),
            email: self.email.clone(),
        }
    }
}

/// The skills modal: a staging buffer plus the "new skill" input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillsModal {
    pub buffer: SkillsBuffer,
    pub input: String,
}

#[derive(Debug, Default)]
pub struct ProfileController {
    /// Last profile the server confirmed.
    pub profile: Option<UserProfile>,
    pub loading: bool,
    /// Open edit modal.
    pub edit: Option<EditForm>,
    /// Open skills modal.
    pub skills: Option<SkillsModal>,
    /// Avatar chosen but not yet confirmed by the server.
    pub staged_avatar: Option<AvatarSelection>,
    /// `data:` URL of the staged avatar.
    pub avatar_preview: Option<String>,
    in_flight: InFlight,
    redirect_delay: Duration,
}

impl ProfileController {
    pub fn mount(redirect_delay: Duration) -> Self {
        Self {
            redirect_delay,
            ..Self::default()
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_active()
    }

    pub fn begin_load(&mut self) -> Vec<Effect> {
        self.loading = true;
        vec![Effect::Run(Task::LoadProfile)]
    }

    pub fn finish_load(&mut self, result: Result<UserProfile, ApiError>) -> Vec<Effect> {
        self.loading = false;
        match result {
            Ok(profile) => {
                debug!(user = %profile.username, "Profile loaded");
                self.profile = Some(profile);
                Vec::new()
            }
            Err(err) if err.is_auth_failure() => {
                info!("Profile requires login");
                vec![Effect::Navigate(Route::Login)]
            }
            Err(err) if err.is_rejection() => {
                warn!(status = ?err.status(), "Profile load rejected");
                vec![Effect::error(LOAD_FAILED)]
            }
            Err(err) => {
                warn!(error = %err, "Profile load failed");
                vec![Effect::error(LOAD_ERROR)]
            }
        }
    }

    /// Open the edit modal prefilled from the held profile.
    pub fn open_edit(&mut self) {
        if let Some(profile) = &self.profile {
            self.edit = Some(EditForm::prefill(profile));
        }
    }

    pub fn close_edit(&mut self) {
        self.edit = None;
    }

    pub fn begin_save(&mut self) -> Vec<Effect> {
        let Some(form) = &self.edit else {
            return Vec::new();
        };
        let edit = form.to_edit();
        if let Err(busy) = self.in_flight.try_begin() {
            return vec![busy];
        }
        vec![Effect::Run(Task::SaveProfile(ProfileUpdate::Fields {
            edit,
            avatar: self.staged_avatar.clone(),
        }))]
    }

    pub fn finish_save(&mut self, result: Result<Option<UserProfile>, ApiError>) -> Vec<Effect> {
        self.in_flight.settle();
        match result {
            Ok(updated) => {
                if let Some(profile) = updated {
                    self.profile = Some(profile);
                }
                self.staged_avatar = None;
                vec![
                    Effect::success(PROFILE_SAVED),
                    Effect::After(self.redirect_delay, Deferred::CloseEditModal),
                ]
            }
            Err(err) => match err.status() {
                Some(status) => {
                    warn!(status, "Profile update rejected");
                    vec![Effect::error(server_detail(&err).unwrap_or_else(|| {
                        format!("Failed to update profile. Status: {status}")
                    }))]
                }
                None => {
                    warn!(error = %err, "Profile update failed");
                    vec![Effect::error(GENERIC_ERROR)]
                }
            },
        }
    }

    /// Validate an avatar file, then preview and upload it.
    pub fn select_avatar(&mut self, path: &Path) -> Vec<Effect> {
        let selection = match AvatarSelection::inspect(path) {
            Ok(selection) => selection,
            Err(e) => return vec![Effect::error(e.message)],
        };
        if let Err(busy) = self.in_flight.try_begin() {
            return vec![busy];
        }
        info!(file = %selection.file_name, size = selection.size, "Uploading avatar");
        self.staged_avatar = Some(selection.clone());
        vec![
            Effect::Run(Task::PreviewAvatar(selection.clone())),
            Effect::Run(Task::UploadAvatar(selection)),
        ]
    }

    pub fn finish_preview(&mut self, result: std::io::Result<String>) {
        match result {
            Ok(data_url) => self.avatar_preview = Some(data_url),
            Err(e) => warn!(error = %e, "Avatar preview failed"),
        }
    }

    pub fn finish_avatar_upload(
        &mut self,
        result: Result<Option<UserProfile>, ApiError>,
    ) -> Vec<Effect> {
        self.in_flight.settle();
        match result {
            Ok(updated) => {
                if let Some(profile) = updated {
                    self.profile = Some(profile);
                }
                self.staged_avatar = None;
                vec![Effect::success(AVATAR_SAVED)]
            }
            Err(err) if err.is_rejection() => {
                warn!(status = ?err.status(), "Avatar upload rejected");
                vec![Effect::error(
                    server_detail(&err).unwrap_or_else(|| AVATAR_FAILED.to_string()),
                )]
            }
            Err(err) => {
                warn!(error = %err, "Avatar upload failed");
                vec![Effect::error(AVATAR_ERROR)]
            }
        }
    }

    /// Open the skills modal with a copy of the held skills.
    pub fn open_skills(&mut self) {
        let current = self.profile.as_ref().map_or(&[][..], |p| &p.skills[..]);
        self.skills = Some(SkillsModal {
            buffer: SkillsBuffer::open(current),
            input: String::new(),
        });
    }

    /// Close the skills modal, discarding unsaved changes.
    pub fn close_skills(&mut self) {
        self.skills = None;
    }

    /// Stage the typed skill.
    pub fn add_skill(&mut self) -> Vec<Effect> {
        let Some(modal) = &mut self.skills else {
            return Vec::new();
        };
        match modal.buffer.add(&modal.input) {
            Ok(()) => {
                modal.input.clear();
                Vec::new()
            }
            Err(e) => vec![Effect::error(e.message)],
        }
    }

    pub fn remove_skill(&mut self, index: usize) {
        if let Some(modal) = &mut self.skills {
            modal.buffer.remove(index);
        }
    }

    pub fn begin_save_skills(&mut self) -> Vec<Effect> {
        let Some(modal) = &self.skills else {
            return Vec::new();
        };
        let skills = modal.buffer.to_vec();
        if let Err(busy) = self.in_flight.try_begin() {
            return vec![busy];
        }
        vec![Effect::Run(Task::SaveSkills(skills))]
    }

    pub fn finish_save_skills(
        &mut self,
        result: Result<Option<UserProfile>, ApiError>,
    ) -> Vec<Effect> {
        self.in_flight.settle();
        match result {
            Ok(updated) => {
                if let Some(profile) = updated {
                    self.profile = Some(profile);
                } else if let (Some(held), Some(modal)) = (self.profile.as_mut(), &self.skills) {
                    held.skills = modal.buffer.to_vec();
                }
                vec![
                    Effect::success(SKILLS_SAVED),
                    Effect::After(self.redirect_delay, Deferred::CloseSkillsModal),
                ]
            }
            Err(err) if err.is_rejection() => {
                warn!(status = ?err.status(), "Skills update rejected");
                vec![Effect::error(
                    server_detail(&err).unwrap_or_else(|| SKILLS_FAILED.to_string()),
                )]
            }
            Err(err) => {
                warn!(error = %err, "Skills update failed");
                vec![Effect::error(GENERIC_ERROR)]
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::fake::{FakeApi, Reply, profile_json};
    use crate::controllers::NoticeKind;
    use crate::controllers::testing::{has_task, message, task};
    use crate::tasks::{self, TaskOutcome};

    const DELAY: Duration = Duration::from_millis(1500);

    async fn loaded() -> ProfileController {
        let api = FakeApi::new().reply("fetch_profile", Reply::Json(profile_json()));
        let mut profile = ProfileController::mount(DELAY);
        let effects = profile.begin_load();
        let TaskOutcome::ProfileLoaded(result) = tasks::run(&api, task(&effects)).await else {
            panic!("expected profile outcome");
        };
        assert!(profile.finish_load(result).is_empty());
        profile
    }

    async fn run(api: &FakeApi, task: Task) -> TaskOutcome {
        tasks::run(api, task).await
    }

    #[tokio::test]
    async fn forbidden_load_redirects_to_login() {
        let api = FakeApi::new().reply("fetch_profile", Reply::Status(403, r#"{"detail": "no"}"#));
        let mut profile = ProfileController::mount(DELAY);
        let TaskOutcome::ProfileLoaded(result) = run(&api, task(&profile.begin_load())).await
        else {
            panic!("expected profile outcome");
        };
        assert_eq!(profile.finish_load(result), vec![Effect::Navigate(Route::Login)]);
    }

    #[tokio::test]
    async fn load_failures_distinguish_server_and_transport() {
        for (reply, expected) in [
            (Reply::Status(500, ""), LOAD_FAILED),
            (Reply::Offline, LOAD_ERROR),
        ] {
            let api = FakeApi::new().reply("fetch_profile", reply);
            let mut profile = ProfileController::mount(DELAY);
            let TaskOutcome::ProfileLoaded(result) =
                run(&api, task(&profile.begin_load())).await
            else {
                panic!("expected profile outcome");
            };
            let effects = profile.finish_load(result);
            assert_eq!(message(&effects, NoticeKind::Error), expected);
            assert!(profile.profile.is_none());
        }
    }

    #[tokio::test]
    async fn save_splits_name_and_replaces_profile() {
        let mut updated = profile_json();
        updated["first_name"] = json!("Augusta");
        updated["last_name"] = json!("Ada King");
        let api = FakeApi::new().reply("update_profile", Reply::Json(updated));

        let mut profile = loaded().await;
        profile.open_edit();
        assert_eq!(profile.edit.as_ref().unwrap().name, "Ada Lovelace");
        profile.edit.as_mut().unwrap().name = "Augusta Ada King".into();

        let effects = profile.begin_save();
        let Task::SaveProfile(ProfileUpdate::Fields { edit, avatar }) = task(&effects) else {
            panic!("expected a profile save");
        };
        assert_eq!(edit.first_name, "Augusta");
        assert_eq!(edit.last_name, "Ada King");
        assert!(avatar.is_none());

        let TaskOutcome::ProfileSaved(result) = run(&api, task(&effects)).await else {
            panic!("expected save outcome");
        };
        let effects = profile.finish_save(result);
        assert_eq!(message(&effects, NoticeKind::Success), PROFILE_SAVED);
        assert!(effects.contains(&Effect::After(DELAY, Deferred::CloseEditModal)));
        assert_eq!(profile.profile.as_ref().unwrap().first_name, "Augusta");
        assert_eq!(api.calls(), vec!["update_profile json"]);
    }

    #[tokio::test]
    async fn save_failure_reports_detail_or_status() {
        let mut profile = loaded().await;
        profile.open_edit();

        let api = FakeApi::new().reply("update_profile", Reply::Status(400, r#"{"detail": "Email in use"}"#));
        let TaskOutcome::ProfileSaved(result) = run(&api, task(&profile.begin_save())).await else {
            panic!("expected save outcome");
        };
        assert_eq!(message(&profile.finish_save(result), NoticeKind::Error), "Email in use");

        let api = FakeApi::new().reply("update_profile", Reply::Status(400, r#"{"email": ["Invalid"]}"#));
        let TaskOutcome::ProfileSaved(result) = run(&api, task(&profile.begin_save())).await else {
            panic!("expected save outcome");
        };
        assert_eq!(
            message(&profile.finish_save(result), NoticeKind::Error),
            "Failed to update profile. Status: 400"
        );
        assert_eq!(profile.profile.as_ref().unwrap().first_name, "Ada");
    }

    #[test]
    fn oversized_avatar_never_previewed_or_uploaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        std::fs::write(&path, vec![0u8; 6 * 1000 * 1000]).unwrap();

        let mut profile = ProfileController::mount(DELAY);
        let effects = profile.select_avatar(&path);
        assert!(!has_task(&effects));
        assert_eq!(
            message(&effects, NoticeKind::Error),
            "File size must be less than 5MB"
        );
        assert!(profile.staged_avatar.is_none());
        assert!(!profile.is_busy());
    }

    #[test]
    fn non_image_avatar_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut profile = ProfileController::mount(DELAY);
        let effects = profile.select_avatar(&path);
        assert!(!has_task(&effects));
        assert_eq!(
            message(&effects, NoticeKind::Error),
            "Please select a valid image file"
        );
    }

    #[tokio::test]
    async fn avatar_previewed_then_uploaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        let api = FakeApi::new().reply("update_profile", Reply::Json(profile_json()));

        let mut profile = loaded().await;
        let effects = profile.select_avatar(&path);
        assert_eq!(effects.len(), 2);
        assert!(profile.staged_avatar.is_some());

        // A form save while the upload is pending is refused.
        profile.open_edit();
        assert_eq!(
            message(&profile.begin_save(), NoticeKind::Info),
            crate::controllers::BUSY_MESSAGE
        );

        for effect in effects {
            let Effect::Run(job) = effect else { continue };
            match run(&api, job).await {
                TaskOutcome::AvatarPreviewed(result) => profile.finish_preview(result),
                TaskOutcome::AvatarUploaded(result) => {
                    let effects = profile.finish_avatar_upload(result);
                    assert_eq!(message(&effects, NoticeKind::Success), AVATAR_SAVED);
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert_eq!(profile.avatar_preview.as_deref(), Some("data:image/png;base64,AQID"));
        assert!(profile.staged_avatar.is_none());
        assert!(!profile.is_busy());
        assert_eq!(api.calls().last().unwrap(), "update_profile avatar me.png");
    }

    #[test]
    fn avatar_upload_failure_messages() {
        let mut profile = ProfileController::mount(DELAY);
        let rejected = ApiError::server(413, crate::api::ErrorBody::parse("{}"));
        assert_eq!(
            message(&profile.finish_avatar_upload(Err(rejected)), NoticeKind::Error),
            AVATAR_FAILED
        );
        let offline = ApiError::Io(std::io::Error::other("reset"));
        assert_eq!(
            message(&profile.finish_avatar_upload(Err(offline)), NoticeKind::Error),
            AVATAR_ERROR
        );
    }

    #[tokio::test]
    async fn skills_staging_does_not_touch_profile_until_saved() {
        let mut profile = loaded().await;
        profile.open_skills();
        profile.skills.as_mut().unwrap().input = "  Go ".into();
        assert!(profile.add_skill().is_empty());
        profile.skills.as_mut().unwrap().input = "Rust".into();
        assert_eq!(
            message(&profile.add_skill(), NoticeKind::Error),
            "This skill is already added"
        );
        profile.remove_skill(1);
        assert_eq!(
            profile.skills.as_ref().unwrap().buffer.as_slice(),
            ["Rust", "Go"]
        );
        assert_eq!(profile.profile.as_ref().unwrap().skills, vec!["Rust", "Math"]);

        let api = FakeApi::new().reply("update_profile", Reply::Empty);
        let effects = profile.begin_save_skills();
        let TaskOutcome::SkillsSaved(result) = run(&api, task(&effects)).await else {
            panic!("expected skills outcome");
        };
        let effects = profile.finish_save_skills(result);
        assert_eq!(message(&effects, NoticeKind::Success), SKILLS_SAVED);
        assert!(effects.contains(&Effect::After(DELAY, Deferred::CloseSkillsModal)));
        assert_eq!(profile.profile.as_ref().unwrap().skills, vec!["Rust", "Go"]);
        assert_eq!(api.calls().last().unwrap(), "update_profile skills Rust,Go");
    }

    #[tokio::test]
    async fn closing_skills_modal_discards_changes() {
        let mut profile = loaded().await;
        profile.open_skills();
        profile.remove_skill(0);
        profile.close_skills();
        profile.open_skills();
        assert_eq!(
            profile.skills.as_ref().unwrap().buffer.as_slice(),
            ["Rust", "Math"]
        );
    }

    #[test]
    fn text_error_bodies_are_shown_as_detail() {
        let mut profile = ProfileController::mount(DELAY);
        let text = || ApiError::server(502, crate::api::ErrorBody::parse("Upstream timed out\n"));
        assert_eq!(
            message(&profile.finish_save(Err(text())), NoticeKind::Error),
            "Upstream timed out"
        );
        assert_eq!(
            message(&profile.finish_avatar_upload(Err(text())), NoticeKind::Error),
            "Upstream timed out"
        );
        assert_eq!(
            message(&profile.finish_save_skills(Err(text())), NoticeKind::Error),
            "Upstream timed out"
        );
    }

    #[tokio::test]
    async fn skills_failure_uses_detail_or_fallback() {
        let mut profile = loaded().await;
        profile.open_skills();
        let api = FakeApi::new().reply("update_profile", Reply::Status(400, r#"{"skills": ["bad"]}"#));
        let TaskOutcome::SkillsSaved(result) = run(&api, task(&profile.begin_save_skills())).await
        else {
            panic!("expected skills outcome");
        };
        assert_eq!(
            message(&profile.finish_save_skills(result), NoticeKind::Error),
            SKILLS_FAILED
        );
    }
}
