//! Profile subcommands: show, update, avatar, skills.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use super::{settle, unexpected};
use crate::api::MarketplaceApi;
use crate::controllers::ProfileController;
use crate::controllers::profile::LOAD_FAILED;
use crate::tasks::TaskOutcome;
use crate::view::{profile_card, skill_tags};

#[derive(clap::Subcommand, Debug)]
pub enum ProfileAction {
    /// Print your profile card.
    Show,
    /// Change profile fields; omitted fields keep their value.
    Update {
        /// Full name, split into first and last name.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Upload a new profile picture.
    Avatar { path: PathBuf },
    /// List skills, or add and remove some.
    Skills {
        #[arg(long)]
        add: Vec<String>,
        #[arg(long)]
        remove: Vec<String>,
    },
}

pub async fn run<A: MarketplaceApi, W: Write>(
    action: ProfileAction,
    api: &A,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut controller = ProfileController::mount(Duration::ZERO);
    match action {
        ProfileAction::Show => {
            load(api, &mut controller, out).await?;
            print_card(&controller, out)
        }
        ProfileAction::Update {
            name,
            title,
            bio,
            email,
        } => {
            load(api, &mut controller, out).await?;
            controller.open_edit();
            if let Some(form) = &mut controller.edit {
                let fields = [
                    (&mut form.name, name),
                    (&mut form.title, title),
                    (&mut form.bio, bio),
                    (&mut form.email, email),
                ];
                for (field, value) in fields {
                    if let Some(value) = value {
                        *field = value;
                    }
                }
            }
            let effects = controller.begin_save();
            let report = settle(api, effects, |outcome| match outcome {
                TaskOutcome::ProfileSaved(result) => controller.finish_save(result),
                other => unexpected(&other),
            })
            .await;
            report.conclude(out)?;
            print_card(&controller, out)
        }
        ProfileAction::Avatar { path } => {
            let effects = controller.select_avatar(&path);
            let report = settle(api, effects, |outcome| match outcome {
                TaskOutcome::AvatarPreviewed(result) => {
                    controller.finish_preview(result);
                    Vec::new()
                }
                TaskOutcome::AvatarUploaded(result) => controller.finish_avatar_upload(result),
                other => unexpected(&other),
            })
            .await;
            report.conclude(out)
        }
        ProfileAction::Skills { add, remove } => {
            load(api, &mut controller, out).await?;
            if add.is_empty() && remove.is_empty() {
                let skills = controller.profile.as_ref().map_or(&[][..], |p| &p.skills[..]);
                writeln!(out, "{}", skill_tags(skills, false).plain_text())?;
                return Ok(());
            }
            edit_skills(api, &mut controller, out, add, remove).await
        }
    }
}

async fn load<A: MarketplaceApi, W: Write>(
    api: &A,
    controller: &mut ProfileController,
    out: &mut W,
) -> anyhow::Result<()> {
    let effects = controller.begin_load();
    let report = settle(api, effects, |outcome| match outcome {
        TaskOutcome::ProfileLoaded(result) => controller.finish_load(result),
        other => unexpected(&other),
    })
    .await;
    report.conclude(out)?;
    if controller.profile.is_none() {
        anyhow::bail!(LOAD_FAILED);
    }
    Ok(())
}

fn print_card<W: Write>(controller: &ProfileController, out: &mut W) -> anyhow::Result<()> {
    if let Some(profile) = &controller.profile {
        writeln!(out, "{}", profile_card(profile, false).plain_text())?;
    }
    Ok(())
}

async fn edit_skills<A: MarketplaceApi, W: Write>(
    api: &A,
    controller: &mut ProfileController,
    out: &mut W,
    add: Vec<String>,
    remove: Vec<String>,
) -> anyhow::Result<()> {
    controller.open_skills();
    let mut staged = Vec::new();
    for skill in add {
        if let Some(modal) = &mut controller.skills {
            modal.input = skill;
        }
        staged.extend(controller.add_skill());
    }
    settle(api, staged, |outcome| unexpected(&outcome))
        .await
        .conclude(out)?;

    for skill in remove {
        let index = controller.skills.as_ref().and_then(|modal| {
            modal
                .buffer
                .as_slice()
                .iter()
                .position(|s| s == skill.trim())
        });
        match index {
            Some(index) => controller.remove_skill(index),
            None => anyhow::bail!("No skill named '{skill}'"),
        }
    }

    let effects = controller.begin_save_skills();
    let report = settle(api, effects, |outcome| match outcome {
        TaskOutcome::SkillsSaved(result) => controller.finish_save_skills(result),
        other => unexpected(&other),
    })
    .await;
    report.conclude(out)?;
    let skills = controller.profile.as_ref().map_or(&[][..], |p| &p.skills[..]);
    writeln!(out, "{}", skill_tags(skills, false).plain_text())?;
    Ok(())
}
