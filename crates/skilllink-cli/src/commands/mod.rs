//! Headless subcommands.
//!
//! Each command drives the same controllers as the terminal UI, runs the
//! tasks they request to completion and prints the rendered result as plain
//! text. User-facing output uses writeln! to stdout (this is a CLI binary,
//! not debug output).

pub mod auth_cmd;
pub mod bid_cmd;
pub mod profile_cmd;
pub mod project_cmd;

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;

use skilllink_core::Route;
use tracing::debug;

use crate::api::MarketplaceApi;
use crate::controllers::{Deferred, Effect, Notice, NoticeKind};
use crate::storage::ClientStorage;
use crate::tasks::{self, TaskOutcome};

pub use auth_cmd::AuthAction;
pub use bid_cmd::BidAction;
pub use profile_cmd::ProfileAction;
pub use project_cmd::ProjectAction;

/// Shown when a command needs a session the storage does not hold.
pub const LOGIN_REQUIRED: &str = "Not logged in. Run `skilllink auth login` first.";

/// Top-level headless commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Log in, register or inspect the stored session.
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse projects and submit proposals.
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// List and decide bids.
    Bids {
        #[command(subcommand)]
        action: BidAction,
    },
    /// Show and edit your profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

/// Execute a headless command.
pub async fn run<A: MarketplaceApi, W: Write>(
    command: Command,
    api: &A,
    storage: &Arc<ClientStorage>,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Auth { action } => auth_cmd::run(action, api, storage, out).await,
        Command::Projects { action } => project_cmd::run(action, api, storage, out).await,
        Command::Bids { action } => bid_cmd::run(action, api, storage, out).await,
        Command::Profile { action } => profile_cmd::run(action, api, out).await,
    }
}

/// What a chain of controller effects amounted to.
#[derive(Debug, Default)]
pub struct Report {
    pub notices: Vec<Notice>,
    /// Last navigation requested, immediate or deferred.
    pub redirect: Option<Route>,
}

impl Report {
    /// Print the notices and turn an error notice or a login redirect into
    /// an error.
    pub fn conclude<W: Write>(self, out: &mut W) -> anyhow::Result<()> {
        let mut failure = None;
        for notice in self.notices {
            match notice.kind {
                NoticeKind::Error => failure = Some(notice.message),
                NoticeKind::Success | NoticeKind::Info => writeln!(out, "{}", notice.message)?,
            }
        }
        if let Some(message) = failure {
            anyhow::bail!(message);
        }
        if self.redirect == Some(Route::Login) {
            anyhow::bail!(LOGIN_REQUIRED);
        }
        Ok(())
    }
}

/// Carry out `effects`, running every requested task and feeding its outcome
/// to `finish` until nothing is left to do. Delays are not waited out.
pub async fn settle<A: MarketplaceApi>(
    api: &A,
    effects: Vec<Effect>,
    mut finish: impl FnMut(TaskOutcome) -> Vec<Effect>,
) -> Report {
    let mut queue: VecDeque<Effect> = effects.into();
    let mut report = Report::default();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Notify(notice) => report.notices.push(notice),
            Effect::Run(task) => {
                let outcome = tasks::run(api, task).await;
                queue.extend(finish(outcome));
            }
            Effect::Navigate(route) | Effect::After(_, Deferred::Navigate(route)) => {
                report.redirect = Some(route);
            }
            Effect::After(_, deferred) => debug!(?deferred, "Skipping deferred UI work"),
        }
    }
    report
}

/// Log an outcome the running command did not ask for.
fn unexpected(outcome: &TaskOutcome) -> Vec<Effect> {
    debug!(?outcome, "Ignoring unexpected outcome");
    Vec::new()
}
