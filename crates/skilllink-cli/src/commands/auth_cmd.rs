//! Auth subcommands: login, register, logout, status.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use skilllink_core::model::{Category, Role};

use super::{Report, settle, unexpected};
use crate::api::MarketplaceApi;
use crate::controllers::{LoginController, ProfileController, RegisterController};
use crate::storage::ClientStorage;
use crate::tasks::TaskOutcome;

/// Auth subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AuthAction {
    /// Log in and store the session token.
    Login {
        /// Email address.
        #[arg(short, long)]
        email: String,
        /// Password.
        #[arg(short, long, env = "SKILLLINK_PASSWORD", hide_env_values = true)]
        password: String,
        /// Remember the email for the next login.
        #[arg(long)]
        remember: bool,
    },
    /// Create an account.
    Register(RegisterArgs),
    /// Forget the stored session token.
    Logout,
    /// Show who is logged in.
    Status,
}

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "SKILLLINK_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to the password.
    #[arg(long)]
    confirm_password: Option<String>,
    /// `freelancer` or `client`.
    #[arg(long, value_parser = parse_role)]
    role: Role,
    /// Professional title.
    #[arg(long, default_value = "")]
    title: String,
    /// Freelancer category, e.g. `developer`.
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
    #[arg(long, default_value = "")]
    bio: String,
    /// Comma-separated skills (freelancers only).
    #[arg(long, value_delimiter = ',')]
    skills: Vec<String>,
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("unknown role '{s}' (expected freelancer or client)"))
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).ok_or_else(|| {
        let known: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category '{s}' (expected one of {})", known.join(", "))
    })
}

/// Execute an auth subcommand.
pub async fn run<A: MarketplaceApi, W: Write>(
    action: AuthAction,
    api: &A,
    storage: &Arc<ClientStorage>,
    out: &mut W,
) -> anyhow::Result<()> {
    match action {
        AuthAction::Login {
            email,
            password,
            remember,
        } => login(api, storage, out, email, password, remember).await,
        AuthAction::Register(args) => register(api, storage, out, args).await,
        AuthAction::Logout => {
            storage.clear_auth_token()?;
            writeln!(out, "Logged out")?;
            Ok(())
        }
        AuthAction::Status => status(api, storage, out).await,
    }
}

async fn login<A: MarketplaceApi, W: Write>(
    api: &A,
    storage: &Arc<ClientStorage>,
    out: &mut W,
    email: String,
    password: String,
    remember: bool,
) -> anyhow::Result<()> {
    let mut controller = LoginController::mount(Arc::clone(storage), Duration::ZERO);
    controller.form.email = email;
    controller.form.password = password;
    controller.form.remember = remember;

    let effects = controller.begin_submit();
    let report = settle(api, effects, |outcome| match outcome {
        TaskOutcome::LoggedIn(result) => controller.finish_submit(result),
        other => unexpected(&other),
    })
    .await;
    conclude_with_destination(report, out)
}

async fn register<A: MarketplaceApi, W: Write>(
    api: &A,
    storage: &Arc<ClientStorage>,
    out: &mut W,
    args: RegisterArgs,
) -> anyhow::Result<()> {
    let mut controller = RegisterController::mount(Arc::clone(storage), Duration::ZERO);
    let input = &mut controller.input;
    input.first_name = args.first_name;
    input.last_name = args.last_name;
    input.email = args.email;
    input.confirm_password = args.confirm_password.unwrap_or_else(|| args.password.clone());
    input.password = args.password;
    input.title = args.title;
    input.bio = args.bio;
    input.category = args.category;
    input.skills = args.skills;
    controller.set_role(args.role);

    let effects = controller.begin_submit();
    let report = settle(api, effects, |outcome| match outcome {
        TaskOutcome::Registered(result) => controller.finish_submit(result),
        other => unexpected(&other),
    })
    .await;
    for (field, message) in &controller.field_errors {
        writeln!(out, "  {field}: {message}")?;
    }
    conclude_with_destination(report, out)
}

/// Like [`Report::conclude`], also naming the dashboard the UI would open.
fn conclude_with_destination<W: Write>(report: Report, out: &mut W) -> anyhow::Result<()> {
    let destination = report.redirect;
    report.conclude(out)?;
    if let Some(route) = destination {
        writeln!(out, "{}: {}", route.title(), route.path())?;
    }
    Ok(())
}

async fn status<A: MarketplaceApi, W: Write>(
    api: &A,
    storage: &Arc<ClientStorage>,
    out: &mut W,
) -> anyhow::Result<()> {
    if let Some(path) = storage.path() {
        writeln!(out, "Storage: {}", path.display())?;
    }
    if storage.auth_token().is_none() {
        writeln!(out, "Not logged in")?;
        return Ok(());
    }

    let mut controller = ProfileController::mount(Duration::ZERO);
    let effects = controller.begin_load();
    let report = settle(api, effects, |outcome| match outcome {
        TaskOutcome::ProfileLoaded(result) => controller.finish_load(result),
        other => unexpected(&other),
    })
    .await;
    match &controller.profile {
        Some(profile) => {
            writeln!(out, "Logged in as: {}", profile.display_name())?;
            if let Some(role) = profile.role {
                writeln!(out, "Role: {}", role.label())?;
            }
            Ok(())
        }
        None => report.conclude(out),
    }
}
