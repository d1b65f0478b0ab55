//! Project subcommands: list, show, bid.

use std::io::Write;
use std::sync::Arc;

use skilllink_core::model::{ProjectFilters, ProjectStatus};

use super::{settle, unexpected};
use crate::api::MarketplaceApi;
use crate::controllers::MarketplaceController;
use crate::controllers::marketplace::Listing;
use crate::storage::ClientStorage;
use crate::tasks::TaskOutcome;
use crate::view::{LISTING_FAILED, project_detail, project_list};

#[derive(clap::Subcommand, Debug)]
pub enum ProjectAction {
    /// List marketplace projects.
    List(ListArgs),
    /// Show one project.
    Show { id: u64 },
    /// Submit a proposal on a project.
    Bid {
        id: u64,
        /// Bid amount in rupees.
        #[arg(long)]
        amount: String,
        /// Delivery time in days.
        #[arg(long)]
        days: String,
        #[arg(long)]
        proposal: String,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    /// Free-text search.
    #[arg(long, default_value = "")]
    search: String,
    /// `open`, `in_progress`, `completed` or `cancelled`.
    #[arg(long, value_parser = parse_status)]
    status: Option<ProjectStatus>,
    #[arg(long, default_value = "")]
    min_budget: String,
    #[arg(long, default_value = "")]
    max_budget: String,
    /// Ordering field, e.g. `-created_at`.
    #[arg(long, default_value = "")]
    ordering: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

fn parse_status(s: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(s).ok_or_else(|| format!("unknown status '{s}'"))
}

pub async fn run<A: MarketplaceApi, W: Write>(
    action: ProjectAction,
    api: &A,
    storage: &Arc<ClientStorage>,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut market = MarketplaceController::mount(Arc::clone(storage));
    match action {
        ProjectAction::List(args) => {
            market.filters = ProjectFilters {
                search: args.search,
                status: args.status,
                min_budget: args.min_budget,
                max_budget: args.max_budget,
                ordering: args.ordering,
                page: None,
            };
            let effects = market.search_page(args.page.max(1));
            let report = settle(api, effects, |outcome| match outcome {
                TaskOutcome::ProjectsLoaded(result) => market.finish_load(result),
                other => unexpected(&other),
            })
            .await;
            report.conclude(out)?;
            if market.listing == Listing::Failed {
                anyhow::bail!(LISTING_FAILED);
            }
            writeln!(out, "{}", project_list(&market.listing, None).plain_text())?;
            writeln!(out, "Page {}", market.page())?;
            Ok(())
        }
        ProjectAction::Show { id } => {
            let effects = market.view_project(id);
            let report = settle(api, effects, |outcome| match outcome {
                TaskOutcome::ProjectLoaded(result) => market.finish_view(result),
                other => unexpected(&other),
            })
            .await;
            report.conclude(out)?;
            if let Some(project) = &market.detail {
                writeln!(out, "{}", project_detail(project).plain_text())?;
            }
            Ok(())
        }
        ProjectAction::Bid {
            id,
            amount,
            days,
            proposal,
        } => {
            let mut effects = market.open_bid_form(id);
            if let Some(form) = &mut market.bid_form {
                form.amount = amount;
                form.delivery_days = days;
                form.proposal = proposal;
                effects.extend(market.begin_submit_bid());
            }
            let report = settle(api, effects, |outcome| match outcome {
                TaskOutcome::BidSubmitted { project_id, result } => {
                    market.finish_submit_bid(project_id, result)
                }
                TaskOutcome::ProjectsLoaded(result) => market.finish_load(result),
                other => unexpected(&other),
            })
            .await;
            report.conclude(out)
        }
    }
}
