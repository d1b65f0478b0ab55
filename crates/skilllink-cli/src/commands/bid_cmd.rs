//! Bid subcommands: mine, project, accept, reject.

use std::io::Write;
use std::sync::Arc;

use super::{settle, unexpected};
use crate::api::{BidDecision, MarketplaceApi};
use crate::controllers::MarketplaceController;
use crate::controllers::marketplace::BidScope;
use crate::storage::ClientStorage;
use crate::tasks::TaskOutcome;
use crate::view::bid_list;

#[derive(clap::Subcommand, Debug)]
pub enum BidAction {
    /// Bids you have placed.
    Mine,
    /// Bids on a project you posted.
    Project { id: u64 },
    /// Accept a bid on your project.
    Accept { id: u64 },
    /// Reject a bid on your project.
    Reject { id: u64 },
}

pub async fn run<A: MarketplaceApi, W: Write>(
    action: BidAction,
    api: &A,
    storage: &Arc<ClientStorage>,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut market = MarketplaceController::mount(Arc::clone(storage));
    let effects = match action {
        BidAction::Mine => market.load_my_bids(),
        BidAction::Project { id } => market.load_project_bids(id),
        BidAction::Accept { id } => market.begin_decide(id, BidDecision::Accept),
        BidAction::Reject { id } => market.begin_decide(id, BidDecision::Reject),
    };
    let report = settle(api, effects, |outcome| match outcome {
        TaskOutcome::MyBidsLoaded(result) => market.finish_bids(BidScope::Mine, result),
        TaskOutcome::ProjectBidsLoaded { project_id, result } => {
            market.finish_bids(BidScope::Project(project_id), result)
        }
        TaskOutcome::BidDecided {
            bid_id,
            decision,
            result,
        } => market.finish_decide(bid_id, decision, result),
        other => unexpected(&other),
    })
    .await;
    report.conclude(out)?;
    if let Some(list) = &market.bids {
        writeln!(out, "{}", bid_list(list, None).plain_text())?;
    }
    Ok(())
}
