//! Marketplace page: listing, search filters, project detail, the bid form
//! and bid management.

use std::sync::Arc;

use skilllink_core::Route;
use skilllink_core::model::{Bid, BidStatus, Project, ProjectFilters};
use skilllink_core::validation::parse_bid;
use tracing::{info, warn};

use super::{Effect, InFlight, json_detail};
use crate::api::{ApiError, BidDecision};
use crate::storage::ClientStorage;
use crate::tasks::Task;

pub const LOGIN_TO_BID: &str = "Please log in to submit a bid";
pub const BID_SUBMITTED: &str = "Proposal submitted successfully!";
pub const BID_FAILED: &str = "Error submitting proposal";
pub const DETAIL_FAILED: &str = "Error loading project details";
pub const BIDS_FAILED: &str = "Error loading bids";

/// State of the project listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Listing {
    #[default]
    Loading,
    Loaded(Vec<Project>),
    /// Rendered as "Error loading projects. Please try again later."
    Failed,
}

/// The bid form modal for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BidForm {
    pub project_id: u64,
    pub amount: String,
    pub delivery_days: String,
    pub proposal: String,
}

/// Which bids are on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidScope {
    Mine,
    /// Bids on a project the viewer owns.
    Project(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BidList {
    pub scope: BidScope,
    pub bids: Vec<Bid>,
}

#[derive(Debug)]
pub struct MarketplaceController {
    /// Search form contents; applied on [`Self::search`].
    pub filters: ProjectFilters,
    pub listing: Listing,
    /// Cursor into the listing.
    pub selected: usize,
    /// Open project detail modal.
    pub detail: Option<Project>,
    pub bid_form: Option<BidForm>,
    pub bids: Option<BidList>,
    /// Filters of the listing currently shown, reused by reloads.
    applied: ProjectFilters,
    in_flight: InFlight,
    storage: Arc<ClientStorage>,
}

impl MarketplaceController {
    pub fn mount(storage: Arc<ClientStorage>) -> Self {
        Self {
            filters: ProjectFilters::default(),
            listing: Listing::Loading,
            selected: 0,
            detail: None,
            bid_form: None,
            bids: None,
            applied: ProjectFilters::default(),
            in_flight: InFlight::default(),
            storage,
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_active()
    }

    pub fn projects(&self) -> &[Project] {
        match &self.listing {
            Listing::Loaded(projects) => projects,
            Listing::Loading | Listing::Failed => &[],
        }
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.projects().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub const fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Reload the listing with the filters last applied.
    pub fn begin_load(&mut self) -> Vec<Effect> {
        self.listing = Listing::Loading;
        vec![Effect::Run(Task::LoadProjects(self.applied.clone()))]
    }

    /// Refetch the listing while the current one stays on screen.
    pub fn reload(&self) -> Vec<Effect> {
        vec![Effect::Run(Task::LoadProjects(self.applied.clone()))]
    }

    /// Apply the search form and reload from the first page.
    pub fn search(&mut self) -> Vec<Effect> {
        self.search_page(1)
    }

    /// Apply the search form and load `page` of its results.
    pub fn search_page(&mut self, page: u32) -> Vec<Effect> {
        self.applied = self.filters.clone();
        self.go_to_page(page)
    }

    /// Listing page on display, starting at 1.
    pub fn page(&self) -> u32 {
        self.applied.page.unwrap_or(1)
    }

    /// Load the next or previous listing page.
    pub fn turn_page(&mut self, forward: bool) -> Vec<Effect> {
        let current = self.page();
        let next = if forward {
            current.saturating_add(1)
        } else {
            current.saturating_sub(1).max(1)
        };
        if next == current {
            return Vec::new();
        }
        self.go_to_page(next)
    }

    /// Page 1 is requested without a `page` parameter.
    fn go_to_page(&mut self, page: u32) -> Vec<Effect> {
        self.applied.page = (page > 1).then_some(page);
        self.filters.page = self.applied.page;
        self.selected = 0;
        self.begin_load()
    }

    pub fn clear_filters(&mut self) -> Vec<Effect> {
        self.filters = ProjectFilters::default();
        self.search()
    }

    pub fn finish_load(&mut self, result: Result<Vec<Project>, ApiError>) -> Vec<Effect> {
        match result {
            Ok(projects) => {
                self.selected = self.selected.min(projects.len().saturating_sub(1));
                self.listing = Listing::Loaded(projects);
            }
            Err(err) => {
                warn!(error = %err, "Loading projects failed");
                self.listing = Listing::Failed;
            }
        }
        Vec::new()
    }

    pub fn view_project(&self, project_id: u64) -> Vec<Effect> {
        vec![Effect::Run(Task::LoadProject(project_id))]
    }

    pub fn finish_view(&mut self, result: Result<Project, ApiError>) -> Vec<Effect> {
        match result {
            Ok(project) => {
                self.detail = Some(project);
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "Loading project detail failed");
                vec![Effect::error(DETAIL_FAILED)]
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Open the bid form, or send an anonymous viewer to the login page.
    pub fn open_bid_form(&mut self, project_id: u64) -> Vec<Effect> {
        if self.storage.auth_token().is_none() {
            return vec![Effect::error(LOGIN_TO_BID), Effect::Navigate(Route::Login)];
        }
        self.detail = None;
        self.bid_form = Some(BidForm {
            project_id,
            ..BidForm::default()
        });
        Vec::new()
    }

    pub fn close_bid_form(&mut self) {
        self.bid_form = None;
    }

    pub fn begin_submit_bid(&mut self) -> Vec<Effect> {
        let Some(form) = &self.bid_form else {
            return Vec::new();
        };
        let draft = match parse_bid(&form.amount, &form.delivery_days, &form.proposal) {
            Ok(draft) => draft,
            Err(e) => return vec![Effect::error(e.message)],
        };
        let project_id = form.project_id;
        if let Err(busy) = self.in_flight.try_begin() {
            return vec![busy];
        }
        vec![Effect::Run(Task::SubmitBid { project_id, draft })]
    }

    pub fn finish_submit_bid(
        &mut self,
        project_id: u64,
        result: Result<(), ApiError>,
    ) -> Vec<Effect> {
        self.in_flight.settle();
        match result {
            Ok(()) => {
                info!(project_id, "Proposal submitted");
                self.bid_form = None;
                self.mark_bid(project_id);
                let mut effects = vec![Effect::success(BID_SUBMITTED)];
                effects.extend(self.reload());
                effects
            }
            Err(ApiError::Unauthenticated) => {
                vec![Effect::error(LOGIN_TO_BID), Effect::Navigate(Route::Login)]
            }
            Err(err) => {
                warn!(project_id, error = %err, "Proposal rejected");
                vec![Effect::error(
                    json_detail(&err).unwrap_or_else(|| BID_FAILED.to_string()),
                )]
            }
        }
    }

    /// Flip `user_has_bid` locally ahead of the reload.
    fn mark_bid(&mut self, project_id: u64) {
        if let Listing::Loaded(projects) = &mut self.listing {
            for project in projects.iter_mut().filter(|p| p.id == project_id) {
                project.user_has_bid = true;
            }
        }
        if let Some(detail) = self.detail.as_mut().filter(|p| p.id == project_id) {
            detail.user_has_bid = true;
        }
    }

    pub fn load_my_bids(&self) -> Vec<Effect> {
        vec![Effect::Run(Task::LoadMyBids)]
    }

    pub fn load_project_bids(&self, project_id: u64) -> Vec<Effect> {
        vec![Effect::Run(Task::LoadProjectBids(project_id))]
    }

    pub fn finish_bids(&mut self, scope: BidScope, result: Result<Vec<Bid>, ApiError>) -> Vec<Effect> {
        match result {
            Ok(bids) => {
                self.bids = Some(BidList { scope, bids });
                Vec::new()
            }
            Err(err) if err.is_auth_failure() => {
                vec![Effect::Navigate(Route::Login)]
            }
            Err(err) => {
                warn!(error = %err, "Loading bids failed");
                vec![Effect::error(BIDS_FAILED)]
            }
        }
    }

    pub fn close_bids(&mut self) {
        self.bids = None;
    }

    pub fn begin_decide(&mut self, bid_id: u64, decision: BidDecision) -> Vec<Effect> {
        if let Err(busy) = self.in_flight.try_begin() {
            return vec![busy];
        }
        vec![Effect::Run(Task::DecideBid { bid_id, decision })]
    }

    pub fn finish_decide(
        &mut self,
        bid_id: u64,
        decision: BidDecision,
        result: Result<(), ApiError>,
    ) -> Vec<Effect> {
        self.in_flight.settle();
        match (result, decision) {
            (Ok(()), BidDecision::Accept) => {
                self.set_bid_status(bid_id, BidStatus::Accepted);
                vec![Effect::success("Bid accepted")]
            }
            (Ok(()), BidDecision::Reject) => {
                self.set_bid_status(bid_id, BidStatus::Rejected);
                vec![Effect::success("Bid rejected")]
            }
            (Err(err), BidDecision::Accept) => {
                warn!(bid_id, error = %err, "Accepting bid failed");
                vec![Effect::error("Error accepting bid")]
            }
            (Err(err), BidDecision::Reject) => {
                warn!(bid_id, error = %err, "Rejecting bid failed");
                vec![Effect::error("Error rejecting bid")]
            }
        }
    }

    fn set_bid_status(&mut self, bid_id: u64, status: BidStatus) {
        if let Some(list) = &mut self.bids {
            for bid in list.bids.iter_mut().filter(|b| b.id == bid_id) {
                bid.status = status;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;
    use skilllink_core::model::ProjectStatus;

    use super::*;
    use crate::api::ErrorBody;
    use crate::api::fake::{FakeApi, Reply, project_json};
    use crate::controllers::NoticeKind;
    use crate::controllers::testing::{has_task, message, task};
    use crate::tasks::{self, TaskOutcome};

    fn signed_in() -> Arc<ClientStorage> {
        let storage = Arc::new(ClientStorage::in_memory());
        storage.set_auth_token("tok").unwrap();
        storage
    }

    async fn load(market: &mut MarketplaceController, api: &FakeApi) {
        let effects = market.begin_load();
        let TaskOutcome::ProjectsLoaded(result) = tasks::run(api, task(&effects)).await else {
            panic!("expected listing outcome");
        };
        market.finish_load(result);
    }

    #[tokio::test]
    async fn listing_accepts_paginated_response() {
        let api = FakeApi::new().reply(
            "list_projects",
            Reply::Json(json!({"count": 2, "results": [
                project_json(1, "Logo", false),
                project_json(2, "Site", true)
            ]})),
        );
        let mut market = MarketplaceController::mount(signed_in());
        load(&mut market, &api).await;
        assert_eq!(market.projects().len(), 2);
        market.select_next();
        market.select_next();
        assert_eq!(market.selected_project().unwrap().id, 2);
    }

    #[tokio::test]
    async fn listing_failure_marks_failed() {
        let api = FakeApi::new().reply("list_projects", Reply::Status(500, ""));
        let mut market = MarketplaceController::mount(signed_in());
        load(&mut market, &api).await;
        assert_eq!(market.listing, Listing::Failed);
        assert!(market.projects().is_empty());
    }

    #[tokio::test]
    async fn search_and_clear_send_filters() {
        let api = FakeApi::new().reply("list_projects", Reply::Json(json!([])));
        let mut market = MarketplaceController::mount(signed_in());
        market.filters.search = "logo".into();
        market.filters.status = Some(ProjectStatus::Open);

        let TaskOutcome::ProjectsLoaded(result) = tasks::run(&api, task(&market.search())).await
        else {
            panic!("expected listing outcome");
        };
        market.finish_load(result);
        let TaskOutcome::ProjectsLoaded(result) =
            tasks::run(&api, task(&market.clear_filters())).await
        else {
            panic!("expected listing outcome");
        };
        market.finish_load(result);

        assert_eq!(
            api.calls(),
            vec!["list_projects search=logo&status=open", "list_projects "]
        );
        assert!(market.filters.is_empty());
    }

    #[test]
    fn anonymous_bid_redirects_to_login() {
        let mut market = MarketplaceController::mount(Arc::new(ClientStorage::in_memory()));
        let effects = market.open_bid_form(3);
        assert_eq!(message(&effects, NoticeKind::Error), LOGIN_TO_BID);
        assert!(effects.contains(&Effect::Navigate(Route::Login)));
        assert!(market.bid_form.is_none());
    }

    #[test]
    fn incomplete_bid_form_never_requests() {
        let mut market = MarketplaceController::mount(signed_in());
        market.open_bid_form(3);
        market.bid_form.as_mut().unwrap().amount = "500".into();
        let effects = market.begin_submit_bid();
        assert!(!has_task(&effects));
        assert_eq!(message(&effects, NoticeKind::Error), "Please fill in all fields");
    }

    #[tokio::test]
    async fn successful_bid_flips_flag_and_reloads() {
        let api = FakeApi::new()
            .reply("list_projects", Reply::Json(json!([project_json(3, "Logo", false)])))
            .reply("submit_bid", Reply::Json(json!({"id": 10})));
        let mut market = MarketplaceController::mount(signed_in());
        load(&mut market, &api).await;

        market.open_bid_form(3);
        let form = market.bid_form.as_mut().unwrap();
        form.amount = "1500".into();
        form.delivery_days = "7".into();
        form.proposal = "I design logos".into();

        let effects = market.begin_submit_bid();
        assert!(market.is_busy());
        let TaskOutcome::BidSubmitted { project_id, result } =
            tasks::run(&api, task(&effects)).await
        else {
            panic!("expected bid outcome");
        };
        let effects = market.finish_submit_bid(project_id, result);

        assert_eq!(message(&effects, NoticeKind::Success), BID_SUBMITTED);
        assert!(market.bid_form.is_none());
        assert!(!market.is_busy());
        assert_eq!(task(&effects), Task::LoadProjects(ProjectFilters::default()));
        assert!(market.projects()[0].user_has_bid);
        assert!(api.calls().contains(&"submit_bid 3 1500 7".to_string()));
    }

    #[tokio::test]
    async fn rejected_bid_shows_server_message() {
        let api = FakeApi::new()
            .reply("list_projects", Reply::Json(json!([project_json(3, "Logo", false)])))
            .reply("submit_bid", Reply::Status(400, r#"{"detail": "Bidding closed"}"#));
        let mut market = MarketplaceController::mount(signed_in());
        load(&mut market, &api).await;
        market.open_bid_form(3);
        let form = market.bid_form.as_mut().unwrap();
        form.amount = "10".into();
        form.delivery_days = "1".into();
        form.proposal = "p".into();

        let TaskOutcome::BidSubmitted { project_id, result } =
            tasks::run(&api, task(&market.begin_submit_bid())).await
        else {
            panic!("expected bid outcome");
        };
        let effects = market.finish_submit_bid(project_id, result);
        assert_eq!(message(&effects, NoticeKind::Error), "Bidding closed");
        assert!(market.bid_form.is_some());
        assert!(!market.projects()[0].user_has_bid);
    }

    #[test]
    fn rejected_bid_without_detail_uses_fallback() {
        let mut market = MarketplaceController::mount(signed_in());
        for body in [r#"{"amount": ["Too low"]}"#, r#"{"error": "closed"}"#, "Bad Gateway"] {
            let rejected = ApiError::server(400, ErrorBody::parse(body));
            let effects = market.finish_submit_bid(3, Err(rejected));
            assert_eq!(message(&effects, NoticeKind::Error), BID_FAILED, "{body}");
        }
    }

    #[test]
    fn local_flag_flips_in_listing_and_detail() {
        let project: Project = serde_json::from_value(project_json(5, "App", false)).unwrap();
        let mut market = MarketplaceController::mount(signed_in());
        market.listing = Listing::Loaded(vec![project.clone()]);
        market.detail = Some(project);
        market.mark_bid(5);
        assert!(market.projects()[0].user_has_bid);
        assert!(market.detail.as_ref().unwrap().user_has_bid);
    }

    #[tokio::test]
    async fn detail_failure_notifies() {
        let api = FakeApi::new().reply("project_detail", Reply::Offline);
        let mut market = MarketplaceController::mount(signed_in());
        let TaskOutcome::ProjectLoaded(result) =
            tasks::run(&api, task(&market.view_project(4))).await
        else {
            panic!("expected detail outcome");
        };
        let effects = market.finish_view(result);
        assert_eq!(message(&effects, NoticeKind::Error), DETAIL_FAILED);
        assert!(market.detail.is_none());
    }

    #[tokio::test]
    async fn accepting_and_rejecting_update_status() {
        let bids = json!([
            {"id": 1, "freelancer_name": "dev", "amount": "900.00", "delivery_days": 5, "proposal": "a"},
            {"id": 2, "freelancer_name": "ops", "amount": "950.00", "delivery_days": 6, "proposal": "b"}
        ]);
        let api = FakeApi::new()
            .reply("project_bids", Reply::Json(bids))
            .reply("decide_bid", Reply::Json(json!({"status": "ok"})));
        let mut market = MarketplaceController::mount(signed_in());

        let TaskOutcome::ProjectBidsLoaded { project_id, result } =
            tasks::run(&api, task(&market.load_project_bids(7))).await
        else {
            panic!("expected bids outcome");
        };
        market.finish_bids(BidScope::Project(project_id), result);

        for (bid_id, decision, expected) in [
            (1, BidDecision::Accept, "Bid accepted"),
            (2, BidDecision::Reject, "Bid rejected"),
        ] {
            let TaskOutcome::BidDecided {
                bid_id,
                decision,
                result,
            } = tasks::run(&api, task(&market.begin_decide(bid_id, decision))).await
            else {
                panic!("expected decision outcome");
            };
            let effects = market.finish_decide(bid_id, decision, result);
            assert_eq!(message(&effects, NoticeKind::Success), expected);
        }

        let list = market.bids.as_ref().unwrap();
        assert_eq!(list.scope, BidScope::Project(7));
        assert_eq!(list.bids[0].status, BidStatus::Accepted);
        assert_eq!(list.bids[1].status, BidStatus::Rejected);
    }

    #[test]
    fn decision_failures_name_the_action() {
        let mut market = MarketplaceController::mount(signed_in());
        let offline = || Err(ApiError::Io(std::io::Error::other("down")));
        assert_eq!(
            message(&market.finish_decide(1, BidDecision::Accept, offline()), NoticeKind::Error),
            "Error accepting bid"
        );
        assert_eq!(
            message(&market.finish_decide(1, BidDecision::Reject, offline()), NoticeKind::Error),
            "Error rejecting bid"
        );
    }

    #[test]
    fn paging_requests_page_numbers() {
        let mut market = MarketplaceController::mount(signed_in());
        assert!(market.turn_page(false).is_empty(), "already on the first page");
        let Task::LoadProjects(filters) = task(&market.turn_page(true)) else {
            panic!("expected a listing task");
        };
        assert_eq!(filters.page, Some(2));
        assert_eq!(market.page(), 2);

        market.filters.search = "logo".into();
        let Task::LoadProjects(filters) = task(&market.search()) else {
            panic!("expected a listing task");
        };
        assert_eq!(filters.page, None);
        assert_eq!(market.page(), 1);

        let Task::LoadProjects(filters) = task(&market.search_page(3)) else {
            panic!("expected a listing task");
        };
        assert_eq!(filters.search, "logo");
        assert_eq!(filters.page, Some(3));
    }
}
