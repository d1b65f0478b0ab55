//! Application state and command handling.

use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use skilllink_core::Route;
use skilllink_core::config::UiConfig;
use tracing::{debug, info, warn};

use crate::api::BidDecision;
use crate::controllers::marketplace::BidScope;
use crate::controllers::register::SKILL_OPTIONS;
use crate::controllers::{Deferred, Effect, Notice, NoticeKind};
use crate::pages::{Command, Field, Keymap, Page};
use crate::storage::ClientStorage;
use crate::tasks::{Settled, TaskOutcome, Ticket};
use crate::view::{self, Action};

pub const LOGGED_OUT: &str = "You have been logged out.";

/// The notice on screen and when it goes away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNotice {
    pub notice: Notice,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: Instant,
    deferred: Deferred,
}

/// TUI application state.
///
/// Owns the mounted page. Every mutation that can start network work returns
/// the [`Ticket`]s for the event loop to spawn, stamped with the current
/// mount so outcomes reaching a later mount of the same page are dropped.
#[derive(Debug)]
pub struct App {
    pub page: Page,
    /// Bindings of the mounted page.
    pub keymap: Keymap,
    /// Index into the focused form's fields.
    pub focus: usize,
    pub notice: Option<ActiveNotice>,
    /// Tasks spawned and not yet settled.
    pub pending: usize,
    pub should_quit: bool,
    /// Bumped on every navigation.
    mount: u64,
    scheduled: Vec<Scheduled>,
    storage: Arc<ClientStorage>,
    ui: UiConfig,
}

impl App {
    /// Mount `route` and return the tasks of its first load.
    pub fn new(route: Route, storage: Arc<ClientStorage>, ui: UiConfig) -> (Self, Vec<Ticket>) {
        let (page, effects) = Page::mount(route, &storage, &ui);
        let mut app = Self {
            page,
            keymap: Keymap::for_route(route),
            focus: 0,
            notice: None,
            pending: 0,
            should_quit: false,
            mount: 0,
            scheduled: Vec::new(),
            storage,
            ui,
        };
        let tasks = app.apply(effects);
        (app, tasks)
    }

    pub const fn route(&self) -> Route {
        self.page.route()
    }

    /// Tear down the current page and mount `route`. Pending redirects of
    /// the old page are dropped; the notice stays.
    pub fn navigate(&mut self, route: Route) -> Vec<Ticket> {
        info!(from = self.route().path(), to = route.path(), "Navigating");
        let (page, effects) = Page::mount(route, &self.storage, &self.ui);
        self.page = page;
        self.mount += 1;
        self.keymap = Keymap::for_route(route);
        self.focus = 0;
        self.scheduled.clear();
        self.apply(effects)
    }

    /// Carry out controller effects, returning the tasks to spawn.
    pub fn apply(&mut self, effects: Vec<Effect>) -> Vec<Ticket> {
        let mut tasks = Vec::new();
        for effect in effects {
            match effect {
                Effect::Notify(notice) => self.notify(notice),
                Effect::Run(task) => tasks.push(Ticket {
                    mount: self.mount,
                    task,
                }),
                Effect::After(delay, deferred) => self.scheduled.push(Scheduled {
                    due: Instant::now() + delay,
                    deferred,
                }),
                Effect::Navigate(route) => tasks.extend(self.navigate(route)),
            }
        }
        tasks
    }

    /// Show `notice`, replacing the current one.
    pub fn notify(&mut self, notice: Notice) {
        let ttl = match notice.kind {
            NoticeKind::Error => self.ui.error_notice(),
            NoticeKind::Success | NoticeKind::Info => self.ui.success_notice(),
        };
        self.notice = Some(ActiveNotice {
            notice,
            expires_at: Instant::now() + ttl,
        });
    }

    /// Expire the notice and run deferred work that is due.
    pub fn tick(&mut self, now: Instant) -> Vec<Ticket> {
        if self.notice.as_ref().is_some_and(|n| n.expires_at <= now) {
            self.notice = None;
        }
        let (due, later): (Vec<_>, Vec<_>) = mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|s| s.due <= now);
        self.scheduled = later;

        let mut tasks = Vec::new();
        for scheduled in due {
            match scheduled.deferred {
                Deferred::Navigate(route) => tasks.extend(self.navigate(route)),
                Deferred::CloseEditModal => {
                    if let Page::Profile(page) = &mut self.page {
                        page.profile.close_edit();
                        self.focus = 0;
                    }
                }
                Deferred::CloseSkillsModal => {
                    if let Page::Profile(page) = &mut self.page {
                        page.profile.close_skills();
                        self.focus = 0;
                    }
                }
            }
        }
        tasks
    }

    /// Hand a finished task back to the controller that asked for it.
    pub fn handle_outcome(&mut self, settled: Settled) -> Vec<Ticket> {
        self.pending = self.pending.saturating_sub(1);
        if settled.mount != self.mount {
            debug!(
                page = self.route().path(),
                mount = self.mount,
                outcome_mount = settled.mount,
                "Dropping outcome of an earlier mount"
            );
            return Vec::new();
        }
        let outcome = settled.outcome;
        let effects = match (&mut self.page, outcome) {
            (Page::Login(login), TaskOutcome::LoggedIn(result)) => login.finish_submit(result),
            (Page::Register(register), TaskOutcome::Registered(result)) => {
                register.finish_submit(result)
            }
            (Page::Profile(page), TaskOutcome::ProfileLoaded(result)) => {
                page.profile.finish_load(result)
            }
            (Page::Profile(page), TaskOutcome::ProfileSaved(result)) => {
                page.profile.finish_save(result)
            }
            (Page::Profile(page), TaskOutcome::AvatarUploaded(result)) => {
                page.profile.finish_avatar_upload(result)
            }
            (Page::Profile(page), TaskOutcome::AvatarPreviewed(result)) => {
                page.profile.finish_preview(result);
                Vec::new()
            }
            (Page::Profile(page), TaskOutcome::SkillsSaved(result)) => {
                let effects = page.profile.finish_save_skills(result);
                page.tag_cursor = 0;
                effects
            }
            (Page::Marketplace(page), TaskOutcome::ProjectsLoaded(result)) => {
                page.market.finish_load(result)
            }
            (Page::Marketplace(page), TaskOutcome::ProjectLoaded(result)) => {
                page.market.finish_view(result)
            }
            (Page::Marketplace(page), TaskOutcome::BidSubmitted { project_id, result }) => {
                let effects = page.market.finish_submit_bid(project_id, result);
                if page.market.bid_form.is_none() {
                    self.focus = 0;
                }
                effects
            }
            (Page::Marketplace(page), TaskOutcome::MyBidsLoaded(result)) => {
                page.bid_cursor = 0;
                page.market.finish_bids(BidScope::Mine, result)
            }
            (Page::Marketplace(page), TaskOutcome::ProjectBidsLoaded { project_id, result }) => {
                page.bid_cursor = 0;
                page.market
                    .finish_bids(BidScope::Project(project_id), result)
            }
            (
                Page::Marketplace(page),
                TaskOutcome::BidDecided {
                    bid_id,
                    decision,
                    result,
                },
            ) => page.market.finish_decide(bid_id, decision, result),
            (page, outcome) => {
                debug!(page = page.route().path(), ?outcome, "Dropping outcome the mounted page did not request");
                Vec::new()
            }
        };
        self.apply(effects)
    }

    /// The field that has the focus, if a form is open.
    pub fn focused_field(&self) -> Option<Field> {
        self.page.fields().get(self.focus).copied()
    }

    /// Actions offered by what is currently rendered.
    pub fn actions(&self) -> Vec<Action> {
        match &self.page {
            Page::Marketplace(page) => {
                let market = &page.market;
                if market.bid_form.is_some() {
                    Vec::new()
                } else if let Some(list) = &market.bids {
                    view::bid_list(list, None).actions
                } else if let Some(project) = &market.detail {
                    view::project_detail(project).actions
                } else {
                    view::project_list(&market.listing, None).actions
                }
            }
            page @ Page::Profile(_) => view::form_actions(page),
            Page::Login(_) | Page::Register(_) | Page::Dashboard(_) => Vec::new(),
        }
    }

    fn offered(&self, action: Action) -> bool {
        self.actions().contains(&action)
    }

    /// Type a character into the focused text field.
    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.focused_field().filter(|f| f.is_text())
            && let Some(text) = self.page.text_mut(field)
        {
            text.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(field) = self.focused_field().filter(|f| f.is_text())
            && let Some(text) = self.page.text_mut(field)
        {
            text.pop();
        }
    }

    /// Run a keymap command.
    pub fn execute(&mut self, command: Command) -> Vec<Ticket> {
        match command {
            Command::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Command::NextField => {
                self.move_focus(true);
                Vec::new()
            }
            Command::PrevField => {
                self.move_focus(false);
                Vec::new()
            }
            Command::CycleNext | Command::CyclePrev => {
                if let Some(field) = self.focused_field().filter(|f| !f.is_text()) {
                    self.page.cycle(field, command == Command::CycleNext);
                }
                Vec::new()
            }
            Command::ToggleSkill(index) => {
                if self.focused_field() == Some(Field::Skills)
                    && let Page::Register(register) = &mut self.page
                    && let Some(skill) = SKILL_OPTIONS.get(index)
                {
                    register.toggle_skill(skill);
                }
                Vec::new()
            }
            Command::Close => {
                self.close_modal();
                Vec::new()
            }
            Command::Navigate(route) => self.navigate(route),
            Command::Logout => self.logout(),
            Command::Submit => self.submit(),
            Command::Up | Command::Down => {
                self.move_selection(command == Command::Down);
                Vec::new()
            }
            Command::Left | Command::Right => {
                self.move_tag_cursor(command == Command::Right);
                Vec::new()
            }
            Command::ViewDetails => self.view_selected(),
            Command::SubmitProposal => self.propose(),
            Command::AcceptBid => self.decide(BidDecision::Accept),
            Command::RejectBid => self.decide(BidDecision::Reject),
            command => self.execute_listing(command),
        }
    }

    fn execute_listing(&mut self, command: Command) -> Vec<Ticket> {
        let effects = match (&mut self.page, command) {
            (Page::Marketplace(page), Command::Search) => {
                page.searching = true;
                self.focus = 0;
                Vec::new()
            }
            (Page::Marketplace(page), Command::ClearFilters) => {
                page.searching = false;
                page.market.clear_filters()
            }
            (Page::Marketplace(page), Command::Refresh) => page.market.begin_load(),
            (Page::Marketplace(page), Command::NextPage) => page.market.turn_page(true),
            (Page::Marketplace(page), Command::PrevPage) => page.market.turn_page(false),
            (Page::Marketplace(page), Command::MyBids) => page.market.load_my_bids(),
            (Page::Marketplace(page), Command::ProjectBids) => {
                match page.market.selected_project() {
                    Some(project) => page.market.load_project_bids(project.id),
                    None => Vec::new(),
                }
            }
            (Page::Profile(page), Command::EditProfile) => {
                page.profile.open_edit();
                self.focus = 0;
                Vec::new()
            }
            (Page::Profile(page), Command::EditSkills) => {
                page.profile.open_skills();
                page.tag_cursor = 0;
                self.focus = 0;
                Vec::new()
            }
            (Page::Profile(page), Command::SaveSkills) => page.profile.begin_save_skills(),
            (Page::Profile(page), Command::RemoveSkill) => {
                page.profile.remove_skill(page.tag_cursor);
                let remaining = page.profile.skills.as_ref().map_or(0, |m| m.buffer.len());
                page.tag_cursor = page.tag_cursor.min(remaining.saturating_sub(1));
                Vec::new()
            }
            (Page::Profile(page), Command::ChooseAvatar) => {
                page.avatar_path = Some(String::new());
                self.focus = 0;
                Vec::new()
            }
            _ => Vec::new(),
        };
        self.apply(effects)
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.page.fields().len();
        if count == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
    }

    fn move_selection(&mut self, down: bool) {
        let Page::Marketplace(page) = &mut self.page else {
            return;
        };
        if let Some(list) = &page.market.bids {
            let last = list.bids.len().saturating_sub(1);
            page.bid_cursor = if down {
                (page.bid_cursor + 1).min(last)
            } else {
                page.bid_cursor.saturating_sub(1)
            };
        } else if page.market.detail.is_none() && page.market.bid_form.is_none() {
            if down {
                page.market.select_next();
            } else {
                page.market.select_prev();
            }
        }
    }

    fn move_tag_cursor(&mut self, right: bool) {
        let Page::Profile(page) = &mut self.page else {
            return;
        };
        let Some(modal) = &page.profile.skills else {
            return;
        };
        let last = modal.buffer.len().saturating_sub(1);
        page.tag_cursor = if right {
            (page.tag_cursor + 1).min(last)
        } else {
            page.tag_cursor.saturating_sub(1)
        };
    }

    /// Close the innermost modal or prompt.
    fn close_modal(&mut self) {
        match &mut self.page {
            Page::Marketplace(page) => {
                let market = &mut page.market;
                if market.bid_form.is_some() {
                    market.close_bid_form();
                } else if market.detail.is_some() {
                    market.close_detail();
                } else if market.bids.is_some() {
                    market.close_bids();
                } else {
                    page.searching = false;
                }
            }
            Page::Profile(page) => {
                if page.avatar_path.is_some() {
                    page.avatar_path = None;
                } else if page.profile.skills.is_some() {
                    page.profile.close_skills();
                } else {
                    page.profile.close_edit();
                }
            }
            Page::Login(_) | Page::Register(_) | Page::Dashboard(_) => {}
        }
        self.focus = 0;
    }

    fn submit(&mut self) -> Vec<Ticket> {
        let effects = match &mut self.page {
            Page::Login(login) => login.begin_submit(),
            Page::Register(register) => register.begin_submit(),
            Page::Marketplace(page) => {
                if page.market.bid_form.is_some() {
                    page.market.begin_submit_bid()
                } else if page.searching && page.market.detail.is_none() {
                    page.searching = false;
                    self.focus = 0;
                    page.market.search()
                } else if page.market.detail.is_some() {
                    return self.propose();
                } else if page.market.bids.is_some() {
                    Vec::new()
                } else {
                    return self.view_selected();
                }
            }
            Page::Profile(page) => {
                if let Some(path) = page.avatar_path.take() {
                    let path = PathBuf::from(path.trim());
                    page.profile.select_avatar(&path)
                } else if page.profile.skills.is_some() {
                    page.profile.add_skill()
                } else if page.profile.edit.is_some() {
                    page.profile.begin_save()
                } else {
                    Vec::new()
                }
            }
            Page::Dashboard(_) => Vec::new(),
        };
        self.apply(effects)
    }

    fn view_selected(&mut self) -> Vec<Ticket> {
        let Page::Marketplace(page) = &self.page else {
            return Vec::new();
        };
        let Some(id) = page.market.selected_project().map(|p| p.id) else {
            return Vec::new();
        };
        if !self.offered(Action::ViewDetails(id)) {
            return Vec::new();
        }
        let effects = page.market.view_project(id);
        self.apply(effects)
    }

    /// Open the bid form for the project in detail view, or the selected one.
    fn propose(&mut self) -> Vec<Ticket> {
        let Page::Marketplace(page) = &self.page else {
            return Vec::new();
        };
        let target = page
            .market
            .detail
            .as_ref()
            .or_else(|| page.market.selected_project())
            .map(|p| p.id);
        let Some(id) = target else {
            return Vec::new();
        };
        if !self.offered(Action::SubmitProposal(id)) {
            return Vec::new();
        }
        let Page::Marketplace(page) = &mut self.page else {
            return Vec::new();
        };
        let effects = page.market.open_bid_form(id);
        self.focus = 0;
        self.apply(effects)
    }

    fn decide(&mut self, decision: BidDecision) -> Vec<Ticket> {
        let Page::Marketplace(page) = &self.page else {
            return Vec::new();
        };
        let Some(bid_id) = page
            .market
            .bids
            .as_ref()
            .and_then(|list| list.bids.get(page.bid_cursor))
            .map(|bid| bid.id)
        else {
            return Vec::new();
        };
        let action = match decision {
            BidDecision::Accept => Action::AcceptBid(bid_id),
            BidDecision::Reject => Action::RejectBid(bid_id),
        };
        if !self.offered(action) {
            return Vec::new();
        }
        let Page::Marketplace(page) = &mut self.page else {
            return Vec::new();
        };
        let effects = page.market.begin_decide(bid_id, decision);
        self.apply(effects)
    }

    fn logout(&mut self) -> Vec<Ticket> {
        if let Err(e) = self.storage.clear_auth_token() {
            warn!(error = %e, "Failed to clear auth token");
        }
        info!("Logged out");
        let tasks = self.navigate(Route::Login);
        self.notify(Notice {
            kind: NoticeKind::Success,
            message: LOGGED_OUT.to_string(),
        });
        tasks
    }
}
