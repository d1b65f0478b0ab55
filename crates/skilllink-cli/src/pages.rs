//! Page bootstrapping.
//!
//! A [`Page`] owns the controller of the screen on display. Mounting a page
//! builds its controller and its [`Keymap`] once; navigating away drops both.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use skilllink_core::Route;
use skilllink_core::config::UiConfig;
use skilllink_core::model::{Category, ProjectStatus, Role};

use crate::controllers::register::SKILL_OPTIONS;
use crate::controllers::{
    Effect, LoginController, MarketplaceController, ProfileController, RegisterController,
};
use crate::storage::ClientStorage;

/// An input field of one of the forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
    Remember,
    FirstName,
    LastName,
    Role,
    Title,
    Category,
    Bio,
    Skills,
    Name,
    Amount,
    DeliveryDays,
    Proposal,
    NewSkill,
    AvatarPath,
    Search,
    Status,
    MinBudget,
    MaxBudget,
    Ordering,
}

impl Field {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm password",
            Self::Remember => "Remember me",
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Role => "I am a",
            Self::Title => "Professional title",
            Self::Category => "Category",
            Self::Bio => "Bio",
            Self::Skills => "Skills",
            Self::Name => "Full name",
            Self::Amount => "Your bid amount (INR)",
            Self::DeliveryDays => "Delivery time (days)",
            Self::Proposal => "Your proposal",
            Self::NewSkill => "New skill",
            Self::AvatarPath => "Image file",
            Self::Search => "Search",
            Self::Status => "Status",
            Self::MinBudget => "Min budget",
            Self::MaxBudget => "Max budget",
            Self::Ordering => "Order by",
        }
    }

    /// Typed text, as opposed to a choice cycled with arrows or space.
    pub const fn is_text(self) -> bool {
        !matches!(
            self,
            Self::Remember | Self::Role | Self::Category | Self::Skills | Self::Status
        )
    }

    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::ConfirmPassword)
    }
}

pub const LOGIN_FIELDS: [Field; 3] = [Field::Email, Field::Password, Field::Remember];
pub const EDIT_FIELDS: [Field; 4] = [Field::Name, Field::Title, Field::Bio, Field::Email];
pub const BID_FIELDS: [Field; 3] = [Field::Amount, Field::DeliveryDays, Field::Proposal];
pub const SEARCH_FIELDS: [Field; 5] = [
    Field::Search,
    Field::Status,
    Field::MinBudget,
    Field::MaxBudget,
    Field::Ordering,
];

/// Registration fields; title, category and skills apply to freelancers.
pub fn register_fields(freelancer_fields: bool) -> Vec<Field> {
    let mut fields = vec![
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Password,
        Field::ConfirmPassword,
        Field::Role,
    ];
    if freelancer_fields {
        fields.extend([Field::Title, Field::Category]);
    }
    fields.push(Field::Bio);
    if freelancer_fields {
        fields.push(Field::Skills);
    }
    fields
}

/// Marketplace page state beyond the controller.
#[derive(Debug)]
pub struct MarketplacePage {
    pub market: MarketplaceController,
    /// Search filters have the focus.
    pub searching: bool,
    /// Cursor into the open bid list.
    pub bid_cursor: usize,
}

/// Profile page state beyond the controller.
#[derive(Debug)]
pub struct ProfilePage {
    pub profile: ProfileController,
    /// Open "choose picture" prompt.
    pub avatar_path: Option<String>,
    /// Cursor over the staged skill tags.
    pub tag_cursor: usize,
}

#[derive(Debug)]
pub enum Page {
    Login(LoginController),
    Register(RegisterController),
    Marketplace(MarketplacePage),
    Profile(ProfilePage),
    Dashboard(Option<Role>),
}

impl Page {
    /// Build the page for `route` and the effects of its first load.
    pub fn mount(route: Route, storage: &Arc<ClientStorage>, ui: &UiConfig) -> (Self, Vec<Effect>) {
        let delay = ui.redirect_delay();
        match route {
            Route::Login => (
                Self::Login(LoginController::mount(Arc::clone(storage), delay)),
                Vec::new(),
            ),
            Route::Register => (
                Self::Register(RegisterController::mount(Arc::clone(storage), delay)),
                Vec::new(),
            ),
            Route::Marketplace => {
                let mut market = MarketplaceController::mount(Arc::clone(storage));
                let effects = market.begin_load();
                (
                    Self::Marketplace(MarketplacePage {
                        market,
                        searching: false,
                        bid_cursor: 0,
                    }),
                    effects,
                )
            }
            Route::Profile => {
                let mut profile = ProfileController::mount(delay);
                let effects = profile.begin_load();
                (
                    Self::Profile(ProfilePage {
                        profile,
                        avatar_path: None,
                        tag_cursor: 0,
                    }),
                    effects,
                )
            }
            Route::Dashboard(role) => (Self::Dashboard(role), Vec::new()),
        }
    }

    pub const fn route(&self) -> Route {
        match self {
            Self::Login(_) => Route::Login,
            Self::Register(_) => Route::Register,
            Self::Marketplace(_) => Route::Marketplace,
            Self::Profile(_) => Route::Profile,
            Self::Dashboard(role) => Route::Dashboard(*role),
        }
    }

    /// Fields of the form that currently has the focus.
    pub fn fields(&self) -> Vec<Field> {
        match self {
            Self::Login(_) => LOGIN_FIELDS.to_vec(),
            Self::Register(register) => register_fields(register.shows_freelancer_fields()),
            Self::Marketplace(page) => {
                let market = &page.market;
                if market.bid_form.is_some() {
                    BID_FIELDS.to_vec()
                } else if page.searching && market.detail.is_none() && market.bids.is_none() {
                    SEARCH_FIELDS.to_vec()
                } else {
                    Vec::new()
                }
            }
            Self::Profile(page) => {
                if page.avatar_path.is_some() {
                    vec![Field::AvatarPath]
                } else if page.profile.skills.is_some() {
                    vec![Field::NewSkill]
                } else if page.profile.edit.is_some() {
                    EDIT_FIELDS.to_vec()
                } else {
                    Vec::new()
                }
            }
            Self::Dashboard(_) => Vec::new(),
        }
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        let text = match (self, field) {
            (Self::Login(c), Field::Email) => &c.form.email,
            (Self::Login(c), Field::Password) => &c.form.password,
            (Self::Register(c), Field::FirstName) => &c.input.first_name,
            (Self::Register(c), Field::LastName) => &c.input.last_name,
            (Self::Register(c), Field::Email) => &c.input.email,
            (Self::Register(c), Field::Password) => &c.input.password,
            (Self::Register(c), Field::ConfirmPassword) => &c.input.confirm_password,
            (Self::Register(c), Field::Title) => &c.input.title,
            (Self::Register(c), Field::Bio) => &c.input.bio,
            (Self::Marketplace(p), Field::Search) => &p.market.filters.search,
            (Self::Marketplace(p), Field::MinBudget) => &p.market.filters.min_budget,
            (Self::Marketplace(p), Field::MaxBudget) => &p.market.filters.max_budget,
            (Self::Marketplace(p), Field::Ordering) => &p.market.filters.ordering,
            (Self::Marketplace(p), Field::Amount) => &p.market.bid_form.as_ref()?.amount,
            (Self::Marketplace(p), Field::DeliveryDays) => {
                &p.market.bid_form.as_ref()?.delivery_days
            }
            (Self::Marketplace(p), Field::Proposal) => &p.market.bid_form.as_ref()?.proposal,
            (Self::Profile(p), Field::Name) => &p.profile.edit.as_ref()?.name,
            (Self::Profile(p), Field::Title) => &p.profile.edit.as_ref()?.title,
            (Self::Profile(p), Field::Bio) => &p.profile.edit.as_ref()?.bio,
            (Self::Profile(p), Field::Email) => &p.profile.edit.as_ref()?.email,
            (Self::Profile(p), Field::NewSkill) => &p.profile.skills.as_ref()?.input,
            (Self::Profile(p), Field::AvatarPath) => p.avatar_path.as_ref()?,
            _ => return None,
        };
        Some(text.as_str())
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match (self, field) {
            (Self::Login(c), Field::Email) => Some(&mut c.form.email),
            (Self::Login(c), Field::Password) => Some(&mut c.form.password),
            (Self::Register(c), Field::FirstName) => Some(&mut c.input.first_name),
            (Self::Register(c), Field::LastName) => Some(&mut c.input.last_name),
            (Self::Register(c), Field::Email) => Some(&mut c.input.email),
            (Self::Register(c), Field::Password) => Some(&mut c.input.password),
            (Self::Register(c), Field::ConfirmPassword) => Some(&mut c.input.confirm_password),
            (Self::Register(c), Field::Title) => Some(&mut c.input.title),
            (Self::Register(c), Field::Bio) => Some(&mut c.input.bio),
            (Self::Marketplace(p), Field::Search) => Some(&mut p.market.filters.search),
            (Self::Marketplace(p), Field::MinBudget) => Some(&mut p.market.filters.min_budget),
            (Self::Marketplace(p), Field::MaxBudget) => Some(&mut p.market.filters.max_budget),
            (Self::Marketplace(p), Field::Ordering) => Some(&mut p.market.filters.ordering),
            (Self::Marketplace(p), Field::Amount) => {
                p.market.bid_form.as_mut().map(|f| &mut f.amount)
            }
            (Self::Marketplace(p), Field::DeliveryDays) => {
                p.market.bid_form.as_mut().map(|f| &mut f.delivery_days)
            }
            (Self::Marketplace(p), Field::Proposal) => {
                p.market.bid_form.as_mut().map(|f| &mut f.proposal)
            }
            (Self::Profile(p), Field::Name) => p.profile.edit.as_mut().map(|f| &mut f.name),
            (Self::Profile(p), Field::Title) => p.profile.edit.as_mut().map(|f| &mut f.title),
            (Self::Profile(p), Field::Bio) => p.profile.edit.as_mut().map(|f| &mut f.bio),
            (Self::Profile(p), Field::Email) => p.profile.edit.as_mut().map(|f| &mut f.email),
            (Self::Profile(p), Field::NewSkill) => p.profile.skills.as_mut().map(|m| &mut m.input),
            (Self::Profile(p), Field::AvatarPath) => p.avatar_path.as_mut(),
            _ => None,
        }
    }

    /// Display value of a choice field.
    pub fn choice(&self, field: Field) -> Option<String> {
        let shown = match (self, field) {
            (Self::Login(c), Field::Remember) => checkbox(c.form.remember).to_string(),
            (Self::Register(c), Field::Role) => {
                c.input.role.map_or("(choose)", Role::label).to_string()
            }
            (Self::Register(c), Field::Category) => {
                c.input.category.map_or("(choose)", Category::label).to_string()
            }
            (Self::Register(c), Field::Skills) => SKILL_OPTIONS
                .iter()
                .enumerate()
                .map(|(i, skill)| {
                    format!(
                        "{} {} {skill}",
                        (i + 1) % 10,
                        checkbox(c.is_skill_checked(skill))
                    )
                })
                .collect::<Vec<_>>()
                .join("  "),
            (Self::Marketplace(p), Field::Status) => p
                .market
                .filters
                .status
                .map_or("All", ProjectStatus::label)
                .to_string(),
            _ => return None,
        };
        Some(shown)
    }

    /// Step a choice field forward or back.
    pub fn cycle(&mut self, field: Field, forward: bool) {
        match (self, field) {
            (Self::Login(c), Field::Remember) => c.form.remember = !c.form.remember,
            (Self::Register(c), Field::Role) => {
                let next = cycle_option(c.input.role, &[Role::Freelancer, Role::Client], forward)
                    .unwrap_or(if forward { Role::Freelancer } else { Role::Client });
                c.set_role(next);
            }
            (Self::Register(c), Field::Category) => {
                let next = cycle_option(c.input.category, &Category::ALL, forward);
                c.set_category(next);
            }
            (Self::Marketplace(p), Field::Status) => {
                p.market.filters.status =
                    cycle_option(p.market.filters.status, &ProjectStatus::ALL, forward);
            }
            _ => {}
        }
    }
}

const fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

/// Step through `None` followed by every item of `all`, wrapping around.
fn cycle_option<T: Copy + PartialEq>(current: Option<T>, all: &[T], forward: bool) -> Option<T> {
    let slots = all.len() + 1;
    let at = current
        .and_then(|c| all.iter().position(|item| *item == c))
        .map_or(0, |i| i + 1);
    let next = if forward {
        (at + 1) % slots
    } else {
        (at + slots - 1) % slots
    };
    next.checked_sub(1).map(|i| all[i])
}

/// What a key does on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Submit,
    NextField,
    PrevField,
    /// Close the innermost modal or prompt.
    Close,
    Navigate(Route),
    Logout,
    CycleNext,
    CyclePrev,
    ToggleSkill(usize),
    Up,
    Down,
    Left,
    Right,
    ViewDetails,
    SubmitProposal,
    Search,
    ClearFilters,
    Refresh,
    NextPage,
    PrevPage,
    MyBids,
    ProjectBids,
    AcceptBid,
    RejectBid,
    EditProfile,
    EditSkills,
    SaveSkills,
    RemoveSkill,
    ChooseAvatar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub command: Command,
    /// Shown in the status bar; empty hides the binding.
    pub help: &'static str,
}

const fn key(code: KeyCode, command: Command, help: &'static str) -> Binding {
    Binding {
        code,
        modifiers: KeyModifiers::NONE,
        command,
        help,
    }
}

const fn ctrl(c: char, command: Command, help: &'static str) -> Binding {
    Binding {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::CONTROL,
        command,
        help,
    }
}

const fn chr(c: char, command: Command, help: &'static str) -> Binding {
    key(KeyCode::Char(c), command, help)
}

/// Key bindings of one page. Built once when the page mounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Keymap {
    pub fn for_route(route: Route) -> Self {
        let mut bindings = vec![
            ctrl('c', Command::Quit, "Ctrl+C quit"),
            key(KeyCode::Tab, Command::NextField, ""),
            Binding {
                code: KeyCode::BackTab,
                modifiers: KeyModifiers::SHIFT,
                command: Command::PrevField,
                help: "",
            },
            key(KeyCode::Esc, Command::Close, ""),
        ];
        let page: &[Binding] = match route {
            Route::Login => &[
                key(KeyCode::Enter, Command::Submit, "Enter log in"),
                chr(' ', Command::CycleNext, ""),
                ctrl('r', Command::Navigate(Route::Register), "Ctrl+R register"),
                ctrl('o', Command::Navigate(Route::Marketplace), "Ctrl+O marketplace"),
            ],
            Route::Register => &[
                key(KeyCode::Enter, Command::Submit, "Enter create account"),
                chr(' ', Command::CycleNext, ""),
                key(KeyCode::Right, Command::CycleNext, "←/→ choose"),
                key(KeyCode::Left, Command::CyclePrev, ""),
                chr('1', Command::ToggleSkill(0), ""),
                chr('2', Command::ToggleSkill(1), ""),
                chr('3', Command::ToggleSkill(2), ""),
                chr('4', Command::ToggleSkill(3), ""),
                chr('5', Command::ToggleSkill(4), ""),
                chr('6', Command::ToggleSkill(5), ""),
                chr('7', Command::ToggleSkill(6), ""),
                chr('8', Command::ToggleSkill(7), ""),
                chr('9', Command::ToggleSkill(8), ""),
                chr('0', Command::ToggleSkill(9), ""),
                ctrl('l', Command::Navigate(Route::Login), "Ctrl+L log in"),
            ],
            Route::Marketplace => &[
                key(KeyCode::Enter, Command::Submit, "Enter open/submit"),
                key(KeyCode::Up, Command::Up, ""),
                key(KeyCode::Down, Command::Down, ""),
                chr('k', Command::Up, ""),
                chr('j', Command::Down, ""),
                chr(' ', Command::CycleNext, ""),
                key(KeyCode::Right, Command::CycleNext, ""),
                key(KeyCode::Left, Command::CyclePrev, ""),
                chr('v', Command::ViewDetails, "v details"),
                chr('b', Command::SubmitProposal, "b bid"),
                chr('/', Command::Search, "/ search"),
                chr('x', Command::ClearFilters, "x clear"),
                chr('g', Command::Refresh, ""),
                chr('n', Command::NextPage, "n/N page"),
                chr('N', Command::PrevPage, ""),
                key(KeyCode::F(5), Command::Refresh, ""),
                chr('m', Command::MyBids, "m my bids"),
                chr('o', Command::ProjectBids, "o project bids"),
                chr('a', Command::AcceptBid, ""),
                chr('r', Command::RejectBid, ""),
                chr('p', Command::Navigate(Route::Profile), "p profile"),
                chr('d', Command::Navigate(Route::Dashboard(None)), ""),
                chr('l', Command::Navigate(Route::Login), ""),
                chr('q', Command::Quit, ""),
            ],
            Route::Profile => &[
                key(KeyCode::Enter, Command::Submit, "Enter save/add"),
                chr('e', Command::EditProfile, "e edit"),
                chr('s', Command::EditSkills, "s skills"),
                chr('a', Command::ChooseAvatar, "a picture"),
                ctrl('s', Command::SaveSkills, ""),
                ctrl('x', Command::RemoveSkill, ""),
                key(KeyCode::Left, Command::Left, ""),
                key(KeyCode::Right, Command::Right, ""),
                chr('m', Command::Navigate(Route::Marketplace), "m marketplace"),
                chr('d', Command::Navigate(Route::Dashboard(None)), ""),
                chr('q', Command::Quit, ""),
            ],
            Route::Dashboard(_) => &[
                chr('m', Command::Navigate(Route::Marketplace), "m marketplace"),
                chr('p', Command::Navigate(Route::Profile), "p profile"),
                chr('o', Command::Logout, "o log out"),
                chr('q', Command::Quit, "q quit"),
            ],
        };
        bindings.extend_from_slice(page);
        Self { bindings }
    }

    pub fn lookup(&self, event: KeyEvent) -> Option<Command> {
        self.bindings
            .iter()
            .find(|b| {
                b.code == event.code
                    && (b.modifiers == event.modifiers
                        || (b.modifiers == KeyModifiers::NONE
                            && event.modifiers == KeyModifiers::SHIFT
                            && matches!(event.code, KeyCode::Char(_))))
            })
            .map(|b| b.command)
    }

    pub fn help(&self) -> String {
        self.bindings
            .iter()
            .filter(|b| !b.help.is_empty())
            .map(|b| b.help)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
