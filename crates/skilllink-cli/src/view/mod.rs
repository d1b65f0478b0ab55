//! Rendering.
//!
//! Renderers are pure: a domain object goes in, a [`Rendered`] (styled lines
//! plus the actions the rendering exposes) comes out. Every data change
//! re-runs the renderer and replaces the previous output wholesale, action
//! list included.

mod bids;
pub mod format;
mod forms;
mod profile;
mod projects;
mod render;

use ratatui::text::Line;

pub use bids::{BIDS_EMPTY, bid_list};
pub use forms::{form, form_actions, strength_meter};
pub use profile::{NO_BIO, NO_EMAIL, NO_SKILLS, NO_TITLE, profile_card, skill_tags};
pub use projects::{
    ALREADY_BID, ALREADY_PROPOSED, LISTING_FAILED, LOADING_PROJECTS, NOT_ACCEPTING, NO_PROJECTS,
    project_detail, project_list,
};
pub use render::draw;

/// Something the user can trigger on a rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewDetails(u64),
    SubmitProposal(u64),
    /// Remove the staged skill at this index.
    RemoveSkill(usize),
    AcceptBid(u64),
    RejectBid(u64),
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewDetails(_) => "View Details",
            Self::SubmitProposal(_) => "Submit Proposal",
            Self::RemoveSkill(_) => "Remove",
            Self::AcceptBid(_) => "Accept",
            Self::RejectBid(_) => "Reject",
        }
    }
}

/// Output of a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub lines: Vec<Line<'static>>,
    pub actions: Vec<Action>,
}

impl Rendered {
    /// A rendering made of a single line and no actions.
    pub fn placeholder(text: &'static str) -> Self {
        Self {
            lines: vec![Line::from(text)],
            actions: Vec::new(),
        }
    }

    fn line(&mut self, line: impl Into<Line<'static>>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(Line::default());
    }

    /// Content without styling, one line per row. Used by headless output.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
