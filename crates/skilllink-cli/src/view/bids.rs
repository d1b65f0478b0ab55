//! Bid lists: the viewer's own bids, or the bids on a project they own.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use skilllink_core::model::{Bid, BidStatus};

use super::format::{date, inr};
use super::{Action, Rendered};
use crate::controllers::marketplace::{BidList, BidScope};

pub const BIDS_EMPTY: &str = "No bids yet";

const fn status_color(status: BidStatus) -> Color {
    match status {
        BidStatus::Pending => Color::Yellow,
        BidStatus::Accepted => Color::Green,
        BidStatus::Rejected => Color::Red,
    }
}

/// Render a bid list. Pending bids on an owned project can be decided.
pub fn bid_list(list: &BidList, selected: Option<usize>) -> Rendered {
    if list.bids.is_empty() {
        return Rendered::placeholder(BIDS_EMPTY);
    }
    let decidable = matches!(list.scope, BidScope::Project(_));
    let mut out = Rendered::default();
    for (index, bid) in list.bids.iter().enumerate() {
        if index > 0 {
            out.blank();
        }
        entry(&mut out, bid, list.scope, selected == Some(index));
        if decidable && bid.status == BidStatus::Pending {
            let accept = Action::AcceptBid(bid.id);
            let reject = Action::RejectBid(bid.id);
            out.actions.extend([accept, reject]);
            out.line(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", accept.label()),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("[{}]", reject.label()),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
            ]));
        }
    }
    out
}

fn entry(out: &mut Rendered, bid: &Bid, scope: BidScope, selected: bool) {
    let who = match (scope, bid.project) {
        (BidScope::Mine, Some(project)) => format!("Project #{project}"),
        (BidScope::Mine, None) => format!("Bid #{}", bid.id),
        (BidScope::Project(_), _) if bid.freelancer_name.is_empty() => {
            format!("Bid #{}", bid.id)
        }
        (BidScope::Project(_), _) => bid.freelancer_name.clone(),
    };
    let mut name_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    if selected {
        name_style = name_style.add_modifier(Modifier::REVERSED);
    }
    out.line(Line::from(vec![
        Span::raw(if selected { "> " } else { "  " }),
        Span::styled(who, name_style),
        Span::raw("  "),
        Span::styled(bid.status.label(), Style::default().fg(status_color(bid.status))),
    ]));

    let mut terms = vec![
        Span::raw("  "),
        Span::styled(
            inr(bid.amount),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  in {} days", bid.delivery_days)),
    ];
    if let Some(at) = &bid.created_at {
        terms.push(Span::styled(
            format!("  Submitted: {}", date(at)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    out.line(Line::from(terms));
    for paragraph in bid.proposal.lines() {
        out.line(Line::from(vec![Span::raw("  "), Span::raw(paragraph.to_string())]));
    }
}
