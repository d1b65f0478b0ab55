//! Project listing and project detail.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use skilllink_core::model::{Project, ProjectStatus};

use super::format::{bid_count, card_description, date, inr};
use super::{Action, Rendered};
use crate::controllers::marketplace::Listing;

pub const NO_PROJECTS: &str = "No projects found";
pub const LISTING_FAILED: &str = "Error loading projects. Please try again later.";
pub const LOADING_PROJECTS: &str = "Loading projects...";
pub const ALREADY_BID: &str = "You've already bid on this project";
pub const ALREADY_PROPOSED: &str = "You have already submitted a proposal";
pub const NOT_ACCEPTING: &str = "This project is not accepting bids";

const fn status_color(status: ProjectStatus) -> Color {
    match status {
        ProjectStatus::Open => Color::Green,
        ProjectStatus::InProgress => Color::Yellow,
        ProjectStatus::Completed => Color::Blue,
        ProjectStatus::Cancelled => Color::Red,
    }
}

fn muted(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

fn button(action: Action, color: Color) -> Span<'static> {
    Span::styled(
        format!("[{}]", action.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Render the listing, one card per project. `selected` highlights a card.
pub fn project_list(listing: &Listing, selected: Option<usize>) -> Rendered {
    let projects = match listing {
        Listing::Loading => return Rendered::placeholder(LOADING_PROJECTS),
        Listing::Failed => return Rendered::placeholder(LISTING_FAILED),
        Listing::Loaded(projects) if projects.is_empty() => {
            return Rendered::placeholder(NO_PROJECTS);
        }
        Listing::Loaded(projects) => projects,
    };

    let mut out = Rendered::default();
    for (index, project) in projects.iter().enumerate() {
        if index > 0 {
            out.blank();
        }
        card(&mut out, project, selected == Some(index));
    }
    out
}

fn card(out: &mut Rendered, project: &Project, selected: bool) {
    let title_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    out.line(Line::from(vec![
        Span::raw(if selected { "> " } else { "  " }),
        Span::styled(project.title.clone(), title_style),
        Span::raw("  "),
        Span::styled(
            project.status.label(),
            Style::default().fg(status_color(project.status)),
        ),
    ]));
    out.line(Line::from(vec![
        Span::raw("  "),
        muted(card_description(&project.description)),
    ]));
    out.line(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            inr(project.budget),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::raw(bid_count(project.bid_count)),
    ]));
    out.line(Line::from(vec![
        Span::raw("  "),
        muted("Client: "),
        Span::styled(
            project.client_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        muted(format!("  Posted: {}", date(&project.created_at))),
    ]));

    let view = Action::ViewDetails(project.id);
    out.actions.push(view);
    let mut buttons = vec![Span::raw("  "), button(view, Color::Blue)];
    if project.user_has_bid {
        buttons.push(Span::raw(" "));
        buttons.push(Span::styled(ALREADY_BID, Style::default().fg(Color::Cyan)));
    } else {
        let submit = Action::SubmitProposal(project.id);
        out.actions.push(submit);
        buttons.push(Span::raw(" "));
        buttons.push(button(submit, Color::Green));
    }
    out.line(Line::from(buttons));
}

/// Render the detail view of one project.
pub fn project_detail(project: &Project) -> Rendered {
    let heading = Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD);
    let mut out = Rendered::default();

    out.line(Line::from(Span::styled(
        project.title.clone(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    out.line(Line::from(vec![
        Span::styled(
            project.status.label(),
            Style::default().fg(status_color(project.status)),
        ),
        Span::raw("  "),
        Span::raw(bid_count(project.bid_count)),
    ]));
    out.blank();
    out.line(Span::styled("Budget", heading));
    out.line(Span::styled(
        inr(project.budget),
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    ));
    out.blank();
    out.line(Span::styled("Description", heading));
    for paragraph in project.description.lines() {
        out.line(paragraph.to_string());
    }
    out.blank();
    out.line(Span::styled("Client", heading));
    out.line(Span::styled(
        project.client_name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if let Some(details) = project.client_details.as_ref().filter(|d| !d.email.is_empty()) {
        out.line(muted(details.email.clone()));
    }
    out.blank();
    out.line(Span::styled("Posted", heading));
    out.line(date(&project.created_at));
    out.blank();

    if project.accepts_bid_from_viewer() {
        let submit = Action::SubmitProposal(project.id);
        out.actions.push(submit);
        out.line(muted(
            "Ready to submit your proposal? Press the button below to get started.",
        ));
        out.line(button(submit, Color::Green));
    } else {
        let reason = if project.user_has_bid {
            ALREADY_PROPOSED
        } else {
            NOT_ACCEPTING
        };
        out.line(Span::styled(reason, Style::default().fg(Color::Cyan)));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use skilllink_core::model::ClientDetails;

    use super::*;

    fn project(id: u64, user_has_bid: bool) -> Project {
        Project {
            id,
            title: format!("Project {id}"),
            description: "Design a logo for a tea shop.".into(),
            budget: 150_000.0,
            status: ProjectStatus::Open,
            bid_count: 1,
            client_name: "Grace".into(),
            client_details: Some(ClientDetails {
                email: "grace@example.test".into(),
            }),
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
            user_has_bid,
        }
    }

    #[test]
    fn empty_listing_is_only_the_placeholder() {
        let out = project_list(&Listing::Loaded(Vec::new()), Some(0));
        assert_eq!(out.plain_text(), NO_PROJECTS);
        assert_eq!(out.lines.len(), 1);
        assert!(out.actions.is_empty());
    }

    #[test]
    fn loading_and_failed_states() {
        assert_eq!(project_list(&Listing::Loading, None).plain_text(), LOADING_PROJECTS);
        assert_eq!(project_list(&Listing::Failed, None).plain_text(), LISTING_FAILED);
    }

    #[test]
    fn submit_gated_on_existing_bid() {
        let out = project_list(
            &Listing::Loaded(vec![project(1, false), project(2, true)]),
            None,
        );
        assert_eq!(
            out.actions,
            vec![
                Action::ViewDetails(1),
                Action::SubmitProposal(1),
                Action::ViewDetails(2),
            ]
        );
        let text = out.plain_text();
        assert_eq!(text.matches(ALREADY_BID).count(), 1);
        assert!(text.contains("₹1,50,000"));
        assert!(text.contains("1 bid"));
        assert!(text.contains("Posted: 19 Oct 2026"));
        assert!(text.contains("Design a logo for a tea shop...."));
    }

    #[test]
    fn rerender_replaces_actions() {
        let mut projects = vec![project(1, false)];
        let before = project_list(&Listing::Loaded(projects.clone()), None);
        projects[0].user_has_bid = true;
        let after = project_list(&Listing::Loaded(projects), None);
        assert_eq!(before.actions.len(), 2);
        assert_eq!(after.actions, vec![Action::ViewDetails(1)]);
    }

    #[test]
    fn detail_explains_why_bidding_is_closed() {
        let open = project_detail(&project(4, false));
        assert_eq!(open.actions, vec![Action::SubmitProposal(4)]);
        assert!(open.plain_text().contains("grace@example.test"));

        let bid = project_detail(&project(4, true));
        assert!(bid.actions.is_empty());
        assert!(bid.plain_text().contains(ALREADY_PROPOSED));

        let mut closed = project(4, false);
        closed.status = ProjectStatus::Completed;
        let closed = project_detail(&closed);
        assert!(closed.actions.is_empty());
        assert!(closed.plain_text().contains(NOT_ACCEPTING));
    }
}
