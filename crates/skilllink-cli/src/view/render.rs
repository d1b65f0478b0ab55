//! Frame layout for the TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use skilllink_core::model::Role;

use super::{Rendered, bid_list, form, profile_card, project_detail, project_list};
use crate::app::App;
use crate::controllers::NoticeKind;
use crate::controllers::marketplace::BidScope;
use crate::pages::{MarketplacePage, Page, ProfilePage};

/// Lines taken by one project card and its separator.
const CARD_HEIGHT: usize = 6;

/// Render the whole UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1), // notice
            Constraint::Min(3),    // page
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_notice(frame, app, chunks[1]);
    match &app.page {
        Page::Login(_) | Page::Register(_) => {
            let title = app.route().title();
            draw_panel(frame, chunks[2], title, form(&app.page, app.focus), 0);
        }
        Page::Marketplace(page) => draw_marketplace(frame, app, page, chunks[2]),
        Page::Profile(page) => draw_profile(frame, app, page, chunks[2]),
        Page::Dashboard(role) => draw_dashboard(frame, *role, chunks[2]),
    }
    draw_status_bar(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "SkillLink",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(app.route().title()),
        Span::styled(
            format!("  {}", app.route().path()),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    frame.render_widget(header, area);
}

fn draw_notice(frame: &mut Frame, app: &App, area: Rect) {
    let Some(active) = &app.notice else {
        return;
    };
    let color = match active.notice.kind {
        NoticeKind::Success => Color::Green,
        NoticeKind::Error => Color::Red,
        NoticeKind::Info => Color::Yellow,
    };
    let notice = Paragraph::new(Span::styled(
        active.notice.message.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(notice, area);
}

fn draw_panel(frame: &mut Frame, area: Rect, title: &str, rendered: Rendered, scroll: u16) {
    let panel = Paragraph::new(rendered.lines)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(panel, area);
}

/// Centered overlay covering most of `area`.
fn draw_modal(frame: &mut Frame, area: Rect, title: &str, rendered: Rendered, scroll: u16) {
    let width = area.width.saturating_sub(4).min(80);
    let height = area.height.saturating_sub(2);
    let modal = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, modal);
    let panel = Paragraph::new(rendered.lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .style(Style::default().fg(Color::White)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(panel, modal);
}

/// Scroll offset that keeps line `target` inside a viewport of `height`.
fn follow(target: usize, height: u16) -> u16 {
    let height = usize::from(height.saturating_sub(2));
    u16::try_from(target.saturating_sub(height / 2)).unwrap_or(u16::MAX)
}

fn draw_marketplace(frame: &mut Frame, app: &App, page: &MarketplacePage, area: Rect) {
    let market = &page.market;
    let (filter_area, list_area) = if page.searching {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(3)])
            .split(area);
        draw_panel(
            frame,
            chunks[0],
            "Search Projects",
            form(&app.page, app.focus),
            0,
        );
        (None, chunks[1])
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    };

    if let Some(filter_area) = filter_area {
        let applied = if market.filters.is_empty() {
            "All projects".to_string()
        } else {
            market
                .filters
                .query_pairs()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let summary = Paragraph::new(Span::styled(
            format!("{applied} | page {}", market.page()),
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(summary, filter_area);
    }

    let listing = project_list(&market.listing, Some(market.selected));
    draw_panel(
        frame,
        list_area,
        "Available Projects",
        listing,
        follow(market.selected * CARD_HEIGHT, list_area.height),
    );

    if market.bid_form.is_some() {
        draw_modal(frame, area, "Submit Proposal", form(&app.page, app.focus), 0);
    } else if let Some(project) = &market.detail {
        draw_modal(frame, area, "Project Details", project_detail(project), 0);
    } else if let Some(list) = &market.bids {
        let title = match list.scope {
            BidScope::Mine => "My Bids".to_string(),
            BidScope::Project(id) => format!("Bids on Project #{id}"),
        };
        let rendered = bid_list(list, Some(page.bid_cursor));
        draw_modal(frame, area, &title, rendered, follow(page.bid_cursor * 5, area.height));
    }
}

fn draw_profile(frame: &mut Frame, app: &App, page: &ProfilePage, area: Rect) {
    let controller = &page.profile;
    let body = match &controller.profile {
        Some(profile) => profile_card(profile, controller.avatar_preview.is_some()),
        None if controller.loading => Rendered::placeholder("Loading profile..."),
        None => Rendered::placeholder("Profile unavailable."),
    };
    draw_panel(frame, area, "My Profile", body, 0);

    let title = if page.avatar_path.is_some() {
        Some("Change Profile Picture")
    } else if controller.skills.is_some() {
        Some("Edit Skills")
    } else if controller.edit.is_some() {
        Some("Edit Profile")
    } else {
        None
    };
    if let Some(title) = title {
        draw_modal(frame, area, title, form(&app.page, app.focus), 0);
    }
}

fn draw_dashboard(frame: &mut Frame, role: Option<Role>, area: Rect) {
    let lead = match role {
        Some(Role::Freelancer) => "Find projects that match your skills and track your bids.",
        Some(Role::Client) => "Review the proposals on your projects.",
        None => "Welcome to SkillLink.",
    };
    let lines = vec![
        Line::from(Span::styled(
            lead,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("m  Browse the marketplace"),
        Line::from("p  View your profile"),
        Line::from("o  Log out"),
    ];
    let title = skilllink_core::Route::Dashboard(role).title();
    draw_panel(
        frame,
        area,
        title,
        Rendered {
            lines,
            actions: Vec::new(),
        },
        0,
    );
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    if app.pending > 0 {
        spans.push(Span::styled(
            "Working... ",
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        app.keymap.help(),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
