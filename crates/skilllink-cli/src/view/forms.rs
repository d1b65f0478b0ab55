//! Form rendering. Rows follow the field order of the focused form.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use skilllink_core::validation::PasswordStrength;

use super::profile::skill_tags;
use super::{Action, Rendered};
use crate::pages::{Field, Page};

const LABEL_WIDTH: usize = 22;
const METER_CELLS: u16 = 20;

/// Server-side name of a registration field, for inline errors.
const fn server_key(field: Field) -> Option<&'static str> {
    match field {
        Field::FirstName => Some("first_name"),
        Field::LastName => Some("last_name"),
        Field::Email => Some("email"),
        Field::Password => Some("password"),
        Field::ConfirmPassword => Some("confirm_password"),
        Field::Role => Some("role"),
        Field::Title => Some("title"),
        Field::Category => Some("category"),
        Field::Bio => Some("bio"),
        Field::Skills => Some("skills"),
        _ => None,
    }
}

fn row(page: &Page, field: Field, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
        Span::raw(if focused { "> " } else { "  " }),
        Span::styled(format!("{:<LABEL_WIDTH$}", field.label()), label_style),
    ];
    if field.is_text() {
        let text = page.text(field).unwrap_or_default();
        let shown = if field.is_secret() {
            "•".repeat(text.chars().count())
        } else {
            text.to_string()
        };
        spans.push(Span::raw(shown));
        if focused {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        }
    } else if let Some(choice) = page.choice(field) {
        spans.push(Span::styled(choice, Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn button(label: &str, busy: Option<&'static str>) -> Line<'static> {
    match busy {
        Some(waiting) => Line::from(Span::styled(
            waiting,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
        None => Line::from(Span::styled(
            format!("[{label}]"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
    }
}

/// Password strength bar, empty when nothing is typed.
pub fn strength_meter(strength: PasswordStrength) -> Line<'static> {
    let filled = METER_CELLS * strength.width_percent() / 100;
    let color = match strength {
        PasswordStrength::Empty | PasswordStrength::Weak => Color::Red,
        PasswordStrength::Fair => Color::Yellow,
        PasswordStrength::Good => Color::Blue,
        PasswordStrength::Strong => Color::Green,
    };
    Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 2)),
        Span::styled("█".repeat(usize::from(filled)), Style::default().fg(color)),
        Span::styled(
            "░".repeat(usize::from(METER_CELLS - filled)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(strength.label(), Style::default().fg(color)),
    ])
}

/// Render the form that has the focus on `page`.
pub fn form(page: &Page, focus: usize) -> Rendered {
    let fields = page.fields();
    let mut out = Rendered::default();
    for (index, field) in fields.iter().copied().enumerate() {
        out.line(row(page, field, index == focus));
        if let Page::Register(register) = page {
            if field == Field::Password {
                out.line(strength_meter(register.strength()));
            }
            if let Some(error) = server_key(field).and_then(|key| register.field_errors.get(key)) {
                out.line(Line::from(vec![
                    Span::raw(" ".repeat(LABEL_WIDTH + 2)),
                    Span::styled(error.clone(), Style::default().fg(Color::Red)),
                ]));
            }
        }
    }
    out.blank();

    match page {
        Page::Login(login) => {
            out.line(button("Log In", login.is_busy().then_some("Logging in...")));
        }
        Page::Register(register) => {
            out.line(button(
                register.submit_label(),
                register.is_busy().then_some("Creating account..."),
            ));
        }
        Page::Marketplace(market) if market.market.bid_form.is_some() => {
            out.line(button(
                "Submit Proposal",
                market.market.is_busy().then_some("Submitting..."),
            ));
        }
        Page::Marketplace(_) => out.line(button("Search", None)),
        Page::Profile(profile) if profile.avatar_path.is_some() => {
            out.line(Span::styled(
                "PNG, JPEG, GIF or WebP, up to 5 MB",
                Style::default().fg(Color::DarkGray),
            ));
            out.line(button(
                "Upload",
                profile.profile.is_busy().then_some("Uploading..."),
            ));
        }
        Page::Profile(profile) => {
            let busy = profile.profile.is_busy().then_some("Saving...");
            if let Some(modal) = &profile.profile.skills {
                let tags = skill_tags(modal.buffer.as_slice(), true);
                out.lines.extend(highlight_tag(tags.lines, profile.tag_cursor));
                out.actions.extend(tags.actions);
                out.blank();
                out.line(Span::styled(
                    "Enter add | ←/→ pick tag | Ctrl+X remove | Ctrl+S save",
                    Style::default().fg(Color::DarkGray),
                ));
                out.line(button("Save Skills", busy));
            } else {
                out.line(button("Save Changes", busy));
            }
        }
        Page::Dashboard(_) => {}
    }
    out
}

/// Mark the tag under the cursor. Tags sit on one line, two spans apart.
fn highlight_tag(mut lines: Vec<Line<'static>>, cursor: usize) -> Vec<Line<'static>> {
    if let Some(span) = lines.first_mut().and_then(|l| l.spans.get_mut(cursor * 2)) {
        span.style = span.style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
    }
    lines
}

/// Actions a form exposes: skill removal in the skills modal.
pub fn form_actions(page: &Page) -> Vec<Action> {
    match page {
        Page::Profile(profile) => profile
            .profile
            .skills
            .as_ref()
            .map(|modal| skill_tags(modal.buffer.as_slice(), true).actions)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
