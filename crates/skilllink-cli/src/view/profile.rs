//! Profile card and skill tags.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use skilllink_core::model::UserProfile;

use super::{Action, Rendered};

pub const NO_TITLE: &str = "No title set";
pub const NO_BIO: &str = "No bio provided";
pub const NO_EMAIL: &str = "No email set";
pub const NO_SKILLS: &str = "No skills added yet";

fn or_placeholder(value: Option<&str>, placeholder: &'static str) -> Span<'static> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => Span::raw(v.to_string()),
        None => Span::styled(
            placeholder,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    }
}

/// Render the profile card. `preview` marks a staged avatar not yet saved.
pub fn profile_card(profile: &UserProfile, preview: bool) -> Rendered {
    let heading = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let mut out = Rendered::default();

    out.line(Line::from(Span::styled(
        profile.display_name(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    out.line(or_placeholder(profile.title.as_deref(), NO_TITLE));
    if let Some(role) = profile.role {
        out.line(Span::styled(role.label(), Style::default().fg(Color::Yellow)));
    }
    let avatar = if preview {
        Span::styled("new picture selected", Style::default().fg(Color::Yellow))
    } else {
        or_placeholder(profile.avatar_url(), "none")
    };
    out.line(Line::from(vec![Span::styled("Picture: ", heading), avatar]));
    out.blank();

    out.line(Span::styled("About", heading));
    out.line(or_placeholder(profile.bio.as_deref(), NO_BIO));
    out.blank();

    out.line(Span::styled("Contact", heading));
    out.line(or_placeholder(Some(profile.email.as_str()), NO_EMAIL));
    out.blank();

    out.line(Span::styled("Skills", heading));
    let tags = skill_tags(&profile.skills, false);
    out.lines.extend(tags.lines);
    out
}

/// Render skills as tags. With `removable` each tag exposes a remove action.
pub fn skill_tags(skills: &[String], removable: bool) -> Rendered {
    if skills.is_empty() {
        return Rendered::placeholder(NO_SKILLS);
    }
    let tag = Style::default().fg(Color::White).bg(Color::Magenta);
    let mut out = Rendered::default();
    let mut spans = Vec::with_capacity(skills.len() * 2);
    for (index, skill) in skills.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        if removable {
            out.actions.push(Action::RemoveSkill(index));
            spans.push(Span::styled(format!(" {}:{skill} ✕ ", index + 1), tag));
        } else {
            spans.push(Span::styled(format!(" {skill} "), tag));
        }
    }
    out.line(Line::from(spans));
    out
}
