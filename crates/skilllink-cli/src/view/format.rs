//! Display formatting for money, dates and counts.

use chrono::{DateTime, Utc};

/// Characters of a description shown on a project card.
pub const CARD_DESCRIPTION_CHARS: usize = 100;

/// Rupees with Indian digit grouping and no decimals: `₹1,50,000`.
pub fn inr(amount: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rupees = amount.abs().round() as u64;
    let sign = if amount < 0.0 && rupees > 0 { "-" } else { "" };
    format!("{sign}₹{}", group_indian(rupees))
}

/// Group digits as lakh/crore: last three, then pairs.
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// `19 Oct 2026`.
pub fn date(at: &DateTime<Utc>) -> String {
    at.format("%-d %b %Y").to_string()
}

/// `1 bid`, `0 bids`, `7 bids`.
pub fn bid_count(count: u32) -> String {
    if count == 1 {
        "1 bid".to_string()
    } else {
        format!("{count} bids")
    }
}

/// First [`CARD_DESCRIPTION_CHARS`] characters followed by an ellipsis.
pub fn card_description(description: &str) -> String {
    let head: String = description.chars().take(CARD_DESCRIPTION_CHARS).collect();
    format!("{head}...")
}
