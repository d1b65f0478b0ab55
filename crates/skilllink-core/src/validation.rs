//! Client-side validation rules.
//!
//! Everything here runs before a request is built; a failure means no
//! network call is made.

use thiserror::Error;

use crate::model::{BidDraft, Category, Registration, Role};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Largest avatar accepted for upload (5 MiB).
pub const AVATAR_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// A rejected form input. `field` names the inline slot, if any.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<&'static str>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

/// Login requires both credentials.
pub fn check_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::new(
            "Please enter your email and password.",
        ));
    }
    Ok(())
}

/// Password and confirmation must match, then meet the length floor.
pub fn check_passwords(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::field(
            "confirm_password",
            "Passwords do not match!",
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::field(
            "password",
            "Password must be at least 8 characters long!",
        ));
    }
    Ok(())
}

/// Coarse strength bucket shown under the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Empty,
    Weak,
    Fair,
    Good,
    Strong,
}

impl PasswordStrength {
    /// One point each for: length >= 8, mixed case, a digit, a symbol.
    pub fn score(password: &str) -> Self {
        let mut score = 0;
        if password.chars().count() >= MIN_PASSWORD_LEN {
            score += 1;
        }
        if password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_uppercase())
        {
            score += 1;
        }
        if password.chars().any(|c| c.is_ascii_digit()) {
            score += 1;
        }
        if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
            score += 1;
        }
        match score {
            0 => Self::Empty,
            1 => Self::Weak,
            2 => Self::Fair,
            3 => Self::Good,
            _ => Self::Strong,
        }
    }

    pub const fn width_percent(self) -> u16 {
        match self {
            Self::Empty => 0,
            Self::Weak => 25,
            Self::Fair => 50,
            Self::Good => 75,
            Self::Strong => 100,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Strong => "strong",
        }
    }
}

/// Raw registration form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
    pub title: String,
    pub category: Option<Category>,
    pub bio: String,
    pub skills: Vec<String>,
}

impl RegistrationInput {
    /// Validate and serialize into the request body.
    ///
    /// Clients never send category or skills; those fields are hidden for them.
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        check_passwords(&self.password, &self.confirm_password)?;

        let role = self.role.ok_or_else(|| {
            ValidationError::field(
                "role",
                "Please select whether you are a Freelancer or Client!",
            )
        })?;

        let title = non_empty(&self.title);
        let (category, skills) = match role {
            Role::Freelancer => {
                if title.is_none() {
                    return Err(ValidationError::field(
                        "title",
                        "Please enter your professional title.",
                    ));
                }
                let category = self.category.ok_or_else(|| {
                    ValidationError::field("category", "Please choose a category.")
                })?;
                (Some(category), self.skills.clone())
            }
            Role::Client => (None, Vec::new()),
        };

        if self.email.trim().is_empty() {
            return Err(ValidationError::field("email", "Please enter your email."));
        }

        Ok(Registration {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            title,
            category,
            bio: non_empty(&self.bio),
            skills,
            role,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Avatar uploads must be images no larger than [`AVATAR_MAX_BYTES`].
pub fn check_avatar(mime: &str, size: u64) -> Result<(), ValidationError> {
    if !mime.starts_with("image/") {
        return Err(ValidationError::field(
            "profile_picture",
            "Please select a valid image file",
        ));
    }
    if size > AVATAR_MAX_BYTES {
        return Err(ValidationError::field(
            "profile_picture",
            "File size must be less than 5MB",
        ));
    }
    Ok(())
}

/// Parse the bid form; every field is required.
pub fn parse_bid(amount: &str, delivery_days: &str, proposal: &str) -> Result<BidDraft, ValidationError> {
    let (amount, delivery_days) = (amount.trim(), delivery_days.trim());
    if amount.is_empty() || delivery_days.is_empty() || proposal.trim().is_empty() {
        return Err(ValidationError::new("Please fill in all fields"));
    }
    let amount = amount
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or_else(|| ValidationError::field("amount", "Please enter a valid bid amount"))?;
    let delivery_days = delivery_days
        .parse::<u32>()
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| {
            ValidationError::field("delivery_days", "Please enter a valid number of days")
        })?;
    Ok(BidDraft {
        amount,
        delivery_days,
        proposal: proposal.to_string(),
    })
}

/// Split a display name at the first whitespace into first and last name.
pub fn split_display_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}
