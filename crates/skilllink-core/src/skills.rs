//! Skills staging buffer.
//!
//! A local working copy of the profile's skill set. Adds and removals only
//! touch the buffer; the caller persists it as a whole on explicit save.

use crate::validation::ValidationError;

/// Editable copy of a skill list. Entries are unique (exact, case-sensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillsBuffer {
    skills: Vec<String>,
}

impl SkillsBuffer {
    /// Start a staging session from the skills currently held by the profile.
    pub fn open(current: &[String]) -> Self {
        Self {
            skills: current.to_vec(),
        }
    }

    /// Append a trimmed skill unless it is empty or already present.
    pub fn add(&mut self, input: &str) -> Result<(), ValidationError> {
        let skill = input.trim();
        if skill.is_empty() {
            return Err(ValidationError::field("skills", "Please enter a skill name"));
        }
        if self.skills.iter().any(|s| s == skill) {
            return Err(ValidationError::field(
                "skills",
                "This skill is already added",
            ));
        }
        self.skills.push(skill.to_string());
        Ok(())
    }

    /// Remove the skill at `index`, returning it. Out-of-range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.skills.len()).then(|| self.skills.remove(index))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Snapshot sent as the full replacement of the server-side set.
    pub fn to_vec(&self) -> Vec<String> {
        self.skills.clone()
    }
}
