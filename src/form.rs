use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The fields collected by the interest form. Same shape on the form post and on the
/// backend's JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterestForm {
    pub interests: String,
    pub skills: String,
    pub contribution_method: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Interests,
    Skills,
    ContributionMethod,
    Location,
}

impl Field {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::Interests => "interests",
            Field::Skills => "skills",
            Field::ContributionMethod => "contributionMethod",
            Field::Location => "location",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Interests => "causes that motivate you",
            Field::Skills => "skills",
            Field::ContributionMethod => "how you would like to contribute",
            Field::Location => "location",
        }
    }
}

impl InterestForm {
    fn fields(&self) -> [(Field, &str); 4] {
        [
            (Field::Interests, self.interests.as_str()),
            (Field::Skills, self.skills.as_str()),
            (Field::ContributionMethod, self.contribution_method.as_str()),
            (Field::Location, self.location.as_str()),
        ]
    }

    /// Returns a trimmed copy, or the list of required fields left empty (in form order).
    pub fn validate(&self) -> Result<InterestForm, ValidationError> {
        let missing: Vec<Field> = self
            .fields()
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(InterestForm {
            interests: self.interests.trim().to_string(),
            skills: self.skills.trim().to_string(),
            contribution_method: self.contribution_method.trim().to_string(),
            location: self.location.trim().to_string(),
        })
    }

    /// One-line echo of the submission shown as the user's chat message.
    pub fn summary(&self) -> String {
        format!(
            "Interests: {} | Skills: {} | Contribution: {} | Location: {}",
            self.interests, self.skills, self.contribution_method, self.location
        )
    }
}
