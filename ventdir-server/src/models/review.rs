//! Review submission payload

use serde::{Deserialize, Serialize};

use super::validation::{optional_email, ValidationError};

/// Maximum comment length in characters
pub const MAX_COMMENT_LEN: usize = 2000;

/// Reviews from one IP per location allowed in a rolling 24 hours
pub const MAX_REVIEWS_PER_IP_PER_DAY: i64 = 3;

/// Raw JSON body of `POST /api/locations/{id}/reviews`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSubmission {
    pub recommended: Option<bool>,
    pub comment: Option<String>,
    pub email: Option<String>,
    /// Hidden form field; bots fill it in, people don't
    pub honeypot: Option<String>,
}

/// Submission that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReview {
    pub recommended: Option<bool>,
    pub comment: Option<String>,
    pub email: Option<String>,
}

impl ReviewSubmission {
    pub fn validate(self) -> Result<ValidReview, ValidationError> {
        if self.honeypot.as_deref().is_some_and(|h| !h.is_empty()) {
            return Err(ValidationError::Spam);
        }

        let comment = self
            .comment
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        if let Some(c) = &comment {
            if c.chars().count() > MAX_COMMENT_LEN {
                return Err(ValidationError::TooLong {
                    field: "comment",
                    max: MAX_COMMENT_LEN,
                });
            }
        }

        if self.recommended.is_none() && comment.is_none() {
            return Err(ValidationError::Empty { field: "review" });
        }

        Ok(ValidReview {
            recommended: self.recommended,
            comment,
            email: optional_email(self.email.as_deref())?,
        })
    }
}

/// Output of `location_review_stats`, zeroed when the function returns no row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewStats {
    pub total: i64,
    pub recommended_count: i64,
    pub percent_recommended: f64,
    pub recent_comments: Vec<serde_json::Value>,
}
