//! Listing claim and problem-report payloads

use serde::Deserialize;
use uuid::Uuid;

use super::validation::{optional_email, required_text, ValidationError};

const MAX_NAME_LEN: usize = 200;
const MAX_FEEDBACK_LEN: usize = 5000;

/// Body of `POST /api/locations/{id}/claims`
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidClaim {
    pub name: String,
    pub email: String,
}

impl ClaimRequest {
    pub fn validate(self) -> Result<ValidClaim, ValidationError> {
        let name = required_text("name", &self.name, MAX_NAME_LEN)?;
        let email = optional_email(Some(&self.email))?
            .ok_or(ValidationError::Empty { field: "email" })?;
        Ok(ValidClaim { name, email })
    }
}

/// Body of `POST /api/feedback`
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub location_id: Option<Uuid>,
    pub feedback: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFeedback {
    pub location_id: Option<Uuid>,
    pub feedback: String,
    pub email: Option<String>,
}

impl FeedbackRequest {
    pub fn validate(self) -> Result<ValidFeedback, ValidationError> {
        Ok(ValidFeedback {
            location_id: self.location_id,
            feedback: required_text("feedback", &self.feedback, MAX_FEEDBACK_LEN)?,
            email: optional_email(self.email.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_requires_name_and_email() {
        let ok = ClaimRequest {
            name: " Pat Owner ".into(),
            email: "pat@vents.example".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.name, "Pat Owner");

        let missing_email = ClaimRequest {
            name: "Pat".into(),
            email: " ".into(),
        };
        assert_eq!(
            missing_email.validate(),
            Err(ValidationError::Empty { field: "email" })
        );
    }

    #[test]
    fn feedback_location_is_optional() {
        let fb = FeedbackRequest {
            location_id: None,
            feedback: "Phone number is wrong".into(),
            email: None,
        }
        .validate()
        .unwrap();
        assert_eq!(fb.location_id, None);
        assert_eq!(fb.feedback, "Phone number is wrong");
    }

    #[test]
    fn blank_feedback_rejected() {
        let fb = FeedbackRequest {
            location_id: Some(Uuid::new_v4()),
            feedback: "\n".into(),
            email: None,
        };
        assert_eq!(fb.validate(), Err(ValidationError::Empty { field: "feedback" }));
    }
}
