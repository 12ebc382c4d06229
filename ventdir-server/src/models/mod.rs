//! Request models with validation at construction
//!
//! All user input is validated before it reaches a repository.
//! Invalid input returns ValidationError, not panic.

pub mod claim;
pub mod pagination;
pub mod review;
pub mod validation;

pub use claim::{ClaimRequest, FeedbackRequest, ValidClaim, ValidFeedback};
pub use pagination::{Paginated, Pagination, PaginationParams};
pub use review::{ReviewStats, ReviewSubmission, ValidReview};
pub use validation::ValidationError;
