use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The product a review points at.
///
/// The backend is inconsistent here: depending on whether the reference was
/// populated server-side, the field arrives either as an embedded
/// `{_id, name}` object or as a bare id string. The tagged union absorbs
/// both shapes at the API boundary so consumers never type-check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Embedded {
        #[serde(rename = "_id")]
        id: String,
        name: String,
    },
    Reference(String),
}

impl ProductRef {
    pub fn id(&self) -> &str {
        match self {
            ProductRef::Embedded { id, .. } => id,
            ProductRef::Reference(id) => id,
        }
    }

    /// The product name when the reference was populated.
    pub fn name(&self) -> Option<&str> {
        match self {
            ProductRef::Embedded { name, .. } => Some(name),
            ProductRef::Reference(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// A published product review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user: ReviewAuthor,
    pub product: ProductRef,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for submitting a review.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    pub comment: String,
}
