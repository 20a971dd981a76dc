use std::sync::Arc;

use tracing::instrument;
use validator::Validate;

use crate::client::ApiClient;
use crate::errors::StorefrontError;
use crate::models::{NewReview, Review};

/// Product review reads and submission.
///
/// The backend's review payloads carry the product either embedded or as a
/// bare id; normalization into [`crate::models::ProductRef`] happens during
/// deserialization, so callers never see the inconsistency.
#[derive(Clone)]
pub struct ReviewService {
    client: Arc<ApiClient>,
}

impl ReviewService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Lists published reviews.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Review>, StorefrontError> {
        self.client
            .get::<Vec<Review>>("/reviews")
            .await?
            .into_data("load reviews")
    }

    /// Submits a review.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn submit(&self, review: NewReview) -> Result<Review, StorefrontError> {
        review.validate()?;
        self.client
            .post::<Review, _>("/reviews", &review)
            .await?
            .into_data("submit the review")
    }
}
