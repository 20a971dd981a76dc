use std::sync::Arc;

use tracing::instrument;

use crate::client::ApiClient;
use crate::errors::StorefrontError;
use crate::models::{Product, ProductPage, ProductQuery};

/// Read-only product catalog access.
#[derive(Clone)]
pub struct ProductCatalogService {
    client: Arc<ApiClient>,
}

impl ProductCatalogService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Lists a page of the catalog with optional sort/filter/search.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, StorefrontError> {
        self.client
            .get_with_query::<ProductPage>("/products", &query.to_query_pairs())
            .await?
            .into_data("load products")
    }

    /// Fetches one product by id.
    #[instrument(skip(self))]
    pub async fn get(&self, product_id: &str) -> Result<Product, StorefrontError> {
        self.client
            .get::<Product>(&format!("/products/{}", product_id))
            .await?
            .into_data("load the product")
    }
}
