use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::client::ApiClient;
use crate::errors::StorefrontError;
use crate::models::{NewSavedAddress, SavedAddress};

/// Address book service for the customer profile.
///
/// Exactly one address may be primary at a time; setting a new primary
/// atomically unsets the previous one server-side. The client relies on
/// that invariant and re-reads the list after mutations rather than
/// patching local copies.
#[derive(Clone)]
pub struct AddressService {
    client: Arc<ApiClient>,
}

impl AddressService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Lists the saved addresses.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<SavedAddress>, StorefrontError> {
        self.require_session()?;
        self.client
            .get::<Vec<SavedAddress>>("/users/addresses")
            .await?
            .into_data("load your addresses")
    }

    /// Adds a new saved address.
    #[instrument(skip(self, address))]
    pub async fn add(&self, address: NewSavedAddress) -> Result<SavedAddress, StorefrontError> {
        address.validate()?;
        self.require_session()?;
        let saved = self
            .client
            .post::<SavedAddress, _>("/users/addresses", &address)
            .await?
            .into_data("save the address")?;
        info!("Saved address {}", saved.id);
        Ok(saved)
    }

    /// Updates an existing saved address.
    #[instrument(skip(self, address))]
    pub async fn update(
        &self,
        address_id: &str,
        address: NewSavedAddress,
    ) -> Result<SavedAddress, StorefrontError> {
        address.validate()?;
        self.require_session()?;
        self.client
            .put::<SavedAddress, _>(&format!("/users/addresses/{}", address_id), &address)
            .await?
            .into_data("update the address")
    }

    /// Deletes a saved address.
    #[instrument(skip(self))]
    pub async fn delete(&self, address_id: &str) -> Result<(), StorefrontError> {
        self.require_session()?;
        let envelope = self
            .client
            .delete::<serde_json::Value>(&format!("/users/addresses/{}", address_id))
            .await?;
        if !envelope.success {
            return Err(StorefrontError::ServerRejected(
                envelope
                    .message
                    .unwrap_or_else(|| "Failed to delete the address.".to_string()),
            ));
        }
        Ok(())
    }

    /// Flags one address as primary. The server unsets the previous
    /// primary in the same operation.
    #[instrument(skip(self))]
    pub async fn set_primary(&self, address_id: &str) -> Result<(), StorefrontError> {
        self.require_session()?;
        let envelope = self
            .client
            .put::<serde_json::Value, _>(
                &format!("/users/addresses/{}/set-primary", address_id),
                &serde_json::json!({}),
            )
            .await?;
        if !envelope.success {
            return Err(StorefrontError::ServerRejected(
                envelope
                    .message
                    .unwrap_or_else(|| "Failed to set the address as primary.".to_string()),
            ));
        }
        Ok(())
    }

    fn require_session(&self) -> Result<(), StorefrontError> {
        if self.client.is_authenticated() {
            Ok(())
        } else {
            Err(StorefrontError::AuthenticationRequired(
                "Please sign in to manage your addresses.".to_string(),
            ))
        }
    }
}
