use serde::{Deserialize, Serialize};
use validator::Validate;

/// Checkout shipping address, captured from the form or picked from the
/// saved-address list. Immutable for the rest of the checkout session once
/// it lands in the order summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 2, message = "First name must be at least 2 characters."))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters."))]
    pub last_name: String,
    /// House number, building name
    #[validate(length(min = 5, message = "Address must be at least 5 characters."))]
    pub address: String,
    #[validate(length(min = 2, message = "City must be at least 2 characters."))]
    pub city: String,
    /// Road name, area, colony
    #[validate(length(min = 2, message = "Region must be at least 2 characters."))]
    pub region: String,
    /// Pin code
    #[validate(length(min = 5, message = "Postal code must be at least 5 characters."))]
    pub postal_code: String,
    #[validate(length(min = 2, message = "Country must be at least 2 characters."))]
    pub country: String,
    #[validate(length(min = 10, message = "Phone number must be at least 10 characters."))]
    pub phone: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

impl ShippingAddress {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Converts into the profile-area shape for persisting to the address book.
    pub fn to_saved(&self) -> NewSavedAddress {
        NewSavedAddress {
            name: self.full_name(),
            street: self.address.clone(),
            city: self.city.clone(),
            state: self.region.clone(),
            zip_code: self.postal_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
            is_primary: false,
        }
    }
}

/// An address stored on the customer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: String,
    /// Exactly one address per account is primary; the server unsets the
    /// previous one atomically when a new primary is chosen.
    #[serde(default)]
    pub is_primary: bool,
}

impl SavedAddress {
    /// Converts into the checkout shape. The profile shape has no email, so
    /// the caller supplies one (typically the signed-in user's).
    pub fn to_shipping(&self, email: &str) -> ShippingAddress {
        let mut parts = self.name.split_whitespace();
        let first_name = parts.next().unwrap_or_default().to_string();
        let last_name = parts.collect::<Vec<_>>().join(" ");
        ShippingAddress {
            first_name,
            last_name,
            address: self.street.clone(),
            city: self.city.clone(),
            region: self.state.clone(),
            postal_code: self.zip_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
            email: email.to_string(),
        }
    }

    /// Whether this saved entry points at the same destination as a
    /// checkout address. Matching is by street and postal code, which is
    /// what gates the "save this address?" prompt.
    pub fn matches_shipping(&self, address: &ShippingAddress) -> bool {
        self.street == address.address && self.zip_code == address.postal_code
    }
}

/// Payload for creating or updating a saved address.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedAddress {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(length(min = 5))]
    pub street: String,
    #[validate(length(min = 2))]
    pub city: String,
    pub state: String,
    #[validate(length(min = 5))]
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub is_primary: bool,
}
