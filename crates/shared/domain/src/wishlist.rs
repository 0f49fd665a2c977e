//! Wishlists owned by household members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{TABLE_WISHLISTS, TABLE_WISHLIST_ITEMS};
use crate::impl_entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wishlist {
    pub id: String,
    pub household_id: String,
    /// Member the wishlist belongs to
    #[serde(default)]
    pub member_id: Option<String>,
    pub title: String,
    /// Visible to other households through a share link
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Wishlist, TABLE_WISHLISTS);

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWishlist {
    #[validate(length(min = 1, message = "Household id is required"))]
    pub household_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: String,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWishlist {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: String,
    pub wishlist_id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    /// 1 (highest) to 5
    #[serde(default)]
    pub priority: Option<u8>,
    /// Member who promised to buy the item
    #[serde(default)]
    pub reserved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(WishlistItem, TABLE_WISHLIST_ITEMS);

impl WishlistItem {
    pub fn is_reserved(&self) -> bool {
        self.reserved_by.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWishlistItem {
    #[validate(length(min = 1, message = "Wishlist id is required"))]
    pub wishlist_id: String,
    #[validate(length(min = 1, max = 200, message = "Item name must be 1-200 characters"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
    pub priority: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWishlistItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Item name must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    /// `Some(None)` releases a reservation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_by: Option<Option<String>>,
}
