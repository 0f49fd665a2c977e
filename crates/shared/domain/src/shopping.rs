//! Shopping lists and their items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{DEFAULT_QUANTITY, TABLE_SHOPPING_ITEMS, TABLE_SHOPPING_LISTS};
use crate::impl_entity;

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

/// Shopping list entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(ShoppingList, TABLE_SHOPPING_LISTS);

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShoppingList {
    #[validate(length(min = 1, message = "Household id is required"))]
    pub household_id: String,
    #[validate(length(min = 1, max = 120, message = "List name must be 1-120 characters"))]
    pub name: String,
    #[serde(default)]
    pub is_archived: bool,
}

impl CreateShoppingList {
    pub fn new(household_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            household_id: household_id.into(),
            name: name.into(),
            is_archived: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateShoppingList {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "List name must be 1-120 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

/// Shopping item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: String,
    pub list_id: String,
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_purchased: bool,
    /// Member who ticked the item off
    #[serde(default)]
    pub purchased_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(ShoppingItem, TABLE_SHOPPING_ITEMS);

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShoppingItem {
    #[validate(length(min = 1, message = "List id is required"))]
    pub list_id: String,
    #[validate(length(min = 1, max = 120, message = "Item name must be 1-120 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub is_purchased: bool,
}

impl CreateShoppingItem {
    pub fn new(list_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            name: name.into(),
            quantity: DEFAULT_QUANTITY,
            unit: None,
            category: None,
            is_purchased: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateShoppingItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "Item name must be 1-120 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_purchased: Option<bool>,
    /// `Some(None)` clears the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_by: Option<Option<String>>,
}
