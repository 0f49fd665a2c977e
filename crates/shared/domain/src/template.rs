//! Reusable packing templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{DEFAULT_QUANTITY, TABLE_PACKING_TEMPLATES};
use crate::impl_entity;
use crate::trip::CreatePackingItem;

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

/// One line of a packing template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TemplateItem {
    #[validate(length(min = 1, max = 120, message = "Item name must be 1-120 characters"))]
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Packing template entity.
///
/// Templates without a household are shared by everyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingTemplate {
    pub id: String,
    #[serde(default)]
    pub household_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub items: Vec<TemplateItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(PackingTemplate, TABLE_PACKING_TEMPLATES);

impl PackingTemplate {
    /// Packing item DTOs for a trip, in template order
    pub fn items_for_trip(&self, trip_id: &str) -> Vec<CreatePackingItem> {
        self.items
            .iter()
            .map(|item| CreatePackingItem {
                trip_id: trip_id.to_string(),
                name: item.name.clone(),
                quantity: item.quantity,
                category: item.category.clone(),
                assigned_to: None,
                is_packed: false,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePackingTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_id: Option<String>,
    #[validate(length(min = 1, max = 120, message = "Template name must be 1-120 characters"))]
    pub name: String,
    #[validate(nested)]
    pub items: Vec<TemplateItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePackingTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TemplateItem>>,
}
