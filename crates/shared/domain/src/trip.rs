//! Trip planning: trips, packing, budget, timeline and documents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::constants::{
    DEFAULT_CURRENCY, DEFAULT_QUANTITY, TABLE_BUDGET_ENTRIES, TABLE_PACKING_ITEMS,
    TABLE_TIMELINE_EVENTS, TABLE_TRIPS, TABLE_TRIP_DOCUMENTS,
};
use crate::impl_entity;

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Trip, TABLE_TRIPS);

impl Trip {
    /// Length of the trip in days, inclusive of both ends
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((end - start).num_days() + 1),
            _ => None,
        }
    }
}

fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            let mut error = ValidationError::new("date_order");
            error.message = Some("End date must not be before start date".into());
            return Err(error);
        }
    }
    Ok(())
}

fn validate_trip_dates(dto: &CreateTrip) -> Result<(), ValidationError> {
    check_date_order(dto.start_date, dto.end_date)
}

/// Only checked when the patch carries both dates.
fn validate_trip_date_patch(dto: &UpdateTrip) -> Result<(), ValidationError> {
    check_date_order(dto.start_date, dto.end_date)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_trip_dates"))]
pub struct CreateTrip {
    #[validate(length(min = 1, message = "Household id is required"))]
    pub household_id: String,
    #[validate(length(min = 1, max = 120, message = "Trip name must be 1-120 characters"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_trip_date_patch"))]
pub struct UpdateTrip {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "Trip name must be 1-120 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

// =============================================================================
// Packing
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingItem {
    pub id: String,
    pub trip_id: String,
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub category: Option<String>,
    /// Member responsible for packing the item
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub is_packed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(PackingItem, TABLE_PACKING_ITEMS);

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePackingItem {
    #[validate(length(min = 1, message = "Trip id is required"))]
    pub trip_id: String,
    #[validate(length(min = 1, max = 120, message = "Item name must be 1-120 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub is_packed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePackingItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "Item name must be 1-120 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_packed: Option<bool>,
}

// =============================================================================
// Budget
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: String,
    pub trip_id: String,
    pub label: String,
    /// Amount in minor currency units
    pub amount_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub paid_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(BudgetEntry, TABLE_BUDGET_ENTRIES);

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBudgetEntry {
    #[validate(length(min = 1, message = "Trip id is required"))]
    pub trip_id: String,
    #[validate(length(min = 1, max = 120, message = "Label must be 1-120 characters"))]
    pub label: String,
    pub amount_cents: i64,
    #[validate(length(equal = 3, message = "Currency must be an ISO 4217 code"))]
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBudgetEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<String>,
}

// =============================================================================
// Timeline
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(TimelineEvent, TABLE_TIMELINE_EVENTS);

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTimelineEvent {
    #[validate(length(min = 1, message = "Trip id is required"))]
    pub trip_id: String,
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTimelineEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Documents
// =============================================================================

/// Metadata of a file kept in object storage (tickets, passports, bookings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDocument {
    pub id: String,
    pub trip_id: String,
    pub name: String,
    /// Object storage path, e.g. `trips/<trip>/<file>`
    pub storage_path: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(TripDocument, TABLE_TRIP_DOCUMENTS);

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTripDocument {
    #[validate(length(min = 1, message = "Trip id is required"))]
    pub trip_id: String,
    #[validate(length(min = 1, max = 200, message = "Document name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Storage path is required"))]
    pub storage_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTripDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
