//! Trips and everything hanging off them.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use common::{ApiError, ApiResponse, AppError};
use domain::{
    BudgetEntry, CreateBudgetEntry, CreatePackingItem, CreateTimelineEvent, CreateTrip,
    CreateTripDocument, PackingItem, TimelineEvent, Trip, TripDocument, UpdateBudgetEntry,
    UpdatePackingItem, UpdateTimelineEvent, UpdateTrip,
};
use repository::{Direction, Query};

use super::{
    validated, BudgetTable, DocumentTable, PackingItemTable, TimelineTable, TripTable,
};

/// Budget sums in minor units, keyed by currency code.
pub type BudgetTotals = BTreeMap<String, i64>;

pub struct TripRepository {
    trips: TripTable,
    packing: PackingItemTable,
    budget: BudgetTable,
    timeline: TimelineTable,
    documents: DocumentTable,
}

impl TripRepository {
    pub fn new(
        trips: TripTable,
        packing: PackingItemTable,
        budget: BudgetTable,
        timeline: TimelineTable,
        documents: DocumentTable,
    ) -> Self {
        Self {
            trips,
            packing,
            budget,
            timeline,
            documents,
        }
    }

    // =========================================================================
    // Trips
    // =========================================================================

    pub async fn find_by_id(&self, id: &str) -> ApiResponse<Trip> {
        self.trips.find_by_id(id).await
    }

    /// Trips by start date; undated trips last.
    pub async fn for_household(&self, household_id: &str) -> ApiResponse<Vec<Trip>> {
        let query = Query::new()
            .eq("household_id", household_id)
            .order_by("start_date", Direction::Asc)
            .order_by("created_at", Direction::Asc);
        self.trips.find_all(Some(query)).await
    }

    /// Trips starting on or after `from`.
    pub async fn upcoming(&self, household_id: &str, from: NaiveDate) -> ApiResponse<Vec<Trip>> {
        let query = Query::new()
            .eq("household_id", household_id)
            .gte("start_date", from.to_string())
            .order_by("start_date", Direction::Asc);
        self.trips.find_all(Some(query)).await
    }

    pub async fn create(&self, dto: CreateTrip) -> ApiResponse<Trip> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.trips.create(dto).await
    }

    pub async fn update(&self, id: &str, dto: UpdateTrip) -> ApiResponse<Trip> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.trips.update(id, dto).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<()> {
        self.trips.delete(id).await
    }

    // =========================================================================
    // Packing
    // =========================================================================

    pub async fn packing_items(&self, trip_id: &str) -> ApiResponse<Vec<PackingItem>> {
        let query = Query::new()
            .eq("trip_id", trip_id)
            .order_by("category", Direction::Asc)
            .order_by("name", Direction::Asc);
        self.packing.find_all(Some(query)).await
    }

    pub async fn add_packing_item(&self, dto: CreatePackingItem) -> ApiResponse<PackingItem> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.packing.create(dto).await
    }

    /// Add several items in one write.
    pub async fn add_packing_items(
        &self,
        dtos: Vec<CreatePackingItem>,
    ) -> ApiResponse<Vec<PackingItem>> {
        if let Some(error) = dtos.iter().find_map(|dto| validated(dto).err()) {
            return ApiResponse::err(error);
        }
        self.packing.create_many(dtos).await
    }

    pub async fn update_packing_item(
        &self,
        id: &str,
        dto: UpdatePackingItem,
    ) -> ApiResponse<PackingItem> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.packing.update(id, dto).await
    }

    pub async fn set_packed(&self, id: &str, packed: bool) -> ApiResponse<PackingItem> {
        let dto = UpdatePackingItem {
            is_packed: Some(packed),
            ..Default::default()
        };
        self.packing.update(id, dto).await
    }

    pub async fn delete_packing_item(&self, id: &str) -> ApiResponse<()> {
        self.packing.delete(id).await
    }

    // =========================================================================
    // Budget
    // =========================================================================

    pub async fn budget_entries(&self, trip_id: &str) -> ApiResponse<Vec<BudgetEntry>> {
        let query = Query::new()
            .eq("trip_id", trip_id)
            .order_by("created_at", Direction::Asc);
        self.budget.find_all(Some(query)).await
    }

    pub async fn add_budget_entry(&self, dto: CreateBudgetEntry) -> ApiResponse<BudgetEntry> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.budget.create(dto).await
    }

    pub async fn update_budget_entry(
        &self,
        id: &str,
        dto: UpdateBudgetEntry,
    ) -> ApiResponse<BudgetEntry> {
        self.budget.update(id, dto).await
    }

    pub async fn delete_budget_entry(&self, id: &str) -> ApiResponse<()> {
        self.budget.delete(id).await
    }

    /// Sum of a trip's budget entries per currency.
    ///
    /// A sum that does not fit in `i64` is a validation error.
    pub async fn budget_total(&self, trip_id: &str) -> ApiResponse<BudgetTotals> {
        match self.budget_entries(trip_id).await.into_data() {
            Ok(entries) => sum_by_currency(entries).into(),
            Err(error) => ApiResponse::err(error),
        }
    }

    // =========================================================================
    // Timeline
    // =========================================================================

    pub async fn timeline(&self, trip_id: &str) -> ApiResponse<Vec<TimelineEvent>> {
        let query = Query::new()
            .eq("trip_id", trip_id)
            .order_by("starts_at", Direction::Asc);
        self.timeline.find_all(Some(query)).await
    }

    pub async fn add_event(&self, dto: CreateTimelineEvent) -> ApiResponse<TimelineEvent> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.timeline.create(dto).await
    }

    pub async fn update_event(
        &self,
        id: &str,
        dto: UpdateTimelineEvent,
    ) -> ApiResponse<TimelineEvent> {
        self.timeline.update(id, dto).await
    }

    pub async fn delete_event(&self, id: &str) -> ApiResponse<()> {
        self.timeline.delete(id).await
    }

    // =========================================================================
    // Documents
    // =========================================================================

    pub async fn documents(&self, trip_id: &str) -> ApiResponse<Vec<TripDocument>> {
        let query = Query::new()
            .eq("trip_id", trip_id)
            .order_by("name", Direction::Asc);
        self.documents.find_all(Some(query)).await
    }

    pub async fn add_document(&self, dto: CreateTripDocument) -> ApiResponse<TripDocument> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.documents.create(dto).await
    }

    pub async fn delete_document(&self, id: &str) -> ApiResponse<()> {
        self.documents.delete(id).await
    }

    /// Delete a trip after everything attached to it.
    pub async fn delete_cascade(&self, id: &str) -> ApiResponse<()> {
        match self.try_delete_cascade(id).await {
            Ok(()) => ApiResponse::empty(),
            Err(error) => ApiResponse::err(error),
        }
    }

    async fn try_delete_cascade(&self, id: &str) -> Result<(), ApiError> {
        self.trips.find_by_id(id).await.into_data()?;

        for item in self.packing_items(id).await.into_data()? {
            self.packing.delete(&item.id).await.into_result()?;
        }
        for entry in self.budget_entries(id).await.into_data()? {
            self.budget.delete(&entry.id).await.into_result()?;
        }
        for event in self.timeline(id).await.into_data()? {
            self.timeline.delete(&event.id).await.into_result()?;
        }
        for document in self.documents(id).await.into_data()? {
            self.documents.delete(&document.id).await.into_result()?;
        }
        self.trips.delete(id).await.into_result()?;
        Ok(())
    }
}

fn sum_by_currency(entries: Vec<BudgetEntry>) -> Result<BudgetTotals, AppError> {
    let mut totals = BudgetTotals::new();
    for entry in entries {
        let total = totals.entry(entry.currency).or_insert(0);
        *total = total.checked_add(entry.amount_cents).ok_or_else(|| {
            AppError::validation("Budget total exceeds the supported amount range")
        })?;
    }
    Ok(totals)
}
