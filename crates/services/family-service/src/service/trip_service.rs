//! Trip service - trips seeded from packing templates.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use common::{ApiError, ApiResponse};
use domain::{CreateTrip, PackingItem, Trip};
use repository::run_with_rollback;

use crate::repository::{TemplateRepository, TripRepository};

/// A new trip and the packing items copied into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTrip {
    pub trip: Trip,
    pub packing_items: Vec<PackingItem>,
}

#[async_trait]
pub trait TripService: Send + Sync {
    /// Create a trip and copy the template's items into its packing list.
    ///
    /// An unknown template fails before anything is written; a failed
    /// item insert deletes the trip again.
    async fn create_trip_from_template(
        &self,
        dto: CreateTrip,
        template_id: &str,
    ) -> ApiResponse<PlannedTrip>;
}

pub struct TripManager {
    trips: Arc<TripRepository>,
    templates: Arc<TemplateRepository>,
}

impl TripManager {
    pub fn new(trips: Arc<TripRepository>, templates: Arc<TemplateRepository>) -> Self {
        Self { trips, templates }
    }

    async fn try_create_from_template(
        &self,
        dto: CreateTrip,
        template_id: &str,
    ) -> Result<PlannedTrip, ApiError> {
        let template = self.templates.find_by_id(template_id).await.into_data()?;
        let trip = self.trips.create(dto).await.into_data()?;

        let trips = &self.trips;
        let packing_items = run_with_rollback(
            &trip,
            |trip| {
                let items = template.items_for_trip(&trip.id);
                async move {
                    if items.is_empty() {
                        return Ok(Vec::new());
                    }
                    trips.add_packing_items(items).await.into_data()
                }
            },
            |trip| {
                let id = trip.id.clone();
                async move { trips.delete(&id).await.into_result().map(|_| ()) }
            },
        )
        .await?;

        tracing::debug!(
            trip_id = %trip.id,
            template_id,
            items = packing_items.len(),
            "Trip planned from template"
        );
        Ok(PlannedTrip {
            trip,
            packing_items,
        })
    }
}

#[async_trait]
impl TripService for TripManager {
    async fn create_trip_from_template(
        &self,
        dto: CreateTrip,
        template_id: &str,
    ) -> ApiResponse<PlannedTrip> {
        self.try_create_from_template(dto, template_id).await.into()
    }
}
