//! Packing templates, household-specific or global.

use common::{ApiError, ApiResponse};
use domain::{CreatePackingItem, CreatePackingTemplate, PackingTemplate, UpdatePackingTemplate};
use repository::{Direction, Query};

use super::{validated, TemplateTable};

pub struct TemplateRepository {
    templates: TemplateTable,
}

impl TemplateRepository {
    pub fn new(templates: TemplateTable) -> Self {
        Self { templates }
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResponse<PackingTemplate> {
        self.templates.find_by_id(id).await
    }

    /// The household's own templates followed by the global ones
    /// (no `household_id`), each group by name.
    pub async fn for_household(&self, household_id: &str) -> ApiResponse<Vec<PackingTemplate>> {
        self.try_for_household(household_id).await.into()
    }

    async fn try_for_household(&self, household_id: &str) -> Result<Vec<PackingTemplate>, ApiError> {
        let own = Query::new()
            .eq("household_id", household_id)
            .order_by("name", Direction::Asc);
        let global = Query::new()
            .is_null("household_id")
            .order_by("name", Direction::Asc);

        let mut templates = self.templates.find_all(Some(own)).await.into_data()?;
        templates.extend(self.templates.find_all(Some(global)).await.into_data()?);
        Ok(templates)
    }

    pub async fn create(&self, dto: CreatePackingTemplate) -> ApiResponse<PackingTemplate> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.templates.create(dto).await
    }

    pub async fn update(&self, id: &str, dto: UpdatePackingTemplate) -> ApiResponse<PackingTemplate> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.templates.update(id, dto).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<()> {
        self.templates.delete(id).await
    }

    /// Packing item DTOs a trip would get from template `template_id`.
    pub async fn items_for_trip(
        &self,
        template_id: &str,
        trip_id: &str,
    ) -> ApiResponse<Vec<CreatePackingItem>> {
        self.templates
            .find_by_id(template_id)
            .await
            .map(|template| template.items_for_trip(trip_id))
    }
}
