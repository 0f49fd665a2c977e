//! Household repository.

use common::{ApiError, ApiResponse};
use domain::{CreateHousehold, Household, UpdateHousehold};
use repository::{Direction, Query};

use super::{validated, HouseholdTable, MemberTable};

/// Households, soft-deleted through `is_active`.
pub struct HouseholdRepository {
    households: HouseholdTable,
    members: MemberTable,
}

impl HouseholdRepository {
    pub fn new(households: HouseholdTable, members: MemberTable) -> Self {
        Self {
            households,
            members,
        }
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResponse<Household> {
        self.households.find_by_id(id).await
    }

    /// Active households, oldest first
    pub async fn find_active(&self) -> ApiResponse<Vec<Household>> {
        let query = Query::new()
            .eq("is_active", true)
            .order_by("created_at", Direction::Asc);
        self.households.find_all(Some(query)).await
    }

    /// Active households `user_id` is an active member of.
    pub async fn find_for_user(&self, user_id: &str) -> ApiResponse<Vec<Household>> {
        self.try_find_for_user(user_id).await.into()
    }

    async fn try_find_for_user(&self, user_id: &str) -> Result<Vec<Household>, ApiError> {
        let memberships = self
            .members
            .find_all(Some(
                Query::new().eq("user_id", user_id).eq("is_active", true),
            ))
            .await
            .into_data()?;
        if memberships.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = memberships.into_iter().map(|m| m.household_id).collect();
        let query = Query::new()
            .in_list("id", ids)
            .eq("is_active", true)
            .order_by("created_at", Direction::Asc);
        self.households.find_all(Some(query)).await.into_data()
    }

    pub async fn create(&self, dto: CreateHousehold) -> ApiResponse<Household> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.households.create(dto).await
    }

    pub async fn update(&self, id: &str, dto: UpdateHousehold) -> ApiResponse<Household> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.households.update(id, dto).await
    }

    /// Soft delete
    pub async fn deactivate(&self, id: &str) -> ApiResponse<Household> {
        let dto = UpdateHousehold {
            is_active: Some(false),
            ..Default::default()
        };
        self.households.update(id, dto).await
    }

    /// Hard delete; used to undo a failed creation.
    pub async fn delete(&self, id: &str) -> ApiResponse<()> {
        self.households.delete(id).await
    }
}
