//! Household membership repository.

use common::{ApiError, ApiResponse};
use domain::{CreateMember, HouseholdMember, MemberRole, UpdateMember};
use repository::{Direction, Query};

use super::{validated, MemberTable};

pub struct MemberRepository {
    members: MemberTable,
}

impl MemberRepository {
    pub fn new(members: MemberTable) -> Self {
        Self { members }
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResponse<HouseholdMember> {
        self.members.find_by_id(id).await
    }

    /// Active members of a household in joining order.
    pub async fn find_by_household(&self, household_id: &str) -> ApiResponse<Vec<HouseholdMember>> {
        let query = Query::new()
            .eq("household_id", household_id)
            .eq("is_active", true)
            .order_by("created_at", Direction::Asc);
        self.members.find_all(Some(query)).await
    }

    pub async fn find_by_user(&self, user_id: &str) -> ApiResponse<Vec<HouseholdMember>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .eq("is_active", true)
            .order_by("created_at", Direction::Asc);
        self.members.find_all(Some(query)).await
    }

    /// The active membership of `user_id` in `household_id`, if any.
    pub async fn find_membership(
        &self,
        household_id: &str,
        user_id: &str,
    ) -> ApiResponse<Option<HouseholdMember>> {
        let query = Query::new()
            .eq("household_id", household_id)
            .eq("user_id", user_id)
            .eq("is_active", true)
            .limit(1);
        self.members
            .find_all(Some(query))
            .await
            .map(|members| members.into_iter().next())
    }

    /// Role of `user_id` in `household_id`; `None` for non-members.
    pub async fn role_of(
        &self,
        household_id: &str,
        user_id: &str,
    ) -> Result<Option<MemberRole>, ApiError> {
        let membership = self
            .find_membership(household_id, user_id)
            .await
            .into_data()?;
        Ok(membership.map(|member| member.role))
    }

    pub async fn add(&self, dto: CreateMember) -> ApiResponse<HouseholdMember> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.members.create(dto).await
    }

    pub async fn update(&self, id: &str, dto: UpdateMember) -> ApiResponse<HouseholdMember> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.members.update(id, dto).await
    }

    /// Soft delete
    pub async fn deactivate(&self, id: &str) -> ApiResponse<HouseholdMember> {
        let dto = UpdateMember {
            is_active: Some(false),
            ..Default::default()
        };
        self.members.update(id, dto).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<()> {
        self.members.delete(id).await
    }
}
