//! Household service - creation with owner membership, member management.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use common::{ApiError, ApiResponse, AppError};
use domain::{CreateHousehold, CreateMember, Household, HouseholdMember, MemberRole};
use repository::run_with_rollback;

use crate::repository::{HouseholdRepository, MemberRepository};

/// The acting user and the name they appear under.
#[derive(Debug, Clone)]
pub struct MemberProfile {
    pub user_id: String,
    pub display_name: String,
}

impl MemberProfile {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A new household together with its owner membership.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedHousehold {
    pub household: Household,
    pub owner: HouseholdMember,
}

#[async_trait]
pub trait HouseholdService: Send + Sync {
    /// Create a household and make `owner` its owner.
    ///
    /// If the membership cannot be created the household is deleted
    /// again and the membership error is returned.
    async fn create_household(
        &self,
        dto: CreateHousehold,
        owner: MemberProfile,
    ) -> ApiResponse<CreatedHousehold>;

    /// Add a member on behalf of `actor_user_id`, who must be an owner or
    /// admin of the household.
    async fn add_member(
        &self,
        actor_user_id: &str,
        dto: CreateMember,
    ) -> ApiResponse<HouseholdMember>;

    async fn households_for_user(&self, user_id: &str) -> ApiResponse<Vec<Household>>;
}

pub struct HouseholdManager {
    households: Arc<HouseholdRepository>,
    members: Arc<MemberRepository>,
}

impl HouseholdManager {
    pub fn new(households: Arc<HouseholdRepository>, members: Arc<MemberRepository>) -> Self {
        Self {
            households,
            members,
        }
    }

    async fn try_create_household(
        &self,
        mut dto: CreateHousehold,
        owner: MemberProfile,
    ) -> Result<CreatedHousehold, ApiError> {
        if dto.created_by.is_none() {
            dto.created_by = Some(owner.user_id.clone());
        }
        let household = self.households.create(dto).await.into_data()?;
        tracing::debug!(household_id = %household.id, "Household created, adding owner");

        let members = &self.members;
        let households = &self.households;
        let owner = run_with_rollback(
            &household,
            |household| {
                let membership = CreateMember::new(
                    household.id.clone(),
                    owner.display_name,
                    MemberRole::Owner,
                )
                .with_user(owner.user_id);
                async move { members.add(membership).await.into_data() }
            },
            |household| {
                let id = household.id.clone();
                async move { households.delete(&id).await.into_result().map(|_| ()) }
            },
        )
        .await?;

        Ok(CreatedHousehold { household, owner })
    }

    async fn try_add_member(
        &self,
        actor_user_id: &str,
        dto: CreateMember,
    ) -> Result<HouseholdMember, ApiError> {
        let role = self.members.role_of(&dto.household_id, actor_user_id).await?;
        if !role.is_some_and(|role| role.can_manage_members()) {
            return Err(AppError::Forbidden.into());
        }
        if dto.role == MemberRole::Owner {
            return Err(AppError::validation("A household has exactly one owner").into());
        }
        if let Some(user_id) = dto.user_id.as_deref() {
            let existing = self.members.role_of(&dto.household_id, user_id).await?;
            if existing.is_some() {
                return Err(AppError::conflict("Membership").into());
            }
        }
        self.members.add(dto).await.into_data()
    }
}

#[async_trait]
impl HouseholdService for HouseholdManager {
    async fn create_household(
        &self,
        dto: CreateHousehold,
        owner: MemberProfile,
    ) -> ApiResponse<CreatedHousehold> {
        self.try_create_household(dto, owner).await.into()
    }

    async fn add_member(
        &self,
        actor_user_id: &str,
        dto: CreateMember,
    ) -> ApiResponse<HouseholdMember> {
        self.try_add_member(actor_user_id, dto).await.into()
    }

    async fn households_for_user(&self, user_id: &str) -> ApiResponse<Vec<Household>> {
        self.households.find_for_user(user_id).await
    }
}
