//! Households, their members and pending invitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{
    ROLE_ADMIN, ROLE_MEMBER, ROLE_OWNER, TABLE_HOUSEHOLDS, TABLE_HOUSEHOLD_MEMBERS,
    TABLE_INVITATIONS,
};
use crate::error::{DomainError, DomainResult};
use crate::impl_entity;

pub(crate) fn default_true() -> bool {
    true
}

/// Member roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    #[default]
    Member,
}

impl MemberRole {
    /// Owners and admins may manage members and invitations
    pub fn can_manage_members(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => ROLE_OWNER,
            MemberRole::Admin => ROLE_ADMIN,
            MemberRole::Member => ROLE_MEMBER,
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemberRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_OWNER => Ok(MemberRole::Owner),
            ROLE_ADMIN => Ok(MemberRole::Admin),
            ROLE_MEMBER => Ok(MemberRole::Member),
            other => Err(DomainError::validation(format!("Unknown role: {other}"))),
        }
    }
}

/// Household entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// User id of the creator
    #[serde(default)]
    pub created_by: Option<String>,
    /// Soft delete flag
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Household, TABLE_HOUSEHOLDS);

/// Household creation data transfer object
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateHousehold {
    #[validate(length(min = 1, max = 120, message = "Household name must be 1-120 characters"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateHousehold {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            created_by: None,
            is_active: true,
        }
    }
}

/// Household update data transfer object
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateHousehold {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "Household name must be 1-120 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Membership of a user in a household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdMember {
    pub id: String,
    pub household_id: String,
    /// Linked account, absent for members without a login (e.g. children)
    #[serde(default)]
    pub user_id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(HouseholdMember, TABLE_HOUSEHOLD_MEMBERS);

/// Member creation data transfer object
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMember {
    #[validate(length(min = 1, message = "Household id is required"))]
    pub household_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[validate(length(min = 1, max = 120, message = "Display name must be 1-120 characters"))]
    pub display_name: String,
    pub role: MemberRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateMember {
    pub fn new(
        household_id: impl Into<String>,
        display_name: impl Into<String>,
        role: MemberRole,
    ) -> Self {
        Self {
            household_id: household_id.into(),
            user_id: None,
            display_name: display_name.into(),
            role,
            is_active: true,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Member update data transfer object
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "Display name must be 1-120 characters"))]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MemberRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Invitation lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Revoked,
}

impl InvitationStatus {
    /// Only pending invitations can change state.
    pub fn transition_to(self, next: InvitationStatus) -> DomainResult<InvitationStatus> {
        match (self, next) {
            (InvitationStatus::Pending, InvitationStatus::Pending) => Err(
                DomainError::invalid_transition("invitation is already pending"),
            ),
            (InvitationStatus::Pending, next) => Ok(next),
            (current, _) => Err(DomainError::invalid_transition(format!(
                "invitation is already {current:?}"
            ))),
        }
    }
}

/// Invitation of an email address into a household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub household_id: String,
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default)]
    pub status: InvitationStatus,
    #[serde(default)]
    pub invited_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Invitation, TABLE_INVITATIONS);

/// Invitation creation data transfer object
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvitation {
    #[validate(length(min = 1, message = "Household id is required"))]
    pub household_id: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub role: MemberRole,
    pub status: InvitationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<String>,
}

/// Invitation update data transfer object
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateInvitation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvitationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MemberRole>,
}
