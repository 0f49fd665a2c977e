//! Household invitations.

use common::{ApiError, ApiResponse, AppError};
use domain::{
    CreateInvitation, Invitation, InvitationStatus, MemberRole, UpdateInvitation,
};
use repository::{Direction, Query};

use super::{validated, InvitationTable};

pub struct InvitationRepository {
    invitations: InvitationTable,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl InvitationRepository {
    pub fn new(invitations: InvitationTable) -> Self {
        Self { invitations }
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResponse<Invitation> {
        self.invitations.find_by_id(id).await
    }

    pub async fn find_by_household(&self, household_id: &str) -> ApiResponse<Vec<Invitation>> {
        let query = Query::new()
            .eq("household_id", household_id)
            .order_by("created_at", Direction::Desc);
        self.invitations.find_all(Some(query)).await
    }

    /// Pending invitations addressed to `email`, any casing.
    pub async fn find_pending_for_email(&self, email: &str) -> ApiResponse<Vec<Invitation>> {
        let query = Query::new()
            .eq("email", normalize_email(email))
            .eq("status", "pending")
            .order_by("created_at", Direction::Asc);
        self.invitations.find_all(Some(query)).await
    }

    /// Invite `email` into a household.
    ///
    /// Fails with a conflict while an earlier invitation for the same
    /// address is still pending.
    pub async fn invite_by_email(
        &self,
        household_id: &str,
        email: &str,
        role: MemberRole,
        invited_by: Option<String>,
    ) -> ApiResponse<Invitation> {
        self.try_invite(household_id, email, role, invited_by)
            .await
            .into()
    }

    async fn try_invite(
        &self,
        household_id: &str,
        email: &str,
        role: MemberRole,
        invited_by: Option<String>,
    ) -> Result<Invitation, ApiError> {
        let dto = CreateInvitation {
            household_id: household_id.to_string(),
            email: normalize_email(email),
            role,
            status: InvitationStatus::Pending,
            invited_by,
        };
        validated(&dto)?;

        let pending = Query::new()
            .eq("household_id", household_id)
            .eq("email", dto.email.as_str())
            .eq("status", "pending")
            .limit(1);
        let existing = self.invitations.find_all(Some(pending)).await.into_data()?;
        if !existing.is_empty() {
            return Err(AppError::conflict("Pending invitation").into());
        }

        self.invitations.create(dto).await.into_data()
    }

    /// Accept or decline a pending invitation.
    pub async fn respond(&self, id: &str, accept: bool) -> ApiResponse<Invitation> {
        let next = if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Declined
        };
        self.transition(id, next).await.into()
    }

    pub async fn revoke(&self, id: &str) -> ApiResponse<Invitation> {
        self.transition(id, InvitationStatus::Revoked).await.into()
    }

    /// Put an answered invitation back to pending, bypassing the
    /// lifecycle rules. Only for undoing a failed acceptance.
    pub async fn reopen(&self, id: &str) -> ApiResponse<Invitation> {
        let dto = UpdateInvitation {
            status: Some(InvitationStatus::Pending),
            ..Default::default()
        };
        self.invitations.update(id, dto).await
    }

    async fn transition(&self, id: &str, next: InvitationStatus) -> Result<Invitation, ApiError> {
        let invitation = self.invitations.find_by_id(id).await.into_data()?;
        let status = invitation
            .status
            .transition_to(next)
            .map_err(AppError::from)?;

        let dto = UpdateInvitation {
            status: Some(status),
            ..Default::default()
        };
        self.invitations.update(id, dto).await.into_data()
    }
}
