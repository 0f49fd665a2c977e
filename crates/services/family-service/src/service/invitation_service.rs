//! Invitation service - turning an accepted invitation into a membership.

use std::sync::Arc;

use async_trait::async_trait;

use common::{ApiError, ApiResponse, AppError};
use domain::{CreateMember, HouseholdMember};
use repository::run_with_rollback;

use crate::repository::{InvitationRepository, MemberRepository};
use crate::service::MemberProfile;

#[async_trait]
pub trait InvitationService: Send + Sync {
    /// Accept an invitation and join its household with the invited role.
    ///
    /// The invitation is marked accepted first; if the membership cannot
    /// be created it is reopened and the membership error returned.
    async fn accept(&self, invitation_id: &str, profile: MemberProfile)
        -> ApiResponse<HouseholdMember>;
}

pub struct InvitationManager {
    invitations: Arc<InvitationRepository>,
    members: Arc<MemberRepository>,
}

impl InvitationManager {
    pub fn new(invitations: Arc<InvitationRepository>, members: Arc<MemberRepository>) -> Self {
        Self {
            invitations,
            members,
        }
    }

    async fn try_accept(
        &self,
        invitation_id: &str,
        profile: MemberProfile,
    ) -> Result<HouseholdMember, ApiError> {
        let invitation = self.invitations.find_by_id(invitation_id).await.into_data()?;
        let existing = self
            .members
            .role_of(&invitation.household_id, &profile.user_id)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("Membership").into());
        }

        let accepted = self.invitations.respond(invitation_id, true).await.into_data()?;

        let members = &self.members;
        let invitations = &self.invitations;
        run_with_rollback(
            &accepted,
            |invitation| {
                let dto = CreateMember::new(
                    invitation.household_id.clone(),
                    profile.display_name,
                    invitation.role,
                )
                .with_user(profile.user_id);
                async move { members.add(dto).await.into_data() }
            },
            |invitation| {
                let id = invitation.id.clone();
                async move { invitations.reopen(&id).await.into_result().map(|_| ()) }
            },
        )
        .await
    }
}

#[async_trait]
impl InvitationService for InvitationManager {
    async fn accept(
        &self,
        invitation_id: &str,
        profile: MemberProfile,
    ) -> ApiResponse<HouseholdMember> {
        self.try_accept(invitation_id, profile).await.into()
    }
}
