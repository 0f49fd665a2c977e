//! Every domain repository, wired against one backend.

use std::sync::Arc;

use crate::backend::{Backend, RepositoryFactory};

use super::{
    HouseholdRepository, InvitationRepository, MemberRepository, ShoppingRepository,
    TemplateRepository, TripRepository, WishlistRepository,
};

/// Repository container handed to services and the CLI.
#[derive(Clone)]
pub struct Repositories {
    pub households: Arc<HouseholdRepository>,
    pub members: Arc<MemberRepository>,
    pub invitations: Arc<InvitationRepository>,
    pub shopping: Arc<ShoppingRepository>,
    pub wishlists: Arc<WishlistRepository>,
    pub trips: Arc<TripRepository>,
    pub templates: Arc<TemplateRepository>,
}

impl Repositories {
    pub fn new(backend: Backend) -> Self {
        Self::from_factory(&RepositoryFactory::new(backend))
    }

    pub fn from_factory(factory: &RepositoryFactory) -> Self {
        let members = factory.crud();

        Self {
            households: Arc::new(HouseholdRepository::new(
                factory.owned_crud("created_by"),
                members.clone(),
            )),
            members: Arc::new(MemberRepository::new(members)),
            invitations: Arc::new(InvitationRepository::new(factory.owned_crud("invited_by"))),
            shopping: Arc::new(ShoppingRepository::new(factory.crud(), factory.crud())),
            wishlists: Arc::new(WishlistRepository::new(factory.crud(), factory.crud())),
            trips: Arc::new(TripRepository::new(
                factory.crud(),
                factory.crud(),
                factory.crud(),
                factory.crud(),
                factory.crud(),
            )),
            templates: Arc::new(TemplateRepository::new(factory.crud())),
        }
    }
}
