//! Domain repositories layered on the generic CRUD engines.

mod factory;
mod household;
mod invitation;
mod member;
mod shopping;
mod template;
mod trip;
mod wishlist;

use std::sync::Arc;

use validator::Validate;

use common::{ApiError, AppError};
use domain::*;
use repository::CrudRepository;

pub use factory::Repositories;
pub use household::HouseholdRepository;
pub use invitation::InvitationRepository;
pub use member::MemberRepository;
pub use shopping::ShoppingRepository;
pub use template::TemplateRepository;
pub use trip::{BudgetTotals, TripRepository};
pub use wishlist::WishlistRepository;

pub type HouseholdTable = Arc<dyn CrudRepository<Household, CreateHousehold, UpdateHousehold>>;
pub type MemberTable = Arc<dyn CrudRepository<HouseholdMember, CreateMember, UpdateMember>>;
pub type InvitationTable = Arc<dyn CrudRepository<Invitation, CreateInvitation, UpdateInvitation>>;
pub type ShoppingListTable =
    Arc<dyn CrudRepository<ShoppingList, CreateShoppingList, UpdateShoppingList>>;
pub type ShoppingItemTable =
    Arc<dyn CrudRepository<ShoppingItem, CreateShoppingItem, UpdateShoppingItem>>;
pub type WishlistTable = Arc<dyn CrudRepository<Wishlist, CreateWishlist, UpdateWishlist>>;
pub type WishlistItemTable =
    Arc<dyn CrudRepository<WishlistItem, CreateWishlistItem, UpdateWishlistItem>>;
pub type TripTable = Arc<dyn CrudRepository<Trip, CreateTrip, UpdateTrip>>;
pub type PackingItemTable =
    Arc<dyn CrudRepository<PackingItem, CreatePackingItem, UpdatePackingItem>>;
pub type BudgetTable = Arc<dyn CrudRepository<BudgetEntry, CreateBudgetEntry, UpdateBudgetEntry>>;
pub type TimelineTable =
    Arc<dyn CrudRepository<TimelineEvent, CreateTimelineEvent, UpdateTimelineEvent>>;
pub type DocumentTable =
    Arc<dyn CrudRepository<TripDocument, CreateTripDocument, UpdateTripDocument>>;
pub type TemplateTable =
    Arc<dyn CrudRepository<PackingTemplate, CreatePackingTemplate, UpdatePackingTemplate>>;

/// Check a DTO before it reaches the engine.
pub(crate) fn validated<D: Validate>(dto: &D) -> Result<(), ApiError> {
    dto.validate().map_err(|errors| AppError::from(errors).into())
}
