//! Domain layer - Household logistics entities and value objects.
//!
//! This crate contains pure domain types with no storage dependencies.
//! Every entity implements [`Entity`] so the generic repository engines
//! can persist it against either backend.

pub mod constants;
pub mod entity;
pub mod error;
pub mod household;
pub mod shopping;
pub mod template;
pub mod trip;
pub mod wishlist;

pub use constants::*;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use household::{
    CreateHousehold, CreateInvitation, CreateMember, Household, HouseholdMember, Invitation,
    InvitationStatus, MemberRole, UpdateHousehold, UpdateInvitation, UpdateMember,
};
pub use shopping::{
    CreateShoppingItem, CreateShoppingList, ShoppingItem, ShoppingList, UpdateShoppingItem,
    UpdateShoppingList,
};
pub use template::{CreatePackingTemplate, PackingTemplate, TemplateItem, UpdatePackingTemplate};
pub use trip::{
    BudgetEntry, CreateBudgetEntry, CreatePackingItem, CreateTimelineEvent, CreateTrip,
    CreateTripDocument, PackingItem, TimelineEvent, Trip, TripDocument, UpdateBudgetEntry,
    UpdatePackingItem, UpdateTimelineEvent, UpdateTrip, UpdateTripDocument,
};
pub use wishlist::{
    CreateWishlist, CreateWishlistItem, UpdateWishlist, UpdateWishlistItem, Wishlist,
    WishlistItem,
};
