//! Family Service Library
//!
//! Household, shopping, wishlist and trip repositories on top of the
//! generic CRUD engines, plus the services that compose them.
//! The engine is picked once from [`common::BackendConfig`]: a browser-style
//! key-value store when no remote backend is configured, the Supabase REST
//! backend otherwise.

pub mod backend;
pub mod repository;
pub mod service;

pub use backend::{Backend, RepositoryFactory};
pub use repository::Repositories;
pub use service::{
    CreatedHousehold, HouseholdManager, HouseholdService, InvitationManager, InvitationService,
    MemberProfile, PlannedTrip, TripManager, TripService,
};
