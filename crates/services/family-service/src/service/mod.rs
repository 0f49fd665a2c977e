//! Service layer for multi-step household use cases.

mod household_service;
mod invitation_service;
mod trip_service;

pub use household_service::{
    CreatedHousehold, HouseholdManager, HouseholdService, MemberProfile,
};
pub use invitation_service::{InvitationManager, InvitationService};
pub use trip_service::{PlannedTrip, TripManager, TripService};
