//! Domain-level constants.
//!
//! Table names, role values and field defaults.

// =============================================================================
// Tables
// =============================================================================

pub const TABLE_HOUSEHOLDS: &str = "households";
pub const TABLE_HOUSEHOLD_MEMBERS: &str = "household_members";
pub const TABLE_INVITATIONS: &str = "invitations";
pub const TABLE_SHOPPING_LISTS: &str = "shopping_lists";
pub const TABLE_SHOPPING_ITEMS: &str = "shopping_items";
pub const TABLE_WISHLISTS: &str = "wishlists";
pub const TABLE_WISHLIST_ITEMS: &str = "wishlist_items";
pub const TABLE_TRIPS: &str = "trips";
pub const TABLE_PACKING_ITEMS: &str = "packing_items";
pub const TABLE_BUDGET_ENTRIES: &str = "budget_entries";
pub const TABLE_TIMELINE_EVENTS: &str = "timeline_events";
pub const TABLE_TRIP_DOCUMENTS: &str = "trip_documents";
pub const TABLE_PACKING_TEMPLATES: &str = "packing_templates";

// =============================================================================
// Member Roles
// =============================================================================

/// Creator of the household, cannot be removed
pub const ROLE_OWNER: &str = "owner";

/// Can manage members and invitations
pub const ROLE_ADMIN: &str = "admin";

/// Default role for invited members
pub const ROLE_MEMBER: &str = "member";

// =============================================================================
// Defaults
// =============================================================================

/// Default currency for budget entries
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Default quantity for shopping and packing items
pub const DEFAULT_QUANTITY: u32 = 1;
