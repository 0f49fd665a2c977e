//! End-to-end flows over the offline backend.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use common::{ApiError, BackendConfig};
use domain::{
    CreateBudgetEntry, CreateHousehold, CreateMember, CreatePackingTemplate, CreateShoppingItem,
    CreateShoppingList, CreateTrip, CreateWishlist, CreateWishlistItem, InvitationStatus,
    MemberRole, TemplateItem, UpdateTrip,
};
use family_service::{
    Backend, HouseholdManager, HouseholdService, InvitationManager, InvitationService,
    MemberProfile, Repositories, TripManager, TripService,
};
use repository::table_key;
use storage::{MemoryStorage, StorageAdapter, StorageError, StorageResult};

/// Memory storage whose writes to some keys always fail.
struct FailingWrites {
    inner: MemoryStorage,
    blocked: HashSet<String>,
}

impl FailingWrites {
    fn blocking(tables: &[&str]) -> Self {
        Self {
            inner: MemoryStorage::new(),
            blocked: tables.iter().map(|table| table_key(table)).collect(),
        }
    }
}

#[async_trait]
impl StorageAdapter for FailingWrites {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        if self.blocked.contains(key) {
            return Err(StorageError::unavailable(format!("{key} is read-only")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key).await
    }

    async fn clear(&self) -> StorageResult<()> {
        self.inner.clear().await
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        self.inner.keys().await
    }
}

fn offline() -> Repositories {
    Repositories::new(Backend::Mock(Arc::new(MemoryStorage::new())))
}

fn offline_with(storage: FailingWrites) -> Repositories {
    Repositories::new(Backend::Mock(Arc::new(storage)))
}

fn households(repos: &Repositories) -> HouseholdManager {
    HouseholdManager::new(repos.households.clone(), repos.members.clone())
}

fn alice() -> MemberProfile {
    MemberProfile::new("user-alice", "Alice")
}

fn error_code(error: &ApiError) -> Option<&str> {
    error.code.as_deref()
}

#[tokio::test]
async fn test_create_household_adds_owner_membership() {
    let repos = offline();
    let service = households(&repos);

    let created = service
        .create_household(CreateHousehold::new("Home"), alice())
        .await
        .into_data()
        .unwrap();

    assert_eq!(created.household.created_by.as_deref(), Some("user-alice"));
    assert_eq!(created.owner.household_id, created.household.id);
    assert_eq!(created.owner.role, MemberRole::Owner);

    let mine = service.households_for_user("user-alice").await.into_data().unwrap();
    assert_eq!(mine, vec![created.household]);
}

#[tokio::test]
async fn test_failed_owner_membership_deletes_household() {
    let repos = offline_with(FailingWrites::blocking(&["household_members"]));
    let service = households(&repos);

    let response = service
        .create_household(CreateHousehold::new("Home"), alice())
        .await;

    let error = response.into_data().unwrap_err();
    assert_eq!(error_code(&error), Some("STORAGE_ERROR"));
    assert!(repos.households.find_active().await.into_data().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_household_writes_nothing() {
    let repos = offline();
    let service = households(&repos);

    let error = service
        .create_household(CreateHousehold::new(""), alice())
        .await
        .into_data()
        .unwrap_err();

    assert_eq!(error_code(&error), Some("VALIDATION_ERROR"));
    assert!(repos.households.find_active().await.into_data().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_member_requires_manager_role() {
    let repos = offline();
    let service = households(&repos);
    let household = service
        .create_household(CreateHousehold::new("Home"), alice())
        .await
        .into_data()
        .unwrap()
        .household;

    let bob = CreateMember::new(&household.id, "Bob", MemberRole::Member).with_user("user-bob");
    let added = service.add_member("user-alice", bob.clone()).await.into_data().unwrap();
    assert_eq!(added.role, MemberRole::Member);

    let carol = CreateMember::new(&household.id, "Carol", MemberRole::Member);
    let error = service.add_member("user-bob", carol).await.into_data().unwrap_err();
    assert_eq!(error_code(&error), Some("FORBIDDEN"));

    let error = service.add_member("user-alice", bob).await.into_data().unwrap_err();
    assert_eq!(error_code(&error), Some("CONFLICT"));

    let second_owner = CreateMember::new(&household.id, "Dan", MemberRole::Owner);
    let error = service
        .add_member("user-alice", second_owner)
        .await
        .into_data()
        .unwrap_err();
    assert_eq!(error_code(&error), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_find_for_user_skips_inactive_households() {
    let repos = offline();
    let service = households(&repos);

    let first = service
        .create_household(CreateHousehold::new("Home"), alice())
        .await
        .into_data()
        .unwrap()
        .household;
    let second = service
        .create_household(CreateHousehold::new("Cabin"), alice())
        .await
        .into_data()
        .unwrap()
        .household;
    service
        .create_household(CreateHousehold::new("Elsewhere"), MemberProfile::new("user-bob", "Bob"))
        .await
        .into_data()
        .unwrap();

    repos.households.deactivate(&second.id).await.into_data().unwrap();

    let mine = repos.households.find_for_user("user-alice").await.into_data().unwrap();
    assert_eq!(mine, vec![first]);
    assert!(repos
        .households
        .find_for_user("user-nobody")
        .await
        .into_data()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_accept_invitation_joins_with_invited_role() {
    let repos = offline();
    let household = households(&repos)
        .create_household(CreateHousehold::new("Home"), alice())
        .await
        .into_data()
        .unwrap()
        .household;

    let invitation = repos
        .invitations
        .invite_by_email(&household.id, "Bob@Example.com", MemberRole::Admin, None)
        .await
        .into_data()
        .unwrap();
    assert_eq!(invitation.email, "bob@example.com");

    let service = InvitationManager::new(repos.invitations.clone(), repos.members.clone());
    let member = service
        .accept(&invitation.id, MemberProfile::new("user-bob", "Bob"))
        .await
        .into_data()
        .unwrap();

    assert_eq!(member.role, MemberRole::Admin);
    assert_eq!(member.user_id.as_deref(), Some("user-bob"));
    let stored = repos.invitations.find_by_id(&invitation.id).await.into_data().unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);

    let error = service
        .accept(&invitation.id, MemberProfile::new("user-bob", "Bob"))
        .await
        .into_data()
        .unwrap_err();
    assert_eq!(error_code(&error), Some("CONFLICT"));
}

#[tokio::test]
async fn test_failed_acceptance_reopens_invitation() {
    let storage = FailingWrites::blocking(&["household_members"]);
    let repos = offline_with(storage);

    let invitation = repos
        .invitations
        .invite_by_email("household-1", "bob@example.com", MemberRole::Member, None)
        .await
        .into_data()
        .unwrap();

    let service = InvitationManager::new(repos.invitations.clone(), repos.members.clone());
    let error = service
        .accept(&invitation.id, MemberProfile::new("user-bob", "Bob"))
        .await
        .into_data()
        .unwrap_err();

    assert_eq!(error_code(&error), Some("STORAGE_ERROR"));
    let stored = repos.invitations.find_by_id(&invitation.id).await.into_data().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn test_second_pending_invitation_conflicts() {
    let repos = offline();
    repos
        .invitations
        .invite_by_email("household-1", "bob@example.com", MemberRole::Member, None)
        .await
        .into_data()
        .unwrap();

    let error = repos
        .invitations
        .invite_by_email("household-1", "BOB@example.com", MemberRole::Member, None)
        .await
        .into_data()
        .unwrap_err();
    assert_eq!(error_code(&error), Some("CONFLICT"));

    let pending = repos
        .invitations
        .find_pending_for_email("bob@example.com")
        .await
        .into_data()
        .unwrap();
    assert_eq!(pending.len(), 1);
}

fn weekend_trip(household_id: &str) -> CreateTrip {
    CreateTrip {
        household_id: household_id.to_string(),
        name: "Lake weekend".to_string(),
        destination: Some("Lake".to_string()),
        start_date: NaiveDate::from_ymd_opt(2026, 7, 3),
        end_date: NaiveDate::from_ymd_opt(2026, 7, 5),
    }
}

fn template_item(name: &str, quantity: u32) -> TemplateItem {
    TemplateItem {
        name: name.to_string(),
        quantity,
        category: None,
    }
}

#[tokio::test]
async fn test_trip_from_template_copies_items_in_order() {
    let repos = offline();
    let template = repos
        .templates
        .create(CreatePackingTemplate {
            household_id: None,
            name: "Camping".to_string(),
            items: vec![template_item("Tent", 1), template_item("Socks", 4)],
        })
        .await
        .into_data()
        .unwrap();

    let service = TripManager::new(repos.trips.clone(), repos.templates.clone());
    let planned = service
        .create_trip_from_template(weekend_trip("household-1"), &template.id)
        .await
        .into_data()
        .unwrap();

    let names: Vec<_> = planned.packing_items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Tent", "Socks"]);
    assert!(planned.packing_items.iter().all(|i| i.trip_id == planned.trip.id));
    assert_eq!(planned.packing_items[1].quantity, 4);
}

#[tokio::test]
async fn test_unknown_template_creates_no_trip() {
    let repos = offline();
    let service = TripManager::new(repos.trips.clone(), repos.templates.clone());

    let error = service
        .create_trip_from_template(weekend_trip("household-1"), "missing")
        .await
        .into_data()
        .unwrap_err();

    assert_eq!(error_code(&error), Some("NOT_FOUND"));
    assert!(repos.trips.for_household("household-1").await.into_data().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_packing_copy_deletes_trip() {
    let repos = offline_with(FailingWrites::blocking(&["packing_items"]));
    let template = repos
        .templates
        .create(CreatePackingTemplate {
            household_id: Some("household-1".to_string()),
            name: "Beach".to_string(),
            items: vec![template_item("Towel", 2)],
        })
        .await
        .into_data()
        .unwrap();

    let service = TripManager::new(repos.trips.clone(), repos.templates.clone());
    let error = service
        .create_trip_from_template(weekend_trip("household-1"), &template.id)
        .await
        .into_data()
        .unwrap_err();

    assert_eq!(error_code(&error), Some("STORAGE_ERROR"));
    assert!(repos.trips.for_household("household-1").await.into_data().unwrap().is_empty());
}

#[tokio::test]
async fn test_templates_for_household_lists_own_before_global() {
    let repos = offline();
    for (household_id, name) in [
        (None, "Global"),
        (Some("household-1"), "Ski"),
        (Some("household-2"), "Other"),
        (Some("household-1"), "Beach"),
    ] {
        repos
            .templates
            .create(CreatePackingTemplate {
                household_id: household_id.map(str::to_string),
                name: name.to_string(),
                items: Vec::new(),
            })
            .await
            .into_data()
            .unwrap();
    }

    let templates = repos.templates.for_household("household-1").await.into_data().unwrap();
    let names: Vec<_> = templates.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Beach", "Ski", "Global"]);
}

#[tokio::test]
async fn test_budget_total_sums_per_currency() {
    let repos = offline();
    let trip = repos.trips.create(weekend_trip("household-1")).await.into_data().unwrap();

    for (label, amount_cents, currency) in [
        ("Fuel", 4_500, "EUR"),
        ("Cabin", 20_000, "EUR"),
        ("Ferry", 3_000, "NOK"),
    ] {
        repos
            .trips
            .add_budget_entry(CreateBudgetEntry {
                trip_id: trip.id.clone(),
                label: label.to_string(),
                amount_cents,
                currency: currency.to_string(),
                category: None,
                paid_by: None,
            })
            .await
            .into_data()
            .unwrap();
    }

    let totals = repos.trips.budget_total(&trip.id).await.into_data().unwrap();
    assert_eq!(totals.get("EUR"), Some(&24_500));
    assert_eq!(totals.get("NOK"), Some(&3_000));
}

#[tokio::test]
async fn test_budget_total_overflow_is_an_error() {
    let repos = offline();
    let trip = repos.trips.create(weekend_trip("household-1")).await.into_data().unwrap();

    for label in ["Yacht", "Second yacht"] {
        repos
            .trips
            .add_budget_entry(CreateBudgetEntry {
                trip_id: trip.id.clone(),
                label: label.to_string(),
                amount_cents: i64::MAX / 2 + 1,
                currency: "EUR".to_string(),
                category: None,
                paid_by: None,
            })
            .await
            .into_data()
            .unwrap();
    }

    let error = repos.trips.budget_total(&trip.id).await.into_data().unwrap_err();
    assert_eq!(error_code(&error), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_trip_update_rejects_reversed_dates() {
    let repos = offline();
    let trip = repos.trips.create(weekend_trip("household-1")).await.into_data().unwrap();

    let patch = UpdateTrip {
        start_date: NaiveDate::from_ymd_opt(2026, 7, 9),
        end_date: NaiveDate::from_ymd_opt(2026, 7, 2),
        ..Default::default()
    };
    let error = repos.trips.update(&trip.id, patch).await.into_data().unwrap_err();
    assert_eq!(error_code(&error), Some("VALIDATION_ERROR"));

    let stored = repos.trips.find_by_id(&trip.id).await.into_data().unwrap();
    assert_eq!(stored.end_date, NaiveDate::from_ymd_opt(2026, 7, 5));
}

#[tokio::test]
async fn test_clear_purchased_keeps_open_items() {
    let repos = offline();
    let list = repos
        .shopping
        .create_list(CreateShoppingList::new("household-1", "Groceries"))
        .await
        .into_data()
        .unwrap();

    let milk = repos
        .shopping
        .add_item(CreateShoppingItem::new(&list.id, "Milk"))
        .await
        .into_data()
        .unwrap();
    let bread = repos
        .shopping
        .add_item(CreateShoppingItem::new(&list.id, "Bread"))
        .await
        .into_data()
        .unwrap();
    repos
        .shopping
        .set_purchased(&milk.id, true, Some("member-1".to_string()))
        .await
        .into_data()
        .unwrap();

    let removed = repos.shopping.clear_purchased(&list.id).await.into_data().unwrap();
    assert_eq!(removed, 1);

    let remaining = repos.shopping.items_for_list(&list.id).await.into_data().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, bread.id);
}

#[tokio::test]
async fn test_reserving_a_held_wishlist_item_conflicts() {
    let repos = offline();
    let wishlist = repos
        .wishlists
        .create(CreateWishlist {
            household_id: "household-1".to_string(),
            member_id: Some("member-kid".to_string()),
            title: "Birthday".to_string(),
            is_public: true,
        })
        .await
        .into_data()
        .unwrap();
    let item = repos
        .wishlists
        .add_item(CreateWishlistItem {
            wishlist_id: wishlist.id.clone(),
            name: "Bike".to_string(),
            url: None,
            price_cents: Some(19_900),
            priority: Some(1),
        })
        .await
        .into_data()
        .unwrap();

    let reserved = repos.wishlists.reserve(&item.id, "member-mum").await.into_data().unwrap();
    assert_eq!(reserved.reserved_by.as_deref(), Some("member-mum"));

    let again = repos.wishlists.reserve(&item.id, "member-mum").await.into_data().unwrap();
    assert_eq!(again, reserved);

    let error = repos
        .wishlists
        .reserve(&item.id, "member-dad")
        .await
        .into_data()
        .unwrap_err();
    assert_eq!(error_code(&error), Some("CONFLICT"));

    let released = repos.wishlists.release(&item.id).await.into_data().unwrap();
    assert_eq!(released.reserved_by, None);
}

#[tokio::test]
async fn test_offline_households_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = BackendConfig::default();
    config.storage.path = dir.path().join("storage.json");

    let created = {
        let repos = Repositories::new(Backend::from_config(&config).unwrap());
        households(&repos)
            .create_household(CreateHousehold::new("Home"), alice())
            .await
            .into_data()
            .unwrap()
    };

    let repos = Repositories::new(Backend::from_config(&config).unwrap());
    let members = repos
        .members
        .find_by_household(&created.household.id)
        .await
        .into_data()
        .unwrap();
    assert_eq!(members, vec![created.owner]);
}
