//! Wishlists and reservable wishlist items.

use common::{ApiError, ApiResponse, AppError};
use domain::{
    CreateWishlist, CreateWishlistItem, UpdateWishlist, UpdateWishlistItem, Wishlist,
    WishlistItem,
};
use repository::{Direction, Query};

use super::{validated, WishlistItemTable, WishlistTable};

pub struct WishlistRepository {
    wishlists: WishlistTable,
    items: WishlistItemTable,
}

impl WishlistRepository {
    pub fn new(wishlists: WishlistTable, items: WishlistItemTable) -> Self {
        Self { wishlists, items }
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResponse<Wishlist> {
        self.wishlists.find_by_id(id).await
    }

    pub async fn for_household(&self, household_id: &str) -> ApiResponse<Vec<Wishlist>> {
        let query = Query::new()
            .eq("household_id", household_id)
            .order_by("created_at", Direction::Asc);
        self.wishlists.find_all(Some(query)).await
    }

    pub async fn for_member(&self, member_id: &str) -> ApiResponse<Vec<Wishlist>> {
        let query = Query::new()
            .eq("member_id", member_id)
            .order_by("created_at", Direction::Asc);
        self.wishlists.find_all(Some(query)).await
    }

    pub async fn create(&self, dto: CreateWishlist) -> ApiResponse<Wishlist> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.wishlists.create(dto).await
    }

    pub async fn update(&self, id: &str, dto: UpdateWishlist) -> ApiResponse<Wishlist> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.wishlists.update(id, dto).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<()> {
        self.wishlists.delete(id).await
    }

    /// Items by priority (unset last), then insertion order.
    pub async fn items(&self, wishlist_id: &str) -> ApiResponse<Vec<WishlistItem>> {
        let query = Query::new()
            .eq("wishlist_id", wishlist_id)
            .order_by("priority", Direction::Asc)
            .order_by("created_at", Direction::Asc);
        self.items.find_all(Some(query)).await
    }

    pub async fn add_item(&self, dto: CreateWishlistItem) -> ApiResponse<WishlistItem> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.items.create(dto).await
    }

    pub async fn update_item(&self, id: &str, dto: UpdateWishlistItem) -> ApiResponse<WishlistItem> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.items.update(id, dto).await
    }

    pub async fn delete_item(&self, id: &str) -> ApiResponse<()> {
        self.items.delete(id).await
    }

    /// Reserve an item for `by_member`. Re-reserving by the same member
    /// is a no-op; an item held by someone else is a conflict.
    pub async fn reserve(&self, item_id: &str, by_member: &str) -> ApiResponse<WishlistItem> {
        self.try_reserve(item_id, by_member).await.into()
    }

    async fn try_reserve(&self, item_id: &str, by_member: &str) -> Result<WishlistItem, ApiError> {
        let item = self.items.find_by_id(item_id).await.into_data()?;
        match item.reserved_by.as_deref() {
            Some(holder) if holder == by_member => return Ok(item),
            Some(_) => return Err(AppError::conflict("Reservation").into()),
            None => {}
        }

        let dto = UpdateWishlistItem {
            reserved_by: Some(Some(by_member.to_string())),
            ..Default::default()
        };
        self.items.update(item_id, dto).await.into_data()
    }

    pub async fn release(&self, item_id: &str) -> ApiResponse<WishlistItem> {
        let dto = UpdateWishlistItem {
            reserved_by: Some(None),
            ..Default::default()
        };
        self.items.update(item_id, dto).await
    }
}
