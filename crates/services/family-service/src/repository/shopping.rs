//! Shopping lists and items.

use common::{ApiError, ApiResponse};
use domain::{
    CreateShoppingItem, CreateShoppingList, ShoppingItem, ShoppingList, UpdateShoppingItem,
    UpdateShoppingList,
};
use repository::{Direction, Query};

use super::{validated, ShoppingItemTable, ShoppingListTable};

pub struct ShoppingRepository {
    lists: ShoppingListTable,
    items: ShoppingItemTable,
}

impl ShoppingRepository {
    pub fn new(lists: ShoppingListTable, items: ShoppingItemTable) -> Self {
        Self { lists, items }
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub async fn find_list(&self, id: &str) -> ApiResponse<ShoppingList> {
        self.lists.find_by_id(id).await
    }

    pub async fn lists_for_household(
        &self,
        household_id: &str,
        include_archived: bool,
    ) -> ApiResponse<Vec<ShoppingList>> {
        let mut query = Query::new().eq("household_id", household_id);
        if !include_archived {
            query = query.eq("is_archived", false);
        }
        let query = query.order_by("created_at", Direction::Asc);
        self.lists.find_all(Some(query)).await
    }

    pub async fn create_list(&self, dto: CreateShoppingList) -> ApiResponse<ShoppingList> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.lists.create(dto).await
    }

    pub async fn update_list(&self, id: &str, dto: UpdateShoppingList) -> ApiResponse<ShoppingList> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.lists.update(id, dto).await
    }

    /// Delete a list together with its items.
    pub async fn delete_list(&self, id: &str) -> ApiResponse<()> {
        match self.try_delete_list(id).await {
            Ok(()) => ApiResponse::empty(),
            Err(error) => ApiResponse::err(error),
        }
    }

    async fn try_delete_list(&self, id: &str) -> Result<(), ApiError> {
        // Fail on an unknown list before touching any item
        self.lists.find_by_id(id).await.into_data()?;

        let items = self
            .items
            .find_all(Some(Query::new().eq("list_id", id)))
            .await
            .into_data()?;
        for item in items {
            self.items.delete(&item.id).await.into_result()?;
        }
        self.lists.delete(id).await.into_result()?;
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Items of a list: open ones first, each group in insertion order.
    pub async fn items_for_list(&self, list_id: &str) -> ApiResponse<Vec<ShoppingItem>> {
        let query = Query::new()
            .eq("list_id", list_id)
            .order_by("is_purchased", Direction::Asc)
            .order_by("created_at", Direction::Asc);
        self.items.find_all(Some(query)).await
    }

    pub async fn add_item(&self, dto: CreateShoppingItem) -> ApiResponse<ShoppingItem> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.items.create(dto).await
    }

    pub async fn update_item(&self, id: &str, dto: UpdateShoppingItem) -> ApiResponse<ShoppingItem> {
        if let Err(error) = validated(&dto) {
            return ApiResponse::err(error);
        }
        self.items.update(id, dto).await
    }

    pub async fn delete_item(&self, id: &str) -> ApiResponse<()> {
        self.items.delete(id).await
    }

    /// Tick an item off (recording who did it) or put it back.
    pub async fn set_purchased(
        &self,
        id: &str,
        purchased: bool,
        by_member: Option<String>,
    ) -> ApiResponse<ShoppingItem> {
        let dto = UpdateShoppingItem {
            is_purchased: Some(purchased),
            purchased_by: Some(if purchased { by_member } else { None }),
            ..Default::default()
        };
        self.items.update(id, dto).await
    }

    /// Remove every purchased item of a list; returns how many went.
    pub async fn clear_purchased(&self, list_id: &str) -> ApiResponse<usize> {
        self.try_clear_purchased(list_id).await.into()
    }

    async fn try_clear_purchased(&self, list_id: &str) -> Result<usize, ApiError> {
        let purchased = self
            .items
            .find_all(Some(
                Query::new().eq("list_id", list_id).eq("is_purchased", true),
            ))
            .await
            .into_data()?;

        let count = purchased.len();
        for item in purchased {
            self.items.delete(&item.id).await.into_result()?;
        }
        Ok(count)
    }
}
