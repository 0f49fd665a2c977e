//! Shopping command - list and create shopping lists.

use common::{AppResult, BackendConfig};
use domain::CreateShoppingList;
use family_service::Repositories;

use crate::args::{ShoppingAction, ShoppingArgs};

pub async fn execute(args: ShoppingArgs, config: &BackendConfig) -> AppResult<()> {
    let repos = super::repositories(config)?;
    run(args.action, &repos).await
}

async fn run(action: ShoppingAction, repos: &Repositories) -> AppResult<()> {
    match action {
        ShoppingAction::Lists { household, all } => {
            let lists = repos
                .shopping
                .lists_for_household(&household, all)
                .await
                .into_data()?;
            super::print_json(&lists)?;
        }
        ShoppingAction::AddList { household, name } => {
            let list = repos
                .shopping
                .create_list(CreateShoppingList::new(household, name))
                .await
                .into_data()?;
            super::print_json(&list)?;
        }
    }
    Ok(())
}
