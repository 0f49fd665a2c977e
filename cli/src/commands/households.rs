//! Households command - list and create households.

use common::{AppResult, BackendConfig};
use domain::CreateHousehold;
use family_service::{HouseholdManager, HouseholdService, MemberProfile, Repositories};

use crate::args::{HouseholdsAction, HouseholdsArgs};

pub async fn execute(args: HouseholdsArgs, config: &BackendConfig) -> AppResult<()> {
    let repos = super::repositories(config)?;
    run(args.action, &repos).await
}

async fn run(action: HouseholdsAction, repos: &Repositories) -> AppResult<()> {
    match action {
        HouseholdsAction::List { user } => {
            let households = match user {
                Some(user) => repos.households.find_for_user(&user).await,
                None => repos.households.find_active().await,
            }
            .into_data()?;
            super::print_json(&households)?;
        }
        HouseholdsAction::Create {
            name,
            owner,
            display_name,
        } => {
            tracing::info!(%name, %owner, "Creating household");
            let service = HouseholdManager::new(repos.households.clone(), repos.members.clone());
            let profile = MemberProfile::new(
                owner.clone(),
                display_name.unwrap_or_else(|| owner.clone()),
            );
            let created = service
                .create_household(CreateHousehold::new(name), profile)
                .await
                .into_data()?;
            super::print_json(&created)?;
        }
    }
    Ok(())
}
