//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Hearth - shared shopping lists, wishlists and trips for a household
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which repository backend would be used and why
    Backend,

    /// Inspect the offline key/value store
    Storage(StorageArgs),

    /// Manage households
    Households(HouseholdsArgs),

    /// Manage shopping lists
    Shopping(ShoppingArgs),
}

#[derive(Parser, Debug)]
pub struct StorageArgs {
    #[command(subcommand)]
    pub action: StorageAction,
}

#[derive(Subcommand, Debug)]
pub enum StorageAction {
    /// List stored keys
    Keys,
    /// Print the value stored under a key
    Get {
        /// Key without the namespace prefix (e.g. "table:households")
        key: String,
    },
    /// Remove every key in the namespace
    Clear,
}

#[derive(Parser, Debug)]
pub struct HouseholdsArgs {
    #[command(subcommand)]
    pub action: HouseholdsAction,
}

#[derive(Subcommand, Debug)]
pub enum HouseholdsAction {
    /// List active households
    List {
        /// Only households this user belongs to
        #[arg(long)]
        user: Option<String>,
    },
    /// Create a household owned by a user
    Create {
        #[arg(long)]
        name: String,
        /// User id of the owner
        #[arg(long)]
        owner: String,
        /// Display name of the owner, defaults to the user id
        #[arg(long)]
        display_name: Option<String>,
    },
}

#[derive(Parser, Debug)]
pub struct ShoppingArgs {
    #[command(subcommand)]
    pub action: ShoppingAction,
}

#[derive(Subcommand, Debug)]
pub enum ShoppingAction {
    /// List a household's shopping lists
    Lists {
        household: String,
        /// Include archived lists
        #[arg(long)]
        all: bool,
    },
    /// Create a shopping list
    AddList { household: String, name: String },
}
