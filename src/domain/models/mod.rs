//! Domain models for indexed chain state

pub mod account;
pub mod address;
pub mod app;
pub mod balance;
pub mod provider;

pub use account::{Account, AccountType};
pub use address::{validate_address, ADDRESS_LENGTH};
pub use app::App;
pub use balance::{Balance, BalanceError};
pub use provider::{ProviderAccount, ProviderApp};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity sets the indexer synchronizes per height
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Accounts,
    Apps,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Accounts => write!(f, "accounts"),
            EntityKind::Apps => write!(f, "apps"),
        }
    }
}
