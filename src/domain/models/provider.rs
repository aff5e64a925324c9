//! Records as handed over by the entity provider, before validation

use super::AccountType;
use serde::{Deserialize, Serialize};

/// App as reported by the chain RPC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderApp {
    pub address: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub jailed: bool,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub chains: Vec<String>,
    pub staked_tokens: String,
    #[serde(default)]
    pub max_relays: String,
}

/// Account balance as reported by the chain RPC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderAccount {
    pub address: String,
    pub account_type: AccountType,
    /// Node tokens for `Node`, staked tokens for `App`
    pub balance: String,
    pub denomination: String,
}
