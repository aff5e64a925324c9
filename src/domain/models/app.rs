//! App domain models

use super::Balance;
use serde::{Deserialize, Serialize};

/// Staked application state observed at one height
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub address: String,
    pub height: u64,
    pub public_key: String,
    pub jailed: bool,
    pub status: i32,
    pub chains: Vec<String>,
    pub staked_tokens: Balance,
    pub max_relays: Balance,
}
