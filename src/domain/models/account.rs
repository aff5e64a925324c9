//! Account domain models

use super::Balance;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of actor that owns an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Node,
    App,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Node => "node",
            AccountType::App => "app",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(AccountType::Node),
            "app" => Ok(AccountType::App),
            other => Err(format!("unknown account type {other:?}")),
        }
    }
}

/// Account state observed at one height
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    pub height: u64,
    pub account_type: AccountType,
    /// Tokens held by a node, or the amount staked by an app
    pub balance: Balance,
    pub balance_denomination: String,
}
