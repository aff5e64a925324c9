//! Row to entity mapping

use crate::core::{IndexerResult, StorageError};
use crate::domain::models::{Account, AccountType, App, Balance};
use sqlx::postgres::PgRow;
use sqlx::Row;

fn malformed(column: &'static str, reason: impl ToString) -> StorageError {
    StorageError::MalformedRow { column, reason: reason.to_string() }
}

fn height(row: &PgRow) -> IndexerResult<u64> {
    let raw: i64 = row.try_get("height")?;
    Ok(u64::try_from(raw).map_err(|e| malformed("height", e))?)
}

fn balance(row: &PgRow, column: &'static str) -> IndexerResult<Balance> {
    let raw: String = row.try_get(column)?;
    Ok(raw.parse().map_err(|e| malformed(column, e))?)
}

pub(crate) fn account(row: &PgRow) -> IndexerResult<Account> {
    let account_type: String = row.try_get("account_type")?;

    Ok(Account {
        address: row.try_get("address")?,
        height: height(row)?,
        account_type: account_type
            .parse::<AccountType>()
            .map_err(|e| malformed("account_type", e))?,
        balance: balance(row, "balance")?,
        balance_denomination: row.try_get("balance_denomination")?,
    })
}

pub(crate) fn app(row: &PgRow) -> IndexerResult<App> {
    Ok(App {
        address: row.try_get("address")?,
        height: height(row)?,
        public_key: row.try_get("public_key")?,
        jailed: row.try_get("jailed")?,
        status: row.try_get("status")?,
        chains: row.try_get::<Option<Vec<String>>, _>("chains")?.unwrap_or_default(),
        staked_tokens: balance(row, "staked_tokens")?,
        max_relays: balance(row, "max_relays")?,
    })
}
