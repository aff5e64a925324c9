//! Statement builders
//!
//! Every caller-supplied value goes through `push_bind`; only table and
//! column names are spliced into the SQL text.

use crate::core::ReadListOptions;
use sqlx::{Postgres, QueryBuilder};

/// Table layout for one indexed entity
#[derive(Debug, Clone, Copy)]
pub(crate) struct Table {
    pub name: &'static str,
    /// Columns read back, `id` first.
    pub columns: &'static str,
    /// Columns written on insert, in bind order.
    pub insert_columns: &'static str,
}

pub(crate) const ACCOUNTS: Table = Table {
    name: "accounts",
    columns: "id, address, height, account_type, balance, balance_denomination",
    insert_columns: "address, height, account_type, balance, balance_denomination",
};

pub(crate) const APPS: Table = Table {
    name: "apps",
    columns: "id, address, height, public_key, jailed, status, chains, staked_tokens, max_relays",
    insert_columns: "address, height, public_key, jailed, status, chains, staked_tokens, max_relays",
};

/// Rows per multi-row INSERT; keeps bind counts well under the 65535 limit.
pub(crate) const INSERT_CHUNK_ROWS: usize = 1000;

pub(crate) fn insert<'args>(table: &Table) -> QueryBuilder<'args, Postgres> {
    QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        table.name, table.insert_columns
    ))
}

/// Latest row for an address, or the row at a pinned height.
pub(crate) fn select_by_address<'args>(
    table: &Table,
    address: &'args str,
    height: Option<i64>,
) -> QueryBuilder<'args, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM {} WHERE address = ",
        table.columns, table.name
    ));
    builder.push_bind(address);

    if let Some(height) = height {
        builder.push(" AND height = ").push_bind(height);
    }

    builder.push(" ORDER BY height DESC, id ASC LIMIT 1");
    builder
}

/// One page of rows, newest height first, insertion order within a height.
pub(crate) fn select_page<'args>(
    table: &Table,
    height: Option<i64>,
    options: &ReadListOptions,
) -> QueryBuilder<'args, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM {}", table.columns, table.name));
    push_height_filter(&mut builder, height);

    builder
        .push(" ORDER BY height DESC, id ASC LIMIT ")
        .push_bind(i64::from(options.per_page()))
        .push(" OFFSET ")
        .push_bind(options.offset());
    builder
}

pub(crate) fn count<'args>(table: &Table, height: Option<i64>) -> QueryBuilder<'args, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", table.name));
    push_height_filter(&mut builder, height);
    builder
}

pub(crate) fn max_height() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!(
        "SELECT GREATEST((SELECT MAX(height) FROM {}), (SELECT MAX(height) FROM {}))",
        ACCOUNTS.name, APPS.name
    ))
}

fn push_height_filter(builder: &mut QueryBuilder<'_, Postgres>, height: Option<i64>) {
    if let Some(height) = height {
        builder.push(" WHERE height = ").push_bind(height);
    }
}
