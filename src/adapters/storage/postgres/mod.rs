//! PostgreSQL adapter
//!
//! Relational implementation of [`StoragePort`]. Writes are plain parameterized
//! inserts (never upserts); list reads and list+count pages run inside a
//! transaction so a page and its total come from the same snapshot.

mod queries;
mod rows;

use crate::config::DatabaseConfig;
use crate::core::{
    CountOptions, IndexerError, IndexerResult, Page, ReadByAddressOptions, ReadListOptions,
    StorageError, StoragePort,
};
use crate::domain::models::{validate_address, Account, App};
use async_trait::async_trait;
use queries::{Table, ACCOUNTS, APPS, INSERT_CHUNK_ROWS};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::{debug, info};

/// PostgreSQL storage driver
#[derive(Clone)]
pub struct PostgresDriver {
    pool: PgPool,
}

impl PostgresDriver {
    /// Wrap an already-open pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> IndexerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.postgres_url)
            .await?;

        info!("PostgreSQL connected successfully");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check
    pub async fn health_check(&self) -> IndexerResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Transaction whose reads all see one snapshot
    async fn begin_snapshot(&self) -> IndexerResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn fetch_latest<T: Send>(
        &self,
        table: &Table,
        address: &str,
        options: ReadByAddressOptions,
        map: fn(&PgRow) -> IndexerResult<T>,
    ) -> IndexerResult<Option<T>> {
        check_address(address)?;
        let height = options.height.map(db_height).transpose()?;

        let row = queries::select_by_address(table, address, height)
            .build()
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map).transpose()
    }

    async fn fetch_list<T: Send>(
        &self,
        table: &Table,
        options: ReadListOptions,
        map: fn(&PgRow) -> IndexerResult<T>,
    ) -> IndexerResult<Vec<T>> {
        let height = options.height.map(db_height).transpose()?;

        let mut tx = self.pool.begin().await?;
        let rows = queries::select_page(table, height, &options)
            .build()
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        rows.iter().map(map).collect()
    }

    async fn fetch_count(&self, table: &Table, options: CountOptions) -> IndexerResult<i64> {
        let height = options.height.map(db_height).transpose()?;

        let total = queries::count(table, height)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn fetch_page<T: Send>(
        &self,
        table: &Table,
        options: ReadListOptions,
        map: fn(&PgRow) -> IndexerResult<T>,
    ) -> IndexerResult<Page<T>> {
        let height = options.height.map(db_height).transpose()?;

        // dropping `tx` on an early return rolls it back
        let mut tx = self.begin_snapshot().await?;
        let rows = queries::select_page(table, height, &options)
            .build()
            .fetch_all(&mut *tx)
            .await?;
        let total = queries::count(table, height)
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        let items = rows.iter().map(map).collect::<IndexerResult<Vec<T>>>()?;
        debug!("Read {} of {} rows from {}", items.len(), total, table.name);

        Ok(Page::new(items, total, &options))
    }
}

fn check_address(address: &str) -> IndexerResult<()> {
    if validate_address(address) {
        Ok(())
    } else {
        Err(IndexerError::InvalidAddress(address.to_string()))
    }
}

fn db_height(height: u64) -> IndexerResult<i64> {
    i64::try_from(height).map_err(|_| {
        StorageError::Backend(format!("height {height} exceeds the BIGINT range")).into()
    })
}

#[async_trait]
impl StoragePort for PostgresDriver {
    async fn write_account(&self, account: &Account) -> IndexerResult<()> {
        check_address(&account.address)?;

        sqlx::query(
            "INSERT into accounts (address, height, account_type, balance, balance_denomination) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&account.address)
        .bind(db_height(account.height)?)
        .bind(account.account_type.as_str())
        .bind(account.balance.to_string())
        .bind(&account.balance_denomination)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn write_accounts(&self, accounts: &[Account]) -> IndexerResult<()> {
        let heights = accounts
            .iter()
            .map(|a| check_address(&a.address).and_then(|()| db_height(a.height)))
            .collect::<IndexerResult<Vec<i64>>>()?;

        let mut tx = self.pool.begin().await?;
        for (chunk, chunk_heights) in accounts
            .chunks(INSERT_CHUNK_ROWS)
            .zip(heights.chunks(INSERT_CHUNK_ROWS))
        {
            let mut builder = queries::insert(&ACCOUNTS);
            builder.push_values(chunk.iter().zip(chunk_heights), |mut row, (account, height)| {
                row.push_bind(account.address.as_str())
                    .push_bind(*height)
                    .push_bind(account.account_type.as_str())
                    .push_bind(account.balance.to_string())
                    .push_bind(account.balance_denomination.as_str());
            });
            builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        debug!("Stored {} accounts", accounts.len());
        Ok(())
    }

    async fn read_account_by_address(
        &self,
        address: &str,
        options: ReadByAddressOptions,
    ) -> IndexerResult<Option<Account>> {
        self.fetch_latest(&ACCOUNTS, address, options, rows::account).await
    }

    async fn read_accounts(&self, options: ReadListOptions) -> IndexerResult<Vec<Account>> {
        self.fetch_list(&ACCOUNTS, options, rows::account).await
    }

    async fn count_accounts(&self, options: CountOptions) -> IndexerResult<i64> {
        self.fetch_count(&ACCOUNTS, options).await
    }

    async fn read_accounts_page(&self, options: ReadListOptions) -> IndexerResult<Page<Account>> {
        self.fetch_page(&ACCOUNTS, options, rows::account).await
    }

    async fn write_app(&self, app: &App) -> IndexerResult<()> {
        check_address(&app.address)?;

        sqlx::query(
            "INSERT into apps (address, height, public_key, jailed, status, chains, staked_tokens, max_relays) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&app.address)
        .bind(db_height(app.height)?)
        .bind(&app.public_key)
        .bind(app.jailed)
        .bind(app.status)
        .bind(&app.chains)
        .bind(app.staked_tokens.to_string())
        .bind(app.max_relays.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn write_apps(&self, apps: &[App]) -> IndexerResult<()> {
        let heights = apps
            .iter()
            .map(|a| check_address(&a.address).and_then(|()| db_height(a.height)))
            .collect::<IndexerResult<Vec<i64>>>()?;

        let mut tx = self.pool.begin().await?;
        for (chunk, chunk_heights) in apps
            .chunks(INSERT_CHUNK_ROWS)
            .zip(heights.chunks(INSERT_CHUNK_ROWS))
        {
            let mut builder = queries::insert(&APPS);
            builder.push_values(chunk.iter().zip(chunk_heights), |mut row, (app, height)| {
                row.push_bind(app.address.as_str())
                    .push_bind(*height)
                    .push_bind(app.public_key.as_str())
                    .push_bind(app.jailed)
                    .push_bind(app.status)
                    .push_bind(app.chains.clone())
                    .push_bind(app.staked_tokens.to_string())
                    .push_bind(app.max_relays.to_string());
            });
            builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        debug!("Stored {} apps", apps.len());
        Ok(())
    }

    async fn read_app_by_address(
        &self,
        address: &str,
        options: ReadByAddressOptions,
    ) -> IndexerResult<Option<App>> {
        self.fetch_latest(&APPS, address, options, rows::app).await
    }

    async fn read_apps(&self, options: ReadListOptions) -> IndexerResult<Vec<App>> {
        self.fetch_list(&APPS, options, rows::app).await
    }

    async fn count_apps(&self, options: CountOptions) -> IndexerResult<i64> {
        self.fetch_count(&APPS, options).await
    }

    async fn read_apps_page(&self, options: ReadListOptions) -> IndexerResult<Page<App>> {
        self.fetch_page(&APPS, options, rows::app).await
    }

    async fn max_height(&self) -> IndexerResult<Option<u64>> {
        let height = queries::max_height()
            .build_query_scalar::<Option<i64>>()
            .fetch_one(&self.pool)
            .await?;

        height
            .map(|h| {
                u64::try_from(h).map_err(|e| {
                    StorageError::MalformedRow { column: "height", reason: e.to_string() }.into()
                })
            })
            .transpose()
    }
}
