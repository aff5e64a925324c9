//! In-process storage backend
//!
//! Mirrors the Postgres driver's semantics (insert-only rows, latest-height
//! reads, `height DESC, id ASC` list order, atomic batches) without a database.

use crate::core::{
    CountOptions, IndexerError, IndexerResult, Page, ReadByAddressOptions, ReadListOptions,
    StorageError, StoragePort,
};
use crate::domain::models::{validate_address, Account, App};
use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

trait HeightKeyed: Clone {
    fn address(&self) -> &str;
    fn height(&self) -> u64;
}

impl HeightKeyed for Account {
    fn address(&self) -> &str {
        &self.address
    }

    fn height(&self) -> u64 {
        self.height
    }
}

impl HeightKeyed for App {
    fn address(&self) -> &str {
        &self.address
    }

    fn height(&self) -> u64 {
        self.height
    }
}

/// Rows in insertion order; position doubles as the surrogate id.
#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    apps: Vec<App>,
}

/// Storage backend holding every row in memory
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IndexerResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()).into())
    }

    fn write(&self) -> IndexerResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()).into())
    }
}

fn check_address(address: &str) -> IndexerResult<()> {
    if validate_address(address) {
        Ok(())
    } else {
        Err(IndexerError::InvalidAddress(address.to_string()))
    }
}

fn check_batch<T: HeightKeyed>(records: &[T]) -> IndexerResult<()> {
    records.iter().try_for_each(|r| check_address(r.address()))
}

fn matches_height<T: HeightKeyed>(row: &T, height: Option<u64>) -> bool {
    height.map_or(true, |h| row.height() == h)
}

fn find_latest<T: HeightKeyed>(rows: &[T], address: &str, height: Option<u64>) -> Option<T> {
    rows.iter()
        .filter(|row| row.address() == address && matches_height(*row, height))
        .fold(None::<&T>, |best, row| match best {
            Some(b) if b.height() >= row.height() => Some(b),
            _ => Some(row),
        })
        .cloned()
}

fn select_page<T: HeightKeyed>(rows: &[T], options: &ReadListOptions) -> Vec<T> {
    let mut matching: Vec<&T> = rows
        .iter()
        .filter(|row| matches_height(*row, options.height))
        .collect();
    // stable sort keeps insertion (id) order within a height
    matching.sort_by(|a, b| b.height().cmp(&a.height()));

    matching
        .into_iter()
        .skip(options.offset() as usize)
        .take(options.per_page() as usize)
        .cloned()
        .collect()
}

fn count_rows<T: HeightKeyed>(rows: &[T], options: &CountOptions) -> i64 {
    rows.iter().filter(|row| matches_height(*row, options.height)).count() as i64
}

#[async_trait]
impl StoragePort for MemoryStorage {
    async fn write_account(&self, account: &Account) -> IndexerResult<()> {
        check_address(&account.address)?;
        self.write()?.accounts.push(account.clone());
        Ok(())
    }

    async fn write_accounts(&self, accounts: &[Account]) -> IndexerResult<()> {
        check_batch(accounts)?;
        self.write()?.accounts.extend_from_slice(accounts);
        debug!("Stored {} accounts in memory", accounts.len());
        Ok(())
    }

    async fn read_account_by_address(
        &self,
        address: &str,
        options: ReadByAddressOptions,
    ) -> IndexerResult<Option<Account>> {
        check_address(address)?;
        Ok(find_latest(&self.read()?.accounts, address, options.height))
    }

    async fn read_accounts(&self, options: ReadListOptions) -> IndexerResult<Vec<Account>> {
        Ok(select_page(&self.read()?.accounts, &options))
    }

    async fn count_accounts(&self, options: CountOptions) -> IndexerResult<i64> {
        Ok(count_rows(&self.read()?.accounts, &options))
    }

    async fn read_accounts_page(&self, options: ReadListOptions) -> IndexerResult<Page<Account>> {
        let tables = self.read()?;
        let items = select_page(&tables.accounts, &options);
        let total = count_rows(&tables.accounts, &options.count_options());
        Ok(Page::new(items, total, &options))
    }

    async fn write_app(&self, app: &App) -> IndexerResult<()> {
        check_address(&app.address)?;
        self.write()?.apps.push(app.clone());
        Ok(())
    }

    async fn write_apps(&self, apps: &[App]) -> IndexerResult<()> {
        check_batch(apps)?;
        self.write()?.apps.extend_from_slice(apps);
        debug!("Stored {} apps in memory", apps.len());
        Ok(())
    }

    async fn read_app_by_address(
        &self,
        address: &str,
        options: ReadByAddressOptions,
    ) -> IndexerResult<Option<App>> {
        check_address(address)?;
        Ok(find_latest(&self.read()?.apps, address, options.height))
    }

    async fn read_apps(&self, options: ReadListOptions) -> IndexerResult<Vec<App>> {
        Ok(select_page(&self.read()?.apps, &options))
    }

    async fn count_apps(&self, options: CountOptions) -> IndexerResult<i64> {
        Ok(count_rows(&self.read()?.apps, &options))
    }

    async fn read_apps_page(&self, options: ReadListOptions) -> IndexerResult<Page<App>> {
        let tables = self.read()?;
        let items = select_page(&tables.apps, &options);
        let total = count_rows(&tables.apps, &options.count_options());
        Ok(Page::new(items, total, &options))
    }

    async fn max_height(&self) -> IndexerResult<Option<u64>> {
        let tables = self.read()?;
        let accounts = tables.accounts.iter().map(|a| a.height);
        let apps = tables.apps.iter().map(|a| a.height);
        Ok(accounts.chain(apps).max())
    }
}
