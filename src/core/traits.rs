//! Core trait abstractions (Ports in Hexagonal Architecture)

use async_trait::async_trait;

use super::error::{IndexerResult, ProviderResult};
use super::types::{CountOptions, Page, ReadByAddressOptions, ReadListOptions};
use crate::domain::models::{Account, App, ProviderAccount, ProviderApp};

/// Storage port - abstraction for all storage operations
///
/// Every operation keyed by address validates the address before any I/O
/// and fails with [`IndexerError::InvalidAddress`](super::IndexerError::InvalidAddress).
/// Records are insert-only: there is no update or delete.
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Insert a single account row
    async fn write_account(&self, account: &Account) -> IndexerResult<()>;

    /// Insert a height's accounts; all rows commit or none do
    async fn write_accounts(&self, accounts: &[Account]) -> IndexerResult<()>;

    /// Latest account for `address`, or the one at `options.height`
    async fn read_account_by_address(
        &self,
        address: &str,
        options: ReadByAddressOptions,
    ) -> IndexerResult<Option<Account>>;

    /// One page of accounts in stable order
    async fn read_accounts(&self, options: ReadListOptions) -> IndexerResult<Vec<Account>>;

    /// Total accounts matching the height filter, ignoring pagination
    async fn count_accounts(&self, options: CountOptions) -> IndexerResult<i64>;

    /// A page of accounts and its total, read from one snapshot
    async fn read_accounts_page(&self, options: ReadListOptions) -> IndexerResult<Page<Account>>;

    /// Insert a single app row
    async fn write_app(&self, app: &App) -> IndexerResult<()>;

    /// Insert a height's apps; all rows commit or none do
    async fn write_apps(&self, apps: &[App]) -> IndexerResult<()>;

    /// Latest app for `address`, or the one at `options.height`
    async fn read_app_by_address(
        &self,
        address: &str,
        options: ReadByAddressOptions,
    ) -> IndexerResult<Option<App>>;

    /// One page of apps in stable order
    async fn read_apps(&self, options: ReadListOptions) -> IndexerResult<Vec<App>>;

    /// Total apps matching the height filter, ignoring pagination
    async fn count_apps(&self, options: CountOptions) -> IndexerResult<i64>;

    /// A page of apps and its total, read from one snapshot
    async fn read_apps_page(&self, options: ReadListOptions) -> IndexerResult<Page<App>>;

    /// Highest height present in any indexed table
    async fn max_height(&self) -> IndexerResult<Option<u64>>;
}

/// Entity provider port - block-height snapshots from the chain RPC
#[async_trait]
pub trait EntityProvider: Send + Sync {
    /// All apps staked at `height`
    async fn fetch_apps(&self, height: u64) -> ProviderResult<Vec<ProviderApp>>;

    /// All node and app accounts at `height`
    async fn fetch_accounts(&self, height: u64) -> ProviderResult<Vec<ProviderAccount>>;
}
