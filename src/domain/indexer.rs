//! Height-by-height synchronization of provider snapshots into storage

use crate::core::{
    CountOptions, EntityProvider, IndexerError, IndexerResult, ProviderResult, StoragePort,
};
use crate::domain::models::{Account, App, Balance, EntityKind, ProviderAccount, ProviderApp};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of one synchronization step.
///
/// `addresses` holds every key the step built before it stopped, so a failed
/// write still reports what would have been indexed.
#[derive(Debug)]
pub struct IndexOutcome {
    pub addresses: Vec<String>,
    pub result: IndexerResult<()>,
}

impl IndexOutcome {
    fn failed(addresses: Vec<String>, error: IndexerError) -> Self {
        Self { addresses, result: Err(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&IndexerError> {
        self.result.as_ref().err()
    }

    /// Drop the keys on failure.
    pub fn into_result(self) -> IndexerResult<Vec<String>> {
        self.result.map(|()| self.addresses)
    }
}

/// Synchronizes one entity kind at one height per call
pub struct Indexer<P: EntityProvider, S: StoragePort> {
    provider: Arc<P>,
    storage: Arc<S>,
}

impl<P: EntityProvider, S: StoragePort> Indexer<P, S> {
    pub fn new(provider: Arc<P>, storage: Arc<S>) -> Self {
        Self { provider, storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Fetch the apps staked at `height` and persist them.
    pub async fn index_block_apps(&self, height: u64) -> IndexOutcome {
        let fetched = self.provider.fetch_apps(height).await;

        let (addresses, apps) = match prepare(EntityKind::Apps, height, fetched, app_from_provider) {
            Ok(prepared) => prepared,
            Err(outcome) => return outcome,
        };

        let result = self.storage.write_apps(&apps).await;
        finish(EntityKind::Apps, height, addresses, result)
    }

    /// Fetch the node and app accounts at `height` and persist them.
    pub async fn index_block_accounts(&self, height: u64) -> IndexOutcome {
        let fetched = self.provider.fetch_accounts(height).await;

        let (addresses, accounts) =
            match prepare(EntityKind::Accounts, height, fetched, account_from_provider) {
                Ok(prepared) => prepared,
                Err(outcome) => return outcome,
            };

        let result = self.storage.write_accounts(&accounts).await;
        finish(EntityKind::Accounts, height, addresses, result)
    }

    pub async fn index_block(&self, kind: EntityKind, height: u64) -> IndexOutcome {
        match kind {
            EntityKind::Apps => self.index_block_apps(height).await,
            EntityKind::Accounts => self.index_block_accounts(height).await,
        }
    }

    /// Whether `kind` already has rows stored at `height`.
    pub async fn is_indexed(&self, kind: EntityKind, height: u64) -> IndexerResult<bool> {
        let options = CountOptions { height: Some(height) };
        let count = match kind {
            EntityKind::Apps => self.storage.count_apps(options).await?,
            EntityKind::Accounts => self.storage.count_accounts(options).await?,
        };
        Ok(count > 0)
    }

    /// Height to continue from after a restart.
    ///
    /// The highest stored height is revisited rather than skipped: a run that
    /// stopped between entity kinds leaves it only partly indexed. Callers
    /// check [`Self::is_indexed`] per kind before writing it again.
    pub async fn resume_height(&self, start_height: u64) -> IndexerResult<u64> {
        Ok(match self.storage.max_height().await? {
            Some(stored) => start_height.max(stored),
            None => start_height,
        })
    }
}

/// Everything before the write: fetch outcome, emptiness check, transform.
fn prepare<R, E>(
    kind: EntityKind,
    height: u64,
    fetched: ProviderResult<Vec<R>>,
    transform: impl Fn(R, u64) -> IndexerResult<(String, E)>,
) -> Result<(Vec<String>, Vec<E>), IndexOutcome> {
    let raw = fetched.map_err(|e| IndexOutcome::failed(Vec::new(), e.into()))?;

    if raw.is_empty() {
        return Err(IndexOutcome::failed(
            Vec::new(),
            IndexerError::NothingToIndex { kind, height },
        ));
    }

    debug!("Fetched {} {} at height {}", raw.len(), kind, height);

    let mut addresses = Vec::with_capacity(raw.len());
    let mut records = Vec::with_capacity(raw.len());

    for item in raw {
        match transform(item, height) {
            Ok((address, record)) => {
                addresses.push(address);
                records.push(record);
            }
            Err(e) => return Err(IndexOutcome::failed(addresses, e)),
        }
    }

    Ok((addresses, records))
}

fn finish(
    kind: EntityKind,
    height: u64,
    addresses: Vec<String>,
    result: IndexerResult<()>,
) -> IndexOutcome {
    if result.is_ok() {
        info!("Indexed {} {} at height {}", addresses.len(), kind, height);
    }
    IndexOutcome { addresses, result }
}

fn parse_balance(address: &str, field: &str, raw: &str) -> IndexerResult<Balance> {
    raw.parse().map_err(|e| IndexerError::InvalidProviderData {
        address: address.to_string(),
        reason: format!("{field}: {e}"),
    })
}

fn app_from_provider(app: ProviderApp, height: u64) -> IndexerResult<(String, App)> {
    let staked_tokens = parse_balance(&app.address, "staked_tokens", &app.staked_tokens)?;
    // older nodes omit max_relays
    let max_relays = if app.max_relays.is_empty() {
        Balance::zero()
    } else {
        parse_balance(&app.address, "max_relays", &app.max_relays)?
    };

    let record = App {
        address: app.address.clone(),
        height,
        public_key: app.public_key,
        jailed: app.jailed,
        status: app.status,
        chains: app.chains,
        staked_tokens,
        max_relays,
    };

    Ok((app.address, record))
}

fn account_from_provider(account: ProviderAccount, height: u64) -> IndexerResult<(String, Account)> {
    let balance = parse_balance(&account.address, "balance", &account.balance)?;

    let record = Account {
        address: account.address.clone(),
        height,
        account_type: account.account_type,
        balance,
        balance_denomination: account.denomination,
    };

    Ok((account.address, record))
}
