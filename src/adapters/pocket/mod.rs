//! Pocket RPC provider
//!
//! Fetches height snapshots from a Pocket node's `/v1/query/*` routes and
//! hands them to the indexer as provider records. Server errors (5xx) are
//! reported as [`ProviderError::ServerError`] so callers can tell them apart
//! from rejected requests.

use crate::config::RpcConfig;
use crate::core::{EntityProvider, ProviderError, ProviderResult};
use crate::domain::models::{AccountType, ProviderAccount, ProviderApp};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const QUERY_APPS_ROUTE: &str = "/v1/query/apps";
pub const QUERY_NODES_ROUTE: &str = "/v1/query/nodes";

/// Paginated query body shared by the apps and nodes routes
#[derive(Debug, Serialize)]
struct HeightQuery {
    height: u64,
    opts: PageOpts,
}

#[derive(Debug, Serialize)]
struct PageOpts {
    page: u32,
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct PagedResponse<T> {
    // nodes answer `null` for an empty height
    result: Option<Vec<T>>,
    #[serde(default)]
    total_pages: u32,
}

/// Node as reported by `/v1/query/nodes`
#[derive(Debug, Deserialize)]
struct QueriedNode {
    address: String,
    tokens: String,
}

/// HTTP client for a Pocket node
pub struct PocketProvider {
    base_url: String,
    per_page: u32,
    denomination: String,
    client: reqwest::Client,
}

impl PocketProvider {
    pub fn new(config: &RpcConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            per_page: config.per_page,
            denomination: config.denomination.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_page<T: DeserializeOwned + Send>(
        &self,
        route: &str,
        height: u64,
        page: u32,
    ) -> ProviderResult<PagedResponse<T>> {
        let body = HeightQuery {
            height,
            opts: PageOpts { page, per_page: self.per_page },
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, route))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ProviderError::ServerError { status: status.as_u16() });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ClientError { status: status.as_u16(), message });
        }

        Ok(response.json().await?)
    }

    /// Every page of `route` at `height`
    async fn query_all<T: DeserializeOwned + Send>(
        &self,
        route: &str,
        height: u64,
    ) -> ProviderResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let response: PagedResponse<T> = self.post_page(route, height, page).await?;
            items.extend(response.result.unwrap_or_default());

            if page >= response.total_pages {
                break;
            }
            page += 1;
        }

        debug!("Queried {} records from {} at height {}", items.len(), route, height);
        Ok(items)
    }
}

#[async_trait]
impl EntityProvider for PocketProvider {
    async fn fetch_apps(&self, height: u64) -> ProviderResult<Vec<ProviderApp>> {
        self.query_all(QUERY_APPS_ROUTE, height).await
    }

    async fn fetch_accounts(&self, height: u64) -> ProviderResult<Vec<ProviderAccount>> {
        let apps = self.fetch_apps(height).await?;
        let nodes: Vec<QueriedNode> = self.query_all(QUERY_NODES_ROUTE, height).await?;

        // apps hold no liquid balance on this route; their stake is recorded instead
        let app_accounts = apps.into_iter().map(|app| ProviderAccount {
            address: app.address,
            account_type: AccountType::App,
            balance: app.staked_tokens,
            denomination: self.denomination.clone(),
        });
        let node_accounts = nodes.into_iter().map(|node| ProviderAccount {
            address: node.address,
            account_type: AccountType::Node,
            balance: node.tokens,
            denomination: self.denomination.clone(),
        });

        Ok(app_accounts.chain(node_accounts).collect())
    }
}
