//! Indexer integration tests against an in-process mock Pocket node

use anyhow::Result;
use axum::{http::StatusCode, routing::post, Json, Router};
use pocket_indexer::adapters::pocket::{QUERY_APPS_ROUTE, QUERY_NODES_ROUTE};
use pocket_indexer::config::RpcConfig;
use pocket_indexer::{
    AccountType, Balance, CountOptions, EntityKind, EntityProvider, IndexerError, Indexer,
    MemoryStorage, PocketProvider, ProviderError, ReadByAddressOptions, ReadListOptions,
    StoragePort,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

const QUERY_APPS: &str = include_str!("fixtures/query_apps.json");
const QUERY_APPS_EMPTY: &str = include_str!("fixtures/query_apps_empty.json");
const QUERY_NODES: &str = include_str!("fixtures/query_nodes.json");

const APP_ADDRESS: &str = "98a18a38aa6826a55dccce19f607e3171cf14366";

/// Serve `router` on an ephemeral port and return its base URL
async fn serve(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(format!("http://{}", addr))
}

/// Mock node answering each route with a fixed status and body
async fn mock_node(routes: &[(&'static str, StatusCode, &'static str)]) -> Result<String> {
    let mut router = Router::new();
    for &(path, status, body) in routes {
        router = router.route(path, post(move || async move { (status, body) }));
    }
    serve(router).await
}

fn create_indexer(base_url: String) -> Result<Indexer<PocketProvider, MemoryStorage>> {
    let config = RpcConfig {
        endpoint: base_url,
        ..RpcConfig::default()
    };
    let provider = PocketProvider::new(&config)?;
    Ok(Indexer::new(Arc::new(provider), Arc::new(MemoryStorage::new())))
}

#[tokio::test]
async fn test_server_error_is_passed_through() -> Result<()> {
    let url = mock_node(&[(QUERY_APPS_ROUTE, StatusCode::INTERNAL_SERVER_ERROR, QUERY_APPS)]).await?;
    let indexer = create_indexer(url)?;

    let outcome = indexer.index_block_apps(30363).await;

    assert!(outcome.addresses.is_empty());
    assert!(matches!(
        outcome.result,
        Err(IndexerError::Provider(ProviderError::ServerError { status: 500 }))
    ));
    assert!(matches!(outcome.error(), Some(IndexerError::Provider(e)) if e.is_server_error()));
    Ok(())
}

#[tokio::test]
async fn test_empty_height_reports_nothing_to_index() -> Result<()> {
    let url = mock_node(&[(QUERY_APPS_ROUTE, StatusCode::OK, QUERY_APPS_EMPTY)]).await?;
    let indexer = create_indexer(url)?;

    let outcome = indexer.index_block_apps(30363).await;

    assert!(outcome.addresses.is_empty());
    assert!(matches!(
        outcome.result,
        Err(IndexerError::NothingToIndex { kind: EntityKind::Apps, height: 30363 })
    ));
    assert_eq!(indexer.storage().count_apps(CountOptions::default()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_apps_are_indexed_at_height() -> Result<()> {
    let url = mock_node(&[(QUERY_APPS_ROUTE, StatusCode::OK, QUERY_APPS)]).await?;
    let indexer = create_indexer(url)?;

    let addresses = indexer.index_block_apps(30363).await.into_result()?;
    assert_eq!(addresses, vec![APP_ADDRESS.to_string()]);

    let app = indexer
        .storage()
        .read_app_by_address(APP_ADDRESS, ReadByAddressOptions::at_height(30363))
        .await?
        .expect("app stored at 30363");
    assert_eq!(app.staked_tokens, Balance::from_u64(100_000_000_000));
    assert_eq!(app.max_relays, Balance::from_u64(6_250_000));
    assert_eq!(app.status, 2);
    Ok(())
}

#[tokio::test]
async fn test_client_error_carries_body() -> Result<()> {
    let url = mock_node(&[(QUERY_APPS_ROUTE, StatusCode::BAD_REQUEST, "height is in the future")]).await?;
    let indexer = create_indexer(url)?;

    let outcome = indexer.index_block_apps(99_999_999).await;

    match outcome.result {
        Err(IndexerError::Provider(ProviderError::ClientError { status, message })) => {
            assert_eq!(status, 400);
            assert_eq!(message, "height is in the future");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_accounts_combine_apps_and_nodes() -> Result<()> {
    let url = mock_node(&[
        (QUERY_APPS_ROUTE, StatusCode::OK, QUERY_APPS),
        (QUERY_NODES_ROUTE, StatusCode::OK, QUERY_NODES),
    ])
    .await?;
    let indexer = create_indexer(url)?;

    let addresses = indexer.index_block_accounts(21).await.into_result()?;
    assert_eq!(addresses.len(), 3);

    let accounts = indexer
        .storage()
        .read_accounts(ReadListOptions::new().with_height(21))
        .await?;
    assert_eq!(accounts[0].account_type, AccountType::App);
    assert_eq!(accounts[0].address, APP_ADDRESS);
    assert_eq!(accounts[0].balance, Balance::from_u64(100_000_000_000));
    assert_eq!(accounts[2].account_type, AccountType::Node);
    assert_eq!(accounts[2].balance, Balance::from_u64(212121));
    assert!(accounts.iter().all(|a| a.balance_denomination == "upokt"));
    Ok(())
}

#[tokio::test]
async fn test_provider_follows_every_page() -> Result<()> {
    let requests: Arc<Mutex<Vec<Value>>> = Arc::default();
    let seen = requests.clone();

    let router = Router::new().route(
        QUERY_APPS_ROUTE,
        post(move |Json(query): Json<Value>| {
            let seen = seen.clone();
            async move {
                let page = query["opts"]["page"].as_u64().unwrap_or(1);
                seen.lock().unwrap().push(query);
                Json(json!({
                    "page": page,
                    "total_pages": 3,
                    "result": [{ "address": format!("{:040x}", page), "staked_tokens": "1" }]
                }))
            }
        }),
    );
    let config = RpcConfig {
        endpoint: serve(router).await?,
        per_page: 1,
        ..RpcConfig::default()
    };
    let provider = PocketProvider::new(&config)?;

    let apps = provider.fetch_apps(30363).await?;

    let addresses: Vec<String> = apps.into_iter().map(|a| a.address).collect();
    assert_eq!(addresses, vec![format!("{:040x}", 1), format!("{:040x}", 2), format!("{:040x}", 3)]);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|q| q["height"] == 30363 && q["opts"]["per_page"] == 1));
    Ok(())
}
