mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn root_describes_the_api() -> Result<()> {
    let server = common::spawn_memory_app().await?;

    let res = reqwest::get(server.url("/")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["store"], "memory", "unexpected body: {}", body);
    assert_eq!(body["endpoints"]["transactions"], "/transactions[/:id]");
    Ok(())
}

#[tokio::test]
async fn health_is_ok_for_memory_store() -> Result<()> {
    let server = common::spawn_memory_app().await?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_paths_are_404() -> Result<()> {
    let server = common::spawn_memory_app().await?;
    let res = reqwest::get(server.url("/api/data/users")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
