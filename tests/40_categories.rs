mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn category_lifecycle() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _user_id, _username) = common::register_and_login(&server.base_url).await?;

    let name = format!("Tech-{}", common::unique_suffix());
    let res = client
        .post(format!("{}/categories/", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": name, "description": "d", "is_active": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let category_id = body["data"]["id"].as_i64().expect("category id");
    assert_eq!(body["data"]["is_active"], true);

    // Duplicate name is a uniqueness conflict
    let res = client
        .post(format!("{}/categories/", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": name, "description": "other" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "CONFLICT");

    // Deactivating touches only is_active
    let res = client
        .patch(format!("{}/categories/{}", server.base_url, category_id))
        .bearer_auth(&token)
        .json(&json!({ "is_active": false }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["is_active"], false);
    assert_eq!(body["data"]["name"], json!(name));
    assert_eq!(body["data"]["description"], "d");

    // Empty update is rejected
    let res = client
        .patch(format!("{}/categories/{}", server.base_url, category_id))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Delete then get
    let res = client
        .delete(format!("{}/categories/{}", server.base_url, category_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(
        body["data"],
        json!(format!("Category {} has been deleted", category_id))
    );

    let res = client
        .get(format!("{}/categories/{}", server.base_url, category_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn category_reads_require_a_token() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/categories/", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/categories/1", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
