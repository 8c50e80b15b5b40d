mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_login_and_whoami() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (token, user_id, username) = common::register_and_login(&server.base_url).await?;

    // Token resolves to the registered identity
    let res = client
        .get(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["id"].as_i64(), Some(user_id));
    assert_eq!(body["data"]["username"], username);
    assert_eq!(body["data"]["is_active"], true);
    // Credential hash must never appear in responses
    assert!(body["data"].get("hashed_password").is_none());

    // Without a credential the same endpoint is rejected up front
    let res = client
        .get(format!("{}/users/me", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Garbage token is rejected too
    let res = client
        .get(format!("{}/users/me", server.base_url))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let username = format!("dup_{}", common::unique_suffix());
    let username = &username[..username.len().min(50)];
    let payload = json!({
        "email": format!("{}@example.com", username),
        "username": username,
        "password": "pw-one",
    });

    let res = client
        .post(format!("{}/users/auth/register", server.base_url))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Same username, different email: still a uniqueness violation
    let second = json!({
        "email": format!("{}.other@example.com", username),
        "username": username,
        "password": "pw-two",
    });
    let res = client
        .post(format!("{}/users/auth/register", server.base_url))
        .json(&second)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (_token, _id, username) = common::register_and_login(&server.base_url).await?;

    let res = client
        .post(format!("{}/users/auth/jwt/login", server.base_url))
        .json(&json!({ "username": username, "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Unknown user fails the same way
    let res = client
        .post(format!("{}/users/auth/jwt/login", server.base_url))
        .json(&json!({ "username": "nobody-here", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn register_rejects_malformed_payloads() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/users/auth/register", server.base_url))
        .json(&json!({ "email": "not-an-email", "username": "x", "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["field_errors"]["email"].is_string());
    Ok(())
}
