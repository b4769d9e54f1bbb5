mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let Some(server) = common::start_server().await? else {
        return Ok(());
    };

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn login_and_role_gates() -> Result<()> {
    let Some(server) = common::start_server().await? else {
        return Ok(());
    };

    let admin = server.login("admin").await?;
    let user = server.login("user").await?;

    // Wrong password
    let res = server
        .client
        .post(server.url("/v1/auth"))
        .json(&json!({"username": "user", "password": "letmein"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Readers can list, only admins can write
    for token in [&admin, &user] {
        let res = server.client.get(server.url("/v1/actor-list")).bearer_auth(token).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = server
        .client
        .post(server.url("/v1/actor-add"))
        .bearer_auth(&user)
        .json(&json!({"name": "Nobody", "gender": "M", "dateOfBirth": "1990-01-01"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Tampered token
    let res = server
        .client
        .get(server.url("/v1/movie-list"))
        .bearer_auth(format!("{}x", admin))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
