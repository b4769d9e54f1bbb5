mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

async fn add_movie(server: &TestServer, token: &str, title: &str) -> Result<i64> {
    let movie = server
        .admin_post(
            token,
            "/v1/movie-add",
            json!({"title": title, "releaseDate": "2000-01-01", "rating": 5.0}),
        )
        .await?;
    Ok(movie["id"].as_i64().unwrap_or_default())
}

async fn find_actor(server: &TestServer, token: &str, id: i64) -> Result<Value> {
    let actors = server.get_json(token, "/v1/actor-list").await?;
    actors
        .as_array()
        .and_then(|items| items.iter().find(|a| a["id"] == id).cloned())
        .ok_or_else(|| anyhow::anyhow!("actor {} not listed", id))
}

#[tokio::test]
async fn actor_lifecycle_with_associations() -> Result<()> {
    let Some(server) = common::start_server().await? else {
        return Ok(());
    };
    let admin = server.login("admin").await?;

    let m1 = add_movie(&server, &admin, "The Matrix").await?;
    let m2 = add_movie(&server, &admin, "Speed").await?;
    let m3 = add_movie(&server, &admin, "John Wick").await?;

    let actor = server
        .admin_post(
            &admin,
            "/v1/actor-add",
            json!({"name": "Keanu Reeves", "gender": "M", "dateOfBirth": "1964-09-02", "movies": [m1, m2]}),
        )
        .await?;
    let id = actor["id"].as_i64().unwrap_or_default();
    assert_eq!(actor["movies"], json!([m1, m2]));
    assert_eq!(actor["dateOfBirth"], "1964-09-02");

    // Replace the movie set; junk elements are skipped
    let res = server
        .client
        .put(server.url(&format!("/v1/actor-edit/{}", id)))
        .bearer_auth(&admin)
        .json(&json!({"movies": [m2, m3, "x", null, m3]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let edited: Value = res.json().await?;
    assert_eq!(edited["movies"], json!([m2, m3]));

    // An edit without the association key keeps the links
    let res = server
        .client
        .put(server.url(&format!("/v1/actor-edit/{}", id)))
        .bearer_auth(&admin)
        .json(&json!({"name": "K. Reeves", "gender": "X", "dateOfBirth": "someday"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let edited: Value = res.json().await?;
    assert_eq!(edited["name"], "K. Reeves");
    assert_eq!(edited["gender"], "M");
    assert_eq!(edited["dateOfBirth"], "Invalid date format");
    assert_eq!(edited["movies"], json!([m2, m3]));

    let listed = find_actor(&server, &admin, id).await?;
    assert_eq!(listed["movies"], json!([m2, m3]));

    // Delete, then the movie side no longer references the actor
    let res = server
        .client
        .delete(server.url(&format!("/v1/actor-delete/{}", id)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"id": id, "deleted": true}));

    let movies = server.get_json(&admin, "/v1/movie-list").await?;
    for movie in movies.as_array().into_iter().flatten() {
        assert!(!movie["actors"].as_array().into_iter().flatten().any(|a| *a == id));
    }

    let res = server
        .client
        .delete(server.url(&format!("/v1/actor-delete/{}", id)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn actor_validation_errors() -> Result<()> {
    let Some(server) = common::start_server().await? else {
        return Ok(());
    };
    let admin = server.login("admin").await?;

    let cases = [
        json!({"name": "", "gender": "F", "dateOfBirth": "1967-08-21"}),
        json!({"name": "Carrie-Anne Moss", "gender": "f", "dateOfBirth": "1967-08-21"}),
        json!({"name": "Carrie-Anne Moss", "gender": "F", "movies": [999999]}),
    ];
    for body in cases {
        let res = server
            .client
            .post(server.url("/v1/actor-add"))
            .bearer_auth(&admin)
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", body);
    }

    // Failed add leaves nothing behind
    let actors = server.get_json(&admin, "/v1/actor-list").await?;
    assert!(common::ids(&actors).is_empty());

    let res = server
        .client
        .put(server.url("/v1/actor-edit/424242"))
        .bearer_auth(&admin)
        .json(&json!({"name": "Ghost"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .put(server.url("/v1/actor-edit/abc"))
        .bearer_auth(&admin)
        .json(&json!({"name": "Ghost"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
