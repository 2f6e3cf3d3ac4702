mod common;

use anyhow::Result;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use common::{create, AsUser, TestServer};

#[tokio::test]
async fn malformed_tokens_behave_like_anonymous() -> Result<()> {
    let server = common::ensure_server().await?;

    create(&server, "/api/v1/beans", json!({ "name": "Alice's" }), Some("alice")).await?;
    create(&server, "/api/v1/beans", json!({ "name": "Bob's" }), Some("bob")).await?;

    let anonymous = server.get("/api/v1/beans").send().await?;
    assert_eq!(anonymous.status(), StatusCode::OK);
    let anonymous = common::json_body(anonymous).await?;

    let forged = encode(
        &Header::default(),
        &json!({ "sub": "alice" }),
        &EncodingKey::from_secret(b"not-the-secret"),
    )?;

    for header in [
        "Bearer".to_string(),
        "Bearer garbage".to_string(),
        "Token abc.def.ghi".to_string(),
        format!("Bearer  {}", forged),
        format!("Bearer {}", forged),
    ] {
        let res = server.get("/api/v1/beans").header("Authorization", &header).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "header {:?}", header);
        assert_eq!(common::json_body(res).await?, anonymous, "header {:?}", header);
    }

    Ok(())
}

#[tokio::test]
async fn expired_tokens_fall_back_to_anonymous() -> Result<()> {
    let server = common::ensure_server().await?;

    let expired = encode(
        &Header::default(),
        &json!({ "sub": "alice", "exp": 1_600_000_000 }),
        &EncodingKey::from_secret(common::JWT_SECRET.as_bytes()),
    )?;
    let bean = create(&server, "/api/v1/beans", json!({ "name": "stale" }), None).await?;
    let res = server
        .post("/api/v1/beans", &json!({ "name": "with expired token" }))
        .bearer_auth(expired)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(common::json_body(res).await?["userId"], bean["userId"]);

    Ok(())
}

#[tokio::test]
async fn without_a_secret_any_signature_is_read() -> Result<()> {
    let server = TestServer::spawn(None).await?;

    let token = encode(
        &Header::default(),
        &json!({ "sub": "mallory" }),
        &EncodingKey::from_secret(b"anything"),
    )?;
    let bean = create(&server, "/api/v1/beans", json!({ "name": "Unverified" }), None).await?;
    assert_eq!(bean["userId"], "00000000-0000-0000-0000-000000000000");

    let res = server
        .post("/api/v1/beans", &json!({ "name": "Dev mode" }))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(common::json_body(res).await?["userId"], "mallory");

    // Tokens signed with the test secret are read the same way
    let mine = common::json_body(server.get("/api/v1/beans").as_user("mallory").send().await?).await?;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["name"], "Dev mode");

    Ok(())
}
