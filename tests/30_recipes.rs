mod common;

use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{create, id_of, recipe_body, AsUser};

fn titles(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn recipe_round_trip_keeps_step_order() -> Result<()> {
    let server = common::ensure_server().await?;

    let mut body = recipe_body("Hoffmann V60", 15.0, true);
    body["steps"] = json!([
        { "order": 3, "label": "Swirl", "timeSeconds": 10, "waterMl": 0 },
        { "order": 1, "label": "Bloom", "timeSeconds": 45, "waterMl": 50, "notes": "wet all grounds" }
    ]);
    body["tags"] = json!(["light", "fruity"]);
    let recipe = create(&server, "/api/v1/recipes", body, Some("alice")).await?;

    assert_eq!(recipe["likeCount"], 0);
    assert_eq!(recipe["equipment"], "V60");
    assert_eq!(recipe["grindSize"], "MEDIUM_FINE");
    assert_eq!(recipe["steps"][0]["label"], "Swirl");
    assert_eq!(recipe["steps"][1]["notes"], "wet all grounds");
    assert_eq!(recipe["tags"], json!(["light", "fruity"]));

    let res = server.get(&format!("/api/v1/recipes/{}", id_of(&recipe))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::json_body(res).await?["steps"], recipe["steps"]);

    Ok(())
}

#[tokio::test]
async fn recipe_validation() -> Result<()> {
    let server = common::ensure_server().await?;

    let missing_title = recipe_body("", 15.0, false);
    let mut no_equipment = recipe_body("No brewer", 15.0, false);
    no_equipment.as_object_mut().unwrap().remove("equipment");
    let zero_dose = recipe_body("Zero", 0.0, false);
    let mut no_water = recipe_body("Dry", 15.0, false);
    no_water["totalWaterMl"] = json!(0);

    for body in [missing_title, no_equipment, zero_dose, no_water] {
        let res = server.post("/api/v1/recipes", &body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(common::json_body(res).await?["code"], "VALIDATION_ERROR");
    }

    let res = server.get("/api/v1/recipes").send().await?;
    assert_eq!(common::json_body(res).await?, json!([]));

    Ok(())
}

#[tokio::test]
async fn recipe_visibility() -> Result<()> {
    let server = common::ensure_server().await?;

    create(&server, "/api/v1/recipes", recipe_body("alice private", 15.0, false), Some("alice")).await?;
    create(&server, "/api/v1/recipes", recipe_body("alice public", 15.0, true), Some("alice")).await?;
    create(&server, "/api/v1/recipes", recipe_body("bob private", 15.0, false), Some("bob")).await?;
    create(&server, "/api/v1/recipes", recipe_body("bob public", 15.0, true), Some("bob")).await?;

    let anonymous = common::json_body(server.get("/api/v1/recipes").send().await?).await?;
    assert_eq!(anonymous.as_array().unwrap().len(), 4);

    let alice = common::json_body(server.get("/api/v1/recipes").as_user("alice").send().await?).await?;
    let mut seen = titles(&alice);
    seen.sort();
    assert_eq!(seen, vec!["alice private", "alice public", "bob public"]);

    Ok(())
}

#[tokio::test]
async fn public_ranking_orders_by_likes_then_recency() -> Result<()> {
    let server = common::ensure_server().await?;

    create(&server, "/api/v1/recipes", recipe_body("older", 15.0, true), None).await?;
    create(&server, "/api/v1/recipes", recipe_body("newer", 15.0, true), None).await?;
    let popular = create(&server, "/api/v1/recipes", recipe_body("popular", 15.0, true), None).await?;
    create(&server, "/api/v1/recipes", recipe_body("hidden", 15.0, false), None).await?;

    for user in ["u1", "u2"] {
        let res = server
            .client
            .post(server.url(&format!("/api/v1/recipes/{}/like", id_of(&popular))))
            .as_user(user)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let ranked = common::json_body(server.get("/api/v1/recipes/public").send().await?).await?;
    assert_eq!(titles(&ranked), vec!["popular", "newer", "older"]);
    assert_eq!(ranked[0]["likeCount"], 2);

    Ok(())
}

#[tokio::test]
async fn likes_count_once_and_never_go_negative() -> Result<()> {
    let server = common::ensure_server().await?;

    let recipe = create(&server, "/api/v1/recipes", recipe_body("likeable", 18.0, true), Some("alice")).await?;
    let like_path = format!("/api/v1/recipes/{}/like", id_of(&recipe));

    let status = common::json_body(server.get(&like_path).as_user("carol").send().await?).await?;
    assert_eq!(status["liked"], false);
    assert_eq!(status["recipeId"], recipe["id"]);

    for _ in 0..2 {
        let res = server.client.post(server.url(&like_path)).as_user("carol").send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        let status = common::json_body(res).await?;
        assert_eq!(status["liked"], true);
        assert_eq!(status["likeCount"], 1);
    }

    for _ in 0..2 {
        let res = server.delete(&like_path).as_user("carol").send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        let status = common::json_body(res).await?;
        assert_eq!(status["liked"], false);
        assert_eq!(status["likeCount"], 0);
    }

    // Updates never touch the counter
    server.client.post(server.url(&like_path)).as_user("dave").send().await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let recipe_path = format!("/api/v1/recipes/{}", id_of(&recipe));
    let res = server.put(&recipe_path, &recipe_body("renamed", 18.0, true)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = common::json_body(res).await?;
    assert_eq!(updated["title"], "renamed");
    assert_eq!(updated["likeCount"], 1);
    assert_eq!(updated["id"], recipe["id"]);
    assert_eq!(updated["createdAt"], recipe["createdAt"]);
    assert_ne!(updated["updatedAt"], recipe["updatedAt"]);

    let reread = common::json_body(server.get(&recipe_path).send().await?).await?;
    assert_eq!(reread["id"], recipe["id"]);
    assert_eq!(reread["title"], "renamed");
    assert_eq!(reread["likeCount"], 1);
    assert_eq!(reread["createdAt"], recipe["createdAt"]);
    assert_eq!(reread["updatedAt"], updated["updatedAt"]);

    Ok(())
}

#[tokio::test]
async fn likes_on_unknown_recipes_are_not_found() -> Result<()> {
    let server = common::ensure_server().await?;

    let path = "/api/v1/recipes/7f0c2a4e-9b3d-4c1a-8e55-0d2f6b1a9c33/like";
    assert_eq!(server.client.post(server.url(path)).send().await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.delete(path).send().await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.get(path).send().await?.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn recipe_delete_then_get_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;

    let recipe = create(&server, "/api/v1/recipes", recipe_body("short-lived", 15.0, false), None).await?;
    let path = format!("/api/v1/recipes/{}", id_of(&recipe));

    let res = server.delete(&path).send().await?;
    assert_eq!(common::json_body(res).await?, json!({ "message": "Recipe deleted" }));
    assert_eq!(server.get(&path).send().await?.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn updating_an_unknown_recipe_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server
        .put(
            "/api/v1/recipes/0b6f4e2d-8c1a-4f3e-a7d9-2e5c6b4a1f08",
            &recipe_body("ghost", 15.0, true),
        )
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::json_body(res).await?["code"], "NOT_FOUND");

    let ranked = common::json_body(server.get("/api/v1/recipes/public").send().await?).await?;
    assert_eq!(ranked, json!([]));

    Ok(())
}
