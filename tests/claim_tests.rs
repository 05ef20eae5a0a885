//! Integration tests for the claim workflow and the notifications it sends.

mod common;

use axum::http::StatusCode;
use common::{TestApp, spawn_app};
use serde_json::{Value, json};

async fn submit_claim(app: &TestApp, token: &str, item_id: &Value) -> (StatusCode, Value) {
    app.send_json("POST", "/api/claims", Some(token), &json!({ "itemId": item_id }))
        .await
}

async fn review(app: &TestApp, admin: &str, claim_id: &Value, body: Value) -> (StatusCode, Value) {
    app.send_json("PUT", &format!("/api/claims/{claim_id}"), Some(admin), &body)
        .await
}

async fn notifications(app: &TestApp, token: &str) -> Vec<Value> {
    let (status, body) = app.get("/api/notifications", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_duplicate_claim_is_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (member, member_id) = app.register_member("Jane Doe", "jane@example.com").await;
    let item = app.create_item(&admin, "Headphones", "Spin Room", "2025-03-01").await;

    let (status, body) = submit_claim(&app, &member, &item["id"]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["userId"], member_id);
    assert_eq!(body["data"]["item"]["title"], "Headphones");

    let (status, body) = submit_claim(&app, &member, &item["id"]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "You have already submitted a claim for this item"
    );

    let (_, body) = app.get("/api/claims/user", Some(&member)).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_claim_requires_existing_available_item() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (member, _) = app.register_member("Jane Doe", "jane@example.com").await;

    let (status, _) = submit_claim(&app, &member, &json!(9999)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send_json("POST", "/api/claims", Some(&member), &json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let item = app.create_item(&admin, "Watch", "Sauna", "2025-03-01").await;
    app.send_json(
        "PUT",
        &format!("/api/items/{}/status", item["id"]),
        Some(&admin),
        &json!({ "status": "claimed" }),
    )
    .await;

    let (status, body) = submit_claim(&app, &member, &item["id"]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "This item is already claimed or not available"
    );
}

#[tokio::test]
async fn test_approval_claims_item_and_rejects_siblings() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (jane, _) = app.register_member("Jane Doe", "jane@example.com").await;
    let (sam, _) = app.register_member("Sam Roe", "sam@example.com").await;
    let (alex, _) = app.register_member("Alex Poe", "alex@example.com").await;

    let item = app.create_item(&admin, "Gym Bag", "Lobby", "2025-03-01").await;
    let (_, winner) = submit_claim(&app, &jane, &item["id"]).await;
    submit_claim(&app, &sam, &item["id"]).await;
    submit_claim(&app, &alex, &item["id"]).await;

    let (status, body) = review(
        &app,
        &admin,
        &winner["data"]["id"],
        json!({ "status": "approved", "adminComment": "Matches the description" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["adminComment"], "Matches the description");

    let (_, body) = app.get(&format!("/api/items/{}", item["id"]), None).await;
    assert_eq!(body["item"]["status"], "claimed");

    let (_, body) = app.get("/api/claims", Some(&admin)).await;
    let claims = body["data"].as_array().unwrap();
    assert_eq!(claims.len(), 3);
    for claim in claims {
        if claim["id"] == winner["data"]["id"] {
            assert_eq!(claim["status"], "approved");
        } else {
            assert_eq!(claim["status"], "rejected");
            assert_eq!(claim["adminComment"], "Item was claimed by another user");
        }
        assert!(claim["user"]["email"].is_string());
    }

    let jane_notes = notifications(&app, &jane).await;
    assert_eq!(jane_notes.len(), 1);
    assert_eq!(jane_notes[0]["type"], "success");
    assert_eq!(jane_notes[0]["title"], "Claim Approved");

    for token in [&sam, &alex] {
        let notes = notifications(&app, token).await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["type"], "warning");
        assert_eq!(notes[0]["isRead"], false);
    }

    // The item is gone from the public board
    let (_, body) = app.get("/api/items", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_have_a_single_winner() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let item = app.create_item(&admin, "Shaker Bottle", "Lobby", "2025-03-01").await;

    let mut claim_ids = Vec::new();
    for n in 0..6 {
        let (token, _) = app
            .register_member(&format!("Member {n}"), &format!("member{n}@example.com"))
            .await;
        let (status, claim) = submit_claim(&app, &token, &item["id"]).await;
        assert_eq!(status, StatusCode::CREATED);
        claim_ids.push(claim["data"]["id"].clone());
    }

    let mut reviews = tokio::task::JoinSet::new();
    for claim_id in claim_ids {
        let app = app.clone();
        let admin = admin.clone();
        reviews.spawn(async move {
            review(&app, &admin, &claim_id, json!({ "status": "approved" })).await
        });
    }

    let (mut approved, mut refused) = (0, 0);
    while let Some(outcome) = reviews.join_next().await {
        let (status, body) = outcome.unwrap();
        match status {
            StatusCode::OK => approved += 1,
            StatusCode::BAD_REQUEST => refused += 1,
            other => panic!("unexpected {other}: {body}"),
        }
    }
    assert_eq!((approved, refused), (1, 5));

    let (_, body) = app.get("/api/claims", Some(&admin)).await;
    let claims = body["data"].as_array().unwrap();
    let count = |status: &str| claims.iter().filter(|c| c["status"] == status).count();
    assert_eq!(count("approved"), 1);
    assert_eq!(count("rejected"), 5);
    assert_eq!(count("pending"), 0);

    let (_, body) = app.get(&format!("/api/items/{}", item["id"]), None).await;
    assert_eq!(body["item"]["status"], "claimed");
}

#[tokio::test]
async fn test_archived_item_cannot_be_approved() {
    use lostfound::entities::items;
    use sea_orm::sea_query::Expr;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (member, _) = app.register_member("Jane Doe", "jane@example.com").await;

    let item = app.create_item(&admin, "Yoga Mat", "Studio", "2025-03-01").await;
    let (_, claim) = submit_claim(&app, &member, &item["id"]).await;

    // Archived while still flagged available
    items::Entity::update_many()
        .col_expr(items::Column::IsArchived, Expr::value(true))
        .filter(items::Column::Id.eq(item["id"].as_i64().unwrap()))
        .exec(&app.state.store().conn)
        .await
        .unwrap();

    let (status, body) = review(
        &app,
        &admin,
        &claim["data"]["id"],
        json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot approve. Item is no longer available."
    );

    let (_, body) = app.get("/api/claims/user", Some(&member)).await;
    assert_eq!(body["data"][0]["status"], "pending");
}

#[tokio::test]
async fn test_approval_fails_when_item_no_longer_available() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (member, _) = app.register_member("Jane Doe", "jane@example.com").await;

    let item = app.create_item(&admin, "Lanyard", "Lobby", "2025-03-01").await;
    let (_, claim) = submit_claim(&app, &member, &item["id"]).await;

    app.send_json(
        "PUT",
        &format!("/api/items/{}/status", item["id"]),
        Some(&admin),
        &json!({ "status": "claimed" }),
    )
    .await;

    let (status, body) = review(
        &app,
        &admin,
        &claim["data"]["id"],
        json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot approve. Item is no longer available."
    );

    let (_, body) = app.get("/api/claims/user", Some(&member)).await;
    assert_eq!(body["data"][0]["status"], "pending");
    assert!(notifications(&app, &member).await.is_empty());
}

#[tokio::test]
async fn test_claim_transitions() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (jane, _) = app.register_member("Jane Doe", "jane@example.com").await;
    let (sam, _) = app.register_member("Sam Roe", "sam@example.com").await;

    let item = app.create_item(&admin, "Shaker", "Cafe", "2025-03-01").await;
    let (_, jane_claim) = submit_claim(&app, &jane, &item["id"]).await;
    let (_, sam_claim) = submit_claim(&app, &sam, &item["id"]).await;
    let jane_id = &jane_claim["data"]["id"];
    let sam_id = &sam_claim["data"]["id"];

    let (status, _) = review(&app, &admin, jane_id, json!({ "status": "pending" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Collection needs an approved claim
    let (status, body) = review(&app, &admin, jane_id, json!({ "status": "collected" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Claim is already pending");

    let (status, body) = review(
        &app,
        &admin,
        sam_id,
        json!({ "status": "rejected", "adminComment": "Wrong colour" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["adminComment"], "Wrong colour");

    let sam_notes = notifications(&app, &sam).await;
    assert_eq!(sam_notes[0]["type"], "warning");
    assert!(
        sam_notes[0]["message"]
            .as_str()
            .unwrap()
            .contains("Wrong colour")
    );

    let (status, body) = review(&app, &admin, sam_id, json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Claim is already rejected");

    let (status, _) = review(
        &app,
        &admin,
        jane_id,
        json!({ "status": "approved", "adminComment": "Bring ID" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Collect without a comment keeps the approval comment
    let (status, body) = review(&app, &admin, jane_id, json!({ "status": "collected" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "collected");
    assert_eq!(body["data"]["adminComment"], "Bring ID");

    let jane_notes = notifications(&app, &jane).await;
    assert_eq!(jane_notes.len(), 2);
    assert!(jane_notes.iter().any(|n| n["type"] == "info"));

    let (status, _) = review(&app, &admin, &json!(9999), json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notifications_read_and_delete() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (jane, _) = app.register_member("Jane Doe", "jane@example.com").await;
    let (sam, _) = app.register_member("Sam Roe", "sam@example.com").await;

    for title in ["Mat", "Band"] {
        let item = app.create_item(&admin, title, "Studio", "2025-03-01").await;
        let (_, claim) = submit_claim(&app, &jane, &item["id"]).await;
        review(&app, &admin, &claim["data"]["id"], json!({ "status": "rejected" })).await;
    }

    let notes = notifications(&app, &jane).await;
    assert_eq!(notes.len(), 2);
    let first_id = notes[0]["id"].clone();

    // Another member cannot touch Jane's notifications
    let (status, _) = app
        .send_json(
            "PUT",
            &format!("/api/notifications/{first_id}/read"),
            Some(&sam),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .delete(&format!("/api/notifications/{first_id}"), &sam)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send_json(
            "PUT",
            &format!("/api/notifications/{first_id}/read"),
            Some(&jane),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let notes = notifications(&app, &jane).await;
    let unread = notes.iter().filter(|n| n["isRead"] == false).count();
    assert_eq!(unread, 1);

    let (status, _) = app
        .send_json("PUT", "/api/notifications/all/read", Some(&jane), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        notifications(&app, &jane)
            .await
            .iter()
            .all(|n| n["isRead"] == true)
    );

    let (status, _) = app
        .delete(&format!("/api/notifications/{first_id}"), &jane)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notifications(&app, &jane).await.len(), 1);
}
