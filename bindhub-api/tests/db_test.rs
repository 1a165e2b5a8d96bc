/// Storage-backed integration tests
///
/// Exercise the flows that only a real database can prove: duplicate
/// bindings, login against stored hashes, and tenant isolation of user rows.
/// Each test creates its own uniquely-named accounts and cleans them up, so
/// the suite is safe to run in parallel against one database. Skipped when
/// `TEST_DATABASE_URL` is not set.
mod common;

use axum::http::StatusCode;
use common::{request, TestContext, PASSWORD};
use serde_json::json;

use bindhub_shared::models::account::{Account, UpdateAccount};

#[tokio::test]
async fn test_duplicate_user_binding_is_rejected() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };
    let owner = ctx.create_account("dup-user").await.unwrap();
    let auth = ctx.auth_header(&owner);

    let body = json!({ "account_id": owner.id, "line_user_id": "U123" });

    let (status, first) = ctx
        .send(request("POST", "/api/users", Some(&auth), Some(body.clone())))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["ok"], true);
    assert_eq!(first["data"]["line_user_id"], "U123");

    let (status, second) = ctx
        .send(request("POST", "/api/users", Some(&auth), Some(body)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(second["ok"], false);
    assert_eq!(second["message"], "User already bound for this account");

    ctx.cleanup(&[&owner]).await.unwrap();
}

#[tokio::test]
async fn test_login_succeeds_and_failures_are_indistinguishable() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };
    let account = ctx.create_account("login").await.unwrap();
    let email = account.email.clone().unwrap();

    // Correct credentials issue a token
    let (status, body) = ctx
        .send(request(
            "POST",
            "/api/token",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "bearer");
    assert!(body["data"]["access_token"].is_string());

    // Wrong password and absent email must be indistinguishable
    let (wrong_status, wrong) = ctx
        .send(request(
            "POST",
            "/api/token",
            None,
            Some(json!({ "email": email, "password": "WrongPassw0rd" })),
        ))
        .await;
    let (absent_status, absent) = ctx
        .send(request(
            "POST",
            "/api/token",
            None,
            Some(json!({ "email": common::unique_email("ghost"), "password": PASSWORD })),
        ))
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(absent_status, wrong_status);
    assert_eq!(wrong["message"], absent["message"]);
    assert_eq!(wrong["ok"], false);
    assert!(wrong["data"].is_null() && absent["data"].is_null());

    // An inactive account with correct credentials looks exactly the same
    Account::update(
        &ctx.db,
        account.id,
        UpdateAccount {
            status: Some(false),
            ..Default::default()
        },
        "test",
    )
    .await
    .unwrap();

    let (inactive_status, inactive) = ctx
        .send(request(
            "POST",
            "/api/token",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        ))
        .await;
    assert_eq!(inactive_status, wrong_status);
    assert_eq!(inactive["message"], wrong["message"]);

    ctx.cleanup(&[&account]).await.unwrap();
}

#[tokio::test]
async fn test_cross_tenant_user_read_is_indistinguishable_from_absent() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };
    let owner = ctx.create_account("tenant-a").await.unwrap();
    let intruder = ctx.create_account("tenant-b").await.unwrap();

    let (status, created) = ctx
        .send(request(
            "POST",
            "/api/users",
            Some(&ctx.auth_header(&owner)),
            Some(json!({ "account_id": owner.id, "line_user_id": "U777" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = created["data"]["id"].as_i64().unwrap();

    // The other tenant sees an existing foreign row and a genuinely absent
    // id the same way.
    let intruder_auth = ctx.auth_header(&intruder);
    let (foreign_status, foreign) = ctx
        .send(request(
            "GET",
            &format!("/api/users/{}", user_id),
            Some(&intruder_auth),
            None,
        ))
        .await;
    let (absent_status, absent) = ctx
        .send(request(
            "GET",
            "/api/users/999999999",
            Some(&intruder_auth),
            None,
        ))
        .await;

    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(absent_status, foreign_status);
    assert_eq!(foreign["message"], absent["message"]);

    // The owner still reads it
    let (status, body) = ctx
        .send(request(
            "GET",
            &format!("/api/users/{}", user_id),
            Some(&ctx.auth_header(&owner)),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["line_user_id"], "U777");

    // Cross-tenant update and delete miss the same way
    let (status, _) = ctx
        .send(request(
            "PUT",
            &format!("/api/users/{}", user_id),
            Some(&intruder_auth),
            Some(json!({ "user_name": "hijacked" })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(request(
            "DELETE",
            &format!("/api/users/{}", user_id),
            Some(&intruder_auth),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup(&[&owner, &intruder]).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_email_account_create_is_rejected() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };
    let existing = ctx.create_account("dup-email").await.unwrap();

    // An admin is needed to reach the create operation
    let admin = ctx.create_account("dup-email-admin").await.unwrap();
    sqlx::query("UPDATE accounts SET role = 'ADMIN' WHERE id = $1")
        .bind(admin.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    let admin = Account::find_by_id(&ctx.db, admin.id).await.unwrap().unwrap();

    let (status, body) = ctx
        .send(request(
            "POST",
            "/api/accounts",
            Some(&ctx.auth_header(&admin)),
            Some(json!({ "email": existing.email, "password": PASSWORD })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Account already exists");

    ctx.cleanup(&[&existing, &admin]).await.unwrap();
}
