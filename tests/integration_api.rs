//! API Integration Tests

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{login, send, setup_app, ADMIN_EMAIL, ADMIN_PASSWORD, ANALYST_EMAIL, ANALYST_PASSWORD};

fn neft(amount: &str) -> Value {
    json!({
        "sender": "ACME",
        "receiver": "GLOBEX",
        "amount": amount,
        "channel": "NEFT",
        "ifsc": "sbin0001234",
        "purpose": "Vendor payment"
    })
}

#[tokio::test]
async fn test_root_and_health() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "PayInsight API v1.0.0");
    assert_eq!(body["status"], "running");

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["in_flight_settlements"], 0);
}

#[tokio::test]
async fn test_channels() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/channels", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let channels = body["channels"].as_array().unwrap();
    let codes: Vec<&str> = channels.iter().map(|c| c["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["IMPS", "NEFT", "RTGS"]);
    assert_eq!(channels[2]["timeline"], "5-10 minutes");
}

#[tokio::test]
async fn test_login() {
    let (app, _) = setup_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "Admin@PayInsight.com", "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["token"].as_str().unwrap().len(), 64);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "invalid_credentials");
}

#[tokio::test]
async fn test_transactions_require_token() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/transactions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "missing_token");

    let (status, body) = send(&app, "GET", "/api/transactions", Some("not-a-session"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "invalid_token");
}

#[tokio::test]
async fn test_submit_accepted_transaction() {
    let (app, state) = setup_app().await;
    let token = login(&app, ANALYST_EMAIL, ANALYST_PASSWORD).await;

    let (status, body) = send(&app, "POST", "/api/transactions", Some(&token), Some(neft("150000"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["failure_reason"], Value::Null);
    assert_eq!(body["ifsc"], "SBIN0001234");
    assert_eq!(body["amount"].as_f64(), Some(150000.0));
    assert_eq!(body["aml_flag"], true);
    assert_eq!(body["high_value"], false);
    assert!(body["id"].as_str().unwrap().starts_with("TXN"));
    assert_eq!(state.simulator.in_flight(), 1);
}

#[tokio::test]
async fn test_submit_rejected_transaction_is_stored_as_failed() {
    let (app, state) = setup_app().await;
    let token = login(&app, ANALYST_EMAIL, ANALYST_PASSWORD).await;

    let mut request = neft("5000");
    request["receiver"] = json!("fraud_user");

    let (status, body) = send(&app, "POST", "/api/transactions", Some(&token), Some(request)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Failed");
    assert_eq!(body["failure_reason"], "Account blocked");
    assert_eq!(state.simulator.in_flight(), 0);

    let id = body["id"].as_str().unwrap();
    let (status, body) = send(&app, "GET", &format!("/api/transactions/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Failed");
}

#[tokio::test]
async fn test_malformed_submission_is_client_error() {
    let (app, _) = setup_app().await;
    let token = login(&app, ANALYST_EMAIL, ANALYST_PASSWORD).await;

    let mut request = neft("5000");
    request["channel"] = json!("UPI");

    let (status, _) = send(&app, "POST", "/api/transactions", Some(&token), Some(request)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_list_is_newest_first_and_scoped_to_owner() {
    let (app, _) = setup_app().await;
    let analyst = login(&app, ANALYST_EMAIL, ANALYST_PASSWORD).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let mut ids = Vec::new();
    for amount in ["100", "200", "300"] {
        let (_, body) = send(&app, "POST", "/api/transactions", Some(&analyst), Some(neft(amount))).await;
        ids.push(body["id"].as_str().unwrap().to_string());
        // created_at has sub-second precision; keep the ordering unambiguous
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, body) = send(&app, "GET", "/api/transactions", Some(&analyst), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    let listed: Vec<&str> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str(), ids[0].as_str()]);

    let (_, body) = send(&app, "GET", "/api/transactions", Some(&admin), None).await;
    assert_eq!(body["total"], 0);

    let (status, body) = send(&app, "GET", &format!("/api/transactions/{}", ids[0]), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "transaction_not_found");
}
