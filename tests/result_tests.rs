// SPDX-License-Identifier: MIT

//! Result store: session gating, supervision checks, session-date tagging,
//! and owner-scoped deletion.

use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn recording_requires_an_active_session() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);

    let athlete_id = common::seed_athlete(&app, &token, "Asha").await;

    let response = common::send(
        &app,
        "POST",
        "/test",
        &token,
        Some(json!({ "athlete_id": athlete_id, "result_data": { "sprint_s": 4.1 } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "conflict");

    // Nothing was stored
    let response = common::send(&app, "GET", &format!("/test/athlete/{athlete_id}"), &token, None).await;
    let body = common::body_json(response).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn recording_rejects_unsupervised_athletes() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);
    let other = common::auth_token(&state, 2);

    let foreign_athlete = common::seed_athlete(&app, &other, "Mallory").await;
    common::start_session(&app, &token, Some("2024-05-01")).await;

    let response = common::send(
        &app,
        "POST",
        "/test",
        &token,
        Some(json!({ "athlete_id": foreign_athlete, "result_data": {} })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn record_and_list_round_trip() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);

    let athlete_id = common::seed_athlete(&app, &token, "Asha").await;
    common::start_session(&app, &token, Some("2024-05-01")).await;

    let payload = json!({ "test": "countermovement jump", "height_cm": 41.5 });
    let response = common::send(
        &app,
        "POST",
        "/test",
        &token,
        Some(json!({ "athlete_id": athlete_id, "result_data": payload })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = common::send(&app, "GET", &format!("/test/athlete/{athlete_id}"), &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["athlete_name"], "Asha");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["session_date"], "2024-05-01");
    assert_eq!(results[0]["data"], payload);
}

#[tokio::test]
async fn listing_for_a_foreign_athlete_is_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);
    let other = common::auth_token(&state, 2);

    let foreign_athlete = common::seed_athlete(&app, &other, "Mallory").await;

    let response = common::send(
        &app,
        "GET",
        &format!("/test/athlete/{foreign_athlete}"),
        &token,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn results_append_in_insertion_order() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);

    let athlete_id = common::seed_athlete(&app, &token, "Asha").await;
    common::start_session(&app, &token, Some("2024-05-01")).await;

    for run in 1..=3 {
        let response = common::send(
            &app,
            "POST",
            "/test",
            &token,
            Some(json!({ "athlete_id": athlete_id, "result_data": { "run": run } })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = common::send(&app, "GET", &format!("/test/athlete/{athlete_id}"), &token, None).await;
    let body = common::body_json(response).await;
    let runs: Vec<i64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["data"]["run"].as_i64().unwrap())
        .collect();
    assert_eq!(runs, vec![1, 2, 3]);
}

#[tokio::test]
async fn session_listing_is_ordered_by_athlete_name() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);

    let bram = common::seed_athlete(&app, &token, "Bram").await;
    let asha = common::seed_athlete(&app, &token, "Asha").await;
    common::start_session(&app, &token, Some("2024-05-01")).await;

    for athlete_id in [bram, asha] {
        let response = common::send(
            &app,
            "POST",
            "/test",
            &token,
            Some(json!({ "athlete_id": athlete_id, "result_data": {} })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = common::send(&app, "GET", "/test/session/2024-05-01", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["session"], "2024-05-01");
    let names: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["athlete_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Asha", "Bram"]);
}

#[tokio::test]
async fn session_listing_breaks_name_ties_by_insertion_order() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);

    let athlete_id = common::seed_athlete(&app, &token, "Asha").await;
    common::start_session(&app, &token, Some("2024-05-01")).await;

    for run in 1..=3 {
        let response = common::send(
            &app,
            "POST",
            "/test",
            &token,
            Some(json!({ "athlete_id": athlete_id, "result_data": { "run": run } })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = common::send(&app, "GET", "/test/session/2024-05-01", &token, None).await;
    let body = common::body_json(response).await;
    let ids: Vec<i64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["result_id"].as_i64().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn session_listing_rejects_malformed_dates() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);

    let response = common::send(&app, "GET", "/test/session/2024-13-99", &token, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn session_listing_is_tenant_scoped() {
    let (app, state) = common::create_test_app();
    let token_a = common::auth_token(&state, 1);
    let token_b = common::auth_token(&state, 2);

    let athlete_a = common::seed_athlete(&app, &token_a, "Asha").await;
    let athlete_b = common::seed_athlete(&app, &token_b, "Bram").await;
    common::start_session(&app, &token_a, Some("2024-05-01")).await;
    common::start_session(&app, &token_b, Some("2024-05-01")).await;

    for (token, athlete_id) in [(&token_a, athlete_a), (&token_b, athlete_b)] {
        let response = common::send(
            &app,
            "POST",
            "/test",
            token,
            Some(json!({ "athlete_id": athlete_id, "result_data": {} })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = common::send(&app, "GET", "/test/session/2024-05-01", &token_a, None).await;
    let body = common::body_json(response).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["athlete_name"], "Asha");
}

#[tokio::test]
async fn deleting_a_result_is_owner_scoped() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);
    let other = common::auth_token(&state, 2);

    let athlete_id = common::seed_athlete(&app, &token, "Asha").await;
    common::start_session(&app, &token, Some("2024-05-01")).await;

    let response = common::send(
        &app,
        "POST",
        "/test",
        &token,
        Some(json!({ "athlete_id": athlete_id, "result_data": {} })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = common::send(&app, "GET", &format!("/test/athlete/{athlete_id}"), &token, None).await;
    let result_id = common::body_json(response).await["results"][0]["id"]
        .as_i64()
        .unwrap();

    // A different tenant cannot delete it
    let response = common::send(&app, "DELETE", &format!("/test/{result_id}"), &other, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner can
    let response = common::send(&app, "DELETE", &format!("/test/{result_id}"), &token, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = common::send(&app, "GET", &format!("/test/athlete/{athlete_id}"), &token, None).await;
    let body = common::body_json(response).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn results_from_an_undated_session_have_no_date() {
    let (app, state) = common::create_test_app();
    let token = common::auth_token(&state, 1);

    let athlete_id = common::seed_athlete(&app, &token, "Asha").await;
    common::start_session(&app, &token, None).await;

    let response = common::send(
        &app,
        "POST",
        "/test",
        &token,
        Some(json!({ "athlete_id": athlete_id, "result_data": {} })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = common::send(&app, "GET", &format!("/test/athlete/{athlete_id}"), &token, None).await;
    let body = common::body_json(response).await;
    assert!(body["results"][0]["session_date"].is_null());
}
