use axum::http::{self, Request, StatusCode};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use mock_server::{app, app_with, store::Store};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- service ---

#[tokio::test]
async fn health_is_outside_api_prefix() {
    let resp = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");

    let resp = app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- customers ---

#[tokio::test]
async fn page_past_the_end_is_empty() {
    for uri in [
        "/api/customers?page=4294967295&limit=20",
        "/api/rentals?page=4294967295&limit=4294967295",
    ] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let body = body_json(resp).await;
        assert!(body["data"].as_array().unwrap().is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn list_customers_sorted_by_last_name() {
    let resp = app().oneshot(get("/api/customers")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["PATRICIA JOHNSON", "BARBARA JONES", "MARY SMITH", "LINDA WILLIAMS"]
    );
    assert_eq!(body["pagination"]["total"], 4);
}

#[tokio::test]
async fn list_customers_active_filter_and_paging() {
    let resp = app()
        .oneshot(get("/api/customers?active=true&limit=2&page=2"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_customers_requires_term() {
    let resp = app().oneshot(get("/api/customers/search/query")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["success"], false);

    let resp = app()
        .oneshot(get("/api/customers/search/query?q=smith"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["total"], 1);
}

#[tokio::test]
async fn get_customer_not_found() {
    let resp = app().oneshot(get("/api/customers/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "customer not found");
}

#[tokio::test]
async fn get_customer_bad_id_returns_400() {
    let resp = app().oneshot(get("/api/customers/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- rentals ---

#[tokio::test]
async fn create_rental_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/rentals",
            r#"{"customer_id":1,"inventory_id":3,"staff_id":1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["rental_id"], 7);
    assert_eq!(body["data"]["film_title"], "ACADEMY DINOSAUR");
    assert!(body["data"]["return_date"].is_null());
}

#[tokio::test]
async fn create_rental_missing_field_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/rentals", r#"{"customer_id":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rental_for_rented_copy_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/rentals",
            r#"{"customer_id":2,"inventory_id":4,"staff_id":1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "this DVD is already rented and has not been returned");
}

#[tokio::test]
async fn get_rental_not_found() {
    let resp = app().oneshot(get("/api/rentals/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_rentals_filters_by_status() {
    let resp = app().oneshot(get("/api/rentals?status=active")).await.unwrap();
    let body = body_json(resp).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["status"] == "active"));
}

#[tokio::test]
async fn return_twice_returns_400() {
    let resp = app().oneshot(empty_request("PUT", "/api/rentals/1/return")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_unknown_rental_returns_404() {
    let resp = app().oneshot(empty_request("DELETE", "/api/rentals/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- reports ---

#[tokio::test]
async fn customer_report_unknown_customer() {
    let resp = app()
        .oneshot(get("/api/reports/customer/999/rentals"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unreturned_report_honours_threshold() {
    let resp = app()
        .oneshot(get("/api/reports/unreturned?days_overdue=8"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["unreturned_dvds"][0]["urgency_status"], "overdue");
}

#[tokio::test]
async fn top_films_limit() {
    let resp = app().oneshot(get("/api/reports/top-films?limit=2")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["top_films"][0]["title"], "ACADEMY DINOSAUR");
}

#[tokio::test]
async fn staff_earnings_rejects_bad_date() {
    let resp = app()
        .oneshot(get("/api/reports/staff-earnings?start_date=yesterday"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn staff_earnings_store_filter() {
    let resp = app()
        .oneshot(get("/api/reports/staff-earnings?store_id=2"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["total_staff"], 1);
    assert_eq!(body["staff_earnings"][0]["staff_name"], "Jon Stephens");
    assert_eq!(body["filters"]["store_id"], "2");
}

#[tokio::test]
async fn empty_store_reports_are_empty() {
    let resp = app_with(Store::empty())
        .oneshot(get("/api/reports/staff-earnings"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["total_staff"], 0);
    assert!(body["statistics"]["highest_earnings"].is_null());
}

// --- full rental lifecycle ---

#[tokio::test]
async fn rental_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create on a copy that is on the shelf
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/rentals",
            r#"{"customer_id":4,"inventory_id":10,"staff_id":2}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["data"]["rental_id"].as_u64().unwrap();

    // the same copy cannot go out twice
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/rentals",
            r#"{"customer_id":1,"inventory_id":10,"staff_id":1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // detail shows an open rental
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/rentals/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = body_json(resp).await;
    assert_eq!(detail["data"]["inventory_id"], 10);
    assert!(detail["data"]["return_date"].is_null());

    // return charges the film's rate
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &format!("/api/rentals/{id}/return"), "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt = body_json(resp).await;
    assert_eq!(receipt["data"]["payment"]["amount"], 2.99);
    let returned: DateTime<Utc> =
        serde_json::from_value(receipt["data"]["return_date"].clone()).unwrap();
    assert!(returned <= Utc::now());

    // customer report now lists it as returned
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/reports/customer/4/rentals?status=returned"))
        .await
        .unwrap();
    let report = body_json(resp).await;
    assert_eq!(report["total"], 1);
    assert_eq!(report["statistics"]["total_spent"], 2.99);

    // cancel removes the rental
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/rentals/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!body_bytes(resp).await.is_empty());

    // get after cancel: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/rentals/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // and the payment went with it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/reports/customer/4/rentals"))
        .await
        .unwrap();
    let report = body_json(resp).await;
    assert_eq!(report["total"], 0);
    assert_eq!(report["statistics"]["total_spent"], 0.0);
}
