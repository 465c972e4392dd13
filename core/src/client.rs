//! Stateless HTTP request builder and response parser for the rental API.
//!
//! # Design
//! `RentalClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Query};
use crate::types::{
    AvailableFilm, Cancellation, CreateRental, Customer, CustomerDetail, CustomerQuery,
    CustomerRentalsQuery, CustomerRentalsReport, Envelope, ErrorBody, Health, RentalDetail,
    RentalQuery, RentalRow, RentalSummary, ReturnReceipt, StaffEarningsQuery,
    StaffEarningsReport, SystemSummary, TopFilmsQuery, TopFilmsReport, UnreturnedQuery,
    UnreturnedReport, DEFAULT_TOP_LIMIT,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Synchronous, stateless client for the rental API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct RentalClient {
    base_url: String,
}

impl Default for RentalClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl RentalClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: url,
            headers: Vec::new(),
            body: None,
        }
    }

    // --- customers ---

    pub fn build_list_customers(&self, query: &CustomerQuery) -> HttpRequest {
        let url = Query::new()
            .push("page", query.page)
            .push("limit", query.limit)
            .push("active", query.active)
            .append_to(format!("{}/customers", self.base_url));
        self.get(url)
    }

    pub fn build_get_customer(&self, customer_id: u32) -> HttpRequest {
        self.get(format!("{}/customers/{customer_id}", self.base_url))
    }

    pub fn build_search_customers(&self, term: &str) -> Result<HttpRequest, ApiError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ApiError::InvalidInput("search term is required".to_string()));
        }
        let url = Query::new()
            .push("q", Some(term))
            .append_to(format!("{}/customers/search/query", self.base_url));
        Ok(self.get(url))
    }

    pub fn parse_list_customers(&self, response: HttpResponse) -> Result<Vec<Customer>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_get_customer(&self, response: HttpResponse) -> Result<CustomerDetail, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_search_customers(&self, response: HttpResponse) -> Result<Vec<Customer>, ApiError> {
        parse_envelope(response)
    }

    // --- inventory ---

    pub fn build_available_inventory(&self, limit: Option<u32>) -> HttpRequest {
        let url = Query::new()
            .push("limit", limit)
            .append_to(format!("{}/films/available/list", self.base_url));
        self.get(url)
    }

    pub fn parse_available_inventory(&self, response: HttpResponse) -> Result<Vec<AvailableFilm>, ApiError> {
        parse_envelope(response)
    }

    // --- rentals ---

    pub fn build_create_rental(&self, input: &CreateRental) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/rentals", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_list_rentals(&self, query: &RentalQuery) -> HttpRequest {
        let url = Query::new()
            .push("page", query.page)
            .push("limit", query.limit)
            .push("status", query.status.map(|s| s.as_str()))
            .append_to(format!("{}/rentals", self.base_url));
        self.get(url)
    }

    pub fn build_get_rental(&self, rental_id: u32) -> HttpRequest {
        self.get(format!("{}/rentals/{rental_id}", self.base_url))
    }

    pub fn build_return_rental(&self, rental_id: u32) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/rentals/{rental_id}/return", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some("{}".to_string()),
        }
    }

    pub fn build_cancel_rental(&self, rental_id: u32) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/rentals/{rental_id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_create_rental(&self, response: HttpResponse) -> Result<RentalSummary, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_list_rentals(&self, response: HttpResponse) -> Result<Vec<RentalRow>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_get_rental(&self, response: HttpResponse) -> Result<RentalDetail, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_return_rental(&self, response: HttpResponse) -> Result<ReturnReceipt, ApiError> {
        parse_envelope(response)
    }

    /// An empty 2xx body is a successful cancel without a receipt.
    pub fn parse_cancel_rental(&self, response: HttpResponse) -> Result<Option<Cancellation>, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        let envelope: Envelope<Cancellation> = decode(&response.body)?;
        Ok(Some(envelope.data))
    }

    // --- reports ---

    pub fn build_customer_rentals(&self, customer_id: u32, query: &CustomerRentalsQuery) -> HttpRequest {
        let url = Query::new()
            .push("status", query.status.map(|s| s.as_str()))
            .push("sort", query.sort.map(|s| s.as_str()))
            .append_to(format!("{}/reports/customer/{customer_id}/rentals", self.base_url));
        self.get(url)
    }

    pub fn build_unreturned(&self, query: &UnreturnedQuery) -> HttpRequest {
        let url = Query::new()
            .push("days_overdue", query.days_overdue)
            .push("sort_by", query.sort_by.map(|s| s.as_str()))
            .append_to(format!("{}/reports/unreturned", self.base_url));
        self.get(url)
    }

    pub fn build_top_films(&self, query: &TopFilmsQuery) -> HttpRequest {
        let url = Query::new()
            .push("limit", Some(query.limit.unwrap_or(DEFAULT_TOP_LIMIT)))
            .push("category", query.category.as_deref().filter(|c| !c.is_empty()))
            .push("min_rentals", query.min_rentals)
            .append_to(format!("{}/reports/top-films", self.base_url));
        self.get(url)
    }

    pub fn build_staff_earnings(&self, query: &StaffEarningsQuery) -> HttpRequest {
        let url = Query::new()
            .push("staff_id", query.staff_id)
            .push("start_date", query.start_date.map(|d| d.format("%Y-%m-%d")))
            .push("end_date", query.end_date.map(|d| d.format("%Y-%m-%d")))
            .push("store_id", query.store_id)
            .append_to(format!("{}/reports/staff-earnings", self.base_url));
        self.get(url)
    }

    pub fn build_summary(&self) -> HttpRequest {
        self.get(format!("{}/reports/summary", self.base_url))
    }

    pub fn parse_customer_rentals(&self, response: HttpResponse) -> Result<CustomerRentalsReport, ApiError> {
        parse_body(response)
    }

    pub fn parse_unreturned(&self, response: HttpResponse) -> Result<UnreturnedReport, ApiError> {
        parse_body(response)
    }

    pub fn parse_top_films(&self, response: HttpResponse) -> Result<TopFilmsReport, ApiError> {
        parse_body(response)
    }

    pub fn parse_staff_earnings(&self, response: HttpResponse) -> Result<StaffEarningsReport, ApiError> {
        parse_body(response)
    }

    pub fn parse_summary(&self, response: HttpResponse) -> Result<SystemSummary, ApiError> {
        parse_body(response)
    }

    // --- service ---

    /// `/health` lives at the server root, outside the `/api` prefix.
    pub fn build_health(&self) -> HttpRequest {
        let root = self.base_url.strip_suffix("/api").unwrap_or(&self.base_url);
        self.get(format!("{root}/health"))
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<Health, ApiError> {
        parse_body(response)
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant, carrying
/// the backend's own message when it sent one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = error_message(&response.body);
    if response.status == 404 {
        return Err(ApiError::NotFound { message });
    }
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            error: Some(detail),
        }) => format!("{message} ({detail})"),
        Ok(ErrorBody {
            message: Some(message),
            error: None,
        }) => message,
        _ => body.trim().to_string(),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn parse_body<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    decode(&response.body)
}

fn parse_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let envelope: Envelope<T> = parse_body(response)?;
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RentalStatus, SortOrder, UnreturnedSort};
    use chrono::NaiveDate;

    fn client() -> RentalClient {
        RentalClient::new("http://localhost:3000/api")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn parse_customer_rentals_with_backend_labels() {
        let report = client()
            .parse_customer_rentals(response(
                200,
                r#"{"success":true,
                    "customer":{"customer_id":1,"name":"MARY SMITH","email":"MARY.SMITH@sakilacustomer.org","active":true},
                    "statistics":{"total_rentals":"2","active_rentals":"1","returned_rentals":"1","total_spent":"2.99"},
                    "rentals":[
                      {"rental_id":14825,"rental_date":"2005-08-22T01:27:57.000Z","return_date":null,
                       "inventory_id":1,"film_id":1,"film_title":"ACADEMY DINOSAUR","rental_rate":"0.99",
                       "category":"Documentary","staff_name":"Mike Hillyer","store_id":1,
                       "payment_amount":null,"payment_date":null,"status":"Activa","rental_days":"5"},
                      {"rental_id":76,"rental_date":"2005-05-25T11:30:37.000Z","return_date":"2005-06-03T12:00:37.000Z",
                       "inventory_id":3021,"film_id":663,"film_title":"PATIENT SISTER","rental_rate":"2.99",
                       "category":"Classics","staff_name":"Jon Stephens","store_id":2,
                       "payment_amount":"2.99","payment_date":"2005-05-25T11:30:37.000Z","status":"Devuelta","rental_days":"9"}
                    ],
                    "total":2}"#,
            ))
            .unwrap();
        let statuses: Vec<RentalStatus> = report.rentals.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![RentalStatus::Active, RentalStatus::Returned]);
        assert_eq!(report.rentals[1].payment_amount, Some(2.99));
    }

    #[test]
    fn build_list_customers_without_filters() {
        let req = client().build_list_customers(&CustomerQuery::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/customers");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_list_customers_with_paging() {
        let req = client().build_list_customers(&CustomerQuery {
            page: Some(2),
            limit: Some(50),
            active: Some(true),
        });
        assert_eq!(req.path, "http://localhost:3000/api/customers?page=2&limit=50&active=true");
    }

    #[test]
    fn build_search_customers_rejects_blank_term() {
        let err = client().build_search_customers("   ").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn build_search_customers_encodes_term() {
        let req = client().build_search_customers("o'neil smith").unwrap();
        assert_eq!(
            req.path,
            "http://localhost:3000/api/customers/search/query?q=o%27neil+smith"
        );
    }

    #[test]
    fn build_available_inventory_path() {
        let req = client().build_available_inventory(None);
        assert_eq!(req.path, "http://localhost:3000/api/films/available/list");
        let req = client().build_available_inventory(Some(5));
        assert_eq!(req.path, "http://localhost:3000/api/films/available/list?limit=5");
    }

    #[test]
    fn build_create_rental_produces_json_post() {
        let req = client()
            .build_create_rental(&CreateRental {
                customer_id: 1,
                inventory_id: 367,
                staff_id: 2,
            })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/rentals");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["customer_id"], 1);
        assert_eq!(body["inventory_id"], 367);
        assert_eq!(body["staff_id"], 2);
    }

    #[test]
    fn build_return_rental_is_put_with_empty_object() {
        let req = client().build_return_rental(12);
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/rentals/12/return");
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn build_cancel_rental_is_delete() {
        let req = client().build_cancel_rental(12);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/rentals/12");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_rentals_with_status() {
        let req = client().build_list_rentals(&RentalQuery {
            status: Some(RentalStatus::Active),
            ..Default::default()
        });
        assert_eq!(req.path, "http://localhost:3000/api/rentals?status=active");
    }

    #[test]
    fn build_customer_rentals_with_filters() {
        let req = client().build_customer_rentals(
            9,
            &CustomerRentalsQuery {
                status: Some(RentalStatus::Returned),
                sort: Some(SortOrder::Asc),
            },
        );
        assert_eq!(
            req.path,
            "http://localhost:3000/api/reports/customer/9/rentals?status=returned&sort=asc"
        );
    }

    #[test]
    fn build_unreturned_omits_unset_days() {
        let req = client().build_unreturned(&UnreturnedQuery::default());
        assert_eq!(req.path, "http://localhost:3000/api/reports/unreturned");
        let req = client().build_unreturned(&UnreturnedQuery {
            days_overdue: Some(0),
            sort_by: Some(UnreturnedSort::Customer),
        });
        assert_eq!(
            req.path,
            "http://localhost:3000/api/reports/unreturned?days_overdue=0&sort_by=customer"
        );
    }

    #[test]
    fn build_top_films_defaults_limit_to_ten() {
        let req = client().build_top_films(&TopFilmsQuery::default());
        assert_eq!(req.path, "http://localhost:3000/api/reports/top-films?limit=10");
    }

    #[test]
    fn build_top_films_skips_empty_category() {
        let req = client().build_top_films(&TopFilmsQuery {
            limit: Some(3),
            category: Some(String::new()),
            min_rentals: Some(2),
        });
        assert_eq!(
            req.path,
            "http://localhost:3000/api/reports/top-films?limit=3&min_rentals=2"
        );
    }

    #[test]
    fn build_staff_earnings_formats_dates() {
        let req = client().build_staff_earnings(&StaffEarningsQuery {
            staff_id: Some(1),
            start_date: NaiveDate::from_ymd_opt(2005, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2005, 5, 31),
            store_id: None,
        });
        assert_eq!(
            req.path,
            "http://localhost:3000/api/reports/staff-earnings?staff_id=1&start_date=2005-05-01&end_date=2005-05-31"
        );
    }

    #[test]
    fn build_health_leaves_api_prefix() {
        assert_eq!(client().build_health().path, "http://localhost:3000/health");
        let bare = RentalClient::new("http://example.test:8080");
        assert_eq!(bare.build_health().path, "http://example.test:8080/health");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = RentalClient::new("http://localhost:3000/api/");
        let req = client.build_get_rental(1);
        assert_eq!(req.path, "http://localhost:3000/api/rentals/1");
    }

    #[test]
    fn parse_create_rental_accepts_201() {
        let resp = response(
            201,
            r#"{"success":true,"message":"rental created","data":{"rental_id":16050,
                "rental_date":"2024-05-01T10:00:00.000Z","return_date":null,
                "customer_name":"MARY SMITH","film_title":"ACADEMY DINOSAUR","staff_name":"MIKE HILLYER"}}"#,
        );
        let summary = client().parse_create_rental(resp).unwrap();
        assert_eq!(summary.rental_id, 16050);
        assert_eq!(summary.film_title, "ACADEMY DINOSAUR");
    }

    #[test]
    fn parse_create_rental_surfaces_backend_message() {
        let resp = response(
            400,
            r#"{"success":false,"message":"inventory item is already rented"}"#,
        );
        let err = client().parse_create_rental(resp).unwrap_err();
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "inventory item is already rented");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_get_rental_not_found() {
        let resp = response(404, r#"{"success":false,"message":"rental not found"}"#);
        let err = client().parse_get_rental(resp).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { ref message } if message == "rental not found"));
    }

    #[test]
    fn parse_error_with_detail_and_plain_body() {
        let resp = response(
            500,
            r#"{"success":false,"message":"could not load report","error":"connection reset"}"#,
        );
        let err = client().parse_summary(resp).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: could not load report (connection reset)");

        let err = client().parse_summary(response(502, "Bad Gateway\n")).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn parse_cancel_rental_tolerates_empty_body() {
        assert_eq!(client().parse_cancel_rental(response(204, "")).unwrap(), None);
        let cancelled = client()
            .parse_cancel_rental(response(
                200,
                r#"{"success":true,"data":{"rental_id":3,"cancelled_at":"2024-05-01T10:00:00Z"}}"#,
            ))
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.rental_id, 3);
    }

    #[test]
    fn parse_list_customers_bad_json() {
        let err = client().parse_list_customers(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_health_ok() {
        let health = client().parse_health(response(200, r#"{"status":"ok"}"#)).unwrap();
        assert_eq!(health.status, "ok");
    }
}
