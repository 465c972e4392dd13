//! Domain DTOs for the rental API.
//!
//! # Design
//! These types mirror the backend's JSON but are defined independently of the
//! mock-server crate; integration tests catch any schema drift. Aggregates
//! that the backend computes in SQL go through the lenient decoders in
//! [`crate::de`]. Optional columns default to `None` so a thinner backend
//! response still parses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::de;

/// Success envelope wrapping most non-report responses.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

fn default_true() -> bool {
    true
}

/// Body of a failed request. Both fields are optional because proxies and
/// framework rejections answer with arbitrary bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The production backend labels rows in Spanish; both spellings decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    #[serde(alias = "Activa")]
    Active,
    #[serde(alias = "Devuelta")]
    Returned,
}

impl RentalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RentalStatus::Active => "active",
            RentalStatus::Returned => "returned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub customer_id: u32,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::opt_flag")]
    pub active: Option<bool>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub total_rentals: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub active_rentals: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerDetail {
    pub customer_id: u32,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::opt_flag")]
    pub active: Option<bool>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub store_id: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub total_rentals: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub active_rentals: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub total_spent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A film with at least one copy on the shelf.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AvailableFilm {
    pub film_id: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub rental_rate: f64,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub available_copies: i64,
    /// Inventory items of this film that can be rented right now.
    #[serde(default)]
    pub inventory_ids: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Rentals
// ---------------------------------------------------------------------------

/// Request payload for creating a rental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRental {
    pub customer_id: u32,
    pub inventory_id: u32,
    pub staff_id: u32,
}

/// Returned by a successful create.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RentalSummary {
    pub rental_id: u32,
    pub rental_date: DateTime<Utc>,
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
    pub customer_name: String,
    pub film_title: String,
    pub staff_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RentalRow {
    pub rental_id: u32,
    pub rental_date: DateTime<Utc>,
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
    pub customer_id: u32,
    pub customer_name: String,
    pub film_id: u32,
    pub film_title: String,
    pub staff_id: u32,
    pub staff_name: String,
    pub status: RentalStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RentalDetail {
    pub rental_id: u32,
    pub rental_date: DateTime<Utc>,
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
    pub inventory_id: u32,
    pub customer_id: u32,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub film_id: u32,
    pub film_title: String,
    #[serde(default)]
    pub film_description: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub rental_rate: f64,
    pub staff_id: u32,
    pub staff_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RentalQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<RentalStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub payment_id: Option<u32>,
    pub customer_id: u32,
    pub staff_id: u32,
    pub rental_id: u32,
    #[serde(deserialize_with = "de::number")]
    pub amount: f64,
    pub payment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReturnReceipt {
    pub rental_id: u32,
    pub return_date: DateTime<Utc>,
    #[serde(default)]
    pub payment: Option<Payment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cancellation {
    pub rental_id: u32,
    pub cancelled_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Report: rentals of one customer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerRentalsQuery {
    pub status: Option<RentalStatus>,
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRef {
    pub customer_id: u32,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::opt_flag")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRentalStats {
    #[serde(deserialize_with = "de::number")]
    pub total_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub active_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub returned_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRental {
    pub rental_id: u32,
    pub rental_date: DateTime<Utc>,
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inventory_id: Option<u32>,
    pub film_id: u32,
    pub film_title: String,
    #[serde(deserialize_with = "de::number")]
    pub rental_rate: f64,
    #[serde(default)]
    pub category: Option<String>,
    pub staff_name: String,
    #[serde(default)]
    pub store_id: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub payment_amount: Option<f64>,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    pub status: RentalStatus,
    #[serde(deserialize_with = "de::number")]
    pub rental_days: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRentalsReport {
    pub customer: CustomerRef,
    pub statistics: CustomerRentalStats,
    pub rentals: Vec<CustomerRental>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Report: unreturned DVDs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnreturnedSort {
    Days,
    Customer,
}

impl UnreturnedSort {
    pub fn as_str(self) -> &'static str {
        match self {
            UnreturnedSort::Days => "days",
            UnreturnedSort::Customer => "customer",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnreturnedQuery {
    /// Only rentals out for at least this many days.
    pub days_overdue: Option<u32>,
    pub sort_by: Option<UnreturnedSort>,
}

/// How late an open rental is: over 7 days is overdue, over 3 is due soon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[serde(alias = "Atrasado")]
    Overdue,
    #[serde(alias = "Próximo a vencer")]
    DueSoon,
    #[serde(alias = "Normal")]
    Normal,
}

impl Urgency {
    pub fn for_days(days: i64) -> Self {
        if days > 7 {
            Urgency::Overdue
        } else if days > 3 {
            Urgency::DueSoon
        } else {
            Urgency::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::DueSoon => "due soon",
            Urgency::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnreturnedStats {
    #[serde(deserialize_with = "de::number")]
    pub total_unreturned: i64,
    #[serde(deserialize_with = "de::number")]
    pub overdue: i64,
    #[serde(deserialize_with = "de::number")]
    pub near_overdue: i64,
    #[serde(deserialize_with = "de::number")]
    pub on_time: i64,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub avg_days_out: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnreturnedRental {
    pub rental_id: u32,
    pub rental_date: DateTime<Utc>,
    #[serde(deserialize_with = "de::number")]
    pub days_overdue: i64,
    pub customer_id: u32,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub film_id: u32,
    pub film_title: String,
    #[serde(deserialize_with = "de::number")]
    pub rental_rate: f64,
    #[serde(default)]
    pub category: Option<String>,
    pub staff_name: String,
    #[serde(default)]
    pub store_id: Option<u32>,
    pub urgency_status: Urgency,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnreturnedReport {
    pub statistics: UnreturnedStats,
    pub unreturned_dvds: Vec<UnreturnedRental>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Report: most rented films
// ---------------------------------------------------------------------------

pub const DEFAULT_TOP_LIMIT: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopFilmsQuery {
    /// Defaults to [`DEFAULT_TOP_LIMIT`] when unset.
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub min_rentals: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopFilmsStats {
    #[serde(deserialize_with = "de::number")]
    pub total_films: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_system_revenue: f64,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub avg_rentals_per_film: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopFilm {
    pub film_id: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(deserialize_with = "de::number")]
    pub rental_rate: f64,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub total_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub currently_rented: i64,
    #[serde(deserialize_with = "de::number")]
    pub returned_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_revenue: f64,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub avg_rental_days: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub unique_customers: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopFilmsReport {
    pub statistics: TopFilmsStats,
    pub top_films: Vec<TopFilm>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Report: staff earnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffEarningsQuery {
    pub staff_id: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub store_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EarningsStats {
    #[serde(default, deserialize_with = "de::opt_number")]
    pub total_system_earnings: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub avg_earnings_per_staff: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub highest_earnings: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub lowest_earnings: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaffEarnings {
    pub staff_id: u32,
    pub staff_name: String,
    #[serde(default)]
    pub staff_email: Option<String>,
    #[serde(default, deserialize_with = "de::opt_flag")]
    pub active: Option<bool>,
    #[serde(default)]
    pub store_id: Option<u32>,
    #[serde(default)]
    pub store_location: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub total_rentals_processed: i64,
    #[serde(deserialize_with = "de::number")]
    pub unique_customers_served: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_earnings: f64,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub avg_payment: Option<f64>,
    #[serde(default)]
    pub first_transaction: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_transaction: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de::number")]
    pub active_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub completed_rentals: i64,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub earnings_per_rental: Option<f64>,
}

/// Echo of the filters the server applied; unset ones read `"all"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EarningsFilters {
    pub start_date: String,
    pub end_date: String,
    pub store_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaffEarningsReport {
    pub statistics: EarningsStats,
    pub staff_earnings: Vec<StaffEarnings>,
    pub total_staff: usize,
    #[serde(default)]
    pub filters: Option<EarningsFilters>,
}

// ---------------------------------------------------------------------------
// Report: system summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryCounts {
    #[serde(deserialize_with = "de::number")]
    pub active_customers: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_films: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_inventory: i64,
    #[serde(deserialize_with = "de::number")]
    pub active_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub completed_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_rentals: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_revenue: f64,
    #[serde(deserialize_with = "de::number")]
    pub active_staff: i64,
    #[serde(deserialize_with = "de::number")]
    pub total_stores: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    #[serde(deserialize_with = "de::number")]
    pub rentals: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SystemSummary {
    pub summary: SummaryCounts,
    pub top_categories: Vec<CategoryCount>,
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
}
