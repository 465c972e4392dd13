//! Read-side views over the store: listings, detail rows and the four
//! management reports, shaped the way the rental backend answers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::store::{Payment, Rental, Store, StoreError};

fn status_of(rental: &Rental) -> &'static str {
    if rental.is_open() {
        "active"
    } else {
        "returned"
    }
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn wants(filter: Option<&str>, rental: &Rental) -> bool {
    match filter {
        Some("active") => rental.is_open(),
        Some("returned") => !rental.is_open(),
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub active: Option<bool>,
    pub status: Option<String>,
}

impl PageQuery {
    fn window(&self) -> (u32, u32) {
        (self.page.unwrap_or(1).max(1), self.limit.unwrap_or(20).max(1))
    }
}

/// Rows before `page`; saturates instead of overflowing on absurd pages.
fn offset(page: u32, limit: u32) -> usize {
    (page as usize - 1).saturating_mul(limit as usize)
}

fn pagination(page: u32, limit: u32, total: usize) -> Value {
    json!({
        "page": page,
        "limit": limit,
        "total": total,
        "pages": total.div_ceil(limit as usize),
    })
}

#[derive(Serialize)]
struct CustomerRow {
    customer_id: u32,
    name: String,
    email: String,
    active: bool,
    create_date: DateTime<Utc>,
    address: String,
    city: String,
    country: String,
    total_rentals: usize,
    active_rentals: usize,
}

fn customer_row(store: &Store, customer: &crate::store::Customer) -> CustomerRow {
    let rentals: Vec<&Rental> = store
        .rentals
        .values()
        .filter(|r| r.customer_id == customer.customer_id)
        .collect();
    CustomerRow {
        customer_id: customer.customer_id,
        name: customer.name(),
        email: customer.email.clone(),
        active: customer.active,
        create_date: customer.create_date,
        address: customer.address.clone(),
        city: customer.city.clone(),
        country: customer.country.clone(),
        total_rentals: rentals.len(),
        active_rentals: rentals.iter().filter(|r| r.is_open()).count(),
    }
}

pub fn list_customers(store: &Store, query: &PageQuery) -> Value {
    let (page, limit) = query.window();
    let mut matching: Vec<_> = store
        .customers
        .iter()
        .filter(|c| query.active.is_none_or(|active| c.active == active))
        .collect();
    matching.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
    let total = matching.len();
    let rows: Vec<CustomerRow> = matching
        .into_iter()
        .skip(offset(page, limit))
        .take(limit as usize)
        .map(|c| customer_row(store, c))
        .collect();
    json!({ "success": true, "data": rows, "pagination": pagination(page, limit, total) })
}

pub fn get_customer(store: &Store, customer_id: u32) -> Result<Value, StoreError> {
    let customer = store
        .customer(customer_id)
        .ok_or_else(|| StoreError::NotFound("customer not found".to_string()))?;
    let rentals: Vec<&Rental> = store
        .rentals
        .values()
        .filter(|r| r.customer_id == customer_id)
        .collect();
    let total_spent: f64 = rentals.iter().map(|r| store.paid_for(r.rental_id)).sum();
    Ok(json!({
        "success": true,
        "data": {
            "customer_id": customer.customer_id,
            "first_name": customer.first_name,
            "last_name": customer.last_name,
            "email": customer.email,
            "active": customer.active,
            "create_date": customer.create_date,
            "address": customer.address,
            "phone": customer.phone,
            "city": customer.city,
            "country": customer.country,
            "store_id": customer.store_id,
            "total_rentals": rentals.len(),
            "active_rentals": rentals.iter().filter(|r| r.is_open()).count(),
            "total_spent": round2(total_spent),
        }
    }))
}

pub fn search_customers(store: &Store, term: Option<&str>) -> Result<Value, StoreError> {
    let term = term
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StoreError::BadRequest("search parameter \"q\" is required".to_string()))?;
    let needle = term.to_lowercase();
    let mut hits: Vec<_> = store
        .customers
        .iter()
        .filter(|c| {
            [&c.first_name, &c.last_name, &c.email]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect();
    hits.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
    let rows: Vec<CustomerRow> = hits.into_iter().take(50).map(|c| customer_row(store, c)).collect();
    let total = rows.len();
    Ok(json!({ "success": true, "query": term, "data": rows, "total": total }))
}

// ---------------------------------------------------------------------------
// Films
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AvailableRow {
    film_id: u32,
    title: String,
    description: String,
    rental_rate: f64,
    rating: String,
    category: String,
    available_copies: usize,
    inventory_ids: Vec<u32>,
}

pub fn available_films(store: &Store, limit: Option<u32>) -> Value {
    let mut films: Vec<_> = store.films.iter().collect();
    films.sort_by(|a, b| a.title.cmp(&b.title));
    let rows: Vec<AvailableRow> = films
        .into_iter()
        .filter_map(|film| {
            let inventory_ids: Vec<u32> = store
                .inventory
                .iter()
                .filter(|i| i.film_id == film.film_id && store.is_on_shelf(i.inventory_id))
                .map(|i| i.inventory_id)
                .collect();
            (!inventory_ids.is_empty()).then(|| AvailableRow {
                film_id: film.film_id,
                title: film.title.clone(),
                description: film.description.clone(),
                rental_rate: film.rental_rate,
                rating: film.rating.clone(),
                category: film.category.clone(),
                available_copies: inventory_ids.len(),
                inventory_ids,
            })
        })
        .take(limit.unwrap_or(50) as usize)
        .collect();
    let total = rows.len();
    json!({ "success": true, "data": rows, "total": total })
}

// ---------------------------------------------------------------------------
// Rentals
// ---------------------------------------------------------------------------

pub fn rental_summary(store: &Store, rental: &Rental) -> Value {
    json!({
        "rental_id": rental.rental_id,
        "rental_date": rental.rental_date,
        "return_date": rental.return_date,
        "customer_name": store.customer(rental.customer_id).map(|c| c.name()),
        "film_title": store.film_of(rental).map(|f| f.title.clone()),
        "staff_name": store.staff(rental.staff_id).map(|s| s.name()),
    })
}

pub fn list_rentals(store: &Store, query: &PageQuery) -> Value {
    let (page, limit) = query.window();
    let mut matching: Vec<&Rental> = store
        .rentals
        .values()
        .filter(|r| wants(query.status.as_deref(), r))
        .collect();
    matching.sort_by(|a, b| b.rental_date.cmp(&a.rental_date));
    let total = matching.len();
    let rows: Vec<Value> = matching
        .into_iter()
        .skip(offset(page, limit))
        .take(limit as usize)
        .map(|r| {
            let film = store.film_of(r);
            json!({
                "rental_id": r.rental_id,
                "rental_date": r.rental_date,
                "return_date": r.return_date,
                "customer_id": r.customer_id,
                "customer_name": store.customer(r.customer_id).map(|c| c.name()),
                "film_id": film.map(|f| f.film_id),
                "film_title": film.map(|f| f.title.clone()),
                "staff_id": r.staff_id,
                "staff_name": store.staff(r.staff_id).map(|s| s.name()),
                "status": status_of(r),
            })
        })
        .collect();
    json!({ "success": true, "data": rows, "pagination": pagination(page, limit, total) })
}

pub fn rental_detail(store: &Store, rental_id: u32) -> Result<Value, StoreError> {
    let rental = store
        .rentals
        .get(&rental_id)
        .ok_or_else(|| StoreError::NotFound("rental not found".to_string()))?;
    let customer = store.customer(rental.customer_id);
    let film = store.film_of(rental);
    Ok(json!({
        "success": true,
        "data": {
            "rental_id": rental.rental_id,
            "rental_date": rental.rental_date,
            "return_date": rental.return_date,
            "inventory_id": rental.inventory_id,
            "customer_id": rental.customer_id,
            "customer_name": customer.map(|c| c.name()),
            "customer_email": customer.map(|c| c.email.clone()),
            "film_id": film.map(|f| f.film_id),
            "film_title": film.map(|f| f.title.clone()),
            "film_description": film.map(|f| f.description.clone()),
            "rental_rate": film.map(|f| f.rental_rate),
            "staff_id": rental.staff_id,
            "staff_name": store.staff(rental.staff_id).map(|s| s.name()),
        }
    }))
}

pub fn return_receipt(rental: &Rental, payment: &Payment) -> Value {
    json!({
        "success": true,
        "message": "DVD returned",
        "data": {
            "rental_id": rental.rental_id,
            "return_date": rental.return_date,
            "payment": payment,
        }
    })
}

// ---------------------------------------------------------------------------
// Report: rentals of one customer
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CustomerRentalsParams {
    pub status: Option<String>,
    pub sort: Option<String>,
}

pub fn customer_rentals(
    store: &Store,
    customer_id: u32,
    params: &CustomerRentalsParams,
    now: DateTime<Utc>,
) -> Result<Value, StoreError> {
    let customer = store
        .customer(customer_id)
        .ok_or_else(|| StoreError::NotFound("customer not found".to_string()))?;
    let all: Vec<&Rental> = store
        .rentals
        .values()
        .filter(|r| r.customer_id == customer_id)
        .collect();

    let mut selected: Vec<&Rental> = all
        .iter()
        .copied()
        .filter(|r| wants(params.status.as_deref(), r))
        .collect();
    if params.sort.as_deref() == Some("asc") {
        selected.sort_by(|a, b| a.rental_date.cmp(&b.rental_date));
    } else {
        selected.sort_by(|a, b| b.rental_date.cmp(&a.rental_date));
    }

    let rows: Vec<Value> = selected
        .iter()
        .map(|r| {
            let film = store.film_of(r);
            let payment = store.payments_for(r.rental_id).next();
            json!({
                "rental_id": r.rental_id,
                "rental_date": r.rental_date,
                "return_date": r.return_date,
                "inventory_id": r.inventory_id,
                "film_id": film.map(|f| f.film_id),
                "film_title": film.map(|f| f.title.clone()),
                "rental_rate": film.map(|f| f.rental_rate),
                "category": film.map(|f| f.category.clone()),
                "staff_name": store.staff(r.staff_id).map(|s| s.name()),
                "store_id": store.item(r.inventory_id).map(|i| i.store_id),
                "payment_amount": payment.map(|p| p.amount),
                "payment_date": payment.map(|p| p.payment_date),
                "status": status_of(r),
                "rental_days": days_between(r.rental_date, r.return_date.unwrap_or(now)),
            })
        })
        .collect();

    let active = all.iter().filter(|r| r.is_open()).count();
    let total_spent: f64 = all.iter().map(|r| store.paid_for(r.rental_id)).sum();
    let total = rows.len();
    Ok(json!({
        "success": true,
        "customer": {
            "customer_id": customer.customer_id,
            "name": customer.name(),
            "email": customer.email,
            "active": customer.active,
        },
        "statistics": {
            "total_rentals": all.len(),
            "active_rentals": active,
            "returned_rentals": all.len() - active,
            "total_spent": round2(total_spent),
        },
        "rentals": rows,
        "total": total,
    }))
}

// ---------------------------------------------------------------------------
// Report: unreturned DVDs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct UnreturnedParams {
    pub days_overdue: Option<i64>,
    pub sort_by: Option<String>,
}

fn urgency(days: i64) -> &'static str {
    if days > 7 {
        "overdue"
    } else if days > 3 {
        "due_soon"
    } else {
        "normal"
    }
}

pub fn unreturned(store: &Store, params: &UnreturnedParams, now: DateTime<Utc>) -> Value {
    let open: Vec<(&Rental, i64)> = store
        .rentals
        .values()
        .filter(|r| r.is_open())
        .map(|r| (r, days_between(r.rental_date, now)))
        .collect();

    // Zero means "no filter", matching how the threshold is usually sent.
    let min_days = params.days_overdue.filter(|d| *d > 0);
    let mut rows: Vec<(String, i64, Value)> = open
        .iter()
        .filter(|(_, days)| min_days.is_none_or(|min| *days >= min))
        .map(|(r, days)| {
            let customer = store.customer(r.customer_id);
            let film = store.film_of(r);
            let customer_name = customer.map(|c| c.name()).unwrap_or_default();
            let row = json!({
                "rental_id": r.rental_id,
                "rental_date": r.rental_date,
                "days_overdue": days,
                "customer_id": r.customer_id,
                "customer_name": customer_name,
                "customer_email": customer.map(|c| c.email.clone()),
                "customer_phone": customer.map(|c| c.phone.clone()),
                "customer_address": customer.map(|c| format!("{}, {}, {}", c.address, c.city, c.country)),
                "film_id": film.map(|f| f.film_id),
                "film_title": film.map(|f| f.title.clone()),
                "rental_rate": film.map(|f| f.rental_rate),
                "category": film.map(|f| f.category.clone()),
                "staff_name": store.staff(r.staff_id).map(|s| s.name()),
                "store_id": store.item(r.inventory_id).map(|i| i.store_id),
                "urgency_status": urgency(*days),
            });
            (customer_name, *days, row)
        })
        .collect();
    if params.sort_by.as_deref() == Some("customer") {
        rows.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        rows.sort_by(|a, b| b.1.cmp(&a.1));
    }

    let days: Vec<f64> = open.iter().map(|(_, d)| *d as f64).collect();
    let rows: Vec<Value> = rows.into_iter().map(|(_, _, row)| row).collect();
    let total = rows.len();
    json!({
        "success": true,
        "statistics": {
            "total_unreturned": open.len(),
            "overdue": open.iter().filter(|(_, d)| *d > 7).count(),
            "near_overdue": open.iter().filter(|(_, d)| (4..=7).contains(d)).count(),
            "on_time": open.iter().filter(|(_, d)| *d <= 3).count(),
            "avg_days_out": average(&days).map(round2),
        },
        "unreturned_dvds": rows,
        "total": total,
    })
}

// ---------------------------------------------------------------------------
// Report: most rented films
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TopFilmsParams {
    pub limit: Option<usize>,
    pub category: Option<String>,
    pub min_rentals: Option<usize>,
}

pub fn top_films(store: &Store, params: &TopFilmsParams, now: DateTime<Utc>) -> Value {
    let mut per_film: BTreeMap<u32, Vec<&Rental>> = BTreeMap::new();
    for rental in store.rentals.values() {
        if let Some(film) = store.film_of(rental) {
            per_film.entry(film.film_id).or_default().push(rental);
        }
    }

    let mut rows: Vec<(usize, f64, Value)> = per_film
        .iter()
        .filter_map(|(film_id, rentals)| {
            let film = store.film(*film_id)?;
            if params.category.as_deref().is_some_and(|c| c != film.category) {
                return None;
            }
            if params.min_rentals.is_some_and(|min| rentals.len() < min) {
                return None;
            }
            let open = rentals.iter().filter(|r| r.is_open()).count();
            let revenue = round2(rentals.iter().map(|r| store.paid_for(r.rental_id)).sum());
            let days: Vec<f64> = rentals
                .iter()
                .map(|r| days_between(r.rental_date, r.return_date.unwrap_or(now)) as f64)
                .collect();
            let customers: BTreeSet<u32> = rentals.iter().map(|r| r.customer_id).collect();
            let row = json!({
                "film_id": film.film_id,
                "title": film.title,
                "description": film.description,
                "release_year": film.release_year,
                "rental_rate": film.rental_rate,
                "duration_minutes": film.length,
                "rating": film.rating,
                "category": film.category,
                "total_rentals": rentals.len(),
                "currently_rented": open,
                "returned_rentals": rentals.len() - open,
                "total_revenue": revenue,
                "avg_rental_days": average(&days).map(round2),
                "unique_customers": customers.len(),
            });
            Some((rentals.len(), revenue, row))
        })
        .collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.total_cmp(&a.1)));
    let rows: Vec<Value> = rows
        .into_iter()
        .take(params.limit.unwrap_or(10))
        .map(|(_, _, row)| row)
        .collect();

    let counts: Vec<f64> = per_film.values().map(|r| r.len() as f64).collect();
    let total = rows.len();
    json!({
        "success": true,
        "statistics": {
            "total_films": store.films.len(),
            "total_rentals": store.rentals.len(),
            "total_system_revenue": round2(store.payments.iter().map(|p| p.amount).sum()),
            "avg_rentals_per_film": average(&counts).map(round2),
        },
        "top_films": rows,
        "total": total,
    })
}

// ---------------------------------------------------------------------------
// Report: staff earnings
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct EarningsParams {
    pub staff_id: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub store_id: Option<u32>,
}

impl EarningsParams {
    /// Both bounds are whole days, inclusive.
    fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start_date.is_none_or(|start| day >= start) && self.end_date.is_none_or(|end| day <= end)
    }
}

fn label<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "all".to_string())
}

pub fn staff_earnings(store: &Store, params: &EarningsParams) -> Value {
    let mut rows: Vec<(f64, Value)> = store
        .staff
        .iter()
        .filter(|s| params.store_id.is_none_or(|id| s.store_id == id))
        .filter(|s| params.staff_id.is_none_or(|id| s.staff_id == id))
        .map(|s| {
            let rentals: Vec<&Rental> = store
                .rentals
                .values()
                .filter(|r| r.staff_id == s.staff_id && params.contains(r.rental_date))
                .collect();
            let payments: Vec<&Payment> = rentals
                .iter()
                .flat_map(|r| store.payments_for(r.rental_id))
                .filter(|p| params.contains(p.payment_date))
                .collect();
            let amounts: Vec<f64> = payments.iter().map(|p| p.amount).collect();
            let earnings = round2(amounts.iter().sum());
            let customers: BTreeSet<u32> = rentals.iter().map(|r| r.customer_id).collect();
            let open = rentals.iter().filter(|r| r.is_open()).count();
            let shop = store.shop(s.store_id);
            let row = json!({
                "staff_id": s.staff_id,
                "staff_name": s.name(),
                "staff_email": s.email,
                "active": s.active,
                "store_id": s.store_id,
                "store_location": shop.map(|shop| format!("{}, {}", shop.address, shop.city)),
                "total_rentals_processed": rentals.len(),
                "unique_customers_served": customers.len(),
                "total_earnings": earnings,
                "avg_payment": average(&amounts).map(round2),
                "first_transaction": payments.iter().map(|p| p.payment_date).min(),
                "last_transaction": payments.iter().map(|p| p.payment_date).max(),
                "active_rentals": open,
                "completed_rentals": rentals.len() - open,
                "earnings_per_rental": (!rentals.is_empty()).then(|| round2(earnings / rentals.len() as f64)),
            });
            (earnings, row)
        })
        .collect();
    rows.sort_by(|a, b| b.0.total_cmp(&a.0));

    let earnings: Vec<f64> = rows.iter().map(|(e, _)| *e).collect();
    let rows: Vec<Value> = rows.into_iter().map(|(_, row)| row).collect();
    let total_staff = rows.len();
    json!({
        "success": true,
        "statistics": {
            "total_system_earnings": (!earnings.is_empty()).then(|| round2(earnings.iter().sum())),
            "avg_earnings_per_staff": average(&earnings).map(round2),
            "highest_earnings": earnings.iter().copied().reduce(f64::max),
            "lowest_earnings": earnings.iter().copied().reduce(f64::min),
        },
        "staff_earnings": rows,
        "total_staff": total_staff,
        "filters": {
            "start_date": label(params.start_date),
            "end_date": label(params.end_date),
            "store_id": label(params.store_id),
        },
    })
}

// ---------------------------------------------------------------------------
// Report: system summary
// ---------------------------------------------------------------------------

pub fn summary(store: &Store) -> Value {
    let mut per_category: BTreeMap<&str, usize> = BTreeMap::new();
    for rental in store.rentals.values() {
        if let Some(film) = store.film_of(rental) {
            *per_category.entry(film.category.as_str()).or_default() += 1;
        }
    }
    let mut categories: Vec<(&str, usize)> = per_category.into_iter().collect();
    categories.sort_by(|a, b| b.1.cmp(&a.1));
    let top_categories: Vec<Value> = categories
        .into_iter()
        .take(5)
        .map(|(category, rentals)| json!({ "category": category, "rentals": rentals }))
        .collect();

    let mut recent: Vec<&Rental> = store.rentals.values().collect();
    recent.sort_by(|a, b| b.rental_date.cmp(&a.rental_date));
    let recent_activity: Vec<Value> = recent
        .into_iter()
        .take(10)
        .map(|r| {
            let title = store.film_of(r).map(|f| f.title.as_str()).unwrap_or_default();
            json!({
                "type": "rental",
                "date": r.rental_date,
                "description": format!("New rental: {title}"),
            })
        })
        .collect();

    let open = store.rentals.values().filter(|r| r.is_open()).count();
    json!({
        "success": true,
        "summary": {
            "active_customers": store.customers.iter().filter(|c| c.active).count(),
            "total_films": store.films.len(),
            "total_inventory": store.inventory.len(),
            "active_rentals": open,
            "completed_rentals": store.rentals.len() - open,
            "total_rentals": store.rentals.len(),
            "total_revenue": round2(store.payments.iter().map(|p| p.amount).sum()),
            "active_staff": store.staff.iter().filter(|s| s.active).count(),
            "total_stores": store.shops.len(),
        },
        "top_categories": top_categories,
        "recent_activity": recent_activity,
    })
}
