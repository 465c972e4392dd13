//! In-memory rental database and the rules that guard it.
//!
//! Every mutation takes `now` explicitly so tests can pin the clock.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = json!({ "success": false, "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Clone, Debug)]
pub struct Shop {
    pub store_id: u32,
    pub address: String,
    pub city: String,
}

#[derive(Clone, Debug)]
pub struct Staff {
    pub staff_id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub store_id: u32,
    pub active: bool,
}

impl Staff {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug)]
pub struct Customer {
    pub customer_id: u32,
    pub store_id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub active: bool,
    pub create_date: DateTime<Utc>,
}

impl Customer {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug)]
pub struct Film {
    pub film_id: u32,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub rental_rate: f64,
    pub length: u32,
    pub rating: String,
    pub category: String,
}

#[derive(Clone, Debug)]
pub struct InventoryItem {
    pub inventory_id: u32,
    pub film_id: u32,
    pub store_id: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rental {
    pub rental_id: u32,
    pub rental_date: DateTime<Utc>,
    pub inventory_id: u32,
    pub customer_id: u32,
    pub staff_id: u32,
    pub return_date: Option<DateTime<Utc>>,
}

impl Rental {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Payment {
    pub payment_id: u32,
    pub customer_id: u32,
    pub staff_id: u32,
    pub rental_id: u32,
    pub amount: f64,
    pub payment_date: DateTime<Utc>,
}

/// Fields arrive optional so a missing one is a 400 with a message, not a
/// framework rejection.
#[derive(Debug, Default, Deserialize)]
pub struct NewRental {
    pub customer_id: Option<u32>,
    pub inventory_id: Option<u32>,
    pub staff_id: Option<u32>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub shops: Vec<Shop>,
    pub staff: Vec<Staff>,
    pub customers: Vec<Customer>,
    pub films: Vec<Film>,
    pub inventory: Vec<InventoryItem>,
    pub rentals: BTreeMap<u32, Rental>,
    pub payments: Vec<Payment>,
    next_rental_id: u32,
    next_payment_id: u32,
}

impl Store {
    pub fn empty() -> Self {
        Self {
            next_rental_id: 1,
            next_payment_id: 1,
            ..Default::default()
        }
    }

    pub fn staff(&self, staff_id: u32) -> Option<&Staff> {
        self.staff.iter().find(|s| s.staff_id == staff_id)
    }

    pub fn customer(&self, customer_id: u32) -> Option<&Customer> {
        self.customers.iter().find(|c| c.customer_id == customer_id)
    }

    pub fn film(&self, film_id: u32) -> Option<&Film> {
        self.films.iter().find(|f| f.film_id == film_id)
    }

    pub fn item(&self, inventory_id: u32) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.inventory_id == inventory_id)
    }

    pub fn shop(&self, store_id: u32) -> Option<&Shop> {
        self.shops.iter().find(|s| s.store_id == store_id)
    }

    /// Film behind a rental's inventory item.
    pub fn film_of(&self, rental: &Rental) -> Option<&Film> {
        self.item(rental.inventory_id).and_then(|i| self.film(i.film_id))
    }

    pub fn payments_for(&self, rental_id: u32) -> impl Iterator<Item = &Payment> {
        self.payments.iter().filter(move |p| p.rental_id == rental_id)
    }

    pub fn paid_for(&self, rental_id: u32) -> f64 {
        self.payments_for(rental_id).map(|p| p.amount).sum()
    }

    pub fn is_on_shelf(&self, inventory_id: u32) -> bool {
        !self
            .rentals
            .values()
            .any(|r| r.inventory_id == inventory_id && r.is_open())
    }

    pub fn create_rental(&mut self, input: NewRental, now: DateTime<Utc>) -> Result<Rental, StoreError> {
        let (Some(customer_id), Some(inventory_id), Some(staff_id)) =
            (input.customer_id, input.inventory_id, input.staff_id)
        else {
            return Err(StoreError::BadRequest(
                "missing required fields: customer_id, inventory_id, staff_id".to_string(),
            ));
        };
        if self.customer(customer_id).is_none() {
            return Err(StoreError::NotFound(format!("customer {customer_id} not found")));
        }
        if self.item(inventory_id).is_none() {
            return Err(StoreError::NotFound(format!("inventory item {inventory_id} not found")));
        }
        if self.staff(staff_id).is_none() {
            return Err(StoreError::NotFound(format!("staff member {staff_id} not found")));
        }
        if !self.is_on_shelf(inventory_id) {
            return Err(StoreError::BadRequest(
                "this DVD is already rented and has not been returned".to_string(),
            ));
        }
        let rental = Rental {
            rental_id: self.next_rental_id,
            rental_date: now,
            inventory_id,
            customer_id,
            staff_id,
            return_date: None,
        };
        self.next_rental_id += 1;
        self.rentals.insert(rental.rental_id, rental.clone());
        Ok(rental)
    }

    /// Close an open rental and charge the film's rate.
    pub fn return_rental(&mut self, rental_id: u32, now: DateTime<Utc>) -> Result<(Rental, Payment), StoreError> {
        let rental = self
            .rentals
            .get(&rental_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("rental not found".to_string()))?;
        if let Some(returned) = rental.return_date {
            return Err(StoreError::BadRequest(format!(
                "this DVD was already returned on {}",
                returned.to_rfc3339()
            )));
        }
        let amount = self.film_of(&rental).map(|f| f.rental_rate).unwrap_or_default();
        let payment = Payment {
            payment_id: self.next_payment_id,
            customer_id: rental.customer_id,
            staff_id: rental.staff_id,
            rental_id,
            amount,
            payment_date: now,
        };
        self.next_payment_id += 1;
        self.payments.push(payment.clone());
        let stored = self
            .rentals
            .get_mut(&rental_id)
            .ok_or_else(|| StoreError::NotFound("rental not found".to_string()))?;
        stored.return_date = Some(now);
        Ok((stored.clone(), payment))
    }

    /// Drop a rental together with its payments.
    pub fn cancel_rental(&mut self, rental_id: u32) -> Result<Rental, StoreError> {
        let rental = self
            .rentals
            .remove(&rental_id)
            .ok_or_else(|| StoreError::NotFound("rental not found".to_string()))?;
        self.payments.retain(|p| p.rental_id != rental_id);
        Ok(rental)
    }

    /// Two stores, two clerks, a handful of customers and films, and a mix
    /// of open and returned rentals dated relative to `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut store = Store::empty();
        store.shops = vec![
            Shop {
                store_id: 1,
                address: "47 MySakila Drive".to_string(),
                city: "Lethbridge".to_string(),
            },
            Shop {
                store_id: 2,
                address: "28 MySQL Boulevard".to_string(),
                city: "Woodridge".to_string(),
            },
        ];
        store.staff = vec![
            staff(1, "Mike", "Hillyer", 1),
            staff(2, "Jon", "Stephens", 2),
        ];
        let opened = now - Duration::days(400);
        store.customers = vec![
            customer(1, 1, "Mary", "Smith", "1913 Hanoi Way", "Sasebo", "Japan", true, opened),
            customer(2, 1, "Patricia", "Johnson", "1121 Loja Avenue", "San Bernardino", "United States", true, opened),
            customer(3, 2, "Linda", "Williams", "692 Joliet Street", "Athenai", "Greece", true, opened),
            customer(4, 2, "Barbara", "Jones", "1566 Inegl Manor", "Myingyan", "Myanmar", false, opened),
        ];
        store.films = vec![
            film(1, "ACADEMY DINOSAUR", "Documentary", 0.99, 86, "PG"),
            film(2, "ACE GOLDFINGER", "Horror", 4.99, 48, "G"),
            film(3, "ADAPTATION HOLES", "Documentary", 2.99, 50, "NC-17"),
            film(4, "AFFAIR PREJUDICE", "Horror", 2.99, 117, "G"),
            film(5, "AGENT TRUMAN", "Foreign", 2.99, 169, "PG"),
        ];
        store.inventory = [
            (1, 1, 1),
            (2, 1, 1),
            (3, 1, 2),
            (4, 2, 2),
            (5, 3, 2),
            (6, 3, 2),
            (7, 4, 1),
            (8, 4, 2),
            (9, 5, 1),
            (10, 5, 1),
        ]
        .into_iter()
        .map(|(inventory_id, film_id, store_id)| InventoryItem {
            inventory_id,
            film_id,
            store_id,
        })
        .collect();

        // (inventory, customer, staff, days ago rented, days ago returned)
        let history: [(u32, u32, u32, i64, Option<i64>); 6] = [
            (1, 1, 1, 20, Some(15)),
            (4, 1, 2, 10, None),
            (5, 2, 1, 5, None),
            (2, 3, 2, 30, Some(25)),
            (7, 2, 1, 1, None),
            (9, 3, 1, 12, Some(9)),
        ];
        for (inventory_id, customer_id, staff_id, rented, returned) in history {
            let rental_id = store.next_rental_id;
            store.next_rental_id += 1;
            let rental = Rental {
                rental_id,
                rental_date: now - Duration::days(rented),
                inventory_id,
                customer_id,
                staff_id,
                return_date: returned.map(|d| now - Duration::days(d)),
            };
            if let Some(return_date) = rental.return_date {
                let amount = store.film_of(&rental).map(|f| f.rental_rate).unwrap_or_default();
                store.payments.push(Payment {
                    payment_id: store.next_payment_id,
                    customer_id,
                    staff_id,
                    rental_id,
                    amount,
                    payment_date: return_date,
                });
                store.next_payment_id += 1;
            }
            store.rentals.insert(rental_id, rental);
        }
        store
    }
}

fn staff(staff_id: u32, first: &str, last: &str, store_id: u32) -> Staff {
    Staff {
        staff_id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@sakilastaff.com", first, last),
        store_id,
        active: true,
    }
}

#[allow(clippy::too_many_arguments)]
fn customer(
    customer_id: u32,
    store_id: u32,
    first: &str,
    last: &str,
    address: &str,
    city: &str,
    country: &str,
    active: bool,
    create_date: DateTime<Utc>,
) -> Customer {
    Customer {
        customer_id,
        store_id,
        first_name: first.to_uppercase(),
        last_name: last.to_uppercase(),
        email: format!("{}.{}@sakilacustomer.org", first.to_uppercase(), last.to_uppercase()),
        phone: format!("5550{customer_id:04}"),
        address: address.to_string(),
        city: city.to_string(),
        country: country.to_string(),
        active,
        create_date,
    }
}

fn film(film_id: u32, title: &str, category: &str, rental_rate: f64, length: u32, rating: &str) -> Film {
    Film {
        film_id,
        title: title.to_string(),
        description: format!("A {} about {}", category.to_lowercase(), title.to_lowercase()),
        release_year: 2006,
        rental_rate,
        length,
        rating: rating.to_string(),
        category: category.to_string(),
    }
}
