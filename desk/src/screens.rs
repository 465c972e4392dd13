//! The desk screens.
//!
//! Each function performs the requests of one user action and shapes the
//! result into a [`View`]. Input arrives already validated by
//! [`crate::forms`]; errors come back untouched so the caller can show the
//! server's message.

use rental_core::{
    ApiError, BlockingClient, CreateRental, CustomerQuery, CustomerRentalsQuery, RentalQuery,
    StaffEarningsQuery, TopFilmsQuery, Transport, UnreturnedQuery,
};
use tracing::info;

use crate::render::{money, opt_text, opt_timestamp, timestamp, View};

type Screen = Result<View, ApiError>;

// ---------------------------------------------------------------------------
// Create rental
// ---------------------------------------------------------------------------

pub fn customers<T: Transport>(client: &BlockingClient<T>, query: &CustomerQuery) -> Screen {
    let customers = client.customers(query)?;
    let rows = customers
        .iter()
        .map(|c| {
            vec![
                c.customer_id.to_string(),
                c.name.clone(),
                opt_text(c.email.as_deref()),
                c.active_rentals.map_or_else(|| "-".to_string(), |n| n.to_string()),
            ]
        })
        .collect();
    let total = customers.len();
    Ok(View::table("Customers", &["Customer ID", "Name", "Email", "Active rentals"], rows)
        .with_footer(format!("{total} customers")))
}

pub fn search_customers<T: Transport>(client: &BlockingClient<T>, term: &str) -> Screen {
    let hits = client.search_customers(term)?;
    let rows = hits
        .iter()
        .map(|c| vec![c.customer_id.to_string(), c.name.clone(), opt_text(c.email.as_deref())])
        .collect();
    Ok(View::table(format!("Customers matching {term:?}"), &["Customer ID", "Name", "Email"], rows))
}

/// Films with copies on the shelf, with the inventory IDs to rent them by.
pub fn inventory<T: Transport>(client: &BlockingClient<T>, limit: Option<u32>) -> Screen {
    let films = client.available_inventory(limit)?;
    let rows = films
        .iter()
        .map(|f| {
            let ids: Vec<String> = f.inventory_ids.iter().map(u32::to_string).collect();
            vec![
                f.film_id.to_string(),
                f.title.clone(),
                opt_text(f.category.as_deref()),
                money(f.rental_rate),
                f.available_copies.to_string(),
                if ids.is_empty() { "-".to_string() } else { ids.join(",") },
            ]
        })
        .collect();
    Ok(View::table(
        "Available inventory",
        &["Film ID", "Title", "Category", "Rate", "Copies", "Inventory IDs"],
        rows,
    ))
}

/// The two lookups shown before a new rental is entered. Each stands on
/// its own: a failed one does not stop the rental from being entered.
pub fn rental_options<T: Transport>(client: &BlockingClient<T>) -> Vec<Screen> {
    vec![
        customers(client, &CustomerQuery::default()),
        inventory(client, None),
    ]
}

pub fn create_rental<T: Transport>(client: &BlockingClient<T>, input: &CreateRental) -> Screen {
    let rental = client.create_rental(input)?;
    info!(rental_id = rental.rental_id, "rental created");
    Ok(View::message(
        "Rental created",
        vec![
            format!("Rental ID: {}", rental.rental_id),
            format!("Rental date: {}", timestamp(&rental.rental_date)),
            format!("Customer: {}", rental.customer_name),
            format!("Film: {}", rental.film_title),
            format!("Staff: {}", rental.staff_name),
        ],
    ))
}

// ---------------------------------------------------------------------------
// Single rental: show, return, cancel
// ---------------------------------------------------------------------------

pub fn rental<T: Transport>(client: &BlockingClient<T>, rental_id: u32) -> Screen {
    let r = client.rental(rental_id)?;
    Ok(View::message(
        format!("Rental {}", r.rental_id),
        vec![
            format!("Rental ID: {}", r.rental_id),
            format!("Inventory ID: {}", r.inventory_id),
            format!("Rental date: {}", timestamp(&r.rental_date)),
            format!("Return date: {}", opt_timestamp(r.return_date.as_ref())),
            format!("Customer: {} ({})", r.customer_name, r.customer_id),
            format!("Film: {} ({})", r.film_title, r.film_id),
            format!("Rate: {}", money(r.rental_rate)),
            format!("Staff: {}", r.staff_name),
        ],
    ))
}

pub fn return_rental<T: Transport>(client: &BlockingClient<T>, rental_id: u32) -> Screen {
    let receipt = client.return_rental(rental_id)?;
    info!(rental_id, "rental returned");
    let mut lines = vec![
        format!("Rental ID: {}", receipt.rental_id),
        format!("Return date: {}", timestamp(&receipt.return_date)),
    ];
    if let Some(payment) = &receipt.payment {
        lines.push(format!("Payment: {}", money(payment.amount)));
    }
    Ok(View::message("Rental returned", lines))
}

/// The reason only goes to the log; the API has no field for it.
pub fn cancel_rental<T: Transport>(
    client: &BlockingClient<T>,
    rental_id: u32,
    reason: Option<&str>,
) -> Screen {
    let cancelled = client.cancel_rental(rental_id)?;
    info!(rental_id, reason = reason.unwrap_or(""), "rental cancelled");
    let mut lines = vec![format!("Rental ID: {rental_id}")];
    if let Some(c) = cancelled {
        lines.push(format!("Cancelled at: {}", timestamp(&c.cancelled_at)));
    }
    if let Some(reason) = reason {
        lines.push(format!("Reason: {reason}"));
    }
    Ok(View::message("Rental cancelled", lines))
}

pub fn rentals<T: Transport>(client: &BlockingClient<T>, query: &RentalQuery) -> Screen {
    let rows: Vec<Vec<String>> = client
        .rentals(query)?
        .iter()
        .map(|r| {
            vec![
                r.rental_id.to_string(),
                timestamp(&r.rental_date),
                opt_timestamp(r.return_date.as_ref()),
                r.customer_name.clone(),
                r.film_title.clone(),
                r.staff_name.clone(),
                r.status.as_str().to_string(),
            ]
        })
        .collect();
    Ok(View::table(
        "Rentals",
        &["Rental ID", "Rental date", "Return date", "Customer", "Film", "Staff", "Status"],
        rows,
    ))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

pub fn unreturned<T: Transport>(client: &BlockingClient<T>, query: &UnreturnedQuery) -> Screen {
    let report = client.unreturned(query)?;
    let rows = report
        .unreturned_dvds
        .iter()
        .map(|r| {
            vec![
                r.rental_id.to_string(),
                timestamp(&r.rental_date),
                r.days_overdue.to_string(),
                r.customer_name.clone(),
                r.film_title.clone(),
                r.staff_name.clone(),
            ]
        })
        .collect();
    let stats = &report.statistics;
    Ok(View::table(
        "Unreturned DVDs",
        &["Rental ID", "Rental date", "Days overdue", "Customer", "Title", "Staff"],
        rows,
    )
    .with_footer(format!(
        "{} unreturned: {} overdue, {} due soon, {} on time",
        report.total, stats.overdue, stats.near_overdue, stats.on_time
    )))
}

pub fn top_films<T: Transport>(client: &BlockingClient<T>, query: &TopFilmsQuery) -> Screen {
    let report = client.top_films(query)?;
    let rows = report
        .top_films
        .iter()
        .map(|f| {
            vec![
                f.film_id.to_string(),
                f.title.clone(),
                opt_text(f.category.as_deref()),
                f.total_rentals.to_string(),
                money(f.total_revenue),
            ]
        })
        .collect();
    Ok(View::table(
        "Top films",
        &["Film ID", "Title", "Category", "Total rentals", "Revenue"],
        rows,
    )
    .with_footer(format!(
        "{} films, {} rentals, {} revenue",
        report.statistics.total_films,
        report.statistics.total_rentals,
        money(report.statistics.total_system_revenue)
    )))
}

pub fn staff_earnings<T: Transport>(client: &BlockingClient<T>, query: &StaffEarningsQuery) -> Screen {
    let report = client.staff_earnings(query)?;
    let rows = report
        .staff_earnings
        .iter()
        .map(|s| vec![s.staff_id.to_string(), s.staff_name.clone(), money(s.total_earnings)])
        .collect();
    let view = View::table("Staff earnings", &["Staff ID", "Name", "Earnings"], rows);
    Ok(match &report.filters {
        Some(f) => view.with_footer(format!(
            "from {} to {}, store {}",
            f.start_date, f.end_date, f.store_id
        )),
        None => view,
    })
}

pub fn customer_rentals<T: Transport>(
    client: &BlockingClient<T>,
    customer_id: u32,
    query: &CustomerRentalsQuery,
) -> Screen {
    let report = client.customer_rentals(customer_id, query)?;
    let rows = report
        .rentals
        .iter()
        .map(|r| {
            vec![
                r.rental_id.to_string(),
                timestamp(&r.rental_date),
                r.film_title.clone(),
                opt_timestamp(r.return_date.as_ref()),
                r.staff_name.clone(),
            ]
        })
        .collect();
    let stats = &report.statistics;
    Ok(View::table(
        format!("Rentals of {}", report.customer.name),
        &["Rental ID", "Date", "Film", "Returned", "Staff"],
        rows,
    )
    .with_footer(format!(
        "{} rentals ({} active), {} spent",
        stats.total_rentals,
        stats.active_rentals,
        money(stats.total_spent)
    )))
}

pub fn summary<T: Transport>(client: &BlockingClient<T>) -> Screen {
    let s = client.summary()?;
    let counts = &s.summary;
    let mut lines = vec![
        format!("Active customers: {}", counts.active_customers),
        format!("Films: {} ({} copies)", counts.total_films, counts.total_inventory),
        format!(
            "Rentals: {} ({} active, {} completed)",
            counts.total_rentals, counts.active_rentals, counts.completed_rentals
        ),
        format!("Revenue: {}", money(counts.total_revenue)),
        format!("Staff: {} in {} stores", counts.active_staff, counts.total_stores),
    ];
    for category in &s.top_categories {
        lines.push(format!("Category {}: {} rentals", category.category, category.rentals));
    }
    for activity in &s.recent_activity {
        lines.push(format!("{} {}", timestamp(&activity.date), activity.description));
    }
    Ok(View::message("System summary", lines))
}

pub fn ping<T: Transport>(client: &BlockingClient<T>) -> Screen {
    let health = client.health()?;
    Ok(View::message(
        "Service",
        vec![format!("{}: {}", client.api().base_url(), health.status)],
    ))
}
