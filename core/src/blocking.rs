//! One-call-per-method client over any [`Transport`].
//!
//! Each method is `build_*` → `Transport::execute` → `parse_*`. Nothing is
//! cached and nothing is retried; a failure is returned as-is for the caller
//! to show.

use tracing::{debug, warn};

use crate::client::RentalClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{
    AvailableFilm, Cancellation, CreateRental, Customer, CustomerDetail, CustomerQuery,
    CustomerRentalsQuery, CustomerRentalsReport, Health, RentalDetail, RentalQuery, RentalRow,
    RentalSummary, ReturnReceipt, StaffEarningsQuery, StaffEarningsReport, SystemSummary,
    TopFilmsQuery, TopFilmsReport, UnreturnedQuery, UnreturnedReport,
};

#[derive(Debug, Clone)]
pub struct BlockingClient<T> {
    api: RentalClient,
    transport: T,
}

impl<T: Transport> BlockingClient<T> {
    pub fn new(api: RentalClient, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &RentalClient {
        &self.api
    }

    fn call<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(&RentalClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let method = request.method.as_str();
        let url = request.path.clone();
        debug!(method, %url, "sending request");
        let result = self
            .transport
            .execute(request)
            .and_then(|response| {
                debug!(method, %url, status = response.status, "received response");
                parse(&self.api, response)
            });
        if let Err(err) = &result {
            warn!(method, %url, error = %err, "request failed");
        }
        result
    }

    pub fn customers(&self, query: &CustomerQuery) -> Result<Vec<Customer>, ApiError> {
        self.call(self.api.build_list_customers(query), RentalClient::parse_list_customers)
    }

    pub fn customer(&self, customer_id: u32) -> Result<CustomerDetail, ApiError> {
        self.call(self.api.build_get_customer(customer_id), RentalClient::parse_get_customer)
    }

    pub fn search_customers(&self, term: &str) -> Result<Vec<Customer>, ApiError> {
        self.call(self.api.build_search_customers(term)?, RentalClient::parse_search_customers)
    }

    pub fn available_inventory(&self, limit: Option<u32>) -> Result<Vec<AvailableFilm>, ApiError> {
        self.call(
            self.api.build_available_inventory(limit),
            RentalClient::parse_available_inventory,
        )
    }

    pub fn create_rental(&self, input: &CreateRental) -> Result<RentalSummary, ApiError> {
        self.call(self.api.build_create_rental(input)?, RentalClient::parse_create_rental)
    }

    pub fn rentals(&self, query: &RentalQuery) -> Result<Vec<RentalRow>, ApiError> {
        self.call(self.api.build_list_rentals(query), RentalClient::parse_list_rentals)
    }

    pub fn rental(&self, rental_id: u32) -> Result<RentalDetail, ApiError> {
        self.call(self.api.build_get_rental(rental_id), RentalClient::parse_get_rental)
    }

    pub fn return_rental(&self, rental_id: u32) -> Result<ReturnReceipt, ApiError> {
        self.call(self.api.build_return_rental(rental_id), RentalClient::parse_return_rental)
    }

    pub fn cancel_rental(&self, rental_id: u32) -> Result<Option<Cancellation>, ApiError> {
        self.call(self.api.build_cancel_rental(rental_id), RentalClient::parse_cancel_rental)
    }

    pub fn customer_rentals(
        &self,
        customer_id: u32,
        query: &CustomerRentalsQuery,
    ) -> Result<CustomerRentalsReport, ApiError> {
        self.call(
            self.api.build_customer_rentals(customer_id, query),
            RentalClient::parse_customer_rentals,
        )
    }

    pub fn unreturned(&self, query: &UnreturnedQuery) -> Result<UnreturnedReport, ApiError> {
        self.call(self.api.build_unreturned(query), RentalClient::parse_unreturned)
    }

    pub fn top_films(&self, query: &TopFilmsQuery) -> Result<TopFilmsReport, ApiError> {
        self.call(self.api.build_top_films(query), RentalClient::parse_top_films)
    }

    pub fn staff_earnings(&self, query: &StaffEarningsQuery) -> Result<StaffEarningsReport, ApiError> {
        self.call(self.api.build_staff_earnings(query), RentalClient::parse_staff_earnings)
    }

    pub fn summary(&self) -> Result<SystemSummary, ApiError> {
        self.call(self.api.build_summary(), RentalClient::parse_summary)
    }

    pub fn health(&self) -> Result<Health, ApiError> {
        self.call(self.api.build_health(), RentalClient::parse_health)
    }
}
