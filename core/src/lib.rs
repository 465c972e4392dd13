//! Synchronous API client core for the DVD rental service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Transport` supplied by the
//! host executes the actual HTTP round-trip; `BlockingClient` glues the two
//! together one request per call.
//!
//! # Design
//! - `RentalClient` is stateless; it holds only `base_url`.
//! - Each endpoint is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Every failure is an `ApiError` whose `Display` is user-facing.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod blocking;
pub mod client;
pub mod de;
pub mod error;
pub mod http;
pub mod types;

pub use blocking::BlockingClient;
pub use client::{RentalClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use types::*;
