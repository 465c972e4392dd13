//! Terminal front desk for the DVD rental service.
//!
//! The screens in [`screens`] drive a [`rental_core::BlockingClient`] and
//! return [`render::View`]s; `main` exposes them as subcommands and as the
//! interactive [`menu`].

pub mod config;
pub mod forms;
pub mod menu;
pub mod render;
pub mod screens;
pub mod transport;

pub use transport::{connect, DeskClient, UreqTransport};
