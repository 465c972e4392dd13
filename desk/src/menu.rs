//! Interactive menu over any line reader and writer.
//!
//! Lists the seven screens, prompts for each field, validates it, runs the
//! screen and prints the result. A failed screen prints `Error: ...` and the
//! menu comes back; end of input quits.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use rental_core::{
    BlockingClient, CreateRental, CustomerRentalsQuery, StaffEarningsQuery, TopFilmsQuery,
    Transport, UnreturnedQuery,
};

use crate::config::Defaults;
use crate::forms;
use crate::render::{Format, View};
use crate::screens;

const CHOICES: &str = "\
Rental desk
  1) Create rental
  2) Return rental
  3) Cancel rental
  4) Unreturned DVDs
  5) Top films
  6) Staff earnings
  7) Customer rentals
  q) Quit";

pub struct Menu<'a, T, R, W> {
    client: &'a BlockingClient<T>,
    defaults: &'a Defaults,
    format: Format,
    input: R,
    output: W,
}

impl<'a, T: Transport, R: BufRead, W: Write> Menu<'a, T, R, W> {
    pub fn new(client: &'a BlockingClient<T>, defaults: &'a Defaults, format: Format, input: R, output: W) -> Self {
        Self {
            client,
            defaults,
            format,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{CHOICES}")?;
            let choice = match self.prompt("Choice") {
                Ok(choice) => choice,
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
                Err(err) => return Err(err),
            };
            let outcome = match choice.as_str() {
                "1" => self.create_rental(),
                "2" => self.return_rental(),
                "3" => self.cancel_rental(),
                "4" => self.unreturned(),
                "5" => self.top_films(),
                "6" => self.staff_earnings(),
                "7" => self.customer_rentals(),
                "q" | "Q" => return Ok(()),
                other => {
                    writeln!(self.output, "Unknown choice {other:?}\n")?;
                    continue;
                }
            };
            match outcome {
                Ok(()) => {}
                Err(err) => match err.downcast::<io::Error>() {
                    Ok(io) if io.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
                    Ok(io) => return Err(io),
                    Err(err) => writeln!(self.output, "Error: {err}\n")?,
                },
            }
        }
    }

    /// Reads one trimmed line. End of input is `UnexpectedEof`.
    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        Ok(line.trim().to_string())
    }

    fn show(&mut self, view: &View) -> io::Result<()> {
        writeln!(self.output, "{}", view.render(self.format))
    }

    fn create_rental(&mut self) -> Result<()> {
        for lookup in screens::rental_options(self.client) {
            match lookup {
                Ok(view) => self.show(&view)?,
                Err(err) => writeln!(self.output, "Error: {err}\n")?,
            }
        }
        let customer_id = forms::id("Customer ID", &self.prompt("Customer ID")?)?;
        let inventory_id = forms::id("Inventory ID", &self.prompt("Inventory ID")?)?;
        let staff = self.prompt(&format!("Staff ID [{}]", self.defaults.staff_id))?;
        let staff_id = forms::optional_id("Staff ID", &staff)?.unwrap_or(self.defaults.staff_id);
        let view = screens::create_rental(
            self.client,
            &CreateRental {
                customer_id,
                inventory_id,
                staff_id,
            },
        )?;
        Ok(self.show(&view)?)
    }

    fn return_rental(&mut self) -> Result<()> {
        let rental_id = forms::id("Rental ID", &self.prompt("Rental ID")?)?;
        let view = screens::rental(self.client, rental_id)?;
        self.show(&view)?;
        let answer = self.prompt("Register return? [y/N]")?;
        if !answer.eq_ignore_ascii_case("y") {
            writeln!(self.output, "Return not registered\n")?;
            return Ok(());
        }
        let view = screens::return_rental(self.client, rental_id)?;
        Ok(self.show(&view)?)
    }

    fn cancel_rental(&mut self) -> Result<()> {
        let rental_id = forms::id("Rental ID", &self.prompt("Rental ID")?)?;
        let reason = forms::optional_text(&self.prompt("Reason (optional)")?);
        let view = screens::cancel_rental(self.client, rental_id, reason.as_deref())?;
        Ok(self.show(&view)?)
    }

    fn unreturned(&mut self) -> Result<()> {
        let days = self.prompt("Minimum days overdue (blank for all)")?;
        let query = UnreturnedQuery {
            days_overdue: forms::optional_count("Days overdue", &days)?,
            sort_by: None,
        };
        let view = screens::unreturned(self.client, &query)?;
        Ok(self.show(&view)?)
    }

    fn top_films(&mut self) -> Result<()> {
        let limit = self.prompt(&format!("Limit [{}]", self.defaults.top_limit))?;
        let limit = forms::optional_id("Limit", &limit)?.unwrap_or(self.defaults.top_limit);
        let category = forms::optional_text(&self.prompt("Category (optional)")?);
        let query = TopFilmsQuery {
            limit: Some(limit),
            category,
            min_rentals: None,
        };
        let view = screens::top_films(self.client, &query)?;
        Ok(self.show(&view)?)
    }

    fn staff_earnings(&mut self) -> Result<()> {
        let staff_id = forms::optional_id("Staff ID", &self.prompt("Staff ID (optional)")?)?;
        let start_date = forms::optional_date("From", &self.prompt("From YYYY-MM-DD (optional)")?)?;
        let end_date = forms::optional_date("To", &self.prompt("To YYYY-MM-DD (optional)")?)?;
        let store_id = forms::optional_id("Store ID", &self.prompt("Store ID (optional)")?)?;
        let query = StaffEarningsQuery {
            staff_id,
            start_date,
            end_date,
            store_id,
        };
        let view = screens::staff_earnings(self.client, &query)?;
        Ok(self.show(&view)?)
    }

    fn customer_rentals(&mut self) -> Result<()> {
        let customer_id = forms::id("Customer ID", &self.prompt("Customer ID")?)?;
        let view = screens::customer_rentals(self.client, customer_id, &CustomerRentalsQuery::default())?;
        Ok(self.show(&view)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, RentalClient};
    use std::cell::RefCell;

    /// Records requests and answers each with a 404.
    #[derive(Default)]
    struct Missing {
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl Transport for Missing {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.borrow_mut().push(request);
            Ok(HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: r#"{"success":false,"message":"rental not found"}"#.to_string(),
            })
        }
    }

    fn run(script: &str, transport: &Missing) -> String {
        let client = BlockingClient::new(RentalClient::default(), transport);
        let defaults = Defaults::default();
        let mut output = Vec::new();
        Menu::new(&client, &defaults, Format::Table, script.as_bytes(), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    /// Lookups fail with a 500; creating a rental succeeds.
    #[derive(Default)]
    struct LookupsDown {
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl Transport for LookupsDown {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let (status, body) = match request.method {
                HttpMethod::Post => (
                    201,
                    r#"{"success":true,"data":{"rental_id":9,"rental_date":"2024-06-01T10:00:00Z",
                        "customer_name":"MARY SMITH","film_title":"ACADEMY DINOSAUR","staff_name":"Mike Hillyer"}}"#,
                ),
                _ => (500, r#"{"success":false,"message":"database unavailable"}"#),
            };
            self.sent.borrow_mut().push(request);
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            })
        }
    }

    #[test]
    fn create_continues_after_failed_lookups() {
        let transport = LookupsDown::default();
        let client = BlockingClient::new(RentalClient::default(), &transport);
        let defaults = Defaults {
            staff_id: 2,
            ..Defaults::default()
        };
        let mut output = Vec::new();
        Menu::new(&client, &defaults, Format::Table, "1\n1\n3\n\nq\n".as_bytes(), &mut output)
            .run()
            .unwrap();
        let out = String::from_utf8(output).unwrap();

        assert_eq!(out.matches("Error: HTTP 500: database unavailable").count(), 2);
        assert!(out.contains("Staff ID [2]"));
        assert!(out.contains("Rental ID: 9"));

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 3);
        let body: serde_json::Value = serde_json::from_str(sent[2].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"customer_id":1,"inventory_id":3,"staff_id":2}));
    }

    #[test]
    fn quits_on_q_and_on_eof() {
        let transport = Missing::default();
        assert!(run("q\n", &transport).contains("7) Customer rentals"));
        assert!(run("", &transport).ends_with("Choice: "));
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn blank_required_field_is_rejected_without_a_request() {
        let transport = Missing::default();
        let out = run("2\n\nq\n", &transport);
        assert!(out.contains("Error: invalid input: Rental ID is required"));
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn server_error_is_shown_and_menu_returns() {
        let transport = Missing::default();
        let out = run("3\n42\n\n9\nq\n", &transport);
        assert!(out.contains("Error: not found: rental not found"));
        assert!(out.contains("Unknown choice \"9\""));
        assert_eq!(transport.sent.borrow().len(), 1);
    }
}
