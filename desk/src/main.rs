//! rental-desk - front desk for the DVD rental service.
//!
//! With a subcommand, runs that one screen and prints the result. Without
//! one, opens the interactive menu.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use rental_core::{
    CreateRental, CustomerQuery, CustomerRentalsQuery, RentalQuery, RentalStatus, SortOrder,
    StaffEarningsQuery, TopFilmsQuery, UnreturnedQuery, UnreturnedSort,
};
use rental_desk::config::Config;
use rental_desk::menu::Menu;
use rental_desk::render::{Format, View};
use rental_desk::{connect, forms, screens, DeskClient};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "rental-desk")]
#[command(about = "Front desk for the DVD rental service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API base URL, e.g. http://localhost:3000/api (overrides config and RENTAL_API_URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: Format,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List customers
    Customers {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        /// Only active (true) or inactive (false) customers
        #[arg(long)]
        active: Option<bool>,
    },
    /// Search customers by name or email
    Search { term: String },
    /// Films with copies available to rent
    Films {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Create a rental
    Rent {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        customer: u32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        inventory: u32,
        /// Defaults to `defaults.staff_id` from the config
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        staff: Option<u32>,
    },
    /// Show one rental
    Show {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        rental_id: u32,
    },
    /// Register the return of a rental
    Return {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        rental_id: u32,
    },
    /// Cancel (delete) a rental
    Cancel {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        rental_id: u32,
        /// Logged locally, not sent to the server
        #[arg(long)]
        reason: Option<String>,
    },
    /// List rentals
    Rentals {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Rental history of one customer
    CustomerRentals {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        customer_id: u32,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },
    /// Rentals not yet returned
    Unreturned {
        /// Only rentals out at least this many days
        #[arg(long)]
        days: Option<u32>,
        #[arg(long, value_enum)]
        sort: Option<UnreturnedSortArg>,
    },
    /// Most rented films
    TopFilms {
        /// Defaults to `defaults.top_limit` from the config
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_rentals: Option<u32>,
    },
    /// Earnings per staff member
    StaffEarnings {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        staff: Option<u32>,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        store: Option<u32>,
    },
    /// System overview
    Summary,
    /// Check that the service answers
    Ping,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum StatusArg {
    Active,
    Returned,
}

impl From<StatusArg> for RentalStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => RentalStatus::Active,
            StatusArg::Returned => RentalStatus::Returned,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortOrder::Asc,
            SortArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum UnreturnedSortArg {
    Days,
    Customer,
}

impl From<UnreturnedSortArg> for UnreturnedSort {
    fn from(arg: UnreturnedSortArg) -> Self {
        match arg {
            UnreturnedSortArg::Days => UnreturnedSort::Days,
            UnreturnedSortArg::Customer => UnreturnedSort::Customer,
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.api.timeout_secs = secs;
    }
    let timeout: Duration = config.timeout();
    tracing::debug!(base_url = %config.api.base_url, ?timeout, "starting");
    let client = connect(&config.api.base_url, timeout);

    let Some(command) = cli.command else {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        return Menu::new(&client, &config.defaults, cli.format, stdin.lock(), stdout.lock())
            .run()
            .context("Interactive session failed");
    };

    let view = run(&client, &config, command)?;
    print!("{}", view.render(cli.format));
    Ok(())
}

fn run(client: &DeskClient, config: &Config, command: Command) -> Result<View> {
    let view = match command {
        Command::Customers { page, limit, active } => {
            screens::customers(client, &CustomerQuery { page, limit, active })?
        }
        Command::Search { term } => screens::search_customers(client, &term)?,
        Command::Films { limit } => screens::inventory(client, limit)?,
        Command::Rent {
            customer,
            inventory,
            staff,
        } => screens::create_rental(
            client,
            &CreateRental {
                customer_id: customer,
                inventory_id: inventory,
                staff_id: staff.unwrap_or(config.defaults.staff_id),
            },
        )?,
        Command::Show { rental_id } => screens::rental(client, rental_id)?,
        Command::Return { rental_id } => screens::return_rental(client, rental_id)?,
        Command::Cancel { rental_id, reason } => {
            let reason = reason.as_deref().and_then(forms::optional_text);
            screens::cancel_rental(client, rental_id, reason.as_deref())?
        }
        Command::Rentals { page, limit, status } => screens::rentals(
            client,
            &RentalQuery {
                page,
                limit,
                status: status.map(Into::into),
            },
        )?,
        Command::CustomerRentals {
            customer_id,
            status,
            sort,
        } => screens::customer_rentals(
            client,
            customer_id,
            &CustomerRentalsQuery {
                status: status.map(Into::into),
                sort: sort.map(Into::into),
            },
        )?,
        Command::Unreturned { days, sort } => screens::unreturned(
            client,
            &UnreturnedQuery {
                days_overdue: days,
                sort_by: sort.map(Into::into),
            },
        )?,
        Command::TopFilms {
            limit,
            category,
            min_rentals,
        } => screens::top_films(
            client,
            &TopFilmsQuery {
                limit: Some(limit.unwrap_or(config.defaults.top_limit)),
                category: category.as_deref().and_then(forms::optional_text),
                min_rentals,
            },
        )?,
        Command::StaffEarnings {
            staff,
            from,
            to,
            store,
        } => {
            let query = StaffEarningsQuery {
                staff_id: staff,
                start_date: forms::optional_date("--from", from.as_deref().unwrap_or(""))?,
                end_date: forms::optional_date("--to", to.as_deref().unwrap_or(""))?,
                store_id: store,
            };
            screens::staff_earnings(client, &query)?
        }
        Command::Summary => screens::summary(client)?,
        Command::Ping => screens::ping(client)?,
    };
    Ok(view)
}
