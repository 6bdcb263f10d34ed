//! `shipdesk` - terminal front end for the ShipDesk back office.

mod app;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use shipdesk_client::ClientConfig;
use shipdesk_slips::SlipKind;
use shipdesk_tariffs::MissingTariffFilter;

use crate::app::App;

/// ShipDesk back-office operations from the terminal.
#[derive(Parser, Debug)]
#[command(name = "shipdesk", version, about, long_about = None)]
struct Cli {
    /// Configuration file; defaults to ./shipdesk.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a session and persist it.
    Login {
        #[arg(long)]
        tenant: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Close the current session.
    Logout,
    /// Show the signed-in user and their permissions.
    Whoami,
    #[command(subcommand)]
    Tariffs(TariffCommands),
    #[command(subcommand)]
    Expeditions(ExpeditionCommands),
    #[command(subcommand)]
    Slips(SlipCommands),
}

/// Tariff grid maintenance.
#[derive(Subcommand, Debug)]
enum TariffCommands {
    /// Validate a CSV file locally, then import its valid rows.
    Import { file: PathBuf },
    /// List city pairs without a tariff.
    Missing {
        #[arg(long)]
        pickup: Option<String>,
        #[arg(long)]
        zone: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the import template.
    Template,
}

/// Warehouse reception.
#[derive(Subcommand, Debug)]
enum ExpeditionCommands {
    /// Submit received quantities from a JSON payload file.
    Receive { id: String, payload: PathBuf },
}

/// Delivery and shipping slips.
#[derive(Subcommand, Debug)]
enum SlipCommands {
    /// Add parcels to an open slip by code.
    Scan {
        kind: SlipKind,
        id: String,
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::load_from_path(path)?,
        None => ClientConfig::load()?,
    };
    shipdesk_observability::init(config.log.format);

    let app = App::start(config).await?;
    match cli.command {
        Commands::Login {
            tenant,
            email,
            password,
        } => app.login(&tenant, &email, &password).await,
        Commands::Logout => app.logout().await,
        Commands::Whoami => app.whoami().await,
        Commands::Tariffs(TariffCommands::Import { file }) => app.import_tariffs(&file).await,
        Commands::Tariffs(TariffCommands::Missing {
            pickup,
            zone,
            search,
        }) => {
            let filter = MissingTariffFilter {
                pickup_city_ref: pickup,
                destination_zone: zone,
                search,
            };
            app.missing_tariffs(&filter).await
        }
        Commands::Tariffs(TariffCommands::Template) => {
            print!("{}", app.tariff_template());
            Ok(())
        }
        Commands::Expeditions(ExpeditionCommands::Receive { id, payload }) => {
            app.receive_expedition(&id, &payload).await
        }
        Commands::Slips(SlipCommands::Scan { kind, id, codes }) => {
            app.scan_parcels(kind, &id, &codes).await
        }
    }
}
