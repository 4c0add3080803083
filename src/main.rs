mod auth;
mod cli_messages;
mod commands;
mod config;
mod consts;
mod environment;
mod events;
mod gateway;
mod logging;
mod network;
mod push;
mod qr_image;
mod session;
mod sync;
mod ui;
mod validation;

use crate::auth::SessionContext;
use crate::config::{get_config_path, get_log_path};
use crate::consts::cli_consts::{DEFAULT_LOG_PAGE_SIZE, sync::POLL_INTERVAL_SECS};
use crate::environment::Environment;
use crate::gateway::GatewayClient;
use crate::gateway::types::LogQuery;
use crate::session::{run_headless_mode, run_tui_mode, setup_session};
use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in to the gateway admin panel and save the session.
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,

        #[arg(long, value_name = "PASSWORD", env = "OTP_GATEWAY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a new admin account.
    Register {
        /// Full name shown in the admin panel
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Must repeat --password
        #[arg(long)]
        confirm_password: String,
    },
    /// Forget the saved session.
    Logout,
    /// Run the live dashboard.
    Start {
        /// Print events to the console instead of drawing the dashboard
        #[arg(long, action = clap::ArgAction::SetTrue)]
        headless: bool,

        /// Seconds between status polls (minimum 3)
        #[arg(long, value_name = "SECS", default_value_t = POLL_INTERVAL_SECS)]
        poll_interval: u64,

        /// Paint a dark background behind the dashboard
        #[arg(long, action = clap::ArgAction::SetTrue)]
        with_background: bool,
    },
    /// Show the WhatsApp connection status once.
    Status,
    /// Check that the backend is reachable.
    Health,
    /// Save the current pairing QR code as a PNG file.
    Qr {
        /// Output file (default: whatsapp-qr-<millis>.png)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Log the WhatsApp session out.
    Disconnect,
    /// Ask the backend for a new pairing QR code.
    RefreshQr,
    /// WhatsApp account details, device and recent logins.
    Account,
    /// Browse OTP delivery logs.
    Logs {
        /// Filter by phone number
        #[arg(long)]
        phone: Option<String>,

        #[arg(long, value_enum)]
        status: Option<DeliveryStatus>,

        /// Earliest date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<String>,

        /// Latest date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_LOG_PAGE_SIZE)]
        limit: u32,

        /// Print whole messages instead of cutting them to the column width
        #[arg(long)]
        full: bool,
    },
    /// Today's delivery statistics.
    Stats,
    /// Gateway settings.
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Restart the gateway service.
    Restart {
        /// Admin API key
        #[arg(long, env = commands::settings::API_KEY_VAR, hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show the webhook URL and API key.
    Show {
        /// Print the API key in full
        #[arg(long, action = clap::ArgAction::SetTrue)]
        reveal: bool,
    },
    /// Change the delivery webhook. An empty URL clears it.
    Set {
        #[arg(long, value_name = "URL")]
        webhook_url: String,
    },
    /// Issue a new API key.
    GenerateApiKey,
}

#[derive(Clone, Copy, ValueEnum)]
enum DeliveryStatus {
    Success,
    Failed,
}

impl DeliveryStatus {
    fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Success => "success",
            DeliveryStatus::Failed => "failed",
        }
    }
}

/// Session required by a command, or an error telling the user to log in.
fn require_session(session: Option<SessionContext>) -> Result<SessionContext, Box<dyn Error>> {
    session.ok_or_else(|| {
        print_cmd_error!(
            "Not logged in.",
            "Run `otp-gateway login --email <EMAIL>` first."
        );
        Box::from("Not logged in")
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let environment = Environment::from_env();
    let config_path = get_config_path()?;

    let is_tui = matches!(args.command, Command::Start { headless: false, .. });
    if is_tui {
        logging::init_file_logging(&get_log_path()?)?;
    } else {
        logging::init_stderr_logging();
    }
    log::debug!("using {:?}", environment);

    let session = auth::load_session(&config_path, &environment.api_url());
    let client = GatewayClient::new(environment.clone())?.with_session(session.clone());

    match args.command {
        Command::Login { email, password } => {
            auth::login(&email, &password, &config_path, &client).await
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => auth::register(&name, &email, &password, &confirm_password, &client).await,
        Command::Logout => auth::logout(&config_path),
        Command::Start {
            headless,
            poll_interval,
            with_background,
        } => {
            let session = require_session(session)?;
            let data = setup_session(Arc::new(client), session, poll_interval)?;
            if headless {
                run_headless_mode(data).await
            } else {
                run_tui_mode(data, with_background).await
            }
        }
        Command::Health => commands::health::health(&client).await,
        Command::Status => {
            require_session(session)?;
            commands::whatsapp::status(&client).await
        }
        Command::Qr { output } => {
            require_session(session)?;
            commands::whatsapp::save_qr(&client, output).await
        }
        Command::Disconnect => {
            require_session(session)?;
            commands::whatsapp::disconnect(&client).await
        }
        Command::RefreshQr => {
            require_session(session)?;
            commands::whatsapp::refresh_qr(&client).await
        }
        Command::Account => {
            require_session(session)?;
            commands::whatsapp::account(&client).await
        }
        Command::Logs {
            phone,
            status,
            from,
            to,
            page,
            limit,
            full,
        } => {
            require_session(session)?;
            let query = LogQuery {
                phone,
                status: status.map(|s| s.as_str().to_string()),
                from,
                to,
                page,
                limit,
            };
            commands::logs::logs(&client, query, full).await
        }
        Command::Stats => {
            require_session(session)?;
            commands::stats::stats(&client).await
        }
        Command::Settings { action } => {
            require_session(session)?;
            match action {
                SettingsCommand::Show { reveal } => {
                    commands::settings::show(&client, reveal).await
                }
                SettingsCommand::Set { webhook_url } => {
                    commands::settings::set_webhook(&client, &webhook_url).await
                }
                SettingsCommand::GenerateApiKey => {
                    commands::settings::generate_api_key(&client).await
                }
            }
        }
        Command::Restart { api_key } => {
            require_session(session)?;
            commands::settings::restart(&client, api_key.as_deref()).await
        }
    }
}
