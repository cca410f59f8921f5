//! autolot - command line client for the vehicle marketplace API.
//!
//! Signs in against the auth service, keeps the session between runs and
//! sends authenticated requests to the marketplace API.

mod console;
mod shell;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use autolot_core::{
    ApiError, Config, Notifier, Role, SessionBackend, SessionManager, SessionState, SignupRequest,
};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use console::{ConsoleNavigator, ConsoleNotifier};

#[derive(Parser)]
#[command(name = "autolot", version, about = "Vehicle marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the session for later runs
    Login {
        #[arg(long, env = "AUTOLOT_EMAIL")]
        email: Option<String>,
    },
    /// End the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account
    Signup(SignupArgs),
    /// Confirm an email address with the token from the verification mail
    Verify { token: String },
    /// Send the verification mail again
    ResendVerification { email: String },
    /// Request a password reset link
    ForgotPassword { email: String },
    /// GET an API endpoint and print the response
    Get {
        endpoint: String,
        /// Send without the session token
        #[arg(long)]
        skip_auth: bool,
    },
    /// Print the resolved configuration
    Config {
        /// Where to keep the session: file or keyring
        #[arg(long)]
        backend: Option<String>,
        /// Write the resolved configuration to the config file
        #[arg(long)]
        save: bool,
    },
    /// Interactive session with idle timeout
    Shell,
}

#[derive(Args)]
struct SignupArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    mid_name: Option<String>,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long, default_value = "seller")]
    role: String,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing();
    info!("autolot starting");

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load()?;

    if let Command::Config { backend, save } = &cli.command {
        if let Some(backend) = backend {
            config.session_backend =
                serde_json::from_value::<SessionBackend>(serde_json::Value::String(backend.clone()))
                    .with_context(|| format!("Unknown session backend '{}'", backend))?;
        }
        if *save {
            config.save()?;
            eprintln!("Saved {}", Config::config_path()?.display());
        }
        println!("{}", serde_json::to_string_pretty(&config)?);
        println!("session: {}", config.session_location()?);
        return Ok(ExitCode::SUCCESS);
    }

    let manager = mount(&config)?;

    // Failures of the auth flows have already been shown by the notifier
    let code = match cli.command {
        Command::Login { email } => {
            let email = match email {
                Some(email) => email,
                None => prompt("Email: ")?,
            };
            let password = rpassword::prompt_password("Password: ")?;
            match manager.login(&email, &password).await {
                Ok(user) => {
                    println!("Signed in as {} ({})", user.full_name(), user.role);
                    ExitCode::SUCCESS
                }
                Err(_) => ExitCode::FAILURE,
            }
        }
        Command::Logout => {
            manager.logout();
            ExitCode::SUCCESS
        }
        Command::Whoami => {
            print_state(&manager.state());
            ExitCode::SUCCESS
        }
        Command::Signup(args) => {
            let password = rpassword::prompt_password("Password: ")?;
            let payload = SignupRequest {
                first_name: args.first_name,
                mid_name: args.mid_name,
                last_name: args.last_name,
                email: args.email,
                password,
                phone_no: args.phone,
                city: args.city,
                address: args.address,
                role: Role::from(args.role),
            };
            exit_code(manager.signup(&payload).await.is_ok())
        }
        Command::Verify { token } => match manager.verify(&token).await {
            Ok(message) => {
                println!("{}", message);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Verification failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Command::ResendVerification { email } => {
            exit_code(manager.resend_verification(&email).await.is_ok())
        }
        Command::ForgotPassword { email } => {
            manager.forgot_password(&email).await;
            ExitCode::SUCCESS
        }
        Command::Get { endpoint, skip_auth } => {
            exit_code(get(&manager, &endpoint, skip_auth).await?)
        }
        Command::Shell => shell::run(manager).await?,
        Command::Config { .. } => unreachable!("handled before mounting"),
    };

    Ok(code)
}

/// Open the session store and pick up any stored session.
fn mount(config: &Config) -> Result<Arc<SessionManager>> {
    let store = config.session_store()?;
    let manager = SessionManager::new(
        config,
        store,
        Arc::new(ConsoleNotifier),
        Arc::new(ConsoleNavigator::new()),
    )
    .context("Failed to set up session")?;

    let manager = Arc::new(manager);
    manager.restore();
    Ok(manager)
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub(crate) fn print_state(state: &SessionState) {
    match state {
        SessionState::Authenticated(user) => {
            println!("{} <{}>", user.full_name(), user.email);
            println!("role: {}", user.role);
        }
        SessionState::Anonymous => println!("Not signed in"),
    }
}

/// GET `endpoint` through the session's API client and print the body.
/// Returns whether the server answered with a success status.
pub(crate) async fn get(manager: &SessionManager, endpoint: &str, skip_auth: bool) -> Result<bool> {
    let api = manager.api_client();
    let options = if skip_auth {
        autolot_core::RequestOptions::get().skip_auth()
    } else {
        autolot_core::RequestOptions::get()
    };

    let response = match api.request(endpoint, options).await {
        Ok(response) => response,
        Err(e) => {
            report(&e);
            return Ok(false);
        }
    };

    let status = response.status();
    let body = response.text().await.context("Failed to read response body")?;
    let rendered = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or(body);

    if !status.is_success() {
        eprintln!("{}", status);
    }
    println!("{}", rendered);
    Ok(status.is_success())
}

/// Show an API error unless the client already did.
fn report(err: &ApiError) {
    if let Some(notification) = err.notification() {
        ConsoleNotifier.notify(notification);
    }
}
