//! Interactive session.
//!
//! Every line typed counts as activity, so a shell left alone for
//! `IDLE_TIMEOUT` is signed out the same way an idle browser tab is.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use autolot_core::{activity_channel, ActivityEvent, IdleWatchdog, SessionManager, IDLE_TIMEOUT};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
commands:
  get <endpoint> [--skip-auth]   GET an API endpoint
  login <email>                  sign in
  whoami                         show the signed-in user
  logout                         end the session
  help                           show this list
  exit                           leave the shell";

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Get { endpoint: String, skip_auth: bool },
    Login { email: String },
    Whoami,
    Logout,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

impl ShellCommand {
    fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return ShellCommand::Empty;
        };
        let args: Vec<&str> = words.collect();

        match (command, args.as_slice()) {
            ("get", [endpoint]) => ShellCommand::Get {
                endpoint: endpoint.to_string(),
                skip_auth: false,
            },
            ("get", [endpoint, "--skip-auth"]) | ("get", ["--skip-auth", endpoint]) => {
                ShellCommand::Get {
                    endpoint: endpoint.to_string(),
                    skip_auth: true,
                }
            }
            ("login", [email]) => ShellCommand::Login {
                email: email.to_string(),
            },
            ("whoami", []) => ShellCommand::Whoami,
            ("logout", []) => ShellCommand::Logout,
            ("help", []) | ("?", []) => ShellCommand::Help,
            ("exit", []) | ("quit", []) => ShellCommand::Exit,
            _ => ShellCommand::Unknown(line.trim().to_string()),
        }
    }
}

pub async fn run(manager: Arc<SessionManager>) -> Result<ExitCode> {
    let (activity, events) = activity_channel();
    let watchdog = IdleWatchdog::spawn(Arc::clone(&manager), events, IDLE_TIMEOUT);

    println!("Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("autolot> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        activity.record(ActivityEvent::KeyPress);

        match ShellCommand::parse(&line) {
            ShellCommand::Get { endpoint, skip_auth } => {
                crate::get(&manager, &endpoint, skip_auth).await?;
            }
            ShellCommand::Login { email } => {
                let password =
                    tokio::task::spawn_blocking(|| rpassword::prompt_password("Password: "))
                        .await
                        .context("Password prompt panicked")??;
                activity.record(ActivityEvent::KeyPress);
                // Failures are reported by the notifier
                let _ = manager.login(&email, &password).await;
            }
            ShellCommand::Whoami => crate::print_state(&manager.state()),
            ShellCommand::Logout => manager.logout(),
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Exit => break,
            ShellCommand::Empty => {}
            ShellCommand::Unknown(input) => {
                eprintln!("Unknown command: {} (try 'help')", input);
            }
        }
    }

    debug!("Leaving shell");
    watchdog.shutdown();
    Ok(ExitCode::SUCCESS)
}
