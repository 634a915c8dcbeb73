//! Waitlist CLI
//!
//! Command-line front end for the waitlist service:
//! - Join the waitlist and show the public count
//! - Admin login/logout with a persisted session
//! - List, watch and delete signups

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::future::Future;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use waitlist::config::{generate_default_config, Config};
use waitlist::{
    AdminDashboard, ApiClient, DashboardConfig, DashboardSnapshot, FileTokenStore, LandingPage,
    Notice, SessionState, WaitlistApi,
};

#[derive(Parser)]
#[command(name = "waitlist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Waitlist signup and admin dashboard")]
#[command(long_about = "Join the coming-soon waitlist, or log in as admin to review and manage signups.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir, then ./waitlist.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Waitlist API base URL (overrides config and WAITLIST_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Join the waitlist
    Signup {
        /// Email address
        email: String,
    },

    /// Show how many people are on the waitlist
    Count,

    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Log in and remember the session
    Login {
        /// Admin password (prompted when omitted)
        #[arg(long, env = "WAITLIST_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// List all signups with stats
    List {
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a signup
    Delete {
        /// Signup id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Forget the stored session
    Logout,

    /// Keep the dashboard open and refresh on the poll interval
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => Config::load_with_env(path),
        None => Config::load_default(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = Some(url);
    }

    if let Err(e) = waitlist::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::Signup { email } => {
            let mut page = LandingPage::new(connect(&config));
            let result = page.submit(&email).await;
            print_notices(&page.drain_notices());

            match result {
                Ok(()) => {
                    if let Some(receipt) = page.receipt() {
                        println!(
                            "  #{} {} at {}",
                            receipt.id,
                            receipt.email,
                            receipt.created_at.format("%Y-%m-%d %H:%M UTC")
                        );
                    }
                }
                Err(_) => std::process::exit(1),
            }
        }

        Commands::Count => {
            let mut page = LandingPage::new(connect(&config));
            match page.refresh_count().await {
                Ok(count) => println!("{} people on the waitlist", count),
                Err(_) => {
                    print_notices(&page.drain_notices());
                    std::process::exit(1);
                }
            }
        }

        Commands::Admin { command } => {
            let store = FileTokenStore::new(config.session.dir_path());
            tracing::debug!(path = ?store.path(), "Session token location");
            let dashboard = AdminDashboard::new(
                connect(&config),
                Arc::new(store),
                DashboardConfig {
                    poll_interval: config.session.poll_interval(),
                },
            );

            run_admin(command, &dashboard).await?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Build the API client or exit with the configuration error
fn connect(config: &Config) -> Arc<dyn WaitlistApi> {
    match ApiClient::from_config(&config.api) {
        Ok(client) => {
            tracing::debug!(base_url = %client.base_url(), "Using waitlist API");
            Arc::new(client)
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run_admin(command: AdminCommand, dashboard: &AdminDashboard) -> anyhow::Result<()> {
    match command {
        AdminCommand::Login { password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Admin password: ")?,
            };

            let result = dashboard.login(&password).await;
            dashboard.unmount();
            print_notices(&dashboard.drain_notices().await);

            if result.is_err() || dashboard.session().await != SessionState::Authenticated {
                std::process::exit(1);
            }
            let stats = dashboard.stats().await;
            println!("{} signups on the waitlist", stats.total);
        }

        AdminCommand::List { json } => {
            require_session(dashboard).await;
            dashboard.unmount();
            let snapshot = dashboard.snapshot().await;

            print_notices(&dashboard.drain_notices().await);
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_dashboard(&snapshot);
            }
        }

        AdminCommand::Delete { id, yes } => {
            require_session(dashboard).await;
            dashboard.unmount();
            dashboard.drain_notices().await;

            if !yes {
                let label = dashboard
                    .signups()
                    .await
                    .into_iter()
                    .find(|s| s.id == id)
                    .map(|s| format!("{} ({})", id, s.email))
                    .unwrap_or_else(|| id.to_string());
                let answer = prompt(&format!("Delete signup {}? [y/N] ", label))?;
                if !matches!(answer.trim(), "y" | "Y" | "yes") {
                    println!("Cancelled");
                    return Ok(());
                }
            }

            let result = dashboard.delete(id).await;
            print_notices(&dashboard.drain_notices().await);
            if result.is_err() {
                std::process::exit(1);
            }
        }

        AdminCommand::Logout => {
            let result = dashboard.logout().await;
            print_notices(&dashboard.drain_notices().await);
            if let Err(e) = result {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }

        AdminCommand::Watch => {
            require_session(dashboard).await;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            };
            if !watch(dashboard, shutdown).await {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Restore the stored session or exit
async fn require_session(dashboard: &AdminDashboard) {
    if dashboard.mount().await != SessionState::Authenticated {
        print_notices(&dashboard.drain_notices().await);
        eprintln!("Not logged in. Run `waitlist admin login` first.");
        std::process::exit(1);
    }
}

/// Print each refresh until `shutdown` resolves.
///
/// Returns `false` if the session ended while watching.
async fn watch(dashboard: &AdminDashboard, shutdown: impl Future<Output = ()>) -> bool {
    let snapshot = dashboard.snapshot().await;
    print_notices(&dashboard.drain_notices().await);
    print_dashboard(&snapshot);
    println!();
    println!("Watching for new signups (Ctrl-C to stop)");

    let mut last_refresh = snapshot.last_refresh;
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                dashboard.unmount();
                return true;
            }
            _ = ticker.tick() => {
                let snapshot = dashboard.snapshot().await;
                print_notices(&dashboard.drain_notices().await);

                if snapshot.session != SessionState::Authenticated {
                    return false;
                }
                if snapshot.last_refresh != last_refresh {
                    last_refresh = snapshot.last_refresh;
                    println!(
                        "[{}] total: {}  today: {}  this week: {}",
                        chrono::Local::now().format("%H:%M:%S"),
                        snapshot.stats.total,
                        snapshot.stats.today,
                        snapshot.stats.this_week
                    );
                }
            }
        }
    }
}

fn print_dashboard(snapshot: &DashboardSnapshot) {
    println!(
        "Total: {}   Today: {}   This week: {}",
        snapshot.stats.total, snapshot.stats.today, snapshot.stats.this_week
    );
    println!();

    if snapshot.signups.is_empty() {
        println!("No signups yet.");
        return;
    }

    println!("{:<8} {:<40} {}", "ID", "Email", "Joined");
    println!("{}", "-".repeat(70));
    for signup in &snapshot.signups {
        println!(
            "{:<8} {:<40} {}",
            signup.id,
            signup.email,
            signup.created_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        if notice.is_error() {
            eprintln!("{}", notice);
        } else {
            println!("{}", notice);
        }
    }
}

/// Read one line from stdin after printing `label`
fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush().context("Failed to write prompt")?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
