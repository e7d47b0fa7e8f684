//! Command-line front end for the incognito session
//!
//! Drives the session controller against a running backend:
//! - Inspect status and the access gate decision
//! - Enable, disable, unlock and lock incognito mode
//! - Exercise the settings toggle policy, including the device check

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use incognito_core::AccessDecision;
use incognito_net::{HttpClientConfig, HttpStatusClient};
use incognito_session::{
    ChallengeState, ConfigStore, ControllerReloader, IncognitoToggle, SessionController,
    StaticDevicePresence, ToggleOutcome, UnlockChallenge,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroizing;

type Controller = SessionController<HttpStatusClient>;

#[derive(Parser)]
#[command(name = "incognito")]
#[command(about = "Incognito session control", long_about = None)]
struct Cli {
    /// Backend API root
    #[arg(short, long, default_value = incognito_net::config::DEFAULT_BASE_URL)]
    url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = incognito_net::config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Config file holding the incognito hint (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the backend session status
    Status,

    /// Print what the access gate would render
    Gate,

    /// Turn incognito mode on
    Enable {
        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Turn incognito mode off
    Disable,

    /// Unlock incognito data
    Unlock {
        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Drop the held credential, staying in incognito mode
    Lock,

    /// Flip incognito mode the way the settings toggle does
    Toggle {
        /// Treat a hardware device as connected
        #[arg(long)]
        device_connected: bool,

        /// New password when switching on (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Password confirmation (read from stdin when omitted)
        #[arg(long)]
        confirm: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let http_config = HttpClientConfig {
        base_url: cli.url.clone(),
        timeout_secs: cli.timeout,
    };
    let client = HttpStatusClient::new(&http_config).context("Failed to create backend client")?;
    let controller = Arc::new(build_controller(client, cli.config));

    controller.refresh_status().await;

    match cli.command {
        Commands::Status => print_status(&controller)?,
        Commands::Gate => println!("{}", decision_name(controller.decision())),
        Commands::Enable { password } => {
            let password = read_secret(password, "Password")?;
            let status = controller.enable(&password).await?;
            info!("Incognito mode enabled (locked={})", status.locked);
        }
        Commands::Disable => {
            controller.disable().await?;
            info!("Incognito mode disabled");
        }
        Commands::Unlock { password } => run_unlock(&controller, password).await?,
        Commands::Lock => {
            controller.lock().await?;
            info!("Incognito session locked");
        }
        Commands::Toggle {
            device_connected,
            password,
            confirm,
        } => run_toggle(&controller, device_connected, password, confirm).await?,
    }

    Ok(())
}

fn build_controller(client: HttpStatusClient, config: Option<PathBuf>) -> Controller {
    let store = match config {
        Some(path) => Some(ConfigStore::new(path)),
        None => match ConfigStore::open_default() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Config hint disabled: {}", e);
                None
            }
        },
    };

    match store {
        Some(store) => SessionController::with_config(client, store),
        None => SessionController::new(client),
    }
}

fn print_status(controller: &Controller) -> anyhow::Result<()> {
    let status = controller.status();
    let report = serde_json::json!({
        "incognito": status.incognito,
        "locked": status.locked,
        "gate": decision_name(controller.decision()),
        "configHint": controller.config_hint(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_unlock(controller: &Arc<Controller>, password: Option<String>) -> anyhow::Result<()> {
    if controller.decision() != AccessDecision::Challenge {
        info!("Session is not locked; nothing to unlock");
        return Ok(());
    }

    let reloader = Arc::new(ControllerReloader::new(Arc::clone(controller)));
    let challenge = UnlockChallenge::new(Arc::clone(controller), reloader);

    let password = read_secret(password, "Incognito password")?;
    challenge.set_password(&password);
    drop(password);

    match challenge.submit().await? {
        ChallengeState::Unlocked => {
            info!("Unlocked");
            Ok(())
        }
        _ => bail!(challenge
            .error_message()
            .unwrap_or_else(|| "Unlock did not complete".to_string())),
    }
}

async fn run_toggle(
    controller: &Arc<Controller>,
    device_connected: bool,
    password: Option<String>,
    confirm: Option<String>,
) -> anyhow::Result<()> {
    let devices = Arc::new(StaticDevicePresence::new(device_connected));
    let mut toggle = IncognitoToggle::new(Arc::clone(controller), devices);

    match toggle.click().await? {
        ToggleOutcome::DeviceConnected => {
            bail!("Disconnect your hardware device before changing incognito mode")
        }
        ToggleOutcome::Disabled(_) => {
            info!("Incognito mode disabled");
            Ok(())
        }
        ToggleOutcome::SetupRequired => {
            let password = read_secret(password, "New incognito password")?;
            let confirm = read_secret(confirm, "Confirm password")?;

            let dialog = toggle.setup_dialog_mut();
            dialog.set_password(&password);
            dialog.set_confirmation(&confirm);
            drop((password, confirm));

            let status = toggle.submit_setup().await?;
            info!("Incognito mode enabled (locked={})", status.locked);
            Ok(())
        }
    }
}

fn read_secret(value: Option<String>, prompt: &str) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = value {
        return Ok(Zeroizing::new(value));
    }

    eprint!("{}: ", prompt);
    std::io::stderr().flush()?;

    let mut line = Zeroizing::new(String::new());
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}

fn decision_name(decision: AccessDecision) -> &'static str {
    match decision {
        AccessDecision::Loading => "loading",
        AccessDecision::Challenge => "challenge",
        AccessDecision::Content => "content",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_toggle() {
        let cli = Cli::try_parse_from(["incognito", "toggle", "--device-connected"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Toggle {
                device_connected: true,
                ..
            }
        ));
        assert_eq!(cli.url, incognito_net::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_read_secret_prefers_argument() {
        let secret = read_secret(Some("pw".to_string()), "Password").unwrap();
        assert_eq!(secret.as_str(), "pw");
    }

    #[test]
    fn test_decision_names() {
        assert_eq!(decision_name(AccessDecision::Loading), "loading");
        assert_eq!(decision_name(AccessDecision::Challenge), "challenge");
        assert_eq!(decision_name(AccessDecision::Content), "content");
    }
}
