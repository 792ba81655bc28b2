//! `impterm`: configure IMP access terminals over Bluetooth LE.
//!
//! ```text
//! impterm scan
//! impterm set-pin 4321 --confirm 4321
//! impterm set-duration 15
//! ```

mod logger;
mod picker;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use impterm_ble::mock::{MockBackend, MockPeripheral};
use impterm_ble::platform::BtleplugBackend;
use impterm_ble::{AnyBackend, ConfigClient};
use impterm_core::{TransactionOutcome, ValidationError};
use picker::StdinPicker;
use settings::LinkArgs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Exit code for input rejected before anything was sent.
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Parser)]
#[command(name = "impterm", version)]
#[command(about = "Configure IMP access terminals over Bluetooth LE")]
struct Cli {
    /// TOML file with link settings
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    link: LinkArgs,

    /// Talk to a simulated terminal instead of the Bluetooth adapter
    #[arg(long, global = true)]
    demo: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List terminals in range
    Scan,
    /// Set the access PIN
    SetPin {
        /// New PIN, 4-10 digits. Prompted for when omitted
        pin: Option<String>,
        /// PIN confirmation. Prompted for when omitted
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Set how long the door stays open, in seconds
    SetDuration {
        /// Whole seconds, 1-65535
        seconds: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let result = block_on_detached(run(cli)).context("Failed to start the async runtime");
    match result.and_then(|code| code) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Drive `future` to completion, then shut the runtime down without waiting
/// for blocking tasks.
///
/// A device prompt abandoned by the discovery timeout stays blocked on stdin
/// until the operator presses Enter, and must not keep the process alive.
fn block_on_detached<F: Future>(future: F) -> io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = settings::resolve(cli.config.as_deref(), &cli.link)?;
    debug!(?config, "Link settings");

    let backend = if cli.demo {
        demo_backend()
    } else {
        let backend = BtleplugBackend::new(config.name_filter.clone())
            .await
            .context("Failed to open the Bluetooth adapter")?;
        AnyBackend::Btleplug(backend)
    };
    let client = ConfigClient::new(backend, StdinPicker, config);

    let code = match cli.command {
        Commands::Scan => {
            let terminals = client.scan().await.context("Scan failed")?;
            if terminals.is_empty() {
                println!("No terminals in range");
            }
            for terminal in &terminals {
                println!("{terminal}");
            }
            ExitCode::SUCCESS
        }
        Commands::SetPin { pin, confirm } => {
            let pin = match pin {
                Some(pin) => pin,
                None => prompt("New PIN: ")?,
            };
            let confirm = match confirm {
                Some(confirm) => confirm,
                None => prompt("Confirm PIN: ")?,
            };
            report(client.submit_pin(&pin, &confirm).await)
        }
        Commands::SetDuration { seconds } => report(client.submit_duration_input(&seconds).await),
    };

    if let Err(e) = client.shutdown().await {
        warn!(error = %e, "Failed to disconnect cleanly");
    }
    Ok(code)
}

fn report(result: std::result::Result<TransactionOutcome, ValidationError>) -> ExitCode {
    match result {
        Ok(outcome) => {
            if outcome.failure_kind().is_some_and(|kind| kind.is_error()) {
                debug!(%outcome, "Transaction failed");
            }
            println!("{}", outcome.user_message());
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(EXIT_INVALID_INPUT)
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn demo_backend() -> AnyBackend {
    let (terminal, handle) = MockPeripheral::new("C8:2E:18:00:00:01");
    handle.set_latency(Duration::from_millis(150));

    let backend = MockBackend::new().with_peripheral(terminal.with_rssi(-58));
    backend.set_scan_delay(Duration::from_millis(500));
    info!("Using a simulated terminal");
    AnyBackend::Mock(backend)
}
