//! # DS4 Teleop Control Binary
//!
//! Reads gamepad frames (one JSON `Joy` message per line) from stdin and
//! drives one or two robots through the configured transport.
//!
//! # Usage
//!
//! ```bash
//! # Single robot, simulation transport, built-in defaults
//! joy_bridge | ds4_control
//!
//! # Two robots from a config file
//! joy_bridge | ds4_control --config /etc/ds4/ds4_control.toml --robots 2
//!
//! # Verbose JSON logs
//! joy_bridge | ds4_control -v --json
//! ```

use clap::Parser;
use ds4_common::config::ConfigError;
use ds4_control::config::{NodeConfig, load_config};
use ds4_control::control_loop::ControlLoop;
use ds4_control::error::RuntimeError;
use ds4_control::input_reader::spawn_reader;
use ds4_control::mailbox::InputMailbox;
use ds4_control::transport::TransportRegistry;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// DS4 teleop node - gamepad control with hard stop and safety trigger
#[derive(Parser, Debug)]
#[command(name = "ds4_control")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Gamepad teleoperation node with hard-stop and safety-hold state machine")]
#[command(long_about = None)]
struct Args {
    /// Path to the node configuration file (TOML). Defaults apply if omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of robots (overrides the config file; 2 = dual mode).
    #[arg(short, long)]
    robots: Option<i64>,

    /// Transport name (overrides the config file).
    #[arg(short, long)]
    transport: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let config = match configure(&args) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, Level::INFO);
            error!("Configuration failed: {e}");
            std::process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level.as_tracing());

    if let Err(e) = run(&config) {
        error!("ds4_control failed: {e}");
        std::process::exit(1);
    }
}

/// Load the config file and apply command-line overrides.
fn configure(args: &Args) -> Result<NodeConfig, ConfigError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(robots) = args.robots {
        config.number_of_robots = robots;
    }
    if let Some(ref transport) = args.transport {
        config.transport = transport.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(config: &NodeConfig) -> Result<(), RuntimeError> {
    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let transports = TransportRegistry::with_builtin();
    info!("Available transports: {:?}", transports.list());
    let transport = transports.create(&config.transport, &config.transport_section())?;

    let mut control = ControlLoop::new(config, transport);

    let mailbox = Arc::new(InputMailbox::new());
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        let mailbox = Arc::clone(&mailbox);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
            mailbox.close();
        })?;
    }

    // Not joined: a reader blocked on stdin would hold up shutdown.
    let _reader = spawn_reader(BufReader::new(io::stdin()), Arc::clone(&mailbox))?;

    info!("Enter loop");
    let stats = control.run(&mailbox, &running);
    control.shutdown();

    let input = mailbox.stats();
    info!(
        "Loop stats: ticks={} inputs={} commands={} failures={} overruns={} max_late={:?}",
        stats.ticks,
        stats.inputs,
        stats.commands,
        stats.failures,
        stats.overruns,
        stats.max_lateness
    );
    info!(
        "Input stats: posted={} overwritten={} rejected={}",
        input.posted, input.overwritten, input.rejected
    );
    info!("{} shutdown complete", config.shared.service_name);
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: Level) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
