//! Envmon Simulator - Arduino sensor simulator for the environmental-monitor API
//!
//! Fabrique des lectures de capteurs plausibles (humidité du sol, vibration,
//! distance d'eau, température) et :
//! - les affiche comme la sortie série de l'Arduino (`serial`)
//! - les POST sur /api/sensors (`api-test`, `bulk`)
//! - déroule le scénario envoi -> fallback en deux phases (`connection`)

mod config;
mod http;
mod modes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::SimulatorConfig;
use crate::http::HttpSensorApi;

#[derive(Debug, Parser)]
#[command(name = "envmon-simulator", version, about = "Arduino sensor simulator for the environmental-monitor API")]
struct Cli {
    /// Config file (défaut: $ENVMON_SIM_CONFIG puis ./simulator.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides http.api_url
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Seed RNG pour rejouer exactement une série de lectures
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print readings like the Arduino serial monitor
    Serial {
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Stop after N readings instead of running until Ctrl-C
        #[arg(long)]
        count: Option<usize>,
    },
    /// POST full-range readings to the API
    ApiTest {
        #[arg(long)]
        count: Option<usize>,
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Send Arduino data, then poll to observe the fallback to simulated data
    Connection {
        #[arg(long)]
        send_count: Option<usize>,
        #[arg(long)]
        send_interval_secs: Option<u64>,
        #[arg(long)]
        poll_count: Option<usize>,
        #[arg(long)]
        poll_interval_secs: Option<u64>,
    },
    /// POST a batch of readings to <api_url>/bulk
    Bulk {
        #[arg(long)]
        count: Option<usize>,
    },
}

impl Cli {
    /// Les flags CLI écrasent les valeurs du fichier
    fn apply(&self, config: &mut SimulatorConfig) {
        if let Some(url) = &self.api_url {
            config.http.api_url = url.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        match &self.command {
            Command::Serial { interval_secs, .. } => {
                override_with(&mut config.serial.interval_secs, *interval_secs);
            }
            Command::ApiTest { count, interval_secs } => {
                override_with(&mut config.api_test.count, *count);
                override_with(&mut config.api_test.interval_secs, *interval_secs);
            }
            Command::Connection {
                send_count,
                send_interval_secs,
                poll_count,
                poll_interval_secs,
            } => {
                let c = &mut config.connection;
                override_with(&mut c.send_count, *send_count);
                override_with(&mut c.send_interval_secs, *send_interval_secs);
                override_with(&mut c.poll_count, *poll_count);
                override_with(&mut c.poll_interval_secs, *poll_interval_secs);
            }
            Command::Bulk { count } => {
                override_with(&mut config.bulk.count, *count);
            }
        }
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

async fn run(cli: Cli, config: SimulatorConfig) -> Result<()> {
    let mut rng = match config.seed {
        Some(seed) => {
            info!("using fixed RNG seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Command::Serial { count, .. } => modes::run_serial(&config, &mut rng, count).await,
        Command::ApiTest { .. } => modes::run_api_test(&http_api(&config)?, &config, &mut rng).await,
        Command::Connection { .. } => {
            modes::run_connection(&http_api(&config)?, &config, &mut rng).await?;
            Ok(())
        }
        Command::Bulk { .. } => modes::run_bulk(&http_api(&config)?, &config, &mut rng).await,
    }
}

fn http_api(config: &SimulatorConfig) -> Result<HttpSensorApi> {
    let api = HttpSensorApi::new(&config.http).context("Failed to build HTTP client")?;
    info!("target endpoint: {}", api.api_url());
    Ok(api)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("envmon_simulator=info,envmon_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let path = SimulatorConfig::resolve_path(cli.config.as_deref());
    let mut config = SimulatorConfig::load(&path).await?;
    cli.apply(&mut config);

    tokio::select! {
        result = run(cli, config) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Simulation stopped by user");
            Ok(())
        }
    }
}
