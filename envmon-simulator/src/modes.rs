//! The four run modes: serial print loop, API test, connection scenario, bulk upload.

use std::time::Duration;

use anyhow::{Context, Result};
use envmon_core::report as console;
use envmon_core::scenario::{run_poll_phase_with, run_send_phase_with, ConnectionReport, PollPhase, SendPhase};
use envmon_core::{SensorApi, SensorPayload, SensorSampleGenerator, SimulationProfile};
use rand::Rng;
use tracing::{error, info};

use crate::config::SimulatorConfig;

pub fn generator_for(profile: SimulationProfile, config: &SimulatorConfig) -> SensorSampleGenerator {
    let generator = SensorSampleGenerator::new(profile);
    match &config.device_id {
        Some(id) => generator.with_device_id(id.clone()),
        None => generator,
    }
}

/// Boucle "Arduino serial" : affiche chaque lecture + son JSON.
/// `limit = None` tourne jusqu'au Ctrl-C.
pub async fn run_serial<R: Rng + ?Sized>(
    config: &SimulatorConfig,
    rng: &mut R,
    limit: Option<usize>,
) -> Result<()> {
    let profile = SimulationProfile::SerialSimulation;
    let generator = generator_for(profile, config);
    let interval = Duration::from_secs(config.serial.interval_secs);

    println!("🌍 Arduino Environmental Monitor Simulator");
    println!("Serial Communication: 9600 baud");
    println!("{}\n", "=".repeat(50));

    let mut emitted = 0usize;
    loop {
        let reading = generator.generate(rng);
        let payload = SensorPayload::from_reading(&reading, profile);
        let json = serde_json::to_string_pretty(&payload).context("Failed to serialize payload")?;

        println!("{}\n", console::serial_status_block(&reading));
        println!("📡 JSON Data (API Format):\n{json}\n");

        emitted += 1;
        if limit.is_some_and(|max| emitted >= max) {
            info!("serial simulation stopped after {} readings", emitted);
            return Ok(());
        }

        println!("⏳ Waiting {} seconds for next reading...", interval.as_secs());
        println!("{}\n", "-".repeat(50));
        tokio::time::sleep(interval).await;
    }
}

/// POST `api_test.count` lectures à pleine plage ADC
pub async fn run_api_test<A, R>(api: &A, config: &SimulatorConfig, rng: &mut R) -> Result<()>
where
    A: SensorApi,
    R: Rng + ?Sized,
{
    let profile = SimulationProfile::ApiTest;
    let generator = generator_for(profile, config);
    let phase = SendPhase {
        count: config.api_test.count,
        interval: Duration::from_secs(config.api_test.interval_secs),
    };

    println!("🧪 Testing Environmental Monitor API");
    println!("{}", "=".repeat(40));

    let report = run_send_phase_with(api, &generator, rng, phase, |outcome| {
        println!("\n{}", console::send_outcome(outcome, profile));
    })
    .await;

    println!(
        "\n🏁 API Testing Complete! ({}/{} accepted)",
        report.accepted(),
        report.outcomes.len()
    );
    Ok(())
}

/// Scénario en deux phases : envoi de données Arduino puis observation du fallback
pub async fn run_connection<A, R>(api: &A, config: &SimulatorConfig, rng: &mut R) -> Result<ConnectionReport>
where
    A: SensorApi,
    R: Rng + ?Sized,
{
    let profile = SimulationProfile::ArduinoConnection;
    let generator = generator_for(profile, config);
    let c = &config.connection;
    let send_phase = SendPhase {
        count: c.send_count,
        interval: Duration::from_secs(c.send_interval_secs),
    };
    let poll_phase = PollPhase {
        count: c.poll_count,
        interval: Duration::from_secs(c.poll_interval_secs),
    };

    println!("🧪 Testing Arduino Connection & Data Processing");
    println!("{}", "=".repeat(50));
    println!("- When Arduino data is sent: system uses live Arduino data");
    println!("- When no Arduino data: system falls back to simulated data");

    println!("\n📡 PHASE 1: Sending Arduino Data\n{}", "-".repeat(30));
    let send_interval = send_phase.interval;
    let send = run_send_phase_with(api, &generator, rng, send_phase, |outcome| {
        println!("\n{}", console::send_outcome(outcome, profile));
    })
    .await;

    // même cadence qu'entre deux envois avant le premier GET
    tokio::time::sleep(send_interval).await;

    println!("\n🔄 PHASE 2: Observing Fallback to Simulated Data\n{}", "-".repeat(40));
    println!("Arduino transmission stopped, the server should switch to simulated data after its timeout");
    let poll = run_poll_phase_with(api, poll_phase, |observation| {
        println!("\n{}", console::poll_observation(observation));
    })
    .await;

    let report = ConnectionReport { send, poll };
    println!("\n{}", console::connection_summary(&report));
    Ok(report)
}

/// Un seul POST sur /bulk avec `bulk.count` lectures
pub async fn run_bulk<A, R>(api: &A, config: &SimulatorConfig, rng: &mut R) -> Result<()>
where
    A: SensorApi,
    R: Rng + ?Sized,
{
    let profile = SimulationProfile::ArduinoConnection;
    let generator = generator_for(profile, config);
    let batch: Vec<SensorPayload> = (0..config.bulk.count)
        .map(|_| SensorPayload::from_reading(&generator.generate(rng), profile))
        .collect();

    println!("📦 Sending {} readings in one bulk request", batch.len());
    match api.post_bulk(&batch).await {
        Ok(ack) => {
            let processed = ack.records_processed.unwrap_or_default();
            println!("✅ Bulk accepted: {} record(s) processed", processed);
            if processed != batch.len() as u64 {
                info!("server processed {} of {} records", processed, batch.len());
            }
        }
        Err(e) => {
            error!("bulk upload failed: {}", e);
            println!("❌ Bulk upload failed: {e}");
        }
    }
    Ok(())
}
