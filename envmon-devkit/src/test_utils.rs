/*!
Test Harness pour les scénarios du simulateur

Facilite l'écriture de tests avec:
- Mock API pré-câblé (émulation du fallback serveur)
- Générateur seedé + horloge figée pour des lectures reproductibles
- Assertions sur les payloads envoyés
*/

use std::time::Duration;

use anyhow::Result;
use envmon_core::scenario::{
    run_poll_phase, run_send_phase, ConnectionReport, PollPhase, PollReport, SendPhase, SendReport,
};
use envmon_core::{FixedClock, SensorSampleGenerator, SimulationProfile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use crate::mock_api::MockSensorApi;

pub const DEFAULT_SEED: u64 = 42;
pub const FIXED_TIMESTAMP_MS: i64 = 1_700_000_000_000;

/// Harness de test complet pour les scénarios
pub struct ScenarioHarness {
    pub api: MockSensorApi,
    pub generator: SensorSampleGenerator<FixedClock>,
    rng: StdRng,
}

impl ScenarioHarness {
    pub fn new(profile: SimulationProfile) -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        Self {
            api: MockSensorApi::new(),
            generator: SensorSampleGenerator::with_clock(profile, FixedClock(FIXED_TIMESTAMP_MS)),
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_api(mut self, api: MockSensorApi) -> Self {
        self.api = api;
        self
    }

    pub async fn send(&mut self, count: usize, interval: Duration) -> SendReport {
        let phase = SendPhase { count, interval };
        run_send_phase(&self.api, &self.generator, &mut self.rng, phase).await
    }

    pub async fn poll(&self, count: usize, interval: Duration) -> PollReport {
        run_poll_phase(&self.api, PollPhase { count, interval }).await
    }

    /// Les deux phases, avec un silence optionnel entre elles
    pub async fn connection(&mut self, send: SendPhase, pause: Duration, poll: PollPhase) -> ConnectionReport {
        let send = run_send_phase(&self.api, &self.generator, &mut self.rng, send).await;
        tokio::time::sleep(pause).await;
        let poll = run_poll_phase(&self.api, poll).await;
        ConnectionReport { send, poll }
    }

    /// Assert qu'exactement `count` lectures ont atteint le serveur
    pub fn assert_posted(&self, count: usize) -> Result<()> {
        let actual = self.api.posted().len();
        if actual != count {
            anyhow::bail!("expected {} posted readings, got {}", count, actual);
        }
        log::info!("✅ {} readings posted as expected", count);
        Ok(())
    }

    /// Assert qu'un champ JSON (chemin pointé) existe dans la lecture `index`
    pub fn assert_field_exists(&self, index: usize, field_path: &str) -> Result<()> {
        let json = self.posted_json(index)?;
        if get_nested_field(&json, field_path).is_none() {
            anyhow::bail!("Field '{}' not found in posted reading #{}", field_path, index);
        }
        Ok(())
    }

    pub fn assert_field_missing(&self, index: usize, field_path: &str) -> Result<()> {
        let json = self.posted_json(index)?;
        if get_nested_field(&json, field_path).is_some() {
            anyhow::bail!("Field '{}' unexpectedly present in posted reading #{}", field_path, index);
        }
        Ok(())
    }

    pub fn assert_field_equals(&self, index: usize, field_path: &str, expected: &Value) -> Result<()> {
        let json = self.posted_json(index)?;
        match get_nested_field(&json, field_path) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => anyhow::bail!(
                "Field '{}' mismatch: expected {:?}, got {:?}",
                field_path, expected, actual
            ),
            None => anyhow::bail!("Field '{}' not found for comparison in reading #{}", field_path, index),
        }
    }

    fn posted_json(&self, index: usize) -> Result<Value> {
        let posted = self.api.posted();
        let Some(payload) = posted.get(index) else {
            anyhow::bail!("no posted reading #{} ({} recorded)", index, posted.len());
        };
        Ok(serde_json::to_value(payload)?)
    }
}

fn get_nested_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(obj) => current = obj.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}
