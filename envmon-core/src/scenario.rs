//! Two-phase connection scenario
//!
//! Phase 1 envoie N lectures "Arduino" à intervalle fixe, phase 2 interroge
//! le serveur pour observer la bascule `arduino` -> `simulated`. Chaque phase
//! est paramétrée et testable seule; le rythme passe par `tokio::time`,
//! donc les tests tournent en temps virtuel.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::api::{ApiError, DataSource, PostAck, SensorApi, StatusResponse};
use crate::generator::{Clock, SensorSampleGenerator};
use crate::model::DerivedSensorReading;
use crate::payload::SensorPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendPhase {
    pub count: usize,
    pub interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPhase {
    pub count: usize,
    pub interval: Duration,
}

#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub index: usize,
    pub reading: DerivedSensorReading,
    pub result: Result<PostAck, ApiError>,
}

#[derive(Debug, Clone, Default)]
pub struct SendReport {
    pub outcomes: Vec<SendOutcome>,
}

impl SendReport {
    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.accepted()
    }
}

#[derive(Debug, Clone)]
pub struct PollObservation {
    pub index: usize,
    pub result: Result<StatusResponse, ApiError>,
}

impl PollObservation {
    pub fn data_source(&self) -> Option<DataSource> {
        self.result.as_ref().ok().map(|s| s.data_source)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PollReport {
    pub observations: Vec<PollObservation>,
}

impl PollReport {
    /// Changements de source entre deux GET réussis consécutifs.
    /// Les GET en échec sont ignorés.
    pub fn source_transitions(&self) -> Vec<(DataSource, DataSource)> {
        let sources: Vec<DataSource> = self
            .observations
            .iter()
            .filter_map(PollObservation::data_source)
            .collect();

        sources
            .windows(2)
            .filter(|w| w[0] != w[1])
            .map(|w| (w[0], w[1]))
            .collect()
    }

    /// Vrai si l'on a vu `arduino` puis terminé sur `simulated`
    pub fn fell_back(&self) -> bool {
        let mut sources = self.observations.iter().filter_map(PollObservation::data_source);
        let saw_arduino = sources.clone().any(|s| s == DataSource::Arduino);
        saw_arduino && sources.next_back() == Some(DataSource::Simulated)
    }

    pub fn last_source(&self) -> Option<DataSource> {
        self.observations.iter().rev().find_map(PollObservation::data_source)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionReport {
    pub send: SendReport,
    pub poll: PollReport,
}

/// Phase 1 : génère et POST `count` lectures. Un échec est loggé puis on continue.
pub async fn run_send_phase<A, C, R>(
    api: &A,
    generator: &SensorSampleGenerator<C>,
    rng: &mut R,
    phase: SendPhase,
) -> SendReport
where
    A: SensorApi,
    C: Clock,
    R: Rng + ?Sized,
{
    run_send_phase_with(api, generator, rng, phase, |_| {}).await
}

/// Variante avec callback appelé après chaque envoi (affichage console)
pub async fn run_send_phase_with<A, C, R, F>(
    api: &A,
    generator: &SensorSampleGenerator<C>,
    rng: &mut R,
    phase: SendPhase,
    mut on_outcome: F,
) -> SendReport
where
    A: SensorApi,
    C: Clock,
    R: Rng + ?Sized,
    F: FnMut(&SendOutcome),
{
    let mut report = SendReport::default();

    for index in 0..phase.count {
        let reading = generator.generate(rng);
        let payload = SensorPayload::from_reading(&reading, generator.profile());

        let result = api.post_reading(&payload).await;
        match &result {
            Ok(ack) => debug!(
                "send #{}: accepted (source: {})",
                index + 1,
                ack.data_source.unwrap_or_default()
            ),
            Err(e) => warn!("send #{} failed: {}", index + 1, e),
        }

        let outcome = SendOutcome { index, reading, result };
        on_outcome(&outcome);
        report.outcomes.push(outcome);

        if index + 1 < phase.count {
            tokio::time::sleep(phase.interval).await;
        }
    }

    info!("send phase done: {}/{} accepted", report.accepted(), phase.count);
    report
}

/// Phase 2 : `count` GET sur l'endpoint pour suivre la source de données
pub async fn run_poll_phase<A: SensorApi>(api: &A, phase: PollPhase) -> PollReport {
    run_poll_phase_with(api, phase, |_| {}).await
}

pub async fn run_poll_phase_with<A, F>(api: &A, phase: PollPhase, mut on_observation: F) -> PollReport
where
    A: SensorApi,
    F: FnMut(&PollObservation),
{
    let mut report = PollReport::default();

    for index in 0..phase.count {
        let result = api.fetch_status().await;
        if let Err(e) = &result {
            warn!("poll #{} failed: {}", index + 1, e);
        }

        let observation = PollObservation { index, result };
        on_observation(&observation);
        report.observations.push(observation);

        if index + 1 < phase.count {
            tokio::time::sleep(phase.interval).await;
        }
    }

    let transitions = report.source_transitions();
    info!("poll phase done: {} transition(s) observed", transitions.len());
    report
}

/// Enchaîne les deux phases sans état partagé entre elles
pub async fn run_connection_scenario<A, C, R>(
    api: &A,
    generator: &SensorSampleGenerator<C>,
    rng: &mut R,
    send: SendPhase,
    poll: PollPhase,
) -> ConnectionReport
where
    A: SensorApi,
    C: Clock,
    R: Rng + ?Sized,
{
    let send = run_send_phase(api, generator, rng, send).await;
    let poll = run_poll_phase(api, poll).await;
    ConnectionReport { send, poll }
}
