/*!
Mock Sensor API pour développement sans serveur

Permet de tester les scénarios sans lancer le serveur Next.js.
Enregistre toutes les lectures POSTées et répond aux GET en émulant la
bascule du serveur : `arduino` tant qu'un POST date de moins de
`arduino_timeout`, `simulated` ensuite. Des réponses scriptées ou des
échecs peuvent être injectés.
*/

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use envmon_core::api::{
    BulkAck, EarthquakeView, FloodView, IrrigationView, PostAck, SensorSnapshot,
};
use envmon_core::{ApiError, DataSource, SensorApi, SensorPayload, StatusResponse};
use parking_lot::Mutex;
use tokio::time::Instant;

/// Délai après lequel le serveur réel repasse en données simulées
pub const SERVER_ARDUINO_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Default)]
struct MockState {
    posted: Vec<SensorPayload>,
    bulk_batches: Vec<Vec<SensorPayload>>,
    post_script: VecDeque<Result<PostAck, ApiError>>,
    status_script: VecDeque<Result<StatusResponse, ApiError>>,
    last_post: Option<(Instant, chrono::DateTime<Utc>)>,
    status_calls: usize,
}

/// Mock qui implémente `SensorApi` comme le client reqwest
#[derive(Clone)]
pub struct MockSensorApi {
    state: Arc<Mutex<MockState>>,
    arduino_timeout: Duration,
}

impl MockSensorApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            arduino_timeout: SERVER_ARDUINO_TIMEOUT,
        }
    }

    pub fn with_arduino_timeout(mut self, timeout: Duration) -> Self {
        self.arduino_timeout = timeout;
        self
    }

    /// Les prochains POST renverront ces résultats, dans l'ordre
    pub fn script_posts<I>(&self, results: I)
    where
        I: IntoIterator<Item = Result<PostAck, ApiError>>,
    {
        self.state.lock().post_script.extend(results);
    }

    /// Les prochains GET renverront ces résultats au lieu de l'émulation
    pub fn script_statuses<I>(&self, results: I)
    where
        I: IntoIterator<Item = Result<StatusResponse, ApiError>>,
    {
        self.state.lock().status_script.extend(results);
    }

    /// Récupère toutes les lectures reçues (pour assertions de tests)
    pub fn posted(&self) -> Vec<SensorPayload> {
        self.state.lock().posted.clone()
    }

    pub fn bulk_batches(&self) -> Vec<Vec<SensorPayload>> {
        self.state.lock().bulk_batches.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().status_calls
    }

    pub fn clear(&self) {
        *self.state.lock() = MockState::default();
    }

    fn emulated_status(&self, state: &MockState) -> StatusResponse {
        let live = state
            .last_post
            .filter(|(at, _)| at.elapsed() < self.arduino_timeout);

        match (live, state.posted.last()) {
            (Some((_, wall)), Some(last)) => StatusResponse {
                success: true,
                data: Some(snapshot_from(last)),
                data_source: DataSource::Arduino,
                arduino_connected: true,
                last_arduino_update: Some(wall),
            },
            _ => StatusResponse {
                success: true,
                data: Some(SensorSnapshot::default()),
                data_source: DataSource::Simulated,
                arduino_connected: false,
                last_arduino_update: state.last_post.map(|(_, wall)| wall),
            },
        }
    }
}

impl Default for MockSensorApi {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot_from(payload: &SensorPayload) -> SensorSnapshot {
    SensorSnapshot {
        earthquake: EarthquakeView {
            magnitude: 0.0,
            vibration_value: Some(payload.vibration_value),
            status: None,
        },
        irrigation: IrrigationView {
            soil_moisture: payload.moisture().unwrap_or_default(),
            pump_status: Some(payload.pump_status),
            status: None,
        },
        flood: FloodView {
            distance: payload.distance,
            water_level: None,
            status: None,
        },
    }
}

impl SensorApi for MockSensorApi {
    async fn post_reading(&self, payload: &SensorPayload) -> Result<PostAck, ApiError> {
        let mut state = self.state.lock();
        let result = state.post_script.pop_front().unwrap_or_else(|| {
            Ok(PostAck {
                success: true,
                message: Some("Arduino sensor data received and processed successfully".into()),
                data_source: Some(DataSource::Arduino),
            })
        });

        // une lecture rejetée ne rafraîchit pas la connexion Arduino
        if result.is_ok() {
            state.posted.push(payload.clone());
            state.last_post = Some((Instant::now(), Utc::now()));
        }

        log::info!("📤 [MOCK] POST reading from {}: {}", payload.device_id, if result.is_ok() { "ok" } else { "err" });
        result
    }

    async fn post_bulk(&self, payloads: &[SensorPayload]) -> Result<BulkAck, ApiError> {
        self.state.lock().bulk_batches.push(payloads.to_vec());
        log::info!("📤 [MOCK] POST bulk: {} records", payloads.len());
        Ok(BulkAck {
            success: true,
            message: Some("Bulk data received successfully".into()),
            records_processed: Some(payloads.len() as u64),
        })
    }

    async fn fetch_status(&self) -> Result<StatusResponse, ApiError> {
        let mut state = self.state.lock();
        state.status_calls += 1;
        let result = match state.status_script.pop_front() {
            Some(scripted) => scripted,
            None => Ok(self.emulated_status(&state)),
        };
        log::info!("📨 [MOCK] GET status #{}", state.status_calls);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envmon_core::{FixedClock, SensorSampleGenerator, SimulationProfile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn payload() -> SensorPayload {
        let generator = SensorSampleGenerator::with_clock(SimulationProfile::ArduinoConnection, FixedClock(0));
        let mut rng = StdRng::seed_from_u64(1);
        SensorPayload::from_reading(&generator.generate(&mut rng), SimulationProfile::ArduinoConnection)
    }

    #[tokio::test]
    async fn test_mock_records_posts() {
        let api = MockSensorApi::new();
        let p = payload();

        let ack = api.post_reading(&p).await.unwrap();
        assert_eq!(ack.data_source, Some(DataSource::Arduino));
        assert_eq!(api.posted(), vec![p]);
    }

    #[tokio::test]
    async fn test_scripted_failure_is_not_recorded() {
        let api = MockSensorApi::new();
        api.script_posts([Err(ApiError::Status(500))]);

        assert_eq!(api.post_reading(&payload()).await, Err(ApiError::Status(500)));
        assert!(api.posted().is_empty());

        // le script est consommé, retour au comportement par défaut
        assert!(api.post_reading(&payload()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_emulated_fallback_after_timeout() {
        let api = MockSensorApi::new();

        let before = api.fetch_status().await.unwrap();
        assert_eq!(before.data_source, DataSource::Simulated);
        assert!(before.last_arduino_update.is_none());

        let p = payload();
        api.post_reading(&p).await.unwrap();
        let live = api.fetch_status().await.unwrap();
        assert_eq!(live.data_source, DataSource::Arduino);
        assert!(live.arduino_connected);
        assert_eq!(live.data.unwrap().flood.distance, p.distance);

        tokio::time::advance(SERVER_ARDUINO_TIMEOUT).await;
        let after = api.fetch_status().await.unwrap();
        assert_eq!(after.data_source, DataSource::Simulated);
        assert!(!after.arduino_connected);
        assert!(after.last_arduino_update.is_some());
        assert_eq!(api.status_calls(), 3);
    }

    #[tokio::test]
    async fn test_bulk_and_clear() {
        let api = MockSensorApi::new();
        let ack = api.post_bulk(&[payload(), payload()]).await.unwrap();
        assert_eq!(ack.records_processed, Some(2));
        assert_eq!(api.bulk_batches().len(), 1);

        api.clear();
        assert!(api.bulk_batches().is_empty());
        assert_eq!(api.status_calls(), 0);
    }
}
