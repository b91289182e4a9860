/**
 * CONTRAT API SENSORS - Modèles des réponses du serveur environmental-monitor
 *
 * RÔLE :
 * Décrit ce que l'on attend de /api/sensors (POST, GET) et /api/sensors/bulk.
 * Le serveur est un collaborateur externe : on ne modélise que les champs
 * observés, tout le reste est optionnel ou ignoré.
 *
 * FONCTIONNEMENT :
 * - `SensorApi` est la couture entre scénarios et transport HTTP
 * - Implémentations : reqwest (simulateur) et mock mémoire (devkit)
 * - `ApiError` couvre les seuls échecs possibles : réseau, statut, JSON
 */

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::payload::SensorPayload;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Valeur de `dataSource` renvoyée par le serveur
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Arduino,
    Simulated,
    /// Seulement dans le corps d'une réponse 5xx (le client HTTP la logge)
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataSource::Arduino => "arduino",
            DataSource::Simulated => "simulated",
            DataSource::Error => "error",
            DataSource::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Réponse au POST /api/sensors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAck {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data_source: Option<DataSource>,
}

/// Réponse au POST /api/sensors/bulk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAck {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub records_processed: Option<u64>,
}

/// Réponse au GET /api/sensors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<SensorSnapshot>,
    #[serde(default)]
    pub data_source: DataSource,
    #[serde(default)]
    pub arduino_connected: bool,
    pub last_arduino_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub earthquake: EarthquakeView,
    pub irrigation: IrrigationView,
    pub flood: FloodView,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthquakeView {
    pub magnitude: f64,
    pub vibration_value: Option<u16>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrigationView {
    pub soil_moisture: f64,
    pub pump_status: Option<bool>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodView {
    pub distance: f64,
    pub water_level: Option<f64>,
    pub status: Option<String>,
}

/// Transport vers l'endpoint sensors
#[allow(async_fn_in_trait)]
pub trait SensorApi {
    async fn post_reading(&self, payload: &SensorPayload) -> Result<PostAck, ApiError>;

    async fn post_bulk(&self, payloads: &[SensorPayload]) -> Result<BulkAck, ApiError>;

    async fn fetch_status(&self) -> Result<StatusResponse, ApiError>;
}
