use serde::{Deserialize, Serialize};

use crate::generator::SimulationProfile;
use crate::model::{round1, DerivedSensorReading};

/// Corps JSON POSTé sur /api/sensors (mêmes clés que le firmware Arduino)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorPayload {
    pub timestamp: i64,
    pub distance: f64,
    pub soil_moisture_raw: u16,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub soil_moisture: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub moisture_percent: Option<f64>,
    pub vibration_value: u16,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<f64>,
    pub pump_status: bool,
    pub device_id: String,
}

impl SensorPayload {
    pub fn from_reading(reading: &DerivedSensorReading, profile: SimulationProfile) -> Self {
        let moisture = round1(reading.moisture_percent);
        let (soil_moisture, moisture_percent) = if profile.sends_moisture_percent_key() {
            (None, Some(moisture))
        } else {
            (Some(moisture), None)
        };

        Self {
            timestamp: reading.timestamp_ms,
            distance: reading.raw.distance_cm,
            soil_moisture_raw: reading.raw.soil_moisture_raw,
            soil_moisture,
            moisture_percent,
            vibration_value: reading.raw.vibration_raw,
            temperature: reading.raw.temperature_c,
            pump_status: reading.pump_active,
            device_id: reading.device_id.clone(),
        }
    }

    /// Valeur d'humidité envoyée, quelle que soit la clé utilisée
    pub fn moisture(&self) -> Option<f64> {
        self.moisture_percent.or(self.soil_moisture)
    }
}
