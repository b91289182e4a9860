//! Sensor data model: raw analog inputs and the readings derived from them.

use serde::{Deserialize, Serialize};

/// Pleine échelle de l'ADC 10 bits (soil moisture)
pub const SOIL_ADC_MAX: u16 = 1023;
/// Borne haute du capteur de vibration
pub const VIBRATION_MAX: u16 = 1024;
/// En dessous de ce pourcentage la pompe s'active
pub const PUMP_THRESHOLD_PERCENT: f64 = 30.0;
/// Au dessus de cette valeur brute on lève une alerte vibration
pub const VIBRATION_ALERT_THRESHOLD: u16 = 300;

pub const DISTANCE_RANGE_CM: (f64, f64) = (15.0, 50.0);
pub const TEMPERATURE_RANGE_C: (f64, f64) = (20.0, 35.0);

/// Unscaled values as an Arduino would read them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSensorInputs {
    pub vibration_raw: u16,
    pub soil_moisture_raw: u16,
    pub distance_cm: f64,
    pub temperature_c: Option<f64>,
}

/// One complete reading, built once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSensorReading {
    pub raw: RawSensorInputs,
    pub moisture_percent: f64,
    pub pump_active: bool,
    /// Seulement pour le profil serial-simulation
    pub vibration_alert: Option<bool>,
    pub timestamp_ms: i64,
    pub device_id: String,
}

impl DerivedSensorReading {
    /// Dérive les champs calculés depuis des entrées brutes.
    ///
    /// `with_vibration_alert` contrôle si `vibration_alert` est renseigné,
    /// les autres champs ne dépendent que de `raw`.
    pub fn from_raw(
        raw: RawSensorInputs,
        with_vibration_alert: bool,
        device_id: impl Into<String>,
        timestamp_ms: i64,
    ) -> Self {
        let moisture_percent = moisture_percent(raw.soil_moisture_raw);
        Self {
            raw,
            moisture_percent,
            pump_active: pump_active(moisture_percent),
            vibration_alert: with_vibration_alert.then(|| vibration_alert(raw.vibration_raw)),
            timestamp_ms,
            device_id: device_id.into(),
        }
    }
}

/// P = 100 * (1 - v / 1023), borné à [0, 100]
pub fn moisture_percent(soil_moisture_raw: u16) -> f64 {
    let pct = 100.0 * (1.0 - f64::from(soil_moisture_raw) / f64::from(SOIL_ADC_MAX));
    pct.clamp(0.0, 100.0)
}

pub fn pump_active(moisture_percent: f64) -> bool {
    moisture_percent < PUMP_THRESHOLD_PERCENT
}

pub fn vibration_alert(vibration_raw: u16) -> bool {
    vibration_raw > VIBRATION_ALERT_THRESHOLD
}

/// Arrondi à une décimale, comme les valeurs envoyées par la carte
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
