//! Synthetic sensor readings
//!
//! Le générateur ne possède pas son RNG: l'appelant passe un `Rng`
//! (seedé dans les tests, `StdRng::from_entropy` en prod) et une horloge,
//! ce qui rend chaque lecture reproductible.

use std::ops::RangeInclusive;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{
    round1, DerivedSensorReading, RawSensorInputs, DISTANCE_RANGE_CM, SOIL_ADC_MAX,
    TEMPERATURE_RANGE_C, VIBRATION_MAX,
};

/// The three flavours of simulated Arduino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationProfile {
    /// Plage ADC complète, pas de température
    ApiTest,
    /// Plage réaliste 200..=900, température, clé `moisturePercent`
    ArduinoConnection,
    /// Comme ArduinoConnection + alerte vibration
    SerialSimulation,
}

impl SimulationProfile {
    pub fn soil_range(self) -> RangeInclusive<u16> {
        match self {
            SimulationProfile::ApiTest => 0..=SOIL_ADC_MAX,
            SimulationProfile::ArduinoConnection | SimulationProfile::SerialSimulation => 200..=900,
        }
    }

    pub fn has_temperature(self) -> bool {
        !matches!(self, SimulationProfile::ApiTest)
    }

    pub fn has_vibration_alert(self) -> bool {
        matches!(self, SimulationProfile::SerialSimulation)
    }

    /// Le serveur accepte `moisturePercent` en priorité sur le calcul depuis le brut
    pub fn sends_moisture_percent_key(self) -> bool {
        matches!(self, SimulationProfile::ArduinoConnection)
    }

    pub fn default_device_id(self) -> &'static str {
        match self {
            SimulationProfile::ArduinoConnection => "arduino_env_monitor",
            SimulationProfile::ApiTest | SimulationProfile::SerialSimulation => "arduino_simulator",
        }
    }
}

/// Source of `timestamp_ms`
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Horloge figée pour les tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

pub struct SensorSampleGenerator<C: Clock = SystemClock> {
    profile: SimulationProfile,
    device_id: String,
    clock: C,
}

impl SensorSampleGenerator<SystemClock> {
    pub fn new(profile: SimulationProfile) -> Self {
        Self::with_clock(profile, SystemClock)
    }
}

impl<C: Clock> SensorSampleGenerator<C> {
    pub fn with_clock(profile: SimulationProfile, clock: C) -> Self {
        Self {
            profile,
            device_id: profile.default_device_id().to_string(),
            clock,
        }
    }

    /// Remplace l'identifiant par défaut du profil
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    pub fn profile(&self) -> SimulationProfile {
        self.profile
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Draw one set of raw inputs within the profile's domains
    pub fn sample_raw<R: Rng + ?Sized>(&self, rng: &mut R) -> RawSensorInputs {
        let vibration_raw = rng.gen_range(0..=VIBRATION_MAX);
        let soil_moisture_raw = rng.gen_range(self.profile.soil_range());
        let distance_cm = round1(uniform(rng, DISTANCE_RANGE_CM));
        let temperature_c = self
            .profile
            .has_temperature()
            .then(|| round1(uniform(rng, TEMPERATURE_RANGE_C)));

        RawSensorInputs {
            vibration_raw,
            soil_moisture_raw,
            distance_cm,
            temperature_c,
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> DerivedSensorReading {
        let raw = self.sample_raw(rng);
        let reading = self.derive(raw);
        debug!(
            "generated reading: soil={} moisture={:.1}% pump={} vibration={}",
            raw.soil_moisture_raw, reading.moisture_percent, reading.pump_active, raw.vibration_raw
        );
        reading
    }

    /// Same derivation as `generate`, from caller-supplied inputs
    pub fn derive(&self, raw: RawSensorInputs) -> DerivedSensorReading {
        DerivedSensorReading::from_raw(
            raw,
            self.profile.has_vibration_alert(),
            self.device_id.clone(),
            self.clock.now_ms(),
        )
    }
}

// low + U[0,1) * (high - low), comme `15 + random() * 35`
fn uniform<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    low + rng.gen::<f64>() * (high - low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PROFILES: [SimulationProfile; 3] = [
        SimulationProfile::ApiTest,
        SimulationProfile::ArduinoConnection,
        SimulationProfile::SerialSimulation,
    ];

    #[test]
    fn test_generated_values_stay_in_domain() {
        let mut rng = StdRng::seed_from_u64(7);
        for profile in PROFILES {
            let generator = SensorSampleGenerator::with_clock(profile, FixedClock(0));
            for _ in 0..2000 {
                let r = generator.generate(&mut rng);
                assert!(r.raw.vibration_raw <= VIBRATION_MAX);
                assert!(profile.soil_range().contains(&r.raw.soil_moisture_raw));
                assert!((15.0..=50.0).contains(&r.raw.distance_cm));
                assert!((0.0..=100.0).contains(&r.moisture_percent));
                assert_eq!(r.pump_active, r.moisture_percent < 30.0);

                match r.raw.temperature_c {
                    Some(t) => {
                        assert!(profile.has_temperature());
                        assert!((20.0..=35.0).contains(&t));
                    }
                    None => assert!(!profile.has_temperature()),
                }
            }
        }
    }

    #[test]
    fn test_vibration_alert_only_for_serial_profile() {
        let mut rng = StdRng::seed_from_u64(11);
        for profile in PROFILES {
            let generator = SensorSampleGenerator::with_clock(profile, FixedClock(0));
            for _ in 0..200 {
                let r = generator.generate(&mut rng);
                if profile == SimulationProfile::SerialSimulation {
                    assert_eq!(r.vibration_alert, Some(r.raw.vibration_raw > 300));
                } else {
                    assert_eq!(r.vibration_alert, None);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_readings() {
        let generator = SensorSampleGenerator::with_clock(
            SimulationProfile::SerialSimulation,
            FixedClock(1_700_000_000_000),
        );
        let mut a = StdRng::seed_from_u64(2024);
        let mut b = StdRng::seed_from_u64(2024);

        let first: Vec<_> = (0..50).map(|_| generator.generate(&mut a)).collect();
        let second: Vec<_> = (0..50).map(|_| generator.generate(&mut b)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_derive_uses_clock_and_device_id() {
        let generator = SensorSampleGenerator::with_clock(SimulationProfile::ApiTest, FixedClock(99))
            .with_device_id("bench-01");
        let reading = generator.derive(RawSensorInputs {
            vibration_raw: 0,
            soil_moisture_raw: 1023,
            distance_cm: 15.0,
            temperature_c: None,
        });

        assert_eq!(reading.timestamp_ms, 99);
        assert_eq!(reading.device_id, "bench-01");
        assert_eq!(reading.moisture_percent, 0.0);
        assert!(reading.pump_active);
    }

    #[test]
    fn test_default_device_ids() {
        assert_eq!(SimulationProfile::ApiTest.default_device_id(), "arduino_simulator");
        assert_eq!(SimulationProfile::ArduinoConnection.default_device_id(), "arduino_env_monitor");
        let generator = SensorSampleGenerator::new(SimulationProfile::SerialSimulation);
        assert_eq!(generator.device_id(), "arduino_simulator");
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2023-11-14 en ms
        assert!(SystemClock.now_ms() > 1_700_000_000_000);
    }
}
