/*!
# Envmon Core - Modèle et logique des capteurs simulés

Bibliothèque partagée par le simulateur et la devkit:
- Modèle des lectures brutes et dérivées (humidité, pompe, vibration)
- Générateur de lectures synthétiques avec RNG injecté
- Format JSON attendu par l'API environmental-monitor
- Contrats des réponses serveur + trait `SensorApi`
- Scénario en deux phases (envoi Arduino puis observation du fallback)
*/

pub mod model;
pub mod generator;
pub mod payload;
pub mod api;
pub mod scenario;
pub mod report;

pub use model::{DerivedSensorReading, RawSensorInputs};
pub use generator::{Clock, FixedClock, SensorSampleGenerator, SimulationProfile, SystemClock};
pub use payload::SensorPayload;
pub use api::{ApiError, DataSource, SensorApi, StatusResponse};
