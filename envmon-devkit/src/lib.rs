/*!
# Envmon DevKit - Stubs et Utilitaires pour tester le simulateur

Bibliothèque facilitant les tests sans serveur environmental-monitor:
- Mock de l'API sensors (enregistrement + émulation du fallback)
- Harness de scénarios avec générateur seedé
*/

pub mod mock_api;
pub mod test_utils;

pub use mock_api::MockSensorApi;
pub use test_utils::ScenarioHarness;
