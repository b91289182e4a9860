/**
 * CLIENT HTTP SENSORS - Implémentation reqwest de `SensorApi`
 *
 * RÔLE :
 * Parle à l'endpoint /api/sensors du dashboard (POST lecture, POST bulk, GET état).
 *
 * FONCTIONNEMENT :
 * - Un seul `reqwest::Client` réutilisé, timeout global configurable
 * - Statut != 200 -> `ApiError::Status`, pas de retry ni backoff
 * - Corps d'une réponse en échec lu quand même : `dataSource: "error"` est loggé
 * - Erreurs réseau / JSON converties en `ApiError` pour les scénarios
 */

use envmon_core::api::{BulkAck, PostAck};
use envmon_core::{ApiError, DataSource, SensorApi, SensorPayload, StatusResponse};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::HttpConfig;

pub struct HttpSensorApi {
    client: Client,
    api_url: String,
    bulk_url: String,
}

impl HttpSensorApi {
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("envmon-simulator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            bulk_url: config.bulk_url(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(connection_error)?;
        decode(response).await
    }
}

fn connection_error(e: reqwest::Error) -> ApiError {
    ApiError::Connection(e.to_string())
}

/// Corps renvoyé par le serveur avec un statut d'erreur
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FailureBody {
    error: Option<String>,
    data_source: Option<DataSource>,
}

fn failure_body(bytes: &[u8]) -> Option<FailureBody> {
    serde_json::from_slice(bytes).ok()
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    debug!("{} <- {}", status, response.url());
    if status != StatusCode::OK {
        let bytes = response.bytes().await.unwrap_or_default();
        if let Some(body) = failure_body(&bytes) {
            warn!(
                "server answered {}: {} (data source: {})",
                status,
                body.error.as_deref().unwrap_or("-"),
                body.data_source.unwrap_or_default()
            );
        }
        return Err(ApiError::Status(status.as_u16()));
    }

    let bytes = response.bytes().await.map_err(connection_error)?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

impl SensorApi for HttpSensorApi {
    async fn post_reading(&self, payload: &SensorPayload) -> Result<PostAck, ApiError> {
        self.post_json(&self.api_url, payload).await
    }

    async fn post_bulk(&self, payloads: &[SensorPayload]) -> Result<BulkAck, ApiError> {
        self.post_json(&self.bulk_url, payloads).await
    }

    async fn fetch_status(&self) -> Result<StatusResponse, ApiError> {
        let response = self
            .client
            .get(&self.api_url)
            .send()
            .await
            .map_err(connection_error)?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serveur local qui répond une seule fois avec une réponse figée
    async fn canned_server(status_line: &str, body: &str) -> HttpSensorApi {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        let config = HttpConfig {
            api_url: format!("http://{addr}/api/sensors"),
            timeout_secs: 5,
        };
        HttpSensorApi::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let api = canned_server("500 Internal Server Error", r#"{"success":false,"error":"boom"}"#).await;
        assert_eq!(api.fetch_status().await, Err(ApiError::Status(500)));
    }

    #[tokio::test]
    async fn test_error_source_body_still_maps_to_status() {
        let body = r#"{"success":false,"error":"Failed to fetch sensor data","dataSource":"error"}"#;
        let api = canned_server("500 Internal Server Error", body).await;
        assert_eq!(api.fetch_status().await, Err(ApiError::Status(500)));
    }

    #[test]
    fn test_failure_body_exposes_error_source() {
        let body = failure_body(br#"{"success":false,"error":"Failed to fetch sensor data","dataSource":"error"}"#).unwrap();
        assert_eq!(body.data_source, Some(DataSource::Error));
        assert_eq!(body.error.as_deref(), Some("Failed to fetch sensor data"));

        assert!(failure_body(b"<html>502</html>").is_none());
    }

    #[tokio::test]
    async fn test_non_200_success_is_still_status() {
        let api = canned_server("201 Created", r#"{"success":true}"#).await;
        assert_eq!(api.fetch_status().await, Err(ApiError::Status(201)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let api = canned_server("200 OK", "not json").await;
        assert!(matches!(api.fetch_status().await, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_status_body_is_parsed() {
        let body = r#"{"success":true,"data":{"earthquake":{"magnitude":2.4,"vibrationValue":410,"status":"safe"},"irrigation":{"soilMoisture":35.2,"pumpStatus":false,"status":"safe"},"flood":{"waterLevel":30.0,"distance":20.0,"status":"safe"}},"timestamp":"2025-01-01T00:00:01.000Z","dataSource":"arduino","arduinoConnected":true,"lastArduinoUpdate":"2025-01-01T00:00:00.000Z"}"#;
        let api = canned_server("200 OK", body).await;

        let status = api.fetch_status().await.unwrap();
        assert_eq!(status.data_source, DataSource::Arduino);
        assert!(status.arduino_connected);
        assert_eq!(status.data.unwrap().irrigation.soil_moisture, 35.2);
    }

    #[test]
    fn test_client_urls() {
        let config = HttpConfig {
            api_url: "http://127.0.0.1:3000/api/sensors".into(),
            timeout_secs: 1,
        };
        let api = HttpSensorApi::new(&config).unwrap();
        assert_eq!(api.api_url(), "http://127.0.0.1:3000/api/sensors");
        assert_eq!(api.bulk_url, "http://127.0.0.1:3000/api/sensors/bulk");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // port 9 (discard) : rien n'écoute en local
        let config = HttpConfig {
            api_url: "http://127.0.0.1:9/api/sensors".into(),
            timeout_secs: 2,
        };
        let api = HttpSensorApi::new(&config).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), api.fetch_status()).await.unwrap();
        assert!(matches!(result, Err(ApiError::Connection(_))));
    }
}
