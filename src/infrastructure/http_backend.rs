// REST client for the sensor backend - readings, thresholds and phone number
use crate::application::telemetry_source::{SettingsEndpoint, SourceError, TelemetrySource};
use crate::domain::reading::Reading;
use crate::domain::settings::{NotificationConfig, ThresholdConfig};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SENSOR_PATH: &str = "/api/sensor";
const SENSOR_FILTERED_PATH: &str = "/api/sensor/filtered";
const THRESHOLD_PATH: &str = "/api/threshold";
const THRESHOLD_CREATE_PATH: &str = "/api/threshold/create";
const PHONE_PATH: &str = "/api/phone";
const PHONE_CREATE_PATH: &str = "/api/phone/create";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Every GET answers `{"data": ...}`; `data` may be null or missing.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, SourceError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| transport(&url, e))?;

        let response = ensure_success(&url, response).await?;

        let envelope = response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| decode(&url, e))?;

        Ok(envelope.data)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, SourceError> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;

        let response = ensure_success(&url, response).await?;

        // A 2xx without a JSON body does not count as a save
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| decode(&url, e))
    }
}

async fn ensure_success(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, SourceError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Status {
        url: url.to_string(),
        status,
        body,
    })
}

fn transport(url: &str, e: reqwest::Error) -> SourceError {
    SourceError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

fn decode(url: &str, e: reqwest::Error) -> SourceError {
    SourceError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl TelemetrySource for HttpBackend {
    async fn recent_readings(&self) -> Result<Vec<Reading>, SourceError> {
        Ok(self.get_data(SENSOR_PATH).await?.unwrap_or_default())
    }

    async fn filtered_readings(&self) -> Result<Vec<Reading>, SourceError> {
        Ok(self.get_data(SENSOR_FILTERED_PATH).await?.unwrap_or_default())
    }
}

#[async_trait]
impl SettingsEndpoint<ThresholdConfig> for HttpBackend {
    async fn load(&self) -> Result<ThresholdConfig, SourceError> {
        Ok(self.get_data(THRESHOLD_PATH).await?.unwrap_or_default())
    }

    async fn save(&self, value: &ThresholdConfig) -> Result<(), SourceError> {
        let reply = self.post_json(THRESHOLD_CREATE_PATH, value).await?;
        tracing::debug!("Threshold save acknowledged: {}", reply);
        Ok(())
    }
}

#[async_trait]
impl SettingsEndpoint<NotificationConfig> for HttpBackend {
    async fn load(&self) -> Result<NotificationConfig, SourceError> {
        Ok(self.get_data(PHONE_PATH).await?.unwrap_or_default())
    }

    async fn save(&self, value: &NotificationConfig) -> Result<(), SourceError> {
        let reply = self.post_json(PHONE_CREATE_PATH, value).await?;
        tracing::debug!("Phone number save acknowledged: {}", reply);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::ThresholdValue;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_recent_readings() {
        let router = Router::new().route(
            "/api/sensor",
            get(|| async {
                Json(json!({"data": [
                    {"_id": "a", "createdAt": "2024-03-13T10:00:00Z", "temperature": 21.5, "humidity": 40.1, "status": "NORMAL"},
                    {"_id": "b", "createdAt": "2024-03-13T10:01:00Z", "temperature": 31.0, "humidity": 80.0, "status": "BOTH_EXCEED"}
                ]}))
            }),
        );
        let base = serve(router).await;

        let readings = backend(&base).recent_readings().await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].id, "b");
    }

    #[tokio::test]
    async fn test_null_data_is_empty() {
        let router = Router::new()
            .route("/api/sensor/filtered", get(|| async { Json(json!({"data": null})) }))
            .route("/api/threshold", get(|| async { Json(json!({})) }));
        let base = serve(router).await;
        let backend = backend(&base);

        assert!(backend.filtered_readings().await.unwrap().is_empty());
        let thresholds = SettingsEndpoint::<ThresholdConfig>::load(&backend).await.unwrap();
        assert!(thresholds.temperature.is_blank());
    }

    #[tokio::test]
    async fn test_status_error() {
        let router = Router::new().route(
            "/api/sensor",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;

        let err = backend(&base).recent_readings().await.unwrap_err();
        match err {
            SourceError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let router = Router::new().route("/api/sensor", get(|| async { "not json" }));
        let base = serve(router).await;

        let err = backend(&base).recent_readings().await.unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend(&format!("http://{}", addr))
            .recent_readings()
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_save_posts_wire_shapes() {
        let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let thresholds_seen = received.clone();
        let phone_seen = received.clone();
        let router = Router::new()
            .route(
                "/api/threshold/create",
                post(move |Json(body): Json<Value>| async move {
                    thresholds_seen.lock().unwrap().push(body);
                    Json(json!({"message": "ok"}))
                }),
            )
            .route(
                "/api/phone/create",
                post(move |Json(body): Json<Value>| async move {
                    phone_seen.lock().unwrap().push(body);
                    Json(json!({"message": "ok"}))
                }),
            );
        let base = serve(router).await;
        let backend = backend(&base);

        let thresholds = ThresholdConfig::new(
            ThresholdValue::Number(30.0),
            ThresholdValue::Text("75".to_string()),
        );
        backend.save(&thresholds).await.unwrap();
        backend.save(&NotificationConfig::new("+15550100")).await.unwrap();

        let bodies = received.lock().unwrap().clone();
        assert_eq!(bodies[0], json!({"temperature": 30.0, "humidity": "75"}));
        assert_eq!(bodies[1], json!({"phoneNumber": "+15550100"}));
    }

    #[tokio::test]
    async fn test_save_without_json_reply_fails() {
        let router =
            Router::new().route("/api/phone/create", post(|| async { StatusCode::NO_CONTENT }));
        let base = serve(router).await;

        let err = backend(&base)
            .save(&NotificationConfig::new("+15550100"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }
}
