//! Typed HTTP client for the node API

use std::time::Duration;

use medassist_risk::RiskAssessment;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DiseaseInfo {
    pub description: String,
    pub symptoms: Vec<String>,
    pub treatment: String,
    pub exercise: String,
    pub sleep_hours: String,
    pub diet: String,
}

impl DiseaseInfo {
    pub fn is_not_found(&self) -> bool {
        self.symptoms.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DiseaseSummary {
    pub name: String,
    pub description: String,
    pub treatment: String,
}

#[derive(Debug, Deserialize)]
struct RelatedDiseases {
    diseases: Vec<DiseaseSummary>,
}

#[derive(Debug, Deserialize)]
struct HealthTip {
    tip: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RiskReportView {
    pub score: u32,
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Referral {
    pub provider_name: String,
    pub provider_link: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DiagnosisOutcome {
    pub label: String,
    pub confidence: f64,
    pub present_symptoms: Vec<String>,
    pub referral: Referral,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionView {
    pub session_id: String,
    pub state: String,
    pub question_text: Option<String>,
    pub result: Option<DiagnosisOutcome>,
}

impl SessionView {
    pub fn is_terminal(&self) -> bool {
        self.state == "terminal"
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiClient {
    base_url: Url,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Self::with_http_client(base_url, http)
    }

    pub fn with_http_client(base_url: &str, http: Client) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { base_url, http })
    }

    /// Endpoint under the base URL; each segment is percent-encoded, so
    /// names such as `Pain in neck/jaw` stay one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let url = self.endpoint(&["health"])?;
        decode(self.http.get(url).send().await?).await
    }

    pub async fn disease_info(&self, disease: &str) -> Result<DiseaseInfo, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["get_disease_info"])?)
            .json(&json!({ "disease": disease }))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn related_diseases(&self, symptom: &str) -> Result<Vec<DiseaseSummary>, ClientError> {
        let url = self.endpoint(&["symptoms", symptom.trim(), "diseases"])?;
        let related: RelatedDiseases = decode(self.http.get(url).send().await?).await?;
        Ok(related.diseases)
    }

    pub async fn health_tip(&self, disease: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&["diseases", disease.trim(), "tip"])?;
        let tip: HealthTip = decode(self.http.get(url).send().await?).await?;
        Ok(tip.tip)
    }

    pub async fn assess_risk(
        &self,
        assessment: &RiskAssessment,
    ) -> Result<RiskReportView, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["risk", "assess"])?)
            .json(assessment)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn start_session(&self) -> Result<SessionView, ClientError> {
        let url = self.endpoint(&["diagnosis", "sessions"])?;
        decode(self.http.post(url).send().await?).await
    }

    pub async fn answer(&self, session_id: &str, present: bool) -> Result<SessionView, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["diagnosis", "sessions", session_id, "answer"])?)
            .json(&json!({ "answer": present }))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn discard_session(&self, session_id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint(&["diagnosis", "sessions", session_id])?)
            .send()
            .await?;
        let _: Value = decode(response).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    Err(ClientError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::new("http://localhost:8000").unwrap();

        let url = client.endpoint(&["diseases", "heart disease", "tip"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/diseases/heart%20disease/tip");

        let url = client
            .endpoint(&["symptoms", "Pain in neck/jaw", "diseases"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/symptoms/Pain%20in%20neck%2Fjaw/diseases"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("http://example.org/medassist/").unwrap();
        let url = client.endpoint(&["health"]).unwrap();
        assert_eq!(url.as_str(), "http://example.org/medassist/health");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.org"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_session_view_parses_server_shape() {
        let json = r#"{
            "session_id": "6f1c2a6e-8d7b-4d89-9d4f-3c1e6f0b1a22",
            "state": "terminal",
            "question": null,
            "question_text": null,
            "asked": ["fever"],
            "result": {
                "label": "Flu",
                "confidence": 0.5,
                "present_symptoms": ["fever"],
                "referral": {"disease_name": "Flu", "provider_name": "Dr. Lee", "provider_link": "https://example.org/lee"},
                "answers": [{"feature_name": "fever", "present": true}]
            }
        }"#;

        let view: SessionView = serde_json::from_str(json).unwrap();
        assert!(view.is_terminal());
        assert_eq!(view.result.unwrap().referral.provider_name, "Dr. Lee");
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        let url = client.endpoint(&["diagnosis", "sessions"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/diagnosis/sessions");
    }
}
