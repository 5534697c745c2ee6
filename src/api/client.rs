//! HTTP client for the wallet classification API.

use crate::graph::types::ClassificationResult;
use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, info};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_MODEL: &str = "first_Graph2Vec_RF.joblib";

const CLASSIFY_PATH: &str = "/api/py/classify";

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    wallet_address: &'a str,
    model_name: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn classify_url(&self) -> String {
        format!("{}{}", self.base_url, CLASSIFY_PATH)
    }

    /// Ask the classifier for a wallet's fraud probability and transaction graph
    pub fn classify(&self, wallet_address: &str, model_name: &str) -> Result<ClassificationResult> {
        let url = self.classify_url();
        info!(%url, wallet_address, model_name, "classifying wallet");

        let resp = self
            .client
            .post(&url)
            .json(&ClassifyRequest {
                wallet_address,
                model_name,
            })
            .send()
            .with_context(|| format!("request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("classifier returned status {status}");
        }

        let body = resp.text().context("failed to read classifier response")?;
        debug!(bytes = body.len(), "classifier responded");
        parse_classification(&body)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

/// Decode a classify response body
pub fn parse_classification(body: &str) -> Result<ClassificationResult> {
    serde_json::from_str(body).context("invalid classification response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_response() {
        let body = r#"{
            "fraud_probability": 0.5,
            "graph": {
                "nodes": [{"id": "0xa", "label": "0xa"}],
                "edges": [{"source": "0xa", "target": "0xa", "value": 1.25, "timestamp": "1700000000"}]
            }
        }"#;
        let result = parse_classification(body).unwrap();
        assert_eq!(result.probability_label(), "50.00%");
        assert_eq!(result.graph.edges[0].timestamp, "1700000000");
    }

    #[test]
    fn missing_graph_lists_default_to_empty() {
        let result = parse_classification(r#"{"fraud_probability": 0.1, "graph": {}}"#).unwrap();
        assert!(result.graph.nodes.is_empty());
        assert!(result.graph.edges.is_empty());
    }

    #[test]
    fn undecodable_body_is_an_error() {
        assert!(parse_classification("<html>502</html>").is_err());
        assert!(parse_classification(r#"{"graph": {"nodes": []}}"#).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:9000/");
        assert_eq!(client.classify_url(), "http://localhost:9000/api/py/classify");
    }

    #[test]
    fn request_body_uses_api_field_names() {
        let json = serde_json::to_value(ClassifyRequest {
            wallet_address: "0xabc",
            model_name: DEFAULT_MODEL,
        })
        .unwrap();
        assert_eq!(json["wallet_address"], "0xabc");
        assert_eq!(json["model_name"], "first_Graph2Vec_RF.joblib");
    }
}
