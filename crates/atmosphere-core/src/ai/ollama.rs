use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{error_for_status, http_client, GenerationRequest, LanguageModel, ModelError};

pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:latest";

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        let url = format!("{}/api/generate", self.base_url);

        // Ollama takes a JSON schema directly in `format`
        let body = OllamaRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
            format: request.schema.clone(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let response = error_for_status("Ollama", response).await?;

        let ollama_response: OllamaResponse = response.json().await?;
        Ok(ollama_response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_passes_schema_as_format() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "gemma3:latest",
                "stream": false,
                "format": { "type": "object" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "{}",
                "done": true
            })))
            .mount(&mock_server)
            .await;

        let client = OllamaClient::new(&mock_server.uri()).with_model("gemma3:latest");
        let text = client
            .generate(&GenerationRequest::json("p", json!({ "type": "object" })))
            .await
            .unwrap();
        assert_eq!(text, "{}");
    }
}
