use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
};

const DEFAULT_OLLAMA_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let (host, port) = split_base_url(&base_url);
        let client = Ollama::new(host, port);

        Ok(Self { client, model })
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

/// Split `scheme://host:port` into the `(scheme://host, port)` pair ollama-rs expects.
fn split_base_url(base_url: &str) -> (String, u16) {
    let (scheme, rest) = match base_url.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", base_url),
    };
    let rest = rest.trim_end_matches('/');

    let (host, port) = match rest.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().unwrap_or(DEFAULT_OLLAMA_PORT)),
        None => (rest, DEFAULT_OLLAMA_PORT),
    };
    let host = if host.is_empty() { "localhost" } else { host };

    (format!("{}://{}", scheme, host), port)
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt.to_string())]).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parsing_full() {
        let (host, port) = split_base_url("http://localhost:11434");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn test_url_parsing_no_port() {
        let (host, port) = split_base_url("http://localhost");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, DEFAULT_OLLAMA_PORT);
    }

    #[test]
    fn test_url_parsing_custom_port() {
        let (host, port) = split_base_url("https://192.168.1.100:8080/");
        assert_eq!(host, "https://192.168.1.100");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_url_parsing_without_scheme() {
        let (host, port) = split_base_url("ollama.internal:9000");
        assert_eq!(host, "http://ollama.internal");
        assert_eq!(port, 9000);
    }
}
