use crate::models::*;
use anyhow::Result;
use reqwest::Client;

/// Model identifier sent with every completion request.
pub const MODEL: &str = "gpt-4";

pub const SYSTEM_PROMPT: &str = "You are a threat intelligence analyst. Analyze the provided information and extract relevant IoCs and threat intelligence details.";

/// Chat-completion client bound to a single credential.
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its
/// connection pool between clones.
#[derive(Debug, Clone)]
pub struct OpenAiService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiService {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Asks the model about a previously uploaded report. Only the filename
    /// is sent; the document itself is never read.
    pub async fn analyze(&self, filename: &str, query: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: MODEL.to_string(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(filename, query)),
            ],
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!(
                "OpenAI API error (status {}): {}",
                status.as_u16(),
                api_error_message(&error_text)
            ));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        first_choice_text(completion)
    }
}

pub fn build_prompt(filename: &str, query: &str) -> String {
    format!("Regarding the threat intelligence report in {}, {}", filename, query)
}

fn first_choice_text(completion: ChatCompletionResponse) -> Result<String> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| anyhow::anyhow!("OpenAI API returned no choices"))
}

// Prefers the structured `{"error": {"message": ...}}` body, else the raw text.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_references_filename_then_query() {
        assert_eq!(
            build_prompt("report.pdf", "What IPs are mentioned?"),
            "Regarding the threat intelligence report in report.pdf, What IPs are mentioned?"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let service = OpenAiService::new("sk-test", "http://localhost:9000/v1/");
        assert_eq!(service.base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn first_choice_wins() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[
                {"message":{"role":"assistant","content":"No IPs found."}},
                {"message":{"role":"assistant","content":"ignored"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_text(completion).unwrap(), "No IPs found.");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let completion: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let err = first_choice_text(completion).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn structured_error_message_is_extracted() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Incorrect API key provided");
        assert_eq!(api_error_message("  upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn request_serializes_as_two_message_chat() {
        let request = ChatCompletionRequest {
            model: MODEL.to_string(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt("a.pdf", "summarize")),
            ],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(
            value["messages"][1]["content"],
            "Regarding the threat intelligence report in a.pdf, summarize"
        );
    }
}
