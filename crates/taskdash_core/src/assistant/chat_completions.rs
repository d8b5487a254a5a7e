//! OpenAI-compatible `/chat/completions` client.

use super::Assistant;
use crate::config::AssistantConfig;
use crate::error::AppError;
use crate::planner::PlannerRequest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsClient {
    config: AssistantConfig,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(config: AssistantConfig, api_key: String) -> Self {
        Self { config, api_key }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl Assistant for ChatCompletionsClient {
    fn complete(&self, request: &PlannerRequest) -> Result<String, AppError> {
        let url = self.endpoint();
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build();

        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.payload,
                },
            ],
            temperature: request.temperature,
            stream: false,
        };

        tracing::debug!(url = %url, model = %self.config.model, "sending chat completion request");
        let response = agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|err| match err {
                ureq::Error::Status(code, response) => {
                    let text = response.into_string().unwrap_or_default();
                    AppError::assistant(format!("HTTP {code}: {}", text.trim()))
                }
                ureq::Error::Transport(transport) => AppError::assistant(transport.to_string()),
            })?;

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|err| AppError::assistant(format!("parse error: {err}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::assistant("response contained no message content"))
    }
}

#[cfg(test)]
mod tests {
    use super::ChatCompletionsClient;
    use crate::assistant::Assistant;
    use crate::config::AssistantConfig;
    use crate::planner::PlannerRequest;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serves one canned HTTP response and hands back the raw request.
    fn serve_once(status: &str, body: &str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            head.push_str(&String::from_utf8_lossy(&body));

            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            sender.send(head).unwrap();
        });

        (format!("http://{addr}"), receiver)
    }

    fn request() -> PlannerRequest {
        PlannerRequest {
            system: "You're an intelligent planner.".to_string(),
            payload: "[]".to_string(),
            temperature: 0.4,
        }
    }

    fn client(base_url: String) -> ChatCompletionsClient {
        let config = AssistantConfig {
            base_url,
            ..AssistantConfig::default()
        };
        ChatCompletionsClient::new(config, "test-key".to_string())
    }

    #[test]
    fn returns_first_choice_content() {
        let (base_url, received) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Do the report"}}]}"#,
        );

        let reply = client(base_url).complete(&request()).unwrap();
        let raw = received.recv().unwrap();

        assert_eq!(reply, "Do the report");
        assert!(raw.starts_with("POST /chat/completions"));
        assert!(raw.contains("Bearer test-key"));
        assert!(raw.contains("\"model\":\"deepseek-chat\""));
        assert!(raw.contains("\"role\":\"system\""));
        assert!(raw.contains("\"temperature\":0.4"));
    }

    #[test]
    fn maps_http_errors_to_assistant_errors() {
        let (base_url, _received) = serve_once("429 Too Many Requests", "rate limited");

        let err = client(base_url).complete(&request()).unwrap_err();

        assert_eq!(err.code(), "assistant_error");
        assert!(err.message().contains("429"));
    }

    #[test]
    fn rejects_response_without_choices() {
        let (base_url, _received) = serve_once("200 OK", r#"{"choices":[]}"#);

        let err = client(base_url).complete(&request()).unwrap_err();

        assert_eq!(err.code(), "assistant_error");
    }
}
