//! `LanguageModelPort` implementation for an OpenAI-compatible server.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use murmur_core::{
    GenerationError, LanguageModelPort, Message, ReadinessSignal, ReplyPart, ReplyStream,
    Settings, SummaryStream,
};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RuntimeError;
use crate::health::probe;
use crate::sse::{content_deltas, snapshots};
use crate::wire::{
    COMPLETIONS_PATH, ChatCompletionRequest, HEALTH_PATH, prewarm_request, reply_request,
    summary_request,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

type SnapshotStream = BoxStream<'static, Result<String, GenerationError>>;

/// Talks to a llama-server (or any OpenAI-compatible server) over HTTP.
#[derive(Debug, Clone)]
pub struct LlamaServerModel {
    client: Client,
    base_url: String,
    model_name: Option<String>,
    reply_instructions: String,
    summary_instructions: String,
}

impl LlamaServerModel {
    /// Build an adapter from the effective settings.
    ///
    /// The request timeout bounds the wait for each chunk, not the whole
    /// stream.
    pub fn from_settings(settings: &Settings) -> Result<Self, RuntimeError> {
        let base_url = settings.effective_model_url().trim_end_matches('/');
        Url::parse(base_url).map_err(|e| RuntimeError::InvalidModelUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(Duration::from_secs(
                settings.effective_request_timeout_secs(),
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model_name: settings.model_name.clone(),
            reply_instructions: settings.effective_reply_instructions().to_string(),
            summary_instructions: settings.effective_summary_instructions().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a streaming completion request.
    ///
    /// `None` means the server declined: it could not be reached or is
    /// still loading the model.
    async fn open_stream(
        &self,
        request: &ChatCompletionRequest,
        kind: &'static str,
    ) -> Option<SnapshotStream> {
        let response = match self
            .client
            .post(self.endpoint(COMPLETIONS_PATH))
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                warn!(kind, error = %e, "Model server unreachable, declining");
                return None;
            }
            Err(e) => return Some(single_error(GenerationError::Transport(e.to_string()))),
        };

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(kind, "Model server is loading, declining");
            return None;
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Some(single_error(GenerationError::Model(error_message(
                status, &body,
            ))));
        }

        debug!(kind, "Streaming from model server");
        Some(snapshots(content_deltas(response.bytes_stream())).boxed())
    }
}

fn single_error(error: GenerationError) -> SnapshotStream {
    stream::once(async move { Err(error) }).boxed()
}

/// Describe a failed response, preferring the server's own message.
fn error_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json["error"]["message"]
            .as_str()
            .map(str::to_string)
    });
    match message {
        Some(message) => format!("model server returned {status}: {message}"),
        None if body.trim().is_empty() => format!("model server returned {status}"),
        None => format!("model server returned {status}: {}", body.trim()),
    }
}

#[async_trait]
impl LanguageModelPort for LlamaServerModel {
    async fn check_availability(&self) -> ReadinessSignal {
        probe(&self.client, &self.endpoint(HEALTH_PATH)).await
    }

    async fn stream_reply(&self, context: &[Message]) -> Option<ReplyStream> {
        let request = reply_request(
            self.model_name.as_deref(),
            &self.reply_instructions,
            context,
        );
        let stream = self.open_stream(&request, "reply").await?;
        Some(stream.map(|part| part.map(ReplyPart::new)).boxed())
    }

    async fn stream_summary(&self, context: &[Message]) -> Option<SummaryStream> {
        let request = summary_request(
            self.model_name.as_deref(),
            &self.summary_instructions,
            context,
        );
        self.open_stream(&request, "summary").await
    }

    fn prewarm(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, skipping prewarm");
            return;
        };

        let client = self.client.clone();
        let url = self.endpoint(COMPLETIONS_PATH);
        let request = prewarm_request(self.model_name.as_deref(), &self.reply_instructions);
        handle.spawn(async move {
            match client.post(url).json(&request).send().await {
                Ok(response) => debug!(status = %response.status(), "Prewarm finished"),
                Err(e) => debug!(error = %e, "Prewarm failed"),
            }
        });
    }
}
