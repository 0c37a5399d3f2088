//! Chat use case.
//!
//! Sends a user message with the conversation so far and streams the
//! reply. The exchange is only added to the conversation once the stream
//! completes; a failed or cancelled reply leaves the conversation as it
//! was.

use crate::config::Endpoint;
use crate::ports::medbot_gateway::{GatewayError, MedbotGateway, decode_response};
use crate::ports::storage::StorageError;
use crate::ports::stream_renderer::StreamRenderer;
use crate::use_cases::stream_assembler::{StreamAssembler, StreamError};
use medbot_domain::core::string::truncate;
use medbot_domain::{ChatMessage, Conversation, DomainError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Errors that can occur during chat operations.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ChatError {
    pub fn is_cancelled(&self) -> bool {
        match self {
            ChatError::Stream(e) => e.is_cancelled(),
            ChatError::Domain(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

/// One prior message as the chat endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry<'a> {
    #[serde(rename = "type")]
    pub role: &'static str,
    pub content: &'a str,
}

/// Body of a chat request: the new message plus everything before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub history: Vec<HistoryEntry<'a>>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(message: &'a str, history: &'a [ChatMessage]) -> Self {
        Self {
            message,
            history: history
                .iter()
                .map(|m| HistoryEntry {
                    role: m.role().as_str(),
                    content: m.content(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpeakResponse {
    audio_url: String,
}

/// Use case for chatting with the assistant.
#[derive(Clone)]
pub struct ChatUseCase {
    gateway: Arc<dyn MedbotGateway>,
    assembler: StreamAssembler,
}

impl ChatUseCase {
    pub fn new(gateway: Arc<dyn MedbotGateway>) -> Self {
        Self {
            assembler: StreamAssembler::new(gateway.clone()),
            gateway,
        }
    }

    /// Send `message` in `conversation` and stream the reply into
    /// `renderer`. Returns the reply text.
    pub async fn send(
        &self,
        conversation: &mut Conversation,
        message: &str,
        renderer: &mut dyn StreamRenderer,
        cancel: &CancellationToken,
    ) -> Result<String, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }
        info!(
            "Sending chat message in {}: {}",
            conversation.id(),
            truncate(message, 100)
        );

        let user = ChatMessage::user(message);
        let body = serde_json::to_value(ChatRequest::new(message, conversation.messages()))
            .map_err(|e| GatewayError::Other(e.to_string()))?;
        let outcome = self
            .assembler
            .run(Endpoint::Chat, body, renderer, cancel)
            .await?;

        conversation.record_exchange(user, ChatMessage::assistant(outcome.text.clone()));
        Ok(outcome.text)
    }

    /// Ask again for the last reply in `conversation`.
    ///
    /// The last exchange is replaced only when the new reply completes.
    pub async fn regenerate(
        &self,
        conversation: &mut Conversation,
        renderer: &mut dyn StreamRenderer,
        cancel: &CancellationToken,
    ) -> Result<String, ChatError> {
        let prompt = conversation
            .last_exchange_prompt()
            .ok_or(DomainError::NothingToRegenerate)?
            .content()
            .to_string();
        info!(
            "Regenerating last reply in {}: {}",
            conversation.id(),
            truncate(&prompt, 100)
        );

        let body = serde_json::to_value(ChatRequest::new(
            &prompt,
            conversation.history_before_last_exchange(),
        ))
        .map_err(|e| GatewayError::Other(e.to_string()))?;
        let outcome = self
            .assembler
            .run(Endpoint::Chat, body, renderer, cancel)
            .await?;

        conversation.replace_last_exchange(
            ChatMessage::user(prompt),
            ChatMessage::assistant(outcome.text.clone()),
        );
        Ok(outcome.text)
    }

    /// Turn `text` into speech on the server and return the audio URL.
    pub async fn speak(&self, text: &str) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }
        let value = self
            .gateway
            .post_json(Endpoint::Speak, serde_json::json!({ "text": text }))
            .await?;
        let response: SpeakResponse = decode_response(value)?;
        Ok(self.gateway.resolve_url(&response.audio_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::medbot_gateway::{ByteStream, MultipartUpload};
    use crate::ports::stream_renderer::NoRenderer;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Replies to every chat request with a fixed SSE body and records
    /// the request bodies it saw.
    struct ScriptedGateway {
        reply: Option<String>,
        requests: Mutex<Vec<Value>>,
    }

    impl ScriptedGateway {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MedbotGateway for ScriptedGateway {
        async fn open_stream(
            &self,
            _endpoint: Endpoint,
            body: Value,
        ) -> Result<ByteStream, GatewayError> {
            self.requests.lock().unwrap().push(body);
            let Some(reply) = &self.reply else {
                return Err(GatewayError::ConnectionError("refused".into()));
            };
            let sse = format!(
                "data: {}\n\ndata: [DONE]\n\n",
                json!({ "content": reply })
            );
            Ok(Box::pin(futures::stream::iter(vec![Ok(sse.into_bytes())])))
        }
        async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value, GatewayError> {
            assert_eq!(endpoint, Endpoint::Speak);
            self.requests.lock().unwrap().push(body);
            Ok(json!({ "audio_url": "/static/speech.mp3" }))
        }
        async fn get_json(&self, _: Endpoint) -> Result<Value, GatewayError> {
            unimplemented!()
        }
        async fn post_multipart(
            &self,
            _: Endpoint,
            _: MultipartUpload,
        ) -> Result<Value, GatewayError> {
            unimplemented!()
        }
        async fn post_for_bytes(&self, _: Endpoint, _: Value) -> Result<Vec<u8>, GatewayError> {
            unimplemented!()
        }
        fn resolve_url(&self, url: &str) -> String {
            format!("http://localhost:8080{url}")
        }
    }

    #[tokio::test]
    async fn send_records_exchange_and_sends_prior_history() {
        let gateway = Arc::new(ScriptedGateway::replying("Loop diuretics act there."));
        let chat = ChatUseCase::new(gateway.clone());
        let mut conversation = Conversation::with_id("c1");
        let cancel = CancellationToken::new();

        chat.send(&mut conversation, "Where do loop diuretics act?", &mut NoRenderer, &cancel)
            .await
            .unwrap();
        chat.send(&mut conversation, "Side effects?", &mut NoRenderer, &cancel)
            .await
            .unwrap();

        assert_eq!(conversation.messages().len(), 4);
        assert_eq!(conversation.title(), "Where do loop diuretics act?");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            json!({ "message": "Where do loop diuretics act?", "history": [] })
        );
        assert_eq!(requests[1]["message"], "Side effects?");
        assert_eq!(
            requests[1]["history"],
            json!([
                { "type": "user", "content": "Where do loop diuretics act?" },
                { "type": "assistant", "content": "Loop diuretics act there." }
            ])
        );
    }

    #[tokio::test]
    async fn empty_message_is_rejected_without_a_request() {
        let gateway = Arc::new(ScriptedGateway::replying("unused"));
        let chat = ChatUseCase::new(gateway.clone());
        let mut conversation = Conversation::new();

        let err = chat
            .send(&mut conversation, "   ", &mut NoRenderer, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Domain(DomainError::EmptyMessage)));
        assert!(gateway.requests.lock().unwrap().is_empty());
    }

    /// Cancels as soon as the reply starts rendering.
    struct CancelOnRender(CancellationToken);

    impl StreamRenderer for CancelOnRender {
        fn on_stream_start(&mut self) {}
        fn on_render(&mut self, _text: &str) {
            self.0.cancel();
        }
        fn on_finalize(&mut self, _text: &str) {
            panic!("a cancelled reply must not be finalized");
        }
        fn on_error(&mut self, _error: &StreamError) {}
        fn on_cancel(&mut self) {}
    }

    #[tokio::test]
    async fn cancelled_reply_is_not_recorded() {
        let chat = ChatUseCase::new(Arc::new(ScriptedGateway::replying("Henle")));
        let mut conversation = Conversation::with_id("c1");
        let cancel = CancellationToken::new();

        let err = chat
            .send(
                &mut conversation,
                "Where do loop diuretics act?",
                &mut CancelOnRender(cancel.clone()),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(conversation.is_empty());
        assert!(conversation.is_temporary());
    }

    #[tokio::test]
    async fn failed_reply_leaves_conversation_untouched() {
        let chat = ChatUseCase::new(Arc::new(ScriptedGateway::failing()));
        let mut conversation = Conversation::with_id("c1");

        let err = chat
            .send(&mut conversation, "hello", &mut NoRenderer, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Stream(StreamError::Gateway(_))));
        assert!(conversation.is_empty());
        assert!(conversation.is_temporary());
    }

    #[tokio::test]
    async fn regenerate_replaces_last_reply() {
        let gateway = Arc::new(ScriptedGateway::replying("second answer"));
        let chat = ChatUseCase::new(gateway.clone());
        let mut conversation = Conversation::with_id("c1");
        conversation.record_exchange(
            ChatMessage::user("first q"),
            ChatMessage::assistant("first answer"),
        );
        conversation.record_exchange(
            ChatMessage::user("second q"),
            ChatMessage::assistant("stale answer"),
        );

        let text = chat
            .regenerate(&mut conversation, &mut NoRenderer, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(text, "second answer");
        assert_eq!(conversation.messages().len(), 4);
        assert_eq!(conversation.messages()[3].content(), "second answer");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests[0]["message"], "second q");
        assert_eq!(requests[0]["history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn regenerate_on_empty_conversation_fails() {
        let chat = ChatUseCase::new(Arc::new(ScriptedGateway::replying("x")));
        let err = chat
            .regenerate(
                &mut Conversation::new(),
                &mut NoRenderer,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChatError::Domain(DomainError::NothingToRegenerate)
        ));
    }

    #[tokio::test]
    async fn speak_resolves_audio_url() {
        let gateway = Arc::new(ScriptedGateway::replying("x"));
        let chat = ChatUseCase::new(gateway.clone());
        let url = chat.speak("Read this aloud").await.unwrap();
        assert_eq!(url, "http://localhost:8080/static/speech.mp3");
        assert_eq!(
            gateway.requests.lock().unwrap()[0],
            json!({ "text": "Read this aloud" })
        );
    }
}
