//! Flashcard generation.

use super::{StudyError, with_progress};
use crate::config::{Endpoint, StudyDefaults};
use crate::ports::medbot_gateway::{GatewayError, MedbotGateway, decode_response};
use crate::ports::progress::ProgressNotifier;
use medbot_domain::{DomainError, Flashcard, FlashcardDeck};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Body of a flashcard generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashcardRequest {
    pub topic: String,
    pub num_cards: u32,
    pub university: String,
    pub course: String,
    pub difficulty: String,
}

impl FlashcardRequest {
    /// A request for `topic` with every other field from `defaults`.
    pub fn new(topic: impl Into<String>, defaults: &StudyDefaults) -> Self {
        Self {
            topic: topic.into(),
            num_cards: defaults.num_cards,
            university: defaults.university.clone(),
            course: defaults.course.clone(),
            difficulty: defaults.difficulty.clone(),
        }
    }
}

/// Where the generator found the material for a deck.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlashcardSource {
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub chunk_id: u64,
}

#[derive(Debug, Deserialize)]
struct FlashcardResponse {
    #[serde(default)]
    flashcards: Vec<Flashcard>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    sources: Vec<FlashcardSource>,
    #[serde(default)]
    message: Option<String>,
}

/// A freshly generated deck with what the server said about it.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub deck: FlashcardDeck,
    pub sources: Vec<FlashcardSource>,
    pub message: Option<String>,
}

/// Use case for generating flashcard decks.
#[derive(Clone)]
pub struct FlashcardsUseCase {
    gateway: Arc<dyn MedbotGateway>,
}

impl FlashcardsUseCase {
    pub fn new(gateway: Arc<dyn MedbotGateway>) -> Self {
        Self { gateway }
    }

    pub async fn generate(
        &self,
        request: FlashcardRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<GeneratedDeck, StudyError> {
        if request.topic.trim().is_empty() {
            return Err(DomainError::EmptyTopic.into());
        }
        info!(
            "Generating {} flashcards on {:?} ({}, {})",
            request.num_cards, request.topic, request.course, request.difficulty
        );

        let body =
            serde_json::to_value(&request).map_err(|e| GatewayError::Other(e.to_string()))?;
        let response = with_progress(progress, "Generating flashcards", async {
            let value = self
                .gateway
                .post_json(Endpoint::FlashcardsGenerate, body)
                .await?;
            Ok(decode_response::<FlashcardResponse>(value)?)
        })
        .await?;

        if response.flashcards.is_empty() {
            return Err(StudyError::NoFlashcards);
        }
        debug!(
            "Received {} flashcards from {} sources",
            response.flashcards.len(),
            response.sources.len()
        );

        Ok(GeneratedDeck {
            deck: FlashcardDeck::new(response.flashcards).with_context(response.context),
            sources: response.sources,
            message: response.message,
        })
    }

    /// Replace the deck's cards with a new set generated from the same
    /// source context.
    pub async fn regenerate(
        &self,
        deck: &mut FlashcardDeck,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), StudyError> {
        let context = deck.context().ok_or(StudyError::NoContext)?.to_string();
        info!("Regenerating flashcards from {} bytes of context", context.len());

        let response = with_progress(progress, "Regenerating flashcards", async {
            let value = self
                .gateway
                .post_json(
                    Endpoint::FlashcardsRegenerate,
                    serde_json::json!({ "context": context }),
                )
                .await?;
            Ok(decode_response::<FlashcardResponse>(value)?)
        })
        .await?;

        if response.flashcards.is_empty() {
            return Err(StudyError::NoFlashcards);
        }
        deck.replace_cards(response.flashcards);
        Ok(())
    }
}
