//! OpenAI-format chat-completions provider.
//!
//! Items are generated as a JSON array the model is asked to emit; replies
//! are generated by role-playing the counterpart over the chat transcript.
//! Every failure path — transport, HTTP status, JSON shape — degrades to the
//! deterministic catalog content, so callers never see an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use swapdeck_shared::{catalog, Category, Condition, Item, ItemId, Message, Sender};

use crate::config::ProviderConfig;
use crate::provider::ContentProvider;

#[derive(Clone)]
pub struct LlmProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Shape the model is asked to emit for each generated listing.
#[derive(Debug, Deserialize)]
struct GeneratedListing {
    title: String,
    description: String,
    condition: String,
    estimated_value: f64,
}

impl LlmProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Generate a completion using the OpenAI API format.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        };

        let mut req = self.client.post(&url).json(&request);

        // API key header is optional (not needed for local models).
        if !self.config.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let response = req.send().await.context("failed to send LLM request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read body".to_string());
            anyhow::bail!("LLM API returned error {status}: {body}");
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("failed to parse LLM response")?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("no choices in LLM response"))
    }

    async fn request_items(&self, category: Category, count: usize) -> Result<Vec<Item>> {
        let prompt = format!(
            "Generate {count} unique, realistic second-hand items for the category \
             \"{category}\". Respond with only a JSON array; each element must have the \
             fields \"title\" (string), \"description\" (string), \"condition\" (one of \
             \"New\", \"Like New\", \"Good\", \"Fair\") and \"estimated_value\" (number). \
             Do not include image URLs."
        );

        let text = self
            .complete(vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }])
            .await?;

        let listings: Vec<GeneratedListing> =
            serde_json::from_str(strip_code_fence(&text)).context("malformed listing JSON")?;

        let traders = catalog::known_traders();
        let mut rng = rand::thread_rng();
        let items = listings
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(i, listing)| Item {
                id: ItemId::new(),
                owner_id: traders[i % traders.len()].id,
                title: listing.title,
                description: listing.description,
                category,
                images: vec![catalog::random_image(category, &mut rng).to_string()],
                condition: Condition::from_label(&listing.condition).unwrap_or(Condition::Good),
                estimated_value: listing.estimated_value.max(0.0),
            })
            .collect();
        Ok(items)
    }

    async fn request_reply(
        &self,
        history: &[Message],
        their_item: &Item,
        my_item: &Item,
        counterpart_name: &str,
    ) -> Result<String> {
        let transcript = history
            .iter()
            .map(|m| match m.sender {
                Sender::Me => format!("Me: {}", m.text),
                Sender::Them => format!("{counterpart_name}: {}", m.text),
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Act as {counterpart_name}. You own a {their_title} ({their_condition}). \
             You are negotiating a trade with a user who is offering a {my_title}.\n\n\
             Conversation history:\n{transcript}\n\n\
             Respond to the last message naturally. Be friendly but negotiate if the \
             value difference is high. Keep it short (under 2 sentences).",
            their_title = their_item.title,
            their_condition = their_item.condition,
            my_title = my_item.title,
        );

        let text = self
            .complete(vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }])
            .await?;

        let reply = text.trim();
        if reply.is_empty() {
            anyhow::bail!("empty reply from LLM");
        }
        Ok(reply.to_string())
    }
}

#[async_trait::async_trait]
impl ContentProvider for LlmProvider {
    async fn generate_items(&self, category: Category, count: usize) -> Vec<Item> {
        match self.request_items(category, count).await {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                tracing::warn!(%category, "provider returned no listings, serving fallback");
                catalog::fallback_items(category, count)
            }
            Err(e) => {
                tracing::warn!(%category, error = %e, "item generation failed, serving fallback");
                catalog::fallback_items(category, count)
            }
        }
    }

    async fn generate_reply(
        &self,
        history: &[Message],
        their_item: &Item,
        my_item: &Item,
        counterpart_name: &str,
    ) -> String {
        match self
            .request_reply(history, their_item, my_item, counterpart_name)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "reply generation failed, serving default");
                catalog::DEFAULT_REPLY.to_string()
            }
        }
    }
}

/// Models frequently wrap JSON answers in a Markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
