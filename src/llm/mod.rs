//! Model Gateway Abstraction Layer
//!
//! This module defines the boundary to the generation capability: the
//! conversation types sent over the wire, the transport trait that actual
//! HTTP clients implement, and the generator trait the orchestrator consumes.
//! The gateway itself (tier selection and fallback policy) lives in
//! [`gateway`]; the OpenAI-compatible transport lives in [`openai`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bundle::ExtensionBundle;

pub mod gateway;
pub mod openai;

pub use gateway::ModelGateway;
pub use openai::OpenAiTransport;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to the model
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model call timed out")]
    Timeout,

    #[error("parse error: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Whether a frontier-tier failure with this error should trigger the
    /// stable-tier retry. Transport-level failures are retryable; a reply
    /// that arrived but could not be parsed is not, since re-sending the
    /// identical request would not change the model's output shape.
    pub fn is_fallback_eligible(&self) -> bool {
        !matches!(self, GatewayError::Parse(_))
    }
}

/// Quality/availability tier of the generation capability
///
/// The frontier tier is preferred but may be unavailable; the stable tier is
/// the guaranteed fallback and is always used for the audit pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Frontier,
    Stable,
}

impl ModelTier {
    /// Map a caller-supplied model selector onto a tier.
    ///
    /// Only the configured stable identifier selects the stable tier;
    /// anything else (including no selection) runs at the frontier tier,
    /// which keeps the fallback protection for unknown identifiers.
    pub fn from_selector(selector: Option<&str>, stable_model: &str) -> Self {
        match selector {
            Some(model) if model == stable_model => ModelTier::Stable,
            _ => ModelTier::Frontier,
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Frontier => write!(f, "frontier"),
            ModelTier::Stable => write!(f, "stable"),
        }
    }
}

/// Message in a conversation sent to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: Role,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Raw chat transport that all HTTP backends must implement
///
/// A transport sends one conversation to one concrete model identifier and
/// returns the assistant's reply verbatim. It carries no retry or fallback
/// logic; that policy belongs to [`ModelGateway`], which makes the policy
/// unit-testable with a fake transport.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the conversation and return the assistant reply content
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String>;
}

/// Generator trait consumed by the orchestrator
///
/// Implemented by [`ModelGateway`]; test code substitutes scripted
/// implementations.
#[async_trait]
pub trait BundleGenerator: Send + Sync {
    /// Run one generation call at the given tier and validate the reply
    async fn generate(&self, conversation: &[Message], tier: ModelTier) -> Result<ExtensionBundle>;
}

/// Strip at most one markdown code fence wrapping the reply.
///
/// Models occasionally wrap the JSON object in ```json ... ``` despite the
/// structured-output request. Exactly one fenced block is tolerated; anything
/// else is left for the JSON parser to reject.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Skip the opening fence line (e.g. "```json\n")
    let Some(newline) = trimmed.find('\n') else {
        return trimmed;
    };
    let body = &trimmed[newline + 1..];

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, Role::User);
        assert_eq!(user_msg.content, "Hello");

        let assistant_msg = Message::assistant("Hi there");
        assert_eq!(assistant_msg.role, Role::Assistant);

        let system_msg = Message::system("You are ChromeForge");
        assert_eq!(system_msg.role, Role::System);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = Message::user("test");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""role":"user""#));

        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_strip_fence_plain_content() {
        assert_eq!(strip_code_fence(r#"{"a": 1}"#), r#"{"a": 1}"#);
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strip_fence_with_language_tag() {
        let content = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(content), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strip_fence_without_closing() {
        let content = "```json\n{\"a\": 1}";
        assert_eq!(strip_code_fence(content), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strip_fence_only_first_block() {
        let content = "```json\n{\"a\": 1}\n```\ntrailing prose";
        assert_eq!(strip_code_fence(content), r#"{"a": 1}"#);
    }

    #[test]
    fn test_tier_from_selector() {
        assert_eq!(
            ModelTier::from_selector(Some("gpt-4o"), "gpt-4o"),
            ModelTier::Stable
        );
        assert_eq!(
            ModelTier::from_selector(Some("gpt-5"), "gpt-4o"),
            ModelTier::Frontier
        );
        assert_eq!(
            ModelTier::from_selector(Some("anything-else"), "gpt-4o"),
            ModelTier::Frontier
        );
        assert_eq!(
            ModelTier::from_selector(None, "gpt-4o"),
            ModelTier::Frontier
        );
    }

    #[test]
    fn test_fallback_eligibility() {
        assert!(GatewayError::Timeout.is_fallback_eligible());
        assert!(GatewayError::Network("down".into()).is_fallback_eligible());
        assert!(GatewayError::Status {
            status: 404,
            body: "model not found".into()
        }
        .is_fallback_eligible());
        assert!(!GatewayError::Parse("bad json".into()).is_fallback_eligible());
    }
}
