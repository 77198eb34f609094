//! Orchestrator — the two-phase forge workflow
//!
//! Each instruction runs Draft -> Audit -> Materialize:
//!
//! 1. Draft: system prompt + replayed session memory + the new user turn,
//!    sent at the caller-selected tier
//! 2. Audit: an independent conversation carrying the serialized draft, always
//!    sent at the stable tier; the audited bundle wholly replaces the draft
//! 3. Materialize: full-replace write of the final bundle
//!
//! Session memory is appended only after materialization succeeds, so what
//! the model "remembers" having built always exists on disk. A failure in any
//! phase aborts the instruction with no partial memory update.

use crate::error::ForgeError;
use crate::llm::{BundleGenerator, Message, ModelTier};
use crate::materializer::Materializer;
use crate::session::SessionMemory;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub mod prompts;

use crate::bundle::ExtensionBundle;

/// Successful result of one forge instruction
#[derive(Debug, Clone)]
pub struct ForgeOutcome {
    /// Short natural-language analysis from the model
    pub analysis: String,

    /// Sorted names of every file written
    pub files: Vec<String>,

    /// Absolute path of the output directory
    pub path: PathBuf,
}

pub struct Orchestrator {
    generator: Arc<dyn BundleGenerator>,
    materializer: Materializer,
    memory: SessionMemory,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn BundleGenerator>, materializer: Materializer) -> Self {
        Self {
            generator,
            materializer,
            memory: SessionMemory::new(),
        }
    }

    /// Run one instruction end-to-end.
    ///
    /// The caller must serialize invocations (one instruction completes
    /// before the next begins); the server drives this behind an async mutex
    /// so memory and the output directory are never accessed concurrently.
    pub async fn forge(
        &mut self,
        instruction: &str,
        tier: ModelTier,
    ) -> Result<ForgeOutcome, ForgeError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ForgeError::Validation(
                "instruction must not be empty".to_string(),
            ));
        }

        info!("Drafting extension at {} tier", tier);
        let mut conversation = Vec::with_capacity(self.memory.len() + 2);
        conversation.push(Message::system(prompts::DRAFT_SYSTEM));
        conversation.extend(self.memory.turns().iter().cloned());
        conversation.push(Message::user(instruction));

        let draft = self.generator.generate(&conversation, tier).await?;
        debug!("Draft produced {} files", draft.files.len());

        // The audit sees only the serialized draft, never the chat history,
        // and always runs on the stable tier. The draft is discarded here.
        info!("Auditing draft");
        let draft_json = draft
            .serialized()
            .map_err(|e| ForgeError::Parse(e.to_string()))?;
        let audit_request = vec![
            Message::system(prompts::AUDIT_SYSTEM),
            Message::user(format!(
                "Review and fix this extension bundle:\n{}",
                draft_json
            )),
        ];
        let final_bundle = self
            .generator
            .generate(&audit_request, ModelTier::Stable)
            .await?;

        let materialized = self.materializer.materialize(&final_bundle).await?;

        // Only now does the exchange enter memory: a failed materialize
        // leaves no trace anywhere.
        let final_json = final_bundle
            .serialized()
            .map_err(|e| ForgeError::Parse(e.to_string()))?;
        self.memory.record_exchange(instruction, final_json);

        info!(
            "Built {} files at {}",
            materialized.files.len(),
            materialized.path.display()
        );

        Ok(ForgeOutcome {
            analysis: final_bundle.analysis,
            files: materialized.files,
            path: materialized.path,
        })
    }

    /// Materialize a caller-supplied bundle directly, bypassing both model
    /// passes and session memory (compatibility path for the /save contract)
    pub async fn materialize_bundle(
        &self,
        bundle: &ExtensionBundle,
    ) -> Result<crate::materializer::Materialized, ForgeError> {
        self.materializer.materialize(bundle).await
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GatewayError, Role};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Generator that replays scripted bundles and records every call
    struct ScriptedGenerator {
        replies: Mutex<Vec<Result<ExtensionBundle, GatewayError>>>,
        calls: Mutex<Vec<(ModelTier, Vec<Message>)>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<ExtensionBundle, GatewayError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(ModelTier, Vec<Message>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BundleGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            conversation: &[Message],
            tier: ModelTier,
        ) -> Result<ExtensionBundle, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((tier, conversation.to_vec()));
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn bundle_from(value: serde_json::Value) -> ExtensionBundle {
        ExtensionBundle::from_value(value).unwrap()
    }

    fn draft_bundle() -> ExtensionBundle {
        bundle_from(json!({
            "analysis": "draft",
            "manifest": {"manifest_version": 3, "name": "Highlighter"},
            "files": {"content.js": "// draft"}
        }))
    }

    fn audited_bundle() -> ExtensionBundle {
        bundle_from(json!({
            "analysis": "audited",
            "manifest": {
                "manifest_version": 3,
                "name": "Highlighter",
                "permissions": ["activeTab"]
            },
            "files": {"content.js": "// audited", "icon.svg": "<svg/>"}
        }))
    }

    fn orchestrator(
        generator: Arc<ScriptedGenerator>,
        dir: &tempfile::TempDir,
    ) -> Orchestrator {
        Orchestrator::new(generator, Materializer::new(dir.path().join("out")))
    }

    #[tokio::test]
    async fn test_audited_bundle_wins_over_draft() {
        let generator = ScriptedGenerator::new(vec![Ok(draft_bundle()), Ok(audited_bundle())]);
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::clone(&generator), &dir);

        let outcome = orch
            .forge("create a link highlighter", ModelTier::Frontier)
            .await
            .unwrap();

        assert_eq!(outcome.analysis, "audited");
        let content = std::fs::read_to_string(outcome.path.join("content.js")).unwrap();
        assert_eq!(content, "// audited");

        // Draft at the requested tier, audit always on the stable tier
        let calls = generator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, ModelTier::Frontier);
        assert_eq!(calls[1].0, ModelTier::Stable);
    }

    #[tokio::test]
    async fn test_link_highlighter_scenario() {
        let generator = ScriptedGenerator::new(vec![Ok(draft_bundle()), Ok(audited_bundle())]);
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::clone(&generator), &dir);

        let outcome = orch
            .forge("create a link highlighter", ModelTier::Frontier)
            .await
            .unwrap();

        // Synthesized icon included and the list is sorted
        assert_eq!(
            outcome.files,
            vec!["content.js", "icon.png", "icon.svg", "manifest.json"]
        );
    }

    #[tokio::test]
    async fn test_audit_sees_only_the_serialized_draft() {
        let generator = ScriptedGenerator::new(vec![Ok(draft_bundle()), Ok(audited_bundle())]);
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::clone(&generator), &dir);

        orch.forge("make it", ModelTier::Stable).await.unwrap();

        let calls = generator.calls();
        let audit_conversation = &calls[1].1;
        assert_eq!(audit_conversation.len(), 2);
        assert_eq!(audit_conversation[0].role, Role::System);
        assert!(audit_conversation[1].content.contains("\"analysis\":\"draft\""));
    }

    #[tokio::test]
    async fn test_memory_records_final_bundle_only() {
        let generator = ScriptedGenerator::new(vec![Ok(draft_bundle()), Ok(audited_bundle())]);
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::clone(&generator), &dir);

        orch.forge("make it", ModelTier::Frontier).await.unwrap();

        assert_eq!(orch.memory().len(), 2);
        let assistant_turn = &orch.memory().turns()[1];
        assert!(assistant_turn.content.contains("audited"));
        assert!(!assistant_turn.content.contains("// draft"));
    }

    #[tokio::test]
    async fn test_memory_replayed_into_next_draft() {
        let generator = ScriptedGenerator::new(vec![
            Ok(draft_bundle()),
            Ok(audited_bundle()),
            Ok(draft_bundle()),
            Ok(audited_bundle()),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::clone(&generator), &dir);

        orch.forge("first", ModelTier::Frontier).await.unwrap();
        orch.forge("second", ModelTier::Frontier).await.unwrap();
        assert_eq!(orch.memory().len(), 4);

        let calls = generator.calls();
        // Second draft conversation: system + 2 memory turns + new user turn
        let second_draft = &calls[2].1;
        assert_eq!(second_draft.len(), 4);
        assert_eq!(second_draft[0].role, Role::System);
        assert_eq!(second_draft[1].content, "first");
        assert_eq!(second_draft[3].content, "second");
    }

    #[tokio::test]
    async fn test_empty_instruction_rejected_before_any_call() {
        let generator = ScriptedGenerator::new(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::clone(&generator), &dir);

        let err = orch.forge("   ", ModelTier::Frontier).await.unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
        assert!(generator.calls().is_empty());
        assert!(orch.memory().is_empty());
    }

    #[tokio::test]
    async fn test_draft_failure_leaves_no_trace() {
        let generator =
            ScriptedGenerator::new(vec![Err(GatewayError::Network("down".to_string()))]);
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::clone(&generator), &dir);

        let err = orch.forge("make it", ModelTier::Frontier).await.unwrap_err();
        assert!(matches!(err, ForgeError::Gateway(_)));
        assert!(orch.memory().is_empty());
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_failed_materialize_does_not_touch_memory() {
        // Audited bundle carries a traversal path, so materialize fails
        let bad = bundle_from(json!({
            "manifest": {},
            "files": {"../evil.js": "boom"}
        }));
        let generator = ScriptedGenerator::new(vec![Ok(draft_bundle()), Ok(bad)]);
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::clone(&generator), &dir);

        let err = orch.forge("make it", ModelTier::Frontier).await.unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
        assert!(orch.memory().is_empty());
    }
}
