//! Pipeline orchestration — one query in, one terminal reply out.
//!
//! `ChatPipeline::answer` never returns an error: every failure along the
//! way (storage read, generation, validation) degrades into the canonical
//! refusal so the caller always has something safe to say.

use std::sync::Arc;

use tracing::{debug, info, warn};

use vademecum_core::generation::{GenerationParams, Generator};
use vademecum_core::knowledge::KnowledgeStore;
use vademecum_core::query::Query;
use vademecum_core::reply::Reply;

use crate::context::ContextAssembler;
use crate::guard;
use crate::prompt::{SYSTEM_PROMPT, build_prompt};

/// The full retrieve → prompt → generate → validate chain, with the store
/// and generator injected as trait objects at process start.
pub struct ChatPipeline {
    store: Arc<dyn KnowledgeStore>,
    generator: Arc<dyn Generator>,
    assembler: ContextAssembler,
    params: GenerationParams,
}

impl ChatPipeline {
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        generator: Arc<dyn Generator>,
        assembler: ContextAssembler,
        params: GenerationParams,
    ) -> Self {
        Self {
            store,
            generator,
            assembler,
            params,
        }
    }

    /// Answer one query from stored knowledge, or refuse.
    ///
    /// Transition rules, applied in order:
    /// 1. blank query or empty context → `Refused`, generator never called
    /// 2. generation failed → `Refused`
    /// 3. raw output fails the guard heuristics → `Refused`
    /// 4. otherwise → `Answered`
    pub async fn answer(&self, query: &Query) -> Reply {
        if query.text.trim().is_empty() {
            debug!("Blank query, refusing without retrieval");
            return Reply::Refused;
        }

        // A read failure degrades to an empty knowledge base.
        let entries = match self.store.all().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Knowledge store read failed, treating as empty");
                Vec::new()
            }
        };

        let context = self.assembler.assemble(&query.text, &entries);
        if context.is_empty() {
            info!("No relevant context, refusing without generation");
            return Reply::Refused;
        }

        let prompt = build_prompt(SYSTEM_PROMPT, &context, &query.text);

        let raw = match self.generator.generate(&prompt, &self.params).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(generator = %self.generator.name(), error = %e, "Generation unavailable, refusing");
                return Reply::Refused;
            }
        };

        let reply = guard::evaluate(&raw);
        info!(
            context_entries = entries.len(),
            refused = reply.is_refusal(),
            "Query answered"
        );
        reply
    }
}
