//! Terminal reply states and the fixed sentences the service speaks.
//!
//! Downstream consumers match on these strings byte-for-byte, so they are
//! defined once here and reproduced verbatim everywhere else.

/// The canonical refusal, returned whenever an answer cannot be grounded in
/// stored knowledge or the generation backend is unavailable.
pub const CANONICAL_REFUSAL: &str = "Não sei responder. Procure sua liderança direta.";

/// Rejection sent to non-master callers attempting a knowledge write.
pub const MASTER_ONLY_MESSAGE: &str = "Apenas usuários Master podem atualizar o conhecimento.";

/// Confirmation sent after a successful knowledge write.
pub const INGEST_SUCCESS_MESSAGE: &str = "Conhecimento atualizado com sucesso!";

/// Outcome of one retrieve → generate → validate pass.
///
/// There are exactly two terminal states. `Refused` always renders as the
/// canonical refusal; there is no partial or error state visible to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A grounded answer, already trimmed.
    Answered(String),
    /// No grounded answer could be produced.
    Refused,
}

impl Reply {
    /// The text presented to the caller.
    pub fn text(&self) -> &str {
        match self {
            Reply::Answered(text) => text,
            Reply::Refused => CANONICAL_REFUSAL,
        }
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self, Reply::Refused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusal_renders_the_canonical_sentence() {
        assert_eq!(
            Reply::Refused.text(),
            "Não sei responder. Procure sua liderança direta."
        );
        assert!(Reply::Refused.is_refusal());
    }

    #[test]
    fn answered_passes_text_through_unchanged() {
        let reply = Reply::Answered("O almoço é das 12h às 13h.".into());
        assert_eq!(reply.text(), "O almoço é das 12h às 13h.");
        assert!(!reply.is_refusal());
    }
}
