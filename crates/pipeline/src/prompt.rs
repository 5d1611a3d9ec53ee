//! Prompt building — pure string assembly, no I/O.

/// The fixed system instruction, in Portuguese, carrying the grounding
/// rules the Response Guard later judges the output against.
pub const SYSTEM_PROMPT: &str = "Você é uma IA de apoio operacional e assistencial para equipes de saúde.
Sua função é fornecer informações precisas baseadas nos manuais e protocolos cadastrados.

REGRAS OBRIGATÓRIAS:
1. Responda APENAS com base no conhecimento fornecido no contexto.
2. NUNCA invente informações ou use conhecimentos externos.
3. Se a resposta não estiver na base de conhecimento, responda EXATAMENTE: \"Não sei responder. Procure sua liderança direta.\"
4. Responda de forma clara, objetiva e padronizada, seguindo o tom de um manual de conduta.
5. Priorize sempre a informação mais recente disponível no contexto.";

/// Marker opening the assistant turn; also used by the guard to strip an
/// echoed prompt from the raw output.
pub const ASSISTANT_MARKER: &str = "<|assistant|>\n";

/// Combine system instruction, context, and query into one zephyr
/// instruct-formatted prompt.
///
/// Pure and deterministic: identical inputs yield byte-identical output.
pub fn build_prompt(system: &str, context: &str, query: &str) -> String {
    format!(
        "<|system|>\n{system}</s>\n<|user|>\nContexto:\n{context}\n\nPergunta: {query}</s>\n{ASSISTANT_MARKER}"
    )
}
