//! Deterministic text similarity without a model.
//!
//! Embeds text as a hashed bag-of-words vector (FNV-1a into a fixed number
//! of buckets, L2-normalized) and ranks entries by cosine similarity. Crude
//! next to a sentence-transformer, but local, allocation-light, and fully
//! deterministic — the same knowledge base and query always rank the same.

use vademecum_core::knowledge::KnowledgeEntry;

/// Number of hash buckets in an embedding vector.
pub const EMBEDDING_DIM: usize = 256;

/// Embed text as an L2-normalized hashed bag-of-words vector.
///
/// Tokens are lowercased and stripped of non-alphanumeric edges; tokens
/// shorter than 2 characters are ignored.
pub fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];

    for token in tokenize(text, 2) {
        let bucket = (fnv1a(&token) as usize) % EMBEDDING_DIM;
        vector[bucket] += 1.0;
    }

    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

/// Lowercased alphanumeric tokens of at least `min_len` characters.
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    text.split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| t.chars().count() >= min_len)
        .collect()
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1]; 0.0 if either vector is zero or the lengths
/// differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank entries by cosine similarity against the query, keeping the top
/// `limit` with a positive score, most similar first.
///
/// Ties prefer more recent entries (higher insertion index), matching the
/// system instruction to prioritize the most recent information.
pub fn rank_entries<'a>(
    entries: &'a [KnowledgeEntry],
    query: &str,
    limit: usize,
) -> Vec<&'a KnowledgeEntry> {
    let query_embedding = embed(query);

    let mut scored: Vec<(f32, usize, &KnowledgeEntry)> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let sim = cosine_similarity(&embed(&entry.content), &query_embedding);
            if sim > 0.0 { Some((sim, index, entry)) } else { None }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.1.cmp(&a.1))
    });
    scored.truncate(limit);
    scored.into_iter().map(|(_, _, e)| e).collect()
}

/// FNV-1a hash, 64-bit. Stable across platforms and compiler versions,
/// which keeps bucket assignment reproducible in tests.
fn fnv1a(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in text.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
