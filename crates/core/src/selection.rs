use crate::models::{Chunk, Selection, SelectionBudget};
use crate::scoring::score_chunks;
use crate::tokenizer::TokenCounter;
use std::collections::HashMap;
use tracing::debug;

pub const FILL_RATIO: f64 = 0.9;

pub fn select<'a>(
    question: &str,
    chunks: &'a [Chunk],
    budget: &SelectionBudget,
    counter: &dyn TokenCounter,
) -> Selection<'a> {
    let available_tokens = budget.available_tokens(counter.count_tokens(question));
    let early_stop = available_tokens as f64 * FILL_RATIO;

    let mut ranked = score_chunks(question, chunks);
    ranked.sort_by(|left, right| right.score.total_cmp(&left.score));

    let mut selected = Vec::new();
    let mut per_document = HashMap::<&str, usize>::new();
    let mut consumed_tokens = 0usize;

    for candidate in ranked {
        let used = per_document
            .get(candidate.chunk.document.as_str())
            .copied()
            .unwrap_or(0);
        let document_open = budget
            .max_chunks_per_document
            .map_or(true, |cap| used < cap);
        let fits = consumed_tokens + candidate.chunk.token_count <= available_tokens;

        if document_open && fits {
            consumed_tokens += candidate.chunk.token_count;
            *per_document
                .entry(candidate.chunk.document.as_str())
                .or_insert(0) += 1;
            selected.push(candidate);
        }

        if consumed_tokens as f64 >= early_stop {
            break;
        }
    }

    debug!(
        selected = selected.len(),
        consumed_tokens, available_tokens, "chunks selected"
    );

    Selection {
        chunks: selected,
        available_tokens,
        consumed_tokens,
    }
}
