use crate::models::{Chunk, ScoredChunk};
use std::collections::HashSet;

pub fn score(chunk_text: &str, question: &str) -> f64 {
    let question_words = word_set(question);
    if question_words.is_empty() {
        return 0.0;
    }

    let chunk_words = word_set(chunk_text);
    let overlap = question_words.intersection(&chunk_words).count();
    let length_penalty = 1.0 / (chunk_text.split_whitespace().count() as f64 + 1.0);

    overlap as f64 * (1.0 - length_penalty)
}

pub fn score_chunks<'a>(question: &str, chunks: &'a [Chunk]) -> Vec<ScoredChunk<'a>> {
    chunks
        .iter()
        .map(|chunk| ScoredChunk {
            chunk,
            score: score(&chunk.text, question),
        })
        .collect()
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
