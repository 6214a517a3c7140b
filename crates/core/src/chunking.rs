use crate::error::LoadError;
use crate::models::ChunkingOptions;
use crate::tokenizer::TokenCounter;
use regex::Regex;
use std::collections::VecDeque;

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct TextNormalizer {
    abbreviations: Vec<(Regex, &'static str)>,
}

impl TextNormalizer {
    pub fn new() -> Result<Self, LoadError> {
        // Longer abbreviation first so `Dra.` never reads as `D.` plus `ra.`.
        let abbreviations = [
            (r"\bDra\.(\s|$)", "Doctora${1}"),
            (r"\bD\.(\s|$)", "Doctor${1}"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| Regex::new(pattern).map(|regex| (regex, replacement)))
        .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { abbreviations })
    }

    pub fn normalize(&self, text: &str) -> String {
        let mut normalized = normalize_whitespace(text);
        for (pattern, replacement) in &self.abbreviations {
            normalized = pattern.replace_all(&normalized, *replacement).into_owned();
        }
        normalized.trim().to_string()
    }
}

pub struct RecursiveSplitter<'c> {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<&'static str>,
    counter: &'c dyn TokenCounter,
}

impl<'c> RecursiveSplitter<'c> {
    pub fn new(options: &ChunkingOptions, counter: &'c dyn TokenCounter) -> Result<Self, LoadError> {
        if options.chunk_size == 0 {
            return Err(LoadError::InvalidChunkConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        if options.chunk_overlap > options.chunk_size {
            return Err(LoadError::InvalidChunkConfig(format!(
                "chunk overlap {} is larger than chunk size {}",
                options.chunk_overlap, options.chunk_size
            )));
        }

        Ok(Self {
            chunk_size: options.chunk_size,
            chunk_overlap: options.chunk_overlap,
            separators: options.separators.clone(),
            counter,
        })
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[&'static str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|separator| separator.is_empty() || text.contains(separator));

        let (separator, remaining) = match position {
            Some(index) => (separators[index], &separators[index + 1..]),
            None => (separators.last().copied().unwrap_or(""), &[][..]),
        };

        let mut chunks = Vec::new();
        let mut pending = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if self.counter.count_tokens(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let tokens = self.counter.count_tokens(piece);

            if total + tokens > self.chunk_size && !window.is_empty() {
                push_joined(&window, &mut merged);

                while total > self.chunk_overlap || (total + tokens > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, tokens));
            total += tokens;
        }

        push_joined(&window, &mut merged);
        merged
    }
}

fn push_joined(window: &VecDeque<(&str, usize)>, target: &mut Vec<String>) {
    let joined = window.iter().map(|(piece, _)| *piece).collect::<String>();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        target.push(trimmed.to_string());
    }
}

fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(index, ch)| &text[index..index + ch.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > start {
            pieces.push(&text[start..index]);
        }
        start = index;
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}
