use crate::error::QueryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub document: String,
    pub page: u32,
    pub index: usize,
    pub text: String,
    pub token_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionBudget {
    pub max_total_tokens: usize,
    pub prompt_overhead_tokens: usize,
    // `None` lets one document contribute any number of chunks.
    pub max_chunks_per_document: Option<usize>,
}

impl SelectionBudget {
    pub fn available_tokens(&self, question_tokens: usize) -> usize {
        self.max_total_tokens
            .saturating_sub(self.prompt_overhead_tokens.saturating_add(question_tokens))
    }
}

impl Default for SelectionBudget {
    fn default() -> Self {
        Self {
            max_total_tokens: 6_000,
            prompt_overhead_tokens: 500,
            max_chunks_per_document: Some(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub chunks: Vec<ScoredChunk<'a>>,
    pub available_tokens: usize,
    pub consumed_tokens: usize,
}

impl<'a> Selection<'a> {
    pub fn chunks(&self) -> Vec<&'a Chunk> {
        self.chunks.iter().map(|scored| scored.chunk).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsultedDocument {
    pub name: String,
    pub excerpts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChunkingOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<&'static str>,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            chunk_overlap: 200,
            separators: vec![
                "\n\n", "\n", ".", "!", "?", "¿", "¡", ";", ":", " ", "",
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub system_directive: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stream: bool,
}

pub const DEFAULT_COMPLETION_MODEL: &str = "nvidia/llama-3.3-nemotron-super-49b-v1.5";

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            system_directive: "/think".to_string(),
            temperature: 0.6,
            top_p: 0.95,
            max_output_tokens: 4_000,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stream: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub chunking: ChunkingOptions,
    pub selection: SelectionBudget,
    pub context_token_ceiling: usize,
    pub completion: CompletionOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingOptions::default(),
            selection: SelectionBudget::default(),
            context_token_ceiling: 6_000,
            completion: CompletionOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    pub completion: Completion,
    pub consulted: Vec<ConsultedDocument>,
    pub context_tokens: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum TurnReply {
    Answered(Box<Answer>),
    // The greeting, if any, is still part of the turn.
    Failed(QueryError),
    NeedsDocuments { question: String },
    NeedsQuestion,
    GreetingOnly,
}

#[derive(Debug)]
pub struct Turn {
    pub greeting: Option<String>,
    pub reply: TurnReply,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedPdf {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Corpus {
    pub folder: String,
    pub documents: Vec<String>,
    pub chunks: Vec<Chunk>,
    pub skipped_files: Vec<SkippedPdf>,
    pub loaded_at: DateTime<Utc>,
    pub load_time: Duration,
}

impl Corpus {
    pub fn total_tokens(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.token_count).sum()
    }
}
