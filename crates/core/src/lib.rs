pub mod chunking;
pub mod completion;
pub mod context;
pub mod error;
pub mod extractor;
pub mod greeting;
pub mod ingest;
pub mod models;
pub mod prompt;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod tokenizer;

pub use chunking::{normalize_whitespace, RecursiveSplitter, TextNormalizer};
pub use completion::{
    check_connection, ChatCompletionsClient, ChatMessage, CompletionBackend, CompletionRequest,
    Role, DEFAULT_BASE_URL,
};
pub use context::{assemble, assemble_documents, group_by_document, truncate};
pub use error::{CompletionError, LoadError, QueryError};
pub use extractor::{LopdfExtractor, PdfExtractor};
pub use greeting::{fold_diacritics, reply_for_hour, GreetingClassifier, GreetingOutcome};
pub use ingest::{discover_pdf_files, load_and_chunk, LoadReport};
pub use models::{
    Answer, Chunk, ChunkingOptions, Completion, CompletionOptions, ConsultedDocument, Corpus,
    PageText, ScoredChunk, Selection, SelectionBudget, SessionOptions, SkippedPdf, TokenUsage, Turn,
    TurnReply, DEFAULT_COMPLETION_MODEL,
};
pub use prompt::{render_prompt, PROMPT_TEMPLATE};
pub use scoring::{score, score_chunks};
pub use selection::select;
pub use session::QaSession;
pub use tokenizer::{ApproxTokenCounter, BpeTokenCounter, TokenCounter, DEFAULT_TOKENIZER_MODEL};
