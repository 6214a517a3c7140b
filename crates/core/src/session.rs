use crate::completion::CompletionBackend;
use crate::context::{assemble_documents, group_by_document, truncate};
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::greeting::GreetingClassifier;
use crate::ingest::load_and_chunk;
use crate::models::{Answer, Corpus, SessionOptions, Turn, TurnReply};
use crate::prompt::answer_request;
use crate::selection::select;
use crate::tokenizer::TokenCounter;
use crate::{LoadError, QueryError};
use chrono::{Local, Timelike, Utc};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

// Only `load` replaces the corpus and only `reset` drops it.
pub struct QaSession<B, T>
where
    B: CompletionBackend,
    T: TokenCounter,
{
    backend: B,
    counter: T,
    greeter: GreetingClassifier,
    options: SessionOptions,
    corpus: Option<Corpus>,
}

impl<B, T> QaSession<B, T>
where
    B: CompletionBackend,
    T: TokenCounter,
{
    pub fn new(backend: B, counter: T, options: SessionOptions) -> Result<Self, QueryError> {
        Ok(Self {
            backend,
            counter,
            greeter: GreetingClassifier::new()?,
            options,
            corpus: None,
        })
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn corpus(&self) -> Option<&Corpus> {
        self.corpus.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.corpus.is_some()
    }

    pub fn load_pdfs(&mut self, folder: &Path) -> Result<&Corpus, LoadError> {
        self.load(folder, &LopdfExtractor)
    }

    pub fn load(&mut self, folder: &Path, extractor: &dyn PdfExtractor) -> Result<&Corpus, LoadError> {
        let started = Instant::now();
        let report = load_and_chunk(folder, extractor, &self.counter, &self.options.chunking)?;

        let corpus = Corpus {
            folder: folder.display().to_string(),
            documents: report.documents,
            chunks: report.chunks,
            skipped_files: report.skipped_files,
            loaded_at: Utc::now(),
            load_time: started.elapsed(),
        };

        info!(
            folder = %corpus.folder,
            documents = corpus.documents.len(),
            chunks = corpus.chunks.len(),
            skipped = corpus.skipped_files.len(),
            tokens = corpus.total_tokens(),
            "documents loaded"
        );

        Ok(self.corpus.insert(corpus))
    }

    pub fn reset(&mut self) {
        if self.corpus.take().is_some() {
            info!("loaded documents dropped");
        }
    }

    pub async fn ask(&self, question: &str) -> Result<Answer, QueryError> {
        let corpus = self.corpus.as_ref().ok_or(QueryError::NotLoaded)?;
        let started = Instant::now();

        let selection = select(question, &corpus.chunks, &self.options.selection, &self.counter);
        let consulted = group_by_document(selection.chunks());
        let context = truncate(
            &assemble_documents(&consulted),
            self.options.context_token_ceiling,
            &self.counter,
        );
        let context_tokens = self.counter.count_tokens(&context);

        debug!(
            chunks = selection.chunks.len(),
            documents = consulted.len(),
            context_tokens,
            "context assembled"
        );

        let request = answer_request(&self.options.completion, &context, question);
        let completion = self.backend.complete(&request).await?;

        Ok(Answer {
            question: question.to_string(),
            completion,
            consulted,
            context_tokens,
            elapsed: started.elapsed(),
        })
    }

    pub async fn respond(&self, input: &str) -> Turn {
        self.respond_at(input, Local::now().hour()).await
    }

    pub async fn respond_at(&self, input: &str, hour: u32) -> Turn {
        let outcome = self.greeter.process_at(input, hour);
        let greeting = outcome.reply.map(str::to_string);

        let reply = match outcome.question {
            Some(question) if self.is_loaded() => match self.ask(&question).await {
                Ok(answer) => TurnReply::Answered(Box::new(answer)),
                Err(error) => {
                    warn!(%error, "question failed");
                    TurnReply::Failed(error)
                }
            },
            Some(question) => TurnReply::NeedsDocuments { question },
            None if outcome.is_greeting => TurnReply::GreetingOnly,
            None => TurnReply::NeedsQuestion,
        };

        Turn { greeting, reply }
    }
}
