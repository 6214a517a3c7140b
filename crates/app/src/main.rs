mod chat;
mod render;

use anyhow::anyhow;
use chat::{ChatCommand, CHAT_HELP};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use pdf_qa_core::{
    check_connection, load_and_chunk, ApproxTokenCounter, BpeTokenCounter, ChatCompletionsClient,
    ChunkingOptions, CompletionError, CompletionOptions, LopdfExtractor, QaSession,
    SelectionBudget, SessionOptions, TokenCounter, TurnReply, DEFAULT_BASE_URL,
    DEFAULT_COMPLETION_MODEL, DEFAULT_TOKENIZER_MODEL,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Folder that contains the PDF documents (not searched recursively)
    #[arg(long, env = "PDF_QA_DOCUMENTS", default_value = "./pdf_files_retail")]
    documents: PathBuf,

    /// API key for the completion endpoint
    #[arg(long, env = "NVIDIA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, env = "PDF_QA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Completion model identifier
    #[arg(long, env = "PDF_QA_MODEL", default_value = DEFAULT_COMPLETION_MODEL)]
    model: String,

    /// How tokens are counted for chunking and budgets
    #[arg(long, value_enum, default_value_t = TokenizerKind::Bpe)]
    tokenizer: TokenizerKind,

    /// Model whose BPE tables are used when --tokenizer=bpe
    #[arg(long, default_value = DEFAULT_TOKENIZER_MODEL)]
    tokenizer_model: String,

    /// Maximum chunk size in tokens
    #[arg(long, default_value = "1000")]
    chunk_size: usize,

    /// Tokens shared between neighbouring chunks
    #[arg(long, default_value = "200")]
    chunk_overlap: usize,

    /// Token ceiling for the assembled context
    #[arg(long, default_value = "6000")]
    context_tokens: usize,

    /// Tokens reserved for the prompt template
    #[arg(long, default_value = "500")]
    prompt_overhead: usize,

    /// Chunks one document may contribute per question; 0 lifts the cap
    #[arg(long, default_value = "1")]
    max_chunks_per_document: usize,

    /// Maximum tokens the model may generate per answer
    #[arg(long, default_value = "4000")]
    max_output_tokens: u32,

    #[arg(long, default_value = "0.6")]
    temperature: f32,

    #[arg(long, default_value = "0.95")]
    top_p: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum TokenizerKind {
    /// tiktoken BPE tables
    Bpe,
    /// One token per four characters
    Approx,
}

#[derive(Subcommand)]
enum Command {
    /// Load the documents and answer a single question.
    Ask {
        /// Question, optionally preceded by a greeting
        #[arg(long)]
        question: String,
    },
    /// Interactive session: load once, ask many questions.
    Chat {
        /// Load the documents before the first prompt.
        #[arg(long, default_value_t = false)]
        load: bool,
        /// Do not probe the completion endpoint at start-up.
        #[arg(long, default_value_t = false)]
        skip_connection_check: bool,
    },
    /// Verify API key, model access and connectivity.
    Check,
    /// Load the documents and print chunk statistics without calling the model.
    Chunks {
        /// Print every chunk's text.
        #[arg(long, default_value_t = false)]
        show_text: bool,
    },
}

impl Cli {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            chunking: ChunkingOptions {
                chunk_size: self.chunk_size,
                chunk_overlap: self.chunk_overlap,
                ..ChunkingOptions::default()
            },
            selection: SelectionBudget {
                max_total_tokens: self.context_tokens,
                prompt_overhead_tokens: self.prompt_overhead,
                max_chunks_per_document: Some(self.max_chunks_per_document).filter(|cap| *cap > 0),
            },
            context_token_ceiling: self.context_tokens,
            completion: CompletionOptions {
                model: self.model.clone(),
                temperature: self.temperature,
                top_p: self.top_p,
                max_output_tokens: self.max_output_tokens,
                ..CompletionOptions::default()
            },
        }
    }

    fn token_counter(&self) -> anyhow::Result<Box<dyn TokenCounter>> {
        Ok(match self.tokenizer {
            TokenizerKind::Bpe => Box::new(
                BpeTokenCounter::for_model(&self.tokenizer_model)
                    .map_err(|error| anyhow!(error.to_string()))?,
            ),
            TokenizerKind::Approx => Box::new(ApproxTokenCounter),
        })
    }
}

type Session = QaSession<ChatCompletionsClient, Box<dyn TokenCounter>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let options = cli.session_options();
    let counter = cli.token_counter()?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        documents = %cli.documents.display(),
        "pdf-qa boot"
    );

    match cli.command {
        Command::Chunks { show_text } => {
            let report = load_and_chunk(
                &cli.documents,
                &LopdfExtractor,
                counter.as_ref(),
                &options.chunking,
            )
            .map_err(|error| anyhow!(render::load_failure(&error)))?;

            print!("{}", render::chunk_listing(&report, show_text));
        }
        Command::Check => {
            let client = build_client(cli.api_key.as_deref(), &cli.base_url)?;
            let completion = check_connection(&client, &options.completion)
                .await
                .map_err(|error| anyhow!(render::connection_failure(&error)))?;

            println!(
                "conexión correcta: endpoint={} modelo={}",
                client.endpoint(),
                completion.model.as_deref().unwrap_or(&options.completion.model)
            );
        }
        Command::Ask { question } => {
            let client = build_client(cli.api_key.as_deref(), &cli.base_url)?;
            let mut session = QaSession::new(client, counter, options)?;

            let corpus = session
                .load_pdfs(&cli.documents)
                .map_err(|error| anyhow!(render::load_failure(&error)))?;
            log_skipped(corpus);

            let turn = session.respond(&question).await;
            print!("{}", render::turn(&turn));

            if matches!(turn.reply, TurnReply::Failed(_)) {
                return Err(anyhow!("no se pudo responder la consulta"));
            }
        }
        Command::Chat {
            load,
            skip_connection_check,
        } => {
            let client = build_client(cli.api_key.as_deref(), &cli.base_url)?;
            let mut session = QaSession::new(client, counter, options)?;

            if !skip_connection_check {
                check_connection(session.backend(), &session.options().completion)
                    .await
                    .map_err(|error| anyhow!(render::connection_failure(&error)))?;
                info!("completion endpoint reachable");
            }

            if load {
                load_and_report(&mut session, &cli.documents);
            }

            run_chat(&mut session, &cli.documents).await?;
        }
    }

    Ok(())
}

fn build_client(api_key: Option<&str>, base_url: &str) -> anyhow::Result<ChatCompletionsClient> {
    let api_key = api_key.ok_or_else(|| {
        CompletionError::NotConfigured("NVIDIA_API_KEY is not set".to_string())
    });

    api_key
        .and_then(|key| ChatCompletionsClient::new(base_url, key))
        .map_err(|error| anyhow!(render::connection_failure(&error)))
}

fn log_skipped(corpus: &pdf_qa_core::Corpus) {
    for skipped in &corpus.skipped_files {
        warn!(path = %skipped.path, reason = %skipped.reason, "skipped pdf");
    }
}

fn load_and_report(session: &mut Session, folder: &Path) {
    match session.load_pdfs(folder) {
        Ok(corpus) => {
            log_skipped(corpus);
            println!("{}", render::load_summary(corpus));
        }
        Err(error) => eprintln!("{}", render::load_failure(&error)),
    }
}

async fn run_chat(session: &mut Session, default_folder: &Path) -> anyhow::Result<()> {
    println!("{CHAT_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Help => println!("{CHAT_HELP}"),
            ChatCommand::Reset => {
                session.reset();
                println!("Documentos descartados.");
            }
            ChatCommand::Load(folder) => {
                let folder = folder.map(Path::new).unwrap_or(default_folder);
                load_and_report(session, folder);
            }
            ChatCommand::Input(text) => print!("{}", render::turn(&session.respond(text).await)),
        }
    }

    Ok(())
}
