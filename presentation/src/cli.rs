use crate::server;
use anyhow::Context;
use application::answer_service::AnswerService;
use application::index_service::IndexService;
use application::rag_service::RagService;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::models::{Answer, AnswerRequest};
use domain::ports::{AnswerGenerator, Captioner, EmbeddingModel};
use infrastructure::chunker::WordChunker;
use infrastructure::config::{Config, LlmBackend};
use infrastructure::corpus_store::CorpusStore;
use infrastructure::ollama_client::OllamaClient;
use infrastructure::openai_client::OpenAiClient;
use shared::types::Result;
use shared::utils::truncate_with_ellipsis;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tds_ta")]
#[command(about = "Virtual teaching assistant: retrieval-augmented answers over course content and forum posts")]
pub struct Cli {
    /// Corpus bundle produced by `build`
    #[arg(long, global = true, env = "CORPUS_PATH")]
    pub corpus: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the question-answering HTTP API
    Serve {
        /// host:port to bind
        #[arg(long, env = "BIND_ADDR")]
        bind: Option<String>,
    },

    /// Answer a single question and print it with its links
    Ask {
        /// Image file to attach to the question
        #[arg(long)]
        image: Option<PathBuf>,

        /// MIME type of the image (guessed from the extension when omitted)
        #[arg(long)]
        mime_type: Option<String>,

        /// Chunks of context to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Print the chunks closest to a query
    Search {
        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: usize,

        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,
    },

    /// Chunk and embed scraped documents into a corpus bundle
    Build {
        /// Course content JSON ([{content, github_url}])
        #[arg(long)]
        course: PathBuf,

        /// Forum posts JSON ([{content, url}])
        #[arg(long)]
        discourse: PathBuf,

        /// Words per chunk
        #[arg(long, default_value_t = infrastructure::chunker::DEFAULT_CHUNK_WORDS)]
        chunk_words: usize,

        /// Words shared by consecutive chunks
        #[arg(long, default_value_t = infrastructure::chunker::DEFAULT_OVERLAP_WORDS)]
        overlap_words: usize,
    },
}

/// Guess an image MIME type from a file extension.
pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

pub struct CliApp {
    config: Config,
}

impl CliApp {
    pub fn new() -> Self {
        Self {
            config: Config::load(),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&mut self, cli: Cli) -> Result<()> {
        if let Some(corpus) = cli.corpus {
            self.config.corpus_path = corpus;
        }

        match cli.command {
            Command::Serve { bind } => {
                let bind = bind.unwrap_or_else(|| self.config.bind_addr.clone());
                let service = Arc::new(self.answer_service(None)?);
                server::serve(service, &bind).await
            }
            Command::Ask {
                image,
                mime_type,
                top_k,
                question,
            } => {
                let request = self.ask_request(question.join(" "), image.as_deref(), mime_type)?;
                let service = self.answer_service(top_k)?;
                let answer = service.answer(&request).await?;
                print_answer(&answer);
                Ok(())
            }
            Command::Search { top_k, query } => self.run_search(&query.join(" "), top_k).await,
            Command::Build {
                course,
                discourse,
                chunk_words,
                overlap_words,
            } => {
                let chunker = WordChunker::new(chunk_words, overlap_words)?;
                let service = IndexService::new(
                    chunker,
                    self.embedding_model()?,
                    CorpusStore::new(&self.config.corpus_path),
                );
                let corpus = service.build_from_files(&course, &discourse).await?;
                println!(
                    "{} {} chunks written to {}",
                    "done:".green().bold(),
                    corpus.len(),
                    self.config.corpus_path.display()
                );
                Ok(())
            }
        }
    }

    fn embedding_model(&self) -> Result<Arc<dyn EmbeddingModel>> {
        Ok(Arc::new(OllamaClient::from_config(&self.config)?))
    }

    fn rag_service(&self) -> Result<RagService> {
        let store = CorpusStore::new(&self.config.corpus_path);
        RagService::load(&store, self.embedding_model()?).context("loading corpus")
    }

    fn answer_service(&self, top_k: Option<usize>) -> Result<AnswerService> {
        let rag = Arc::new(self.rag_service()?);
        let (generator, captioner): (Arc<dyn AnswerGenerator>, Arc<dyn Captioner>) =
            match self.config.llm_backend {
                LlmBackend::OpenAi => {
                    let client = Arc::new(OpenAiClient::from_config(&self.config)?);
                    let generator: Arc<dyn AnswerGenerator> = client.clone();
                    let captioner: Arc<dyn Captioner> = client;
                    (generator, captioner)
                }
                LlmBackend::Ollama => {
                    let client = Arc::new(OllamaClient::from_config(&self.config)?);
                    let generator: Arc<dyn AnswerGenerator> = client.clone();
                    let captioner: Arc<dyn Captioner> = client;
                    (generator, captioner)
                }
            };
        info!(
            backend = ?self.config.llm_backend,
            chat_model = %self.config.chat_model,
            chunks = rag.corpus().len(),
            "answer service ready"
        );
        Ok(AnswerService::new(rag, generator)
            .with_captioner(captioner)
            .with_top_k(top_k.unwrap_or(self.config.top_k)))
    }

    fn ask_request(
        &self,
        question: String,
        image: Option<&Path>,
        mime_type: Option<String>,
    ) -> Result<AnswerRequest> {
        let Some(path) = image else {
            return Ok(AnswerRequest::text(question));
        };
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading image {}", path.display()))?;
        let mime_type = mime_type
            .or_else(|| guess_mime_type(path).map(str::to_string))
            .with_context(|| format!("cannot guess MIME type of {}, pass --mime-type", path.display()))?;
        Ok(AnswerRequest {
            question,
            image: Some(STANDARD.encode(bytes)),
            mime_type: Some(mime_type),
        })
    }

    async fn run_search(&self, query: &str, top_k: usize) -> Result<()> {
        let rag = self.rag_service()?;
        let results = rag.search(query, top_k).await?;
        if results.is_empty() {
            println!("{}", "No chunks in corpus.".yellow());
            return Ok(());
        }
        for (rank, result) in results.iter().enumerate() {
            println!(
                "{} {} {}",
                format!("#{}", rank + 1).bold(),
                format!("{:.4}", result.score).cyan(),
                result.source_url.underline()
            );
            println!("   {}", truncate_with_ellipsis(&result.text, 160).dimmed());
        }
        Ok(())
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.answer);
    if answer.links.is_empty() {
        return;
    }
    println!();
    println!("{}", "Sources:".bold());
    for link in &answer.links {
        println!("- {}", link.url.cyan());
        println!("  {}", link.text.dimmed());
    }
}
