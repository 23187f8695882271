use anyhow::Result;
use clap::{Parser, ValueEnum};
use retriever_index::CodeIndex;
use retriever_llm::{embed_index, GeminiClient, LlmClient, OpenAiClient, StubClient};
use retriever_model::FragmentKind;
use retriever_parser::{JavaSourceParser, SourceParser};
use retriever_search::{
    DependencyStrategy, EmbeddingStrategy, HybridStrategy, KeywordStrategy, RetrievalStrategy,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

mod shell;

#[derive(Parser)]
#[command(name = "code-retriever")]
#[command(about = "Hybrid code retrieval and question answering over a Java codebase", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory of the project to analyze
    project_dir: PathBuf,

    /// Generate embeddings up front and enable the semantic signal
    #[arg(long)]
    embeddings: bool,

    /// LLM provider for embeddings and the ask command
    #[arg(long, value_enum, default_value = "gemini")]
    provider: Provider,

    /// Retrieval strategy for search and ask
    #[arg(long, value_enum, default_value = "hybrid")]
    strategy: StrategyFlag,

    /// Maximum number of search results
    #[arg(long, default_value_t = 10)]
    max_results: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum Provider {
    Gemini,
    Openai,
    /// Deterministic offline stub, useful for demos without an API key
    Stub,
}

#[derive(Copy, Clone, ValueEnum)]
enum StrategyFlag {
    Keyword,
    Dependency,
    Embedding,
    Hybrid,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn build_client(provider: Provider) -> Result<Arc<dyn LlmClient>> {
    Ok(match provider {
        Provider::Gemini => Arc::new(GeminiClient::new(env::var("GOOGLE_API_KEY").ok())?),
        Provider::Openai => Arc::new(OpenAiClient::new(env::var("OPENAI_API_KEY").ok())?),
        Provider::Stub => Arc::new(StubClient::default()),
    })
}

fn build_strategy(
    flag: StrategyFlag,
    client: Arc<dyn LlmClient>,
    use_embeddings: bool,
) -> Box<dyn RetrievalStrategy> {
    match flag {
        StrategyFlag::Keyword => Box::new(KeywordStrategy::new()),
        StrategyFlag::Dependency => Box::new(DependencyStrategy::new()),
        StrategyFlag::Embedding => Box::new(EmbeddingStrategy::new(client)),
        StrategyFlag::Hybrid => Box::new(HybridStrategy::new(client, use_embeddings)),
    }
}

fn print_statistics(index: &CodeIndex) {
    let count = |kind| index.by_kind(kind).len();

    println!("\n=== Project Statistics ===");
    println!("Classes:    {}", count(FragmentKind::Class));
    println!("Interfaces: {}", count(FragmentKind::Interface));
    println!("Enums:      {}", count(FragmentKind::Enum));
    println!("Methods:    {}", count(FragmentKind::Method));
    println!("Fields:     {}", count(FragmentKind::Field));
    println!("Total:      {}", index.len());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    log::info!("Analyzing project at: {}", cli.project_dir.display());

    println!("\n[1/4] Parsing Java files...");
    let parser = JavaSourceParser::new();
    let fragments = parser.parse_directory(&cli.project_dir);
    if fragments.is_empty() {
        log::warn!("No code fragments found. Exiting.");
        println!(
            "! No Java files found or parsed in directory: {}",
            cli.project_dir.display()
        );
        return Ok(());
    }
    println!("✓ Found {} code fragments", fragments.len());

    println!("\n[2/4] Building code index...");
    let mut index = CodeIndex::build(fragments);
    println!("✓ Index built successfully ({} fragments).", index.len());
    print_statistics(&index);

    println!("\n[3/4] Initializing services...");
    let client = build_client(cli.provider)?;
    if client.is_available() {
        log::info!("LLM client initialized: {}", client.provider_name());
        println!("✓ LLM client ready: {}", client.provider_name());
    } else {
        log::warn!("No API key configured; the 'ask' command will be disabled.");
        println!("! WARNING: no API key set for the selected provider.");
        println!("! The 'ask' command and embeddings will not work until one is exported.");
    }

    let mut use_embeddings = cli.embeddings;
    if use_embeddings {
        println!("\n[3b/4] Generating code embeddings...");
        match embed_index(client.as_ref(), &mut index) {
            Ok(embedded) => {
                println!("✓ Generated embeddings for {embedded}/{} fragments.", index.len());
            }
            Err(err) => {
                log::error!("Failed to generate embeddings: {err}");
                println!("! Error generating embeddings: {err}");
                println!("! Continuing without the semantic signal.");
                use_embeddings = false;
            }
        }
    }

    let strategy = build_strategy(cli.strategy, Arc::clone(&client), use_embeddings);
    log::info!("Using retrieval strategy: {}", strategy.name());

    println!("\n[4/4] Starting interactive mode...");
    shell::Shell::new(&index, strategy, client, cli.max_results).run()?;

    println!("\nGoodbye!");
    Ok(())
}
