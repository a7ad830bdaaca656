//! pws-chunk — chunk a PWS document corpus into JSON records.
//!
//! Usage:
//!   pws-chunk build knowledge/ library/ --output chunks.json
//!   pws-chunk build lectures/ --output chunks.json --nested --tokenizer tokenizer.json
//!   pws-chunk classify "N02_UnDefined_Problems.txt" "PWS_INNOVATION_BOOK.txt"
//!   pws-chunk curriculum --output curriculum.json

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info};

use pws_chunker::{
    ChunkerConfig, ChunkingPipeline, CorpusStats, Curriculum, SourceDocument, classify_path,
    load_corpus, token_counter_from_file, write_json,
};

/// Structure-aware chunking for the PWS innovation curriculum.
#[derive(Parser)]
#[command(name = "pws-chunk", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk every document under the given directories and write JSON.
    Build(BuildArgs),
    /// Print the document type of each name or path.
    Classify {
        #[arg(required = true)]
        names: Vec<PathBuf>,
    },
    /// Write the built-in curriculum as JSON, ready for editing.
    Curriculum {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Directories (or single files) to chunk.
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// Where to write the chunk array.
    #[arg(long, short, default_value = "chunks.json")]
    output: PathBuf,

    /// Keep structured metadata instead of flattening it to scalars.
    #[arg(long)]
    nested: bool,

    #[arg(long, default_value_t = 1000)]
    target_words: usize,

    #[arg(long, default_value_t = 200)]
    overlap_words: usize,

    #[arg(long, default_value_t = 500)]
    min_words: usize,

    /// Upper bound as a multiple of the target size.
    #[arg(long, default_value_t = 1.2)]
    max_ratio: f64,

    /// Number of content keywords added to each document.
    #[arg(long, default_value_t = 15)]
    max_keywords: usize,

    /// Curriculum JSON replacing the built-in table.
    #[arg(long)]
    curriculum: Option<PathBuf>,

    /// Hugging Face `tokenizer.json` for exact token counts.
    #[arg(long)]
    tokenizer: Option<PathBuf>,

    /// Write corpus statistics to this file as well as stdout.
    #[arg(long)]
    stats: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    match cli.command {
        Command::Build(args) => build(args).await,
        Command::Classify { names } => {
            for name in names {
                println!("{}\t{}", classify_path(&name), name.display());
            }
            Ok(())
        }
        Command::Curriculum { output } => {
            let json = serde_json::to_string_pretty(&Curriculum::builtin())?;
            match output {
                Some(path) => std::fs::write(&path, json + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}

async fn build(args: BuildArgs) -> Result<()> {
    let config = ChunkerConfig::builder()
        .target_words(args.target_words)
        .overlap_words(args.overlap_words)
        .min_words(args.min_words)
        .max_ratio(args.max_ratio)
        .max_keywords(args.max_keywords)
        .build()
        .context("invalid chunking options")?;

    let curriculum = match &args.curriculum {
        Some(path) => Curriculum::from_path(path)
            .with_context(|| format!("failed to load curriculum {}", path.display()))?,
        None => Curriculum::builtin(),
    };

    let token_counter = token_counter_from_file(args.tokenizer.as_deref(), config.tokens_per_word);
    let pipeline = Arc::new(
        ChunkingPipeline::builder()
            .config(config)
            .curriculum(Arc::new(curriculum))
            .token_counter(token_counter)
            .build()?,
    );

    let mut documents: Vec<SourceDocument> = Vec::new();
    for root in &args.roots {
        let loaded =
            load_corpus(root).with_context(|| format!("failed to read {}", root.display()))?;
        documents.extend(loaded);
    }
    if documents.is_empty() {
        bail!("no documents found under the given paths");
    }

    let chunks = pipeline.chunk_concurrent(documents).await;
    write_json(&args.output, &chunks, !args.nested)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    let stats = CorpusStats::from_chunks(&chunks, pipeline.token_count_mode());
    let report = serde_json::to_string_pretty(&stats)?;
    if let Some(path) = &args.stats {
        std::fs::write(path, format!("{report}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    println!("{report}");

    info!(
        chunks = stats.chunks,
        documents = stats.documents,
        output = %args.output.display(),
        "build complete"
    );
    Ok(())
}
