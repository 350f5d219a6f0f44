//! klink CLI - Cross-corpus knowledge extraction
//!
//! Usage:
//!   klink entities --papers papers.json --articles articles.json
//!   klink relations --papers papers.json --articles articles.json
//!   klink links --papers papers.json --articles articles.json
//!   klink run --papers papers.json --articles articles.json

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use klink_cli::pipeline::{self, CorpusSet};
use klink_cli::{load_articles, load_papers};
use klink_core::AppConfig;
use klink_nlp::RuleAnnotator;
use klink_vector::BertEncoder;

#[derive(Parser)]
#[command(name = "klink")]
#[command(about = "Knowledge extraction and cross-corpus linking pipeline")]
#[command(version)]
struct Cli {
    /// Optional TOML config file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Paper corpus JSON file
    #[arg(long)]
    papers: PathBuf,

    /// Article corpus JSON file
    #[arg(long)]
    articles: PathBuf,

    /// Output directory for report artifacts
    #[arg(long, default_value = "reports")]
    out: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract typed entity mentions and write the entity report
    Entities {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Extract relations and write the relation report
    Relations {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Link articles to their most similar papers
    Links {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Run all three phases
    Run {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };

    init_tracing(&config);
    let run_id = Uuid::new_v4();
    info!(%run_id, "starting klink");

    match cli.command {
        Commands::Entities { corpus } => {
            let corpora = load(&corpus)?;
            let annotator = Arc::new(RuleAnnotator::new());
            pipeline::run_entities(annotator, &corpora, &corpus.out)?;
        }
        Commands::Relations { corpus } => {
            let corpora = load(&corpus)?;
            let annotator = Arc::new(RuleAnnotator::new());
            pipeline::run_relations(
                annotator,
                config.extraction.clone(),
                &corpora,
                &corpus.out,
            )?;
        }
        Commands::Links { corpus } => {
            let corpora = load(&corpus)?;
            let encoder = Arc::new(BertEncoder::load(&config.encoder)?);
            pipeline::run_links(
                encoder,
                &config.linker,
                config.encoder.batch_size,
                &corpora,
                &corpus.out,
            )
            .await?;
        }
        Commands::Run { corpus } => {
            let corpora = load(&corpus)?;
            let annotator = Arc::new(RuleAnnotator::new());
            pipeline::run_entities(annotator.clone(), &corpora, &corpus.out)?;
            pipeline::run_relations(
                annotator,
                config.extraction.clone(),
                &corpora,
                &corpus.out,
            )?;

            let encoder = Arc::new(BertEncoder::load(&config.encoder)?);
            pipeline::run_links(
                encoder,
                &config.linker,
                config.encoder.batch_size,
                &corpora,
                &corpus.out,
            )
            .await?;
        }
    }

    info!(%run_id, "klink finished");
    Ok(())
}

fn load(args: &CorpusArgs) -> anyhow::Result<CorpusSet> {
    std::fs::create_dir_all(&args.out)?;
    Ok(CorpusSet {
        papers: load_papers(&args.papers)?,
        articles: load_articles(&args.articles)?,
    })
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.json_format {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
