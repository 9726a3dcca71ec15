//! Scry CLI — iterative multi-source deep research.
//!
//! Usage:
//!   scry research <topic> [--depth deep] [--max-iterations N] [--focus area]...
//!   scry search <query> [--source web]... [--depth medium]

use clap::{Parser, Subcommand};
use scry::{
    AgentRegistry, DeepResearchOrchestrator, DeepResearchQuery, Depth, LexicalScorer,
    MemoryGraph, Phase, SourceType, WideResearchEngine, WideResearchQuery,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "scry",
    version,
    about = "Iterative multi-source deep research engine"
)]
struct Cli {
    /// Emit results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full iterative research loop on a topic
    Research {
        /// The topic to research
        topic: String,
        /// Search depth: shallow, medium, or deep
        #[arg(long, default_value = "deep")]
        depth: Depth,
        /// Maximum number of research rounds
        #[arg(long, default_value_t = 5)]
        max_iterations: usize,
        /// Allowed residual novelty before the loop stops
        #[arg(long, default_value_t = 0.2)]
        threshold: f32,
        /// Focus area to emphasize (repeatable)
        #[arg(long = "focus")]
        focus_areas: Vec<String>,
        /// Area to exclude from follow-up queries (repeatable)
        #[arg(long = "exclude")]
        exclude_areas: Vec<String>,
        /// Run-level time budget in seconds
        #[arg(long, default_value_t = 600)]
        timeout_secs: u64,
    },
    /// Run a single wide search round
    Search {
        /// The query to run
        query: String,
        /// Source type to use (repeatable); derived from depth when unset
        #[arg(long = "source")]
        sources: Vec<SourceType>,
        /// Search depth when no sources are given
        #[arg(long, default_value = "medium")]
        depth: Depth,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scry=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scorer = Arc::new(LexicalScorer::new());
    let client = match reqwest::Client::builder()
        .user_agent(format!("scry/{}", scry::VERSION))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let registry = Arc::new(AgentRegistry::with_stock_agents(client, scorer));
    let engine = Arc::new(WideResearchEngine::new(registry));

    let outcome = match cli.command {
        Commands::Research {
            topic,
            depth,
            max_iterations,
            threshold,
            focus_areas,
            exclude_areas,
            timeout_secs,
        } => {
            let mut query = DeepResearchQuery::new(topic)
                .with_depth(depth)
                .with_max_iterations(max_iterations)
                .with_convergence_threshold(threshold)
                .with_focus_areas(focus_areas)
                .with_exclude_areas(exclude_areas);
            query.total_timeout = Duration::from_secs(timeout_secs);
            run_research(&engine, query, cli.json).await
        }
        Commands::Search {
            query,
            sources,
            depth,
        } => {
            let mut wide = WideResearchQuery::new(query).with_depth(depth);
            if !sources.is_empty() {
                wide = wide.with_sources(sources);
            }
            run_search(&engine, wide, cli.json).await
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_research(
    engine: &Arc<WideResearchEngine>,
    query: DeepResearchQuery,
    json: bool,
) -> Result<(), scry::ResearchError> {
    let graph = Arc::new(MemoryGraph::new());
    let orchestrator = DeepResearchOrchestrator::new(engine.clone(), graph);
    let mut session = orchestrator.start(query)?;

    while let Some(progress) = session.next_progress().await {
        match progress.phase {
            Phase::Searching => {
                let query_text = progress.current_query.as_deref().unwrap_or("-");
                eprintln!("[round {}] searching: {}", progress.iteration, query_text);
            }
            Phase::Integrating => {
                eprintln!("[round {}] integrating findings", progress.iteration);
            }
            Phase::Analyzing => {
                eprintln!(
                    "[round {}] analyzing: novelty {:.2}, convergence {:.2}, {} gaps",
                    progress.iteration,
                    progress.novelty_rate.unwrap_or(1.0),
                    progress.convergence_score.unwrap_or(0.0),
                    progress.gaps.len()
                );
            }
            Phase::WaitingGuidance | Phase::Completed => {}
        }
    }

    let result = session.finish().await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result)
                .map_err(|e| scry::ResearchError::Internal(e.to_string()))?
        );
        return Ok(());
    }

    println!("{}", result.summary);
    println!();
    println!("Key findings:");
    for (rank, finding) in result.key_findings.iter().enumerate() {
        println!(
            "  {}. {} [{}] {}",
            rank + 1,
            finding.title,
            finding.source_type,
            finding.url
        );
    }
    if !result.remaining_gaps.is_empty() {
        println!();
        println!("Remaining gaps:");
        for gap in &result.remaining_gaps {
            println!("  - {}", gap.description);
        }
    }
    Ok(())
}

async fn run_search(
    engine: &Arc<WideResearchEngine>,
    query: WideResearchQuery,
    json: bool,
) -> Result<(), scry::ResearchError> {
    let result = engine.research(&query).await?;

    if json {
        let findings = serde_json::to_string_pretty(&result.findings)
            .map_err(|e| scry::ResearchError::Internal(e.to_string()))?;
        println!("{}", findings);
        return Ok(());
    }

    println!(
        "{} findings ({:?}, coverage {:.0}%)",
        result.findings.len(),
        result.status,
        result.coverage.coverage_rate * 100.0
    );
    for finding in &result.findings {
        println!("  [{}] {} — {}", finding.source_type, finding.title, finding.url);
    }
    Ok(())
}
