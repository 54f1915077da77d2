// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cogent - an autonomous task-solving agent with long-term memory.
//!
//! This is the binary entry point for the Cogent agent.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cogent_agent::{AgentRunner, RunStatus, RunnerConfig};
use cogent_config::CogentConfig;
use cogent_llm::ChatClient;
use cogent_memory::{Embedder, LongTermMemory};
use cogent_tools::builtin::default_registry;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Cogent - an autonomous task-solving agent with long-term memory.
#[derive(Parser, Debug)]
#[command(name = "cogent", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a task through the agent loop.
    Run {
        /// The task to solve.
        task: String,
    },
    /// Show long-term memory statistics.
    Stats,
    /// Merge near-duplicate memories, keeping the more important one.
    Consolidate {
        /// Similarity threshold; defaults to the configured value.
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cogent_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            cogent_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let exit_code = match cli.command {
        Commands::Run { task } => run_task(&config, &task).await,
        Commands::Stats => show_stats(&config).await,
        Commands::Consolidate { threshold } => consolidate(&config, threshold).await,
    };
    std::process::exit(exit_code);
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens long-term memory per the configuration. Disabled memory and an
/// unopenable database both come back as an inert facade.
async fn open_memory(config: &CogentConfig) -> Arc<LongTermMemory> {
    if !config.memory.enabled {
        return Arc::new(LongTermMemory::disabled());
    }

    let embedder = Embedder::from_model_path(
        config.memory.model_path.as_deref().map(Path::new),
        config.memory.embedding_dim,
    );

    let db_path = Path::new(&config.memory.database_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "cannot create memory database directory");
                return Arc::new(LongTermMemory::disabled());
            }
        }
    }

    Arc::new(LongTermMemory::open(db_path, embedder).await)
}

async fn run_task(config: &CogentConfig, task: &str) -> i32 {
    let Some(api_key) = config.api.api_key.as_deref() else {
        eprintln!(
            "cogent: no API key configured; set api.api_key in cogent.toml \
             or the COGENT_API_API_KEY environment variable"
        );
        return 1;
    };

    let client = match ChatClient::new(
        api_key,
        config.api.base_url.clone(),
        config.api.model.clone(),
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("cogent: {e}");
            return 1;
        }
    };

    let memory = open_memory(config).await;
    let registry = default_registry(Arc::clone(&memory), Path::new(&config.tools.docs_dir));

    let runner = AgentRunner::new(
        Arc::new(client),
        Arc::new(registry),
        memory,
        RunnerConfig {
            agent_name: config.agent.name.clone(),
            system_prompt: config.agent.system_prompt.clone(),
            max_steps: config.agent.max_steps,
            buffer_capacity: config.agent.buffer_capacity,
            temperature: config.agent.temperature,
            min_importance: config.memory.min_importance,
            search_results: config.memory.search_results,
            inject_limit: config.memory.inject_limit,
            snippet_chars: config.memory.snippet_chars,
        },
    );

    match runner.run(task).await {
        Ok(outcome) => {
            println!("{}", outcome.answer);
            if outcome.status == RunStatus::StepLimitExceeded {
                eprintln!("cogent: step budget exhausted after {} steps", outcome.steps);
            }
            0
        }
        Err(e) => {
            eprintln!("cogent: {e}");
            1
        }
    }
}

async fn show_stats(config: &CogentConfig) -> i32 {
    let memory = open_memory(config).await;
    let stats = memory.stats().await;
    println!("total memories:     {}", stats.total);
    println!("average importance: {:.3}", stats.average_importance);
    println!("embedding strategy: {}", stats.embedding_strategy);
    for (kind, count) in &stats.by_type {
        println!("  {kind}: {count}");
    }
    0
}

async fn consolidate(config: &CogentConfig, threshold: Option<f64>) -> i32 {
    let threshold = threshold.unwrap_or(config.memory.consolidation_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        eprintln!("cogent: consolidation threshold must be between 0.0 and 1.0");
        return 1;
    }
    let memory = open_memory(config).await;
    let removed = memory.consolidate(threshold).await;
    println!("consolidated {removed} near-duplicate memories (threshold {threshold})");
    0
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = cogent_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "cogent");
        assert_eq!(config.agent.max_steps, 6);
    }
}
