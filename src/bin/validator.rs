//! Model Validator CLI
//!
//! Validates an architecture model snapshot and answers graph queries over it.

use anyhow::{bail, Context};
use archmodel::{ArchModelConfig, DependencyTracker, Layer, Model, ProjectionEngine, ValidationPipeline};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "model-validate")]
#[command(about = "Validate an architecture model and query its dependency graph")]
struct Cli {
    /// Model snapshot (JSON)
    #[arg(short, long, default_value = "model.json")]
    model: PathBuf,

    /// Extra config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Schema directory, overriding the config
    #[arg(long)]
    schemas: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full validation pipeline
    Validate {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List dependency cycles
    Cycles,

    /// Show everything that depends on an element, by layer
    Impact {
        /// Element id
        id: String,
    },

    /// Project an element onto a layer
    Project {
        /// Element id
        id: String,
        /// Target layer (e.g. "application", "04-application", "4")
        layer: String,
        /// Find elements of the layer that reach the element instead
        #[arg(long)]
        reverse: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ArchModelConfig::load_from(cli.config.as_deref())?;
    if cli.schemas.is_some() {
        config.schemas.dir = cli.schemas;
    }

    let content = std::fs::read_to_string(&cli.model)
        .with_context(|| format!("reading {}", cli.model.display()))?;
    let model = Model::from_json_str(&content).with_context(|| format!("parsing {}", cli.model.display()))?;

    match cli.command {
        Commands::Validate { json } => {
            let pipeline = ValidationPipeline::new(config.schema_source());
            let result = pipeline.validate_model(&model);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("🔍 Validating {} element(s)...", model.element_count());
                println!();
                print!("{}", result.summary());
            }

            if !result.is_valid() {
                std::process::exit(1);
            }
            if config.validation.fail_on_warnings && result.warning_count() > 0 {
                println!("❌ Warnings are treated as failures");
                std::process::exit(1);
            }
            if !json {
                println!("✅ Validation passed");
            }
            Ok(())
        }

        Commands::Cycles => {
            let cycles = DependencyTracker::from_model(&model).detect_cycles();
            if cycles.is_empty() {
                println!("✅ No cycles");
                return Ok(());
            }

            println!("❌ {} cycle(s):", cycles.len());
            for cycle in &cycles {
                println!("  └─ {} -> {}", cycle.join(" -> "), cycle[0]);
            }
            std::process::exit(1);
        }

        Commands::Impact { id } => {
            if model.element(&id).is_none() {
                bail!("no element '{}' in model", id);
            }

            let impact = DependencyTracker::from_model(&model).impact_analysis(&id);
            if impact.is_empty() {
                println!("✅ Nothing depends on {}", id);
                return Ok(());
            }

            println!("📊 Impact of changing {}:", id);
            for (layer, ids) in &impact {
                println!();
                println!("  {} ({})", layer, ids.len());
                for dependent in ids {
                    println!("    └─ {}", dependent);
                }
            }
            Ok(())
        }

        Commands::Project { id, layer, reverse } => {
            let layer = Layer::parse(&layer)?;
            if !config.projection.default_rules {
                bail!("no projection rules configured (projection.default_rules = false)");
            }
            let engine = ProjectionEngine::with_default_rules();

            let found = if reverse {
                engine.project_reverse(&model, &id, layer)
            } else {
                engine.project(&model, &id, layer)
            };

            println!("🔍 {} {} layer {}: {} element(s)", id, if reverse { "<-" } else { "->" }, layer, found.len());
            for element in found {
                println!("  └─ {} ({})", element.id, element.name);
            }
            Ok(())
        }
    }
}
