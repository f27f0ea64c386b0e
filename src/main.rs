//! scoperag - Main CLI Entry Point

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scoperag::{
    cli::{parse_context, Args, Commands, Verbosity},
    config::Config,
    demo::{demo_documents, demo_scenarios},
    index::LoadReport,
    logging::init_tracing,
    providers::{ManifestProvider, MetadataProvider},
    retrieval::{PipelineResult, ScopedPipeline},
    types::{Document, RequesterContext},
};

#[cfg(unix)]
use scoperag::providers::XattrProvider;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    init_tracing(args.verbosity(), &config.logging.level);

    match &args.command {
        Commands::Demo {
            in_memory,
            require_xattr,
            brief,
        } => run_demo(&args, &config, *in_memory, *require_xattr, *brief).await,
        Commands::Query {
            query,
            manifest,
            dir,
            context,
            explain,
            json,
        } => {
            run_query(
                &args,
                &config,
                query,
                manifest.as_deref(),
                dir.as_deref(),
                context,
                *explain,
                *json,
            )
            .await
        }
        Commands::CheckXattr { dir } => check_xattr(dir.clone()),
        Commands::Config => show_config(&args, &config),
    }
}

/// Seed the demonstration corpus and walk through every scenario
async fn run_demo(
    args: &Args,
    config: &Config,
    in_memory: bool,
    require_xattr: bool,
    brief: bool,
) -> Result<()> {
    let verbosity = args.verbosity();
    let documents = demo_documents();

    let mut workspace: Option<PathBuf> = None;
    let metadata: Arc<dyn MetadataProvider> = if in_memory {
        Arc::new(ManifestProvider::from_documents(documents))
    } else {
        match seed_xattr_corpus(&documents).await {
            Ok((dir, provider)) => {
                if verbosity.show_progress() {
                    println!("📁 Corpus written to {}", dir.display());
                }
                workspace = Some(dir);
                provider
            }
            Err(e) if require_xattr => {
                return Err(e.context("xattr corpus required but could not be created"));
            }
            Err(e) => {
                eprintln!(
                    "{}: {:#}. Falling back to an in-memory corpus.",
                    "Warning".yellow(),
                    e
                );
                Arc::new(ManifestProvider::from_documents(documents))
            }
        }
    };

    let outcome = run_scenarios(config, metadata, verbosity, brief).await;

    if let Some(dir) = workspace {
        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            eprintln!(
                "{}: could not remove {}: {}",
                "Warning".yellow(),
                dir.display(),
                e
            );
        } else if verbosity.show_progress() {
            println!("\n🧹 Cleaned up {}", dir.display());
        }
    }

    outcome
}

async fn run_scenarios(
    config: &Config,
    metadata: Arc<dyn MetadataProvider>,
    verbosity: Verbosity,
    brief: bool,
) -> Result<()> {
    let pipeline = ScopedPipeline::from_config(config, metadata)?;
    load_corpus(&pipeline, verbosity).await?;

    for (number, scenario) in demo_scenarios().iter().enumerate() {
        let result = pipeline.execute(scenario.query, &scenario.context)?;

        if brief {
            println!(
                "{} {}",
                number + 1,
                result.outcome.admitted_ids().join(",")
            );
            continue;
        }

        println!(
            "\n{} {}",
            format!("Scenario {}:", number + 1).bold(),
            scenario.title
        );
        print_result(&result, &scenario.context, verbosity.show_decisions(), verbosity);
    }

    Ok(())
}

#[cfg(unix)]
async fn seed_xattr_corpus(documents: &[Document]) -> Result<(PathBuf, Arc<dyn MetadataProvider>)> {
    let dir = std::env::temp_dir().join(format!("scoperag-demo-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let seeded = async {
        XattrProvider::verify_support(dir.clone()).await?;
        let provider = XattrProvider::new(dir.clone());
        for doc in documents {
            provider
                .write_document(&doc.id, &doc.content, &doc.attributes)
                .await?;
        }
        Ok::<_, scoperag::ProviderError>(provider)
    }
    .await;

    match seeded {
        Ok(provider) => Ok((dir, Arc::new(provider))),
        Err(e) => {
            let _ = tokio::fs::remove_dir_all(&dir).await;
            Err(e.into())
        }
    }
}

#[cfg(not(unix))]
async fn seed_xattr_corpus(_documents: &[Document]) -> Result<(PathBuf, Arc<dyn MetadataProvider>)> {
    bail!("extended attributes are only available on Unix")
}

/// Load a corpus and run a single query
#[allow(clippy::too_many_arguments)]
async fn run_query(
    args: &Args,
    config: &Config,
    query: &str,
    manifest: Option<&Path>,
    dir: Option<&Path>,
    context: &[String],
    explain: bool,
    json: bool,
) -> Result<()> {
    let requester = parse_context(context).map_err(|e| anyhow!(e))?;

    let metadata: Arc<dyn MetadataProvider> = match (manifest, dir) {
        (Some(path), _) => Arc::new(
            ManifestProvider::from_file(path)
                .with_context(|| format!("Failed to load manifest {}", path.display()))?,
        ),
        (None, Some(dir)) => open_xattr_dir(dir)?,
        (None, None) => bail!("Either --manifest or --dir is required"),
    };

    // JSON output must stay machine readable
    let verbosity = if json { Verbosity::Quiet } else { args.verbosity() };

    let pipeline = ScopedPipeline::from_config(config, metadata)?;
    load_corpus(&pipeline, verbosity).await?;
    let result = pipeline.execute(query, &requester)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(
            &result,
            &requester,
            explain || verbosity.show_decisions(),
            verbosity,
        );
    }

    Ok(())
}

#[cfg(unix)]
fn open_xattr_dir(dir: &Path) -> Result<Arc<dyn MetadataProvider>> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    Ok(Arc::new(XattrProvider::new(dir)))
}

#[cfg(not(unix))]
fn open_xattr_dir(_dir: &Path) -> Result<Arc<dyn MetadataProvider>> {
    bail!("extended attributes are only available on Unix; use --manifest")
}

/// Run the corpus load behind a spinner and report per-document problems
async fn load_corpus(pipeline: &ScopedPipeline, verbosity: Verbosity) -> Result<LoadReport> {
    let spinner = verbosity.show_progress().then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Indexing documents...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    });

    let report = pipeline.load().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let report = report.context("Corpus load failed")?;

    for degraded in &report.degraded {
        eprintln!(
            "{}: {} indexed without attributes ({})",
            "Warning".yellow(),
            degraded.id,
            degraded.error
        );
    }
    for failure in &report.failures {
        eprintln!(
            "{}: {} skipped at {} stage ({})",
            "Error".red(),
            failure.id,
            failure.stage,
            failure.error
        );
    }

    if verbosity.show_progress() {
        println!(
            "📚 Indexed {} of {} documents (generation {})",
            report.indexed.len(),
            report.attempted(),
            report.generation
        );
    }

    Ok(report)
}

fn print_result(
    result: &PipelineResult,
    requester: &RequesterContext,
    explain: bool,
    verbosity: Verbosity,
) {
    let outcome = &result.outcome;

    if verbosity.show_progress() {
        println!("🔎 Query:   {}", outcome.query);
        println!("👤 Context: {}", requester);
        println!(
            "   {} of {} documents admitted",
            outcome.admitted.len(),
            outcome.evaluated
        );
    }

    if outcome.admitted.is_empty() {
        println!("{}", "No documents admitted".yellow());
    } else {
        println!("{}", "Admitted:".green().bold());
        for doc in &outcome.admitted {
            println!("  ✓ {}", doc.id.green());
        }
    }

    if explain && !outcome.denied.is_empty() {
        println!("{}", "Withheld:".red().bold());
        for denied in &outcome.denied {
            println!(
                "  ✗ {} [{}] {}",
                denied.id.red(),
                denied.denial.check,
                denied.denial.reason
            );
        }
    }

    if verbosity.show_progress() {
        println!("\n{}", "Prompt context:".bold());
        println!("{}", result.context.text.trim_end());
        if result.context.omitted > 0 {
            println!(
                "{}",
                format!(
                    "({} admitted documents omitted by the context token budget)",
                    result.context.omitted
                )
                .dimmed()
            );
        }
    }
}

/// Probe a directory for user xattr support
fn check_xattr(dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(std::env::temp_dir);
    println!("Checking extended attribute support in {}...", dir.display());

    match probe_xattr(&dir) {
        Ok(()) => {
            println!("{} user.* extended attributes are supported", "✓".green());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(unix)]
fn probe_xattr(dir: &Path) -> Result<()> {
    Ok(XattrProvider::check_support(dir)?)
}

#[cfg(not(unix))]
fn probe_xattr(_dir: &Path) -> Result<()> {
    bail!("extended attributes are only available on Unix")
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    println!("{}", "scoperag Configuration".bold());
    println!();

    match (&args.config, Config::default_path()) {
        (Some(path), _) => println!("Source: {}", path.display()),
        (None, Some(path)) if path.exists() => println!("Source: {}", path.display()),
        (None, Some(path)) => println!("Source: built-in defaults ({} not found)", path.display()),
        (None, None) => println!("Source: built-in defaults"),
    }
    println!("Verbosity: {}", args.verbosity().as_str());
    println!();

    println!("{}", config.to_toml_string()?);

    let filter = scoperag::PolicyFilter::from_config(&config.policy)?;
    println!("Check order: {}", filter.check_names().join(" -> "));

    Ok(())
}
