mod registry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use cadoc_core::{
    CadocConfig, ConcCred, CoreError, Discount, EntityKind, InfraEstablishment, InfraTerminal,
    Intercambio, ProfitCredit, Ranking, Segment, load_config,
};
use cadoc_eval::{
    Direction, EvalError, ExternalSource, ReconcileOptions, ReconciliationEngine,
    ReconciliationReport, reconcile_kind,
};
use cadoc_generate::output::sql::write_insert_script;
use cadoc_generate::{
    Generate, GenerateOptions, GenerationEngine, GenerationError, GenerationReport,
    rewrite_bin_script,
};
use cadoc_store::{
    FindOptions, PostgresRepository, Repository, StoreError, redact_url, store_records,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use registry::{
    EntityOutcome, OutcomeStatus, RunContext, RunPaths, RunSummary, init_run_logging, start_run,
    write_summary,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("reconciliation error: {0}")]
    Eval(#[from] EvalError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{0} entity kind(s) failed; see summary.json")]
    EntitiesFailed(usize),
}

#[derive(Parser, Debug)]
#[command(name = "cadoc", version, about = "Cadoc 6334 report generator and reconciler")]
struct Cli {
    /// TOML configuration; built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long, global = true, default_value = "runs")]
    run_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write report files from configured totals.
    Generate(GenerateArgs),
    /// Compare generated records with report files or stored rows.
    Reconcile(ReconcileArgs),
    /// Write insert scripts, optionally applying them to the database.
    Sql(SqlArgs),
    /// Add card model and product columns to a BIN insert script.
    FakeBins(FakeBinsArgs),
    /// Print the JSON schema of the configuration file.
    ConfigSchema,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Generate(_) => "generate",
            Command::Reconcile(_) => "reconcile",
            Command::Sql(_) => "sql",
            Command::FakeBins(_) => "fake-bins",
            Command::ConfigSchema => "config-schema",
        }
    }
}

#[derive(Args, Debug, Serialize)]
struct GenerateArgs {
    /// Entity kinds to generate (all when omitted).
    #[arg(long = "entity", value_name = "KIND")]
    entities: Vec<EntityKind>,
    /// Output directory; defaults to `<run>/output`.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Generation date written in headers (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Treat non-partitioning tables and failed kinds as errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Also write `<table>.sql` insert scripts.
    #[arg(long, default_value_t = false)]
    sql: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
enum Source {
    File,
    Db,
}

#[derive(Args, Debug, Serialize)]
struct ReconcileArgs {
    /// Entity kinds to reconcile (all when omitted).
    #[arg(long = "entity", value_name = "KIND")]
    entities: Vec<EntityKind>,
    #[arg(long, value_enum, default_value_t = Source::File)]
    source: Source,
    /// Directory holding the `<TOKEN>.TXT` files.
    #[arg(long, default_value = "files")]
    input: PathBuf,
    /// Database URL for `--source db`; falls back to DATABASE_URL.
    #[arg(long)]
    #[serde(skip)]
    database_url: Option<String>,
    /// Also report stored rows that were never generated.
    #[arg(long, default_value_t = false)]
    both_directions: bool,
    /// Limit the number of examples in report.md.
    #[arg(long, default_value_t = 20)]
    max_examples: usize,
    /// Count any missing key or mismatch as a failed entity.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug, Serialize)]
struct SqlArgs {
    /// Entity kinds to render (all when omitted).
    #[arg(long = "entity", value_name = "KIND")]
    entities: Vec<EntityKind>,
    /// Output directory; defaults to `<run>/sql`.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Execute the statements against the database.
    #[arg(long, default_value_t = false)]
    apply: bool,
    /// Database URL for `--apply`; falls back to DATABASE_URL.
    #[arg(long)]
    #[serde(skip)]
    database_url: Option<String>,
}

#[derive(Args, Debug, Serialize)]
struct FakeBinsArgs {
    /// BIN insert script to rewrite.
    #[arg(default_value = "sql/insert_bin.sql")]
    input: PathBuf,
    /// Write the result here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    if let Command::ConfigSchema = cli.command {
        let schema = schemars::schema_for!(CadocConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CadocConfig::default(),
    };
    let (options, database) = match &cli.command {
        Command::Generate(args) => (serde_json::to_value(args)?, None),
        Command::Reconcile(args) => (
            serde_json::to_value(args)?,
            (args.source == Source::Db)
                .then(|| database_url(&args.database_url).ok())
                .flatten(),
        ),
        Command::Sql(args) => (
            serde_json::to_value(args)?,
            args.apply
                .then(|| database_url(&args.database_url).ok())
                .flatten(),
        ),
        Command::FakeBins(args) => (serde_json::to_value(args)?, None),
        Command::ConfigSchema => (serde_json::Value::Null, None),
    };

    let run_id = Uuid::new_v4().to_string();
    let ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        command: cli.command.name().to_string(),
        run_dir: cli.run_dir.clone(),
        options,
        config_path: cli.config.clone(),
        config: config.clone(),
        database: database.as_deref().map(redact_url),
    };
    let paths = start_run(&ctx)?;
    init_run_logging(&paths.logs_path)?;

    info!(event = "run_started", run_id = %run_id, command = %ctx.command);
    let timer = Instant::now();

    let outcome = match cli.command {
        Command::Generate(args) => run_generate(args, &config, &paths),
        Command::Reconcile(args) => run_reconcile(args, &config, &paths).await,
        Command::Sql(args) => run_sql(args, &config, &paths).await,
        Command::FakeBins(args) => run_fake_bins(&args).map(|()| Vec::new()),
        Command::ConfigSchema => Ok(Vec::new()),
    };
    // summary.json is written even when the command itself failed
    let (entities, command_error) = match outcome {
        Ok(entities) => (entities, None),
        Err(err) => (Vec::new(), Some(err)),
    };

    let summary = RunSummary {
        run_id,
        command: ctx.command.clone(),
        finished_at: chrono::Utc::now().to_rfc3339(),
        entities,
    };
    write_summary(&paths, &summary)?;

    if let Some(err) = command_error {
        error!(
            event = "run_failed",
            error = %err,
            duration_ms = timer.elapsed().as_millis() as u64,
            run = %paths.root.display()
        );
        return Err(err);
    }

    let failed = summary.failed();
    info!(
        event = "run_finished",
        status = if failed == 0 { "success" } else { "partial" },
        failed,
        duration_ms = timer.elapsed().as_millis() as u64,
        run = %paths.root.display()
    );
    if failed > 0 {
        return Err(CliError::EntitiesFailed(failed));
    }
    Ok(())
}

fn database_url(flag: &Option<String>) -> Result<String, CliError> {
    flag.clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| {
            CliError::InvalidConfig(
                "database url required: pass --database-url or set DATABASE_URL".to_string(),
            )
        })
}

fn selected(kinds: &[EntityKind]) -> Vec<EntityKind> {
    if kinds.is_empty() {
        EntityKind::ALL.to_vec()
    } else {
        kinds.to_vec()
    }
}

fn run_generate(
    args: GenerateArgs,
    config: &CadocConfig,
    paths: &RunPaths,
) -> Result<Vec<EntityOutcome>, CliError> {
    let out_dir = args.out.unwrap_or_else(|| paths.root.join("output"));
    let engine = GenerationEngine::new(GenerateOptions {
        out_dir,
        strict: args.strict,
        kinds: args.entities,
        date: args.date,
        sql: args.sql,
    });
    match engine.run(config) {
        Ok(result) => {
            info!(event = "generation_report_written", path = %result.report_path.display());
            Ok(generation_outcomes(&result.report, &result.out_dir))
        }
        // strict runs fail after the report is on disk; the failed kinds
        // still go into the summary
        Err(GenerationError::Failed(report)) => {
            warn!(
                event = "generation_failed",
                failures = report.failures.len(),
                path = %engine.options().out_dir.display()
            );
            Ok(generation_outcomes(&report, &engine.options().out_dir))
        }
        Err(err) => Err(err.into()),
    }
}

fn generation_outcomes(report: &GenerationReport, out_dir: &Path) -> Vec<EntityOutcome> {
    let mut outcomes: Vec<EntityOutcome> = report
        .entities
        .iter()
        .map(|entity| EntityOutcome {
            entity: entity.kind,
            status: OutcomeStatus::Ok,
            detail: Some(format!("{} rows, sha256 {}", entity.rows, entity.sha256)),
            artifact: Some(out_dir.join(&entity.file)),
        })
        .collect();
    outcomes.extend(report.failures.iter().filter_map(|issue| {
        issue.kind.map(|entity| EntityOutcome {
            entity,
            status: OutcomeStatus::Failed,
            detail: Some(issue.message.clone()),
            artifact: None,
        })
    }));
    outcomes
}

async fn run_reconcile(
    args: ReconcileArgs,
    config: &CadocConfig,
    paths: &RunPaths,
) -> Result<Vec<EntityOutcome>, CliError> {
    let engine = ReconciliationEngine::new(ReconcileOptions {
        direction: if args.both_directions {
            Direction::Both
        } else {
            Direction::GeneratedOnly
        },
        max_examples: args.max_examples,
        strict: args.strict,
    });
    let repository = match args.source {
        Source::Db => {
            let url = database_url(&args.database_url)?;
            Some(PostgresRepository::connect(&url).await?)
        }
        Source::File => None,
    };

    let mut outcomes = Vec::new();
    for kind in selected(&args.entities) {
        let out_dir = paths.root.join(kind.to_string());
        let reconciled = reconcile_one(
            &engine,
            kind,
            config,
            &args.input,
            repository.as_ref(),
            &out_dir,
        )
        .await;
        let outcome = match reconciled {
            Ok(report) if report.is_clean() => EntityOutcome {
                entity: kind,
                status: OutcomeStatus::Ok,
                detail: Some(format!("{} matched", report.summary.matched)),
                artifact: Some(out_dir),
            },
            Ok(report) => EntityOutcome {
                entity: kind,
                status: OutcomeStatus::Discrepancies,
                detail: Some(format!("{} diagnostic(s)", report.diagnostics.len())),
                artifact: Some(out_dir),
            },
            Err(err) => {
                error!(entity = %kind, error = %err, "reconciliation failed");
                EntityOutcome {
                    entity: kind,
                    status: OutcomeStatus::Failed,
                    detail: Some(err.to_string()),
                    artifact: None,
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

async fn reconcile_one(
    engine: &ReconciliationEngine,
    kind: EntityKind,
    config: &CadocConfig,
    input: &Path,
    repository: Option<&PostgresRepository>,
    out_dir: &Path,
) -> Result<ReconciliationReport, CliError> {
    let source = match repository {
        Some(repository) => ExternalSource::Rows {
            label: kind.table_name().to_string(),
            rows: repository.find_all(kind, &FindOptions::default()).await?,
        },
        None => ExternalSource::Directory(input.to_path_buf()),
    };
    let report = reconcile_kind(engine, kind, config, &source)?;
    let result = engine.finish(report, out_dir)?;
    Ok(result.report)
}

async fn run_sql(
    args: SqlArgs,
    config: &CadocConfig,
    paths: &RunPaths,
) -> Result<Vec<EntityOutcome>, CliError> {
    let out_dir = args.out.unwrap_or_else(|| paths.root.join("sql"));
    std::fs::create_dir_all(&out_dir)?;
    let repository = if args.apply {
        Some(PostgresRepository::connect(&database_url(&args.database_url)?).await?)
    } else {
        None
    };

    let mut outcomes = Vec::new();
    for kind in selected(&args.entities) {
        let repository = repository.as_ref();
        let result = match kind {
            EntityKind::Ranking => emit_sql::<Ranking>(config, &out_dir, repository).await,
            EntityKind::ConcCred => emit_sql::<ConcCred>(config, &out_dir, repository).await,
            EntityKind::Discount => emit_sql::<Discount>(config, &out_dir, repository).await,
            EntityKind::InfraEstablishment => {
                emit_sql::<InfraEstablishment>(config, &out_dir, repository).await
            }
            EntityKind::InfraTerminal => {
                emit_sql::<InfraTerminal>(config, &out_dir, repository).await
            }
            EntityKind::Intercambio => {
                emit_sql::<Intercambio>(config, &out_dir, repository).await
            }
            EntityKind::Segment => emit_sql::<Segment>(config, &out_dir, repository).await,
            EntityKind::ProfitCredit => {
                emit_sql::<ProfitCredit>(config, &out_dir, repository).await
            }
        };
        outcomes.push(match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(entity = %kind, error = %err, "insert script failed");
                EntityOutcome {
                    entity: kind,
                    status: OutcomeStatus::Failed,
                    detail: Some(err.to_string()),
                    artifact: None,
                }
            }
        });
    }
    Ok(outcomes)
}

async fn emit_sql<R: Generate>(
    config: &CadocConfig,
    out_dir: &Path,
    repository: Option<&PostgresRepository>,
) -> Result<EntityOutcome, CliError> {
    let records = R::generate_checked(config)?;
    let script = write_insert_script(out_dir, &records)?;
    let mut detail = format!("{} statements", script.rows);
    if let Some(repository) = repository {
        let stored = store_records(repository, &records).await?;
        detail.push_str(&format!(", {stored} rows stored"));
    }
    info!(
        entity = %R::KIND,
        statements = script.rows,
        path = %script.path.display(),
        "insert script written"
    );
    Ok(EntityOutcome {
        entity: R::KIND,
        status: OutcomeStatus::Ok,
        detail: Some(detail),
        artifact: Some(script.path),
    })
}

fn run_fake_bins(args: &FakeBinsArgs) -> Result<(), CliError> {
    let script = std::fs::read_to_string(&args.input)?;
    let rewritten = rewrite_bin_script(&script);
    let changed = script
        .lines()
        .zip(rewritten.lines())
        .filter(|(before, after)| before != after)
        .count();
    if changed == 0 {
        warn!(input = %args.input.display(), "no insert with a (bin, bandeira) column list");
    }
    match &args.out {
        Some(out) => std::fs::write(out, rewritten.as_bytes())?,
        None => print!("{rewritten}"),
    }
    info!(input = %args.input.display(), lines_rewritten = changed, "bin script rewritten");
    Ok(())
}
