use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use cadoc_core::{CadocConfig, EntityKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub command: String,
    pub run_dir: PathBuf,
    /// Parsed command-line options of the subcommand.
    pub options: serde_json::Value,
    pub config_path: Option<PathBuf>,
    pub config: CadocConfig,
    /// Redacted database URL, when the command talks to one.
    pub database: Option<String>,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    run_id: &'a str,
    started_at: String,
    command: &'a str,
    options: &'a serde_json::Value,
    config_path: Option<&'a Path>,
    database: Option<&'a str>,
    config: &'a CadocConfig,
    git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
struct GitInfo {
    commit: Option<String>,
    dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
    pub summary_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok,
    Discrepancies,
    Failed,
}

/// What happened to one entity kind during the run.
#[derive(Debug, Clone, Serialize)]
pub struct EntityOutcome {
    pub entity: EntityKind,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

/// `summary.json`, written when a command finishes.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub command: String,
    pub finished_at: String,
    pub entities: Vec<EntityOutcome>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.entities
            .iter()
            .filter(|outcome| outcome.status == OutcomeStatus::Failed)
            .count()
    }
}

/// Create `<run_dir>/<timestamp>__run_<uuid>/` with `config.json` and an
/// empty `logs.ndjson`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let paths = RunPaths {
        config_path: root.join("config.json"),
        logs_path: root.join("logs.ndjson"),
        summary_path: root.join("summary.json"),
        root,
    };

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        command: &ctx.command,
        options: &ctx.options,
        config_path: ctx.config_path.as_deref(),
        database: ctx.database.as_deref(),
        config: &ctx.config,
        git: collect_git_info(),
    };
    write_json(&paths.config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

pub fn write_summary(paths: &RunPaths, summary: &RunSummary) -> RegistryResult<()> {
    write_json(&paths.summary_path, summary)
}

fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn run_directory_carries_timestamp_and_id() {
        let run_dir =
            std::env::temp_dir().join(format!("cadoc_runs_{}", uuid::Uuid::new_v4()));
        let ctx = RunContext {
            run_id: "abc".to_string(),
            started_at: Utc.with_ymd_and_hms(2025, 10, 15, 9, 30, 0).unwrap(),
            command: "generate".to_string(),
            run_dir: run_dir.clone(),
            options: serde_json::json!({ "strict": false }),
            config_path: None,
            config: CadocConfig::default(),
            database: None,
        };
        let paths = start_run(&ctx).unwrap();
        assert_eq!(paths.root, run_dir.join("2025-10-15T09-30-00Z__run_abc"));
        assert!(paths.logs_path.exists());

        let config: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.config_path).unwrap()).unwrap();
        assert_eq!(config["command"], "generate");
        assert_eq!(config["config"]["average_ticket"], CadocConfig::default().average_ticket);

        let summary = RunSummary {
            run_id: "abc".to_string(),
            command: "generate".to_string(),
            finished_at: ctx.started_at.to_rfc3339(),
            entities: vec![EntityOutcome {
                entity: EntityKind::Segment,
                status: OutcomeStatus::Failed,
                detail: Some("file is empty".to_string()),
                artifact: None,
            }],
        };
        write_summary(&paths, &summary).unwrap();
        assert_eq!(summary.failed(), 1);
        std::fs::remove_dir_all(&run_dir).ok();
    }
}
