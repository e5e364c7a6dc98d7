use std::path::PathBuf;

use cadoc_core::{
    CadocConfig, ConcCred, EntityKind, InfraEstablishment, ProfitCredit, Record, Segment,
    read_flat_file,
};
use cadoc_generate::{Generate, GenerateOptions, GenerationEngine, GenerationError};
use chrono::NaiveDate;

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cadoc_{label}_{}", uuid::Uuid::new_v4()))
}

fn options(out_dir: PathBuf, kinds: Vec<EntityKind>) -> GenerateOptions {
    GenerateOptions {
        out_dir,
        strict: false,
        kinds,
        date: NaiveDate::from_ymd_opt(2025, 10, 15),
        sql: true,
    }
}

#[test]
fn written_files_parse_back_into_generated_records() {
    let out_dir = temp_dir("generate");
    let config = CadocConfig::default();
    let engine = GenerationEngine::new(options(
        out_dir.clone(),
        vec![
            EntityKind::ConcCred,
            EntityKind::InfraEstablishment,
            EntityKind::Segment,
            EntityKind::ProfitCredit,
        ],
    ));

    let result = engine.run(&config).expect("generation succeeds");
    assert!(result.report.is_success());
    assert_eq!(result.report.entities.len(), 4);
    assert!(result.report_path.exists());
    assert!(out_dir.join("cadoc_6334_conccred.sql").exists());

    let parsed = read_flat_file::<ConcCred>(&out_dir.join("CONCCRED.TXT")).unwrap();
    let mut generated = ConcCred::generate(&config).unwrap();
    generated.sort_by_key(|record| record.key());
    assert_eq!(parsed.records, generated);
    assert_eq!(parsed.header.date, NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());

    let establishments =
        read_flat_file::<InfraEstablishment>(&out_dir.join("INFRESTA.TXT")).unwrap();
    assert_eq!(
        establishments.records.iter().map(|r| r.total).sum::<i64>(),
        config.infresta.total_establishments
    );

    let segments = read_flat_file::<Segment>(&out_dir.join("SEGMENTO.TXT")).unwrap();
    assert_eq!(segments.records.len(), 24);
    assert!(segments.records.iter().any(|s| s.name == "Educação"));

    let profit = read_flat_file::<ProfitCredit>(&out_dir.join("LUCRCRED.TXT")).unwrap();
    assert_eq!(profit.records[0].key(), "20253");

    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&result.report_path).unwrap()).unwrap();
    assert_eq!(report["entities"][0]["file"], "CONCCRED.TXT");
    assert_eq!(report["entities"][0]["sha256"].as_str().map(str::len), Some(64));

    std::fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn shipped_tables_that_do_not_partition_are_warned_about() {
    let out_dir = temp_dir("warn");
    let engine = GenerationEngine::new(options(out_dir.clone(), vec![EntityKind::Segment]));
    let result = engine.run(&CadocConfig::default()).unwrap();

    let flagged: Vec<&str> = result
        .report
        .warnings
        .iter()
        .map(|issue| issue.message.as_str())
        .collect();
    assert_eq!(result.report.warnings_by_code["non_partitioning_table"], 2);
    assert!(flagged.iter().any(|m| m.contains("dimensions.uf")));
    assert!(flagged.iter().any(|m| m.contains("dimensions.product")));
    std::fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn strict_mode_rejects_non_partitioning_tables() {
    let out_dir = temp_dir("strict");
    let mut opts = options(out_dir.clone(), vec![EntityKind::Segment]);
    opts.strict = true;
    let err = GenerationEngine::new(opts)
        .run(&CadocConfig::default())
        .unwrap_err();
    assert!(matches!(err, GenerationError::NonPartitioning(ref name) if name == "dimensions.uf"));
    std::fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn failing_kind_does_not_stop_the_run() {
    let out_dir = temp_dir("failure");
    let mut config = CadocConfig::default();
    config.profit.revenue_total = 0.0;
    let engine = GenerationEngine::new(options(
        out_dir.clone(),
        vec![EntityKind::ProfitCredit, EntityKind::Segment],
    ));
    let result = engine.run(&config).unwrap();
    assert_eq!(result.report.failures.len(), 1);
    assert_eq!(result.report.failures[0].kind, Some(EntityKind::ProfitCredit));
    assert_eq!(result.report.entities.len(), 1);
    assert!(out_dir.join("SEGMENTO.TXT").exists());
    std::fs::remove_dir_all(&out_dir).ok();
}
