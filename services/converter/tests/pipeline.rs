use std::fs;
use std::path::{Path, PathBuf};

use converter::emit::emit_to_writer;
use converter::source::InMemorySource;
use converter::{
    convert, run, ArtifactOptions, ConvertError, ConverterConfig, PublishOutcome, RawRecord,
    SourcePlan, SourceRef, SourceStatus,
};

const HEADER: &str = "poi_id,name,locality,latitude,longitude,category_level1,Police_Force,rating,rating_count";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn config_in(dir: &Path) -> ConverterConfig {
    let mut config = ConverterConfig::new(dir.join("out").join("retailers.js"));
    config.progress_every = 0;
    config
}

fn data_section(text: &str) -> serde_json::Value {
    let marker = "const RETAILERS_DATA = ";
    let start = text.find(marker).unwrap() + marker.len();
    let end = text.find(";\n\n// Metadata").unwrap();
    serde_json::from_str(&text[start..end]).unwrap()
}

#[test]
fn test_merge_two_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_csv(
        dir.path(),
        "a.csv",
        &[
            "a0,Boots,Leeds,53.79,-1.54,Retail,West Yorkshire,4.5,10",
            "a1,Tesco,Leeds,,,Retail,West Yorkshire,,",
            "a2,Greggs,York,53.96,-1.08,Food,North Yorkshire,4.0,3",
        ],
    );
    let b = write_csv(
        dir.path(),
        "b.csv",
        &[
            "b0,Argos,Hull,53.74,-0.33,Retail,Humberside,3.9,120",
            "b1,Lidl,Hull,53.75,-0.34,Grocery,Humberside,4.1,85",
        ],
    );

    let config = config_in(dir.path());
    let plan = SourcePlan::from_refs(&[SourceRef::new(&a), SourceRef::new(&b)]);
    let report = run(&config, plan, None).unwrap();

    assert_eq!(report.metadata.total, 5);
    assert_eq!(report.metadata.unique_police_forces, 3);
    assert_eq!(report.metadata.unique_localities, 3);
    assert_eq!(report.metadata.unique_categories, 3);
    assert_eq!(report.publish, PublishOutcome::Skipped);

    let text = fs::read_to_string(&config.output_path).unwrap();
    let data = data_section(&text);
    let ids: Vec<&str> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a0", "a1", "a2", "b0", "b1"]);

    let tesco = &data[1];
    assert!(tesco["latitude"].is_null());
    assert!(tesco["rating"].is_null());
    assert!(tesco["rating_count"].is_null());
    assert_eq!(data[0]["rating_count"], 10);
    assert_eq!(data[3]["latitude"], 53.74);

    assert!(text.contains("// Source: a.csv\n// Source: b.csv\n"));
    assert!(text.contains("const RETAILER_COUNT = 5;\n"));
    assert!(text.contains("const UNIQUE_POLICE_FORCES = 3;\n"));
}

#[test]
fn test_unreadable_source_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_csv(
        dir.path(),
        "a.csv",
        &["a0,Boots,Leeds,,,Retail,West Yorkshire,,", "a1,Tesco,Leeds,,,Retail,West Yorkshire,,"],
    );
    let missing = dir.path().join("missing.csv");
    let broken = dir.path().join("broken.xlsx");
    fs::write(&broken, b"this is not a zip archive").unwrap();

    let config = config_in(dir.path());
    let plan = SourcePlan::from_refs(&[
        SourceRef::new(&a),
        SourceRef::new(&missing),
        SourceRef::new(&broken),
    ]);
    let report = run(&config, plan, None).unwrap();

    assert_eq!(report.metadata.total, 2);
    assert_eq!(report.sources.len(), 3);
    assert_eq!(report.sources[0].status, SourceStatus::Complete);
    assert!(matches!(report.sources[1].status, SourceStatus::Unavailable(_)));
    assert_eq!(report.sources[1].name, "missing.csv");
    assert!(matches!(report.sources[2].status, SourceStatus::Unavailable(_)));
    assert_eq!(report.sources[2].name, "broken.xlsx");

    let text = fs::read_to_string(&config.output_path).unwrap();
    assert!(text.contains("// Source: a.csv\n"));
    assert!(!text.contains("missing.csv"));
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_csv(
        dir.path(),
        "a.csv",
        &[
            "a0,Boots,Leeds,53.79,-1.54,Retail,West Yorkshire,4.5,10",
            ",Tesco,,,,,,,",
            "a2,,York,not-a-number,-1.08,Food,North Yorkshire,4.0,3",
        ],
    );
    let config = config_in(dir.path());
    let refs = [SourceRef::new(&a)];

    let first = run(&config, SourcePlan::from_refs(&refs), None).unwrap();
    let first_bytes = fs::read(&config.output_path).unwrap();
    let second = run(&config, SourcePlan::from_refs(&refs), None).unwrap();
    let second_bytes = fs::read(&config.output_path).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.emitted, second.emitted);
    assert_eq!(first.metadata, second.metadata);
    assert_eq!(first.coercion_issues, 1);
}

#[test]
fn test_fallbacks_in_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_csv(dir.path(), "a.csv", &[",,,,,,,,", ",,,,,,,,"]);
    let config = config_in(dir.path());
    run(&config, SourcePlan::from_refs(&[SourceRef::new(&a)]), None).unwrap();

    let text = fs::read_to_string(&config.output_path).unwrap();
    let data = data_section(&text);
    assert_eq!(data[0]["id"], "0");
    assert_eq!(data[1]["id"], "1");
    assert_eq!(data[1]["name"], "Unknown");
    assert_eq!(data[1]["police_force"], "");
    assert_eq!(data[1]["website"], "");
    assert!(text.contains("const UNIQUE_POLICE_FORCES = 0;\n"));
}

#[test]
fn test_empty_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let empty = write_csv(dir.path(), "empty.csv", &[]);
    let config = config_in(dir.path());

    let plan = SourcePlan::from_refs(&[SourceRef::new(&empty), SourceRef::new(dir.path().join("gone.csv"))]);
    let err = run(&config, plan, None).unwrap_err();
    assert!(matches!(err, ConvertError::EmptyInput { sources: 2 }));
    assert!(!config.output_path.exists());
}

#[test]
fn test_in_memory_destination() {
    let mut plan = SourcePlan::new();
    plan.push(InMemorySource::new(
        "memory",
        vec![RawRecord::from_pairs([("ID", "x1"), ("Name", "Co-op"), ("Force", "Kent")])],
    ));
    let (result, outcome) = convert(plan, 0).unwrap();
    assert_eq!(outcome.sources.len(), 1);

    let mut buf = Vec::new();
    emit_to_writer(&result, &ArtifactOptions::default(), &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let data = data_section(&text);
    assert_eq!(data[0]["id"], "x1");
    assert_eq!(data[0]["name"], "Co-op");
    assert_eq!(data[0]["police_force"], "Kent");
    assert!(text.contains("// Source: memory\n"));
}
