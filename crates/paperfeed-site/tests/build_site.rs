use std::path::Path;
use std::sync::Arc;

use paperfeed_common::FeedError;
use paperfeed_core::{PagePayload, RecordAssembler};
use paperfeed_db::{Database, PaperRepository};
use paperfeed_site::{generate_dashboard, process_file, BuildOptions, SiteBuilder};
use paperfeed_test_utils::{
    create_papers_db, create_untyped_papers_db, extract_payload, rows_for_date, sample_row,
    PAGE_TEMPLATE,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn builder_for(db_path: &Path, template: &str, out: &Path) -> SiteBuilder {
    let db = Database::open(db_path).unwrap();
    SiteBuilder::new(
        PaperRepository::new(Arc::new(db)),
        RecordAssembler::default(),
        template,
        out,
    )
}

#[test]
fn test_build_all_dates() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = rows_for_date("2025-07-15", 1, 3);
    rows.extend(rows_for_date("2025-07-16", 10, 2));
    let db = create_papers_db(dir.path(), &rows).unwrap();
    let out = dir.path().join("output");

    let report = builder_for(&db, PAGE_TEMPLATE, &out)
        .build(&BuildOptions::default())
        .unwrap();

    assert_eq!(
        report.pages,
        vec![out.join("2025-07-16.html"), out.join("2025-07-15.html")]
    );
    assert!(report.skipped.is_empty());

    let html = std::fs::read_to_string(out.join("2025-07-15.html")).unwrap();
    assert!(html.contains("<title>15 July 2025</title>"));
    assert!(html.contains("Papers Published on 15 July 2025"));
    assert!(!html.contains("<!--DATA_HERE-->"));

    let payload: PagePayload = serde_json::from_value(extract_payload(&html).unwrap()).unwrap();
    assert_eq!(payload.date, "2025-07-15");
    assert_eq!(payload.total_papers, 3);
    assert_eq!(payload.papers.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_build_single_date_with_cap() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_papers_db(dir.path(), &rows_for_date("2025-07-15", 1, 5)).unwrap();
    let out = dir.path().join("output");

    let options = BuildOptions {
        date: Some("2025-07-15".to_string()),
        max_papers: Some(2),
    };
    builder_for(&db, PAGE_TEMPLATE, &out).build(&options).unwrap();

    let html = std::fs::read_to_string(out.join("2025-07-15.html")).unwrap();
    let payload = extract_payload(&html).unwrap();
    assert_eq!(payload["total_papers"], 2);
    assert_eq!(payload["papers"].as_array().unwrap().len(), 2);
}

#[test]
fn test_empty_date_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_papers_db(dir.path(), &rows_for_date("2025-07-15", 1, 1)).unwrap();
    let out = dir.path().join("output");

    let options = BuildOptions {
        date: Some("2024-01-01".to_string()),
        max_papers: None,
    };
    let report = builder_for(&db, PAGE_TEMPLATE, &out).build(&options).unwrap();

    assert!(report.pages.is_empty());
    assert_eq!(report.skipped, vec!["2024-01-01".to_string()]);
    assert!(!out.join("2024-01-01.html").exists());
}

#[test]
fn test_invalid_options_rejected_before_work() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_papers_db(dir.path(), &[]).unwrap();
    let out = dir.path().join("output");
    let builder = builder_for(&db, PAGE_TEMPLATE, &out);

    let bad_date = BuildOptions { date: Some("2025/07/15".to_string()), max_papers: None };
    assert!(matches!(builder.build(&bad_date), Err(FeedError::InvalidDate(_))));

    let zero = BuildOptions { date: None, max_papers: Some(0) };
    assert!(builder.build(&zero).is_err());
    assert!(!out.exists());
}

#[test]
fn test_missing_placeholder_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_papers_db(dir.path(), &rows_for_date("2025-07-15", 1, 2)).unwrap();
    let out = dir.path().join("output");

    let err = builder_for(&db, "<html>no data slot</html>", &out)
        .build(&BuildOptions::default())
        .unwrap_err();

    assert!(matches!(err, FeedError::MissingPlaceholder(_)));
    assert!(!out.join("2025-07-15.html").exists());
}

#[test]
fn test_bad_record_aborts_build() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        sample_row(1, "2025-07-15"),
        sample_row(2, "2025-07-15").with("title", 3.5),
    ];
    let db = create_untyped_papers_db(dir.path(), &rows).unwrap();
    let out = dir.path().join("output");

    let err = builder_for(&db, PAGE_TEMPLATE, &out)
        .build(&BuildOptions::default())
        .unwrap_err();

    assert!(matches!(err, FeedError::RecordAssembly { .. }));
    assert!(!out.join("2025-07-15.html").exists());
}

fn export_fixture(dir: &Path) -> std::path::PathBuf {
    let input = dir.join("papers.json");
    let doc = json!({
        "date": "2025-07-22",
        "total_papers": 3,
        "papers": [
            {
                "id": 1,
                "title": "Attention </script> is $\\alpha$",
                "introduction_text": "Intro <em>",
                "authors": ["Ada", "O'Hara"],
                "novelty_score": 8
            },
            {"id": 2},
            {"id": 3, "abstract": "$$E=mc^2$$ & friends"}
        ]
    });
    std::fs::write(&input, serde_json::to_string(&doc).unwrap()).unwrap();
    input
}

#[test]
fn test_process_file_writes_pretty_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = export_fixture(dir.path());
    let output = dir.path().join("processed.json");

    let doc = process_file(&input, &output, &RecordAssembler::default(), true).unwrap();
    assert_eq!(doc.total_papers, 2);

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("\n  \"date\""));
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["original_total"], 3);
    assert_eq!(value["papers"][0]["title"], "Attention &lt;/script&gt; is \\(\\alpha\\)");
    assert_eq!(value["papers"][0]["introduction_text"], "Intro &lt;em&gt;");
    assert_eq!(value["papers"][0]["authors"], json!(["Ada", "O&#x27;Hara"]));
    assert_eq!(value["papers"][1]["abstract"], "\\[E=mc^2\\] &amp; friends");
    assert!(value["processed_at"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_dashboard_embeds_processed_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = export_fixture(dir.path());
    let template = dir.path().join("page.html");
    std::fs::write(&template, PAGE_TEMPLATE).unwrap();
    let output = dir.path().join("papers_dashboard.html");

    generate_dashboard(&input, &template, &output, &RecordAssembler::default()).unwrap();

    let html = std::fs::read_to_string(&output).unwrap();
    let payload = extract_payload(&html).unwrap();
    assert_eq!(payload["total_papers"], 3);
    assert_eq!(payload["papers"][1], json!({"id": 2}));
    assert_eq!(payload["papers"][0]["novelty_score"], 8);
}

#[test]
fn test_dashboard_requires_template() {
    let dir = tempfile::tempdir().unwrap();
    let input = export_fixture(dir.path());
    let err = generate_dashboard(
        &input,
        &dir.path().join("missing.html"),
        &dir.path().join("out.html"),
        &RecordAssembler::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Template file not found"));
}
