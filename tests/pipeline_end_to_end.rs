//! 端到端: CSV -> 分组 JSON -> JSONL -> 预处理 -> 模型 -> PDF

use bigdecimal::BigDecimal;
use invoice_pipeline_rust::models::{InvoiceRecord, LineItem, ModelDescriptor, TrainingPair};
use invoice_pipeline_rust::{store, AppConfig, PipelineService, SummaryStyle};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const CUSTOMERS_CSV: &str = "\
Name,Address,Phone,Email,Invoice Number,Invoice Date,Total Amount,Payment Due,Comments,Product Name,Quantity,Unit Price,Product Total
Alice,Hauptstr. 1,0301234,alice@example.com,INV1,2024-01-05,30.00,2024-02-05,Danke,Widget,2,5.00,10.00
Bob Builder,Ringweg 7,0407654,bob@example.com,INV2,2024-01-06,7.50,2024-02-06,,Schraube,3,2.50,7.50
Alice,Hauptstr. 1,0301234,alice@example.com,INV1,2024-01-05,30.00,2024-02-05,Danke,Gadget,1,20.00,20.00
";

fn write_input(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let customers = dir.join("customers");
    fs::create_dir_all(&customers).unwrap();
    let path = customers.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn csv_input_produces_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::rooted_at(dir.path());
    let service = PipelineService::new(config.clone());
    let input = write_input(dir.path(), "customers.csv", CUSTOMERS_CSV);

    let report = service.run(&input).unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(report.grouped_json, dir.path().join("customers/customers.json"));

    let records = store::read_grouped_json(&report.grouped_json).unwrap();
    assert_eq!(records[0].invoice_number, "INV1");
    assert_eq!(records[0].products.len(), 2);
    assert_eq!(records[1].name, "Bob Builder");

    let pairs: Vec<TrainingPair> = store::read_jsonl(&config.training_jsonl()).unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(pairs[0].text.contains("Produkte: Widget, Gadget"));
    assert!(pairs[1].text.ends_with("Kommentare: Unbekannt"));

    let preprocessed: Vec<TrainingPair> =
        store::read_jsonl(&config.preprocessed_jsonl()).unwrap();
    assert_eq!(preprocessed, pairs);

    let model: ModelDescriptor = store::read_model(&config.model_path()).unwrap();
    assert_eq!(model.example, pairs[0]);

    let files: Vec<_> = report
        .render
        .documents
        .iter()
        .map(|d| d.file_name.clone())
        .collect();
    assert_eq!(files, vec!["Alice_invoice.pdf", "Bob_Builder_invoice.pdf"]);
    for doc in &report.render.documents {
        let bytes = fs::read(&doc.path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
    assert!(report.summary().contains("Documents: 2 written, 0 failed"));
}

#[test]
fn grouped_json_input_skips_aggregation() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::rooted_at(dir.path());
    let input = write_input(
        dir.path(),
        "grouped.json",
        r#"[{"name": "Carol", "invoice_number": "INV9", "products": []}]"#,
    );

    let report = PipelineService::new(config.clone())
        .with_style(SummaryStyle::Detailed)
        .run(&input)
        .unwrap();

    assert_eq!(report.records, 1);
    assert_eq!(report.grouped_json, input);
    assert!(config.paths.documents_dir.join("Carol_invoice.pdf").is_file());
}

#[test]
fn truncation_applies_to_persisted_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::rooted_at(dir.path());
    config.preprocess.max_length = 12;
    let input = write_input(dir.path(), "customers.csv", CUSTOMERS_CSV);

    PipelineService::new(config.clone()).run(&input).unwrap();

    let full: Vec<TrainingPair> = store::read_jsonl(&config.training_jsonl()).unwrap();
    let short: Vec<TrainingPair> = store::read_jsonl(&config.preprocessed_jsonl()).unwrap();
    assert_eq!(short[0].text, "Name: Alice,");
    assert_eq!(short[0].label, full[0].label);
}

#[test]
fn missing_column_fails_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::rooted_at(dir.path());
    let csv = CUSTOMERS_CSV.replace("Invoice Number,", "Rechnung,");
    let input = write_input(dir.path(), "broken.csv", &csv);

    let outcome = PipelineService::new(config.clone()).run_entry(&input);

    assert_eq!(outcome.exit_code, 1);
    assert!(outcome.stderr.contains("Invoice Number"));
    assert!(!dir.path().join("customers/broken.json").exists());
    assert!(!config.training_jsonl().exists());
    assert!(!config.model_path().exists());
}

fn arb_record() -> impl Strategy<Value = InvoiceRecord> {
    (
        "[A-Za-zÄÖÜäöüß ]{0,20}",
        "INV[0-9]{1,4}",
        prop::collection::vec(("[A-Za-z]{1,10}", 0u32..1000, 0i64..100_000, 0i64..10_000_000), 0..5),
        "[0-9]{1,5}\\.[0-9]{2}",
    )
        .prop_map(|(name, number, items, total)| InvoiceRecord {
            name,
            invoice_number: number,
            total_amount: total,
            products: items
                .into_iter()
                .map(|(product, qty, cents, total_cents)| LineItem {
                    product_name: product,
                    quantity: qty,
                    unit_price: BigDecimal::new(cents.into(), 2),
                    total: BigDecimal::new(total_cents.into(), 2),
                })
                .collect(),
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grouped_json_round_trip(records in prop::collection::vec(arb_record(), 0..6)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grouped.json");
        store::write_grouped_json(&path, &records).unwrap();
        let loaded = store::read_grouped_json(&path).unwrap();
        prop_assert_eq!(loaded, records);
    }
}

#[test]
fn decimal_values_survive_round_trip_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grouped.json");
    let mut record = InvoiceRecord::new("INV1");
    record.add_item(LineItem {
        product_name: "Widget".into(),
        quantity: 3,
        unit_price: BigDecimal::from_str("0.10").unwrap(),
        total: BigDecimal::from_str("0.30").unwrap(),
    });

    store::write_grouped_json(&path, &[record.clone()]).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"0.30\""));
    assert_eq!(store::read_grouped_json(&path).unwrap(), vec![record]);
}

#[test]
fn same_customer_name_on_two_invoices_gets_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::rooted_at(dir.path());
    let csv = CUSTOMERS_CSV.replace("Bob Builder,", "Alice,");
    let input = write_input(dir.path(), "customers.csv", &csv);

    let report = PipelineService::new(config.clone()).run(&input).unwrap();

    let files: Vec<_> = report
        .render
        .documents
        .iter()
        .map(|d| d.file_name.as_str())
        .collect();
    assert_eq!(files, vec!["Alice_invoice.pdf", "Alice_invoice_2.pdf"]);
    assert!(config.paths.documents_dir.join("Alice_invoice_2.pdf").is_file());
}

#[test]
fn empty_run_removes_model_from_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::rooted_at(dir.path());
    let service = PipelineService::new(config.clone());

    let first = write_input(dir.path(), "a.csv", CUSTOMERS_CSV);
    service.run(&first).unwrap();
    assert!(config.model_path().is_file());

    let header_only = CUSTOMERS_CSV.lines().next().unwrap().to_string() + "\n";
    let second = write_input(dir.path(), "b.csv", &header_only);
    let report = service.run(&second).unwrap();

    assert!(report.model.is_none());
    assert!(!config.model_path().exists());
    let preprocessed: Vec<TrainingPair> =
        store::read_jsonl(&config.preprocessed_jsonl()).unwrap();
    assert!(preprocessed.is_empty());
}
