// ==========================================
// SheetLoader 集成测试
// ==========================================
// 测试目标: 文件缺失 / 文件损坏 / 单表失败后继续加载
// ==========================================


use cocoa_trading_desk::domain::{ErrorKind, StatusLevel};
use cocoa_trading_desk::importer::{ImportError, SheetLoader};
use std::io::Write;
use std::path::Path;
use tempfile::Builder;
use test_helpers::*;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_missing_file_reports_every_sheet() {
    let loader = SheetLoader::new();
    let report = loader.load(
        Path::new("/definitely/not/here/Cocoa Trading Sheet.xlsx"),
        &names(&["Costing Beans", "Freight & Dressing"]),
    );

    assert!(report.file_missing());
    assert_eq!(report.loaded_count(), 0);
    assert_eq!(report.sheets.len(), 2);

    let first = report.get("Costing Beans").expect("first sheet");
    assert_eq!(first.error.as_ref().map(ImportError::kind), Some(ErrorKind::FileNotFound));
    assert!(first.status().message.starts_with("Error: File not found at"));

    let second = report.get("Freight & Dressing").expect("second sheet");
    assert_eq!(
        second.error,
        Some(ImportError::LoadAborted("Freight & Dressing".to_string()))
    );
    assert!(second.table.is_empty());
}

#[test]
fn test_corrupt_workbook_fails_each_sheet() {
    let mut file = Builder::new()
        .suffix(".xlsx")
        .tempfile()
        .expect("temp file");
    file.write_all(b"this is not a zip archive").expect("write");

    let report = SheetLoader::new().load(file.path(), &names(&["Costing Beans", "Valo Ori & Dest"]));

    assert!(!report.file_missing());
    assert_eq!(report.loaded_count(), 0);
    for load in &report.sheets {
        assert!(matches!(load.error, Some(ImportError::WorkbookOpenError(_))));
        assert_eq!(load.status().level, StatusLevel::Error);
        assert!(load
            .status()
            .message
            .starts_with(&format!("Error loading sheet '{}':", load.sheet)));
    }
}

#[test]
fn test_unsupported_extension() {
    let file = Builder::new().suffix(".csv").tempfile().expect("temp file");

    let report = SheetLoader::new().load(file.path(), &names(&["Costing Beans"]));
    assert_eq!(
        report.sheets[0].error,
        Some(ImportError::UnsupportedFormat("csv".to_string()))
    );
}

#[test]
fn test_sheet_failure_does_not_stop_later_sheets() {
    let reader = standard_workbook()
        .with_sheet_error(
            "Freight & Dressing",
            ImportError::SheetReadError("merged cells".to_string()),
        )
        .without_sheet("Market & FX Live");
    let loader = SheetLoader::with_reader(reader);

    let report = loader.load(
        Path::new("memory.xlsx"),
        &names(&[
            "Costing Beans",
            "Freight & Dressing",
            "Valo Ori & Dest",
            "Market & FX Live",
        ]),
    );

    assert_eq!(report.loaded_count(), 2);
    assert!(report.get("Costing Beans").map(|s| s.is_loaded()).unwrap_or(false));
    assert!(report.get("Valo Ori & Dest").map(|s| s.is_loaded()).unwrap_or(false));
    assert_eq!(
        report.get("Market & FX Live").and_then(|s| s.error.clone()),
        Some(ImportError::SheetNotFound("Market & FX Live".to_string()))
    );

    let statuses = report.statuses();
    assert_eq!(statuses[0].message, "Successfully loaded sheet: 'Costing Beans'");
    assert_eq!(statuses[0].level, StatusLevel::Success);
    assert_eq!(
        statuses[1].message,
        "Error loading sheet 'Freight & Dressing': Failed to read worksheet: merged cells"
    );
}

#[test]
fn test_duplicate_sheet_names_loaded_once() {
    let loader = SheetLoader::with_reader(standard_workbook());
    let report = loader.load(
        Path::new("memory.xlsx"),
        &names(&["Costing Beans", "Costing Beans", "Market & FX Fix"]),
    );

    assert_eq!(report.sheets.len(), 2);
    assert_eq!(report.table("Costing Beans").map(|t| t.height()), Some(4));
}

#[test]
fn test_open_failure_from_reader() {
    let reader = standard_workbook().failing_open(ImportError::FileNotFound("memory.xlsx".to_string()));
    let counter = reader.open_counter();
    let loader = SheetLoader::with_reader(reader);

    let report = loader.load(Path::new("memory.xlsx"), &names(&["Costing Beans", "Costing Products"]));

    assert!(report.file_missing());
    assert_eq!(counter.get(), 1);
    assert_eq!(
        report.statuses()[0].message,
        "Error: File not found at memory.xlsx"
    );
}
