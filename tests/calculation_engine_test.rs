// ==========================================
// 测算引擎集成测试
// ==========================================
// 测试目标: 运费 / 汇率换算 / 估值 / 产品成本占位
// ==========================================


use cocoa_trading_desk::domain::{ErrorKind, NormalizedTable, TypedValue};
use cocoa_trading_desk::engine::{
    CalcError, FreightEngine, FxEngine, ProductCostingEngine, ProductCostingParams,
    ValuationEngine,
};
use chrono::NaiveDate;
use test_helpers::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ==========================================
// 运费
// ==========================================

#[test]
fn test_freight_case_insensitive_match() {
    let table = freight_table(vec![vec![tv_text("Ghana"), tv_text("Amsterdam"), tv_dec(45.0)]]);

    let quote = FreightEngine::new()
        .calculate_freight_cost(&table, "ghana", "amsterdam", 100.0)
        .expect("rate should match");

    assert_eq!(quote.total_cost, 4500.0);
    assert_eq!(quote.rate_used, 45.0);
    assert_eq!(quote.message(), "Calculated using rate 45.00 per MT.");
}

#[test]
fn test_freight_empty_table() {
    let result = FreightEngine::new().calculate_freight_cost(
        &NormalizedTable::unavailable(),
        "Ghana",
        "Amsterdam",
        100.0,
    );

    let err = result.expect_err("empty table must fail");
    assert_eq!(err.to_string(), "Freight data not available.");
    assert_eq!(err.kind(), ErrorKind::SchemaMissing);
}

#[test]
fn test_freight_missing_columns() {
    let table = normalized_table(
        &[("Origin", cocoa_trading_desk::domain::ColumnType::Text)],
        vec![vec![tv_text("Ghana")]],
    );

    let err = FreightEngine::new()
        .calculate_freight_cost(&table, "Ghana", "Amsterdam", 1.0)
        .expect_err("missing columns must fail");
    assert_eq!(err.to_string(), "Required columns for freight calculation not found.");
}

#[test]
fn test_freight_substring_and_first_match() {
    let table = freight_table(vec![
        vec![tv_text("Ghana (Tema)"), tv_text("Amsterdam NL"), tv_dec(40.0)],
        vec![tv_text("Ghana"), tv_text("Amsterdam"), tv_dec(45.0)],
    ]);

    let quote = FreightEngine::new()
        .calculate_freight_cost(&table, "ghana", "amsterdam", 10.0)
        .expect("rate should match");

    // 两行都命中,取表内第一行
    assert_eq!(quote.rate_used, 40.0);
    assert_eq!(quote.total_cost, 400.0);
}

#[test]
fn test_freight_no_match() {
    let table = freight_table(vec![vec![tv_text("Ghana"), tv_text("Amsterdam"), tv_dec(45.0)]]);

    let err = FreightEngine::new()
        .calculate_freight_cost(&table, "Ivory Coast", "Amsterdam", 100.0)
        .expect_err("no rate");
    assert_eq!(
        err,
        CalcError::NoRateFound {
            origin: "Ivory Coast".to_string(),
            destination: "Amsterdam".to_string()
        }
    );
    assert_eq!(err.to_string(), "No freight rate found for Ivory Coast to Amsterdam.");
}

#[test]
fn test_freight_non_numeric_rate() {
    let table = freight_table(vec![vec![tv_text("Ghana"), tv_text("Amsterdam"), TypedValue::Missing]]);

    let err = FreightEngine::new()
        .calculate_freight_cost(&table, "Ghana", "Amsterdam", 100.0)
        .expect_err("rate is missing");
    assert_eq!(err, CalcError::NonNumericRate);
    assert_eq!(err.to_string(), "Freight rate found but is not numeric.");
}

#[test]
fn test_freight_linear_in_quantity() {
    let table = freight_table(vec![vec![tv_text("Tema"), tv_text("Hamburg"), tv_dec(52.5)]]);
    let engine = FreightEngine::new();

    let rate = engine
        .calculate_freight_cost(&table, "Tema", "Hamburg", 1.0)
        .expect("rate")
        .total_cost;

    for quantity in [0.0, 1.0, 12.5, 100.0, 2500.0] {
        let total = engine
            .calculate_freight_cost(&table, "Tema", "Hamburg", quantity)
            .expect("rate")
            .total_cost;
        assert!(approx(total, rate * quantity), "quantity {}", quantity);
    }
}

// ==========================================
// 汇率换算
// ==========================================

#[test]
fn test_conversion_uses_latest_rate() {
    let table = fx_table(&[
        ("EURUSD", datetime(2024, 1, 1), 1.10),
        ("EURUSD", datetime(2024, 2, 1), 1.12),
    ]);

    let result = FxEngine::new()
        .perform_currency_conversion(&table, "EURUSD", 100.0)
        .expect("conversion");

    assert!(approx(result.converted, 112.0));
    assert_eq!(result.rate, 1.12);
    assert_eq!(result.value_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert_eq!(result.message(), "Conversion successful.");
}

#[test]
fn test_conversion_unknown_pair() {
    let table = fx_table(&[("EURUSD", datetime(2024, 1, 1), 1.10)]);

    let err = FxEngine::new()
        .perform_currency_conversion(&table, "USDJPY", 100.0)
        .expect_err("pair absent");
    assert_eq!(err, CalcError::PairNotFound("USDJPY".to_string()));
    assert!(err
        .to_string()
        .starts_with("No data available for the selected FX pair"));
}

#[test]
fn test_conversion_pair_match_is_case_sensitive() {
    let table = fx_table(&[("EURUSD", datetime(2024, 1, 1), 1.10)]);

    let err = FxEngine::new()
        .perform_currency_conversion(&table, "eurusd", 1.0)
        .expect_err("case differs");
    assert_eq!(err.kind(), ErrorKind::NoMatchFound);
}

#[test]
fn test_conversion_rejects_text_amount() {
    let table = fx_table(&[("EURUSD", datetime(2024, 1, 1), 1.10)]);

    let err = FxEngine::new()
        .perform_currency_conversion(&table, "EURUSD", "abc")
        .expect_err("not a number");
    assert_eq!(err.to_string(), "Invalid value to convert.");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let ok = FxEngine::new()
        .perform_currency_conversion(&table, "EURUSD", " 250 ")
        .expect("numeric text");
    assert!(approx(ok.converted, 275.0));
}

#[test]
fn test_conversion_no_valid_quotes() {
    let table = normalized_table(
        &[
            ("FX", cocoa_trading_desk::domain::ColumnType::Text),
            ("VALUE DATE", cocoa_trading_desk::domain::ColumnType::Date),
            ("FX RATE", cocoa_trading_desk::domain::ColumnType::Decimal),
        ],
        vec![vec![tv_text("EURUSD"), TypedValue::Missing, tv_dec(1.1)]],
    );

    let err = FxEngine::new()
        .perform_currency_conversion(&table, "EURUSD", 1.0)
        .expect_err("no dated quote");
    assert_eq!(err, CalcError::NoValidQuotes("EURUSD".to_string()));
}

#[test]
fn test_conversion_invariant_under_row_order() {
    let rows = [
        ("EURUSD", datetime(2024, 1, 1), 1.10),
        ("GBPUSD", datetime(2024, 5, 1), 1.27),
        ("EURUSD", datetime(2024, 3, 1), 1.13),
        ("EURUSD", datetime(2024, 2, 1), 1.12),
    ];
    let engine = FxEngine::new();
    let expected = engine
        .perform_currency_conversion(&fx_table(&rows), "EURUSD", 10.0)
        .expect("conversion");

    let mut permuted = rows.to_vec();
    for _ in 0..rows.len() {
        permuted.rotate_left(1);
        let result = engine
            .perform_currency_conversion(&fx_table(&permuted), "EURUSD", 10.0)
            .expect("conversion");
        assert_eq!(result, expected);
    }
    assert_eq!(expected.rate, 1.13);
}

#[test]
fn test_fx_history_sorted() {
    let table = fx_table(&[
        ("EURUSD", datetime(2024, 3, 1), 1.13),
        ("EURUSD", datetime(2024, 1, 1), 1.10),
        ("GBPUSD", datetime(2024, 2, 1), 1.25),
    ]);
    let engine = FxEngine::new();

    let history = engine.fx_history(&table, "EURUSD");
    let rates: Vec<f64> = history.iter().map(|q| q.rate).collect();
    assert_eq!(rates, vec![1.10, 1.13]);

    assert_eq!(engine.fx_pairs(&table), vec!["EURUSD".to_string(), "GBPUSD".to_string()]);
}

// ==========================================
// 估值
// ==========================================

#[test]
fn test_valuation_nearest_row() {
    let table = valuation_table(&[(50.0, 80.0)]);

    let result = ValuationEngine::new()
        .calculate_valuation(&table, 52.0, 10.0)
        .expect("valuation");

    assert_eq!(result.break_even, 62.0);
    assert_eq!(result.margin, 18.0);
    assert_eq!(result.selling_diff_used, 80.0);
    assert_eq!(result.message(), "Calculated using Selling Diff (80.00) from sheet.");
}

#[test]
fn test_valuation_picks_closest_buying_diff() {
    let table = valuation_table(&[(100.0, 150.0), (200.0, 260.0), (300.0, 330.0)]);
    let engine = ValuationEngine::new();

    let result = engine.calculate_valuation(&table, 240.0, 5.0).expect("valuation");
    assert_eq!(result.matched_buying_diff, 200.0);
    assert_eq!(result.margin, 260.0 - 245.0);

    // 等距时取表内靠前的行
    let tie = engine.calculate_valuation(&table, 150.0, 0.0).expect("valuation");
    assert_eq!(tie.matched_buying_diff, 100.0);
}

#[test]
fn test_valuation_break_even_ignores_table() {
    let table = valuation_table(&[(10.0, 20.0), (90.0, 95.0)]);
    let engine = ValuationEngine::new();

    for (buying, costing) in [(0.0, 0.0), (12.5, 7.5), (-30.0, 4.0), (88.0, 1000.0)] {
        let result = engine.calculate_valuation(&table, buying, costing).expect("valuation");
        assert!(approx(result.break_even, buying + costing));
        assert!(approx(result.margin, result.selling_diff_used - result.break_even));
    }
}

#[test]
fn test_valuation_errors() {
    let engine = ValuationEngine::new();

    let err = engine
        .calculate_valuation(&NormalizedTable::unavailable(), 1.0, 1.0)
        .expect_err("no data");
    assert_eq!(err.to_string(), "Valuation data not available.");

    let missing = normalized_table(
        &[("Buying Diff", cocoa_trading_desk::domain::ColumnType::Decimal)],
        vec![vec![tv_dec(1.0)]],
    );
    let err = engine.calculate_valuation(&missing, 1.0, 1.0).expect_err("schema");
    assert_eq!(
        err.to_string(),
        "Required columns for valuation calculation not found ('Buying Diff', 'Selling Diff')."
    );

    let no_selling = normalized_table(
        &[
            ("Buying Diff", cocoa_trading_desk::domain::ColumnType::Decimal),
            ("Selling Diff", cocoa_trading_desk::domain::ColumnType::Decimal),
        ],
        vec![vec![tv_dec(1.0), TypedValue::Missing]],
    );
    let err = engine.calculate_valuation(&no_selling, 1.0, 1.0).expect_err("selling");
    assert_eq!(err, CalcError::NonNumericSellingDiff);
}

#[test]
fn test_valuation_rejects_non_finite_inputs() {
    let table = valuation_table(&[(100.0, 150.0), (200.0, 260.0)]);
    let engine = ValuationEngine::new();

    for (buying, costing) in [
        (f64::NAN, 5.0),
        (200.0, f64::NAN),
        (f64::INFINITY, 0.0),
        (200.0, f64::NEG_INFINITY),
    ] {
        let err = engine
            .calculate_valuation(&table, buying, costing)
            .expect_err("non-finite input");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(matches!(err, CalcError::NonFiniteInput { .. }));
    }

    // 无数据时同样先拒绝非法输入
    let err = engine
        .calculate_valuation(&NormalizedTable::unavailable(), f64::NAN, 0.0)
        .expect_err("non-finite input");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

// ==========================================
// 产品成本（占位）
// ==========================================

#[test]
fn test_costing_products_placeholder() {
    let table = normalized_table(
        &[("Product", cocoa_trading_desk::domain::ColumnType::Text)],
        vec![vec![tv_text("Cocoa Butter")]],
    );
    let mut params = ProductCostingParams::new();
    params.insert("ratio".to_string(), "0.42".to_string());

    let report = ProductCostingEngine::new().calculate_costing_products(&table, &params, 5);

    assert!(report.cost.is_none());
    assert!(report.is_not_implemented());
    assert_eq!(
        report.message,
        "Costing Products calculation logic needs to be implemented based on the sheet's formulas."
    );
    assert_eq!(report.preview.height(), 1);
}

#[test]
fn test_costing_products_without_data() {
    let report = ProductCostingEngine::new().calculate_costing_products(
        &NormalizedTable::unavailable(),
        &ProductCostingParams::new(),
        5,
    );

    assert!(report.cost.is_none());
    assert_eq!(report.kind, ErrorKind::NotImplemented);
    assert!(report.is_not_implemented());
    assert_eq!(report.message, "Costing Products data not available.");
}
