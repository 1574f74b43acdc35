use svcj_factor_engine::{
    rolling_fit, FactorMatrix, FitError, ReturnsMatrix, ReturnsPanel, RollingFitConfig,
    RollingFitEngine,
};

fn ramp(rows: usize, cols: usize) -> Vec<f64> {
    (0..rows)
        .flat_map(|t| (0..cols).map(move |a| ((t * 7 + a * 3) % 11) as f64 * 0.004 - 0.02))
        .collect()
}

#[test]
fn rows_are_stamped_with_window_end() {
    let data = ramp(10, 2);
    let m = ReturnsMatrix::new(&data, 10, 2).unwrap();
    let fit = rolling_fit(&m, 5, 2).unwrap();
    let index: Vec<u32> = (100..110).collect();
    let fm = FactorMatrix::from_fit(&fit, &["AAPL", "MSFT"], &index).unwrap();
    assert_eq!(fm.index, vec![104, 106, 108]);
    assert_eq!(fm.shape(), (3, 16));
    assert_eq!(fm.asset_count(), 2);
}

#[test]
fn row_values_follow_tensor_layout() {
    let data = ramp(12, 3);
    let m = ReturnsMatrix::new(&data, 12, 3).unwrap();
    let fit = rolling_fit(&m, 4, 4).unwrap();
    let index: Vec<usize> = (0..12).collect();
    let fm = FactorMatrix::from_fit(&fit, &["A", "B", "C"], &index).unwrap();
    for roll in 0..fit.rolls() {
        assert_eq!(fm.rows[roll].as_slice(), fit.tensor.roll_row(roll));
    }
    let b_kappa = fm.column("B_kappa").unwrap();
    let expected: Vec<f64> = (0..fit.rolls())
        .map(|r| fit.tensor.params(r, 1).kappa())
        .collect();
    assert_eq!(b_kappa, expected);
    assert!(fm.column("D_kappa").is_none());
}

#[test]
fn label_count_must_match_assets() {
    let data = ramp(10, 2);
    let m = ReturnsMatrix::new(&data, 10, 2).unwrap();
    let fit = rolling_fit(&m, 5, 1).unwrap();
    let index: Vec<usize> = (0..10).collect();
    let err = FactorMatrix::from_fit(&fit, &["only"], &index).unwrap_err();
    assert_eq!(
        err,
        FitError::AssetLabelMismatch {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn index_must_cover_the_series() {
    let data = ramp(10, 1);
    let m = ReturnsMatrix::new(&data, 10, 1).unwrap();
    let fit = rolling_fit(&m, 5, 1).unwrap();
    let index: Vec<usize> = (0..9).collect();
    let err = FactorMatrix::from_fit(&fit, &["A"], &index).unwrap_err();
    assert_eq!(
        err,
        FitError::IndexTooShort {
            required: 10,
            actual: 9
        }
    );
}

#[test]
fn empty_fit_yields_labelled_empty_matrix() {
    let data = ramp(3, 2);
    let m = ReturnsMatrix::new(&data, 3, 2).unwrap();
    let fit = rolling_fit(&m, 5, 1).unwrap();
    let index = ["d1", "d2", "d3"];
    let fm = FactorMatrix::from_fit(&fit, &["A", "B"], &index).unwrap();
    assert_eq!(fm.shape(), (0, 16));
    assert!(fm.index.is_empty());
}

#[test]
fn panel_fit_serializes_to_json() {
    let panel = ReturnsPanel::from_json(
        r#"{
            "index": ["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"],
            "assets": ["AAPL", "TSLA"],
            "returns": [[0.01, -0.02], [0.0, 0.03], [-0.01, 0.01], [0.02, -0.04]]
        }"#,
    )
    .unwrap();
    let engine = RollingFitEngine::new(RollingFitConfig::new(3, 1));
    let fm = panel.fit(&engine, false).unwrap();
    assert_eq!(fm.index, vec!["2024-01-04".to_string(), "2024-01-05".to_string()]);
    assert_eq!(fm.columns[0], "AAPL_mu");
    assert_eq!(fm.columns[13], "TSLA_lambda");

    let par = panel.fit(&engine, true).unwrap();
    assert_eq!(fm, par);

    let json: serde_json::Value = serde_json::to_value(&fm).unwrap();
    assert_eq!(json["columns"].as_array().unwrap().len(), 16);
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["index"][1], "2024-01-05");
}

#[test]
fn propagated_nan_is_written_as_text_not_null() {
    let panel = ReturnsPanel::from_json(
        r#"{
            "index": ["d1", "d2", "d3", "d4", "d5", "d6", "d7"],
            "assets": ["FLAT"],
            "returns": [[0.0041], [0.0041], [0.0041], [0.0041], [0.0041], [0.0041], [0.02]]
        }"#,
    )
    .unwrap();
    let engine = RollingFitEngine::new(RollingFitConfig::new(6, 1));
    let fm = panel.fit(&engine, false).unwrap();
    assert_eq!(
        fm.non_finite_columns(),
        vec!["FLAT_kappa", "FLAT_theta", "FLAT_sigma_v", "FLAT_lambda"]
    );

    let json = serde_json::to_string(&fm).unwrap();
    assert!(!json.contains("null"), "{}", json);
    assert!(json.contains(r#"[0.05,"NaN","NaN","NaN",-0.6,"NaN",-0.03,0.05]"#), "{}", json);

    let back: FactorMatrix<String> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.index, fm.index);
    for (row, orig) in back.rows.iter().zip(&fm.rows) {
        for (a, b) in row.iter().zip(orig) {
            assert!(a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()));
        }
    }
}
