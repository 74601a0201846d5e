use dv_core::NumberLocale;
use dv_data::{DataError, DataSheet};

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn en() -> NumberLocale {
    NumberLocale::english()
}

#[test]
fn failed_update_leaves_sheet_untouched() {
    let mut sheet = DataSheet::from_rows(
        &rows(&[&["speed", "mode"], &["1", "low"], &["5", "high"], &["9", "low"]]),
        true,
        &en(),
    )
    .unwrap();
    let cluster = sheet.clusters_mut().add("group");
    sheet.assign_cluster(&[0], Some(cluster)).unwrap();
    sheet.set_selected(&[2]).unwrap();
    let before = sheet.clone();

    // The discrete column already gained a category when the numeric one fails
    let result = sheet.update_from(
        &rows(&[&["speed", "mode"], &["2", "brand-new"], &["fast", "low"]]),
        true,
        &en(),
    );

    assert!(matches!(result, Err(DataError::InconsistentData(_))));
    assert_eq!(sheet, before);
    assert_eq!(sheet.parameter("mode").unwrap().ordinal_of("brand-new"), None);
}

#[test]
fn numeric_parameter_stays_numeric_after_rejected_update() {
    let mut sheet = DataSheet::from_rows(&rows(&[&["speed"], &["1"], &["2"]]), true, &en()).unwrap();

    let result = sheet.update_from(&rows(&[&["speed"], &["1"], &["n/a"]]), true, &en());

    assert!(matches!(result, Err(DataError::InconsistentData(_))));
    assert!(sheet.parameter("speed").unwrap().is_numeric());
    assert_eq!(sheet.designs()[1].values(), &[2.0]);
}

#[test]
fn discrete_ordinals_are_append_only() {
    let mut sheet = DataSheet::from_rows(&rows(&[&["kind"], &["A"], &["B"]]), true, &en()).unwrap();
    sheet
        .update_from(&rows(&[&["kind"], &["A"], &["C"], &["B"]]), true, &en())
        .unwrap();

    let kind = sheet.parameter("kind").unwrap();
    assert_eq!(kind.ordinal_of("A"), Some(0));
    assert_eq!(kind.ordinal_of("B"), Some(1));
    assert_eq!(kind.ordinal_of("C"), Some(2));

    let stored: Vec<f64> = sheet.designs().iter().map(|d| d.values()[0]).collect();
    assert_eq!(stored, vec![0.0, 2.0, 1.0]);
}

#[test]
fn ambiguous_grouping_fails_import() {
    let mut sheet = DataSheet::new();
    let result = sheet.import_from(
        &rows(&[&["mass"], &["1.250"], &["1.2.3"]]),
        true,
        &NumberLocale::german(),
    );

    assert!(matches!(result, Err(DataError::NumberFormat { .. })));
    assert_eq!(sheet.parameter_count(), 0);
}

#[test]
fn ambiguous_number_in_update_fails_without_change() {
    let mut sheet = DataSheet::from_rows(&rows(&[&["mass"], &["1,250"]]), true, &en()).unwrap();
    let before = sheet.clone();

    let result = sheet.update_from(&rows(&[&["mass"], &["12,50"]]), true, &en());

    assert!(matches!(result, Err(DataError::NumberFormat { .. })));
    assert_eq!(sheet, before);
}

#[test]
fn overflowing_number_fails_import() {
    for huge in ["1e999", "-1e999"] {
        let mut sheet = DataSheet::new();
        let result = sheet.import_from(&rows(&[&["x"], &["1"], &[huge]]), true, &en());

        assert!(matches!(result, Err(DataError::NumberFormat { .. })));
        assert_eq!(sheet.parameter_count(), 0);
    }
}

#[test]
fn overflowing_number_fails_update() {
    let mut sheet = DataSheet::from_rows(&rows(&[&["x"], &["1"]]), true, &en()).unwrap();
    let before = sheet.clone();

    let result = sheet.update_from(&rows(&[&["x"], &["1"], &["1e999"]]), true, &en());

    assert!(matches!(result, Err(DataError::NumberFormat { .. })));
    assert_eq!(sheet, before);
}

#[test]
fn header_only_sheet_is_classified_by_first_update() {
    let mut sheet = DataSheet::from_rows(&rows(&[&["x", "label"]]), true, &en()).unwrap();
    assert_eq!(sheet.design_count(), 0);

    let summary = sheet
        .update_from(&rows(&[&["x", "label"], &["1", "alpha"], &["2", "beta"]]), true, &en())
        .unwrap();
    assert_eq!(summary.appended, 2);

    assert!(sheet.parameter("x").unwrap().is_numeric());
    let label = sheet.parameter("label").unwrap();
    assert!(!label.is_numeric());
    assert_eq!(label.ordinal_of("beta"), Some(1));
    assert!(sheet.validate().is_ok());

    // Once values exist the classification is fixed
    let result = sheet.update_from(&rows(&[&["x", "label"], &["one", "alpha"]]), true, &en());
    assert!(matches!(result, Err(DataError::InconsistentData(_))));
}
