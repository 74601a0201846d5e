use dv_chart::{BoundKind, ChartSet, ParallelCoordinatesChart, Session};
use dv_core::{NumberLocale, Preferences};
use dv_data::DataSheet;

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn speed_and_mode() -> DataSheet {
    DataSheet::from_rows(
        &rows(&[&["speed", "mode"], &["1", "low"], &["5", "high"], &["9", "low"]]),
        true,
        &NumberLocale::english(),
    )
    .unwrap()
}

#[test]
fn only_the_middle_design_passes_the_speed_window() {
    let sheet = speed_and_mode();
    let mut chart = ParallelCoordinatesChart::new(&sheet, &Preferences::default()).unwrap();

    let speed = chart.get_axis_mut("speed").unwrap();
    speed.set_filter_value(BoundKind::Lower, 2.0).unwrap();
    speed.set_filter_value(BoundKind::Upper, 8.0).unwrap();
    chart.get_axis_mut("mode").unwrap().set_active(false);

    let visible: Vec<_> = sheet
        .designs()
        .iter()
        .filter(|d| chart.is_design_visible(&sheet, d).unwrap())
        .map(|d| sheet.value(d, "speed").unwrap())
        .collect();
    assert_eq!(visible, vec![5.0]);
    assert_eq!(chart.visible_design_ids(&sheet).unwrap(), vec![2]);
}

#[test]
fn inverted_window_keeps_both_ends() {
    let sheet = DataSheet::from_rows(
        &rows(&[&["x"], &["0"], &["2"], &["5"], &["8"], &["10"]]),
        true,
        &NumberLocale::english(),
    )
    .unwrap();
    let mut chart = ParallelCoordinatesChart::new(&sheet, &Preferences::default()).unwrap();
    let axis = chart.get_axis_mut("x").unwrap();
    axis.set_filter_value(BoundKind::Lower, 2.0).unwrap();
    axis.set_filter_value(BoundKind::Upper, 8.0).unwrap();

    assert_eq!(chart.visible_design_ids(&sheet).unwrap(), vec![2, 3, 4]);

    chart.get_axis_mut("x").unwrap().set_inverted(true);
    assert_eq!(chart.visible_design_ids(&sheet).unwrap(), vec![1, 2, 4, 5]);
}

#[test]
fn charts_follow_a_data_update() {
    let prefs = Preferences::default();
    let mut sheet = speed_and_mode();
    let mut charts = ChartSet::new();
    let id = charts.add(ParallelCoordinatesChart::new(&sheet, &prefs).unwrap());

    sheet
        .update_from(
            &rows(&[&["speed", "mode"], &["1", "low"], &["5", "high"], &["9", "low"], &["20", "turbo"]]),
            true,
            &prefs.import.locale,
        )
        .unwrap();
    charts.synchronize(&sheet, &prefs).unwrap();

    let chart = charts.get(id).unwrap().as_parallel_coordinates().unwrap();
    let speed = chart.get_axis("speed").unwrap();
    assert_eq!((speed.min(), speed.max()), (1.0, 20.0));
    assert_eq!(speed.filter_window(), (1.0, 20.0));
    assert_eq!(chart.get_axis("mode").unwrap().max(), 2.0);
    assert_eq!(chart.visible_count(&sheet).unwrap(), 4);
}

#[test]
fn single_design_chart_widens_with_the_data() {
    let prefs = Preferences::default();
    let mut sheet = DataSheet::from_rows(&rows(&[&["x"], &["5"]]), true, &prefs.import.locale).unwrap();
    let mut chart = ParallelCoordinatesChart::new(&sheet, &prefs).unwrap();

    sheet
        .update_from(&rows(&[&["x"], &["5"], &["1"], &["9"]]), true, &prefs.import.locale)
        .unwrap();
    chart.synchronize(&sheet, &prefs).unwrap();

    let x = chart.get_axis("x").unwrap();
    assert_eq!((x.min(), x.max()), (1.0, 9.0));
    assert_eq!(x.filter_window(), (1.0, 9.0));
    assert_eq!(chart.visible_design_ids(&sheet).unwrap(), vec![1, 2, 3]);
}

#[test]
fn session_survives_a_round_trip_after_rejected_overflow() {
    let prefs = Preferences::default();
    assert!(DataSheet::from_rows(&rows(&[&["x"], &["1"], &["1e999"]]), true, &prefs.import.locale).is_err());

    let sheet = DataSheet::from_rows(&rows(&[&["x"], &["1"], &["300"]]), true, &prefs.import.locale).unwrap();
    let mut charts = ChartSet::new();
    charts.add(ParallelCoordinatesChart::new(&sheet, &prefs).unwrap());

    let text = Session::capture(&prefs, &sheet, &charts).to_json().unwrap();
    let restored = Session::from_json(&text).unwrap();
    assert_eq!(restored.data_sheet, sheet);
}

#[test]
fn preferences_shape_new_axes() {
    let sheet = speed_and_mode();
    let mut prefs = Preferences::default();
    prefs.axis.active = false;
    prefs.axis.tic_count = 4;

    let chart = ParallelCoordinatesChart::new(&sheet, &prefs).unwrap();
    assert!(chart.axes().iter().all(|a| !a.is_active() && a.tic_count() == 4));
}
