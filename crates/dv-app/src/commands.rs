//! Subcommand implementations
//!
//! Every command mutates the model first and publishes the matching event
//! on the bus afterwards.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use dv_chart::{BoundKind, ChartSet, ParallelCoordinatesChart, Session};
use dv_core::events::events::{ChartChanged, DataChange, DataSheetChanged, SessionRestored};
use dv_core::{EventBus, Preferences};
use dv_data::{CsvSource, DataSheet};

use crate::cli::{Command, FilterArgs};
use crate::report;

/// Preferences plus the event bus every command reports to
pub struct App {
    preferences: Preferences,
    bus: EventBus,
}

impl App {
    pub fn new(preferences: Preferences) -> Self {
        let bus = EventBus::new();
        bus.on(|changed: &DataSheetChanged| {
            debug!(
                "Data sheet {:?}: {} parameters, {} designs",
                changed.change, changed.parameter_count, changed.design_count
            );
        });
        bus.on(|changed: &ChartChanged| {
            debug!("Chart {} shows {} designs", changed.chart_id, changed.visible_count);
        });
        bus.on(|restored: &SessionRestored| {
            debug!(
                "Session restored: {} charts over {} designs",
                restored.chart_count, restored.design_count
            );
        });

        Self { preferences, bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Inspect { file } => {
                let sheet = self.import(&file).await?;
                print!("{}", report::parameter_table(&sheet, &self.preferences.import.locale)?);
            }
            Command::Filter { file, filters, save_session } => {
                let sheet = self.import(&file).await?;
                let mut chart = ParallelCoordinatesChart::new(&sheet, &self.preferences)?;
                self.adjust(&mut chart, &sheet, &filters)?;
                self.print(&chart, &sheet, filters.json)?;

                if let Some(path) = save_session {
                    let mut charts = ChartSet::new();
                    charts.add(chart);
                    Session::capture(&self.preferences, &sheet, &charts).save(&path)?;
                }
            }
            Command::Update { session, file, out } => {
                let summary = self.update(&session, &file, out.as_deref().unwrap_or(&session)).await?;
                println!(
                    "{} designs updated, {} added, {} removed",
                    summary.matched, summary.appended, summary.pruned
                );
            }
            Command::Show { session, filters } => {
                let (_, sheet, mut charts) = self.restore(&session)?;
                let mut shown = 0;
                for chart in charts.parallel_coordinates_mut() {
                    self.adjust(chart, &sheet, &filters)?;
                    self.print(chart, &sheet, filters.json)?;
                    shown += 1;
                }
                if shown == 0 {
                    bail!("Session {} has no parallel coordinates chart", session.display());
                }
            }
        }
        Ok(())
    }

    /// Import a file on the blocking pool
    pub async fn import(&self, path: &Path) -> Result<DataSheet> {
        let source = CsvSource::new(path, self.preferences.import.clone());
        let sheet = tokio::task::spawn_blocking(move || source.load())
            .await
            .context("Import worker failed")?
            .with_context(|| format!("Failed to import {}", path.display()))?;

        info!(
            "Imported {} parameters and {} designs from {}",
            sheet.parameter_count(),
            sheet.design_count(),
            path.display()
        );
        self.bus.publish(DataSheetChanged {
            change: DataChange::Imported,
            parameter_count: sheet.parameter_count(),
            design_count: sheet.design_count(),
        });
        Ok(sheet)
    }

    /// Load a saved session
    pub fn restore(&self, path: &Path) -> Result<(Preferences, DataSheet, ChartSet)> {
        let session = Session::load(path).with_context(|| format!("Failed to restore {}", path.display()))?;
        let parts = session.into_parts();
        self.bus.publish(SessionRestored {
            chart_count: parts.2.len(),
            design_count: parts.1.design_count(),
        });
        Ok(parts)
    }

    /// Re-read `file` into the session at `session`, synchronize its charts
    /// and save the result to `out`.
    ///
    /// A failed update leaves both the sheet and the session file untouched.
    pub async fn update(&self, session: &Path, file: &Path, out: &Path) -> Result<dv_data::UpdateSummary> {
        let (preferences, sheet, mut charts) = self.restore(session)?;
        let source = CsvSource::new(file, preferences.import.clone());

        let (sheet, result) = tokio::task::spawn_blocking(move || {
            let mut sheet = sheet;
            let result = source.update(&mut sheet);
            (sheet, result)
        })
        .await
        .context("Update worker failed")?;
        let summary = result.with_context(|| format!("Failed to update from {}", file.display()))?;

        self.bus.publish(DataSheetChanged {
            change: DataChange::Updated,
            parameter_count: sheet.parameter_count(),
            design_count: sheet.design_count(),
        });

        charts.synchronize(&sheet, &preferences)?;
        for chart in charts.parallel_coordinates() {
            self.bus.publish(ChartChanged {
                chart_id: chart.id(),
                visible_count: chart.visible_count(&sheet)?,
            });
        }

        Session::capture(&preferences, &sheet, &charts).save(out)?;
        Ok(summary)
    }

    /// Apply command line filter adjustments to `chart`
    pub fn adjust(&self, chart: &mut ParallelCoordinatesChart, sheet: &DataSheet, args: &FilterArgs) -> Result<()> {
        for range in &args.ranges {
            let axis = chart.get_axis_mut(&range.parameter)?;
            axis.set_filter_value(BoundKind::Lower, range.low)?;
            axis.set_filter_value(BoundKind::Upper, range.high)?;
        }
        for name in &args.inverted {
            chart.get_axis_mut(name)?.set_inverted(true);
        }
        for name in &args.inactive {
            chart.get_axis_mut(name)?.set_active(false);
        }
        for selection in &args.selections {
            let parameter = sheet.parameter(&selection.parameter)?;
            let mut ordinals = Vec::with_capacity(selection.categories.len());
            for category in &selection.categories {
                match parameter.ordinal_of(category) {
                    Some(ordinal) => ordinals.push(ordinal),
                    None => bail!("'{}' is not a value of '{}'", category, selection.parameter),
                }
            }
            chart.get_axis_mut(&selection.parameter)?.select_categories(ordinals)?;
        }
        for spec in &args.moves {
            let from = chart
                .axis_position(&spec.parameter)
                .with_context(|| format!("No axis for '{}'", spec.parameter))?;
            chart.move_axis(from, spec.position)?;
        }

        chart.apply_filters(sheet)?;
        self.bus.publish(ChartChanged {
            chart_id: chart.id(),
            visible_count: chart.visible_count(sheet)?,
        });
        Ok(())
    }

    fn print(&self, chart: &ParallelCoordinatesChart, sheet: &DataSheet, json: bool) -> Result<()> {
        let locale = &self.preferences.import.locale;
        if json {
            let designs = report::designs_json(chart, sheet, locale)?;
            println!("{}", serde_json::to_string_pretty(&designs)?);
        } else {
            print!("{}", report::axis_summary(chart, sheet, locale)?);
            print!("{}", report::designs_text(chart, sheet, locale)?);
        }
        Ok(())
    }
}

/// Default location of the preferences file next to the working directory
pub fn default_preferences_path() -> PathBuf {
    PathBuf::from("designview.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{MoveSpec, RangeSpec, SelectionSpec};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const DESIGNS: &str = "speed,mode,weight\n1,low,10\n5,high,20\n9,low,30\n";

    #[tokio::test]
    async fn test_import_publishes_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "designs.csv", DESIGNS);
        let app = App::new(Preferences::default());

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        app.bus().on(move |changed: &DataSheetChanged| {
            counter.store(changed.design_count, Ordering::SeqCst);
        });

        let sheet = app.import(&path).await.unwrap();
        assert_eq!(sheet.parameter_count(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_import_missing_file_fails() {
        let app = App::new(Preferences::default());
        assert!(app.import(Path::new("/nonexistent/designs.csv")).await.is_err());
    }

    #[tokio::test]
    async fn test_adjust_applies_every_kind_of_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "designs.csv", DESIGNS);
        let app = App::new(Preferences::default());
        let sheet = app.import(&path).await.unwrap();
        let mut chart = ParallelCoordinatesChart::new(&sheet, &Preferences::default()).unwrap();

        let args = FilterArgs {
            ranges: vec![RangeSpec { parameter: "speed".into(), low: 8.0, high: 2.0 }],
            inverted: vec![],
            inactive: vec!["weight".into()],
            selections: vec![SelectionSpec { parameter: "mode".into(), categories: vec!["high".into()] }],
            moves: vec![MoveSpec { parameter: "weight".into(), position: 0 }],
            json: false,
        };
        app.adjust(&mut chart, &sheet, &args).unwrap();

        assert_eq!(chart.visible_design_ids(&sheet).unwrap(), vec![2]);
        assert_eq!(chart.axis_at(0).unwrap().parameter_name(), "weight");
    }

    #[tokio::test]
    async fn test_adjust_rejects_unknown_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "designs.csv", DESIGNS);
        let app = App::new(Preferences::default());
        let sheet = app.import(&path).await.unwrap();
        let mut chart = ParallelCoordinatesChart::new(&sheet, &Preferences::default()).unwrap();

        let args = FilterArgs {
            selections: vec![SelectionSpec { parameter: "mode".into(), categories: vec!["medium".into()] }],
            ..FilterArgs::default()
        };
        assert!(app.adjust(&mut chart, &sheet, &args).is_err());
    }

    #[tokio::test]
    async fn test_update_session_keeps_filters() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_csv(dir.path(), "designs.csv", DESIGNS);
        let session = dir.path().join("session.json");
        let app = App::new(Preferences::default());

        let sheet = app.import(&data).await.unwrap();
        let mut chart = ParallelCoordinatesChart::new(&sheet, &Preferences::default()).unwrap();
        let args = FilterArgs {
            ranges: vec![RangeSpec { parameter: "weight".into(), low: 15.0, high: 25.0 }],
            ..FilterArgs::default()
        };
        app.adjust(&mut chart, &sheet, &args).unwrap();
        let mut charts = ChartSet::new();
        charts.add(chart);
        Session::capture(&Preferences::default(), &sheet, &charts).save(&session).unwrap();

        let newer = write_csv(
            dir.path(),
            "newer.csv",
            "speed,mode,weight\n1,low,10\n5,high,20\n9,low,30\n4,mid,22\n",
        );
        let summary = app.update(&session, &newer, &session).await.unwrap();
        assert_eq!((summary.matched, summary.appended, summary.pruned), (3, 1, 0));

        let (_, sheet, charts) = app.restore(&session).unwrap();
        let chart = charts.parallel_coordinates().next().unwrap();
        assert_eq!(chart.visible_design_ids(&sheet).unwrap(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_session_alone() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_csv(dir.path(), "designs.csv", DESIGNS);
        let session = dir.path().join("session.json");
        let app = App::new(Preferences::default());

        let sheet = app.import(&data).await.unwrap();
        let mut charts = ChartSet::new();
        charts.add(ParallelCoordinatesChart::new(&sheet, &Preferences::default()).unwrap());
        Session::capture(&Preferences::default(), &sheet, &charts).save(&session).unwrap();
        let before = std::fs::read_to_string(&session).unwrap();

        let wider = write_csv(dir.path(), "wider.csv", "speed,mode,weight,cost\n1,low,10,3\n");
        assert!(app.update(&session, &wider, &session).await.is_err());
        assert_eq!(std::fs::read_to_string(&session).unwrap(), before);
    }
}
