//! Plain text and JSON rendering of model state

use serde_json::{json, Value};
use dv_chart::{Axis, ChartError, ParallelCoordinatesChart};
use dv_core::NumberLocale;
use dv_data::{format_number, DataError, DataSheet, Design};

/// One line per parameter with its kind and value range or categories
pub fn parameter_table(sheet: &DataSheet, locale: &NumberLocale) -> Result<String, DataError> {
    let mut out = format!(
        "{} parameters, {} designs\n",
        sheet.parameter_count(),
        sheet.design_count()
    );
    for parameter in sheet.parameters() {
        let detail = if parameter.is_numeric() {
            match sheet.numeric_range(parameter.name())? {
                Some((min, max)) => format!(
                    "numeric  [{}, {}]",
                    format_number(min, locale),
                    format_number(max, locale)
                ),
                None => "numeric  (no values)".to_string(),
            }
        } else {
            let categories: Vec<&str> = parameter.categories().collect();
            format!("discrete {{{}}}", categories.join(", "))
        };
        out.push_str(&format!("  {:<20} {}\n", parameter.name(), detail));
    }
    Ok(out)
}

fn axis_line(axis: &Axis, sheet: &DataSheet, locale: &NumberLocale) -> Result<String, ChartError> {
    let mut line = format!("  {:<20}", axis.parameter_name());
    match axis.categories() {
        Some(filter) => {
            let parameter = sheet.parameter(axis.parameter_name())?;
            let selected: Vec<&str> = filter
                .selected()
                .iter()
                .filter_map(|&ordinal| parameter.category(ordinal))
                .collect();
            line.push_str(&format!(" keep {{{}}}", selected.join(", ")));
        }
        None => {
            let (low, high) = axis.filter_window();
            line.push_str(&format!(
                " range [{}, {}] {} [{}, {}]",
                format_number(axis.min(), locale),
                format_number(axis.max(), locale),
                if axis.is_inverted() { "outside" } else { "within" },
                format_number(low, locale),
                format_number(high, locale)
            ));
        }
    }
    if !axis.is_active() {
        line.push_str(" (inactive)");
    }
    Ok(line)
}

/// Axis order, ranges and filter windows of a chart
pub fn axis_summary(chart: &ParallelCoordinatesChart, sheet: &DataSheet, locale: &NumberLocale) -> Result<String, ChartError> {
    let mut out = format!("{} ({} axes)\n", chart.title(), chart.axis_count());
    for axis in chart.axes() {
        out.push_str(&axis_line(axis, sheet, locale)?);
        out.push('\n');
    }
    Ok(out)
}

fn displayed<'a>(chart: &ParallelCoordinatesChart, sheet: &'a DataSheet) -> Result<Vec<&'a Design>, ChartError> {
    let mut designs = Vec::new();
    for design in sheet.designs() {
        if chart.is_design_displayed(sheet, design)? {
            designs.push(design);
        }
    }
    Ok(designs)
}

fn row(chart: &ParallelCoordinatesChart, sheet: &DataSheet, design: &Design, locale: &NumberLocale) -> Result<Vec<String>, ChartError> {
    let mut cells = Vec::with_capacity(chart.axis_count());
    for axis in chart.axes() {
        let parameter = sheet.parameter(axis.parameter_name())?;
        let value = sheet.value(design, axis.parameter_name())?;
        cells.push(parameter.display_value(value, locale));
    }
    Ok(cells)
}

/// Tab separated table of the displayed designs, columns in axis order
pub fn designs_text(chart: &ParallelCoordinatesChart, sheet: &DataSheet, locale: &NumberLocale) -> Result<String, ChartError> {
    let designs = displayed(chart, sheet)?;
    let header: Vec<&str> = chart.axes().iter().map(Axis::parameter_name).collect();

    let mut out = format!("id\t{}\n", header.join("\t"));
    for design in &designs {
        out.push_str(&format!("{}\t{}\n", design.id(), row(chart, sheet, design, locale)?.join("\t")));
    }
    out.push_str(&format!("{} of {} designs shown\n", designs.len(), sheet.design_count()));
    Ok(out)
}

/// The displayed designs as a JSON array of `{ "id", "values" }` objects
pub fn designs_json(chart: &ParallelCoordinatesChart, sheet: &DataSheet, locale: &NumberLocale) -> Result<Value, ChartError> {
    let mut designs = Vec::new();
    for design in displayed(chart, sheet)? {
        let mut values = serde_json::Map::new();
        for (axis, cell) in chart.axes().iter().zip(row(chart, sheet, design, locale)?) {
            values.insert(axis.parameter_name().to_string(), Value::String(cell));
        }
        designs.push(json!({
            "id": design.id(),
            "selected": design.is_selected(),
            "values": values,
        }));
    }
    Ok(Value::Array(designs))
}
