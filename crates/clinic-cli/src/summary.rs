use std::collections::BTreeMap;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::Value;

use clinic_model::Record;
use clinic_reference::{ControlModel, ResolvedControl};
use clinic_state::NotificationLevel;

use crate::commands::{ConfigReport, FilterReport, IntakeReport};
use crate::settings::DisplaySettings;

pub fn print_filter(report: &FilterReport, display: &DisplaySettings) {
    println!(
        "{}: {} of {} records match",
        report.entity,
        report.records.len(),
        report.total
    );
    if report.records.is_empty() {
        return;
    }
    println!("{}", records_table(&report.records, display));
    let hidden = report.records.len().saturating_sub(display.max_rows);
    if hidden > 0 {
        println!("... {hidden} more not shown");
    }
}

pub fn print_control(control: &ResolvedControl) {
    println!(
        "{} ({}, {} mode)",
        control.label(),
        control.field_prop(),
        control.mode
    );
    println!("{}", control_table(control));
}

pub fn print_intake(report: &IntakeReport) {
    println!("{}", steps_table(report));
    if let Some(review) = &report.review {
        print!("{review}");
    }
    if let Some(notification) = &report.notification {
        let prefix = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        println!("{prefix}: {}", notification.message);
    }
    if let Some(id) = report.saved.as_ref().and_then(Record::id) {
        println!("Saved patient #{id}");
    }
}

pub fn print_tally(field: &str, counts: &BTreeMap<String, usize>) {
    println!("{}", tally_table(field, counts));
}

pub fn print_config(report: &ConfigReport) {
    if report.created {
        println!("Created {}", report.path.display());
    } else {
        println!("Settings: {}", report.path.display());
    }
    match toml::to_string_pretty(&report.settings) {
        Ok(content) => print!("{content}"),
        Err(error) => eprintln!("error: {error}"),
    }
}

/// Records as rows, limited to `display.max_rows`.
pub fn records_table(records: &[Record], display: &DisplaySettings) -> Table {
    let columns = if display.columns.is_empty() {
        record_columns(records)
    } else {
        display.columns.clone()
    };
    let mut table = Table::new();
    table.set_header(columns.iter().map(|column| header_cell(column)));
    apply_table_style(&mut table);
    for record in records.iter().take(display.max_rows) {
        table.add_row(
            columns
                .iter()
                .map(|column| Cell::new(display_cell(record.get(column)))),
        );
    }
    table
}

pub fn control_table(control: &ResolvedControl) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    match &control.model {
        ControlModel::Select {
            options,
            selected,
            default,
        } => {
            table.set_header(vec![
                header_cell("Value"),
                header_cell("Label"),
                header_cell("Selected"),
            ]);
            for item in options {
                let label = match &item.custom {
                    Some(custom) => format!("{} [{custom:?}]", item.label),
                    None => item.label.clone(),
                };
                table.add_row(vec![
                    Cell::new(&item.value),
                    Cell::new(label),
                    selection_cell(
                        selected.as_ref() == Some(&item.value),
                        default.as_ref() == Some(&item.value),
                    ),
                ]);
            }
        }
        ControlModel::CheckGroup { items } => {
            table.set_header(vec![
                header_cell("Id"),
                header_cell("Label"),
                header_cell("Checked"),
            ]);
            for item in items {
                table.add_row(vec![
                    Cell::new(item.id),
                    Cell::new(&item.label),
                    marker_cell(item.checked),
                ]);
            }
        }
    }
    align_column(&mut table, 2, CellAlignment::Center);
    table
}

pub fn steps_table(report: &IntakeReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Status"),
        header_cell("Issues"),
    ]);
    apply_table_style(&mut table);
    for step in &report.steps {
        let (status, issues) = if step.accepted() {
            (Cell::new("ok").fg(Color::Green), String::new())
        } else {
            let issues = step
                .errors
                .iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect::<Vec<_>>()
                .join("\n");
            (Cell::new("rejected").fg(Color::Red), issues)
        };
        table.add_row(vec![Cell::new(step.title), status, Cell::new(issues)]);
    }
    table
}

pub fn tally_table(field: &str, counts: &BTreeMap<String, usize>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell(field), header_cell("Count")]);
    apply_table_style(&mut table);
    for (value, count) in counts {
        table.add_row(vec![Cell::new(value), Cell::new(count)]);
    }
    align_column(&mut table, 1, CellAlignment::Right);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Field names in first-seen order, `id` first.
fn record_columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for (field, _) in record.fields() {
            if !columns.iter().any(|column| column == field) {
                columns.push(field.to_string());
            }
        }
    }
    if let Some(index) = columns.iter().position(|column| column == "id") {
        let id = columns.remove(index);
        columns.insert(0, id);
    }
    columns
}

fn display_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(nested)) => nested
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| Value::Object(nested.clone()).to_string(), str::to_string),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| display_cell(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn selection_cell(selected: bool, default: bool) -> Cell {
    if default {
        Cell::new("default").fg(Color::DarkGrey)
    } else {
        marker_cell(selected)
    }
}

fn marker_cell(on: bool) -> Cell {
    if on {
        Cell::new("x").fg(Color::Green)
    } else {
        Cell::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_references_show_their_name() {
        let value = serde_json::json!({ "id": 2, "name": "Nurse" });
        assert_eq!(display_cell(Some(&value)), "Nurse");
        let list = serde_json::json!([{ "name": "Cough" }, "Fever"]);
        assert_eq!(display_cell(Some(&list)), "Cough, Fever");
        assert_eq!(display_cell(None), "");
    }

    #[test]
    fn id_column_comes_first() {
        let records = vec![
            Record::new().with("name", "a").with("id", 1),
            Record::new().with("email", "b@clinic.test"),
        ];
        assert_eq!(record_columns(&records), vec!["id", "name", "email"]);
    }
}
