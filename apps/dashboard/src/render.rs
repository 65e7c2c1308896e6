//! Plain-text table rendering of a committed vitals window. Read-only over
//! the snapshot it is handed; all derivation happened in the reconciler.

use shared::{display, domain::VitalRecord};

const HEADERS: [&str; 9] = [
    "Timestamp",
    "First Name",
    "Last Name",
    "Age",
    "Heart Rate",
    "Blood Pressure",
    "Steps Taken",
    "Fitness Level",
    "Notes",
];

pub fn print_table(window: &[VitalRecord]) {
    if window.is_empty() {
        println!("No vitals data available");
        return;
    }

    let rows: Vec<[String; 9]> = window.iter().map(row).collect();
    let mut widths: [usize; 9] = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    print_row(&HEADERS.map(String::from), &widths);
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + widths.len() * 3));
    for row in &rows {
        print_row(row, &widths);
    }
}

fn row(record: &VitalRecord) -> [String; 9] {
    let (date, time) = display::format_timestamp(record.timestamp);
    let steps = record.steps_taken.unwrap_or(0);
    [
        format!("{date} {time}"),
        or_na(&record.first_name),
        or_na(&record.last_name),
        record.age.map_or_else(|| "N/A".into(), |v| v.to_string()),
        record
            .heart_rate
            .map_or_else(|| "N/A".into(), |v| format!("{v} BPM")),
        record.blood_pressure.clone().unwrap_or_else(|| "N/A".into()),
        format!(
            "{} ({}, {}% of goal)",
            display::format_steps(steps),
            record.activity_level().label(),
            record.goal_progress()
        ),
        record
            .fitness_level
            .map_or_else(|| "N/A".into(), |v| v.label().to_string()),
        record
            .notes
            .clone()
            .unwrap_or_else(|| "No notes available".into()),
    ]
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() {
        "N/A".into()
    } else {
        value.to_string()
    }
}

fn print_row(cells: &[String; 9], widths: &[usize; 9]) {
    let line = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("{line}");
}
