use std::path::Path;

use anyhow::Context;
use csv::ReaderBuilder;

use crate::fields::{RawRow, Value};

/// Reads a behaviour export into raw rows. The header row becomes the column
/// keys; cells that parse as numbers are auto-typed (spreadsheet exports often
/// turn dates into serial numbers), empty cells are dropped from the row.
pub fn load_rows(path: &Path) -> anyhow::Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = RawRow::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(n) => row.push(header, Value::Number(n)),
                Err(_) => row.push(header, Value::Text(cell.to_string())),
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Writes a small fixed demo export for trying the tool without school data.
pub fn write_sample(path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record([
        "firstName",
        "lastName",
        "studentYearGroup",
        "tutorGroupName",
        "eventType",
        "subject",
        "whenDate",
        "whenTime",
        "SEN status",
        "Pupil Premium Indicator",
        "schoolNotes",
        "groupName",
        "staffMembersInvolved",
    ])?;

    let rows: &[[&str; 13]] = &[
        ["Abdus Samad", "Sarwar", "Year 7", "7B", "Disruption to Learning", "Maths", "11-03-2024", "09:20", "K", "TRUE", "Talking over the teacher repeatedly.", "7MA1", "G Briody"],
        ["Abdus Samad", "Sarwar", "Year 7", "7B", "Calling Out", "Maths", "12-03-2024", "09:15", "K", "TRUE", "", "7MA1", "G Briody"],
        ["Abdus Samad", "Sarwar", "Year 7", "7B", "Refusal to Follow Instruction", "English", "13-03-2024", "11:05", "K", "TRUE", "Refused to move seats.", "7EN2", "L Doorly"],
        ["Abdus Samad", "Sarwar", "Year 7", "7B", "On Call Request", "Science", "14-03-2024", "13:40", "K", "TRUE", "Removed from lesson.", "7SC1", "T Slavova"],
        ["Adam Ammar", "Khodja", "Year 8", "8R", "Late to Lesson", "History", "11-03-2024", "10:50", "N", "FALSE", "", "8HI1", "E Galgey"],
        ["Adam Ammar", "Khodja", "Year 8", "8R", "Uniform Infraction", "History", "12-03-2024", "10:55", "N", "FALSE", "", "8HI1", "E Galgey"],
        ["Chloe", "Davis", "Year 9", "9H", "Physical Altercation", "PE", "13-03-2024", "14:45", "N", "TRUE", "Safeguarding team informed.", "9PE1", "K King"],
        ["Chloe", "Davis", "Year 9", "9H", "Shouting in Class", "Art", "14-03-2024", "09:30", "N", "TRUE", "", "9AR1", "U Kaya"],
        ["Ben", "Carter", "Year 10", "10T", "Equipment Missing", "Technology", "14-03-2024", "12:10", "N", "FALSE", "", "10TE1", "S Kisten"],
        ["Ben", "Carter", "Year 10", "10T", "Praise", "Technology", "15-03-2024", "12:10", "N", "FALSE", "Excellent project work.", "10TE1", "S Kisten"],
        ["Ella", "Fisher", "Year 11", "11K", "Defiance", "English", "15-03-2024", "09:05", "ASD", "FALSE", "Would not hand in phone.", "11EN1", "C Mauris-Blanc"],
        ["Ella", "Fisher", "Year 11", "11K", "Internal Exclusion", "English", "15-03-2024", "11:15", "ASD", "FALSE", "", "11EN1", "C Mauris-Blanc"],
    ];
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
