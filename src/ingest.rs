use std::collections::BTreeSet;

use chrono::{Datelike, Local, NaiveDate};

use crate::dates;
use crate::fields::RawRow;
use crate::models::{DatasetModel, Incident, StudentRecord};
use crate::staff;

const DATE_KEYS: &[&str] = &["whenDate", "date", "createdDate"];
const TIME_KEYS: &[&str] = &["whenTime", "time"];
const TYPE_KEYS: &[&str] = &["eventType", "reason", "eventCode"];
const YEAR_KEYS: &[&str] = &["studentYearGroup", "year", "yearGroup"];
const REG_KEYS: &[&str] = &["tutorGroupName", "form", "reg"];
const SUBJECT_KEYS: &[&str] = &["subject"];
const COMMENT_KEYS: &[&str] = &["schoolNotes", "comments"];
const TEACHER_KEYS: &[&str] = &["staffMembersInvolved", "teacher", "createdBy"];
const GROUP_KEYS: &[&str] = &["groupName", "group", "class"];
const SEN_KEYS: &[&str] = &["SEN status", "sen"];
const PP_KEYS: &[&str] = &["Pupil Premium Indicator", "pupil premium", "Disadvantaged"];
const READING_AGE_KEYS: &[&str] = &["Reading age", "reading age"];
const PRIOR_ATTAINMENT_KEYS: &[&str] = &["Prior Attainment (KS2)", "Prior Attainment"];

// Positive-behaviour rows contribute to no aggregate at all.
const IGNORE_KEYWORDS: &[&str] = &["praise", "house point", "merit", "positive"];
const ESCALATION_KEYWORDS: &[&str] = &["on call", "removal", "exclusion", "safe", "physical"];

const WINDOW_DAYS: usize = 5;

pub fn ingest(rows: &[RawRow]) -> DatasetModel {
    ingest_with(rows, |name| name.to_string())
}

/// Single-pass build of a fresh model. `canonical_name` is the identity-merge
/// hook: student identity is whatever string it returns, and no normalization
/// happens unless the caller supplies one.
pub fn ingest_with(rows: &[RawRow], canonical_name: impl Fn(&str) -> String) -> DatasetModel {
    let today = Local::now().date_naive();
    let mut model = DatasetModel {
        window: active_window(rows),
        ..Default::default()
    };

    for row in rows {
        let kind = row
            .resolve_text(TYPE_KEYS)
            .unwrap_or_else(|| "Other".to_string());
        let kind_lower = kind.to_lowercase();
        if IGNORE_KEYWORDS.iter().any(|k| kind_lower.contains(k)) {
            continue;
        }

        let name = canonical_name(&resolve_name(row));
        let year = resolve_year(row);
        let reg = row
            .resolve_text(REG_KEYS)
            .unwrap_or_else(|| "N/A".to_string());
        let subject = row
            .resolve_text(SUBJECT_KEYS)
            .unwrap_or_else(|| "General".to_string());
        let teacher = row
            .resolve_text(TEACHER_KEYS)
            .unwrap_or_else(|| "Unknown".to_string());
        let group = row
            .resolve_text(GROUP_KEYS)
            .unwrap_or_else(|| "Unknown".to_string());
        let comments = row.resolve_text(COMMENT_KEYS).unwrap_or_default();

        // A row is never dropped for a bad date; only window placement moves.
        let date = row
            .resolve(DATE_KEYS)
            .and_then(dates::parse_date)
            .unwrap_or(today);

        let time = row
            .resolve_text(TIME_KEYS)
            .filter(|t| !t.is_empty())
            .or_else(|| {
                row.resolve_text(&["createdDate"])
                    .and_then(|cd| dates::extract_time(&cd).map(str::to_string))
            });

        if model.in_window(date) {
            let day = date.weekday().number_from_monday();
            if (1..=5).contains(&day) {
                if let Some(period) = dates::period_from_time(time.as_deref()) {
                    model.heatmap.record(period, day, &year, &group);
                }
            }
        }

        let student = model.students.entry(name.clone()).or_insert_with(|| {
            let sen_status = row.resolve_text(SEN_KEYS);
            let is_sen = sen_status.as_ref().is_some_and(|s| {
                s != "N" && !s.to_lowercase().contains("no special")
            });
            let is_pp = row.resolve_text(PP_KEYS).is_some_and(|pp| {
                let upper = pp.to_uppercase();
                upper == "TRUE" || upper == "1" || upper == "YES"
            });
            StudentRecord {
                name: name.clone(),
                year: year.clone(),
                reg: reg.clone(),
                count: 0,
                is_sen,
                sen_status: sen_status.unwrap_or_else(|| "N".to_string()),
                is_pp,
                reading_age: row
                    .resolve_text(READING_AGE_KEYS)
                    .unwrap_or_else(|| "--".to_string()),
                prior_attainment: row
                    .resolve_text(PRIOR_ATTAINMENT_KEYS)
                    .unwrap_or_else(|| "--".to_string()),
                types: Default::default(),
                subjects: Default::default(),
                incidents: Vec::new(),
                comments: Vec::new(),
            }
        });

        student.count += 1;
        *student.types.entry(kind.clone()).or_insert(0) += 1;
        *student.subjects.entry(subject.clone()).or_insert(0) += 1;
        student.incidents.push(Incident {
            date,
            kind: kind.clone(),
            subject: subject.clone(),
            teacher: teacher.clone(),
            time: time.unwrap_or_default(),
            group,
        });
        if !comments.is_empty() {
            student.comments.push(comments);
        }

        if ESCALATION_KEYWORDS.iter().any(|k| kind_lower.contains(k)) {
            let initials = staff::initials(&teacher);
            model.on_call.record(&year, &name, &subject, &initials);
        }
    }

    for student in model.students.values_mut() {
        student.incidents.sort_by(|a, b| b.date.cmp(&a.date));
    }

    model
}

/// The up-to-5 most recent distinct dates anywhere in the input, descending.
/// Computed over every row, including ones the ignore filter later discards.
fn active_window(rows: &[RawRow]) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = rows
        .iter()
        .filter_map(|row| row.resolve(DATE_KEYS).and_then(dates::parse_date))
        .collect();
    dates.into_iter().rev().take(WINDOW_DAYS).collect()
}

fn resolve_name(row: &RawRow) -> String {
    let first = row.resolve_text(&["firstName"]);
    let last = row.resolve_text(&["lastName"]);
    match (first, last) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        _ => row
            .resolve_text(&["name"])
            .unwrap_or_else(|| "Unknown Student".to_string()),
    }
}

fn resolve_year(row: &RawRow) -> String {
    let raw = row
        .resolve_text(YEAR_KEYS)
        .unwrap_or_else(|| "Unknown".to_string());
    strip_year_prefix(&raw)
}

fn strip_year_prefix(raw: &str) -> String {
    // Matched bytes are ASCII, so pos and pos + 4 are char boundaries even
    // when the surrounding text is not.
    let pos = raw
        .as_bytes()
        .windows(4)
        .position(|w| w.eq_ignore_ascii_case(b"year"));
    match pos {
        Some(pos) => {
            let rest = raw[pos + 4..].trim_start();
            format!("{}{}", &raw[..pos], rest).trim().to_string()
        }
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Value;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Text(v.to_string())))
            .collect()
    }

    // 2024-03-11 is a Monday.
    const MONDAY: &str = "11-03-2024";

    fn incident_row(name: &str, kind: &str, date: &str, time: &str) -> RawRow {
        row(&[
            ("firstName", name),
            ("lastName", "Test"),
            ("studentYearGroup", "Year 7"),
            ("tutorGroupName", "7B"),
            ("eventType", kind),
            ("subject", "Maths"),
            ("whenDate", date),
            ("whenTime", time),
            ("groupName", "7MA1"),
        ])
    }

    #[test]
    fn end_to_end_three_rows() {
        let rows = vec![
            incident_row("A", "Physical Altercation", MONDAY, "10:00"),
            incident_row("A", "Praise", MONDAY, "10:00"),
            incident_row("B", "Late", MONDAY, "09:00"),
        ];
        let model = ingest(&rows);

        assert_eq!(model.students.len(), 2);
        assert_eq!(model.student("A Test").unwrap().count, 1);
        assert_eq!(model.student("B Test").unwrap().count, 1);
        // 10:00 is period 2, 09:00 is period 1, Monday is day 1.
        assert_eq!(model.heatmap.count(2, 1), 1);
        assert_eq!(model.heatmap.count(1, 1), 1);
        assert_eq!(model.heatmap.total(), 2);
        // "Physical Altercation" is an escalation incident; "Late" is not.
        assert_eq!(model.on_call.students.len(), 1);
        assert_eq!(model.on_call.students.get("A Test"), Some(&1));
    }

    #[test]
    fn positive_behaviour_rows_touch_nothing() {
        let rows = vec![
            incident_row("A", "House Point awarded", MONDAY, "10:00"),
            incident_row("B", "Merit", MONDAY, "10:00"),
            incident_row("C", "positive referral", MONDAY, "10:00"),
        ];
        let model = ingest(&rows);
        assert!(model.students.is_empty());
        assert_eq!(model.heatmap.total(), 0);
        assert!(model.on_call.students.is_empty());
        // The window still sees their dates.
        assert_eq!(model.window.len(), 1);
    }

    #[test]
    fn window_keeps_five_most_recent_distinct_dates() {
        let mut rows = Vec::new();
        for day in 4..=12 {
            let date = format!("{day:02}-03-2024");
            rows.push(incident_row("A", "Late", &date, "09:00"));
            rows.push(incident_row("B", "Late", &date, "09:00"));
        }
        let model = ingest(&rows);
        assert_eq!(model.window.len(), 5);
        let expected: Vec<NaiveDate> = (8..=12)
            .rev()
            .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
            .collect();
        assert_eq!(model.window, expected);
    }

    #[test]
    fn heatmap_total_matches_window_weekday_period_rows() {
        let rows = vec![
            // In window, Monday, period 2: counted.
            incident_row("A", "Late", MONDAY, "10:00"),
            // In window but no time: excluded from the heatmap only.
            incident_row("B", "Late", MONDAY, ""),
            // Weekend date (Saturday 09-03-2024) in window: excluded.
            incident_row("C", "Late", "09-03-2024", "10:00"),
        ];
        let model = ingest(&rows);
        assert_eq!(model.students.len(), 3);
        assert_eq!(model.heatmap.total(), 1);
        let cell = model.heatmap.cell(2, 1).unwrap();
        let drill: u32 = cell.drilldown.values().flat_map(|g| g.values()).sum();
        assert_eq!(drill, cell.count);
    }

    #[test]
    fn time_falls_back_to_created_timestamp() {
        let r = row(&[
            ("firstName", "A"),
            ("lastName", "Test"),
            ("eventType", "Late"),
            ("whenDate", MONDAY),
            ("createdDate", "11-03-2024 09:10:33"),
        ]);
        let model = ingest(&[r]);
        assert_eq!(model.heatmap.count(1, 1), 1);
        assert_eq!(model.student("A Test").unwrap().incidents[0].time, "09:10");
    }

    #[test]
    fn unresolvable_fields_take_documented_defaults() {
        let model = ingest(&[row(&[("whenDate", MONDAY)])]);
        let student = model.student("Unknown Student").unwrap();
        assert_eq!(student.year, "Unknown");
        assert_eq!(student.reg, "N/A");
        assert_eq!(student.subjects.get("General"), Some(&1));
        assert_eq!(student.types.get("Other"), Some(&1));
        assert_eq!(student.sen_status, "N");
        assert!(!student.is_sen);
        assert_eq!(student.reading_age, "--");
    }

    #[test]
    fn flags_snapshot_on_first_row_only() {
        let mut first = incident_row("A", "Late", MONDAY, "09:00");
        first.push("SEN status", Value::Text("K".to_string()));
        first.push("Pupil Premium Indicator", Value::Text("TRUE".to_string()));
        let mut second = incident_row("A", "Defiance", MONDAY, "10:00");
        second.push("SEN status", Value::Text("N".to_string()));
        second.push("Pupil Premium Indicator", Value::Text("FALSE".to_string()));

        let model = ingest(&[first, second]);
        let student = model.student("A Test").unwrap();
        assert!(student.is_sen);
        assert_eq!(student.sen_status, "K");
        assert!(student.is_pp);
        assert_eq!(student.count, 2);
    }

    #[test]
    fn pupil_premium_truthiness() {
        for (raw, expected) in [("TRUE", true), ("yes", true), ("1", true), ("FALSE", false)] {
            let mut r = incident_row("A", "Late", MONDAY, "09:00");
            r.push("Pupil Premium Indicator", Value::Text(raw.to_string()));
            let model = ingest(&[r]);
            assert_eq!(model.student("A Test").unwrap().is_pp, expected, "{raw}");
        }
    }

    #[test]
    fn serial_dates_and_string_dates_mix() {
        let mut serial_row = row(&[("firstName", "A"), ("lastName", "Test"), ("eventType", "Late")]);
        serial_row.push("date", Value::Number(45_361.0)); // also 11-03-2024
        let rows = vec![serial_row, incident_row("B", "Late", MONDAY, "09:00")];
        let model = ingest(&rows);
        assert_eq!(model.window.len(), 1);
        assert_eq!(
            model.student("A Test").unwrap().incidents[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
    }

    #[test]
    fn incidents_sorted_most_recent_first() {
        let rows = vec![
            incident_row("A", "Late", "05-03-2024", "09:00"),
            incident_row("A", "Defiance", MONDAY, "09:00"),
            incident_row("A", "Shouting", "07-03-2024", "09:00"),
        ];
        let model = ingest(&rows);
        let kinds: Vec<&str> = model.student("A Test").unwrap().incidents
            .iter()
            .map(|i| i.kind.as_str())
            .collect();
        assert_eq!(kinds, vec!["Defiance", "Shouting", "Late"]);
    }

    #[test]
    fn year_prefix_is_stripped() {
        assert_eq!(strip_year_prefix("Year 7"), "7");
        assert_eq!(strip_year_prefix("year10"), "10");
        assert_eq!(strip_year_prefix("8"), "8");
        assert_eq!(strip_year_prefix("Unknown"), "Unknown");
    }

    #[test]
    fn year_prefix_strip_survives_non_ascii_values() {
        // U+0130 changes byte length under to_lowercase; stripping must not
        // panic or slice mid-character.
        assert_eq!(strip_year_prefix("\u{130}year 9"), "\u{130}9");
        assert_eq!(strip_year_prefix("\u{130}year"), "\u{130}");
        assert_eq!(strip_year_prefix("Y\u{e9}ar 7"), "Y\u{e9}ar 7");

        let r = row(&[
            ("name", "A"),
            ("year", "\u{130}year 8"),
            ("eventType", "Late"),
            ("date", MONDAY),
        ]);
        let model = ingest(&[r]);
        assert_eq!(model.student("A").unwrap().year, "\u{130}8");
    }

    #[test]
    fn empty_input_yields_empty_model() {
        let model = ingest(&[]);
        assert!(model.students.is_empty());
        assert!(model.window.is_empty());
        assert_eq!(model.heatmap.total(), 0);
        assert_eq!(model.total_incidents(), 0);
    }

    #[test]
    fn name_canonicalizer_merges_spellings() {
        let rows = vec![
            incident_row("ALEX", "Late", MONDAY, "09:00"),
            incident_row("Alex", "Defiance", MONDAY, "10:00"),
        ];
        assert_eq!(ingest(&rows).students.len(), 2);
        let merged = ingest_with(&rows, |name| name.to_lowercase());
        assert_eq!(merged.students.len(), 1);
        assert_eq!(merged.student("alex test").unwrap().count, 2);
    }

    #[test]
    fn escalation_tallies_all_four_dimensions() {
        let mut r = incident_row("A", "On Call request", MONDAY, "09:00");
        r.push("staffMembersInvolved", Value::Text("G Briody".to_string()));
        let model = ingest(&[r]);
        assert_eq!(model.on_call.years.get("7"), Some(&1));
        assert_eq!(model.on_call.students.get("A Test"), Some(&1));
        assert_eq!(model.on_call.subjects.get("Maths"), Some(&1));
        assert_eq!(model.on_call.staff.get("GBR"), Some(&1));
    }
}
