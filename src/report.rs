use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::Local;

use crate::actions::{self, Role};
use crate::models::DatasetModel;

pub fn build_report(model: &DatasetModel) -> String {
    let stats = actions::action_stats(model);
    let plan = actions::assign_tiers(&stats);

    let mut output = String::new();

    let _ = writeln!(output, "# Weekly Pastoral Report");
    let range = match (model.window.last(), model.window.first()) {
        (Some(oldest), Some(newest)) => format!("{oldest} to {newest}"),
        _ => "no dated incidents".to_string(),
    };
    let _ = writeln!(
        output,
        "Generated {} (active window: {}, {} school days)",
        Local::now().date_naive(),
        range,
        model.window.len()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Overview by Year Group");

    let mut total_week = 0;
    for year in actions::CORE_YEARS {
        let overview = model.week_overview(year);
        total_week += overview.count;
        match overview.top_issue {
            Some((issue, count)) => {
                let _ = writeln!(
                    output,
                    "- Year {}: {} incidents, top issue {} ({})",
                    year, overview.count, issue, count
                );
            }
            None => {
                let _ = writeln!(output, "- Year {}: 0 incidents", year);
            }
        }
    }
    let _ = writeln!(output, "- Total: {total_week} incidents in the window");

    let _ = writeln!(output);
    let _ = writeln!(output, "## On-Call / Removal Hotspots");

    let subjects = model.on_call.top_subjects(5);
    let staff = model.on_call.top_staff(5);
    if subjects.is_empty() && staff.is_empty() {
        let _ = writeln!(output, "No escalation incidents recorded.");
    } else {
        for (subject, count) in subjects {
            let _ = writeln!(output, "- Subject: {subject} ({count})");
        }
        for (initials, count) in staff {
            let _ = writeln!(output, "- Staff: {initials} ({count})");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Diagnostic Patterns (Students of Concern)");

    if stats.is_empty() {
        let _ = writeln!(output, "No students with incidents in the window.");
    } else {
        let mut by_category: BTreeMap<&str, u32> = BTreeMap::new();
        for stat in &stats {
            *by_category.entry(stat.category.label()).or_insert(0) += 1;
        }
        let mut categories: Vec<(&str, u32)> = by_category.into_iter().collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        for (label, count) in categories {
            let focus = stats
                .iter()
                .find(|s| s.category.label() == label)
                .map(|s| s.category.suggested_focus())
                .unwrap_or("General Conduct");
            let _ = writeln!(output, "- {label}: {count} students (focus: {focus})");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Action Plan");

    for role in [Role::SeniorLead, Role::YearLead, Role::FormTutor] {
        let _ = writeln!(output);
        let _ = writeln!(output, "### {} Actions", role.label());
        let tier: Vec<_> = plan.iter().filter(|a| a.role == role).collect();
        if tier.is_empty() {
            let _ = writeln!(output, "No students meet the criteria this week.");
            continue;
        }
        for assignment in tier {
            let s = &assignment.stat;
            let _ = writeln!(
                output,
                "- [{}] {} (Year {}, {}): {} incidents, {} - {}",
                assignment.staff, s.name, s.year, s.reg, s.recent_count, s.top_issue, assignment.action
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{RawRow, Value};
    use crate::ingest;

    fn incident_row(name: &str, year: &str, kind: &str, date: &str) -> RawRow {
        [
            ("name", name),
            ("year", year),
            ("form", "7B"),
            ("eventType", kind),
            ("date", date),
            ("subject", "Maths"),
        ]
        .into_iter()
        .map(|(k, v)| (k, Value::Text(v.to_string())))
        .collect()
    }

    #[test]
    fn report_covers_all_sections() {
        let rows = vec![
            incident_row("Amy Pond", "7", "Defiance", "11-03-2024"),
            incident_row("Rory Williams", "8", "On Call - Removal", "11-03-2024"),
        ];
        let model = ingest::ingest(&rows);
        let report = build_report(&model);

        assert!(report.contains("# Weekly Pastoral Report"));
        assert!(report.contains("## Weekly Overview by Year Group"));
        assert!(report.contains("Year 7: 1 incidents"));
        assert!(report.contains("Subject: Maths (1)"));
        assert!(report.contains("### Assistant Head Actions"));
        assert!(report.contains("Amy Pond"));
    }

    #[test]
    fn empty_model_renders_empty_state() {
        let report = build_report(&ingest::ingest(&[]));
        assert!(report.contains("no dated incidents"));
        assert!(report.contains("No escalation incidents recorded."));
        assert!(report.contains("No students with incidents in the window."));
    }
}
