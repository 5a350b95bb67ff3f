use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::dates;

#[derive(Debug, Clone)]
pub struct Incident {
    pub date: NaiveDate,
    pub kind: String,
    pub subject: String,
    pub teacher: String,
    pub time: String,
    pub group: String,
}

#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub name: String,
    pub year: String,
    pub reg: String,
    pub count: u32,
    pub is_sen: bool,
    pub sen_status: String,
    pub is_pp: bool,
    pub reading_age: String,
    pub prior_attainment: String,
    pub types: BTreeMap<String, u32>,
    pub subjects: BTreeMap<String, u32>,
    pub incidents: Vec<Incident>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HeatmapCell {
    pub count: u32,
    pub drilldown: BTreeMap<String, BTreeMap<String, u32>>,
}

/// Counts keyed by (period 1-6, weekday 1-5 Mon-Fri). Each cell's drilldown
/// partitions its count by year group and then class code.
#[derive(Debug, Clone, Default)]
pub struct Heatmap {
    cells: BTreeMap<(u32, u32), HeatmapCell>,
}

impl Heatmap {
    pub fn record(&mut self, period: u32, day: u32, year: &str, group: &str) {
        let cell = self.cells.entry((period, day)).or_default();
        cell.count += 1;
        *cell
            .drilldown
            .entry(year.to_string())
            .or_default()
            .entry(group.to_string())
            .or_insert(0) += 1;
    }

    pub fn cell(&self, period: u32, day: u32) -> Option<&HeatmapCell> {
        self.cells.get(&(period, day))
    }

    pub fn count(&self, period: u32, day: u32) -> u32 {
        self.cell(period, day).map_or(0, |c| c.count)
    }

    pub fn total(&self) -> u32 {
        self.cells.values().map(|c| c.count).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OnCallStats {
    pub years: BTreeMap<String, u32>,
    pub students: BTreeMap<String, u32>,
    pub subjects: BTreeMap<String, u32>,
    pub staff: BTreeMap<String, u32>,
}

impl OnCallStats {
    pub fn record(&mut self, year: &str, student: &str, subject: &str, staff_initials: &str) {
        *self.years.entry(year.to_string()).or_insert(0) += 1;
        *self.students.entry(student.to_string()).or_insert(0) += 1;
        *self.subjects.entry(subject.to_string()).or_insert(0) += 1;
        *self.staff.entry(staff_initials.to_string()).or_insert(0) += 1;
    }

    pub fn top_students(&self, n: usize) -> Vec<(String, u32)> {
        top_n(&self.students, n)
    }

    pub fn top_subjects(&self, n: usize) -> Vec<(String, u32)> {
        top_n(&self.subjects, n)
    }

    pub fn top_staff(&self, n: usize) -> Vec<(String, u32)> {
        top_n(&self.staff, n)
    }
}

// Count descending, key ascending on ties.
pub fn top_n(map: &BTreeMap<String, u32>, n: usize) -> Vec<(String, u32)> {
    let mut entries: Vec<(String, u32)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

#[derive(Debug, Clone)]
pub struct YearSummary {
    pub year: String,
    pub total: u32,
    pub top_issues: Vec<(String, u32)>,
}

#[derive(Debug, Clone)]
pub struct WeekOverview {
    pub year: String,
    pub count: u32,
    pub top_issue: Option<(String, u32)>,
}

#[derive(Debug, Clone)]
pub struct PeriodStudent {
    pub name: String,
    pub reg: String,
    pub count: u32,
}

/// The full queryable model for one dataset. Rebuilt from scratch on every
/// ingestion; callers replace their reference wholesale.
#[derive(Debug, Clone, Default)]
pub struct DatasetModel {
    pub students: BTreeMap<String, StudentRecord>,
    pub heatmap: Heatmap,
    pub on_call: OnCallStats,
    /// Up to 5 most recent distinct incident dates, descending.
    pub window: Vec<NaiveDate>,
}

impl DatasetModel {
    pub fn student(&self, name: &str) -> Option<&StudentRecord> {
        self.students.get(name)
    }

    pub fn total_incidents(&self) -> u32 {
        self.students.values().map(|s| s.count).sum()
    }

    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.window.contains(&date)
    }

    pub fn years(&self) -> Vec<String> {
        let mut years: Vec<String> = self
            .students
            .values()
            .map(|s| s.year.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        years.sort_by_key(|y| (y.parse::<i32>().unwrap_or(i32::MAX), y.clone()));
        years
    }

    /// All-time rollup for one year group: total count plus the top five
    /// incident types.
    pub fn year_summary(&self, year: &str) -> YearSummary {
        let mut total = 0;
        let mut issues: BTreeMap<String, u32> = BTreeMap::new();
        for student in self.students.values().filter(|s| s.year == year) {
            total += student.count;
            for (kind, count) in &student.types {
                *issues.entry(kind.clone()).or_insert(0) += count;
            }
        }
        YearSummary {
            year: year.to_string(),
            total,
            top_issues: top_n(&issues, 5),
        }
    }

    /// Window-scoped rollup for one year group, used by the weekly report.
    pub fn week_overview(&self, year: &str) -> WeekOverview {
        let mut count = 0;
        let mut issues: BTreeMap<String, u32> = BTreeMap::new();
        for student in self.students.values().filter(|s| s.year == year) {
            for incident in &student.incidents {
                if self.in_window(incident.date) {
                    count += 1;
                    *issues.entry(incident.kind.clone()).or_insert(0) += 1;
                }
            }
        }
        WeekOverview {
            year: year.to_string(),
            count,
            top_issue: top_n(&issues, 1).into_iter().next(),
        }
    }

    /// Reverse drill-in for a heatmap cell: which students had a window
    /// incident at this weekday and period.
    pub fn students_at(&self, day: u32, period: u32) -> Vec<PeriodStudent> {
        let mut hits: Vec<PeriodStudent> = Vec::new();
        for student in self.students.values() {
            let count = student
                .incidents
                .iter()
                .filter(|i| {
                    self.in_window(i.date)
                        && i.date.weekday().number_from_monday() == day
                        && dates::period_from_time(Some(i.time.as_str())) == Some(period)
                })
                .count() as u32;
            if count > 0 {
                hits.push(PeriodStudent {
                    name: student.name.clone(),
                    reg: student.reg.clone(),
                    count,
                });
            }
        }
        hits.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        hits
    }
}
