use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::{self, Diagnosis};
use crate::dates;
use crate::models::DatasetModel;
use crate::staff;

pub const CORE_YEARS: &[&str] = &["7", "8", "9", "10", "11"];

#[derive(Debug, Clone, Serialize)]
pub struct ActionStat {
    pub name: String,
    pub year: String,
    pub reg: String,
    pub recent_count: u32,
    pub top_issue: String,
    pub category: Diagnosis,
    pub week: u32,
}

/// Window-scoped per-student stats, re-derived from the model on every call.
/// Students with no incident inside the active window are excluded. Sorted by
/// window count descending, name ascending on ties; a student's top issue is
/// the highest window count with lexicographic tie-break.
pub fn action_stats(model: &DatasetModel) -> Vec<ActionStat> {
    let week = model
        .window
        .first()
        .map(|d| dates::iso_week_number(*d))
        .unwrap_or(0);

    let mut stats: Vec<ActionStat> = Vec::new();
    for student in model.students.values() {
        let mut type_counts: BTreeMap<&str, u32> = BTreeMap::new();
        let mut recent_count = 0;
        for incident in &student.incidents {
            if model.in_window(incident.date) {
                recent_count += 1;
                *type_counts.entry(incident.kind.as_str()).or_insert(0) += 1;
            }
        }
        if recent_count == 0 {
            continue;
        }
        let top_issue = type_counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(kind, _)| kind.to_string())
            .unwrap_or_default();
        let category = classify::diagnose(&top_issue);
        stats.push(ActionStat {
            name: student.name.clone(),
            year: student.year.clone(),
            reg: student.reg.clone(),
            recent_count,
            top_issue,
            category,
            week,
        });
    }

    stats.sort_by(|a, b| {
        b.recent_count
            .cmp(&a.recent_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    SeniorLead,
    YearLead,
    FormTutor,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::SeniorLead => "Assistant Head",
            Role::YearLead => "Head of Year",
            Role::FormTutor => "Form Tutor",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub role: Role,
    pub staff: String,
    pub action: String,
    pub stat: ActionStat,
}

/// Greedy, mutually exclusive tier assignment in fixed order: the top five
/// school-wide go to senior leadership, then up to three per year group
/// (window count over five) to the year lead, then the single highest per
/// form (count over three) to the form tutor. A name claimed by an earlier
/// tier is invisible to the later ones.
pub fn assign_tiers(stats: &[ActionStat]) -> Vec<Assignment> {
    let mut assigned: HashSet<&str> = HashSet::new();
    let mut plan: Vec<Assignment> = Vec::new();

    for stat in stats.iter().take(5) {
        assigned.insert(stat.name.as_str());
        plan.push(Assignment {
            role: Role::SeniorLead,
            staff: staff::slt_lead(&stat.year).unwrap_or("SLT").to_string(),
            action: "Review Exclusion Risk".to_string(),
            stat: stat.clone(),
        });
    }

    for year in CORE_YEARS {
        let picks: Vec<&ActionStat> = stats
            .iter()
            .filter(|s| s.year == *year && s.recent_count > 5 && !assigned.contains(s.name.as_str()))
            .take(3)
            .collect();
        for stat in picks {
            assigned.insert(stat.name.as_str());
            plan.push(Assignment {
                role: Role::YearLead,
                staff: staff::hoy_lead(year).unwrap_or("HOY").to_string(),
                action: format!("Red Report - Focus: {}", stat.category.suggested_focus()),
                stat: stat.clone(),
            });
        }
    }

    let mut forms: Vec<&str> = Vec::new();
    for stat in stats {
        if !forms.contains(&stat.reg.as_str()) {
            forms.push(&stat.reg);
        }
    }
    for form in forms {
        let pick = stats
            .iter()
            .find(|s| s.reg == form && s.recent_count > 3 && !assigned.contains(s.name.as_str()));
        if let Some(stat) = pick {
            assigned.insert(stat.name.as_str());
            plan.push(Assignment {
                role: Role::FormTutor,
                staff: form.to_string(),
                action: format!("Contact Home - Strategy: {}", stat.category.suggested_focus()),
                stat: stat.clone(),
            });
        }
    }

    plan
}

/// Machine-readable action plan: the window the counts were taken over plus
/// the tiered assignments.
#[derive(Debug, Clone, Serialize)]
pub struct ActionPlan {
    pub window: Vec<NaiveDate>,
    pub assignments: Vec<Assignment>,
}

pub fn action_plan(model: &DatasetModel) -> ActionPlan {
    let stats = action_stats(model);
    ActionPlan {
        window: model.window.clone(),
        assignments: assign_tiers(&stats),
    }
}
