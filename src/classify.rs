use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Diagnosis {
    SafetyRegulation,
    RespectCooperation,
    EngagementFocus,
    Organisation,
    GeneralBehaviour,
}

// Match order is load-bearing: a type string hitting both a safety and a
// disruption keyword must classify as safety.
const KEYWORD_RULES: &[(Diagnosis, &[&str])] = &[
    (
        Diagnosis::SafetyRegulation,
        &["physical", "altercation", "fighting", "safeguarding", "assault"],
    ),
    (
        Diagnosis::RespectCooperation,
        &["refusal", "rude", "defiance", "insubordination", "challenging"],
    ),
    (
        Diagnosis::EngagementFocus,
        &["shouting", "talking", "off-task", "calling out", "noise"],
    ),
    (
        Diagnosis::Organisation,
        &["equipment", "uniform", "late", "homework", "pencils", "planner"],
    ),
];

pub fn diagnose(type_str: &str) -> Diagnosis {
    let lowered = type_str.to_lowercase();
    for (diagnosis, keywords) in KEYWORD_RULES {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return *diagnosis;
        }
    }
    Diagnosis::GeneralBehaviour
}

impl Diagnosis {
    pub fn label(self) -> &'static str {
        match self {
            Diagnosis::SafetyRegulation => "Safety & Regulation",
            Diagnosis::RespectCooperation => "Respect & Cooperation",
            Diagnosis::EngagementFocus => "Engagement & Focus",
            Diagnosis::Organisation => "Organisation",
            Diagnosis::GeneralBehaviour => "General Behaviour",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Diagnosis::SafetyRegulation => "diag-saf",
            Diagnosis::RespectCooperation => "diag-def",
            Diagnosis::EngagementFocus => "diag-dis",
            Diagnosis::Organisation => "diag-org",
            Diagnosis::GeneralBehaviour => "diag-gen",
        }
    }

    pub fn suggested_focus(self) -> &'static str {
        match self {
            Diagnosis::RespectCooperation => "Defiance / Respect",
            Diagnosis::EngagementFocus => "Low-Level Disruption",
            Diagnosis::Organisation => "Equipment / Readiness",
            Diagnosis::SafetyRegulation => "Physical / Self-Regulation",
            Diagnosis::GeneralBehaviour => "General Conduct",
        }
    }

    pub fn strategies(self) -> &'static [&'static str] {
        match self {
            Diagnosis::SafetyRegulation => &[
                "Use a non-verbal signal to request a pause or break.",
                "Remove potential triggers (objects, peers).",
                "Offer two acceptable choices to regain control.",
                "Ensure all adults follow the protocol precisely: consistency is critical.",
            ],
            Diagnosis::RespectCooperation => &[
                "Avoid public confrontation; use corridor conversations.",
                "Give 'take up time' after instructions.",
                "Use 'Maybe... and...' language to de-escalate.",
                "Check for underlying unmet needs (hunger, tiredness).",
                "Positive phone call home for small wins.",
            ],
            Diagnosis::EngagementFocus => &[
                "Chunk tasks into 10-minute segments.",
                "Use non-verbal cues to redirect (tap on desk).",
                "Provide a fidget aid or movement break.",
                "Seat away from high-distraction peers.",
                "Use 'praise the prox' (praise students nearby).",
            ],
            Diagnosis::Organisation => &[
                "Visual timetable on desk.",
                "Equipment check at door (provide quietly if missing).",
                "Scaffold homework tasks clearly.",
                "Regular locker/planner checks.",
            ],
            Diagnosis::GeneralBehaviour => &[
                "Consistency with school policy.",
                "Build relationship through non-academic talk.",
                "Reinforce positive routines.",
            ],
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const SEN_PROVISIONS: &[(&str, &[&str])] = &[
    (
        "ASD",
        &[
            "Visual communication cards.",
            "Use specific, literal language.",
            "Provide a quiet cool-down space.",
        ],
    ),
    (
        "ADD",
        &[
            "Break tasks down into small steps.",
            "Use proximity praise.",
            "Allow movement breaks.",
        ],
    ),
    (
        "PMLD",
        &[
            "Sensory resources available.",
            "Use simple choice-making prompts.",
        ],
    ),
    (
        "K",
        &[
            "Pre-teach key vocabulary.",
            "Use dual coding (visuals + text).",
            "Check understanding: 'Tell me what you need to do'.",
        ],
    ),
];

const GENERIC_SEN_STRATEGIES: &[&str] = &[
    "Pre-teach key vocabulary.",
    "Use dual coding (visuals + text).",
    "Check understanding: 'Tell me what you need to do'.",
];

/// Strategy list for a SEN status code. "N" and "no special ..." statuses are
/// not SEN and get nothing; a status that indicates SEN but is not in the
/// provisions table falls back to the generic list.
pub fn sen_strategies(status: &str) -> Option<&'static [&'static str]> {
    let trimmed = status.trim();
    if trimmed.is_empty() || trimmed == "N" || trimmed.to_lowercase().contains("no special") {
        return None;
    }
    for (code, strategies) in SEN_PROVISIONS {
        if trimmed.eq_ignore_ascii_case(code) {
            return Some(strategies);
        }
    }
    Some(GENERIC_SEN_STRATEGIES)
}
