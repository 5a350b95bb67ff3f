const INITIALS_ROSTER: &[(&str, &str)] = &[
    ("B JASTRZAB", "BJA"),
    ("L DOORLY", "LDO"),
    ("G BRIODY", "GBR"),
    ("I ABSHIR", "IAB"),
    ("T SLAVOVA", "TSL"),
    ("E GALGEY", "EGA"),
    ("K KING", "KKI"),
    ("J NEVILLE", "JNE"),
    ("E OFORI", "EOF"),
    ("A CONWAY", "ACO"),
    ("K KRENC", "KKR"),
    ("U KAYA", "UKA"),
    ("Y ABBEY-ATTRAM", "YAB"),
    ("C MAURIS-BLANC", "CMA"),
    ("C EMELE", "CEM"),
    ("S KISTEN", "SKI"),
    ("E BUDE", "EBU"),
    ("E TOPRAK", "ETO"),
    ("L TOWLER", "LTO"),
    ("A SACKS", "ASA"),
    ("S KARA", "SKA"),
];

const SLT_LEADS: &[(&str, &str)] = &[
    ("7", "GBR"),
    ("8", "EGA"),
    ("9", "EGA"),
    ("10", "CMA"),
    ("11", "SKI"),
    ("12", "CMA"),
    ("13", "CMA"),
];

const HOY_LEADS: &[(&str, &str)] = &[
    ("7", "BJA"),
    ("8", "EGA"),
    ("9", "GBR"),
    ("10", "UKA"),
    ("11", "SKI"),
    ("12", "CMA"),
    ("13", "CMA"),
];

/// Three-letter staff initials for a teacher string. Roster substring match
/// first, then first letter of the first name plus two of the surname, then
/// the first three characters of the raw string.
pub fn initials(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "--".to_string();
    }
    let upper = trimmed.to_uppercase();
    for (full_name, code) in INITIALS_ROSTER {
        if upper.contains(full_name) {
            return (*code).to_string();
        }
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() >= 2 {
        let first: String = parts[0].chars().take(1).collect();
        let last: String = parts[1].chars().take(2).collect();
        return format!("{first}{last}").to_uppercase();
    }
    trimmed.chars().take(3).collect::<String>().to_uppercase()
}

pub fn slt_lead(year: &str) -> Option<&'static str> {
    SLT_LEADS.iter().find(|(y, _)| *y == year).map(|(_, c)| *c)
}

pub fn hoy_lead(year: &str) -> Option<&'static str> {
    HOY_LEADS.iter().find(|(y, _)| *y == year).map(|(_, c)| *c)
}
