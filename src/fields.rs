#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    pub fn as_text(&self) -> String {
        match self {
            Value::Text(s) => s.trim().to_string(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

/// A single CSV row as (column name, value) pairs in header order. Absent or
/// empty cells carry no entry at all. Column order is preserved so that when
/// two headers match the same candidate key case-insensitively, the earlier
/// column wins deterministically.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    columns: Vec<(String, Value)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.columns.push((key.into(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn resolve(&self, candidates: &[&str]) -> Option<&Value> {
        for candidate in candidates {
            let hit = self
                .columns
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(candidate));
            if let Some((_, value)) = hit {
                return Some(value);
            }
        }
        None
    }

    pub fn resolve_text(&self, candidates: &[&str]) -> Option<String> {
        self.resolve(candidates).map(Value::as_text)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        RawRow {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn resolves_case_insensitively() {
        let row: RawRow = [("WhenDate", text("15-03-2024"))].into_iter().collect();
        let value = row.resolve(&["whenDate", "date"]);
        assert_eq!(value, Some(&text("15-03-2024")));
    }

    #[test]
    fn candidate_order_wins_over_row_order() {
        let row: RawRow = [("createdDate", text("old")), ("date", text("new"))]
            .into_iter()
            .collect();
        let value = row.resolve(&["whenDate", "date", "createdDate"]).unwrap();
        assert_eq!(value.as_text(), "new");
    }

    #[test]
    fn missing_candidates_resolve_to_none() {
        let row: RawRow = [("subject", text("Maths"))].into_iter().collect();
        assert!(row.resolve(&["whenDate", "date"]).is_none());
    }

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(Value::Number(7.0).as_text(), "7");
        assert_eq!(Value::Number(7.5).as_text(), "7.5");
    }
}
