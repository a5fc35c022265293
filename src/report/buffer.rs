use serde_json::{Map, Value};

/// One row of progress data: column name to value.
pub type ReportRow = Map<String, Value>;

/// Append-only progress data accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportBuffer {
    rows: Vec<ReportRow>,
}

impl ReportBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = ReportRow>) {
        self.rows.extend(rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// The last `n` rows together with the buffer position of the first one.
    pub fn tail(&self, n: usize) -> (usize, &[ReportRow]) {
        let start = self.rows.len().saturating_sub(n);
        (start, &self.rows[start..])
    }
}

/// Column names in first-seen order across `rows`.
pub fn columns(rows: &[ReportRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|existing| existing == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Parse a JSON object or array of objects into rows.
pub fn parse_rows(raw: &str) -> Result<Vec<ReportRow>, serde_json::Error> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value::<ReportRow>)
            .collect(),
        other => Ok(vec![serde_json::from_value::<ReportRow>(other)?]),
    }
}
