use crate::utils::error::Result;

/// A single field of an exhibitor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(Option<String>),
    List(Vec<Option<String>>),
}

impl FieldValue {
    pub fn empty() -> Self {
        Self::Scalar(None)
    }

    /// Number of sheet rows the value occupies (at least one).
    pub fn height(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(items) => items.len().max(1),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(Some(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Some(value.to_string()))
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<String>>> for FieldValue {
    fn from(values: Vec<Option<String>>) -> Self {
        Self::List(values)
    }
}

/// One exhibitor, aligned position by position with its source's header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub values: Vec<FieldValue>,
}

impl Record {
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn height(&self) -> usize {
        self.values.iter().map(FieldValue::height).max().unwrap_or(1)
    }
}

/// Outcome of one source run: what was scraped and what went wrong on the way.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub source_name: String,
    pub header: Vec<String>,
    pub records: Vec<Record>,
    pub failures: Vec<String>,
}

impl Harvest {
    pub fn new(source_name: &str, header: &[&str]) -> Self {
        Self {
            source_name: source_name.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Adds per-exhibitor outcomes: records with the side requests that
    /// failed while building them, and exhibitors that could not be built.
    pub fn collect(&mut self, outcomes: Vec<Result<RecordOutcome>>) {
        for outcome in outcomes {
            match outcome {
                Ok(outcome) => {
                    self.records.push(outcome.record);
                    self.failures.extend(outcome.failures);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Request failed: {}", e);
                    self.failures.push(e.to_string());
                }
            }
        }
    }
}

/// A record plus the failures of the optional requests behind it (detail
/// pages, exhibitor websites). The record is kept with those fields empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    pub record: Record,
    pub failures: Vec<String>,
}

impl RecordOutcome {
    pub fn new(record: Record, failures: Vec<String>) -> Self {
        Self { record, failures }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutCell {
    pub row: u32,
    pub col: u16,
    pub value: String,
    pub kind: CellKind,
}

/// Flattened worksheet, header at row 0.
#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub header: Vec<String>,
    pub cells: Vec<LayoutCell>,
    pub record_count: usize,
}

impl SheetLayout {
    pub fn cell(&self, row: u32, col: u16) -> Option<&LayoutCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn last_row(&self) -> u32 {
        self.cells.iter().map(|c| c.row).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ScrapeError;

    #[test]
    fn test_collect_keeps_side_failures() {
        let mut harvest = Harvest::new("fair", &["Name"]);
        harvest.collect(vec![
            Ok(RecordOutcome::new(
                Record::new(vec!["Acme".into()]),
                vec!["website down".to_string()],
            )),
            Err(ScrapeError::HttpStatus {
                url: "https://fair.test/exhibitors/2".to_string(),
                status: 500,
            }),
            Ok(RecordOutcome::new(Record::new(vec!["Beta".into()]), Vec::new())),
        ]);

        assert_eq!(harvest.records.len(), 2);
        assert_eq!(harvest.failures.len(), 2);
        assert_eq!(harvest.failures[0], "website down");
        assert!(harvest.failures[1].contains("500"));
        assert!(harvest.is_partial());
    }
}
