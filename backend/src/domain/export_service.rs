//! Export and import of the expense collection as a JSON document.
//!
//! The export is a pretty-printed JSON array of expenses; an import must be a
//! top-level array whose every element is a complete expense record.

use chrono::{Local, NaiveDate};
use shared::{Expense, ExportDocument};
use tracing::{info, warn};

use super::errors::{DomainError, DomainResult};

/// Export service that handles snapshot formatting and parsing
#[derive(Clone, Default)]
pub struct ExportService {}

impl ExportService {
    pub fn new() -> Self {
        Self {}
    }

    /// Build the downloadable document, named after today's date
    pub fn export(&self, expenses: &[Expense]) -> DomainResult<ExportDocument> {
        self.export_on(expenses, Local::now().date_naive())
    }

    pub fn export_on(&self, expenses: &[Expense], day: NaiveDate) -> DomainResult<ExportDocument> {
        let content = serde_json::to_string_pretty(expenses).map_err(anyhow::Error::from)?;
        let filename = format!("expenses-{}.json", day.format("%Y-%m-%d"));
        info!("📄 EXPORT: {} expenses as {}", expenses.len(), filename);
        Ok(ExportDocument { filename, content })
    }

    /// Parse an imported document; nothing is returned unless every element is valid
    pub fn parse(&self, document: &str) -> DomainResult<Vec<Expense>> {
        let value: serde_json::Value = serde_json::from_str(document).map_err(|e| {
            warn!("Import rejected, not JSON: {}", e);
            DomainError::InvalidImportFormat(format!("not valid JSON ({})", e))
        })?;

        let serde_json::Value::Array(items) = value else {
            warn!("Import rejected, top level is not an array");
            return Err(DomainError::InvalidImportFormat(
                "expected a JSON array of expenses".to_string(),
            ));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<Expense>(item).map_err(|e| {
                    DomainError::InvalidImportFormat(format!("record {}: {}", index, e))
                })
            })
            .collect()
    }
}
