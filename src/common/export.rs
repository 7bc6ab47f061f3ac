//! # Export Envelope
//!
//! Caller-side payload helpers for contract and template exports. The codec
//! itself treats payloads as opaque bytes; this module gives them a shape.
//!
//! Bundles are serialized to JSON and stored as UTF-8 bytes, so any text
//! (accents, currency symbols) survives the round trip.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator used by the comparison CSV.
pub const CSV_SEPARATOR: char = ';';

/// Column headers of the offer comparison export.
pub const COMPARISON_HEADERS: [&str; 5] = [
    "Nom de l'offre",
    "Cout Total (€)",
    "Delai Intervention (h)",
    "Score Materiel (/100)",
    "Ressenti (/100)",
];

/// What the bundle content holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Csv,
    Json,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// A named export ready to be hidden in an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub id: Uuid,
    pub name: String,
    pub kind: ExportKind,
    pub created_at: DateTime<Utc>,
    pub content: String,
}

impl ExportBundle {
    pub fn new(name: impl Into<String>, kind: ExportKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            created_at: Utc::now(),
            content: content.into(),
        }
    }

    /// Serialize to the bytes handed to the codec.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse bytes recovered by the codec.
    pub fn from_payload(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Suggested download name for the raw content, e.g. `offres.csv`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.kind.extension())
    }
}

/// One offer in a cost comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRow {
    pub name: String,
    pub total_cost: f64,
    pub intervention_delay_hours: f64,
    pub hardware_score: f64,
    pub feeling_score: f64,
}

/// Render comparison rows as `;`-separated CSV with a header line.
pub fn comparison_csv(rows: &[OfferRow]) -> String {
    let mut csv = csv_line(COMPARISON_HEADERS.iter().map(|h| h.to_string()));

    for row in rows {
        csv.push_str(&csv_line([
            row.name.clone(),
            row.total_cost.to_string(),
            row.intervention_delay_hours.to_string(),
            row.hardware_score.to_string(),
            row.feeling_score.to_string(),
        ]));
    }

    csv
}

/// Default download name of a comparison export made on `date`.
pub fn comparison_file_name(date: NaiveDate, extension: &str) -> String {
    format!("comparatif_offres_{}.{}", date.format("%Y-%m-%d"), extension)
}

fn csv_line<I>(fields: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let separator = CSV_SEPARATOR.to_string();
    let mut line = fields
        .into_iter()
        .map(|field| escape_field(&field))
        .collect::<Vec<_>>()
        .join(separator.as_str());
    line.push('\n');
    line
}

fn escape_field(field: &str) -> String {
    if field.contains([CSV_SEPARATOR, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
