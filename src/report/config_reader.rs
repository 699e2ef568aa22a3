use crate::report::*;

use serde::{Deserialize, Serialize};

/// The names of the required columns. Missing entries keep their default name.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnNames {
    #[serde(rename = "documentId")]
    pub document_id: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub status: Option<String>,
    pub competency: Option<String>,
    #[serde(rename = "evaluationJudgment")]
    pub evaluation_judgment: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    #[serde(rename = "skipRows")]
    pub skip_rows: Option<usize>,
    #[serde(rename = "originalSheetName")]
    pub original_sheet_name: Option<String>,
    #[serde(rename = "pivotSheetName")]
    pub pivot_sheet_name: Option<String>,
    pub columns: Option<ColumnNames>,
    #[serde(rename = "acceptedJudgments")]
    pub accepted_judgments: Option<Vec<String>>,
    #[serde(rename = "inTrainingStatus")]
    pub in_training_status: Option<String>,
    #[serde(rename = "totalLabel")]
    pub total_label: Option<String>,
    #[serde(rename = "keyOrder")]
    _key_order: Option<String>,
}

impl ReportConfig {
    /// The schema, with the default values for everything that is not configured.
    pub fn schema(&self) -> ReportSchema {
        let default = ReportSchema::default();
        let cols = self.columns.clone().unwrap_or_default();
        ReportSchema {
            document_id: cols.document_id.unwrap_or(default.document_id),
            first_name: cols.first_name.unwrap_or(default.first_name),
            last_name: cols.last_name.unwrap_or(default.last_name),
            status: cols.status.unwrap_or(default.status),
            competency: cols.competency.unwrap_or(default.competency),
            evaluation_judgment: cols
                .evaluation_judgment
                .unwrap_or(default.evaluation_judgment),
            accepted_judgments: self
                .accepted_judgments
                .clone()
                .unwrap_or(default.accepted_judgments),
            in_training_status: self
                .in_training_status
                .clone()
                .unwrap_or(default.in_training_status),
            total_label: self.total_label.clone().unwrap_or(default.total_label),
        }
    }

    pub fn key_order(&self) -> ReportResult<Option<KeyOrder>> {
        match self._key_order.as_deref() {
            None => Ok(None),
            Some("firstSeen") => Ok(Some(KeyOrder::FirstSeen)),
            Some("sorted") => Ok(Some(KeyOrder::Sorted)),
            Some(x) => whatever!("unknown key order: {} (expected firstSeen or sorted)", x),
        }
    }
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}
