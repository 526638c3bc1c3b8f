//! Upload pipeline: decode, validate layout, normalize row by row, resolve
//! symbols, and account for every input row.

use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::borrow::Cow;
use thiserror::Error;

use crate::brokers::Broker;
use crate::enhancer::SymbolResolver;
use crate::trades::{PipelineResult, RawRow, RowError};

/// Errors that fail a whole upload. Per-row problems never surface here;
/// they land in [`PipelineResult::errors`] instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("unsupported broker '{0}'")]
    UnsupportedBroker(String),

    #[error("file contains no data rows")]
    EmptyFile,

    #[error("header does not match the {broker} layout: missing {missing:?} (found {fieldnames:?})")]
    UnrecognizedLayout {
        broker: Broker,
        fieldnames: Vec<String>,
        missing: Vec<String>,
    },

    #[error("could not read CSV: {0}")]
    Csv(String),
}

/// Runs broker CSV uploads through the normalization pipeline.
///
/// The service is stateless across uploads; each call builds a fresh
/// [`PipelineResult`].
pub struct ImportService {
    resolver: SymbolResolver,
}

impl ImportService {
    pub fn new(resolver: SymbolResolver) -> Self {
        Self { resolver }
    }

    /// Processes an upload dated today. See [`Self::process_as_of`].
    pub async fn process(
        &self,
        content: &[u8],
        broker: &Broker,
    ) -> Result<PipelineResult, ImportError> {
        self.process_as_of(content, broker, Local::now().date_naive())
            .await
    }

    /// Processes one uploaded CSV file.
    ///
    /// `processing_date` anchors layouts with an optional date column and is
    /// injected so results are reproducible. Every data row ends up either
    /// in `trades` or in `errors`; nothing is dropped silently.
    pub async fn process_as_of(
        &self,
        content: &[u8],
        broker: &Broker,
        processing_date: NaiveDate,
    ) -> Result<PipelineResult, ImportError> {
        let decoded = String::from_utf8_lossy(content);
        if matches!(decoded, Cow::Owned(_)) {
            warn!("upload contained invalid UTF-8, bad sequences replaced");
        }
        let content = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);
        if content.trim().is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ImportError::Csv(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let missing: Vec<String> = broker
            .required_columns()
            .iter()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::UnrecognizedLayout {
                broker: *broker,
                fieldnames: headers,
                missing,
            });
        }

        let mut trades = Vec::new();
        let mut errors = Vec::new();
        let mut enhanced_count = 0;

        for (row_index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    errors.push(RowError {
                        row_index,
                        raw_row: RawRow::new(),
                        reason: format!("malformed CSV record: {}", e),
                    });
                    continue;
                }
            };

            let row = RawRow::from_pairs(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.clone(), v.to_string())),
            );

            match broker.parse_row(&row, row_index, processing_date) {
                Ok(mut trade) => {
                    let resolution = self
                        .resolver
                        .resolve(broker, &trade.symbol, trade.description.as_deref())
                        .await;
                    if resolution.enhanced {
                        trade.symbol = resolution.symbol;
                        enhanced_count += 1;
                    }
                    trades.push(trade);
                }
                Err(reason) => {
                    debug!("row {}: {}", row_index, reason);
                    errors.push(RowError {
                        row_index,
                        raw_row: row,
                        reason: reason.to_string(),
                    });
                }
            }
        }

        let total_rows = trades.len() + errors.len();
        if total_rows == 0 {
            return Err(ImportError::EmptyFile);
        }

        info!(
            "processed {} upload: {} rows, {} trades, {} errors, {} enhanced",
            broker,
            total_rows,
            trades.len(),
            errors.len(),
            enhanced_count
        );

        Ok(PipelineResult {
            broker: *broker,
            total_rows,
            trades,
            errors,
            enhanced_count,
        })
    }
}
