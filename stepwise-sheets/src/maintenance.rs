//! Sheet upkeep: rewriting the header row and checking the pipeline end to end.

use chrono::Utc;
use stepwise::{QuestionKind, Responses, SubmitError, Survey};

use crate::{Receipt, SheetLayout, SheetSink, SheetsError, SubmissionService, TIMESTAMP};

/// Overwrite row 1 with the layout's headers.
pub async fn sync_headers(sink: &dyn SheetSink, layout: &SheetLayout) -> Result<(), SheetsError> {
    sink.write_headers(layout.headers()).await?;
    tracing::info!(columns = layout.width(), "Wrote sheet headers");
    Ok(())
}

/// A complete, valid answer set: the first option of every choice, `2` for
/// numbers and `n/a` for free text.
pub fn sample_answers(survey: &Survey) -> Responses {
    survey
        .sequence()
        .steps()
        .iter()
        .map(|step| {
            let value = match (step.kind(), step.options()) {
                (QuestionKind::Number, _) => "2".to_string(),
                (_, Some([first, ..])) => first.clone(),
                _ => "n/a".to_string(),
            };
            (step.id().clone(), value)
        })
        .collect()
}

/// Outcome of a successful [`verify`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub receipt: Receipt,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Sheet is missing headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error("Submission failed: {0}")]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Sheet(#[from] SheetsError),

    #[error("Row count did not increase (still {0})")]
    NotAppended(usize),

    #[error("Column '{column}' holds {actual:?}, expected {expected:?}")]
    Mismatch {
        column: String,
        expected: String,
        actual: String,
    },
}

/// Submit [`sample_answers`] through `service` and read the row back.
///
/// Checks that row 1 carries every expected header, that the row count grew
/// and that the last row matches what was written. The timestamp column is
/// not compared, as the sheet may reformat it.
pub async fn verify(
    service: &SubmissionService,
    survey: &Survey,
) -> Result<VerifyReport, VerifyError> {
    let sink = service
        .sink()
        .map_err(|err| SubmitError::Configuration {
            detail: err.to_string(),
        })?
        .clone();
    let layout = service.layout();

    let present = sink.read_headers().await?;
    let missing: Vec<String> = layout
        .headers()
        .iter()
        .filter(|header| !present.contains(header))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(VerifyError::MissingHeaders(missing));
    }
    tracing::info!(columns = present.len(), "Headers match");

    let rows_before = sink.read_rows().await?.len();

    let ip = format!("10.0.0.{}", Utc::now().timestamp_subsec_millis() % 255);
    let receipt = service
        .submit(&sample_answers(survey).to_json(), Some(&ip))
        .await?;

    let rows = sink.read_rows().await?;
    let rows_after = rows.len();
    if rows_after <= rows_before {
        return Err(VerifyError::NotAppended(rows_after));
    }

    let last = rows.last().cloned().unwrap_or_default();
    for (column, (header, expected)) in layout.headers().iter().zip(&receipt.row).enumerate() {
        if header == TIMESTAMP {
            continue;
        }
        // Trailing empty cells are not returned by the sheet.
        let actual = last.get(column).map(String::as_str).unwrap_or("");
        if actual != expected {
            return Err(VerifyError::Mismatch {
                column: header.clone(),
                expected: expected.clone(),
                actual: actual.to_string(),
            });
        }
    }

    tracing::info!(rows_before, rows_after, ip = %receipt.ip_address, "Verified submission");
    Ok(VerifyReport {
        rows_before,
        rows_after,
        receipt,
    })
}
