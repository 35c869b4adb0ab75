//! Where submission rows end up.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::SheetsError;

/// A spreadsheet tab with a header row followed by data rows.
#[async_trait]
pub trait SheetSink: Send + Sync {
    /// Append one row after the last non-empty row.
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError>;

    /// Overwrite row 1.
    async fn write_headers(&self, headers: &[String]) -> Result<(), SheetsError>;

    /// Row 1, or nothing if the tab is empty.
    async fn read_headers(&self) -> Result<Vec<String>, SheetsError>;

    /// Every row of the tab, header row included.
    async fn read_rows(&self) -> Result<Vec<Vec<String>>, SheetsError>;
}

/// An in-process sheet.
///
/// Can be switched to failing so callers can observe that a failed append
/// leaves the sheet untouched.
#[derive(Debug, Default)]
pub struct MemorySheet {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    failure: Option<String>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sheet whose row 1 already holds `headers`.
    pub fn with_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: Mutex::new(MemoryState {
                headers: headers.into_iter().map(Into::into).collect(),
                ..MemoryState::default()
            }),
        }
    }

    /// Make every following operation fail with `message`.
    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().await.failure = Some(message.into());
    }

    /// Let operations succeed again.
    pub async fn recover(&self) {
        self.state.lock().await.failure = None;
    }

    /// Data rows, header excluded.
    pub async fn data_rows(&self) -> Vec<Vec<String>> {
        self.state.lock().await.rows.clone()
    }

    async fn lock(&self) -> Result<tokio::sync::MutexGuard<'_, MemoryState>, SheetsError> {
        let state = self.state.lock().await;
        match &state.failure {
            Some(message) => Err(SheetsError::Unavailable(message.clone())),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl SheetSink for MemorySheet {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        self.lock().await?.rows.push(row);
        Ok(())
    }

    async fn write_headers(&self, headers: &[String]) -> Result<(), SheetsError> {
        self.lock().await?.headers = headers.to_vec();
        Ok(())
    }

    async fn read_headers(&self) -> Result<Vec<String>, SheetsError> {
        Ok(self.lock().await?.headers.clone())
    }

    async fn read_rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let state = self.lock().await?;
        let header = (!state.headers.is_empty()).then(|| state.headers.clone());
        Ok(header
            .into_iter()
            .chain(state.rows.iter().cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rows_follow_header() {
        let sheet = MemorySheet::with_headers(["timestamp", "ip_address"]);
        sheet
            .append_row(vec!["t".into(), "203.0.113.5".into()])
            .await
            .unwrap();

        let rows = sheet.read_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ["timestamp", "ip_address"]);
        assert_eq!(sheet.data_rows().await, [["t", "203.0.113.5"]]);
    }

    #[tokio::test]
    async fn failing_sheet_rejects_append() {
        let sheet = MemorySheet::new();
        sheet.fail_with("quota exceeded").await;

        let err = sheet.append_row(vec!["x".into()]).await.unwrap_err();
        assert_eq!(err.to_string(), "Sheet is unavailable: quota exceeded");

        sheet.recover().await;
        assert!(sheet.data_rows().await.is_empty());
        assert!(sheet.read_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_headers_replaces_row_one() {
        let sheet = MemorySheet::with_headers(["old"]);
        sheet
            .write_headers(&["timestamp".to_string(), "ip_address".to_string()])
            .await
            .unwrap();
        assert_eq!(
            sheet.read_headers().await.unwrap(),
            ["timestamp", "ip_address"]
        );
    }
}
