use crate::config::{Config, SheetBackendKind};
use crate::directory::Directory;
use crate::error::{ImmoError, Result};
use crate::io;
use crate::paths;
use crate::record::DirectoryRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// SheetBackend
// ---------------------------------------------------------------------------

/// Whole-table access to the directory's storage. There are no partial
/// updates: every mutation reads the full table and writes it back in full,
/// so concurrent writers are last-write-wins.
pub trait SheetBackend: Send {
    fn read_all(&self) -> Result<Vec<DirectoryRecord>>;
    fn write_all(&self, records: &[DirectoryRecord]) -> Result<()>;
}

/// Build the backend selected in config. The remote backend resolves its
/// bearer token from the configured env var at construction time.
pub fn backend_from_config(root: &Path, config: &Config) -> Result<Box<dyn SheetBackend>> {
    match config.sheet.backend {
        SheetBackendKind::File => Ok(Box::new(FileSheet::new(paths::mirror_path(root)))),
        SheetBackendKind::Remote => {
            let token = Config::secret(&config.sheet.token_env)?;
            let sheet = RemoteSheet::new(
                &config.sheet.url,
                &config.sheet.tab,
                token,
                Duration::from_secs(config.sheet.timeout_seconds),
            )?;
            Ok(Box::new(sheet))
        }
    }
}

// ---------------------------------------------------------------------------
// FileSheet
// ---------------------------------------------------------------------------

/// YAML mirror of the directory on local disk. A missing file reads as an
/// empty table, so a fresh workspace starts blank without special-casing.
pub struct FileSheet {
    path: PathBuf,
}

impl FileSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SheetBackend for FileSheet {
    fn read_all(&self) -> Result<Vec<DirectoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        let dir: Directory = serde_yaml::from_str(&data)?;
        Ok(dir.records)
    }

    fn write_all(&self, records: &[DirectoryRecord]) -> Result<()> {
        let dir = Directory::new(records.to_vec());
        let data = serde_yaml::to_string(&dir)?;
        io::atomic_write(&self.path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// RemoteSheet
// ---------------------------------------------------------------------------

/// Wire shape of the values-style sheet API: a tab is a grid of string
/// cells, one request per whole tab.
#[derive(Debug, Serialize, Deserialize, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

pub struct RemoteSheet {
    client: reqwest::blocking::Client,
    base_url: String,
    tab: String,
    token: String,
}

impl RemoteSheet {
    pub fn new(
        base_url: &str,
        tab: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tab: tab.to_string(),
            token: token.into(),
        })
    }

    fn tab_url(&self) -> String {
        format!("{}/values/{}", self.base_url, self.tab)
    }
}

impl SheetBackend for RemoteSheet {
    fn read_all(&self) -> Result<Vec<DirectoryRecord>> {
        let response = self
            .client
            .get(self.tab_url())
            .bearer_auth(&self.token)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImmoError::SheetUnavailable(format!(
                "GET {} returned {}",
                self.tab_url(),
                status
            )));
        }

        let range: ValueRange = response.json()?;
        Ok(range
            .values
            .iter()
            .map(|row| DirectoryRecord::from_row(row))
            .collect())
    }

    fn write_all(&self, records: &[DirectoryRecord]) -> Result<()> {
        let range = ValueRange {
            values: records.iter().map(DirectoryRecord::to_row).collect(),
        };
        let response = self
            .client
            .put(self.tab_url())
            .bearer_auth(&self.token)
            .json(&range)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ImmoError::SheetWriteRejected(format!("{status}: {body}")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::UnitKey;
    use tempfile::TempDir;

    fn sample() -> Vec<DirectoryRecord> {
        vec![
            DirectoryRecord::new(UnitKey::new("Canterane", Some("A".to_string()), "10"), "Jean"),
            DirectoryRecord::new(UnitKey::new("Les Glycines", None, "3"), ""),
        ]
    }

    #[test]
    fn file_sheet_round_trip() {
        let dir = TempDir::new().unwrap();
        let sheet = FileSheet::new(dir.path().join("directory.yaml"));

        sheet.write_all(&sample()).unwrap();
        let back = sheet.read_all().unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn file_sheet_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let sheet = FileSheet::new(dir.path().join("nope.yaml"));
        assert!(sheet.read_all().unwrap().is_empty());
    }

    #[test]
    fn remote_sheet_reads_rows() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/values/Directory")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(r#"{"values":[["Canterane","A","10","Jean"],["Les Glycines","","3",""]]}"#)
            .create();

        let sheet = RemoteSheet::new(
            &server.url(),
            "Directory",
            "tok",
            Duration::from_secs(5),
        )
        .unwrap();
        let records = sheet.read_all().unwrap();
        mock.assert();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].occupant, "Jean");
        assert_eq!(records[1].key.building, None);
    }

    #[test]
    fn remote_sheet_writes_whole_table() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/values/Directory")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "values": [
                    ["Canterane", "A", "10", "Jean"],
                    ["Les Glycines", "", "3", ""]
                ]
            })))
            .with_status(200)
            .with_body("{}")
            .create();

        let sheet = RemoteSheet::new(
            &server.url(),
            "Directory",
            "tok",
            Duration::from_secs(5),
        )
        .unwrap();
        sheet.write_all(&sample()).unwrap();
        mock.assert();
    }

    #[test]
    fn remote_sheet_error_status_is_unavailable() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/values/Directory")
            .with_status(503)
            .create();

        let sheet = RemoteSheet::new(
            &server.url(),
            "Directory",
            "tok",
            Duration::from_secs(5),
        )
        .unwrap();
        let err = sheet.read_all().unwrap_err();
        assert!(err.is_connectivity());
    }

    #[test]
    fn remote_sheet_rejected_write_surfaces_body() {
        let mut server = mockito::Server::new();
        server
            .mock("PUT", "/values/Directory")
            .with_status(403)
            .with_body("tab is protected")
            .create();

        let sheet = RemoteSheet::new(
            &server.url(),
            "Directory",
            "tok",
            Duration::from_secs(5),
        )
        .unwrap();
        let err = sheet.write_all(&sample()).unwrap_err();
        assert!(matches!(err, ImmoError::SheetWriteRejected(_)));
        assert!(err.to_string().contains("tab is protected"));
    }
}
