//! Persistence of completed reviews.
//!
//! One record per analysis. List fields are stored newline-joined, so a
//! record is a flat row that any tabular dump can show as-is.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detect::AnalysisResult;
use crate::error::{Result, ReviewError};

/// A review about to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub code: String,
    pub language: String,
    pub suggestions: String,
    pub warnings: String,
    pub optimizations: String,
    pub score: i32,
    pub remark: String,
}

impl NewReview {
    pub fn from_result(code: &str, language: &str, result: &AnalysisResult) -> Self {
        Self {
            code: code.to_string(),
            language: language.to_string(),
            suggestions: result.suggestions.join("\n"),
            warnings: result.warnings.join("\n"),
            optimizations: result.optimizations.join("\n"),
            score: result.score,
            remark: result.remark.to_string(),
        }
    }
}

/// A saved review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: u64,
    pub code: String,
    pub language: String,
    pub suggestions: String,
    pub warnings: String,
    pub optimizations: String,
    pub score: i32,
    pub remark: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    fn new(id: u64, review: NewReview) -> Self {
        Self {
            id,
            code: review.code,
            language: review.language,
            suggestions: review.suggestions,
            warnings: review.warnings,
            optimizations: review.optimizations,
            score: review.score,
            remark: review.remark,
            created_at: Utc::now(),
        }
    }
}

pub trait ReviewStore: Send + Sync {
    /// Persist a review and return it with its id and timestamp.
    fn save(&self, review: NewReview) -> Result<ReviewRecord>;

    /// Every saved review, oldest first.
    fn list(&self) -> Result<Vec<ReviewRecord>>;
}

/// Reviews appended to a JSON-lines file.
///
/// The last id is read from the file once, on the first save, and tracked
/// in memory afterwards. Only one process should append to a file at a time.
pub struct JsonlStore {
    path: PathBuf,
    // Also serializes appends from parallel reviews within one process.
    last_id: Mutex<Option<u64>>,
}

/// Just the id of a stored record.
#[derive(Deserialize)]
struct StoredId {
    id: u64,
}

impl JsonlStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            last_id: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn malformed(&self, idx: usize, err: serde_json::Error) -> ReviewError {
        ReviewError::Store(format!(
            "{}:{}: malformed record: {}",
            self.path.display(),
            idx + 1,
            err
        ))
    }

    /// Non-blank lines with their 0-indexed line numbers, or none if the
    /// file does not exist yet.
    fn lines(&self) -> Result<Vec<(usize, String)>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut lines = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if !line.trim().is_empty() {
                lines.push((idx, line));
            }
        }
        Ok(lines)
    }

    fn read_all(&self) -> Result<Vec<ReviewRecord>> {
        self.lines()?
            .into_iter()
            .map(|(idx, line)| serde_json::from_str(&line).map_err(|e| self.malformed(idx, e)))
            .collect()
    }

    /// Id of the final record in the file, 0 when there is none.
    fn read_last_id(&self) -> Result<u64> {
        let Some((idx, line)) = self.lines()?.pop() else {
            return Ok(0);
        };
        let stored: StoredId = serde_json::from_str(&line).map_err(|e| self.malformed(idx, e))?;
        Ok(stored.id)
    }
}

impl ReviewStore for JsonlStore {
    fn save(&self, review: NewReview) -> Result<ReviewRecord> {
        let mut last_id = self
            .last_id
            .lock()
            .map_err(|_| ReviewError::Store("store lock poisoned".to_string()))?;

        let previous = match *last_id {
            Some(id) => id,
            None => self.read_last_id()?,
        };
        let record = ReviewRecord::new(previous + 1, review);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        *last_id = Some(record.id);

        tracing::debug!(id = record.id, path = %self.path.display(), "review saved");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<ReviewRecord>> {
        self.read_all()
    }
}

/// Reviews held in memory for the life of the process.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ReviewRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewStore for MemoryStore {
    fn save(&self, review: NewReview) -> Result<ReviewRecord> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| ReviewError::Store("store lock poisoned".to_string()))?;
        let record = ReviewRecord::new(records.len() as u64 + 1, review);
        records.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<ReviewRecord>> {
        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|_| ReviewError::Store("store lock poisoned".to_string()))
    }
}
