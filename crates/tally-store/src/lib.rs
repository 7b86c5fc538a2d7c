//! JSON data file storage for tally
//!
//! The whole data set (users, their settings and transactions) lives in a
//! single JSON object keyed by user name. Stores load and write it whole.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod error;
pub mod types;

pub use error::StoreError;
pub use types::{TallyData, TransactionRecord, TransactionType, UserRecord};

/// Store reference type
pub type StoreRef = Arc<dyn DataStore>;

/// Trait for data stores
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Read the full data set
    async fn load(&self) -> Result<TallyData, StoreError>;

    /// Replace the full data set
    async fn save(&self, data: &TallyData) -> Result<(), StoreError>;

    /// Human-readable location for log messages
    fn describe(&self) -> String;
}

/// Parse data from JSON text
pub fn parse_data(content: &str) -> Result<TallyData, StoreError> {
    Ok(serde_json::from_str(content)?)
}

/// Validate an uploaded replacement data file
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<TallyData, StoreError> {
    if !file_name.ends_with(".json") {
        return Err(StoreError::InvalidFileType {
            name: file_name.to_string(),
        });
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Data set created on first start: the administrator only
pub fn seed_data(admin: &str) -> TallyData {
    let mut data = TallyData::new();
    data.insert(admin.to_string(), UserRecord::default());
    data
}

// ==================== JSON File Store ====================

/// Store backed by one JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the file with seed data when it does not exist yet
    pub async fn ensure_exists(&self, admin: &str) -> Result<bool, StoreError> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        log::info!("Creating data file {} for {}", self.path.display(), admin);
        self.save(&seed_data(admin)).await?;
        Ok(true)
    }
}

#[async_trait]
impl DataStore for JsonFileStore {
    async fn load(&self) -> Result<TallyData, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.display().to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        parse_data(&content)
    }

    async fn save(&self, data: &TallyData) -> Result<(), StoreError> {
        let content = serde_json::to_string(data)?;
        // Write beside the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        log::debug!("Wrote {} users to {}", data.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ==================== Memory Store ====================

/// Store that keeps the data set in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<TallyData>,
}

impl MemoryStore {
    pub fn new(data: TallyData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn load(&self) -> Result<TallyData, StoreError> {
        Ok(self.data.lock().await.clone())
    }

    async fn save(&self, data: &TallyData) -> Result<(), StoreError> {
        *self.data.lock().await = data.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
