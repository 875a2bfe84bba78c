use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Destination for the finished manuscript. Written once per successful run.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn write(&self, content: &str) -> Result<()>;

    /// Human-readable location, used in the final console message.
    fn describe(&self) -> String;
}

pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl OutputSink for FileSink {
    async fn write(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("'{}'", self.path.display())
    }
}

/// Keeps every write in memory.
#[derive(Default)]
pub struct MemorySink {
    writes: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn write(&self, content: &str) -> Result<()> {
        self.writes
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink lock poisoned"))?
            .push(content.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_creates_parent_dirs() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("nested").join("book.txt");

        let sink = FileSink::new(&path);
        sink.write("Table of Contents\n\nChapter 1: Ünïcödé\n").await?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content, "Table of Contents\n\nChapter 1: Ünïcödé\n");
        assert!(sink.describe().contains("book.txt"));
        Ok(())
    }

    #[tokio::test]
    async fn test_file_sink_overwrites() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("book.txt");
        std::fs::write(&path, "old content that is longer")?;

        FileSink::new(&path).write("new").await?;
        assert_eq!(std::fs::read_to_string(&path)?, "new");
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_sink_records_writes() -> Result<()> {
        let sink = MemorySink::new();
        sink.write("one").await?;
        assert_eq!(sink.writes(), vec!["one".to_string()]);
        Ok(())
    }
}
