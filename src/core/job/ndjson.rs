//! NDJSON export files, one per resource type

use crate::domain::{MeridianError, OperationOutcome, Resource, ResourceType, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Writes `<dir>/<Type>.ndjson` files
///
/// Files are created (truncated) on first write. In dry-run mode nothing is
/// touched on disk.
pub struct NdjsonWriter {
    dir: PathBuf,
    dry_run: bool,
    files: HashMap<ResourceType, BufWriter<File>>,
}

impl NdjsonWriter {
    pub fn new(dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            dir: dir.into(),
            dry_run,
            files: HashMap::new(),
        }
    }

    /// Path of the file holding `resource_type`
    pub fn path_for(&self, resource_type: ResourceType) -> PathBuf {
        file_path(&self.dir, resource_type)
    }

    pub async fn write_resources(
        &mut self,
        resource_type: ResourceType,
        resources: &[Resource],
    ) -> Result<()> {
        for resource in resources {
            let line = serde_json::to_string(resource)?;
            self.write_line(resource_type, &line).await?;
        }
        Ok(())
    }

    pub async fn write_outcome(&mut self, outcome: &OperationOutcome) -> Result<()> {
        let line = serde_json::to_string(outcome)?;
        self.write_line(ResourceType::OperationOutcome, &line).await
    }

    /// Flushes every open file
    pub async fn finish(mut self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (resource_type, mut file) in self.files.drain() {
            file.flush().await?;
            written.push(file_path(&self.dir, resource_type));
        }
        written.sort();
        Ok(written)
    }

    async fn write_line(&mut self, resource_type: ResourceType, line: &str) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }

        if !self.files.contains_key(&resource_type) {
            tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
                MeridianError::Io(format!(
                    "Failed to create output directory {}: {e}",
                    self.dir.display()
                ))
            })?;
            let path = file_path(&self.dir, resource_type);
            let file = File::create(&path).await.map_err(|e| {
                MeridianError::Io(format!("Failed to create {}: {e}", path.display()))
            })?;
            self.files.insert(resource_type, BufWriter::new(file));
        }

        if let Some(file) = self.files.get_mut(&resource_type) {
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }
        Ok(())
    }
}

fn file_path(dir: &Path, resource_type: ResourceType) -> PathBuf {
    dir.join(format!("{}.ndjson", resource_type.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IssueSeverity, IssueType};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_one_line_per_resource() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("export");
        let mut writer = NdjsonWriter::new(&out, false);

        writer
            .write_resources(
                ResourceType::Coverage,
                &[
                    Resource::new(json!({"resourceType": "Coverage", "id": "a"})),
                    Resource::new(json!({"resourceType": "Coverage", "id": "b"})),
                ],
            )
            .await
            .unwrap();
        writer
            .write_outcome(&OperationOutcome::single(
                IssueSeverity::Error,
                IssueType::Exception,
                "Internal error: x",
                vec![],
            ))
            .await
            .unwrap();

        let written = writer.finish().await.unwrap();
        assert_eq!(
            written,
            vec![
                out.join("Coverage.ndjson"),
                out.join("OperationOutcome.ndjson")
            ]
        );

        let coverage = std::fs::read_to_string(out.join("Coverage.ndjson")).unwrap();
        let ids: Vec<String> = coverage
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["id"].to_string())
            .collect();
        assert_eq!(ids, vec!["\"a\"", "\"b\""]);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("export");
        let mut writer = NdjsonWriter::new(&out, true);

        writer
            .write_resources(
                ResourceType::Patient,
                &[Resource::new(json!({"resourceType": "Patient"}))],
            )
            .await
            .unwrap();

        assert!(writer.finish().await.unwrap().is_empty());
        assert!(!out.exists());
    }
}
