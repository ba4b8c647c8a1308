//! In-memory project store, optionally mirrored to JSON files

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use shared::{MeasurementSnapshot, ProjectId, ProjectSummary, SNAPSHOT_VERSION};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("project {0} not found")]
    NotFound(ProjectId),
    #[error("snapshot version {0} is not supported")]
    UnsupportedVersion(u32),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Project {
    id: ProjectId,
    name: String,
    snapshot: MeasurementSnapshot,
}

impl Project {
    fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            measurement_count: self.snapshot.measurements.len(),
        }
    }
}

#[derive(Clone, Default)]
pub struct ProjectStore {
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
    /// Directory holding one `<id>.json` per project
    data_dir: Option<PathBuf>,
}

impl ProjectStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store backed by `dir`; projects already there are loaded
    pub async fn with_data_dir(dir: PathBuf) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(&dir).await?;
        let mut projects = HashMap::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<Project>(&bytes) {
                Ok(project) => {
                    projects.insert(project.id.clone(), project);
                }
                Err(e) => tracing::warn!("Skipping unreadable project {}: {}", path.display(), e),
            }
        }
        tracing::info!("Loaded {} project(s) from {}", projects.len(), dir.display());
        Ok(Self {
            projects: Arc::new(RwLock::new(projects)),
            data_dir: Some(dir),
        })
    }

    pub async fn list(&self) -> Vec<ProjectSummary> {
        let projects = self.projects.read().await;
        let mut list: Vec<_> = projects.values().map(Project::summary).collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        list
    }

    pub async fn create(&self, name: Option<String>) -> Result<ProjectSummary, StorageError> {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());
        let project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            snapshot: MeasurementSnapshot::default(),
        };
        self.persist(&project).await?;
        let summary = project.summary();
        self.projects.write().await.insert(project.id.clone(), project);
        Ok(summary)
    }

    pub async fn snapshot(&self, id: &str) -> Result<MeasurementSnapshot, StorageError> {
        self.projects
            .read()
            .await
            .get(id)
            .map(|p| p.snapshot.clone())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Replace the stored measurement list of a project
    pub async fn replace(
        &self,
        id: &str,
        snapshot: MeasurementSnapshot,
    ) -> Result<ProjectSummary, StorageError> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StorageError::UnsupportedVersion(snapshot.version));
        }
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        project.snapshot = snapshot;
        let updated = project.clone();
        drop(projects);

        self.persist(&updated).await?;
        Ok(updated.summary())
    }

    pub async fn name(&self, id: &str) -> Result<String, StorageError> {
        self.projects
            .read()
            .await
            .get(id)
            .map(|p| p.name.clone())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn persist(&self, project: &Project) -> Result<(), StorageError> {
        let Some(dir) = &self.data_dir else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(project)?;
        tokio::fs::write(dir.join(format!("{}.json", project.id)), json).await?;
        Ok(())
    }
}
