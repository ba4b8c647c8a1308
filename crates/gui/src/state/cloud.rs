//! Background sync of measurement snapshots with the persistence server.
//!
//! Requests run on a small runtime owned by the client; the UI polls
//! finished results once per frame and never blocks on the network.

use std::sync::mpsc::{channel, Receiver, Sender};

use shared::{CreateProjectRequest, MeasurementSnapshot, ProjectId, ProjectSummary};
use thiserror::Error;
use tokio::runtime::Runtime;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not start sync runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("no project selected")]
    NoProject,
}

/// Finished sync operation
#[derive(Debug)]
pub enum SyncEvent {
    Pushed { project: ProjectSummary },
    Pulled { project_id: ProjectId, snapshot: MeasurementSnapshot },
    Failed(SyncError),
}

pub struct CloudSync {
    runtime: Runtime,
    client: reqwest::Client,
    base_url: String,
    tx: Sender<SyncEvent>,
    rx: Receiver<SyncEvent>,
    in_flight: usize,
}

impl CloudSync {
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("tapeline-sync")
            .enable_all()
            .build()?;
        let (tx, rx) = channel();
        Ok(Self {
            runtime,
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tx,
            rx,
            in_flight: 0,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a snapshot; a project named `name` is created when `project_id` is None
    pub fn push(&mut self, project_id: Option<ProjectId>, name: String, snapshot: MeasurementSnapshot) {
        let client = self.client.clone();
        let projects_url = self.url("/api/projects");
        let tx = self.tx.clone();
        self.in_flight += 1;

        self.runtime.spawn(async move {
            let result = async {
                let id = match project_id {
                    Some(id) => id,
                    None => {
                        let created: ProjectSummary = client
                            .post(&projects_url)
                            .json(&CreateProjectRequest { name: Some(name) })
                            .send()
                            .await?
                            .error_for_status()?
                            .json()
                            .await?;
                        created.id
                    }
                };
                let project: ProjectSummary = client
                    .put(format!("{projects_url}/{id}/measurements"))
                    .json(&snapshot)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok::<_, SyncError>(project)
            }
            .await;

            let event = match result {
                Ok(project) => SyncEvent::Pushed { project },
                Err(e) => SyncEvent::Failed(e),
            };
            let _ = tx.send(event);
        });
    }

    /// Download the stored snapshot of a project
    pub fn pull(&mut self, project_id: Option<ProjectId>) {
        let Some(project_id) = project_id else {
            let _ = self.tx.send(SyncEvent::Failed(SyncError::NoProject));
            self.in_flight += 1;
            return;
        };
        let client = self.client.clone();
        let url = self.url(&format!("/api/projects/{project_id}/measurements"));
        let tx = self.tx.clone();
        self.in_flight += 1;

        self.runtime.spawn(async move {
            let result = async {
                let snapshot: MeasurementSnapshot = client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok::<_, SyncError>(snapshot)
            }
            .await;

            let event = match result {
                Ok(snapshot) => SyncEvent::Pulled { project_id, snapshot },
                Err(e) => SyncEvent::Failed(e),
            };
            let _ = tx.send(event);
        });
    }

    /// Finished operations since the last poll
    pub fn poll(&mut self) -> Vec<SyncEvent> {
        let events: Vec<SyncEvent> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(events.len());
        for event in &events {
            match event {
                SyncEvent::Pushed { project } => tracing::info!(
                    "Pushed {} measurement(s) to project {}",
                    project.measurement_count,
                    project.id
                ),
                SyncEvent::Pulled { project_id, snapshot } => tracing::info!(
                    "Pulled {} measurement(s) from project {}",
                    snapshot.measurements.len(),
                    project_id
                ),
                SyncEvent::Failed(e) => tracing::error!("Cloud sync failed: {}", e),
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let sync = CloudSync::new("http://localhost:3001/").unwrap();
        assert_eq!(sync.base_url(), "http://localhost:3001");
        assert_eq!(sync.url("/api/health"), "http://localhost:3001/api/health");
    }

    #[test]
    fn test_pull_without_project_fails_fast() {
        let mut sync = CloudSync::new("http://localhost:3001").unwrap();
        sync.pull(None);
        let events = sync.poll();
        assert!(matches!(events.as_slice(), [SyncEvent::Failed(SyncError::NoProject)]));
        assert!(!sync.is_busy());
    }
}
