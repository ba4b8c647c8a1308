use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::storage::StorageError;
use crate::AppState;
use shared::{
    CreateProjectRequest, ExportReport, ExportRow, MeasurementSnapshot, ProjectSummary,
};

/// Inclinations below this many degrees are left out of reports
const DEFAULT_INCLINATION_THRESHOLD: f64 = 5.0;

fn status_for(e: StorageError) -> StatusCode {
    match e {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::UnsupportedVersion(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StorageError::Io(_) | StorageError::Json(_) => {
            tracing::error!("Storage error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<ProjectSummary>> {
    Json(state.store.list().await)
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectSummary>), StatusCode> {
    let project = state.store.create(body.name).await.map_err(status_for)?;
    tracing::info!("Created project {} ({})", project.id, project.name);
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_measurements(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MeasurementSnapshot>, StatusCode> {
    let snapshot = state.store.snapshot(&id).await.map_err(status_for)?;
    Ok(Json(snapshot))
}

pub async fn put_measurements(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(snapshot): Json<MeasurementSnapshot>,
) -> Result<Json<ProjectSummary>, StatusCode> {
    let summary = state.store.replace(&id, snapshot).await.map_err(status_for)?;
    tracing::info!("Stored {} measurement(s) in project {}", summary.measurement_count, id);
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Report of a stored project; significant inclinations only
pub async fn export_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ExportReport>, StatusCode> {
    let snapshot = state.store.snapshot(&id).await.map_err(status_for)?;
    let title = state.store.name(&id).await.map_err(status_for)?;
    let threshold = query.threshold.unwrap_or(DEFAULT_INCLINATION_THRESHOLD);
    Ok(Json(build_report(title, &snapshot, threshold)))
}

fn build_report(title: String, snapshot: &MeasurementSnapshot, threshold: f64) -> ExportReport {
    let rows = snapshot
        .measurements
        .iter()
        .map(|m| ExportRow {
            description: m.description.clone().unwrap_or_default(),
            kind: m.kind,
            value: (m.value * 100.0).round() / 100.0,
            unit: m.unit.clone(),
            inclination: m.inclination.filter(|a| a.abs() >= threshold),
        })
        .collect();
    ExportReport { title, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ProjectStore;
    use shared::{MeasurementKind, MeasurementRecord, PointRecord};

    fn state() -> AppState {
        AppState {
            store: ProjectStore::in_memory(),
        }
    }

    fn record(id: &str, value: f64, inclination: Option<f64>) -> MeasurementRecord {
        MeasurementRecord {
            id: id.to_string(),
            kind: MeasurementKind::Length,
            points: vec![PointRecord::at([0.0, 0.0, 0.0]), PointRecord::at([value, 0.0, 0.0])],
            value,
            unit: "m".to_string(),
            inclination,
            description: Some(format!("wall {id}")),
            visible: true,
        }
    }

    #[tokio::test]
    async fn test_push_then_pull() {
        let state = state();
        let (status, Json(project)) = create_project(
            State(state.clone()),
            Json(CreateProjectRequest { name: Some("Site".to_string()) }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let snapshot = MeasurementSnapshot::new(None, vec![record("a", 5.0, Some(0.0))]);
        let Json(summary) = put_measurements(
            State(state.clone()),
            Path(project.id.clone()),
            Json(snapshot.clone()),
        )
        .await
        .unwrap();
        assert_eq!(summary.measurement_count, 1);

        let Json(pulled) = get_measurements(State(state), Path(project.id)).await.unwrap();
        assert_eq!(pulled, snapshot);
    }

    #[tokio::test]
    async fn test_missing_project_is_404() {
        let err = get_measurements(State(state()), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_report_filters_small_inclinations() {
        let snapshot = MeasurementSnapshot::new(
            None,
            vec![record("a", 5.004, Some(2.0)), record("b", 3.0, Some(30.0))],
        );
        let report = build_report("Site".to_string(), &snapshot, 5.0);
        assert_eq!(report.title, "Site");
        assert_eq!(report.rows[0].value, 5.0);
        assert_eq!(report.rows[0].inclination, None);
        assert_eq!(report.rows[1].inclination, Some(30.0));
        assert_eq!(report.rows[1].description, "wall b");
    }
}
