//! Application settings

use serde::{Deserialize, Serialize};

use crate::measure::geometry::{DEFAULT_CLOSE_THRESHOLD, DEFAULT_INCLINATION_THRESHOLD};

/// Platform directories for settings, autosaves and exports
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "tapeline", "tapeline")
}

/// Grid display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    /// Show grid
    pub visible: bool,
    /// Grid cell size in meters
    pub size: f32,
    /// Number of grid lines in each direction from origin
    pub range: i32,
    /// Grid line opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            size: 1.0,
            range: 20,
            opacity: 0.4,
        }
    }
}

/// Axis display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisSettings {
    /// Show axes
    pub visible: bool,
    /// Axis arrow length
    pub length: f32,
    /// Show axis labels (X, Y, Z)
    pub show_labels: bool,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            visible: true,
            length: 1.5,
            show_labels: true,
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Orbit sensitivity in degrees per pixel
    pub orbit_speed: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [30, 30, 35],
            orbit_speed: 0.4,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
    /// Seconds a notice stays in the status bar
    pub notice_seconds: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            notice_seconds: 4.0,
        }
    }
}

/// Measuring behavior and label display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureSettings {
    /// Pick distance to the first area point that closes the polygon (m)
    pub close_threshold: f64,
    /// Inclinations below this are hidden from labels and reports (degrees)
    pub inclination_threshold: f64,
    /// Rendered marker sphere radius (m)
    pub marker_radius: f32,
    /// Radius used for hover and drag picking of markers (m)
    pub marker_pick_radius: f32,
    /// Label scale per unit of camera distance
    pub label_scale_factor: f32,
    /// Labels never shrink below this scale
    pub label_min_scale: f32,
}

impl Default for MeasureSettings {
    fn default() -> Self {
        Self {
            close_threshold: DEFAULT_CLOSE_THRESHOLD,
            inclination_threshold: DEFAULT_INCLINATION_THRESHOLD,
            marker_radius: 0.06,
            marker_pick_radius: 0.15,
            label_scale_factor: 0.08,
            label_min_scale: 0.5,
        }
    }
}

/// Persistence server connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudSettings {
    /// Base URL of the measurement server
    pub server_url: String,
    /// Project to sync with; created on first push when empty
    #[serde(default)]
    pub project_id: Option<String>,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3001".to_string(),
            project_id: None,
        }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// Grid settings
    #[serde(default)]
    pub grid: GridSettings,
    /// Axis settings
    #[serde(default)]
    pub axes: AxisSettings,
    /// Viewport settings
    #[serde(default)]
    pub viewport: ViewportSettings,
    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,
    /// Measurement settings
    #[serde(default)]
    pub measure: MeasureSettings,
    /// Cloud sync settings
    #[serde(default)]
    pub cloud: CloudSettings,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = project_dirs() {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match serde_json::from_str(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring unreadable settings {:?}: {}", config_path, e),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = project_dirs() {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    if let Err(e) = std::fs::write(&config_path, json) {
                        tracing::error!("Failed to save settings to {:?}: {}", config_path, e);
                    }
                }
            }
        }
    }
}
