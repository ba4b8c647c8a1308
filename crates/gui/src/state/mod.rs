pub mod cloud;
pub mod settings;

pub use settings::{AppSettings, MeasureSettings};

use crate::i18n::t;
use crate::measure::{MeasureSession, Notice};
use crate::model::LoadedModel;
use crate::persistence::AutoSaver;

/// Panel visibility flags
pub struct PanelVisibility {
    pub measurements: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self { measurements: true }
    }
}

/// Summary of the loaded model for the status bar
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub triangles: usize,
}

/// Combined application state
pub struct AppState {
    pub session: MeasureSession,
    pub settings: AppSettings,
    pub panels: PanelVisibility,
    pub model: Option<ModelInfo>,
    /// Bumped whenever the model geometry changes, so the GPU copy is refreshed
    pub model_revision: u64,
    /// Show settings window
    pub show_settings_window: bool,
    autosave: Option<AutoSaver>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::load(), AutoSaver::new().ok())
    }
}

impl AppState {
    pub fn new(settings: AppSettings, autosave: Option<AutoSaver>) -> Self {
        Self {
            session: MeasureSession::new(settings.measure.clone()),
            settings,
            panels: PanelVisibility::default(),
            model: None,
            model_revision: 0,
            show_settings_window: false,
            autosave,
        }
    }

    /// Install a model and bring back its autosaved measurements
    pub fn load_model(&mut self, model: LoadedModel) {
        self.model = Some(ModelInfo {
            name: model.name.clone(),
            triangles: model.triangle_count(),
        });
        self.session.set_model(Some(model.name.clone()), model.mesh);
        self.model_revision += 1;

        if let Some(saver) = self.autosave.as_mut() {
            if let Some(snapshot) = saver.load(Some(&model.name)) {
                let restored = self.session.restore(&snapshot);
                if restored > 0 {
                    self.session
                        .notify(Notice::info(format!("{} ({})", t("notice.autosave_restored"), restored)));
                }
            }
            saver.mark_saved(self.session.version());
        }
    }

    /// Push edited measure settings into the session
    pub fn apply_measure_settings(&mut self) {
        if self.session.settings() != &self.settings.measure {
            self.session.set_settings(self.settings.measure.clone());
        }
    }

    /// Write the autosave when the measurement list changed since the last write
    pub fn autosave(&mut self) {
        let Some(saver) = self.autosave.as_mut() else {
            return;
        };
        if self.model.is_none() {
            return;
        }
        let snapshot = self.session.snapshot();
        if let Err(e) = saver.save_if_changed(&snapshot, self.session.version()) {
            tracing::error!("Autosave failed: {}", e);
        }
    }
}
