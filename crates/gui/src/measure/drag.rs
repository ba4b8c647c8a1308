use shared::MeasurementId;
use tracing::debug;

/// Point-drag state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        measurement_id: MeasurementId,
        point_index: usize,
    },
}

/// Tracks which measurement point is being dragged.
///
/// Orbit control is derived from the state rather than stored, so every path
/// back to `Idle` re-enables it.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
    /// Swallow the click that ends a drag
    suppress_click: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn target(&self) -> Option<(&str, usize)> {
        match &self.state {
            DragState::Dragging {
                measurement_id,
                point_index,
            } => Some((measurement_id.as_str(), *point_index)),
            DragState::Idle => None,
        }
    }

    pub fn orbit_enabled(&self) -> bool {
        !self.is_dragging()
    }

    pub fn begin(&mut self, measurement_id: MeasurementId, point_index: usize) {
        debug!("Drag start: {} point {}", measurement_id, point_index);
        self.state = DragState::Dragging {
            measurement_id,
            point_index,
        };
        self.suppress_click = true;
    }

    /// Leave the drag; returns the target that was being dragged
    pub fn end(&mut self) -> Option<(MeasurementId, usize)> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging {
                measurement_id,
                point_index,
            } => {
                debug!("Drag end: {} point {}", measurement_id, point_index);
                Some((measurement_id, point_index))
            }
            DragState::Idle => None,
        }
    }

    /// Abort without keeping click suppression (tool switch, clear)
    pub fn cancel(&mut self) {
        self.end();
        self.suppress_click = false;
    }

    /// Consume the suppression flag; true means the pending click belongs to a drag
    pub fn take_click_suppression(&mut self) -> bool {
        std::mem::take(&mut self.suppress_click)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_disables_orbit_until_end() {
        let mut drag = DragController::new();
        assert!(drag.orbit_enabled());
        drag.begin("m".into(), 1);
        assert!(!drag.orbit_enabled());
        assert_eq!(drag.target(), Some(("m", 1)));
        assert_eq!(drag.end(), Some(("m".to_string(), 1)));
        assert!(drag.orbit_enabled());
        assert_eq!(drag.end(), None);
    }

    #[test]
    fn test_click_after_drag_is_suppressed_once() {
        let mut drag = DragController::new();
        drag.begin("m".into(), 0);
        drag.end();
        assert!(drag.take_click_suppression());
        assert!(!drag.take_click_suppression());
    }

    #[test]
    fn test_cancel_clears_suppression() {
        let mut drag = DragController::new();
        drag.begin("m".into(), 0);
        drag.cancel();
        assert!(drag.orbit_enabled());
        assert!(!drag.take_click_suppression());
    }
}
