//! Keyboard shortcut handling

use eframe::egui;

use crate::measure::Tool;
use crate::state::AppState;
use crate::viewport::ViewportPanel;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(
    ctx: &egui::Context,
    state: &mut AppState,
    viewport: &mut ViewportPanel,
) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    ctx.input(|i| {
        let session = &mut state.session;

        // Ctrl+Z: drop the last captured point
        if i.modifiers.command && i.key_pressed(egui::Key::Z) {
            session.undo_last_point();
        }
        // Enter: close the area in progress
        if i.key_pressed(egui::Key::Enter) && session.active_tool() == Tool::Area {
            session.finish_capture();
        }
        // Escape: abort the capture and return to navigation
        if i.key_pressed(egui::Key::Escape) {
            session.cancel_capture();
        }
        if i.modifiers.command {
            return;
        }
        // L / H / A: pick a tool
        if i.key_pressed(egui::Key::L) {
            session.select_tool(Tool::Length);
        }
        if i.key_pressed(egui::Key::H) {
            session.select_tool(Tool::Height);
        }
        if i.key_pressed(egui::Key::A) {
            session.select_tool(Tool::Area);
        }
        // F: frame the whole model
        if i.key_pressed(egui::Key::F) {
            if let Some(bounds) = session.picking().model_bounds() {
                viewport.frame(&bounds);
            }
        }
    });
}
