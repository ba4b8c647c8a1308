// Library crate: exposes testable modules for integration tests and the JSON command interface.
// GUI-specific modules (app, ui, GL rendering) remain in the binary crate.

pub mod command;
pub mod export;
pub mod fixtures;
pub mod harness;
pub mod i18n;
pub mod measure;
pub mod model;
pub mod persistence;
pub mod state;
pub mod validation;

/// Viewport types shared by the measuring core and the binary (mesh, picking, camera).
/// GL rendering stays in the binary crate.
pub mod viewport {
    pub mod camera;
    pub mod mesh;
    pub mod picking;
}
