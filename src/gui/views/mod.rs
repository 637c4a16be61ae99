//! View modules for the GUI
//!
//! Each submodule adds an `impl GuiApp` block with the rendering logic for
//! one screen or modal. They are called from `App::update` in `app.rs`.
//!
//! - `dashboard` - Intro, stats, impact meter and the record list
//! - `create_record` - "Add Sensor Data" modal
//! - `record_detail` - Record details and signature-gated reveal
//! - `settings` - Network, contract, signer and log viewer

pub mod create_record;
pub mod dashboard;
pub mod record_detail;
pub mod settings;
