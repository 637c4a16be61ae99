//! GUI module for the RegenAgri dashboard
//!
//! This module provides the graphical user interface built with egui/eframe.
//!
//! ## Module Structure
//!
//! - `app` - Main GuiApp struct, state types, and core application logic
//! - `async_job` - Background jobs polled once per frame
//! - `theme` - Nature-green theme and styled widget factories (AppTheme)
//! - `helpers` - Status colors, badges and display formatting
//! - `notifications` - Notification history and the transaction banner
//! - `views` - Dashboard, create/detail modals and settings
//!
//! ## Usage
//!
//! ```no_run
//! use regen_agri::config::Config;
//! use regen_agri::gui;
//! use regen_agri::user_settings::UserSettings;
//!
//! let settings = UserSettings::load();
//! let config = Config::from_settings_and_env(&settings);
//! gui::launch(config, settings).expect("Failed to launch GUI");
//! ```

mod app;
pub mod async_job;
pub mod helpers;
pub mod notifications;
pub mod theme;
pub mod views;

// Re-export main public API
pub use app::{launch, GuiApp, GuiSection};

pub use async_job::{spawn_job, AsyncJob};
pub use notifications::{BannerStatus, NotificationEntry, TransactionBanner};
pub use theme::{configure_style, AppTheme};
