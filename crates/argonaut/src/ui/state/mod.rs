//! UI-facing state types shared by the app core and renderers.

pub mod app_mode;
