pub mod app;
pub mod audio;
pub mod config;
pub mod dual_list;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod player;
pub mod selector;
pub mod ui;
