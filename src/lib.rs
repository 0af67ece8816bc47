pub mod catalog;
pub mod config;
pub mod field;
pub mod logging;
pub mod render;
pub mod sources;
pub mod splice;
pub mod template;
pub mod theme;
