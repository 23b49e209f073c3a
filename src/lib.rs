pub mod animation;
pub mod camera;
pub mod cli;
pub mod config;
pub mod context;
pub mod controls;
pub mod core;
pub mod debug_panel;
pub mod error;
pub mod frame;
pub mod input;
pub mod loaders;
pub mod math;
pub mod overlay;
pub mod raycast;
pub mod renderer;
pub mod scene;
pub mod traits;
pub mod updater;
