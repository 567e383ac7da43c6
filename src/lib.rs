pub mod api;
pub mod config;
pub mod data_models;
pub mod orchestrator;
pub mod repl;
pub mod sequence;
pub mod state;
pub mod view;
