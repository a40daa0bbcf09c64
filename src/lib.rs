pub mod board;
pub mod browse;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod error;
pub mod form;
pub mod render;
pub mod store;
pub mod task;
pub mod view;
