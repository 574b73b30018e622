pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod images;
pub mod memory;
pub mod posts;
pub mod state;
pub mod storage;
