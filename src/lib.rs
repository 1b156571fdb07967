pub mod api;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod extraction;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
