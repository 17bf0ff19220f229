pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod keepalive;
pub mod realtime;
pub mod services;
pub mod uploads;
