//! REST API for weather stations and their readings, backed by PostGIS.

pub mod api;
pub mod config;
pub mod db;
pub mod geo;
pub mod models;
pub mod store;
