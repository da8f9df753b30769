//! geomention - settlement mention detection for question texts.
//!
//! Core library: normalization, the gazetteer index, candidate extraction,
//! matching and aggregation, plus the file-backed gazetteer and document
//! sources and the SVG map renderer used by the CLI.

pub mod config;
pub mod models;
pub mod render;
pub mod repository;
pub mod services;
