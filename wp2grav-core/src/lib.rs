#![doc = "wp2grav-core: core mapping engine for the wp2grav exporter."]

//! This crate contains the source-to-Grav mapping logic and the export
//! pipelines: identifier normalisation, custom field conversion, body
//! rendering, YAML document assembly and asset relocation. The WordPress
//! query layer and the destination filesystem stay behind the traits in
//! [`contract`], so the engine itself performs no I/O of its own.
//!
//! # Usage
//! Implement [`contract::ContentSource`] and [`contract::Sink`] for your
//! environment and drive the routines in [`export`].

pub mod assets;
pub mod config;
pub mod contract;
pub mod document;
pub mod error;
pub mod export;
pub mod fields;
pub mod naming;
pub mod render;
