//! # seo-audit-cli
//!
//! Configuration loading, pipeline assembly and the interactive loop behind the
//! `seo-audit` binary.

pub mod app;
pub mod config;
