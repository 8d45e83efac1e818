//! # facesort
//!
//! Face recognition against a labeled gallery, with density clustering of
//! the faces nobody in the gallery matches.
//!
//! The pipeline: [`storage::EmbeddingCache`] feeds [`processing::Gallery`],
//! [`processing::Matcher`] labels test faces, and [`processing::cluster_faces`]
//! groups the unmatched remainder.

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod models;
pub mod processing;
pub mod runtime;
pub mod storage;
pub mod ui;
