#![allow(clippy::collapsible_if)]
#![deny(dead_code)]

pub mod config;
pub mod edit_id;
pub mod languages;
pub mod overlay;
pub mod patch;
pub mod server;
pub mod tagger;
