//! Command handlers

pub mod config;
pub mod entry;
pub mod status;
pub mod transfer;
