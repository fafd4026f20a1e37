//! Command handlers

pub mod config;
pub mod database;
pub mod link;
pub mod word;
