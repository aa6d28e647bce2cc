//! Command handlers

pub mod book;
pub mod config;
pub mod serve;
pub mod session;
pub mod status;
pub mod transfer;
