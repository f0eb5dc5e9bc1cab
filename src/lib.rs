// ABOUTME: Library module for seren-mysqldump
// ABOUTME: Exports dump export, statement replay, and their building blocks

pub mod commands;
pub mod config;
pub mod dump;
pub mod error;
pub mod filters;
pub mod mysql;
pub mod source;
pub mod utils;
