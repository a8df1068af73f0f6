// Core Admin
// Client library for administering a datarhei Core

pub mod commands;
pub mod models;
pub mod services;
