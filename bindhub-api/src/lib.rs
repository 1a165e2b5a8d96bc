//! # BindHub API Server Library
//!
//! HTTP layer for the BindHub service: multi-tenant account management with
//! token-based authentication and strictly account-scoped user records.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request-body extraction with envelope rejections
//! - `response`: Unified response envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
