//! Domain Layer - Relay payloads and provider interfaces
//!
//! This layer contains:
//! - Upload and email entities
//! - Pinning and mail provider traits (interfaces)
//! - The certificate email template

pub mod entities;
pub mod repository;
pub mod services;
