//! Presentation Layer
//!
//! HTTP handlers and DTOs for the registry read API.

pub mod dto;
pub mod handlers;
pub mod router;
