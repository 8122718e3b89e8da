//! Domain Layer - Registry records and chain interfaces
//!
//! This layer contains:
//! - Entities read from contract storage (InstituteRequest, Certificate)
//! - Registry events decoded from contract logs
//! - Chain reader / writer / signer traits (interfaces)
//! - Pure set logic for the pending-registration view

pub mod entities;
pub mod events;
pub mod repository;
pub mod services;
