//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and the chain adapter.
//! Contains use case implementations and the background event plumbing.

pub mod certificates;
pub mod check_registration;
pub mod config;
pub mod event_feed;
pub mod pending_requests;
pub mod pending_watcher;
pub mod registration;
pub mod subscription;
pub mod verify_certificate;
