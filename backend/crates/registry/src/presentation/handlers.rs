//! HTTP Handlers
//!
//! Inputs are validated before any chain call is made.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use kernel::primitives::{Address, Hash32};

use crate::application::check_registration::{CheckRegistrationUseCase, OwnerStatusUseCase};
use crate::application::pending_requests::PendingRequestsUseCase;
use crate::application::verify_certificate::VerifyCertificateUseCase;
use crate::domain::repository::ChainReader;
use crate::error::{RegistryError, RegistryResult};
use crate::presentation::dto::{
    AddressQuery, CertificateQuery, CertificateResponse, IsRegisteredResponse, OwnerResponse,
    PendingResponse,
};

/// Shared state for registry handlers
pub struct RegistryAppState<R>
where
    R: ChainReader + Send + Sync + 'static,
{
    pub reader: Arc<R>,
    /// First block searched for registry logs
    pub deploy_block: u64,
}

impl<R> Clone for RegistryAppState<R>
where
    R: ChainReader + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            deploy_block: self.deploy_block,
        }
    }
}

fn parse_param<T>(value: Option<&str>, name: &str) -> RegistryResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RegistryError::validation(format!("{} is required", capitalize(name))))?;

    value
        .parse()
        .map_err(|e| RegistryError::validation(format!("Invalid {}: {}", name, e)))
}

fn parse_optional<T>(value: Option<&str>, name: &str) -> RegistryResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_param(Some(v), name).map(Some),
        None => Ok(None),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// GET /api/isRegistered?address=0x...
pub async fn is_registered<R>(
    State(state): State<RegistryAppState<R>>,
    Query(query): Query<AddressQuery>,
) -> RegistryResult<Json<IsRegisteredResponse>>
where
    R: ChainReader + Send + Sync + 'static,
{
    let raw = query.address.unwrap_or_default();
    let address: Address = parse_param(Some(&raw), "address")?;

    let use_case = CheckRegistrationUseCase::new(state.reader.clone());
    let registered = use_case.execute(address).await?;

    Ok(Json(IsRegisteredResponse {
        address: raw.trim().to_string(),
        registered,
    }))
}

/// GET /api/pending
pub async fn pending<R>(
    State(state): State<RegistryAppState<R>>,
) -> RegistryResult<Json<PendingResponse>>
where
    R: ChainReader + Send + Sync + 'static,
{
    let use_case = PendingRequestsUseCase::new(state.reader.clone(), state.deploy_block);
    let pending = use_case.execute().await?;

    Ok(Json(PendingResponse {
        pending: pending.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/certificate?hash=0x...&viewer=0x...
pub async fn certificate<R>(
    State(state): State<RegistryAppState<R>>,
    Query(query): Query<CertificateQuery>,
) -> RegistryResult<Json<CertificateResponse>>
where
    R: ChainReader + Send + Sync + 'static,
{
    let hash: Hash32 = parse_param(query.hash.as_deref(), "certificate hash")?;
    let viewer: Option<Address> = parse_optional(query.viewer.as_deref(), "viewer")?;

    let use_case = VerifyCertificateUseCase::new(state.reader.clone());
    let view = use_case.execute(hash, viewer).await?;

    Ok(Json(view.into()))
}

/// GET /api/owner?address=0x...
pub async fn owner<R>(
    State(state): State<RegistryAppState<R>>,
    Query(query): Query<AddressQuery>,
) -> RegistryResult<Json<OwnerResponse>>
where
    R: ChainReader + Send + Sync + 'static,
{
    let viewer: Option<Address> = parse_optional(query.address.as_deref(), "address")?;

    let use_case = OwnerStatusUseCase::new(state.reader.clone());
    let status = use_case.execute(viewer).await?;

    Ok(Json(status.into()))
}
