//! Caller-facing ceremony surface.
//!
//! Wire types for start, cancel, status, acknowledge and the capability
//! callback route. Every call returns a [`ServiceResponse`] carrying either
//! the body or a stable [`ErrorCode`]; transport is left to the embedder.

use crate::ceremony::UnlockCeremony;
use crate::effects::UnlockCeremonyEffects;
use crate::errors::{ErrorCode, UnlockError, UnlockResult};
use crate::event::{CeremonyEvent, Transition};
use crate::types::UnlockRequest;
use acey_core::CeremonyId;
use serde::{Deserialize, Serialize};

/// `start-ceremony` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCeremonyRequest {
    /// Why the owner wants to unlock
    pub reason: String,
}

/// `cancel-ceremony` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelCeremonyRequest {
    /// Ceremony to cancel
    pub request_id: CeremonyId,
}

/// `ceremony-status` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyStatusQuery {
    /// Ceremony to inspect
    pub request_id: CeremonyId,
}

/// `acknowledge-ceremony` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgeCeremonyRequest {
    /// Terminal ceremony to forget
    pub request_id: CeremonyId,
}

/// Stage-completion callback from an external capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCallback {
    /// Ceremony the result belongs to
    pub request_id: CeremonyId,
    /// The result
    pub event: CeremonyEvent,
}

/// Any request the service understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ServiceRequest {
    /// Start a ceremony
    StartCeremony(StartCeremonyRequest),
    /// Cancel a pending ceremony
    CancelCeremony(CancelCeremonyRequest),
    /// Read a ceremony snapshot
    CeremonyStatus(CeremonyStatusQuery),
    /// Forget a terminal ceremony
    AcknowledgeCeremony(AcknowledgeCeremonyRequest),
    /// Deliver a capability result
    StageCallback(StageCallback),
}

/// Successful reply body for [`ServiceRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceReply {
    /// Snapshot of the affected ceremony
    Request(UnlockRequest),
    /// Outcome of a stage callback
    Transition(Transition),
}

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ServiceResponse<T> {
    /// The call succeeded
    Ok {
        /// Response body
        body: T,
    },
    /// The call was rejected
    Error {
        /// Stable error code
        code: ErrorCode,
        /// Human-readable explanation
        message: String,
    },
}

impl<T> ServiceResponse<T> {
    /// Whether the call succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self, ServiceResponse::Ok { .. })
    }

    /// Error code, if the call failed
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            ServiceResponse::Ok { .. } => None,
            ServiceResponse::Error { code, .. } => Some(*code),
        }
    }

    /// Body, if the call succeeded
    pub fn into_body(self) -> Option<T> {
        match self {
            ServiceResponse::Ok { body } => Some(body),
            ServiceResponse::Error { .. } => None,
        }
    }

    fn from_error(err: &UnlockError) -> Self {
        ServiceResponse::Error {
            code: err.code(),
            message: err.to_string(),
        }
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceResponse<U> {
        match self {
            ServiceResponse::Ok { body } => ServiceResponse::Ok { body: f(body) },
            ServiceResponse::Error { code, message } => ServiceResponse::Error { code, message },
        }
    }
}

impl<T> From<UnlockResult<T>> for ServiceResponse<T> {
    fn from(result: UnlockResult<T>) -> Self {
        match result {
            Ok(body) => ServiceResponse::Ok { body },
            Err(err) => ServiceResponse::from_error(&err),
        }
    }
}

/// Ceremony service API
#[derive(Debug, Clone)]
pub struct CeremonyService<E: UnlockCeremonyEffects> {
    ceremony: UnlockCeremony<E>,
}

impl<E: UnlockCeremonyEffects> CeremonyService<E> {
    /// Create a new ceremony service
    pub fn new(ceremony: UnlockCeremony<E>) -> Self {
        Self { ceremony }
    }

    /// Underlying driver
    pub fn ceremony(&self) -> &UnlockCeremony<E> {
        &self.ceremony
    }

    /// `POST start-ceremony`
    pub async fn start_ceremony(
        &self,
        request: StartCeremonyRequest,
    ) -> ServiceResponse<UnlockRequest> {
        self.ceremony.start(&request.reason).await.into()
    }

    /// `POST cancel-ceremony`
    pub async fn cancel_ceremony(
        &self,
        request: CancelCeremonyRequest,
    ) -> ServiceResponse<UnlockRequest> {
        self.ceremony.cancel(request.request_id).await.into()
    }

    /// `GET ceremony-status`
    pub async fn ceremony_status(&self, query: CeremonyStatusQuery) -> ServiceResponse<UnlockRequest> {
        self.ceremony.status(query.request_id).await.into()
    }

    /// `POST acknowledge-ceremony`
    pub async fn acknowledge_ceremony(
        &self,
        request: AcknowledgeCeremonyRequest,
    ) -> ServiceResponse<UnlockRequest> {
        self.ceremony.acknowledge(request.request_id).await.into()
    }

    /// Capability callback route.
    pub async fn stage_callback(&self, callback: StageCallback) -> ServiceResponse<Transition> {
        self.ceremony
            .advance(callback.request_id, callback.event)
            .await
            .into()
    }

    /// Dispatch any request.
    pub async fn handle(&self, request: ServiceRequest) -> ServiceResponse<ServiceReply> {
        match request {
            ServiceRequest::StartCeremony(r) => {
                self.start_ceremony(r).await.map(ServiceReply::Request)
            }
            ServiceRequest::CancelCeremony(r) => {
                self.cancel_ceremony(r).await.map(ServiceReply::Request)
            }
            ServiceRequest::CeremonyStatus(q) => {
                self.ceremony_status(q).await.map(ServiceReply::Request)
            }
            ServiceRequest::AcknowledgeCeremony(r) => {
                self.acknowledge_ceremony(r).await.map(ServiceReply::Request)
            }
            ServiceRequest::StageCallback(c) => {
                self.stage_callback(c).await.map(ServiceReply::Transition)
            }
        }
    }
}
