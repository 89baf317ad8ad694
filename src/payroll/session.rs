// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session state machine.
//!
//! ```text
//! Disconnected ──connect──▶ Connected ──ensure_ready──▶ Initializing ──ok──▶ Ready
//!                               ▲                            │
//!                               └──────────── error ─────────┘
//! ```
//!
//! `disconnect` returns to `Disconnected` from any state. `ensure_ready` is
//! the only caller of the compute service's `initialize`.

use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::compute::ConfidentialCompute;
use crate::error::PayrollError;
use crate::models::WalletAddress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Connected { identity: WalletAddress },
    Initializing { identity: WalletAddress },
    Ready { identity: WalletAddress },
}

impl SessionPhase {
    pub fn identity(&self) -> Option<&WalletAddress> {
        match self {
            SessionPhase::Disconnected => None,
            SessionPhase::Connected { identity }
            | SessionPhase::Initializing { identity }
            | SessionPhase::Ready { identity } => Some(identity),
        }
    }
}

/// Flat view of the session for callers.
///
/// Invariants: `initializing ⇒ !compute_ready` and `compute_ready ⇒ connected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionState {
    pub connected: bool,
    pub compute_ready: bool,
    pub initializing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<WalletAddress>,
}

impl From<&SessionPhase> for SessionState {
    fn from(phase: &SessionPhase) -> Self {
        Self {
            connected: !matches!(phase, SessionPhase::Disconnected),
            compute_ready: matches!(phase, SessionPhase::Ready { .. }),
            initializing: matches!(phase, SessionPhase::Initializing { .. }),
            identity: phase.identity().cloned(),
        }
    }
}

struct Inner {
    phase: SessionPhase,
    /// Bumped on connect/disconnect so a late initialization result for an
    /// earlier connection is discarded
    epoch: u64,
}

pub struct SessionController {
    inner: RwLock<Inner>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                phase: SessionPhase::Disconnected,
                epoch: 0,
            }),
        }
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.read().await.phase.clone()
    }

    pub async fn state(&self) -> SessionState {
        SessionState::from(&self.inner.read().await.phase)
    }

    /// Attach a signing identity. Reconnecting with a different identity
    /// drops readiness.
    pub async fn connect(&self, identity: WalletAddress) {
        let mut inner = self.inner.write().await;
        if inner.phase.identity() == Some(&identity) {
            return;
        }
        inner.epoch += 1;
        inner.phase = SessionPhase::Connected { identity };
    }

    pub async fn disconnect(&self) {
        let mut inner = self.inner.write().await;
        inner.epoch += 1;
        inner.phase = SessionPhase::Disconnected;
    }

    /// The connected identity, whatever the readiness.
    pub async fn identity(&self) -> Result<WalletAddress, PayrollError> {
        self.inner
            .read()
            .await
            .phase
            .identity()
            .cloned()
            .ok_or(PayrollError::NotConnected)
    }

    /// The identity of a ready session.
    pub async fn require_ready(&self) -> Result<WalletAddress, PayrollError> {
        match &self.inner.read().await.phase {
            SessionPhase::Ready { identity } => Ok(identity.clone()),
            _ => Err(PayrollError::NotConnected),
        }
    }

    /// Initialize the compute service unless that is done or under way.
    pub async fn ensure_ready(&self, compute: &dyn ConfidentialCompute) -> Result<(), PayrollError> {
        let (identity, epoch) = {
            let mut inner = self.inner.write().await;
            let identity = match &inner.phase {
                SessionPhase::Disconnected => return Err(PayrollError::NotConnected),
                SessionPhase::Initializing { .. } | SessionPhase::Ready { .. } => return Ok(()),
                SessionPhase::Connected { identity } => identity.clone(),
            };
            inner.phase = SessionPhase::Initializing {
                identity: identity.clone(),
            };
            (identity, inner.epoch)
        };

        tracing::info!(identity = %identity, "Initializing confidential compute");
        let result = compute.initialize().await;

        let mut inner = self.inner.write().await;
        if inner.epoch != epoch {
            tracing::debug!(identity = %identity, "Session changed during initialization, result discarded");
            return match result {
                Ok(()) => Ok(()),
                Err(e) => Err(PayrollError::InitializationFailed(e.to_string())),
            };
        }

        match result {
            Ok(()) => {
                inner.phase = SessionPhase::Ready { identity };
                Ok(())
            }
            Err(e) => {
                tracing::warn!(identity = %identity, error = %e, "Confidential compute initialization failed");
                inner.phase = SessionPhase::Connected { identity };
                Err(PayrollError::InitializationFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::test_support::FakeCompute;

    fn alice() -> WalletAddress {
        WalletAddress::from("0x1111111111111111111111111111111111111111")
    }

    #[tokio::test]
    async fn starts_disconnected() {
        let session = SessionController::new();
        let state = session.state().await;
        assert!(!state.connected && !state.compute_ready && !state.initializing);
        assert_eq!(session.require_ready().await, Err(PayrollError::NotConnected));
    }

    #[tokio::test]
    async fn ensure_ready_requires_connection() {
        let session = SessionController::new();
        let compute = FakeCompute::new();
        assert_eq!(
            session.ensure_ready(&compute).await,
            Err(PayrollError::NotConnected)
        );
        assert_eq!(compute.init_calls(), 0);
    }

    #[tokio::test]
    async fn connect_then_initialize_reaches_ready() {
        let session = SessionController::new();
        let compute = FakeCompute::new();

        session.connect(alice()).await;
        assert_eq!(session.phase().await, SessionPhase::Connected { identity: alice() });

        session.ensure_ready(&compute).await.unwrap();
        let state = session.state().await;
        assert!(state.connected && state.compute_ready && !state.initializing);
        assert_eq!(session.require_ready().await, Ok(alice()));
    }

    #[tokio::test]
    async fn ensure_ready_is_idempotent() {
        let session = SessionController::new();
        let compute = FakeCompute::new();
        session.connect(alice()).await;

        session.ensure_ready(&compute).await.unwrap();
        session.ensure_ready(&compute).await.unwrap();
        assert_eq!(compute.init_calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_ensure_ready_initializes_once() {
        let session = SessionController::new();
        let compute = FakeCompute::new().with_yielding_init();
        session.connect(alice()).await;

        let (a, b) = tokio::join!(session.ensure_ready(&compute), session.ensure_ready(&compute));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(compute.init_calls(), 1);
        assert!(session.state().await.compute_ready);
    }

    #[tokio::test]
    async fn failed_initialization_returns_to_connected() {
        let session = SessionController::new();
        let compute = FakeCompute::new();
        compute.fail_initialize(true);
        session.connect(alice()).await;

        let result = session.ensure_ready(&compute).await;
        assert!(matches!(result, Err(PayrollError::InitializationFailed(_))));
        assert_eq!(session.phase().await, SessionPhase::Connected { identity: alice() });

        compute.fail_initialize(false);
        session.ensure_ready(&compute).await.unwrap();
        assert!(session.state().await.compute_ready);
    }

    #[tokio::test]
    async fn disconnect_invalidates_readiness() {
        let session = SessionController::new();
        let compute = FakeCompute::new();
        session.connect(alice()).await;
        session.ensure_ready(&compute).await.unwrap();

        session.disconnect().await;
        assert_eq!(session.phase().await, SessionPhase::Disconnected);
        assert_eq!(session.identity().await, Err(PayrollError::NotConnected));
    }

    #[tokio::test]
    async fn reconnecting_other_identity_drops_readiness() {
        let session = SessionController::new();
        let compute = FakeCompute::new();
        session.connect(alice()).await;
        session.ensure_ready(&compute).await.unwrap();

        let bob = WalletAddress::from("0x3333333333333333333333333333333333333333");
        session.connect(bob.clone()).await;
        assert_eq!(session.phase().await, SessionPhase::Connected { identity: bob });

        // Same identity again is a no-op.
        session.connect(alice()).await;
        session.ensure_ready(&compute).await.unwrap();
        session.connect(alice()).await;
        assert!(session.state().await.compute_ready);
    }
}
