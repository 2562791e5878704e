//! Server dependencies for domain actions (using traits for testability)
//!
//! This is the central dependency container handed to every action. Stores
//! are trait objects so tests can swap in `InMemoryStore`.

use std::sync::Arc;

use sqlx::PgPool;

use crate::domains::membership::qr::QrSigner;
use crate::kernel::{
    postgres_store::PostgresStore, stream_hub::StreamHub, BaseCheckInStore, BaseEventStore,
    BaseIdentityDirectory, BaseMembershipStore, BaseNotificationStore,
};

#[derive(Clone)]
pub struct ServerDeps {
    pub identity: Arc<dyn BaseIdentityDirectory>,
    pub events: Arc<dyn BaseEventStore>,
    pub members: Arc<dyn BaseMembershipStore>,
    pub check_ins: Arc<dyn BaseCheckInStore>,
    pub notifications: Arc<dyn BaseNotificationStore>,
    /// In-process pub/sub hub for pushes to SSE clients
    pub stream_hub: StreamHub,
    pub qr_signer: QrSigner,
}

impl ServerDeps {
    pub fn new(
        identity: Arc<dyn BaseIdentityDirectory>,
        events: Arc<dyn BaseEventStore>,
        members: Arc<dyn BaseMembershipStore>,
        check_ins: Arc<dyn BaseCheckInStore>,
        notifications: Arc<dyn BaseNotificationStore>,
        stream_hub: StreamHub,
        qr_signer: QrSigner,
    ) -> Self {
        Self {
            identity,
            events,
            members,
            check_ins,
            notifications,
            stream_hub,
            qr_signer,
        }
    }

    /// Wire every store to one Postgres pool
    pub fn postgres(pool: PgPool, stream_hub: StreamHub, qr_signer: QrSigner) -> Self {
        let store = Arc::new(PostgresStore::new(pool));
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            stream_hub,
            qr_signer,
        )
    }
}
