//! Membership engine
//!
//! Owns `EventMember` and `EventJoinRequest` rows and every transition between
//! them:
//!
//! ```text
//!            invite                 accept
//!   none ───────────► pending ───────────────► active
//!     │                  │ decline                ▲
//!     │                  ▼                        │
//!     │               (deleted)                   │
//!     │  join directly / create event / approve   │
//!     └───────────────────────────────────────────┘
//! ```
//!
//! Every activation (re)mints the QR code. Removal and leaving never take an
//! event below one active organizer.

pub mod actions;
pub mod events;
pub mod models;
pub mod qr;

pub use models::{EventMember, JoinRequest, MemberRole, MemberStatus, PaymentStatus};
pub use qr::{QrPayload, QrSigner};
