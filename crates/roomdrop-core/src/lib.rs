//! Roomdrop lifecycle core.
//!
//! Transport-free logic for short-lived, password-protected file exchange
//! rooms:
//!
//! - User accounts and plain-credential authentication
//! - Opaque bearer-token sessions (login to logout, no TTL)
//! - Rooms with a generated (code, password) pair, an idempotent participant
//!   set and a fixed 30-minute lifetime
//! - An append-only ledger of uploaded-file metadata per room
//! - A background sweep that deactivates rooms past their deadline
//!
//! # Architecture
//!
//! Components own behavior and talk to injected store traits:
//!
//! ```text
//! identity/sessions/registry/ledger -> store traits -> store::MemoryStore
//! ```
//!
//! Expiry is enforced on every read against the wall clock; the sweeper only
//! makes it visible in stored state.
//!
//! # Modules
//!
//! - `codes` - Random room codes, passwords and session tokens
//! - `error` - Failure taxonomy shared by all components
//! - `identity` - Account creation and authentication
//! - `ledger` - Uploaded-file metadata per room
//! - `registry` - Room create/join/lookup
//! - `sessions` - Bearer-token session lifecycle
//! - `store` - Injectable persistence seam and the in-process store
//! - `sweeper` - Background expiry sweep task
//! - `types` - Domain records and identifiers

pub mod codes;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod registry;
pub mod sessions;
pub mod store;
pub mod sweeper;
pub mod types;
