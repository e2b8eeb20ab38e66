//! Session management: the shared store and per-session state.

pub mod state;
pub mod store;

pub use state::{context_keys, Session, SessionContext, SessionId, SessionState};
pub use store::SessionStore;
