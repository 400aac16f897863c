//! Room session management: the live rooms, the connections seated in
//! them, and the deferred timers that start games and delete deserted
//! rooms.
//!
//! [`SessionManager`] owns the state and makes every decision under
//! one lock; [`SessionHandle`] is the cloneable async wrapper that
//! connection tasks talk to and that arms the timers.

mod config;
mod error;
mod handle;
mod manager;

pub use config::SessionConfig;
pub use error::SessionError;
pub use handle::SessionHandle;
pub use manager::SessionManager;
