//! Console state machine: `idle -> pending -> success | error`, re-entering
//! `pending` on every submission.

pub mod console;
pub mod session;
pub mod state;

pub use console::{Completion, Controller, Submission, OVERLAY_FEATURE_CEILING, RLAN_KIND};
pub use session::{FileStorage, MemoryStorage, SessionStorage, CACHE_KEY};
pub use state::{MapOverlayState, RequestStatus, ViewState, Warning};
