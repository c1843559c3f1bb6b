//! Asynchronous job execution and status tracking.
//!
//! A job is one invocation of the external log-fetch program. The
//! [`JobDispatcher`] allocates an id, records the job in the shared
//! [`JobRegistry`] and spawns a detached [`runner`] task that streams the
//! program's output into the record and flips the status on exit. Readers
//! poll the registry independently; a record has exactly one writer (its
//! runner) for its whole lifetime.

mod dispatcher;
mod registry;
mod runner;
mod types;

pub use dispatcher::*;
pub use registry::*;
pub use runner::*;
pub use types::*;
