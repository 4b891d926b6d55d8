//! Core of the `gp` workspace CLI: command dispatch, outcome classification
//! and the clients for the workspace collaborators (supervisor and server).

pub mod codes;
pub mod command_error;
pub mod dispatch;
pub mod duration;
pub mod env;
pub mod error;
pub mod outcome;
pub mod server;
pub mod supervisor;

use std::future::Future;
use std::time::Duration;

pub use command_error::CommandError;
pub use dispatch::{rewrite_entrypoint, Dispatcher, ENTRYPOINT_PREFIX};
pub use env::{parse_assignments, Assignment, UserEnvVar};
pub use error::{Error, Result};
pub use outcome::{classify, Classification};
pub use server::ServerClient;
pub use supervisor::{SupervisorClient, WorkspaceInfo};

/// Run a future to completion on a fresh current-thread runtime.
///
/// Commands are synchronous; the ones that talk to the network wrap their
/// async part in this.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;
    Ok(runtime.block_on(future))
}

/// [`block_on`] with a deadline for the whole future
pub fn block_on_timeout<F: Future>(limit: Duration, future: F) -> Result<F::Output> {
    block_on(async { tokio::time::timeout(limit, future).await })?
        .map_err(|_| Error::TimedOut(limit))
}
