//! Call-flow orchestration: one strictly sequential conversation per call,
//! composed from the retry controller, the selection engine, and the
//! persistence contracts.

use crate::store::StoreError;
use crate::transport::TransportError;

pub mod assignment;
pub mod dates;
pub mod registration;
pub mod retry;
pub mod selection;
pub mod session;

pub use retry::{run_with_retries, RetryMessages, RetryPolicy};
pub use session::run_session;

/// Why a flow stopped ahead of its normal end. `Hangup` means the terminal
/// message was already played and the call was ended; it only unwinds the
/// stack. The other variants still owe the caller a goodbye, which
/// [`session::run_session`] delivers.
#[derive(Debug, thiserror::Error)]
pub enum FlowInterrupt {
    #[error("session terminated")]
    Hangup,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
