//! Process-level handling of fatal primitive failures.

use tracing::error;

use crate::error::FatalError;

/// Receives fatal conditions before the failing operation returns.
///
/// Implementations are expected to halt or restart the process. If
/// [`critical`](FaultHandler::critical) does return, the operation still
/// fails with [`KmsError::Fatal`](crate::KmsError::Fatal) and yields no key.
pub trait FaultHandler: Send + Sync {
    fn critical(&self, err: &FatalError);
}

/// Logs the failure and aborts the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnFault;

impl FaultHandler for AbortOnFault {
    fn critical(&self, err: &FatalError) {
        error!(error = %err, "fatal KMS failure; aborting");
        std::process::abort();
    }
}
