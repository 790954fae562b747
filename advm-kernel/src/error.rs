use thiserror::Error;

use crate::kernel::KernelId;
use crate::signature::{ArgShapes, SignatureError, SignatureMismatch};
use crate::version::{EngineVersion, VersionRange};

#[derive(Debug, Error)]
pub enum KernelError {
    /// Two entries for one ordinal can both be selected. Fatal at build time.
    #[error(
        "kernel call #{id}: {first_name} {first} overlaps {second_name} {second}"
    )]
    OverlappingRanges {
        id: KernelId,
        first_name: &'static str,
        first: VersionRange,
        second_name: &'static str,
        second: VersionRange,
    },

    #[error("kernel call {name} (#{id}) has a malformed signature {signature:?}")]
    MalformedSignature {
        id: KernelId,
        name: &'static str,
        signature: &'static str,
        #[source]
        source: SignatureError,
    },

    #[error("inverted version range: {from} > {to}")]
    InvertedRange {
        from: EngineVersion,
        to: EngineVersion,
    },

    #[error("kernel call #{id} is not defined for engine version {version}")]
    UnresolvedOrdinal {
        id: KernelId,
        version: EngineVersion,
    },

    #[error(
        "kernel call {name} (#{id}) expects {expected}, got {received} \
         on engine version {version}: {reason}"
    )]
    SignatureViolation {
        id: KernelId,
        name: &'static str,
        version: EngineVersion,
        expected: String,
        received: ArgShapes,
        #[source]
        reason: SignatureMismatch,
    },

    #[error("kernel call {name} (#{id}) failed")]
    Native {
        id: KernelId,
        name: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl KernelError {
    /// Whether this defect was found while building the table, as opposed to
    /// during a single call.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            KernelError::OverlappingRanges { .. }
                | KernelError::MalformedSignature { .. }
                | KernelError::InvertedRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;
