//! advm-kernel
//!
//! Kernel call resolution for the advm script VM: version-ranged kernel maps,
//! argument signature checks, and per-title workarounds for scripts that call
//! the kernel in ways the original interpreters happened to tolerate.
//!
//! The interpreter loop builds a [`KernelTable`] once per loaded game and calls
//! [`KernelTable::dispatch`] for every kernel call opcode.

pub mod config;
pub mod error;
pub mod kernel;
pub mod selector;
pub mod signature;
pub mod trace;
pub mod variant;
pub mod version;
pub mod workaround;

pub use config::DispatchConfig;
pub use error::KernelError;
pub use kernel::{CallContext, KernelId, KernelMapEntry, KernelTable};
pub use selector::{
    ClassReference, ClassTable, LoadedScripts, SelectorCheck, SelectorSlot, SelectorType,
};
pub use signature::{ArgShapes, Signature};
pub use variant::{Reg, ValueKind, Variant};
pub use version::{EngineVersion, VersionRange};
pub use workaround::{CallOrigin, WorkaroundEntry};
