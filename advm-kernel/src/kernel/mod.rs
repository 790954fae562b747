//! Kernel call resolution.
//!
//! Scripts reach native code through numbered kernel calls. Which function sits
//! behind a number, and what arguments it takes, changed from one engine release
//! to the next. A kernel map records all of those variants; a [`KernelTable`]
//! picks the ones for the loaded game's version and dispatches through them.

mod dispatch;
mod entry;
mod report;
mod stub;
mod table;

pub type KernelId = u16;

pub use dispatch::CallContext;
pub use entry::{BindingKind, HANDLE_PREFIX_LEN, KernelFn, KernelImpl, KernelMapEntry, NativeHandle};
pub use report::{ReportRow, TableReport};
pub use stub::StubKind;
pub use table::{KernelBinding, KernelTable};
