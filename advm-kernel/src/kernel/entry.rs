use std::fmt;

use serde::Serialize;
use strum::Display;

use super::KernelId;
use super::dispatch::CallContext;
use super::stub::StubKind;

use crate::variant::Variant;
use crate::version::VersionRange;
use crate::workaround::WorkaroundEntry;

/// A native kernel function.
pub type KernelFn<S> =
    for<'a, 'b, 'c> fn(&'b mut CallContext<'a, S>, &'c [Variant]) -> anyhow::Result<Variant>;

/// A native function together with the identifier it was declared under.
///
/// Native kernel functions are named with a one-character marker in front of the
/// public call name (`kWait` implements `Wait`). Build handles with
/// [`kernel_handle!`](crate::kernel_handle) so the identifier is captured for you.
pub struct NativeHandle<S> {
    pub ident: &'static str,
    pub func: KernelFn<S>,
}

/// Length of the marker in front of native function identifiers.
pub const HANDLE_PREFIX_LEN: usize = 1;

impl<S> NativeHandle<S> {
    pub const fn new(ident: &'static str, func: KernelFn<S>) -> Self {
        Self { ident, func }
    }

    /// The identifier with its marker removed. A raw identifier's `r#` is
    /// dropped first.
    ///
    /// Panics if the identifier is shorter than the marker, which inside a
    /// `const` kernel map is a compile error.
    pub const fn public_name(&self) -> &'static str {
        let mut bytes = self.ident.as_bytes();
        if let [b'r', b'#', rest @ ..] = bytes {
            bytes = rest;
        }
        assert!(
            bytes.len() >= HANDLE_PREFIX_LEN,
            "kernel handle name is shorter than its prefix"
        );
        let (_, rest) = bytes.split_at(HANDLE_PREFIX_LEN);
        match std::str::from_utf8(rest) {
            Ok(name) => name,
            Err(_) => panic!("kernel handle prefix must be a single ASCII character"),
        }
    }
}

impl<S> Clone for NativeHandle<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for NativeHandle<S> {}

/// Builds a [`NativeHandle`] from a function identifier.
#[macro_export]
macro_rules! kernel_handle {
    ($f:ident) => {
        $crate::kernel::NativeHandle::new(stringify!($f), $f)
    };
}

/// What a kernel map entry is bound to.
pub enum KernelImpl<S> {
    Native(KernelFn<S>),
    Stub(StubKind),
}

impl<S> Clone for KernelImpl<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for KernelImpl<S> {}

impl<S> fmt::Debug for KernelImpl<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelImpl::Native(func) => write!(f, "Native({:p})", *func as *const ()),
            KernelImpl::Stub(kind) => write!(f, "Stub({kind:?})"),
        }
    }
}

/// Reporting category of a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Native,
    Dummy,
    Empty,
}

impl<S> KernelImpl<S> {
    pub fn kind(&self) -> BindingKind {
        match self {
            KernelImpl::Native(_) => BindingKind::Native,
            KernelImpl::Stub(StubKind::Dummy) => BindingKind::Dummy,
            KernelImpl::Stub(StubKind::Empty) => BindingKind::Empty,
        }
    }
}

/// One version-scoped binding of a kernel ordinal.
///
/// A kernel map is a `static` slice of these, several per ordinal when a call
/// changed between releases, each scoped to a disjoint [`VersionRange`]:
///
/// ```ignore
/// static KERNEL_MAP: &[KernelMapEntry<Game>] = &[
///     KernelMapEntry::make(VersionRange::until(V1Late), 0x0c, kernel_handle!(kWait), "i"),
///     KernelMapEntry::make(VersionRange::since(V1_1), 0x0c, kernel_handle!(kWait11), "i(i)"),
///     KernelMapEntry::make_dummy("DrawPic", VersionRange::EVERYWHERE, 0x12, "i(i)(i)(i)"),
/// ];
/// ```
pub struct KernelMapEntry<S> {
    pub range: VersionRange,
    pub id: KernelId,
    pub name: &'static str,
    pub implementation: KernelImpl<S>,
    pub signature: &'static str,
    pub workarounds: &'static [WorkaroundEntry],
}

impl<S> KernelMapEntry<S> {
    /// Binds `id` to a native function, naming the call after the function.
    pub const fn make(
        range: VersionRange,
        id: KernelId,
        handle: NativeHandle<S>,
        signature: &'static str,
    ) -> Self {
        Self::make_named(range, id, handle.public_name(), handle, signature)
    }

    /// Binds `id` to a native function under an explicit public name, for
    /// functions shared between several calls.
    pub const fn make_named(
        range: VersionRange,
        id: KernelId,
        name: &'static str,
        handle: NativeHandle<S>,
        signature: &'static str,
    ) -> Self {
        Self::bind(range, id, name, KernelImpl::Native(handle.func), signature)
    }

    /// A call the engine exposed but no game needs for correct playback.
    pub const fn make_dummy(
        name: &'static str,
        range: VersionRange,
        id: KernelId,
        signature: &'static str,
    ) -> Self {
        let stub = KernelImpl::Stub(StubKind::Dummy);
        Self::bind(range, id, name, stub, signature)
    }

    /// A call present in older tables but never made in practice.
    pub const fn make_empty(
        name: &'static str,
        range: VersionRange,
        id: KernelId,
        signature: &'static str,
    ) -> Self {
        let stub = KernelImpl::Stub(StubKind::Empty);
        Self::bind(range, id, name, stub, signature)
    }

    const fn bind(
        range: VersionRange,
        id: KernelId,
        name: &'static str,
        implementation: KernelImpl<S>,
        signature: &'static str,
    ) -> Self {
        Self {
            range,
            id,
            name,
            implementation,
            signature,
            workarounds: &[],
        }
    }

    pub const fn workarounds(mut self, workarounds: &'static [WorkaroundEntry]) -> Self {
        self.workarounds = workarounds;
        self
    }

    pub fn kind(&self) -> BindingKind {
        self.implementation.kind()
    }
}

impl<S> Clone for KernelMapEntry<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for KernelMapEntry<S> {}

impl<S> fmt::Debug for KernelMapEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelMapEntry")
            .field("range", &self.range)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("implementation", &self.implementation)
            .field("signature", &self.signature)
            .field("workarounds", &self.workarounds.len())
            .finish()
    }
}
