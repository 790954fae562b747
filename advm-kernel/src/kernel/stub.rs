use serde::Serialize;
use strum::Display;

use super::KernelId;

use crate::signature::ArgShapes;
use crate::variant::Variant;

/// The two no-op bindings. They behave identically and only differ in how a
/// call to them is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize)]
pub enum StubKind {
    /// Exposed by the engine, never needed for correct playback.
    Dummy,
    /// Present in older tables, never called by shipped scripts.
    Empty,
}

impl StubKind {
    /// What every stub returns.
    pub const NEUTRAL: Variant = Variant::Nil;

    /// Never touches host state.
    pub fn invoke(self, id: KernelId, name: &str, args: &[Variant]) -> Variant {
        match self {
            StubKind::Dummy => {
                let shapes = ArgShapes::of(args);
                log::warn!("dummy kernel call {name} (#{id}) invoked with {shapes}");
            }
            StubKind::Empty => {
                log::debug!("empty kernel call {name} (#{id}) invoked");
            }
        }
        Self::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stubs_are_neutral_and_repeatable() {
        for kind in [StubKind::Dummy, StubKind::Empty] {
            let args = [Variant::Int(3)];
            let first = kind.invoke(0x12, "DrawPic", &args);
            let second = kind.invoke(0x12, "DrawPic", &args);
            assert_eq!(first, StubKind::NEUTRAL);
            assert_eq!(first, second);
        }
    }
}
