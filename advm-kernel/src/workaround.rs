//! Per-title workarounds.
//!
//! Some shipped game scripts call kernel functions with arguments the engine
//! never accepted (a missing parameter, an object where an integer belongs).
//! The original interpreters got away with it by accident. A workaround entry
//! pins down one such call site and the value the call should produce instead.

use crate::variant::{ValueKind, Variant};

/// Where a kernel call is being made from.
///
/// Filled in by the interpreter loop from its current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallOrigin<'a> {
    pub game_id: &'a str,
    pub room: u16,
    pub script: u16,
    pub object_name: &'a str,
    pub method_name: &'a str,
}

/// One known-bad call site and its substitute result.
///
/// Every `None` field matches anything. Entries are authored in `const` tables:
///
/// ```
/// use advm_kernel::{ValueKind, Variant, WorkaroundEntry};
///
/// const KQ5_WAIT: &[WorkaroundEntry] = &[WorkaroundEntry::returning(Variant::Int(0))
///     .game("kq5")
///     .room(25)
///     .object("rm025")
///     .method("init")
///     .args(&[])
///     .note("room init calls Wait without a tick count")];
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkaroundEntry {
    pub game_id: Option<&'static str>,
    pub room: Option<u16>,
    pub script: Option<u16>,
    pub object_name: Option<&'static str>,
    pub method_name: Option<&'static str>,
    pub arg_shape: Option<&'static [ValueKind]>,
    pub result: Variant,
    pub note: &'static str,
}

impl WorkaroundEntry {
    pub const fn returning(result: Variant) -> Self {
        Self {
            game_id: None,
            room: None,
            script: None,
            object_name: None,
            method_name: None,
            arg_shape: None,
            result,
            note: "",
        }
    }

    pub const fn game(mut self, game_id: &'static str) -> Self {
        self.game_id = Some(game_id);
        self
    }

    pub const fn room(mut self, room: u16) -> Self {
        self.room = Some(room);
        self
    }

    pub const fn script(mut self, script: u16) -> Self {
        self.script = Some(script);
        self
    }

    pub const fn object(mut self, object_name: &'static str) -> Self {
        self.object_name = Some(object_name);
        self
    }

    pub const fn method(mut self, method_name: &'static str) -> Self {
        self.method_name = Some(method_name);
        self
    }

    /// Only match calls whose arguments have exactly these kinds.
    pub const fn args(mut self, shape: &'static [ValueKind]) -> Self {
        self.arg_shape = Some(shape);
        self
    }

    pub const fn note(mut self, note: &'static str) -> Self {
        self.note = note;
        self
    }

    pub fn applies(&self, origin: &CallOrigin<'_>, args: &[Variant]) -> bool {
        fn field<T: PartialEq>(want: Option<T>, have: T) -> bool {
            want.is_none_or(|w| w == have)
        }

        field(self.game_id, origin.game_id)
            && field(self.room, origin.room)
            && field(self.script, origin.script)
            && field(self.object_name, origin.object_name)
            && field(self.method_name, origin.method_name)
            && self.arg_shape.is_none_or(|shape| {
                shape.len() == args.len() && shape.iter().zip(args).all(|(k, a)| *k == a.kind())
            })
    }

    /// The substitute value, if this entry covers the call.
    pub fn apply(&self, origin: &CallOrigin<'_>, args: &[Variant]) -> Option<Variant> {
        self.applies(origin, args).then_some(self.result)
    }
}

/// The first entry, in authored order, that covers the call.
pub fn find_workaround<'w>(
    entries: &'w [WorkaroundEntry],
    origin: &CallOrigin<'_>,
    args: &[Variant],
) -> Option<&'w WorkaroundEntry> {
    entries.iter().find(|w| w.applies(origin, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Reg;

    const ORIGIN: CallOrigin<'static> = CallOrigin {
        game_id: "sq4",
        room: 391,
        script: 391,
        object_name: "lass",
        method_name: "doit",
    };

    const ENTRIES: &[WorkaroundEntry] = &[
        WorkaroundEntry::returning(Variant::Int(1))
            .game("sq4")
            .room(391)
            .args(&[]),
        WorkaroundEntry::returning(Variant::Int(2))
            .game("sq4")
            .object("lass"),
        WorkaroundEntry::returning(Variant::Int(3)),
    ];

    fn hit(origin: &CallOrigin<'_>, args: &[Variant]) -> Option<Variant> {
        find_workaround(ENTRIES, origin, args).map(|w| w.result)
    }

    #[test]
    fn wildcards_match_everything() {
        let w = WorkaroundEntry::returning(Variant::Nil);
        assert!(w.applies(&ORIGIN, &[]));
        assert!(w.applies(&CallOrigin::default(), &[Variant::Int(4)]));
    }

    #[test]
    fn every_set_field_must_match() {
        let w = WorkaroundEntry::returning(Variant::Nil)
            .game("sq4")
            .method("init");
        assert!(!w.applies(&ORIGIN, &[]));
        let w = WorkaroundEntry::returning(Variant::Nil)
            .game("sq4")
            .method("doit")
            .script(391);
        assert!(w.applies(&ORIGIN, &[]));
    }

    #[test]
    fn shape_is_exact() {
        let w = WorkaroundEntry::returning(Variant::Nil)
            .args(&[ValueKind::Integer, ValueKind::Object]);
        let obj = Variant::Object(Reg::new(1, 1));
        assert!(w.applies(&ORIGIN, &[Variant::Int(0), obj]));
        assert!(!w.applies(&ORIGIN, &[Variant::Int(0)]));
        assert!(!w.applies(&ORIGIN, &[Variant::Int(0), Variant::Int(1)]));
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(hit(&ORIGIN, &[]), Some(Variant::Int(1)));
        assert_eq!(hit(&ORIGIN, &[Variant::Int(9)]), Some(Variant::Int(2)));

        let elsewhere = CallOrigin {
            object_name: "ego",
            ..ORIGIN
        };
        assert_eq!(ENTRIES[1].apply(&elsewhere, &[Variant::Int(9)]), None);
        assert_eq!(hit(&elsewhere, &[Variant::Int(9)]), Some(Variant::Int(3)));
    }
}
