use std::fs;

use anyhow::Result;
use pretty_assertions::assert_eq;

use advm_kernel::{
    CallContext, CallOrigin, ClassReference, ClassTable, DispatchConfig, EngineVersion, KernelError,
    KernelMapEntry, KernelTable, Reg, SelectorCheck, SelectorSlot, SelectorType, ValueKind, Variant,
    VersionRange, WorkaroundEntry, kernel_handle,
};

#[derive(Clone, Default, Debug, PartialEq)]
struct Game {
    cycles: i32,
    palette: Vec<u8>,
}

#[allow(non_snake_case)]
fn kAnimate(ctx: &mut CallContext<'_, Game>, args: &[Variant]) -> Result<Variant> {
    ctx.state.cycles += args.first().and_then(Variant::as_int).unwrap_or(1);
    Ok(Variant::Int(ctx.state.cycles))
}

const ANIMATE_PATCHES: &[WorkaroundEntry] = &[
    WorkaroundEntry::returning(Variant::Int(100))
        .game("pq2")
        .room(4)
        .object("rm4")
        .method("changeState")
        .args(&[])
        .note("changeState calls Animate with no arguments"),
    WorkaroundEntry::returning(Variant::Int(200))
        .game("pq2")
        .args(&[])
        .note("any other argument-less call in pq2"),
    WorkaroundEntry::returning(Variant::Int(300))
        .game("pq2")
        .args(&[]),
];

const ALL: VersionRange = VersionRange::EVERYWHERE;

const MAP: &[KernelMapEntry<Game>] = &[
    KernelMapEntry::make(ALL, 0x0b, kernel_handle!(kAnimate), "i(io)")
        .workarounds(ANIMATE_PATCHES),
    KernelMapEntry::make_dummy("DrawPic", ALL, 12, "i"),
    KernelMapEntry::make_empty("ShowMovie", ALL, 13, ".*"),
];

fn origin(
    game_id: &'static str,
    room: u16,
    object_name: &'static str,
    method_name: &'static str,
) -> CallOrigin<'static> {
    CallOrigin {
        game_id,
        room,
        script: room,
        object_name,
        method_name,
    }
}

fn table() -> Result<KernelTable<Game>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let table = KernelTable::build(MAP, EngineVersion::V1Late, DispatchConfig::default())?;
    Ok(table)
}

#[test]
fn dummy_draw_pic_is_inert() -> Result<()> {
    let table = table()?;
    let mut game = Game {
        cycles: 3,
        palette: vec![1, 2, 3],
    };
    let before = game.clone();
    let mut ctx = CallContext::new(&mut game, origin("kq1", 1, "rm1", "init"));

    let first = table.dispatch(12, &mut ctx, &[Variant::Int(100)])?;
    let second = table.dispatch(12, &mut ctx, &[Variant::Int(100)])?;
    let movie_args = [Variant::Ref(Reg::new(2, 8)), Variant::Nil];
    let empty = table.dispatch(13, &mut ctx, &movie_args)?;
    assert_eq!(first, Variant::Nil);
    assert_eq!(second, first);
    assert_eq!(empty, Variant::Nil);
    assert_eq!(game, before);
    Ok(())
}

#[test]
fn dummy_still_checks_its_signature() -> Result<()> {
    let table = table()?;
    let mut game = Game::default();
    let mut ctx = CallContext::new(&mut game, CallOrigin::default());
    let err = table.dispatch(12, &mut ctx, &[]).unwrap_err();
    let KernelError::SignatureViolation { id, name, .. } = err else {
        panic!("expected a signature violation");
    };
    assert_eq!((id, name), (12, "DrawPic"));
    Ok(())
}

#[test]
fn zero_argument_call_without_workaround_is_reported() -> Result<()> {
    let table = table()?;
    let mut game = Game::default();
    let mut ctx = CallContext::new(&mut game, origin("kq1", 4, "rm4", "changeState"));
    let err = table.dispatch(0x0b, &mut ctx, &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "kernel call Animate (#11) expects \"i(io)\", got () on engine version 1-late: \
         expected at least 1 argument(s), got 0"
    );
    assert_eq!(game.cycles, 0);
    Ok(())
}

#[test]
fn first_matching_workaround_wins() -> Result<()> {
    let table = table()?;
    let mut game = Game::default();

    let mut ctx = CallContext::new(&mut game, origin("pq2", 4, "rm4", "changeState"));
    assert_eq!(table.dispatch(0x0b, &mut ctx, &[])?, Variant::Int(100));

    let mut ctx = CallContext::new(&mut game, origin("pq2", 4, "rm4", "doit"));
    assert_eq!(table.dispatch(0x0b, &mut ctx, &[])?, Variant::Int(200));

    let mut ctx = CallContext::new(&mut game, origin("pq2", 9, "rm9", "changeState"));
    assert_eq!(table.dispatch(0x0b, &mut ctx, &[])?, Variant::Int(200));

    // the real implementation never ran
    assert_eq!(game.cycles, 0);
    Ok(())
}

#[test]
fn workarounds_leave_other_shapes_alone() -> Result<()> {
    let table = table()?;
    let mut game = Game::default();
    let mut ctx = CallContext::new(&mut game, origin("pq2", 4, "rm4", "changeState"));
    let cycles = table.dispatch(0x0b, &mut ctx, &[Variant::Int(2)])?;
    assert_eq!(cycles, Variant::Int(2));
    let obj = Variant::Object(Reg::new(5, 0x40));
    let cycles = table.dispatch(0x0b, &mut ctx, &[Variant::Int(3), obj])?;
    assert_eq!(cycles, Variant::Int(5));

    let err = table.dispatch(0x0b, &mut ctx, &[obj]).unwrap_err();
    let KernelError::SignatureViolation { received, .. } = err else {
        panic!("expected a signature violation");
    };
    assert_eq!(received.0, vec![ValueKind::Object]);
    Ok(())
}

#[test]
fn config_from_file() -> Result<()> {
    let name = format!("advm-dispatch-{}.json", std::process::id());
    let path = std::env::temp_dir().join(name);
    fs::write(&path, r#"{ "validate_signatures": false }"#)?;
    let config = DispatchConfig::load(&path)?;
    fs::remove_file(&path)?;

    let mut table = table()?;
    table.set_config(config);
    let mut game = Game::default();
    let mut ctx = CallContext::new(&mut game, origin("kq1", 4, "rm4", "changeState"));
    // unchecked: the call goes straight through with its default cycle count
    assert_eq!(table.dispatch(0x0b, &mut ctx, &[])?, Variant::Int(1));
    Ok(())
}

#[test]
fn class_references_survive_missing_classes() {
    const GAME_DOIT: ClassReference =
        ClassReference::new(0, "Game", "doit", SelectorType::Method, 2);
    const EGO_VIEW: ClassReference =
        ClassReference::new(999, "Ego", "view", SelectorType::Variable, 12);
    const TALKER_SAY: ClassReference =
        ClassReference::new(928, "Talker", "say", SelectorType::Method, 5);

    let mut scripts = ClassTable::new();
    scripts.define_class(
        0,
        "Game",
        vec![
            SelectorSlot::new("init", SelectorType::Method, 0),
            SelectorSlot::new("replay", SelectorType::Method, 1),
            SelectorSlot::new("doit", SelectorType::Method, 3),
        ],
    );
    let view = SelectorSlot::new("view", SelectorType::Variable, 12);
    scripts.define_class(999, "Ego", vec![view]);

    assert_eq!(GAME_DOIT.resolve(&scripts), Some(3));
    let doit = GAME_DOIT.check(&scripts);
    assert_eq!(doit, SelectorCheck::Moved { actual: 3 });
    assert_eq!(EGO_VIEW.check(&scripts), SelectorCheck::AtAuthoredOffset);
    assert_eq!(TALKER_SAY.resolve(&scripts), None);
    assert_eq!(TALKER_SAY.check(&scripts), SelectorCheck::Missing);
}
