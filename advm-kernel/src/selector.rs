use std::collections::HashMap;

use serde::Serialize;
use strum::Display;

use crate::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize)]
pub enum SelectorType {
    Method,
    Variable,
}

/// One selector slot of a loaded class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorSlot {
    pub name: String,
    pub kind: SelectorType,
    pub offset: u32,
}

impl SelectorSlot {
    pub fn new(name: impl Into<String>, kind: SelectorType, offset: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            offset,
        }
    }
}

/// Read access to the classes the script loader has brought in.
pub trait LoadedScripts {
    /// Selector slots of `class_name` as defined by `script`, or `None` if that
    /// script is not loaded or does not define the class.
    fn class_selectors(&self, script: u16, class_name: &str) -> Option<&[SelectorSlot]>;
}

/// Names one selector slot of one class by script and name, so that
/// compatibility code does not depend on offsets that move between releases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ClassReference {
    pub script: u16,
    pub class_name: &'static str,
    pub selector_name: &'static str,
    pub selector_type: SelectorType,
    /// The offset the slot had when this reference was written down.
    pub selector_offset: u32,
}

/// Outcome of comparing a reference against the loaded classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SelectorCheck {
    Missing,
    AtAuthoredOffset,
    Moved { actual: u32 },
}

impl ClassReference {
    pub const fn new(
        script: u16,
        class_name: &'static str,
        selector_name: &'static str,
        selector_type: SelectorType,
        selector_offset: u32,
    ) -> Self {
        Self { script, class_name, selector_name, selector_type, selector_offset }
    }

    /// Runtime offset of the referenced slot.
    ///
    /// `None` is an ordinary answer: plenty of classes only exist in some releases.
    pub fn resolve(&self, scripts: &(impl LoadedScripts + ?Sized)) -> Option<u32> {
        let found = scripts
            .class_selectors(self.script, self.class_name)?
            .iter()
            .find(|slot| slot.kind == self.selector_type && slot.name == self.selector_name)
            .map(|slot| slot.offset);
        if found.is_none() {
            trace::selector(format_args!(
                "selector {}::{} ({}) not found in script {}",
                self.class_name, self.selector_name, self.selector_type, self.script
            ));
        }
        found
    }

    pub fn check(&self, scripts: &(impl LoadedScripts + ?Sized)) -> SelectorCheck {
        match self.resolve(scripts) {
            None => SelectorCheck::Missing,
            Some(actual) if actual == self.selector_offset => SelectorCheck::AtAuthoredOffset,
            Some(actual) => SelectorCheck::Moved { actual },
        }
    }
}

/// A plain in-memory class table, for tools and tests.
#[derive(Debug, Default)]
pub struct ClassTable {
    /// Classes by defining script, then by name.
    scripts: HashMap<u16, HashMap<String, Vec<SelectorSlot>>>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_class(
        &mut self,
        script: u16,
        class_name: impl Into<String>,
        slots: Vec<SelectorSlot>,
    ) {
        self.scripts
            .entry(script)
            .or_default()
            .insert(class_name.into(), slots);
    }

    pub fn unload_script(&mut self, script: u16) {
        self.scripts.remove(&script);
    }
}

impl LoadedScripts for ClassTable {
    fn class_selectors(&self, script: u16, class_name: &str) -> Option<&[SelectorSlot]> {
        self.scripts
            .get(&script)?
            .get(class_name)
            .map(Vec::as_slice)
    }
}
