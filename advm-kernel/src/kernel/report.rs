use serde::Serialize;

use super::KernelId;
use super::entry::BindingKind;
use super::table::KernelTable;

use crate::version::{EngineVersion, VersionRange};

/// One resolved call, as listed by [`KernelTable::report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: KernelId,
    pub name: &'static str,
    pub kind: BindingKind,
    pub range: VersionRange,
    pub signature: String,
    pub workarounds: usize,
}

/// What a built table resolved to, for compatibility tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub version: EngineVersion,
    pub native: usize,
    pub dummy: usize,
    pub empty: usize,
    pub unresolved: Vec<KernelId>,
    pub calls: Vec<ReportRow>,
}

impl<S> KernelTable<S> {
    pub fn report(&self) -> TableReport {
        let calls: Vec<ReportRow> = self
            .bindings()
            .map(|b| ReportRow {
                id: b.id,
                name: b.name,
                kind: b.kind(),
                range: b.range,
                signature: b.signature.as_str().to_owned(),
                workarounds: b.workarounds.len(),
            })
            .collect();
        let count = |kind: BindingKind| calls.iter().filter(|c| c.kind == kind).count();

        TableReport {
            version: self.version(),
            native: count(BindingKind::Native),
            dummy: count(BindingKind::Dummy),
            empty: count(BindingKind::Empty),
            unresolved: self.unresolved_ids().collect(),
            calls,
        }
    }
}
