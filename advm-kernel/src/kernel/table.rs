use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use itertools::Itertools;

use super::KernelId;
use super::entry::{BindingKind, KernelImpl, KernelMapEntry};

use crate::config::DispatchConfig;
use crate::error::{KernelError, Result};
use crate::signature::Signature;
use crate::version::{EngineVersion, VersionRange};
use crate::workaround::WorkaroundEntry;

/// A kernel call as selected for the running engine version.
pub struct KernelBinding<S> {
    pub id: KernelId,
    pub name: &'static str,
    pub range: VersionRange,
    pub implementation: KernelImpl<S>,
    pub signature: Signature,
    pub workarounds: &'static [WorkaroundEntry],
}

impl<S> KernelBinding<S> {
    pub fn kind(&self) -> BindingKind {
        self.implementation.kind()
    }
}

/// The ordinal → binding table for one loaded game.
///
/// Built once from an authored kernel map and the game's engine version. The
/// map is validated as a whole up front, so a bad map is rejected no matter
/// which version is asked for. After that, every lookup is an index into a
/// flat vector.
pub struct KernelTable<S> {
    map: Arc<[KernelMapEntry<S>]>,
    /// Parsed signature of each map entry, by map index.
    signatures: Vec<Signature>,
    /// Map indices sorted by `(id, range start)`.
    order: Vec<usize>,
    /// One slice of `order` per distinct id.
    groups: Vec<(KernelId, Range<usize>)>,

    version: EngineVersion,
    bindings: Vec<Option<KernelBinding<S>>>,
    by_name: HashMap<&'static str, KernelId>,
    config: DispatchConfig,
}

impl<S> KernelTable<S> {
    pub fn build(
        map: impl Into<Arc<[KernelMapEntry<S>]>>,
        version: EngineVersion,
        config: DispatchConfig,
    ) -> Result<Self> {
        let map: Arc<[KernelMapEntry<S>]> = map.into();
        let signatures = parse_signatures(&map).inspect_err(|e| log::error!("{e}"))?;
        let order = sorted_disjoint(&map).inspect_err(|e| log::error!("{e}"))?;
        let groups = group_by_id(&map, &order);

        let mut table = Self {
            map,
            signatures,
            order,
            groups,
            version,
            bindings: Vec::new(),
            by_name: HashMap::new(),
            config,
        };
        table.select(version);
        log::info!(
            "kernel table built for engine version {}: {} of {} calls resolved",
            version,
            table.len(),
            table.groups.len()
        );
        Ok(table)
    }

    /// Re-selects bindings from the same map for another engine version.
    pub fn rebuild(&mut self, version: EngineVersion) {
        self.select(version);
        log::info!(
            "kernel table rebuilt for engine version {}: {} calls resolved",
            version,
            self.len()
        );
    }

    /// Swaps in a different kernel map. On error the current table is kept.
    pub fn reload(
        &mut self,
        map: impl Into<Arc<[KernelMapEntry<S>]>>,
        version: EngineVersion,
    ) -> Result<()> {
        *self = Self::build(map, version, self.config)?;
        Ok(())
    }

    fn select(&mut self, version: EngineVersion) {
        let map = &self.map;
        let width = self.groups.last().map_or(0, |(id, _)| usize::from(*id) + 1);
        let mut bindings: Vec<Option<KernelBinding<S>>> = Vec::with_capacity(width);
        bindings.resize_with(width, || None);
        let mut by_name = HashMap::new();

        for (id, span) in &self.groups {
            let candidates = &self.order[span.clone()];
            // last entry starting at or before `version`; ranges are disjoint, so
            // it is the only one that can contain it
            let starts_by = |&i: &usize| map[i].range.start() <= version;
            let n = candidates.partition_point(starts_by);
            let Some(&i) = n.checked_sub(1).and_then(|k| candidates.get(k)) else {
                continue;
            };
            let entry = &map[i];
            if !entry.range.contains(version) {
                continue;
            }
            bindings[usize::from(*id)] = Some(KernelBinding {
                id: *id,
                name: entry.name,
                range: entry.range,
                implementation: entry.implementation,
                signature: self.signatures[i].clone(),
                workarounds: entry.workarounds,
            });
            by_name.entry(entry.name).or_insert(*id);
        }

        self.version = version;
        self.bindings = bindings;
        self.by_name = by_name;
    }

    pub fn version(&self) -> EngineVersion {
        self.version
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DispatchConfig) {
        self.config = config;
    }

    pub fn map(&self) -> &[KernelMapEntry<S>] {
        &self.map
    }

    #[inline]
    pub fn binding(&self, id: KernelId) -> Option<&KernelBinding<S>> {
        self.bindings.get(usize::from(id))?.as_ref()
    }

    /// Lowest ordinal bound to `name` for this version.
    pub fn id_of(&self, name: &str) -> Option<KernelId> {
        self.by_name.get(name).copied()
    }

    /// Resolved bindings in ordinal order.
    pub fn bindings(&self) -> impl Iterator<Item = &KernelBinding<S>> {
        self.bindings.iter().flatten()
    }

    /// Ordinals the map defines for some version but not for this one.
    pub fn unresolved_ids(&self) -> impl Iterator<Item = KernelId> + '_ {
        self.groups
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| self.binding(*id).is_none())
    }

    /// Number of resolved bindings.
    pub fn len(&self) -> usize {
        self.bindings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings().next().is_none()
    }
}

fn parse_signatures<S>(map: &[KernelMapEntry<S>]) -> Result<Vec<Signature>> {
    map.iter()
        .map(|e| {
            Signature::parse(e.signature).map_err(|source| KernelError::MalformedSignature {
                id: e.id,
                name: e.name,
                signature: e.signature,
                source,
            })
        })
        .collect()
}

/// Sorts map indices by `(id, range start)` and rejects any id whose ranges overlap.
///
/// With entries sorted by start, two ranges of one id overlap only if some
/// adjacent pair does, so checking neighbours is enough. The first offending
/// pair in sorted order is reported.
fn sorted_disjoint<S>(map: &[KernelMapEntry<S>]) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..map.len()).collect();
    order.sort_by_key(|&i| (map[i].id, map[i].range.start()));

    for (&a, &b) in order.iter().tuple_windows() {
        let (a, b) = (&map[a], &map[b]);
        if a.id == b.id && a.range.overlaps(&b.range) {
            return Err(KernelError::OverlappingRanges {
                id: a.id,
                first_name: a.name,
                first: a.range,
                second_name: b.name,
                second: b.range,
            });
        }
    }
    Ok(order)
}

fn group_by_id<S>(map: &[KernelMapEntry<S>], order: &[usize]) -> Vec<(KernelId, Range<usize>)> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (id, run) in &order.iter().chunk_by(|&&i| map[i].id) {
        let len = run.count();
        groups.push((id, start..start + len));
        start += len;
    }
    groups
}
