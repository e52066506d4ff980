//! Resolution of wire names to fields, including promoted ones.
//!
//! A struct's table is built breadth-first: the struct's own fields sit at
//! depth 1, the fields of its flattened structs at depth 2, and so on. When
//! several fields claim the same wire name, only those at the smallest depth
//! compete. Among them a single renamed field wins over plain ones; any other
//! tie leaves the name unresolved.

use std::collections::HashSet;

use urldecode_core::{AttrNamespace, ConstTypeId, Field, Shape};

use crate::TypeError;

/// Decides whether a key from the query names a table entry.
///
/// Called as `equal(wire_name, key)`.
pub type EqualFn = fn(wire_name: &[u8], key: &[u8]) -> bool;

/// Byte-for-byte comparison. No case folding or other normalization.
pub fn exact_match(wire_name: &[u8], key: &[u8]) -> bool {
    wire_name == key
}

/// One resolved wire name.
#[derive(Debug, Clone)]
pub struct FieldEntry {
    /// the name keys are compared against
    pub wire_name: &'static str,

    /// fields to go through from the root struct, the last one being the
    /// field the value is decoded into
    pub path: Vec<&'static Field>,

    /// whether the name came from a `rename` rather than the field's name
    pub tagged: bool,

    /// comparator for incoming keys
    pub equal: EqualFn,
}

impl FieldEntry {
    /// Returns true if `key` names this entry.
    #[inline]
    pub fn matches(&self, key: &[u8]) -> bool {
        (self.equal)(self.wire_name.as_bytes(), key)
    }

    /// The field the value is decoded into.
    pub fn field(&self) -> &'static Field {
        // a path always ends with the field it was recorded for
        self.path[self.path.len() - 1]
    }

    /// The shape of the field the value is decoded into.
    pub fn shape(&self) -> &'static Shape {
        self.field().shape()
    }

    /// Promotion depth, 1 for the root struct's own fields.
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// The resolved wire names of one struct, in the order their fields are
/// reached breadth-first.
#[derive(Debug)]
pub struct FieldTable {
    shape: &'static Shape,
    entries: Vec<FieldEntry>,
}

/// The explicit wire name of a field, if any: `#[url(rename)]` first, then
/// `#[serde(rename)]`.
fn wire_tag(field: &Field) -> Option<&'static str> {
    field
        .get_attr(AttrNamespace::Url, "rename")
        .or_else(|| field.get_attr(AttrNamespace::Serde, "rename"))
        .and_then(|attr| attr.value)
}

fn is_excluded(field: &Field) -> bool {
    wire_tag(field) == Some("-")
        || field.has_attr(AttrNamespace::Url, "skip")
        || field.has_attr(AttrNamespace::Serde, "skip")
        || field.has_attr(AttrNamespace::Serde, "skip_deserializing")
}

struct Pending {
    shape: &'static Shape,
    path: Vec<&'static Field>,
}

struct Candidate {
    name: &'static str,
    tagged: bool,
    path: Vec<&'static Field>,
}

impl Candidate {
    fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Picks the field a wire name resolves to, among candidates sorted by
/// depth, tagged first.
fn dominant(group: &[usize], candidates: &[Candidate]) -> Option<usize> {
    let depth = candidates[group[0]].depth();
    let shallowest: Vec<usize> = group
        .iter()
        .copied()
        .take_while(|&idx| candidates[idx].depth() == depth)
        .collect();
    let mut tagged = shallowest.iter().copied().filter(|&idx| candidates[idx].tagged);
    match (tagged.next(), tagged.next()) {
        (Some(idx), None) => Some(idx),
        (Some(_), Some(_)) => None,
        (None, _) if shallowest.len() == 1 => Some(shallowest[0]),
        (None, _) => None,
    }
}

impl FieldTable {
    /// Resolves the wire names of a struct.
    ///
    /// Fails if `shape` is not a struct.
    pub fn build(shape: &'static Shape) -> Result<Self, TypeError> {
        if shape.struct_def().is_none() {
            return Err(TypeError::NotAStruct {
                type_name: shape.type_name(),
            });
        }

        let mut candidates = Vec::new();
        let mut visited: HashSet<ConstTypeId> = HashSet::new();
        let mut next = vec![Pending {
            shape,
            path: Vec::new(),
        }];

        while !next.is_empty() {
            let current = core::mem::take(&mut next);
            // a struct reached several times at one depth is promoted once
            let mut scheduled: HashSet<ConstTypeId> = HashSet::new();

            for pending in current {
                if !visited.insert(pending.shape.id) {
                    continue;
                }
                let Some(def) = pending.shape.struct_def() else {
                    continue;
                };

                for field in def.fields {
                    if is_excluded(field) {
                        continue;
                    }
                    let embedded = if field.is_flattened() {
                        field.shape().indirect_struct()
                    } else {
                        None
                    };
                    if field.is_private() && embedded.is_none() {
                        continue;
                    }

                    let tag = wire_tag(field);
                    let mut path = pending.path.clone();
                    path.push(field);

                    match (tag, embedded) {
                        (None, Some(inner)) => {
                            if scheduled.insert(inner.id) {
                                trace!(
                                    field = field.name,
                                    inner = inner.type_name(),
                                    depth = path.len() + 1,
                                    "promoting flattened struct"
                                );
                                next.push(Pending { shape: inner, path });
                            }
                        }
                        _ => candidates.push(Candidate {
                            name: tag.unwrap_or(field.name),
                            tagged: tag.is_some(),
                            path,
                        }),
                    }
                }
            }
        }

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            let (ca, cb) = (&candidates[a], &candidates[b]);
            ca.name
                .cmp(cb.name)
                .then(ca.depth().cmp(&cb.depth()))
                .then(cb.tagged.cmp(&ca.tagged))
                .then(a.cmp(&b))
        });

        let mut winners: Vec<usize> = order
            .chunk_by(|&a, &b| candidates[a].name == candidates[b].name)
            .filter_map(|group| {
                let winner = dominant(group, &candidates);
                if winner.is_none() {
                    debug!(
                        name = candidates[group[0]].name,
                        candidates = group.len(),
                        "ambiguous wire name dropped"
                    );
                }
                winner
            })
            .collect();
        winners.sort_unstable();

        let mut candidates: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
        let entries: Vec<FieldEntry> = winners
            .into_iter()
            .filter_map(|idx| candidates[idx].take())
            .map(|candidate| FieldEntry {
                wire_name: candidate.name,
                path: candidate.path,
                tagged: candidate.tagged,
                equal: exact_match,
            })
            .collect();

        debug!(
            shape = shape.type_name(),
            entries = entries.len(),
            "built field table"
        );
        Ok(Self { shape, entries })
    }

    /// The struct this table resolves names for.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// All entries, in breadth-first order.
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Finds the first entry `key` names.
    pub fn lookup(&self, key: &[u8]) -> Option<&FieldEntry> {
        self.entries.iter().find(|entry| entry.matches(key))
    }

    /// Finds an entry by wire name.
    pub fn get(&self, wire_name: &str) -> Option<&FieldEntry> {
        self.lookup(wire_name.as_bytes())
    }

    /// Wire names, in table order.
    pub fn wire_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.wire_name)
    }
}

impl<'a> IntoIterator for &'a FieldTable {
    type Item = &'a FieldEntry;
    type IntoIter = core::slice::Iter<'a, FieldEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
