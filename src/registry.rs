//! Bidirectional record-kind lookup shared by the binary and ASCII paths.
//!
//! The registry is built once from the descriptor tables in [`crate::schema`] and is read-only
//! afterwards. Besides the name maps it precomputes, for every field, the index of the sibling
//! that carries its length and, for root-only kinds, the indices of `commrank` and `root`, so
//! the codec never searches field lists by name while it runs.

use std::collections::HashMap;

use crate::error::{Result, TraceError};
use crate::schema::{self, FieldSpec, FieldType, KindSpec, Len, Presence, Scalar};
use crate::schema::{PREDEFINED_COMMS, PREDEFINED_DATATYPES, PREDEFINED_OPS};
use crate::trace::constants::MAX_TABLE_LEN;
use crate::trace::{HandleKind, Kind, Value};

/// Where an array field takes its element count from, resolved to a field index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountSource {
    Sibling(usize),
    Prefixed,
}

/// A kind's descriptor list plus the resolved indices the engine needs.
#[derive(Debug)]
pub struct KindLayout {
    pub kind: Kind,
    pub spec: &'static KindSpec,
    counts: Vec<Option<CountSource>>,
    rank_root: Option<(usize, usize)>,
}

impl KindLayout {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.spec.fields
    }

    /// Count source of field `idx`, `None` for non-array fields.
    pub fn count_source(&self, idx: usize) -> Option<CountSource> {
        self.counts.get(idx).copied().flatten()
    }

    /// Indices of the `commrank` and `root` fields when the kind has root-only fields.
    pub fn rank_root(&self) -> Option<(usize, usize)> {
        self.rank_root
    }

    /// Whether root-only fields are present, judged from the already-known `commrank` and
    /// `root` values. Kinds without root-only fields always answer `true`.
    pub fn root_fields_present(&self, fields: &[Value]) -> Result<bool> {
        let Some((rank_idx, root_idx)) = self.rank_root else {
            return Ok(true);
        };
        let int_at = |idx: usize| -> Result<i32> {
            fields.get(idx).and_then(Value::as_int).ok_or_else(|| {
                TraceError::desync(format!(
                    "{}: '{}' is not available for the root test",
                    self.name(),
                    self.spec.fields[idx].name
                ))
            })
        };
        Ok(int_at(rank_idx)? == int_at(root_idx)?)
    }

    /// Element count of array field `idx` taken from its sibling in `fields`.
    ///
    /// Returns `None` for prefixed arrays (they carry their own count) and non-array fields.
    pub fn sibling_count(&self, idx: usize, fields: &[Value]) -> Result<Option<usize>> {
        let Some(CountSource::Sibling(sibling)) = self.count_source(idx) else {
            return Ok(None);
        };
        let field = &self.spec.fields[idx];
        let count = fields.get(sibling).and_then(Value::as_int).ok_or_else(|| {
            TraceError::desync(format!(
                "{}.{}: length source '{}' has no value",
                self.name(),
                field.name,
                self.spec.fields[sibling].name
            ))
        })?;
        if count < 0 || count as usize > MAX_TABLE_LEN {
            return Err(TraceError::range(format!(
                "{}.{}: array length {count} out of range",
                self.name(),
                field.name
            )));
        }
        Ok(Some(count as usize))
    }

    fn build(kind: Kind, spec: &'static KindSpec) -> std::result::Result<Self, String> {
        let position = |name: &str, before: usize| -> std::result::Result<usize, String> {
            spec.fields[..before]
                .iter()
                .position(|f| f.name == name)
                .ok_or_else(|| format!("{}: no field '{}' before index {}", spec.name, name, before))
        };

        let mut counts = Vec::with_capacity(spec.fields.len());
        for (idx, field) in spec.fields.iter().enumerate() {
            let source = match field.ty.count_source() {
                None => None,
                Some(Len::Prefixed) => Some(CountSource::Prefixed),
                Some(Len::Field(name)) => {
                    let sibling = position(name, idx)?;
                    if spec.fields[sibling].ty != FieldType::Scalar(Scalar::Int) {
                        return Err(format!(
                            "{}: length source '{}' of '{}' is not an int",
                            spec.name, name, field.name
                        ));
                    }
                    Some(CountSource::Sibling(sibling))
                }
            };
            counts.push(source);
        }

        let first_root_only = spec
            .fields
            .iter()
            .position(|f| f.presence == Presence::RootOnly);
        let rank_root = match first_root_only {
            None => None,
            Some(idx) => Some((position("commrank", idx)?, position("root", idx)?)),
        };

        Ok(Self {
            kind,
            spec,
            counts,
            rank_root,
        })
    }
}

/// Predefined handle names for one handle family.
#[derive(Debug, Default)]
struct HandleNames {
    by_name: HashMap<&'static str, i32>,
    by_id: HashMap<i32, &'static str>,
}

impl HandleNames {
    fn new(table: &'static [(&'static str, i32)]) -> Self {
        Self {
            by_name: table.iter().copied().collect(),
            by_id: table.iter().map(|&(name, id)| (id, name)).collect(),
        }
    }
}

/// Name and layout lookup over the closed set of record kinds.
#[derive(Debug)]
pub struct Registry {
    layouts: Vec<KindLayout>,
    by_name: HashMap<&'static str, Kind>,
    datatypes: HandleNames,
    comms: HandleNames,
    ops: HandleNames,
}

impl Registry {
    /// Build the registry from the compiled-in descriptor tables.
    ///
    /// Fails only if a descriptor refers to a sibling that is missing or declared later, which
    /// is a defect in the tables themselves.
    pub fn new() -> Result<Self> {
        let mut layouts = Vec::new();
        let mut by_name = HashMap::new();
        for (idx, spec) in schema::all_kinds().enumerate() {
            let tag = u16::try_from(idx)
                .map_err(|_| TraceError::range(format!("kind index {idx} exceeds tag width")))?;
            let kind = Kind(tag);
            let layout = KindLayout::build(kind, spec).map_err(TraceError::FormatDesync)?;
            if by_name.insert(spec.name, kind).is_some() {
                return Err(TraceError::desync(format!("duplicate kind {}", spec.name)));
            }
            layouts.push(layout);
        }

        Ok(Self {
            layouts,
            by_name,
            datatypes: HandleNames::new(PREDEFINED_DATATYPES),
            comms: HandleNames::new(PREDEFINED_COMMS),
            ops: HandleNames::new(PREDEFINED_OPS),
        })
    }

    /// Number of kinds; also the footer length.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn name_to_kind(&self, name: &str) -> Option<Kind> {
        self.by_name.get(name).copied()
    }

    /// Like [`Registry::name_to_kind`] but an unknown name is an error.
    pub fn lookup(&self, name: &str) -> Result<Kind> {
        self.name_to_kind(name)
            .ok_or_else(|| TraceError::UnknownKind(name.to_string()))
    }

    pub fn kind_to_name(&self, kind: Kind) -> Option<&'static str> {
        self.layouts.get(kind.index()).map(KindLayout::name)
    }

    /// Resolve a wire tag to its layout.
    pub fn layout_for_tag(&self, tag: u16) -> Result<&KindLayout> {
        self.layouts
            .get(tag as usize)
            .ok_or_else(|| TraceError::UnknownKind(format!("tag {tag}")))
    }

    pub fn layout(&self, kind: Kind) -> Result<&KindLayout> {
        self.layout_for_tag(kind.0)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &KindLayout> {
        self.layouts.iter()
    }

    /// Predefined name of a handle id, if it has one.
    pub fn handle_name(&self, kind: HandleKind, id: i32) -> Option<&'static str> {
        self.handle_table(kind)?.by_id.get(&id).copied()
    }

    /// Id of a predefined handle name.
    pub fn handle_id(&self, kind: HandleKind, name: &str) -> Option<i32> {
        self.handle_table(kind)?.by_name.get(name).copied()
    }

    fn handle_table(&self, kind: HandleKind) -> Option<&HandleNames> {
        match kind {
            HandleKind::Datatype => Some(&self.datatypes),
            HandleKind::Comm => Some(&self.comms),
            HandleKind::Op => Some(&self.ops),
            _ => None,
        }
    }
}
