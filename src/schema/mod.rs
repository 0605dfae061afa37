//! Declarative per-kind field descriptors.
//!
//! Each record kind is a name plus an ordered list of [`FieldSpec`]s. The order is the wire
//! order and the ASCII order. The codec, the reconstructor and the renderer all walk the same
//! list, so adding a kind means adding one entry to [`mpi`] or [`mpio`] and nothing else.
//!
//! Length sources and presence predicates may only refer to fields declared earlier in the
//! same list; the registry checks this when it is built.

#[macro_use]
mod macros {
    /// Builds a kind table from `"NAME" => [fields...]` entries.
    ///
    /// Struct literals keep the nested field slices in a lifetime-extending position, so the
    /// whole table is a `'static` constant.
    macro_rules! kinds {
        ($($name:literal => [$($field:expr),* $(,)?]),* $(,)?) => {
            &[$($crate::schema::KindSpec { name: $name, fields: &[$($field),*] }),*]
        };
    }
}

mod handles;
mod mpi;
mod mpio;

pub use handles::{PREDEFINED_COMMS, PREDEFINED_DATATYPES, PREDEFINED_OPS};

use crate::trace::{HandleKind, Version};

/// Scalar element type of a field or array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scalar {
    /// 32-bit `int`.
    Int,
    /// 64-bit `MPI_Aint`.
    Aint,
    /// 64-bit `MPI_Offset`.
    Offset,
    /// 32-bit handle of the given family.
    Handle(HandleKind),
}

impl Scalar {
    /// Type token used in ASCII field lines.
    pub fn token(self) -> &'static str {
        match self {
            Scalar::Int => "int",
            Scalar::Aint => "MPI_Aint",
            Scalar::Offset => "MPI_Offset",
            Scalar::Handle(kind) => kind.token(),
        }
    }

    pub fn is_wide(self) -> bool {
        matches!(self, Scalar::Aint | Scalar::Offset)
    }
}

/// Where an array takes its element count from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Len {
    /// An earlier integer field of the same record.
    Field(&'static str),
    /// The array carries its own `i32` count on the wire (argv-shaped fields).
    Prefixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Scalar(Scalar),
    Array(Scalar, Len),
    /// Int array that may be passed as an "ignore" constant (e.g. `MPI_ERRCODES_IGNORE`).
    OptIntArray(Len),
    /// Int rows with a fixed column count (`ranges[n][3]`).
    IntMatrix(Len, usize),
    Status,
    StatusArray(Len),
    Str,
    StrArray(Len),
    /// One prefixed string array per row (`argv` per spawned command).
    StrTable(Len),
}

impl FieldType {
    /// ASCII type token for the field line.
    pub fn token(self) -> &'static str {
        match self {
            FieldType::Scalar(s) | FieldType::Array(s, _) => s.token(),
            FieldType::OptIntArray(_) | FieldType::IntMatrix(_, _) => "int",
            FieldType::Status | FieldType::StatusArray(_) => "MPI_Status",
            FieldType::Str => "char*",
            FieldType::StrArray(_) => "char**",
            FieldType::StrTable(_) => "char***",
        }
    }

    /// The count source, if the field is an array of any shape.
    pub fn count_source(self) -> Option<Len> {
        match self {
            FieldType::Array(_, len)
            | FieldType::OptIntArray(len)
            | FieldType::IntMatrix(len, _)
            | FieldType::StatusArray(len)
            | FieldType::StrArray(len)
            | FieldType::StrTable(len) => Some(len),
            FieldType::Scalar(_) | FieldType::Status | FieldType::Str => None,
        }
    }
}

/// When a field is present on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Always,
    /// Present only when the earlier `commrank` field equals the earlier `root` field.
    RootOnly,
}

/// Bug-compatible decode rules for streams older than a given version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Legacy {
    /// The array was written as its first element only.
    SingleElementBefore(Version),
    /// The scalar was written twice; the second copy is read and dropped.
    DoubleWrittenBefore(Version),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub presence: Presence,
    pub legacy: Option<Legacy>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Always,
            legacy: None,
        }
    }

    pub const fn root_only(mut self) -> Self {
        self.presence = Presence::RootOnly;
        self
    }

    pub const fn legacy(mut self, rule: Legacy) -> Self {
        self.legacy = Some(rule);
        self
    }
}

/// One record kind: its call name and field list.
#[derive(Clone, Copy, Debug)]
pub struct KindSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Every kind in enumeration order. The position in this list is the kind's tag.
pub fn all_kinds() -> impl Iterator<Item = &'static KindSpec> {
    mpi::KINDS.iter().chain(mpio::KINDS.iter())
}

// Descriptor shorthands used by the kind tables.

pub(crate) const fn int(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Scalar(Scalar::Int))
}

pub(crate) const fn aint(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Scalar(Scalar::Aint))
}

pub(crate) const fn offset(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Scalar(Scalar::Offset))
}

pub(crate) const fn handle(kind: HandleKind, name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Scalar(Scalar::Handle(kind)))
}

pub(crate) const fn comm(name: &'static str) -> FieldSpec {
    handle(HandleKind::Comm, name)
}

pub(crate) const fn datatype(name: &'static str) -> FieldSpec {
    handle(HandleKind::Datatype, name)
}

pub(crate) const fn group(name: &'static str) -> FieldSpec {
    handle(HandleKind::Group, name)
}

pub(crate) const fn request(name: &'static str) -> FieldSpec {
    handle(HandleKind::Request, name)
}

pub(crate) const fn op(name: &'static str) -> FieldSpec {
    handle(HandleKind::Op, name)
}

pub(crate) const fn win(name: &'static str) -> FieldSpec {
    handle(HandleKind::Win, name)
}

pub(crate) const fn info(name: &'static str) -> FieldSpec {
    handle(HandleKind::Info, name)
}

pub(crate) const fn file(name: &'static str) -> FieldSpec {
    handle(HandleKind::File, name)
}

pub(crate) const fn errhandler(name: &'static str) -> FieldSpec {
    handle(HandleKind::Errhandler, name)
}

pub(crate) const fn keyval(name: &'static str) -> FieldSpec {
    handle(HandleKind::Keyval, name)
}

pub(crate) const fn ints(name: &'static str, count: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Array(Scalar::Int, Len::Field(count)))
}

pub(crate) const fn aints(name: &'static str, count: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Array(Scalar::Aint, Len::Field(count)))
}

pub(crate) const fn handles(kind: HandleKind, name: &'static str, count: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Array(Scalar::Handle(kind), Len::Field(count)))
}

pub(crate) const fn opt_ints(name: &'static str, count: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::OptIntArray(Len::Field(count)))
}

pub(crate) const fn int_rows(name: &'static str, count: &'static str, cols: usize) -> FieldSpec {
    FieldSpec::new(name, FieldType::IntMatrix(Len::Field(count), cols))
}

pub(crate) const fn status(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Status)
}

pub(crate) const fn statuses(name: &'static str, count: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::StatusArray(Len::Field(count)))
}

pub(crate) const fn string(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Str)
}

pub(crate) const fn argv(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::StrArray(Len::Prefixed))
}

pub(crate) const fn strings(name: &'static str, count: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::StrArray(Len::Field(count)))
}

pub(crate) const fn argv_table(name: &'static str, count: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::StrTable(Len::Field(count)))
}
