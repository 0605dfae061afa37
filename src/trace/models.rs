//! Call record model shared by the codec, the ASCII reconstructor and the renderer.
//!
//! A record is the common [`Envelope`] plus one [`Value`] per field of its kind, in the order
//! the kind's descriptor list declares them. The descriptor list (see [`crate::schema`]) is the
//! only place that knows what each slot means.

use std::fmt;

use serde::Serialize;

/// Format version triple, ordered lexicographically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Position of a record kind in the fixed enumeration.
///
/// The same value is the record's start/end tag on the wire and the footer index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Kind(pub u16);

impl Kind {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One clock reading. `nanos` is carried verbatim, it is not normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    pub const fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }
}

/// Entering and exiting readings of one clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClockPair {
    pub start: Timestamp,
    pub stop: Timestamp,
}

/// A single performance-counter reading around one call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PerfReading {
    pub name: String,
    pub before: i64,
    pub after: i64,
}

/// Fields common to every call record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub thread: u32,
    pub wall: ClockPair,
    pub cpu: ClockPair,
    pub perf: Vec<PerfReading>,
}

/// The MPI object family a handle belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum HandleKind {
    Comm,
    Datatype,
    Group,
    Request,
    Op,
    Win,
    Info,
    File,
    Errhandler,
    Keyval,
}

impl HandleKind {
    /// Type token used in ASCII field lines.
    pub fn token(self) -> &'static str {
        match self {
            HandleKind::Comm => "MPI_Comm",
            HandleKind::Datatype => "MPI_Datatype",
            HandleKind::Group => "MPI_Group",
            HandleKind::Request => "MPI_Request",
            HandleKind::Op => "MPI_Op",
            HandleKind::Win => "MPI_Win",
            HandleKind::Info => "MPI_Info",
            HandleKind::File => "MPI_File",
            HandleKind::Errhandler => "MPI_Errhandler",
            // Keyvals are plain ints in the MPI API.
            HandleKind::Keyval => "int",
        }
    }
}

/// An opaque MPI object id. Same wire width as a plain int, distinct at the model level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Handle {
    pub kind: HandleKind,
    pub id: i32,
}

impl Handle {
    pub const fn new(kind: HandleKind, id: i32) -> Self {
        Self { kind, id }
    }
}

/// Contents of an `MPI_Status` that was actually requested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub bytes: i32,
    pub cancelled: i32,
    pub source: i32,
    pub tag: i32,
    pub error: i32,
}

/// One field of a call record.
///
/// `None` inside the optional variants is the explicit "ignored" sentinel and is never the
/// same thing as an empty array or a zeroed status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Int(i32),
    Long(i64),
    Handle(Handle),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    HandleArray(HandleKind, Vec<i32>),
    OptIntArray(Option<Vec<i32>>),
    IntMatrix(Vec<Vec<i32>>),
    Status(Option<Status>),
    StatusArray(Option<Vec<Status>>),
    Str(String),
    StrArray(Vec<String>),
    StrTable(Vec<Vec<String>>),
    /// A root-only field on a rank that was not the root.
    Absent,
}

impl Value {
    /// Integer view used for length sources and rank/root predicates.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Handle(h) => Some(h.id),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

/// A decoded or reconstructed call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
    pub kind: Kind,
    pub envelope: Envelope,
    pub fields: Vec<Value>,
}

impl CallRecord {
    pub fn new(kind: Kind, envelope: Envelope, fields: Vec<Value>) -> Self {
        Self {
            kind,
            envelope,
            fields,
        }
    }
}
