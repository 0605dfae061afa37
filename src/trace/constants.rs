//! Shared constants for the trace format.
//!
//! Version thresholds for the legacy decode paths live here too, so the schema tables and the
//! record codec agree on a single definition.

use crate::trace::Version;

/// Leading (and trailing) magic of every binary trace.
pub const MAGIC: [u8; 8] = [0xFF, b'M', b'P', b'I', b'T', b'R', b'C', 0];

/// Version stamped into every header this crate writes.
pub const FORMAT_VERSION: Version = Version::new(0, 7, 0);

/// `MPI_Cart_coords.coords` was written as a single element before this version.
pub const CART_COORDS_FIXED: Version = Version::new(0, 6, 7);

/// `MPI_Graph_get.index` was written as a single element before this version.
pub const GRAPH_GET_INDEX_FIXED: Version = Version::new(0, 6, 8);

/// `MPI_Type_struct.count` was written twice before this version.
pub const TYPE_STRUCT_COUNT_FIXED: Version = Version::new(0, 6, 3);

/// Tag that replaces a record kind tag once the record stream is over.
pub const FOOTER_TAG: u16 = 0xFFFF;

/// Maximum number of performance counters a single record may carry.
pub const MAX_PERF_COUNTERS: usize = 8;

/// Largest datatype id the datatype-size table accepts.
pub const MAX_DATATYPE_INDEX: usize = 100_000;

/// Upper bound for any string on the wire.
pub const MAX_STRING_LEN: usize = 1 << 20;

/// Upper bound for any count-prefixed table or array on the wire.
pub const MAX_TABLE_LEN: usize = 1 << 24;

/// Most elements reserved up front for a count read off the wire.
pub const MAX_PREALLOC: usize = 4096;

/// Number of `u64` offsets in the trailing index.
pub const INDEX_ENTRIES: usize = 7;
