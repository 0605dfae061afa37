//! Predefined handle ids and their MPI names.
//!
//! Handles are traced as small integers. The predefined objects occupy fixed ids at the bottom
//! of each range; user-created objects start after them.

pub const PREDEFINED_DATATYPES: &[(&str, i32)] = &[
    ("MPI_DATATYPE_ERROR", 0),
    ("MPI_DATATYPE_NULL", 1),
    ("MPI_CHAR", 2),
    ("MPI_SIGNED_CHAR", 3),
    ("MPI_UNSIGNED_CHAR", 4),
    ("MPI_BYTE", 5),
    ("MPI_WCHAR", 6),
    ("MPI_SHORT", 7),
    ("MPI_UNSIGNED_SHORT", 8),
    ("MPI_INT", 9),
    ("MPI_UNSIGNED", 10),
    ("MPI_LONG", 11),
    ("MPI_UNSIGNED_LONG", 12),
    ("MPI_FLOAT", 13),
    ("MPI_DOUBLE", 14),
    ("MPI_LONG_DOUBLE", 15),
    ("MPI_LONG_LONG_INT", 16),
    ("MPI_UNSIGNED_LONG_LONG", 17),
    ("MPI_LONG_LONG", 18),
    ("MPI_PACKED", 19),
    ("MPI_LB", 20),
    ("MPI_UB", 21),
    ("MPI_FLOAT_INT", 22),
    ("MPI_DOUBLE_INT", 23),
    ("MPI_LONG_INT", 24),
    ("MPI_SHORT_INT", 25),
    ("MPI_2INT", 26),
    ("MPI_LONG_DOUBLE_INT", 27),
];

pub const PREDEFINED_COMMS: &[(&str, i32)] = &[
    ("MPI_COMM_NULL", 0),
    ("MPI_COMM_WORLD", 1),
    ("MPI_COMM_SELF", 2),
];

pub const PREDEFINED_OPS: &[(&str, i32)] = &[
    ("MPI_OP_ERROR", 0),
    ("MPI_OP_NULL", 1),
    ("MPI_MAX", 2),
    ("MPI_MIN", 3),
    ("MPI_SUM", 4),
    ("MPI_PROD", 5),
    ("MPI_LAND", 6),
    ("MPI_BAND", 7),
    ("MPI_LOR", 8),
    ("MPI_BOR", 9),
    ("MPI_LXOR", 10),
    ("MPI_BXOR", 11),
    ("MPI_MINLOC", 12),
    ("MPI_MAXLOC", 13),
    ("MPI_REPLACE", 14),
];
