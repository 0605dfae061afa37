//! Field layouts of the MPI-IO calls. These follow the MPI kinds in the enumeration.

use super::*;
use crate::trace::HandleKind::Request;

pub(super) static KINDS: &[KindSpec] = kinds![
    "MPI_File_open" => [
        comm("comm"), string("filename"), int("amode"), info("info"), file("file"),
    ],
    "MPI_File_close" => [file("file")],
    "MPI_File_delete" => [string("filename"), info("info")],
    "MPI_File_set_size" => [file("file"), offset("size")],
    "MPI_File_preallocate" => [file("file"), offset("size")],
    "MPI_File_get_size" => [file("file"), offset("size")],
    "MPI_File_get_group" => [file("file"), group("group")],
    "MPI_File_get_amode" => [file("file"), int("amode")],
    "MPI_File_set_info" => [file("file"), info("info")],
    "MPI_File_get_info" => [file("file"), info("info")],
    "MPI_File_set_view" => [
        file("file"), offset("offset"), datatype("hosttype"), datatype("filetype"),
        string("datarep"), info("info"),
    ],
    "MPI_File_get_view" => [
        file("file"), offset("offset"), datatype("hosttype"), datatype("filetype"),
        string("datarep"),
    ],
    "MPI_File_read_at" => [
        file("file"), offset("offset"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_read_at_all" => [
        file("file"), offset("offset"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_write_at" => [
        file("file"), offset("offset"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_write_at_all" => [
        file("file"), offset("offset"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_iread_at" => [
        file("file"), offset("offset"), int("count"), datatype("datatype"),
        request("request"),
    ],
    "MPI_File_iwrite_at" => [
        file("file"), offset("offset"), int("count"), datatype("datatype"),
        request("request"),
    ],
    "MPI_File_read" => [file("file"), int("count"), datatype("datatype"), status("status")],
    "MPI_File_read_all" => [
        file("file"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_write" => [file("file"), int("count"), datatype("datatype"), status("status")],
    "MPI_File_write_all" => [
        file("file"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_iread" => [file("file"), int("count"), datatype("datatype"), request("request")],
    "MPI_File_iwrite" => [
        file("file"), int("count"), datatype("datatype"), request("request"),
    ],
    "MPI_File_seek" => [file("file"), offset("offset"), int("whence")],
    "MPI_File_get_position" => [file("file"), offset("offset")],
    "MPI_File_get_byte_offset" => [file("file"), offset("offset"), offset("bytes")],
    "MPI_File_read_shared" => [
        file("file"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_write_shared" => [
        file("file"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_iread_shared" => [
        file("file"), int("count"), datatype("datatype"), request("request"),
    ],
    "MPI_File_iwrite_shared" => [
        file("file"), int("count"), datatype("datatype"), request("request"),
    ],
    "MPI_File_read_ordered" => [
        file("file"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_write_ordered" => [
        file("file"), int("count"), datatype("datatype"), status("status"),
    ],
    "MPI_File_seek_shared" => [file("file"), offset("offset"), int("whence")],
    "MPI_File_get_position_shared" => [file("file"), offset("offset")],
    "MPI_File_read_at_all_begin" => [
        file("file"), offset("offset"), int("count"), datatype("datatype"),
    ],
    "MPI_File_read_at_all_end" => [file("file"), status("status")],
    "MPI_File_write_at_all_begin" => [
        file("file"), offset("offset"), int("count"), datatype("datatype"),
    ],
    "MPI_File_write_at_all_end" => [file("file"), status("status")],
    "MPI_File_read_all_begin" => [file("file"), int("count"), datatype("datatype")],
    "MPI_File_read_all_end" => [file("file"), status("status")],
    "MPI_File_write_all_begin" => [file("file"), int("count"), datatype("datatype")],
    "MPI_File_write_all_end" => [file("file"), status("status")],
    "MPI_File_read_ordered_begin" => [file("file"), int("count"), datatype("datatype")],
    "MPI_File_read_ordered_end" => [file("file"), status("status")],
    "MPI_File_write_ordered_begin" => [file("file"), int("count"), datatype("datatype")],
    "MPI_File_write_ordered_end" => [file("file"), status("status")],
    "MPI_File_get_type_extent" => [file("file"), datatype("datatype"), aint("extent")],
    "MPI_Register_datarep" => [string("name")],
    "MPI_File_set_atomicity" => [file("file"), int("flag")],
    "MPI_File_get_atomicity" => [file("file"), int("flag")],
    "MPI_File_sync" => [file("file")],

    // ROMIO request completion
    "MPIO_Test" => [request("request"), int("flag"), status("status")],
    "MPIO_Wait" => [request("request"), status("status")],
    "MPIO_Testall" => [
        int("count"), handles(Request, "requests", "count"), int("flag"),
        statuses("statuses", "count"),
    ],
    "MPIO_Waitall" => [
        int("count"), handles(Request, "requests", "count"), statuses("statuses", "count"),
    ],
    "MPIO_Testany" => [
        int("count"), handles(Request, "requests", "count"), int("index"), int("flag"),
        status("status"),
    ],
    "MPIO_Waitany" => [
        int("count"), handles(Request, "requests", "count"), int("index"), status("status"),
    ],
    "MPIO_Waitsome" => [
        int("count"), handles(Request, "requests", "count"), int("outcount"),
        ints("indices", "outcount"), statuses("statuses", "outcount"),
    ],
    "MPIO_Testsome" => [
        int("count"), handles(Request, "requests", "count"), int("outcount"),
        ints("indices", "outcount"), statuses("statuses", "outcount"),
    ],
];
