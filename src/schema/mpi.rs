//! Field layouts of the MPI-1 and MPI-2 calls (everything except file I/O).
//!
//! Order matters twice over: the position of a kind in [`KINDS`] is its wire tag and footer
//! index, and the order of fields inside a kind is the wire and ASCII order. Append new kinds
//! at the end of [`super::mpio::KINDS`] only; inserting here renumbers every later kind.

use super::*;
use crate::trace::constants::{CART_COORDS_FIXED, GRAPH_GET_INDEX_FIXED, TYPE_STRUCT_COUNT_FIXED};
use crate::trace::HandleKind::{Datatype, Info, Request};

pub(super) static KINDS: &[KindSpec] = kinds![
    // Point to point
    "MPI_Send" => [int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm")],
    "MPI_Recv" => [
        int("count"), datatype("datatype"), int("source"), int("tag"), comm("comm"),
        status("status"),
    ],
    "MPI_Get_count" => [status("status"), datatype("datatype"), int("count")],
    "MPI_Bsend" => [int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm")],
    "MPI_Ssend" => [int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm")],
    "MPI_Rsend" => [int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm")],
    "MPI_Buffer_attach" => [int("size")],
    "MPI_Buffer_detach" => [int("size")],
    "MPI_Isend" => [
        int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Ibsend" => [
        int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Issend" => [
        int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Irsend" => [
        int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Irecv" => [
        int("count"), datatype("datatype"), int("source"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Wait" => [request("request"), status("status")],
    "MPI_Test" => [request("request"), int("flag"), status("status")],
    "MPI_Request_free" => [request("request")],
    "MPI_Waitany" => [
        int("count"), handles(Request, "requests", "count"), int("index"), status("status"),
    ],
    "MPI_Testany" => [
        int("count"), handles(Request, "requests", "count"), int("index"), int("flag"),
        status("status"),
    ],
    "MPI_Waitall" => [
        int("count"), handles(Request, "requests", "count"), statuses("statuses", "count"),
    ],
    "MPI_Testall" => [
        int("count"), handles(Request, "requests", "count"), int("flag"),
        statuses("statuses", "count"),
    ],
    "MPI_Waitsome" => [
        int("count"), handles(Request, "requests", "count"), int("outcount"),
        ints("indices", "outcount"), statuses("statuses", "outcount"),
    ],
    "MPI_Testsome" => [
        int("count"), handles(Request, "requests", "count"), int("outcount"),
        ints("indices", "outcount"), statuses("statuses", "outcount"),
    ],
    "MPI_Iprobe" => [int("source"), int("tag"), comm("comm"), int("flag"), status("status")],
    "MPI_Probe" => [int("source"), int("tag"), comm("comm"), status("status")],
    "MPI_Cancel" => [request("request")],
    "MPI_Test_cancelled" => [status("status"), int("cancelled")],
    "MPI_Send_init" => [
        int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Bsend_init" => [
        int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Ssend_init" => [
        int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Rsend_init" => [
        int("count"), datatype("datatype"), int("dest"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Recv_init" => [
        int("count"), datatype("datatype"), int("source"), int("tag"), comm("comm"),
        request("request"),
    ],
    "MPI_Start" => [request("request")],
    "MPI_Startall" => [int("count"), handles(Request, "requests", "count")],
    "MPI_Sendrecv" => [
        int("sendcount"), datatype("sendtype"), int("dest"), int("sendtag"), int("recvcount"),
        datatype("recvtype"), int("source"), int("recvtag"), comm("comm"), status("status"),
    ],
    "MPI_Sendrecv_replace" => [
        int("count"), datatype("datatype"), int("dest"), int("sendtag"), int("source"),
        int("recvtag"), comm("comm"), status("status"),
    ],

    // Derived datatypes
    "MPI_Type_contiguous" => [int("count"), datatype("oldtype"), datatype("newtype")],
    "MPI_Type_vector" => [
        int("count"), int("blocklength"), int("stride"), datatype("oldtype"),
        datatype("newtype"),
    ],
    "MPI_Type_hvector" => [
        int("count"), int("blocklength"), aint("stride"), datatype("oldtype"),
        datatype("newtype"),
    ],
    "MPI_Type_indexed" => [
        int("count"), ints("lengths", "count"), ints("indices", "count"), datatype("oldtype"),
        datatype("newtype"),
    ],
    "MPI_Type_hindexed" => [
        int("count"), ints("lengths", "count"), aints("indices", "count"), datatype("oldtype"),
        datatype("newtype"),
    ],
    "MPI_Type_struct" => [
        int("count").legacy(Legacy::DoubleWrittenBefore(TYPE_STRUCT_COUNT_FIXED)),
        ints("lengths", "count"), aints("indices", "count"),
        handles(Datatype, "oldtypes", "count"), datatype("newtype"),
    ],
    "MPI_Address" => [aint("address")],
    "MPI_Type_extent" => [datatype("datatype"), aint("extent")],
    "MPI_Type_size" => [datatype("datatype"), int("size")],
    "MPI_Type_lb" => [datatype("datatype"), aint("lb")],
    "MPI_Type_ub" => [datatype("datatype"), aint("ub")],
    "MPI_Type_commit" => [datatype("datatype")],
    "MPI_Type_free" => [datatype("datatype")],
    "MPI_Get_elements" => [status("status"), datatype("datatype"), int("elements")],
    "MPI_Pack" => [
        int("incount"), datatype("datatype"), int("outcount"), int("position_in"),
        int("position_out"), comm("comm"),
    ],
    "MPI_Unpack" => [
        int("incount"), int("position_in"), int("position_out"), int("outcount"),
        datatype("datatype"), comm("comm"),
    ],
    "MPI_Pack_size" => [int("incount"), datatype("datatype"), comm("comm"), int("size")],

    // Collectives
    "MPI_Barrier" => [comm("comm")],
    "MPI_Bcast" => [int("count"), datatype("datatype"), int("root"), comm("comm")],
    "MPI_Gather" => [
        int("commrank"), int("root"), int("sendcount"), datatype("sendtype"),
        int("recvcount").root_only(), datatype("recvtype").root_only(), comm("comm"),
    ],
    "MPI_Gatherv" => [
        int("commrank"), int("root"), int("commsize"), int("sendcount"), datatype("sendtype"),
        ints("recvcounts", "commsize").root_only(), ints("displs", "commsize").root_only(),
        datatype("recvtype").root_only(), comm("comm"),
    ],
    "MPI_Scatter" => [
        int("commrank"), int("root"), int("sendcount").root_only(),
        datatype("sendtype").root_only(), int("recvcount"), datatype("recvtype"), comm("comm"),
    ],
    "MPI_Scatterv" => [
        int("commrank"), int("root"), int("commsize"),
        ints("sendcounts", "commsize").root_only(), ints("displs", "commsize").root_only(),
        datatype("sendtype").root_only(), int("recvcount"), datatype("recvtype"), comm("comm"),
    ],
    "MPI_Allgather" => [
        int("sendcount"), datatype("sendtype"), int("recvcount"), datatype("recvtype"),
        comm("comm"),
    ],
    "MPI_Allgatherv" => [
        int("commsize"), int("sendcount"), datatype("sendtype"),
        ints("recvcounts", "commsize"), ints("displs", "commsize"), datatype("recvtype"),
        comm("comm"),
    ],
    "MPI_Alltoall" => [
        int("sendcount"), datatype("sendtype"), int("recvcount"), datatype("recvtype"),
        comm("comm"),
    ],
    "MPI_Alltoallv" => [
        int("commsize"), ints("sendcounts", "commsize"), ints("senddispls", "commsize"),
        datatype("sendtype"), ints("recvcounts", "commsize"), ints("recvdispls", "commsize"),
        datatype("recvtype"), comm("comm"),
    ],
    "MPI_Reduce" => [
        int("count"), datatype("datatype"), op("op"), int("root"), comm("comm"),
    ],
    "MPI_Op_create" => [int("commute"), op("op")],
    "MPI_Op_free" => [op("op")],
    "MPI_Allreduce" => [int("count"), datatype("datatype"), op("op"), comm("comm")],
    "MPI_Reduce_scatter" => [
        int("commsize"), ints("recvcounts", "commsize"), datatype("datatype"), op("op"),
        comm("comm"),
    ],
    "MPI_Scan" => [int("count"), datatype("datatype"), op("op"), comm("comm")],

    // Groups and communicators
    "MPI_Group_size" => [group("group"), int("size")],
    "MPI_Group_rank" => [group("group"), int("rank")],
    "MPI_Group_translate_ranks" => [
        group("group1"), int("count"), ints("ranks1", "count"), group("group2"),
        ints("ranks2", "count"),
    ],
    "MPI_Group_compare" => [group("group1"), group("group2"), int("result")],
    "MPI_Comm_group" => [comm("comm"), group("group")],
    "MPI_Group_union" => [group("group1"), group("group2"), group("newgroup")],
    "MPI_Group_intersection" => [group("group1"), group("group2"), group("newgroup")],
    "MPI_Group_difference" => [group("group1"), group("group2"), group("newgroup")],
    "MPI_Group_incl" => [
        group("group"), int("count"), ints("ranks", "count"), group("newgroup"),
    ],
    "MPI_Group_excl" => [
        group("group"), int("count"), ints("ranks", "count"), group("newgroup"),
    ],
    "MPI_Group_range_incl" => [
        group("group"), int("count"), int_rows("ranges", "count", 3), group("newgroup"),
    ],
    "MPI_Group_range_excl" => [
        group("group"), int("count"), int_rows("ranges", "count", 3), group("newgroup"),
    ],
    "MPI_Group_free" => [group("group")],
    "MPI_Comm_size" => [comm("comm"), int("size")],
    "MPI_Comm_rank" => [comm("comm"), int("rank")],
    "MPI_Comm_compare" => [comm("comm1"), comm("comm2"), int("result")],
    "MPI_Comm_dup" => [comm("oldcomm"), comm("newcomm")],
    "MPI_Comm_create" => [comm("oldcomm"), group("group"), comm("newcomm")],
    "MPI_Comm_split" => [comm("oldcomm"), int("color"), int("key"), comm("newcomm")],
    "MPI_Comm_free" => [comm("comm")],
    "MPI_Comm_test_inter" => [comm("comm"), int("inter")],
    "MPI_Comm_remote_size" => [comm("comm"), int("size")],
    "MPI_Comm_remote_group" => [comm("comm"), group("group")],
    "MPI_Intercomm_create" => [
        comm("localcomm"), int("localleader"), comm("remotecomm"), int("remoteleader"),
        int("tag"), comm("newintercomm"),
    ],
    "MPI_Intercomm_merge" => [comm("comm"), int("high"), comm("newintracomm")],
    "MPI_Keyval_create" => [keyval("key")],
    "MPI_Keyval_free" => [keyval("key")],
    "MPI_Attr_put" => [comm("comm"), keyval("key")],
    "MPI_Attr_get" => [comm("comm"), keyval("key"), int("flag")],
    "MPI_Attr_delete" => [comm("comm"), keyval("key")],

    // Process topologies
    "MPI_Topo_test" => [comm("comm"), int("topo")],
    "MPI_Cart_create" => [
        comm("oldcomm"), int("ndim"), ints("dims", "ndim"), ints("periods", "ndim"),
        int("reorder"), comm("newcomm"),
    ],
    "MPI_Dims_create" => [int("nodes"), int("ndim"), ints("dims", "ndim")],
    "MPI_Graph_create" => [
        comm("oldcomm"), int("nodes"), ints("index", "nodes"), int("numedges"),
        ints("edges", "numedges"), int("reorder"), comm("newcomm"),
    ],
    "MPI_Graphdims_get" => [comm("comm"), int("nodes"), int("edges")],
    "MPI_Graph_get" => [
        comm("comm"), int("maxindex"), int("maxedges"),
        ints("index", "maxindex").legacy(Legacy::SingleElementBefore(GRAPH_GET_INDEX_FIXED)),
        ints("edges", "maxedges"),
    ],
    "MPI_Cartdim_get" => [comm("comm"), int("ndim")],
    "MPI_Cart_get" => [
        comm("comm"), int("maxdims"), ints("dims", "maxdims"), ints("periods", "maxdims"),
        ints("coords", "maxdims"),
    ],
    "MPI_Cart_rank" => [comm("comm"), int("ndim"), ints("coords", "ndim"), int("rank")],
    "MPI_Cart_coords" => [
        comm("comm"), int("rank"), int("maxdims"),
        ints("coords", "maxdims").legacy(Legacy::SingleElementBefore(CART_COORDS_FIXED)),
    ],
    "MPI_Graph_neighbors_count" => [comm("comm"), int("rank"), int("nneigh")],
    "MPI_Graph_neighbors" => [
        comm("comm"), int("rank"), int("maxneighbors"), ints("neighbors", "maxneighbors"),
    ],
    "MPI_Cart_shift" => [
        comm("comm"), int("direction"), int("displ"), int("source"), int("dest"),
    ],
    "MPI_Cart_sub" => [
        comm("oldcomm"), int("ndim"), ints("remain_dims", "ndim"), comm("newcomm"),
    ],
    "MPI_Cart_map" => [
        comm("comm"), int("ndim"), ints("dims", "ndim"), ints("period", "ndim"),
        int("newrank"),
    ],
    "MPI_Graph_map" => [
        comm("comm"), int("nodes"), ints("index", "nodes"), int("numedges"),
        ints("edges", "numedges"), int("newrank"),
    ],

    // Environment
    "MPI_Get_processor_name" => [string("name"), int("resultlen")],
    "MPI_Get_version" => [int("version"), int("subversion")],
    "MPI_Errhandler_create" => [errhandler("errhandler")],
    "MPI_Errhandler_set" => [comm("comm"), errhandler("errhandler")],
    "MPI_Errhandler_get" => [comm("comm"), errhandler("errhandler")],
    "MPI_Errhandler_free" => [errhandler("errhandler")],
    "MPI_Error_string" => [int("errorcode"), string("errorstring"), int("resultlen")],
    "MPI_Error_class" => [int("errorcode"), int("errorclass")],
    "MPI_Wtime" => [],
    "MPI_Wtick" => [],
    "MPI_Init" => [int("argc"), argv("argv")],
    "MPI_Finalize" => [],
    "MPI_Initialized" => [int("result")],
    "MPI_Abort" => [comm("comm"), int("errorcode")],
    "MPI_Pcontrol" => [int("level")],

    // Dynamic processes
    "MPI_Close_port" => [string("portname")],
    "MPI_Comm_accept" => [
        string("portname"), info("info"), int("root"), comm("oldcomm"), comm("newcomm"),
    ],
    "MPI_Comm_connect" => [
        string("portname"), info("info"), int("root"), comm("oldcomm"), comm("newcomm"),
    ],
    "MPI_Comm_disconnect" => [comm("comm")],
    "MPI_Comm_get_parent" => [comm("parent")],
    "MPI_Comm_join" => [int("fd"), comm("comm")],
    "MPI_Comm_spawn" => [
        int("commrank"), int("root"), string("command").root_only(), argv("argv").root_only(),
        int("maxprocs"), info("info").root_only(), comm("oldcomm"), comm("intercomm"),
        opt_ints("errcodes", "maxprocs"),
    ],
    "MPI_Comm_spawn_multiple" => [
        int("commrank"), int("root"), int("count"),
        strings("commands", "count").root_only(), argv_table("argvs", "count").root_only(),
        ints("maxprocs", "count").root_only(), handles(Info, "info", "count").root_only(),
        comm("oldcomm"), comm("intercomm"), int("totprocs"), opt_ints("errcodes", "totprocs"),
    ],
    "MPI_Lookup_name" => [string("servicename"), info("info"), string("portname")],
    "MPI_Open_port" => [info("info"), string("portname")],
    "MPI_Publish_name" => [string("servicename"), info("info"), string("portname")],
    "MPI_Unpublish_name" => [string("servicename"), info("info"), string("portname")],

    // One-sided communication
    "MPI_Accumulate" => [
        int("origincount"), datatype("origintype"), int("targetrank"), aint("targetdisp"),
        int("targetcount"), datatype("targettype"), op("op"), win("win"),
    ],
    "MPI_Get" => [
        int("origincount"), datatype("origintype"), int("targetrank"), aint("targetdisp"),
        int("targetcount"), datatype("targettype"), win("win"),
    ],
    "MPI_Put" => [
        int("origincount"), datatype("origintype"), int("targetrank"), aint("targetdisp"),
        int("targetcount"), datatype("targettype"), win("win"),
    ],
    "MPI_Win_complete" => [win("win")],
    "MPI_Win_create" => [aint("size"), int("dispunit"), info("info"), comm("comm"), win("win")],
    "MPI_Win_fence" => [int("assertion"), win("win")],
    "MPI_Win_free" => [win("win")],
    "MPI_Win_get_group" => [win("win"), group("group")],
    "MPI_Win_lock" => [int("locktype"), int("winrank"), int("assertion"), win("win")],
    "MPI_Win_post" => [group("group"), int("assertion"), win("win")],
    "MPI_Win_start" => [group("group"), int("assertion"), win("win")],
    "MPI_Win_test" => [win("win"), int("flag")],
    "MPI_Win_unlock" => [int("winrank"), win("win")],
    "MPI_Win_wait" => [win("win")],

    // Extended collectives
    "MPI_Alltoallw" => [
        int("commsize"), ints("sendcounts", "commsize"), ints("senddispls", "commsize"),
        handles(Datatype, "sendtypes", "commsize"), ints("recvcounts", "commsize"),
        ints("recvdispls", "commsize"), handles(Datatype, "recvtypes", "commsize"),
        comm("comm"),
    ],
    "MPI_Exscan" => [int("count"), datatype("datatype"), op("op"), comm("comm")],

    // Error classes, attributes and naming
    "MPI_Add_error_class" => [int("errorclass")],
    "MPI_Add_error_code" => [int("errorclass"), int("errorcode")],
    "MPI_Add_error_string" => [int("errorcode"), string("errorstring")],
    "MPI_Comm_call_errhandler" => [comm("comm"), int("errorcode")],
    "MPI_Comm_create_keyval" => [keyval("comm_keyval")],
    "MPI_Comm_delete_attr" => [comm("comm"), keyval("comm_keyval")],
    "MPI_Comm_free_keyval" => [keyval("comm_keyval")],
    "MPI_Comm_get_attr" => [comm("comm"), keyval("comm_keyval"), int("flag")],
    "MPI_Comm_get_name" => [comm("comm"), string("name"), int("resultlen")],
    "MPI_Comm_set_attr" => [comm("comm"), keyval("comm_keyval")],
    "MPI_Comm_set_name" => [comm("comm"), string("name")],
    "MPI_File_call_errhandler" => [file("file"), int("errorcode")],
    "MPI_Grequest_complete" => [request("request")],
    "MPI_Grequest_start" => [request("request")],
    "MPI_Init_thread" => [int("argc"), argv("argv"), int("required"), int("provided")],
    "MPI_Is_thread_main" => [int("flag")],
    "MPI_Query_thread" => [int("supported")],
    "MPI_Status_set_cancelled" => [status("status"), int("flag")],
    "MPI_Status_set_elements" => [status("status"), datatype("datatype"), int("count")],
    "MPI_Type_create_keyval" => [keyval("type_keyval")],
    "MPI_Type_delete_attr" => [datatype("datatype"), keyval("type_keyval")],
    "MPI_Type_dup" => [datatype("oldtype"), datatype("newtype")],
    "MPI_Type_free_keyval" => [keyval("type_keyval")],
    "MPI_Type_get_attr" => [datatype("datatype"), keyval("type_keyval"), int("flag")],
    "MPI_Type_get_contents" => [
        datatype("datatype"), int("max_integers"), int("max_addresses"),
        int("max_datatypes"), ints("array_of_integers", "max_integers"),
        aints("array_of_addresses", "max_addresses"),
        handles(Datatype, "array_of_datatypes", "max_datatypes"),
    ],
    "MPI_Type_get_envelope" => [
        datatype("datatype"), int("num_integers"), int("num_addresses"),
        int("num_datatypes"), int("combiner"),
    ],
    "MPI_Type_get_name" => [datatype("datatype"), string("name"), int("resultlen")],
    "MPI_Type_set_attr" => [datatype("datatype"), keyval("type_keyval")],
    "MPI_Type_set_name" => [datatype("datatype"), string("name")],
    "MPI_Type_match_size" => [int("typeclass"), int("size"), datatype("datatype")],
    "MPI_Win_call_errhandler" => [win("win"), int("errorcode")],
    "MPI_Win_create_keyval" => [keyval("win_keyval")],
    "MPI_Win_delete_attr" => [win("win"), keyval("win_keyval")],
    "MPI_Win_free_keyval" => [keyval("win_keyval")],
    "MPI_Win_get_attr" => [win("win"), keyval("win_keyval"), int("flag")],
    "MPI_Win_get_name" => [win("win"), string("name"), int("resultlen")],
    "MPI_Win_set_attr" => [win("win"), keyval("win_keyval")],
    "MPI_Win_set_name" => [win("win"), string("name")],

    // Memory, info objects and error handlers
    "MPI_Alloc_mem" => [aint("size"), info("info")],
    "MPI_Comm_create_errhandler" => [errhandler("errhandler")],
    "MPI_Comm_get_errhandler" => [comm("comm"), errhandler("errhandler")],
    "MPI_Comm_set_errhandler" => [comm("comm"), errhandler("errhandler")],
    "MPI_File_create_errhandler" => [errhandler("errhandler")],
    "MPI_File_get_errhandler" => [file("file"), errhandler("errhandler")],
    "MPI_File_set_errhandler" => [file("file"), errhandler("errhandler")],
    "MPI_Finalized" => [int("flag")],
    "MPI_Free_mem" => [],
    "MPI_Get_address" => [aint("address")],
    "MPI_Info_create" => [info("info")],
    "MPI_Info_delete" => [info("info"), string("key")],
    "MPI_Info_dup" => [info("oldinfo"), info("newinfo")],
    "MPI_Info_free" => [info("info")],
    "MPI_Info_get" => [
        info("info"), string("key"), int("valuelen"), string("value"), int("flag"),
    ],
    "MPI_Info_get_nkeys" => [info("info"), int("nkeys")],
    "MPI_Info_get_nthkey" => [info("info"), int("n"), string("key")],
    "MPI_Info_get_valuelen" => [info("info"), string("key"), int("valuelen"), int("flag")],
    "MPI_Info_set" => [info("info"), string("key"), string("value")],
    "MPI_Pack_external" => [
        string("datarep"), int("incount"), datatype("datatype"), aint("outsize"),
        aint("position_in"), aint("position_out"),
    ],
    "MPI_Pack_external_size" => [
        string("datarep"), int("incount"), datatype("datatype"), aint("size"),
    ],
    "MPI_Request_get_status" => [request("request"), int("flag"), status("status")],

    // Datatype constructors
    "MPI_Type_create_darray" => [
        int("size"), int("rank"), int("ndims"), ints("gsizes", "ndims"),
        ints("distribs", "ndims"), ints("dargs", "ndims"), ints("psizes", "ndims"),
        int("order"), datatype("oldtype"), datatype("newtype"),
    ],
    "MPI_Type_create_hindexed" => [
        int("count"), ints("blocklengths", "count"), aints("displacements", "count"),
        datatype("oldtype"), datatype("newtype"),
    ],
    "MPI_Type_create_hvector" => [
        int("count"), int("blocklength"), aint("stride"), datatype("oldtype"),
        datatype("newtype"),
    ],
    "MPI_Type_create_indexed_block" => [
        int("count"), int("blocklength"), ints("displacements", "count"), datatype("oldtype"),
        datatype("newtype"),
    ],
    "MPI_Type_create_resized" => [
        datatype("oldtype"), aint("lb"), aint("extent"), datatype("newtype"),
    ],
    "MPI_Type_create_struct" => [
        int("count"), ints("blocklengths", "count"), aints("displacements", "count"),
        handles(Datatype, "types", "count"), datatype("newtype"),
    ],
    "MPI_Type_create_subarray" => [
        int("ndims"), ints("sizes", "ndims"), ints("subsizes", "ndims"),
        ints("starts", "ndims"), int("order"), datatype("oldtype"), datatype("newtype"),
    ],
    "MPI_Type_get_extent" => [datatype("datatype"), aint("lb"), aint("extent")],
    "MPI_Type_get_true_extent" => [datatype("datatype"), aint("lb"), aint("extent")],
    "MPI_Unpack_external" => [
        string("datarep"), aint("insize"), aint("position_in"), aint("position_out"),
        int("outcount"), datatype("datatype"),
    ],
    "MPI_Win_create_errhandler" => [errhandler("errhandler")],
    "MPI_Win_get_errhandler" => [win("win"), errhandler("errhandler")],
    "MPI_Win_set_errhandler" => [win("win"), errhandler("errhandler")],
    "MPI_Type_create_f90_integer" => [int("r"), datatype("newtype")],
    "MPI_Type_create_f90_real" => [int("p"), int("r"), datatype("newtype")],
    "MPI_Type_create_f90_complex" => [int("p"), int("r"), datatype("newtype")],
];
