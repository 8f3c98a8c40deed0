//! The Postgres `pg_type` catalogue, collapsed into tagged value kinds.
//!
//! Text output of numeric types parses as `int` or `float`, `bool` parses as `bool`. Every other
//! category (dates, geometry, network addresses, ranges, json, identifiers...) is kept as its
//! text form. Array types map to the array form of their element kind.

use query_engine_sql::sql::Kind;

use super::{TypeId, TypeInfo, TypeMap};

/// Identifier of the `unknown` pseudo type, reported for untyped literals.
pub const UNKNOWN: TypeId = 705;

pub static POSTGRES_TYPES: TypeMap = TypeMap::new(TYPES);

// sorted by identifier
const TYPES: &[TypeInfo] = &[
    TypeInfo::new(16, "bool", Kind::Bool),
    TypeInfo::new(17, "bytea", Kind::String),
    TypeInfo::new(18, "char", Kind::String),
    TypeInfo::new(19, "name", Kind::String),
    TypeInfo::new(20, "int8", Kind::Int),
    TypeInfo::new(21, "int2", Kind::Int),
    TypeInfo::new(22, "int2vector", Kind::String),
    TypeInfo::new(23, "int4", Kind::Int),
    TypeInfo::new(24, "regproc", Kind::Int),
    TypeInfo::new(25, "text", Kind::String),
    TypeInfo::new(26, "oid", Kind::Int),
    TypeInfo::new(27, "tid", Kind::String),
    TypeInfo::new(28, "xid", Kind::String),
    TypeInfo::new(29, "cid", Kind::String),
    TypeInfo::new(30, "oidvector", Kind::String),
    TypeInfo::new(32, "pg_ddl_command", Kind::String),
    TypeInfo::new(71, "pg_type", Kind::String),
    TypeInfo::new(75, "pg_attribute", Kind::String),
    TypeInfo::new(81, "pg_proc", Kind::String),
    TypeInfo::new(83, "pg_class", Kind::String),
    TypeInfo::new(114, "json", Kind::String),
    TypeInfo::new(142, "xml", Kind::String),
    TypeInfo::new(143, "_xml", Kind::StringArray),
    TypeInfo::new(194, "pg_node_tree", Kind::String),
    TypeInfo::new(199, "_json", Kind::StringArray),
    TypeInfo::new(210, "_pg_type", Kind::StringArray),
    TypeInfo::new(269, "table_am_handler", Kind::String),
    TypeInfo::new(270, "_pg_attribute", Kind::StringArray),
    TypeInfo::new(271, "_xid8", Kind::StringArray),
    TypeInfo::new(272, "_pg_proc", Kind::StringArray),
    TypeInfo::new(273, "_pg_class", Kind::StringArray),
    TypeInfo::new(325, "index_am_handler", Kind::String),
    TypeInfo::new(600, "point", Kind::String),
    TypeInfo::new(601, "lseg", Kind::String),
    TypeInfo::new(602, "path", Kind::String),
    TypeInfo::new(603, "box", Kind::String),
    TypeInfo::new(604, "polygon", Kind::String),
    TypeInfo::new(628, "line", Kind::String),
    TypeInfo::new(629, "_line", Kind::StringArray),
    TypeInfo::new(650, "cidr", Kind::String),
    TypeInfo::new(651, "_cidr", Kind::StringArray),
    TypeInfo::new(700, "float4", Kind::Float),
    TypeInfo::new(701, "float8", Kind::Float),
    TypeInfo::new(705, "unknown", Kind::Invalid),
    TypeInfo::new(718, "circle", Kind::String),
    TypeInfo::new(719, "_circle", Kind::StringArray),
    TypeInfo::new(774, "macaddr8", Kind::String),
    TypeInfo::new(775, "_macaddr8", Kind::StringArray),
    TypeInfo::new(790, "money", Kind::String),
    TypeInfo::new(791, "_money", Kind::StringArray),
    TypeInfo::new(829, "macaddr", Kind::String),
    TypeInfo::new(869, "inet", Kind::String),
    TypeInfo::new(1000, "_bool", Kind::BoolArray),
    TypeInfo::new(1001, "_bytea", Kind::StringArray),
    TypeInfo::new(1002, "_char", Kind::StringArray),
    TypeInfo::new(1003, "_name", Kind::StringArray),
    TypeInfo::new(1005, "_int2", Kind::IntArray),
    TypeInfo::new(1006, "_int2vector", Kind::StringArray),
    TypeInfo::new(1007, "_int4", Kind::IntArray),
    TypeInfo::new(1008, "_regproc", Kind::StringArray),
    TypeInfo::new(1009, "_text", Kind::StringArray),
    TypeInfo::new(1010, "_tid", Kind::StringArray),
    TypeInfo::new(1011, "_xid", Kind::IntArray),
    TypeInfo::new(1012, "_cid", Kind::IntArray),
    TypeInfo::new(1013, "_oidvector", Kind::StringArray),
    TypeInfo::new(1014, "_bpchar", Kind::StringArray),
    TypeInfo::new(1015, "_varchar", Kind::StringArray),
    TypeInfo::new(1016, "_int8", Kind::IntArray),
    TypeInfo::new(1017, "_point", Kind::StringArray),
    TypeInfo::new(1018, "_lseg", Kind::StringArray),
    TypeInfo::new(1019, "_path", Kind::StringArray),
    TypeInfo::new(1020, "_box", Kind::StringArray),
    TypeInfo::new(1021, "_float4", Kind::FloatArray),
    TypeInfo::new(1022, "_float8", Kind::FloatArray),
    TypeInfo::new(1027, "_polygon", Kind::StringArray),
    TypeInfo::new(1028, "_oid", Kind::IntArray),
    TypeInfo::new(1033, "aclitem", Kind::String),
    TypeInfo::new(1034, "_aclitem", Kind::StringArray),
    TypeInfo::new(1040, "_macaddr", Kind::StringArray),
    TypeInfo::new(1041, "_inet", Kind::StringArray),
    TypeInfo::new(1042, "bpchar", Kind::String),
    TypeInfo::new(1043, "varchar", Kind::String),
    TypeInfo::new(1082, "date", Kind::String),
    TypeInfo::new(1083, "time", Kind::String),
    TypeInfo::new(1114, "timestamp", Kind::String),
    TypeInfo::new(1115, "_timestamp", Kind::StringArray),
    TypeInfo::new(1182, "_date", Kind::StringArray),
    TypeInfo::new(1183, "_time", Kind::StringArray),
    TypeInfo::new(1184, "timestamptz", Kind::String),
    TypeInfo::new(1185, "_timestamptz", Kind::StringArray),
    TypeInfo::new(1186, "interval", Kind::String),
    TypeInfo::new(1187, "_interval", Kind::StringArray),
    TypeInfo::new(1231, "_numeric", Kind::FloatArray),
    TypeInfo::new(1263, "_cstring", Kind::StringArray),
    TypeInfo::new(1266, "timetz", Kind::String),
    TypeInfo::new(1270, "_timetz", Kind::StringArray),
    TypeInfo::new(1560, "bit", Kind::String),
    TypeInfo::new(1561, "_bit", Kind::StringArray),
    TypeInfo::new(1562, "varbit", Kind::String),
    TypeInfo::new(1563, "_varbit", Kind::StringArray),
    TypeInfo::new(1700, "numeric", Kind::Float),
    TypeInfo::new(1790, "refcursor", Kind::String),
    TypeInfo::new(2201, "_refcursor", Kind::StringArray),
    TypeInfo::new(2202, "regprocedure", Kind::Int),
    TypeInfo::new(2203, "regoper", Kind::Int),
    TypeInfo::new(2204, "regoperator", Kind::Int),
    TypeInfo::new(2205, "regclass", Kind::Int),
    TypeInfo::new(2206, "regtype", Kind::Int),
    TypeInfo::new(2207, "_regprocedure", Kind::StringArray),
    TypeInfo::new(2208, "_regoper", Kind::StringArray),
    TypeInfo::new(2209, "_regoperator", Kind::StringArray),
    TypeInfo::new(2210, "_regclass", Kind::StringArray),
    TypeInfo::new(2211, "_regtype", Kind::StringArray),
    TypeInfo::new(2249, "record", Kind::String),
    TypeInfo::new(2275, "cstring", Kind::String),
    TypeInfo::new(2276, "any", Kind::String),
    TypeInfo::new(2277, "anyarray", Kind::String),
    TypeInfo::new(2278, "void", Kind::String),
    TypeInfo::new(2279, "trigger", Kind::String),
    TypeInfo::new(2280, "language_handler", Kind::String),
    TypeInfo::new(2281, "internal", Kind::String),
    TypeInfo::new(2283, "anyelement", Kind::String),
    TypeInfo::new(2776, "anynonarray", Kind::String),
    TypeInfo::new(2949, "_txid_snapshot", Kind::StringArray),
    TypeInfo::new(2950, "uuid", Kind::String),
    TypeInfo::new(2951, "_uuid", Kind::StringArray),
    TypeInfo::new(2970, "txid_snapshot", Kind::String),
    TypeInfo::new(3115, "fdw_handler", Kind::String),
    TypeInfo::new(3220, "pg_lsn", Kind::String),
    TypeInfo::new(3221, "_pg_lsn", Kind::StringArray),
    TypeInfo::new(3310, "tsm_handler", Kind::String),
    TypeInfo::new(3361, "pg_ndistinct", Kind::String),
    TypeInfo::new(3402, "pg_dependencies", Kind::String),
    TypeInfo::new(3500, "anyenum", Kind::String),
    TypeInfo::new(3614, "tsvector", Kind::String),
    TypeInfo::new(3615, "tsquery", Kind::String),
    TypeInfo::new(3642, "gtsvector", Kind::String),
    TypeInfo::new(3643, "_tsvector", Kind::StringArray),
    TypeInfo::new(3644, "_gtsvector", Kind::StringArray),
    TypeInfo::new(3645, "_tsquery", Kind::StringArray),
    TypeInfo::new(3734, "regconfig", Kind::Int),
    TypeInfo::new(3735, "_regconfig", Kind::StringArray),
    TypeInfo::new(3769, "regdictionary", Kind::Int),
    TypeInfo::new(3770, "_regdictionary", Kind::StringArray),
    TypeInfo::new(3802, "jsonb", Kind::String),
    TypeInfo::new(3807, "_jsonb", Kind::StringArray),
    TypeInfo::new(3831, "anyrange", Kind::String),
    TypeInfo::new(3838, "event_trigger", Kind::String),
    TypeInfo::new(3904, "int4range", Kind::String),
    TypeInfo::new(3905, "_int4range", Kind::StringArray),
    TypeInfo::new(3906, "numrange", Kind::String),
    TypeInfo::new(3907, "_numrange", Kind::StringArray),
    TypeInfo::new(3908, "tsrange", Kind::String),
    TypeInfo::new(3909, "_tsrange", Kind::StringArray),
    TypeInfo::new(3910, "tstzrange", Kind::String),
    TypeInfo::new(3911, "_tstzrange", Kind::StringArray),
    TypeInfo::new(3912, "daterange", Kind::String),
    TypeInfo::new(3913, "_daterange", Kind::StringArray),
    TypeInfo::new(3926, "int8range", Kind::String),
    TypeInfo::new(3927, "_int8range", Kind::StringArray),
    TypeInfo::new(4072, "jsonpath", Kind::String),
    TypeInfo::new(4073, "_jsonpath", Kind::StringArray),
    TypeInfo::new(4089, "regnamespace", Kind::Int),
    TypeInfo::new(4090, "_regnamespace", Kind::StringArray),
    TypeInfo::new(4096, "regrole", Kind::Int),
    TypeInfo::new(4097, "_regrole", Kind::StringArray),
    TypeInfo::new(4191, "regcollation", Kind::Int),
    TypeInfo::new(4192, "_regcollation", Kind::StringArray),
    TypeInfo::new(4451, "int4multirange", Kind::String),
    TypeInfo::new(4532, "nummultirange", Kind::String),
    TypeInfo::new(4533, "tsmultirange", Kind::String),
    TypeInfo::new(4534, "tstzmultirange", Kind::String),
    TypeInfo::new(4535, "datemultirange", Kind::String),
    TypeInfo::new(4536, "int8multirange", Kind::String),
    TypeInfo::new(4537, "anymultirange", Kind::String),
    TypeInfo::new(4538, "anycompatiblemultirange", Kind::String),
    TypeInfo::new(4600, "pg_brin_bloom_summary", Kind::String),
    TypeInfo::new(4601, "pg_brin_minmax_multi_summary", Kind::String),
    TypeInfo::new(5017, "pg_mcv_list", Kind::String),
    TypeInfo::new(5038, "pg_snapshot", Kind::String),
    TypeInfo::new(5039, "_pg_snapshot", Kind::StringArray),
    TypeInfo::new(5069, "xid8", Kind::String),
    TypeInfo::new(5077, "anycompatible", Kind::String),
    TypeInfo::new(5078, "anycompatiblearray", Kind::String),
    TypeInfo::new(5079, "anycompatiblenonarray", Kind::String),
    TypeInfo::new(5080, "anycompatiblerange", Kind::String),
    TypeInfo::new(6150, "_int4multirange", Kind::StringArray),
    TypeInfo::new(6151, "_nummultirange", Kind::StringArray),
    TypeInfo::new(6152, "_tsmultirange", Kind::StringArray),
    TypeInfo::new(6153, "_tstzmultirange", Kind::StringArray),
    TypeInfo::new(6155, "_datemultirange", Kind::StringArray),
    TypeInfo::new(6157, "_int8multirange", Kind::StringArray),
];
