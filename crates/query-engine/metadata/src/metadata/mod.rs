//! Static knowledge about backend types: which native type identifiers decode into which
//! tagged value kinds.

pub mod postgres;

use query_engine_sql::sql::Kind;

/// A native type identifier as sent by the backend in a row description.
pub type TypeId = u32;

/// One entry of a vendor type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub id: TypeId,
    pub name: &'static str,
    pub kind: Kind,
}

impl TypeInfo {
    pub const fn new(id: TypeId, name: &'static str, kind: Kind) -> Self {
        TypeInfo { id, name, kind }
    }
}

/// A lookup table from native type identifiers to kinds, sorted by identifier.
#[derive(Debug, Clone, Copy)]
pub struct TypeMap {
    types: &'static [TypeInfo],
}

impl TypeMap {
    pub const fn new(types: &'static [TypeInfo]) -> Self {
        TypeMap { types }
    }

    pub fn lookup(&self, id: TypeId) -> Option<&'static TypeInfo> {
        self.types
            .binary_search_by_key(&id, |info| info.id)
            .ok()
            .map(|index| &self.types[index])
    }

    /// The kind for a native type. Identifiers missing from the table are `Invalid`.
    pub fn kind_for(&self, id: TypeId) -> Kind {
        self.lookup(id).map_or(Kind::Invalid, |info| info.kind)
    }

    pub fn name_for(&self, id: TypeId) -> Option<&'static str> {
        self.lookup(id).map(|info| info.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static TypeInfo> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
