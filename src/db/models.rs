//! Database row models.

use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// Persisted piece row.
///
/// `kind` is the integer code of a [`crate::PieceKind`]; rows are
/// partitioned by `session_id`.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::pieces)]
pub struct PieceRow {
    id: i32,
    session_id: String,
    kind: i32,
    x: f32,
    y: f32,
    z: f32,
}

/// Insertable piece row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::pieces)]
pub struct NewPieceRow {
    session_id: String,
    kind: i32,
    x: f32,
    y: f32,
    z: f32,
}

/// One persisted hit counter, keyed by modifier key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Queryable, Selectable, Insertable, new, Getters)]
#[diesel(table_name = schema::hit_count_entries)]
pub struct HitCountEntry {
    id: i32,
    value: i32,
}
