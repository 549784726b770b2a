//! Database repository for board pieces and hit counters.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, HitCountEntry, NewPieceRow, PieceRow, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for piece and hit counter operations.
///
/// Every call opens its own connection; multi-statement writes go through
/// [`Repository::transaction`].
#[derive(Debug, Clone)]
pub struct Repository {
    db_path: String,
}

impl Repository {
    /// Creates a new repository for the database at the given path.
    ///
    /// The file is created by SQLite on first connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path must not be empty"));
        }
        info!(path = %db_path, "Creating Repository");
        Ok(Self { db_path })
    }

    /// Returns the database path.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Applies all pending embedded migrations. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS)?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Runs `f` inside a single database transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back otherwise.
    #[instrument(skip(self, f))]
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PieceTransaction<'_>) -> Result<T, E>,
        E: From<diesel::result::Error> + From<DbError>,
    {
        let mut conn = self.connection()?;
        conn.transaction(|conn| {
            let mut txn = PieceTransaction { conn };
            f(&mut txn)
        })
    }

    /// Lists all pieces of a session, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_pieces(&self, session_id: &str) -> Result<Vec<PieceRow>, DbError> {
        let mut conn = self.connection()?;
        PieceTransaction { conn: &mut conn }.list(session_id)
    }

    /// Loads every stored hit counter entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn load_hit_counts(&self) -> Result<Vec<HitCountEntry>, DbError> {
        let mut conn = self.connection()?;
        let entries = schema::hit_count_entries::table
            .select(HitCountEntry::as_select())
            .load(&mut conn)?;
        debug!(count = entries.len(), "Hit count entries loaded");
        Ok(entries)
    }

    /// Inserts or replaces one hit counter entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn save_hit_count(&self, entry: HitCountEntry) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        diesel::replace_into(schema::hit_count_entries::table)
            .values(&entry)
            .execute(&mut conn)?;
        debug!(id = entry.id(), value = entry.value(), "Hit count entry saved");
        Ok(())
    }
}

/// Piece queries scoped to an open connection or transaction.
pub struct PieceTransaction<'a> {
    conn: &'a mut SqliteConnection,
}

impl PieceTransaction<'_> {
    /// Lists all pieces of a session, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list(&mut self, session_id: &str) -> Result<Vec<PieceRow>, DbError> {
        let rows = schema::pieces::table
            .filter(schema::pieces::session_id.eq(session_id))
            .order(schema::pieces::id.asc())
            .select(PieceRow::as_select())
            .load(&mut *self.conn)?;
        debug!(count = rows.len(), "Pieces loaded");
        Ok(rows)
    }

    /// Finds the piece at the given coordinates, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_at(
        &mut self,
        session_id: &str,
        x: f32,
        y: f32,
        z: f32,
    ) -> Result<Option<PieceRow>, DbError> {
        let row = schema::pieces::table
            .filter(schema::pieces::session_id.eq(session_id))
            .filter(schema::pieces::x.eq(x))
            .filter(schema::pieces::y.eq(y))
            .filter(schema::pieces::z.eq(z))
            .order(schema::pieces::id.asc())
            .select(PieceRow::as_select())
            .first(&mut *self.conn)
            .optional()?;
        Ok(row)
    }

    /// Inserts a new piece and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, row), fields(kind = row.kind()))]
    pub fn insert(&mut self, row: &NewPieceRow) -> Result<PieceRow, DbError> {
        let stored = diesel::insert_into(schema::pieces::table)
            .values(row)
            .returning(PieceRow::as_returning())
            .get_result(&mut *self.conn)?;
        Ok(stored)
    }

    /// Deletes a piece by id. Returns the number of deleted rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: i32) -> Result<usize, DbError> {
        let deleted = diesel::delete(schema::pieces::table.find(id)).execute(&mut *self.conn)?;
        Ok(deleted)
    }

    /// Sets the position of a piece and returns the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the piece does not exist or a database error occurs.
    #[instrument(skip(self))]
    pub fn set_position(&mut self, id: i32, x: f32, y: f32, z: f32) -> Result<PieceRow, DbError> {
        let row = diesel::update(schema::pieces::table.find(id))
            .set((
                schema::pieces::x.eq(x),
                schema::pieces::y.eq(y),
                schema::pieces::z.eq(z),
            ))
            .returning(PieceRow::as_returning())
            .get_result(&mut *self.conn)?;
        Ok(row)
    }

    /// Deletes every piece of a session and returns the deleted ids.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn clear_session(&mut self, session_id: &str) -> Result<Vec<i32>, DbError> {
        let ids = diesel::delete(
            schema::pieces::table.filter(schema::pieces::session_id.eq(session_id)),
        )
        .returning(schema::pieces::id)
        .get_results::<i32>(&mut *self.conn)?;
        debug!(count = ids.len(), "Session cleared");
        Ok(ids)
    }
}
