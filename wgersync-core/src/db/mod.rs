pub mod models;
pub mod operations;
pub mod schema;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, info};

use crate::error::{Error, Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA synchronous = NORMAL;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url == ":memory:" || database_url.contains("mode=memory")
}

/// Handle to the exercise document collection.
///
/// Created once at startup and passed to every action; dropping it closes the pool.
pub struct ExerciseStore {
    pool: DbPool,
}

impl ExerciseStore {
    /// Open (or create) the store and apply pending migrations.
    pub fn open(database_url: &str) -> Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let mut builder = DbPool::builder().connection_customizer(Box::new(SqlitePragmas));
        if is_in_memory(database_url) {
            // Every connection to `:memory:` is a separate database, so keep exactly one alive.
            builder = builder.max_size(1).idle_timeout(None).max_lifetime(None);
        }
        let pool = builder.build(manager)?;

        let store = Self { pool };
        store.run_migrations()?;
        info!("Exercise store ready");
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| Error::Connectivity(format!("failed to apply migrations: {}", e)))?;
        for version in applied {
            info!("Applied migration {}", version);
        }
        debug!("Migrations up to date");
        Ok(())
    }

    pub(crate) fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }
}
