/// Push `column = $n` onto an UPDATE's SET list when the patch carries a value
macro_rules! set_if_present {
    ($set:expr, $column:literal, $value:expr) => {
        if let Some(value) = $value {
            $set.push(concat!($column, " = "));
            $set.push_bind_unseparated(value);
        }
    };
}

mod bookings;
mod crew_tasks;
pub mod models;
mod quotations;
mod schedule;
pub mod store;

use sqlx::{postgres::PgPoolOptions, PgPool};

pub use crew_tasks::CrewTaskFilter;
pub use store::SchedulingStore;

/// Database connection wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that opens connections on first use
    pub fn connect_lazy(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}
