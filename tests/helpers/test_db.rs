use findnkeep::infrastructure::persistence::Database;
use std::ops::Deref;
use uuid::Uuid;

/// A migrated SQLite file database, removed when dropped.
pub struct TestDatabase {
    db: Database,
    path: String,
}

impl Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

impl TestDatabase {
    pub fn database(&self) -> Database {
        self.db.clone()
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path, suffix));
        }
    }
}

pub async fn setup_test_db() -> TestDatabase {
    // Use file-based SQLite for tests (unique UUID per test for parallel execution)
    let path = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", path);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    TestDatabase { db, path }
}
