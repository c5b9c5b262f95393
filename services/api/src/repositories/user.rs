//! User repository for database operations

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::login::UserStore;
use crate::models::{Role, User};

/// SQLite-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the users table and seed the default administrator account
    ///
    /// Idempotent: the seed runs only when the table is empty, so restarts
    /// never duplicate the default account.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'Resident',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.get("count");

        if count == 0 {
            info!("Seeding default administrator account");
            sqlx::query("INSERT INTO users (username, password, role) VALUES (?, ?, ?)")
                .bind("admin")
                .bind("admin123")
                .bind(Role::Administrator.as_str())
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    fn map_user(row: &SqliteRow) -> Result<User> {
        let role: String = row.get("role");
        let role = Role::parse(&role).ok_or_else(|| anyhow::anyhow!("Unknown role: {}", role))?;

        Ok(User {
            id: row.get("id"),
            username: row.get("username"),
            password: row.get("password"),
            role,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password, role, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_user).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password, role, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_user).transpose()
    }

    /// Insert the user when its id is zero, otherwise update in place
    ///
    /// Inserts rely on the store to assign the next monotonically
    /// increasing id; a username collision surfaces as an error. Updates
    /// replace username, password, and role and refresh `updated_at`
    /// without touching the id.
    async fn save(&self, user: &User) -> Result<User> {
        if user.id > 0 {
            sqlx::query(
                r#"
                UPDATE users
                SET username = ?, password = ?, role = ?, updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
            )
            .bind(&user.username)
            .bind(&user.password)
            .bind(user.role.as_str())
            .bind(user.id)
            .execute(&self.pool)
            .await?;

            self.find_by_id(user.id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No user with id {} to update", user.id))
        } else {
            let result = sqlx::query("INSERT INTO users (username, password, role) VALUES (?, ?, ?)")
                .bind(&user.username)
                .bind(&user.password)
                .bind(user.role.as_str())
                .execute(&self.pool)
                .await?;

            let id = result.last_insert_rowid();
            self.find_by_id(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Inserted user {} not found", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Single-connection pool: every connection to `sqlite::memory:` opens
    /// a distinct database.
    async fn repository() -> UserRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        let repository = UserRepository::new(pool);
        repository.init().await.expect("Failed to init repository");
        repository
    }

    fn new_user(username: &str) -> User {
        User {
            id: 0,
            username: username.to_string(),
            password: "secret".to_string(),
            role: Role::Resident,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_init_seeds_default_admin() {
        let repository = repository().await;

        let admin = repository
            .find_by_username("admin")
            .await
            .expect("query failed")
            .expect("admin missing");

        assert_eq!(admin.id, 1);
        assert_eq!(admin.password, "admin123");
        assert_eq!(admin.role, Role::Administrator);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let repository = repository().await;
        repository.init().await.expect("Second init failed");

        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&repository.pool)
            .await
            .expect("count failed");
        let count: i64 = row.get("count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_find_by_username_unknown() {
        let repository = repository().await;
        let user = repository
            .find_by_username("nobody")
            .await
            .expect("query failed");
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_save_assigns_increasing_ids() {
        let repository = repository().await;

        let first = repository.save(&new_user("vecino1")).await.expect("save");
        let second = repository.save(&new_user("vecino2")).await.expect("save");

        // Admin seed took id 1
        assert_eq!(first.id, 2);
        assert_eq!(second.id, 3);
        assert_eq!(first.role, Role::Resident);
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_username() {
        let repository = repository().await;

        repository.save(&new_user("vecino1")).await.expect("save");
        let duplicate = repository.save(&new_user("vecino1")).await;

        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_save_updates_in_place() {
        let repository = repository().await;

        let mut user = repository.save(&new_user("vecino1")).await.expect("save");
        user.password = "changed".to_string();
        user.role = Role::Administrator;

        let updated = repository.save(&user).await.expect("update");

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.password, "changed");
        assert_eq!(updated.role, Role::Administrator);

        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&repository.pool)
            .await
            .expect("count failed");
        let count: i64 = row.get("count");
        // Admin seed + the one saved user, no duplicate row
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_find_by_id_round_trip() {
        let repository = repository().await;

        let saved = repository.save(&new_user("vecino1")).await.expect("save");
        let found = repository
            .find_by_id(saved.id)
            .await
            .expect("query failed")
            .expect("user missing");

        assert_eq!(found.username, "vecino1");
        assert_eq!(found.id, saved.id);
    }
}
