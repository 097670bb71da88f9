//! User lookups for caller identity resolution

use crate::models::{UserRole, Viewer};
use crate::Result;
use sqlx::PgPool;

/// Repository for resolving authenticated callers to local users
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    role: String,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve the identity provider's subject to a viewer.
    pub async fn find_by_firebase_uid(&self, firebase_uid: &str) -> Result<Option<Viewer>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, role FROM users WHERE firebase_uid = $1",
        )
        .bind(firebase_uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(into_viewer))
    }

    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<Viewer>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(into_viewer))
    }
}

fn into_viewer(row: UserRow) -> Option<Viewer> {
    match UserRole::parse(&row.role) {
        Some(role) => Some(Viewer {
            user_id: row.id,
            role,
        }),
        None => {
            tracing::warn!(user_id = row.id, role = %row.role, "User has unknown role, ignoring");
            None
        }
    }
}
