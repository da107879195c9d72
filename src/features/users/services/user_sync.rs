use sqlx::PgExecutor;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

/// Mirror the caller's identity into `users` so tickets and comments can
/// reference it and listings can show the owner's username and email.
///
/// Runs on the given executor so it can share the caller's transaction.
pub async fn upsert_user<'e, E>(executor: E, user: &AuthenticatedUser) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE
        SET username = EXCLUDED.username,
            email = EXCLUDED.email,
            role = EXCLUDED.role,
            updated_at = NOW()
        WHERE users.username IS DISTINCT FROM EXCLUDED.username
           OR users.email IS DISTINCT FROM EXCLUDED.email
           OR users.role IS DISTINCT FROM EXCLUDED.role
        "#,
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(user.role)
    .execute(executor)
    .await
    .map_err(|e| {
        tracing::error!(user_id = %user.id, "Failed to sync user: {:?}", e);
        AppError::Database(e)
    })?;

    Ok(())
}
