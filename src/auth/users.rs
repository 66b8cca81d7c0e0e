// Accounts: registration, password checks and role changes
use rusqlite::{params, OptionalExtension};

use crate::db::models::{Role, User};
use crate::state::DbPool;
use crate::store::{self, describe_conflict, StoreError, StoreResult};

/// Registers a user. The first account on an empty database becomes ADMIN.
pub fn create_user(
    pool: &DbPool,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> StoreResult<User> {
    let password_hash = bcrypt::hash(password, bcrypt_cost)
        .map_err(|e| StoreError::Internal(format!("password hashing failed: {}", e)))?;

    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();
    let created_at = store::now();

    // One statement, so two concurrent first registrations cannot both be ADMIN.
    conn.execute(
        "INSERT INTO users (id, username, password_hash, role, created_at)
         SELECT ?1, ?2, ?3,
                CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'USER' ELSE 'ADMIN' END,
                ?4",
        params![id, username, password_hash, store::timestamp(&created_at)],
    )
    .map_err(|e| describe_conflict(e.into(), || format!("username {} is taken", username)))?;

    let user = conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
        params![id],
        User::from_row,
    )?;
    tracing::info!("Registered user {} as {}", user.username, user.role);
    Ok(user)
}

pub fn find_by_username(pool: &DbPool, username: &str) -> StoreResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE username = ?1", User::COLUMNS),
            params![username],
            User::from_row,
        )
        .optional()?;
    Ok(user)
}

/// `None` for an unknown user or a wrong password.
pub fn verify_credentials(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> StoreResult<Option<User>> {
    let Some(user) = find_by_username(pool, username)? else {
        return Ok(None);
    };
    let valid = bcrypt::verify(password, &user.password_hash)
        .map_err(|e| StoreError::Internal(format!("password check failed: {}", e)))?;
    Ok(valid.then_some(user))
}

pub fn set_role(pool: &DbPool, username: &str, role: Role) -> StoreResult<User> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "UPDATE users SET role = ?1 WHERE username = ?2",
        params![role, username],
    )?;
    if rows == 0 {
        return Err(StoreError::NotFound(format!("user {} not found", username)));
    }
    tracing::info!("User {} is now {}", username, role);

    conn.query_row(
        &format!("SELECT {} FROM users WHERE username = ?1", User::COLUMNS),
        params![username],
        User::from_row,
    )
    .map_err(StoreError::from)
}
