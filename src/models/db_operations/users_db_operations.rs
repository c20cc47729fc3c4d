use crate::models::AdminUser;
use bcrypt::{hash, verify, BcryptError};
use chrono::Utc;
use rusqlite::{params, Connection, Error as RusqliteError};

fn bcrypt_to_rusqlite_error(e: BcryptError) -> RusqliteError {
    RusqliteError::ToSqlConversionFailure(Box::new(e))
}

pub fn create_user(
    conn: &Connection,
    username: &str,
    password: &str,
    role: &str,
) -> Result<(), RusqliteError> {
    let hashed_password = hash(password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
        params![username, hashed_password, role],
    )?;
    Ok(())
}

pub fn read_all_users(conn: &Connection) -> Result<Vec<AdminUser>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, role, is_active, last_login_time FROM users ORDER BY id",
    )?;
    let user_iter = stmt.query_map([], |row| {
        Ok(AdminUser {
            id: row.get(0)?,
            username: row.get(1)?,
            role: row.get(2)?,
            is_active: row.get(3)?,
            last_login_time: row.get(4)?,
        })
    })?;
    Ok(user_iter.filter_map(|u| u.ok()).collect())
}

pub fn read_user_by_username(conn: &Connection, username: &str) -> Option<AdminUser> {
    conn.query_row(
        "SELECT id, username, role, is_active, last_login_time FROM users WHERE username = ?1",
        [username],
        |row| {
            Ok(AdminUser {
                id: row.get(0)?,
                username: row.get(1)?,
                role: row.get(2)?,
                is_active: row.get(3)?,
                last_login_time: row.get(4)?,
            })
        },
    )
    .ok()
}

pub fn update_user(
    conn: &Connection,
    user_id: i32,
    username: &str,
    new_password: Option<&str>,
    is_active: bool,
) -> Result<(), RusqliteError> {
    if let Some(password) = new_password {
        if !password.is_empty() {
            let hashed_password =
                hash(password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
            conn.execute(
                "UPDATE users SET username = ?1, password_hash = ?2, is_active = ?3 WHERE id = ?4",
                params![username, hashed_password, is_active, user_id],
            )?;
            return Ok(());
        }
    }

    conn.execute(
        "UPDATE users SET username = ?1, is_active = ?2 WHERE id = ?3",
        params![username, is_active, user_id],
    )?;
    Ok(())
}

pub fn delete_user(conn: &Connection, user_id: i32) -> Result<usize, RusqliteError> {
    conn.execute("DELETE FROM users WHERE id = ?1", [user_id])
}

pub fn verify_credentials(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Option<(String, String)> {
    let res: rusqlite::Result<(String, String, bool)> = conn.query_row(
        "SELECT password_hash, role, is_active FROM users WHERE username = ?1",
        [username],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    );

    if let Ok((hash, role, is_active)) = res {
        if is_active && verify(password, &hash).unwrap_or(false) {
            return Some((username.to_string(), role));
        }
    }
    None
}

pub fn update_last_login_time(conn: &Connection, username: &str) -> Result<(), RusqliteError> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE users SET last_login_time = ?1 WHERE username = ?2",
        params![now, username],
    )?;
    Ok(())
}
