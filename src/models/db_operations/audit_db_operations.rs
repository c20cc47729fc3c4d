use super::ts_from_sql;
use crate::models::AuditLogEntry;
use chrono::Utc;
use rusqlite::{params, Connection, Error as RusqliteError};

/// Appends one immutable row to the audit trail. The application never
/// updates or deletes audit rows.
pub fn append_entry(
    conn: &Connection,
    user_id: i32,
    action: &str,
    resource: &str,
    details: &str,
) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT INTO audit_log (action, resource, details, user_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![action, resource, details, user_id, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Most recent entries joined with the actor's username, newest first.
/// Entries whose user has since been deleted still show up, with a
/// placeholder name.
pub fn read_recent_entries(
    conn: &Connection,
    limit: u32,
) -> Result<Vec<AuditLogEntry>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.action, a.resource, a.details, \
         COALESCE(u.username, '(removido)'), a.created_at \
         FROM audit_log a LEFT JOIN users u ON u.id = a.user_id \
         ORDER BY a.id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map([limit], |row| {
        let created_at: String = row.get(5)?;
        Ok(AuditLogEntry {
            id: row.get(0)?,
            action: row.get(1)?,
            resource: row.get(2)?,
            details: row.get(3)?,
            username: row.get(4)?,
            created_at: ts_from_sql(&created_at),
        })
    })?;
    Ok(rows.filter_map(|e| e.ok()).collect())
}
