use crate::models::db_operations::{audit_db_operations, users_db_operations};
use crate::models::{AuditAction, AuditLogEntry};
use rusqlite::Connection;

/// Records an administrative action in the audit trail. Best effort by
/// contract: an unknown or absent actor and any insert failure are logged
/// and swallowed, the operation being audited must never fail or roll back
/// because of its audit record.
pub fn record(
    conn: &Connection,
    actor: Option<&str>,
    action: AuditAction,
    resource: &str,
    details: &str,
) {
    let username = match actor {
        Some(u) if !u.is_empty() => u,
        _ => return,
    };

    let user = match users_db_operations::read_user_by_username(conn, username) {
        Some(u) => u,
        None => {
            log::warn!(
                "Audit entry skipped: no user record for actor '{}'",
                username
            );
            return;
        }
    };

    if let Err(e) =
        audit_db_operations::append_entry(conn, user.id, action.as_str(), resource, details)
    {
        log::error!(
            "Failed to append audit entry ({} {} by '{}'): {}",
            action.as_str(),
            resource,
            username,
            e
        );
    }
}

/// Recent audit entries for the dashboard, newest first. Read failures
/// degrade to an empty list rather than breaking the page.
pub fn recent(conn: &Connection, limit: u32) -> Vec<AuditLogEntry> {
    match audit_db_operations::read_recent_entries(conn, limit) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Failed to read audit trail: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::create_schema(&mut conn).unwrap();
        conn
    }

    #[test]
    fn records_entry_for_known_actor() {
        let conn = test_conn();
        users_db_operations::create_user(&conn, "maria", "senha-forte", "admin").unwrap();

        record(&conn, Some("maria"), AuditAction::Criou, "Post", "Formatura 2026");

        let entries = recent(&conn, 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "CRIOU");
        assert_eq!(entries[0].resource, "Post");
        assert_eq!(entries[0].username, "maria");
    }

    #[test]
    fn unknown_actor_is_a_silent_no_op() {
        let conn = test_conn();
        record(&conn, Some("fantasma"), AuditAction::Excluiu, "Post", "x");
        record(&conn, None, AuditAction::Editou, "Post", "y");
        assert!(recent(&conn, 10).is_empty());
    }

    #[test]
    fn deleted_user_shows_placeholder_name() {
        let conn = test_conn();
        users_db_operations::create_user(&conn, "temporario", "senha-forte", "admin").unwrap();
        record(&conn, Some("temporario"), AuditAction::Editou, "Curso", "Robótica");

        let user = users_db_operations::read_user_by_username(&conn, "temporario").unwrap();
        users_db_operations::delete_user(&conn, user.id).unwrap();

        let entries = recent(&conn, 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username, "(removido)");
    }
}
