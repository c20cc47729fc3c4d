use super::DbError;
use crate::models::SiteSettings;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

/// Reads the singleton settings row. A fresh database that was never
/// configured yields the defaults instead of an error.
pub fn read_settings(conn: &Connection) -> SiteSettings {
    conn.query_row(
        "SELECT site_name, contact_email, phone, address, instagram_url, facebook_url, \
         about_text FROM site_settings WHERE id = 1",
        [],
        |row| {
            Ok(SiteSettings {
                site_name: row.get(0)?,
                contact_email: row.get(1)?,
                phone: row.get(2)?,
                address: row.get(3)?,
                instagram_url: row.get(4)?,
                facebook_url: row.get(5)?,
                about_text: row.get(6)?,
            })
        },
    )
    .optional()
    .unwrap_or(None)
    .unwrap_or_default()
}

/// Writes the singleton settings row. Exactly one row, addressed by the
/// fixed id 1 and written as an upsert.
pub fn upsert_settings(conn: &Connection, settings: &SiteSettings) -> Result<(), DbError> {
    conn.execute(
        "INSERT OR REPLACE INTO site_settings \
         (id, site_name, contact_email, phone, address, instagram_url, facebook_url, \
         about_text, updated_at) \
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            settings.site_name,
            settings.contact_email,
            settings.phone,
            settings.address,
            settings.instagram_url,
            settings.facebook_url,
            settings.about_text,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup;

    #[test]
    fn fresh_database_yields_seeded_defaults() {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::create_schema(&mut conn).unwrap();
        let settings = read_settings(&conn);
        assert_eq!(settings.site_name, "Portal");
    }

    #[test]
    fn upsert_keeps_exactly_one_row() {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::create_schema(&mut conn).unwrap();

        let mut settings = read_settings(&conn);
        settings.site_name = "Portal da Juventude".to_string();
        settings.contact_email = "contato@portal.org.br".to_string();
        upsert_settings(&conn, &settings).unwrap();

        settings.phone = "(11) 99999-0000".to_string();
        upsert_settings(&conn, &settings).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM site_settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let stored = read_settings(&conn);
        assert_eq!(stored.site_name, "Portal da Juventude");
        assert_eq!(stored.contact_email, "contato@portal.org.br");
        assert_eq!(stored.phone, "(11) 99999-0000");
    }
}
