use super::{ts_from_sql, DbError};
use crate::models::CarouselSlide;
use rusqlite::{params, Connection, Row};

fn row_to_slide(row: &Row) -> rusqlite::Result<CarouselSlide> {
    let created_at: String = row.get(8)?;
    Ok(CarouselSlide {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image_url: row.get(3)?,
        action_url: row.get(4)?,
        action_text: row.get(5)?,
        is_active: row.get(6)?,
        display_order: row.get(7)?,
        created_at: ts_from_sql(&created_at),
    })
}

const SLIDE_COLUMNS: &str =
    "id, title, description, image_url, action_url, action_text, is_active, display_order, created_at";

pub fn create_slide(conn: &Connection, slide: &CarouselSlide) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO carousel_slides (id, title, description, image_url, action_url, \
         action_text, is_active, display_order, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            slide.id,
            slide.title,
            slide.description,
            slide.image_url,
            slide.action_url,
            slide.action_text,
            slide.is_active,
            slide.display_order,
            slide.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn read_slide(conn: &Connection, id: &str) -> Option<CarouselSlide> {
    conn.query_row(
        &format!("SELECT {} FROM carousel_slides WHERE id = ?1", SLIDE_COLUMNS),
        [id],
        row_to_slide,
    )
    .ok()
}

/// Point lookup by the public route a slide links to. This is the join key
/// between a slide and the post it mirrors; there is no foreign key.
pub fn find_slide_by_action_url(conn: &Connection, action_url: &str) -> Option<CarouselSlide> {
    conn.query_row(
        &format!(
            "SELECT {} FROM carousel_slides WHERE action_url = ?1",
            SLIDE_COLUMNS
        ),
        [action_url],
        row_to_slide,
    )
    .ok()
}

pub fn update_slide(conn: &Connection, slide: &CarouselSlide) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE carousel_slides SET title = ?1, description = ?2, image_url = ?3, \
         action_url = ?4, action_text = ?5, is_active = ?6, display_order = ?7 WHERE id = ?8",
        params![
            slide.title,
            slide.description,
            slide.image_url,
            slide.action_url,
            slide.action_text,
            slide.is_active,
            slide.display_order,
            slide.id,
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("CarouselSlide {}", slide.id)));
    }
    Ok(())
}

pub fn delete_slide(conn: &Connection, id: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM carousel_slides WHERE id = ?1", [id])?)
}

pub fn read_active_slides(conn: &Connection) -> Result<Vec<CarouselSlide>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM carousel_slides WHERE is_active = 1 ORDER BY display_order ASC",
        SLIDE_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_slide)?;
    Ok(rows.filter_map(|s| s.ok()).collect())
}

pub fn read_all_slides(conn: &Connection) -> Result<Vec<CarouselSlide>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM carousel_slides ORDER BY display_order ASC",
        SLIDE_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_slide)?;
    Ok(rows.filter_map(|s| s.ok()).collect())
}

/// Orders are assigned monotonically; deletions leave gaps on purpose, no
/// compaction is ever performed.
pub fn next_display_order(conn: &Connection) -> Result<i64, DbError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(display_order) FROM carousel_slides",
        [],
        |row| row.get(0),
    )?;
    Ok(max.unwrap_or(0) + 1)
}
