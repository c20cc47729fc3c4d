use super::{opt_ts_from_sql, ts_from_sql, DbError};
use crate::models::{Post, PostType};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn row_to_post(row: &Row) -> rusqlite::Result<Post> {
    let post_type: String = row.get(6)?;
    let post_type = post_type.parse::<PostType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let event_date: Option<String> = row.get(9)?;
    let created_at: String = row.get(11)?;

    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        summary: row.get(3)?,
        content: row.get(4)?,
        cover_image: row.get(5)?,
        post_type,
        published: row.get(7)?,
        featured: row.get(8)?,
        event_date: opt_ts_from_sql(event_date),
        location: row.get(10)?,
        created_at: ts_from_sql(&created_at),
    })
}

const POST_COLUMNS: &str = "id, title, slug, summary, content, cover_image, post_type, \
     published, featured, event_date, location, created_at";

pub fn create_post(conn: &Connection, post: &Post) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO posts (id, title, slug, summary, content, cover_image, post_type, \
         published, featured, event_date, location, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            post.id,
            post.title,
            post.slug,
            post.summary,
            post.content,
            post.cover_image,
            post.post_type.as_str(),
            post.published,
            post.featured,
            post.event_date.map(|t| t.to_rfc3339()),
            post.location,
            post.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn read_post(conn: &Connection, id: &str) -> Option<Post> {
    conn.query_row(
        &format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS),
        [id],
        row_to_post,
    )
    .ok()
}

pub fn find_post_by_slug(conn: &Connection, slug: &str) -> Option<Post> {
    conn.query_row(
        &format!("SELECT {} FROM posts WHERE slug = ?1", POST_COLUMNS),
        [slug],
        row_to_post,
    )
    .ok()
}

pub fn slug_exists(conn: &Connection, slug: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE slug = ?1)",
        [slug],
        |row| row.get(0),
    )
    .unwrap_or(false)
}

/// Persists the mutable fields of an existing post. The slug is immutable
/// after creation and is deliberately not part of the UPDATE.
pub fn update_post(conn: &Connection, post: &Post) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE posts SET title = ?1, summary = ?2, content = ?3, cover_image = ?4, \
         post_type = ?5, published = ?6, featured = ?7, event_date = ?8, location = ?9 \
         WHERE id = ?10",
        params![
            post.title,
            post.summary,
            post.content,
            post.cover_image,
            post.post_type.as_str(),
            post.published,
            post.featured,
            post.event_date.map(|t| t.to_rfc3339()),
            post.location,
            post.id,
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("Post {}", post.id)));
    }
    Ok(())
}

/// Tolerant delete: removing a post that no longer exists is a no-op, not an
/// error. Returns the number of rows actually removed.
pub fn delete_post(conn: &Connection, id: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM posts WHERE id = ?1", [id])?)
}

pub fn read_latest_posts(
    conn: &Connection,
    only_published: bool,
    post_type: Option<PostType>,
    limit: u32,
    offset: u32,
) -> Result<Vec<Post>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM posts \
         WHERE (?1 = 0 OR published = 1) AND (?2 IS NULL OR post_type = ?2) \
         ORDER BY created_at DESC LIMIT ?3 OFFSET ?4",
        POST_COLUMNS
    ))?;
    let rows = stmt.query_map(
        params![only_published, post_type.map(|t| t.as_str()), limit, offset],
        row_to_post,
    )?;
    Ok(rows.filter_map(|p| p.ok()).collect())
}

pub fn count_posts(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
        .optional()
        .unwrap_or(None)
        .unwrap_or(0)
}
