use crate::helper::cache_helpers::CacheNotifier;
use crate::helper::{audit_helpers, sanitization_helpers, slug_helpers};
use crate::models::db_operations::{carousel_db_operations, posts_db_operations, DbError};
use crate::models::{AuditAction, CarouselSlide, Post, PostType};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Caption shown on every post-mirroring carousel slide.
const MIRROR_ACTION_TEXT: &str = "Leia Mais";

/// Editable post fields as they arrive from the admin form, before
/// validation and sanitization.
#[derive(Debug, Default, Clone)]
pub struct PostForm {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub post_type: String,
    pub published: bool,
    pub featured: bool,
    pub event_date: Option<String>,
    pub location: Option<String>,
}

struct ValidatedForm {
    title: String,
    summary: String,
    content: String,
    post_type: PostType,
    event_date: Option<DateTime<Utc>>,
    location: Option<String>,
}

/// Accepts both RFC 3339 and the `YYYY-MM-DDTHH:MM` shape produced by HTML
/// `datetime-local` inputs.
fn parse_event_date(raw: &str) -> Result<DateTime<Utc>, WorkflowError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|t| t.and_utc())
        .map_err(|_| WorkflowError::Validation(format!("Data do evento inválida: '{}'", raw)))
}

/// Validation happens before any write. A rejected form leaves both the
/// posts table and the carousel untouched.
fn validate(form: &PostForm) -> Result<ValidatedForm, WorkflowError> {
    let title = sanitization_helpers::strip_all_html(form.title.trim());
    if title.is_empty() {
        return Err(WorkflowError::Validation("O título é obrigatório.".into()));
    }
    let summary = sanitization_helpers::strip_all_html(form.summary.trim());
    if summary.is_empty() {
        return Err(WorkflowError::Validation("O resumo é obrigatório.".into()));
    }
    let content = sanitization_helpers::sanitize_post_content(form.content.trim());
    if content.is_empty() {
        return Err(WorkflowError::Validation("O conteúdo é obrigatório.".into()));
    }
    let post_type = form
        .post_type
        .parse::<PostType>()
        .map_err(|e| WorkflowError::Validation(e.to_string()))?;

    let event_date = match form.event_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_event_date(raw)?),
        _ => None,
    };
    let location = form
        .location
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| sanitization_helpers::strip_all_html(s));

    Ok(ValidatedForm {
        title,
        summary,
        content,
        post_type,
        event_date,
        location,
    })
}

fn stale_routes(post: &Post) -> Vec<String> {
    vec![
        "/".to_string(),
        "/noticias".to_string(),
        post.detail_route(),
    ]
}

/// Brings the carousel in line with a post's current state. A slide exists
/// for a post exactly while the post is featured, published and has a cover
/// image; the slide is located through its `action_url`, which equals the
/// post's detail route.
pub fn sync_carousel_mirror(conn: &Connection, post: &Post) -> Result<(), DbError> {
    let should_exist =
        post.featured && post.published && post.cover_image.as_deref().is_some_and(|c| !c.is_empty());
    let existing = carousel_db_operations::find_slide_by_action_url(conn, &post.detail_route());

    match (should_exist, existing) {
        (true, None) => {
            let slide = CarouselSlide {
                id: Uuid::new_v4().to_string(),
                title: post.title.clone(),
                description: post.summary.clone(),
                image_url: post.cover_image.clone().unwrap_or_default(),
                action_url: post.detail_route(),
                action_text: MIRROR_ACTION_TEXT.to_string(),
                is_active: true,
                display_order: carousel_db_operations::next_display_order(conn)?,
                created_at: Utc::now(),
            };
            carousel_db_operations::create_slide(conn, &slide)?;
        }
        (true, Some(mut slide)) => {
            // Manual reordering of the slide survives post edits.
            slide.title = post.title.clone();
            slide.description = post.summary.clone();
            slide.image_url = post.cover_image.clone().unwrap_or_default();
            slide.is_active = true;
            carousel_db_operations::update_slide(conn, &slide)?;
        }
        (false, Some(slide)) => {
            carousel_db_operations::delete_slide(conn, &slide.id)?;
        }
        (false, None) => {}
    }
    Ok(())
}

pub fn create_post(
    conn: &Connection,
    notifier: &CacheNotifier,
    actor: Option<&str>,
    form: &PostForm,
    cover_image: Option<String>,
) -> Result<Post, WorkflowError> {
    let validated = validate(form)?;
    let slug = slug_helpers::unique_slug(conn, &validated.title);

    let post = Post {
        id: Uuid::new_v4().to_string(),
        title: validated.title,
        slug,
        summary: validated.summary,
        content: validated.content,
        cover_image: cover_image.filter(|c| !c.is_empty()),
        post_type: validated.post_type,
        published: form.published,
        featured: form.featured,
        event_date: validated.event_date,
        location: validated.location,
        created_at: Utc::now(),
    };

    posts_db_operations::create_post(conn, &post)?;
    sync_carousel_mirror(conn, &post)?;
    audit_helpers::record(conn, actor, AuditAction::Criou, "Post", &post.title);
    notifier.declare_stale(&stale_routes(&post));
    Ok(post)
}

/// Applies an edit to an existing post and re-syncs its carousel mirror.
///
/// `new_cover` is the stored path of a freshly uploaded image; `None` (or an
/// empty path, the file store's failure signal) keeps the current image.
/// `remove_image` clears it outright and wins over a new upload.
pub fn update_post(
    conn: &Connection,
    notifier: &CacheNotifier,
    actor: Option<&str>,
    post_id: &str,
    form: &PostForm,
    new_cover: Option<String>,
    remove_image: bool,
) -> Result<Post, WorkflowError> {
    let mut post = posts_db_operations::read_post(conn, post_id)
        .ok_or_else(|| WorkflowError::NotFound(format!("Post {}", post_id)))?;
    let validated = validate(form)?;

    post.title = validated.title;
    post.summary = validated.summary;
    post.content = validated.content;
    post.post_type = validated.post_type;
    post.published = form.published;
    post.featured = form.featured;
    post.event_date = validated.event_date;
    post.location = validated.location;

    if remove_image {
        post.cover_image = None;
    } else if let Some(path) = new_cover.filter(|c| !c.is_empty()) {
        post.cover_image = Some(path);
    }

    posts_db_operations::update_post(conn, &post)?;
    sync_carousel_mirror(conn, &post)?;
    audit_helpers::record(conn, actor, AuditAction::Editou, "Post", &post.title);
    notifier.declare_stale(&stale_routes(&post));
    Ok(post)
}

/// Tolerant delete: removing an already-gone post succeeds quietly. When the
/// post exists its carousel mirror is removed unconditionally, even if the
/// post's current state would not warrant a mirror.
pub fn delete_post(
    conn: &Connection,
    notifier: &CacheNotifier,
    actor: Option<&str>,
    post_id: &str,
) -> Result<(), WorkflowError> {
    let post = match posts_db_operations::read_post(conn, post_id) {
        Some(p) => p,
        None => return Ok(()),
    };

    posts_db_operations::delete_post(conn, post_id)?;
    if let Some(slide) =
        carousel_db_operations::find_slide_by_action_url(conn, &post.detail_route())
    {
        carousel_db_operations::delete_slide(conn, &slide.id)?;
    }
    audit_helpers::record(conn, actor, AuditAction::Excluiu, "Post", &post.title);
    notifier.declare_stale(&stale_routes(&post));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::db_operations::users_db_operations;
    use crate::setup::db_setup;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::create_schema(&mut conn).unwrap();
        users_db_operations::create_user(&conn, "admin", "senha-forte", "admin").unwrap();
        conn
    }

    fn sample_form() -> PostForm {
        PostForm {
            title: "Formatura 2026".to_string(),
            summary: "A turma de 2026 se forma.".to_string(),
            content: "Detalhes da cerimônia de formatura.".to_string(),
            post_type: "NEWS".to_string(),
            published: true,
            featured: true,
            event_date: None,
            location: None,
        }
    }

    fn slides(conn: &Connection) -> Vec<CarouselSlide> {
        carousel_db_operations::read_all_slides(conn).unwrap()
    }

    #[test]
    fn featured_published_post_with_cover_gets_a_mirror() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();

        let post = create_post(
            &conn,
            &notifier,
            Some("admin"),
            &sample_form(),
            Some("/uploads/news/123-capa.jpg".to_string()),
        )
        .unwrap();

        assert_eq!(post.slug, "formatura-2026");
        let all = slides(&conn);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Formatura 2026");
        assert_eq!(all[0].action_url, "/noticias/formatura-2026");
        assert_eq!(all[0].action_text, "Leia Mais");
        assert!(all[0].is_active);
        assert_eq!(all[0].display_order, 1);
        assert_eq!(all[0].image_url, "/uploads/news/123-capa.jpg");

        let audit = audit_helpers::recent(&conn, 10);
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, "CRIOU");
        assert_eq!(audit[0].resource, "Post");

        let stale = notifier.take_stale();
        assert!(stale.contains("/"));
        assert!(stale.contains("/noticias"));
        assert!(stale.contains("/noticias/formatura-2026"));
    }

    #[test]
    fn post_without_cover_gets_no_mirror() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        create_post(&conn, &notifier, Some("admin"), &sample_form(), None).unwrap();
        assert!(slides(&conn).is_empty());
    }

    #[test]
    fn unfeaturing_removes_the_mirror() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let post = create_post(
            &conn,
            &notifier,
            Some("admin"),
            &sample_form(),
            Some("/uploads/news/1-a.jpg".to_string()),
        )
        .unwrap();
        assert_eq!(slides(&conn).len(), 1);

        let mut form = sample_form();
        form.featured = false;
        update_post(&conn, &notifier, Some("admin"), &post.id, &form, None, false).unwrap();
        assert!(slides(&conn).is_empty());
    }

    #[test]
    fn repeated_edits_never_duplicate_the_mirror() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let post = create_post(
            &conn,
            &notifier,
            Some("admin"),
            &sample_form(),
            Some("/uploads/news/1-a.jpg".to_string()),
        )
        .unwrap();

        let mut form = sample_form();
        form.title = "Formatura 2026 - Atualizado".to_string();
        for _ in 0..3 {
            update_post(&conn, &notifier, Some("admin"), &post.id, &form, None, false).unwrap();
        }

        let all = slides(&conn);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Formatura 2026 - Atualizado");
        // The slug, and with it the join key, never changes.
        assert_eq!(all[0].action_url, "/noticias/formatura-2026");
    }

    #[test]
    fn manual_display_order_survives_post_edits() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let post = create_post(
            &conn,
            &notifier,
            Some("admin"),
            &sample_form(),
            Some("/uploads/news/1-a.jpg".to_string()),
        )
        .unwrap();

        let mut slide = slides(&conn).remove(0);
        slide.display_order = 42;
        carousel_db_operations::update_slide(&conn, &slide).unwrap();

        update_post(&conn, &notifier, Some("admin"), &post.id, &sample_form(), None, false)
            .unwrap();
        assert_eq!(slides(&conn)[0].display_order, 42);
    }

    #[test]
    fn duplicate_titles_get_distinct_slugs() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let first = create_post(&conn, &notifier, Some("admin"), &sample_form(), None).unwrap();
        let second = create_post(&conn, &notifier, Some("admin"), &sample_form(), None).unwrap();
        assert_ne!(first.slug, second.slug);
        assert!(second.slug.starts_with("formatura-2026-"));
    }

    #[test]
    fn removing_the_cover_image_removes_the_mirror() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let post = create_post(
            &conn,
            &notifier,
            Some("admin"),
            &sample_form(),
            Some("/uploads/news/1-a.jpg".to_string()),
        )
        .unwrap();

        let updated = update_post(
            &conn,
            &notifier,
            Some("admin"),
            &post.id,
            &sample_form(),
            None,
            true,
        )
        .unwrap();
        assert!(updated.cover_image.is_none());
        assert!(slides(&conn).is_empty());
    }

    #[test]
    fn empty_upload_path_keeps_the_current_cover() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let post = create_post(
            &conn,
            &notifier,
            Some("admin"),
            &sample_form(),
            Some("/uploads/news/1-a.jpg".to_string()),
        )
        .unwrap();

        let updated = update_post(
            &conn,
            &notifier,
            Some("admin"),
            &post.id,
            &sample_form(),
            Some(String::new()),
            false,
        )
        .unwrap();
        assert_eq!(updated.cover_image.as_deref(), Some("/uploads/news/1-a.jpg"));
        assert_eq!(slides(&conn).len(), 1);
    }

    #[test]
    fn delete_removes_post_and_mirror() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let post = create_post(
            &conn,
            &notifier,
            Some("admin"),
            &sample_form(),
            Some("/uploads/news/1-a.jpg".to_string()),
        )
        .unwrap();

        delete_post(&conn, &notifier, Some("admin"), &post.id).unwrap();
        assert!(posts_db_operations::read_post(&conn, &post.id).is_none());
        assert!(slides(&conn).is_empty());
    }

    #[test]
    fn deleting_a_missing_post_is_a_no_op() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        delete_post(&conn, &notifier, Some("admin"), "nao-existe").unwrap();
        assert!(notifier.take_stale().is_empty());
    }

    #[test]
    fn validation_failure_writes_nothing() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let mut form = sample_form();
        form.title = "   ".to_string();

        let err = create_post(&conn, &notifier, Some("admin"), &form, None).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(posts_db_operations::count_posts(&conn), 0);
        assert!(slides(&conn).is_empty());
        assert!(notifier.take_stale().is_empty());
    }

    #[test]
    fn unknown_post_type_is_rejected() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let mut form = sample_form();
        form.post_type = "GALERIA".to_string();
        let err = create_post(&conn, &notifier, Some("admin"), &form, None).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn event_posts_carry_date_and_location() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let mut form = sample_form();
        form.post_type = "EVENT".to_string();
        form.event_date = Some("2026-12-05T19:00".to_string());
        form.location = Some("Quadra da escola".to_string());

        let post = create_post(&conn, &notifier, Some("admin"), &form, None).unwrap();
        let stored = posts_db_operations::read_post(&conn, &post.id).unwrap();
        assert!(stored.event_date.is_some());
        assert_eq!(stored.location.as_deref(), Some("Quadra da escola"));
    }

    #[test]
    fn audit_is_best_effort_for_unknown_actor() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let post =
            create_post(&conn, &notifier, Some("desconhecido"), &sample_form(), None).unwrap();
        // Post creation succeeded even though no audit row could be written.
        assert!(posts_db_operations::read_post(&conn, &post.id).is_some());
        assert!(audit_helpers::recent(&conn, 10).is_empty());
    }

    #[test]
    fn title_html_is_stripped_and_content_escaped() {
        let conn = test_conn();
        let notifier = CacheNotifier::new();
        let mut form = sample_form();
        form.title = "<b>Festa</b> Junina".to_string();
        form.content = "Venha <script>alert(1)</script>".to_string();

        let post = create_post(&conn, &notifier, Some("admin"), &form, None).unwrap();
        assert_eq!(post.title, "Festa Junina");
        assert!(!post.content.contains("<script>"));
    }
}
