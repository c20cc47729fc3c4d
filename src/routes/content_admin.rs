//! Back-office handlers for the content entities: posts and their carousel
//! mirrors, manually managed slides, courses, banners, partners, team
//! members and students. All mutations redirect back to the dashboard with
//! a session notification.

use crate::config::Config;
use crate::helper::cache_helpers::CacheNotifier;
use crate::helper::form_helpers::{self, ParsedForm};
use crate::helper::publishing_helpers::{self, PostForm, WorkflowError};
use crate::helper::{audit_helpers, sanitization_helpers, upload_helpers};
use crate::middleware::AuthenticatedAdmin;
use crate::models::db_operations::{carousel_db_operations, content_db_operations};
use crate::models::{
    AuditAction, Banner, CarouselSlide, Course, Partner, PostType, Student, TeamMember,
};
use crate::routes::admin::{dashboard_url, set_notification};
use actix_multipart::Multipart;
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use uuid::Uuid;

pub fn config_content_admin(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts/create", web::post().to(create_post_action))
        .route("/posts/update", web::post().to(update_post_action))
        .route("/posts/delete", web::post().to(delete_post_action))
        .route("/slides/create", web::post().to(create_slide_action))
        .route("/slides/update", web::post().to(update_slide_action))
        .route("/slides/delete", web::post().to(delete_slide_action))
        .route("/courses/create", web::post().to(create_course_action))
        .route("/courses/update", web::post().to(update_course_action))
        .route("/courses/delete", web::post().to(delete_course_action))
        .route("/banners/create", web::post().to(create_banner_action))
        .route("/banners/update", web::post().to(update_banner_action))
        .route("/banners/delete", web::post().to(delete_banner_action))
        .route("/partners/create", web::post().to(create_partner_action))
        .route("/partners/update", web::post().to(update_partner_action))
        .route("/partners/delete", web::post().to(delete_partner_action))
        .route("/team/create", web::post().to(create_team_member_action))
        .route("/team/update", web::post().to(update_team_member_action))
        .route("/team/delete", web::post().to(delete_team_member_action))
        .route("/students/create", web::post().to(create_student_action))
        .route("/students/update", web::post().to(update_student_action))
        .route("/students/delete", web::post().to(delete_student_action));
}

fn redirect(url: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("location", url.to_string()))
        .finish()
}

/// Stores an uploaded form file on the blocking pool. `None` means either no
/// file was submitted or the write failed; callers keep any existing path.
async fn store_upload(
    form: &ParsedForm,
    field: &str,
    category: &'static str,
    config: &Config,
) -> Option<String> {
    let file = form.file(field)?;
    let bytes = file.bytes.clone();
    let filename = file.filename.clone();
    let root = config.uploads_root();
    match web::block(move || upload_helpers::store(&bytes, &filename, category, &root)).await {
        Ok(path) if !path.is_empty() => Some(path),
        Ok(_) => None,
        Err(e) => {
            log::error!("Blocking pool error while storing upload: {}", e);
            None
        }
    }
}

fn upload_category_for(post_type: &str) -> &'static str {
    match post_type.parse::<PostType>() {
        Ok(PostType::Event) => "events",
        Ok(PostType::Project) | Ok(PostType::Activity) => "projects",
        _ => "news",
    }
}

fn post_form_from(parsed: &ParsedForm) -> PostForm {
    let opt = |name: &str| {
        let v = parsed.text(name);
        if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        }
    };
    PostForm {
        title: parsed.text("title").to_string(),
        summary: parsed.text("summary").to_string(),
        content: parsed.text("content").to_string(),
        post_type: parsed.text("post_type").to_string(),
        published: parsed.flag("published"),
        featured: parsed.flag("featured"),
        event_date: opt("event_date"),
        location: opt("location"),
    }
}

macro_rules! get_conn_or_redirect {
    ($pool:expr, $session:expr, $url:expr) => {
        match $pool.get() {
            Ok(c) => c,
            Err(e) => {
                log::error!("Database pool error: {}", e);
                set_notification(&$session, "Erro de conexão com o banco de dados.", "error");
                return redirect(&$url);
            }
        }
    };
}

macro_rules! parse_multipart_or_redirect {
    ($payload:expr, $session:expr, $url:expr) => {
        match form_helpers::collect_multipart($payload).await {
            Ok(p) => p,
            Err(_) => {
                set_notification(&$session, "Formulário inválido.", "error");
                return redirect(&$url);
            }
        }
    };
}

// --- Posts ---

async fn create_post_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);
    let form = post_form_from(&parsed);

    let category = upload_category_for(&form.post_type);
    let cover = store_upload(&parsed, "cover_image", category, &config).await;

    let conn = get_conn_or_redirect!(pool, session, url);
    match publishing_helpers::create_post(
        &conn,
        &notifier,
        Some(&auth_user.username),
        &form,
        cover,
    ) {
        Ok(post) => set_notification(
            &session,
            &format!("Publicação '{}' criada com sucesso.", post.title),
            "success",
        ),
        Err(WorkflowError::Validation(msg)) => set_notification(&session, &msg, "error"),
        Err(e) => {
            log::error!("Failed to create post: {}", e);
            set_notification(&session, "Falha ao criar a publicação.", "error");
        }
    }
    redirect(&url)
}

async fn update_post_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);
    let post_id = parsed.text("post_id").to_string();
    if post_id.is_empty() {
        set_notification(&session, "Publicação não informada.", "error");
        return redirect(&url);
    }
    let form = post_form_from(&parsed);
    let remove_image = parsed.flag("remove_image");

    let category = upload_category_for(&form.post_type);
    let new_cover = store_upload(&parsed, "cover_image", category, &config).await;

    let conn = get_conn_or_redirect!(pool, session, url);
    match publishing_helpers::update_post(
        &conn,
        &notifier,
        Some(&auth_user.username),
        &post_id,
        &form,
        new_cover,
        remove_image,
    ) {
        Ok(post) => set_notification(
            &session,
            &format!("Publicação '{}' atualizada com sucesso.", post.title),
            "success",
        ),
        Err(WorkflowError::Validation(msg)) => set_notification(&session, &msg, "error"),
        Err(WorkflowError::NotFound(_)) => {
            set_notification(&session, "Publicação não encontrada.", "error")
        }
        Err(e) => {
            log::error!("Failed to update post {}: {}", post_id, e);
            set_notification(&session, "Falha ao atualizar a publicação.", "error");
        }
    }
    redirect(&url)
}

async fn delete_post_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    form: web::Bytes,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let post_id = parsed.get("post_id").cloned().unwrap_or_default();

    let conn = get_conn_or_redirect!(pool, session, url);
    match publishing_helpers::delete_post(&conn, &notifier, Some(&auth_user.username), &post_id) {
        Ok(()) => set_notification(&session, "Publicação excluída.", "success"),
        Err(e) => {
            log::error!("Failed to delete post {}: {}", post_id, e);
            set_notification(&session, "Falha ao excluir a publicação.", "error");
        }
    }
    redirect(&url)
}

// --- Carousel slides (manually managed, alongside post mirrors) ---

async fn create_slide_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);

    let title = sanitization_helpers::strip_all_html(parsed.text("title"));
    if title.is_empty() {
        set_notification(&session, "O título do destaque é obrigatório.", "error");
        return redirect(&url);
    }

    let image_url = match store_upload(&parsed, "image", "banners", &config).await {
        Some(path) => path,
        None => {
            set_notification(&session, "A imagem do destaque é obrigatória.", "error");
            return redirect(&url);
        }
    };

    let conn = get_conn_or_redirect!(pool, session, url);
    let display_order = match carousel_db_operations::next_display_order(&conn) {
        Ok(order) => order,
        Err(e) => {
            log::error!("Failed to compute slide order: {}", e);
            set_notification(&session, "Falha ao criar o destaque.", "error");
            return redirect(&url);
        }
    };

    let slide = CarouselSlide {
        id: Uuid::new_v4().to_string(),
        title,
        description: sanitization_helpers::strip_all_html(parsed.text("description")),
        image_url,
        action_url: parsed.text("action_url").to_string(),
        action_text: parsed.text("action_text").to_string(),
        is_active: parsed.flag("is_active"),
        display_order,
        created_at: Utc::now(),
    };

    match carousel_db_operations::create_slide(&conn, &slide) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Criou,
                "CarouselSlide",
                &slide.title,
            );
            notifier.declare_stale(&["/".to_string()]);
            set_notification(&session, "Destaque criado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to create carousel slide: {}", e);
            set_notification(&session, "Falha ao criar o destaque.", "error");
        }
    }
    redirect(&url)
}

async fn update_slide_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);
    let slide_id = parsed.text("slide_id").to_string();

    let new_image = store_upload(&parsed, "image", "banners", &config).await;

    let conn = get_conn_or_redirect!(pool, session, url);
    let mut slide = match carousel_db_operations::read_slide(&conn, &slide_id) {
        Some(s) => s,
        None => {
            set_notification(&session, "Destaque não encontrado.", "error");
            return redirect(&url);
        }
    };

    let title = sanitization_helpers::strip_all_html(parsed.text("title"));
    if !title.is_empty() {
        slide.title = title;
    }
    slide.description = sanitization_helpers::strip_all_html(parsed.text("description"));
    if !parsed.text("action_url").is_empty() {
        slide.action_url = parsed.text("action_url").to_string();
    }
    if !parsed.text("action_text").is_empty() {
        slide.action_text = parsed.text("action_text").to_string();
    }
    slide.is_active = parsed.flag("is_active");
    if let Ok(order) = parsed.text("display_order").parse::<i64>() {
        slide.display_order = order;
    }
    if let Some(path) = new_image {
        slide.image_url = path;
    }

    match carousel_db_operations::update_slide(&conn, &slide) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Editou,
                "CarouselSlide",
                &slide.title,
            );
            notifier.declare_stale(&["/".to_string()]);
            set_notification(&session, "Destaque atualizado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to update carousel slide {}: {}", slide_id, e);
            set_notification(&session, "Falha ao atualizar o destaque.", "error");
        }
    }
    redirect(&url)
}

async fn delete_slide_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    form: web::Bytes,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let slide_id = parsed.get("slide_id").cloned().unwrap_or_default();

    let conn = get_conn_or_redirect!(pool, session, url);
    match carousel_db_operations::delete_slide(&conn, &slide_id) {
        Ok(_) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Excluiu,
                "CarouselSlide",
                &slide_id,
            );
            notifier.declare_stale(&["/".to_string()]);
            set_notification(&session, "Destaque excluído.", "success");
        }
        Err(e) => {
            log::error!("Failed to delete carousel slide {}: {}", slide_id, e);
            set_notification(&session, "Falha ao excluir o destaque.", "error");
        }
    }
    redirect(&url)
}

// --- Courses ---

async fn create_course_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);

    let title = sanitization_helpers::strip_all_html(parsed.text("title"));
    let description = sanitization_helpers::strip_all_html(parsed.text("description"));
    if title.is_empty() || description.is_empty() {
        set_notification(&session, "Título e descrição são obrigatórios.", "error");
        return redirect(&url);
    }

    let image = store_upload(&parsed, "image", "courses", &config).await;
    let duration = Some(parsed.text("duration").to_string()).filter(|s| !s.is_empty());

    let course = Course {
        id: Uuid::new_v4().to_string(),
        title,
        description,
        image,
        duration,
        active: parsed.flag("active"),
        created_at: Utc::now(),
    };

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::create_course(&conn, &course) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Criou,
                "Curso",
                &course.title,
            );
            notifier.declare_stale(&["/cursos".to_string()]);
            set_notification(&session, "Curso criado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to create course: {}", e);
            set_notification(&session, "Falha ao criar o curso.", "error");
        }
    }
    redirect(&url)
}

async fn update_course_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);
    let course_id = parsed.text("course_id").to_string();

    let new_image = store_upload(&parsed, "image", "courses", &config).await;

    let conn = get_conn_or_redirect!(pool, session, url);
    let mut course = match content_db_operations::read_course(&conn, &course_id) {
        Some(c) => c,
        None => {
            set_notification(&session, "Curso não encontrado.", "error");
            return redirect(&url);
        }
    };

    let title = sanitization_helpers::strip_all_html(parsed.text("title"));
    if !title.is_empty() {
        course.title = title;
    }
    let description = sanitization_helpers::strip_all_html(parsed.text("description"));
    if !description.is_empty() {
        course.description = description;
    }
    course.duration = Some(parsed.text("duration").to_string()).filter(|s| !s.is_empty());
    course.active = parsed.flag("active");
    if let Some(path) = new_image {
        course.image = Some(path);
    }

    match content_db_operations::update_course(&conn, &course) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Editou,
                "Curso",
                &course.title,
            );
            notifier.declare_stale(&["/cursos".to_string()]);
            set_notification(&session, "Curso atualizado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to update course {}: {}", course_id, e);
            set_notification(&session, "Falha ao atualizar o curso.", "error");
        }
    }
    redirect(&url)
}

async fn delete_course_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    form: web::Bytes,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let course_id = parsed.get("course_id").cloned().unwrap_or_default();

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::delete_course(&conn, &course_id) {
        Ok(_) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Excluiu,
                "Curso",
                &course_id,
            );
            notifier.declare_stale(&["/cursos".to_string()]);
            set_notification(&session, "Curso excluído.", "success");
        }
        Err(e) => {
            log::error!("Failed to delete course {}: {}", course_id, e);
            set_notification(&session, "Falha ao excluir o curso.", "error");
        }
    }
    redirect(&url)
}

// --- Banners ---

async fn create_banner_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);

    let title = sanitization_helpers::strip_all_html(parsed.text("title"));
    if title.is_empty() {
        set_notification(&session, "O título do banner é obrigatório.", "error");
        return redirect(&url);
    }
    let image = match store_upload(&parsed, "image", "banners", &config).await {
        Some(path) => path,
        None => {
            set_notification(&session, "A imagem do banner é obrigatória.", "error");
            return redirect(&url);
        }
    };

    let banner = Banner {
        id: Uuid::new_v4().to_string(),
        title,
        image,
        link: Some(parsed.text("link").to_string()).filter(|s| !s.is_empty()),
        active: parsed.flag("active"),
        display_order: parsed.text("display_order").parse().unwrap_or(0),
        created_at: Utc::now(),
    };

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::create_banner(&conn, &banner) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Criou,
                "Banner",
                &banner.title,
            );
            notifier.declare_stale(&["/".to_string()]);
            set_notification(&session, "Banner criado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to create banner: {}", e);
            set_notification(&session, "Falha ao criar o banner.", "error");
        }
    }
    redirect(&url)
}

async fn update_banner_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);
    let banner_id = parsed.text("banner_id").to_string();

    let new_image = store_upload(&parsed, "image", "banners", &config).await;

    let conn = get_conn_or_redirect!(pool, session, url);
    let mut banner = match content_db_operations::read_banner(&conn, &banner_id) {
        Some(b) => b,
        None => {
            set_notification(&session, "Banner não encontrado.", "error");
            return redirect(&url);
        }
    };

    let title = sanitization_helpers::strip_all_html(parsed.text("title"));
    if !title.is_empty() {
        banner.title = title;
    }
    banner.link = Some(parsed.text("link").to_string()).filter(|s| !s.is_empty());
    banner.active = parsed.flag("active");
    if let Ok(order) = parsed.text("display_order").parse::<i64>() {
        banner.display_order = order;
    }
    if let Some(path) = new_image {
        banner.image = path;
    }

    match content_db_operations::update_banner(&conn, &banner) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Editou,
                "Banner",
                &banner.title,
            );
            notifier.declare_stale(&["/".to_string()]);
            set_notification(&session, "Banner atualizado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to update banner {}: {}", banner_id, e);
            set_notification(&session, "Falha ao atualizar o banner.", "error");
        }
    }
    redirect(&url)
}

async fn delete_banner_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    form: web::Bytes,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let banner_id = parsed.get("banner_id").cloned().unwrap_or_default();

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::delete_banner(&conn, &banner_id) {
        Ok(_) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Excluiu,
                "Banner",
                &banner_id,
            );
            notifier.declare_stale(&["/".to_string()]);
            set_notification(&session, "Banner excluído.", "success");
        }
        Err(e) => {
            log::error!("Failed to delete banner {}: {}", banner_id, e);
            set_notification(&session, "Falha ao excluir o banner.", "error");
        }
    }
    redirect(&url)
}

// --- Partners ---

async fn create_partner_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);

    let name = sanitization_helpers::strip_all_html(parsed.text("name"));
    if name.is_empty() {
        set_notification(&session, "O nome do parceiro é obrigatório.", "error");
        return redirect(&url);
    }

    let partner = Partner {
        id: Uuid::new_v4().to_string(),
        name,
        logo: store_upload(&parsed, "logo", "partners", &config).await,
        website: Some(parsed.text("website").to_string()).filter(|s| !s.is_empty()),
        created_at: Utc::now(),
    };

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::create_partner(&conn, &partner) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Criou,
                "Parceiro",
                &partner.name,
            );
            notifier.declare_stale(&["/parceiros".to_string()]);
            set_notification(&session, "Parceiro criado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to create partner: {}", e);
            set_notification(&session, "Falha ao criar o parceiro.", "error");
        }
    }
    redirect(&url)
}

async fn update_partner_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);
    let partner_id = parsed.text("partner_id").to_string();

    let new_logo = store_upload(&parsed, "logo", "partners", &config).await;

    let conn = get_conn_or_redirect!(pool, session, url);
    let mut partner = match content_db_operations::read_partner(&conn, &partner_id) {
        Some(p) => p,
        None => {
            set_notification(&session, "Parceiro não encontrado.", "error");
            return redirect(&url);
        }
    };

    let name = sanitization_helpers::strip_all_html(parsed.text("name"));
    if !name.is_empty() {
        partner.name = name;
    }
    partner.website = Some(parsed.text("website").to_string()).filter(|s| !s.is_empty());
    if let Some(path) = new_logo {
        partner.logo = Some(path);
    }

    match content_db_operations::update_partner(&conn, &partner) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Editou,
                "Parceiro",
                &partner.name,
            );
            notifier.declare_stale(&["/parceiros".to_string()]);
            set_notification(&session, "Parceiro atualizado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to update partner {}: {}", partner_id, e);
            set_notification(&session, "Falha ao atualizar o parceiro.", "error");
        }
    }
    redirect(&url)
}

async fn delete_partner_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    form: web::Bytes,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let partner_id = parsed.get("partner_id").cloned().unwrap_or_default();

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::delete_partner(&conn, &partner_id) {
        Ok(_) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Excluiu,
                "Parceiro",
                &partner_id,
            );
            notifier.declare_stale(&["/parceiros".to_string()]);
            set_notification(&session, "Parceiro excluído.", "success");
        }
        Err(e) => {
            log::error!("Failed to delete partner {}: {}", partner_id, e);
            set_notification(&session, "Falha ao excluir o parceiro.", "error");
        }
    }
    redirect(&url)
}

// --- Team members ---

async fn create_team_member_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);

    let name = sanitization_helpers::strip_all_html(parsed.text("name"));
    let role = sanitization_helpers::strip_all_html(parsed.text("role"));
    if name.is_empty() || role.is_empty() {
        set_notification(&session, "Nome e função são obrigatórios.", "error");
        return redirect(&url);
    }

    let member = TeamMember {
        id: Uuid::new_v4().to_string(),
        name,
        role,
        photo: store_upload(&parsed, "photo", "team", &config).await,
        bio: Some(parsed.text("bio").to_string()).filter(|s| !s.is_empty()),
        display_order: parsed.text("display_order").parse().unwrap_or(0),
        created_at: Utc::now(),
    };

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::create_team_member(&conn, &member) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Criou,
                "MembroEquipe",
                &member.name,
            );
            notifier.declare_stale(&["/equipe".to_string()]);
            set_notification(&session, "Membro da equipe criado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to create team member: {}", e);
            set_notification(&session, "Falha ao criar o membro da equipe.", "error");
        }
    }
    redirect(&url)
}

async fn update_team_member_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);
    let member_id = parsed.text("member_id").to_string();

    let new_photo = store_upload(&parsed, "photo", "team", &config).await;

    let conn = get_conn_or_redirect!(pool, session, url);
    let mut member = match content_db_operations::read_team_member(&conn, &member_id) {
        Some(m) => m,
        None => {
            set_notification(&session, "Membro da equipe não encontrado.", "error");
            return redirect(&url);
        }
    };

    let name = sanitization_helpers::strip_all_html(parsed.text("name"));
    if !name.is_empty() {
        member.name = name;
    }
    let role = sanitization_helpers::strip_all_html(parsed.text("role"));
    if !role.is_empty() {
        member.role = role;
    }
    member.bio = Some(parsed.text("bio").to_string()).filter(|s| !s.is_empty());
    if let Ok(order) = parsed.text("display_order").parse::<i64>() {
        member.display_order = order;
    }
    if let Some(path) = new_photo {
        member.photo = Some(path);
    }

    match content_db_operations::update_team_member(&conn, &member) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Editou,
                "MembroEquipe",
                &member.name,
            );
            notifier.declare_stale(&["/equipe".to_string()]);
            set_notification(&session, "Membro da equipe atualizado.", "success");
        }
        Err(e) => {
            log::error!("Failed to update team member {}: {}", member_id, e);
            set_notification(&session, "Falha ao atualizar o membro da equipe.", "error");
        }
    }
    redirect(&url)
}

async fn delete_team_member_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    config: web::Data<Config>,
    form: web::Bytes,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let member_id = parsed.get("member_id").cloned().unwrap_or_default();

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::delete_team_member(&conn, &member_id) {
        Ok(_) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Excluiu,
                "MembroEquipe",
                &member_id,
            );
            notifier.declare_stale(&["/equipe".to_string()]);
            set_notification(&session, "Membro da equipe excluído.", "success");
        }
        Err(e) => {
            log::error!("Failed to delete team member {}: {}", member_id, e);
            set_notification(&session, "Falha ao excluir o membro da equipe.", "error");
        }
    }
    redirect(&url)
}

// --- Students ---

async fn create_student_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);

    let name = sanitization_helpers::strip_all_html(parsed.text("name"));
    if name.is_empty() {
        set_notification(&session, "O nome do aluno é obrigatório.", "error");
        return redirect(&url);
    }

    let student = Student {
        id: Uuid::new_v4().to_string(),
        name,
        photo: store_upload(&parsed, "photo", "students", &config).await,
        birth_date: Some(parsed.text("birth_date").to_string()).filter(|s| !s.is_empty()),
        class_group: Some(parsed.text("class_group").to_string()).filter(|s| !s.is_empty()),
        created_at: Utc::now(),
    };

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::create_student(&conn, &student) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Criou,
                "Aluno",
                &student.name,
            );
            set_notification(&session, "Aluno cadastrado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to create student: {}", e);
            set_notification(&session, "Falha ao cadastrar o aluno.", "error");
        }
    }
    redirect(&url)
}

async fn update_student_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = parse_multipart_or_redirect!(payload, session, url);
    let student_id = parsed.text("student_id").to_string();

    let new_photo = store_upload(&parsed, "photo", "students", &config).await;

    let conn = get_conn_or_redirect!(pool, session, url);
    let mut student = match content_db_operations::read_student(&conn, &student_id) {
        Some(s) => s,
        None => {
            set_notification(&session, "Aluno não encontrado.", "error");
            return redirect(&url);
        }
    };

    let name = sanitization_helpers::strip_all_html(parsed.text("name"));
    if !name.is_empty() {
        student.name = name;
    }
    student.birth_date = Some(parsed.text("birth_date").to_string()).filter(|s| !s.is_empty());
    student.class_group = Some(parsed.text("class_group").to_string()).filter(|s| !s.is_empty());
    if let Some(path) = new_photo {
        student.photo = Some(path);
    }

    match content_db_operations::update_student(&conn, &student) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Editou,
                "Aluno",
                &student.name,
            );
            set_notification(&session, "Aluno atualizado com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to update student {}: {}", student_id, e);
            set_notification(&session, "Falha ao atualizar o aluno.", "error");
        }
    }
    redirect(&url)
}

async fn delete_student_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    config: web::Data<Config>,
    form: web::Bytes,
) -> impl Responder {
    let url = dashboard_url(&config);
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let student_id = parsed.get("student_id").cloned().unwrap_or_default();

    let conn = get_conn_or_redirect!(pool, session, url);
    match content_db_operations::delete_student(&conn, &student_id) {
        Ok(_) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Excluiu,
                "Aluno",
                &student_id,
            );
            set_notification(&session, "Aluno excluído.", "success");
        }
        Err(e) => {
            log::error!("Failed to delete student {}: {}", student_id, e);
            set_notification(&session, "Falha ao excluir o aluno.", "error");
        }
    }
    redirect(&url)
}
