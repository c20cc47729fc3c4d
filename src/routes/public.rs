use crate::models::db_operations::{
    carousel_db_operations, content_db_operations, posts_db_operations, settings_db_operations,
};
use crate::models::PostType;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tera::{Context, Tera};

#[derive(Deserialize)]
pub struct PageQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

pub fn config_public(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(show_home))
        .route("/noticias", web::get().to(show_news_list))
        .route("/noticias/{slug}", web::get().to(show_news_detail))
        .route("/eventos", web::get().to(show_events))
        .route("/cursos", web::get().to(show_courses))
        .route("/equipe", web::get().to(show_team))
        .route("/parceiros", web::get().to(show_partners));
}

fn render(tera: &Tera, template: &str, ctx: &Context) -> HttpResponse {
    match tera.render(template, ctx) {
        Ok(rendered) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => {
            log::error!("Template rendering error for '{}': {}", template, e);
            HttpResponse::InternalServerError().body("Erro ao renderizar a página.")
        }
    }
}

/// Every public page carries the site settings for the header and footer.
fn base_context(conn: &rusqlite::Connection) -> Context {
    let mut ctx = Context::new();
    ctx.insert("settings", &settings_db_operations::read_settings(conn));
    ctx
}

macro_rules! get_conn {
    ($pool:expr) => {
        match $pool.get() {
            Ok(c) => c,
            Err(e) => {
                log::error!("Database pool error: {}", e);
                return HttpResponse::InternalServerError().body("Erro de banco de dados.");
            }
        }
    };
}

async fn show_home(tera: web::Data<Tera>, pool: web::Data<crate::DbPool>) -> impl Responder {
    let conn = get_conn!(pool);
    let mut ctx = base_context(&conn);

    match carousel_db_operations::read_active_slides(&conn) {
        Ok(slides) => ctx.insert("slides", &slides),
        Err(e) => {
            log::error!("Failed to read carousel slides: {}", e);
            ctx.insert("slides", &Vec::<String>::new());
        }
    }
    match content_db_operations::read_banners(&conn, true) {
        Ok(banners) => ctx.insert("banners", &banners),
        Err(e) => {
            log::error!("Failed to read banners: {}", e);
            ctx.insert("banners", &Vec::<String>::new());
        }
    }
    match posts_db_operations::read_latest_posts(&conn, true, None, 6, 0) {
        Ok(posts) => ctx.insert("latest_posts", &posts),
        Err(e) => {
            log::error!("Failed to read latest posts: {}", e);
            ctx.insert("latest_posts", &Vec::<String>::new());
        }
    }

    render(&tera, "public/home.html", &ctx)
}

async fn show_news_list(
    tera: web::Data<Tera>,
    pool: web::Data<crate::DbPool>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let conn = get_conn!(pool);
    let mut ctx = base_context(&conn);
    let limit = query.limit.unwrap_or(12).min(50);
    let offset = query.offset.unwrap_or(0);

    match posts_db_operations::read_latest_posts(&conn, true, Some(PostType::News), limit, offset) {
        Ok(posts) => ctx.insert("posts", &posts),
        Err(e) => {
            log::error!("Failed to read news posts: {}", e);
            ctx.insert("posts", &Vec::<String>::new());
        }
    }

    render(&tera, "public/news_list.html", &ctx)
}

async fn show_news_detail(
    slug: web::Path<String>,
    tera: web::Data<Tera>,
    pool: web::Data<crate::DbPool>,
) -> impl Responder {
    let conn = get_conn!(pool);

    // Drafts are invisible on the public site, indistinguishable from a
    // missing post.
    match posts_db_operations::find_post_by_slug(&conn, &slug) {
        Some(post) if post.published => {
            let mut ctx = base_context(&conn);
            ctx.insert("post", &post);
            render(&tera, "public/news_detail.html", &ctx)
        }
        _ => HttpResponse::NotFound().body("Notícia não encontrada."),
    }
}

async fn show_events(
    tera: web::Data<Tera>,
    pool: web::Data<crate::DbPool>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let conn = get_conn!(pool);
    let mut ctx = base_context(&conn);
    let limit = query.limit.unwrap_or(12).min(50);
    let offset = query.offset.unwrap_or(0);

    match posts_db_operations::read_latest_posts(&conn, true, Some(PostType::Event), limit, offset)
    {
        Ok(events) => ctx.insert("events", &events),
        Err(e) => {
            log::error!("Failed to read event posts: {}", e);
            ctx.insert("events", &Vec::<String>::new());
        }
    }

    render(&tera, "public/events.html", &ctx)
}

async fn show_courses(tera: web::Data<Tera>, pool: web::Data<crate::DbPool>) -> impl Responder {
    let conn = get_conn!(pool);
    let mut ctx = base_context(&conn);

    match content_db_operations::read_courses(&conn, true) {
        Ok(courses) => ctx.insert("courses", &courses),
        Err(e) => {
            log::error!("Failed to read courses: {}", e);
            ctx.insert("courses", &Vec::<String>::new());
        }
    }

    render(&tera, "public/courses.html", &ctx)
}

async fn show_team(tera: web::Data<Tera>, pool: web::Data<crate::DbPool>) -> impl Responder {
    let conn = get_conn!(pool);
    let mut ctx = base_context(&conn);

    match content_db_operations::read_team_members(&conn) {
        Ok(members) => ctx.insert("team", &members),
        Err(e) => {
            log::error!("Failed to read team members: {}", e);
            ctx.insert("team", &Vec::<String>::new());
        }
    }

    render(&tera, "public/team.html", &ctx)
}

async fn show_partners(tera: web::Data<Tera>, pool: web::Data<crate::DbPool>) -> impl Responder {
    let conn = get_conn!(pool);
    let mut ctx = base_context(&conn);

    match content_db_operations::read_partners(&conn) {
        Ok(partners) => ctx.insert("partners", &partners),
        Err(e) => {
            log::error!("Failed to read partners: {}", e);
            ctx.insert("partners", &Vec::<String>::new());
        }
    }

    render(&tera, "public/partners.html", &ctx)
}
