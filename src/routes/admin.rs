use crate::config::Config;
use crate::helper::{audit_helpers, cache_helpers::CacheNotifier, form_helpers};
use crate::middleware::AuthenticatedAdmin;
use crate::models::db_operations::{
    posts_db_operations, settings_db_operations, users_db_operations,
};
use crate::models::{AuditAction, Notification, SiteSettings};
use crate::routes::content_admin;
use actix_csrf::extractor::{Csrf, CsrfGuarded, CsrfToken};
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tera::{Context, Tera};

#[derive(Deserialize)]
struct LoginForm {
    csrf_token: CsrfToken,
    username: String,
    password: String,
}

impl CsrfGuarded for LoginForm {
    fn csrf_token(&self) -> &CsrfToken {
        &self.csrf_token
    }
}

pub fn config_login(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(show_admin_login_form))
        .route("/login", web::post().to(handle_admin_login))
        .route("/logout", web::post().to(handle_admin_logout));
}

pub fn config_dashboard(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(show_admin_dashboard))
        .route("/create_user", web::post().to(create_user_action))
        .route("/update_user", web::post().to(update_user_action))
        .route("/delete_user", web::post().to(delete_user_action))
        .route("/update_settings", web::post().to(update_settings_action))
        .configure(content_admin::config_content_admin);
}

pub(crate) fn set_notification(session: &Session, message: &str, r#type: &str) {
    let _ = session.insert(
        "notification",
        &Notification {
            message: message.to_string(),
            r#type: r#type.to_string(),
        },
    );
}

pub(crate) fn dashboard_url(config: &Config) -> String {
    format!("/management/{}/dashboard", config.admin_url_prefix)
}

async fn show_admin_login_form(
    session: Session,
    tera: web::Data<Tera>,
    token: CsrfToken,
    config: web::Data<Config>,
) -> impl Responder {
    let admin_url_prefix = &config.admin_url_prefix;
    if session.get::<String>("role").unwrap_or(None) == Some("admin".to_string()) {
        return HttpResponse::Found()
            .append_header(("location", dashboard_url(&config)))
            .finish();
    }

    let mut ctx = Context::new();
    ctx.insert("admin_url_prefix", admin_url_prefix);
    ctx.insert("csrf_token", token.get());

    if let Ok(Some(error)) = session.get::<String>("error") {
        ctx.insert("error", &error);
        session.remove("error");
    }

    match tera.render("admin/login.html", &ctx) {
        Ok(rendered) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => {
            log::error!("Template rendering error for login page: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

async fn handle_admin_login(
    session: Session,
    pool: web::Data<crate::DbPool>,
    form: Csrf<web::Form<LoginForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let login_url = format!("/management/{}/login", config.admin_url_prefix);
    let login_data = form.into_inner();

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Database pool error during login: {}", e);
            return HttpResponse::InternalServerError().body("Erro de banco de dados.");
        }
    };

    if let Some((username, role)) =
        users_db_operations::verify_credentials(&conn, &login_data.username, &login_data.password)
    {
        if role == "admin" {
            if let Err(e) = users_db_operations::update_last_login_time(&conn, &username) {
                log::error!("Failed to record last login for '{}': {}", username, e);
            }
            let _ = session.insert("username", username);
            let _ = session.insert("role", role);
            session.remove("error");
            return HttpResponse::Found()
                .append_header(("location", dashboard_url(&config)))
                .finish();
        }
        let _ = session.insert("error", "Acesso restrito a administradores.");
    } else {
        let _ = session.insert("error", "Credenciais inválidas ou conta suspensa.");
    }
    HttpResponse::Found()
        .append_header(("location", login_url))
        .finish()
}

async fn handle_admin_logout(session: Session, config: web::Data<Config>) -> impl Responder {
    let login_url = format!("/management/{}/login", config.admin_url_prefix);
    session.clear();
    HttpResponse::Found()
        .append_header(("location", login_url))
        .finish()
}

async fn show_admin_dashboard(
    auth_user: AuthenticatedAdmin,
    session: Session,
    tera: web::Data<Tera>,
    pool: web::Data<crate::DbPool>,
    token: CsrfToken,
    config: web::Data<Config>,
) -> impl Responder {
    let mut ctx = Context::new();
    ctx.insert("admin_url_prefix", &config.admin_url_prefix);
    ctx.insert("user", &auth_user);
    ctx.insert("csrf_token", token.get());

    if let Ok(Some(notification)) = session.get::<Notification>("notification") {
        ctx.insert("notification", &notification);
        session.remove("notification");
    }

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Database pool error on dashboard: {}", e);
            return HttpResponse::InternalServerError().body("Erro de banco de dados.");
        }
    };

    ctx.insert("post_count", &posts_db_operations::count_posts(&conn));
    ctx.insert("settings", &settings_db_operations::read_settings(&conn));
    ctx.insert("audit_entries", &audit_helpers::recent(&conn, 50));

    match users_db_operations::read_all_users(&conn) {
        Ok(users) => ctx.insert("users", &users),
        Err(e) => {
            log::error!("Failed to fetch users for dashboard: {}", e);
            ctx.insert("users", &Vec::<String>::new());
        }
    }

    match tera.render("admin/dashboard.html", &ctx) {
        Ok(rendered) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => {
            log::error!("Template rendering error for dashboard: {}", e);
            HttpResponse::InternalServerError().body("Error rendering admin dashboard.")
        }
    }
}

async fn update_settings_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    notifier: web::Data<CacheNotifier>,
    form: web::Bytes,
    config: web::Data<Config>,
) -> impl Responder {
    let dashboard_url = dashboard_url(&config);

    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let site_name = parsed.get("site_name").map_or("", |s| s.trim());
    if site_name.is_empty() {
        set_notification(&session, "O nome do site é obrigatório.", "error");
        return HttpResponse::Found()
            .append_header(("location", dashboard_url))
            .finish();
    }

    let field = |name: &str| parsed.get(name).map_or(String::new(), |s| s.trim().to_string());
    let settings = SiteSettings {
        site_name: site_name.to_string(),
        contact_email: field("contact_email"),
        phone: field("phone"),
        address: field("address"),
        instagram_url: field("instagram_url"),
        facebook_url: field("facebook_url"),
        about_text: field("about_text"),
    };

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Database pool error on settings update: {}", e);
            set_notification(&session, "Erro de conexão com o banco de dados.", "error");
            return HttpResponse::Found()
                .append_header(("location", dashboard_url))
                .finish();
        }
    };

    match settings_db_operations::upsert_settings(&conn, &settings) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Editou,
                "SiteSettings",
                &settings.site_name,
            );
            // Settings feed the header and footer of every page.
            notifier.declare_stale(&["/".to_string(), "/noticias".to_string()]);
            set_notification(&session, "Configurações atualizadas com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to update site settings: {}", e);
            set_notification(&session, "Falha ao salvar as configurações.", "error");
        }
    }
    HttpResponse::Found()
        .append_header(("location", dashboard_url))
        .finish()
}

async fn create_user_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    form: web::Bytes,
    config: web::Data<Config>,
) -> impl Responder {
    let dashboard_url = dashboard_url(&config);

    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let username = parsed.get("username").map_or("", |s| s.trim());
    let password = parsed.get("password").map_or("", |s| s.as_str());
    let role = parsed.get("role").map_or("", |s| s.as_str());

    if username.is_empty() || password.is_empty() || role != "admin" {
        set_notification(&session, "Dados inválidos. Todos os campos são obrigatórios.", "error");
        return HttpResponse::Found()
            .append_header(("location", dashboard_url))
            .finish();
    }

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Database pool error on user creation: {}", e);
            set_notification(&session, "Erro de conexão com o banco de dados.", "error");
            return HttpResponse::Found()
                .append_header(("location", dashboard_url))
                .finish();
        }
    };

    match users_db_operations::create_user(&conn, username, password, role) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Criou,
                "Usuario",
                username,
            );
            set_notification(
                &session,
                &format!("Usuário '{}' criado com sucesso.", username),
                "success",
            );
        }
        Err(e) => {
            log::error!("Failed to create user '{}': {}", username, e);
            set_notification(&session, "Nome de usuário já existe.", "error");
        }
    }
    HttpResponse::Found()
        .append_header(("location", dashboard_url))
        .finish()
}

async fn update_user_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    form: web::Bytes,
    config: web::Data<Config>,
) -> impl Responder {
    let dashboard_url = dashboard_url(&config);

    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let user_id = parsed
        .get("user_id")
        .and_then(|id| id.parse::<i32>().ok())
        .unwrap_or(0);
    let username = parsed.get("username").map_or("", |s| s.trim());
    let password = parsed.get("password").map(|s| s.as_str());
    let is_active = parsed.contains_key("is_active");

    if user_id == 0 || username.is_empty() {
        set_notification(&session, "Dados de usuário inválidos.", "error");
        return HttpResponse::Found()
            .append_header(("location", dashboard_url))
            .finish();
    }

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Database pool error on user update: {}", e);
            set_notification(&session, "Erro de conexão com o banco de dados.", "error");
            return HttpResponse::Found()
                .append_header(("location", dashboard_url))
                .finish();
        }
    };

    match users_db_operations::update_user(&conn, user_id, username, password, is_active) {
        Ok(()) => {
            audit_helpers::record(
                &conn,
                Some(&auth_user.username),
                AuditAction::Editou,
                "Usuario",
                username,
            );
            set_notification(
                &session,
                &format!("Usuário '{}' atualizado com sucesso.", username),
                "success",
            );
        }
        Err(e) => {
            log::error!("Failed to update user_id {}: {}", user_id, e);
            set_notification(
                &session,
                "Falha ao atualizar o usuário. O nome pode já estar em uso.",
                "error",
            );
        }
    }
    HttpResponse::Found()
        .append_header(("location", dashboard_url))
        .finish()
}

async fn delete_user_action(
    session: Session,
    auth_user: AuthenticatedAdmin,
    pool: web::Data<crate::DbPool>,
    form: web::Bytes,
    config: web::Data<Config>,
) -> impl Responder {
    let dashboard_url = dashboard_url(&config);
    let login_url = format!("/management/{}/login", config.admin_url_prefix);

    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let user_id_to_delete = parsed
        .get("user_id")
        .and_then(|id| id.parse::<i32>().ok())
        .unwrap_or(0);

    if user_id_to_delete == 0 {
        set_notification(&session, "ID de usuário inválido.", "error");
        return HttpResponse::Found()
            .append_header(("location", dashboard_url))
            .finish();
    }

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Database pool error on user delete: {}", e);
            set_notification(&session, "Erro de conexão com o banco de dados.", "error");
            return HttpResponse::Found()
                .append_header(("location", dashboard_url))
                .finish();
        }
    };

    let current_admin_id =
        match users_db_operations::read_user_by_username(&conn, &auth_user.username) {
            Some(admin) => admin.id,
            None => {
                // The session names a user that no longer exists. Force a
                // logout rather than acting on a dangling identity.
                session.purge();
                return HttpResponse::Found()
                    .append_header(("location", login_url))
                    .finish();
            }
        };

    // Audit before the row disappears so the entry still resolves the actor.
    audit_helpers::record(
        &conn,
        Some(&auth_user.username),
        AuditAction::Excluiu,
        "Usuario",
        &user_id_to_delete.to_string(),
    );

    match users_db_operations::delete_user(&conn, user_id_to_delete) {
        Ok(0) => set_notification(&session, "Usuário não encontrado.", "error"),
        Ok(_) => {
            if current_admin_id == user_id_to_delete {
                session.purge();
                return HttpResponse::Found()
                    .append_header(("location", login_url))
                    .finish();
            }
            set_notification(&session, "Usuário excluído com sucesso.", "success");
        }
        Err(e) => {
            log::error!("Failed to delete user_id {}: {}", user_id_to_delete, e);
            set_notification(&session, "Falha ao excluir o usuário.", "error");
        }
    }
    HttpResponse::Found()
        .append_header(("location", dashboard_url))
        .finish()
}
