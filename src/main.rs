use actix_csrf::CsrfMiddleware;
use actix_session::{storage::CookieSessionStore, SessionExt, SessionMiddleware};
use actix_web::{
    cookie::Key,
    middleware::{DefaultHeaders, Logger},
    web, App, HttpServer,
};
use actix_cors::Cors;
use clap::Parser;
use portal_backend::{
    config::Config,
    helper::cache_helpers::CacheNotifier,
    middleware::{admin_guard, ip_guard},
    routes,
};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rand::prelude::StdRng;
use std::convert::TryFrom;
use std::fs;
use std::path::PathBuf;
use tera::Tera;

#[derive(Parser, Debug)]
#[command(name = "portal_server", author, version, about = "Starts the portal web server.")]
struct Cli {
    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config =
        Config::from_env(&cli.env_file).expect("FATAL: Failed to load or parse configuration.");

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    let tera = Tera::new("templates/**/*.html").expect("Tera initialization failed");

    fs::create_dir_all(&config.database_path).expect("Failed to create database directory");
    fs::create_dir_all(config.uploads_root()).expect("Failed to create uploads directory");

    let manager = SqliteConnectionManager::file(config.db_path());
    let pool = Pool::builder()
        .build(manager)
        .expect("FATAL: Failed to create Rusqlite connection pool.");

    {
        // Fail fast if the schema was never created.
        let conn = pool.get().expect("Failed to get DB connection for startup check.");
        conn.query_row("SELECT COUNT(*) FROM site_settings", [], |row| {
            row.get::<_, i64>(0)
        })
        .expect(
            "FATAL: portal.db is not initialized. \
             Run 'cargo run --bin setup_cli -- --env-file <path> db setup'",
        );
    }

    let notifier = web::Data::new(CacheNotifier::new());

    let session_key_bytes = hex::decode(&config.session_secret_key)
        .expect("FATAL: SESSION_SECRET_KEY in .env is not a valid hex string.");
    let session_key = Key::try_from(session_key_bytes.as_slice()).expect(
        "FATAL: The decoded SESSION_SECRET_KEY is not long enough (minimum 64 bytes required).",
    );

    let server_address = format!("{}:{}", config.web.host, config.web.port);
    println!("Server starting at http://{}", server_address);

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                .cookie_secure(config.use_secure_cookies)
                .cookie_http_only(true)
                .cookie_same_site(actix_web::cookie::SameSite::Lax)
                .build();

        let cors = {
            let allowed_origins_str = &config.allowed_origins;
            if allowed_origins_str.trim() == "*" {
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .supports_credentials()
                    .max_age(3600)
            } else {
                let mut cors = Cors::default();
                let origins: Vec<&str> = allowed_origins_str
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .collect();
                for origin in origins {
                    cors = cors.allowed_origin(origin);
                }
                cors.allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .supports_credentials()
                    .max_age(3600)
            }
        };

        let admin_url_prefix_clone = config.admin_url_prefix.clone();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block")),
            )
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(notifier.clone())
            .service(actix_files::Files::new("/uploads", config.uploads_root()))
            .configure(routes::public::config_public)
            .service(
                web::scope("/management").service(
                    web::scope(&admin_url_prefix_clone)
                        .wrap(session_mw)
                        .wrap(
                            CsrfMiddleware::<StdRng>::new()
                                .set_cookie(
                                    actix_web::http::Method::GET,
                                    format!("/management/{}/login", admin_url_prefix_clone),
                                )
                                .set_cookie(
                                    actix_web::http::Method::GET,
                                    format!("/management/{}/dashboard", admin_url_prefix_clone),
                                ),
                        )
                        .guard(actix_web::guard::fn_guard(ip_guard))
                        .configure(routes::admin::config_login)
                        .service(
                            web::scope("")
                                .guard(actix_web::guard::fn_guard(|ctx| {
                                    admin_guard(&ctx.get_session())
                                }))
                                .configure(routes::admin::config_dashboard),
                        ),
                ),
            )
    })
    .bind(server_address)?
    .run()
    .await
}
