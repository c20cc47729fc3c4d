use bcrypt::{hash, DEFAULT_COST};
use clap::{Parser, Subcommand};
use portal_backend::config::Config;
use portal_backend::setup::db_setup;
use rusqlite::{params, Connection};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial application setup.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    Setup,
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    List,
    ChangePassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        new_password: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config =
        Config::from_env(&cli.env_file).expect("FATAL: Failed to load or parse configuration.");

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup => setup_database(&config),
        },
        Commands::Admin { action } => match action {
            AdminAction::Create { username, password } => {
                create_admin_user(&config, username, password);
            }
            AdminAction::List => {
                list_admin_users(&config);
            }
            AdminAction::ChangePassword {
                username,
                new_password,
            } => {
                change_admin_password(&config, username, new_password);
            }
        },
    }
}

fn setup_database(config: &Config) {
    let db_path = config.db_path();
    println!("Setting up database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let mut conn = Connection::open(&db_path).expect("Could not create database file.");
    match db_setup::create_schema(&mut conn) {
        Ok(_) => println!("Database setup completed successfully."),
        Err(e) => eprintln!("Error setting up database: {}", e),
    }
}

fn open_database(config: &Config) -> Option<Connection> {
    let db_path = config.db_path();
    if !db_path.exists() {
        eprintln!(
            "Error: Database not found at '{}'. Please run `setup_cli db setup` first.",
            db_path.display()
        );
        return None;
    }
    match Connection::open(&db_path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error opening database: {}", e);
            None
        }
    }
}

fn create_admin_user(config: &Config, username: &str, password: &str) {
    let conn = match open_database(config) {
        Some(c) => c,
        None => return,
    };
    let hashed_password = hash(password, DEFAULT_COST).expect("Failed to hash password");

    match conn.execute(
        "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, 'admin')",
        params![username, hashed_password],
    ) {
        Ok(_) => println!("Admin user '{}' created successfully.", username),
        Err(e) => eprintln!(
            "Error creating admin user: {}. The username might already exist.",
            e
        ),
    }
}

fn list_admin_users(config: &Config) {
    let conn = match open_database(config) {
        Some(c) => c,
        None => return,
    };
    let mut stmt =
        match conn.prepare("SELECT username FROM users WHERE role = 'admin' ORDER BY username") {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error preparing database query: {}", e);
                return;
            }
        };
    let user_iter = stmt.query_map([], |row| row.get::<_, String>(0));

    println!("Listing Admin Users:");
    match user_iter {
        Ok(users) => {
            for user in users {
                println!("- {}", user.unwrap_or_else(|_| "Invalid username".to_string()));
            }
        }
        Err(e) => eprintln!("Error fetching admins: {}", e),
    }
}

fn change_admin_password(config: &Config, username: &str, new_password: &str) {
    let conn = match open_database(config) {
        Some(c) => c,
        None => return,
    };
    let hashed_password = hash(new_password, DEFAULT_COST).expect("Failed to hash new password");
    match conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE username = ?2 AND role = 'admin'",
        params![hashed_password, username],
    ) {
        Ok(0) => eprintln!("Error: No admin user named '{}' found.", username),
        Ok(_) => println!("Password for admin user '{}' changed successfully.", username),
        Err(e) => eprintln!("Error updating password: {}", e),
    }
}
