use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown post type: '{0}'")]
pub struct ParsePostTypeError(String);

/// Category of a content post. Events carry an optional date and location,
/// everything else is plain editorial content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    News,
    Event,
    Activity,
    Project,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::News => "NEWS",
            PostType::Event => "EVENT",
            PostType::Activity => "ACTIVITY",
            PostType::Project => "PROJECT",
        }
    }
}

impl FromStr for PostType {
    type Err = ParsePostTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NEWS" => Ok(PostType::News),
            "EVENT" => Ok(PostType::Event),
            "ACTIVITY" => Ok(PostType::Activity),
            "PROJECT" => Ok(PostType::Project),
            other => Err(ParsePostTypeError(other.to_string())),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub post_type: PostType,
    pub published: bool,
    pub featured: bool,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// The public detail route for this post. This exact string is also the
    /// join key used to locate the post's carousel mirror.
    pub fn detail_route(&self) -> String {
        format!("/noticias/{}", self.slug)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselSlide {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub action_url: String,
    pub action_text: String,
    pub is_active: bool,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

/// Verbs recorded in the audit trail. The Portuguese labels are part of the
/// stored data format and are displayed verbatim in the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Criou,
    Editou,
    Excluiu,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Criou => "CRIOU",
            AuditAction::Editou => "EDITOU",
            AuditAction::Excluiu => "EXCLUIU",
        }
    }
}

/// One row of the audit trail joined with the actor's username, as shown on
/// the admin dashboard.
#[derive(Debug, Serialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub action: String,
    pub resource: String,
    pub details: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AdminUser {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub duration: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub image: String,
    pub link: Option<String>,
    pub active: bool,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub photo: Option<String>,
    pub birth_date: Option<String>,
    pub class_group: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Singleton configuration record for the public site. Always addressed by
/// the fixed row id 1 and written through an upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub contact_email: String,
    pub phone: String,
    pub address: String,
    pub instagram_url: String,
    pub facebook_url: String,
    pub about_text: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            site_name: "Portal".to_string(),
            contact_email: String::new(),
            phone: String::new(),
            address: String::new(),
            instagram_url: String::new(),
            facebook_url: String::new(),
            about_text: String::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    pub message: String,
    pub r#type: String, // 'success' or 'error'
}

pub mod db_operations;
