pub mod admin;
pub mod content_admin;
pub mod public;
