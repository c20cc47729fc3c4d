pub mod audit_helpers;
pub mod cache_helpers;
pub mod form_helpers;
pub mod publishing_helpers;
pub mod sanitization_helpers;
pub mod slug_helpers;
pub mod upload_helpers;
