use chrono::Utc;
use std::fs;
use std::path::Path;

/// Known upload categories, each mapping to a directory under the uploads
/// root. Anything else is stored under "general".
pub const UPLOAD_CATEGORIES: &[&str] = &[
    "banners", "birthdays", "board", "courses", "events", "news", "partners", "projects",
    "students", "team", "settings", "general",
];

/// Restricts a client-supplied filename to `[A-Za-z0-9._-]`. Path separators
/// and anything else exotic collapse to underscores, so the result can be
/// joined onto the category directory safely.
pub fn sanitize_filename(original: &str) -> String {
    let cleaned: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "arquivo".to_string()
    } else {
        cleaned
    }
}

/// Writes an uploaded file under `{uploads_root}/{category}/` and returns its
/// public path (`/uploads/{category}/{timestamp}-{name}`).
///
/// Absent input (empty byte slice) returns an empty string without touching
/// the filesystem, and so does any I/O failure (logged). Callers must treat
/// an empty string as "no new image" and keep whatever path they already
/// had; assigning it blindly would erase a valid image on a transient write
/// failure.
pub fn store(bytes: &[u8], original_filename: &str, category: &str, uploads_root: &Path) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    let category = if UPLOAD_CATEGORIES.contains(&category) {
        category
    } else {
        "general"
    };

    let dir = uploads_root.join(category);
    // mkdir is idempotent; concurrent uploads to the same category are fine.
    if let Err(e) = fs::create_dir_all(&dir) {
        log::error!("Failed to create upload directory '{}': {}", dir.display(), e);
        return String::new();
    }

    let name = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(original_filename)
    );
    match fs::write(dir.join(&name), bytes) {
        Ok(()) => format!("/uploads/{}/{}", category, name),
        Err(e) => {
            log::error!("Failed to write upload '{}/{}': {}", category, name, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_root() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("portal-uploads-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn empty_file_is_a_no_op() {
        let root = temp_root();
        assert_eq!(store(&[], "foto.jpg", "news", &root), "");
        assert!(!root.join("news").exists());
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn stores_bytes_and_returns_public_path() {
        let root = temp_root();
        let bytes = vec![7u8; 5 * 1024];
        let path = store(&bytes, "equipe foto.jpg", "team", &root);
        assert!(path.starts_with("/uploads/team/"));
        let name = path.rsplit('/').next().unwrap();
        let (ts, rest) = name.split_once('-').unwrap();
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest, "equipe_foto.jpg");

        let on_disk = fs::read(root.join("team").join(name)).unwrap();
        assert_eq!(on_disk, bytes);
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn unknown_category_falls_back_to_general() {
        let root = temp_root();
        let path = store(b"x", "a.png", "../evil", &root);
        assert!(path.starts_with("/uploads/general/"));
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn sanitizes_hostile_filenames() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("relatório final.pdf"), "relat_rio_final.pdf");
        assert_eq!(sanitize_filename("..."), "arquivo");
    }
}
