use crate::models::db_operations::posts_db_operations;
use chrono::Utc;
use rusqlite::Connection;

fn fold_accent(c: char) -> Option<char> {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => Some('a'),
        'é' | 'è' | 'ê' | 'ë' => Some('e'),
        'í' | 'ì' | 'î' | 'ï' => Some('i'),
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => Some('o'),
        'ú' | 'ù' | 'û' | 'ü' => Some('u'),
        'ç' => Some('c'),
        'ñ' => Some('n'),
        _ => None,
    }
}

/// Derives a URL-safe slug from a title: lowercase, accents folded to their
/// ASCII base letter, every other non-alphanumeric run collapsed to a single
/// hyphen, no leading or trailing hyphen. Applying it to its own output is a
/// no-op.
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.to_lowercase().chars() {
        let c = fold_accent(c).unwrap_or(c);
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Slug assignment at post creation. Collisions with an existing post are
/// resolved by suffixing the current millisecond timestamp; the slug never
/// changes afterwards.
pub fn unique_slug(conn: &Connection, title: &str) -> String {
    let mut slug = derive_slug(title);
    if slug.is_empty() {
        slug = format!("post-{}", Utc::now().timestamp_millis());
    }
    if posts_db_operations::slug_exists(conn, &slug) {
        slug = format!("{}-{}", slug, Utc::now().timestamp_millis());
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(derive_slug("Formatura 2026"), "formatura-2026");
        assert_eq!(derive_slug("Uma   Grande Festa!"), "uma-grande-festa");
    }

    #[test]
    fn folds_accents() {
        assert_eq!(derive_slug("Ação Comunitária"), "acao-comunitaria");
        assert_eq!(derive_slug("São João"), "sao-joao");
    }

    #[test]
    fn no_leading_or_trailing_hyphen() {
        assert_eq!(derive_slug("  ...Olá Mundo!!!  "), "ola-mundo");
        assert_eq!(derive_slug("---"), "");
    }

    #[test]
    fn only_allowed_characters() {
        let slug = derive_slug("Título c/ Vários Símbolos & Emojis 🎉 #2026");
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn is_idempotent() {
        for title in ["Formatura 2026", "Ação & Reação", "a--b--c", "çãé"] {
            let once = derive_slug(title);
            assert_eq!(derive_slug(&once), once);
        }
    }
}
