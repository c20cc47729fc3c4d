use regex::Regex;
use std::collections::HashSet;

/// Neutralizes HTML in post body text while leaving fenced code blocks
/// (```) untouched. Entities are decoded before re-encoding so content that
/// was already escaped once does not get double-escaped on edit.
pub fn sanitize_post_content(input: &str) -> String {
    let mut code_blocks: Vec<String> = Vec::new();
    let code_block_regex = Regex::new(r"(?s)```[\s\S]*?```").unwrap();

    let with_placeholders = code_block_regex.replace_all(input, |caps: &regex::Captures| {
        code_blocks.push(caps[0].to_string());
        format!("__CODE_BLOCK_PLACEHOLDER_{}__", code_blocks.len() - 1)
    });

    let decoded = html_escape::decode_html_entities(&with_placeholders);
    let escaped = html_escape::encode_text(&decoded).to_string();

    let mut output = escaped;
    for (i, block) in code_blocks.iter().enumerate() {
        let placeholder = format!("__CODE_BLOCK_PLACEHOLDER_{}__", i);
        output = output.replacen(&placeholder, block, 1);
    }
    output
}

/// Removes every HTML tag, keeping only text. Used for titles, summaries and
/// other single-line fields where markup is never legitimate.
pub fn strip_all_html(input: &str) -> String {
    ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_outside_code_blocks() {
        let out = sanitize_post_content("Olá <script>alert(1)</script>");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn preserves_fenced_code_blocks() {
        let input = "Veja:\n```\n<b>literal</b>\n```\n<i>fora</i>";
        let out = sanitize_post_content(input);
        assert!(out.contains("<b>literal</b>"));
        assert!(!out.contains("<i>fora</i>"));
    }

    #[test]
    fn does_not_double_escape_on_reedit() {
        let once = sanitize_post_content("a < b");
        let twice = sanitize_post_content(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn strip_all_html_leaves_plain_text() {
        assert_eq!(strip_all_html("<b>Formatura</b> 2026"), "Formatura 2026");
    }
}
