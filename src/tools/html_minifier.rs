use super::{round_to, ToolError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Bodies of these elements are whitespace-sensitive and pass through untouched.
fn raw_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?is)<pre\b[^>]*>.*?</pre\s*>|<textarea\b[^>]*>.*?</textarea\s*>|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>",
        )
        .expect("Invalid regex pattern defined in code")
    })
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid regex pattern defined in code"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern defined in code"))
}

fn inter_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r">\s+<").expect("Invalid regex pattern defined in code"))
}

fn yes() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct MinifyRequest {
    pub html: String,
    #[serde(default = "yes")]
    pub remove_comments: bool,
    #[serde(default = "yes")]
    pub collapse_whitespace: bool,
    #[serde(default = "yes")]
    pub remove_inter_tag_whitespace: bool,
}

#[derive(Debug, Serialize)]
pub struct MinifyResponse {
    pub output: String,
    pub original_bytes: usize,
    pub minified_bytes: usize,
    pub saved_bytes: usize,
    pub saved_percent: f64,
}

fn placeholder(index: usize) -> String {
    format!("\u{0}{}\u{0}", index)
}

/// Callers must reject input containing NUL, which marks preserved blocks.
pub fn minify(req: &MinifyRequest) -> String {
    let mut preserved = Vec::new();
    let mut html = raw_block_regex()
        .replace_all(&req.html, |caps: &regex::Captures| {
            preserved.push(caps[0].to_string());
            placeholder(preserved.len() - 1)
        })
        .into_owned();

    if req.remove_comments {
        html = comment_regex().replace_all(&html, "").into_owned();
    }
    if req.collapse_whitespace {
        html = whitespace_regex().replace_all(&html, " ").into_owned();
    }
    if req.remove_inter_tag_whitespace {
        html = inter_tag_regex().replace_all(&html, "><").into_owned();
    }

    let mut html = html.trim().to_string();
    for (index, block) in preserved.iter().enumerate() {
        html = html.replacen(&placeholder(index), block, 1);
    }
    html
}

pub fn run(req: MinifyRequest) -> Result<MinifyResponse, ToolError> {
    if req.html.trim().is_empty() {
        return Err(ToolError::InvalidInput("no HTML given".to_string()));
    }
    if req.html.contains('\0') {
        return Err(ToolError::InvalidInput("HTML must not contain NUL bytes".to_string()));
    }

    let output = minify(&req);
    let original_bytes = req.html.len();
    let minified_bytes = output.len();
    let saved_bytes = original_bytes.saturating_sub(minified_bytes);

    Ok(MinifyResponse {
        saved_percent: round_to(saved_bytes as f64 / original_bytes as f64 * 100.0, 2),
        output,
        original_bytes,
        minified_bytes,
        saved_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(html: &str) -> MinifyRequest {
        MinifyRequest {
            html: html.to_string(),
            remove_comments: true,
            collapse_whitespace: true,
            remove_inter_tag_whitespace: true,
        }
    }

    #[test]
    fn strips_comments_and_whitespace() {
        let html = "<div>\n  <!-- note -->\n  <p>Hello   world</p>\n</div>\n";
        assert_eq!(minify(&request(html)), "<div><p>Hello world</p></div>");
    }

    #[test]
    fn keeps_preformatted_blocks() {
        let html = "<pre>  a\n    b</pre>\n<script>\nlet x  =  1;\n</script>";
        let out = minify(&request(html));
        assert!(out.contains("<pre>  a\n    b</pre>"));
        assert!(out.contains("<script>\nlet x  =  1;\n</script>"));
    }

    #[test]
    fn options_can_be_turned_off() {
        let mut req = request("<p>a</p>  <!-- c -->  <p>b</p>");
        req.remove_comments = false;
        req.remove_inter_tag_whitespace = false;
        assert_eq!(minify(&req), "<p>a</p> <!-- c --> <p>b</p>");
    }

    #[test]
    fn reports_savings() {
        let out = run(request("<p>   x   </p>")).unwrap();
        assert_eq!(out.output, "<p> x </p>");
        assert_eq!(out.original_bytes, 14);
        assert_eq!(out.minified_bytes, 10);
        assert_eq!(out.saved_bytes, 4);
        assert!((out.saved_percent - 28.57).abs() < 0.01);
    }

    #[test]
    fn nul_bytes_are_rejected() {
        let html = "<p>\u{0}0\u{0}</p><pre> keep </pre>";
        assert!(matches!(run(request(html)), Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(run(request("   ")).is_err());
    }
}
