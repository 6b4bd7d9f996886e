use super::ToolError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    Upper,
    Lower,
    Title,
    Sentence,
    Camel,
    Pascal,
    Snake,
    Kebab,
    Constant,
}

#[derive(Debug, Deserialize)]
pub struct CaseRequest {
    pub text: String,
    #[serde(rename = "case")]
    pub target: TextCase,
}

#[derive(Debug, Serialize)]
pub struct CaseResponse {
    pub output: String,
    pub words: usize,
}

/// Splits on separators and on case changes, keeping acronyms together:
/// `parseHTTPResponse` gives `parse`, `HTTP`, `Response`.
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();

    for chunk in text.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn join_lower(words: &[String], sep: &str) -> String {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn convert(text: &str, target: TextCase) -> String {
    let words = split_words(text);

    match target {
        TextCase::Upper => text.to_uppercase(),
        TextCase::Lower => text.to_lowercase(),
        TextCase::Title => words.iter().map(|w| capitalize(w)).collect::<Vec<_>>().join(" "),
        TextCase::Sentence => capitalize(&join_lower(&words, " ")),
        TextCase::Camel => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
            .collect(),
        TextCase::Pascal => words.iter().map(|w| capitalize(w)).collect(),
        TextCase::Snake => join_lower(&words, "_"),
        TextCase::Kebab => join_lower(&words, "-"),
        TextCase::Constant => join_lower(&words, "_").to_uppercase(),
    }
}

pub fn run(req: CaseRequest) -> Result<CaseResponse, ToolError> {
    if req.text.trim().is_empty() {
        return Err(ToolError::InvalidInput("text must not be empty".to_string()));
    }

    Ok(CaseResponse {
        words: split_words(&req.text).len(),
        output: convert(&req.text, req.target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_and_acronyms() {
        assert_eq!(split_words("parseHTTPResponse"), vec!["parse", "HTTP", "Response"]);
        assert_eq!(split_words("user_id-v2 name"), vec!["user", "id", "v2", "name"]);
        assert_eq!(split_words("  "), Vec::<String>::new());
    }

    #[test]
    fn converts_between_programming_cases() {
        assert_eq!(convert("parseHTTPResponse", TextCase::Snake), "parse_http_response");
        assert_eq!(convert("hello world", TextCase::Camel), "helloWorld");
        assert_eq!(convert("hello world", TextCase::Pascal), "HelloWorld");
        assert_eq!(convert("HelloWorld", TextCase::Kebab), "hello-world");
        assert_eq!(convert("max retry count", TextCase::Constant), "MAX_RETRY_COUNT");
    }

    #[test]
    fn converts_prose_cases() {
        assert_eq!(convert("the QUICK brown fox", TextCase::Title), "The Quick Brown Fox");
        assert_eq!(convert("the QUICK brown fox", TextCase::Sentence), "The quick brown fox");
        assert_eq!(convert("Mixed Case!", TextCase::Upper), "MIXED CASE!");
        assert_eq!(convert("Mixed Case!", TextCase::Lower), "mixed case!");
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = run(CaseRequest {
            text: "   ".to_string(),
            target: TextCase::Snake,
        });
        assert!(matches!(err, Err(ToolError::InvalidInput(_))));
    }
}
