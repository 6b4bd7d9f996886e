use super::{round_to, ToolError};
use serde::{Deserialize, Serialize};

const WORDS_PER_MINUTE: f64 = 200.0;

#[derive(Debug, Deserialize)]
pub struct ReadabilityRequest {
    pub text: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TextStatistics {
    pub characters: usize,
    pub letters: usize,
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
    pub complex_words: usize,
    pub reading_time_minutes: f64,
}

#[derive(Debug, Serialize)]
pub struct ReadabilityResponse {
    pub statistics: TextStatistics,
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub gunning_fog: f64,
    pub smog_index: f64,
    pub coleman_liau: f64,
    pub automated_readability: f64,
    pub reading_level: &'static str,
}

/// Vowel-group heuristic with the usual silent-suffix adjustments.
pub fn count_syllables(word: &str) -> usize {
    let word: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();

    if word.is_empty() {
        return 0;
    }
    if word.len() <= 3 {
        return 1;
    }

    let trimmed = if word.ends_with("es") || word.ends_with("ed") {
        &word[..word.len() - 2]
    } else if word.ends_with('e') && !word.ends_with("le") {
        &word[..word.len() - 1]
    } else {
        &word[..]
    };
    let trimmed = trimmed.strip_prefix('y').unwrap_or(trimmed);

    let mut groups = 0;
    let mut previous_vowel = false;
    for c in trimmed.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }
    groups.max(1)
}

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect()
}

fn count_sentences(text: &str) -> usize {
    text.split(|c| matches!(c, '.' | '!' | '?'))
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
        .max(1)
}

pub fn statistics(text: &str) -> TextStatistics {
    let words = words(text);
    let syllables_per_word: Vec<usize> = words.iter().map(|w| count_syllables(w)).collect();

    TextStatistics {
        characters: text.chars().count(),
        letters: text.chars().filter(|c| c.is_alphanumeric()).count(),
        words: words.len(),
        sentences: count_sentences(text),
        syllables: syllables_per_word.iter().sum(),
        complex_words: syllables_per_word.iter().filter(|&&s| s >= 3).count(),
        reading_time_minutes: round_to(words.len() as f64 / WORDS_PER_MINUTE, 1),
    }
}

pub fn reading_level(flesch: f64) -> &'static str {
    match flesch {
        f if f >= 90.0 => "Very easy",
        f if f >= 80.0 => "Easy",
        f if f >= 70.0 => "Fairly easy",
        f if f >= 60.0 => "Standard",
        f if f >= 50.0 => "Fairly difficult",
        f if f >= 30.0 => "Difficult",
        _ => "Very confusing",
    }
}

pub fn run(req: ReadabilityRequest) -> Result<ReadabilityResponse, ToolError> {
    let stats = statistics(&req.text);
    if stats.words == 0 {
        return Err(ToolError::InvalidInput("text contains no words".to_string()));
    }

    let words = stats.words as f64;
    let sentences = stats.sentences as f64;
    let words_per_sentence = words / sentences;
    let syllables_per_word = stats.syllables as f64 / words;
    let complex = stats.complex_words as f64;

    let flesch = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    let kincaid = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;
    let fog = 0.4 * (words_per_sentence + 100.0 * complex / words);
    let smog = 1.0430 * (complex * 30.0 / sentences).sqrt() + 3.1291;
    let letters_per_100 = stats.letters as f64 / words * 100.0;
    let sentences_per_100 = sentences / words * 100.0;
    let coleman_liau = 0.0588 * letters_per_100 - 0.296 * sentences_per_100 - 15.8;
    let ari = 4.71 * (stats.letters as f64 / words) + 0.5 * words_per_sentence - 21.43;

    Ok(ReadabilityResponse {
        reading_level: reading_level(flesch),
        flesch_reading_ease: round_to(flesch, 2),
        flesch_kincaid_grade: round_to(kincaid, 2),
        gunning_fog: round_to(fog, 2),
        smog_index: round_to(smog, 2),
        coleman_liau: round_to(coleman_liau, 2),
        automated_readability: round_to(ari, 2),
        statistics: stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syllable_heuristic() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("makes"), 1);
        assert_eq!(count_syllables("played"), 1);
        assert_eq!(count_syllables("beautiful"), 3);
        assert_eq!(count_syllables("readability"), 5);
        assert_eq!(count_syllables("Hello,"), 2);
        assert_eq!(count_syllables("123"), 0);
    }

    #[test]
    fn counts_words_and_sentences() {
        let stats = statistics("The cat sat. The dog ran! Did it? ");
        assert_eq!(stats.words, 8);
        assert_eq!(stats.sentences, 3);
        assert_eq!(stats.syllables, 8);
        assert_eq!(stats.complex_words, 0);
    }

    #[test]
    fn simple_text_is_very_easy() {
        let out = run(ReadabilityRequest {
            text: "The cat sat on the mat.".to_string(),
        })
        .unwrap();
        assert!(out.flesch_reading_ease > 100.0);
        assert_eq!(out.reading_level, "Very easy");
        assert!(out.flesch_kincaid_grade < 1.0);
    }

    #[test]
    fn dense_text_scores_lower_than_simple_text() {
        let simple = run(ReadabilityRequest {
            text: "I like dogs. Dogs like me.".to_string(),
        })
        .unwrap();
        let dense = run(ReadabilityRequest {
            text: "Comprehensive institutional accountability necessitates considerable \
                   organizational transparency and methodological consistency."
                .to_string(),
        })
        .unwrap();
        assert!(dense.flesch_reading_ease < simple.flesch_reading_ease);
        assert!(dense.gunning_fog > simple.gunning_fog);
        assert!(dense.statistics.complex_words >= 6);
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = run(ReadabilityRequest {
            text: "  ... !!".to_string(),
        });
        assert!(matches!(err, Err(ToolError::InvalidInput(_))));
    }
}
