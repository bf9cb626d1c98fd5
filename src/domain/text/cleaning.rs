use html2text::from_read;
use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z!][^>]*>").expect("valid HTML tag pattern"));
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid URL pattern"));
static UNSPEAKABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\w\s.,!?;:\-'"]"#).expect("valid character whitelist pattern")
});

/// Words longer than this are dropped as noise (hashes, base64, run-together tokens)
pub const DEFAULT_MAX_WORD_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleaningOptions {
    pub max_word_chars: usize,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            max_word_chars: DEFAULT_MAX_WORD_CHARS,
        }
    }
}

/// Clean text before segmentation so the synthesizer only sees speakable content:
/// HTML is converted to plain text, URLs are removed, characters outside letters,
/// digits and basic punctuation become spaces, whitespace is collapsed and
/// overlong words are dropped.
pub fn clean_for_speech(text: &str, options: CleaningOptions) -> String {
    let plain_text = if HTML_TAG.is_match(text) {
        from_read(text.as_bytes(), usize::MAX)
    } else {
        text.to_string()
    };

    let without_urls = URL.replace_all(&plain_text, " ");
    let speakable = UNSPEAKABLE.replace_all(&without_urls, " ");

    speakable
        .split_whitespace()
        .filter(|word| word.chars().count() <= options.max_word_chars)
        .collect::<Vec<_>>()
        .join(" ")
}
