/// Five one-word sentences; with a budget of 6 every sentence is its own chunk
pub const FIVE_SENTENCES: &str = "One. Two. Three. Four. Five.";

pub const FIVE_SENTENCE_CHUNKS: [&str; 5] = ["One.", "Two.", "Three.", "Four.", "Five."];

pub const GREETING: &str = "Hello world. This is a test. Bye.";

/// A few paragraphs of prose, long enough to need many chunks
pub fn long_document() -> String {
    let paragraph = "The river wound through the valley, slow and brown after the rains. \
        Fishermen waited on the banks!  Did anyone notice the heron? \
        It stood motionless among the reeds, watching the water.\n\n";
    paragraph.repeat(12)
}

/// Text with multi-byte characters and no sentence terminators
pub fn unicode_run_on() -> String {
    "naïve café résumé façade über straße ".repeat(20)
}

pub const HTML_ARTICLE: &str = r#"
<html>
  <body>
    <h1>Chapter One</h1>
    <p>It was a bright cold day in April. Read more at https://example.com/chapter-1 today.</p>
    <p>The clocks were striking thirteen!</p>
  </body>
</html>
"#;
