pub mod cleaning;

pub use cleaning::{clean_for_speech, CleaningOptions};
