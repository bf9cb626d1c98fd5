pub mod assembly;
pub mod pipeline;
pub mod segment;
pub mod synthesis;
pub mod text;
