pub mod media;
pub mod tokens;
