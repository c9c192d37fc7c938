pub mod markdown;
pub mod syntax;
