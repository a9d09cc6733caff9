pub mod language;
pub mod safety;

pub use language::{check_language, LanguageGateResult};
pub use safety::check_safety;
