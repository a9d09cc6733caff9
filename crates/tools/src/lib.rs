//! Default adapters for the capability traits declared in `persona_core::traits`.
//!
//! Every adapter here is a pragmatic, regex/keyword-driven stand-in for a
//! production collaborator that spec.md §1 treats as out of scope (the
//! moderation/safety classifier, the image-analysis service, the
//! city-geocoding helper). They exist so the pipeline is runnable end to
//! end without those external services wired in; a deployment swaps them
//! out behind the same trait.

pub mod city;
pub mod info_message;
pub mod location;
pub mod meeting;
pub mod moderation;
pub mod style;

pub use city::StaticCityLookup;
pub use info_message::KeywordInfoMessageClassifier;
pub use location::KeywordLocationClassifier;
pub use meeting::KeywordMeetingClassifier;
pub use moderation::{KeywordModeration, NullImageAnalyzer};
pub use style::RegexWritingStyleAnalyzer;
