pub mod classifier;
pub mod extractor;

pub use classifier::MagicClassifier;
pub use extractor::MetadataExtractor;
