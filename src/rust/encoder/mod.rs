mod label_encoder;
mod registry;
mod vocabulary;

pub use label_encoder::LabelEncoder;
pub use registry::LabelEncoderRegistry;
pub use vocabulary::{Vocabulary, VOCABULARY_VERSION};
