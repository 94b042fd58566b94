// Text matching primitives - shared by the duplicate detector and the
// blocked-word filter. Pure functions, no state, no async.

pub mod normalizer;
pub mod similarity;
pub mod word_filter;

pub use normalizer::normalize;
pub use similarity::{edit_distance, similarity};
pub use word_filter::contains_blocked_word;
