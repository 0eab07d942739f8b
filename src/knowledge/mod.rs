//! Gardening knowledge: the plant manual dataset and the two ways it is
//! searched (fuzzy name matching, then BM25 keyword ranking).

pub mod fuzzy;
pub mod keyword;
pub mod manual;

pub use fuzzy::{closest_match, similarity_ratio};
pub use keyword::KeywordIndex;
pub use manual::{GardeningManual, Lookup, ManualError, PlantEntry};
