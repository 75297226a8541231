//! Name and track matching heuristics.
//!
//! This is the rule-based core used when caching artist images and when
//! reconciling listening-history rows pulled from heterogeneous source APIs:
//! artist-credit splitting, edit-distance name matching, and lenient
//! multi-format field extraction.

pub mod artist_name;
pub mod similarity;
pub mod track_fields;

pub use artist_name::split_artist_credit;
pub use similarity::{best_match, names_match, similarity_percent, NAME_MATCH_THRESHOLD};
pub use track_fields::PlayedTrack;
