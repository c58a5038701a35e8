mod change;
mod match_score;
mod merge;
mod within_batch;

pub use change::classify_change;
pub use match_score::{find_matches, score, MatchScore};
pub use merge::merge_grants;
pub use within_batch::dedup_within_batch;
