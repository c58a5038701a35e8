use std::collections::HashSet;

use grant_common::types::Grant;

/// Within-batch dedup: group by `duplicate_hash`, retain the first
/// occurrence of each (spec §4.6). Order among surviving grants is
/// otherwise preserved.
pub fn dedup_within_batch(grants: Vec<Grant>) -> (Vec<Grant>, usize) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(grants.len());
    let mut dropped = 0;
    for grant in grants {
        if seen.insert(grant.duplicate_hash.clone()) {
            kept.push(grant);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}
