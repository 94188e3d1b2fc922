use std::collections::BTreeSet;

use crate::models::UserEventProfile;

/// Weight of shared attendance in the user similarity
pub const ATTENDED_WEIGHT: f64 = 0.7;
/// Weight of shared interests in the user similarity
pub const CATEGORY_WEIGHT: f64 = 0.3;

/// Size of the intersection over size of the union; 0 for two empty sets
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Similarity of two users in [0, 1]
///
/// Blends attended-event overlap and interested-category overlap.
pub fn user_similarity(a: &UserEventProfile, b: &UserEventProfile) -> f64 {
    let attended = jaccard(&a.attended_events, &b.attended_events);
    let categories = jaccard(
        &a.preferences.interested_categories,
        &b.preferences.interested_categories,
    );
    ATTENDED_WEIGHT * attended + CATEGORY_WEIGHT * categories
}
