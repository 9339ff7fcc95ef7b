use crate::models::Profile;

/// Number of interest tokens declared by both profiles. The candidate with
/// the strictly highest overlap wins the queue scan.
#[inline]
pub fn interest_overlap(a: &Profile, b: &Profile) -> usize {
    a.interests.iter().filter(|i| b.interests.contains(*i)).count()
}

/// The interest intersection itself, for the pairing announcement.
pub fn shared_interests(a: &Profile, b: &Profile) -> Vec<String> {
    a.interests
        .iter()
        .filter(|i| b.interests.contains(*i))
        .cloned()
        .collect()
}
