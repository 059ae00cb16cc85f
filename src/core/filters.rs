use std::collections::HashSet;

use crate::models::{BrowseFilters, CreatorProfile, MemberProfile, Orientation};

/// Whether a creator's gender fits the member's orientation
///
/// straight -> opposite gender, gay/lesbian -> same gender, bi/pan -> anyone.
#[inline]
pub fn orientation_compatible(member: &MemberProfile, creator: &CreatorProfile) -> bool {
    let same_gender = member.gender.trim().eq_ignore_ascii_case(creator.gender.trim());

    match member.orientation {
        Orientation::Straight => !same_gender,
        Orientation::Gay | Orientation::Lesbian => same_gender,
        Orientation::Bisexual | Orientation::Pansexual => true,
    }
}

/// Check a creator against the member's hard filters
#[inline]
pub fn matches_filters(creator: &CreatorProfile, filters: &BrowseFilters) -> bool {
    // Check orientation filter
    if !filters.orientations.is_empty() && !filters.orientations.contains(&creator.orientation) {
        return false;
    }

    // Check age range; an unknown age never satisfies an explicit bound
    if filters.min_age.is_some() || filters.max_age.is_some() {
        let Some(age) = creator.age else {
            return false;
        };
        if filters.min_age.map_or(false, |min| age < min) || filters.max_age.map_or(false, |max| age > max) {
            return false;
        }
    }

    // Check body type
    if !contains_ignore_case(&filters.body_types, creator.body_type.as_deref()) {
        return false;
    }

    // Check ethnicity
    if !contains_ignore_case(&filters.ethnicities, creator.ethnicity.as_deref()) {
        return false;
    }

    true
}

/// An empty allow-list accepts everything
fn contains_ignore_case(allowed: &[String], value: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match value {
        Some(value) => allowed.iter().any(|a| a.eq_ignore_ascii_case(value)),
        None => false,
    }
}

/// Full eligibility check used to build the candidate set
#[inline]
pub fn is_eligible(
    creator: &CreatorProfile,
    member: &MemberProfile,
    filters: &BrowseFilters,
    exclude_ids: &HashSet<String>,
) -> bool {
    // Skip creators that are inactive or hidden from browsing
    if !creator.is_active || !creator.is_browsable {
        return false;
    }

    if exclude_ids.contains(&creator.creator_id) {
        return false;
    }

    orientation_compatible(member, creator) && matches_filters(creator, filters)
}

/// Interests present on both profiles, compared case-insensitively
pub fn shared_interests(member: &MemberProfile, creator: &CreatorProfile) -> Vec<String> {
    let wanted: HashSet<String> = member.interests.iter().map(|i| i.to_lowercase()).collect();
    let mut seen = HashSet::new();

    creator
        .interests
        .iter()
        .filter(|interest| {
            let key = interest.to_lowercase();
            wanted.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_creator(gender: &str, age: Option<u8>) -> CreatorProfile {
        CreatorProfile {
            creator_id: "creator_1".to_string(),
            display_name: "Creator".to_string(),
            gender: gender.to_string(),
            orientation: Orientation::Straight,
            age,
            body_type: Some("athletic".to_string()),
            ethnicity: Some("latina".to_string()),
            interests: vec!["Fitness".to_string(), "travel".to_string()],
            is_active: true,
            is_browsable: true,
            is_verified: Some(true),
            auto_connect_enabled: false,
            last_active: None,
            last_content_at: None,
        }
    }

    fn create_test_member(gender: &str, orientation: Orientation) -> MemberProfile {
        MemberProfile {
            member_id: "member_1".to_string(),
            gender: gender.to_string(),
            orientation,
            age: Some(30),
            interests: vec!["fitness".to_string(), "cooking".to_string()],
        }
    }

    #[test]
    fn test_orientation_rule() {
        let woman = create_test_creator("female", Some(25));
        let man = create_test_creator("male", Some(25));

        let straight = create_test_member("male", Orientation::Straight);
        assert!(orientation_compatible(&straight, &woman));
        assert!(!orientation_compatible(&straight, &man));

        let gay = create_test_member("male", Orientation::Gay);
        assert!(orientation_compatible(&gay, &man));
        assert!(!orientation_compatible(&gay, &woman));

        let lesbian = create_test_member("Female", Orientation::Lesbian);
        assert!(orientation_compatible(&lesbian, &woman));

        let bi = create_test_member("male", Orientation::Bisexual);
        assert!(orientation_compatible(&bi, &woman));
        assert!(orientation_compatible(&bi, &man));
    }

    #[test]
    fn test_age_filter() {
        let filters = BrowseFilters {
            min_age: Some(21),
            max_age: Some(30),
            ..Default::default()
        };

        assert!(matches_filters(&create_test_creator("female", Some(25)), &filters));
        assert!(!matches_filters(&create_test_creator("female", Some(35)), &filters));
        assert!(!matches_filters(&create_test_creator("female", None), &filters));
    }

    #[test]
    fn test_body_type_and_ethnicity_filters() {
        let creator = create_test_creator("female", Some(25));

        let filters = BrowseFilters {
            body_types: vec!["Athletic".to_string()],
            ethnicities: vec!["latina".to_string()],
            ..Default::default()
        };
        assert!(matches_filters(&creator, &filters));

        let filters = BrowseFilters {
            body_types: vec!["curvy".to_string()],
            ..Default::default()
        };
        assert!(!matches_filters(&creator, &filters));
    }

    #[test]
    fn test_excluded_and_inactive_creators_filtered() {
        let member = create_test_member("male", Orientation::Straight);
        let filters = BrowseFilters::default();
        let mut creator = create_test_creator("female", Some(25));

        let mut exclude = HashSet::new();
        assert!(is_eligible(&creator, &member, &filters, &exclude));

        exclude.insert("creator_1".to_string());
        assert!(!is_eligible(&creator, &member, &filters, &exclude));

        creator.is_browsable = false;
        assert!(!is_eligible(&creator, &member, &filters, &HashSet::new()));
    }

    #[test]
    fn test_shared_interests_case_insensitive() {
        let member = create_test_member("male", Orientation::Straight);
        let creator = create_test_creator("female", Some(25));

        assert_eq!(shared_interests(&member, &creator), vec!["Fitness"]);
    }
}
