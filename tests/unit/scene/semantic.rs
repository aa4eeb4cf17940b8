use super::*;

#[test]
fn categories_resolve_from_free_form_tags() {
    assert_eq!(Category::from_tag("tree"), Some(Category::Tree));
    assert_eq!(Category::from_tag("Big Oak"), Some(Category::Tree));
    assert_eq!(Category::from_tag("tree house"), Some(Category::House));
    assert_eq!(Category::from_tag("grass-field"), Some(Category::Ground));
    assert_eq!(Category::from_tag("lamppost"), None);
}

#[test]
fn backdrop_tags_are_detected_by_word() {
    assert!(is_backdrop_tag(Some("sky")));
    assert!(is_backdrop_tag(Some("Green grass")));
    assert!(is_backdrop_tag(Some("ocean")));
    assert!(!is_backdrop_tag(Some("sun")));
    assert!(!is_backdrop_tag(Some("skyscraper")));
    assert!(!is_backdrop_tag(None));
}

#[test]
fn person_and_ground_helpers() {
    assert!(is_person_tag(Some("walking woman")));
    assert!(!is_person_tag(Some("tree")));
    assert!(is_ground_like_tag(Some("meadow")));
    assert!(!is_ground_like_tag(Some("sky")));
}
