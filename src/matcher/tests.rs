use super::*;

#[test]
fn test_literal_detection() {
    assert!(is_literal("/users"));
    assert!(is_literal(""));
    assert!(is_literal(r"edit\*"));
    assert!(!is_literal("edit_*"));
    assert!(!is_literal("/**"));
}

#[test]
fn test_single_star_stops_at_slash() {
    let p = WildcardPattern::compile("/*").unwrap();
    assert_eq!(p.captures("/users").unwrap().as_slice(), ["/users", "users"]);
    assert!(p.captures("/users/admin").is_none());
}

#[test]
fn test_double_star_crosses_slash() {
    let p = WildcardPattern::compile("/api/**").unwrap();
    let caps = p.captures("/api/v1/users").unwrap();
    assert_eq!(caps[1], "v1/users");
}

#[test]
fn test_multiple_wildcards_are_leftmost_shortest() {
    let p = WildcardPattern::compile("*_*").unwrap();
    let caps = p.captures("a_b_c").unwrap();
    assert_eq!(caps[1], "a");
    assert_eq!(caps[2], "b_c");
}

#[test]
fn test_regex_metacharacters_are_literal() {
    let p = WildcardPattern::compile("item.(*)").unwrap();
    assert_eq!(p.captures("item.(42)").unwrap()[1], "42");
    assert!(p.captures("itemX(42)").is_none());
}

#[test]
fn test_escaped_star_is_literal() {
    let p = WildcardPattern::compile(r"a\**").unwrap();
    assert_eq!(p.wildcard_count(), 1);
    assert_eq!(p.captures("a*bc").unwrap()[1], "bc");
}

#[test]
fn test_first_declared_pattern_wins() {
    let mut b = PatternMatcherBuilder::new(false);
    b.add("/*", 1).unwrap();
    b.add("/u*", 2).unwrap();
    let m = b.build();
    let found = m.find("/users").unwrap();
    assert_eq!(*found.target, 1);
    assert_eq!(found.pattern, "/*");
}

#[test]
fn test_literals_are_skipped() {
    let mut b = PatternMatcherBuilder::new(false);
    assert!(!b.add("/users", 1).unwrap());
    let m = b.build();
    assert!(m.is_empty());
    assert!(m.find("/users").is_none());
}

#[test]
fn test_loose_variant_matches_bare_prefix() {
    let mut b = PatternMatcherBuilder::new(true);
    b.add("edit_*", "edit").unwrap();
    let m = b.build();
    assert_eq!(m.len(), 2);

    let full = m.find("edit_profile").unwrap();
    assert_eq!(full.variables(), ["profile"]);

    let bare = m.find("edit").unwrap();
    assert_eq!(bare.pattern, "edit_*");
    assert_eq!(bare.variables(), [""]);
}

#[test]
fn test_loose_disabled_for_double_star_and_short_patterns() {
    let mut b = PatternMatcherBuilder::new(true);
    b.add("a**", 0).unwrap();
    b.add("x*", 1).unwrap();
    assert_eq!(b.build().len(), 2);
}

#[test]
fn test_substitute_placeholders() {
    let caps = ["edit_profile".to_string(), "profile".to_string()];
    assert_eq!(substitute("Profile{1}Action", &caps), "ProfileprofileAction");
    assert_eq!(substitute("{0}", &caps), "edit_profile");
    assert_eq!(substitute("{7}-{x}-{", &caps), "{7}-{x}-{");
    assert_eq!(substitute("plain", &caps), "plain");
}
