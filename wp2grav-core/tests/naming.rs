use wp2grav_core::naming::{
    grav_group_key, grav_role, grav_username, AUTHENTICATED_GROUP, GROUP_PREFIX,
};

#[test]
fn test_in_range_login_is_kept_verbatim() {
    assert_eq!(
        grav_username("jane", 7),
        "jane",
        "a login already inside the length bounds should pass through unchanged"
    );
    assert_eq!(grav_username("sixteencharslong", 7), "sixteencharslong");
}

#[test]
fn test_login_is_lowercased_and_separators_become_underscores() {
    assert_eq!(grav_username("John Doe", 3), "john_doe");
    assert_eq!(
        grav_username("john.doe's", 3),
        "john_doe_s",
        "dots and apostrophes should map to underscores like spaces do"
    );
}

#[test]
fn test_short_login_is_extended_with_the_user_id() {
    assert_eq!(
        grav_username("ab", 7),
        "ab7_",
        "short logins gain the id and pad with underscores up to four characters"
    );
    assert_eq!(grav_username("a", 12345), "a123");
    assert_eq!(
        grav_username("", 1),
        "1___",
        "an empty login should still produce a four character name"
    );
}

#[test]
fn test_long_login_is_truncated_around_the_user_id() {
    let name = grav_username("abcdefghijklmnopqrst", 42);
    assert_eq!(
        name, "abcdefghijklmn42",
        "long logins keep a prefix and end with the id"
    );
    assert_eq!(name.chars().count(), 16);
}

#[test]
fn test_oversized_id_displaces_the_whole_login() {
    let name = grav_username("abcdefghijklmnopqrst", u64::MAX);
    assert_eq!(
        name, "1844674407370955",
        "an id wider than the limit should itself be cut to sixteen characters"
    );
}

#[test]
fn test_lengths_are_counted_in_characters_not_bytes() {
    assert_eq!(
        grav_username("éàüö", 9),
        "éàüö",
        "a four character multibyte login is already in range"
    );
}

#[test]
fn test_role_names_keep_case_and_lose_spaces() {
    assert_eq!(grav_role("Site Editors"), "Site_Editors");
    assert_eq!(grav_role("editor"), "editor");
}

#[test]
fn test_group_keys_carry_the_wordpress_prefix() {
    assert_eq!(grav_group_key("Site Editors"), "wp_Site_Editors");
    assert_eq!(grav_group_key("administrator"), "wp_administrator");
    assert!(
        AUTHENTICATED_GROUP.starts_with(GROUP_PREFIX),
        "the synthetic group should use the same prefix as exported roles"
    );
}
