//! Conversion of WordPress identifiers into names Grav will accept.
//!
//! Grav constrains account filenames to 4..=16 characters, so logins are
//! normalised deterministically: the same login and user id always produce
//! the same account name. Role keys only need their spaces replaced, since
//! Grav group keys may not contain whitespace.

/// Minimum length Grav accepts for an account username.
const USERNAME_MIN: usize = 4;
/// Maximum length Grav accepts for an account username.
const USERNAME_MAX: usize = 16;

/// Prefix marking groups that were imported from WordPress roles.
pub const GROUP_PREFIX: &str = "wp_";

/// Group every exported account is added to, independent of its roles.
pub const AUTHENTICATED_GROUP: &str = "wp_authenticated_user";

/// Derives the Grav account username (and account filename) for a
/// WordPress login.
///
/// Lowercases the login and replaces spaces, dots and apostrophes with
/// underscores. Logins shorter than the Grav minimum are extended with the
/// user id and padded with underscores; logins longer than the maximum are
/// truncated so the user id still fits at the end, keeping the result
/// unique per user. Lengths are counted in characters, not bytes.
pub fn grav_username(login: &str, user_id: u64) -> String {
    let mut username: String = login
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '.' | '\'' => '_',
            other => other,
        })
        .collect();

    let id = user_id.to_string();
    let length = username.chars().count();
    if length < USERNAME_MIN {
        username.push_str(&id);
        username = username.chars().take(USERNAME_MIN).collect();
        while username.chars().count() < USERNAME_MIN {
            username.push('_');
        }
    } else if length > USERNAME_MAX {
        // Keep as much of the login as the id leaves room for. An id longer
        // than the maximum degenerates to the truncated id itself.
        let keep = USERNAME_MAX.saturating_sub(id.chars().count());
        username = username.chars().take(keep).collect();
        username.push_str(&id);
        username = username.chars().take(USERNAME_MAX).collect();
    }
    username
}

/// Normalises a WordPress role name for use inside Grav, replacing spaces
/// with underscores. Case is preserved.
pub fn grav_role(role: &str) -> String {
    role.replace(' ', "_")
}

/// Derives the Grav group key for a WordPress role key.
pub fn grav_group_key(role: &str) -> String {
    format!("{}{}", GROUP_PREFIX, grav_role(role))
}
