//! Who may talk to the bot.
//!
//! An empty `allow_users` list denies everyone; the default config ships
//! `["*"]`. Entries may include or omit the leading `@`.

/// Returns `true` when the sender may use the bot.
///
/// - `"*"` allows everyone
/// - `"@name"` / `"name"` matches the Telegram username, ignoring ASCII case
///   (Telegram usernames are case-insensitive)
/// - `"123456789"` matches the numeric user id
pub fn is_allowed(allow_users: &[String], username: Option<&str>, user_id: u64) -> bool {
    let id = user_id.to_string();
    allow_users.iter().any(|entry| {
        let entry = entry.trim();
        if entry == "*" || entry == id {
            return true;
        }
        match (entry.strip_prefix('@').unwrap_or(entry), username) {
            ("", _) | (_, None) => false,
            (name, Some(username)) => name.eq_ignore_ascii_case(username),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_list_denies_all() {
        assert!(!is_allowed(&[], Some("alice"), 111));
    }

    #[test]
    fn wildcard_allows_users_without_username() {
        assert!(is_allowed(&list(&["*"]), None, 999));
    }

    #[test]
    fn username_with_or_without_at() {
        assert!(is_allowed(&list(&["@alice"]), Some("alice"), 1));
        assert!(is_allowed(&list(&["alice"]), Some("alice"), 1));
        assert!(!is_allowed(&list(&["alice"]), Some("bob"), 1));
    }

    #[test]
    fn username_match_ignores_case() {
        assert!(is_allowed(&list(&["Alice"]), Some("alice"), 1));
    }

    #[test]
    fn numeric_id_matches() {
        assert!(is_allowed(&list(&["123456789"]), None, 123_456_789));
        assert!(!is_allowed(&list(&["123456789"]), None, 1));
    }

    #[test]
    fn bare_at_sign_matches_nobody() {
        assert!(!is_allowed(&list(&["@"]), Some(""), 1));
        assert!(!is_allowed(&list(&["@"]), None, 1));
    }
}
