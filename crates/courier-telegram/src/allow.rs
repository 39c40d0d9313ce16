//! Chat allow-list for multi-tenant deployments.
//!
//! Gating is opt-in: an empty `allow_chats` list means every chat may use the
//! bot. A non-empty list restricts processing to the listed chat IDs.

/// Returns `true` when the given chat is permitted to use the bot.
pub fn is_allowed(allow_chats: &[i64], chat_id: i64) -> bool {
    allow_chats.is_empty() || allow_chats.contains(&chat_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_allows_all() {
        assert!(is_allowed(&[], 42));
        assert!(is_allowed(&[], -100_123_456_789));
    }

    #[test]
    fn listed_chat_is_allowed() {
        let list = vec![-100_123_456_789, 42];
        assert!(is_allowed(&list, 42));
        assert!(is_allowed(&list, -100_123_456_789));
    }

    #[test]
    fn unlisted_chat_is_rejected() {
        let list = vec![42];
        assert!(!is_allowed(&list, 43));
    }
}
