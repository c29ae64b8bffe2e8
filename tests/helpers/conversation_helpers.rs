#![allow(dead_code)]
use chrono::{DateTime, Duration, TimeZone, Utc};
use deskrules::domain::entities::{Conversation, MessageAuthor, MessageRef};

/// Fixed evaluation instant shared by tests
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Conversation created `age_hours` before `test_now()` with no activity since
pub fn create_test_conversation(id: &str, age_hours: i64) -> Conversation {
    Conversation::new(id, test_now() - Duration::hours(age_hours))
}

/// Conversation closed `hours_ago` before `test_now()`
pub fn create_closed_conversation(id: &str, hours_ago: i64) -> Conversation {
    let mut conversation = create_test_conversation(id, hours_ago + 24);
    conversation.status = deskrules::ConversationStatus::Closed;
    conversation.closed_at = Some(test_now() - Duration::hours(hours_ago));
    conversation.updated_at = test_now() - Duration::hours(hours_ago);
    conversation
}

/// Attach a latest message written `hours_ago` before `test_now()`
pub fn with_reply(
    mut conversation: Conversation,
    author: MessageAuthor,
    hours_ago: i64,
) -> Conversation {
    let created_at = test_now() - Duration::hours(hours_ago);
    conversation.latest_message = Some(MessageRef {
        id: format!("msg-{}", conversation.id),
        body: "Is there any update on this?".to_string(),
        author,
        created_at,
    });
    conversation.updated_at = created_at;
    conversation
}
