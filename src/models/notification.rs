use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UserRole;

/// Who a notification is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Recipient {
    User(i64),
    Role(UserRole),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
    pub event: Option<String>,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient: Recipient, title: &str, message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            title: title.to_string(),
            message: message.to_string(),
            event: None,
            link: None,
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_event(mut self, event: &str, link: Option<String>) -> Self {
        self.event = Some(event.to_string());
        self.link = link;
        self
    }

    /// Whether this notification should be visible to the given user.
    pub fn addressed_to(&self, user_id: i64, role: UserRole) -> bool {
        match &self.recipient {
            Recipient::User(id) => *id == user_id,
            Recipient::Role(r) => *r == role,
        }
    }
}
