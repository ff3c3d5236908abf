//! File-backed notification store.
//!
//! Notifications are low volume and survive restarts through a single JSON
//! file. All load/modify/persist cycles run behind one async mutex, making
//! this a single-writer queue; handlers never touch the file directly.

use std::path::PathBuf;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Notification, Recipient, UserRole},
};

pub struct NotificationService {
    file_path: PathBuf,
    lock: Mutex<()>,
}

impl NotificationService {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            lock: Mutex::new(()),
        }
    }

    pub async fn publish(&self, notification: Notification) -> Result<(), ApiError> {
        let _guard = self.lock.lock().await;
        let mut all = self.load().await?;
        tracing::debug!(
            notification_id = %notification.id,
            recipient = ?notification.recipient,
            "notification published"
        );
        all.push(notification);
        self.persist(&all).await
    }

    /// Convenience wrapper for per-user notifications.
    pub async fn notify_user(
        &self,
        user_id: i64,
        title: &str,
        message: &str,
        event: &str,
        link: Option<String>,
    ) -> Result<(), ApiError> {
        self.publish(
            Notification::new(Recipient::User(user_id), title, message).with_event(event, link),
        )
        .await
    }

    /// Notifications visible to the user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        role: UserRole,
    ) -> Result<Vec<Notification>, ApiError> {
        let _guard = self.lock.lock().await;
        let mut visible: Vec<Notification> = self
            .load()
            .await?
            .into_iter()
            .filter(|n| n.addressed_to(user_id, role))
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visible)
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_read(
        &self,
        notification_id: &Uuid,
        user_id: i64,
        role: UserRole,
    ) -> Result<(), ApiError> {
        let _guard = self.lock.lock().await;
        let mut all = self.load().await?;
        let target = all
            .iter_mut()
            .find(|n| n.id == *notification_id && n.addressed_to(user_id, role))
            .ok_or_else(|| {
                ApiError::not_found(format!("Notification {notification_id} not found"))
            })?;
        target.read = true;
        self.persist(&all).await
    }

    async fn load(&self) -> Result<Vec<Notification>, ApiError> {
        match tokio::fs::read(&self.file_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn persist(&self, all: &[Notification]) -> Result<(), ApiError> {
        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(all)?;
        tokio::fs::write(&self.file_path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_publish_and_list() {
        let dir = tempdir().unwrap();
        let service = NotificationService::new(dir.path().join("notifications.json"));

        service
            .notify_user(1, "Inspection rejected", "INS_1000 was rejected", "status", None)
            .await
            .unwrap();
        service
            .publish(Notification::new(
                Recipient::Role(UserRole::Admin),
                "New user",
                "A user was created",
            ))
            .await
            .unwrap();

        let for_inspector = service.list_for_user(1, UserRole::Inspector).await.unwrap();
        assert_eq!(for_inspector.len(), 1);
        assert_eq!(for_inspector[0].title, "Inspection rejected");

        let for_admin = service.list_for_user(99, UserRole::Admin).await.unwrap();
        assert_eq!(for_admin.len(), 1);
        assert_eq!(for_admin[0].title, "New user");

        let for_other = service.list_for_user(2, UserRole::Inspector).await.unwrap();
        assert!(for_other.is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_scoped_to_recipient() {
        let dir = tempdir().unwrap();
        let service = NotificationService::new(dir.path().join("notifications.json"));

        let notification = Notification::new(Recipient::User(1), "Hello", "Message");
        let id = notification.id;
        service.publish(notification).await.unwrap();

        // Another user cannot mark it
        assert!(service.mark_read(&id, 2, UserRole::Inspector).await.is_err());

        service.mark_read(&id, 1, UserRole::Inspector).await.unwrap();
        let listed = service.list_for_user(1, UserRole::Inspector).await.unwrap();
        assert!(listed[0].read);
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let service = NotificationService::new(dir.path().join("notifications.json"));
        let listed = service.list_for_user(1, UserRole::Inspector).await.unwrap();
        assert!(listed.is_empty());
    }
}
