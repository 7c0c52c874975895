use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::access::{authorize, Action, Caller, Resource};
use crate::actor_framework::ResourceClient;
use crate::domain::{Notification, NotificationCreate, UserId, NOTIFIABLE_USER};
use crate::notification_actor::{NotificationAction, NotificationError};

/// Client for the notification store: in-app messages addressed to accounts.
#[derive(Clone)]
pub struct NotificationClient {
    inner: ResourceClient<Notification>,
}

impl_basic_client!(NotificationClient, Notification, NotificationError, notification);

impl NotificationClient {
    #[instrument(skip(self, params), fields(kind = %params.kind, recipient = params.recipient))]
    pub async fn create_notification(&self, params: NotificationCreate) -> Result<Notification, NotificationError> {
        let notification = self.inner.create(params).await?;
        debug!(id = %notification.id, "Notification stored");
        Ok(notification)
    }

    /// The recipient's notifications, newest first.
    #[instrument(skip(self))]
    pub async fn list_for(
        &self,
        caller: Option<&Caller>,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationError> {
        authorize(caller, Action::ReadNotifications, Resource::OwnedBy(user_id))?;
        let mut notifications: Vec<Notification> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|n| n.notifiable_type == NOTIFIABLE_USER && n.notifiable_id == user_id)
            .filter(|n| !unread_only || !n.is_read())
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    pub async fn unread_count(&self, caller: Option<&Caller>, user_id: UserId) -> Result<usize, NotificationError> {
        Ok(self.list_for(caller, user_id, true).await?.len())
    }

    /// Marks one notification as read. Only its recipient may do so; repeated
    /// calls keep the first read time.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, caller: Option<&Caller>, id: Uuid) -> Result<Notification, NotificationError> {
        let notification = self.require_notification(id).await?;
        authorize(caller, Action::ReadNotifications, Resource::OwnedBy(notification.notifiable_id))?;
        let updated = self.inner.perform_action(id, NotificationAction::MarkRead { at: Utc::now() }).await?;
        Ok(updated)
    }
}
