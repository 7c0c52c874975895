use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::NotificationError;
use crate::actor_framework::Entity;
use crate::domain::{Notification, NotificationCreate, NOTIFIABLE_USER};

#[derive(Debug, Clone)]
pub enum NotificationAction {
    /// Stamps the read time. A notification that is already read keeps its first stamp.
    MarkRead { at: DateTime<Utc> },
}

impl Entity for Notification {
    type Id = Uuid;
    type CreateParams = NotificationCreate;
    type UpdateParams = ();
    type Action = NotificationAction;
    type ActionResult = Notification;
    type Error = NotificationError;

    const KIND: &'static str = "notification";

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn from_create_params(id: Uuid, params: NotificationCreate) -> Result<Self, NotificationError> {
        if params.kind.is_empty() {
            return Err(NotificationError::ValidationError("notification type is required".into()));
        }
        Ok(Self {
            id,
            kind: params.kind,
            notifiable_type: NOTIFIABLE_USER.to_string(),
            notifiable_id: params.recipient,
            data: params.data,
            read_at: None,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _params: ()) -> Result<(), NotificationError> {
        Ok(())
    }

    fn handle_action(&mut self, action: NotificationAction) -> Result<Notification, NotificationError> {
        match action {
            NotificationAction::MarkRead { at } => {
                self.read_at.get_or_insert(at);
                Ok(self.clone())
            }
        }
    }
}
