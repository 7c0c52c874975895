//! # Notification Dispatcher
//!
//! Tells a client what happened to their order: an in-app notification plus a
//! mail on the queue. Dispatch is best-effort. Every failure is logged and
//! reported as `false`; it never undoes the order change that triggered it.

use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::notification_client::NotificationClient;
use super::user_client::UserClient;
use crate::domain::{
    NotificationCreate, Order, OrderStatus, StatusChangePayload, User, UserId, UserSummary, ORDER_CREATED,
    ORDER_STATUS_CHANGED,
};
use crate::mailer::{InvoiceMail, MailError, MailJob, MailQueue, StatusMail};
use crate::notification_actor::NotificationError;
use crate::user_actor::UserError;

#[derive(Debug, Error)]
enum DispatchError {
    #[error("owner {0} not found")]
    MissingOwner(UserId),
    #[error("owner {0} has no email address")]
    MissingEmail(UserId),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error(transparent)]
    Payload(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    notifications: NotificationClient,
    users: UserClient,
    mail: MailQueue,
}

impl NotificationDispatcher {
    pub fn new(notifications: NotificationClient, users: UserClient, mail: MailQueue) -> Self {
        Self { notifications, users, mail }
    }

    /// Reports a status change to the order's owner.
    #[instrument(skip(self, order), fields(order_number = %order.number))]
    pub async fn notify(&self, order: &Order, old_status: OrderStatus, new_status: OrderStatus) -> bool {
        match self.try_notify(order, old_status, new_status).await {
            Ok(()) => {
                info!(%old_status, %new_status, "Status notification dispatched");
                true
            }
            Err(e) => {
                warn!(error = %e, "Status notification failed");
                false
            }
        }
    }

    /// Confirms a new order to its owner and queues the invoice.
    #[instrument(skip(self, order), fields(order_number = %order.number))]
    pub async fn order_created(&self, order: &Order) -> bool {
        match self.try_order_created(order).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Order confirmation failed");
                false
            }
        }
    }

    async fn owner_with_email(&self, order: &Order) -> Result<User, DispatchError> {
        let owner = self
            .users
            .get_user(order.client_id)
            .await?
            .ok_or(DispatchError::MissingOwner(order.client_id))?;
        if owner.email.trim().is_empty() {
            return Err(DispatchError::MissingEmail(owner.id));
        }
        Ok(owner)
    }

    async fn try_notify(&self, order: &Order, old_status: OrderStatus, new_status: OrderStatus) -> Result<(), DispatchError> {
        let owner = self.owner_with_email(order).await?;

        let payload = StatusChangePayload {
            titre: "Mise à jour de votre commande".to_string(),
            message: format!(
                "Votre commande {} est passée de « {} » à « {} ».",
                order.number,
                old_status.label(),
                new_status.label()
            ),
            order_number: order.number.clone(),
            old_status,
            new_status,
        };
        self.notifications
            .create_notification(NotificationCreate {
                kind: ORDER_STATUS_CHANGED.to_string(),
                recipient: owner.id,
                data: serde_json::to_value(&payload)?,
            })
            .await?;

        self.mail.enqueue(MailJob::StatusChanged(StatusMail {
            order_number: order.number.clone(),
            old_status,
            new_status,
            recipient_email: owner.email,
        }))?;
        Ok(())
    }

    async fn try_order_created(&self, order: &Order) -> Result<(), DispatchError> {
        let owner = self.owner_with_email(order).await?;

        self.notifications
            .create_notification(NotificationCreate {
                kind: ORDER_CREATED.to_string(),
                recipient: owner.id,
                data: json!({
                    "titre": "Commande enregistrée",
                    "message": format!("Votre commande {} a bien été enregistrée.", order.number),
                    "order_number": order.number,
                    "total": order.total,
                }),
            })
            .await?;

        self.mail.enqueue(MailJob::Invoice(InvoiceMail {
            recipient_email: owner.email.clone(),
            order: order.clone(),
            owner: UserSummary::from(&owner),
        }))?;
        Ok(())
    }
}
