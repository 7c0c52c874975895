use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use super::config::{AppConfig, ConfigError};
use crate::actor_framework::ResourceActor;
use crate::clients::{NotificationClient, NotificationDispatcher, OrderClient, ProductClient, UserClient};
use crate::domain::{Notification, Order, Product, User};
use crate::error::AppError;
use crate::mailer::{LogMailer, MailQueue, Mailer};
use crate::order_actor::OrderNumberGenerator;

fn sequence() -> impl Fn() -> u64 + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || counter.fetch_add(1, Ordering::SeqCst)
}

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub user_client: UserClient,
    pub product_client: ProductClient,
    pub notification_client: NotificationClient,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts every actor with the default log-only mailer.
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        Self::with_mailer(config, Arc::new(LogMailer))
    }

    pub fn with_mailer(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Result<Self, ConfigError> {
        let numbers = OrderNumberGenerator::new(config.orders.number_prefix.clone());
        Self::build(config, mailer, numbers)
    }

    /// Starts every actor. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Rejects a config that fails [`AppConfig::validate`] before spawning anything.
    pub fn build(
        config: &AppConfig,
        mailer: Arc<dyn Mailer>,
        numbers: OrderNumberGenerator,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let buffer = config.actors.buffer_size;

        let (user_actor, users) = ResourceActor::<User>::new(buffer, sequence());
        let (product_actor, products) = ResourceActor::<Product>::new(buffer, sequence());
        let (order_actor, orders) = ResourceActor::<Order>::new(buffer, sequence());
        let (notification_actor, notifications) = ResourceActor::<Notification>::new(buffer, Uuid::new_v4);
        let (mail_queue, mail_worker) = MailQueue::new(config.notifications.mail_queue_size, mailer);

        let handles = vec![
            tokio::spawn(user_actor.run()),
            tokio::spawn(product_actor.run()),
            tokio::spawn(order_actor.run()),
            tokio::spawn(notification_actor.run()),
            tokio::spawn(mail_worker.run()),
        ];

        let user_client = UserClient::new(users);
        let product_client = ProductClient::new(products);
        let notification_client = NotificationClient::new(notifications);
        let dispatcher = NotificationDispatcher::new(notification_client.clone(), user_client.clone(), mail_queue);
        let order_client = OrderClient::new(
            orders,
            user_client.clone(),
            product_client.clone(),
            dispatcher,
            numbers,
            config.orders.number_retry_attempts,
        );

        info!(buffer, mail_queue = config.notifications.mail_queue_size, "Order system started");
        Ok(Self {
            order_client,
            user_client,
            product_client,
            notification_client,
            handles,
        })
    }

    /// Drops the clients so every mailbox closes, then waits for the actors and
    /// the mail worker to drain. Clones handed out earlier must already be gone.
    pub async fn shutdown(self) -> Result<(), AppError> {
        info!("Shutting down system...");
        drop(self.order_client);
        drop(self.user_client);
        drop(self.product_client);
        drop(self.notification_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e.into());
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
