//! # Mail Queue
//!
//! Outgoing mail is fire-and-forget: callers push a [`MailJob`] onto a bounded
//! queue and a background [`MailWorker`] hands each job to a [`Mailer`]. The
//! transport itself lives outside this crate; [`LogMailer`] only records the
//! send in the logs.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::domain::{Order, OrderStatus, UserSummary};

/// Status-change mail sent to the owner of an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusMail {
    pub order_number: String,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub recipient_email: String,
}

/// Everything the invoice renderer needs: the loaded order and its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceMail {
    pub recipient_email: String,
    pub order: Order,
    pub owner: UserSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MailJob {
    StatusChanged(StatusMail),
    Invoice(InvoiceMail),
}

impl MailJob {
    pub fn recipient(&self) -> &str {
        match self {
            MailJob::StatusChanged(mail) => &mail.recipient_email,
            MailJob::Invoice(mail) => &mail.recipient_email,
        }
    }

    pub fn order_number(&self) -> &str {
        match self {
            MailJob::StatusChanged(mail) => &mail.order_number,
            MailJob::Invoice(mail) => &mail.order.number,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),
    #[error("Mail queue is full")]
    QueueFull,
    #[error("Mail queue is closed")]
    QueueClosed,
}

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, job: &MailJob) -> Result<(), MailError>;
}

/// Mailer that only logs what would have been sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, job: &MailJob) -> Result<(), MailError> {
        match job {
            MailJob::StatusChanged(mail) => info!(
                to = %mail.recipient_email,
                order_number = %mail.order_number,
                old_status = %mail.old_status,
                new_status = %mail.new_status,
                "Status mail sent"
            ),
            MailJob::Invoice(mail) => info!(
                to = %mail.recipient_email,
                order_number = %mail.order.number,
                total = %mail.order.total,
                "Invoice mail sent"
            ),
        }
        Ok(())
    }
}

/// Producer side of the mail queue.
#[derive(Clone)]
pub struct MailQueue {
    sender: mpsc::Sender<MailJob>,
}

impl MailQueue {
    pub fn new(capacity: usize, mailer: Arc<dyn Mailer>) -> (Self, MailWorker) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, MailWorker { receiver, mailer })
    }

    /// Queues a job without waiting for room.
    pub fn enqueue(&self, job: MailJob) -> Result<(), MailError> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MailError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => MailError::QueueClosed,
        })
    }
}

/// Consumer side of the mail queue. Runs until every [`MailQueue`] is dropped.
pub struct MailWorker {
    receiver: mpsc::Receiver<MailJob>,
    mailer: Arc<dyn Mailer>,
}

impl MailWorker {
    pub async fn run(mut self) {
        info!("Mail worker starting");
        let mut sent = 0usize;
        while let Some(job) = self.receiver.recv().await {
            match self.mailer.send(&job).await {
                Ok(()) => {
                    sent += 1;
                    debug!(to = %job.recipient(), order_number = %job.order_number(), "Mail delivered");
                }
                Err(e) => error!(
                    error = %e,
                    to = %job.recipient(),
                    order_number = %job.order_number(),
                    "Mail send failed, dropping job"
                ),
            }
        }
        info!(sent, "Mail worker stopped");
    }
}
