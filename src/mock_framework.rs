//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then script the
//! actor's replies with [`expect_create`], [`expect_get`], [`expect_list`] or
//! [`expect_action`]. Mailer doubles live here too.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use crate::mailer::{MailError, MailJob, Mailer};

type Reply<R, T> = oneshot::Sender<Result<R, FrameworkError<<T as Entity>::Error>>>;

/// Creates a mock client and a receiver for asserting requests.
///
/// Requests sent through the client land on `receiver` instead of a running
/// actor, so a test decides exactly what each call returns.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Reply<T, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Reply<Option<T>, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_list<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<Reply<Vec<T>, T>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Reply<T::ActionResult, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Mailer that keeps every job it was handed.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailJob>>,
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<MailJob> {
        self.sent.lock().await.clone()
    }

    /// Polls until at least `count` jobs arrived or a second has passed.
    pub async fn wait_for(&self, count: usize) -> Vec<MailJob> {
        for _ in 0..100 {
            let sent = self.sent().await;
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.sent().await
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, job: &MailJob) -> Result<(), MailError> {
        self.sent.lock().await.push(job.clone());
        Ok(())
    }
}

/// Mailer whose transport is always down.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _job: &MailJob) -> Result<(), MailError> {
        Err(MailError::Transport("smtp unreachable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, User, UserCreate};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            client.create(UserCreate::new("Test", "User", "test@example.com", Role::Client)).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.email, "test@example.com");
        let user = User {
            id: 1,
            last_name: payload.last_name,
            first_name: payload.first_name,
            email: payload.email,
            role: payload.role,
            phone: None,
        };
        responder.send(Ok(user.clone())).unwrap();

        let result = create_task.await.unwrap().unwrap();
        assert_eq!(result, user);
    }

    #[tokio::test]
    async fn list_replies_are_scripted() {
        let (client, mut receiver) = create_mock_client::<User>(10);
        let task = tokio::spawn(async move { client.list().await });

        let responder = expect_list(&mut receiver).await.expect("Expected List request");
        responder.send(Ok(Vec::new())).unwrap();
        assert!(task.await.unwrap().unwrap().is_empty());
    }
}
