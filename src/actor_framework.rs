//! # Resource Actor Framework
//!
//! Every stateful store in the system (users, products, orders, notifications)
//! is a [`ResourceActor`]: a tokio task that exclusively owns a `HashMap` of
//! entities and serves requests arriving on a bounded `mpsc` channel, replying
//! over `oneshot` channels. Callers talk to it through a cloneable
//! [`ResourceClient`].
//!
//! Because the actor handles one message at a time, any read-modify-write that
//! happens inside a single message (an update, an action) is atomic with respect
//! to every other request on the same store. Updates and actions run against a
//! clone of the entity that is only committed when the hook returns `Ok`, so a
//! failed hook never leaves a half-applied change behind.

use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any domain entity must implement to be managed by [`ResourceActor`].
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;
    type CreateParams: Send + Debug + 'static;
    type UpdateParams: Send + Debug + 'static;
    type Action: Send + Debug + 'static;
    type ActionResult: Send + Debug + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Name used in logs and not-found errors.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    /// Construct the full entity from the generated id and the creation params.
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    /// Secondary key that must be unique across the store (e.g. an order number).
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, params: Self::UpdateParams) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a custom domain-specific action.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Failures produced by the actor plumbing itself, wrapping the entity's own error.
#[derive(Debug, Error)]
pub enum FrameworkError<E> {
    #[error("actor mailbox is closed")]
    ActorClosed,
    #[error("actor dropped the response channel")]
    ActorDropped,
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} already exists: {key}")]
    Conflict { kind: &'static str, key: String },
    #[error("{0}")]
    Entity(E),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        params: T::UpdateParams,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    unique_keys: HashSet<String>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            unique_keys: HashSet::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Serve requests until every client has been dropped.
    pub async fn run(mut self) {
        info!(kind = T::KIND, "Actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update { id, params, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, params));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
            }
        }
        info!(kind = T::KIND, entities = self.store.len(), "Actor stopped");
    }

    #[instrument(skip(self, params), fields(kind = T::KIND))]
    fn handle_create(&mut self, params: T::CreateParams) -> Result<T, FrameworkError<T::Error>> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;

        let key = item.unique_key();
        if let Some(key) = &key {
            if self.unique_keys.contains(key) {
                warn!(key = %key, "Unique key already taken");
                return Err(FrameworkError::Conflict { kind: T::KIND, key: key.clone() });
            }
        }
        if let Some(key) = key {
            self.unique_keys.insert(key);
        }

        debug!(id = %id, "Entity created");
        self.store.insert(id, item.clone());
        Ok(item)
    }

    #[instrument(skip(self, params), fields(kind = T::KIND))]
    fn handle_update(&mut self, id: T::Id, params: T::UpdateParams) -> Result<T, FrameworkError<T::Error>> {
        let item = self.store.get_mut(&id).ok_or_else(|| not_found::<T>(&id))?;
        let mut candidate = item.clone();
        candidate.on_update(params).map_err(FrameworkError::Entity)?;
        *item = candidate.clone();
        Ok(candidate)
    }

    #[instrument(skip(self), fields(kind = T::KIND))]
    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        let item = self.store.get(&id).ok_or_else(|| not_found::<T>(&id))?;
        item.on_delete().map_err(FrameworkError::Entity)?;
        if let Some(key) = item.unique_key() {
            self.unique_keys.remove(&key);
        }
        self.store.remove(&id);
        debug!("Entity deleted");
        Ok(())
    }

    #[instrument(skip(self, action), fields(kind = T::KIND))]
    fn handle_action(
        &mut self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        let item = self.store.get_mut(&id).ok_or_else(|| not_found::<T>(&id))?;
        let mut candidate = item.clone();
        let result = candidate.handle_action(action).map_err(FrameworkError::Entity)?;
        *item = candidate;
        Ok(result)
    }
}

fn not_found<T: Entity>(id: &T::Id) -> FrameworkError<T::Error> {
    FrameworkError::NotFound { kind: T::KIND, id: id.to_string() }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: T::Id, params: T::UpdateParams) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Update { id, params, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}
