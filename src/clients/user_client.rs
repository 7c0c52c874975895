use tracing::{info, instrument};

use crate::access::{authorize, Action, Caller, Resource};
use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate, UserId, UserSummary};
use crate::user_actor::UserError;

/// Client for interacting with the User actor.
///
/// Registration and credentials are handled elsewhere; this client seeds
/// accounts and answers the identity lookups the order core needs.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_basic_client!(UserClient, User, UserError, user);

impl UserClient {
    #[instrument(skip(self, params), fields(email = %params.email, role = ?params.role))]
    pub async fn create_user(&self, params: UserCreate) -> Result<User, UserError> {
        let user = self.inner.create(params).await?;
        info!(user_id = user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, caller: Option<&Caller>) -> Result<Vec<User>, UserError> {
        authorize(caller, Action::ListUsers, Resource::Any)?;
        let mut users = self.inner.list().await?;
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, caller: Option<&Caller>, id: UserId) -> Result<(), UserError> {
        authorize(caller, Action::DeleteUser, Resource::Any)?;
        self.inner.delete(id).await?;
        info!("User deleted");
        Ok(())
    }

    /// Staff accounts that orders can be assigned to, sorted by last name.
    #[instrument(skip(self))]
    pub async fn list_employees(&self, caller: Option<&Caller>) -> Result<Vec<UserSummary>, UserError> {
        authorize(caller, Action::ListEmployees, Resource::Any)?;
        let mut staff: Vec<User> = self.inner.list().await?.into_iter().filter(|u| u.role.is_staff()).collect();
        staff.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        Ok(staff.iter().map(UserSummary::from).collect())
    }

    /// Identity block for embedding in order views; `None` when the account is gone.
    pub async fn summary(&self, id: UserId) -> Result<Option<UserSummary>, UserError> {
        Ok(self.get_user(id).await?.as_ref().map(UserSummary::from))
    }
}
