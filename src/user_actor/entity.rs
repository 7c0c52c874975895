use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate, UserId};

use super::error::UserError;

impl Entity for User {
    type Id = UserId;
    type CreateParams = UserCreate;
    type UpdateParams = ();
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    const KIND: &'static str = "user";

    fn id(&self) -> &UserId {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the user
    /// * `params` - Names, email and role of the account
    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, UserError> {
        let email = params.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(UserError::ValidationError(format!("invalid email: {:?}", params.email)));
        }
        if params.last_name.trim().is_empty() || params.first_name.trim().is_empty() {
            return Err(UserError::ValidationError("first and last name are required".into()));
        }
        Ok(Self {
            id,
            last_name: params.last_name,
            first_name: params.first_name,
            email,
            role: params.role,
            phone: params.phone,
        })
    }

    /// Emails are unique regardless of case.
    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_lowercase())
    }

    /// Accounts are managed outside the order core; nothing is editable here.
    fn on_update(&mut self, _params: ()) -> Result<(), UserError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
