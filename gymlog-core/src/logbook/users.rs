use log::info;

use super::Logbook;
use crate::db::operations;
use crate::error::{LogbookError, Result};
use crate::objects::User;
use crate::validation::validate_name;

const USERNAME_MAX: usize = 150;

impl Logbook {
    pub async fn create_user(&self, username: &str) -> Result<User> {
        validate_name("Username", username, USERNAME_MAX)?;
        if operations::get_user_by_username(&self.db_pool, username)
            .await?
            .is_some()
        {
            return Err(LogbookError::validation(format!(
                "Username '{}' is already taken.",
                username
            )));
        }
        let user = operations::create_user(&self.db_pool, username).await?;
        info!("Created user {} ({})", user.id, user.username);
        Ok(user.into())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        operations::get_user(&self.db_pool, user_id)
            .await?
            .map(User::from)
            .ok_or(LogbookError::NotFound {
                entity: "user",
                id: user_id,
            })
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<User>> {
        Ok(operations::get_user_by_username(&self.db_pool, username)
            .await?
            .map(User::from))
    }
}
