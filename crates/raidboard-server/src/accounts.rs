//! Account registration and authentication.

use raidboard_core::password::{hash_password, verify_password};
use raidboard_core::AccountError;
use raidboard_store::AccountRepository;
use tracing::info;

use crate::error::ServerError;

/// Registers and authenticates accounts against the account record file.
#[derive(Clone)]
pub struct AccountService {
    repo: AccountRepository,
}

impl AccountService {
    pub fn new(repo: AccountRepository) -> Self {
        Self { repo }
    }

    /// Create a new account. Names are case-sensitive and must be unique.
    pub async fn register(&self, name: &str, password: &str) -> Result<(), ServerError> {
        if name.trim().is_empty() || password.trim().is_empty() {
            return Err(AccountError::InvalidName.into());
        }

        let inserted = self.repo.insert(name, &hash_password(password)).await?;
        if !inserted {
            return Err(AccountError::DuplicateAccount.into());
        }

        info!(name = %name, "Account registered");
        Ok(())
    }

    /// Verify credentials, returning the identity to hand to the session
    /// provider.
    pub async fn authenticate(&self, name: &str, password: &str) -> Result<String, ServerError> {
        let Some(stored) = self.repo.get(name).await? else {
            return Err(AccountError::UnknownAccount.into());
        };

        if !verify_password(password, &stored) {
            return Err(AccountError::WrongPassword.into());
        }

        Ok(name.to_string())
    }
}
