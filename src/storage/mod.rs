pub mod file;

use std::collections::BTreeMap;

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, Result};
use crate::user::User;

pub use file::FileRepository;

/// registry of users backing the ledger service.
///
/// the in-memory copy is authoritative during a session; nothing reaches
/// durable storage until `persist_user` or `persist_all` is called.
pub trait UserRepository {
    /// the single configuration shared with the service on top
    fn config(&self) -> &LedgerConfig;

    fn get_user(&self, user_name: &str) -> Option<&User>;

    fn get_user_mut(&mut self, user_name: &str) -> Option<&mut User>;

    /// register a new user, `UserAlreadyExists` if the name is taken
    fn add_user(&mut self, user: User) -> Result<()>;

    /// move the user's record into the deleted partition and drop it from the registry
    fn move_user_to_deleted(&mut self, user_name: &str) -> Result<()>;

    fn persist_user(&mut self, user_name: &str) -> Result<()>;

    /// flush every registered user
    fn persist_all(&mut self) -> Result<()>;

    /// registered user names, sorted
    fn list_users(&self) -> Vec<String>;
}

/// repository without durable storage
#[derive(Debug, Default)]
pub struct MemoryRepository {
    config: LedgerConfig,
    users: BTreeMap<String, User>,
    /// every deletion of a name, oldest first
    deleted: BTreeMap<String, Vec<User>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// the most recent record moved to the deleted partition under this name
    pub fn deleted_user(&self, user_name: &str) -> Option<&User> {
        self.deleted_records(user_name).last()
    }

    pub fn deleted_records(&self, user_name: &str) -> &[User] {
        self.deleted.get(user_name).map(Vec::as_slice).unwrap_or_default()
    }
}

impl UserRepository for MemoryRepository {
    fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn get_user(&self, user_name: &str) -> Option<&User> {
        self.users.get(user_name)
    }

    fn get_user_mut(&mut self, user_name: &str) -> Option<&mut User> {
        self.users.get_mut(user_name)
    }

    fn add_user(&mut self, user: User) -> Result<()> {
        insert_new(&mut self.users, user)
    }

    fn move_user_to_deleted(&mut self, user_name: &str) -> Result<()> {
        let user = self
            .users
            .remove(user_name)
            .ok_or_else(|| user_not_found(user_name))?;
        self.deleted.entry(user_name.to_string()).or_default().push(user);
        Ok(())
    }

    fn persist_user(&mut self, user_name: &str) -> Result<()> {
        if self.users.contains_key(user_name) {
            Ok(())
        } else {
            Err(user_not_found(user_name))
        }
    }

    fn persist_all(&mut self) -> Result<()> {
        Ok(())
    }

    fn list_users(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }
}

pub(crate) fn insert_new(users: &mut BTreeMap<String, User>, user: User) -> Result<()> {
    if users.contains_key(user.user_name()) {
        return Err(LedgerError::UserAlreadyExists {
            user_name: user.user_name().to_string(),
        });
    }
    users.insert(user.user_name().to_string(), user);
    Ok(())
}

pub(crate) fn user_not_found(user_name: &str) -> LedgerError {
    LedgerError::UserNotFound {
        user_name: user_name.to_string(),
    }
}
