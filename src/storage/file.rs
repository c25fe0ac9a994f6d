use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, Result};
use crate::storage::{insert_new, user_not_found, UserRepository};
use crate::user::{validate_user_name, User};

/// registry cached in memory, one pretty-printed json document per user
#[derive(Debug)]
pub struct FileRepository {
    config: LedgerConfig,
    users: BTreeMap<String, User>,
}

impl FileRepository {
    /// create the data directory if needed and load every user document in it
    pub fn open(config: LedgerConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)
            .map_err(|e| LedgerError::storage(&config.data_dir, e))?;

        let mut users = BTreeMap::new();
        let entries = fs::read_dir(&config.data_dir)
            .map_err(|e| LedgerError::storage(&config.data_dir, e))?;

        for entry in entries {
            let path = entry
                .map_err(|e| LedgerError::storage(&config.data_dir, e))?
                .path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            // the file stem is the registry key, so names are unique here
            let user = load_user(&path)?;
            users.insert(user.user_name().to_string(), user);
        }

        info!(dir = %config.data_dir.display(), users = users.len(), "user registry loaded");
        Ok(Self { config, users })
    }

    /// `deleted/<user>.json`, or a uniquely suffixed sibling when an earlier
    /// deletion of the same name already holds it
    fn vacant_deleted_file(&self, user_name: &str) -> PathBuf {
        let target = self.config.deleted_user_file(user_name);
        if !target.exists() {
            return target;
        }
        self.config
            .deleted_path()
            .join(format!("{user_name}.{}.json", Uuid::now_v7()))
    }

    fn write_user(&self, user: &User, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(user)
            .map_err(|e| LedgerError::serialization(path, e))?;

        // write beside the target, then swap it in
        let staging = staging_path(path);
        fs::write(&staging, data).map_err(|e| LedgerError::storage(&staging, e))?;
        fs::rename(&staging, path).map_err(|e| LedgerError::storage(path, e))?;

        debug!(file = %path.display(), "user data saved");
        Ok(())
    }
}

impl UserRepository for FileRepository {
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
            .get(user_name)
            .ok_or_else(|| user_not_found(user_name))?;

        let deleted_dir = self.config.deleted_path();
        fs::create_dir_all(&deleted_dir).map_err(|e| LedgerError::storage(&deleted_dir, e))?;

        let active = self.config.user_file(user_name);
        let target = self.vacant_deleted_file(user_name);
        if active.is_file() {
            fs::rename(&active, &target).map_err(|e| LedgerError::storage(&active, e))?;
        } else {
            // never flushed, so there is nothing to move
            self.write_user(user, &target)?;
        }

        self.users.remove(user_name);
        info!(user = user_name, file = %target.display(), "user moved to deleted");
        Ok(())
    }

    fn persist_user(&mut self, user_name: &str) -> Result<()> {
        let user = self
            .users
            .get(user_name)
            .ok_or_else(|| user_not_found(user_name))?;
        self.write_user(user, &self.config.user_file(user_name))
    }

    fn persist_all(&mut self) -> Result<()> {
        for (user_name, user) in &self.users {
            self.write_user(user, &self.config.user_file(user_name))?;
        }
        info!(users = self.users.len(), "user registry persisted");
        Ok(())
    }

    fn list_users(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }
}

fn load_user(path: &Path) -> Result<User> {
    let data = fs::read_to_string(path).map_err(|e| LedgerError::storage(path, e))?;
    let user: User = serde_json::from_str(&data).map_err(|e| LedgerError::serialization(path, e))?;

    if validate_user_name(user.user_name()).is_err() {
        return Err(LedgerError::invalid_document(
            path,
            format!("user name {:?} is not a plain file name", user.user_name()),
        ));
    }
    if path.file_stem().and_then(|stem| stem.to_str()) != Some(user.user_name()) {
        return Err(LedgerError::invalid_document(
            path,
            format!("document holds user {:?}", user.user_name()),
        ));
    }

    for loan in user.loans() {
        if let Err(err) = loan.verify_invariants() {
            warn!(file = %path.display(), error = %err, "loaded loan is inconsistent");
        }
    }

    debug!(file = %path.display(), user = user.user_name(), "user data loaded");
    Ok(user)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}
