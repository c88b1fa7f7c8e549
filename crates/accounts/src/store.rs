use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::AccountError;

/// One row of the credential file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    /// Hex SHA-256 digest of the password
    pub password: String,
}

/// Hex SHA-256 digest of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Username/password store persisted as `username,password` CSV.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    users: Vec<UserRecord>,
}

impl CredentialStore {
    /// Open the store at `path`. A missing file is an empty store; it is
    /// created on the first registration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AccountError> {
        let path = path.as_ref().to_path_buf();

        let users = if path.exists() {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .trim(csv::Trim::All)
                .from_path(&path)?;
            reader
                .deserialize::<UserRecord>()
                .collect::<Result<Vec<_>, _>>()?
        } else {
            debug!("No credential file at {}, starting empty", path.display());
            Vec::new()
        };

        info!("Loaded {} user accounts from {}", users.len(), path.display());
        Ok(Self { path, users })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.username == username)
    }

    /// Add a user and persist the whole table.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), AccountError> {
        if password != confirm {
            return Err(AccountError::PasswordMismatch);
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(AccountError::EmptyUsername);
        }
        if self.contains(username) {
            return Err(AccountError::DuplicateUser(username.to_string()));
        }

        self.users.push(UserRecord {
            username: username.to_string(),
            password: hash_password(password),
        });

        if let Err(err) = self.persist() {
            self.users.pop();
            return Err(err);
        }

        info!("Registered user {}", username);
        Ok(())
    }

    /// True when `username` exists and its stored digest matches.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let digest = hash_password(password);
        self.users
            .iter()
            .find(|u| u.username == username.trim())
            .is_some_and(|u| u.password == digest)
    }

    /// Write the table to a temporary file next to the store and rename it
    /// over the old one, so a failed write never truncates the file.
    fn persist(&self) -> Result<(), AccountError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::Writer::from_writer(&mut tmp);
            if self.users.is_empty() {
                writer.write_record(["username", "password"])?;
            }
            for user in &self.users {
                writer.serialize(user)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_missing_file_is_empty_store() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CredentialStore::open(dir.path().join("users.csv"))?;
        assert!(store.is_empty());
        assert!(!store.authenticate("alice", "secret"));
        Ok(())
    }

    #[test]
    fn test_register_and_authenticate() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("users.csv");

        let mut store = CredentialStore::open(&path)?;
        store.register("alice", "secret", "secret")?;

        assert!(store.authenticate("alice", "secret"));
        assert!(!store.authenticate("alice", "wrong"));
        assert!(!store.authenticate("bob", "secret"));

        let reopened = CredentialStore::open(&path)?;
        assert_eq!(reopened.len(), 1);
        assert!(reopened.authenticate("alice", "secret"));

        let contents = fs::read_to_string(&path)?;
        assert!(contents.starts_with("username,password\n"));
        assert!(!contents.contains("secret"));
        Ok(())
    }

    #[test]
    fn test_failed_persist_rolls_back_and_leaves_no_partial_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("users.csv");

        let mut store = CredentialStore::open(&path)?;
        store.register("alice", "secret", "secret")?;

        // A non-empty directory in place of the file makes the final rename fail
        fs::remove_file(&path)?;
        fs::create_dir(&path)?;
        fs::write(path.join("keep"), "untouched")?;

        assert!(matches!(
            store.register("bob", "pw", "pw"),
            Err(AccountError::Io(_))
        ));
        assert_eq!(store.len(), 1);
        assert!(!store.contains("bob"));

        assert_eq!(fs::read_to_string(path.join("keep"))?, "untouched");
        let leftovers: Vec<_> = fs::read_dir(dir.path())?.collect::<Result<_, _>>()?;
        assert_eq!(leftovers.len(), 1, "temporary file must be cleaned up");
        Ok(())
    }

    #[test]
    fn test_register_errors() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut store = CredentialStore::open(dir.path().join("users.csv"))?;

        assert!(matches!(
            store.register("alice", "a", "b"),
            Err(AccountError::PasswordMismatch)
        ));
        assert!(matches!(
            store.register("  ", "a", "a"),
            Err(AccountError::EmptyUsername)
        ));

        store.register("alice", "a", "a")?;
        assert!(matches!(
            store.register("alice", "b", "b"),
            Err(AccountError::DuplicateUser(name)) if name == "alice"
        ));
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
