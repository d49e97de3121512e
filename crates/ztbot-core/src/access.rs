//! Role-based access control with a file-backed store.
//!
//! Every chat user has a [`Role`]. Roles are ordered; handlers compare the
//! caller's role against their minimum and nothing else. Exactly one user
//! holds [`Role::Admin`]: the admin id from the config. It is fixed for the
//! lifetime of the process and can never be reassigned through
//! [`AccessStore::set_role`].
//!
//! Non-default assignments persist in a JSON file mapping user id to a role
//! integer. [`Role::Guest`] is the implicit default and is never written;
//! the admin id is derived from configuration and is never written either.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{info, warn};

/// Errors produced by role store operations.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    /// Attempted to change the admin's role.
    #[error("admin's access level is immutable")]
    AdminImmutable,

    /// The role value is outside the assignable set.
    #[error("invalid access level value")]
    InvalidRole,

    /// Reading or committing the role file failed.
    #[error("role store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted role file failed validation at load.
    #[error("role store is corrupt: {0}")]
    Corrupt(String),
}

/// Access level of a chat user, ordered by privilege.
///
/// Only the ordering is guaranteed; the discriminant values are an
/// implementation detail of the persisted file, not part of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Rejected before any command dispatch.
    Banned = 0,
    /// Default for unknown users: `/start` and `/list` only.
    Guest = 1,
    /// May authorize and deauthorize network members.
    Operator = 2,
    /// Full access, including `/op` and `/deop`. Exactly one admin exists.
    Admin = 3,
}

impl Role {
    /// Decode a persisted role integer.
    ///
    /// Only the mutable set {Banned, Guest, Operator} is accepted: Admin is
    /// never persisted, so an Admin value in the file is as corrupt as a
    /// negative one.
    fn from_persisted(value: i64) -> Result<Role, RoleError> {
        match value {
            0 => Ok(Role::Banned),
            1 => Ok(Role::Guest),
            2 => Ok(Role::Operator),
            _ => Err(RoleError::InvalidRole),
        }
    }

    fn as_persisted(self) -> i64 {
        self as i64
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Banned => write!(f, "Banned"),
            Role::Guest => write!(f, "Guest"),
            Role::Operator => write!(f, "Operator"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

/// Says what role a given chat user has.
///
/// Command handlers depend on this seam rather than on the concrete store,
/// so tests can substitute fixed-role stubs.
pub trait AccessStore: Send + Sync {
    /// Never fails: Admin for the configured admin id, the stored role for
    /// known users, Guest for everyone else.
    fn get_role(&self, user_id: i64) -> Role;

    /// Assign a role. Fails with [`RoleError::AdminImmutable`] for the
    /// admin id and with [`RoleError::InvalidRole`] for [`Role::Admin`]
    /// (the mutation path can never mint a second admin).
    fn set_role(&self, user_id: i64, role: Role) -> Result<(), RoleError>;
}

/// File-backed [`AccessStore`].
///
/// The in-memory map is only authoritative after a successful commit: when
/// a commit fails, the map is reloaded from disk so memory never diverges
/// from the durable copy, and the I/O error is returned to the caller. If
/// that reload fails too, the mutated entry is restored to its pre-image,
/// which equals the persisted state since the commit never landed.
///
/// `set_role` holds the write lock across mutate-plus-commit, so concurrent
/// writers serialize and readers observe either the pre- or post-image of a
/// write, never a partial one.
#[derive(Debug)]
pub struct FileRoleStore {
    path: PathBuf,
    admin_id: i64,
    roles: RwLock<HashMap<i64, Role>>,
}

impl FileRoleStore {
    /// Load the store from `path`.
    ///
    /// Missing file, unreadable JSON, and any role value outside the
    /// mutable set are fatal load errors, never silently repaired. A stale
    /// entry for the admin id is the one exception: it is dropped with a
    /// warning, since Admin is derived from configuration, not the file.
    pub fn load(path: &Path, admin_id: i64) -> Result<Self, RoleError> {
        let roles = Self::read_file(path, admin_id)?;
        info!(
            path = %path.display(),
            entries = roles.len(),
            "role store loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            admin_id,
            roles: RwLock::new(roles),
        })
    }

    fn read_file(path: &Path, admin_id: i64) -> Result<HashMap<i64, Role>, RoleError> {
        let bytes = fs::read(path)?;
        let raw: HashMap<i64, i64> = serde_json::from_slice(&bytes)
            .map_err(|e| RoleError::Corrupt(format!("{}: {e}", path.display())))?;

        let mut roles = HashMap::with_capacity(raw.len());
        for (user_id, value) in raw {
            let role = Role::from_persisted(value).map_err(|_| {
                RoleError::Corrupt(format!(
                    "{}: user {user_id} has out-of-range role {value}",
                    path.display()
                ))
            })?;
            roles.insert(user_id, role);
        }

        if roles.remove(&admin_id).is_some() {
            warn!(admin_id, "dropping stale role file entry for the admin id");
        }

        Ok(roles)
    }

    /// One synchronous write of the full mapping. Guest entries were never
    /// inserted, so the persisted set stays minimal.
    fn commit(&self, roles: &HashMap<i64, Role>) -> Result<(), RoleError> {
        let raw: HashMap<i64, i64> = roles
            .iter()
            .map(|(&id, &role)| (id, role.as_persisted()))
            .collect();
        let bytes = serde_json::to_vec(&raw)
            .map_err(|e| RoleError::Corrupt(format!("encoding role map: {e}")))?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl AccessStore for FileRoleStore {
    fn get_role(&self, user_id: i64) -> Role {
        if user_id == self.admin_id {
            return Role::Admin;
        }
        // get_role never fails, poisoned lock included: a writer that
        // panicked either committed or was rolled back, so the map is
        // always a consistent image.
        let roles = self.roles.read().unwrap_or_else(|e| e.into_inner());
        roles.get(&user_id).copied().unwrap_or(Role::Guest)
    }

    fn set_role(&self, user_id: i64, role: Role) -> Result<(), RoleError> {
        if user_id == self.admin_id {
            return Err(RoleError::AdminImmutable);
        }
        if role == Role::Admin {
            return Err(RoleError::InvalidRole);
        }

        let mut roles = self.roles.write().unwrap_or_else(|e| e.into_inner());
        let previous = roles.get(&user_id).copied();
        if role == Role::Guest {
            roles.remove(&user_id);
        } else {
            roles.insert(user_id, role);
        }

        if let Err(e) = self.commit(&roles) {
            warn!(user_id, error = %e, "role commit failed, reloading from disk");
            match Self::read_file(&self.path, self.admin_id) {
                Ok(on_disk) => *roles = on_disk,
                Err(reload) => {
                    // The failed commit never landed, so the entry's
                    // pre-image still matches the persisted copy.
                    warn!(
                        error = %reload,
                        "reload after failed commit also failed, restoring the pre-image"
                    );
                    match previous {
                        Some(prev) => {
                            roles.insert(user_id, prev);
                        }
                        None => {
                            roles.remove(&user_id);
                        }
                    }
                }
            }
            return Err(e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ADMIN_ID: i64 = 100;

    /// Helper: a store over a fresh file with the given JSON content.
    fn store_with(content: &str) -> (TempDir, FileRoleStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        fs::write(&path, content).unwrap();
        let store = FileRoleStore::load(&path, ADMIN_ID).unwrap();
        (dir, store)
    }

    #[test]
    fn set_then_get_round_trips_every_mutable_role() {
        let (_dir, store) = store_with("{}");
        for role in [Role::Banned, Role::Guest, Role::Operator] {
            store.set_role(555, role).unwrap();
            assert_eq!(store.get_role(555), role);
        }
    }

    #[test]
    fn untouched_users_keep_their_role_across_writes() {
        let (_dir, store) = store_with("{}");
        store.set_role(1, Role::Operator).unwrap();
        store.set_role(2, Role::Banned).unwrap();
        assert_eq!(store.get_role(1), Role::Operator);
    }

    #[test]
    fn admin_role_is_immutable() {
        let (_dir, store) = store_with("{}");
        for role in [Role::Banned, Role::Guest, Role::Operator, Role::Admin] {
            let err = store.set_role(ADMIN_ID, role).unwrap_err();
            assert!(matches!(err, RoleError::AdminImmutable), "role {role}");
            assert_eq!(store.get_role(ADMIN_ID), Role::Admin);
        }
    }

    #[test]
    fn admin_role_cannot_be_assigned() {
        let (_dir, store) = store_with("{}");
        let err = store.set_role(555, Role::Admin).unwrap_err();
        assert!(matches!(err, RoleError::InvalidRole));
        assert_eq!(store.get_role(555), Role::Guest);
    }

    #[test]
    fn out_of_range_persisted_value_is_invalid() {
        assert!(matches!(
            Role::from_persisted(-1),
            Err(RoleError::InvalidRole)
        ));
        // Admin is never persisted, so 3 is out of range too.
        assert!(matches!(
            Role::from_persisted(3),
            Err(RoleError::InvalidRole)
        ));
    }

    #[test]
    fn unknown_user_defaults_to_guest() {
        let (_dir, store) = store_with("{}");
        assert_eq!(store.get_role(424242), Role::Guest);
    }

    #[test]
    fn reload_yields_the_same_roles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        fs::write(&path, "{}").unwrap();

        let store = FileRoleStore::load(&path, ADMIN_ID).unwrap();
        store.set_role(1, Role::Operator).unwrap();
        store.set_role(2, Role::Banned).unwrap();
        store.set_role(3, Role::Guest).unwrap();
        drop(store);

        let reloaded = FileRoleStore::load(&path, ADMIN_ID).unwrap();
        assert_eq!(reloaded.get_role(1), Role::Operator);
        assert_eq!(reloaded.get_role(2), Role::Banned);
        assert_eq!(reloaded.get_role(3), Role::Guest);
    }

    #[test]
    fn guest_assignments_are_not_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        fs::write(&path, "{}").unwrap();

        let store = FileRoleStore::load(&path, ADMIN_ID).unwrap();
        store.set_role(1, Role::Operator).unwrap();
        store.set_role(1, Role::Guest).unwrap();

        let raw: HashMap<i64, i64> =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert!(raw.is_empty(), "guest entry leaked into the file: {raw:?}");
        assert_eq!(store.get_role(1), Role::Guest);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let err = FileRoleStore::load(&dir.path().join("absent.json"), ADMIN_ID).unwrap_err();
        assert!(matches!(err, RoleError::Io(_)));
    }

    #[test]
    fn out_of_range_role_value_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        for content in [r#"{"5": 3}"#, r#"{"5": -1}"#, r#"{"5": 99}"#] {
            fs::write(&path, content).unwrap();
            let err = FileRoleStore::load(&path, ADMIN_ID).unwrap_err();
            assert!(matches!(err, RoleError::Corrupt(_)), "content {content}");
        }
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        fs::write(&path, "not json").unwrap();
        let err = FileRoleStore::load(&path, ADMIN_ID).unwrap_err();
        assert!(matches!(err, RoleError::Corrupt(_)));
    }

    #[test]
    fn stale_admin_entry_is_dropped_on_load() {
        let (_dir, store) = store_with(&format!(r#"{{"{ADMIN_ID}": 2, "7": 2}}"#));
        assert_eq!(store.get_role(ADMIN_ID), Role::Admin);
        assert_eq!(store.get_role(7), Role::Operator);
        // The stale entry must not come back on the next commit.
        store.set_role(8, Role::Operator).unwrap();
        let raw: HashMap<i64, i64> =
            serde_json::from_slice(&fs::read(&store.path).unwrap()).unwrap();
        assert!(!raw.contains_key(&ADMIN_ID));
    }

    #[test]
    fn failed_commit_rolls_the_mutation_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        fs::write(&path, "{}").unwrap();
        let store = FileRoleStore::load(&path, ADMIN_ID).unwrap();
        store.set_role(1, Role::Operator).unwrap();

        // Replace the role file with a directory: the next commit fails,
        // and so does the reload, forcing the pre-image fallback.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = store.set_role(2, Role::Operator).unwrap_err();
        assert!(matches!(err, RoleError::Io(_)));
        assert_eq!(
            store.get_role(2),
            Role::Guest,
            "uncommitted insert must not survive"
        );
        assert_eq!(store.get_role(1), Role::Operator, "other entries untouched");

        // Same for a mutation of an existing entry.
        let err = store.set_role(1, Role::Guest).unwrap_err();
        assert!(matches!(err, RoleError::Io(_)));
        assert_eq!(
            store.get_role(1),
            Role::Operator,
            "uncommitted removal must not survive"
        );
    }

    #[test]
    fn store_survives_a_poisoned_lock() {
        let (_dir, store) = store_with("{}");
        store.set_role(1, Role::Operator).unwrap();

        // Poison the lock by panicking while holding the write guard.
        let joined = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = store.roles.write().unwrap();
                panic!("poisoning the role store lock");
            })
            .join()
        });
        assert!(joined.is_err());

        assert_eq!(store.get_role(1), Role::Operator);
        store.set_role(2, Role::Banned).unwrap();
        assert_eq!(store.get_role(2), Role::Banned);
    }

    #[test]
    fn role_ordering() {
        assert!(Role::Banned < Role::Guest);
        assert!(Role::Guest < Role::Operator);
        assert!(Role::Operator < Role::Admin);
    }
}
