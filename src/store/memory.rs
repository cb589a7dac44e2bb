use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::store::{
    Assignment, AssignmentRepo, GroupAssignment, GroupAssignmentRepo, Organization, Result,
    Store, User,
};

/// On-disk representation of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub group_assignments: Vec<GroupAssignment>,
    #[serde(default)]
    pub assignment_repos: Vec<AssignmentRepo>,
    #[serde(default)]
    pub group_assignment_repos: Vec<GroupAssignmentRepo>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    organizations: RwLock<HashMap<u64, Organization>>,
    users: RwLock<HashMap<u64, User>>,
    assignments: RwLock<HashMap<u64, Assignment>>,
    group_assignments: RwLock<HashMap<u64, GroupAssignment>>,
    assignment_repos: RwLock<HashMap<u64, AssignmentRepo>>,
    group_assignment_repos: RwLock<HashMap<u64, GroupAssignmentRepo>>,
    /// Where mutations are written back, if the store was loaded from a file.
    path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        fn index<T>(items: Vec<T>, key: impl Fn(&T) -> u64) -> RwLock<HashMap<u64, T>> {
            RwLock::new(items.into_iter().map(|item| (key(&item), item)).collect())
        }

        Self {
            organizations: index(snapshot.organizations, |o| o.github_id),
            users: index(snapshot.users, |u| u.uid),
            assignments: index(snapshot.assignments, |a| a.id),
            group_assignments: index(snapshot.group_assignments, |a| a.id),
            assignment_repos: index(snapshot.assignment_repos, |r| r.github_repo_id),
            group_assignment_repos: index(snapshot.group_assignment_repos, |r| r.github_repo_id),
            path: None,
        }
    }

    /// Loads the store from a YAML snapshot. Later mutations are saved back to the same file.
    pub async fn open(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: StoreSnapshot = serde_yaml::from_str(&content)?;
        debug!(
            "loaded {} organizations and {} repositories from {}",
            snapshot.organizations.len(),
            snapshot.assignment_repos.len() + snapshot.group_assignment_repos.len(),
            path.display()
        );

        Ok(Self {
            path: Some(path.to_owned()),
            ..Self::from_snapshot(snapshot)
        })
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        fn sorted<T: Clone>(table: &HashMap<u64, T>) -> Vec<T> {
            let mut entries: Vec<_> = table.iter().collect();
            entries.sort_by_key(|(id, _)| **id);
            entries.into_iter().map(|(_, item)| item.clone()).collect()
        }

        StoreSnapshot {
            organizations: sorted(&*self.organizations.read().await),
            users: sorted(&*self.users.read().await),
            assignments: sorted(&*self.assignments.read().await),
            group_assignments: sorted(&*self.group_assignments.read().await),
            assignment_repos: sorted(&*self.assignment_repos.read().await),
            group_assignment_repos: sorted(&*self.group_assignment_repos.read().await),
        }
    }

    async fn persist(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };

        let content = serde_yaml::to_string(&self.snapshot().await)?;
        tokio::fs::write(path, content).await?;
        trace!("saved store snapshot to {}", path.display());

        Ok(())
    }
}

#[rocket::async_trait]
impl Store for MemoryStore {
    async fn organization_by_github_id(&self, github_id: u64) -> Result<Option<Organization>> {
        Ok(self.organizations.read().await.get(&github_id).cloned())
    }

    async fn user_by_uid(&self, uid: u64) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&uid).cloned())
    }

    async fn assignment_repo_by_github_id(
        &self,
        github_repo_id: u64,
    ) -> Result<Option<AssignmentRepo>> {
        Ok(self.assignment_repos.read().await.get(&github_repo_id).cloned())
    }

    async fn group_assignment_repo_by_github_id(
        &self,
        github_repo_id: u64,
    ) -> Result<Option<GroupAssignmentRepo>> {
        Ok(self
            .group_assignment_repos
            .read()
            .await
            .get(&github_repo_id)
            .cloned())
    }

    async fn assignment(&self, id: u64) -> Result<Option<Assignment>> {
        Ok(self.assignments.read().await.get(&id).cloned())
    }

    async fn group_assignment(&self, id: u64) -> Result<Option<GroupAssignment>> {
        Ok(self.group_assignments.read().await.get(&id).cloned())
    }

    async fn set_webhook_active(&self, github_id: u64, active: bool) -> Result<()> {
        {
            let mut organizations = self.organizations.write().await;
            match organizations.get_mut(&github_id) {
                Some(organization) => organization.webhook_active = active,
                None => return Ok(()),
            }
        }

        self.persist().await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SNAPSHOT: &str = r#"
organizations:
  - github_id: 1
users:
  - uid: 10
    login: student
assignments:
  - id: 100
    title: Linked lists
    due_date: 2021-03-01T12:00:00Z
assignment_repos:
  - github_repo_id: 1000
    assignment_id: 100
"#;

    #[rocket::async_test]
    async fn test_lookups() {
        let snapshot: StoreSnapshot = serde_yaml::from_str(SNAPSHOT).unwrap();
        let store = MemoryStore::from_snapshot(snapshot);

        assert_eq!(
            store.organization_by_github_id(1).await.unwrap(),
            Some(Organization {
                github_id: 1,
                webhook_active: false
            })
        );
        assert_eq!(store.organization_by_github_id(2).await.unwrap(), None);
        assert!(store.user_by_uid(10).await.unwrap().is_some());
        assert_eq!(
            store.assignment_repo_by_github_id(1000).await.unwrap(),
            Some(AssignmentRepo {
                github_repo_id: 1000,
                assignment_id: 100
            })
        );
        assert_eq!(
            store.group_assignment_repo_by_github_id(1000).await.unwrap(),
            None
        );
        assert_eq!(store.assignment(100).await.unwrap().unwrap().title, "Linked lists");
    }

    #[rocket::async_test]
    async fn test_webhook_active_is_saved_to_file() {
        let path = std::env::temp_dir().join(format!(
            "classroom-hooks-store-{}.yml",
            std::process::id()
        ));
        tokio::fs::write(&path, SNAPSHOT).await.unwrap();

        let store = MemoryStore::open(&path).await.unwrap();
        store.set_webhook_active(1, true).await.unwrap();
        // unknown organizations are left alone
        store.set_webhook_active(2, true).await.unwrap();

        let reopened = MemoryStore::open(&path).await.unwrap();
        let snapshot = reopened.snapshot().await;
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(
            snapshot.organizations,
            vec![Organization {
                github_id: 1,
                webhook_active: true
            }]
        );
        assert_eq!(snapshot.assignments.len(), 1);
    }
}
