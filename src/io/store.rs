//! Persistence interface for projects, scenarios, and reports.
//!
//! ## Table of Contents
//! - **Record**: Anything stored under a string id
//! - **Repository**: CRUD trait implemented by storage backends
//! - **MemoryRepository**: In-process backend (default)

use crate::model::record::{Project, Report, Scenario};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: &'static str, id: String },
}

/// A value stored under a unique string id.
pub trait Record: Clone + Send + Sync {
    /// Human-readable record kind used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Record for Project {
    const KIND: &'static str = "project";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Scenario {
    const KIND: &'static str = "scenario";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Report {
    const KIND: &'static str = "report";

    fn id(&self) -> &str {
        &self.id
    }
}

/// CRUD access to one kind of record.
pub trait Repository<T: Record>: Send + Sync {
    /// Inserts a new record; fails if the id is taken.
    fn create(&self, record: T) -> Result<(), StoreError>;

    fn get(&self, id: &str) -> Result<T, StoreError>;

    /// Replaces an existing record; fails if the id is unknown.
    fn update(&self, record: T) -> Result<(), StoreError>;

    /// Removes and returns a record.
    fn delete(&self, id: &str) -> Result<T, StoreError>;

    /// All records, ordered by id.
    fn list(&self) -> Vec<T>;
}

/// Repository held entirely in memory.
#[derive(Debug)]
pub struct MemoryRepository<T> {
    records: RwLock<BTreeMap<String, T>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn not_found<T: Record>(id: &str) -> StoreError {
    StoreError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn create(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if records.contains_key(record.id()) {
            return Err(StoreError::AlreadyExists {
                kind: T::KIND,
                id: record.id().to_string(),
            });
        }
        debug!(kind = T::KIND, id = record.id(), "record created");
        records.insert(record.id().to_string(), record);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<T, StoreError> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    fn update(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write();
        match records.get_mut(record.id()) {
            Some(slot) => {
                debug!(kind = T::KIND, id = record.id(), "record updated");
                *slot = record;
                Ok(())
            }
            None => Err(not_found::<T>(record.id())),
        }
    }

    fn delete(&self, id: &str) -> Result<T, StoreError> {
        let removed = self.records.write().remove(id).ok_or_else(|| not_found::<T>(id))?;
        debug!(kind = T::KIND, id, "record deleted");
        Ok(removed)
    }

    fn list(&self) -> Vec<T> {
        self.records.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::ScenarioKind;
    use crate::model::route::ProcessingRoute;
    use crate::model::stage::Stage;
    use crate::model::types::StageType;
    use std::sync::Arc;
    use std::thread;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {}", id),
            description: String::new(),
            metal: "copper".to_string(),
            ore: None,
            scenario_ids: Vec::new(),
        }
    }

    #[test]
    fn create_then_get() {
        let repo: MemoryRepository<Project> = MemoryRepository::new();
        repo.create(project("p1")).unwrap();
        assert_eq!(repo.get("p1").unwrap().name, "Project p1");
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let repo: MemoryRepository<Project> = MemoryRepository::new();
        repo.create(project("p1")).unwrap();
        assert_eq!(
            repo.create(project("p1")),
            Err(StoreError::AlreadyExists {
                kind: "project",
                id: "p1".into()
            })
        );
    }

    #[test]
    fn update_replaces_and_requires_existing() {
        let repo: MemoryRepository<Project> = MemoryRepository::new();
        repo.create(project("p1")).unwrap();

        let mut changed = project("p1");
        changed.scenario_ids.push("s1".into());
        repo.update(changed).unwrap();
        assert_eq!(repo.get("p1").unwrap().scenario_ids, vec!["s1".to_string()]);

        assert!(matches!(
            repo.update(project("ghost")),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_returns_record() {
        let repo: MemoryRepository<Project> = MemoryRepository::new();
        repo.create(project("p1")).unwrap();
        assert_eq!(repo.delete("p1").unwrap().id, "p1");
        assert!(repo.is_empty());
        assert_eq!(
            repo.get("p1").unwrap_err().to_string(),
            "project 'p1' not found"
        );
    }

    #[test]
    fn list_is_ordered_by_id() {
        let repo: MemoryRepository<Project> = MemoryRepository::new();
        for id in ["p3", "p1", "p2"] {
            repo.create(project(id)).unwrap();
        }
        let ids: Vec<_> = repo.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
    }

    #[test]
    fn scenarios_store_their_route() {
        let repo: MemoryRepository<Scenario> = MemoryRepository::new();
        let route = ProcessingRoute::new("r", "Route")
            .with_stage(Stage::new("a", "Mine", StageType::Extraction));
        repo.create(Scenario {
            id: "s1".into(),
            project_id: "p1".into(),
            name: "Baseline".into(),
            kind: ScenarioKind::Baseline,
            route,
        })
        .unwrap();
        assert_eq!(repo.get("s1").unwrap().route.stage_count(), 1);
    }

    #[test]
    fn usable_across_threads_as_trait_object() {
        let repo: Arc<dyn Repository<Project>> = Arc::new(MemoryRepository::<Project>::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || repo.create(project(&format!("p{}", i))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(repo.list().len(), 4);
    }
}
