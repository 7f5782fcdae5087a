use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::{Catalog, Status};

/// Last known status per product.
///
/// The poll loop is the only writer. Clones share the same map, so a
/// display surface can hold one and read single entries at any time.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    statuses: Arc<RwLock<HashMap<String, Status>>>,
    order: Arc<Vec<String>>,
}

impl StateTracker {
    /// Every catalog product starts out sold out.
    pub fn new(catalog: &Catalog) -> Self {
        let order: Vec<String> = catalog.iter().map(|p| p.name.clone()).collect();
        let statuses = order
            .iter()
            .map(|name| (name.clone(), Status::SoldOut))
            .collect();

        Self {
            statuses: Arc::new(RwLock::new(statuses)),
            order: Arc::new(order),
        }
    }

    /// Unknown names read as sold out.
    pub fn get(&self, name: &str) -> Status {
        self.statuses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or_default()
    }

    /// Store a new status and return the one it replaced.
    pub fn set(&self, name: &str, status: Status) -> Status {
        self.statuses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), status)
            .unwrap_or_default()
    }

    /// Statuses in catalog order.
    pub fn snapshot(&self) -> Vec<(String, Status)> {
        let statuses = self.statuses.read().unwrap_or_else(PoisonError::into_inner);
        self.order
            .iter()
            .map(|name| (name.clone(), statuses.get(name).copied().unwrap_or_default()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.statuses.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
