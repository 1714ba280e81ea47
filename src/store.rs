// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! In-memory per-user data store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::coaching::strategies::CopingStrategy;
use crate::coaching::CoachingSession;
use crate::garden::ZenGarden;
use crate::journal::JournalEntry;
use crate::wearable::ProcessedWearable;
use crate::{NeuroSyncError, Result};

/// Everything tracked for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub journal_entries: Vec<JournalEntry>,
    pub wearable_data: Vec<ProcessedWearable>,
    pub coping_strategies: Vec<CopingStrategy>,
    #[serde(default)]
    pub coaching_history: Vec<CoachingSession>,
    pub garden: ZenGarden,
}

impl UserData {
    /// Fresh data for a first-time user
    pub fn new(today: NaiveDate) -> Self {
        Self {
            journal_entries: Vec::new(),
            wearable_data: Vec::new(),
            coping_strategies: vec![CopingStrategy::welcome(today)],
            coaching_history: Vec::new(),
            garden: ZenGarden::default_for(today),
        }
    }

    pub fn session_mut(&mut self, session_id: &str) -> Result<&mut CoachingSession> {
        self.coaching_history
            .iter_mut()
            .find(|s| s.session_id == session_id)
            .ok_or_else(|| NeuroSyncError::NotFound(format!("coaching session {}", session_id)))
    }
}

/// Thread-safe map of user id to data. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<Mutex<HashMap<String, UserData>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, UserData>>> {
        self.users
            .lock()
            .map_err(|_| NeuroSyncError::Store("user store lock poisoned".to_string()))
    }

    /// A copy of the user's data, created on first access
    pub fn load(&self, user: &str, today: NaiveDate) -> Result<UserData> {
        let mut users = self.lock()?;
        let data = users.entry(user.to_string()).or_insert_with(|| {
            tracing::info!("Creating data for new user {}", user);
            UserData::new(today)
        });
        Ok(data.clone())
    }

    /// Replace the user's data
    pub fn save(&self, user: &str, data: UserData) -> Result<()> {
        self.lock()?.insert(user.to_string(), data);
        Ok(())
    }

    /// Mutate the user's data in place under the lock
    pub fn update<R>(
        &self,
        user: &str,
        today: NaiveDate,
        f: impl FnOnce(&mut UserData) -> Result<R>,
    ) -> Result<R> {
        let mut users = self.lock()?;
        let data = users
            .entry(user.to_string())
            .or_insert_with(|| UserData::new(today));
        f(data)
    }

    /// Remove everything stored for a user
    pub fn delete(&self, user: &str) -> Result<bool> {
        Ok(self.lock()?.remove(user).is_some())
    }

    pub fn users(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.lock()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
