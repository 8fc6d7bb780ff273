//! In-memory habit collection for one user identity.
//!
//! Every mutation updates the collection first and then issues a
//! best-effort whole-collection write to the storage collaborator. A
//! failed write is reported to the user and logged, never rolled back.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::file::KeyValueStore;
use crate::models::{Habit, UserId};
use crate::notify::Notifier;

/// Namespace prefix for persisted habit collections.
const STORAGE_PREFIX: &str = "habits-";

/// Storage key for a user's habit collection.
pub fn storage_key(user: &UserId) -> String {
    format!("{}{}", STORAGE_PREFIX, user)
}

/// Today's day key in the local time zone.
pub fn today_key() -> NaiveDate {
    Local::now().date_naive()
}

/// A habit collection read for a specific identity.
///
/// Loads are tagged with the identity they were issued for, so a result
/// arriving after the active identity changed can be discarded instead of
/// being applied to the wrong user's state.
#[derive(Debug)]
pub struct LoadedHabits {
    pub user: UserId,
    pub habits: Vec<Habit>,
}

/// One row of the display projection.
#[derive(Debug, Serialize)]
pub struct HabitView<'a> {
    #[serde(flatten)]
    pub habit: &'a Habit,
    pub streak: u32,
    pub completed_today: bool,
}

/// Habit store for one user identity.
pub struct HabitStore<S> {
    storage: S,
    notifier: Box<dyn Notifier>,
    user: UserId,
    habits: Vec<Habit>,
}

impl<S: KeyValueStore> HabitStore<S> {
    pub fn new(storage: S, notifier: Box<dyn Notifier>, user: UserId) -> Self {
        Self {
            storage,
            notifier,
            user,
            habits: Vec::new(),
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Switches the active identity.
    ///
    /// The collection is cleared until a fresh load for the new identity
    /// is applied; loads issued for the old identity will be discarded.
    pub fn set_user(&mut self, user: UserId) {
        if self.user != user {
            self.user = user;
            self.habits.clear();
        }
    }

    /// Reads the persisted collection for `user`.
    ///
    /// A missing payload yields an empty collection. An unreadable or
    /// unparseable payload yields [`HabitError::Load`]; the caller should
    /// present an empty collection and surface the error.
    pub async fn fetch(storage: &S, user: &UserId) -> Result<LoadedHabits, HabitError> {
        let key = storage_key(user);
        let habits = match storage.get(&key).await {
            Ok(Some(bytes)) => {
                serde_json::from_slice(&bytes).map_err(|e| HabitError::Load(e.to_string()))?
            }
            Ok(None) => Vec::new(),
            Err(e) => return Err(HabitError::Load(e.to_string())),
        };
        Ok(LoadedHabits {
            user: user.clone(),
            habits,
        })
    }

    /// Installs a fetched collection if it was issued for the current
    /// identity. Returns `false` when the result was stale and discarded.
    pub fn apply(&mut self, loaded: LoadedHabits) -> bool {
        if loaded.user != self.user {
            tracing::debug!(
                issued_for = %loaded.user,
                active = %self.user,
                "discarding stale habit load"
            );
            return false;
        }
        self.habits = loaded.habits;
        true
    }

    /// Fetches and applies the collection for the current identity.
    pub async fn load(&mut self) -> Result<(), HabitError> {
        let loaded = Self::fetch(&self.storage, &self.user).await?;
        self.apply(loaded);
        Ok(())
    }

    /// Adds a new habit to the front of the collection.
    ///
    /// The title is trimmed and must be non-empty and case-insensitively
    /// unique. Validation failures leave the collection untouched.
    pub async fn add(&mut self, title: &str) -> Result<&Habit, HabitError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(HabitError::EmptyTitle);
        }

        let needle = title.to_lowercase();
        if self.habits.iter().any(|h| h.title.to_lowercase() == needle) {
            return Err(HabitError::DuplicateTitle(title.to_string()));
        }

        self.habits.insert(0, Habit::new(title));
        self.persist().await;
        Ok(&self.habits[0])
    }

    /// Flips today's completion for the habit with the given id.
    ///
    /// Returns whether the habit is completed after the call.
    pub async fn toggle_today(&mut self, id: Uuid) -> Result<bool, HabitError> {
        let today = today_key();
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(HabitError::NotFound(id))?;

        let completed = habit.toggle(today);
        self.persist().await;
        Ok(completed)
    }

    /// Removes the habit with the given id. A missing id is a silent no-op.
    ///
    /// Confirmation is the caller's concern.
    pub async fn remove(&mut self, id: Uuid) {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        if self.habits.len() != before {
            self.persist().await;
        }
    }

    /// Finds a habit by UUID or case-insensitive title.
    pub fn find(&self, reference: &str) -> Option<&Habit> {
        if let Ok(id) = Uuid::parse_str(reference) {
            if let Some(habit) = self.habits.iter().find(|h| h.id == id) {
                return Some(habit);
            }
        }
        let needle = reference.trim().to_lowercase();
        self.habits.iter().find(|h| h.title.to_lowercase() == needle)
    }

    /// Display projection: streak descending, then most recently created
    /// first. Leaves the stored insertion order untouched.
    pub fn view(&self, as_of: NaiveDate) -> Vec<HabitView<'_>> {
        let mut rows: Vec<HabitView<'_>> = self
            .habits
            .iter()
            .map(|habit| HabitView {
                streak: habit.streak(as_of),
                completed_today: habit.completed_on(as_of),
                habit,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.streak
                .cmp(&a.streak)
                .then_with(|| b.habit.created_at.cmp(&a.habit.created_at))
        });
        rows
    }

    /// Best-effort write of the full collection.
    ///
    /// The in-memory state is already updated when this runs; a failed
    /// write is reported and logged, not rolled back and not retried.
    async fn persist(&self) {
        let bytes = match serde_json::to_vec(&self.habits) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to serialize habits for {}: {}", self.user, e);
                self.notifier.notify("Failed to save habits");
                return;
            }
        };

        let key = storage_key(&self.user);
        if let Err(e) = self.storage.set(&key, &bytes).await {
            tracing::warn!("Failed to persist habits for {}: {}", self.user, e);
            self.notifier.notify("Failed to save habits");
        }
    }
}

/// Errors from habit store operations.
#[derive(Debug)]
pub enum HabitError {
    /// Persisted payload could not be read or parsed.
    Load(String),
    /// Title was empty after trimming.
    EmptyTitle,
    /// A habit with the same title already exists.
    DuplicateTitle(String),
    /// No habit matched the given id.
    NotFound(Uuid),
}

impl std::fmt::Display for HabitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HabitError::Load(e) => write!(f, "Failed to load habits: {}", e),
            HabitError::EmptyTitle => write!(f, "Please enter a habit name"),
            HabitError::DuplicateTitle(title) => {
                write!(f, "Habit '{}' already exists", title)
            }
            HabitError::NotFound(id) => write!(f, "Habit not found: {}", id),
        }
    }
}

impl std::error::Error for HabitError {}
