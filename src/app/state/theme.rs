//! Process-wide dark/light preference with synchronous subscriber notification.

use crate::storage::{Storage, THEME_KEY};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ThemePreference {
    Dark,
    #[default]
    Light,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("unknown theme `{other}`")),
        }
    }
}

/// Handle returned by [`ThemeState::subscribe`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(ThemePreference)>;

/// Owner of the theme preference. Mutation only happens through [`ThemeState::toggle`].
pub struct ThemeState {
    preference: ThemePreference,
    storage: Arc<dyn Storage>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for ThemeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeState")
            .field("preference", &self.preference)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ThemeState {
    /// Loads the persisted preference, using `fallback` when absent or unreadable.
    pub fn load(storage: Arc<dyn Storage>, fallback: ThemePreference) -> Self {
        let preference = match storage.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|error| {
                tracing::warn!(%error, "ignoring persisted theme preference");
                fallback
            }),
            Ok(None) => fallback,
            Err(error) => {
                tracing::warn!(%error, "failed to read persisted theme preference");
                fallback
            }
        };

        Self {
            preference,
            storage,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn is_dark(&self) -> bool {
        self.preference == ThemePreference::Dark
    }

    /// Flips the preference, persists it, then notifies every current subscriber once.
    ///
    /// A failed write is logged; the in-memory value stays authoritative.
    pub fn toggle(&mut self) -> ThemePreference {
        self.preference = self.preference.toggled();

        if let Err(error) = self.storage.set(THEME_KEY, self.preference.as_str()) {
            tracing::warn!(%error, theme = %self.preference, "failed to persist theme preference");
        }

        let preference = self.preference;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(preference);
        }
        preference
    }

    pub fn subscribe(&mut self, callback: impl FnMut(ThemePreference) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(candidate, _)| *candidate != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ThemePreference, ThemeState};
    use crate::storage::{MemoryStorage, Result, Storage, StorageError, THEME_KEY};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(StorageError::Poisoned)
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn defaults_to_fallback_when_unset() {
        let state = ThemeState::load(Arc::new(MemoryStorage::default()), ThemePreference::Light);
        assert_eq!(state.preference(), ThemePreference::Light);
    }

    #[test]
    fn reads_persisted_preference() {
        let storage = MemoryStorage::with_entries([(THEME_KEY, "dark")]);
        let state = ThemeState::load(Arc::new(storage), ThemePreference::Light);
        assert!(state.is_dark());
    }

    #[test]
    fn invalid_persisted_value_falls_back() {
        let storage = MemoryStorage::with_entries([(THEME_KEY, "sepia")]);
        let state = ThemeState::load(Arc::new(storage), ThemePreference::Dark);
        assert_eq!(state.preference(), ThemePreference::Dark);
    }

    #[test]
    fn double_toggle_restores_original_and_notifies_each_time() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = ThemeState::load(storage.clone(), ThemePreference::Light);

        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(0usize));
        {
            let first = first.clone();
            state.subscribe(move |preference| first.borrow_mut().push(preference));
        }
        {
            let second = second.clone();
            state.subscribe(move |_| *second.borrow_mut() += 1);
        }

        state.toggle();
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        state.toggle();

        assert_eq!(state.preference(), ThemePreference::Light);
        assert_eq!(
            *first.borrow(),
            vec![ThemePreference::Dark, ThemePreference::Light]
        );
        assert_eq!(*second.borrow(), 2);
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn unsubscribed_callback_is_not_called() {
        let mut state = ThemeState::load(Arc::new(MemoryStorage::default()), ThemePreference::Light);
        let calls = Rc::new(RefCell::new(0usize));
        let id = {
            let calls = calls.clone();
            state.subscribe(move |_| *calls.borrow_mut() += 1)
        };

        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.toggle();

        assert_eq!(*calls.borrow(), 0);
        assert_eq!(state.subscriber_count(), 0);
    }

    #[test]
    fn persistence_failure_keeps_in_memory_toggle() {
        let mut state = ThemeState::load(Arc::new(FailingStorage), ThemePreference::Light);
        let calls = Rc::new(RefCell::new(0usize));
        {
            let calls = calls.clone();
            state.subscribe(move |_| *calls.borrow_mut() += 1);
        }

        assert_eq!(state.toggle(), ThemePreference::Dark);
        assert!(state.is_dark());
        assert_eq!(*calls.borrow(), 1);
    }
}
