use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::Config;
use crate::errors::{ConfigError, ListError};
use crate::list::codec::ListCodec;
use crate::list::entry::{EntryView, NAME_DELIM};
use crate::list::format::FormatSpec;

/// Name and description of the list produced by
/// [`ListRegistry::to_aggregate_list`].
pub const AGGREGATE_LIST_HEADER: &str = "LL:ListOfLists";

/// A flat collection of lists, looked up by name.
///
/// Lists are appended in order; when two share a name the first one wins
/// lookups.
#[derive(Debug, Clone, Default)]
pub struct ListRegistry {
    lists: Vec<ListCodec>,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the list definitions in a configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.add_all(config.lists.definitions.as_slice())?;
        tracing::debug!(lists = registry.len(), "registry loaded from config");
        Ok(registry)
    }

    /// Parse and append one list definition.
    pub fn add(&mut self, text: &str) -> Result<&ListCodec, ListError> {
        let list = ListCodec::parse(text)?;
        self.lists.push(list);
        let last = self.lists.len() - 1;
        Ok(&self.lists[last])
    }

    /// Parse and append several definitions. Nothing is added unless every
    /// definition parses.
    pub fn add_all<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<usize, ListError> {
        let parsed = texts
            .iter()
            .map(|t| ListCodec::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let added = parsed.len();
        self.lists.extend(parsed);
        Ok(added)
    }

    pub fn push(&mut self, list: ListCodec) {
        self.lists.push(list);
    }

    pub fn list(&self, name: &str) -> Option<&ListCodec> {
        self.lists.iter().find(|l| l.name() == name)
    }

    pub fn list_mut(&mut self, name: &str) -> Option<&mut ListCodec> {
        self.lists.iter_mut().find(|l| l.name() == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ListCodec> {
        let pos = self.lists.iter().position(|l| l.name() == name)?;
        Some(self.lists.remove(pos))
    }

    pub fn lists(&self) -> &[ListCodec] {
        &self.lists
    }

    pub fn names(&self) -> Vec<&str> {
        self.lists.iter().map(ListCodec::name).collect()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Add every list whose name is not already present. Existing lists
    /// win. Returns how many lists were added.
    pub fn merge(&mut self, others: impl IntoIterator<Item = ListCodec>) -> usize {
        let mut added = 0;
        for list in others {
            if self.list(list.name()).is_none() {
                self.lists.push(list);
                added += 1;
            }
        }
        added
    }

    /// Entry `name` of list `list`.
    pub fn entry(&self, list: &str, name: &str) -> Option<EntryView> {
        self.list(list).and_then(|l| l.entry(name))
    }

    /// The list a `Member` format draws its values from.
    pub fn member_list(&self, format: &FormatSpec) -> Option<&ListCodec> {
        format.member_list().and_then(|name| self.list(name))
    }

    /// A list with one entry per registered list, `name:desc`, sorted by
    /// name. Lists without a name are left out.
    pub fn to_aggregate_list(&self) -> Result<ListCodec, ListError> {
        let mut lists: Vec<&ListCodec> = self
            .lists
            .iter()
            .filter(|l| !l.name().is_empty())
            .collect();
        lists.sort_by(|a, b| a.name().cmp(b.name()));

        let mut text = format!("{}|", AGGREGATE_LIST_HEADER);
        for list in lists {
            if list.desc().is_empty() || list.desc() == list.name() {
                let _ = write!(text, "{}|", list.name());
            } else {
                let _ = write!(text, "{}{}{}|", list.name(), NAME_DELIM, list.desc());
            }
        }
        ListCodec::parse(&text)
    }

    /// Constant declarations for every list.
    pub fn defines(&self) -> String {
        let mut out = String::new();
        for list in &self.lists {
            out.push_str(&list.to_defines());
            out.push('\n');
        }
        out
    }
}

/// A registry shared between threads. Readers run concurrently; each
/// mutation holds the write lock for its whole duration.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<ListRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: ListRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&ListRegistry) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` on the named list under the write lock. Returns `None` when
    /// no list has that name.
    pub fn update<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut ListCodec) -> Result<R, ListError>,
    ) -> Result<Option<R>, ListError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match guard.list_mut(name) {
            Some(list) => f(list).map(Some),
            None => Ok(None),
        }
    }

    pub fn add(&self, text: &str) -> Result<(), ListError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.add(text).map(|_| ())
    }
}
