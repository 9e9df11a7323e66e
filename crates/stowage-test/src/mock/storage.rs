//! Mock storage client.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use stowage_object::client::{MAX_PAGE_SIZE, ObjectStorage};
use stowage_object::types::{BucketCoordinate, ListingPage, ObjectDescriptor, StorageError};

const LABEL: &str = "mock";

/// A recorded call against [`MockStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    /// `list_objects`
    List {
        /// Requested prefix.
        prefix: String,
        /// Continuation cursor.
        start: Option<String>,
        /// Requested page limit.
        limit: usize,
    },
    /// `get_object`
    Get {
        /// Requested object name.
        name: String,
    },
}

/// In-memory [`ObjectStorage`] for tests.
///
/// Objects are listed in name order, at most `page_size` per page (default:
/// the requested limit). The bucket coordinate is ignored.
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    objects: BTreeMap<String, (ObjectDescriptor, Bytes)>,
    page_size: Option<usize>,
    failing_list_calls: HashSet<usize>,
    failing_gets: HashSet<String>,
    calls: Vec<StorageCall>,
}

impl MockStorage {
    /// Creates an empty bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object whose descriptor carries its size.
    pub fn with_object(self, name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let data = data.into();
        let descriptor = ObjectDescriptor::new(name.clone()).with_size(data.len() as u64);
        self.with_descriptor(descriptor, data)
    }

    /// Adds an object with a custom descriptor.
    pub fn with_descriptor(self, descriptor: ObjectDescriptor, data: impl Into<Bytes>) -> Self {
        self.state()
            .objects
            .insert(descriptor.name.clone(), (descriptor, data.into()));
        self
    }

    /// Adds text objects whose content is their own name.
    pub fn with_text_objects<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |storage, name| {
            let name = name.into();
            let data = Bytes::from(name.clone());
            storage.with_object(name, data)
        })
    }

    /// Limits every listing page to `page_size` objects.
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.state().page_size = Some(page_size.max(1));
        self
    }

    /// Makes the `call`-th listing request (1-based) fail.
    pub fn fail_list_call(self, call: usize) -> Self {
        self.state().failing_list_calls.insert(call);
        self
    }

    /// Makes every retrieval of `name` fail.
    pub fn fail_get(self, name: impl Into<String>) -> Self {
        self.state().failing_gets.insert(name.into());
        self
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<StorageCall> {
        self.state().calls.clone()
    }

    /// Returns the number of listing requests made so far.
    pub fn list_calls(&self) -> usize {
        self.count(|call| matches!(call, StorageCall::List { .. }))
    }

    /// Returns the names requested through `get_object`, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                StorageCall::Get { name } => Some(name.clone()),
                StorageCall::List { .. } => None,
            })
            .collect()
    }

    fn count(&self, predicate: impl Fn(&StorageCall) -> bool) -> usize {
        self.state().calls.iter().filter(|call| predicate(call)).count()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MockStorage {
    async fn list_objects(
        &self,
        _coordinate: &BucketCoordinate,
        prefix: &str,
        start: Option<&str>,
        limit: usize,
    ) -> Result<ListingPage, StorageError> {
        let mut state = self.state();
        state.calls.push(StorageCall::List {
            prefix: prefix.to_owned(),
            start: start.map(str::to_owned),
            limit,
        });

        let call = state
            .calls
            .iter()
            .filter(|call| matches!(call, StorageCall::List { .. }))
            .count();
        if state.failing_list_calls.contains(&call) {
            return Err(StorageError::service(
                format!("listing request {call} failed"),
                LABEL,
                true,
            ));
        }

        let page_size = state
            .page_size
            .unwrap_or(limit)
            .min(limit)
            .clamp(1, MAX_PAGE_SIZE);
        let mut matching = state
            .objects
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .filter(|(name, _)| start.is_none_or(|cursor| name.as_str() > cursor))
            .map(|(_, (descriptor, _))| descriptor.clone());

        let objects: Vec<_> = matching.by_ref().take(page_size).collect();
        let has_more = matching.next().is_some();
        let next_start_with = if has_more {
            objects.last().map(|object| object.name.clone())
        } else {
            None
        };

        Ok(ListingPage::new(objects, next_start_with))
    }

    async fn get_object(
        &self,
        _coordinate: &BucketCoordinate,
        object_name: &str,
    ) -> Result<Bytes, StorageError> {
        let mut state = self.state();
        state.calls.push(StorageCall::Get {
            name: object_name.to_owned(),
        });

        if state.failing_gets.contains(object_name) {
            return Err(StorageError::service(
                format!("retrieval of '{object_name}' failed"),
                LABEL,
                true,
            ));
        }

        match state.objects.get(object_name) {
            Some((_, data)) => Ok(data.clone()),
            None => Err(StorageError::not_found(
                format!("object '{object_name}' does not exist"),
                LABEL,
            )),
        }
    }
}
