//! Cursor-based paging over [`ObjectStore::list`].
//!
//! `object_store` lists by path segment and streams results lazily. Pages are
//! cut from that stream: the listing starts after the cursor (the last name of
//! the previous page) and stops once one object beyond the page limit has
//! been seen, which proves that another page exists.

use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::path::Path;

use super::MAX_PAGE_SIZE;
use crate::types::error::from_object_store;
use crate::types::{ListingPage, ObjectDescriptor, StorageError};

/// Lists one page of objects whose names start with `prefix`.
///
/// Requires a backend that lists in lexicographic key order (S3-compatible
/// services, [`InMemory`](object_store::memory::InMemory)).
pub(crate) async fn list_page(
    store: &dyn ObjectStore,
    prefix: &str,
    start: Option<&str>,
    limit: usize,
) -> Result<ListingPage, StorageError> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let root = listing_root(prefix);

    let offset = start.map(object_path).transpose()?;
    let mut stream = match &offset {
        Some(offset) => store.list_with_offset(root.as_ref(), offset),
        None => store.list(root.as_ref()),
    };

    let mut objects = Vec::with_capacity(limit.min(64));
    let mut has_more = false;

    while let Some(meta) = stream.try_next().await.map_err(from_object_store)? {
        if !meta.location.as_ref().starts_with(prefix) {
            continue;
        }

        if objects.len() == limit {
            has_more = true;
            break;
        }

        objects.push(ObjectDescriptor::from(&meta));
    }

    let next_start_with = if has_more {
        objects.last().map(|object| object.name.clone())
    } else {
        None
    };

    Ok(ListingPage::new(objects, next_start_with))
}

/// Turns an object name as reported by a listing back into a store path.
///
/// Listed names are raw keys, so they are parsed as is and never
/// percent-encoded again.
pub(crate) fn object_path(name: &str) -> Result<Path, StorageError> {
    Path::parse(name).map_err(|err| {
        StorageError::service(format!("invalid object name '{name}'"), "object-store", false)
            .with_source(err)
    })
}

/// Returns the deepest directory that contains every key matching `prefix`.
///
/// `object_store` prefixes match whole path segments, so a raw string prefix
/// such as `reports/2024-0` is listed from `reports` and filtered by name.
/// A directory that is not a valid path lists from the root.
fn listing_root(prefix: &str) -> Option<Path> {
    let (directory, _) = prefix.rsplit_once('/')?;
    let directory = directory.trim_matches('/');
    if directory.is_empty() {
        None
    } else {
        Path::parse(directory).ok()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use object_store::PutPayload;
    use object_store::memory::InMemory;

    use super::*;

    async fn store_with(keys: &[&str]) -> InMemory {
        let store = InMemory::new();
        for key in keys {
            store
                .put(&Path::parse(*key).unwrap(), PutPayload::from(Bytes::from_static(b"x")))
                .await
                .unwrap();
        }
        store
    }

    fn names(page: &ListingPage) -> Vec<&str> {
        page.objects.iter().map(|o| o.name.as_str()).collect()
    }

    #[test]
    fn listing_root_from_prefix() {
        assert_eq!(listing_root(""), None);
        assert_eq!(listing_root("report"), None);
        assert_eq!(listing_root("docs/"), Some(Path::from("docs")));
        assert_eq!(listing_root("docs/2024/q"), Some(Path::from("docs/2024")));
        assert_eq!(listing_root("100%/a"), Some(Path::parse("100%").unwrap()));
        assert_eq!(listing_root("a//b/"), None);
    }

    #[test]
    fn object_path_keeps_raw_keys() {
        let path = object_path("reports/Q1 #2 100%.txt").unwrap();
        assert_eq!(path.as_ref(), "reports/Q1 #2 100%.txt");

        let err = object_path("a//b").unwrap_err();
        assert_eq!(err.kind(), crate::types::StorageErrorKind::Service);
    }

    #[tokio::test]
    async fn cursor_with_reserved_characters() {
        let store = store_with(&["a#", "a#b", "b"]).await;

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = list_page(&store, "", cursor.as_deref(), 1).await.unwrap();
            seen.extend(page.objects.iter().map(|o| o.name.clone()));
            match page.next_start_with {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(seen, ["a#", "a#b", "b"]);
    }

    #[tokio::test]
    async fn prefix_with_reserved_characters() {
        let store = store_with(&["100%/a.txt", "100%/b.txt", "plain/c.txt"]).await;
        let page = list_page(&store, "100%/", None, 10).await.unwrap();
        assert_eq!(names(&page), ["100%/a.txt", "100%/b.txt"]);
    }

    #[tokio::test]
    async fn pages_through_all_objects() {
        let store = store_with(&["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"]).await;

        let first = list_page(&store, "", None, 2).await.unwrap();
        assert_eq!(names(&first), ["a.txt", "b.txt"]);
        assert_eq!(first.next_start_with.as_deref(), Some("b.txt"));

        let second = list_page(&store, "", first.next_start_with.as_deref(), 2)
            .await
            .unwrap();
        assert_eq!(names(&second), ["c.txt", "d.txt"]);

        let third = list_page(&store, "", second.next_start_with.as_deref(), 2)
            .await
            .unwrap();
        assert_eq!(names(&third), ["e.txt"]);
        assert!(third.is_final());
    }

    #[tokio::test]
    async fn exact_fit_has_no_cursor() {
        let store = store_with(&["a.txt", "b.txt"]).await;
        let page = list_page(&store, "", None, 2).await.unwrap();
        assert_eq!(names(&page), ["a.txt", "b.txt"]);
        assert!(page.is_final());
    }

    #[tokio::test]
    async fn raw_string_prefix() {
        let store = store_with(&[
            "docs/2023-12.pdf",
            "docs/2024-01.pdf",
            "docs/2024-02.pdf",
            "images/2024-01.png",
        ])
        .await;

        let page = list_page(&store, "docs/2024", None, 10).await.unwrap();
        assert_eq!(names(&page), ["docs/2024-01.pdf", "docs/2024-02.pdf"]);

        let page = list_page(&store, "im", None, 10).await.unwrap();
        assert_eq!(names(&page), ["images/2024-01.png"]);
    }

    #[tokio::test]
    async fn empty_store() {
        let store = InMemory::new();
        let page = list_page(&store, "", None, MAX_PAGE_SIZE).await.unwrap();
        assert!(page.is_empty());
        assert!(page.is_final());
    }

    #[tokio::test]
    async fn descriptors_carry_size() {
        let store = store_with(&["nested/dir/file.json"]).await;
        let page = list_page(&store, "nested/", None, 10).await.unwrap();
        assert_eq!(page.objects[0].size, Some(1));
        assert!(page.objects[0].etag.is_some());
    }
}
