//! Integration tests for directory listing, the list provider and the
//! non-empty directory filter.

mod common;

use std::fs;
use std::sync::Arc;

use canopy::{
    EntryFilter, EntryProvider, EntryRepository, LocalFileSystem, NonEmptyDirectoryFilter,
};
use common::{ScriptedFileSystem, record, setup_test_dir};
use tempfile::TempDir;

fn repository(filter: EntryFilter) -> EntryRepository {
    EntryRepository::new(Arc::new(LocalFileSystem), filter)
}

#[test]
fn test_directories_sort_before_files() {
    let temp = TempDir::new().unwrap();
    // Case-insensitive: Apple.txt < banana.txt < cherry < Date
    fs::create_dir(temp.path().join("Date")).unwrap();
    fs::create_dir(temp.path().join("cherry")).unwrap();
    fs::write(temp.path().join("banana.txt"), "").unwrap();
    fs::write(temp.path().join("Apple.txt"), "").unwrap();

    let list = repository(EntryFilter::all()).list(temp.path()).unwrap();
    assert_eq!(list.names(), vec!["cherry", "Date", "Apple.txt", "banana.txt"]);
}

#[test]
fn test_listing_is_idempotent() {
    let temp = setup_test_dir();
    let repo = repository(EntryFilter::all());

    let first = repo.list(temp.path()).unwrap();
    let second = repo.list(temp.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.names(),
        vec!["Archive", "docs", ".hidden", "a.txt", "B.png", "readme"]
    );
}

#[test]
fn test_files_only_filter() {
    let temp = setup_test_dir();
    let list = repository(EntryFilter::files_only()).list(temp.path()).unwrap();
    assert_eq!(list.names(), vec!["a.txt", "B.png", "readme"]);
}

#[test]
fn test_missing_path_is_not_found() {
    let temp = setup_test_dir();
    let repo = repository(EntryFilter::all());

    assert!(repo.list(&temp.path().join("missing")).unwrap_err().is_not_found());
    assert!(repo.list(&temp.path().join("a.txt")).unwrap_err().is_not_found());
}

#[test]
fn test_denied_enumeration_is_access_error() {
    let temp = setup_test_dir();
    let fs = ScriptedFileSystem::new();
    fs.deny(&temp.path().join("docs"));
    let repo = EntryRepository::new(fs, EntryFilter::all());

    let err = repo.list(&temp.path().join("docs")).unwrap_err();
    assert!(err.is_access_denied());
    assert!(repo.list(temp.path()).is_ok());
}

#[test]
fn test_failed_load_keeps_displayed_list() {
    let temp = setup_test_dir();
    let mut repo = repository(EntryFilter::all());
    repo.load(temp.path()).unwrap();
    let resets = record(&repo.signals().model_reset);

    assert!(repo.load(&temp.path().join("missing")).is_err());
    assert_eq!(repo.current_path(), Some(temp.path()));
    assert_eq!(repo.count(), 6);
    assert!(resets.lock().is_empty());
}

#[test]
fn test_refresh_picks_up_changes() {
    let temp = setup_test_dir();
    let mut repo = repository(EntryFilter::files_only());
    repo.load(temp.path()).unwrap();
    let about = record(&repo.signals().model_about_to_reset);
    let resets = record(&repo.signals().model_reset);

    fs::write(temp.path().join("c.txt"), "").unwrap();
    repo.refresh().unwrap();

    assert_eq!(repo.count(), 4);
    assert_eq!(repo.get(2).map(|e| e.name()), Some("c.txt"));
    assert_eq!(about.lock().len(), 1);
    assert_eq!(resets.lock().len(), 1);
}

#[test]
fn test_files_only_directory_has_no_children() {
    let temp = setup_test_dir();
    let filter = NonEmptyDirectoryFilter::new(Arc::new(LocalFileSystem));

    let docs = temp.path().join("docs");
    assert!(!repository(EntryFilter::all()).list(&docs).unwrap().is_empty());
    assert!(!filter.has_children(&docs));
    assert!(filter.has_children(&temp.path().join("Archive")));
}

#[test]
fn test_non_empty_filter_follows_filesystem() {
    let temp = setup_test_dir();
    let filter = NonEmptyDirectoryFilter::new(Arc::new(LocalFileSystem));
    let docs = temp.path().join("docs");

    assert!(!filter.has_children(&docs));
    fs::create_dir(docs.join("old")).unwrap();
    assert!(filter.has_children(&docs));
}

#[test]
fn test_non_empty_filter_treats_denied_as_leaf() {
    let temp = setup_test_dir();
    let fs = ScriptedFileSystem::new();
    let archive = temp.path().join("Archive");
    fs.deny(&archive);

    let filter = NonEmptyDirectoryFilter::new(fs.clone());
    assert!(!filter.has_children(&archive));
    fs.allow(&archive);
    assert!(filter.has_children(&archive));
}
