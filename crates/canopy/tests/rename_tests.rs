//! Integration tests for the in-place rename workflow, driven through the
//! session the way a list view would drive it.

mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use canopy::{
    BrowserConfig, BrowserInput, BrowserSession, EditorRequest, FileSystem, LocalFileSystem,
    ManualClock, RenameOutcome,
};
use common::{ScriptedFileSystem, record, setup_test_dir};
use tempfile::TempDir;

const HOLD: Duration = Duration::from_millis(1000);

fn session_with(temp: &TempDir, fs: Arc<dyn FileSystem>) -> (Arc<ManualClock>, BrowserSession) {
    let clock = Arc::new(ManualClock::new());
    let config = BrowserConfig::new()
        .start_path(temp.path())
        .watch_changes(false);
    let session = BrowserSession::with_parts(config, fs, clock.clone()).unwrap();
    (clock, session)
}

fn session(temp: &TempDir) -> (Arc<ManualClock>, BrowserSession) {
    session_with(temp, Arc::new(LocalFileSystem))
}

fn long_press(session: &mut BrowserSession, clock: &ManualClock, index: usize) {
    session.dispatch(BrowserInput::PointerDown(index)).unwrap();
    clock.advance(HOLD);
    session.dispatch(BrowserInput::PointerUp).unwrap();
}

fn names(session: &BrowserSession) -> Vec<String> {
    session
        .navigator()
        .entries()
        .iter()
        .map(|e| e.name().to_string())
        .collect()
}

#[test]
fn test_long_press_opens_editor_on_base_name() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);
    let opened = record(&session.rename().signals().session_opened);

    long_press(&mut session, &clock, 3);

    assert_eq!(
        *opened.lock(),
        vec![EditorRequest {
            row: 3,
            text: "a".to_string(),
            selection: 0..1,
        }]
    );
    assert_eq!(session.rename().session().unwrap().extension(), Some("txt"));
}

#[test]
fn test_hidden_and_extensionless_names_are_edited_whole() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);

    long_press(&mut session, &clock, 2);
    assert_eq!(session.rename().session().unwrap().edit_buffer(), ".hidden");

    long_press(&mut session, &clock, 5);
    assert_eq!(session.rename().session().unwrap().edit_buffer(), "readme");
    assert_eq!(session.rename().session().unwrap().extension(), None);
}

#[test]
fn test_rename_round_trip_restores_listing() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);
    let before = names(&session);

    long_press(&mut session, &clock, 3);
    session
        .dispatch(BrowserInput::RenameCommitRequested("b".to_string()))
        .unwrap();
    assert!(temp.path().join("b.txt").is_file());
    assert!(!temp.path().join("a.txt").exists());

    let row = session.navigator().entry_list().unwrap().index_of("b.txt").unwrap();
    long_press(&mut session, &clock, row);
    session
        .dispatch(BrowserInput::RenameCommitRequested("a".to_string()))
        .unwrap();

    assert_eq!(names(&session), before);
    assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "alpha");
}

#[test]
fn test_rename_refreshes_through_navigation_changed() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);
    let changes = record(&session.navigator().signals().navigation_changed);

    long_press(&mut session, &clock, 3);
    session
        .dispatch(BrowserInput::RenameCommitRequested("zeta".to_string()))
        .unwrap();

    let changes = changes.lock();
    assert_eq!(changes.len(), 1);
    let (path, list) = &changes[0];
    assert_eq!(path, temp.path());
    assert_eq!(list.names().last(), Some(&"zeta.txt"));
}

#[test]
fn test_conflict_leaves_both_entries() {
    let temp = setup_test_dir();
    fs::write(temp.path().join("taken.txt"), "taken").unwrap();
    let (clock, mut session) = session(&temp);
    let failures = record(&session.rename().signals().rename_failed);
    let closed = record(&session.rename().signals().session_closed);
    let before = names(&session);

    long_press(&mut session, &clock, 3);
    let err = session
        .dispatch(BrowserInput::RenameCommitRequested("taken".to_string()))
        .unwrap_err();

    assert!(err.is_name_conflict());
    assert_eq!(failures.lock().len(), 1);
    assert_eq!(*closed.lock(), vec![RenameOutcome::Failed]);
    assert!(!session.rename().is_editing());
    assert_eq!(names(&session), before);
    assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(temp.path().join("taken.txt")).unwrap(), "taken");
}

#[test]
fn test_denied_rename_reports_failure() {
    let temp = setup_test_dir();
    let scripted = ScriptedFileSystem::new();
    scripted.deny(&temp.path().join("a.txt"));
    let (clock, mut session) = session_with(&temp, scripted);
    let failures = record(&session.rename().signals().rename_failed);

    long_press(&mut session, &clock, 3);
    let err = session
        .dispatch(BrowserInput::RenameCommitRequested("b".to_string()))
        .unwrap_err();

    assert!(err.is_access_denied());
    assert_eq!(failures.lock().len(), 1);
    assert!(temp.path().join("a.txt").exists());
    assert_eq!(session.navigator().entry_list().unwrap().index_of("a.txt"), Some(3));
}

#[test]
fn test_blank_or_unchanged_text_touches_nothing() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);
    let changes = record(&session.navigator().signals().navigation_changed);

    for text in ["", "a", "  "] {
        long_press(&mut session, &clock, 3);
        session
            .dispatch(BrowserInput::RenameCommitRequested(text.to_string()))
            .unwrap();
        assert!(!session.rename().is_editing());
    }
    assert!(temp.path().join("a.txt").exists());
    assert!(changes.lock().is_empty());
}

#[test]
fn test_second_long_press_cancels_first_session() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);
    let closed = record(&session.rename().signals().session_closed);

    long_press(&mut session, &clock, 3);
    session
        .dispatch(BrowserInput::RenameEdited("half-typed".to_string()))
        .unwrap();
    long_press(&mut session, &clock, 4);

    assert_eq!(*closed.lock(), vec![RenameOutcome::Cancelled]);
    assert_eq!(session.rename().session().unwrap().row(), 4);
    assert!(temp.path().join("a.txt").exists());
    assert!(!temp.path().join("half-typed.txt").exists());
}

#[test]
fn test_long_press_on_missing_row_is_ignored() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);

    long_press(&mut session, &clock, 40);
    assert!(!session.rename().is_editing());
}

#[test]
fn test_focus_loss_commits() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);

    long_press(&mut session, &clock, 4);
    session
        .dispatch(BrowserInput::RenameEdited("cover".to_string()))
        .unwrap();
    session.dispatch(BrowserInput::RenameFocusLost).unwrap();

    assert!(temp.path().join("cover.png").exists());
    assert!(!session.rename().is_editing());
}

#[test]
fn test_cancel_request_discards_edit() {
    let temp = setup_test_dir();
    let (clock, mut session) = session(&temp);

    long_press(&mut session, &clock, 4);
    session
        .dispatch(BrowserInput::RenameEdited("cover".to_string()))
        .unwrap();
    session.dispatch(BrowserInput::RenameCancelRequested).unwrap();

    assert!(temp.path().join("B.png").exists());
    assert!(!session.rename().is_editing());
}
