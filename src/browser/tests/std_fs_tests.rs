use std::fs;
use tempfile::TempDir;

use crate::browser::*;

/// Helper: temp tree with `sub/`, `sub/inner.sfc` and `a.txt`
fn create_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("sub")).unwrap();
    fs::write(temp_dir.path().join("sub").join("inner.sfc"), b"rom").unwrap();
    fs::write(temp_dir.path().join("a.txt"), b"text").unwrap();
    temp_dir
}

fn std_fs() -> StdFileSystem {
    StdFileSystem::with_volumes(Vec::new())
}

#[test]
fn test_real_directory_listing() {
    let temp_dir = create_tree();
    let session =
        BrowseSession::open(std_fs(), Some(temp_dir.path()), BrowseOptions::new()).unwrap();

    let kinds: Vec<_> = session.entries().iter().map(Entry::kind).collect();
    assert_eq!(kinds, [EntryKind::Parent, EntryKind::Directory, EntryKind::File]);
    assert_eq!(session.entries()[1].path(), temp_dir.path().join("sub"));
    assert_eq!(session.entries()[2].display_name(), "a.txt");
}

#[test]
fn test_real_enter_and_return() {
    let temp_dir = create_tree();
    let mut session =
        BrowseSession::open(std_fs(), Some(temp_dir.path()), BrowseOptions::new()).unwrap();
    let initial = session.entries().to_vec();

    session.enter_directory(temp_dir.path().join("sub")).unwrap();
    assert_eq!(session.entries().last().unwrap().display_name(), "inner.sfc");

    assert_eq!(session.go_to_parent().unwrap(), ParentStep::Popped);
    assert_eq!(session.entries(), initial.as_slice());
}

#[test]
fn test_real_enter_file_is_rejected() {
    let temp_dir = create_tree();
    let mut session =
        BrowseSession::open(std_fs(), Some(temp_dir.path()), BrowseOptions::new()).unwrap();

    let result = session.enter_directory(temp_dir.path().join("a.txt"));
    assert!(matches!(result, Err(BrowserError::InvalidDirectory(_))));
}

#[test]
fn test_real_select_directory() {
    let temp_dir = create_tree();
    let options = BrowseOptions::new().directory_target(true);
    let mut session = BrowseSession::open(std_fs(), Some(temp_dir.path()), options).unwrap();
    session.enter_directory(temp_dir.path().join("sub")).unwrap();

    match session.activate(0) {
        Ok(Step::Closed(outcome)) => {
            assert_eq!(outcome, BrowseOutcome::Directory(temp_dir.path().join("sub")));
        }
        other => panic!("Expected directory selection, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_real_directory_removed_while_browsing() {
    let temp_dir = create_tree();
    let mut session =
        BrowseSession::open(std_fs(), Some(temp_dir.path()), BrowseOptions::new()).unwrap();
    session.enter_directory(temp_dir.path().join("sub")).unwrap();

    // Removing the listed directory fails the refresh but keeps the back-stack
    let start = temp_dir.path().to_path_buf();
    let sub = start.join("sub");
    fs::remove_file(start.join("a.txt")).unwrap();
    fs::remove_file(sub.join("inner.sfc")).unwrap();
    fs::remove_dir(&sub).unwrap();

    assert!(matches!(session.refresh(), Err(BrowserError::InvalidDirectory(_))));
    assert_eq!(session.current_dir(), sub.as_path());
    assert_eq!(session.depth(), 2);
}
