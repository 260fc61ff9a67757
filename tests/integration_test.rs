use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use parfind::{search, Candidate, FindError, Matcher, RawFlags};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create the nested fixture tree.
///
/// Structure:
/// ```
/// tmp/
///   a.txt
///   sub/
///     b.log
///     subsub/
///       c.txt
/// ```
fn nested_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("a.txt"), "alpha").unwrap();
    fs::create_dir_all(root.join("sub/subsub")).unwrap();
    fs::write(root.join("sub/b.log"), "bravo").unwrap();
    fs::write(root.join("sub/subsub/c.txt"), "charlie").unwrap();

    dir
}

/// Create the two-directory fixture.
///
/// Structure:
/// ```
/// tmp/
///   dirA/
///     file1.txt   (5 bytes)
///   dirB/
///     file2.log   (10 bytes, contains "hello")
/// ```
fn two_dirs() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::create_dir(root.join("dirA")).unwrap();
    fs::create_dir(root.join("dirB")).unwrap();
    fs::write(root.join("dirA/file1.txt"), "12345").unwrap();
    fs::write(root.join("dirB/file2.log"), "hello\n1234").unwrap();

    dir
}

fn set(root: &Path, rel: &[&str]) -> BTreeSet<PathBuf> {
    rel.iter().map(|r| root.join(r)).collect()
}

/// Run a search and collect every streamed path, asserting none repeats.
fn stream_all(builder: parfind::SearchBuilder) -> BTreeSet<PathBuf> {
    let search = builder.spawn().unwrap();
    let mut seen = HashMap::new();
    for path in &search {
        *seen.entry(path).or_insert(0) += 1;
    }
    assert!(search.recv().is_none(), "nothing may arrive after closure");

    let results = search.wait().unwrap();
    assert_eq!(results.matches, seen.len());
    assert!(seen.values().all(|&n| n == 1), "duplicate match: {seen:?}");
    seen.into_keys().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn wildcard_search_finds_each_match_exactly_once() {
    let dir = nested_tree();
    let found = stream_all(search().root(dir.path()).name("*.txt"));
    assert_eq!(found, set(dir.path(), &["a.txt", "sub/subsub/c.txt"]));
}

#[test]
fn unconstrained_search_returns_every_reachable_file() {
    let dir = nested_tree();
    for i in 0..20 {
        let branch = dir.path().join(format!("wide/{i}/deeper"));
        fs::create_dir_all(&branch).unwrap();
        fs::write(branch.join(format!("f{i}.dat")), vec![0u8; i]).unwrap();
        fs::write(dir.path().join(format!("wide/{i}/.hidden")), "").unwrap();
    }

    let expected: BTreeSet<PathBuf> = walkdir::WalkDir::new(dir.path())
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    let found = stream_all(search().root(dir.path()).threads(4));
    assert_eq!(found.len(), 3 + 40);
    assert_eq!(found, expected);
}

#[test]
fn depth_one_stays_in_root() {
    let dir = nested_tree();
    let found = stream_all(search().root(dir.path()).max_depth(1));
    assert_eq!(found, set(dir.path(), &["a.txt"]));
}

#[test]
fn depth_two_reaches_one_level_down() {
    let dir = nested_tree();
    let found = stream_all(search().root(dir.path()).max_depth(2));
    assert_eq!(found, set(dir.path(), &["a.txt", "sub/b.log"]));
}

#[test]
fn end_to_end_by_name_content_and_size() {
    let dir = two_dirs();
    let root = dir.path();

    let by_name = stream_all(search().root(root).name("*.txt"));
    assert_eq!(by_name, set(root, &["dirA/file1.txt"]));

    let by_content = stream_all(search().root(root).content("hello"));
    assert_eq!(by_content, set(root, &["dirB/file2.log"]));

    let by_size = stream_all(search().root(root).min_size(10).max_size(10));
    assert_eq!(by_size, set(root, &["dirB/file2.log"]));
}

#[test]
fn size_bounds_are_inclusive_on_both_ends() {
    let dir = two_dirs();
    let root = dir.path();

    let at_min = stream_all(search().root(root).min_size(5));
    assert_eq!(at_min, set(root, &["dirA/file1.txt", "dirB/file2.log"]));

    let above_max = stream_all(search().root(root).max_size(4));
    assert!(above_max.is_empty());

    let below_min = stream_all(search().root(root).min_size(11));
    assert!(below_min.is_empty());
}

#[test]
fn case_folding_applies_to_names_and_content() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("report.txt"), "hello world").unwrap();

    let strict = stream_all(search().root(dir.path()).name("REPORT.TXT"));
    assert!(strict.is_empty());

    let by_name = stream_all(search().root(dir.path()).name("REPORT.TXT").ignore_case(true));
    assert_eq!(by_name, set(dir.path(), &["report.txt"]));

    let by_content = stream_all(search().root(dir.path()).content("Hello").ignore_case(true));
    assert_eq!(by_content, set(dir.path(), &["report.txt"]));
}

#[test]
fn raw_flags_drive_a_search() {
    let dir = nested_tree();
    let flags = RawFlags {
        name: "?.*".into(),
        depth: 2,
        ..RawFlags::default()
    };
    let found = stream_all(search().root(dir.path()).flags(&flags));
    assert_eq!(found, set(dir.path(), &["a.txt", "sub/b.log"]));
}

#[test]
fn run_collects_paths_and_stats() {
    let dir = nested_tree();
    let results = search()
        .root(dir.path())
        .collect_paths(true)
        .run()
        .unwrap();

    assert_eq!(results.matches, 3);
    assert_eq!(results.paths.len(), 3);
    assert_eq!(results.stats.files, 3);
    assert_eq!(results.stats.dirs, 3, "root, sub and subsub");
    assert!(results.errors.is_empty());
}

#[test]
fn paths_empty_when_not_collecting() {
    let dir = nested_tree();
    let results = search().root(dir.path()).name("*.txt").run().unwrap();

    assert!(results.paths.is_empty());
    assert_eq!(results.matches, 2, "matches are still counted");
}

#[test]
fn custom_matcher_replaces_predicates() {
    struct LogMatcher;
    impl Matcher for LogMatcher {
        fn is_match(&self, candidate: &Candidate) -> bool {
            candidate.path.extension().map(|e| e == "log").unwrap_or(false)
        }
    }

    let dir = nested_tree();
    let found = stream_all(search().root(dir.path()).name("*.txt").with_matcher(LogMatcher));
    assert_eq!(found, set(dir.path(), &["sub/b.log"]));
}

#[test]
fn missing_root_closes_stream_with_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let results = search()
        .root(&missing)
        .collect_errors(true)
        .run()
        .unwrap();

    assert_eq!(results.matches, 0);
    assert_eq!(results.errors.len(), 1);
    assert!(results.errors[0].is_recoverable());
}

#[test]
fn file_as_root_is_reported_not_matched() {
    let dir = nested_tree();
    let results = search()
        .root(dir.path().join("a.txt"))
        .collect_errors(true)
        .run()
        .unwrap();

    assert_eq!(results.matches, 0);
    assert!(matches!(results.errors.as_slice(), [FindError::NotADirectory(_)]));
}

#[test]
fn consumer_controls_the_pace() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10 {
        fs::write(dir.path().join(format!("{i}.txt")), "").unwrap();
    }

    let search = search().root(dir.path()).threads(2).spawn().unwrap();
    let first = search.recv().unwrap();
    assert!(first.starts_with(dir.path()));

    std::thread::sleep(std::time::Duration::from_millis(50));
    // Each worker can hold at most one match it is waiting to hand over.
    assert_eq!(search.published(), 1);

    let results = search.wait().unwrap();
    assert_eq!(results.matches, 10);
}

#[test]
fn dropping_the_stream_early_does_not_hang() {
    let dir = nested_tree();
    let search = search().root(dir.path()).spawn().unwrap();
    assert!(search.recv().is_some());
    drop(search);
}

#[cfg(unix)]
#[test]
fn unreadable_subtree_does_not_stop_siblings() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("locked")).unwrap();
    fs::create_dir_all(root.join("open/inner")).unwrap();
    fs::write(root.join("locked/secret.txt"), "x").unwrap();
    fs::write(root.join("open/visible.txt"), "x").unwrap();
    fs::write(root.join("open/inner/deep.txt"), "x").unwrap();
    fs::write(root.join("top.txt"), "x").unwrap();

    let locked = root.join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users read through mode 000; nothing to simulate then.
    // `unreadable_file_does_not_stop_siblings` covers isolation regardless.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        eprintln!("skipping: permission bits are not enforced for this user");
        return;
    }

    let results = search()
        .root(root)
        .name("*.txt")
        .collect_paths(true)
        .collect_errors(true)
        .run()
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let found: BTreeSet<PathBuf> = results.paths.into_iter().collect();
    assert_eq!(found, set(root, &["top.txt", "open/visible.txt", "open/inner/deep.txt"]));
    assert_eq!(results.errors.len(), 1);
    match &results.errors[0] {
        FindError::DirectoryRead { path, .. } => assert_eq!(path, &locked),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn unreadable_file_does_not_stop_siblings() {
    // A dangling symlink stats fine but cannot be read, whoever runs this.
    let dir = two_dirs();
    let root = dir.path();
    fs::create_dir(root.join("broken")).unwrap();
    fs::write(root.join("broken/also.log"), "hello again").unwrap();
    let dangling = root.join("broken/gone.log");
    std::os::unix::fs::symlink(root.join("missing"), &dangling).unwrap();

    let results = search()
        .root(root)
        .content("hello")
        .collect_paths(true)
        .collect_errors(true)
        .run()
        .unwrap();

    let found: BTreeSet<PathBuf> = results.paths.into_iter().collect();
    assert_eq!(found, set(root, &["dirB/file2.log", "broken/also.log"]));
    assert_eq!(results.errors.len(), 1);
    match &results.errors[0] {
        FindError::ContentRead { path, .. } => assert_eq!(path, &dangling),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(results.errors[0].is_recoverable());
}

#[cfg(unix)]
#[test]
fn symlinks_are_candidates_but_never_followed() {
    let dir = nested_tree();
    let root = dir.path();
    std::os::unix::fs::symlink(root.join("sub"), root.join("sub-link")).unwrap();

    let found = stream_all(search().root(root).name("*"));
    assert!(found.contains(&root.join("sub-link")));
    assert!(!found.iter().any(|p| p.starts_with(root.join("sub-link/"))));
    assert_eq!(found.len(), 4);
}
