use dotsetup::sync::{parse_stash_file_name, stash_file_name};
use dotsetup::utils::paths::{escape_dotfile_path, unescape_dotfile_path};
use dotsetup::utils::should_ignore;
use proptest::prelude::*;
use std::path::PathBuf;

fn dot_segment() -> impl Strategy<Value = String> {
    "\\.[a-z0-9][a-z0-9._-]{0,8}"
}

fn plain_segment() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9.-]{0,8}"
}

fn dotfile_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop_oneof![dot_segment(), plain_segment()], 1..5)
}

proptest! {
    #[test]
    fn test_escape_round_trips_dotfile_paths(segments in dotfile_path()) {
        let path = segments.join("/");
        let escaped = escape_dotfile_path(&path);

        prop_assert_eq!(unescape_dotfile_path(&escaped), path);
        prop_assert_eq!(escaped.split('/').count(), segments.len());
        prop_assert!(escaped.split('/').all(|s| !s.starts_with('.')));
    }

    #[test]
    fn test_escape_leaves_plain_paths_alone(
        segments in prop::collection::vec(plain_segment(), 1..5)
    ) {
        let path = segments.join("/");
        prop_assert_eq!(escape_dotfile_path(&path), path.clone());
        prop_assert_eq!(escape_dotfile_path(&escape_dotfile_path(&path)), path);
    }

    #[test]
    fn test_stash_name_parses_back(
        prefix in "[a-z][a-z-]{0,10}",
        n in 1u32..100_000,
        name in "[_a-z0-9][_a-z0-9.-]{0,12}",
    ) {
        let file_name = stash_file_name(&prefix, n, &name);
        prop_assert_eq!(parse_stash_file_name(&prefix, &file_name), Some((n, name.as_str())));
    }

    #[test]
    fn test_tracked_names_are_not_stash_files(
        prefix in "[a-z][a-z-]{0,10}",
        segment in dot_segment(),
    ) {
        let escaped = escape_dotfile_path(&segment);
        prop_assert_eq!(parse_stash_file_name(&prefix, &escaped), None);
    }

    #[test]
    fn test_ignored_component_anywhere(
        before in prop::collection::vec(plain_segment(), 0..3),
        after in prop::collection::vec(plain_segment(), 0..3),
    ) {
        let mut path = PathBuf::new();
        for segment in &before {
            path.push(segment);
        }
        path.push(".git");
        for segment in &after {
            path.push(segment);
        }

        prop_assert!(should_ignore(&path, &[".git".to_string()]));
        prop_assert!(!should_ignore(&path, &["_tasks".to_string()]));
    }
}
