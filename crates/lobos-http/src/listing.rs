//! Listing Engine (`spec.md` §4.4): prefix + `/`-delimiter semantics,
//! index-backed when the index is enabled, filesystem-backed otherwise.

use std::collections::HashSet;
use std::path::Path;

use lobos_index::{Kind, KeyIndex};
use lobos_xml::listing::{CommonPrefix, Contents, Entry, ListBucketResult};

/// Produce the `ListBucketResult` for `GET /{b}?list-type=2&prefix={prefix}`.
/// Delegates to the index-backed algorithm when `index` is `Some`, else
/// falls back to walking the filesystem rooted at `fs_root`.
#[must_use]
pub fn list(index: Option<&KeyIndex>, fs_root: &Path, prefix: &str, bucket_name: &str) -> ListBucketResult {
    let entries = match index {
        Some(index) => list_index(index, prefix),
        None => list_fs(fs_root, prefix),
    };
    ListBucketResult { name: bucket_name.to_owned(), prefix: prefix.to_owned(), entries }
}

fn list_index(index: &KeyIndex, prefix: &str) -> Vec<Entry> {
    let view = index.view();
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut last_common_prefix: Option<String> = None;

    for (key, object) in view.range(prefix.to_owned()..) {
        if !key.starts_with(prefix) {
            break;
        }
        let rest = &key[prefix.len()..];
        match rest.find('/') {
            Some(pos) => {
                let candidate = &key[..prefix.len() + pos];
                if last_common_prefix.as_deref() != Some(candidate) {
                    entries.push(Entry::CommonPrefix(CommonPrefix { prefix: format!("{candidate}/") }));
                    last_common_prefix = Some(candidate.to_owned());
                }
            }
            None => {
                if object.kind == Kind::Dir {
                    entries.push(Entry::CommonPrefix(CommonPrefix { prefix: format!("{key}/") }));
                } else if seen.insert(key.clone()) {
                    entries.push(Entry::Contents(Contents {
                        key: key.clone(),
                        last_modified: object.mtime,
                        size: object.size,
                    }));
                }
            }
        }
    }
    entries
}

fn list_fs(root: &Path, prefix: &str) -> Vec<Entry> {
    let candidate = if prefix.is_empty() { root.to_path_buf() } else { root.join(prefix) };
    let (dir, name_filter) = if candidate.is_dir() {
        (candidate, String::new())
    } else if let Some(pos) = prefix.find('/') {
        (root.join(&prefix[..pos]), prefix[pos + 1..].to_owned())
    } else {
        (root.to_path_buf(), prefix.to_owned())
    };

    let Ok(read_dir) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for entry in read_dir.flatten() {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !name_filter.is_empty() && !file_name.starts_with(&name_filter) {
            continue;
        }
        let Ok(file_type) = entry.file_type() else { continue };
        if file_type.is_dir() {
            entries.push(Entry::CommonPrefix(CommonPrefix { prefix: format!("{file_name}/") }));
        } else if file_type.is_file() {
            let Ok(metadata) = entry.metadata() else { continue };
            entries.push(Entry::Contents(Contents {
                key: file_name,
                last_modified: lobos_index::mtime_secs(&metadata),
                size: metadata.len(),
            }));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use lobos_index::Object;

    use super::*;

    fn entry_keys(entries: &[Entry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| match e {
                Entry::Contents(c) => c.key.clone(),
                Entry::CommonPrefix(cp) => cp.prefix.clone(),
            })
            .collect()
    }

    #[test]
    fn index_backed_top_level_listing_separates_files_and_dirs() {
        let index = KeyIndex::empty();
        index.add_entry("a.txt", Object::file(3, 1));
        index.add_entry("d1", Object::dir(1));
        index.add_entry("d1/b.txt", Object::file(1, 1));
        index.add_entry("d1/c.txt", Object::file(1, 1));

        let entries = list_index(&index, "");
        assert_eq!(entry_keys(&entries), vec!["a.txt", "d1/"]);
    }

    #[test]
    fn index_backed_listing_under_a_prefix_lists_only_its_children() {
        let index = KeyIndex::empty();
        index.add_entry("a.txt", Object::file(3, 1));
        index.add_entry("d1/b.txt", Object::file(1, 1));
        index.add_entry("d1/c.txt", Object::file(1, 1));

        let entries = list_index(&index, "d1/");
        assert_eq!(entry_keys(&entries), vec!["d1/b.txt", "d1/c.txt"]);
    }

    #[test]
    fn index_backed_listing_suppresses_duplicate_common_prefixes() {
        let index = KeyIndex::empty();
        index.add_entry("d1/a.txt", Object::file(1, 1));
        index.add_entry("d1/b.txt", Object::file(1, 1));
        index.add_entry("d1/c/d.txt", Object::file(1, 1));

        let entries = list_index(&index, "");
        assert_eq!(entry_keys(&entries), vec!["d1/"]);
    }
}
