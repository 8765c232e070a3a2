//! Line-oriented id/text input (spec.md §3, §6): `UID<whitespace>TEXT`, one
//! record per line, TEXT possibly empty.

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub uid: String,
    pub text: String,
}

/// `uid -> Utterance`, iterated in sorted-uid order for determinism
/// (spec.md §3: "insertion order irrelevant").
#[derive(Debug, Clone, Default)]
pub struct UtteranceSet {
    by_uid: BTreeMap<String, Utterance>,
}

impl UtteranceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uid: &str) -> Option<&Utterance> {
        self.by_uid.get(uid)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.by_uid.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }

    /// Utterances in sorted-uid order.
    pub fn iter(&self) -> impl Iterator<Item = &Utterance> {
        self.by_uid.values()
    }

    /// Parse a Kaldi-archive text file. Duplicate uids are fatal.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|source| CoreError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;

        let mut set = Self::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let (uid, text) = match line.split_once(char::is_whitespace) {
                Some((uid, rest)) => (uid.to_string(), rest.trim().to_string()),
                None => (line.trim().to_string(), String::new()),
            };
            if set.by_uid.contains_key(&uid) {
                return Err(CoreError::DuplicateUid {
                    uid,
                    path: path_ref.display().to_string(),
                });
            }
            set.by_uid.insert(uid.clone(), Utterance { uid, text });
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_records_including_empty_text() {
        let f = write_tmp("u1 HEY I AM HERE\nu2\nu3   \n");
        let set = UtteranceSet::load(f.path()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("u1").unwrap().text, "HEY I AM HERE");
        assert_eq!(set.get("u2").unwrap().text, "");
        assert_eq!(set.get("u3").unwrap().text, "");
    }

    #[test]
    fn duplicate_uid_is_fatal() {
        let f = write_tmp("u1 foo\nu1 bar\n");
        let err = UtteranceSet::load(f.path()).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateUid { .. }));
    }

    #[test]
    fn sorted_iteration_order() {
        let f = write_tmp("zzz a\naaa b\nmmm c\n");
        let set = UtteranceSet::load(f.path()).unwrap();
        let uids: Vec<&str> = set.iter().map(|u| u.uid.as_str()).collect();
        assert_eq!(uids, vec!["aaa", "mmm", "zzz"]);
    }
}
