//! Virtual path model.
//!
//! The backing store only knows flat keys; every hierarchy notion
//! (parent/child, folder vs file, breadcrumbs, prefix rewriting) lives here
//! as pure value-type logic, completely decoupled from the store client.
//!
//! Key layout: `user-{id}/<segments joined by '/'>`, with a trailing `/` on
//! folder keys. The user prefix is part of every fully-qualified key, so one
//! user can never address another user's objects as long as keys are only
//! ever built through this type.

use serde::Serialize;

use crate::error::VfsError;

pub const DELIMITER: char = '/';

/// A validated, user-scoped virtual path.
///
/// Value type, recomputed from caller input on every request and never
/// persisted. Two paths are equal iff their fully-qualified keys are equal,
/// which the derived `PartialEq` over the three fields guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    user_id: i64,
    segments: Vec<String>,
    is_folder: bool,
}

impl ObjectPath {
    /// The root folder of a user's namespace (key `user-{id}/`).
    pub fn root(user_id: i64) -> Self {
        Self {
            user_id,
            segments: Vec::new(),
            is_folder: true,
        }
    }

    /// Parses a caller-supplied relative path string.
    ///
    /// The empty string (or a bare `/`) is the user's root folder. A single
    /// leading `/` is tolerated; a trailing `/` marks a folder. Empty
    /// interior segments (`a//b`) and `.`/`..` segments are rejected.
    pub fn parse(raw: &str, user_id: i64) -> Result<Self, VfsError> {
        if raw.is_empty() || raw == "/" {
            return Ok(Self::root(user_id));
        }

        let is_folder = raw.ends_with(DELIMITER);
        let mut trimmed = raw.strip_prefix(DELIMITER).unwrap_or(raw);
        if is_folder {
            trimmed = &trimmed[..trimmed.len() - 1];
        }

        let mut segments = Vec::new();
        for segment in trimmed.split(DELIMITER) {
            if !is_valid_segment(segment) {
                return Err(VfsError::InvalidPath(raw.to_string()));
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            user_id,
            segments,
            is_folder,
        })
    }

    /// Reconstructs a path from a fully-qualified store key, the inverse of
    /// [`full_key`](Self::full_key). Used to map listing results back into
    /// path values.
    pub fn from_key(key: &str) -> Result<Self, VfsError> {
        let rest = key
            .strip_prefix("user-")
            .ok_or_else(|| VfsError::InvalidPath(key.to_string()))?;
        let (id, relative) = rest
            .split_once(DELIMITER)
            .ok_or_else(|| VfsError::InvalidPath(key.to_string()))?;
        let user_id: i64 = id
            .parse()
            .map_err(|_| VfsError::InvalidPath(key.to_string()))?;
        Self::parse(relative, user_id)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    pub fn is_file(&self) -> bool {
        !self.is_folder
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The fully-qualified store key, always starting with the user prefix
    /// and ending with the delimiter iff this is a folder.
    pub fn full_key(&self) -> String {
        let mut key = format!("user-{}{}", self.user_id, DELIMITER);
        key.push_str(&self.segments.join("/"));
        if self.is_folder && !self.segments.is_empty() {
            key.push(DELIMITER);
        }
        key
    }

    /// The user-visible relative path, e.g. `/docs/notes/` for a folder or
    /// `/docs/todo.txt` for a file. `parse(p.path())` round-trips.
    pub fn path(&self) -> String {
        if self.segments.is_empty() {
            return DELIMITER.to_string();
        }
        let mut path = format!("/{}", self.segments.join("/"));
        if self.is_folder {
            path.push(DELIMITER);
        }
        path
    }

    /// The last path segment, or `/` for the root folder.
    pub fn display_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("/")
    }

    /// The containing folder. The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self {
            user_id: self.user_id,
            segments,
            is_folder: true,
        }
    }

    /// A copy of this path with the folder marker set. Not a mutator.
    pub fn to_folder(&self) -> Self {
        Self {
            is_folder: true,
            ..self.clone()
        }
    }

    /// A copy of this path shaped as a file. Not a mutator; the root cannot
    /// be reshaped and is returned unchanged.
    pub fn to_file(&self) -> Self {
        if self.segments.is_empty() {
            return self.clone();
        }
        Self {
            is_folder: false,
            ..self.clone()
        }
    }

    /// Appends a single file name to this folder path.
    pub fn child_file(&self, name: &str) -> Result<Self, VfsError> {
        self.child(name, false)
    }

    /// Appends a single folder name to this folder path.
    pub fn child_folder(&self, name: &str) -> Result<Self, VfsError> {
        self.child(name, true)
    }

    fn child(&self, name: &str, is_folder: bool) -> Result<Self, VfsError> {
        if !self.is_folder {
            return Err(VfsError::NotAFolder(self.path()));
        }
        if !is_valid_segment(name) {
            return Err(VfsError::InvalidPath(name.to_string()));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self {
            user_id: self.user_id,
            segments,
            is_folder,
        })
    }

    /// Whether this path lives inside `other` (a folder). Reflexive: a
    /// folder is a descendant of itself.
    pub fn is_descendant_of(&self, other: &Self) -> bool {
        other.is_folder && self.full_key().starts_with(&other.full_key())
    }

    /// Rewrites this path when its ancestor folder `old` is renamed or moved
    /// to `new`: the `old` segment prefix is replaced by `new`'s segments.
    /// Callers must ensure `self.is_descendant_of(old)`.
    pub fn replace_prefix(&self, old: &Self, new: &Self) -> Self {
        let mut segments = new.segments.clone();
        segments.extend(self.segments[old.segments.len()..].iter().cloned());
        Self {
            user_id: new.user_id,
            segments,
            is_folder: self.is_folder,
        }
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_key())
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(DELIMITER)
        && !segment.contains('\0')
}

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// The ordered trail from the user's root down to `path` itself. Purely a
/// function of the segment list, no I/O.
pub fn breadcrumbs(path: &ObjectPath) -> Vec<Breadcrumb> {
    let mut trail = Vec::with_capacity(path.segments.len() + 1);
    let mut cursor = ObjectPath::root(path.user_id);
    trail.push(Breadcrumb {
        name: cursor.display_name().to_string(),
        path: cursor.path(),
    });
    for (i, segment) in path.segments.iter().enumerate() {
        let last = i + 1 == path.segments.len();
        cursor = step(&cursor, segment, !last || path.is_folder);
        trail.push(Breadcrumb {
            name: segment.clone(),
            path: cursor.path(),
        });
    }
    trail
}

// Breadcrumb steps reuse already-validated segments.
fn step(folder: &ObjectPath, segment: &str, is_folder: bool) -> ObjectPath {
    if is_folder {
        folder.child_folder(segment).expect("validated segment")
    } else {
        folder.child_file(segment).expect("validated segment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_is_root_folder() {
        let p = ObjectPath::parse("", 7).unwrap();
        assert!(p.is_root() && p.is_folder());
        assert_eq!(p.full_key(), "user-7/");
        assert_eq!(p, ObjectPath::parse("/", 7).unwrap());
    }

    #[test]
    fn parse_distinguishes_folder_and_file() {
        let folder = ObjectPath::parse("docs/notes/", 1).unwrap();
        let file = ObjectPath::parse("docs/notes", 1).unwrap();
        assert!(folder.is_folder() && file.is_file());
        assert_eq!(folder.full_key(), "user-1/docs/notes/");
        assert_eq!(file.full_key(), "user-1/docs/notes");
        assert_ne!(folder, file);
    }

    #[test]
    fn parse_tolerates_single_leading_slash() {
        assert_eq!(
            ObjectPath::parse("/docs/a.txt", 1).unwrap(),
            ObjectPath::parse("docs/a.txt", 1).unwrap()
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        for raw in ["a//b", "//", "///", "a/./b", "../a", "docs//"] {
            assert!(
                matches!(ObjectPath::parse(raw, 1), Err(VfsError::InvalidPath(_))),
                "expected InvalidPath for {raw:?}"
            );
        }
    }

    #[test]
    fn parse_serialize_round_trip_is_idempotent() {
        for raw in ["", "/", "a", "a/", "a/b/c", "a/b/c/", "/x/y.txt"] {
            let once = ObjectPath::parse(raw, 42).unwrap();
            let twice = ObjectPath::parse(&once.path(), 42).unwrap();
            assert_eq!(once, twice, "round trip changed {raw:?}");
            assert_eq!(once.full_key(), twice.full_key());
        }
    }

    #[test]
    fn from_key_inverts_full_key() {
        let p = ObjectPath::parse("docs/2024/report.pdf", 13).unwrap();
        assert_eq!(ObjectPath::from_key(&p.full_key()).unwrap(), p);
        assert_eq!(
            ObjectPath::from_key("user-13/").unwrap(),
            ObjectPath::root(13)
        );
        assert!(ObjectPath::from_key("docs/a.txt").is_err());
        assert!(ObjectPath::from_key("user-x/docs").is_err());
    }

    #[test]
    fn parent_and_display_name() {
        let p = ObjectPath::parse("a/b/c.txt", 1).unwrap();
        assert_eq!(p.display_name(), "c.txt");
        assert_eq!(p.parent(), ObjectPath::parse("a/b/", 1).unwrap());
        assert_eq!(ObjectPath::root(1).parent(), ObjectPath::root(1));
        assert_eq!(ObjectPath::root(1).display_name(), "/");
    }

    #[test]
    fn shape_conversions_return_new_values() {
        let file = ObjectPath::parse("a/b", 1).unwrap();
        let folder = file.to_folder();
        assert!(file.is_file(), "to_folder must not mutate");
        assert!(folder.is_folder());
        assert_eq!(folder.to_file(), file);
        // the root stays a folder
        assert!(ObjectPath::root(1).to_file().is_folder());
    }

    #[test]
    fn descendant_is_reflexive_and_transitive() {
        let a = ObjectPath::parse("a/", 1).unwrap();
        let ab = ObjectPath::parse("a/b/", 1).unwrap();
        let abc = ObjectPath::parse("a/b/c/", 1).unwrap();
        assert!(a.is_descendant_of(&a));
        assert!(ab.is_descendant_of(&a) && abc.is_descendant_of(&ab));
        assert!(abc.is_descendant_of(&a));
        assert!(!a.is_descendant_of(&ab));
    }

    #[test]
    fn descendant_respects_key_boundaries_and_users() {
        let a = ObjectPath::parse("a/", 1).unwrap();
        let ab_file = ObjectPath::parse("ab", 1).unwrap();
        assert!(!ab_file.is_descendant_of(&a), "ab is not under a/");
        let other_user = ObjectPath::parse("a/x", 2).unwrap();
        assert!(!other_user.is_descendant_of(&a));
        // a file never contains anything
        let f = ObjectPath::parse("a", 1).unwrap();
        assert!(!a.is_descendant_of(&f));
    }

    #[test]
    fn replace_prefix_rewrites_descendants() {
        let old = ObjectPath::parse("a/", 1).unwrap();
        let new = ObjectPath::parse("c/d/", 1).unwrap();
        let file = ObjectPath::parse("a/b/x.txt", 1).unwrap();
        assert_eq!(
            file.replace_prefix(&old, &new),
            ObjectPath::parse("c/d/b/x.txt", 1).unwrap()
        );
        // the folder marker itself moves too
        assert_eq!(old.replace_prefix(&old, &new), new);
    }

    #[test]
    fn child_paths_are_validated() {
        let folder = ObjectPath::parse("docs/", 1).unwrap();
        let file = folder.child_file("a.txt").unwrap();
        assert_eq!(file, ObjectPath::parse("docs/a.txt", 1).unwrap());
        assert!(folder.child_file("a/b").is_err());
        assert!(folder.child_folder("..").is_err());
        assert!(file.child_file("x").is_err(), "files have no children");
    }

    #[test]
    fn breadcrumbs_walk_root_to_path() {
        let p = ObjectPath::parse("a/b/c.txt", 1).unwrap();
        let trail = breadcrumbs(&p);
        let got: Vec<(&str, &str)> = trail
            .iter()
            .map(|b| (b.name.as_str(), b.path.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![("/", "/"), ("a", "/a/"), ("b", "/a/b/"), ("c.txt", "/a/b/c.txt")]
        );
        assert_eq!(breadcrumbs(&ObjectPath::root(1)).len(), 1);
    }
}
