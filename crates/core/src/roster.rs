use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("could not read roster file `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
}

/// Shared roster of tradeable item names.
///
/// The roster is replaced wholesale on every load: the new vector is fully
/// built before it is published, so a reader racing a reload sees either the
/// previous list or the new one, never a partially filled list. A failed load
/// leaves the previous contents in place.
#[derive(Debug, Default)]
pub struct ItemRoster {
    entries: RwLock<Arc<Vec<String>>>,
}

impl ItemRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path` end-to-end and replaces the roster, one entry per line,
    /// each trimmed of leading and trailing whitespace. Blank lines are kept
    /// as empty entries; the file is the single source of truth for ordering.
    pub fn load_from(&self, path: &Path) -> Result<usize, RosterError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| RosterError::Read { path: path.to_path_buf(), source })?;

        let entries: Vec<String> = raw.lines().map(|line| line.trim().to_owned()).collect();
        let count = entries.len();

        let mut slot = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Arc::new(entries);

        Ok(count)
    }

    /// Current roster contents. The returned handle stays valid across
    /// subsequent reloads.
    pub fn snapshot(&self) -> Arc<Vec<String>> {
        match self.entries.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::ItemRoster;

    fn write_roster(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write roster file");
        path
    }

    #[test]
    fn load_populates_entries_in_file_order() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_roster(&dir, "items.list", "Bulbasaur\nCharmander\nSquirtle\n");

        let roster = ItemRoster::new();
        let count = roster.load_from(&path).expect("load roster");

        assert_eq!(count, 3);
        assert_eq!(*roster.snapshot(), vec!["Bulbasaur", "Charmander", "Squirtle"]);
    }

    #[test]
    fn reload_replaces_instead_of_merging() {
        let dir = TempDir::new().expect("temp dir");
        let three = write_roster(&dir, "three.list", "Alpha\nBeta\nGamma\n");
        let two = write_roster(&dir, "two.list", "Delta\nEpsilon\n");

        let roster = ItemRoster::new();
        roster.load_from(&three).expect("first load");
        assert_eq!(roster.len(), 3);

        let count = roster.load_from(&two).expect("second load");
        assert_eq!(count, 2);
        assert_eq!(*roster.snapshot(), vec!["Delta", "Epsilon"]);
    }

    #[test]
    fn lines_are_trimmed_but_blank_lines_are_kept() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_roster(&dir, "items.list", "  Pikachu  \n\n\tEevee\n");

        let roster = ItemRoster::new();
        let count = roster.load_from(&path).expect("load roster");

        assert_eq!(count, 3);
        assert_eq!(*roster.snapshot(), vec!["Pikachu", "", "Eevee"]);
    }

    #[test]
    fn failed_load_keeps_previous_contents() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_roster(&dir, "items.list", "Mew\nMewtwo\n");

        let roster = ItemRoster::new();
        roster.load_from(&path).expect("initial load");

        let missing = Path::new("definitely/not/here.list");
        let error = roster.load_from(missing).expect_err("missing file must fail");
        assert!(error.to_string().contains("definitely/not/here.list"));

        assert_eq!(*roster.snapshot(), vec!["Mew", "Mewtwo"]);
    }

    #[test]
    fn snapshot_taken_before_reload_stays_stable() {
        let dir = TempDir::new().expect("temp dir");
        let first = write_roster(&dir, "first.list", "One\nTwo\n");
        let second = write_roster(&dir, "second.list", "Three\n");

        let roster = ItemRoster::new();
        roster.load_from(&first).expect("first load");
        let held = roster.snapshot();

        roster.load_from(&second).expect("second load");

        assert_eq!(*held, vec!["One", "Two"]);
        assert_eq!(*roster.snapshot(), vec!["Three"]);
    }

    #[test]
    fn fresh_roster_starts_empty() {
        let roster = ItemRoster::new();
        assert!(roster.is_empty());
        assert_eq!(roster.len(), 0);
    }
}
