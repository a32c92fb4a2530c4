//! CSV tables read from and written back to a content store.
//!
//! A [`Table`] is a whole file: the rows plus the revision they were read at.
//! Mutations change the rows in memory and [`DataStore::save`] writes the full
//! file back, quoting that revision.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::ContentStore;

/// A row type backed by one CSV file.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// File name inside the data directory.
    const FILE: &'static str;
    /// Name used in messages, e.g. `Event`.
    const KIND: &'static str;
    /// Column order on disk.
    const HEADERS: &'static [&'static str];

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

#[derive(Debug, Clone)]
pub struct Table<T> {
    pub rows: Vec<T>,
    revision: Option<String>,
}

impl<T: Record> Table<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            revision: None,
        }
    }

    /// Parse CSV text. Missing columns read as blank, unknown ones are ignored.
    pub fn parse(text: &str, revision: Option<String>) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self {
                rows: Vec::new(),
                revision,
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(Self { rows, revision })
    }

    /// Revision the rows were read at; `None` when the file did not exist.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(T::HEADERS)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| Error::OperationFailed(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| Error::Decode(err.to_string()))
    }

    /// One more than the largest numeric id, or 1.
    pub fn next_id(&self) -> u64 {
        self.rows
            .iter()
            .filter_map(|row| numeric_id(row.id()))
            .max()
            .map_or(1, |max| max + 1)
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.rows.iter().find(|row| same_id(row.id(), id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut T> {
        self.rows.iter_mut().find(|row| same_id(row.id(), id))
    }

    /// Look up a row or fail with `NotFound`.
    pub fn get(&self, id: &str) -> Result<&T> {
        self.find(id)
            .ok_or_else(|| Error::not_found(T::KIND, id.trim()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut T> {
        self.find_mut(id)
            .ok_or_else(|| Error::not_found(T::KIND, id.trim()))
    }

    /// Remove every row whose id is in `ids`, returning the removed rows.
    pub fn remove_ids(&mut self, ids: &[String]) -> Vec<T> {
        let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(&mut self.rows)
            .into_iter()
            .partition(|row: &T| ids.iter().any(|id| same_id(row.id(), id)));
        self.rows = kept;
        removed
    }

    /// Append `row` under the next free id and return that id.
    pub fn push(&mut self, mut row: T) -> String {
        let id = self.next_id().to_string();
        row.set_id(id.clone());
        self.rows.push(row);
        id
    }
}

/// Integer value of an id, accepting `3.0` style floats.
pub fn numeric_id(id: &str) -> Option<u64> {
    let id = id.trim();
    if let Ok(value) = id.parse::<u64>() {
        return Some(value);
    }
    let value = id.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
}

/// Ids match when equal after trimming, or when both are the same number.
pub fn same_id(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if a == b {
        return true;
    }
    match (numeric_id(a), numeric_id(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Tables in a store, under one data directory.
pub struct DataStore {
    store: Box<dyn ContentStore>,
    data_dir: String,
}

impl DataStore {
    pub fn new(store: Box<dyn ContentStore>, data_dir: &str) -> Self {
        Self {
            store,
            data_dir: data_dir.trim_matches('/').to_string(),
        }
    }

    pub fn path_of<T: Record>(&self) -> String {
        if self.data_dir.is_empty() {
            T::FILE.to_string()
        } else {
            format!("{}/{}", self.data_dir, T::FILE)
        }
    }

    pub fn describe(&self) -> String {
        self.store.describe()
    }

    /// Load a table. A missing file is an empty table with no revision.
    pub fn load<T: Record>(&self) -> Result<Table<T>> {
        let path = self.path_of::<T>();
        match self.store.read(&path)? {
            Some(file) => Table::parse(&file.text, Some(file.sha)),
            None => Ok(Table::empty()),
        }
    }

    /// Write the whole table back, guarded by the revision it was loaded at.
    pub fn save<T: Record>(&self, table: &mut Table<T>, message: &str) -> Result<()> {
        let path = self.path_of::<T>();
        let text = table.to_csv()?;
        let sha = self.store.write(&path, &text, table.revision(), message)?;
        table.revision = Some(sha);
        Ok(())
    }

    /// Create the file with just its header row when missing.
    ///
    /// Returns whether the file was created.
    pub fn ensure<T: Record>(&self) -> Result<bool> {
        let path = self.path_of::<T>();
        if self.store.read(&path)?.is_some() {
            return Ok(false);
        }
        let mut table = Table::<T>::empty();
        self.save(&mut table, &format!("Create {}", T::FILE))?;
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{Event, Task};
    use crate::store::StoredFile;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// In-memory store with revision checks, shared so tests can inspect it.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryStore {
        pub files: Rc<RefCell<HashMap<String, (String, u64)>>>,
        pub messages: Rc<RefCell<Vec<String>>>,
    }

    impl MemoryStore {
        pub fn with_file(self, path: &str, text: &str) -> Self {
            self.files
                .borrow_mut()
                .insert(path.to_string(), (text.to_string(), 1));
            self
        }

        pub fn text(&self, path: &str) -> Option<String> {
            self.files.borrow().get(path).map(|(text, _)| text.clone())
        }
    }

    impl ContentStore for MemoryStore {
        fn read(&self, path: &str) -> Result<Option<StoredFile>> {
            Ok(self.files.borrow().get(path).map(|(text, rev)| StoredFile {
                text: text.clone(),
                sha: rev.to_string(),
            }))
        }

        fn write(&self, path: &str, text: &str, sha: Option<&str>, message: &str) -> Result<String> {
            let mut files = self.files.borrow_mut();
            let current = files.get(path).map(|(_, rev)| rev.to_string());
            if current.as_deref() != sha {
                return Err(Error::RevisionConflict(path.to_string()));
            }
            let next = files.get(path).map_or(1, |(_, rev)| rev + 1);
            files.insert(path.to_string(), (text.to_string(), next));
            self.messages.borrow_mut().push(message.to_string());
            Ok(next.to_string())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    pub(crate) fn data_store(memory: &MemoryStore) -> DataStore {
        DataStore::new(Box::new(memory.clone()), "data")
    }

    #[test]
    fn parse_fills_missing_and_ignores_unknown_columns() {
        let text = "event_id,event_name,extra\n1,Cup,x\n2,\"Open, Spring\",y\n";
        let table = Table::<Event>::parse(text, None).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].event_name, "Open, Spring");
        assert_eq!(table.rows[0].status, "");
    }

    #[test]
    fn empty_text_is_empty_table_and_header_is_always_written() {
        let table = Table::<Event>::parse("  \n", Some("r1".into())).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.revision(), Some("r1"));
        assert_eq!(
            table.to_csv().unwrap(),
            "event_id,event_name,location,start_date,end_date,status\n"
        );
    }

    #[test]
    fn to_csv_writes_header_order_and_quotes() {
        let mut table = Table::<Task>::empty();
        table.push(Task {
            task_name: "Book hall, north".into(),
            scope: "General".into(),
            ..Task::default()
        });
        let csv = table.to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("task_id,scope,event_id,task_name,due_date,owner,status,priority,category,notes")
        );
        assert_eq!(lines.next(), Some("1,General,,\"Book hall, north\",,,,,,"));
    }

    #[test]
    fn next_id_skips_non_numeric_and_reads_floats() {
        let text = "event_id\n3.0\nabc\n2\n\n";
        let table = Table::<Event>::parse(text, None).unwrap();
        assert_eq!(table.next_id(), 4);
        assert_eq!(Table::<Event>::empty().next_id(), 1);
        assert!(table.find("3").is_some());
        assert!(table.find("abc").is_some());
        assert!(matches!(table.get("9"), Err(Error::NotFound { kind: "Event", .. })));
    }

    #[test]
    fn remove_ids_returns_removed_rows() {
        let mut table = Table::<Event>::parse("event_id\n1\n2\n3\n", None).unwrap();
        let removed = table.remove_ids(&["2".to_string(), "9".to_string()]);
        assert_eq!(removed.len(), 1);
        assert_eq!(
            table.rows.iter().map(|row| row.event_id.as_str()).collect::<Vec<_>>(),
            vec!["1", "3"]
        );
    }

    #[test]
    fn save_tracks_revision_and_detects_conflicts() {
        let memory = MemoryStore::default();
        let data = data_store(&memory);

        let mut table = data.load::<Event>().unwrap();
        assert_eq!(table.revision(), None);
        table.push(Event::default());
        data.save(&mut table, "Add event 1").unwrap();
        assert_eq!(table.revision(), Some("1"));

        let mut stale = Table::<Event>::parse("event_id\n", None).unwrap();
        stale.push(Event::default());
        assert!(matches!(
            data.save(&mut stale, "Add event 1"),
            Err(Error::RevisionConflict(_))
        ));

        table.push(Event::default());
        data.save(&mut table, "Add event 2").unwrap();
        assert_eq!(
            memory.text("data/events.csv").unwrap().lines().count(),
            3
        );
        assert_eq!(memory.messages.borrow().len(), 2);
    }

    #[test]
    fn ensure_creates_only_missing_files() {
        let memory = MemoryStore::default().with_file("data/tasks.csv", "task_id\n");
        let data = data_store(&memory);
        assert!(data.ensure::<Event>().unwrap());
        assert!(!data.ensure::<Task>().unwrap());
        assert!(!data.ensure::<Event>().unwrap());
        assert_eq!(memory.messages.borrow().as_slice(), ["Create events.csv"]);
    }
}
