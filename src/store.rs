//! Core store type and builder.

use crate::error::{Error, ErrorCode, Result};
use crate::math::MathOp;
use crate::persist::{atomic_write, ensure_exists, load, load_existing, FileLock};
use crate::resolve::resolve_in;
use crate::serializer::JsonSerializer;
use crate::value::{is_truthy, json_eq, number_value, Document, Entry};
use parking_lot::ReentrantMutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name used by [`JsonKv::open_default`].
pub const DEFAULT_FILE_NAME: &str = "store.json";

/// Decides when [`JsonKv::set`] refuses to overwrite.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwriteGuard {
    /// Refuse whenever the key is present, whatever it holds.
    #[default]
    Presence,
    /// Refuse only when the current value is truthy. A key holding `null`,
    /// `false`, `0` or `""` can be set again.
    Truthy,
}

/// Persistent JSON key-value store backed by a single file.
///
/// Every call reads the whole file, works on the in-memory copy and, for
/// mutations, writes the whole document back before returning. Nothing is
/// cached between calls, so the file is always the source of truth.
///
/// Calls on one instance are serialized. Separate instances (or processes)
/// pointing at the same file are not coordinated and the last writer wins,
/// unless every one of them was built with [`JsonKvBuilder::lock`].
///
/// Closures passed to [`updater`](Self::updater), [`filter`](Self::filter) and
/// friends may read from the same store; a write made from inside
/// [`updater`](Self::updater) is overwritten when the outer call persists.
pub struct JsonKv {
    path: PathBuf,
    dir: PathBuf,
    serializer: JsonSerializer,
    guard: OverwriteGuard,
    cycle: ReentrantMutex<()>,
    lock: Option<FileLock>,
}

impl JsonKv {
    /// Open (or create) `name` in the current directory with default settings.
    /// `.json` is appended when missing.
    pub fn open(name: impl AsRef<str>) -> Result<Self> {
        Self::builder(name).build()
    }

    /// Open (or create) [`DEFAULT_FILE_NAME`] in the current directory.
    pub fn open_default() -> Result<Self> {
        Self::open(DEFAULT_FILE_NAME)
    }

    /// Start configuring a new store. Call [`.build()`](JsonKvBuilder::build)
    /// when ready.
    pub fn builder(name: impl AsRef<str>) -> JsonKvBuilder {
        JsonKvBuilder::new(name)
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when this instance holds the advisory lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Path to the `.lock` file held by this instance, if any.
    #[must_use]
    pub fn lock_path(&self) -> Option<&Path> {
        self.lock.as_ref().map(FileLock::path)
    }

    // ---- reads ----

    /// Number of keys.
    pub fn size(&self) -> Result<usize> {
        self.inspect(|doc| doc.len())
    }

    /// `true` when the document has no keys.
    pub fn is_empty(&self) -> Result<bool> {
        self.inspect(|doc| doc.is_empty())
    }

    /// Snapshot of all keys, in document order.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.inspect(|doc| doc.into_iter().map(|(k, _)| k).collect())
    }

    /// Snapshot of all values, in document order.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.inspect(|doc| doc.into_iter().map(|(_, v)| v).collect())
    }

    /// Entries for which `predicate` returns `true`.
    pub fn filter<F>(&self, mut predicate: F) -> Result<Vec<Entry>>
    where
        F: FnMut(&str, &Value) -> bool,
    {
        self.inspect(|doc| {
            doc.into_iter()
                .filter(|(k, v)| predicate(k.as_str(), v))
                .collect()
        })
    }

    /// Apply `f` to every entry and collect the results.
    pub fn map<U, F>(&self, mut f: F) -> Result<Vec<U>>
    where
        F: FnMut(&str, &Value) -> U,
    {
        self.inspect(|doc| doc.iter().map(|(k, v)| f(k.as_str(), v)).collect())
    }

    /// First entry matching `predicate`.
    pub fn find<F>(&self, mut predicate: F) -> Result<Option<Entry>>
    where
        F: FnMut(&str, &Value) -> bool,
    {
        self.inspect(|doc| doc.into_iter().find(|(k, v)| predicate(k.as_str(), v)))
    }

    /// `true` if at least one entry matches.
    pub fn some<F>(&self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&str, &Value) -> bool,
    {
        self.inspect(|doc| doc.iter().any(|(k, v)| predicate(k.as_str(), v)))
    }

    /// `true` if every entry matches (vacuously so for an empty document).
    pub fn every<F>(&self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&str, &Value) -> bool,
    {
        self.inspect(|doc| doc.iter().all(|(k, v)| predicate(k.as_str(), v)))
    }

    /// Number of entries matching `predicate`.
    pub fn count_by<F>(&self, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&str, &Value) -> bool,
    {
        self.inspect(|doc| doc.iter().filter(|&(k, v)| predicate(k.as_str(), v)).count())
    }

    /// For every value, the property `key` of that value if it is an object
    /// holding it, `None` otherwise. One slot per entry, nothing filtered.
    pub fn pluck(&self, key: &str) -> Result<Vec<Option<Value>>> {
        require_key(key)?;
        self.inspect(|doc| doc.values().map(|v| v.get(key).cloned()).collect())
    }

    /// Value at `key`, or `None` if absent.
    pub fn fetch(&self, key: &str) -> Result<Option<Value>> {
        require_key(key)?;
        self.inspect(|doc| doc.get(key).cloned())
    }

    /// Value at `key` deserialized into `T`.
    pub fn fetch_as<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.fetch(key)?
            .map(|v| {
                serde_json::from_value(v).map_err(|e| {
                    Error::new(
                        format!("value at key {key} has the wrong shape: {e}"),
                        ErrorCode::InvalidDataType,
                    )
                })
            })
            .transpose()
    }

    /// `true` if `key` is present, whatever it holds.
    pub fn has(&self, key: &str) -> Result<bool> {
        require_key(key)?;
        self.inspect(|doc| doc.contains_key(key))
    }

    /// The whole document.
    pub fn fetch_all(&self) -> Result<Document> {
        self.inspect(|doc| doc)
    }

    /// All entries, or only the first `limit` when `limit > 0`.
    pub fn all(&self, limit: usize) -> Result<Vec<Entry>> {
        self.inspect(|doc| {
            let take = if limit > 0 { limit } else { usize::MAX };
            doc.into_iter().take(take).collect()
        })
    }

    // ---- writes ----

    /// Store `value` under `key`.
    ///
    /// Fails with [`ErrorCode::KeyAlreadyDeclared`] when the key is already
    /// taken; what counts as taken depends on the [`OverwriteGuard`].
    pub fn set<V: Serialize>(&self, key: &str, value: V) -> Result<()> {
        require_key(key)?;
        let value = to_json(value)?;
        let guard = self.guard;
        self.modify(|doc| {
            let declared = match (guard, doc.get(key)) {
                (_, None) => false,
                (OverwriteGuard::Presence, Some(_)) => true,
                (OverwriteGuard::Truthy, Some(current)) => is_truthy(current),
            };
            if declared {
                return Err(Error::new(
                    format!("the key {key} is already declared"),
                    ErrorCode::KeyAlreadyDeclared,
                ));
            }
            doc.insert(key.to_owned(), value);
            Ok(())
        })
    }

    /// Overwrite an existing key. Returns the previous value.
    pub fn update<V: Serialize>(&self, key: &str, value: V) -> Result<Value> {
        require_key(key)?;
        let value = to_json(value)?;
        self.modify(|doc| {
            let slot = doc.get_mut(key).ok_or_else(|| Error::data_not_found(key))?;
            Ok(std::mem::replace(slot, value))
        })
    }

    /// Replace the value at an existing key with `transform(current)`. Returns
    /// the new value.
    pub fn updater<F>(&self, key: &str, transform: F) -> Result<Value>
    where
        F: FnOnce(Value) -> Value,
    {
        require_key(key)?;
        self.modify(|doc| {
            let slot = doc.get_mut(key).ok_or_else(|| Error::data_not_found(key))?;
            let next = transform(slot.take());
            *slot = next.clone();
            Ok(next)
        })
    }

    /// Remove `key` and return what it held.
    pub fn delete(&self, key: &str) -> Result<Value> {
        require_key(key)?;
        self.modify(|doc| doc.shift_remove(key).ok_or_else(|| Error::data_not_found(key)))
    }

    /// Remove every entry whose value equals `value`. Returns how many went.
    /// Numbers match by amount (`5` and `5.0` are equal), at any depth.
    /// Matching nothing is not an error.
    pub fn remove_by_value<V: Serialize>(&self, value: V) -> Result<usize> {
        let value = to_json(value)?;
        self.modify(|doc| {
            let before = doc.len();
            doc.retain(|_, v| !json_eq(v, &value));
            Ok(before - doc.len())
        })
    }

    /// Copy the value of `source` to `new_key`, or with no source, copy the
    /// whole document as it stood before the call into `new_key`.
    ///
    /// Copying the whole document nests earlier copies inside the new one, so
    /// the file grows with each call.
    pub fn clone_key(&self, new_key: &str, source: Option<&str>) -> Result<()> {
        require_key(new_key)?;
        self.modify(|doc| {
            let copied = match source.filter(|s| !s.is_empty()) {
                Some(src) => doc
                    .get(src)
                    .cloned()
                    .ok_or_else(|| Error::data_not_found(src))?,
                None => Value::Object(doc.clone()),
            };
            doc.insert(new_key.to_owned(), copied);
            Ok(())
        })
    }

    /// Move the value at `old_key` to `new_key`. Renaming a key onto itself
    /// leaves it as is.
    pub fn rename(&self, old_key: &str, new_key: &str) -> Result<()> {
        require_key(old_key)?;
        require_key(new_key)?;
        self.modify(|doc| {
            if !doc.contains_key(old_key) {
                return Err(Error::data_not_found(old_key));
            }
            if old_key != new_key {
                if let Some(value) = doc.shift_remove(old_key) {
                    doc.insert(new_key.to_owned(), value);
                }
            }
            Ok(())
        })
    }

    /// Flip a boolean. Returns the new value.
    pub fn toggle(&self, key: &str) -> Result<bool> {
        require_key(key)?;
        self.modify(|doc| match doc.get_mut(key) {
            None => Err(Error::data_not_found(key)),
            Some(Value::Bool(b)) => {
                *b = !*b;
                Ok(*b)
            }
            Some(_) => Err(Error::new(
                format!("value at key {key} must be a boolean"),
                ErrorCode::ValueNotBoolean,
            )),
        })
    }

    /// Shallow-merge the top-level keys of each file into this document, in
    /// order, later files winning. Missing files are skipped. Paths are used
    /// as given. Returns the number of files merged.
    ///
    /// If any existing file can't be read or isn't a JSON object, nothing is
    /// written and the call fails with [`ErrorCode::MergeFailed`].
    pub fn merge_all<I, P>(&self, paths: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let serializer = &self.serializer;
        self.modify(|doc| {
            let mut merged = 0;
            for path in paths {
                let path = path.as_ref();
                let other = load_existing(path, serializer).map_err(|e| {
                    Error::new(
                        format!("cannot merge {}: {}", path.display(), e.message()),
                        ErrorCode::MergeFailed,
                    )
                })?;
                match other {
                    Some(other) => {
                        doc.extend(other);
                        merged += 1;
                    }
                    None => debug!(path = %path.display(), "merge source missing, skipped"),
                }
            }
            Ok(merged)
        })
    }

    /// Write the current document to `file_name` (resolved like the store's
    /// own name, in the same directory). Returns the path written.
    pub fn backup(&self, file_name: &str) -> Result<PathBuf> {
        if file_name.is_empty() {
            return Err(Error::new(
                "the backup file name is not defined",
                ErrorCode::FileNotDefined,
            ));
        }
        let target = resolve_in(&self.dir, file_name)?;
        let _cycle = self.cycle.lock();
        let doc = self.read()?;
        let bytes = self.serializer.serialize(&doc)?;
        atomic_write(&target, &bytes)?;
        debug!(path = %target.display(), keys = doc.len(), "wrote backup");
        Ok(target)
    }

    /// Add `amount` to the number at `key`, starting from 0 when the key is
    /// absent. Returns the new number.
    pub fn add(&self, key: &str, amount: f64) -> Result<f64> {
        require_key(key)?;
        require_number(amount)?;
        self.modify(|doc| {
            let current = match doc.get(key) {
                None => 0.0,
                Some(v) => stored_number(key, v)?,
            };
            let next = current + amount;
            doc.insert(key.to_owned(), number_value(next));
            Ok(next)
        })
    }

    /// Subtract `amount` from the number at an existing key. Returns the new
    /// number.
    pub fn subtract(&self, key: &str, amount: f64) -> Result<f64> {
        require_key(key)?;
        require_number(amount)?;
        self.apply_math(key, MathOp::Sub, amount)
    }

    /// Apply `op` with `amount` to the number at an existing key. Returns the
    /// computed number.
    ///
    /// JSON has no infinities, so a non-finite result (division by zero, for
    /// one) is returned as is but persisted as `null`. The key then no longer
    /// holds a number: further `add`, `subtract` and `math` calls on it fail
    /// with [`ErrorCode::ValueNotNumber`] until it is replaced with
    /// [`update`](Self::update) or removed with [`delete`](Self::delete).
    pub fn math(&self, key: &str, op: MathOp, amount: f64) -> Result<f64> {
        require_key(key)?;
        require_number(amount)?;
        self.apply_math(key, op, amount)
    }

    /// Drop every key.
    pub fn reset(&self) -> Result<()> {
        self.modify(|doc| {
            doc.clear();
            Ok(())
        })
    }

    /// Append `value` to the array at `key`. A missing or non-array value is
    /// replaced by an empty array first. Returns the new length.
    pub fn push<V: Serialize>(&self, key: &str, value: V) -> Result<usize> {
        require_key(key)?;
        let value = to_json(value)?;
        self.modify(|doc| {
            let slot = doc.entry(key).or_insert(Value::Null);
            if let Value::Array(items) = slot {
                items.push(value);
                return Ok(items.len());
            }
            *slot = Value::Array(vec![value]);
            Ok(1)
        })
    }

    /// Shallow-merge the properties of `data` (which must serialize to a JSON
    /// object) into the object at `key`, creating it when absent. `data` wins
    /// on conflicts. Returns the merged object.
    pub fn merge<V: Serialize>(&self, key: &str, data: V) -> Result<Value> {
        require_key(key)?;
        let data = match to_json(data)? {
            Value::Object(map) => map,
            _ => {
                return Err(Error::new(
                    "the data must be an object",
                    ErrorCode::DataMustBeObject,
                ))
            }
        };
        self.modify(|doc| {
            match doc.entry(key).or_insert_with(|| Value::Object(Map::new())) {
                Value::Object(target) => {
                    target.extend(data);
                    Ok(Value::Object(target.clone()))
                }
                _ => Err(Error::new(
                    format!("value at key {key} must be an object"),
                    ErrorCode::ValueNotObject,
                )),
            }
        })
    }

    /// Empty the array or object at `key`. Anything else (including a missing
    /// key) fails with [`ErrorCode::InvalidDataType`].
    pub fn clear(&self, key: &str) -> Result<()> {
        require_key(key)?;
        self.modify(|doc| match doc.get_mut(key) {
            Some(Value::Array(items)) => {
                items.clear();
                Ok(())
            }
            Some(Value::Object(map)) => {
                map.clear();
                Ok(())
            }
            _ => Err(Error::new(
                format!("value at key {key} must be an array or an object"),
                ErrorCode::InvalidDataType,
            )),
        })
    }

    // ---- internal ----

    fn read(&self) -> Result<Document> {
        load(&self.path, &self.serializer)
    }

    fn write(&self, doc: &Document) -> Result<()> {
        let bytes = self.serializer.serialize(doc)?;
        atomic_write(&self.path, &bytes)?;
        debug!(path = %self.path.display(), keys = doc.len(), "persisted document");
        Ok(())
    }

    /// Read-only cycle.
    fn inspect<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Document) -> T,
    {
        let _cycle = self.cycle.lock();
        Ok(f(self.read()?))
    }

    /// Full read-modify-write cycle. Nothing is written if `f` fails.
    fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let _cycle = self.cycle.lock();
        let mut doc = self.read()?;
        let out = f(&mut doc)?;
        self.write(&doc)?;
        Ok(out)
    }

    fn apply_math(&self, key: &str, op: MathOp, amount: f64) -> Result<f64> {
        self.modify(|doc| {
            let slot = doc.get_mut(key).ok_or_else(|| Error::data_not_found(key))?;
            let next = op.apply(stored_number(key, slot)?, amount);
            *slot = number_value(next);
            Ok(next)
        })
    }
}

impl std::fmt::Debug for JsonKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonKv")
            .field("path", &self.path)
            .field("pretty", &self.serializer.is_pretty())
            .field("guard", &self.guard)
            .field("lock", &self.lock_path())
            .finish_non_exhaustive()
    }
}

fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::key_not_defined());
    }
    Ok(())
}

fn require_number(amount: f64) -> Result<()> {
    if amount.is_nan() {
        return Err(Error::new(
            "the amount must be a number",
            ErrorCode::ValueNotNumber,
        ));
    }
    Ok(())
}

fn stored_number(key: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| Error::not_a_number(key))
}

fn to_json<V: Serialize>(value: V) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        Error::new(
            format!("value cannot be stored as JSON: {e}"),
            ErrorCode::InvalidDataType,
        )
    })
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`JsonKv`] store.
///
/// ```rust,no_run
/// use json_kv::{JsonKv, OverwriteGuard};
///
/// let db = JsonKv::builder("settings")
///     .dir("/var/lib/myapp")
///     .overwrite_guard(OverwriteGuard::Truthy)
///     .lock(true)
///     .build()
///     .unwrap();
/// ```
pub struct JsonKvBuilder {
    name: String,
    dir: Option<PathBuf>,
    pretty: bool,
    guard: OverwriteGuard,
    lock: bool,
}

impl JsonKvBuilder {
    fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_owned(),
            dir: None,
            pretty: true,
            guard: OverwriteGuard::default(),
            lock: false,
        }
    }

    /// Directory the file name is resolved against (default: the current
    /// working directory at build time).
    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Write 2-space indented JSON (default) or compact JSON.
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// What [`JsonKv::set`] treats as an already declared key (default:
    /// [`OverwriteGuard::Presence`]).
    pub fn overwrite_guard(mut self, guard: OverwriteGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Hold an exclusive advisory lock on `<file>.lock` while the store is
    /// alive (default: off).
    pub fn lock(mut self, yes: bool) -> Self {
        self.lock = yes;
        self
    }

    /// Resolve the path, create the file if needed and return the store.
    pub fn build(self) -> Result<JsonKv> {
        let dir = match self.dir {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(|e| {
                Error::new(
                    format!("cannot determine the current directory: {e}"),
                    ErrorCode::FileReadError,
                )
            })?,
        };
        let path = resolve_in(&dir, &self.name)?;
        let lock = if self.lock {
            Some(FileLock::acquire(&path)?)
        } else {
            None
        };

        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::compact()
        };

        ensure_exists(&path)?;
        info!(path = %path.display(), locked = lock.is_some(), "opened store");

        Ok(JsonKv {
            path,
            dir,
            serializer,
            guard: self.guard,
            cycle: ReentrantMutex::new(()),
            lock,
        })
    }
}

impl std::fmt::Debug for JsonKvBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonKvBuilder")
            .field("name", &self.name)
            .field("dir", &self.dir)
            .field("pretty", &self.pretty)
            .field("guard", &self.guard)
            .field("lock", &self.lock)
            .finish()
    }
}
