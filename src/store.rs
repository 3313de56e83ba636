//! Core store type and its builder.

use crate::codec::{Codec, JsonCodec};
use crate::config::BACKUPS_DIR;
use crate::error::{Error, Result};
use crate::pack::{Identity, Packer};
use crate::persist;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Key-value map mirrored to `<dir>/<name>` on every write.
///
/// Generic over key `K`, value `V`, on-disk codec `C` and the packer `P`
/// that reshapes the map for the codec. Use [`open`](Self::open) for JSON
/// with the map stored as-is, or [`builder`](Self::builder) to pick the codec
/// and packer.
///
/// The file is read once, when the store is built. After that every
/// successful mutation rewrites the whole file before returning, so memory
/// and disk never disagree. Nothing coordinates two stores (or two
/// processes) pointed at the same file.
pub struct SerializedDict<K, V, C = JsonCodec, P = Identity> {
    data: BTreeMap<K, V>,
    name: String,
    path: PathBuf,
    backup_dir: PathBuf,
    codec: C,
    packer: P,
}

impl<K, V> SerializedDict<K, V>
where
    K: Ord + Clone + Debug,
    V: Clone,
    Identity: Packer<K, V>,
{
    /// Open (or create) `<dir>/<name>` as indented JSON.
    pub fn open(dir: impl AsRef<Path>, name: impl Into<String>) -> Result<Self> {
        Self::builder(dir, name).build()
    }
}

impl<K, V> SerializedDict<K, V> {
    /// Start configuring a store. Call [`.build()`](DictBuilder::build) when
    /// ready.
    pub fn builder(dir: impl AsRef<Path>, name: impl Into<String>) -> DictBuilder<K, V> {
        DictBuilder::new(dir, name)
    }
}

impl<K, V, C, P> SerializedDict<K, V, C, P>
where
    K: Ord + Clone + Debug,
    V: Clone,
    C: Codec,
    P: Packer<K, V>,
{
    // ---- reads ----

    /// Value for `key`, or [`Error::KeyNotFound`].
    pub fn get(&self, key: &K) -> Result<&V> {
        self.data.get(key).ok_or_else(|| Error::key_not_found(key))
    }

    /// `true` if the key exists.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.data.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Snapshot of all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.data.keys().cloned().collect()
    }

    /// Snapshot of all values.
    #[must_use]
    pub fn values(&self) -> Vec<V> {
        self.data.values().cloned().collect()
    }

    /// Snapshot of all key-value pairs, in key order.
    #[must_use]
    pub fn iter(&self) -> Vec<(K, V)> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// All keys in ascending order. Built fresh on every call.
    #[must_use]
    pub fn list(&self) -> Vec<K> {
        // BTreeMap iterates in key order
        self.data.keys().cloned().collect()
    }

    /// Logical name the store was built with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path to the live file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that [`backup`](Self::backup) writes into.
    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// The codec in use.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    // ---- writes ----

    /// Insert or overwrite, then flush. Returns the previous value.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>> {
        let prev = self.data.insert(key, value);
        self.flush()?;
        Ok(prev)
    }

    /// Remove `key` and flush. Fails with [`Error::KeyNotFound`] (without
    /// touching the file) if it isn't there.
    pub fn delete(&mut self, key: &K) -> Result<V> {
        let prev = self
            .data
            .remove(key)
            .ok_or_else(|| Error::key_not_found(key))?;
        self.flush()?;
        Ok(prev)
    }

    /// Drop all entries, then flush.
    pub fn clear(&mut self) -> Result<()> {
        self.data.clear();
        self.flush()
    }

    /// Bulk insert. Only flushes once, after the last entry.
    pub fn extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.data.extend(iter);
        self.flush()
    }

    /// Mutate the value at `key` in place and flush. Returns `false` (and
    /// writes nothing) if the key doesn't exist.
    pub fn update<F>(&mut self, key: &K, f: F) -> Result<bool>
    where
        F: FnOnce(&mut V),
    {
        match self.data.get_mut(key) {
            Some(v) => {
                f(v);
                self.flush()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Return the existing value for `key`, or insert `default`, flush, and
    /// return it.
    pub fn get_or_insert(&mut self, key: K, default: V) -> Result<V> {
        self.get_or_insert_with(key, || default)
    }

    /// Like [`get_or_insert`](Self::get_or_insert) but only computes the
    /// default when the key is actually missing.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> Result<V>
    where
        F: FnOnce() -> V,
    {
        if let Some(v) = self.data.get(&key) {
            return Ok(v.clone());
        }
        let val = f();
        self.data.insert(key, val.clone());
        self.flush()?;
        Ok(val)
    }

    // ---- persistence ----

    /// Replace the in-memory map with the contents of the live file. A
    /// missing file counts as an empty map and is created on the spot.
    pub fn load(&mut self) -> Result<()> {
        match persist::read(&self.path)? {
            Some(bytes) => {
                let packed = self.codec.decode::<P::Stored>(&bytes)?;
                self.data = self.packer.unpack(packed)?;
                tracing::debug!(
                    path = %self.path.display(),
                    entries = self.data.len(),
                    codec = self.codec.name(),
                    "loaded"
                );
            }
            None => {
                self.data = BTreeMap::new();
                tracing::info!(path = %self.path.display(), "no file yet, creating it");
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Write the whole map to the live file (temp file + rename).
    pub fn flush(&self) -> Result<()> {
        let bytes = self.encode()?;
        persist::atomic_write(&self.path, &bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            entries = self.data.len(),
            bytes = bytes.len(),
            "flushed"
        );
        Ok(())
    }

    /// Serialize the map to an arbitrary file. The live file is untouched.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.encode()?;
        persist::write(path.as_ref(), &bytes)
    }

    /// Snapshot the map to `<dir>/backups/<name>.<unix-seconds>.backup` and
    /// return that path. The `backups` directory must already exist. Two
    /// backups in the same second overwrite each other.
    ///
    /// Fails with [`Error::Io`] if the system clock reads before the epoch.
    pub fn backup(&self) -> Result<PathBuf> {
        self.backup_at(epoch_secs(SystemTime::now())?)
    }

    /// [`backup`](Self::backup) with an explicit timestamp.
    pub fn backup_at(&self, unix_secs: u64) -> Result<PathBuf> {
        let path = self
            .backup_dir
            .join(format!("{}.{unix_secs}.backup", self.name));
        self.write_to(&path)?;
        tracing::info!(path = %path.display(), entries = self.data.len(), "backup written");
        Ok(path)
    }

    // ---- internal ----

    fn encode(&self) -> Result<Vec<u8>> {
        let packed = self.packer.pack(&self.data)?;
        self.codec.encode(&packed)
    }
}

fn epoch_secs(now: SystemTime) -> Result<u64> {
    match now.duration_since(UNIX_EPOCH) {
        Ok(d) => Ok(d.as_secs()),
        Err(e) => {
            tracing::warn!(behind = ?e.duration(), "system clock is before the unix epoch");
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "system clock is before the unix epoch",
            )))
        }
    }
}

impl<K, V, C, P> Debug for SerializedDict<K, V, C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializedDict")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("entries", &self.data.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`SerializedDict`].
///
/// The logical name is required up front; the codec and packer default to
/// indented JSON and [`Identity`].
///
/// ```rust,no_run
/// use filedict::{pack::StringKeys, SerializedDict};
///
/// let db = SerializedDict::<u32, String>::builder("/var/lib/app", "ids.json")
///     .packer(StringKeys)
///     .build()
///     .unwrap();
/// ```
pub struct DictBuilder<K, V, C = JsonCodec, P = Identity> {
    dir: PathBuf,
    name: String,
    codec: C,
    packer: P,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> DictBuilder<K, V> {
    fn new(dir: impl AsRef<Path>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            name: name.into(),
            codec: JsonCodec::new(),
            packer: Identity,
            _marker: PhantomData,
        }
    }
}

impl<K, V, P> DictBuilder<K, V, JsonCodec, P> {
    /// Indented JSON (default) or compact single-line JSON.
    pub fn pretty(mut self, yes: bool) -> Self {
        self.codec = if yes {
            JsonCodec::new()
        } else {
            JsonCodec::compact()
        };
        self
    }
}

impl<K, V, C, P> DictBuilder<K, V, C, P> {
    /// Swap the on-disk codec.
    pub fn codec<C2>(self, codec: C2) -> DictBuilder<K, V, C2, P> {
        DictBuilder {
            dir: self.dir,
            name: self.name,
            codec,
            packer: self.packer,
            _marker: PhantomData,
        }
    }

    /// Swap the pack/unpack hooks.
    pub fn packer<P2>(self, packer: P2) -> DictBuilder<K, V, C, P2> {
        DictBuilder {
            dir: self.dir,
            name: self.name,
            codec: self.codec,
            packer,
            _marker: PhantomData,
        }
    }
}

impl<K, V, C, P> DictBuilder<K, V, C, P>
where
    K: Ord + Clone + Debug,
    V: Clone,
    C: Codec,
    P: Packer<K, V>,
{
    /// Validate the name, then load (or create) the live file.
    pub fn build(self) -> Result<SerializedDict<K, V, C, P>> {
        validate_name(&self.name)?;
        let mut store = SerializedDict {
            data: BTreeMap::new(),
            path: self.dir.join(&self.name),
            backup_dir: self.dir.join(BACKUPS_DIR),
            name: self.name,
            codec: self.codec,
            packer: self.packer,
        };
        store.load()?;
        Ok(store)
    }
}

impl<K, V, C, P> Debug for DictBuilder<K, V, C, P>
where
    C: Codec,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictBuilder")
            .field("dir", &self.dir)
            .field("name", &self.name)
            .field("codec", &self.codec.name())
            .finish_non_exhaustive()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Config("logical name must not be empty".into()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::Config(format!(
            "logical name {name:?} must be a plain file name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn epoch_secs_after_epoch() {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(epoch_secs(t).unwrap(), 1_700_000_000);
    }

    #[test]
    fn clock_before_epoch_is_an_error() {
        let t = UNIX_EPOCH - Duration::from_secs(5);
        assert!(matches!(epoch_secs(t), Err(Error::Io(_))));
    }
}
