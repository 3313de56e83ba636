//! Pack/unpack hooks that sit between the in-memory map and the codec.
//!
//! JSON objects only have string keys, so a map keyed by integers or tuples
//! has to be reshaped before it can be written. A [`Packer`] does that
//! reshaping on the way out and reverses it on the way in.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Converts the live map to and from the shape the codec actually stores.
///
/// Packing borrows from the live map, so a flush never has to copy it.
pub trait Packer<K, V> {
    /// What gets handed to the codec on write.
    type Packed<'a>: Serialize
    where
        K: 'a,
        V: 'a;

    /// What the codec produces on read.
    type Stored: DeserializeOwned;

    /// Reshape the map for writing.
    fn pack<'a>(&self, data: &'a BTreeMap<K, V>) -> Result<Self::Packed<'a>>;

    /// Rebuild the map from what was read.
    fn unpack(&self, stored: Self::Stored) -> Result<BTreeMap<K, V>>;
}

/// Stores the map as-is. Fine for string keys with either codec, and for any
/// key type with a self-describing binary codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<K, V> Packer<K, V> for Identity
where
    K: Ord + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    type Packed<'a> = &'a BTreeMap<K, V>
    where
        K: 'a,
        V: 'a;
    type Stored = BTreeMap<K, V>;

    fn pack<'a>(&self, data: &'a BTreeMap<K, V>) -> Result<Self::Packed<'a>> {
        Ok(data)
    }

    fn unpack(&self, stored: Self::Stored) -> Result<BTreeMap<K, V>> {
        Ok(stored)
    }
}

/// Writes keys through `Display` and reads them back with `FromStr`, so
/// integer or enum keys end up as a plain JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringKeys;

impl<K, V> Packer<K, V> for StringKeys
where
    K: Ord + Display + FromStr,
    K::Err: Display,
    V: Serialize + DeserializeOwned,
{
    type Packed<'a> = BTreeMap<String, &'a V>
    where
        K: 'a,
        V: 'a;
    type Stored = BTreeMap<String, V>;

    fn pack<'a>(&self, data: &'a BTreeMap<K, V>) -> Result<Self::Packed<'a>> {
        let mut out = BTreeMap::new();
        for (k, v) in data {
            let s = k.to_string();
            if out.insert(s.clone(), v).is_some() {
                return Err(Error::Serialize(format!(
                    "two keys share the string form {s:?}"
                )));
            }
        }
        Ok(out)
    }

    fn unpack(&self, stored: Self::Stored) -> Result<BTreeMap<K, V>> {
        stored
            .into_iter()
            .map(|(s, v)| {
                s.parse::<K>()
                    .map(|k| (k, v))
                    .map_err(|e| Error::Deserialize(format!("bad key {s:?}: {e}")))
            })
            .collect()
    }
}

/// Writes the map as a list of `[key, value]` pairs. Works for structured
/// keys (tuples, structs) that have no natural string form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairList;

impl<K, V> Packer<K, V> for PairList
where
    K: Ord + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    type Packed<'a> = Vec<(&'a K, &'a V)>
    where
        K: 'a,
        V: 'a;
    type Stored = Vec<(K, V)>;

    fn pack<'a>(&self, data: &'a BTreeMap<K, V>) -> Result<Self::Packed<'a>> {
        Ok(data.iter().collect())
    }

    // duplicate keys: last pair wins
    fn unpack(&self, stored: Self::Stored) -> Result<BTreeMap<K, V>> {
        Ok(stored.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_keys_roundtrip_integers() {
        let mut data = BTreeMap::new();
        data.insert(10u32, "ten".to_string());
        data.insert(2u32, "two".to_string());
        let packed = Packer::<u32, String>::pack(&StringKeys, &data).unwrap();
        assert_eq!(packed["10"], "ten");
        assert_eq!(packed["2"], "two");
        let stored: BTreeMap<String, String> = packed
            .into_iter()
            .map(|(k, v)| (k, v.clone()))
            .collect();
        let back = Packer::<u32, String>::unpack(&StringKeys, stored).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn string_keys_unpack_rejects_garbage() {
        let mut packed = BTreeMap::new();
        packed.insert("not-a-number".to_string(), 1);
        let err = Packer::<u32, i32>::unpack(&StringKeys, packed).unwrap_err();
        assert!(matches!(err, Error::Deserialize(msg) if msg.contains("not-a-number")));
    }

    #[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct Loose(i32);

    impl Display for Loose {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0.abs())
        }
    }

    impl FromStr for Loose {
        type Err = std::num::ParseIntError;
        fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
            s.parse().map(Loose)
        }
    }

    #[test]
    fn string_keys_pack_rejects_collisions() {
        let mut data = BTreeMap::new();
        data.insert(Loose(-3), 1);
        data.insert(Loose(3), 2);
        let err = StringKeys.pack(&data).unwrap_err();
        assert!(matches!(err, Error::Serialize(_)));
    }

    #[test]
    fn pair_list_keeps_key_order() {
        let mut data = BTreeMap::new();
        data.insert(("b".to_string(), 1), 2.0);
        data.insert(("a".to_string(), 9), 1.0);
        let packed = PairList.pack(&data).unwrap();
        assert_eq!(packed[0].0, &("a".to_string(), 9));
        assert_eq!(packed[1].0, &("b".to_string(), 1));
    }

    #[test]
    fn identity_packs_by_reference() {
        let mut data = BTreeMap::new();
        data.insert("k".to_string(), 1);
        let packed = Packer::<String, i32>::pack(&Identity, &data).unwrap();
        assert!(std::ptr::eq(packed, &data));
    }

    #[test]
    fn pair_list_last_duplicate_wins() {
        let packed = vec![("k".to_string(), 1), ("k".to_string(), 2)];
        let data = Packer::<String, i32>::unpack(&PairList, packed).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data["k"], 2);
    }
}
