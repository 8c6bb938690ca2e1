//! Keymaps: named mappings from `(codec, device, scancode)` to symbolic
//! keycodes, stored as TOML files
//!
//! ```toml
//! name = "living room tv"
//! codec = "nec32"
//! device = 0x7F80
//!
//! [[key]]
//! keycode = "KEY_POWER"
//! scancode = 0x13
//! ```
//!
//! A key entry may override the keymap-level codec, device or repeat count,
//! so one file can describe a remote that mixes protocols.

use crate::codec::CodecType;
use crate::Error;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One button on a remote
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeymapEntry {
    /// Symbolic keycode, e.g. KEY_POWER
    pub keycode: String,
    pub scancode: u32,
    /// Optional human readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<CodecType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeats: Option<u32>,
}

/// A named remote: codec, device and its buttons
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keymap {
    pub name: String,
    pub codec: CodecType,
    #[serde(default)]
    pub device: u32,
    /// Default repeat count when transmitting
    #[serde(default)]
    pub repeats: u32,
    #[serde(rename = "key", default)]
    pub keys: Vec<KeymapEntry>,
}

impl Keymap {
    pub fn load(path: &Path) -> Result<Keymap, Error> {
        let contents = fs::read_to_string(path)?;

        toml::from_str(&contents)
            .map_err(|e| Error::InvalidArgument(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidArgument(format!("{}: {e}", path.display())))?;

        fs::write(path, contents)?;

        Ok(())
    }

    /// Effective codec for an entry, honoring the entry-level override
    pub fn entry_codec(&self, entry: &KeymapEntry) -> CodecType {
        entry.codec.unwrap_or(self.codec)
    }

    pub fn entry_device(&self, entry: &KeymapEntry) -> u32 {
        entry.device.unwrap_or(self.device)
    }

    pub fn entry_repeats(&self, entry: &KeymapEntry) -> u32 {
        entry.repeats.unwrap_or(self.repeats)
    }

    /// Find the entry for a symbolic keycode
    pub fn lookup_keycode(&self, keycode: &str) -> Option<&KeymapEntry> {
        self.keys.iter().find(|entry| entry.keycode == keycode)
    }
}

/// All keymaps found under a directory
pub struct Keymaps {
    keymaps: Vec<Keymap>,
}

impl Keymaps {
    /// Load every `*.toml` file in the directory. Two keymaps with the same
    /// name are a configuration error.
    pub fn load(dir: &Path) -> Result<Keymaps, Error> {
        let mut keymaps: Vec<Keymap> = Vec::new();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "toml") == Some(true))
            .collect();

        paths.sort();

        for path in paths {
            let keymap = Keymap::load(&path)?;

            debug!("loaded keymap {} from {}", keymap.name, path.display());

            if keymaps.iter().any(|k| k.name == keymap.name) {
                return Err(Error::InvalidArgument(format!(
                    "{}: duplicate keymap {}",
                    path.display(),
                    keymap.name
                )));
            }

            keymaps.push(keymap);
        }

        Ok(Keymaps { keymaps })
    }

    pub fn keymaps(&self) -> &[Keymap] {
        &self.keymaps
    }

    /// All entries matching a decoded `(codec, device, scancode)` triple
    pub fn lookup(
        &self,
        codec: CodecType,
        device: u32,
        scancode: u32,
    ) -> Vec<(&Keymap, &KeymapEntry)> {
        self.keymaps
            .iter()
            .flat_map(|keymap| keymap.keys.iter().map(move |entry| (keymap, entry)))
            .filter(|(keymap, entry)| {
                keymap.entry_codec(entry) == codec
                    && keymap.entry_device(entry) == device
                    && entry.scancode == scancode
            })
            .collect()
    }

    /// All entries with a given symbolic keycode
    pub fn lookup_keycode(&self, keycode: &str) -> Vec<(&Keymap, &KeymapEntry)> {
        self.keymaps
            .iter()
            .flat_map(|keymap| keymap.keys.iter().map(move |entry| (keymap, entry)))
            .filter(|(_, entry)| entry.keycode == keycode)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv() -> Keymap {
        toml::from_str(
            r#"
            name = "tv"
            codec = "nec32"
            device = 0x7F80

            [[key]]
            keycode = "KEY_POWER"
            scancode = 0x13

            [[key]]
            keycode = "KEY_VOLUMEUP"
            scancode = 0x20
            device = 0x7F81
            "#,
        )
        .unwrap()
    }

    #[test]
    fn parse_toml() {
        let keymap = tv();

        assert_eq!(keymap.codec, CodecType::Nec32);
        assert_eq!(keymap.device, 0x7F80);
        assert_eq!(keymap.keys.len(), 2);
        assert_eq!(keymap.keys[0].keycode, "KEY_POWER");
    }

    #[test]
    fn entry_overrides() {
        let keymap = tv();

        assert_eq!(keymap.entry_device(&keymap.keys[0]), 0x7F80);
        assert_eq!(keymap.entry_device(&keymap.keys[1]), 0x7F81);
        assert_eq!(keymap.entry_codec(&keymap.keys[1]), CodecType::Nec32);
    }

    #[test]
    fn lookup_by_triple() {
        let keymaps = Keymaps {
            keymaps: vec![tv()],
        };

        let hits = keymaps.lookup(CodecType::Nec32, 0x7F80, 0x13);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.keycode, "KEY_POWER");

        // the volume key was re-homed to another device id
        assert!(keymaps.lookup(CodecType::Nec32, 0x7F80, 0x20).is_empty());
        assert_eq!(keymaps.lookup(CodecType::Nec32, 0x7F81, 0x20).len(), 1);

        assert!(keymaps.lookup(CodecType::Sony12, 0x7F80, 0x13).is_empty());
    }

    #[test]
    fn save_and_reload() {
        let keymap = tv();
        let path = std::env::temp_dir().join("remotes-keymap-save-test.toml");

        keymap.save(&path).unwrap();
        assert_eq!(Keymap::load(&path).unwrap(), keymap);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn roundtrip_serialization() {
        let keymap = tv();
        let text = toml::to_string_pretty(&keymap).unwrap();
        let reparsed: Keymap = toml::from_str(&text).unwrap();

        assert_eq!(keymap, reparsed);
    }
}
