use remotes::keymap::{Keymap, Keymaps};
use std::path::Path;
use std::process::exit;

pub fn keymap(cmd: &crate::KeymapCmd) {
    match &cmd.command {
        crate::KeymapCommands::List { path } => {
            for keymap in load(path) {
                println!(
                    "{} codec={} device=0x{:04X} keys={}",
                    keymap.name,
                    keymap.codec,
                    keymap.device,
                    keymap.keys.len()
                );

                for entry in &keymap.keys {
                    println!("  0x{:02X} {}", entry.scancode, entry.keycode);
                }
            }
        }
        crate::KeymapCommands::Lookup { path, keycode } => {
            let mut found = false;

            for keymap in load(path) {
                if let Some(entry) = keymap.lookup_keycode(keycode) {
                    println!(
                        "{}: codec={} device=0x{:04X} scancode=0x{:02X}",
                        keymap.name,
                        keymap.entry_codec(entry),
                        keymap.entry_device(entry),
                        entry.scancode
                    );

                    found = true;
                }
            }

            if !found {
                eprintln!("error: {keycode} not found");
                exit(1);
            }
        }
    }
}

fn load(path: &Path) -> Vec<Keymap> {
    if path.is_dir() {
        match Keymaps::load(path) {
            Ok(keymaps) => keymaps.keymaps().to_vec(),
            Err(err) => {
                eprintln!("error: {}: {err}", path.display());
                exit(1);
            }
        }
    } else {
        match Keymap::load(path) {
            Ok(keymap) => vec![keymap],
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        }
    }
}
