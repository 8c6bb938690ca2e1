use remotes::keymap::Keymap;
use remotes::{encode, rawir, CodecType};
use std::process::exit;

pub fn transmit(transmit: &crate::Transmit) {
    let (pulses, carrier) = pulses_for(transmit);

    if transmit.dry_run {
        println!("{}", rawir::print_to_string(&pulses));
        return;
    }

    let mut dev = match lirc::open(&transmit.device) {
        Ok(dev) => dev,
        Err(err) => {
            eprintln!("error: {}: {err}", transmit.device.display());
            exit(1);
        }
    };

    if let Some(carrier) = carrier {
        if dev.can_set_send_carrier() {
            if let Err(err) = dev.set_send_carrier(carrier) {
                eprintln!("warning: failed to set carrier: {err}");
            }
        }
    }

    if let Err(err) = dev.send(&pulses) {
        eprintln!("error: transmit failed: {err}");
        exit(1);
    }
}

fn pulses_for(transmit: &crate::Transmit) -> (Vec<u32>, Option<u32>) {
    if let Some(raw) = &transmit.raw {
        match rawir::parse(raw) {
            Ok(pulses) => (pulses, None),
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        }
    } else if let Some(path) = &transmit.keymap {
        let keymap = match Keymap::load(path) {
            Ok(keymap) => keymap,
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        };

        let Some(keycode) = &transmit.keycode else {
            eprintln!("error: --keymap requires --keycode");
            exit(1);
        };

        let Some(entry) = keymap.lookup_keycode(keycode) else {
            eprintln!("error: no {keycode} in keymap {}", keymap.name);
            exit(1);
        };

        let codec = keymap.entry_codec(entry);
        let device = keymap.entry_device(entry);
        let repeats = transmit
            .repeats
            .unwrap_or_else(|| keymap.entry_repeats(entry));

        match encode(codec, device, entry.scancode, repeats) {
            Ok(pulses) => (pulses, codec.carrier()),
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        }
    } else {
        let codec: CodecType = match &transmit.codec {
            Some(name) => match name.parse() {
                Ok(codec) => codec,
                Err(err) => {
                    eprintln!("error: {err}");
                    exit(1);
                }
            },
            None => {
                eprintln!("error: one of --codec, --keymap or --raw is required");
                exit(1);
            }
        };

        let device = required_number(&transmit.address, "--address");
        let scancode = required_number(&transmit.scancode, "--scancode");

        match encode(codec, device, scancode, transmit.repeats.unwrap_or(0)) {
            Ok(pulses) => (pulses, codec.carrier()),
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        }
    }
}

fn required_number(arg: &Option<String>, name: &str) -> u32 {
    let Some(value) = arg else {
        eprintln!("error: {name} is required");
        exit(1);
    };

    match super::parse_number(value) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("error: {err}");
            exit(1);
        }
    }
}
