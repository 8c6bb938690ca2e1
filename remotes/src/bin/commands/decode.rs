use remotes::{rawir, Decoder, PulseEvent, RemoteEvent};
use std::fs;
use std::process::exit;

/// Idle report appended after each capture, sized like a typical driver
/// rec_timeout; the decoders only care that the line went idle
const IDLE_TIMEOUT: u32 = 100_000;

pub fn decode(decode: &crate::Decode) {
    let mut decoders: Vec<Decoder> = super::codec_list(&decode.codecs)
        .into_iter()
        .map(|codec_type| match Decoder::new(codec_type) {
            Ok(decoder) => decoder,
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        })
        .collect();

    let mut inputs: Vec<String> = decode.raw.clone();

    for path in &decode.files {
        match fs::read_to_string(path) {
            Ok(contents) => inputs.push(contents),
            Err(err) => {
                eprintln!("error: {}: {err}", path.display());
                exit(1);
            }
        }
    }

    if inputs.is_empty() {
        eprintln!("error: no input; use --raw or --file");
        exit(1);
    }

    for input in &inputs {
        let pulses = match rawir::parse(input) {
            Ok(pulses) => pulses,
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        };

        for event in PulseEvent::from_pulses(&pulses) {
            for decoder in &mut decoders {
                if let Some(remote) = decoder.input(event) {
                    print_event(&remote);
                }
            }
        }

        // end of capture means the line went idle
        for decoder in &mut decoders {
            if let Some(remote) = decoder.input(PulseEvent::timeout(IDLE_TIMEOUT)) {
                print_event(&remote);
            }

            decoder.reset();
        }
    }
}

fn print_event(event: &RemoteEvent) {
    let repeat = if event.repeat { " repeat" } else { "" };

    println!(
        "decoded: {} device=0x{:04X} scancode=0x{:02X}{repeat}",
        event.codec, event.device, event.scancode
    );
}
