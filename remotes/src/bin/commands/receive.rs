use remotes::keymap::Keymaps;
use remotes::{Codec, LircSource, Merger, PulseSource, RemoteEvent};
use std::process::exit;
use std::sync::Arc;

pub fn receive(receive: &crate::Receive) {
    let codecs = super::codec_list(&receive.codecs);

    let keymaps = receive.keymaps.as_ref().map(|dir| match Keymaps::load(dir) {
        Ok(keymaps) => keymaps,
        Err(err) => {
            eprintln!("error: {}: {err}", dir.display());
            exit(1);
        }
    });

    let source: Arc<dyn PulseSource> = match LircSource::new(&receive.device) {
        Ok(source) => Arc::new(source),
        Err(err) => {
            eprintln!("error: {}: {err}", receive.device.display());
            exit(1);
        }
    };

    if let Some(timeout) = receive.timeout {
        if let Err(err) = source.set_receive_timeout(timeout) {
            eprintln!("warning: failed to set receive timeout: {err}");
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    runtime.block_on(async {
        let mut instances = Vec::new();

        for codec_type in codecs {
            match Codec::new(source.clone(), codec_type) {
                Ok(codec) => instances.push(codec),
                Err(err) => {
                    eprintln!("error: {err}");
                    exit(1);
                }
            }
        }

        let subscriptions = instances.iter().map(|codec| codec.subscribe()).collect();
        let mut merger = Merger::new(subscriptions);

        loop {
            tokio::select! {
                event = merger.recv() => match event {
                    Some(event) => print_event(&event, keymaps.as_ref()),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        merger.close();

        for codec in instances {
            codec.close().await;
        }
    });
}

fn print_event(event: &RemoteEvent, keymaps: Option<&Keymaps>) {
    let repeat = if event.repeat { " repeat" } else { "" };

    let mut line = format!(
        "{} device=0x{:04X} scancode=0x{:02X}{repeat}",
        event.codec, event.device, event.scancode
    );

    if let Some(keymaps) = keymaps {
        for (keymap, entry) in keymaps.lookup(event.codec, event.device, event.scancode) {
            line.push_str(&format!(" {}:{}", keymap.name, entry.keycode));
        }
    }

    println!("{line}");
}
