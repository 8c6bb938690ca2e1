use remotes::{encode, CodecType, Decoder, PulseEvent};

/// Magnitude of the idle report, a typical driver rec_timeout default. The
/// decoders must not care about the value, only that the line went idle.
const IDLE_TIMEOUT: u32 = 100_000;

/// Feed a transmit array into a decoder the way a receiver would see it,
/// ending with the idle timeout report a receiver produces when the line
/// goes quiet.
fn feed(decoder: &mut Decoder, pulses: &[u32]) -> Vec<remotes::RemoteEvent> {
    let mut events = Vec::new();

    for event in PulseEvent::from_pulses(pulses) {
        if let Some(remote) = decoder.input(event) {
            events.push(remote);
        }
    }

    if let Some(remote) = decoder.input(PulseEvent::timeout(IDLE_TIMEOUT)) {
        events.push(remote);
    }

    events
}

fn roundtrip(codec: CodecType, device: u32, scancode: u32, repeats: u32) -> Vec<remotes::RemoteEvent> {
    let pulses = encode(codec, device, scancode, repeats).unwrap();
    let mut decoder = Decoder::new(codec).unwrap();

    feed(&mut decoder, &pulses)
}

#[test]
fn roundtrip_all_codecs() {
    let cases = [
        (CodecType::Nec32, 0x7F80, 0x13),
        (CodecType::Nec32, 0x0000, 0x00),
        (CodecType::Nec32, 0xFFFF, 0xFF),
        (CodecType::Nec16, 0x12, 0x34),
        (CodecType::Nec16, 0xFF, 0xFF),
        (CodecType::AppleTv, 0xEB, 0x30),
        (CodecType::AppleTv, 0x00, 0xFF),
        (CodecType::Sony12, 0x01, 0x12),
        (CodecType::Sony12, 0x1F, 0x7F),
        (CodecType::Sony15, 0xFF, 0x00),
        (CodecType::Sony20, 0x1FFF, 0x7F),
        (CodecType::Sony20, 0x0001, 0x12),
        (CodecType::Panasonic, 0x8000, 0x3D),
        (CodecType::Panasonic, 0xFFFF, 0xFF),
        (CodecType::Rc5, 0x14, 0x2C),
        (CodecType::Rc5, 0x14, 0x2D),
        (CodecType::Rc5, 0x1F, 0x3F),
        (CodecType::Rc5, 0x00, 0x00),
    ];

    for (codec, device, scancode) in cases {
        let events = roundtrip(codec, device, scancode, 0);

        assert_eq!(events.len(), 1, "{codec} 0x{device:X}/0x{scancode:X}");

        let event = &events[0];
        assert_eq!(event.codec, codec);
        assert_eq!(event.device, device, "{codec} device");
        assert_eq!(event.scancode, scancode, "{codec} scancode");
        assert!(!event.repeat);
    }
}

#[test]
fn repeat_flag() {
    for (codec, device, scancode, repeats) in [
        (CodecType::Nec32, 0x7F80, 0x13, 2),
        (CodecType::Nec16, 0x12, 0x34, 2),
        (CodecType::AppleTv, 0xEB, 0x30, 1),
        (CodecType::Sony12, 0x01, 0x12, 1),
        (CodecType::Sony15, 0x42, 0x20, 3),
        (CodecType::Panasonic, 0x8000, 0x3D, 2),
        (CodecType::Rc5, 0x14, 0x2C, 2),
    ] {
        let events = roundtrip(codec, device, scancode, repeats);

        assert_eq!(events.len(), repeats as usize + 1, "{codec}");
        assert!(!events[0].repeat, "{codec} first frame");

        for event in &events[1..] {
            assert!(event.repeat, "{codec} continuation");
            assert_eq!(event.device, device);
            assert_eq!(event.scancode, scancode);
        }
    }
}

#[test]
fn nec32_pulse_array_shape() {
    let pulses = encode(CodecType::Nec32, 0x7F80, 0x13, 0).unwrap();

    assert_eq!(&pulses[..3], &[9000, 4500, 562]);
}

#[test]
fn noise_rejection() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let noise: Vec<u32> = (0..2000).map(|_| rng.gen_range(100..100_000)).collect();

    for codec in CodecType::SUPPORTED {
        let mut decoder = Decoder::new(codec).unwrap();
        let events = feed(&mut decoder, &noise);

        assert!(events.is_empty(), "{codec} decoded noise: {events:?}");
    }
}

#[test]
fn partial_frame_reset() {
    let clean = encode(CodecType::Nec32, 0x7F80, 0x13, 0).unwrap();

    // break one event at a time, at every position in the frame; 20000µs
    // falls outside every window the nec machine uses mid-frame
    for position in 0..clean.len() {
        let mut stream = clean.clone();
        stream[position] = 20000;
        stream.extend_from_slice(&clean);

        let mut decoder = Decoder::new(CodecType::Nec32).unwrap();
        let events = feed(&mut decoder, &stream);

        assert_eq!(events.len(), 1, "corrupt at {position}");
        assert_eq!(events[0].device, 0x7F80);
        assert_eq!(events[0].scancode, 0x13);
        assert!(!events[0].repeat);
    }
}

#[test]
fn nec32_check_byte_mismatch_dropped() {
    // a hand-built frame whose low byte is not the inverted scancode
    let mut pulses = vec![9000, 4500];

    for byte in [0x7Fu8, 0x80, 0x13, 0x13] {
        for bit in (0..8).rev() {
            pulses.push(562);
            pulses.push(if byte >> bit & 1 == 1 { 1688 } else { 562 });
        }
    }

    pulses.push(562);

    let mut decoder = Decoder::new(CodecType::Nec32).unwrap();

    assert!(feed(&mut decoder, &pulses).is_empty());
}

#[test]
fn panasonic_checksum() {
    // E4: preamble 0x4004, device 0x80, subdevice 0x00, scancode 0x3D
    let good = panasonic_frame(0x4004_8000_3DBDu64);
    let mut decoder = Decoder::new(CodecType::Panasonic).unwrap();
    let events = feed(&mut decoder, &good);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].device, 0x8000);
    assert_eq!(events[0].scancode, 0x3D);

    // E5: same frame with a zeroed checksum
    let bad = panasonic_frame(0x4004_8000_3D00u64);
    let mut decoder = Decoder::new(CodecType::Panasonic).unwrap();

    assert!(feed(&mut decoder, &bad).is_empty());
}

fn panasonic_frame(value: u64) -> Vec<u32> {
    let mut pulses = vec![3500, 1700];

    for bit in (0..48).rev() {
        pulses.push(450);
        pulses.push(if value >> bit & 1 == 1 { 1300 } else { 450 });
    }

    pulses.push(450);
    pulses
}

#[test]
fn appletv_disambiguation() {
    // E6: 0x77E1_30_EB decodes as appletv and is rejected by nec32
    let pulses = encode(CodecType::AppleTv, 0xEB, 0x30, 0).unwrap();

    let mut appletv = Decoder::new(CodecType::AppleTv).unwrap();
    let events = feed(&mut appletv, &pulses);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].codec, CodecType::AppleTv);
    assert_eq!(events[0].device, 0xEB);
    assert_eq!(events[0].scancode, 0x30);

    let mut nec32 = Decoder::new(CodecType::Nec32).unwrap();

    assert!(feed(&mut nec32, &pulses).is_empty());
}

#[test]
fn nec32_ignores_shorter_sony_frames() {
    // two codecs share one stream; a sony transmission must not confuse nec
    let pulses = encode(CodecType::Sony12, 0x01, 0x12, 1).unwrap();
    let mut decoder = Decoder::new(CodecType::Nec32).unwrap();

    assert!(feed(&mut decoder, &pulses).is_empty());
}

#[test]
fn rc5_completion_is_timeout_magnitude_independent() {
    // an even scancode leaves the final idle half-symbol off the wire, so
    // the frame can only complete on the idle report; any magnitude must do
    let pulses = encode(CodecType::Rc5, 0x14, 0x2C, 0).unwrap();

    for timeout in [2000, 25_000, 130_000, 1_000_000] {
        let mut decoder = Decoder::new(CodecType::Rc5).unwrap();
        let mut events = Vec::new();

        for event in PulseEvent::from_pulses(&pulses) {
            if let Some(remote) = decoder.input(event) {
                events.push(remote);
            }
        }

        if let Some(remote) = decoder.input(PulseEvent::timeout(timeout)) {
            events.push(remote);
        }

        assert_eq!(events.len(), 1, "timeout {timeout}");
        assert_eq!(events[0].device, 0x14);
        assert_eq!(events[0].scancode, 0x2C);
        assert!(!events[0].repeat);
    }
}

#[test]
fn nec16_does_not_claim_longer_nec_frames() {
    for codec in [CodecType::Nec32, CodecType::AppleTv] {
        let pulses = encode(codec, 0x12, 0x34, 1).unwrap();
        let mut decoder = Decoder::new(CodecType::Nec16).unwrap();

        assert!(feed(&mut decoder, &pulses).is_empty(), "{codec}");
    }
}

#[test]
fn sony12_does_not_claim_sony20_frames() {
    let pulses = encode(CodecType::Sony20, 0x1FFF, 0x7F, 0).unwrap();
    let mut decoder = Decoder::new(CodecType::Sony12).unwrap();

    assert!(feed(&mut decoder, &pulses).is_empty());
}

#[test]
fn decoder_reset_discards_partial_frame() {
    let pulses = encode(CodecType::Nec32, 0x7F80, 0x13, 0).unwrap();
    let mut decoder = Decoder::new(CodecType::Nec32).unwrap();

    // half a frame, then a reset, then a full frame
    for event in PulseEvent::from_pulses(&pulses[..20]) {
        assert!(decoder.input(event).is_none());
    }

    decoder.reset();

    let events = feed(&mut decoder, &pulses);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].device, 0x7F80);
}

#[test]
fn unsupported_codec_is_invalid_argument() {
    for codec in [CodecType::Jvc, CodecType::Sanyo, CodecType::Rc6Mce, CodecType::None] {
        assert!(matches!(
            Decoder::new(codec),
            Err(remotes::Error::InvalidArgument(_))
        ));
        assert!(matches!(
            encode(codec, 1, 1, 0),
            Err(remotes::Error::InvalidArgument(_))
        ));
    }
}
