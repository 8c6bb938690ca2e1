use remotes::CodecType;
use std::process::exit;

pub mod decode;
pub mod keymap;
pub mod receive;
pub mod transmit;

/// Parse a decimal or 0x-prefixed hex number
fn parse_number(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
    .map_err(|_| format!("invalid number ‘{s}’"))
}

/// Resolve --codec arguments to codec types, defaulting to every supported
/// codec when none were given
fn codec_list(names: &[String]) -> Vec<CodecType> {
    if names.is_empty() {
        return CodecType::SUPPORTED.to_vec();
    }

    names
        .iter()
        .map(|name| match name.parse() {
            Ok(codec) => codec,
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        })
        .collect()
}
