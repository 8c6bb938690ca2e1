//! Textual raw IR, e.g. "+9000 -4500 +562"

use crate::Error;

/// Parse a raw IR string. Pulses may carry a `+` prefix, spaces a `-`;
/// either way the entries must alternate starting with a pulse.
pub fn parse(s: &str) -> Result<Vec<u32>, Error> {
    let mut res = Vec::new();

    for (i, e) in s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|e| !e.is_empty())
        .enumerate()
    {
        let mut chars = e.chars().peekable();

        match chars.peek() {
            Some('+') => {
                if i % 2 != 0 {
                    return Err(Error::InvalidArgument(
                        "unexpected ‘+’ encountered".to_string(),
                    ));
                }
                chars.next();
            }
            Some('-') => {
                if i % 2 == 0 {
                    return Err(Error::InvalidArgument(
                        "unexpected ‘-’ encountered".to_string(),
                    ));
                }
                chars.next();
            }
            Some(ch) if !ch.is_numeric() => {
                return Err(Error::InvalidArgument(format!(
                    "unexpected ‘{ch}’ encountered"
                )));
            }
            _ => (),
        }

        let v = chars.collect::<String>();

        let v = v
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("invalid number ‘{v}’")))?;

        if v == 0 {
            return Err(Error::InvalidArgument(
                "nonsensical 0 length".to_string(),
            ));
        }

        res.push(v);
    }

    if res.is_empty() {
        return Err(Error::InvalidArgument("missing length".to_string()));
    }

    Ok(res)
}

/// Print durations in raw IR form
pub fn print_to_string(pulses: &[u32]) -> String {
    pulses
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}{}", if i % 2 == 0 { "+" } else { "-" }, v))
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_signs() {
        assert_eq!(parse("+100 -100").unwrap(), vec![100, 100]);
        assert_eq!(parse("100,100,+1,-20000").unwrap(), vec![100, 100, 1, 20000]);

        assert!(parse("+100 +100").is_err());
        assert!(parse("+100 -100 -1").is_err());
        assert!(parse("+a").is_err());
        assert!(parse("+0").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn print() {
        assert_eq!(print_to_string(&[100, 50, 75]), "+100 -50 +75");
    }
}
