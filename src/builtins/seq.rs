use std::io::Write;

use super::Builtin;

/// `seq LOW HIGH`: one integer per line, inclusive.
pub struct Seq;

/// Parse an integer with C `strtol(.., 0)` prefixes: `0x` hex, leading `0`
/// octal, decimal otherwise. The whole string must be consumed.
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i64::from_str_radix(body, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

impl Builtin for Seq {
    fn run(&self, args: &[String], out: &mut dyn Write) -> i32 {
        let [low, high] = args else {
            log::warn!("seq: expected LOW HIGH, got {} arguments", args.len());
            return 1;
        };
        let (Some(low), Some(high)) = (parse_int(low), parse_int(high)) else {
            log::warn!("seq: invalid number in {low:?} {high:?}");
            return 1;
        };
        for i in low..=high {
            if let Err(e) = writeln!(out, "{i}") {
                log::warn!("seq: {e}");
                return 1;
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(args: &[&str]) -> (i32, String) {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let status = Seq.run(&args, &mut out);
        (status, String::from_utf8(out).unwrap())
    }

    #[test]
    fn inclusive_range() {
        assert_eq!(seq(&["1", "3"]), (0, "1\n2\n3\n".into()));
    }

    #[test]
    fn empty_when_low_above_high() {
        assert_eq!(seq(&["5", "1"]), (0, String::new()));
    }

    #[test]
    fn negative_bounds() {
        assert_eq!(seq(&["-1", "1"]), (0, "-1\n0\n1\n".into()));
    }

    #[test]
    fn base_prefixes() {
        assert_eq!(parse_int("0x10"), Some(16));
        assert_eq!(parse_int("010"), Some(8));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("-0x1f"), Some(-31));
        assert_eq!(parse_int("42"), Some(42));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("12abc"), None);
        assert_eq!(parse_int("09"), None);
        assert_eq!(parse_int("--1"), None);
        assert_eq!(parse_int("0x"), None);
    }

    #[test]
    fn wrong_arity_fails() {
        assert_eq!(seq(&["1"]).0, 1);
        assert_eq!(seq(&["1", "2", "3"]).0, 1);
        assert_eq!(seq(&["a", "2"]).0, 1);
    }
}
