//! Primitive readers over one trace-log line.
//!
//! Each reader takes the remaining slice of the line and returns the token
//! (if any) plus the slice past it. Readers never panic on malformed input;
//! they return `None`/empty so the parser can decide how to fail.

/// Consumes a run of ASCII whitespace (possibly empty) and returns the rest.
pub fn skip_blanks(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

/// Reads an optionally-signed decimal integer.
pub fn read_int(line: &str) -> Option<(i64, &str)> {
    let line = skip_blanks(line);
    let mut end = 0;
    let bytes = line.as_bytes();
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    line[..end].parse::<i64>().ok().map(|n| (n, &line[end..]))
}

/// Reads a literal punctuation character, skipping leading blanks first.
pub fn read_char(line: &str, c: char) -> Option<&str> {
    let line = skip_blanks(line);
    let mut chars = line.chars();
    if chars.next() == Some(c) {
        Some(chars.as_str())
    } else {
        None
    }
}

/// Reads the literal keyword `resumed>`, skipping leading blanks first.
pub fn read_resumed_keyword(line: &str) -> Option<&str> {
    let line = skip_blanks(line);
    line.strip_prefix("resumed>")
}

/// Reads a C-style double-quoted string, unescaping standard backslash
/// escapes (`\n`, `\t`, `\r`, `\\`, `\"`, `\xHH`, `\OOO`). Returns the
/// unescaped content plus the slice past the closing quote.
pub fn read_string(line: &str) -> Option<(String, &str)> {
    let line = skip_blanks(line);
    let mut chars = line.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        _ => return None,
    }

    let mut out = String::new();
    loop {
        let (idx, c) = chars.next()?;
        match c {
            '"' => {
                let rest = &line[idx + 1..];
                return Some((out, rest));
            }
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'a' => out.push('\u{07}'),
                    'b' => out.push('\u{08}'),
                    'f' => out.push('\u{0C}'),
                    'v' => out.push('\u{0B}'),
                    'x' => {
                        let mut hex = String::new();
                        for _ in 0..2 {
                            match chars.clone().next() {
                                Some((_, h)) if h.is_ascii_hexdigit() => {
                                    hex.push(h);
                                    chars.next();
                                }
                                _ => break,
                            }
                        }
                        if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                            out.push(byte as char);
                        }
                    }
                    '0'..='7' => {
                        // strace favors octal over \x for unprintable bytes;
                        // up to 3 octal digits, the first already consumed.
                        let mut octal = String::new();
                        octal.push(escaped);
                        for _ in 0..2 {
                            match chars.clone().next() {
                                Some((_, d)) if ('0'..='7').contains(&d) => {
                                    octal.push(d);
                                    chars.next();
                                }
                                _ => break,
                            }
                        }
                        if let Ok(byte) = u8::from_str_radix(&octal, 8) {
                            out.push(byte as char);
                        }
                    }
                    other => out.push(other),
                }
            }
            c => out.push(c),
        }
    }
}

/// Reads up to (and optionally past) the first occurrence of `needle`,
/// skipping leading blanks first. With `drop = true` the matched needle is
/// consumed from the remainder; with `drop = false` it stays.
pub fn read_until(line: &str, needle: &str, drop: bool) -> Option<(&str, &str)> {
    let line = skip_blanks(line);
    let pos = line.find(needle)?;
    if drop {
        Some((&line[..pos], &line[pos + needle.len()..]))
    } else {
        Some((&line[..pos + needle.len()], &line[pos + needle.len()..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_string() {
        let (s, rest) = read_string(r#""hello" tail"#).unwrap();
        assert_eq!(s, "hello");
        assert_eq!(rest, " tail");
    }

    #[test]
    fn unescapes_octal_sequences() {
        let (s, _) = read_string(r#""\061\062\0""#).unwrap();
        assert_eq!(s, "12\0");
    }

    #[test]
    fn unescapes_backslash_sequences() {
        let (s, _) = read_string(r#""a\"b\\c\n""#).unwrap();
        assert_eq!(s, "a\"b\\c\n");
    }

    #[test]
    fn reads_signed_int() {
        let (n, rest) = read_int("  -12 more").unwrap();
        assert_eq!(n, -12);
        assert_eq!(rest, " more");
    }

    #[test]
    fn reads_resumed_keyword() {
        let rest = read_resumed_keyword("  resumed> ) = 0").unwrap();
        assert_eq!(rest, " ) = 0");
    }

    #[test]
    fn read_until_drop_and_keep() {
        let (head, rest) = read_until("execve(rest", "(", true).unwrap();
        assert_eq!(head, "execve");
        assert_eq!(rest, "rest");

        let (head, rest) = read_until("foo = 0", "=", false).unwrap();
        assert_eq!(head, "foo =");
        assert_eq!(rest, " 0");
    }
}
