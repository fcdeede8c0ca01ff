//! Splits one line of `clang -###` output into tokens. Clang prints each
//! argument double-quoted with `\"` / `\\` escaped, one command per line;
//! this undoes exactly that quoting (not a general POSIX shell grammar).

pub fn split(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.trim().chars().peekable();

    while chars.peek().is_some() {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut token = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '"' => break,
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            token.push(escaped);
                        }
                    }
                    c => token.push(c),
                }
            }
        } else {
            while matches!(chars.peek(), Some(c) if !c.is_whitespace()) {
                token.push(chars.next().unwrap());
            }
        }
        tokens.push(token);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_quoted_tokens() {
        let line = r#""-cc1" "-triple" "x86_64-unknown-linux-gnu" "-emit-obj""#;
        assert_eq!(
            split(line),
            vec!["-cc1", "-triple", "x86_64-unknown-linux-gnu", "-emit-obj"]
        );
    }

    #[test]
    fn unescapes_quotes_and_backslashes_inside_tokens() {
        let line = r#""-D" "FOO=\"bar\"""#;
        assert_eq!(split(line), vec!["-D", "FOO=\"bar\""]);
    }

    #[test]
    fn handles_unquoted_tokens_too() {
        assert_eq!(split("clang -cc1 a.c"), vec!["clang", "-cc1", "a.c"]);
    }
}
