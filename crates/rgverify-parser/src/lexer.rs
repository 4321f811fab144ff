//! Hand-rolled tokeniser for the rgverify program grammar.
//!
//! Every token carries the [`Span`] of source text it came from, so the
//! parser can attach a precise location to any [`SpannedError`] it raises.
//! Multi-character operators (`:=`, `==>`, `&&`, `||`, `<=`, `>=`, `==`,
//! `!=`) are matched greedily before falling back to their single-character
//! prefixes.

use rgverify_base::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Assign,     // :=
    Colon,      // :
    Semi,       // ;
    Comma,      // ,
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    Plus,
    Minus,
    Star,
    Slash,
    AndAnd,  // &&
    OrOr,    // ||
    Bang,    // !
    Implies, // ==>
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenises `source`, or reports the byte offset of the first character it
/// cannot classify.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Span> {
    let bytes = source.as_bytes();
    let mut pos = 0usize;
    let mut tokens = Vec::new();

    while pos < bytes.len() {
        let c = bytes[pos] as char;

        if c.is_whitespace() {
            pos += 1;
            continue;
        }
        if c == '#' {
            // Line comment: the grammar has no use for them, but fixture
            // programs are easier to annotate with one.
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }

        let start = pos;
        if c.is_ascii_digit() {
            while pos < bytes.len() && (bytes[pos] as char).is_ascii_digit() {
                pos += 1;
            }
            let text = &source[start..pos];
            let value: i64 = text
                .parse()
                .map_err(|_| Span::new(start, pos))?;
            tokens.push(Token { kind: TokenKind::Int(value), span: Span::new(start, pos) });
            continue;
        }
        if c.is_ascii_alphabetic() || c == '_' {
            while pos < bytes.len() && {
                let ch = bytes[pos] as char;
                ch.is_ascii_alphanumeric() || ch == '_'
            } {
                pos += 1;
            }
            let text = source[start..pos].to_string();
            tokens.push(Token { kind: TokenKind::Ident(text), span: Span::new(start, pos) });
            continue;
        }

        macro_rules! two {
            ($a:expr, $b:expr, $kind:expr) => {
                if pos + 1 < bytes.len() && bytes[pos] == $a && bytes[pos + 1] == $b {
                    pos += 2;
                    tokens.push(Token { kind: $kind, span: Span::new(start, pos) });
                    continue;
                }
            };
        }
        // `==>` must be matched before the two-character `==` prefix it
        // extends, or this would tokenize as `EqEq` followed by `Gt`.
        if pos + 2 < bytes.len() && &source[pos..pos + 3] == "==>" {
            pos += 3;
            tokens.push(Token { kind: TokenKind::Implies, span: Span::new(start, pos) });
            continue;
        }
        two!(b':', b'=', TokenKind::Assign);
        two!(b'&', b'&', TokenKind::AndAnd);
        two!(b'|', b'|', TokenKind::OrOr);
        two!(b'<', b'=', TokenKind::Le);
        two!(b'>', b'=', TokenKind::Ge);
        two!(b'=', b'=', TokenKind::EqEq);
        two!(b'!', b'=', TokenKind::Ne);

        let kind = match c {
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '!' => TokenKind::Bang,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            _ => return Err(Span::new(start, start + 1)),
        };
        pos += 1;
        tokens.push(Token { kind, span: Span::new(start, pos) });
    }

    let eof_at = source.len();
    tokens.push(Token { kind: TokenKind::Eof, span: Span::new(eof_at, eof_at) });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_assignment_statement() {
        let tokens = tokenize("x := x + 1;").unwrap();
        let kinds: Vec<&TokenKind> = tokens.iter().map(|t| &t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &TokenKind::Ident("x".into()),
                &TokenKind::Assign,
                &TokenKind::Ident("x".into()),
                &TokenKind::Plus,
                &TokenKind::Int(1),
                &TokenKind::Semi,
                &TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_multi_char_operators() {
        let tokens = tokenize("a ==> b && c || d != e").unwrap();
        let kinds: Vec<&TokenKind> = tokens.iter().map(|t| &t.kind).collect();
        assert!(kinds.contains(&&TokenKind::Implies));
        assert!(kinds.contains(&&TokenKind::AndAnd));
        assert!(kinds.contains(&&TokenKind::OrOr));
        assert!(kinds.contains(&&TokenKind::Ne));
    }

    #[test]
    fn skips_line_comments() {
        let tokens = tokenize("x := 1; # trailing note\ny := 2;").unwrap();
        assert!(tokens.iter().all(|t| !matches!(&t.kind, TokenKind::Ident(s) if s == "trailing")));
    }

    #[test]
    fn rejects_unknown_character() {
        assert!(tokenize("x := 1 @ 2;").is_err());
    }
}
