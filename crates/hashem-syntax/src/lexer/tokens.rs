//! Token definitions for Hashem.
//!
//! Keywords are Persian words written in Latin script (`bebin`, `bede`,
//! `age`, ...). Everything else follows the usual C-family spelling.

use logos::Logos;

fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0usize;

    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'*' {
            depth += 1;
            i += 2;
            continue;
        }
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                lex.bump(i);
                return true;
            }
            continue;
        }
        i += 1;
    }

    lex.bump(bytes.len());
    false
}

/// All token kinds in Hashem source text.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    /// Whitespace (spaces, tabs, newlines)
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Single-line comment: // ...
    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    LineComment,

    /// Block comment: /* ... */ (supports nesting).
    #[token("/*", lex_block_comment)]
    BlockComment,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    /// `=`
    #[token("=")]
    Assign,

    /// `==`
    #[token("==")]
    EqEq,

    /// `!=`
    #[token("!=")]
    NotEq,

    /// `<`
    #[token("<")]
    Lt,

    /// `<=`
    #[token("<=")]
    LtEq,

    /// `>`
    #[token(">")]
    Gt,

    /// `>=`
    #[token(">=")]
    GtEq,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `*`
    #[token("*")]
    Star,

    /// `/`
    #[token("/")]
    Slash,

    /// `%`
    #[token("%")]
    Percent,

    /// `&&`
    #[token("&&")]
    AndAnd,

    /// `||`
    #[token("||")]
    OrOr,

    /// `!`
    #[token("!")]
    Bang,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    /// `bebin` (function declaration)
    #[token("bebin")]
    KwBebin,

    /// `bede` (return)
    #[token("bede")]
    KwBede,

    /// `age` (if)
    #[token("age")]
    KwAge,

    /// `bood` (then / do)
    #[token("bood")]
    KwBood,

    /// `vagarna` (else)
    #[token("vagarna")]
    KwVagarna,

    /// `ta` (while)
    #[token("ta")]
    KwTa,

    /// `beshkan` (break)
    #[token("beshkan")]
    KwBeshkan,

    /// `edame` (continue)
    #[token("edame")]
    KwEdame,

    /// `debugger` (suspend marker)
    #[token("debugger")]
    KwDebugger,

    /// `true`
    #[token("true")]
    KwTrue,

    /// `false`
    #[token("false")]
    KwFalse,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Integer literal: 0, 42, 1_000
    #[regex(r"[0-9]([0-9]|_[0-9])*")]
    IntLiteral,

    /// Double-quoted string literal without escapes.
    #[regex(r#""[^"\r\n]*""#)]
    StringLiteral,

    // =========================================================================
    // IDENTIFIERS
    // =========================================================================
    /// Identifier: starts with letter or underscore, contains letters, digits, underscores
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // =========================================================================
    // SPECIAL TOKENS
    // =========================================================================
    /// Lexer error - unrecognized character
    #[default]
    Error,

    /// End of file marker (not produced by lexer, reported by the parser cursor)
    Eof,
}

impl TokenKind {
    /// Returns `true` if this token is trivia (whitespace or comment).
    #[inline]
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment
        )
    }

    /// Returns `true` if this token is a keyword.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::KwBebin
                | Self::KwBede
                | Self::KwAge
                | Self::KwBood
                | Self::KwVagarna
                | Self::KwTa
                | Self::KwBeshkan
                | Self::KwEdame
                | Self::KwDebugger
                | Self::KwTrue
                | Self::KwFalse
        )
    }

    /// Returns the binding power for infix operators (left, right).
    #[must_use]
    pub fn infix_binding_power(self) -> Option<(u8, u8)> {
        Some(match self {
            Self::OrOr => (1, 2),
            Self::AndAnd => (3, 4),
            Self::EqEq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => (5, 6),
            Self::Plus | Self::Minus => (7, 8),
            Self::Star | Self::Slash | Self::Percent => (9, 10),
            _ => return None,
        })
    }

    /// Returns the binding power for prefix operators.
    #[must_use]
    pub fn prefix_binding_power(self) -> Option<u8> {
        Some(match self {
            Self::Bang | Self::Minus => 11,
            _ => return None,
        })
    }

    /// Human readable description used in parse errors.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::LineComment | Self::BlockComment => "comment",
            Self::Semicolon => "';'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Assign => "'='",
            Self::EqEq => "'=='",
            Self::NotEq => "'!='",
            Self::Lt => "'<'",
            Self::LtEq => "'<='",
            Self::Gt => "'>'",
            Self::GtEq => "'>='",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::AndAnd => "'&&'",
            Self::OrOr => "'||'",
            Self::Bang => "'!'",
            Self::KwBebin => "'bebin'",
            Self::KwBede => "'bede'",
            Self::KwAge => "'age'",
            Self::KwBood => "'bood'",
            Self::KwVagarna => "'vagarna'",
            Self::KwTa => "'ta'",
            Self::KwBeshkan => "'beshkan'",
            Self::KwEdame => "'edame'",
            Self::KwDebugger => "'debugger'",
            Self::KwTrue => "'true'",
            Self::KwFalse => "'false'",
            Self::IntLiteral => "integer literal",
            Self::StringLiteral => "string literal",
            Self::Ident => "identifier",
            Self::Error => "invalid character",
            Self::Eof => "end of file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        TokenKind::lexer(input)
            .map(|tok| tok.unwrap_or(TokenKind::Error))
            .filter(|kind| !kind.is_trivia())
            .collect()
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(
            kinds("bebin bede age bood vagarna ta"),
            vec![
                TokenKind::KwBebin,
                TokenKind::KwBede,
                TokenKind::KwAge,
                TokenKind::KwBood,
                TokenKind::KwVagarna,
                TokenKind::KwTa,
            ]
        );
    }

    #[test]
    fn keyword_prefixes_are_identifiers() {
        assert_eq!(
            kinds("agent tab bedehi"),
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Ident]
        );
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("== != <= >= && ||"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
            ]
        );
    }

    #[test]
    fn nested_block_comments_are_trivia() {
        assert_eq!(
            kinds("a /* outer /* inner */ still */ b"),
            vec![TokenKind::Ident, TokenKind::Ident]
        );
    }

    #[test]
    fn unknown_characters_are_errors() {
        assert!(kinds("a # b").contains(&TokenKind::Error));
    }
}
