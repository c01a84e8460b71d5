use logos::Logos;
use std::fmt;

/// Markup tokens. Start tags are lexed whole; their attributes are split
/// out by the reader.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    #[regex(r"<\?([^?]|\?[^>])*\?>", |lex| lex.slice())]
    ProcessingInstruction(&'src str),

    #[regex(r"<!--([^-]|-[^-])*-->")]
    Comment,

    #[regex(r"<!\[CDATA\[([^\]]|\][^\]]|\]\]+[^\]>])*\]\]+>", |lex| {
        let s = lex.slice();
        &s[9..s.len() - 3]
    })]
    CData(&'src str),

    #[regex(r"<![A-Za-z][^\[>]*(\[[^\]]*\][ \t\r\n]*)?>", |lex| lex.slice())]
    Doctype(&'src str),

    #[regex(r"</[^> \t\r\n]+[ \t\r\n]*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim_end()
    })]
    EndTag(&'src str),

    #[regex(r#"<[A-Za-z_:][^>"' \t\r\n/]*([ \t\r\n]+[^>"' \t\r\n=/]+[ \t\r\n]*=[ \t\r\n]*("[^"]*"|'[^']*'))*[ \t\r\n]*/?>"#, |lex| lex.slice())]
    StartTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::ProcessingInstruction(s) => write!(f, "{}", s),
            Token::Comment => write!(f, "<!-- -->"),
            Token::CData(s) => write!(f, "<![CDATA[{}]]>", s),
            Token::Doctype(s) => write!(f, "{}", s),
            Token::EndTag(name) => write!(f, "</{}>", name),
            Token::StartTag(s) => write!(f, "{}", s),
            Token::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Tokenize markup. A span that no token matches is reported as `Err(pos)`.
pub fn tokenize(source: &str) -> Result<Vec<(Token, std::ops::Range<usize>)>, usize> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok((token, span)),
            Err(()) => Err(span.start),
        })
        .collect()
}
