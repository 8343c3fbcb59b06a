use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::LexError;
use crate::literal::Literal;
use crate::token::{Token, Type};

type ScanResult = Result<(), LexError>;

pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    line: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: vec!(),
            line: 1,
        }
    }

    /// Scans the source code and returns a vector of tokens ending with an
    /// EOF sentinel. Stops at the first lexical error.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, LexError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }

        self.tokens.push(Token::new(Type::EOF, String::from(""), None, self.line));

        Ok(std::mem::take(&mut self.tokens))
    }

    /// Consumes and returns the next character.
    fn advance(&mut self) -> char {
        match self.source.next() {
            Some(char) => char,
            None => panic!("tried to advance past end of the file."),
        }
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.source.peek().copied()
    }

    /// Returns the character after the next one without consuming anything.
    fn peek_second(&mut self) -> Option<char> {
        let second = self.source.peek_next().copied();
        self.source.reset_cursor();
        second
    }

    /// Returns if the character after the next one is the expected character.
    fn match_second(&mut self, expected: char) -> bool {
        self.peek_second() == Some(expected)
    }

    /// Adds a new token to the list of tokens.
    fn add_token(&mut self, r#type: Type, lexeme: String, literal: Option<Literal>) {
        self.tokens.push(Token::new(r#type, lexeme, literal, self.line));
    }

    /// Adds a new single char token to the list of tokens.
    fn add_single_char_token(&mut self, r#type: Type) {
        let c = self.advance();
        self.add_token(r#type, c.to_string(), None);
    }

    /// Adds a new double char token to the list of tokens.
    fn add_double_char_token(&mut self, r#type: Type) {
        let first = self.advance();
        let second = self.advance();

        self.add_token(r#type, format!("{first}{second}"), None);
    }

    /// Returns if the scanner has reached the end of the file.
    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    /// Decodes the character following a backslash.
    fn escape(&mut self, start_line: usize, quote: char) -> Result<char, LexError> {
        let escaped = match self.peek() {
            Some(c) => c,
            None => {
                return Err(LexError {
                    line: start_line,
                    message: String::from("Unterminated escape sequence"),
                });
            },
        };
        self.advance();

        match escaped {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            c if c == quote => Ok(c),
            other => Err(LexError {
                line: self.line,
                message: format!("Unknown escape sequence '\\{other}'"),
            }),
        }
    }

    /// Handles a string literal.
    fn string(&mut self) -> ScanResult {
        let start_line = self.line;
        self.advance(); // Move past the starting double quotes.

        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        line: start_line,
                        message: String::from("Unterminated string"),
                    });
                },
                Some('"') => break,
                Some('\\') => {
                    self.advance();
                    value.push(self.escape(start_line, '"')?);
                },
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    value.push('\n');
                },
                Some(c) => {
                    self.advance();
                    value.push(c);
                },
            }
        }

        self.advance(); // Move past the closing double quotes.

        // Literal does not include the double quotes unlike the lexeme.
        self.add_token(Type::String, value.clone(), Some(Literal::String(value)));
        Ok(())
    }

    /// Handles a character literal: exactly one character between single quotes.
    fn character(&mut self) -> ScanResult {
        let start_line = self.line;
        self.advance(); // Move past the starting single quote.

        let value = match self.peek() {
            None => {
                return Err(LexError {
                    line: start_line,
                    message: String::from("Unterminated character literal"),
                });
            },
            Some('\'') => {
                self.advance();
                return Err(LexError {
                    line: start_line,
                    message: String::from("Empty character literal"),
                });
            },
            Some('\\') => {
                self.advance();
                self.escape(start_line, '\'')?
            },
            Some(c) => {
                self.advance();
                c
            },
        };

        match self.peek() {
            Some('\'') => {
                self.advance();
            },
            _ => {
                return Err(LexError {
                    line: start_line,
                    message: String::from("Unterminated character literal"),
                });
            },
        }

        self.add_token(Type::Char, value.to_string(), Some(Literal::Char(value)));
        Ok(())
    }

    /// Handles a number literal. A digit run without a fractional part
    /// decodes as an integer; with one, as a number.
    fn number(&mut self) -> ScanResult {
        let mut value = String::new();

        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            value.push(self.advance());
        }

        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            value.push(self.advance()); // Consume the dot.

            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                value.push(self.advance());
            }
        }

        let literal = if is_float {
            Literal::Number(value.parse().expect("float lexeme to parse"))
        } else {
            match value.parse::<i64>() {
                Ok(integer) => Literal::Integer(integer),
                // A digit run wider than i64 still decodes, as a number.
                Err(_) => Literal::Number(value.parse().expect("digit run to parse")),
            }
        };

        self.add_token(Type::Number, value, Some(literal));
        Ok(())
    }

    /// Handles an identifier or a keyword.
    fn identifier(&mut self) {
        let mut value = Vec::new();

        // is_alphanumeric does not include underscores.
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            value.push(self.advance());
        }

        let value = String::from_iter(value);
        let (token_type, literal) = match value.as_str() {
            "and"      => (Type::And, None),
            "assert"   => (Type::Assert, None),
            "char"     => (Type::CharType, None),
            "else"     => (Type::Else, None),
            "false"    => (Type::False, Some(Literal::Bool(false))),
            "float"    => (Type::FloatType, None),
            "for"      => (Type::For, None),
            "from"     => (Type::From, None),
            "function" => (Type::Function, None),
            "if"       => (Type::If, None),
            "import"   => (Type::Import, None),
            "int"      => (Type::IntType, None),
            "list"     => (Type::ListType, None),
            "map"      => (Type::MapType, None),
            "nil"      => (Type::Nil, Some(Literal::Nil)),
            "or"       => (Type::Or, None),
            "print"    => (Type::Print, None),
            "return"   => (Type::Return, None),
            "string"   => (Type::StringType, None),
            "true"     => (Type::True, Some(Literal::Bool(true))),
            "var"      => (Type::Var, None),
            "while"    => (Type::While, None),
            "loadlib"  => (Type::LoadLib, None),
            "getproc"  => (Type::GetProc, None),
            "freelib"  => (Type::FreeLib, None),
            "callext"  => (Type::CallExt, None),
            _          => (Type::Identifier, None),
        };

        self.add_token(token_type, value, literal);
    }

    /// Scans the next token.
    fn scan_token(&mut self) -> ScanResult {
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(()),
        };

        match c {
            // One character tokens
            '(' => self.add_single_char_token(Type::LeftParen),
            ')' => self.add_single_char_token(Type::RightParen),
            '{' => self.add_single_char_token(Type::LeftBrace),
            '}' => self.add_single_char_token(Type::RightBrace),
            '[' => self.add_single_char_token(Type::LeftBracket),
            ']' => self.add_single_char_token(Type::RightBracket),
            ',' => self.add_single_char_token(Type::Comma),
            '.' => self.add_single_char_token(Type::Dot),
            '-' => self.add_single_char_token(Type::Minus),
            '+' => self.add_single_char_token(Type::Plus),
            ';' => self.add_single_char_token(Type::Semicolon),
            '*' => self.add_single_char_token(Type::Star),

            // Two character tokens
            '!' => {
                if self.match_second('=') {
                    self.add_double_char_token(Type::BangEqual);
                } else {
                    self.add_single_char_token(Type::Bang)
                };
            },
            '=' => {
                if self.match_second('=') {
                    self.add_double_char_token(Type::EqualEqual);
                } else {
                    self.add_single_char_token(Type::Equal)
                };
            },
            '<' => {
                if self.match_second('=') {
                    self.add_double_char_token(Type::LessEqual);
                } else {
                    self.add_single_char_token(Type::Less)
                };
            },
            '>' => {
                if self.match_second('=') {
                    self.add_double_char_token(Type::GreaterEqual);
                } else {
                    self.add_single_char_token(Type::Greater)
                };
            },

            // A lone '&' or '|' is not a token.
            '&' => {
                if self.match_second('&') {
                    self.add_double_char_token(Type::AmpAmp);
                } else {
                    self.advance();
                    return Err(LexError {
                        line: self.line,
                        message: String::from("Unexpected character '&'"),
                    });
                }
            },
            '|' => {
                if self.match_second('|') {
                    self.add_double_char_token(Type::PipePipe);
                } else {
                    self.advance();
                    return Err(LexError {
                        line: self.line,
                        message: String::from("Unexpected character '|'"),
                    });
                }
            },

            '/' => {
                if self.match_second('/') {
                    // A comment goes until the end of the line.
                    while matches!(self.peek(), Some(c) if c != '\n') {
                        self.advance();
                    }
                } else {
                    self.add_single_char_token(Type::Slash);
                }
            },

            // Ignore whitespace
            ' ' | '\r' | '\t' => {
                self.advance();
            },

            // Update line counter
            '\n' => {
                self.advance();
                self.line += 1;
            },

            // String
            '"' => return self.string(),

            // Character
            '\'' => return self.character(),

            // Numbers
            c if c.is_ascii_digit() => return self.number(),

            // Identifiers
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => {
                self.advance();

                return Err(LexError {
                    line: self.line,
                    message: format!("Unexpected character '{c}'"),
                });
            },
        }

        Ok(())
    }
}
