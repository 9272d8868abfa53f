//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone el texto fuente
//! en unidades léxicas denominadas tokens. Los espacios en blanco se
//! descartan durante esta operación. El flujo resultante siempre termina
//! en [`Token::Eof`].
//!
//! # Autómata
//! El escaneo se realiza con un autómata finito determinista descrito
//! por dos tablas independientes: una tabla de transiciones
//! (estado × clase de carácter → estado) y una tabla de finalización
//! (estado final → token). Se mantienen dos cursores sobre la entrada:
//! uno externo que marca el inicio del token actual y uno interno que
//! avanza mientras el autómata no alcance un estado final. Algunos
//! estados finales se alcanzan por lookahead (identificadores, enteros,
//! `*` y `=`), en cuyo caso el carácter que provocó la transición no
//! forma parte del lexema y queda disponible para el siguiente token.
//!
//! # Tabla de símbolos
//! Como efecto secundario, cada identificador distinto se registra en la
//! [`SymbolTable`] sin tipo. Las palabras clave tienen prioridad sobre
//! los identificadores.
//!
//! # Errores
//! Cualquier carácter que el estado actual no pueda clasificar aborta
//! el escaneo. No hay recuperación de errores.

use std::{
    borrow::Borrow,
    fmt::{self, Display},
    str::FromStr,
    sync::Arc,
};

use log::trace;
use thiserror::Error;

use crate::symtab::SymbolTable;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Bad character {0:?} in input stream")]
    BadChar(char),

    /// La entrada terminó en un estado sin transición de salida.
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

pub type Lex<T> = Result<T, LexerError>;

/// Un identificador.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(Arc<str>);

impl Identifier {
    pub fn new(name: &str) -> Self {
        Identifier(Arc::from(name))
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

/// Objeto resultante del análisis léxico.
///
/// Solamente los identificadores y las constantes enteras conservan
/// su lexema. Las constantes no se resuelven aquí: su texto se
/// interpreta durante la generación de IR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identificador.
    Id(Identifier),

    /// Literal entero, tal y como aparece en el código fuente.
    IntConst(String),

    /// Palabra clave.
    Keyword(Keyword),

    /// `=`
    Assign,

    /// `==`
    Equal,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `**`
    Power,

    /// `/`
    Slash,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `;`
    Semicolon,

    /// Fin de la entrada.
    Eof,
}

impl Token {
    /// Nombre de la clase de token, tal y como se escribe en volcados.
    pub fn kind(&self) -> &'static str {
        use Token::*;

        match self {
            Id(_) => "id",
            IntConst(_) => "IntConst",
            Keyword(keyword) => keyword.as_str(),
            Assign => "=",
            Equal => "==",
            Plus => "+",
            Minus => "-",
            Times => "*",
            Power => "**",
            Slash => "/",
            OpenParen => "(",
            CloseParen => ")",
            Semicolon => "Semicolon",
            Eof => "eof",
        }
    }

    /// Lexema asociado, si el token lo conserva.
    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Id(id) => Some(id.as_ref()),
            Token::IntConst(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "({},{})", self.kind(), self.text().unwrap_or(""))
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Int,
    Return,
}

impl Keyword {
    fn as_str(self) -> &'static str {
        match self {
            Keyword::Int => "int",
            Keyword::Return => "return",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        const KEYWORDS: &[(&str, Keyword)] = &[
            ("int",    Keyword::Int),
            ("return", Keyword::Return),
        ];

        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Clases de carácter que distingue la tabla de transiciones.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Class {
    Letter,
    Digit,
    Blank,
    Char(char),
    End,
}

impl Class {
    fn of(c: Option<char>) -> Class {
        match c {
            None => Class::End,
            Some(c) if c.is_alphabetic() => Class::Letter,
            Some(c) if c.is_ascii_digit() => Class::Digit,
            Some(' ' | '\n' | '\t' | '\r') => Class::Blank,
            Some(c) => Class::Char(c),
        }
    }
}

/// Estados del autómata.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Identificador o palabra clave en progreso.
    Word,

    /// Constante entera en progreso.
    Integer,

    /// Se encontró `*`, puede seguir otro `*`.
    Star,

    /// Se encontró `=`, puede seguir otro `=`.
    Equals,

    // Estados finales
    WordEnd,
    IntegerEnd,
    Power,
    Times,
    Equal,
    Assign,
    OpenParen,
    CloseParen,
    Semicolon,
    Plus,
    Minus,
    Slash,
    Blank,
}

impl State {
    fn is_final(self) -> bool {
        use State::*;
        !matches!(self, Start | Word | Integer | Star | Equals)
    }

    /// Indica si el estado final se alcanzó por lookahead, en cuyo caso
    /// el último carácter observado no pertenece al lexema.
    fn retracts(self) -> bool {
        use State::*;
        matches!(self, WordEnd | IntegerEnd | Times | Assign)
    }

    /// Tabla de transiciones. `None` significa que el carácter no es
    /// clasificable desde este estado.
    fn transition(self, class: Class) -> Option<State> {
        use Class::{Blank as B, Char, Digit, End, Letter};
        use State::*;

        let next = match (self, class) {
            (Start, Char('*')) => Star,
            (Start, Char('=')) => Equals,
            (Start, Char('(')) => OpenParen,
            (Start, Char(')')) => CloseParen,
            (Start, Char(';')) => Semicolon,
            (Start, Char('+')) => Plus,
            (Start, Char('-')) => Minus,
            (Start, Char('/')) => Slash,
            (Start, Letter) => Word,
            (Start, Digit) => Integer,
            (Start, B) => Blank,
            (Start, Char(_) | End) => return None,

            (Word, Letter | Digit) => Word,
            (Word, _) => WordEnd,

            (Integer, Digit) => Integer,
            (Integer, _) => IntegerEnd,

            // Bifurcaciones `*`/`**` y `=`/`==`
            (Star, Char('*')) => Power,
            (Star, _) => Times,
            (Equals, Char('=')) => Equal,
            (Equals, _) => Assign,

            // Los estados finales no tienen transiciones de salida
            (_, _) => return None,
        };

        Some(next)
    }

    /// Tabla de finalización. Los espacios en blanco no producen token.
    fn finalize(self, lexeme: &str) -> Option<Token> {
        use State::*;

        let token = match self {
            WordEnd => match Keyword::from_str(lexeme) {
                Ok(keyword) => Token::Keyword(keyword),
                Err(()) => Token::Id(Identifier::new(lexeme)),
            },

            IntegerEnd => Token::IntConst(lexeme.to_owned()),
            Power => Token::Power,
            Times => Token::Times,
            Equal => Token::Equal,
            Assign => Token::Assign,
            OpenParen => Token::OpenParen,
            CloseParen => Token::CloseParen,
            Semicolon => Token::Semicolon,
            Plus => Token::Plus,
            Minus => Token::Minus,
            Slash => Token::Slash,
            Blank | Start | Word | Integer | Star | Equals => return None,
        };

        Some(token)
    }
}

/// Escáner sobre un texto fuente completo.
///
/// Implementa [`Iterator`], emitiendo [`Token::Eof`] exactamente una vez
/// al final. Tras el primer error el iterador se agota.
pub struct Lexer<'a> {
    source: &'a str,
    start: usize,
    symbols: &'a mut SymbolTable,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, symbols: &'a mut SymbolTable) -> Self {
        Lexer {
            source,
            start: 0,
            symbols,
            finished: false,
        }
    }

    /// Corre el autómata desde el cursor externo hasta el siguiente
    /// estado final. Retorna `None` si el estado final no emite token.
    fn scan(&mut self) -> Lex<Option<Token>> {
        let mut state = State::Start;
        let mut cursor = self.start;

        loop {
            let c = self.source[cursor..].chars().next();
            let next = state
                .transition(Class::of(c))
                .ok_or_else(|| c.map_or(LexerError::UnexpectedEof, LexerError::BadChar))?;

            let width = c.map_or(0, char::len_utf8);
            if !next.is_final() {
                state = next;
                cursor += width;
                continue;
            }

            if !next.retracts() {
                cursor += width;
            }

            let lexeme = &self.source[self.start..cursor];
            self.start = cursor;

            let token = next.finalize(lexeme);
            if let Some(Token::Id(id)) = &token {
                self.symbols.add(id.clone());
            }

            return Ok(token);
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Lex<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if self.start >= self.source.len() {
                self.finished = true;
                return Some(Ok(Token::Eof));
            }

            match self.scan() {
                Ok(None) => continue,
                Ok(Some(token)) => {
                    trace!("token {}", token);
                    return Some(Ok(token));
                }

                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
        }

        None
    }
}

/// Escanea todo el texto fuente, registrando identificadores en `symbols`.
pub fn tokenize(source: &str, symbols: &mut SymbolTable) -> Lex<Vec<Token>> {
    Lexer::new(source, symbols).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Lex<Vec<Token>>, SymbolTable) {
        let mut symbols = SymbolTable::default();
        let tokens = tokenize(source, &mut symbols);
        (tokens, symbols)
    }

    fn kinds(source: &str) -> Vec<&'static str> {
        lex(source).0.unwrap().iter().map(Token::kind).collect()
    }

    #[test]
    fn declaration_assignment_and_return() {
        let (tokens, symbols) = lex("int a; a = 1 + 2; return a;");
        let dump: Vec<_> = tokens.unwrap().iter().map(ToString::to_string).collect();

        assert_eq!(
            dump,
            [
                "(int,)",
                "(id,a)",
                "(Semicolon,)",
                "(id,a)",
                "(=,)",
                "(IntConst,1)",
                "(+,)",
                "(IntConst,2)",
                "(Semicolon,)",
                "(return,)",
                "(id,a)",
                "(Semicolon,)",
                "(eof,)",
            ]
        );

        assert_eq!(symbols.len(), 1);
        assert!(symbols.has("a"));
        assert_eq!(symbols.get("a").unwrap().ty(), None);
    }

    #[test]
    fn double_character_operators() {
        assert_eq!(kinds("a**b"), ["id", "**", "id", "eof"]);
        assert_eq!(kinds("a*b"), ["id", "*", "id", "eof"]);
        assert_eq!(kinds("a==b"), ["id", "==", "id", "eof"]);
        assert_eq!(kinds("a=b"), ["id", "=", "id", "eof"]);
        assert_eq!(kinds("***"), ["**", "*", "eof"]);
        assert_eq!(kinds("= =="), ["=", "==", "eof"]);
    }

    #[test]
    fn single_character_symbols() {
        assert_eq!(kinds("(+-/);"), ["(", "+", "-", "/", ")", "Semicolon", "eof"]);
    }

    #[test]
    fn lookahead_is_not_consumed() {
        let tokens = lex("x1;12abc").0.unwrap();
        assert_eq!(
            tokens,
            [
                Token::Id(Identifier::new("x1")),
                Token::Semicolon,
                Token::IntConst("12".into()),
                Token::Id(Identifier::new("abc")),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn tokens_at_end_of_input() {
        assert_eq!(kinds("return"), ["return", "eof"]);
        assert_eq!(kinds("42"), ["IntConst", "eof"]);
        assert_eq!(kinds("a ="), ["id", "=", "eof"]);
        assert_eq!(kinds("*"), ["*", "eof"]);
    }

    #[test]
    fn keywords_are_exact() {
        let (tokens, symbols) = lex("int integer returns return");
        assert_eq!(
            tokens.unwrap(),
            [
                Token::Keyword(Keyword::Int),
                Token::Id(Identifier::new("integer")),
                Token::Id(Identifier::new("returns")),
                Token::Keyword(Keyword::Return),
                Token::Eof,
            ]
        );

        assert!(!symbols.has("int"));
        assert!(!symbols.has("return"));
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn identifiers_are_registered_once() {
        let (_, symbols) = lex("b = a; a = b; c = a * b;");
        let names: Vec<_> = symbols.iter().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn whitespace_only() {
        assert_eq!(kinds(" \n\t\r "), ["eof"]);
        assert_eq!(kinds(""), ["eof"]);
    }

    #[test]
    fn bad_characters() {
        assert_eq!(lex("a = 1 % 2;").0, Err(LexerError::BadChar('%')));
        assert_eq!(lex("a = b{").0, Err(LexerError::BadChar('{')));
        assert_eq!(lex("a = 5€;").0, Err(LexerError::BadChar('€')));
        assert_eq!(lex("a = ٣;").0, Err(LexerError::BadChar('٣')));
    }

    #[test]
    fn unicode_letters() {
        let (tokens, symbols) = lex("int été; été = 1; return été;");
        let tokens = tokens.unwrap();

        assert_eq!(tokens[1], Token::Id(Identifier::new("été")));
        assert_eq!(tokens.len(), 11);
        assert!(symbols.has("été"));
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn lexer_stops_after_error() {
        let mut symbols = SymbolTable::default();
        let mut lexer = Lexer::new("a # b", &mut symbols);

        assert!(matches!(lexer.next(), Some(Ok(Token::Id(_)))));
        assert_eq!(lexer.next(), Some(Err(LexerError::BadChar('#'))));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn transition_table() {
        use Class::*;

        assert_eq!(State::Start.transition(Char('*')), Some(State::Star));
        assert_eq!(State::Star.transition(Char('*')), Some(State::Power));
        assert_eq!(State::Star.transition(Letter), Some(State::Times));
        assert_eq!(State::Equals.transition(End), Some(State::Assign));
        assert_eq!(State::Word.transition(Digit), Some(State::Word));
        assert_eq!(State::Integer.transition(Letter), Some(State::IntegerEnd));
        assert_eq!(State::Start.transition(Char('%')), None);
        assert_eq!(State::Start.transition(End), None);
        assert_eq!(State::Plus.transition(Digit), None);
    }

    #[test]
    fn finalization_table() {
        assert_eq!(State::Blank.finalize(" "), None);
        assert_eq!(
            State::WordEnd.finalize("int"),
            Some(Token::Keyword(Keyword::Int))
        );
        assert_eq!(
            State::IntegerEnd.finalize("007"),
            Some(Token::IntConst("007".into()))
        );
        assert!(State::Times.retracts());
        assert!(!State::Power.retracts());
    }
}
