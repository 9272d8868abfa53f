//! Análisis sintáctico.
//!
//! El análisis sintáctico no construye un AST. En su lugar, el parser
//! emite una secuencia de eventos `shift`/`reduce`/`accept` hacia un
//! [`ActionObserver`], exactamente en el orden en que los emitiría un
//! parser LR canónico para la misma entrada: los terminales se
//! desplazan conforme se consumen, las reducciones ocurren en
//! post-orden sobre el árbol de derivación y el marcador de fin nunca
//! se desplaza. Cualquier motor LR que respete ese orden puede
//! sustituir a [`parse()`] sin cambios en los observadores.
//!
//! # Gramática
//! ```text
//! P      -> S_list
//! S_list -> S ; S_list | S ;
//! S      -> D id | id = E | return E
//! D      -> int
//! E      -> E + A | E - A | A
//! A      -> A * B | B
//! B      -> ( E ) | id | IntConst
//! ```

use std::{
    fmt::{self, Display},
    iter::Peekable,
    slice,
};

use log::debug;
use thiserror::Error;

use crate::{
    lex::{Keyword, Token},
    semantic::SemanticError,
};

/// Regla de la gramática, identificada por nombre.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Production {
    /// `P -> S_list`
    Program,
    /// `S_list -> S ; S_list`
    StatementList,
    /// `S_list -> S ;`
    LastStatement,
    /// `S -> D id`
    Declaration,
    /// `D -> int`
    Declarator,
    /// `S -> id = E`
    Assignment,
    /// `S -> return E`
    Return,
    /// `E -> E + A`
    Add,
    /// `E -> E - A`
    Sub,
    /// `E -> A`
    Expression,
    /// `A -> A * B`
    Mul,
    /// `A -> B`
    Term,
    /// `B -> ( E )`
    Paren,
    /// `B -> id`
    Variable,
    /// `B -> IntConst`
    Constant,
}

impl Production {
    pub fn head(self) -> &'static str {
        use Production::*;

        match self {
            Program => "P",
            StatementList | LastStatement => "S_list",
            Declaration | Assignment | Return => "S",
            Declarator => "D",
            Add | Sub | Expression => "E",
            Mul | Term => "A",
            Paren | Variable | Constant => "B",
        }
    }

    pub fn body(self) -> &'static [&'static str] {
        use Production::*;

        match self {
            Program => &["S_list"],
            StatementList => &["S", "Semicolon", "S_list"],
            LastStatement => &["S", "Semicolon"],
            Declaration => &["D", "id"],
            Declarator => &["int"],
            Assignment => &["id", "=", "E"],
            Return => &["return", "E"],
            Add => &["E", "+", "A"],
            Sub => &["E", "-", "A"],
            Expression => &["A"],
            Mul => &["A", "*", "B"],
            Term => &["B"],
            Paren => &["(", "E", ")"],
            Variable => &["id"],
            Constant => &["IntConst"],
        }
    }

    /// Cantidad de símbolos que la reducción retira de la pila.
    pub fn arity(self) -> usize {
        self.body().len()
    }
}

impl Display for Production {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{} ->", self.head())?;
        for symbol in self.body() {
            write!(fmt, " {}", symbol)?;
        }

        Ok(())
    }
}

/// Acciones semánticas dirigidas por el parser.
///
/// Cada observador mantiene su propia pila de atributos, la cual debe
/// crecer y decrecer exactamente igual que la pila del parser.
pub trait ActionObserver {
    fn shift(&mut self, token: &Token) -> Result<(), SemanticError>;

    fn reduce(&mut self, production: Production) -> Result<(), SemanticError>;

    fn accept(&mut self) -> Result<(), SemanticError>;
}

impl<T: ActionObserver + ?Sized> ActionObserver for &mut T {
    fn shift(&mut self, token: &Token) -> Result<(), SemanticError> {
        (**self).shift(token)
    }

    fn reduce(&mut self, production: Production) -> Result<(), SemanticError> {
        (**self).reduce(production)
    }

    fn accept(&mut self) -> Result<(), SemanticError> {
        (**self).accept()
    }
}

/// Dos observadores en lockstep; el primero siempre recibe el evento antes.
impl<A: ActionObserver, B: ActionObserver> ActionObserver for (A, B) {
    fn shift(&mut self, token: &Token) -> Result<(), SemanticError> {
        self.0.shift(token)?;
        self.1.shift(token)
    }

    fn reduce(&mut self, production: Production) -> Result<(), SemanticError> {
        self.0.reduce(production)?;
        self.1.reduce(production)
    }

    fn accept(&mut self) -> Result<(), SemanticError> {
        self.0.accept()?;
        self.1.accept()
    }
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Expected {expected}, found {found} instead")]
    UnexpectedToken {
        expected: &'static str,
        found: Token,
    },

    #[error("Token stream ended without an end-of-input marker")]
    UnexpectedEof,

    /// Un observador rechazó un evento.
    #[error(transparent)]
    Action(#[from] SemanticError),
}

type Parse<T> = Result<T, ParserError>;

/// Analiza un flujo de tokens terminado en [`Token::Eof`], dirigiendo
/// a `observer` con los eventos de un parse ascendente.
pub fn parse<O: ActionObserver>(tokens: &[Token], observer: O) -> Parse<()> {
    let mut parser = Parser {
        tokens: tokens.iter().peekable(),
        observer,
    };

    parser.program()
}

struct Parser<'a, O> {
    tokens: Peekable<slice::Iter<'a, Token>>,
    observer: O,
}

impl<O: ActionObserver> Parser<'_, O> {
    fn program(&mut self) -> Parse<()> {
        // S_list es recursiva por la derecha: todas las sentencias se
        // desplazan antes de la primera reducción a S_list
        let mut statements = 0usize;
        loop {
            self.statement()?;
            self.expect(&Token::Semicolon, "`;`")?;
            statements += 1;

            if let Token::Eof = self.peek()? {
                break;
            }
        }

        self.reduce(Production::LastStatement)?;
        for _ in 1..statements {
            self.reduce(Production::StatementList)?;
        }

        self.reduce(Production::Program)?;

        debug!("accept");
        self.observer.accept()?;
        Ok(())
    }

    fn statement(&mut self) -> Parse<()> {
        match self.peek()? {
            Token::Keyword(Keyword::Int) => {
                self.shift()?;
                self.reduce(Production::Declarator)?;
                self.expect_id()?;
                self.reduce(Production::Declaration)
            }

            Token::Keyword(Keyword::Return) => {
                self.shift()?;
                self.expr()?;
                self.reduce(Production::Return)
            }

            Token::Id(_) => {
                self.shift()?;
                self.expect(&Token::Assign, "`=`")?;
                self.expr()?;
                self.reduce(Production::Assignment)
            }

            _ => self.unexpected("a statement"),
        }
    }

    fn expr(&mut self) -> Parse<()> {
        self.term()?;
        self.reduce(Production::Expression)?;

        loop {
            let production = match self.peek()? {
                Token::Plus => Production::Add,
                Token::Minus => Production::Sub,
                _ => break Ok(()),
            };

            self.shift()?;
            self.term()?;
            self.reduce(production)?;
        }
    }

    fn term(&mut self) -> Parse<()> {
        self.factor()?;
        self.reduce(Production::Term)?;

        while let Token::Times = self.peek()? {
            self.shift()?;
            self.factor()?;
            self.reduce(Production::Mul)?;
        }

        Ok(())
    }

    fn factor(&mut self) -> Parse<()> {
        match self.peek()? {
            Token::OpenParen => {
                self.shift()?;
                self.expr()?;
                self.expect(&Token::CloseParen, "`)`")?;
                self.reduce(Production::Paren)
            }

            Token::Id(_) => {
                self.shift()?;
                self.reduce(Production::Variable)
            }

            Token::IntConst(_) => {
                self.shift()?;
                self.reduce(Production::Constant)
            }

            _ => self.unexpected("an expression"),
        }
    }

    fn peek(&mut self) -> Parse<&Token> {
        self.tokens.peek().copied().ok_or(ParserError::UnexpectedEof)
    }

    fn shift(&mut self) -> Parse<()> {
        let token = self.tokens.next().ok_or(ParserError::UnexpectedEof)?;
        debug!("shift {}", token);

        self.observer.shift(token)?;
        Ok(())
    }

    fn reduce(&mut self, production: Production) -> Parse<()> {
        debug!("reduce {}", production);

        self.observer.reduce(production)?;
        Ok(())
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Parse<()> {
        if self.peek()? == token {
            self.shift()
        } else {
            self.unexpected(expected)
        }
    }

    fn expect_id(&mut self) -> Parse<()> {
        match self.peek()? {
            Token::Id(_) => self.shift(),
            _ => self.unexpected("an identifier"),
        }
    }

    fn unexpected<T>(&mut self, expected: &'static str) -> Parse<T> {
        let found = self.peek()?.clone();
        Err(ParserError::UnexpectedToken { expected, found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::tokenize, symtab::SymbolTable};

    /// Registra los eventos recibidos en forma textual.
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ActionObserver for Recorder {
        fn shift(&mut self, token: &Token) -> Result<(), SemanticError> {
            self.0.push(format!("shift {}", token.kind()));
            Ok(())
        }

        fn reduce(&mut self, production: Production) -> Result<(), SemanticError> {
            self.0.push(format!("reduce {}", production));
            Ok(())
        }

        fn accept(&mut self) -> Result<(), SemanticError> {
            self.0.push("accept".into());
            Ok(())
        }
    }

    fn events(source: &str) -> Parse<Vec<String>> {
        let tokens = tokenize(source, &mut SymbolTable::default()).unwrap();
        let mut recorder = Recorder::default();

        parse(&tokens, &mut recorder)?;
        Ok(recorder.0)
    }

    #[test]
    fn arity_matches_body() {
        assert_eq!(Production::StatementList.arity(), 3);
        assert_eq!(Production::Declaration.arity(), 2);
        assert_eq!(Production::Variable.arity(), 1);
        assert_eq!(Production::Paren.to_string(), "B -> ( E )");
    }

    #[test]
    fn canonical_bottom_up_order() {
        let events = events("int a; a = b * (1 - c); return a;").unwrap();

        assert_eq!(
            events,
            [
                "shift int",
                "reduce D -> int",
                "shift id",
                "reduce S -> D id",
                "shift Semicolon",
                "shift id",
                "shift =",
                "shift id",
                "reduce B -> id",
                "reduce A -> B",
                "shift *",
                "shift (",
                "shift IntConst",
                "reduce B -> IntConst",
                "reduce A -> B",
                "reduce E -> A",
                "shift -",
                "shift id",
                "reduce B -> id",
                "reduce A -> B",
                "reduce E -> E - A",
                "shift )",
                "reduce B -> ( E )",
                "reduce A -> A * B",
                "reduce E -> A",
                "reduce S -> id = E",
                "shift Semicolon",
                "shift return",
                "shift id",
                "reduce B -> id",
                "reduce A -> B",
                "reduce E -> A",
                "reduce S -> return E",
                "shift Semicolon",
                "reduce S_list -> S Semicolon",
                "reduce S_list -> S Semicolon S_list",
                "reduce S_list -> S Semicolon S_list",
                "reduce P -> S_list",
                "accept",
            ]
        );
    }

    #[test]
    fn addition_is_left_associative() {
        let events = events("return 1 + 2 - 3;").unwrap();
        let reductions: Vec<_> = events
            .iter()
            .filter(|event| event.starts_with("reduce E"))
            .map(String::as_str)
            .collect();

        assert_eq!(
            reductions,
            ["reduce E -> A", "reduce E -> E + A", "reduce E -> E - A"]
        );
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(
            events("a = 1"),
            Err(ParserError::UnexpectedToken {
                found: Token::Eof,
                ..
            })
        ));

        assert!(matches!(
            events("a = 2 ** 3;"),
            Err(ParserError::UnexpectedToken {
                found: Token::Power,
                ..
            })
        ));

        assert!(matches!(
            events(""),
            Err(ParserError::UnexpectedToken {
                expected: "a statement",
                ..
            })
        ));

        assert!(matches!(
            events("int 5;"),
            Err(ParserError::UnexpectedToken {
                expected: "an identifier",
                ..
            })
        ));
    }

    #[test]
    fn missing_end_marker() {
        let tokens = [Token::Keyword(Keyword::Return), Token::IntConst("1".into())];
        assert_eq!(
            parse(&tokens, Recorder::default()),
            Err(ParserError::UnexpectedEof)
        );
    }
}
