use std::rc::Rc;

use crate::error::ParseError;
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Type};

type ParseResult<T> = Result<T, ParseError>;

/// Returns if the next token is any of the given types.
macro_rules! matches {
    ( $self:ident, $( $type:expr ),+ ) => {
        {
            if $( $self.check($type) ) ||* {
                $self.advance();
                true
            } else {
                false
            }
        }
    }
}

/// Parses the tokens and returns the resulting statements.
///
/// - Program     -> Declaration* EOF ;
/// - Block       -> "{" Declaration* "}" ;
/// - Declaration -> FunDecl | VarDecl | Statement ;
/// - FunDecl     -> "function" IDENTIFIER "(" Parameters? ")" Block ;
/// - VarDecl     -> "var" IDENTIFIER ( "=" Expression )? ";" ;
/// - Parameters  -> IDENTIFIER ( "," IDENTIFIER )* ;
/// - Statement   -> ExprStmt | ForStmt | IfStmt | PrintStmt | AssertStmt
///                | ReturnStmt | WhileStmt | ImportStmt | Block ;
/// - ExprStmt    -> Expression ";" ;
/// - ForStmt     -> "for" "(" ( VarDecl | ExprStmt ) Expression ";" Expression ")" Statement ;
/// - IfStmt      -> "if" "(" Expression ")" Statement ( "else" Statement )? ;
/// - PrintStmt   -> "print" Expression ( "," Expression )* ";" ;
/// - AssertStmt  -> "assert" Expression "," Expression ";" ;
/// - ReturnStmt  -> "return" Expression? ";"? ;
/// - WhileStmt   -> "while" "(" Expression ")" Statement ;
/// - ImportStmt  -> "import" STRING ";" ;
/// - Expression  -> Assignment ;
/// - Assignment  -> ( IDENTIFIER | Index ) "=" Assignment | LogicOr ;
/// - LogicOr     -> LogicAnd ( "||" LogicAnd )* ;
/// - LogicAnd    -> Equality ( "&&" Equality )* ;
/// - Equality    -> Comparison ( ( "!=" | "==" ) Comparison )* ;
/// - Comparison  -> Term ( ( ">" | ">=" | "<" | "<=" ) Term )* ;
/// - Term        -> Factor ( ( "+" | "-" ) Factor )* ;
/// - Factor      -> Unary ( ( "*" | "/" ) Unary )* ;
/// - Unary       -> ( "!" | "-" ) Unary | Call ;
/// - Arguments   -> Expression ( "," Expression )* ;
/// - Call        -> Primary ( "(" Arguments? ")" | "[" Expression "]" )* ;
/// - Primary     -> NUMBER | STRING | CHAR | "false" | "true" | "nil"
///                | "(" Expression ")" | "[" Arguments? "]" | IDENTIFIER ;
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
        }
    }

    /// Parses the tokens and returns the resulting statements. Stops at the
    /// first syntax error.
    pub fn parse(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        Ok(statements)
    }

    /// Returns the next token without consuming it.
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Returns the previous token without consuming it.
    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Returns if the parser has reached the end of the file.
    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    /// Returns if the next token is of the given type.
    fn check(&self, r#type: Type) -> bool {
        if self.is_at_end() {
            return false
        }

        self.peek().r#type == r#type
    }

    /// Consumes the next token and returns it.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    /// Consumes the next token if it is of the given type.
    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<&Token> {
        if self.check(r#type) {
            return Ok(self.advance());
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: message.to_string(),
        })
    }

    /// Parses a declaration.
    fn declaration(&mut self) -> ParseResult<Stmt> {
        if matches!(self, Type::Function) {
            return self.function_declaration();
        }

        if matches!(self, Type::Var) {
            return self.var_declaration();
        }

        self.statement()
    }

    /// Parses a function declaration.
    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect function name")?.clone();

        self.consume(Type::LeftParen, "Expect '(' after function name")?;

        let mut params = vec![];

        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= 255 {
                    return Err(ParseError {
                        token: self.peek().clone(),
                        message: "Cannot have more than 255 parameters".to_string(),
                    });
                }

                params.push(self.consume(Type::Identifier, "Expect parameter name")?.clone());

                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        self.consume(Type::RightParen, "Expect ')' after parameters")?;
        self.consume(Type::LeftBrace, "Expect '{' before function body")?;

        let body = self.block()?;

        Ok(Stmt::Function(Rc::new(FunctionData { name, params, body })))
    }

    /// Parses a variable declaration.
    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect variable name")?.clone();

        let mut initializer: Option<Expr> = None;
        if matches!(self, Type::Equal) {
            initializer = Some(self.expression()?);
        }

        self.consume(Type::Semicolon, "Expect ';' after variable declaration")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    /// Parses a statement.
    fn statement(&mut self) -> ParseResult<Stmt> {
        if matches!(self, Type::For) {
            return self.for_statement();
        }

        if matches!(self, Type::If) {
            return self.if_statement();
        }

        if matches!(self, Type::Print) {
            return self.print_statement();
        }

        if matches!(self, Type::Assert) {
            return self.assert_statement();
        }

        if matches!(self, Type::Return) {
            return self.return_statement();
        }

        if matches!(self, Type::While) {
            return self.while_statement();
        }

        if matches!(self, Type::Import) {
            return self.import_statement();
        }

        if matches!(self, Type::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    /// Parses a for statement. All three clauses are required; the
    /// initializer is either a variable declaration or an expression
    /// statement.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'for'")?;

        let initializer = if matches!(self, Type::Var) {
            self.var_declaration()?
        } else {
            self.expression_statement()?
        };

        let condition = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after loop condition")?;

        let increment = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after loop clauses")?;

        let body = self.statement()?;

        Ok(Stmt::For(ForData {
            initializer: Box::new(initializer),
            condition,
            increment,
            body: Box::new(body),
        }))
    }

    /// Parses an if statement.
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let mut else_branch: Option<Box<Stmt>> = None;
        if matches!(self, Type::Else) {
            else_branch = Some(Box::new(self.statement()?));
        }

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    /// Parses a print statement with one or more comma-separated expressions.
    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let mut exprs = vec![self.expression()?];
        while matches!(self, Type::Comma) {
            exprs.push(self.expression()?);
        }

        self.consume(Type::Semicolon, "Expect ';' after print value")?;

        Ok(Stmt::Print(PrintData { keyword, exprs }))
    }

    /// Parses an assert statement. Both the condition and the message are
    /// required.
    fn assert_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let condition = self.expression()?;
        self.consume(Type::Comma, "Expect ',' after assert condition")?;
        let message = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after assert message")?;

        Ok(Stmt::Assert(AssertData { keyword, condition, message }))
    }

    /// Parses a return statement. The semicolon may be omitted right before
    /// a closing brace.
    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = if self.check(Type::Semicolon) || self.check(Type::RightBrace) {
            None
        } else {
            Some(self.expression()?)
        };

        if self.check(Type::Semicolon) {
            self.advance();
        } else if !self.check(Type::RightBrace) {
            return Err(ParseError {
                token: self.peek().clone(),
                message: "Expect ';' after return value".to_string(),
            });
        }

        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    /// Parses a while statement.
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition")?;
        let body = self.statement()?;

        Ok(Stmt::While(WhileData {
            condition,
            body: Box::new(body),
        }))
    }

    /// Parses an import statement.
    fn import_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let path = self.consume(Type::String, "Expect module path string after 'import'")?.clone();
        self.consume(Type::Semicolon, "Expect ';' after module path")?;

        Ok(Stmt::Import(ImportData { keyword, path }))
    }

    /// Parses an expression statement.
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;

        self.consume(Type::Semicolon, "Expect ';' after expression")?;

        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    /// Parses a block statement.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Type::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(Type::RightBrace, "Expect '}' after block")?;

        Ok(statements)
    }

    /// Parses an expression.
    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Parses an assignment expression. A valid target is a variable
    /// reference or an indexed get; the latter desugars into an indexed set.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if matches!(self, Type::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable(data) = expr {
                return Ok(Expr::Assign(AssignData {
                    name: data.name,
                    value: Box::new(value),
                }));
            } else if let Expr::Index(data) = expr {
                return Ok(Expr::IndexSet(IndexSetData {
                    object: data.object,
                    bracket: data.bracket,
                    index: data.index,
                    value: Box::new(value),
                }));
            }

            return Err(ParseError {
                token: equals,
                message: "Invalid assignment target".to_string(),
            });
        }

        Ok(expr)
    }

    /// Parses an or expression.
    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while matches!(self, Type::PipePipe) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an and expression.
    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while matches!(self, Type::AmpAmp) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an equality expression.
    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while matches!(self, Type::BangEqual, Type::EqualEqual) {
            let operator = self.previous().clone();
            let right = self.comparison()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a comparison expression.
    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while matches!(self, Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual) {
            let operator = self.previous().clone();
            let right = self.term()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a term expression.
    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while matches!(self, Type::Minus, Type::Plus) {
            let operator = self.previous().clone();
            let right = self.factor()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a factor expression.
    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while matches!(self, Type::Slash, Type::Star) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a unary expression.
    fn unary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::Bang, Type::Minus) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            return Ok(Expr::Unary(UnaryData {
                operator,
                expr: Box::new(right),
            }));
        }

        self.call()
    }

    /// Parses the arguments of a call.
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = vec![];

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    return Err(ParseError {
                        token: self.peek().clone(),
                        message: "Cannot have more than 255 arguments".to_string(),
                    });
                }

                arguments.push(self.expression()?);

                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments")?.clone();

        Ok(Expr::Call(CallData {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    /// Parses a call or index expression.
    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if matches!(self, Type::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if matches!(self, Type::LeftBracket) {
                let bracket = self.previous().clone();
                let index = self.expression()?;
                self.consume(Type::RightBracket, "Expect ']' after index")?;

                expr = Expr::Index(IndexData {
                    object: Box::new(expr),
                    bracket,
                    index: Box::new(index),
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses a primary expression.
    fn primary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::False) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }

        if matches!(self, Type::True) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }

        if matches!(self, Type::Nil) {
            return Ok(Expr::Literal(Literal::Nil));
        }

        if matches!(self, Type::Number, Type::String, Type::Char) {
            return Ok(Expr::Literal(self.previous().clone().literal
                .expect("number, string or char to have a literal value")));
        }

        if matches!(self, Type::Identifier) {
            return Ok(Expr::Variable(VariableData {
                name: self.previous().clone(),
            }));
        }

        if matches!(self, Type::LeftParen) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression")?;

            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        if matches!(self, Type::LeftBracket) {
            let bracket = self.previous().clone();
            let mut elements = vec![];

            if !self.check(Type::RightBracket) {
                loop {
                    elements.push(self.expression()?);

                    if !matches!(self, Type::Comma) {
                        break;
                    }
                }
            }

            self.consume(Type::RightBracket, "Expect ']' after list elements")?;

            return Ok(Expr::List(ListData { bracket, elements }));
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: "Expect expression".to_string(),
        })
    }
}

#[cfg(test)]
mod test {
    use crate::ast::ASTPrinter;
    use crate::scanner::Scanner;

    use super::*;

    fn parse(source: &str) -> Vec<Stmt> {
        let tokens = Scanner::new(source).scan_tokens().expect("source to scan");
        Parser::new(tokens).parse().expect("source to parse")
    }

    fn dump(source: &str) -> String {
        let statements = parse(source);
        let mut printer = ASTPrinter;

        statements
            .iter()
            .map(|stmt| printer.print_stmt(stmt))
            .collect::<Vec<String>>()
            .join(" ")
    }

    fn parse_error(source: &str) -> ParseError {
        let tokens = Scanner::new(source).scan_tokens().expect("source to scan");
        Parser::new(tokens).parse().expect_err("source to fail")
    }

    #[test]
    fn precedence_ladder() {
        assert_eq!(dump("print 1 + 2 * 3;"), "(print (+ 1 (* 2 3)))");
        assert_eq!(dump("print (1 + 2) * 3;"), "(print (* (group (+ 1 2)) 3))");
        assert_eq!(dump("print 1 < 2 == true;"), "(print (== (< 1 2) true))");
        assert_eq!(dump("print -1 - -2;"), "(print (- (- 1) (- 2)))");
    }

    #[test]
    fn logical_binds_looser_than_equality() {
        assert_eq!(
            dump("x = a == 1 && b == 2 || c;"),
            "(expr (= x (|| (&& (== a 1) (== b 2)) c)))",
        );
    }

    #[test]
    fn call_and_index_chain() {
        assert_eq!(dump("f(1)(2);"), "(expr f(1)(2))");
        assert_eq!(dump("xs[0][1];"), "(expr (index (index xs 0) 1))");
        assert_eq!(dump("f(1)[2];"), "(expr (index f(1) 2))");
    }

    #[test]
    fn list_literal() {
        assert_eq!(dump("xs = [1, 2.5, \"three\"];"), "(expr (= xs (list 1 2.5 \"three\")))");
        assert_eq!(dump("xs = [];"), "(expr (= xs (list)))");
    }

    #[test]
    fn index_assignment_desugars_to_indexed_set() {
        assert_eq!(dump("xs[1] = 99;"), "(expr (index= xs 1 99))");
    }

    #[test]
    fn invalid_assignment_target() {
        assert_eq!(parse_error("1 = 2;").message, "Invalid assignment target");
        assert_eq!(parse_error("f() = 2;").message, "Invalid assignment target");
    }

    #[test]
    fn print_list() {
        assert_eq!(dump("print 1, \"two\", 3;"), "(print 1 \"two\" 3)");
    }

    #[test]
    fn print_requires_an_expression() {
        assert_eq!(parse_error("print;").message, "Expect expression");
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        assert_eq!(
            dump("if (a) if (b) print 1; else print 2;"),
            "(if a (if b (print 1) else (print 2)))",
        );
    }

    #[test]
    fn for_statement() {
        assert_eq!(
            dump("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(for (var i = 0) (< i 3) (= i (+ i 1)) (print i))",
        );
        assert_eq!(
            dump("for (i = 0; i < 3; i = i + 1) print i;"),
            "(for (expr (= i 0)) (< i 3) (= i (+ i 1)) (print i))",
        );
    }

    #[test]
    fn for_requires_condition_and_increment() {
        assert_eq!(parse_error("for (var i = 0;; i = i + 1) print i;").message, "Expect expression");
        assert_eq!(parse_error("for (var i = 0; i < 3;) print i;").message, "Expect expression");
    }

    #[test]
    fn function_declaration() {
        assert_eq!(
            dump("function add(a, b) { return a + b; }"),
            "(function add(a b) { (return (+ a b)) })",
        );
    }

    #[test]
    fn return_semicolon_is_optional_before_brace() {
        assert_eq!(
            dump("function f() { return 42 }"),
            "(function f() { (return 42) })",
        );
        assert_eq!(
            dump("function f() { return }"),
            "(function f() { (return) })",
        );
    }

    #[test]
    fn assert_statement() {
        assert_eq!(dump("assert x == 1, \"x\";"), "(assert (== x 1) \"x\")");
        assert_eq!(parse_error("assert x == 1;").message, "Expect ',' after assert condition");
    }

    #[test]
    fn import_statement() {
        assert_eq!(dump("import \"m\";"), "(import \"m\")");
        assert_eq!(parse_error("import m;").message, "Expect module path string after 'import'");
    }

    #[test]
    fn char_literal_parses() {
        assert_eq!(dump("print 'x';"), "(print x)");
    }

    #[test]
    fn error_at_end() {
        let error = parse_error("print 1");
        assert_eq!(error.token.r#type, Type::EOF);
        assert_eq!(error.message, "Expect ';' after print value");
    }
}
