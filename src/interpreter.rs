use std::cell::RefCell;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::io::Write;
use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::builtins;
use crate::environment::Environment;
use crate::error::{Interrupt, Phase, RuntimeError, ScriptError};
use crate::expr::{self, Expr, ExprVisitor};
use crate::function::Function;
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::stmt::{self, Stmt, StmtVisitor};
use crate::token::{Token, Type};

type EvalResult = Result<Object, Interrupt>;
type ExecResult = Result<(), Interrupt>;

/// Executes the AST against a stack of environments.
///
/// Printed output goes to the injected writer so that callers (and tests)
/// can capture it. The interpreter state survives across runs, which is what
/// keeps a REPL session and an import chain coherent.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    filename: String,
    imported: HashSet<PathBuf>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new(None)));

        for native in builtins::all() {
            globals.borrow_mut().define(native.name, Object::Native(native.clone()));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            filename: String::from("<stdin>"),
            imported: HashSet::new(),
            output,
        }
    }

    /// Sets the source path used to attribute runtime errors.
    pub fn set_source_name(&mut self, name: &str) {
        self.filename = name.to_string();
    }

    /// Executes the statements in order. A `return` reaching this level is a
    /// runtime error, not a crash.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), ScriptError> {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {},
                Err(Interrupt::Return { line, .. }) => {
                    return Err(self.script_error(line, String::from("Cannot return from top-level code")));
                },
                Err(Interrupt::Error(error)) => return Err(error),
            }
        }

        Ok(())
    }

    fn script_error(&self, line: usize, message: String) -> ScriptError {
        ScriptError {
            phase: Phase::Runtime,
            file: self.filename.clone(),
            line,
            message,
        }
    }

    /// Builds a runtime interrupt attributed to the file currently running.
    pub(crate) fn runtime_error(&self, line: usize, message: String) -> Interrupt {
        Interrupt::Error(self.script_error(line, message))
    }

    /// Attaches the current file to an error raised below the interpreter.
    fn lift(&self, error: RuntimeError) -> Interrupt {
        self.runtime_error(error.line, error.message)
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Executes statements inside the given environment, restoring the
    /// previous one afterwards even when unwinding.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Environment) -> ExecResult {
        let previous = mem::replace(&mut self.environment, Rc::new(RefCell::new(environment)));

        let mut result = Ok(());
        for statement in statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn arithmetic(
        &self,
        left: Object,
        right: Object,
        operator: &Token,
        apply: fn(f64, f64) -> f64,
    ) -> EvalResult {
        match (left, right) {
            (Object::Number(left), Object::Number(right)) => Ok(Object::Number(apply(left, right))),
            (left, right) => Err(self.runtime_error(operator.line, format!(
                "Binary operation '{}' is not supported between {} type and {} type",
                operator.lexeme,
                left.type_str(),
                right.type_str(),
            ))),
        }
    }

    fn comparison(
        &self,
        left: Object,
        right: Object,
        operator: &Token,
        apply: fn(f64, f64) -> bool,
    ) -> EvalResult {
        match (left, right) {
            (Object::Number(left), Object::Number(right)) => Ok(Object::Bool(apply(left, right))),
            (left, right) => Err(self.runtime_error(operator.line, format!(
                "Binary operation '{}' is not supported between {} type and {} type",
                operator.lexeme,
                left.type_str(),
                right.type_str(),
            ))),
        }
    }

    /// Checks an index value against a list length and converts it to a
    /// zero-based offset.
    fn list_index(&self, index: &Object, len: usize, line: usize) -> Result<usize, Interrupt> {
        let number = match index {
            Object::Number(number) => *number,
            other => {
                return Err(self.runtime_error(line, format!(
                    "List index must be a number, got {} type",
                    other.type_str(),
                )));
            },
        };

        if number.fract() != 0.0 {
            return Err(self.runtime_error(line, String::from("List index must be an integer")));
        }

        if number < 0.0 || number >= len as f64 {
            return Err(self.runtime_error(line, format!(
                "List index {} is out of range (len {len})",
                Object::Number(number),
            )));
        }

        Ok(number as usize)
    }

    /// Resolves a module path: as given, with the `.ms` extension appended,
    /// then both again under each directory of `MODULESPATH`.
    fn resolve_module(&self, path: &str) -> Option<PathBuf> {
        let candidate = PathBuf::from(path);
        if candidate.is_file() {
            return Some(candidate);
        }

        let candidate = PathBuf::from(format!("{path}.ms"));
        if candidate.is_file() {
            return Some(candidate);
        }

        let search = env::var("MODULESPATH").ok()?;
        for dir in search.split(|c| c == ':' || c == ';').filter(|dir| !dir.is_empty()) {
            let candidate = Path::new(dir).join(path);
            if candidate.is_file() {
                return Some(candidate);
            }

            let candidate = Path::new(dir).join(format!("{path}.ms"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        None
    }

    /// Runs a module through the full pipeline against the current
    /// interpreter state. Top-level definitions land in the shared globals;
    /// diagnostics cite the module file.
    fn execute_import(&mut self, data: &stmt::ImportData) -> ExecResult {
        let line = data.keyword.line;
        let path = match &data.path.literal {
            Some(Literal::String(path)) => path.clone(),
            _ => return Err(self.runtime_error(line, String::from("Module path must be a string"))),
        };

        let resolved = match self.resolve_module(&path) {
            Some(resolved) => resolved,
            None => return Err(self.runtime_error(line, format!("Cannot find module '{path}'"))),
        };

        // A module that was already executed is not executed again. This is
        // also what keeps circular imports from looping.
        let canonical = fs::canonicalize(&resolved).unwrap_or_else(|_| resolved.clone());
        if !self.imported.insert(canonical) {
            return Ok(());
        }

        let source = fs::read_to_string(&resolved)
            .map_err(|error| self.runtime_error(line, format!("Cannot read module '{path}': {error}")))?;
        let module_name = resolved.display().to_string();

        let tokens = Scanner::new(&source)
            .scan_tokens()
            .map_err(|error| Interrupt::Error(error.in_file(&module_name)))?;
        let statements = Parser::new(tokens)
            .parse()
            .map_err(|error| Interrupt::Error(error.in_file(&module_name)))?;

        let saved = mem::replace(&mut self.filename, module_name);

        let mut result = Ok(());
        for statement in &statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        if let Err(Interrupt::Return { line, .. }) = result {
            result = Err(self.runtime_error(line, String::from("Cannot return from top-level code")));
        }

        self.filename = saved;
        result
    }
}

impl ExprVisitor<EvalResult> for Interpreter<'_> {
    fn visit_literal_expr(&mut self, literal: &Literal) -> EvalResult {
        Ok(Object::from(literal.clone()))
    }

    fn visit_variable_expr(&mut self, data: &expr::VariableData) -> EvalResult {
        let variable = self.environment.borrow().get(&data.name);
        variable.map_err(|error| self.lift(error))
    }

    fn visit_assign_expr(&mut self, data: &expr::AssignData) -> EvalResult {
        let value = self.evaluate(&data.value)?;

        let assigned = self.environment.borrow_mut().assign(&data.name, value.clone());
        if assigned.is_err() {
            // Bare assignment to a name no scope defines declares it in the
            // global environment.
            self.globals.borrow_mut().define(&data.name.lexeme, value.clone());
        }

        Ok(value)
    }

    fn visit_unary_expr(&mut self, data: &expr::UnaryData) -> EvalResult {
        let right = self.evaluate(&data.expr)?;

        match data.operator.r#type {
            Type::Minus => match right {
                Object::Number(number) => Ok(Object::Number(-number)),
                other => Err(self.runtime_error(data.operator.line, format!(
                    "Unary operation '-' is not supported on {} type",
                    other.type_str(),
                ))),
            },
            Type::Bang => Ok(Object::Bool(!right.is_truthy())),
            _ => unreachable!("unary operator"),
        }
    }

    fn visit_binary_expr(&mut self, data: &expr::BinaryData) -> EvalResult {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let operator = &data.operator;

        match operator.r#type {
            // '+' adds numbers, concatenates strings, and otherwise
            // concatenates the textual forms of both operands.
            Type::Plus => Ok(match (left, right) {
                (Object::Number(left), Object::Number(right)) => Object::Number(left + right),
                (Object::String(left), Object::String(right)) => Object::String(left + &right),
                (left, right) => Object::String(format!("{left}{right}")),
            }),
            Type::Minus => self.arithmetic(left, right, operator, |left, right| left - right),
            Type::Star => self.arithmetic(left, right, operator, |left, right| left * right),
            Type::Slash => match (&left, &right) {
                (Object::Number(_), Object::Number(divisor)) if *divisor == 0.0 => {
                    Err(self.runtime_error(operator.line, String::from("Division by zero")))
                },
                _ => self.arithmetic(left, right, operator, |left, right| left / right),
            },
            Type::Greater => self.comparison(left, right, operator, |left, right| left > right),
            Type::GreaterEqual => self.comparison(left, right, operator, |left, right| left >= right),
            Type::Less => self.comparison(left, right, operator, |left, right| left < right),
            Type::LessEqual => self.comparison(left, right, operator, |left, right| left <= right),
            Type::EqualEqual => Ok(Object::Bool(left == right)),
            Type::BangEqual => Ok(Object::Bool(left != right)),
            _ => unreachable!("binary operator"),
        }
    }

    /// Short-circuit: the right operand only runs when the left one does not
    /// decide the result, and the result is always a boolean.
    fn visit_logical_expr(&mut self, data: &expr::LogicalData) -> EvalResult {
        let left = self.evaluate(&data.left)?.is_truthy();

        match data.operator.r#type {
            Type::PipePipe if left => Ok(Object::Bool(true)),
            Type::AmpAmp if !left => Ok(Object::Bool(false)),
            _ => Ok(Object::Bool(self.evaluate(&data.right)?.is_truthy())),
        }
    }

    fn visit_grouping_expr(&mut self, data: &expr::GroupingData) -> EvalResult {
        self.evaluate(&data.expr)
    }

    fn visit_call_expr(&mut self, data: &expr::CallData) -> EvalResult {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let line = data.paren.line;
        let callable: &dyn Callable = match &callee {
            Object::Function(function) => function.as_ref(),
            Object::Native(native) => native,
            other => {
                return Err(self.runtime_error(line, format!(
                    "{} type is not callable",
                    other.type_str(),
                )));
            },
        };

        if arguments.len() != callable.arity() {
            return Err(self.runtime_error(line, format!(
                "Expected {} arguments but got {}",
                callable.arity(),
                arguments.len(),
            )));
        }

        callable.call(self, arguments, line)
    }

    fn visit_list_expr(&mut self, data: &expr::ListData) -> EvalResult {
        let mut elements = Vec::with_capacity(data.elements.len());
        for element in &data.elements {
            elements.push(self.evaluate(element)?);
        }

        Ok(Object::from(elements))
    }

    fn visit_index_expr(&mut self, data: &expr::IndexData) -> EvalResult {
        let object = self.evaluate(&data.object)?;
        let index = self.evaluate(&data.index)?;
        let line = data.bracket.line;

        let elements = match object {
            Object::List(elements) => elements,
            other => {
                return Err(self.runtime_error(line, format!(
                    "Cannot index {} type",
                    other.type_str(),
                )));
            },
        };

        let len = elements.borrow().len();
        let index = self.list_index(&index, len, line)?;
        let value = elements.borrow()[index].clone();
        Ok(value)
    }

    fn visit_index_set_expr(&mut self, data: &expr::IndexSetData) -> EvalResult {
        let object = self.evaluate(&data.object)?;
        let index = self.evaluate(&data.index)?;
        let value = self.evaluate(&data.value)?;
        let line = data.bracket.line;

        let elements = match object {
            Object::List(elements) => elements,
            other => {
                return Err(self.runtime_error(line, format!(
                    "Cannot index {} type",
                    other.type_str(),
                )));
            },
        };

        let len = elements.borrow().len();
        let index = self.list_index(&index, len, line)?;
        elements.borrow_mut()[index] = value.clone();
        Ok(value)
    }
}

impl StmtVisitor<ExecResult> for Interpreter<'_> {
    fn visit_expression_stmt(&mut self, data: &stmt::ExpressionData) -> ExecResult {
        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, data: &stmt::PrintData) -> ExecResult {
        let mut values = Vec::with_capacity(data.exprs.len());
        for expr in &data.exprs {
            values.push(self.evaluate(expr)?);
        }

        let rendered = values
            .iter()
            .map(Object::to_string)
            .collect::<Vec<String>>()
            .join(" ");

        let written = writeln!(self.output, "{rendered}");
        written.map_err(|error| self.runtime_error(data.keyword.line, format!("Cannot write output: {error}")))
    }

    fn visit_var_stmt(&mut self, data: &stmt::VarData) -> ExecResult {
        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::Nil,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_assert_stmt(&mut self, data: &stmt::AssertData) -> ExecResult {
        if self.evaluate(&data.condition)?.is_truthy() {
            return Ok(());
        }

        let message = self.evaluate(&data.message)?;
        Err(self.runtime_error(data.keyword.line, format!("Assertion failed: {message}")))
    }

    fn visit_block_stmt(&mut self, data: &stmt::BlockData) -> ExecResult {
        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&data.statements, environment)
    }

    fn visit_if_stmt(&mut self, data: &stmt::IfData) -> ExecResult {
        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, data: &stmt::WhileData) -> ExecResult {
        while self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.body)?;
        }

        Ok(())
    }

    fn visit_for_stmt(&mut self, data: &stmt::ForData) -> ExecResult {
        // The whole construct runs in a scope of its own; an init variable
        // is not visible after the loop.
        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        let previous = mem::replace(&mut self.environment, Rc::new(RefCell::new(environment)));

        let mut run = || -> ExecResult {
            self.execute(&data.initializer)?;
            while self.evaluate(&data.condition)?.is_truthy() {
                self.execute(&data.body)?;
                self.evaluate(&data.increment)?;
            }
            Ok(())
        };

        let result = run();
        self.environment = previous;
        result
    }

    fn visit_function_stmt(&mut self, data: &Rc<stmt::FunctionData>) -> ExecResult {
        let function = Function {
            declaration: Rc::clone(data),
            closure: Rc::clone(&self.environment),
        };

        // Defining the name in the same environment the closure captured is
        // what lets the body call itself.
        self.environment.borrow_mut().define(&data.name.lexeme, Object::Function(Rc::new(function)));
        Ok(())
    }

    fn visit_return_stmt(&mut self, data: &stmt::ReturnData) -> ExecResult {
        let value = match &data.value {
            Some(value) => self.evaluate(value)?,
            None => Object::Nil,
        };

        Err(Interrupt::Return { value, line: data.keyword.line })
    }

    fn visit_import_stmt(&mut self, data: &stmt::ImportData) -> ExecResult {
        self.execute_import(data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(source: &str) -> String {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let tokens = Scanner::new(source).scan_tokens().expect("source to scan");
        let statements = Parser::new(tokens).parse().expect("source to parse");
        interpreter.interpret(&statements).expect("source to run");

        drop(interpreter);
        String::from_utf8(output).expect("output to be utf-8")
    }

    fn run_err(source: &str) -> ScriptError {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        interpreter.set_source_name("<test>");

        let tokens = Scanner::new(source).scan_tokens().expect("source to scan");
        let statements = Parser::new(tokens).parse().expect("source to parse");
        interpreter.interpret(&statements).expect_err("source to fail")
    }

    #[test]
    fn arithmetic_and_print() {
        assert_eq!(run("x = 10; y = 20; print x + y;"), "30\n");
    }

    #[test]
    fn print_list_separates_with_spaces() {
        assert_eq!(run("print 1, \"two\", 3.5, true, nil;"), "1 two 3.5 true nil\n");
    }

    #[test]
    fn number_print_shape() {
        assert_eq!(run("print 6 / 2; print 7 / 2; print 0.5 + 0.25;"), "3\n3.5\n0.75\n");
    }

    #[test]
    fn plus_coerces_mixed_operands() {
        assert_eq!(run("print \"n=\" + 5;"), "n=5\n");
        assert_eq!(run("print 1 + true;"), "1true\n");
        assert_eq!(run("print nil + \"!\";"), "nil!\n");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let error = run_err("print 1 / 0;");
        assert_eq!(error.message, "Division by zero");
        assert_eq!(error.line, 1);
    }

    #[test]
    fn while_counts() {
        assert_eq!(run("i = 1; while (i <= 3) { print i; i = i + 1; }"), "1\n2\n3\n");
    }

    #[test]
    fn evaluation_is_left_to_right() {
        let source = "
            var trace = \"\";
            function tag(t) { trace = trace + t; return t; }
            tag(\"a\") + tag(\"b\") + tag(\"c\");
            [tag(\"d\"), tag(\"e\")];
            print trace;
        ";
        assert_eq!(run(source), "abcde\n");
    }

    #[test]
    fn short_circuit_skips_the_right_operand() {
        let source = "
            var calls = 0;
            function touch() { calls = calls + 1; return true; }
            print false && touch();
            print true || touch();
            print calls;
            print true && touch();
            print calls;
        ";
        assert_eq!(run(source), "false\ntrue\n0\ntrue\n1\n");
    }

    #[test]
    fn logical_result_is_a_boolean() {
        assert_eq!(run("print 1 && 2; print nil || false; print 0 || 3;"), "true\nfalse\ntrue\n");
    }

    #[test]
    fn recursion() {
        let source = "
            function f(n) { if (n <= 1) { return 1; } return n * f(n - 1); }
            print f(5);
            print f(10);
        ";
        assert_eq!(run(source), "120\n3628800\n");
    }

    #[test]
    fn closure_keeps_seeing_the_same_binding() {
        let source = "
            function make() {
                var c = 0;
                function inc() { c = c + 1; return c; }
                return inc;
            }
            var g = make();
            print g();
            print g();
        ";
        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn function_without_return_yields_nil() {
        assert_eq!(run("function f() {} print f();"), "nil\n");
    }

    #[test]
    fn list_index_and_set() {
        let source = "
            xs = [10, 20, 30];
            print xs[1];
            xs[1] = 99;
            print xs[1];
            print len(xs);
            print xs[0] = 7;
        ";
        assert_eq!(run(source), "20\n99\n3\n7\n");
    }

    #[test]
    fn index_out_of_range() {
        let error = run_err("xs = [1, 2]; print xs[2];");
        assert_eq!(error.message, "List index 2 is out of range (len 2)");
    }

    #[test]
    fn fractional_index_is_an_error() {
        let error = run_err("xs = [1, 2]; print xs[0.5];");
        assert_eq!(error.message, "List index must be an integer");
    }

    #[test]
    fn implicit_global_assignment() {
        let source = "
            function set() { flag = 42; }
            set();
            print flag;
        ";
        assert_eq!(run(source), "42\n");
    }

    #[test]
    fn assignment_updates_the_outer_binding() {
        assert_eq!(run("var a = 1; { a = 2; } print a;"), "2\n");
    }

    #[test]
    fn for_loop_variable_is_scoped_to_the_loop() {
        assert_eq!(run("for (var i = 0; i < 3; i = i + 1) print i;"), "0\n1\n2\n");

        let error = run_err("for (var i = 0; i < 1; i = i + 1) {} print i;");
        assert_eq!(error.message, "Undefined variable 'i'");
    }

    #[test]
    fn undefined_variable_cites_line_and_file() {
        let error = run_err("var a = 1;\nprint undef;");
        assert_eq!(error.message, "Undefined variable 'undef'");
        assert_eq!(error.line, 2);
        assert_eq!(error.file, "<test>");
        assert_eq!(
            error.to_string(),
            "Runtime Error in <test> at line 2: Undefined variable 'undef'",
        );
    }

    #[test]
    fn return_at_top_level_is_an_error() {
        let error = run_err("return 1;");
        assert_eq!(error.message, "Cannot return from top-level code");
    }

    #[test]
    fn assert_failure_carries_the_message() {
        let error = run_err("assert 1 == 2, \"n=\" + 5;");
        assert_eq!(error.message, "Assertion failed: n=5");
        assert_eq!(run("assert 1 == 1, \"fine\"; print \"ok\";"), "ok\n");
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let error = run_err("function f(a) { return a; } f(1, 2);");
        assert_eq!(error.message, "Expected 1 arguments but got 2");
    }

    #[test]
    fn calling_a_number_is_an_error() {
        let error = run_err("var x = 5; x();");
        assert_eq!(error.message, "number type is not callable");
    }

    #[test]
    fn missing_module_is_an_error() {
        let error = run_err("import \"no_such_module_anywhere\";");
        assert_eq!(error.message, "Cannot find module 'no_such_module_anywhere'");
    }

    #[test]
    fn functions_are_first_class() {
        let source = "
            function twice(f, x) { return f(f(x)); }
            function inc(n) { return n + 1; }
            print twice(inc, 3);
        ";
        assert_eq!(run(source), "5\n");
    }

    #[test]
    fn equality_follows_value_rules() {
        let source = "
            print 1 == 1.0;
            print \"a\" == \"a\";
            print nil == nil;
            print 1 == \"1\";
            print 1 != \"1\";
            print true == 1;
        ";
        assert_eq!(run(source), "true\ntrue\ntrue\nfalse\ntrue\nfalse\n");
    }
}
