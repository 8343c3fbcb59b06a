use crate::expr::{
    AssignData, BinaryData, CallData, Expr, ExprVisitor, GroupingData, IndexData, IndexSetData,
    ListData, LogicalData, UnaryData, VariableData,
};
use crate::literal::Literal;
use crate::stmt::{
    AssertData, BlockData, ExpressionData, ForData, FunctionData, IfData, ImportData, PrintData,
    ReturnData, Stmt, StmtVisitor, VarData, WhileData,
};

use std::rc::Rc;

/// Returns a string representation of the expression in paranthesize.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";

            string
        }
    };
}

/// Renders the AST as a parenthesized dump, mostly for parser tests.
pub struct ASTPrinter;

impl ASTPrinter {
    /// Prints the expression using visitor pattern.
    pub fn print_expr(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    /// Prints the statement using visitor pattern.
    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }
}

impl ExprVisitor<String> for ASTPrinter {
    fn visit_literal_expr(&mut self, literal: &Literal) -> String {
        match literal {
            // Strings are quoted so they read apart from identifiers.
            Literal::String(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }

    fn visit_variable_expr(&mut self, data: &VariableData) -> String {
        data.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, data: &AssignData) -> String {
        parenthesize!(self, format!("= {}", &data.name.lexeme).as_str(), data.value)
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) -> String {
        parenthesize!(self, &data.operator.lexeme, data.expr)
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) -> String {
        parenthesize!(self, &data.operator.lexeme, data.left, data.right)
    }

    fn visit_logical_expr(&mut self, data: &LogicalData) -> String {
        parenthesize!(self, &data.operator.lexeme, data.left, data.right)
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) -> String {
        parenthesize!(self, "group", data.expr)
    }

    fn visit_call_expr(&mut self, data: &CallData) -> String {
        let mut string = String::new();
        string += &data.callee.accept(self);
        string += "(";
        for argument in &data.arguments {
            string += &argument.accept(self);
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ")";
        string
    }

    fn visit_list_expr(&mut self, data: &ListData) -> String {
        let mut string = String::from("(list");
        for element in &data.elements {
            string += " ";
            string += &element.accept(self);
        }
        string += ")";
        string
    }

    fn visit_index_expr(&mut self, data: &IndexData) -> String {
        parenthesize!(self, "index", data.object, data.index)
    }

    fn visit_index_set_expr(&mut self, data: &IndexSetData) -> String {
        parenthesize!(self, "index=", data.object, data.index, data.value)
    }
}

impl StmtVisitor<String> for ASTPrinter {
    fn visit_expression_stmt(&mut self, data: &ExpressionData) -> String {
        parenthesize!(self, "expr", data.expr)
    }

    fn visit_print_stmt(&mut self, data: &PrintData) -> String {
        let mut string = String::from("(print");
        for expr in &data.exprs {
            string += " ";
            string += &expr.accept(self);
        }
        string += ")";
        string
    }

    fn visit_var_stmt(&mut self, data: &VarData) -> String {
        let mut string = String::new();
        string += "(var ";
        string += &data.name.lexeme;
        if let Some(initializer) = &data.initializer {
            string += " = ";
            string += &initializer.accept(self);
        }
        string += ")";

        string
    }

    fn visit_assert_stmt(&mut self, data: &AssertData) -> String {
        parenthesize!(self, "assert", data.condition, data.message)
    }

    fn visit_block_stmt(&mut self, data: &BlockData) -> String {
        let mut string = String::new();
        string += "{";
        for stmt in &data.statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";

        string
    }

    fn visit_if_stmt(&mut self, data: &IfData) -> String {
        let mut string = String::new();
        string += "(if ";
        string += &data.condition.accept(self);
        string += " ";
        string += &data.then_branch.accept(self);
        if let Some(else_branch) = &data.else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";

        string
    }

    fn visit_while_stmt(&mut self, data: &WhileData) -> String {
        parenthesize!(self, "while", data.condition, data.body)
    }

    fn visit_for_stmt(&mut self, data: &ForData) -> String {
        parenthesize!(self, "for", data.initializer, data.condition, data.increment, data.body)
    }

    fn visit_function_stmt(&mut self, data: &Rc<FunctionData>) -> String {
        let mut string = String::new();
        string += "(function ";
        string += &data.name.lexeme;
        string += "(";
        for param in &data.params {
            string += &param.lexeme;
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ") { ";
        string += &data.body.iter().map(|stmt| { stmt.accept(self) }).collect::<Vec<String>>().join(" ");
        string += " })";

        string
    }

    fn visit_return_stmt(&mut self, data: &ReturnData) -> String {
        match &data.value {
            Some(value) => parenthesize!(self, "return", value),
            None => String::from("(return)"),
        }
    }

    fn visit_import_stmt(&mut self, data: &ImportData) -> String {
        format!("(import \"{}\")", data.path.lexeme)
    }
}
