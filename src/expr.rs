use crate::literal::Literal;
use crate::token::Token;

/// Represents a unary expression's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct UnaryData {
    pub operator: Token,
    pub expr: Box<Expr>,
}

/// Represents a binary expression's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct BinaryData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

/// Represents a short-circuiting logical expression's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct LogicalData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

/// Represents a grouping expression's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct GroupingData {
    pub expr: Box<Expr>,
}

/// Represents a variable reference's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct VariableData {
    pub name: Token,
}

/// Represents an assignment expression's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct AssignData {
    pub name: Token,
    pub value: Box<Expr>,
}

/// Represents a call expression's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct CallData {
    pub callee: Box<Expr>,
    pub paren: Token,
    pub arguments: Vec<Expr>,
}

/// Represents a list literal's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct ListData {
    pub bracket: Token,
    pub elements: Vec<Expr>,
}

/// Represents an indexed get's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct IndexData {
    pub object: Box<Expr>,
    pub bracket: Token,
    pub index: Box<Expr>,
}

/// Represents an indexed set's data in the language. An assignment whose
/// target is an indexed get desugars into this.
#[derive(Debug, PartialEq, Clone)]
pub struct IndexSetData {
    pub object: Box<Expr>,
    pub bracket: Token,
    pub index: Box<Expr>,
    pub value: Box<Expr>,
}

/// Represents an expression in the language.
#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Literal(Literal),
    Variable(VariableData),
    Assign(AssignData),
    Unary(UnaryData),
    Binary(BinaryData),
    Logical(LogicalData),
    Grouping(GroupingData),
    Call(CallData),
    List(ListData),
    Index(IndexData),
    IndexSet(IndexSetData),
}

impl Expr {
    /// Accepts a visitor and returns the result of the visit.
    pub fn accept<T>(&self, visitor: &mut dyn ExprVisitor<T>) -> T {
        match self {
            Expr::Literal(literal) => visitor.visit_literal_expr(literal),
            Expr::Variable(data) => visitor.visit_variable_expr(data),
            Expr::Assign(data) => visitor.visit_assign_expr(data),
            Expr::Unary(data) => visitor.visit_unary_expr(data),
            Expr::Binary(data) => visitor.visit_binary_expr(data),
            Expr::Logical(data) => visitor.visit_logical_expr(data),
            Expr::Grouping(data) => visitor.visit_grouping_expr(data),
            Expr::Call(data) => visitor.visit_call_expr(data),
            Expr::List(data) => visitor.visit_list_expr(data),
            Expr::Index(data) => visitor.visit_index_expr(data),
            Expr::IndexSet(data) => visitor.visit_index_set_expr(data),
        }
    }
}

pub trait ExprVisitor<T> {
    fn visit_literal_expr(&mut self, literal: &Literal) -> T;
    fn visit_variable_expr(&mut self, data: &VariableData) -> T;
    fn visit_assign_expr(&mut self, data: &AssignData) -> T;
    fn visit_unary_expr(&mut self, data: &UnaryData) -> T;
    fn visit_binary_expr(&mut self, data: &BinaryData) -> T;
    fn visit_logical_expr(&mut self, data: &LogicalData) -> T;
    fn visit_grouping_expr(&mut self, data: &GroupingData) -> T;
    fn visit_call_expr(&mut self, data: &CallData) -> T;
    fn visit_list_expr(&mut self, data: &ListData) -> T;
    fn visit_index_expr(&mut self, data: &IndexData) -> T;
    fn visit_index_set_expr(&mut self, data: &IndexSetData) -> T;
}
