//! AST traversal.
//!
//! A visitor receives every statement, expression, and in-body variable
//! declaration in source order; the walk functions drive the recursion.
//! Consumers match on the node kind they care about, so one walk serves
//! declaration collection, identifier scoping, complexity counting, and
//! call extraction alike.

use super::{Block, Expression, Statement, VariableDeclaration};

pub trait Visit {
    fn visit_statement(&mut self, _statement: &Statement) {}
    fn visit_expression(&mut self, _expression: &Expression) {}
    fn visit_variable_declaration(&mut self, _declaration: &VariableDeclaration) {}
}

pub fn walk_block<V: Visit>(visitor: &mut V, block: &Block) {
    for statement in &block.statements {
        walk_statement(visitor, statement);
    }
}

pub fn walk_statement<V: Visit>(visitor: &mut V, statement: &Statement) {
    visitor.visit_statement(statement);
    match statement {
        Statement::Block(block) => walk_block(visitor, block),
        Statement::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_expression(visitor, condition);
            walk_statement(visitor, then_branch);
            if let Some(else_branch) = else_branch {
                walk_statement(visitor, else_branch);
            }
        }
        Statement::While {
            condition, body, ..
        } => {
            walk_expression(visitor, condition);
            walk_statement(visitor, body);
        }
        Statement::DoWhile {
            body, condition, ..
        } => {
            walk_statement(visitor, body);
            walk_expression(visitor, condition);
        }
        Statement::For {
            init,
            condition,
            update,
            body,
            ..
        } => {
            if let Some(init) = init {
                walk_statement(visitor, init);
            }
            if let Some(condition) = condition {
                walk_expression(visitor, condition);
            }
            if let Some(update) = update {
                walk_expression(visitor, update);
            }
            walk_statement(visitor, body);
        }
        Statement::VariableDefinition {
            declarations,
            initializer,
            ..
        } => {
            for declaration in declarations.iter().flatten() {
                visitor.visit_variable_declaration(declaration);
            }
            if let Some(initializer) = initializer {
                walk_expression(visitor, initializer);
            }
        }
        Statement::Expression { expression, .. } => walk_expression(visitor, expression),
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                walk_expression(visitor, value);
            }
        }
        Statement::Emit { call, .. } | Statement::Revert { call, .. } => {
            walk_expression(visitor, call);
        }
        Statement::Try {
            expression,
            body,
            catches,
            ..
        } => {
            walk_expression(visitor, expression);
            walk_block(visitor, body);
            for catch in catches {
                walk_block(visitor, catch);
            }
        }
        Statement::Unchecked { block, .. } => walk_block(visitor, block),
        Statement::InlineAssembly { .. } | Statement::Break { .. } | Statement::Continue { .. } => {
        }
    }
}

pub fn walk_expression<V: Visit>(visitor: &mut V, expression: &Expression) {
    visitor.visit_expression(expression);
    match expression {
        Expression::Identifier { .. }
        | Expression::ElementaryType { .. }
        | Expression::NumberLiteral { .. }
        | Expression::StringLiteral { .. }
        | Expression::HexLiteral { .. }
        | Expression::BoolLiteral { .. }
        | Expression::New { .. } => {}
        Expression::MemberAccess { expression, .. } => walk_expression(visitor, expression),
        Expression::IndexAccess { base, index, .. } => {
            walk_expression(visitor, base);
            if let Some(index) = index {
                walk_expression(visitor, index);
            }
        }
        Expression::FunctionCall {
            expression,
            arguments,
            named_arguments,
            ..
        } => {
            walk_expression(visitor, expression);
            for argument in arguments {
                walk_expression(visitor, argument);
            }
            for (_, argument) in named_arguments {
                walk_expression(visitor, argument);
            }
        }
        Expression::NameValue {
            expression,
            arguments,
            ..
        } => {
            walk_expression(visitor, expression);
            for (_, argument) in arguments {
                walk_expression(visitor, argument);
            }
        }
        Expression::Tuple { components, .. } => {
            for component in components.iter().flatten() {
                walk_expression(visitor, component);
            }
        }
        Expression::ArrayLiteral { elements, .. } => {
            for element in elements {
                walk_expression(visitor, element);
            }
        }
        Expression::Unary { operand, .. } => walk_expression(visitor, operand),
        Expression::Binary { left, right, .. } | Expression::Assignment { left, right, .. } => {
            walk_expression(visitor, left);
            walk_expression(visitor, right);
        }
        Expression::Conditional {
            condition,
            true_expression,
            false_expression,
            ..
        } => {
            walk_expression(visitor, condition);
            walk_expression(visitor, true_expression);
            walk_expression(visitor, false_expression);
        }
    }
}
