//! AST types for the Solidity subset the semantic model consumes.
//!
//! Nodes are plain owned data with byte-range spans. The shapes mirror
//! what the call classifier pattern-matches on: member accesses keep their
//! full base expression, name-value call blocks (`f{value: 1}(..)`) are a
//! distinct wrapper node, and casts appear as calls on an elementary type
//! or identifier expression.

pub mod visit;

use crate::base::Span;
use smol_str::SmolStr;

pub use visit::{Visit, walk_block, walk_expression, walk_statement};

// ============================================================================
// SOURCE-UNIT LEVEL
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SourceUnitNode {
    pub items: Vec<SourceItem>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum SourceItem {
    Pragma(PragmaDirective),
    Import(ImportDirective),
    Contract(ContractDefinition),
    Struct(StructDefinition),
    Enum(EnumDefinition),
    /// Free function at file scope; parsed but not modeled.
    Function(FunctionDefinition),
}

#[derive(Debug, Clone)]
pub struct PragmaDirective {
    pub name: SmolStr,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportDirective {
    /// The import literal as written, quotes stripped.
    pub path: String,
    pub unit_alias: Option<SmolStr>,
    /// `import {A as B, C} from "..."` pairs; empty for plain imports.
    pub symbols: Vec<(SmolStr, Option<SmolStr>)>,
    pub span: Span,
}

// ============================================================================
// CONTRACT LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Contract,
    Interface,
    Library,
    AbstractContract,
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Interface => "interface",
            Self::Library => "library",
            Self::AbstractContract => "abstract contract",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContractDefinition {
    pub kind: ContractKind,
    pub name: SmolStr,
    /// Declared bases in source order (most-derived first).
    pub bases: Vec<InheritanceSpecifier>,
    pub parts: Vec<ContractPart>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InheritanceSpecifier {
    pub name: SmolStr,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ContractPart {
    StateVariable(VariableDeclaration),
    Struct(StructDefinition),
    Enum(EnumDefinition),
    Event(EventDefinition),
    ErrorDef(ErrorDefinition),
    UsingFor(UsingForDirective),
    Function(FunctionDefinition),
}

#[derive(Debug, Clone)]
pub struct StructDefinition {
    pub name: SmolStr,
    pub members: Vec<VariableDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDefinition {
    pub name: SmolStr,
    pub values: Vec<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EventDefinition {
    pub name: SmolStr,
    pub parameters: Vec<VariableDeclaration>,
    pub anonymous: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ErrorDefinition {
    pub name: SmolStr,
    pub parameters: Vec<VariableDeclaration>,
    pub span: Span,
}

/// `using Library for Type;`. `type_name` is `None` for the `*` form.
#[derive(Debug, Clone)]
pub struct UsingForDirective {
    pub library: SmolStr,
    pub type_name: Option<TypeName>,
    pub span: Span,
}

// ============================================================================
// DECLARATIONS AND TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMutability {
    Pure,
    View,
    Payable,
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocation {
    Memory,
    Storage,
    Calldata,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    /// `None` for unnamed parameters (common in interfaces).
    pub name: Option<SmolStr>,
    pub type_name: TypeName,
    pub visibility: Option<Visibility>,
    pub mutability: Option<StateMutability>,
    pub storage_location: Option<StorageLocation>,
    pub indexed: bool,
    pub span: Span,
}

impl VariableDeclaration {
    pub fn is_address(&self) -> bool {
        matches!(&self.type_name, TypeName::Elementary { name } if name == "address")
    }

    pub fn is_user_defined(&self) -> bool {
        matches!(&self.type_name, TypeName::UserDefined { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Elementary {
        name: SmolStr,
    },
    /// Possibly dotted reference, e.g. `Lib.Item`.
    UserDefined {
        name_path: SmolStr,
    },
    Array {
        base: Box<TypeName>,
        length: Option<Box<Expression>>,
    },
    Mapping {
        key: Box<TypeName>,
        value: Box<TypeName>,
    },
    FunctionType {
        parameters: Vec<TypeName>,
        returns: Vec<TypeName>,
    },
}

impl TypeName {
    /// The declared type's name as the classifier sees it: the elementary
    /// name or the user-defined name path.
    pub fn declared_name(&self) -> Option<&SmolStr> {
        match self {
            TypeName::Elementary { name } => Some(name),
            TypeName::UserDefined { name_path } => Some(name_path),
            _ => None,
        }
    }
}

// ============================================================================
// FUNCTIONS AND STATEMENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Constructor,
    Fallback,
    Receive,
    Modifier,
}

#[derive(Debug, Clone)]
pub struct ModifierInvocation {
    pub name: SmolStr,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub kind: FunctionKind,
    pub name: Option<SmolStr>,
    pub parameters: Vec<VariableDeclaration>,
    pub returns: Vec<VariableDeclaration>,
    pub visibility: Option<Visibility>,
    pub mutability: Option<StateMutability>,
    pub is_virtual: bool,
    pub modifiers: Vec<ModifierInvocation>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Block(Block),
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
        span: Span,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
        span: Span,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
        span: Span,
    },
    /// Single or tuple declaration; tuple slots may be empty.
    VariableDefinition {
        declarations: Vec<Option<VariableDeclaration>>,
        initializer: Option<Expression>,
        span: Span,
    },
    Expression {
        expression: Expression,
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
    Emit {
        call: Expression,
        span: Span,
    },
    Revert {
        call: Expression,
        span: Span,
    },
    Try {
        expression: Expression,
        body: Block,
        catches: Vec<Block>,
        span: Span,
    },
    Unchecked {
        block: Block,
        span: Span,
    },
    /// Body skipped as balanced token soup.
    InlineAssembly {
        dialect: Option<String>,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Identifier {
        name: SmolStr,
        span: Span,
    },
    MemberAccess {
        expression: Box<Expression>,
        member: SmolStr,
        span: Span,
    },
    IndexAccess {
        base: Box<Expression>,
        index: Option<Box<Expression>>,
        span: Span,
    },
    FunctionCall {
        expression: Box<Expression>,
        arguments: Vec<Expression>,
        /// `f({a: 1, b: 2})` named-argument pairs; empty otherwise.
        named_arguments: Vec<(SmolStr, Expression)>,
        span: Span,
    },
    /// Call options block: `expr{value: 1, gas: 2}`.
    NameValue {
        expression: Box<Expression>,
        arguments: Vec<(SmolStr, Expression)>,
        span: Span,
    },
    New {
        type_name: TypeName,
        span: Span,
    },
    /// An elementary type in expression position, e.g. the `address` in
    /// `address(owner)`.
    ElementaryType {
        name: SmolStr,
        span: Span,
    },
    NumberLiteral {
        value: SmolStr,
        subdenomination: Option<SmolStr>,
        span: Span,
    },
    StringLiteral {
        value: String,
        span: Span,
    },
    HexLiteral {
        value: String,
        span: Span,
    },
    BoolLiteral {
        value: bool,
        span: Span,
    },
    Tuple {
        components: Vec<Option<Expression>>,
        span: Span,
    },
    ArrayLiteral {
        elements: Vec<Expression>,
        span: Span,
    },
    Unary {
        operator: SmolStr,
        prefix: bool,
        operand: Box<Expression>,
        span: Span,
    },
    Binary {
        operator: SmolStr,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Assignment {
        operator: SmolStr,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Conditional {
        condition: Box<Expression>,
        true_expression: Box<Expression>,
        false_expression: Box<Expression>,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier { span, .. }
            | Expression::MemberAccess { span, .. }
            | Expression::IndexAccess { span, .. }
            | Expression::FunctionCall { span, .. }
            | Expression::NameValue { span, .. }
            | Expression::New { span, .. }
            | Expression::ElementaryType { span, .. }
            | Expression::NumberLiteral { span, .. }
            | Expression::StringLiteral { span, .. }
            | Expression::HexLiteral { span, .. }
            | Expression::BoolLiteral { span, .. }
            | Expression::Tuple { span, .. }
            | Expression::ArrayLiteral { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Conditional { span, .. } => *span,
        }
    }

    /// Walk `.expression`-style edges until an identifier is found, the way
    /// the classifier locates the target of a typecast chain.
    pub fn innermost_identifier(&self) -> Option<&SmolStr> {
        let mut current = self;
        loop {
            match current {
                Expression::Identifier { name, .. } => return Some(name),
                Expression::MemberAccess { expression, .. } => current = expression,
                Expression::FunctionCall { expression, .. } => current = expression,
                Expression::NameValue { expression, .. } => current = expression,
                _ => return None,
            }
        }
    }
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Block(block) => block.span,
            Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::DoWhile { span, .. }
            | Statement::For { span, .. }
            | Statement::VariableDefinition { span, .. }
            | Statement::Expression { span, .. }
            | Statement::Return { span, .. }
            | Statement::Emit { span, .. }
            | Statement::Revert { span, .. }
            | Statement::Try { span, .. }
            | Statement::Unchecked { span, .. }
            | Statement::InlineAssembly { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span } => *span,
        }
    }
}
