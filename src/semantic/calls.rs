//! Call sites and their classification vocabulary.
//!
//! Every call expression in a function body is matched into a closed
//! [`CallShape`] while the model is built, as a pure function of the AST.
//! Classification proper (which needs to know the contracts, libraries and
//! `using for` directives present in the workspace) happens when the unit
//! is integrated and again in the global second pass; it fills in
//! [`CallKind`], [`CallType`] and the resolved [`CallTarget`].

use smol_str::SmolStr;

use crate::base::Span;
use crate::parser::ast::{Expression, VariableDeclaration};
use crate::parser::helpers::{is_builtin, starts_lowercase, starts_uppercase};

use super::ids::ContractId;

/// Syntactic shape of a call expression. Closed set; everything the
/// classifier cannot use lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallShape {
    /// `f(...)` on a bare lowercase non-builtin identifier.
    Regular { name: SmolStr },
    /// `expr.f{value: 1}(...)`.
    NameValueCall { member: SmolStr },
    /// `name.f(...)`: base is a plain identifier.
    MemberOfIdentifier { base: SmolStr, member: SmolStr },
    /// `address(expr).f(...)`.
    MemberOfAddressCast { member: SmolStr },
    /// `Type(expr).f(...)`: base is a call on an uppercase identifier.
    ContractTypecast { target: SmolStr, member: SmolStr },
    /// `expr[i].f(...)`; `base` is the indexed identifier when there is one.
    MemberOfIndexAccess { base: Option<SmolStr>, member: SmolStr },
    /// `msg.sender.f(...)`, `tx.origin.f(...)`, `block.coinbase.f(...)`.
    MemberOfGlobalVar { global: SmolStr, member: SmolStr },
    /// `expr.field.f(...)`: member access on a member access.
    MemberOfStruct { member: SmolStr },
    Other,
}

/// Final classification tag of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Regular,
    NameValueCall,
    MemberAccessOfVar,
    MemberAccessOfAddress,
    ContractTypecast,
    ContractTypecastAnonymous,
    MemberAccessOfArrayVar,
    MemberAccessOfAddressMappingValue,
    MemberAccessOfUserDefinedMappingValue,
    MemberAccessOfGlobalEvmVar,
    MemberAccessOfUnknownIdentifier,
    /// Second-pass resolution: the base turned out to be an inherited
    /// state variable.
    InheritedStateVarAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    External,
    /// Could not be proven either way yet; settled by the second pass.
    Inconclusive,
}

/// What a classified call resolved to.
#[derive(Debug, Clone)]
pub enum CallTarget {
    /// The declaration of the variable the call goes through.
    Variable(VariableDeclaration),
    /// The cast target expression for typecast calls.
    Expression(Box<Expression>),
    /// A global EVM variable such as `msg.sender`.
    Global(SmolStr),
}

/// One call site in a function body.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    /// The called member or function name, when the shape exposes one.
    pub name: Option<SmolStr>,
    pub shape: CallShape,
    pub kind: Option<CallKind>,
    pub call_type: Option<CallType>,
    pub target: Option<CallTarget>,
    pub span: Span,
    /// Back-reference to the owning contract, carried between the two
    /// classification passes and cleared once the call is settled.
    pub(crate) pending: Option<ContractId>,
}

impl FunctionCall {
    pub fn is_external(&self) -> bool {
        self.call_type == Some(CallType::External)
    }

    /// Build the unclassified call record for a `FunctionCall` expression.
    pub(crate) fn from_expression(expression: &Expression) -> Self {
        let shape = detect_shape(expression);
        let name = match &shape {
            CallShape::Regular { name } => Some(name.clone()),
            CallShape::NameValueCall { member }
            | CallShape::MemberOfIdentifier { member, .. }
            | CallShape::MemberOfAddressCast { member }
            | CallShape::ContractTypecast { member, .. }
            | CallShape::MemberOfIndexAccess { member, .. }
            | CallShape::MemberOfGlobalVar { member, .. }
            | CallShape::MemberOfStruct { member } => Some(member.clone()),
            CallShape::Other => None,
        };
        let target = match &shape {
            CallShape::MemberOfAddressCast { .. } | CallShape::ContractTypecast { .. } => {
                cast_callee(expression).map(|callee| CallTarget::Expression(Box::new(callee.clone())))
            }
            CallShape::MemberOfGlobalVar { global, .. } => {
                Some(CallTarget::Global(global.clone()))
            }
            _ => None,
        };
        Self {
            name,
            shape,
            kind: None,
            call_type: None,
            target,
            span: expression.span(),
            pending: None,
        }
    }
}

/// Match a `FunctionCall` expression into its [`CallShape`].
pub fn detect_shape(call_expression: &Expression) -> CallShape {
    let Expression::FunctionCall {
        expression: callee, ..
    } = call_expression
    else {
        return CallShape::Other;
    };
    match &**callee {
        Expression::Identifier { name, .. } => {
            if starts_lowercase(name) && !is_builtin(name) {
                CallShape::Regular { name: name.clone() }
            } else {
                CallShape::Other
            }
        }
        Expression::NameValue {
            expression: inner, ..
        } => match &**inner {
            Expression::MemberAccess { member, .. } => CallShape::NameValueCall {
                member: member.clone(),
            },
            _ => CallShape::Other,
        },
        Expression::MemberAccess {
            expression: base,
            member,
            ..
        } => {
            if member == "push" || member == "pop" {
                return CallShape::Other;
            }
            let member = member.clone();
            match &**base {
                Expression::Identifier { name, .. } => CallShape::MemberOfIdentifier {
                    base: name.clone(),
                    member,
                },
                Expression::FunctionCall {
                    expression: cast, ..
                } => match &**cast {
                    Expression::ElementaryType { name, .. } if name == "address" => {
                        CallShape::MemberOfAddressCast { member }
                    }
                    Expression::Identifier { name, .. } if starts_uppercase(name) => {
                        CallShape::ContractTypecast {
                            target: name.clone(),
                            member,
                        }
                    }
                    _ => CallShape::Other,
                },
                Expression::IndexAccess {
                    base: indexed_base, ..
                } => {
                    let base_name = match &**indexed_base {
                        Expression::Identifier { name, .. } => Some(name.clone()),
                        _ => None,
                    };
                    CallShape::MemberOfIndexAccess {
                        base: base_name,
                        member,
                    }
                }
                Expression::MemberAccess {
                    expression: inner_base,
                    member: inner_member,
                    ..
                } => {
                    if let Expression::Identifier { name: first, .. } = &**inner_base {
                        let global = matches!(
                            (first.as_str(), inner_member.as_str()),
                            ("msg", "sender") | ("tx", "origin") | ("block", "coinbase")
                        );
                        if global {
                            return CallShape::MemberOfGlobalVar {
                                global: SmolStr::new(format!("{first}.{inner_member}")),
                                member,
                            };
                        }
                    }
                    CallShape::MemberOfStruct { member }
                }
                _ => CallShape::Other,
            }
        }
        _ => CallShape::Other,
    }
}

/// The callee expression of the cast inside `Cast(expr).member(...)`.
fn cast_callee(call_expression: &Expression) -> Option<&Expression> {
    let Expression::FunctionCall {
        expression: callee, ..
    } = call_expression
    else {
        return None;
    };
    let Expression::MemberAccess {
        expression: base, ..
    } = &**callee
    else {
        return None;
    };
    let Expression::FunctionCall {
        expression: cast, ..
    } = &**base
    else {
        return None;
    };
    Some(cast)
}
