//! AST node definitions.
//!
//! Every node is one variant of [`Node`]; children are referenced by
//! [`NodeIndex`] into the owning arena. Positions live in the arena next to
//! the node, not in the node data.

use super::base::{NodeIndex, NodeList};
use refract_scanner::SyntaxKind;
use serde::Serialize;

/// Declaration modifier bits as written in source.
///
/// These are syntax flags, not the reflection modifier values; the reflection
/// layer maps them onto the native bit layout.
pub mod modifier_flags {
    pub const NONE: u32 = 0;
    pub const PUBLIC: u32 = 1 << 0;
    pub const PROTECTED: u32 = 1 << 1;
    pub const PRIVATE: u32 = 1 << 2;
    pub const STATIC: u32 = 1 << 3;
    pub const ABSTRACT: u32 = 1 << 4;
    pub const FINAL: u32 = 1 << 5;
    pub const READONLY: u32 = 1 << 6;
    /// Legacy `var` property keyword.
    pub const VAR: u32 = 1 << 7;

    pub const VISIBILITY: u32 = PUBLIC | PROTECTED | PRIVATE;
}

/// Kind of a class-like declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassLikeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassLikeKind::Class => "class",
            ClassLikeKind::Interface => "interface",
            ClassLikeKind::Trait => "trait",
            ClassLikeKind::Enum => "enum",
        }
    }
}

/// Which table a `use` import adds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UseKind {
    Class,
    Function,
    Constant,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceFileData {
    pub file_name: String,
    pub statements: NodeList,
}

/// `namespace Foo;` (statements up to the next namespace statement) or
/// `namespace Foo { ... }`. `name` is empty for `namespace { ... }`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamespaceData {
    pub name: String,
    pub braced: bool,
    pub statements: NodeList,
    pub doc_comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UseItem {
    pub kind: UseKind,
    /// Imported name without leading separator.
    pub name: String,
    pub alias: Option<String>,
}

impl UseItem {
    /// Alias the import binds: the explicit alias or the last name segment.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.name.rsplit('\\').next().unwrap_or(&self.name),
        }
    }
}

/// `use` statement, group uses flattened into individual items.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UseData {
    pub items: Vec<UseItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassLikeData {
    pub kind: ClassLikeKind,
    pub name: String,
    /// `abstract`, `final` and `readonly` from [`modifier_flags`].
    pub modifiers: u32,
    /// `extends` list: at most one entry for classes, any number for
    /// interfaces. Names as written.
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    /// Enum backing type (`enum Suit: string`).
    pub backing_type: NodeIndex,
    pub members: NodeList,
    pub doc_comment: Option<String>,
}

/// `const` member group; `declarators` are [`Node::ConstDeclarator`]s.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassConstData {
    pub modifiers: u32,
    pub type_node: NodeIndex,
    pub declarators: NodeList,
    pub doc_comment: Option<String>,
}

/// Property group; `declarators` are [`Node::PropertyDeclarator`]s.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertyData {
    pub modifiers: u32,
    pub type_node: NodeIndex,
    pub declarators: NodeList,
    pub doc_comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertyDeclaratorData {
    pub name: String,
    pub default: NodeIndex,
}

/// `static $name = init;` found while skipping a body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StaticVar {
    pub name: String,
    pub initializer: NodeIndex,
}

/// Functions and methods.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionData {
    pub name: String,
    pub modifiers: u32,
    pub parameters: NodeList,
    pub return_type: NodeIndex,
    pub returns_ref: bool,
    /// False for abstract and interface methods (`;` instead of a body).
    pub has_body: bool,
    pub static_vars: Vec<StaticVar>,
    pub is_generator: bool,
    pub doc_comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterData {
    pub name: String,
    /// Promotion modifiers (visibility, `readonly`).
    pub modifiers: u32,
    pub type_node: NodeIndex,
    pub default: NodeIndex,
    pub by_ref: bool,
    pub variadic: bool,
    pub doc_comment: Option<String>,
}

impl ParameterData {
    /// Constructor property promotion.
    pub fn is_promoted(&self) -> bool {
        self.modifiers & (modifier_flags::VISIBILITY | modifier_flags::READONLY) != 0
    }
}

/// `use A, B;` inside a class body. Adaptation blocks are skipped.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraitUseData {
    pub traits: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnumCaseData {
    pub name: String,
    pub value: NodeIndex,
    pub doc_comment: Option<String>,
}

/// Top-level `const A = 1, B = 2;`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstStatementData {
    pub declarators: NodeList,
    pub doc_comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstDeclaratorData {
    pub name: String,
    pub value: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpressionStatementData {
    pub expression: NodeIndex,
}

/// Statement the reflection layer never looks into.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OpaqueData {
    pub first_token: SyntaxKind,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedTypeData {
    /// Name as written (`int`, `self`, `Foo\Bar`, `\Baz`).
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NullableTypeData {
    pub inner: NodeIndex,
}

/// Union (`A|B`) or intersection (`A&B`) type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompositeTypeData {
    pub types: NodeList,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArrayLiteralData {
    pub items: NodeList,
    /// `[...]` rather than `array(...)` / `list(...)`.
    pub short_syntax: bool,
}

/// Array element. `key` is NONE for implicit keys.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArrayItemData {
    pub key: NodeIndex,
    pub value: NodeIndex,
    pub by_ref: bool,
    pub spread: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnaryData {
    pub op: SyntaxKind,
    pub operand: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BinaryData {
    pub op: SyntaxKind,
    pub left: NodeIndex,
    pub right: NodeIndex,
}

/// `a ? b : c`; `when_true` is NONE for the short form `a ?: c`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TernaryData {
    pub condition: NodeIndex,
    pub when_true: NodeIndex,
    pub when_false: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssignData {
    /// `=` or a compound assignment operator.
    pub op: SyntaxKind,
    pub target: NodeIndex,
    pub value: NodeIndex,
    pub by_ref: bool,
}

/// Bare name in expression position: class reference or callee.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NameData {
    pub name: String,
}

/// Constant fetch (`FOO`, `\Ns\BAR`, `true`, `null`).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstFetchData {
    pub name: String,
}

/// `Class::NAME` and `Class::class`. `class` is a [`Node::Name`] or an
/// arbitrary expression.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassConstFetchData {
    pub class: NodeIndex,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MagicConstData {
    pub kind: SyntaxKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariableData {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArgumentData {
    pub name: Option<String>,
    pub value: NodeIndex,
    pub spread: bool,
}

/// Function call; `callee` is a [`Node::Name`] or an expression. A
/// first-class callable (`f(...)`) has `callable_syntax` set and no
/// arguments.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CallData {
    pub callee: NodeIndex,
    pub arguments: NodeList,
    pub callable_syntax: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewData {
    /// Class name node, expression, or an anonymous class declaration.
    pub class: NodeIndex,
    pub arguments: NodeList,
}

/// `$obj->name` / `$obj?->name`; `name` is a [`Node::Name`] for plain
/// identifiers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertyFetchData {
    pub object: NodeIndex,
    pub name: NodeIndex,
    pub nullsafe: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StaticPropertyFetchData {
    pub class: NodeIndex,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MethodCallData {
    pub object: NodeIndex,
    pub name: NodeIndex,
    pub arguments: NodeList,
    pub nullsafe: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StaticCallData {
    pub class: NodeIndex,
    pub name: NodeIndex,
    pub arguments: NodeList,
}

/// `$a[$dim]`; `dim` is NONE for `$a[]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DimFetchData {
    pub object: NodeIndex,
    pub dim: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CastData {
    /// Canonical cast type (`int`, `float`, `string`, `bool`, `array`,
    /// `object`, `unset`).
    pub cast_type: String,
    pub operand: NodeIndex,
}

/// Closure or arrow function. Bodies are not represented.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClosureData {
    pub is_arrow: bool,
    pub is_static: bool,
    pub parameters: NodeList,
    pub return_type: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchData {
    pub subject: NodeIndex,
    pub arms: NodeList,
}

/// Match arm; empty `conditions` means `default`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchArmData {
    pub conditions: NodeList,
    pub body: NodeIndex,
}

/// Keyword-introduced expression (`clone`, `print`, `throw`, `include`,
/// `exit`, `yield`, ...). `operand` may be NONE (`exit`, bare `yield`).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeywordExpressionData {
    pub keyword: SyntaxKind,
    pub operand: NodeIndex,
    /// `yield $key => $value` key.
    pub key: NodeIndex,
}

/// AST node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Node {
    // Declarations and statements
    SourceFile(SourceFileData),
    Namespace(NamespaceData),
    Use(UseData),
    ClassLike(ClassLikeData),
    ClassConst(ClassConstData),
    ConstDeclarator(ConstDeclaratorData),
    Property(PropertyData),
    PropertyDeclarator(PropertyDeclaratorData),
    Method(FunctionData),
    Function(FunctionData),
    Parameter(ParameterData),
    TraitUse(TraitUseData),
    EnumCase(EnumCaseData),
    ConstStatement(ConstStatementData),
    ExpressionStatement(ExpressionStatementData),
    Opaque(OpaqueData),

    // Types
    NamedType(NamedTypeData),
    NullableType(NullableTypeData),
    UnionType(CompositeTypeData),
    IntersectionType(CompositeTypeData),

    // Expressions
    IntLiteral(i64),
    FloatLiteral(f64),
    /// Decoded bytes; PHP strings carry no encoding.
    StringLiteral(Vec<u8>),
    /// Double-quoted or heredoc string with interpolation (raw body).
    InterpolatedString(String),
    ArrayLiteral(ArrayLiteralData),
    ArrayItem(ArrayItemData),
    Unary(UnaryData),
    /// Postfix `++` / `--`.
    PostfixUnary(UnaryData),
    Binary(BinaryData),
    Ternary(TernaryData),
    Assign(AssignData),
    Name(NameData),
    ConstFetch(ConstFetchData),
    ClassConstFetch(ClassConstFetchData),
    MagicConst(MagicConstData),
    Variable(VariableData),
    Argument(ArgumentData),
    Call(CallData),
    New(NewData),
    PropertyFetch(PropertyFetchData),
    StaticPropertyFetch(StaticPropertyFetchData),
    MethodCall(MethodCallData),
    StaticCall(StaticCallData),
    DimFetch(DimFetchData),
    Cast(CastData),
    Closure(ClosureData),
    Match(MatchData),
    MatchArm(MatchArmData),
    KeywordExpression(KeywordExpressionData),

    /// Placeholder produced during error recovery.
    Missing,
}

impl Node {
    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::SourceFile(_) => "SourceFile",
            Node::Namespace(_) => "Namespace",
            Node::Use(_) => "Use",
            Node::ClassLike(_) => "ClassLike",
            Node::ClassConst(_) => "ClassConst",
            Node::ConstDeclarator(_) => "ConstDeclarator",
            Node::Property(_) => "Property",
            Node::PropertyDeclarator(_) => "PropertyDeclarator",
            Node::Method(_) => "Method",
            Node::Function(_) => "Function",
            Node::Parameter(_) => "Parameter",
            Node::TraitUse(_) => "TraitUse",
            Node::EnumCase(_) => "EnumCase",
            Node::ConstStatement(_) => "ConstStatement",
            Node::ExpressionStatement(_) => "ExpressionStatement",
            Node::Opaque(_) => "Opaque",
            Node::NamedType(_) => "NamedType",
            Node::NullableType(_) => "NullableType",
            Node::UnionType(_) => "UnionType",
            Node::IntersectionType(_) => "IntersectionType",
            Node::IntLiteral(_) => "IntLiteral",
            Node::FloatLiteral(_) => "FloatLiteral",
            Node::StringLiteral(_) => "StringLiteral",
            Node::InterpolatedString(_) => "InterpolatedString",
            Node::ArrayLiteral(_) => "ArrayLiteral",
            Node::ArrayItem(_) => "ArrayItem",
            Node::Unary(_) => "Unary",
            Node::PostfixUnary(_) => "PostfixUnary",
            Node::Binary(_) => "Binary",
            Node::Ternary(_) => "Ternary",
            Node::Assign(_) => "Assign",
            Node::Name(_) => "Name",
            Node::ConstFetch(_) => "ConstFetch",
            Node::ClassConstFetch(_) => "ClassConstFetch",
            Node::MagicConst(_) => "MagicConst",
            Node::Variable(_) => "Variable",
            Node::Argument(_) => "Argument",
            Node::Call(_) => "Call",
            Node::New(_) => "New",
            Node::PropertyFetch(_) => "PropertyFetch",
            Node::StaticPropertyFetch(_) => "StaticPropertyFetch",
            Node::MethodCall(_) => "MethodCall",
            Node::StaticCall(_) => "StaticCall",
            Node::DimFetch(_) => "DimFetch",
            Node::Cast(_) => "Cast",
            Node::Closure(_) => "Closure",
            Node::Match(_) => "Match",
            Node::MatchArm(_) => "MatchArm",
            Node::KeywordExpression(_) => "KeywordExpression",
            Node::Missing => "Missing",
        }
    }

    /// Whether the node can appear on the left of an assignment.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Node::Variable(_)
                | Node::DimFetch(_)
                | Node::PropertyFetch(_)
                | Node::StaticPropertyFetch(_)
                | Node::ArrayLiteral(_)
                | Node::Unary(UnaryData {
                    op: SyntaxKind::DollarToken,
                    ..
                })
        )
    }
}
