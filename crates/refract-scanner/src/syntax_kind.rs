//! Token kinds produced by the PHP scanner.

use serde::Serialize;

/// PHP token kinds.
///
/// Trivia (whitespace, comments, open tags, inline HTML) never reaches the
/// parser; doc comments are attached to the following token instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum SyntaxKind {
    Unknown,
    EndOfFileToken,

    // Literals and names
    Variable,
    Identifier,
    QualifiedName,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    InterpolatedString,
    CastToken,
    AttributeStart,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    SemicolonToken,
    CommaToken,
    DotToken,
    DotDotDotToken,
    ColonToken,
    ColonColonToken,
    QuestionToken,
    QuestionQuestionToken,
    QuestionArrowToken,
    ArrowToken,
    FatArrowToken,
    AtToken,
    DollarToken,
    BacktickToken,

    // Operators
    PlusToken,
    MinusToken,
    AsteriskToken,
    AsteriskAsteriskToken,
    SlashToken,
    PercentToken,
    EqualsToken,
    EqualsEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsToken,
    ExclamationEqualsEqualsToken,
    LessThanToken,
    LessThanEqualsToken,
    GreaterThanToken,
    GreaterThanEqualsToken,
    SpaceshipToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    TildeToken,
    ExclamationToken,
    AmpersandAmpersandToken,
    BarBarToken,
    PlusPlusToken,
    MinusMinusToken,

    // Compound assignment
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    AsteriskAsteriskEqualsToken,
    SlashEqualsToken,
    DotEqualsToken,
    PercentEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    QuestionQuestionEqualsToken,

    // Keywords
    AbstractKeyword,
    AndKeyword,
    ArrayKeyword,
    AsKeyword,
    BreakKeyword,
    CallableKeyword,
    CaseKeyword,
    CatchKeyword,
    ClassKeyword,
    CloneKeyword,
    ConstKeyword,
    ContinueKeyword,
    DeclareKeyword,
    DefaultKeyword,
    DoKeyword,
    EchoKeyword,
    ElseKeyword,
    ElseIfKeyword,
    EmptyKeyword,
    EnumKeyword,
    EvalKeyword,
    ExitKeyword,
    ExtendsKeyword,
    FinalKeyword,
    FinallyKeyword,
    FnKeyword,
    ForKeyword,
    ForeachKeyword,
    FunctionKeyword,
    GlobalKeyword,
    GotoKeyword,
    IfKeyword,
    ImplementsKeyword,
    IncludeKeyword,
    IncludeOnceKeyword,
    InstanceofKeyword,
    InsteadofKeyword,
    InterfaceKeyword,
    IssetKeyword,
    ListKeyword,
    MatchKeyword,
    NamespaceKeyword,
    NewKeyword,
    OrKeyword,
    PrintKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    ReadonlyKeyword,
    RequireKeyword,
    RequireOnceKeyword,
    ReturnKeyword,
    StaticKeyword,
    SwitchKeyword,
    ThrowKeyword,
    TraitKeyword,
    TryKeyword,
    UnsetKeyword,
    UseKeyword,
    VarKeyword,
    WhileKeyword,
    XorKeyword,
    YieldKeyword,

    // Magic constants
    LineMagicConst,
    FileMagicConst,
    DirMagicConst,
    ClassMagicConst,
    TraitMagicConst,
    MethodMagicConst,
    FunctionMagicConst,
    NamespaceMagicConst,
}

impl SyntaxKind {
    /// Whether this kind is a reserved word (keyword or magic constant).
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::AbstractKeyword as u16)
    }

    pub fn is_magic_constant(self) -> bool {
        (self as u16) >= (SyntaxKind::LineMagicConst as u16)
    }

    /// Class member modifiers (`public`, `static`, `abstract`, ...).
    pub fn is_member_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::FinalKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::VarKeyword
        )
    }

    pub fn is_compound_assignment(self) -> bool {
        matches!(
            self,
            SyntaxKind::PlusEqualsToken
                | SyntaxKind::MinusEqualsToken
                | SyntaxKind::AsteriskEqualsToken
                | SyntaxKind::AsteriskAsteriskEqualsToken
                | SyntaxKind::SlashEqualsToken
                | SyntaxKind::DotEqualsToken
                | SyntaxKind::PercentEqualsToken
                | SyntaxKind::AmpersandEqualsToken
                | SyntaxKind::BarEqualsToken
                | SyntaxKind::CaretEqualsToken
                | SyntaxKind::LessThanLessThanEqualsToken
                | SyntaxKind::GreaterThanGreaterThanEqualsToken
                | SyntaxKind::QuestionQuestionEqualsToken
        )
    }
}

/// Look up a reserved word. Keywords are case-insensitive.
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    if text.len() > 15 {
        return None;
    }
    let lower = text.to_ascii_lowercase();
    let kind = match lower.as_str() {
        "abstract" => SyntaxKind::AbstractKeyword,
        "and" => SyntaxKind::AndKeyword,
        "array" => SyntaxKind::ArrayKeyword,
        "as" => SyntaxKind::AsKeyword,
        "break" => SyntaxKind::BreakKeyword,
        "callable" => SyntaxKind::CallableKeyword,
        "case" => SyntaxKind::CaseKeyword,
        "catch" => SyntaxKind::CatchKeyword,
        "class" => SyntaxKind::ClassKeyword,
        "clone" => SyntaxKind::CloneKeyword,
        "const" => SyntaxKind::ConstKeyword,
        "continue" => SyntaxKind::ContinueKeyword,
        "declare" => SyntaxKind::DeclareKeyword,
        "default" => SyntaxKind::DefaultKeyword,
        "do" => SyntaxKind::DoKeyword,
        "echo" => SyntaxKind::EchoKeyword,
        "else" => SyntaxKind::ElseKeyword,
        "elseif" => SyntaxKind::ElseIfKeyword,
        "empty" => SyntaxKind::EmptyKeyword,
        "enum" => SyntaxKind::EnumKeyword,
        "eval" => SyntaxKind::EvalKeyword,
        "exit" | "die" => SyntaxKind::ExitKeyword,
        "extends" => SyntaxKind::ExtendsKeyword,
        "final" => SyntaxKind::FinalKeyword,
        "finally" => SyntaxKind::FinallyKeyword,
        "fn" => SyntaxKind::FnKeyword,
        "for" => SyntaxKind::ForKeyword,
        "foreach" => SyntaxKind::ForeachKeyword,
        "function" => SyntaxKind::FunctionKeyword,
        "global" => SyntaxKind::GlobalKeyword,
        "goto" => SyntaxKind::GotoKeyword,
        "if" => SyntaxKind::IfKeyword,
        "implements" => SyntaxKind::ImplementsKeyword,
        "include" => SyntaxKind::IncludeKeyword,
        "include_once" => SyntaxKind::IncludeOnceKeyword,
        "instanceof" => SyntaxKind::InstanceofKeyword,
        "insteadof" => SyntaxKind::InsteadofKeyword,
        "interface" => SyntaxKind::InterfaceKeyword,
        "isset" => SyntaxKind::IssetKeyword,
        "list" => SyntaxKind::ListKeyword,
        "match" => SyntaxKind::MatchKeyword,
        "namespace" => SyntaxKind::NamespaceKeyword,
        "new" => SyntaxKind::NewKeyword,
        "or" => SyntaxKind::OrKeyword,
        "print" => SyntaxKind::PrintKeyword,
        "private" => SyntaxKind::PrivateKeyword,
        "protected" => SyntaxKind::ProtectedKeyword,
        "public" => SyntaxKind::PublicKeyword,
        "readonly" => SyntaxKind::ReadonlyKeyword,
        "require" => SyntaxKind::RequireKeyword,
        "require_once" => SyntaxKind::RequireOnceKeyword,
        "return" => SyntaxKind::ReturnKeyword,
        "static" => SyntaxKind::StaticKeyword,
        "switch" => SyntaxKind::SwitchKeyword,
        "throw" => SyntaxKind::ThrowKeyword,
        "trait" => SyntaxKind::TraitKeyword,
        "try" => SyntaxKind::TryKeyword,
        "unset" => SyntaxKind::UnsetKeyword,
        "use" => SyntaxKind::UseKeyword,
        "var" => SyntaxKind::VarKeyword,
        "while" => SyntaxKind::WhileKeyword,
        "xor" => SyntaxKind::XorKeyword,
        "yield" => SyntaxKind::YieldKeyword,
        "__line__" => SyntaxKind::LineMagicConst,
        "__file__" => SyntaxKind::FileMagicConst,
        "__dir__" => SyntaxKind::DirMagicConst,
        "__class__" => SyntaxKind::ClassMagicConst,
        "__trait__" => SyntaxKind::TraitMagicConst,
        "__method__" => SyntaxKind::MethodMagicConst,
        "__function__" => SyntaxKind::FunctionMagicConst,
        "__namespace__" => SyntaxKind::NamespaceMagicConst,
        _ => return None,
    };
    Some(kind)
}
