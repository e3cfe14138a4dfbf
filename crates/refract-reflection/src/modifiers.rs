//! Modifier bitmasks with the same numeric values as PHP's native
//! `Reflection*::IS_*` constants.

use bitflags::bitflags;
use refract_parser::modifier_flags;

bitflags! {
    /// `ReflectionClass::IS_*`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClassModifiers: u32 {
        const IS_IMPLICIT_ABSTRACT = 16;
        const IS_FINAL = 32;
        const IS_EXPLICIT_ABSTRACT = 64;
        const IS_READONLY = 65536;
    }
}

bitflags! {
    /// `ReflectionMethod::IS_*`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MethodModifiers: u32 {
        const IS_PUBLIC = 1;
        const IS_PROTECTED = 2;
        const IS_PRIVATE = 4;
        const IS_STATIC = 16;
        const IS_FINAL = 32;
        const IS_ABSTRACT = 64;
    }
}

bitflags! {
    /// `ReflectionProperty::IS_*`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PropertyModifiers: u32 {
        const IS_PUBLIC = 1;
        const IS_PROTECTED = 2;
        const IS_PRIVATE = 4;
        const IS_STATIC = 16;
        const IS_READONLY = 128;
    }
}

bitflags! {
    /// `ReflectionClassConstant::IS_*`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ConstantModifiers: u32 {
        const IS_PUBLIC = 1;
        const IS_PROTECTED = 2;
        const IS_PRIVATE = 4;
        const IS_FINAL = 32;
    }
}

/// Member visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Visibility from syntax flags; public when none is written.
    pub fn from_syntax(flags: u32) -> Visibility {
        if flags & modifier_flags::PRIVATE != 0 {
            Visibility::Private
        } else if flags & modifier_flags::PROTECTED != 0 {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }

    /// Native bit (`IS_PUBLIC`, `IS_PROTECTED` or `IS_PRIVATE`).
    pub fn bits(self) -> u32 {
        match self {
            Visibility::Public => 1,
            Visibility::Protected => 2,
            Visibility::Private => 4,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl MethodModifiers {
    /// `abstract` is forced for interface methods and bodiless trait/class
    /// methods declared abstract.
    pub fn from_syntax(flags: u32, force_abstract: bool) -> MethodModifiers {
        let mut modifiers = MethodModifiers::from_bits_truncate(Visibility::from_syntax(flags).bits());
        if flags & modifier_flags::STATIC != 0 {
            modifiers |= MethodModifiers::IS_STATIC;
        }
        if flags & modifier_flags::FINAL != 0 {
            modifiers |= MethodModifiers::IS_FINAL;
        }
        if force_abstract || flags & modifier_flags::ABSTRACT != 0 {
            modifiers |= MethodModifiers::IS_ABSTRACT;
        }
        modifiers
    }

    pub fn visibility(self) -> Visibility {
        if self.contains(MethodModifiers::IS_PRIVATE) {
            Visibility::Private
        } else if self.contains(MethodModifiers::IS_PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }
}

impl PropertyModifiers {
    /// `readonly_class` marks every property readonly.
    pub fn from_syntax(flags: u32, readonly_class: bool) -> PropertyModifiers {
        let mut modifiers =
            PropertyModifiers::from_bits_truncate(Visibility::from_syntax(flags).bits());
        if flags & modifier_flags::STATIC != 0 {
            modifiers |= PropertyModifiers::IS_STATIC;
        } else if readonly_class || flags & modifier_flags::READONLY != 0 {
            modifiers |= PropertyModifiers::IS_READONLY;
        }
        modifiers
    }

    pub fn visibility(self) -> Visibility {
        if self.contains(PropertyModifiers::IS_PRIVATE) {
            Visibility::Private
        } else if self.contains(PropertyModifiers::IS_PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }
}

impl ConstantModifiers {
    pub fn from_syntax(flags: u32) -> ConstantModifiers {
        let mut modifiers =
            ConstantModifiers::from_bits_truncate(Visibility::from_syntax(flags).bits());
        if flags & modifier_flags::FINAL != 0 {
            modifiers |= ConstantModifiers::IS_FINAL;
        }
        modifiers
    }

    pub fn visibility(self) -> Visibility {
        if self.contains(ConstantModifiers::IS_PRIVATE) {
            Visibility::Private
        } else if self.contains(ConstantModifiers::IS_PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }
}
