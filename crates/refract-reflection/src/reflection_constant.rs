//! `ReflectionClassConstant` (class constants and enum cases) and
//! `ReflectionConstant` (namespace-level `const` and `define`).

use crate::descriptor::{ConstantDescriptor, ConstantOwner, ResolutionState};
use crate::error::Result;
use crate::modifiers::{ConstantModifiers, Visibility};
use crate::reflection_class::ReflectionClass;
use crate::reflection_type::ReflectionType;
use crate::reflector::Reflector;
use crate::value::ConstValue;
use refract_common::names::split_namespace;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

#[derive(Clone)]
pub struct ReflectionClassConstant<'r> {
    reflector: &'r Reflector,
    constant: Rc<ConstantDescriptor>,
}

impl<'r> ReflectionClassConstant<'r> {
    pub(crate) fn new(reflector: &'r Reflector, constant: Rc<ConstantDescriptor>) -> ReflectionClassConstant<'r> {
        ReflectionClassConstant { reflector, constant }
    }

    pub fn descriptor(&self) -> &Rc<ConstantDescriptor> {
        &self.constant
    }

    pub fn name(&self) -> &str {
        &self.constant.name
    }

    /// Resolved value; enum cases yield their case object. Resolved once,
    /// failures included.
    pub fn value(&self) -> Result<ConstValue> {
        self.reflector.constant_value(&self.constant)
    }

    /// Backing value of an enum case, `Null` for pure cases.
    pub fn backing_value(&self) -> Result<ConstValue> {
        self.reflector.enum_backing_value(&self.constant)
    }

    pub fn state(&self) -> ResolutionState {
        self.constant.state()
    }

    pub fn modifiers(&self) -> ConstantModifiers {
        self.constant.modifiers
    }

    pub fn visibility(&self) -> Visibility {
        self.constant.modifiers.visibility()
    }

    pub fn is_public(&self) -> bool {
        self.visibility() == Visibility::Public
    }

    pub fn is_protected(&self) -> bool {
        self.visibility() == Visibility::Protected
    }

    pub fn is_private(&self) -> bool {
        self.visibility() == Visibility::Private
    }

    pub fn is_final(&self) -> bool {
        self.constant.modifiers.contains(ConstantModifiers::IS_FINAL)
    }

    pub fn is_enum_case(&self) -> bool {
        self.constant.enum_case
    }

    pub fn type_(&self) -> Option<&ReflectionType> {
        self.constant.type_.as_ref()
    }

    pub fn declaring_class_name(&self) -> &str {
        match &self.constant.owner {
            ConstantOwner::Class(class) => class,
            ConstantOwner::Namespace => "",
        }
    }

    pub fn declaring_class(&self) -> Result<ReflectionClass<'r>> {
        self.reflector.reflect_class(self.declaring_class_name())
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.constant.doc_comment.as_deref()
    }

    pub fn start_line(&self) -> u32 {
        self.constant.lines.0
    }

    pub fn end_line(&self) -> u32 {
        self.constant.lines.1
    }
}

impl fmt::Debug for ReflectionClassConstant<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReflectionClassConstant")
            .field(&self.constant.identity())
            .finish()
    }
}

#[derive(Clone)]
pub struct ReflectionConstant<'r> {
    reflector: &'r Reflector,
    constant: Rc<ConstantDescriptor>,
}

impl<'r> ReflectionConstant<'r> {
    pub(crate) fn new(reflector: &'r Reflector, constant: Rc<ConstantDescriptor>) -> ReflectionConstant<'r> {
        ReflectionConstant { reflector, constant }
    }

    pub fn descriptor(&self) -> &Rc<ConstantDescriptor> {
        &self.constant
    }

    /// Fully-qualified name.
    pub fn name(&self) -> &str {
        &self.constant.name
    }

    pub fn short_name(&self) -> &str {
        self.constant.short_name()
    }

    pub fn namespace_name(&self) -> &str {
        split_namespace(&self.constant.name).0
    }

    pub fn value(&self) -> Result<ConstValue> {
        self.reflector.constant_value(&self.constant)
    }

    pub fn state(&self) -> ResolutionState {
        self.constant.state()
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.constant.doc_comment.as_deref()
    }

    pub fn file_name(&self) -> &Path {
        self.constant.scope.file().path()
    }

    pub fn start_line(&self) -> u32 {
        self.constant.lines.0
    }

    pub fn end_line(&self) -> u32 {
        self.constant.lines.1
    }
}

impl fmt::Debug for ReflectionConstant<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReflectionConstant").field(&self.constant.name).finish()
    }
}
