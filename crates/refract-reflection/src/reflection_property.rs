//! `ReflectionProperty`.

use crate::descriptor::PropertyDescriptor;
use crate::error::{ReflectionError, Result};
use crate::modifiers::{PropertyModifiers, Visibility};
use crate::reflection_class::ReflectionClass;
use crate::reflection_type::ReflectionType;
use crate::reflector::Reflector;
use crate::value::ConstValue;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub struct ReflectionProperty<'r> {
    reflector: &'r Reflector,
    property: Rc<PropertyDescriptor>,
}

impl<'r> ReflectionProperty<'r> {
    pub(crate) fn new(reflector: &'r Reflector, property: Rc<PropertyDescriptor>) -> ReflectionProperty<'r> {
        ReflectionProperty { reflector, property }
    }

    pub fn descriptor(&self) -> &Rc<PropertyDescriptor> {
        &self.property
    }

    /// Name without the `$`.
    pub fn name(&self) -> &str {
        &self.property.name
    }

    pub fn modifiers(&self) -> PropertyModifiers {
        self.property.modifiers
    }

    pub fn visibility(&self) -> Visibility {
        self.property.modifiers.visibility()
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

    pub fn is_static(&self) -> bool {
        self.property.modifiers.contains(PropertyModifiers::IS_STATIC)
    }

    pub fn is_readonly(&self) -> bool {
        self.property.modifiers.contains(PropertyModifiers::IS_READONLY)
    }

    pub fn is_promoted(&self) -> bool {
        self.property.promoted
    }

    pub fn type_(&self) -> Option<&ReflectionType> {
        self.property.type_.as_ref()
    }

    pub fn has_type(&self) -> bool {
        self.property.type_.is_some()
    }

    /// Untyped properties without an initializer default to null; typed and
    /// promoted ones have no default.
    pub fn has_default_value(&self) -> bool {
        self.property.default.is_some() || (self.property.type_.is_none() && !self.property.promoted)
    }

    pub fn default_value(&self) -> Result<ConstValue> {
        if self.property.default.is_some() {
            return self.reflector.evaluate(&self.property.scope, self.property.default);
        }
        if self.has_default_value() {
            return Ok(ConstValue::Null);
        }
        Err(ReflectionError::NoDefaultValue {
            subject: format!("property {}::${}", self.property.class, self.property.name),
        })
    }

    pub fn declaring_class_name(&self) -> &str {
        &self.property.class
    }

    pub fn declaring_class(&self) -> Result<ReflectionClass<'r>> {
        self.reflector.reflect_class(&self.property.class)
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.property.doc_comment.as_deref()
    }

    pub fn start_line(&self) -> u32 {
        self.property.lines.0
    }

    pub fn end_line(&self) -> u32 {
        self.property.lines.1
    }
}

impl fmt::Debug for ReflectionProperty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReflectionProperty({}::${})", self.property.class, self.property.name)
    }
}
