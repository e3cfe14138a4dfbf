//! `ReflectionClass`: classes, interfaces, traits and enums.

use crate::descriptor::{ClassDescriptor, ConstantDescriptor, MethodDescriptor, PropertyDescriptor};
use crate::error::Result;
use crate::modifiers::{ClassModifiers, ConstantModifiers, MethodModifiers, PropertyModifiers, Visibility};
use crate::reflection_constant::ReflectionClassConstant;
use crate::reflection_function::ReflectionMethod;
use crate::reflection_property::ReflectionProperty;
use crate::reflection_type::ReflectionType;
use crate::reflector::Reflector;
use crate::value::ConstValue;
use indexmap::IndexMap;
use refract_common::names::{NameKey, split_namespace, strip_leading_separator};
use refract_parser::ClassLikeKind;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

#[derive(Clone)]
pub struct ReflectionClass<'r> {
    reflector: &'r Reflector,
    class: Rc<ClassDescriptor>,
}

impl<'r> ReflectionClass<'r> {
    pub(crate) fn new(reflector: &'r Reflector, class: Rc<ClassDescriptor>) -> ReflectionClass<'r> {
        ReflectionClass { reflector, class }
    }

    /// The shared descriptor. Two handles for the same class of one
    /// reflector point at the same descriptor.
    pub fn descriptor(&self) -> &Rc<ClassDescriptor> {
        &self.class
    }

    // =========================================================================
    // Names and location
    // =========================================================================

    /// Fully-qualified name without leading separator.
    pub fn name(&self) -> &str {
        &self.class.name
    }

    pub fn short_name(&self) -> &str {
        split_namespace(&self.class.name).1
    }

    pub fn namespace_name(&self) -> &str {
        split_namespace(&self.class.name).0
    }

    pub fn in_namespace(&self) -> bool {
        !self.namespace_name().is_empty()
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.class.doc_comment.as_deref()
    }

    pub fn file_name(&self) -> &Path {
        self.class.scope.file().path()
    }

    pub fn start_line(&self) -> u32 {
        self.class.lines.0
    }

    pub fn end_line(&self) -> u32 {
        self.class.lines.1
    }

    // =========================================================================
    // Kind and modifiers
    // =========================================================================

    pub fn kind(&self) -> ClassLikeKind {
        self.class.kind
    }

    pub fn is_interface(&self) -> bool {
        self.class.kind == ClassLikeKind::Interface
    }

    pub fn is_trait(&self) -> bool {
        self.class.kind == ClassLikeKind::Trait
    }

    pub fn is_enum(&self) -> bool {
        self.class.kind == ClassLikeKind::Enum
    }

    /// `IS_*` bits. Implicit abstractness needs the whole hierarchy.
    pub fn modifiers(&self) -> Result<ClassModifiers> {
        self.reflector.class_modifiers(&self.class)
    }

    pub fn is_abstract(&self) -> Result<bool> {
        Ok(self
            .modifiers()?
            .intersects(ClassModifiers::IS_EXPLICIT_ABSTRACT | ClassModifiers::IS_IMPLICIT_ABSTRACT))
    }

    pub fn is_final(&self) -> bool {
        self.class.declared_modifiers.contains(ClassModifiers::IS_FINAL)
    }

    pub fn is_readonly(&self) -> bool {
        self.class.declared_modifiers.contains(ClassModifiers::IS_READONLY)
    }

    /// A concrete class whose constructor, if any, is public.
    pub fn is_instantiable(&self) -> Result<bool> {
        if self.class.kind != ClassLikeKind::Class || self.is_abstract()? {
            return Ok(false);
        }
        Ok(self
            .constructor()?
            .is_none_or(|constructor| constructor.visibility() == Visibility::Public))
    }

    /// A concrete class whose `__clone`, if any, is public.
    pub fn is_cloneable(&self) -> Result<bool> {
        if self.class.kind != ClassLikeKind::Class || self.is_abstract()? {
            return Ok(false);
        }
        Ok(self
            .get_method("__clone")?
            .is_none_or(|clone| clone.visibility() == Visibility::Public))
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    pub fn parent_class_name(&self) -> Option<&str> {
        self.class.parent.as_deref()
    }

    /// The parent class, located through the reflector.
    pub fn parent_class(&self) -> Result<Option<ReflectionClass<'r>>> {
        let Some(parent) = &self.class.parent else {
            return Ok(None);
        };
        let parent = self.reflector.class_descriptor(parent)?;
        Ok(Some(ReflectionClass::new(self.reflector, parent)))
    }

    /// Interfaces implemented directly or through parents and other
    /// interfaces.
    pub fn interface_names(&self) -> Result<Vec<String>> {
        self.reflector.interface_names(&self.class)
    }

    pub fn interfaces(&self) -> Result<Vec<ReflectionClass<'r>>> {
        self.interface_names()?
            .iter()
            .map(|name| self.reflector.reflect_class(name))
            .collect()
    }

    /// Traits used directly by this class.
    pub fn trait_names(&self) -> &[String] {
        &self.class.traits
    }

    pub fn is_subclass_of(&self, class: &str) -> Result<bool> {
        self.reflector.is_subclass_of(&self.class, class)
    }

    /// Whether `interface` is this interface or one it implements.
    pub fn implements_interface(&self, interface: &str) -> Result<bool> {
        let key = NameKey::folded(strip_leading_separator(interface));
        if self.is_interface() && NameKey::folded(&self.class.name) == key {
            return Ok(true);
        }
        Ok(self
            .interface_names()?
            .iter()
            .any(|name| NameKey::folded(name) == key))
    }

    // =========================================================================
    // Methods
    // =========================================================================

    /// Methods in lookup order. With a filter, only methods sharing at least
    /// one bit with it are kept.
    pub fn get_methods(&self, filter: Option<MethodModifiers>) -> Result<Vec<ReflectionMethod<'r>>> {
        Ok(self
            .reflector
            .collect_members::<MethodDescriptor>(&self.class)?
            .into_iter()
            .filter(|method| filter.is_none_or(|mask| method.modifiers.intersects(mask)))
            .map(|method| ReflectionMethod::new(self.reflector, method))
            .collect())
    }

    /// `Ok(None)` when no class in the hierarchy declares the method.
    pub fn get_method(&self, name: &str) -> Result<Option<ReflectionMethod<'r>>> {
        Ok(self
            .reflector
            .find_method(&self.class, name)?
            .map(|method| ReflectionMethod::new(self.reflector, method)))
    }

    pub fn has_method(&self, name: &str) -> Result<bool> {
        Ok(self.reflector.find_method(&self.class, name)?.is_some())
    }

    pub fn constructor(&self) -> Result<Option<ReflectionMethod<'r>>> {
        self.get_method("__construct")
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn get_properties(&self, filter: Option<PropertyModifiers>) -> Result<Vec<ReflectionProperty<'r>>> {
        Ok(self
            .reflector
            .collect_members::<PropertyDescriptor>(&self.class)?
            .into_iter()
            .filter(|property| filter.is_none_or(|mask| property.modifiers.intersects(mask)))
            .map(|property| ReflectionProperty::new(self.reflector, property))
            .collect())
    }

    pub fn get_property(&self, name: &str) -> Result<Option<ReflectionProperty<'r>>> {
        Ok(self
            .reflector
            .find_property(&self.class, name)?
            .map(|property| ReflectionProperty::new(self.reflector, property)))
    }

    pub fn has_property(&self, name: &str) -> Result<bool> {
        Ok(self.reflector.find_property(&self.class, name)?.is_some())
    }

    /// Default values of every property that has one, static or not.
    pub fn default_properties(&self) -> Result<IndexMap<String, ConstValue>> {
        let mut defaults = IndexMap::new();
        for property in self.get_properties(None)? {
            if property.has_default_value() {
                defaults.insert(property.name().to_string(), property.default_value()?);
            }
        }
        Ok(defaults)
    }

    // =========================================================================
    // Constants
    // =========================================================================

    /// Constant name to resolved value, in lookup order. The first constant
    /// that fails to resolve fails the whole call.
    pub fn get_constants(&self, filter: Option<ConstantModifiers>) -> Result<IndexMap<String, ConstValue>> {
        let mut constants = IndexMap::new();
        for constant in self.get_reflection_constants(filter)? {
            constants.insert(constant.name().to_string(), constant.value()?);
        }
        Ok(constants)
    }

    pub fn get_reflection_constants(
        &self,
        filter: Option<ConstantModifiers>,
    ) -> Result<Vec<ReflectionClassConstant<'r>>> {
        Ok(self
            .reflector
            .collect_members::<ConstantDescriptor>(&self.class)?
            .into_iter()
            .filter(|constant| filter.is_none_or(|mask| constant.modifiers.intersects(mask)))
            .map(|constant| ReflectionClassConstant::new(self.reflector, constant))
            .collect())
    }

    /// `Ok(None)` when the constant is not declared anywhere in the
    /// hierarchy; `Err` when it is declared but cannot be resolved.
    pub fn get_constant(&self, name: &str) -> Result<Option<ConstValue>> {
        match self.reflector.find_constant(&self.class, name)? {
            Some(constant) => self.reflector.constant_value(&constant).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_reflection_constant(&self, name: &str) -> Result<Option<ReflectionClassConstant<'r>>> {
        Ok(self
            .reflector
            .find_constant(&self.class, name)?
            .map(|constant| ReflectionClassConstant::new(self.reflector, constant)))
    }

    pub fn has_constant(&self, name: &str) -> Result<bool> {
        Ok(self.reflector.find_constant(&self.class, name)?.is_some())
    }

    // =========================================================================
    // Enums
    // =========================================================================

    /// `int` or `string` for backed enums.
    pub fn enum_backing_type(&self) -> Option<&ReflectionType> {
        self.class.backing_type.as_ref()
    }

    pub fn is_backed_enum(&self) -> bool {
        self.is_enum() && self.class.backing_type.is_some()
    }

    /// Cases of an enum in declaration order; empty for other class-likes.
    pub fn cases(&self) -> Vec<ReflectionClassConstant<'r>> {
        self.class
            .members()
            .constants
            .values()
            .filter(|constant| constant.enum_case)
            .map(|constant| ReflectionClassConstant::new(self.reflector, Rc::clone(constant)))
            .collect()
    }
}

impl fmt::Debug for ReflectionClass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReflectionClass").field(&self.class.name).finish()
    }
}
