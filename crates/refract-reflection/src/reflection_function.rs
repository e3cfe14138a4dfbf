//! `ReflectionFunction`, `ReflectionMethod` and `ReflectionParameter`.

use crate::descriptor::{FunctionDescriptor, FunctionLikeDescriptor, MethodDescriptor, ParameterDescriptor};
use crate::error::{ReflectionError, Result};
use crate::modifiers::{MethodModifiers, PropertyModifiers, Visibility};
use crate::reflection_class::ReflectionClass;
use crate::reflection_type::ReflectionType;
use crate::reflector::Reflector;
use crate::value::ConstValue;
use indexmap::IndexMap;
use refract_common::names::split_namespace;
use refract_parser::Node;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// Accessors shared by functions and methods, reading through `$field`.
macro_rules! function_like_accessors {
    ($($field:ident).+) => {
        pub fn doc_comment(&self) -> Option<&str> {
            self.$($field).+.doc_comment.as_deref()
        }

        pub fn file_name(&self) -> &Path {
            self.$($field).+.scope.file().path()
        }

        pub fn start_line(&self) -> u32 {
            self.$($field).+.lines.0
        }

        pub fn end_line(&self) -> u32 {
            self.$($field).+.lines.1
        }

        pub fn parameters(&self) -> Vec<ReflectionParameter<'r>> {
            self.$($field).+
                .parameters
                .iter()
                .map(|param| ReflectionParameter::new(self.reflector, Rc::clone(param)))
                .collect()
        }

        pub fn parameter(&self, name: &str) -> Option<ReflectionParameter<'r>> {
            self.$($field).+
                .parameters
                .iter()
                .find(|param| param.name == name)
                .map(|param| ReflectionParameter::new(self.reflector, Rc::clone(param)))
        }

        pub fn number_of_parameters(&self) -> usize {
            self.$($field).+.parameters.len()
        }

        pub fn number_of_required_parameters(&self) -> usize {
            self.$($field).+.parameters.iter().filter(|param| !param.optional).count()
        }

        pub fn return_type(&self) -> Option<&ReflectionType> {
            self.$($field).+.return_type.as_ref()
        }

        pub fn has_return_type(&self) -> bool {
            self.$($field).+.return_type.is_some()
        }

        pub fn returns_reference(&self) -> bool {
            self.$($field).+.returns_ref
        }

        pub fn is_variadic(&self) -> bool {
            self.$($field).+.parameters.iter().any(|param| param.variadic)
        }

        pub fn is_generator(&self) -> bool {
            self.$($field).+.is_generator
        }

        /// `static $x` declarations in the body, in source order.
        pub fn static_variable_names(&self) -> Vec<&str> {
            self.$($field).+
                .static_variables
                .iter()
                .map(|var| var.name.as_str())
                .collect()
        }

        /// Initial values of the body's static variables. A declaration
        /// without an initializer starts as null.
        pub fn static_variables(&self) -> Result<IndexMap<String, ConstValue>> {
            static_variable_values(self.reflector, &self.$($field).+)
        }
    };
}

fn static_variable_values(
    reflector: &Reflector,
    function: &FunctionLikeDescriptor,
) -> Result<IndexMap<String, ConstValue>> {
    let mut values = IndexMap::new();
    for var in &function.static_variables {
        let value = if var.initializer.is_some() {
            reflector.evaluate(&function.scope, var.initializer)?
        } else {
            ConstValue::Null
        };
        values.insert(var.name.clone(), value);
    }
    Ok(values)
}

// =============================================================================
// Functions
// =============================================================================

#[derive(Clone)]
pub struct ReflectionFunction<'r> {
    reflector: &'r Reflector,
    function: Rc<FunctionDescriptor>,
}

impl<'r> ReflectionFunction<'r> {
    pub(crate) fn new(reflector: &'r Reflector, function: Rc<FunctionDescriptor>) -> ReflectionFunction<'r> {
        ReflectionFunction { reflector, function }
    }

    pub fn descriptor(&self) -> &Rc<FunctionDescriptor> {
        &self.function
    }

    /// Fully-qualified name.
    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn short_name(&self) -> &str {
        split_namespace(&self.function.name).1
    }

    pub fn namespace_name(&self) -> &str {
        split_namespace(&self.function.name).0
    }

    pub fn in_namespace(&self) -> bool {
        !self.namespace_name().is_empty()
    }

    function_like_accessors!(function);
}

impl fmt::Debug for ReflectionFunction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReflectionFunction").field(&self.function.name).finish()
    }
}

// =============================================================================
// Methods
// =============================================================================

#[derive(Clone)]
pub struct ReflectionMethod<'r> {
    reflector: &'r Reflector,
    method: Rc<MethodDescriptor>,
}

impl<'r> ReflectionMethod<'r> {
    pub(crate) fn new(reflector: &'r Reflector, method: Rc<MethodDescriptor>) -> ReflectionMethod<'r> {
        ReflectionMethod { reflector, method }
    }

    pub fn descriptor(&self) -> &Rc<MethodDescriptor> {
        &self.method
    }

    /// Name as declared.
    pub fn name(&self) -> &str {
        &self.method.function.name
    }

    pub fn modifiers(&self) -> MethodModifiers {
        self.method.modifiers
    }

    pub fn visibility(&self) -> Visibility {
        self.method.modifiers.visibility()
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

    pub fn is_abstract(&self) -> bool {
        self.method.modifiers.contains(MethodModifiers::IS_ABSTRACT)
    }

    pub fn is_final(&self) -> bool {
        self.method.modifiers.contains(MethodModifiers::IS_FINAL)
    }

    pub fn is_static(&self) -> bool {
        self.method.modifiers.contains(MethodModifiers::IS_STATIC)
    }

    pub fn is_constructor(&self) -> bool {
        self.name().eq_ignore_ascii_case("__construct")
    }

    pub fn is_destructor(&self) -> bool {
        self.name().eq_ignore_ascii_case("__destruct")
    }

    /// Name of the class, interface or trait that declares the method.
    pub fn declaring_class_name(&self) -> &str {
        &self.method.class
    }

    pub fn declaring_class(&self) -> Result<ReflectionClass<'r>> {
        self.reflector.reflect_class(&self.method.class)
    }

    function_like_accessors!(method.function);
}

impl fmt::Debug for ReflectionMethod<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReflectionMethod({}::{})", self.method.class, self.method.function.name)
    }
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Clone)]
pub struct ReflectionParameter<'r> {
    reflector: &'r Reflector,
    param: Rc<ParameterDescriptor>,
}

impl<'r> ReflectionParameter<'r> {
    pub(crate) fn new(reflector: &'r Reflector, param: Rc<ParameterDescriptor>) -> ReflectionParameter<'r> {
        ReflectionParameter { reflector, param }
    }

    /// Name without the `$`.
    pub fn name(&self) -> &str {
        &self.param.name
    }

    /// Zero-based.
    pub fn position(&self) -> usize {
        self.param.position
    }

    /// `f()` or `Class::method()`.
    pub fn declaring_function(&self) -> &str {
        &self.param.function
    }

    pub fn type_(&self) -> Option<&ReflectionType> {
        self.param.type_.as_ref()
    }

    pub fn has_type(&self) -> bool {
        self.param.type_.is_some()
    }

    /// Untyped parameters, nullable types and `T $x = null` accept null.
    pub fn allows_null(&self) -> bool {
        match &self.param.type_ {
            None => true,
            Some(type_) => type_.allows_null() || self.default_is_null_literal(),
        }
    }

    fn default_is_null_literal(&self) -> bool {
        matches!(
            self.param.scope.arena().get(self.param.default),
            Some(Node::ConstFetch(fetch))
                if refract_common::names::strip_leading_separator(&fetch.name).eq_ignore_ascii_case("null")
        )
    }

    pub fn is_optional(&self) -> bool {
        self.param.optional
    }

    pub fn is_default_value_available(&self) -> bool {
        self.param.default.is_some()
    }

    /// Evaluate the default expression. Not cached; each call evaluates
    /// again.
    pub fn default_value(&self) -> Result<ConstValue> {
        if self.param.default.is_none() {
            return Err(ReflectionError::NoDefaultValue {
                subject: format!("parameter ${} of {}", self.param.name, self.param.function),
            });
        }
        self.reflector.evaluate(&self.param.scope, self.param.default)
    }

    /// Whether the default is a constant reference (`FOO`, `A::BAR`) rather
    /// than a literal.
    pub fn is_default_value_constant(&self) -> bool {
        self.default_value_constant_name().is_some()
    }

    /// Name of the constant the default refers to. Namespace constants are
    /// fully qualified, preferring a declared namespaced constant over the
    /// global fallback; `self` and `parent` are replaced by class names.
    pub fn default_value_constant_name(&self) -> Option<String> {
        let scope = &self.param.scope;
        match scope.arena().get(self.param.default)? {
            Node::ConstFetch(fetch) => {
                let bare = refract_common::names::strip_leading_separator(&fetch.name);
                if crate::builtins::literal_constant(bare).is_some() {
                    return None;
                }
                let candidates = scope.resolver().resolve_constant(&fetch.name);
                candidates
                    .iter()
                    .find(|candidate| self.reflector.namespace_constant(candidate).is_some())
                    .or(candidates.last())
                    .cloned()
            }
            Node::ClassConstFetch(fetch) if !fetch.name.eq_ignore_ascii_case("class") => {
                let Some(Node::Name(class)) = scope.arena().get(fetch.class) else {
                    return None;
                };
                let class_scope = scope.class.as_ref();
                let class = if class.name.eq_ignore_ascii_case("self") {
                    class_scope.map(|owner| owner.name.clone())?
                } else if class.name.eq_ignore_ascii_case("parent") {
                    class_scope.and_then(|owner| owner.parent.clone())?
                } else {
                    scope.resolver().resolve_class(&class.name)
                };
                Some(format!("{class}::{}", fetch.name))
            }
            _ => None,
        }
    }

    pub fn is_passed_by_reference(&self) -> bool {
        self.param.by_ref
    }

    pub fn is_variadic(&self) -> bool {
        self.param.variadic
    }

    /// Constructor property promotion.
    pub fn is_promoted(&self) -> bool {
        self.param.promoted.is_some()
    }

    pub fn promoted_modifiers(&self) -> Option<PropertyModifiers> {
        self.param.promoted
    }
}

impl fmt::Debug for ReflectionParameter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReflectionParameter(${} of {})", self.param.name, self.param.function)
    }
}
