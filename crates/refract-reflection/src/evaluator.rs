//! Constant-expression evaluator.
//!
//! Single-pass recursive descent over expression nodes. Each node kind maps
//! to one rule; anything that would need code to run (calls outside the
//! allow-list, `new`, variables, casts) fails with
//! [`ReflectionError::UnresolvableConstantExpression`]. Cross-constant
//! references go back through the [`Reflector`], which owns memoization and
//! cycle detection.

use crate::builtins::{builtin_constant, builtin_parameters, call_builtin, is_builtin_function, literal_constant};
use crate::descriptor::Scope;
use crate::error::{ReflectionError, Result};
use crate::ops;
use crate::reflector::Reflector;
use crate::value::{ArrayKey, ConstValue, Number, PhpArray, PhpString, numeric_value};
use refract_binder::is_special_class_name;
use refract_common::names::{NameKey, strip_leading_separator};
use refract_parser::{
    ArrayLiteralData, BinaryData, CallData, ClassConstFetchData, ClassLikeKind, DimFetchData, Node,
    NodeIndex, PropertyFetchData, UnaryData,
};
use refract_scanner::SyntaxKind;
use tracing::trace;

pub(crate) struct Evaluator<'a> {
    reflector: &'a Reflector,
    scope: &'a Scope,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(reflector: &'a Reflector, scope: &'a Scope) -> Evaluator<'a> {
        Evaluator { reflector, scope }
    }

    pub(crate) fn evaluate(&self, node: NodeIndex) -> Result<ConstValue> {
        let _depth = self.reflector.enter_expression()?;
        let Some(expr) = self.scope.arena().get(node) else {
            return Err(self.unresolvable("Missing", node));
        };
        trace!(kind = expr.kind_name(), line = self.line(node), "evaluate");

        match expr {
            Node::IntLiteral(value) => Ok(ConstValue::Int(*value)),
            Node::FloatLiteral(value) => Ok(ConstValue::Float(*value)),
            Node::StringLiteral(value) => Ok(ConstValue::String(PhpString::from(value.as_slice()))),
            Node::ArrayLiteral(array) => self.evaluate_array(array),
            Node::Unary(unary) => self.evaluate_unary(unary, node),
            Node::Binary(binary) => self.evaluate_binary(binary, node),
            Node::Ternary(ternary) => {
                let condition = self.evaluate(ternary.condition)?;
                if ternary.when_true.is_none() {
                    if condition.to_bool() {
                        return Ok(condition);
                    }
                    return self.evaluate(ternary.when_false);
                }
                if condition.to_bool() {
                    self.evaluate(ternary.when_true)
                } else {
                    self.evaluate(ternary.when_false)
                }
            }
            Node::ConstFetch(fetch) => self.evaluate_const_fetch(&fetch.name),
            Node::ClassConstFetch(fetch) => self.evaluate_class_const_fetch(fetch, node),
            Node::MagicConst(magic) => Ok(self.magic_constant(magic.kind, node)),
            Node::DimFetch(fetch) => self.evaluate_dim_fetch(fetch, node, false),
            Node::PropertyFetch(fetch) => {
                let object = self.evaluate(fetch.object)?;
                if fetch.nullsafe && object.is_null() {
                    return Ok(ConstValue::Null);
                }
                self.fetch_property(&object, fetch, node)
            }
            Node::Call(call) => self.evaluate_call(call, node),
            other => Err(self.unresolvable(other.kind_name(), node)),
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    fn line(&self, node: NodeIndex) -> u32 {
        self.scope.lines(node).0
    }

    fn unresolvable(&self, kind: &str, node: NodeIndex) -> ReflectionError {
        ReflectionError::UnresolvableConstantExpression {
            kind: kind.to_string(),
            file: self.scope.file().path().to_path_buf(),
            line: self.line(node),
            node,
        }
    }

    fn failure(&self, message: impl Into<String>, node: NodeIndex) -> ReflectionError {
        ReflectionError::Evaluation {
            message: message.into(),
            file: self.scope.file().path().to_path_buf(),
            line: self.line(node),
        }
    }

    // =========================================================================
    // Arrays
    // =========================================================================

    fn evaluate_array(&self, array: &ArrayLiteralData) -> Result<ConstValue> {
        let arena = self.scope.arena();
        let mut result = PhpArray::new();

        for item_idx in array.items.iter() {
            let Some(Node::ArrayItem(item)) = arena.get(item_idx) else {
                return Err(self.failure("Cannot use empty array elements in arrays", item_idx));
            };
            if item.by_ref {
                return Err(self.unresolvable("ArrayItem", item_idx));
            }

            if item.spread {
                let ConstValue::Array(spread) = self.evaluate(item.value)? else {
                    return Err(self.failure("Only arrays and Traversables can be unpacked", item_idx));
                };
                for (key, value) in spread.iter() {
                    match key {
                        ArrayKey::Int(_) => result
                            .push(value.clone())
                            .map_err(|message| self.failure(message, item_idx))?,
                        ArrayKey::String(_) => result.insert(key.clone(), value.clone()),
                    }
                }
                continue;
            }

            if item.key.is_none() {
                let value = self.evaluate(item.value)?;
                result
                    .push(value)
                    .map_err(|message| self.failure(message, item_idx))?;
                continue;
            }

            let key = self.evaluate(item.key)?;
            let Some(key) = ArrayKey::from_value(&key) else {
                return Err(self.failure(
                    format!("Illegal offset type {}", key.type_name()),
                    item.key,
                ));
            };
            let value = self.evaluate(item.value)?;
            result.insert(key, value);
        }

        Ok(ConstValue::Array(result))
    }

    fn evaluate_dim_fetch(&self, fetch: &DimFetchData, node: NodeIndex, quiet: bool) -> Result<ConstValue> {
        if fetch.dim.is_none() {
            return Err(self.failure("Cannot use [] for reading", node));
        }
        let container = if quiet {
            self.evaluate_quiet(fetch.object)?
        } else {
            self.evaluate(fetch.object)?
        };
        let dim = self.evaluate(fetch.dim)?;
        self.fetch_dim(&container, &dim, node, quiet)
    }

    /// `$container[$dim]`. With `quiet`, a missing key or null container
    /// gives null instead of an error (`??` semantics).
    fn fetch_dim(&self, container: &ConstValue, dim: &ConstValue, node: NodeIndex, quiet: bool) -> Result<ConstValue> {
        match container {
            ConstValue::Array(array) => {
                let Some(key) = ArrayKey::from_value(dim) else {
                    return Err(self.failure(
                        format!("Cannot access offset of type {} on array", dim.type_name()),
                        node,
                    ));
                };
                match array.get(&key) {
                    Some(value) => Ok(value.clone()),
                    None if quiet => Ok(ConstValue::Null),
                    None => Err(self.failure(format!("Undefined array key {key}"), node)),
                }
            }
            ConstValue::String(text) => {
                let offset = match dim {
                    ConstValue::Int(i) => *i,
                    ConstValue::Bool(b) => i64::from(*b),
                    ConstValue::String(s) => match numeric_value(s.as_bytes()) {
                        Some(Number::Int(i)) => i,
                        _ if quiet => return Ok(ConstValue::Null),
                        _ => {
                            return Err(self.failure(
                                format!("Cannot access offset of type {} on string", dim.type_name()),
                                node,
                            ));
                        }
                    },
                    other => {
                        return Err(self.failure(
                            format!("Cannot access offset of type {} on string", other.type_name()),
                            node,
                        ));
                    }
                };
                let bytes = text.as_bytes();
                let index = if offset < 0 {
                    offset.checked_add(bytes.len() as i64)
                } else {
                    Some(offset)
                };
                match index.filter(|i| (0..bytes.len() as i64).contains(i)) {
                    Some(i) => {
                        let i = i as usize;
                        Ok(ConstValue::String(PhpString::from(&bytes[i..i + 1])))
                    }
                    None if quiet => Ok(ConstValue::Null),
                    None => Err(self.failure(format!("Uninitialized string offset {offset}"), node)),
                }
            }
            ConstValue::EnumCase { class, .. } => Err(self.failure(
                format!("Cannot use object of type {class} as array"),
                node,
            )),
            _ => Ok(ConstValue::Null),
        }
    }

    /// Evaluate the left operand of `??`: missing keys and property reads on
    /// null yield null.
    fn evaluate_quiet(&self, node: NodeIndex) -> Result<ConstValue> {
        match self.scope.arena().get(node) {
            Some(Node::DimFetch(fetch)) if fetch.dim.is_some() => {
                let _depth = self.reflector.enter_expression()?;
                self.evaluate_dim_fetch(fetch, node, true)
            }
            Some(Node::PropertyFetch(fetch)) => {
                let _depth = self.reflector.enter_expression()?;
                let object = self.evaluate_quiet(fetch.object)?;
                if object.is_null() {
                    return Ok(ConstValue::Null);
                }
                self.fetch_property(&object, fetch, node)
            }
            _ => self.evaluate(node),
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn evaluate_unary(&self, unary: &UnaryData, node: NodeIndex) -> Result<ConstValue> {
        let apply: fn(&ConstValue) -> ops::OpResult = match unary.op {
            SyntaxKind::MinusToken => ops::negate,
            SyntaxKind::PlusToken => ops::identity,
            SyntaxKind::TildeToken => ops::bitwise_not,
            SyntaxKind::ExclamationToken => {
                let operand = self.evaluate(unary.operand)?;
                return Ok(ConstValue::Bool(!operand.to_bool()));
            }
            _ => return Err(self.unresolvable("Unary", node)),
        };
        let operand = self.evaluate(unary.operand)?;
        apply(&operand).map_err(|message| self.failure(message, node))
    }

    fn evaluate_binary(&self, binary: &BinaryData, node: NodeIndex) -> Result<ConstValue> {
        match binary.op {
            SyntaxKind::AmpersandAmpersandToken | SyntaxKind::AndKeyword => {
                if !self.evaluate(binary.left)?.to_bool() {
                    return Ok(ConstValue::Bool(false));
                }
                Ok(ConstValue::Bool(self.evaluate(binary.right)?.to_bool()))
            }
            SyntaxKind::BarBarToken | SyntaxKind::OrKeyword => {
                if self.evaluate(binary.left)?.to_bool() {
                    return Ok(ConstValue::Bool(true));
                }
                Ok(ConstValue::Bool(self.evaluate(binary.right)?.to_bool()))
            }
            SyntaxKind::QuestionQuestionToken => {
                let left = self.evaluate_quiet(binary.left)?;
                if !left.is_null() {
                    return Ok(left);
                }
                self.evaluate(binary.right)
            }
            SyntaxKind::InstanceofKeyword => Err(self.unresolvable("Instanceof", node)),
            op => {
                let left = self.evaluate(binary.left)?;
                let right = self.evaluate(binary.right)?;
                ops::binary(op, &left, &right).map_err(|message| self.failure(message, node))
            }
        }
    }

    // =========================================================================
    // Constants
    // =========================================================================

    fn evaluate_const_fetch(&self, name: &str) -> Result<ConstValue> {
        if let Some(value) = literal_constant(strip_leading_separator(name)) {
            return Ok(value);
        }

        let candidates = self.scope.resolver().resolve_constant(name);
        for candidate in &candidates {
            if let Some(constant) = self.reflector.namespace_constant(candidate) {
                return self.reflector.constant_value(&constant);
            }
        }
        if self.reflector.options().builtin_constants {
            let separator = self.reflector.options().directory_separator;
            for candidate in &candidates {
                if let Some(value) = builtin_constant(candidate, separator) {
                    return Ok(value);
                }
            }
        }

        Err(ReflectionError::ConstantNotFound {
            name: candidates
                .first()
                .cloned()
                .unwrap_or_else(|| strip_leading_separator(name).to_string()),
        })
    }

    fn evaluate_class_const_fetch(&self, fetch: &ClassConstFetchData, node: NodeIndex) -> Result<ConstValue> {
        let Some(Node::Name(class_name)) = self.scope.arena().get(fetch.class) else {
            return Err(self.unresolvable("ClassConstFetch", node));
        };
        let class = self.resolve_class_reference(&class_name.name, node)?;
        if fetch.name.eq_ignore_ascii_case("class") {
            return Ok(ConstValue::from(class));
        }
        self.class_constant(&class, &fetch.name)
    }

    fn class_constant(&self, class: &str, name: &str) -> Result<ConstValue> {
        let descriptor = self.reflector.class_descriptor(class)?;
        let Some(constant) = self.reflector.find_constant(&descriptor, name)? else {
            return Err(ReflectionError::ConstantNotFound {
                name: format!("{}::{name}", descriptor.name),
            });
        };
        self.reflector.constant_value(&constant)
    }

    /// Fully-qualified class for a name in class position. `self` and
    /// `parent` come from the lexical class.
    fn resolve_class_reference(&self, name: &str, node: NodeIndex) -> Result<String> {
        let class_scope = self.scope.class.as_ref();
        if name.eq_ignore_ascii_case("self") {
            return class_scope.map(|class| class.name.clone()).ok_or_else(|| {
                self.failure("Cannot use \"self\" when no class scope is active", node)
            });
        }
        if name.eq_ignore_ascii_case("parent") {
            let Some(class) = class_scope else {
                return Err(self.failure("Cannot use \"parent\" when no class scope is active", node));
            };
            return class.parent.clone().ok_or_else(|| {
                self.failure("Cannot use \"parent\" when current class scope has no parent", node)
            });
        }
        if name.eq_ignore_ascii_case("static") {
            return Err(self.failure("\"static::\" is not allowed in compile-time constants", node));
        }
        Ok(self.scope.resolver().resolve_class(name))
    }

    fn magic_constant(&self, kind: SyntaxKind, node: NodeIndex) -> ConstValue {
        let class = self.scope.class.as_ref();
        let function = self.scope.function.as_deref();
        let text = match kind {
            SyntaxKind::LineMagicConst => return ConstValue::Int(i64::from(self.line(node))),
            SyntaxKind::FileMagicConst => self.scope.file().path().to_string_lossy().into_owned(),
            SyntaxKind::DirMagicConst => self.scope.file().directory().to_string_lossy().into_owned(),
            SyntaxKind::NamespaceMagicConst => self.scope.block.name().to_string(),
            SyntaxKind::ClassMagicConst => class.map(|class| class.name.clone()).unwrap_or_default(),
            SyntaxKind::TraitMagicConst => class
                .filter(|class| class.kind == ClassLikeKind::Trait)
                .map(|class| class.name.clone())
                .unwrap_or_default(),
            SyntaxKind::FunctionMagicConst => function.unwrap_or_default().to_string(),
            SyntaxKind::MethodMagicConst => match (class, function) {
                (Some(class), Some(function)) => format!("{}::{function}", class.name),
                (None, Some(function)) => function.to_string(),
                _ => String::new(),
            },
            _ => String::new(),
        };
        ConstValue::from(text)
    }

    // =========================================================================
    // Enum case properties
    // =========================================================================

    fn fetch_property(&self, object: &ConstValue, fetch: &PropertyFetchData, node: NodeIndex) -> Result<ConstValue> {
        let Some(Node::Name(property)) = self.scope.arena().get(fetch.name) else {
            return Err(self.unresolvable("PropertyFetch", node));
        };
        let ConstValue::EnumCase { class, case } = object else {
            return Err(self.failure(
                format!(
                    "Attempt to read property \"{}\" on {}",
                    property.name,
                    object.type_name()
                ),
                node,
            ));
        };

        match property.name.as_str() {
            "name" => Ok(ConstValue::from(case.as_str())),
            "value" => {
                let descriptor = self.reflector.class_descriptor(class)?;
                let constant = descriptor
                    .members()
                    .constants
                    .get(&NameKey::exact(case))
                    .filter(|constant| constant.enum_case)
                    .cloned();
                match constant {
                    Some(constant) if descriptor.backing_type.is_some() => {
                        self.reflector.enum_backing_value(&constant)
                    }
                    _ => Err(self.failure(format!("Undefined property: {class}::$value"), node)),
                }
            }
            other => Err(self.failure(format!("Undefined property: {class}::${other}"), node)),
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn evaluate_call(&self, call: &CallData, node: NodeIndex) -> Result<ConstValue> {
        let arena = self.scope.arena();
        if call.callable_syntax {
            return Err(self.unresolvable("Call", node));
        }
        let Some(Node::Name(callee)) = arena.get(call.callee) else {
            return Err(self.unresolvable("Call", node));
        };
        let Some(function) = self.builtin_target(&callee.name) else {
            return Err(self.unresolvable("Call", node));
        };
        let Some(parameters) = builtin_parameters(&function) else {
            return Err(self.unresolvable("Call", node));
        };

        let mut slots: Vec<Option<ConstValue>> = Vec::new();
        let mut named = false;
        for arg_idx in call.arguments.iter() {
            let Some(Node::Argument(argument)) = arena.get(arg_idx) else {
                return Err(self.unresolvable("Argument", arg_idx));
            };
            let value = self.evaluate(argument.value)?;

            if argument.spread {
                let ConstValue::Array(spread) = value else {
                    return Err(self.failure("Only arrays and Traversables can be unpacked", arg_idx));
                };
                for (key, value) in spread.iter() {
                    match key {
                        ArrayKey::Int(_) if named => {
                            return Err(self.failure(
                                "Cannot use positional argument after named argument during unpacking",
                                arg_idx,
                            ));
                        }
                        ArrayKey::Int(_) => slots.push(Some(value.clone())),
                        ArrayKey::String(name) => {
                            named = true;
                            let name = name.to_string_lossy();
                            self.place_named(&function, parameters, &mut slots, &name, value.clone(), arg_idx)?;
                        }
                    }
                }
                continue;
            }

            match &argument.name {
                Some(name) => {
                    named = true;
                    self.place_named(&function, parameters, &mut slots, name, value, arg_idx)?;
                }
                None if named => {
                    return Err(self.failure("Cannot use positional argument after named argument", arg_idx));
                }
                None => slots.push(Some(value)),
            }
        }

        let mut args = Vec::with_capacity(slots.len());
        for (position, slot) in slots.into_iter().enumerate() {
            let Some(value) = slot else {
                let parameter = parameters.get(position).copied().unwrap_or("");
                return Err(self.failure(
                    format!("{function}(): Argument #{} (${parameter}) not passed", position + 1),
                    node,
                ));
            };
            args.push(value);
        }

        trace!(function = %function, args = args.len(), "calling builtin");
        if function == "constant" {
            return self.call_constant(&args, node);
        }
        call_builtin(&function, &args, self.reflector.options().directory_separator)
            .map_err(|message| self.failure(message, node))
    }

    /// Lowercase builtin a call name resolves to. `None` when a user function
    /// is found first or the name is not allow-listed.
    fn builtin_target(&self, name: &str) -> Option<String> {
        for candidate in self.scope.resolver().resolve_function(name) {
            if self.reflector.has_function(&candidate) {
                return None;
            }
            let lower = candidate.to_ascii_lowercase();
            if !lower.contains('\\') && is_builtin_function(&lower) {
                return Some(lower);
            }
        }
        None
    }

    fn place_named(
        &self,
        function: &str,
        parameters: &[&str],
        slots: &mut Vec<Option<ConstValue>>,
        name: &str,
        value: ConstValue,
        node: NodeIndex,
    ) -> Result<()> {
        let Some(position) = parameters.iter().position(|parameter| *parameter == name) else {
            return Err(self.failure(format!("Unknown named parameter ${name}"), node));
        };
        if slots.len() <= position {
            slots.resize(position + 1, None);
        }
        if slots[position].is_some() {
            return Err(self.failure(
                format!("Named parameter ${name} overwrites previous argument"),
                node,
            ));
        }
        trace!(function, parameter = name, position, "named argument");
        slots[position] = Some(value);
        Ok(())
    }

    /// `constant('NAME')` / `constant('Class::NAME')`. Names are taken as
    /// fully qualified.
    fn call_constant(&self, args: &[ConstValue], node: NodeIndex) -> Result<ConstValue> {
        let [name] = args else {
            return Err(self.failure(
                format!("constant() expects exactly 1 argument, {} given", args.len()),
                node,
            ));
        };
        let ConstValue::String(name) = name else {
            return Err(self.failure(
                format!(
                    "constant(): Argument #1 ($name) must be of type string, {} given",
                    name.type_name()
                ),
                node,
            ));
        };
        let name = name.to_string_lossy();

        if let Some((class, constant)) = name.split_once("::") {
            let class = strip_leading_separator(class);
            let class = if is_special_class_name(class) {
                self.resolve_class_reference(class, node)?
            } else {
                class.to_string()
            };
            return self.class_constant(&class, constant);
        }

        let name = strip_leading_separator(&name);
        if let Some(value) = literal_constant(name) {
            return Ok(value);
        }
        if let Some(constant) = self.reflector.namespace_constant(name) {
            return self.reflector.constant_value(&constant);
        }
        if self.reflector.options().builtin_constants {
            if let Some(value) = builtin_constant(name, self.reflector.options().directory_separator) {
                return Ok(value);
            }
        }
        Err(ReflectionError::ConstantNotFound {
            name: name.to_string(),
        })
    }
}
