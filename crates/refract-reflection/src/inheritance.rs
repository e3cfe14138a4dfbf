//! Inheritance-aware member lookup.
//!
//! Lookup order is the class itself, then the parent (recursively, with the
//! parent's own interfaces and traits), then interfaces, then traits, each
//! in declaration order. The first match wins. Every step pushes the class
//! onto the reflector's in-progress stack, so a class that is its own
//! ancestor fails with [`ReflectionError::InheritanceCycle`] instead of
//! recursing forever.
//!
//! Private properties and constants reached through a parent or interface
//! edge are invisible to the inheriting class. Trait members are copied into
//! the using class, so they stay visible.

use crate::descriptor::{
    AncestorEdge, ClassDescriptor, ClassMembers, ConstantDescriptor, MethodDescriptor, PropertyDescriptor,
};
use crate::error::Result;
use crate::modifiers::{ClassModifiers, ConstantModifiers, MethodModifiers, PropertyModifiers};
use crate::reflector::Reflector;
use indexmap::IndexMap;
use indexmap::map::Entry;
use refract_common::names::{NameKey, strip_leading_separator};
use refract_parser::ClassLikeKind;
use std::rc::Rc;

/// A member table of a class descriptor.
pub(crate) trait Member {
    fn table(members: &ClassMembers) -> &IndexMap<NameKey, Rc<Self>>;
    fn key(name: &str) -> NameKey;
    /// Whether the member stays visible when inherited.
    fn inheritable(&self) -> bool;
}

impl Member for MethodDescriptor {
    fn table(members: &ClassMembers) -> &IndexMap<NameKey, Rc<Self>> {
        &members.methods
    }

    fn key(name: &str) -> NameKey {
        NameKey::folded(name)
    }

    fn inheritable(&self) -> bool {
        true
    }
}

impl Member for PropertyDescriptor {
    fn table(members: &ClassMembers) -> &IndexMap<NameKey, Rc<Self>> {
        &members.properties
    }

    fn key(name: &str) -> NameKey {
        NameKey::exact(name)
    }

    fn inheritable(&self) -> bool {
        !self.modifiers.contains(PropertyModifiers::IS_PRIVATE)
    }
}

impl Member for ConstantDescriptor {
    fn table(members: &ClassMembers) -> &IndexMap<NameKey, Rc<Self>> {
        &members.constants
    }

    fn key(name: &str) -> NameKey {
        NameKey::exact(name)
    }

    fn inheritable(&self) -> bool {
        !self.modifiers.contains(ConstantModifiers::IS_PRIVATE)
    }
}

impl Reflector {
    pub(crate) fn find_method(&self, class: &ClassDescriptor, name: &str) -> Result<Option<Rc<MethodDescriptor>>> {
        self.find_member(class, &MethodDescriptor::key(name), false)
    }

    pub(crate) fn find_property(&self, class: &ClassDescriptor, name: &str) -> Result<Option<Rc<PropertyDescriptor>>> {
        self.find_member(class, &PropertyDescriptor::key(name), false)
    }

    pub(crate) fn find_constant(&self, class: &ClassDescriptor, name: &str) -> Result<Option<Rc<ConstantDescriptor>>> {
        self.find_member(class, &ConstantDescriptor::key(name), false)
    }

    fn find_member<M: Member>(&self, class: &ClassDescriptor, key: &NameKey, inherited: bool) -> Result<Option<Rc<M>>> {
        if let Some(member) = M::table(class.members()).get(key) {
            if !inherited || member.inheritable() {
                return Ok(Some(Rc::clone(member)));
            }
        }

        let _guard = self.enter_class(&class.name)?;
        for (name, edge) in class.ancestor_names() {
            let ancestor = self.class_descriptor(name)?;
            let inherited = inherited || edge != AncestorEdge::Trait;
            if let Some(member) = self.find_member(&ancestor, key, inherited)? {
                return Ok(Some(member));
            }
        }
        Ok(None)
    }

    /// Every visible member in lookup order, first declaration of a name
    /// winning.
    pub(crate) fn collect_members<M: Member>(&self, class: &ClassDescriptor) -> Result<Vec<Rc<M>>> {
        let mut found = IndexMap::new();
        self.collect_into(class, false, &mut found)?;
        Ok(found.into_values().collect())
    }

    fn collect_into<M: Member>(
        &self,
        class: &ClassDescriptor,
        inherited: bool,
        found: &mut IndexMap<NameKey, Rc<M>>,
    ) -> Result<()> {
        for (key, member) in M::table(class.members()) {
            if inherited && !member.inheritable() {
                continue;
            }
            if let Entry::Vacant(slot) = found.entry(key.clone()) {
                slot.insert(Rc::clone(member));
            }
        }

        let _guard = self.enter_class(&class.name)?;
        for (name, edge) in class.ancestor_names() {
            let ancestor = self.class_descriptor(name)?;
            self.collect_into(&ancestor, inherited || edge != AncestorEdge::Trait, found)?;
        }
        Ok(())
    }

    /// All transitive ancestors in lookup order, each once. The flag is set
    /// when the ancestor is only reachable through a trait.
    pub(crate) fn ancestors(&self, class: &ClassDescriptor) -> Result<Vec<(Rc<ClassDescriptor>, bool)>> {
        let mut found: IndexMap<NameKey, (Rc<ClassDescriptor>, bool)> = IndexMap::new();
        self.collect_ancestors(class, false, &mut found)?;
        Ok(found.into_values().collect())
    }

    fn collect_ancestors(
        &self,
        class: &ClassDescriptor,
        via_trait: bool,
        found: &mut IndexMap<NameKey, (Rc<ClassDescriptor>, bool)>,
    ) -> Result<()> {
        let _guard = self.enter_class(&class.name)?;
        for (name, edge) in class.ancestor_names() {
            let ancestor = self.class_descriptor(name)?;
            let via_trait = via_trait || edge == AncestorEdge::Trait;
            match found.entry(NameKey::folded(&ancestor.name)) {
                Entry::Occupied(mut slot) => {
                    if !via_trait {
                        slot.get_mut().1 = false;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert((Rc::clone(&ancestor), via_trait));
                }
            }
            self.collect_ancestors(&ancestor, via_trait, found)?;
        }
        Ok(())
    }

    /// Names of all interfaces the class implements, transitively.
    pub(crate) fn interface_names(&self, class: &ClassDescriptor) -> Result<Vec<String>> {
        Ok(self
            .ancestors(class)?
            .into_iter()
            .filter(|(ancestor, via_trait)| !via_trait && ancestor.kind == ClassLikeKind::Interface)
            .map(|(ancestor, _)| ancestor.name.clone())
            .collect())
    }

    /// Whether `other` is a parent class or interface of `class`,
    /// transitively. A class is not a subclass of itself.
    pub(crate) fn is_subclass_of(&self, class: &ClassDescriptor, other: &str) -> Result<bool> {
        let other = NameKey::folded(strip_leading_separator(other));
        if NameKey::folded(&class.name) == other {
            return Ok(false);
        }
        Ok(self
            .ancestors(class)?
            .iter()
            .any(|(ancestor, via_trait)| !via_trait && NameKey::folded(&ancestor.name) == other))
    }

    /// Declared modifiers plus `IS_IMPLICIT_ABSTRACT` when any method the
    /// class ends up with, own or inherited, is abstract.
    pub(crate) fn class_modifiers(&self, class: &ClassDescriptor) -> Result<ClassModifiers> {
        let mut modifiers = class.declared_modifiers;
        let holds_abstract = self
            .collect_members::<MethodDescriptor>(class)?
            .iter()
            .any(|method| method.modifiers.contains(MethodModifiers::IS_ABSTRACT));
        if holds_abstract {
            modifiers |= ClassModifiers::IS_IMPLICIT_ABSTRACT;
        }
        Ok(modifiers)
    }
}
