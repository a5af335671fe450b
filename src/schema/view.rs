//! Runtime schema introspection
//!
//! The data-making pipeline never sees a schema at compile time; it asks a
//! [`SchemaView`] which slots a class has and what their ranges are.
//! [`SchemaDefinition`] answers these questions for schemas loaded from YAML.

use std::collections::{HashSet, VecDeque};

use super::definition::{
    ClassDefinition, EnumDefinition, PRIMITIVE_TYPES, SchemaDefinition, SlotDefinition, URI_TYPES,
};
use super::error::{SchemaError, SchemaResult};

/// Read-only query surface over a schema
pub trait SchemaView {
    /// Names of all classes, in declaration order
    fn all_classes(&self) -> Vec<String>;

    fn get_class(&self, name: &str) -> Option<&ClassDefinition>;

    /// Names of all enumerations, in declaration order
    fn all_enums(&self) -> Vec<String>;

    fn get_enum(&self, name: &str) -> Option<&EnumDefinition>;

    /// Names of all slots applicable to a class (own and inherited), ordered
    fn class_slots(&self, class_name: &str) -> SchemaResult<Vec<String>>;

    /// Slot definition as seen from `class_name`, after inheritance and
    /// `slot_usage` refinements are applied
    fn induced_slot(&self, slot_name: &str, class_name: &str) -> SchemaResult<SlotDefinition>;

    /// Primitive type a range resolves to, following custom type chains
    ///
    /// Returns `None` for classes, enums and unknown names.
    fn primitive_type(&self, range: &str) -> Option<String>;

    /// All induced slots of a class, ordered
    fn class_induced_slots(&self, class_name: &str) -> SchemaResult<Vec<SlotDefinition>> {
        self.class_slots(class_name)?
            .iter()
            .map(|slot| self.induced_slot(slot, class_name))
            .collect()
    }

    /// The slot acting as identifier for a class, if any
    fn get_identifier_slot(&self, class_name: &str) -> SchemaResult<Option<SlotDefinition>> {
        Ok(self
            .class_induced_slots(class_name)?
            .into_iter()
            .find(SlotDefinition::is_identifier))
    }

    /// Induced slots that are not annotated to be skipped when prompting
    fn promptable_slots(&self, class_name: &str) -> SchemaResult<Vec<SlotDefinition>> {
        Ok(self
            .class_induced_slots(class_name)?
            .into_iter()
            .filter(|slot| !slot.skip_prompt())
            .collect())
    }

    fn is_class(&self, name: &str) -> bool {
        self.get_class(name).is_some()
    }

    fn is_enum(&self, name: &str) -> bool {
        self.get_enum(name).is_some()
    }

    /// Whether values of this slot are embedded rather than referenced
    ///
    /// An explicit `inlined` flag wins; otherwise a slot is inlined when its
    /// range class has no identifier and therefore cannot be referenced.
    fn is_inlined(&self, slot: &SlotDefinition) -> SchemaResult<bool> {
        if let Some(inlined) = slot.inlined {
            return Ok(inlined);
        }
        let range = slot.range();
        if self.is_class(range) {
            return Ok(self.get_identifier_slot(range)?.is_none());
        }
        Ok(false)
    }

    /// Whether the range resolves to a URI or CURIE type
    fn is_uri_range(&self, range: &str) -> bool {
        self.primitive_type(range)
            .is_some_and(|p| URI_TYPES.contains(&p.as_str()))
    }

    /// Class to generate when the caller names none
    ///
    /// The first `tree_root` class, otherwise the first concrete class.
    fn target_class(&self) -> Option<String> {
        let classes = self.all_classes();
        classes
            .iter()
            .find(|name| self.get_class(name).is_some_and(|c| c.tree_root))
            .or_else(|| {
                classes.iter().find(|name| {
                    self.get_class(name)
                        .is_some_and(|c| !c.is_abstract && !c.mixin)
                })
            })
            .cloned()
    }
}

impl<T: SchemaView + ?Sized> SchemaView for &T {
    fn all_classes(&self) -> Vec<String> {
        (**self).all_classes()
    }

    fn get_class(&self, name: &str) -> Option<&ClassDefinition> {
        (**self).get_class(name)
    }

    fn all_enums(&self) -> Vec<String> {
        (**self).all_enums()
    }

    fn get_enum(&self, name: &str) -> Option<&EnumDefinition> {
        (**self).get_enum(name)
    }

    fn class_slots(&self, class_name: &str) -> SchemaResult<Vec<String>> {
        (**self).class_slots(class_name)
    }

    fn induced_slot(&self, slot_name: &str, class_name: &str) -> SchemaResult<SlotDefinition> {
        (**self).induced_slot(slot_name, class_name)
    }

    fn primitive_type(&self, range: &str) -> Option<String> {
        (**self).primitive_type(range)
    }
}

impl SchemaDefinition {
    /// Class and its ancestors, nearest first
    ///
    /// Breadth-first over `is_a` then `mixins`; each class appears once.
    pub fn class_ancestors(&self, class_name: &str) -> SchemaResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([class_name.to_string()]);

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            let class = self
                .classes
                .get(&name)
                .ok_or_else(|| SchemaError::ClassNotFound(name.clone()))?;
            queue.extend(class.is_a.iter().cloned());
            queue.extend(class.mixins.iter().cloned());
            order.push(name);
        }

        Ok(order)
    }

    fn default_range(&self) -> &str {
        self.default_range
            .as_deref()
            .unwrap_or(super::definition::DEFAULT_RANGE)
    }
}

impl SchemaView for SchemaDefinition {
    fn all_classes(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    fn get_class(&self, name: &str) -> Option<&ClassDefinition> {
        self.classes.get(name)
    }

    fn all_enums(&self) -> Vec<String> {
        self.enums.keys().cloned().collect()
    }

    fn get_enum(&self, name: &str) -> Option<&EnumDefinition> {
        self.enums.get(name)
    }

    fn class_slots(&self, class_name: &str) -> SchemaResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut slots = Vec::new();

        for ancestor in self.class_ancestors(class_name)? {
            let Some(class) = self.classes.get(&ancestor) else {
                continue;
            };
            let names = class
                .slots
                .iter()
                .map(String::as_str)
                .chain(class.attributes.keys().map(String::as_str));
            for name in names {
                if seen.insert(name.to_string()) {
                    slots.push(name.to_string());
                }
            }
        }

        Ok(slots)
    }

    fn induced_slot(&self, slot_name: &str, class_name: &str) -> SchemaResult<SlotDefinition> {
        let ancestors = self.class_ancestors(class_name)?;
        let not_found = || SchemaError::SlotNotFound {
            slot: slot_name.to_string(),
            class: class_name.to_string(),
        };

        // Nearest ancestor declaring the slot decides whether it is an
        // attribute or a reference to a schema-level slot.
        let mut base = None;
        for ancestor in &ancestors {
            let Some(class) = self.classes.get(ancestor) else {
                continue;
            };
            if let Some(attr) = class.attributes.get(slot_name) {
                let global = self.slots.get(slot_name).cloned().unwrap_or_default();
                base = Some(global.merged_with(attr));
                break;
            }
            if class.slots.iter().any(|s| s == slot_name) {
                base = Some(self.slots.get(slot_name).cloned().ok_or_else(not_found)?);
                break;
            }
        }
        let mut slot = base.ok_or_else(not_found)?;

        // Farthest refinement first so the nearest one wins.
        for ancestor in ancestors.iter().rev() {
            if let Some(usage) = self
                .classes
                .get(ancestor)
                .and_then(|c| c.slot_usage.get(slot_name))
            {
                slot = slot.merged_with(usage);
            }
        }

        slot.name = slot_name.to_string();
        if slot.range.is_none() {
            slot.range = Some(self.default_range().to_string());
        }
        Ok(slot)
    }

    fn primitive_type(&self, range: &str) -> Option<String> {
        let mut current = range.to_string();
        let mut seen = HashSet::new();
        loop {
            if PRIMITIVE_TYPES.contains(&current.as_str()) {
                return Some(current);
            }
            if !seen.insert(current.clone()) {
                return None;
            }
            let parent = self.types.get(&current)?.type_of.clone()?;
            current = parent;
        }
    }
}
