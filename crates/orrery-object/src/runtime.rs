//! Runtime context and metaclass bootstrap
//!
//! A [`Runtime`] owns the class registry and the ids of the bootstrap classes.
//! It is built once and handed to whatever needs the object model. No global
//! state is involved.
//!
//! ## Bootstrap
//!
//! The root class `Class` is its own class. That link can only be made once
//! the class exists, so bootstrap runs in phases:
//!
//! 1. Register `Class` with its class link still pending.
//! 2. Bind the link to `Class` itself.
//! 3. Register the builtin classes (`Method`, `UnboundMethod`, `String`,
//!    `Integer`), then install `create` in `Class`'s public properties.
//!
//! `create` reads `Class`'s properties each time it runs. A class created
//! later sees properties added to `Class` since bootstrap. A class created
//! earlier keeps the snapshot it got.

use std::rc::Rc;

use log::debug;

use crate::class::{ClassData, ClassId, ClassKind, ClassRegistry};
use crate::hierarchy;
use crate::instance::PlainInstance;
use crate::method::{Function, MethodInstance, UnboundFunction, UnboundMethodInstance};
use crate::options::RuntimeOptions;
use crate::properties::{Properties, PUBLIC};
use crate::value::{Primitive, Value};
use crate::{ObjectError, ObjectResult};

/// Ids of the classes installed during bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtins {
    /// The root metaclass (`Class`)
    pub class: ClassId,
    /// Wrapper class of receiver-less methods
    pub method: ClassId,
    /// Wrapper class of methods taking an explicit receiver
    pub unbound_method: ClassId,
    /// Class of string instances
    pub string: ClassId,
    /// Class of integer instances
    pub integer: ClassId,
}

/// The object model context
#[derive(Debug)]
pub struct Runtime {
    registry: ClassRegistry,
    builtins: Builtins,
    options: RuntimeOptions,
    bootstrapped: bool,
}

impl Runtime {
    /// Bootstrap a runtime with default options
    pub fn new() -> ObjectResult<Self> {
        Self::with_options(RuntimeOptions::default())
    }

    /// Bootstrap a runtime
    pub fn with_options(options: RuntimeOptions) -> ObjectResult<Self> {
        let mut registry = ClassRegistry::new();

        // Phase 1: the root exists but does not know its class yet
        let root = registry.register(ClassData::pending(
            options.root_class_name.as_str(),
            ClassKind::Metaclass,
        ));

        // Phase 2: the root's class is the root
        registry.get(root)?.bind_class(root)?;
        debug!("bootstrap: '{}' bound as its own class", options.root_class_name);

        let mut builtin = |name: &str| {
            registry.register(ClassData::new(
                name,
                ClassKind::Builtin,
                root,
                None,
                Properties::new(),
                Properties::new(),
            ))
        };
        let builtins = Builtins {
            class: root,
            method: builtin("Method"),
            unbound_method: builtin("UnboundMethod"),
            string: builtin("String"),
            integer: builtin("Integer"),
        };

        let mut rt = Runtime {
            registry,
            builtins,
            options,
            bootstrapped: false,
        };

        // Phase 3: class-level `create`
        rt.define_method(root, "create", create)?;
        rt.bootstrapped = true;
        debug!("bootstrap complete: {} classes", rt.registry.len());

        Ok(rt)
    }

    /// Class registry
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Bootstrap class ids
    pub fn builtins(&self) -> Builtins {
        self.builtins
    }

    /// The root metaclass
    pub fn class_class(&self) -> ClassId {
        self.builtins.class
    }

    /// Options this runtime was built with
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Check if bootstrap finished
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Create a user class named `name` under the root class
    ///
    /// The new class's class and super are both the root. Its properties are
    /// a snapshot of the root's public properties taken now.
    pub fn create_class(&mut self, name: &str) -> ObjectResult<ClassId> {
        if !self.bootstrapped {
            return Err(ObjectError::InvalidBootstrapState(format!(
                "create('{}') called before bootstrap completed",
                name
            )));
        }
        if name.is_empty() && !self.options.allow_empty_class_names {
            return Err(ObjectError::ArgumentError(
                "class name must not be empty".to_string(),
            ));
        }

        let root = self.builtins.class;
        // The class link must already be in place
        self.registry.class_of(root)?;

        let props = self.registry.props(root)?.borrow().inheritable();
        let id = self.registry.register(ClassData::new(
            name,
            ClassKind::User,
            root,
            Some(root),
            props,
            Properties::new(),
        ));
        debug!("created class '{}' as {}", name, id);
        Ok(id)
    }

    /// Wrap a callable in a `Method` instance
    pub fn new_method<F>(&self, f: F) -> ObjectResult<Rc<MethodInstance>>
    where
        F: Fn(&mut Runtime, &[Value]) -> ObjectResult<Value> + 'static,
    {
        let class = self.builtins.method;
        Ok(Rc::new(MethodInstance::new(
            class,
            self.registry.props(class)?,
            Function::new(f),
        )))
    }

    /// Wrap a receiver-taking callable in an `UnboundMethod` instance
    pub fn new_unbound_method<F>(&self, f: F) -> ObjectResult<Rc<UnboundMethodInstance>>
    where
        F: Fn(&mut Runtime, &Value, &[Value]) -> ObjectResult<Value> + 'static,
    {
        let class = self.builtins.unbound_method;
        Ok(Rc::new(UnboundMethodInstance::new(
            class,
            self.registry.props(class)?,
            UnboundFunction::new(f),
        )))
    }

    /// Install a method in a class's public properties
    pub fn define_method<F>(&mut self, class: ClassId, name: &str, f: F) -> ObjectResult<()>
    where
        F: Fn(&mut Runtime, &[Value]) -> ObjectResult<Value> + 'static,
    {
        let method = self.new_method(f)?;
        self.set_property(class, PUBLIC, name, Value::Method(method))
    }

    /// Install an unbound method in a class's public properties
    pub fn define_unbound_method<F>(&mut self, class: ClassId, name: &str, f: F) -> ObjectResult<()>
    where
        F: Fn(&mut Runtime, &Value, &[Value]) -> ObjectResult<Value> + 'static,
    {
        let method = self.new_unbound_method(f)?;
        self.set_property(class, PUBLIC, name, Value::UnboundMethod(method))
    }

    /// Set a class-level property
    pub fn set_property(
        &mut self,
        class: ClassId,
        tier: &str,
        name: &str,
        value: Value,
    ) -> ObjectResult<()> {
        self.registry.props(class)?.borrow_mut().set(tier, name, value);
        Ok(())
    }

    /// Read a class-level property
    pub fn get_property(&self, class: ClassId, name: &str) -> ObjectResult<Value> {
        self.registry.props(class)?.borrow().get(name)
    }

    /// New plain instance seeded from the class's instance template
    pub fn instantiate(&self, class: ClassId) -> ObjectResult<Value> {
        let props = self.registry.instance_props(class)?.borrow().inheritable();
        Ok(Value::Instance(Rc::new(PlainInstance::new(class, props))))
    }

    /// New `String` instance
    pub fn string(&self, s: &str) -> Value {
        self.primitive(self.builtins.string, Primitive::Str(s.to_string()))
    }

    /// New `Integer` instance
    pub fn integer(&self, i: i64) -> Value {
        self.primitive(self.builtins.integer, Primitive::Int(i))
    }

    fn primitive(&self, class: ClassId, payload: Primitive) -> Value {
        // `class` is a builtin id handed out by this registry during bootstrap,
        // and the registry never removes classes, so the lookup cannot fail.
        let props = self
            .registry
            .instance_props(class)
            .map(|template| template.borrow().inheritable())
            .unwrap_or_default();
        Value::Instance(Rc::new(PlainInstance::with_payload(class, props, payload)))
    }

    /// Super-chain walk limit; never below one so a class can always see itself
    fn hierarchy_limit(&self) -> usize {
        self.options.max_hierarchy_depth.max(1)
    }

    /// Class followed by its supers, nearest first
    pub fn ancestors(&self, class: ClassId) -> ObjectResult<Vec<ClassId>> {
        hierarchy::ancestors(&self.registry, class, self.hierarchy_limit())
    }

    /// Check if `sub` is `sup` or inherits from it
    pub fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> ObjectResult<bool> {
        hierarchy::is_subclass_of(&self.registry, sub, sup, self.hierarchy_limit())
    }

    /// Resolve a member on a value
    pub fn lookup_member(&self, value: &Value, name: &str) -> ObjectResult<Value> {
        hierarchy::lookup_member(&self.registry, value, name, self.hierarchy_limit())
    }

    /// Resolve `name` on `target` and call it
    ///
    /// A `Method` gets `args` only. An `UnboundMethod` gets `target` as its
    /// receiver, followed by `args`.
    pub fn invoke(&mut self, target: &Value, name: &str, args: &[Value]) -> ObjectResult<Value> {
        match self.lookup_member(target, name)? {
            Value::Method(method) => method.call(self, args),
            Value::UnboundMethod(method) => method.call(self, target, args),
            other => Err(ObjectError::TypeMismatch {
                expected: "method".to_string(),
                got: other.kind_name().to_string(),
            }),
        }
    }
}

/// `Class.create(name)`
///
/// Always builds children of the runtime's root class, even when the entry
/// was read from a class that inherited it.
fn create(rt: &mut Runtime, args: &[Value]) -> ObjectResult<Value> {
    let arg = args
        .first()
        .ok_or_else(|| ObjectError::ArgumentError("create expects a class name".to_string()))?;
    let name = arg.as_str().ok_or_else(|| ObjectError::TypeMismatch {
        expected: "String".to_string(),
        got: arg.kind_name().to_string(),
    })?;
    let name = name.to_string();
    Ok(Value::Class(rt.create_class(&name)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;

    #[test]
    fn test_bootstrap_self_reference() {
        let rt = Runtime::new().unwrap();
        let root = rt.class_class();
        assert!(rt.is_bootstrapped());
        assert_eq!(rt.registry().class_of(root).unwrap(), root);
        assert_eq!(rt.registry().super_of(root).unwrap(), None);
        assert_eq!(rt.registry().name(root).unwrap(), "Class");
        assert!(rt.registry().get(root).unwrap().is_metaclass());
    }

    #[test]
    fn test_bootstrap_installs_create() {
        let rt = Runtime::new().unwrap();
        let create = rt.get_property(rt.class_class(), "create").unwrap();
        assert!(create.as_method().is_some());
        assert_eq!(
            rt.registry()
                .props(rt.class_class())
                .unwrap()
                .borrow()
                .tier_of("create"),
            Some(PUBLIC)
        );
    }

    #[test]
    fn test_builtin_classes() {
        let rt = Runtime::new().unwrap();
        let b = rt.builtins();
        for (id, name) in [
            (b.method, "Method"),
            (b.unbound_method, "UnboundMethod"),
            (b.string, "String"),
            (b.integer, "Integer"),
        ] {
            let class = rt.registry().get(id).unwrap();
            assert_eq!(class.name(), name);
            assert_eq!(class.kind(), ClassKind::Builtin);
            assert_eq!(class.class_of().unwrap(), b.class);
            assert_eq!(class.super_of(), None);
        }
    }

    #[test]
    fn test_create_class() {
        let mut rt = Runtime::new().unwrap();
        let root = rt.class_class();
        let animal = rt.create_class("Animal").unwrap();

        let class = rt.registry().get(animal).unwrap();
        assert_eq!(class.name(), "Animal");
        assert_eq!(class.kind(), ClassKind::User);
        assert_eq!(class.class_of().unwrap(), root);
        assert_eq!(class.super_of(), Some(root));
        assert!(class.props().borrow().contains("create"));
        assert!(class.instance_props().borrow().is_empty());
    }

    #[test]
    fn test_create_accepts_empty_name_by_default() {
        let mut rt = Runtime::new().unwrap();
        let id = rt.create_class("").unwrap();
        assert_eq!(rt.registry().name(id).unwrap(), "");
    }

    #[test]
    fn test_strict_rejects_empty_name() {
        let mut rt = Runtime::with_options(RuntimeOptions::strict()).unwrap();
        assert!(matches!(
            rt.create_class(""),
            Err(ObjectError::ArgumentError(_))
        ));
    }

    #[test]
    fn test_custom_root_name() {
        let rt = Runtime::with_options(RuntimeOptions::new().with_root_class_name("Type")).unwrap();
        assert_eq!(rt.registry().name(rt.class_class()).unwrap(), "Type");
    }

    #[test]
    fn test_create_via_method_value() {
        let mut rt = Runtime::new().unwrap();
        let create = rt.get_property(rt.class_class(), "create").unwrap();
        let method = create.as_method().unwrap().clone();

        let name = rt.string("Animal");
        let animal = method.call(&mut rt, &[name]).unwrap();
        let animal = animal.as_class().unwrap();
        assert_eq!(rt.registry().name(animal).unwrap(), "Animal");
    }

    #[test]
    fn test_create_argument_errors() {
        let mut rt = Runtime::new().unwrap();
        let root = Value::Class(rt.class_class());

        assert!(matches!(
            rt.invoke(&root, "create", &[]),
            Err(ObjectError::ArgumentError(_))
        ));

        let number = rt.integer(3);
        assert_eq!(
            rt.invoke(&root, "create", &[number]),
            Err(ObjectError::TypeMismatch {
                expected: "String".to_string(),
                got: "instance".to_string(),
            })
        );
    }

    #[test]
    fn test_method_instances_share_wrapper_props() {
        let rt = Runtime::new().unwrap();
        let a = rt.new_method(|rt, _args| Ok(rt.integer(1))).unwrap();
        let b = rt.new_method(|rt, _args| Ok(rt.integer(2))).unwrap();
        let method_props = rt.registry().props(rt.builtins().method).unwrap();

        assert!(Rc::ptr_eq(&a.props(), &b.props()));
        assert!(Rc::ptr_eq(&a.props(), &method_props));
        assert_eq!(a.class(), rt.builtins().method);
    }

    #[test]
    fn test_primitives() {
        let rt = Runtime::new().unwrap();
        let s = rt.string("hello");
        let i = rt.integer(-4);

        assert_eq!(s.as_str(), Some("hello"));
        assert_eq!(i.as_int(), Some(-4));
        assert_eq!(s.class_of(rt.registry()).unwrap(), rt.builtins().string);
        assert_eq!(i.class_of(rt.registry()).unwrap(), rt.builtins().integer);
    }

    #[test]
    fn test_invoke_non_method_is_type_mismatch() {
        let mut rt = Runtime::new().unwrap();
        let root = rt.class_class();
        rt.set_property(root, PUBLIC, "plain", Value::Class(root)).unwrap();

        assert_eq!(
            rt.invoke(&Value::Class(root), "plain", &[]),
            Err(ObjectError::TypeMismatch {
                expected: "method".to_string(),
                got: "class".to_string(),
            })
        );
    }

    #[test]
    fn test_create_class_refused_before_bootstrap() {
        let mut rt = Runtime::new().unwrap();
        rt.bootstrapped = false;
        let before = rt.registry().len();

        assert!(matches!(
            rt.create_class("TooEarly"),
            Err(ObjectError::InvalidBootstrapState(_))
        ));
        assert_eq!(rt.registry().len(), before);
    }

    #[test]
    fn test_primitives_copy_builtin_template() {
        let rt = Runtime::new().unwrap();
        let string = rt.builtins().string;
        rt.registry()
            .instance_props(string)
            .unwrap()
            .borrow_mut()
            .set(PUBLIC, "kind", Value::Class(string));

        let s = rt.string("abc");
        let props = s.properties_of(rt.registry()).unwrap();
        assert_eq!(props.borrow().get("kind").unwrap(), Value::Class(string));
        assert!(!Rc::ptr_eq(
            &props,
            &rt.registry().instance_props(string).unwrap()
        ));
    }

    #[test]
    fn test_zero_depth_limit_still_sees_own_class() {
        let mut options = RuntimeOptions::new();
        options.max_hierarchy_depth = 0;
        let mut rt = Runtime::with_options(options).unwrap();
        assert_eq!(rt.options().max_hierarchy_depth, 0);

        let root = rt.class_class();
        assert_eq!(rt.ancestors(root).unwrap(), vec![root]);

        // `String` has no super, so one level is enough to reach its methods
        let string = rt.builtins().string;
        rt.define_unbound_method(string, "me", |_rt, recv, _args| Ok(recv.clone()))
            .unwrap();
        let s = rt.string("x");
        assert_eq!(rt.invoke(&s, "me", &[]).unwrap(), s);
    }

    #[test]
    fn test_registry_iter_and_raw_ids() {
        let mut rt = Runtime::new().unwrap();
        let extra = rt.create_class("Extra").unwrap();

        let names: Vec<(usize, &str)> = rt
            .registry()
            .iter()
            .map(|(id, class)| (id.as_usize(), class.name()))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "Class"),
                (1, "Method"),
                (2, "UnboundMethod"),
                (3, "String"),
                (4, "Integer"),
                (extra.as_usize(), "Extra"),
            ]
        );
        assert_eq!(rt.class_class().as_usize(), 0);
    }

    #[test]
    fn test_method_values_expose_functions() {
        let mut rt = Runtime::new().unwrap();
        let root = rt.class_class();
        rt.define_method(root, "seven", |rt, _args| Ok(rt.integer(7)))
            .unwrap();
        rt.define_unbound_method(root, "echo", |_rt, recv, _args| Ok(recv.clone()))
            .unwrap();

        let seven = rt.get_property(root, "seven").unwrap();
        assert!(seven.as_unbound_method().is_none());
        let function = seven.as_method().unwrap().function().clone();
        assert_eq!(function.call(&mut rt, &[]).unwrap().as_int(), Some(7));

        let echo = rt.get_property(root, "echo").unwrap();
        assert!(echo.as_method().is_none());
        let unbound = echo.as_unbound_method().unwrap().function().clone();
        let receiver = rt.string("me");
        assert_eq!(unbound.call(&mut rt, &receiver, &[]).unwrap(), receiver);
    }
}
