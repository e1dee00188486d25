//! Integration tests for Method / UnboundMethod wrappers

use std::cell::Cell;
use std::rc::Rc;

use orrery_object::{Instance, ObjectError, Runtime, Value, PUBLIC};

#[test]
fn test_method_metadata_is_shared() {
    let rt = Runtime::new().unwrap();
    let first = rt.new_method(|rt, _args| Ok(rt.integer(1))).unwrap();
    let second = rt.new_method(|rt, _args| Ok(rt.integer(2))).unwrap();

    first
        .props()
        .borrow_mut()
        .set(PUBLIC, "doc", rt.string("shared"));

    let doc = second.props().borrow().get("doc").unwrap();
    assert_eq!(doc.as_str(), Some("shared"));

    // Visible on the Method class itself too
    assert!(rt.get_property(rt.builtins().method, "doc").is_ok());
}

#[test]
fn test_unbound_metadata_is_separate_from_method_metadata() {
    let rt = Runtime::new().unwrap();
    let bound = rt.new_method(|rt, _args| Ok(rt.integer(0))).unwrap();
    let unbound = rt
        .new_unbound_method(|_rt, recv, _args| Ok(recv.clone()))
        .unwrap();

    unbound
        .props()
        .borrow_mut()
        .set(PUBLIC, "arity", rt.integer(1));
    assert!(!bound.props().borrow().contains("arity"));
}

#[test]
fn test_method_values_report_wrapper_class() {
    let rt = Runtime::new().unwrap();
    let method = Value::Method(rt.new_method(|rt, _args| Ok(rt.integer(0))).unwrap());
    let unbound = Value::UnboundMethod(
        rt.new_unbound_method(|_rt, recv, _args| Ok(recv.clone()))
            .unwrap(),
    );

    assert_eq!(method.class_of(rt.registry()).unwrap(), rt.builtins().method);
    assert_eq!(
        unbound.class_of(rt.registry()).unwrap(),
        rt.builtins().unbound_method
    );
    // Wrapper classes are classes like any other
    assert_eq!(
        rt.registry().class_of(rt.builtins().method).unwrap(),
        rt.class_class()
    );
}

#[test]
fn test_invoke_instance_method_passes_receiver() {
    let mut rt = Runtime::new().unwrap();
    let counter = rt.create_class("Counter").unwrap();
    rt.registry()
        .instance_props(counter)
        .unwrap()
        .borrow_mut()
        .set(PUBLIC, "count", rt.integer(0));

    rt.define_unbound_method(counter, "increment", |rt, receiver, args| {
        let step = args.first().and_then(|v| v.as_int()).unwrap_or(1);
        let props = receiver.properties_of(rt.registry())?;
        let current = props.borrow().get("count")?.as_int().unwrap_or(0);
        let next = rt.integer(current + step);
        props.borrow_mut().set(PUBLIC, "count", next.clone());
        Ok(next)
    })
    .unwrap();

    let obj = rt.instantiate(counter).unwrap();
    rt.invoke(&obj, "increment", &[]).unwrap();
    let five = rt.integer(5);
    let result = rt.invoke(&obj, "increment", &[five]).unwrap();

    assert_eq!(result.as_int(), Some(6));

    // A second instance starts from the template
    let other = rt.instantiate(counter).unwrap();
    let count = other
        .properties_of(rt.registry())
        .unwrap()
        .borrow()
        .get("count")
        .unwrap();
    assert_eq!(count.as_int(), Some(0));
}

#[test]
fn test_callable_errors_propagate_unchanged() {
    let mut rt = Runtime::new().unwrap();
    let root = rt.class_class();
    rt.define_method(root, "fail", |_rt, _args| {
        Err(ObjectError::Native("user error".to_string()))
    })
    .unwrap();

    assert_eq!(
        rt.invoke(&Value::Class(root), "fail", &[]),
        Err(ObjectError::Native("user error".to_string()))
    );
}

#[test]
fn test_method_may_create_classes() {
    let mut rt = Runtime::new().unwrap();
    let root = rt.class_class();
    let calls = Rc::new(Cell::new(0));

    let seen = calls.clone();
    rt.define_method(root, "pair", move |rt, _args| {
        seen.set(seen.get() + 1);
        let left = rt.create_class("Left")?;
        rt.create_class("Right")?;
        Ok(Value::Class(left))
    })
    .unwrap();

    let left = rt.invoke(&Value::Class(root), "pair", &[]).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(rt.registry().name(left.as_class().unwrap()).unwrap(), "Left");
    assert!(rt.registry().find_by_name("Right").is_some());
}

#[test]
fn test_invoke_missing_member() {
    let mut rt = Runtime::new().unwrap();
    let root = Value::Class(rt.class_class());
    assert_eq!(
        rt.invoke(&root, "nope", &[]),
        Err(ObjectError::NotFound {
            name: "nope".to_string()
        })
    );
}
