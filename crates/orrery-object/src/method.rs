//! Method and UnboundMethod wrappers
//!
//! A [`Function`] takes only call arguments. An [`UnboundFunction`] also takes
//! the receiving value explicitly as its first parameter. Each is wrapped in an
//! instance of the builtin `Method` / `UnboundMethod` class.
//!
//! All instances of a wrapper class hold the same property table as the class
//! itself (`Method.props`). Metadata set through one method is therefore seen
//! by every other method.
//!
//! Callables receive the [`Runtime`] so builtins such as `create` can register
//! classes. Whatever a callable returns, error or not, reaches the caller as is.

use std::fmt;
use std::rc::Rc;

use crate::class::ClassId;
use crate::properties::PropertiesRef;
use crate::runtime::Runtime;
use crate::value::Value;
use crate::ObjectResult;

type NativeFn = dyn Fn(&mut Runtime, &[Value]) -> ObjectResult<Value>;
type UnboundNativeFn = dyn Fn(&mut Runtime, &Value, &[Value]) -> ObjectResult<Value>;

/// Callable without an explicit receiver
#[derive(Clone)]
pub struct Function(Rc<NativeFn>);

impl Function {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Runtime, &[Value]) -> ObjectResult<Value> + 'static,
    {
        Function(Rc::new(f))
    }

    /// Invoke with arguments
    pub fn call(&self, rt: &mut Runtime, args: &[Value]) -> ObjectResult<Value> {
        (self.0)(rt, args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(<native>)")
    }
}

/// Callable whose first parameter is the receiver
#[derive(Clone)]
pub struct UnboundFunction(Rc<UnboundNativeFn>);

impl UnboundFunction {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Runtime, &Value, &[Value]) -> ObjectResult<Value> + 'static,
    {
        UnboundFunction(Rc::new(f))
    }

    /// Invoke with an explicit receiver
    pub fn call(&self, rt: &mut Runtime, receiver: &Value, args: &[Value]) -> ObjectResult<Value> {
        (self.0)(rt, receiver, args)
    }
}

impl fmt::Debug for UnboundFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnboundFunction(<native>)")
    }
}

/// Instance of the `Method` class
#[derive(Debug)]
pub struct MethodInstance {
    /// The `Method` class
    class: ClassId,
    /// Shared with the `Method` class and every other method
    props: PropertiesRef,
    function: Function,
}

impl MethodInstance {
    /// Wrap `function`, sharing `props` with its wrapper class
    pub fn new(class: ClassId, props: PropertiesRef, function: Function) -> Self {
        Self {
            class,
            props,
            function,
        }
    }

    /// Wrapper class (`Method`)
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Shared metadata table
    pub fn props(&self) -> PropertiesRef {
        self.props.clone()
    }

    /// Wrapped callable
    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Call the wrapped function
    pub fn call(&self, rt: &mut Runtime, args: &[Value]) -> ObjectResult<Value> {
        self.function.call(rt, args)
    }
}

/// Instance of the `UnboundMethod` class
#[derive(Debug)]
pub struct UnboundMethodInstance {
    /// The `UnboundMethod` class
    class: ClassId,
    /// Shared with the `UnboundMethod` class and every other unbound method
    props: PropertiesRef,
    function: UnboundFunction,
}

impl UnboundMethodInstance {
    /// Wrap `function`, sharing `props` with its wrapper class
    pub fn new(class: ClassId, props: PropertiesRef, function: UnboundFunction) -> Self {
        Self {
            class,
            props,
            function,
        }
    }

    /// Wrapper class (`UnboundMethod`)
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Shared metadata table
    pub fn props(&self) -> PropertiesRef {
        self.props.clone()
    }

    /// Wrapped callable
    pub fn function(&self) -> &UnboundFunction {
        &self.function
    }

    /// Call the wrapped function with `receiver` as its first parameter
    pub fn call(&self, rt: &mut Runtime, receiver: &Value, args: &[Value]) -> ObjectResult<Value> {
        self.function.call(rt, receiver, args)
    }
}
