use std::fmt;
use std::rc::Rc;

use lite_core::Promise;
use lite_dom::{Listener, NodeId};

use crate::error::TemplateError;
use crate::part::Part;
use crate::template::TemplateResult;

/// Anything that can fill a hole.
#[derive(Clone, Default)]
pub enum Value {
    /// Renders nothing. Clears a node position and removes a lone
    /// attribute.
    #[default]
    Nothing,
    /// Leaves the part as it is.
    NoChange,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Template(TemplateResult),
    List(Vec<Value>),
    Node(NodeId),
    Promise(Promise<Value>),
    Directive(Directive),
    Listener(Listener),
    /// Any other value; rendered through its `Display` impl.
    Display(Rc<dyn fmt::Display>),
}

/// A function that takes over how a part is updated.
///
/// Only values explicitly wrapped as a `Directive` are treated this way;
/// a [`Listener`] is an ordinary value.
#[derive(Clone)]
pub struct Directive(Rc<dyn Fn(&Part) -> Result<(), TemplateError>>);

impl Directive {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Part) -> Result<(), TemplateError> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn apply(&self, part: &Part) -> Result<(), TemplateError> {
        (self.0)(part)
    }

    pub fn ptr_eq(&self, other: &Directive) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Wrap `f` as a directive value.
pub fn directive<F>(f: F) -> Value
where
    F: Fn(&Part) -> Result<(), TemplateError> + 'static,
{
    Value::Directive(Directive::new(f))
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Directive")
    }
}

impl Value {
    /// Whether committing `other` after `self` can be skipped.
    ///
    /// Primitives compare by value (floats bitwise, so NaN is the same as
    /// itself); promises, directives, listeners and
    /// display values by identity. Templates and lists are never the same,
    /// their parts do their own comparison.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) | (Value::NoChange, Value::NoChange) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::Promise(a), Value::Promise(b)) => a.ptr_eq(b),
            (Value::Directive(a), Value::Directive(b)) => a.ptr_eq(b),
            (Value::Listener(a), Value::Listener(b)) => a.ptr_eq(b),
            (Value::Display(a), Value::Display(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) | Value::Display(_)
        )
    }

    /// The text this value renders as. Values without a text form render
    /// as the empty string; lists join their items with `,`.
    pub fn to_text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Display(d) => d.to_string(),
            Value::List(items) => items.iter().map(Value::to_text).collect::<Vec<_>>().join(","),
            _ => String::new(),
        }
    }

    /// Truthiness used by `?name` bindings.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nothing | Value::NoChange => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Wrap anything displayable.
    pub fn display<T: fmt::Display + 'static>(value: T) -> Self {
        Value::Display(Rc::new(value))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nothing => f.write_str("Nothing"),
            Value::NoChange => f.write_str("NoChange"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Node(id) => write!(f, "Node({id:?})"),
            Value::Promise(p) => f.debug_tuple("Promise").field(p).finish(),
            Value::Directive(d) => fmt::Debug::fmt(d, f),
            Value::Listener(l) => fmt::Debug::fmt(l, f),
            Value::Display(d) => write!(f, "Display({d})"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32, isize, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v.into())
    }
}

impl From<Rc<str>> for Value {
    fn from(v: Rc<str>) -> Self {
        Value::Str(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Str(v.to_string().into())
    }
}

impl From<TemplateResult> for Value {
    fn from(v: TemplateResult) -> Self {
        Value::Template(v)
    }
}

impl From<NodeId> for Value {
    fn from(v: NodeId) -> Self {
        Value::Node(v)
    }
}

impl From<Promise<Value>> for Value {
    fn from(v: Promise<Value>) -> Self {
        Value::Promise(v)
    }
}

impl From<Directive> for Value {
    fn from(v: Directive) -> Self {
        Value::Directive(v)
    }
}

impl From<Listener> for Value {
    fn from(v: Listener) -> Self {
        Value::Listener(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nothing, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
