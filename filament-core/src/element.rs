//! Element Model
//!
//! An [`Element`] is an immutable description of one desired node and its
//! children: a kind, an attribute map, and an ordered child list. Elements
//! are created fresh on every render pass and consumed by reconciliation;
//! they carry no identity beyond structural equality.
//!
//! # Kinds
//!
//! The kind space is a closed variant rather than a duck-typed tag:
//!
//! - [`NodeKind::Host`] — a host-tree node named by its tag.
//! - [`NodeKind::Text`] — a text node; the content travels as the
//!   [`TEXT_VALUE`] attribute so text changes flow through the ordinary
//!   attribute-diff path.
//! - [`NodeKind::Component`] — a plain function that produces an element
//!   from its attributes. Components own no host node; their identity is
//!   the function's address.
//!
//! # Attributes
//!
//! Attribute values are tagged at construction time ([`AttrValue`]), so
//! event handlers are distinguished from plain values structurally instead
//! of by a naming convention. Children are a dedicated field of `Element`,
//! never an attribute, so the diff policy has nothing to reserve or
//! exclude.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::RenderError;
use crate::fiber::Scope;

/// Attribute key carrying a text node's content.
pub const TEXT_VALUE: &str = "text";

/// A component function: produces the element describing its body.
///
/// Invoked only by the scheduler while its fiber is being expanded; the
/// [`Scope`] argument is the sole way to reach the stateful-value
/// primitive.
pub type Component = fn(&mut Scope, &Attrs) -> Result<Element, RenderError>;

/// Attribute map of an element. Equality is order-insensitive.
pub type Attrs = IndexMap<String, AttrValue>;

/// An event callback carried in an attribute.
///
/// Handlers compare by pointer identity: a handler built on one render
/// pass is never "equal" to one built on the next, which is what drives
/// rebinding in the diff policy.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn()>);

impl EventHandler {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self(Rc::new(callback))
    }

    /// Invoke the callback.
    pub fn invoke(&self) {
        (self.0)();
    }

    /// Identity comparison (same allocation).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0))
    }
}

/// A tagged attribute value.
#[derive(Clone, Debug)]
pub enum AttrValue {
    /// Plain text value.
    Text(String),
    /// Plain numeric value.
    Number(f64),
    /// Plain boolean value.
    Bool(bool),
    /// An event binding.
    Handler(EventHandler),
}

impl AttrValue {
    /// Whether this value is an event binding.
    pub fn is_handler(&self) -> bool {
        matches!(self, AttrValue::Handler(_))
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Text(a), AttrValue::Text(b)) => a == b,
            (AttrValue::Number(a), AttrValue::Number(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Handler(a), AttrValue::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<EventHandler> for AttrValue {
    fn from(value: EventHandler) -> Self {
        AttrValue::Handler(value)
    }
}

/// Build one attribute entry. Convenience for [`Attrs::from_iter`].
pub fn attr(name: impl Into<String>, value: impl Into<AttrValue>) -> (String, AttrValue) {
    (name.into(), value.into())
}

/// The kind of node an element describes.
#[derive(Clone)]
pub enum NodeKind {
    /// A host node named by its tag.
    Host(String),
    /// A text node.
    Text,
    /// A component function.
    Component(Component),
}

impl PartialEq for NodeKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeKind::Host(a), NodeKind::Host(b)) => a == b,
            (NodeKind::Text, NodeKind::Text) => true,
            // Component identity is the function's address.
            (NodeKind::Component(a), NodeKind::Component(b)) => *a as usize == *b as usize,
            _ => false,
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Host(tag) => f.debug_tuple("Host").field(tag).finish(),
            NodeKind::Text => write!(f, "Text"),
            NodeKind::Component(func) => write!(f, "Component({:#x})", *func as usize),
        }
    }
}

/// Immutable description of one desired node and its children.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// What kind of node this element describes.
    pub kind: NodeKind,
    /// The element's attributes.
    pub attrs: Attrs,
    /// Ordered child descriptions.
    pub children: Vec<Element>,
}

impl Element {
    /// Describe a host node.
    pub fn node(
        tag: impl Into<String>,
        attrs: impl IntoIterator<Item = (String, AttrValue)>,
        children: Vec<Element>,
    ) -> Self {
        Self {
            kind: NodeKind::Host(tag.into()),
            attrs: Attrs::from_iter(attrs),
            children,
        }
    }

    /// Describe a text node carrying `value` under [`TEXT_VALUE`].
    pub fn text(value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self {
            kind: NodeKind::Text,
            attrs: Attrs::from_iter([attr(TEXT_VALUE, value)]),
            children: Vec::new(),
        }
    }

    /// Describe a component invocation.
    pub fn component(
        component: Component,
        attrs: impl IntoIterator<Item = (String, AttrValue)>,
    ) -> Self {
        Self {
            kind: NodeKind::Component(component),
            attrs: Attrs::from_iter(attrs),
            children: Vec::new(),
        }
    }
}

// Bare strings and numbers in a child list coerce to text elements.

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::text(value)
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::text(value)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Element::text(value.to_string())
    }
}

impl From<f64> for Element {
    fn from(value: f64) -> Self {
        Element::text(value.to_string())
    }
}
