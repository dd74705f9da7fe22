// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_debug_implementations)] // proxies share interior mutable capture state

//! Property paths written as accessor chains.
//!
//! Instead of spelling `"child.y"`, a caller walks a stand-in of the model:
//!
//! ```rust
//! propset::model! {
//!     pub struct Child as "com.example.Child", proxy ChildPath {
//!         pub y: String,
//!     }
//! }
//!
//! propset::model! {
//!     pub struct Root as "com.example.Root", proxy RootPath {
//!         pub x: i32,
//!         pub child: Child,
//!     }
//! }
//!
//! let mut builder = TypeSafeBuilder::<Root>::new();
//! let model = builder.model();
//! builder
//!     .add_property(model.x())?
//!     .add_property(model.child().y())?;
//! // {"x", "child.y"}
//! let set = builder.build();
//! ```
//!
//! Every accessor call on a proxy is intercepted by the proxy's [`Assistant`].
//! The assistant aligns the shared [`PathBuilder`] stack with its own nesting
//! prefix and records the property as pending. Terminal properties hand back a
//! placeholder value; nested models hand back another proxy. `add_property`
//! commits whatever is pending and returns the stack to the root, so each
//! chain is an independent path.
//!
//! [`DynamicBuilder`] offers the same protocol for models that only exist as
//! schemas, with accessors named at run time (`getX`, `isActive`).

use alloc::rc::Rc;
use alloc::sync::Arc;
use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;

use log::{debug, trace};

use crate::builder::PathBuilder;
use crate::error::{PathError, Result};
use crate::path;
use crate::schema::catalog::{SchemaCatalog, SchemaClosure};
use crate::schema::{ModelSchema, PropertyInfo, PropertyKind};
use crate::set::{NamedPropertySet, PropertySet};


/// A type that can appear as a property of a model.
pub trait PropertyType {
    /// What an accessor for a property of this type returns while capturing:
    /// a placeholder for terminal types, a proxy for models.
    type Captured;

    fn kind() -> PropertyKind;

    /// Visit the schemas of any models this type refers to.
    fn collect_schemas(_closure: &mut SchemaClosure<'_>) {}

    fn capture(assistant: &Assistant) -> Self::Captured;
}

/// A statically declared model. Implemented by the [`model!`](crate::model) macro.
pub trait Model: PropertyType {
    const TYPE_NAME: &'static str;

    type Proxy: ModelProxy;

    fn describe() -> ModelSchema;
}

/// The generated stand-in of a model.
pub trait ModelProxy: Clone {
    fn bind(assistant: Assistant) -> Self;

    fn assistant(&self) -> &Assistant;
}

macro_rules! terminal_property {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl PropertyType for $t {
                type Captured = $t;

                fn kind() -> PropertyKind {
                    PropertyKind::$kind
                }

                fn capture(_: &Assistant) -> $t {
                    <$t>::default()
                }
            }
        )*
    };
}

terminal_property!(
    bool => Boolean,
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Integer,
    i128 => Integer,
    isize => Integer,
    u8 => Integer,
    u16 => Integer,
    u32 => Integer,
    u64 => Integer,
    u128 => Integer,
    usize => Integer,
    f32 => Number,
    f64 => Number,
    char => Char,
    String => String,
);

impl<T: PropertyType> PropertyType for Option<T> {
    type Captured = T::Captured;

    fn kind() -> PropertyKind {
        T::kind()
    }

    fn collect_schemas(closure: &mut SchemaClosure<'_>) {
        T::collect_schemas(closure);
    }

    fn capture(assistant: &Assistant) -> Self::Captured {
        T::capture(assistant)
    }
}

impl<T: PropertyType> PropertyType for Box<T> {
    type Captured = T::Captured;

    fn kind() -> PropertyKind {
        T::kind()
    }

    fn collect_schemas(closure: &mut SchemaClosure<'_>) {
        T::collect_schemas(closure);
    }

    fn capture(assistant: &Assistant) -> Self::Captured {
        T::capture(assistant)
    }
}

impl<T: PropertyType> PropertyType for Vec<T> {
    type Captured = Vec<T::Captured>;

    fn kind() -> PropertyKind {
        PropertyKind::array(T::kind())
    }

    fn collect_schemas(closure: &mut SchemaClosure<'_>) {
        T::collect_schemas(closure);
    }

    /// Arrays of models capture as a one-element vector holding the item proxy.
    fn capture(assistant: &Assistant) -> Self::Captured {
        if T::kind().model_name().is_some() {
            vec![T::capture(assistant)]
        } else {
            Vec::new()
        }
    }
}

struct CaptureState {
    builder: PathBuilder,
    pending: Option<String>,
    deferred: Option<PathError>,
}

/// Intercepts accessor calls for one nesting level of a capture.
///
/// All assistants of a capture share one [`PathBuilder`].
#[derive(Clone)]
pub struct Assistant {
    state: Rc<RefCell<CaptureState>>,
    prefix: Rc<str>,
}

impl Assistant {
    fn root(builder: PathBuilder) -> Self {
        Self {
            state: Rc::new(RefCell::new(CaptureState {
                builder,
                pending: None,
                deferred: None,
            })),
            prefix: Rc::from(""),
        }
    }

    fn child(&self, property: &str) -> Self {
        Self {
            state: Rc::clone(&self.state),
            prefix: Rc::from(path::join(&self.prefix, property)),
        }
    }

    /// Root-relative path of the model this assistant stands in for.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Intercept a typed accessor call for `property`.
    ///
    /// Errors cannot surface through a typed accessor chain; the first one is
    /// kept and reported by the next `add_property`.
    pub fn access<T: PropertyType>(&self, property: &str) -> T::Captured {
        match self.resolve(property) {
            Ok(_) => self.mark_pending(property),
            Err(err) => self.defer(err),
        }
        T::capture(&self.child(property))
    }

    /// Align the builder stack with this assistant and look up `property`.
    fn resolve(&self, property: &str) -> Result<PropertyInfo> {
        let mut state = self.state.borrow_mut();
        state.pending = None;
        let builder = &mut state.builder;
        builder.reset_path_stack();
        if !self.prefix.is_empty() {
            builder.push_path(&self.prefix)?;
        }
        let schema = builder.current_schema();
        schema.lookup(property).cloned().ok_or_else(|| {
            PathError::invalid(format!(
                "{} has no property '{property}'",
                schema.type_name()
            ))
        })
    }

    fn mark_pending(&self, property: &str) {
        trace!("captured '{}'", path::join(&self.prefix, property));
        self.state.borrow_mut().pending = Some(property.to_string());
    }

    fn defer(&self, err: PathError) {
        let mut state = self.state.borrow_mut();
        if state.deferred.is_none() {
            state.deferred = Some(err);
        }
    }

    fn catalog(&self) -> Arc<SchemaCatalog> {
        Arc::clone(self.state.borrow().builder.catalog())
    }
}

/// Shared protocol of [`TypeSafeBuilder`] and [`DynamicBuilder`].
struct Capture {
    root: Assistant,
}

impl Capture {
    fn new(builder: PathBuilder) -> Self {
        Self {
            root: Assistant::root(builder),
        }
    }

    /// Commit the pending property and return the stack to the root.
    fn commit(&self) -> Result<()> {
        let mut state = self.root.state.borrow_mut();
        let deferred = state.deferred.take();
        let pending = state.pending.take();
        let result = match (deferred, pending) {
            (Some(err), _) => Err(err),
            (None, None) => Err(PathError::invalid(
                "no property was captured since the last add_property",
            )),
            (None, Some(property)) => state.builder.add_property(&property).map(|_| ()),
        };
        state.builder.reset_path_stack();
        result
    }

    fn build(&self) -> PropertySet {
        self.root.state.borrow().builder.build()
    }
}

/// Builds a [`PropertySet`] for the model `M` from accessor chains on its proxy.
pub struct TypeSafeBuilder<M: Model> {
    capture: Capture,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> TypeSafeBuilder<M> {
    /// Builder over the global catalog.
    pub fn new() -> Self {
        Self::with_catalog(SchemaCatalog::global())
    }

    pub fn with_catalog(catalog: Arc<SchemaCatalog>) -> Self {
        let root = catalog.model::<M>();
        let builder = PathBuilder::from_set(PropertySet::from_schema(catalog, root));
        Self::wrap(builder)
    }

    /// Capture into an existing builder, which must be rooted at `M`.
    pub fn from_builder(builder: PathBuilder) -> Result<Self> {
        if builder.root_type() != M::TYPE_NAME {
            return Err(PathError::invalid(format!(
                "builder is rooted at {}, not {}",
                builder.root_type(),
                M::TYPE_NAME
            )));
        }
        Ok(Self::wrap(builder))
    }

    fn wrap(mut builder: PathBuilder) -> Self {
        builder.reset_path_stack();
        Self {
            capture: Capture::new(builder),
            _model: PhantomData,
        }
    }

    /// The root proxy. Each accessor chain on it describes one path.
    pub fn model(&self) -> M::Proxy {
        M::Proxy::bind(self.capture.root.clone())
    }

    /// Commit the path captured by the accessor chain that produced `_captured`.
    pub fn add_property<V>(&mut self, _captured: V) -> Result<&mut Self> {
        self.capture.commit()?;
        Ok(self)
    }

    pub fn build(&self) -> PropertySet {
        self.capture.build()
    }

    pub fn build_named(&self, name: impl Into<String>) -> Result<NamedPropertySet> {
        NamedPropertySet::new(name, self.build())
    }
}

impl<M: Model> Default for TypeSafeBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// A value returned by a [`DynamicProxy`] accessor.
#[derive(Debug, Clone)]
pub enum Captured {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    /// First variant of the enum.
    Enum(String),
    /// Default instance of a model without properties, by type name.
    Default(String),
    Model(DynamicProxy),
    Array(Vec<Captured>),
}

impl Captured {
    /// Continue an accessor chain. Arrays delegate to their single item proxy.
    pub fn invoke(&self, method: &str, args: &[Captured]) -> Result<Captured> {
        match self.as_proxy() {
            Some(proxy) => proxy.invoke(method, args),
            None => Err(PathError::invalid(format!(
                "cannot call {method} on a terminal value"
            ))),
        }
    }

    /// Continue an accessor chain by property name.
    pub fn get(&self, property: &str) -> Result<Captured> {
        match self.as_proxy() {
            Some(proxy) => proxy.get(property),
            None => Err(PathError::invalid(format!(
                "cannot access '{property}' on a terminal value"
            ))),
        }
    }

    pub fn as_proxy(&self) -> Option<&DynamicProxy> {
        match self {
            Captured::Model(proxy) => Some(proxy),
            Captured::Array(items) => items.first().and_then(Captured::as_proxy),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.as_proxy().is_none()
    }
}

/// A stand-in for a schema-only model, driven by accessor names.
#[derive(Clone)]
pub struct DynamicProxy {
    assistant: Assistant,
    schema: Arc<ModelSchema>,
}

impl fmt::Debug for DynamicProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicProxy")
            .field("model", &self.schema.type_name())
            .field("prefix", &self.assistant.prefix())
            .finish()
    }
}

struct Accessor {
    property: String,
    boolean_only: bool,
}

impl DynamicProxy {
    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    /// Intercept a call of `method` with `args`.
    ///
    /// Only zero-argument accessors are accepted: `getX` for any property and
    /// `isX` for boolean properties.
    pub fn invoke(&self, method: &str, args: &[Captured]) -> Result<Captured> {
        let accessor = parse_accessor(method, args.len())?;
        let info = self.assistant.resolve(&accessor.property)?;
        if accessor.boolean_only && info.kind != PropertyKind::Boolean {
            return Err(PathError::invalid(format!(
                "{method} is not an accessor: '{}' is not boolean",
                info.name
            )));
        }
        self.capture(&info)
    }

    /// Intercept an access of `property` without going through a method name.
    pub fn get(&self, property: &str) -> Result<Captured> {
        let info = self.assistant.resolve(property)?;
        self.capture(&info)
    }

    fn capture(&self, info: &PropertyInfo) -> Result<Captured> {
        let child = self.assistant.child(&info.name);
        let value = placeholder(&info.name, &info.kind, &child)?;
        self.assistant.mark_pending(&info.name);
        Ok(value)
    }
}

fn placeholder(property: &str, kind: &PropertyKind, child: &Assistant) -> Result<Captured> {
    Ok(match kind {
        PropertyKind::Boolean => Captured::Boolean(false),
        PropertyKind::Integer => Captured::Integer(0),
        PropertyKind::Number => Captured::Number(0.0),
        PropertyKind::Char => Captured::Char('\0'),
        PropertyKind::String => Captured::String(String::new()),
        PropertyKind::Bytes => Captured::Bytes(Vec::new()),
        PropertyKind::Enum { variants } => match variants.first() {
            Some(first) => Captured::Enum(first.clone()),
            None => {
                return Err(PathError::invalid(format!(
                    "cannot create a placeholder for '{property}': enum has no variants"
                )))
            }
        },
        PropertyKind::Model { model } => match child.catalog().resolve(model) {
            Ok(schema) if !schema.is_empty() => Captured::Model(DynamicProxy {
                assistant: child.clone(),
                schema,
            }),
            Ok(schema) if !schema.is_constructible() => {
                return Err(PathError::invalid(format!(
                    "cannot create a placeholder for '{property}': {model} is abstract"
                )));
            }
            Ok(_) => Captured::Default(model.clone()),
            // Unresolvable models are terminal, as in path validation.
            Err(err) => {
                debug!("placeholder for '{property}' uses a default {model}: {err}");
                Captured::Default(model.clone())
            }
        },
        PropertyKind::Array { items } => match placeholder(property, items, child)? {
            item if !item.is_terminal() => Captured::Array(vec![item]),
            _ => Captured::Array(Vec::new()),
        },
    })
}

fn parse_accessor(method: &str, arg_count: usize) -> Result<Accessor> {
    let not_accessor = || PathError::invalid(format!("{method} is not an accessor"));
    if arg_count != 0 {
        return Err(not_accessor());
    }
    let (rest, boolean_only) = if let Some(rest) = method.strip_prefix("get") {
        (rest, false)
    } else if let Some(rest) = method.strip_prefix("is") {
        (rest, true)
    } else {
        return Err(not_accessor());
    };
    if !path::is_identifier(rest) {
        return Err(not_accessor());
    }
    Ok(Accessor {
        property: decapitalize(rest),
        boolean_only,
    })
}

/// `Name` -> `name`, but `URL` stays `URL`.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => first.to_lowercase().chain(name.chars().skip(1)).collect(),
        (None, _) => String::new(),
    }
}

/// Builds a [`PropertySet`] from accessor calls on a [`DynamicProxy`].
pub struct DynamicBuilder {
    capture: Capture,
}

impl DynamicBuilder {
    pub fn new(root_type: &str) -> Result<Self> {
        Ok(Self::from_builder(PathBuilder::new(root_type)?))
    }

    pub fn with_catalog(catalog: Arc<SchemaCatalog>, root_type: &str) -> Result<Self> {
        Ok(Self::from_builder(PathBuilder::with_catalog(
            catalog, root_type,
        )?))
    }

    pub fn from_builder(mut builder: PathBuilder) -> Self {
        builder.reset_path_stack();
        Self {
            capture: Capture::new(builder),
        }
    }

    /// The root proxy.
    pub fn model(&self) -> DynamicProxy {
        let schema = Arc::clone(self.capture.root.state.borrow().builder.current_schema());
        DynamicProxy {
            assistant: self.capture.root.clone(),
            schema,
        }
    }

    /// Commit the path captured by the accessor chain that produced `_captured`.
    pub fn add_property(&mut self, _captured: Captured) -> Result<&mut Self> {
        self.capture.commit()?;
        Ok(self)
    }

    pub fn build(&self) -> PropertySet {
        self.capture.build()
    }

    pub fn build_named(&self, name: impl Into<String>) -> Result<NamedPropertySet> {
        NamedPropertySet::new(name, self.build())
    }
}

/// Declare a model struct, its schema, and its path-capturing proxy.
///
/// ```rust
/// propset::model! {
///     #[derive(Debug, Default)]
///     pub struct Address as "com.example.Address", proxy AddressPath {
///         pub street: String,
///         pub zip: u32,
///     }
/// }
/// ```
#[macro_export]
macro_rules! model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident as $type_name:literal, proxy $proxy:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $field_ty,
            )*
        }

        #[doc = concat!("Path-capturing stand-in for [`", stringify!($name), "`].")]
        #[derive(Clone)]
        $vis struct $proxy {
            assistant: $crate::capture::Assistant,
        }

        impl $crate::capture::ModelProxy for $proxy {
            fn bind(assistant: $crate::capture::Assistant) -> Self {
                Self { assistant }
            }

            fn assistant(&self) -> &$crate::capture::Assistant {
                &self.assistant
            }
        }

        #[allow(dead_code)]
        impl $proxy {
            $(
                $vis fn $field(&self) -> <$field_ty as $crate::capture::PropertyType>::Captured {
                    self.assistant
                        .access::<$field_ty>(stringify!($field).trim_start_matches("r#"))
                }
            )*
        }

        impl $crate::capture::PropertyType for $name {
            type Captured = $proxy;

            fn kind() -> $crate::schema::PropertyKind {
                $crate::schema::PropertyKind::model($type_name)
            }

            fn collect_schemas(closure: &mut $crate::schema::catalog::SchemaClosure<'_>) {
                if closure.visit($type_name, <Self as $crate::capture::Model>::describe) {
                    $(
                        <$field_ty as $crate::capture::PropertyType>::collect_schemas(closure);
                    )*
                }
            }

            fn capture(assistant: &$crate::capture::Assistant) -> $proxy {
                <$proxy as $crate::capture::ModelProxy>::bind(assistant.clone())
            }
        }

        impl $crate::capture::Model for $name {
            const TYPE_NAME: &'static str = $type_name;

            type Proxy = $proxy;

            fn describe() -> $crate::schema::ModelSchema {
                $crate::schema::ModelSchema::builder($type_name)
                    $(
                        .property(
                            stringify!($field).trim_start_matches("r#"),
                            <$field_ty as $crate::capture::PropertyType>::kind(),
                        )
                    )*
                    .build_unchecked()
            }
        }
    };
}

/// Declare a fieldless enum usable as a terminal property type. The first
/// variant is the capture placeholder.
#[macro_export]
macro_rules! enum_property {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$first_meta:meta])* $first:ident
            $(, $(#[$variant_meta:meta])* $variant:ident)* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(#[$first_meta])* $first,
            $($(#[$variant_meta])* $variant,)*
        }

        impl $crate::capture::PropertyType for $name {
            type Captured = $name;

            fn kind() -> $crate::schema::PropertyKind {
                $crate::schema::PropertyKind::Enum {
                    variants: vec![
                        stringify!($first).to_string(),
                        $(stringify!($variant).to_string(),)*
                    ],
                }
            }

            fn capture(_: &$crate::capture::Assistant) -> $name {
                $name::$first
            }
        }
    };
}
