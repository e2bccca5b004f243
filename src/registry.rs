//! Converter registry.
//!
//! [`ConverterRegistry`] maps a [`TypeKey`] to a [`Converter`]. Lookup is:
//!
//! 1. exact key match;
//! 2. the first registered converter whose [`Converter::can_handle`] accepts
//!    the key, in registration order;
//! 3. the text converter, which is always present.
//!
//! Registries are built then frozen: mutate during initialization, then share
//! read-only behind an `Arc` (see [`ConverterRegistry::into_shared`]).
//!
//! # Examples
//!
//! ```
//! use fixcol::converter::EnumConverter;
//! use fixcol::{ConverterRegistry, TypeKey};
//!
//! let mut registry = ConverterRegistry::new();
//! registry.register(EnumConverter::new("Color", ["Red", "Green"]));
//!
//! assert!(registry.has(&TypeKey::Enum("Color".to_string())));
//! assert!(!registry.has(&TypeKey::Custom("Money".to_string())));
//! // Unknown types degrade to text
//! assert_eq!(registry.resolve(&TypeKey::Custom("Money".to_string())).handled_type(), TypeKey::Text);
//! ```

use crate::converter::{
    BooleanConverter, Converter, DateConverter, DecimalConverter, DelimitedListConverter,
    DoubleConverter, IntegerConverter, TextConverter, UuidConverter,
};
use crate::value::TypeKey;
use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of converters keyed by semantic type.
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    converters: IndexMap<TypeKey, Arc<dyn Converter>>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterRegistry {
    /// Create a registry preloaded with the built-in converters.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(IntegerConverter);
        registry.register_as(TypeKey::Long, IntegerConverter);
        registry.register(DoubleConverter);
        registry.register(BooleanConverter);
        registry.register(DecimalConverter);
        registry.register(DateConverter::default());
        registry.register(UuidConverter);
        registry.register(DelimitedListConverter::default());
        registry
    }

    /// Create a registry holding only the text converter.
    #[must_use]
    pub fn empty() -> Self {
        let mut converters: IndexMap<TypeKey, Arc<dyn Converter>> = IndexMap::new();
        converters.insert(TypeKey::Text, Arc::new(TextConverter));
        ConverterRegistry { converters }
    }

    /// Replace the date converter with one using `pattern`.
    #[must_use]
    pub fn with_date_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.register(DateConverter::with_pattern(pattern));
        self
    }

    /// Replace the list converter with one splitting on `delimiter`.
    #[must_use]
    pub fn with_list_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.register(DelimitedListConverter::with_delimiter(delimiter));
        self
    }

    /// Register a converter under its own handled type, replacing any
    /// existing entry (which keeps its original registration slot).
    pub fn register<C: Converter + 'static>(&mut self, converter: C) {
        self.register_arc(Arc::new(converter));
    }

    /// Register an already shared converter under its handled type.
    pub fn register_arc(&mut self, converter: Arc<dyn Converter>) {
        self.converters.insert(converter.handled_type(), converter);
    }

    /// Register a converter under an explicit type key.
    ///
    /// Used when one converter instance should serve a type other than its
    /// natural handled type.
    pub fn register_as<C: Converter + 'static>(&mut self, key: TypeKey, converter: C) {
        self.converters.insert(key, Arc::new(converter));
    }

    /// Resolve the converter for a type. Never fails: unknown types get the
    /// text converter.
    #[must_use]
    pub fn resolve(&self, key: &TypeKey) -> Arc<dyn Converter> {
        if let Some(converter) = self.converters.get(key) {
            return Arc::clone(converter);
        }
        if let Some(converter) = self.converters.values().find(|c| c.can_handle(key)) {
            log::trace!("Resolved {key} through {}", converter.name());
            return Arc::clone(converter);
        }
        log::debug!("No converter for {key}, falling back to text");
        self.text_converter()
    }

    /// True if an exact or capability-matching converter exists for the type.
    #[must_use]
    pub fn has(&self, key: &TypeKey) -> bool {
        self.converters.contains_key(key) || self.converters.values().any(|c| c.can_handle(key))
    }

    /// Number of registered entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.converters.len()
    }

    /// Registered type keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.converters.keys()
    }

    /// Freeze the registry for shared, read-only use.
    #[must_use]
    pub fn into_shared(self) -> Arc<ConverterRegistry> {
        Arc::new(self)
    }

    fn text_converter(&self) -> Arc<dyn Converter> {
        self.converters
            .get(&TypeKey::Text)
            .map_or_else(|| Arc::new(TextConverter) as Arc<dyn Converter>, Arc::clone)
    }
}
