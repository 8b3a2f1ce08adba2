/// Message factory: wire type → parser registry.
///
/// The dispatch table only knows categories. Which concrete messages live
/// inside a category is decided here, by whichever protocol module
/// registers a parser for the wire type.
use std::collections::HashMap;
use std::fmt;

use crate::category::MessageCategory;
use crate::error::ApianNetError;
use crate::message::codec;
use crate::message::types::ApianMessage;

/// A payload parser for one wire type.
pub type ParseFn = Box<dyn Fn(&str) -> Result<ApianMessage, ApianNetError> + Send + Sync>;

pub struct MessageFactory {
    parsers: HashMap<String, ParseFn>,
}

impl MessageFactory {
    /// Factory with the built-in JSON parsers for every category.
    pub fn new() -> Self {
        let mut factory = Self::empty();
        for category in MessageCategory::ALL {
            if category.is_group() {
                factory.register(category.wire_type(), codec::decode_group);
            } else {
                factory.register(category.wire_type(), codec::decode_consensus);
            }
        }
        factory
    }

    /// Factory with no parsers at all.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register (or replace) the parser for `wire_type`.
    pub fn register<F>(&mut self, wire_type: impl Into<String>, parser: F)
    where
        F: Fn(&str) -> Result<ApianMessage, ApianNetError> + Send + Sync + 'static,
    {
        self.parsers.insert(wire_type.into(), Box::new(parser));
    }

    pub fn is_registered(&self, wire_type: &str) -> bool {
        self.parsers.contains_key(wire_type)
    }

    /// Build the concrete message for `wire_type` from its payload.
    pub fn deserialize(&self, wire_type: &str, payload: &str) -> Result<ApianMessage, ApianNetError> {
        let parser = self
            .parsers
            .get(wire_type)
            .ok_or_else(|| ApianNetError::UnknownWireType(wire_type.to_string()))?;
        parser(payload)
    }
}

impl Default for MessageFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wire_types: Vec<_> = self.parsers.keys().collect();
        wire_types.sort();
        f.debug_struct("MessageFactory")
            .field("wire_types", &wire_types)
            .finish()
    }
}
