//! `serde` support: the decode bridge as a [`serde::Deserializer`].
//!
//! Lets a type whose existing decode logic is a `Deserialize` impl be built
//! from builder storage. Structs are walked field by field with the same
//! cursor discipline as [`Decoder`]; scalar hints are strict, so a stored
//! `u32` only satisfies `deserialize_u32`.

use std::any::Any;

use serde::de::{self, DeserializeSeed, IntoDeserializer, MapAccess, Visitor};

use crate::decode::{DecodeBridge, Decoder};
use crate::error::{DecodeError, StoreError};
use crate::path::FieldPath;
use crate::slot::{AnyValue, ValueSlot};

impl DecodeBridge<'_> {
    fn value<T: Any + Clone>(&mut self) -> Result<T, DecodeError> {
        self.decode_value::<T>()
    }

    /// True when the current value should be visited as `None`.
    fn is_absent(&self) -> bool {
        let path = self.coding_path();
        match self.store().slot(path) {
            Ok(ValueSlot::Present(_)) => false,
            Ok(ValueSlot::Null) => true,
            // A cleared struct field still has whatever was written below it.
            Ok(ValueSlot::Unset) | Err(_) => !self.store().has_descendants(path),
        }
    }

    /// Returns true if field `name` below the cursor should be offered to a
    /// struct visitor.
    fn is_supplied(&self, name: &'static str) -> bool {
        let path = self.coding_path().join(&[name]);
        match self.store().slot(&path) {
            Ok(ValueSlot::Present(_) | ValueSlot::Null) => true,
            Ok(ValueSlot::Unset) | Err(_) => self.store().has_descendants(&path),
        }
    }
}

fn replay<'de, V: Visitor<'de>>(
    value: &AnyValue,
    path: &FieldPath,
    visitor: V,
) -> Result<V::Value, DecodeError> {
    macro_rules! replay_as {
        ($($t:ty => $visit:ident),* $(,)?) => {$(
            if let Some(v) = value.downcast_ref::<$t>() {
                return visitor.$visit(v.clone());
            }
        )*};
    }

    replay_as!(
        bool => visit_bool,
        i8 => visit_i8,
        i16 => visit_i16,
        i32 => visit_i32,
        i64 => visit_i64,
        i128 => visit_i128,
        u8 => visit_u8,
        u16 => visit_u16,
        u32 => visit_u32,
        u64 => visit_u64,
        u128 => visit_u128,
        f32 => visit_f32,
        f64 => visit_f64,
        char => visit_char,
        String => visit_string,
        Vec<u8> => visit_byte_buf,
    );
    if let Some(v) = value.downcast_ref::<usize>() {
        return visitor.visit_u64(*v as u64);
    }
    if let Some(v) = value.downcast_ref::<isize>() {
        return visitor.visit_i64(*v as i64);
    }
    if value.is::<()>() {
        return visitor.visit_unit();
    }

    Err(DecodeError::Custom(format!(
        "cannot replay a stored {} at `{path}`",
        value.type_name()
    )))
}

macro_rules! deserialize_strict {
    ($($method:ident => $t:ty, $visit:ident;)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
            visitor.$visit(self.value::<$t>()?)
        }
    )*};
}

impl<'de> de::Deserializer<'de> for &mut DecodeBridge<'_> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let path = self.coding_path().clone();
        match self.store().slot(&path) {
            Ok(ValueSlot::Present(value)) => replay(value, &path, visitor),
            Ok(ValueSlot::Null) => visitor.visit_none(),
            Ok(ValueSlot::Unset) | Err(_) if self.store().has_descendants(&path) => {
                Err(DecodeError::Custom(format!(
                    "cannot infer the shape of `{path}`; deserialize it as a struct"
                )))
            }
            Ok(ValueSlot::Unset) => Err(StoreError::FieldUnset { path }.into()),
            Err(err) => Err(err.into()),
        }
    }

    deserialize_strict! {
        deserialize_bool => bool, visit_bool;
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i128 => i128, visit_i128;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u128 => u128, visit_u128;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
        deserialize_char => char, visit_char;
        deserialize_str => String, visit_string;
        deserialize_string => String, visit_string;
        deserialize_bytes => Vec<u8>, visit_byte_buf;
        deserialize_byte_buf => Vec<u8>, visit_byte_buf;
    }

    // `usize` and `isize` deserialize through the 64-bit hints.
    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        if let Ok(v) = self.store().get_typed::<isize>(self.coding_path()) {
            return visitor.visit_i64(v as i64);
        }
        visitor.visit_i64(self.value::<i64>()?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        if let Ok(v) = self.store().get_typed::<usize>(self.coding_path()) {
            return visitor.visit_u64(v as u64);
        }
        visitor.visit_u64(self.value::<u64>()?)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        if self.is_absent() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, DecodeError> {
        unimplemented!(
            "sequence field `{}` cannot be built field by field",
            self.coding_path()
        )
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, DecodeError> {
        unimplemented!(
            "tuple field `{}` cannot be built field by field",
            self.coding_path()
        )
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, DecodeError> {
        unimplemented!(
            "tuple struct field `{}` cannot be built field by field",
            self.coding_path()
        )
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, DecodeError> {
        unimplemented!(
            "map field `{}` cannot be built field by field",
            self.coding_path()
        )
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_map(StructAccess {
            bridge: self,
            fields,
            index: 0,
            current: None,
        })
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, DecodeError> {
        Err(DecodeError::Custom(format!(
            "enum {name} at `{}` cannot be built field by field; store it as a leaf",
            self.coding_path()
        )))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        de::Deserializer::deserialize_any(self, visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }
}

/// Offers the declared fields of a struct that have something stored for
/// them, in declaration order.
struct StructAccess<'a, 's> {
    bridge: &'a mut DecodeBridge<'s>,
    fields: &'static [&'static str],
    index: usize,
    current: Option<&'static str>,
}

impl<'de> MapAccess<'de> for StructAccess<'_, '_> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        while let Some(&name) = self.fields.get(self.index) {
            self.index += 1;
            if self.bridge.is_supplied(name) {
                self.current = Some(name);
                return seed.deserialize(name.into_deserializer()).map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, DecodeError> {
        let name = self
            .current
            .take()
            .ok_or_else(|| DecodeError::Custom("value requested before its key".to_string()))?;
        let mut scope = self.bridge.enter(name)?;
        seed.deserialize(&mut *scope)
    }
}
