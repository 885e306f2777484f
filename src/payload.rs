//! Boundary encoder for everything handed to the presentation and narrative layers.
//!
//! Only null, booleans, 64-bit integers, finite floats, strings, sequences and
//! string-keyed maps get through. Anything else is an error rather than a
//! silent coercion: `serde_json::to_value` would quietly turn `f64::INFINITY`
//! into `null`, this encoder refuses it.

use std::fmt::Display;

use serde::ser::{self, Impossible, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("non-finite number {0} is not a valid payload value")]
    NonFinite(f64),

    #[error("integer {0} does not fit in 64 bits")]
    IntegerOutOfRange(String),

    #[error("byte arrays are not a supported payload kind")]
    Bytes,

    #[error("map keys must be strings or integers, got {0}")]
    UnsupportedKey(&'static str),

    #[error("map value serialized without a key")]
    MissingKey,

    #[error("{0}")]
    Custom(String),
}

impl ser::Error for PayloadError {
    fn custom<T: Display>(msg: T) -> Self {
        PayloadError::Custom(msg.to_string())
    }
}

pub fn to_payload<T: ?Sized + Serialize>(value: &T) -> Result<Value, PayloadError> {
    value.serialize(PayloadSerializer)
}

/// Pretty JSON text of a value that already passed the boundary.
pub fn to_pretty_json<T: ?Sized + Serialize>(value: &T) -> crate::error::Result<String> {
    let payload = to_payload(value)?;
    Ok(serde_json::to_string_pretty(&payload)?)
}

// ---------------------------------------------------------------------------
// Value serializer
// ---------------------------------------------------------------------------

pub struct PayloadSerializer;

impl ser::Serializer for PayloadSerializer {
    type Ok = Value;
    type Error = PayloadError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = TupleVariantBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = StructVariantBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, PayloadError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, PayloadError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, PayloadError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, PayloadError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, PayloadError> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, PayloadError> {
        if let Ok(small) = i64::try_from(v) {
            return self.serialize_i64(small);
        }
        u64::try_from(v)
            .map(|big| Value::Number(Number::from(big)))
            .map_err(|_| PayloadError::IntegerOutOfRange(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, PayloadError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, PayloadError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, PayloadError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, PayloadError> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, PayloadError> {
        u64::try_from(v)
            .map(|small| Value::Number(Number::from(small)))
            .map_err(|_| PayloadError::IntegerOutOfRange(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, PayloadError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, PayloadError> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or(PayloadError::NonFinite(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, PayloadError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, PayloadError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Value, PayloadError> {
        Err(PayloadError::Bytes)
    }

    fn serialize_none(self) -> Result<Value, PayloadError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, PayloadError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, PayloadError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, PayloadError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, PayloadError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, PayloadError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, PayloadError> {
        let mut map = Map::new();
        map.insert(variant.to_string(), value.serialize(PayloadSerializer)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, PayloadError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, PayloadError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, PayloadError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantBuilder, PayloadError> {
        Ok(TupleVariantBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, PayloadError> {
        Ok(MapBuilder {
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder, PayloadError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantBuilder, PayloadError> {
        Ok(StructVariantBuilder {
            variant,
            map: Map::new(),
        })
    }
}

pub struct SeqBuilder {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = PayloadError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), PayloadError> {
        self.items.push(value.serialize(PayloadSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, PayloadError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = PayloadError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), PayloadError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, PayloadError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = PayloadError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), PayloadError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, PayloadError> {
        ser::SerializeSeq::end(self)
    }
}

pub struct TupleVariantBuilder {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for TupleVariantBuilder {
    type Ok = Value;
    type Error = PayloadError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), PayloadError> {
        self.items.push(value.serialize(PayloadSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, PayloadError> {
        let mut map = Map::new();
        map.insert(self.variant.to_string(), Value::Array(self.items));
        Ok(Value::Object(map))
    }
}

pub struct MapBuilder {
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = PayloadError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), PayloadError> {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), PayloadError> {
        let key = self.next_key.take().ok_or(PayloadError::MissingKey)?;
        self.map.insert(key, value.serialize(PayloadSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, PayloadError> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = PayloadError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), PayloadError> {
        self.map.insert(key.to_string(), value.serialize(PayloadSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, PayloadError> {
        Ok(Value::Object(self.map))
    }
}

pub struct StructVariantBuilder {
    variant: &'static str,
    map: Map<String, Value>,
}

impl ser::SerializeStructVariant for StructVariantBuilder {
    type Ok = Value;
    type Error = PayloadError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), PayloadError> {
        self.map.insert(key.to_string(), value.serialize(PayloadSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, PayloadError> {
        let mut outer = Map::new();
        outer.insert(self.variant.to_string(), Value::Object(self.map));
        Ok(Value::Object(outer))
    }
}

// ---------------------------------------------------------------------------
// Map keys
// ---------------------------------------------------------------------------

/// Strings pass, integers are stringified the way JSON objects require, the rest is refused.
struct KeySerializer;

type NoCompound = Impossible<String, PayloadError>;

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = PayloadError;

    type SerializeSeq = NoCompound;
    type SerializeTuple = NoCompound;
    type SerializeTupleStruct = NoCompound;
    type SerializeTupleVariant = NoCompound;
    type SerializeMap = NoCompound;
    type SerializeStruct = NoCompound;
    type SerializeStructVariant = NoCompound;

    fn serialize_bool(self, _v: bool) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("float"))
    }

    fn serialize_char(self, v: char) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, PayloadError> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("bytes"))
    }

    fn serialize_none(self) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("null"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("option"))
    }

    fn serialize_unit(self) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, PayloadError> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, PayloadError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, PayloadError> {
        Err(PayloadError::UnsupportedKey("enum variant with data"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<NoCompound, PayloadError> {
        Err(PayloadError::UnsupportedKey("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<NoCompound, PayloadError> {
        Err(PayloadError::UnsupportedKey("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<NoCompound, PayloadError> {
        Err(PayloadError::UnsupportedKey("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<NoCompound, PayloadError> {
        Err(PayloadError::UnsupportedKey("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<NoCompound, PayloadError> {
        Err(PayloadError::UnsupportedKey("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<NoCompound, PayloadError> {
        Err(PayloadError::UnsupportedKey("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<NoCompound, PayloadError> {
        Err(PayloadError::UnsupportedKey("struct variant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Serialize, Serializer};
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    struct RawBytes(&'static [u8]);

    impl Serialize for RawBytes {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_bytes(self.0)
        }
    }

    #[derive(Serialize)]
    #[serde(rename_all = "snake_case")]
    enum Shape {
        Empty,
        Tagged(u8),
        Pair(i32, i32),
        Labelled { name: String },
    }

    #[test]
    fn primitives_and_containers_round_out_to_json() {
        #[derive(Serialize)]
        struct Row {
            a: u64,
            b: f64,
            c: Option<String>,
            d: Vec<bool>,
            e: char,
        }
        let row = Row {
            a: 3,
            b: 1.5,
            c: None,
            d: vec![true, false],
            e: 'x',
        };
        assert_eq!(
            to_payload(&row).unwrap(),
            json!({"a": 3, "b": 1.5, "c": null, "d": [true, false], "e": "x"})
        );
    }

    #[test]
    fn matches_serde_json_for_supported_values() {
        let shapes = vec![
            Shape::Empty,
            Shape::Tagged(4),
            Shape::Pair(-1, 2),
            Shape::Labelled { name: "n".into() },
        ];
        assert_eq!(to_payload(&shapes).unwrap(), serde_json::to_value(&shapes).unwrap());
    }

    #[test]
    fn non_finite_floats_are_refused() {
        assert!(matches!(to_payload(&f64::INFINITY), Err(PayloadError::NonFinite(_))));
        assert!(matches!(to_payload(&f64::NEG_INFINITY), Err(PayloadError::NonFinite(_))));
        assert!(matches!(to_payload(&f64::NAN), Err(PayloadError::NonFinite(_))));
        assert!(matches!(to_payload(&vec![1.0f32, f32::NAN]), Err(PayloadError::NonFinite(_))));
    }

    #[test]
    fn bytes_are_refused() {
        let err = to_payload(&RawBytes(b"abc")).unwrap_err();
        assert!(matches!(err, PayloadError::Bytes));
        assert!(err.to_string().contains("byte arrays"));
    }

    #[test]
    fn wide_integers_must_fit_64_bits() {
        assert_eq!(to_payload(&(-5i128)).unwrap(), json!(-5));
        assert_eq!(to_payload(&(u64::MAX as u128)).unwrap(), json!(u64::MAX));
        assert!(matches!(
            to_payload(&(u128::MAX)),
            Err(PayloadError::IntegerOutOfRange(_))
        ));
        assert!(matches!(
            to_payload(&(i128::MIN)),
            Err(PayloadError::IntegerOutOfRange(_))
        ));
    }

    #[test]
    fn integer_keys_are_stringified_composite_keys_refused() {
        let mut by_hour = BTreeMap::new();
        by_hour.insert(14u32, 5u64);
        assert_eq!(to_payload(&by_hour).unwrap(), json!({"14": 5}));

        let mut by_pair = HashMap::new();
        by_pair.insert((1u8, 2u8), 0u8);
        assert!(matches!(
            to_payload(&by_pair),
            Err(PayloadError::UnsupportedKey("tuple"))
        ));
    }

    #[test]
    fn pretty_json_surfaces_payload_errors() {
        assert!(to_pretty_json(&json!({"k": [1, 2]})).unwrap().contains("\"k\""));
        assert!(to_pretty_json(&f64::NAN).is_err());
    }
}
