//! Best-effort conversion of any `Serialize` value into a `serde_json::Value`.
//!
//! `serde_json::to_value` gives up on the first value it cannot represent. Here
//! every element, field and map value is converted on its own: a failing one
//! becomes `null` and its siblings are kept. A map whose key cannot be used as
//! a JSON object key fails as a whole and is replaced by `null` in its parent.

use std::fmt;

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};

/// Converts `value`, replacing only the parts that cannot be encoded with `null`.
pub fn to_value_lossy<T: Serialize + ?Sized>(value: &T) -> Value {
    value.serialize(LossySerializer).unwrap_or(Value::Null)
}

#[derive(Debug)]
struct Unencodable(String);

impl fmt::Display for Unencodable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unencodable value: {}", self.0)
    }
}

impl std::error::Error for Unencodable {}

impl ser::Error for Unencodable {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Unencodable(msg.to_string())
    }
}

struct LossySerializer;

impl ser::Serializer for LossySerializer {
    type Ok = Value;
    type Error = Unencodable;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = TupleVariantBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = StructBuilder;
    type SerializeStructVariant = StructVariantBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, Unencodable> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, Unencodable> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, Unencodable> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, Unencodable> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, Unencodable> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, Unencodable> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, Unencodable> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, Unencodable> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, Unencodable> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, Unencodable> {
        ser::Serializer::serialize_f64(self, f64::from(v))
    }

    // Non-finite floats have no JSON form; serde_json writes them as null too.
    fn serialize_f64(self, v: f64) -> Result<Value, Unencodable> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn serialize_char(self, v: char) -> Result<Value, Unencodable> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Unencodable> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, Unencodable> {
        Ok(Value::Array(v.iter().map(|b| Value::from(*b)).collect()))
    }

    fn serialize_none(self) -> Result<Value, Unencodable> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, Unencodable> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Unencodable> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Unencodable> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, Unencodable> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, Unencodable> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Unencodable> {
        Ok(tagged(variant, to_value_lossy(value)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, Unencodable> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, Unencodable> {
        ser::Serializer::serialize_seq(self, Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, Unencodable> {
        ser::Serializer::serialize_seq(self, Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantBuilder, Unencodable> {
        Ok(TupleVariantBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, Unencodable> {
        Ok(MapBuilder {
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<StructBuilder, Unencodable> {
        Ok(StructBuilder { map: Map::new() })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantBuilder, Unencodable> {
        Ok(StructVariantBuilder {
            variant,
            map: Map::new(),
        })
    }
}

fn tagged(variant: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(variant.to_owned(), value);
    Value::Object(map)
}

/// JSON object keys must be strings; numbers and booleans are stringified.
fn object_key<T: Serialize + ?Sized>(key: &T) -> Result<String, Unencodable> {
    match key.serialize(LossySerializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Unencodable(format!("object key must be a string, got {other}"))),
    }
}

struct SeqBuilder {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = Unencodable;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        self.items.push(to_value_lossy(value));
        Ok(())
    }

    fn end(self) -> Result<Value, Unencodable> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = Unencodable;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Unencodable> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = Unencodable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Unencodable> {
        ser::SerializeSeq::end(self)
    }
}

struct TupleVariantBuilder {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for TupleVariantBuilder {
    type Ok = Value;
    type Error = Unencodable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        self.items.push(to_value_lossy(value));
        Ok(())
    }

    fn end(self) -> Result<Value, Unencodable> {
        Ok(tagged(self.variant, Value::Array(self.items)))
    }
}

struct MapBuilder {
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = Unencodable;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Unencodable> {
        self.next_key = Some(object_key(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Unencodable("map value without a key".into()))?;
        self.map.insert(key, to_value_lossy(value));
        Ok(())
    }

    fn end(self) -> Result<Value, Unencodable> {
        Ok(Value::Object(self.map))
    }
}

struct StructBuilder {
    map: Map<String, Value>,
}

impl ser::SerializeStruct for StructBuilder {
    type Ok = Value;
    type Error = Unencodable;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Unencodable> {
        self.map.insert(key.to_owned(), to_value_lossy(value));
        Ok(())
    }

    fn end(self) -> Result<Value, Unencodable> {
        Ok(Value::Object(self.map))
    }
}

struct StructVariantBuilder {
    variant: &'static str,
    map: Map<String, Value>,
}

impl ser::SerializeStructVariant for StructVariantBuilder {
    type Ok = Value;
    type Error = Unencodable;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Unencodable> {
        self.map.insert(key.to_owned(), to_value_lossy(value));
        Ok(())
    }

    fn end(self) -> Result<Value, Unencodable> {
        Ok(tagged(self.variant, Value::Object(self.map)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use serde::Serialize;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize)]
    struct Upload {
        user: &'static str,
        path: &'static str,
        extra: HashMap<(u8, u8), &'static str>,
    }

    struct Refuses;

    impl Serialize for Refuses {
        fn serialize<S: ser::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(ser::Error::custom("refused"))
        }
    }

    #[derive(Serialize)]
    enum Event {
        Moved { from: u32, to: Refuses },
        Pair(u8, Refuses),
        Single(Refuses),
        Idle,
    }

    #[test]
    fn bad_map_keys_null_only_that_field() {
        let mut extra = HashMap::new();
        extra.insert((1, 2), "tuple keys have no JSON form");
        let upload = Upload {
            user: "alice",
            path: "/a/b",
            extra,
        };

        assert!(serde_json::to_value(&upload).is_err());
        assert_eq!(
            to_value_lossy(&upload),
            json!({"user": "alice", "path": "/a/b", "extra": null})
        );
    }

    #[test]
    fn failing_elements_become_null_in_place() {
        let list: (u8, Refuses, &str) = (1, Refuses, "kept");
        assert_eq!(to_value_lossy(&list), json!([1, null, "kept"]));

        let mut map = BTreeMap::new();
        map.insert("bad", None);
        map.insert("good", Some(2.5));
        map.insert("nan", Some(f64::NAN));
        assert_eq!(
            to_value_lossy(&map),
            json!({"bad": null, "good": 2.5, "nan": null})
        );
    }

    #[test]
    fn enum_variants_use_external_tagging() {
        assert_eq!(
            to_value_lossy(&Event::Moved { from: 3, to: Refuses }),
            json!({"Moved": {"from": 3, "to": null}})
        );
        assert_eq!(to_value_lossy(&Event::Pair(7, Refuses)), json!({"Pair": [7, null]}));
        assert_eq!(to_value_lossy(&Event::Single(Refuses)), json!({"Single": null}));
        assert_eq!(to_value_lossy(&Event::Idle), json!("Idle"));
    }

    #[test]
    fn scalar_keys_are_stringified() {
        let mut map = BTreeMap::new();
        map.insert(10u32, "ten");
        map.insert(2u32, "two");
        assert_eq!(to_value_lossy(&map), json!({"10": "ten", "2": "two"}));
    }

    #[test]
    fn failing_root_is_null() {
        assert_eq!(to_value_lossy(&Refuses), Value::Null);
    }

    #[test]
    fn matches_to_value_when_everything_encodes() {
        let value = json!({"a": [1, "x", {"b": null}], "c": true, "d": "über/straße"});
        assert_eq!(to_value_lossy(&value), value);
    }
}
