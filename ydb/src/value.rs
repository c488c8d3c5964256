use std::collections::HashMap;

use time::macros::{date, format_description};
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::errors::{ClientError, Error};
use ydb_apis::ydb as pb;
use ydb_apis::ydb::r#type::PrimitiveTypeId;

const EPOCH_DATE: Date = date!(1970 - 01 - 01);

/// Typed-value tree mirroring the server's type system.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    Bytes,
    Text,
    Json,
    JsonDocument,
    Yson,
    Uuid,
    Date,
    Datetime,
    Timestamp,
    TzDate,
    TzDatetime,
    TzTimestamp,
    Interval,
    Optional(Box<Type>),
    List(Box<Type>),
    Tuple(Vec<Type>),
    Struct(Vec<(String, Type)>),
    Dict(Box<Type>, Box<Type>),
    Void,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    Text(String),
    Json(String),
    JsonDocument(String),
    Yson(Vec<u8>),
    Uuid(u128),
    Date(Date),
    Datetime(OffsetDateTime),
    Timestamp(OffsetDateTime),
    /// Civil time plus the original timezone tag, serialized as `<ISO>,<tz>`.
    TzDate(OffsetDateTime, String),
    TzDatetime(OffsetDateTime, String),
    TzTimestamp(OffsetDateTime, String),
    /// Microseconds.
    Interval(i64),
    Optional {
        item: Box<Type>,
        value: Option<Box<Value>>,
    },
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Dict(Vec<(Value, Value)>),
    Null,
}

impl Value {
    pub fn optional(value: Value) -> Value {
        let item = Box::new(value.r#type());
        Value::Optional {
            item,
            value: Some(Box::new(value)),
        }
    }

    pub fn optional_none(item: Type) -> Value {
        Value::Optional {
            item: Box::new(item),
            value: None,
        }
    }

    pub fn r#type(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Int8(_) => Type::Int8,
            Value::Uint8(_) => Type::Uint8,
            Value::Int16(_) => Type::Int16,
            Value::Uint16(_) => Type::Uint16,
            Value::Int32(_) => Type::Int32,
            Value::Uint32(_) => Type::Uint32,
            Value::Int64(_) => Type::Int64,
            Value::Uint64(_) => Type::Uint64,
            Value::Float(_) => Type::Float,
            Value::Double(_) => Type::Double,
            Value::Bytes(_) => Type::Bytes,
            Value::Text(_) => Type::Text,
            Value::Json(_) => Type::Json,
            Value::JsonDocument(_) => Type::JsonDocument,
            Value::Yson(_) => Type::Yson,
            Value::Uuid(_) => Type::Uuid,
            Value::Date(_) => Type::Date,
            Value::Datetime(_) => Type::Datetime,
            Value::Timestamp(_) => Type::Timestamp,
            Value::TzDate(_, _) => Type::TzDate,
            Value::TzDatetime(_, _) => Type::TzDatetime,
            Value::TzTimestamp(_, _) => Type::TzTimestamp,
            Value::Interval(_) => Type::Interval,
            Value::Optional { item, .. } => Type::Optional(item.clone()),
            Value::List(items) => Type::List(Box::new(
                items.first().map(Value::r#type).unwrap_or(Type::Void),
            )),
            Value::Tuple(items) => Type::Tuple(items.iter().map(Value::r#type).collect()),
            Value::Struct(fields) => Type::Struct(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.r#type()))
                    .collect(),
            ),
            Value::Dict(pairs) => match pairs.first() {
                Some((k, v)) => Type::Dict(Box::new(k.r#type()), Box::new(v.r#type())),
                None => Type::Dict(Box::new(Type::Void), Box::new(Type::Void)),
            },
            Value::Null => Type::Void,
        }
    }

    pub fn typed(&self) -> pb::TypedValue {
        pb::TypedValue {
            r#type: Some(self.r#type().to_proto()),
            value: Some(self.to_proto()),
        }
    }
}

impl Type {
    fn primitive(id: PrimitiveTypeId) -> pb::Type {
        pb::Type {
            r#type: Some(pb::r#type::Type::TypeId(id as i32)),
        }
    }

    pub(crate) fn to_proto(&self) -> pb::Type {
        match self {
            Type::Bool => Self::primitive(PrimitiveTypeId::Bool),
            Type::Int8 => Self::primitive(PrimitiveTypeId::Int8),
            Type::Uint8 => Self::primitive(PrimitiveTypeId::Uint8),
            Type::Int16 => Self::primitive(PrimitiveTypeId::Int16),
            Type::Uint16 => Self::primitive(PrimitiveTypeId::Uint16),
            Type::Int32 => Self::primitive(PrimitiveTypeId::Int32),
            Type::Uint32 => Self::primitive(PrimitiveTypeId::Uint32),
            Type::Int64 => Self::primitive(PrimitiveTypeId::Int64),
            Type::Uint64 => Self::primitive(PrimitiveTypeId::Uint64),
            Type::Float => Self::primitive(PrimitiveTypeId::Float),
            Type::Double => Self::primitive(PrimitiveTypeId::Double),
            Type::Bytes => Self::primitive(PrimitiveTypeId::String),
            Type::Text => Self::primitive(PrimitiveTypeId::Utf8),
            Type::Json => Self::primitive(PrimitiveTypeId::Json),
            Type::JsonDocument => Self::primitive(PrimitiveTypeId::JsonDocument),
            Type::Yson => Self::primitive(PrimitiveTypeId::Yson),
            Type::Uuid => Self::primitive(PrimitiveTypeId::Uuid),
            Type::Date => Self::primitive(PrimitiveTypeId::Date),
            Type::Datetime => Self::primitive(PrimitiveTypeId::Datetime),
            Type::Timestamp => Self::primitive(PrimitiveTypeId::Timestamp),
            Type::TzDate => Self::primitive(PrimitiveTypeId::TzDate),
            Type::TzDatetime => Self::primitive(PrimitiveTypeId::TzDatetime),
            Type::TzTimestamp => Self::primitive(PrimitiveTypeId::TzTimestamp),
            Type::Interval => Self::primitive(PrimitiveTypeId::Interval),
            Type::Optional(item) => pb::Type {
                r#type: Some(pb::r#type::Type::OptionalType(Box::new(pb::OptionalType {
                    item: Some(Box::new(item.to_proto())),
                }))),
            },
            Type::List(item) => pb::Type {
                r#type: Some(pb::r#type::Type::ListType(Box::new(pb::ListType {
                    item: Some(Box::new(item.to_proto())),
                }))),
            },
            Type::Tuple(elements) => pb::Type {
                r#type: Some(pb::r#type::Type::TupleType(pb::TupleType {
                    elements: elements.iter().map(Type::to_proto).collect(),
                })),
            },
            Type::Struct(members) => pb::Type {
                r#type: Some(pb::r#type::Type::StructType(pb::StructType {
                    members: members
                        .iter()
                        .map(|(name, ty)| pb::StructMember {
                            name: name.clone(),
                            r#type: Some(ty.to_proto()),
                        })
                        .collect(),
                })),
            },
            Type::Dict(key, payload) => pb::Type {
                r#type: Some(pb::r#type::Type::DictType(Box::new(pb::DictType {
                    key: Some(Box::new(key.to_proto())),
                    payload: Some(Box::new(payload.to_proto())),
                }))),
            },
            Type::Void => pb::Type {
                r#type: Some(pb::r#type::Type::VoidType(0)),
            },
        }
    }

    pub(crate) fn from_proto(proto: &pb::Type) -> Result<Type, Error> {
        let inner = proto
            .r#type
            .as_ref()
            .ok_or_else(|| malformed("empty type"))?;
        Ok(match inner {
            pb::r#type::Type::TypeId(id) => {
                match PrimitiveTypeId::from_i32(*id).ok_or_else(|| malformed("unknown type id"))? {
                    PrimitiveTypeId::Bool => Type::Bool,
                    PrimitiveTypeId::Int8 => Type::Int8,
                    PrimitiveTypeId::Uint8 => Type::Uint8,
                    PrimitiveTypeId::Int16 => Type::Int16,
                    PrimitiveTypeId::Uint16 => Type::Uint16,
                    PrimitiveTypeId::Int32 => Type::Int32,
                    PrimitiveTypeId::Uint32 => Type::Uint32,
                    PrimitiveTypeId::Int64 => Type::Int64,
                    PrimitiveTypeId::Uint64 => Type::Uint64,
                    PrimitiveTypeId::Float => Type::Float,
                    PrimitiveTypeId::Double => Type::Double,
                    PrimitiveTypeId::String => Type::Bytes,
                    PrimitiveTypeId::Utf8 => Type::Text,
                    PrimitiveTypeId::Json => Type::Json,
                    PrimitiveTypeId::JsonDocument => Type::JsonDocument,
                    PrimitiveTypeId::Yson => Type::Yson,
                    PrimitiveTypeId::Uuid => Type::Uuid,
                    PrimitiveTypeId::Date => Type::Date,
                    PrimitiveTypeId::Datetime => Type::Datetime,
                    PrimitiveTypeId::Timestamp => Type::Timestamp,
                    PrimitiveTypeId::TzDate => Type::TzDate,
                    PrimitiveTypeId::TzDatetime => Type::TzDatetime,
                    PrimitiveTypeId::TzTimestamp => Type::TzTimestamp,
                    PrimitiveTypeId::Interval => Type::Interval,
                    PrimitiveTypeId::PrimitiveTypeIdUnspecified => {
                        return Err(malformed("unspecified type id"))
                    }
                }
            }
            pb::r#type::Type::OptionalType(optional) => {
                let item = optional.item.as_ref().ok_or_else(|| malformed("optional without item"))?;
                Type::Optional(Box::new(Type::from_proto(item)?))
            }
            pb::r#type::Type::ListType(list) => {
                let item = list.item.as_ref().ok_or_else(|| malformed("list without item"))?;
                Type::List(Box::new(Type::from_proto(item)?))
            }
            pb::r#type::Type::TupleType(tuple) => Type::Tuple(
                tuple
                    .elements
                    .iter()
                    .map(Type::from_proto)
                    .collect::<Result<_, _>>()?,
            ),
            pb::r#type::Type::StructType(strukt) => Type::Struct(
                strukt
                    .members
                    .iter()
                    .map(|member| {
                        let ty = member
                            .r#type
                            .as_ref()
                            .ok_or_else(|| malformed("struct member without type"))?;
                        Ok((member.name.clone(), Type::from_proto(ty)?))
                    })
                    .collect::<Result<_, Error>>()?,
            ),
            pb::r#type::Type::DictType(dict) => {
                let key = dict.key.as_ref().ok_or_else(|| malformed("dict without key type"))?;
                let payload = dict
                    .payload
                    .as_ref()
                    .ok_or_else(|| malformed("dict without payload type"))?;
                Type::Dict(
                    Box::new(Type::from_proto(key)?),
                    Box::new(Type::from_proto(payload)?),
                )
            }
            pb::r#type::Type::VoidType(_) => Type::Void,
        })
    }
}

fn malformed(reason: &str) -> Error {
    ClientError::MalformedResult(reason.to_string()).into()
}

fn scalar(value: pb::value::Value) -> pb::Value {
    pb::Value {
        value: Some(value),
        ..Default::default()
    }
}

const TZ_DATE_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
const TZ_DATETIME_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const TZ_TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]");

fn format_tz(
    datetime: &OffsetDateTime,
    tz: &str,
    format: &[time::format_description::FormatItem<'_>],
) -> String {
    let text = PrimitiveDateTime::new(datetime.date(), datetime.time())
        .format(format)
        .unwrap_or_default();
    format!("{text},{tz}")
}

fn parse_tz(
    text: &str,
    format: &[time::format_description::FormatItem<'_>],
    date_only: bool,
) -> Result<(OffsetDateTime, String), Error> {
    let (civil, tz) = text
        .split_once(',')
        .ok_or_else(|| malformed("timezone value without tz suffix"))?;
    let datetime = if date_only {
        Date::parse(civil, format)
            .map_err(|e| malformed(&format!("bad tz date: {e}")))?
            .midnight()
            .assume_utc()
    } else {
        PrimitiveDateTime::parse(civil, format)
            .map_err(|e| malformed(&format!("bad tz datetime: {e}")))?
            .assume_utc()
    };
    Ok((datetime, tz.to_string()))
}

impl Value {
    pub(crate) fn to_proto(&self) -> pb::Value {
        use pb::value::Value as Scalar;
        match self {
            Value::Bool(v) => scalar(Scalar::BoolValue(*v)),
            Value::Int8(v) => scalar(Scalar::Int32Value(*v as i32)),
            Value::Uint8(v) => scalar(Scalar::Uint32Value(*v as u32)),
            Value::Int16(v) => scalar(Scalar::Int32Value(*v as i32)),
            Value::Uint16(v) => scalar(Scalar::Uint32Value(*v as u32)),
            Value::Int32(v) => scalar(Scalar::Int32Value(*v)),
            Value::Uint32(v) => scalar(Scalar::Uint32Value(*v)),
            Value::Int64(v) => scalar(Scalar::Int64Value(*v)),
            Value::Uint64(v) => scalar(Scalar::Uint64Value(*v)),
            Value::Float(v) => scalar(Scalar::FloatValue(*v)),
            Value::Double(v) => scalar(Scalar::DoubleValue(*v)),
            Value::Bytes(v) => scalar(Scalar::BytesValue(v.clone())),
            Value::Text(v) => scalar(Scalar::TextValue(v.clone())),
            Value::Json(v) => scalar(Scalar::TextValue(v.clone())),
            Value::JsonDocument(v) => scalar(Scalar::TextValue(v.clone())),
            Value::Yson(v) => scalar(Scalar::BytesValue(v.clone())),
            Value::Uuid(v) => pb::Value {
                high_128: (v >> 64) as u64,
                value: Some(Scalar::Low128(*v as u64)),
                ..Default::default()
            },
            Value::Date(v) => {
                scalar(Scalar::Uint32Value((*v - EPOCH_DATE).whole_days() as u32))
            }
            Value::Datetime(v) => scalar(Scalar::Uint32Value(v.unix_timestamp() as u32)),
            Value::Timestamp(v) => {
                scalar(Scalar::Uint64Value((v.unix_timestamp_nanos() / 1000) as u64))
            }
            Value::TzDate(v, tz) => scalar(Scalar::TextValue(format_tz(v, tz, TZ_DATE_FORMAT))),
            Value::TzDatetime(v, tz) => {
                scalar(Scalar::TextValue(format_tz(v, tz, TZ_DATETIME_FORMAT)))
            }
            Value::TzTimestamp(v, tz) => {
                scalar(Scalar::TextValue(format_tz(v, tz, TZ_TIMESTAMP_FORMAT)))
            }
            Value::Interval(v) => scalar(Scalar::Int64Value(*v)),
            Value::Optional { value, .. } => match value {
                Some(inner) => inner.to_proto(),
                None => scalar(Scalar::NullFlagValue(0)),
            },
            Value::List(items) | Value::Tuple(items) => pb::Value {
                items: items.iter().map(Value::to_proto).collect(),
                ..Default::default()
            },
            Value::Struct(fields) => pb::Value {
                items: fields.iter().map(|(_, value)| value.to_proto()).collect(),
                ..Default::default()
            },
            Value::Dict(pairs) => pb::Value {
                pairs: pairs
                    .iter()
                    .map(|(key, payload)| pb::ValuePair {
                        key: Some(key.to_proto()),
                        payload: Some(payload.to_proto()),
                    })
                    .collect(),
                ..Default::default()
            },
            Value::Null => scalar(Scalar::NullFlagValue(0)),
        }
    }

    pub(crate) fn from_proto(ty: &Type, proto: &pb::Value) -> Result<Value, Error> {
        use pb::value::Value as Scalar;
        let expect = |reason: &str| malformed(&format!("expected {reason}"));
        Ok(match ty {
            Type::Bool => match proto.value {
                Some(Scalar::BoolValue(v)) => Value::Bool(v),
                _ => return Err(expect("bool")),
            },
            Type::Int8 => match proto.value {
                Some(Scalar::Int32Value(v)) => Value::Int8(v as i8),
                _ => return Err(expect("int8")),
            },
            Type::Uint8 => match proto.value {
                Some(Scalar::Uint32Value(v)) => Value::Uint8(v as u8),
                _ => return Err(expect("uint8")),
            },
            Type::Int16 => match proto.value {
                Some(Scalar::Int32Value(v)) => Value::Int16(v as i16),
                _ => return Err(expect("int16")),
            },
            Type::Uint16 => match proto.value {
                Some(Scalar::Uint32Value(v)) => Value::Uint16(v as u16),
                _ => return Err(expect("uint16")),
            },
            Type::Int32 => match proto.value {
                Some(Scalar::Int32Value(v)) => Value::Int32(v),
                _ => return Err(expect("int32")),
            },
            Type::Uint32 => match proto.value {
                Some(Scalar::Uint32Value(v)) => Value::Uint32(v),
                _ => return Err(expect("uint32")),
            },
            Type::Int64 => match proto.value {
                Some(Scalar::Int64Value(v)) => Value::Int64(v),
                _ => return Err(expect("int64")),
            },
            Type::Uint64 => match proto.value {
                Some(Scalar::Uint64Value(v)) => Value::Uint64(v),
                _ => return Err(expect("uint64")),
            },
            Type::Float => match proto.value {
                Some(Scalar::FloatValue(v)) => Value::Float(v),
                _ => return Err(expect("float")),
            },
            Type::Double => match proto.value {
                Some(Scalar::DoubleValue(v)) => Value::Double(v),
                _ => return Err(expect("double")),
            },
            Type::Bytes => match &proto.value {
                Some(Scalar::BytesValue(v)) => Value::Bytes(v.clone()),
                _ => return Err(expect("bytes")),
            },
            Type::Text => match &proto.value {
                Some(Scalar::TextValue(v)) => Value::Text(v.clone()),
                _ => return Err(expect("text")),
            },
            Type::Json => match &proto.value {
                Some(Scalar::TextValue(v)) => Value::Json(v.clone()),
                _ => return Err(expect("json")),
            },
            Type::JsonDocument => match &proto.value {
                Some(Scalar::TextValue(v)) => Value::JsonDocument(v.clone()),
                _ => return Err(expect("json document")),
            },
            Type::Yson => match &proto.value {
                Some(Scalar::BytesValue(v)) => Value::Yson(v.clone()),
                _ => return Err(expect("yson")),
            },
            Type::Uuid => match proto.value {
                Some(Scalar::Low128(low)) => {
                    Value::Uuid(((proto.high_128 as u128) << 64) | low as u128)
                }
                _ => return Err(expect("uuid")),
            },
            Type::Date => match proto.value {
                Some(Scalar::Uint32Value(days)) => Value::Date(
                    EPOCH_DATE
                        .checked_add(time::Duration::days(days as i64))
                        .ok_or_else(|| malformed("date out of range"))?,
                ),
                _ => return Err(expect("date")),
            },
            Type::Datetime => match proto.value {
                Some(Scalar::Uint32Value(seconds)) => Value::Datetime(
                    OffsetDateTime::from_unix_timestamp(seconds as i64)
                        .map_err(|_| malformed("datetime out of range"))?,
                ),
                _ => return Err(expect("datetime")),
            },
            Type::Timestamp => match proto.value {
                Some(Scalar::Uint64Value(micros)) => Value::Timestamp(
                    OffsetDateTime::from_unix_timestamp_nanos(micros as i128 * 1000)
                        .map_err(|_| malformed("timestamp out of range"))?,
                ),
                _ => return Err(expect("timestamp")),
            },
            Type::TzDate => match &proto.value {
                Some(Scalar::TextValue(text)) => {
                    let (datetime, tz) = parse_tz(text, TZ_DATE_FORMAT, true)?;
                    Value::TzDate(datetime, tz)
                }
                _ => return Err(expect("tz date")),
            },
            Type::TzDatetime => match &proto.value {
                Some(Scalar::TextValue(text)) => {
                    let (datetime, tz) = parse_tz(text, TZ_DATETIME_FORMAT, false)?;
                    Value::TzDatetime(datetime, tz)
                }
                _ => return Err(expect("tz datetime")),
            },
            Type::TzTimestamp => match &proto.value {
                Some(Scalar::TextValue(text)) => {
                    let (datetime, tz) = parse_tz(text, TZ_TIMESTAMP_FORMAT, false)?;
                    Value::TzTimestamp(datetime, tz)
                }
                _ => return Err(expect("tz timestamp")),
            },
            Type::Interval => match proto.value {
                Some(Scalar::Int64Value(v)) => Value::Interval(v),
                _ => return Err(expect("interval")),
            },
            Type::Optional(item) => match &proto.value {
                Some(Scalar::NullFlagValue(_)) => Value::Optional {
                    item: item.clone(),
                    value: None,
                },
                Some(Scalar::NestedValue(nested)) => Value::Optional {
                    item: item.clone(),
                    value: Some(Box::new(Value::from_proto(item, nested)?)),
                },
                // the server may flatten a non-null optional
                _ => Value::Optional {
                    item: item.clone(),
                    value: Some(Box::new(Value::from_proto(item, proto)?)),
                },
            },
            Type::List(item) => Value::List(
                proto
                    .items
                    .iter()
                    .map(|v| Value::from_proto(item, v))
                    .collect::<Result<_, _>>()?,
            ),
            Type::Tuple(elements) => {
                if elements.len() != proto.items.len() {
                    return Err(malformed("tuple arity mismatch"));
                }
                Value::Tuple(
                    elements
                        .iter()
                        .zip(proto.items.iter())
                        .map(|(ty, v)| Value::from_proto(ty, v))
                        .collect::<Result<_, _>>()?,
                )
            }
            Type::Struct(members) => {
                if members.len() != proto.items.len() {
                    return Err(malformed("struct arity mismatch"));
                }
                Value::Struct(
                    members
                        .iter()
                        .zip(proto.items.iter())
                        .map(|((name, ty), v)| Ok((name.clone(), Value::from_proto(ty, v)?)))
                        .collect::<Result<_, Error>>()?,
                )
            }
            Type::Dict(key, payload) => Value::Dict(
                proto
                    .pairs
                    .iter()
                    .map(|pair| {
                        let k = pair.key.as_ref().ok_or_else(|| malformed("dict pair without key"))?;
                        let v = pair
                            .payload
                            .as_ref()
                            .ok_or_else(|| malformed("dict pair without payload"))?;
                        Ok((Value::from_proto(key, k)?, Value::from_proto(payload, v)?))
                    })
                    .collect::<Result<_, Error>>()?,
            ),
            Type::Void => Value::Null,
        })
    }
}

/// Conversion of native values into the typed tree, mirroring the type
/// inference of the original client: booleans to Bool, i32 to Int32, i64 to
/// Int64, f64 to Double, strings to Text, byte slices to Bytes, dates to
/// Datetime, maps to Dict, sequences to List.
pub trait ToValue {
    fn to_value(&self) -> Value;
    fn value_type() -> Type
    where
        Self: Sized;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
    fn value_type() -> Type {
        Type::Void
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
    fn value_type() -> Type {
        Type::Bool
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int32(*self)
    }
    fn value_type() -> Type {
        Type::Int32
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int64(*self)
    }
    fn value_type() -> Type {
        Type::Int64
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
    fn value_type() -> Type {
        Type::Float
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
    fn value_type() -> Type {
        Type::Double
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
    fn value_type() -> Type {
        Type::Text
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
    fn value_type() -> Type {
        Type::Text
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
    fn value_type() -> Type {
        Type::Bytes
    }
}

impl ToValue for &[u8] {
    fn to_value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }
    fn value_type() -> Type {
        Type::Bytes
    }
}

impl ToValue for u128 {
    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }
    fn value_type() -> Type {
        Type::Uuid
    }
}

impl ToValue for Date {
    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
    fn value_type() -> Type {
        Type::Date
    }
}

impl ToValue for OffsetDateTime {
    fn to_value(&self) -> Value {
        Value::Datetime(*self)
    }
    fn value_type() -> Type {
        Type::Datetime
    }
}

impl<T> ToValue for Option<T>
where
    T: ToValue,
{
    fn to_value(&self) -> Value {
        match self {
            Some(v) => Value::Optional {
                item: Box::new(T::value_type()),
                value: Some(Box::new(v.to_value())),
            },
            None => Value::optional_none(T::value_type()),
        }
    }
    fn value_type() -> Type {
        Type::Optional(Box::new(T::value_type()))
    }
}

impl<T> ToValue for Vec<T>
where
    T: ToValue,
{
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
    fn value_type() -> Type {
        Type::List(Box::new(T::value_type()))
    }
}

impl<T> ToValue for &[T]
where
    T: ToValue,
{
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
    fn value_type() -> Type {
        Type::List(Box::new(T::value_type()))
    }
}

impl<K, V> ToValue for HashMap<K, V>
where
    K: ToValue,
    V: ToValue,
{
    fn to_value(&self) -> Value {
        Value::Dict(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
    fn value_type() -> Type {
        Type::Dict(Box::new(K::value_type()), Box::new(V::value_type()))
    }
}

/// Decoding of typed values back into native forms.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, Error>;
}

fn unexpected(expected: &str, got: &Value) -> Error {
    ClientError::MalformedResult(format!("expected {expected}, got {got:?}")).into()
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value)
    }
}

macro_rules! from_value_scalar {
    ($native:ty, $variant:ident, $expected:literal) => {
        impl FromValue for $native {
            fn from_value(value: Value) -> Result<Self, Error> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(unexpected($expected, &other)),
                }
            }
        }
    };
}

from_value_scalar!(bool, Bool, "Bool");
from_value_scalar!(i8, Int8, "Int8");
from_value_scalar!(u8, Uint8, "Uint8");
from_value_scalar!(i16, Int16, "Int16");
from_value_scalar!(u16, Uint16, "Uint16");
from_value_scalar!(i32, Int32, "Int32");
from_value_scalar!(u32, Uint32, "Uint32");
from_value_scalar!(f32, Float, "Float");
from_value_scalar!(f64, Double, "Double");
from_value_scalar!(u128, Uuid, "Uuid");
from_value_scalar!(Date, Date, "Date");

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Int64(v) | Value::Interval(v) => Ok(v),
            other => Err(unexpected("Int64", &other)),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Uint64(v) => Ok(v),
            other => Err(unexpected("Uint64", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Text(v) | Value::Json(v) | Value::JsonDocument(v) => Ok(v),
            other => Err(unexpected("Text", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Bytes(v) | Value::Yson(v) => Ok(v),
            other => Err(unexpected("Bytes", &other)),
        }
    }
}

impl FromValue for OffsetDateTime {
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Datetime(v) | Value::Timestamp(v) => Ok(v),
            Value::TzDate(v, _) | Value::TzDatetime(v, _) | Value::TzTimestamp(v, _) => Ok(v),
            other => Err(unexpected("Datetime", &other)),
        }
    }
}

impl<T> FromValue for Option<T>
where
    T: FromValue,
{
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Optional { value: None, .. } | Value::Null => Ok(None),
            Value::Optional {
                value: Some(inner), ..
            } => Ok(Some(T::from_value(*inner)?)),
            other => Ok(Some(T::from_value(other)?)),
        }
    }
}

impl<T> FromValue for Vec<T>
where
    T: FromValue,
{
    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::List(items) | Value::Tuple(items) => {
                items.into_iter().map(T::from_value).collect()
            }
            other => Err(unexpected("List", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn roundtrip(value: Value) {
        let ty = value.r#type();
        let proto = value.to_proto();
        let decoded = Value::from_proto(&ty, &proto).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_scalar_roundtrip() {
        roundtrip(Value::Bool(true));
        roundtrip(Value::Int8(-4));
        roundtrip(Value::Uint8(200));
        roundtrip(Value::Int32(-42));
        roundtrip(Value::Uint32(42));
        roundtrip(Value::Int64(i64::MIN));
        roundtrip(Value::Uint64(u64::MAX));
        roundtrip(Value::Float(1.5));
        roundtrip(Value::Double(-2.25));
        roundtrip(Value::Bytes(vec![0, 1, 2]));
        roundtrip(Value::Text("hello".to_string()));
        roundtrip(Value::Json("{\"a\":1}".to_string()));
        roundtrip(Value::Interval(123_456));
    }

    #[test]
    fn test_uuid_halves() {
        let value = Value::Uuid(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        let proto = value.to_proto();
        assert_eq!(proto.high_128, 0x0123_4567_89ab_cdef);
        assert!(matches!(
            proto.value,
            Some(pb::value::Value::Low128(0xfedc_ba98_7654_3210))
        ));
        roundtrip(value);
    }

    #[test]
    fn test_temporal_encoding() {
        let date = Value::Date(date!(1970 - 01 - 11));
        assert!(matches!(
            date.to_proto().value,
            Some(pb::value::Value::Uint32Value(10))
        ));
        roundtrip(date);

        let datetime = Value::Datetime(datetime!(1970-01-01 00:01:40 UTC));
        assert!(matches!(
            datetime.to_proto().value,
            Some(pb::value::Value::Uint32Value(100))
        ));
        roundtrip(datetime);

        let timestamp = Value::Timestamp(datetime!(1970-01-01 00:00:01.000002 UTC));
        assert!(matches!(
            timestamp.to_proto().value,
            Some(pb::value::Value::Uint64Value(1_000_002))
        ));
        roundtrip(timestamp);
    }

    #[test]
    fn test_tz_datetime_format() {
        let value = Value::TzDatetime(
            datetime!(2024-03-01 12:30:45 UTC),
            "Europe/Berlin".to_string(),
        );
        match value.to_proto().value {
            Some(pb::value::Value::TextValue(text)) => {
                assert_eq!(text, "2024-03-01T12:30:45,Europe/Berlin")
            }
            other => panic!("unexpected encoding {other:?}"),
        }
        roundtrip(value);
    }

    #[test]
    fn test_optional_roundtrip() {
        roundtrip(Value::optional(Value::Int32(5)));
        roundtrip(Value::optional_none(Type::Text));
    }

    #[test]
    fn test_container_roundtrip() {
        roundtrip(Value::List(vec![
            Value::Int32(1),
            Value::Int32(2),
            Value::Int32(3),
        ]));
        roundtrip(Value::Tuple(vec![Value::Bool(true), Value::Text("x".to_string())]));
        roundtrip(Value::Struct(vec![
            ("id".to_string(), Value::Int64(7)),
            ("name".to_string(), Value::Text("seven".to_string())),
        ]));
        roundtrip(Value::Dict(vec![(
            Value::Text("k".to_string()),
            Value::Int32(1),
        )]));
    }

    #[test]
    fn test_inference() {
        assert_eq!(true.to_value(), Value::Bool(true));
        assert_eq!(123i32.to_value(), Value::Int32(123));
        assert_eq!(123i64.to_value(), Value::Int64(123));
        assert_eq!(1.5f64.to_value(), Value::Double(1.5));
        assert_eq!("hello".to_value(), Value::Text("hello".to_string()));
        assert_eq!(vec![1u8, 2u8].to_value(), Value::Bytes(vec![1, 2]));
        assert_eq!(
            vec![1i32, 2i32].to_value(),
            Value::List(vec![Value::Int32(1), Value::Int32(2)])
        );
        assert_eq!(
            Some(5i32).to_value(),
            Value::optional(Value::Int32(5))
        );
        assert_eq!(
            Option::<i32>::None.to_value(),
            Value::optional_none(Type::Int32)
        );
    }

    #[test]
    fn test_native_roundtrip_law() {
        assert_eq!(i32::from_value(123i32.to_value()).unwrap(), 123);
        assert_eq!(bool::from_value(true.to_value()).unwrap(), true);
        assert_eq!(
            String::from_value("hi".to_value()).unwrap(),
            "hi".to_string()
        );
        assert_eq!(
            Vec::<i32>::from_value(vec![1i32, 2i32].to_value()).unwrap(),
            vec![1, 2]
        );
        assert_eq!(Option::<i32>::from_value(Some(1i32).to_value()).unwrap(), Some(1));
        assert_eq!(Option::<i32>::from_value(Option::<i32>::None.to_value()).unwrap(), None);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let err = Value::from_proto(&Type::Bool, &Value::Int32(1).to_proto());
        assert!(err.is_err());
    }
}
