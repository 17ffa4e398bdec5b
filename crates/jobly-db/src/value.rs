//! Scalar values bound to statement parameters and read back from result columns.
//!
//! [`SqlValue`] is the single value type that flows through the compilers: partial
//! update requests carry it, compiled clauses hand it to the executor, and
//! [`Record`](crate::Record) columns are decoded into it.
//!
//! Binding is type-directed: the same `SqlValue::Int(10)` is encoded as `int4` for an
//! `integer` column and as `numeric` for a `numeric` column, so callers never need to
//! know the physical column type of the field they update.

use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};

/// A dynamically typed SQL scalar.
///
/// Deserializes from any JSON scalar: `null`, booleans, integers, floats and strings.
/// Integers beyond `i64` become an exact `Numeric` instead of a lossy `Float`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
}

impl SqlValue {
    /// Short type name used in decode error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Numeric(_) => "numeric",
            Self::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Numeric(d) => write!(f, "{d}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

struct SqlValueVisitor;

impl<'de> Visitor<'de> for SqlValueVisitor {
    type Value = SqlValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, a number or a string")
    }

    fn visit_unit<E: de::Error>(self) -> Result<SqlValue, E> {
        Ok(SqlValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<SqlValue, E> {
        Ok(SqlValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<SqlValue, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<SqlValue, E> {
        Ok(SqlValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SqlValue, E> {
        Ok(SqlValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SqlValue, E> {
        Ok(i64::try_from(v).map_or_else(|_| SqlValue::Numeric(Decimal::from(v)), SqlValue::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<SqlValue, E> {
        Ok(SqlValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SqlValue, E> {
        Ok(SqlValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<SqlValue, E> {
        Ok(SqlValue::Text(v))
    }
}

impl<'de> Deserialize<'de> for SqlValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SqlValueVisitor)
    }
}

// ─── Conversions into SqlValue ──────────────────────────────────────────────

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        Self::Numeric(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ─── ToSql / FromSql ────────────────────────────────────────────────────────

fn mismatch(value: &SqlValue, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {} value to parameter of type {}", value.kind(), ty).into()
}

/// A float is accepted by an integer parameter only when it is a whole number in range.
fn whole_float<T: TryFrom<i64>>(v: f64, ty: &Type) -> Result<T, Box<dyn Error + Sync + Send>> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if !v.is_finite() || v.fract() != 0.0 || v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return Err(format!("{v} is not a whole number in range for {ty}").into());
    }
    T::try_from(v as i64).map_err(|_| format!("{v} is out of range for {ty}").into())
}

fn whole_numeric<T: TryFrom<i64>>(
    d: &Decimal,
    ty: &Type,
) -> Result<T, Box<dyn Error + Sync + Send>> {
    d.fract()
        .is_zero()
        .then(|| d.to_i64())
        .flatten()
        .and_then(|i| T::try_from(i).ok())
        .ok_or_else(|| format!("{d} is not a whole number in range for {ty}").into())
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(b) => b.to_sql_checked(ty, out),
            Self::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Self::Float(v) => match *ty {
                Type::INT2 => whole_float::<i16>(*v, ty)?.to_sql(ty, out),
                Type::INT4 => whole_float::<i32>(*v, ty)?.to_sql(ty, out),
                Type::INT8 => whole_float::<i64>(*v, ty)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => v.to_sql(ty, out),
                Type::NUMERIC => Decimal::from_f64(*v)
                    .ok_or_else(|| format!("{v} is not representable as numeric"))?
                    .to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Self::Numeric(d) => match *ty {
                Type::NUMERIC => d.to_sql(ty, out),
                Type::INT2 => whole_numeric::<i16>(d, ty)?.to_sql(ty, out),
                Type::INT4 => whole_numeric::<i32>(d, ty)?.to_sql(ty, out),
                Type::INT8 => whole_numeric::<i64>(d, ty)?.to_sql(ty, out),
                Type::FLOAT4 => d
                    .to_f32()
                    .ok_or_else(|| format!("{d} is not representable as real"))?
                    .to_sql(ty, out),
                Type::FLOAT8 => d
                    .to_f64()
                    .ok_or_else(|| format!("{d} is not representable as double"))?
                    .to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Self::Text(s) => s.to_sql_checked(ty, out),
        }
    }

    // Compatibility is decided per value in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl<'a> FromSql<'a> for SqlValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        match *ty {
            Type::BOOL => Ok(Self::Bool(bool::from_sql(ty, raw)?)),
            Type::INT2 => Ok(Self::Int(i16::from_sql(ty, raw)?.into())),
            Type::INT4 => Ok(Self::Int(i32::from_sql(ty, raw)?.into())),
            Type::INT8 => Ok(Self::Int(i64::from_sql(ty, raw)?)),
            Type::FLOAT4 => Ok(Self::Float(f32::from_sql(ty, raw)?.into())),
            Type::FLOAT8 => Ok(Self::Float(f64::from_sql(ty, raw)?)),
            Type::NUMERIC => Ok(Self::Numeric(Decimal::from_sql(ty, raw)?)),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                Ok(Self::Text(String::from_sql(ty, raw)?))
            }
            _ => Err(format!("unsupported column type: {ty}").into()),
        }
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Self::Null)
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::NUMERIC
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
        )
    }
}

// ─── Typed extraction ───────────────────────────────────────────────────────

/// Conversion from a decoded [`SqlValue`] into a Rust type.
///
/// Used by [`Record::try_get_column`](crate::Record::try_get_column). The error string
/// is wrapped into [`DbError::Decode`](crate::DbError::Decode) by the caller.
pub trait FromValue: Sized {
    fn from_value(value: &SqlValue) -> Result<Self, String>;
}

fn unexpected(expected: &str, value: &SqlValue) -> String {
    format!("expected {expected}, got {}", value.kind())
}

impl FromValue for SqlValue {
    fn from_value(value: &SqlValue) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            other => Err(unexpected("boolean", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Int(i) => Ok(*i),
            other => Err(unexpected("integer", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &SqlValue) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| format!("integer {wide} out of range for i32"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Float(v) => Ok(*v),
            SqlValue::Int(i) => Ok(*i as f64),
            SqlValue::Numeric(d) => d
                .to_f64()
                .ok_or_else(|| format!("numeric {d} out of range for f64")),
            other => Err(unexpected("number", other)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Numeric(d) => Ok(*d),
            SqlValue::Int(i) => Ok(Decimal::from(*i)),
            SqlValue::Float(v) => {
                Decimal::from_f64(*v).ok_or_else(|| format!("float {v} out of range for numeric"))
            }
            other => Err(unexpected("numeric", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(unexpected("text", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
