//! Parameter Kinds
//!
//! A [`Kind`] is the semantic type of one entry-point parameter. The ordered
//! list of kinds is the parameter signature the invoker binds against.
//!
//! Kinds drive best-effort coercion of untyped JSON before the typed
//! `serde_json` conversion runs, so `"5"` binds to an integer parameter and
//! `2.9` binds to `2`.
//!
//! Scalars, strings, tuples, arrays and the std collections are parameter
//! types out of the box. A user type that implements `Deserialize` and
//! `Default` becomes one with [`param!`](crate::param):
//!
//! ```ignore
//! #[derive(Deserialize, Default)]
//! struct Point { x: i64, y: i64 }
//!
//! casebench::param!(Point);
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;
use std::fmt;

/// Semantic type of an entry-point parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// `true` / `false`
    Bool,
    /// Signed integer
    Int,
    /// Unsigned integer
    UInt,
    /// Floating point number
    Float,
    /// Text
    Str,
    /// Single character
    Char,
    /// Ordered sequence of one element kind
    Seq(Box<Kind>),
    /// String-keyed mapping of one value kind
    Map(Box<Kind>),
    /// Value that may be `null`
    Optional(Box<Kind>),
    /// Fixed-length heterogeneous sequence
    Tuple(Vec<Kind>),
    /// User type registered with `param!`, bound by its own `Deserialize`
    Named(&'static str),
    /// Any JSON value, passed through untouched
    Any,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => f.write_str("bool"),
            Kind::Int => f.write_str("int"),
            Kind::UInt => f.write_str("uint"),
            Kind::Float => f.write_str("float"),
            Kind::Str => f.write_str("str"),
            Kind::Char => f.write_str("char"),
            Kind::Seq(inner) => write!(f, "seq<{inner}>"),
            Kind::Map(inner) => write!(f, "map<str, {inner}>"),
            Kind::Optional(inner) => write!(f, "optional<{inner}>"),
            Kind::Tuple(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "tuple<{}>", items.join(", "))
            }
            Kind::Named(name) => f.write_str(name),
            Kind::Any => f.write_str("any"),
        }
    }
}

/// A Rust type usable as an entry-point parameter.
///
/// Every parameter type has a zero value (`Default`) for slots the testcase
/// input leaves unfilled, and can be built from JSON (`DeserializeOwned`).
pub trait Param: DeserializeOwned + Default {
    /// Semantic kind reported in the parameter signature
    fn kind() -> Kind;
}

macro_rules! impl_param {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Param for $ty {
                fn kind() -> Kind {
                    $kind
                }
            }
        )+
    };
}

impl_param!(Kind::Bool => bool);
impl_param!(Kind::Int => i8, i16, i32, i64, i128, isize);
impl_param!(Kind::UInt => u8, u16, u32, u64, u128, usize);
impl_param!(Kind::Float => f32, f64);
impl_param!(Kind::Str => String);
impl_param!(Kind::Char => char);
impl_param!(Kind::Any => Value);

impl<T: Param> Param for Vec<T> {
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }
}

impl<T: Param> Param for VecDeque<T> {
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }
}

impl<T: Param> Param for LinkedList<T> {
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }
}

impl<T: Param + Eq + Hash> Param for HashSet<T> {
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }
}

impl<T: Param + Ord> Param for BTreeSet<T> {
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }
}

// serde and Default only cover arrays up to 32 elements
impl<T: Param, const N: usize> Param for [T; N]
where
    [T; N]: DeserializeOwned + Default,
{
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }
}

impl<T: Param> Param for Box<T> {
    fn kind() -> Kind {
        T::kind()
    }
}

impl<T: Param> Param for Option<T> {
    fn kind() -> Kind {
        Kind::Optional(Box::new(T::kind()))
    }
}

impl<T: Param> Param for HashMap<String, T> {
    fn kind() -> Kind {
        Kind::Map(Box::new(T::kind()))
    }
}

impl<T: Param> Param for BTreeMap<String, T> {
    fn kind() -> Kind {
        Kind::Map(Box::new(T::kind()))
    }
}

macro_rules! impl_tuple_param {
    ($($name:ident),+) => {
        impl<$($name: Param),+> Param for ($($name,)+) {
            fn kind() -> Kind {
                Kind::Tuple(vec![$($name::kind()),+])
            }
        }
    };
}

impl_tuple_param!(A);
impl_tuple_param!(A, B);
impl_tuple_param!(A, B, C);
impl_tuple_param!(A, B, C, D);

/// Make user types usable as entry-point parameters.
///
/// Each type must implement `serde::Deserialize` and `Default`. Its JSON is
/// handed to `Deserialize` as-is, without coercion.
#[macro_export]
macro_rules! param {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Param for $ty {
                fn kind() -> $crate::Kind {
                    $crate::Kind::Named(::core::stringify!($ty))
                }
            }
        )+
    };
}

/// Coerce a JSON value toward `kind`.
///
/// Conversions that cannot apply leave the value unchanged; the typed
/// conversion afterwards reports the mismatch.
pub fn coerce(value: Value, kind: &Kind) -> Value {
    match kind {
        Kind::Int | Kind::UInt => coerce_integer(value),
        Kind::Float => coerce_float(value),
        Kind::Str | Kind::Char => match value {
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other,
        },
        Kind::Bool => match value {
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Value::Bool(true),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Value::Bool(false),
            Value::Number(n) if n.as_u64() == Some(0) => Value::Bool(false),
            Value::Number(n) if n.as_u64() == Some(1) => Value::Bool(true),
            other => other,
        },
        Kind::Seq(inner) => match value {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| coerce(v, inner)).collect())
            }
            other => other,
        },
        Kind::Map(inner) => match value {
            Value::Object(members) => Value::Object(
                members
                    .into_iter()
                    .map(|(k, v)| (k, coerce(v, inner)))
                    .collect(),
            ),
            other => other,
        },
        Kind::Optional(inner) => match value {
            Value::Null => Value::Null,
            other => coerce(other, inner),
        },
        Kind::Tuple(kinds) => match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| match kinds.get(i) {
                        Some(kind) => coerce(v, kind),
                        None => v,
                    })
                    .collect(),
            ),
            other => other,
        },
        Kind::Named(_) | Kind::Any => value,
    }
}

fn coerce_integer(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Value::Number(n),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => Value::from(f.trunc() as i64),
            _ => Value::Number(n),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Value::from(i)
            } else if let Ok(u) = trimmed.parse::<u64>() {
                Value::from(u)
            } else if let Ok(f) = trimmed.parse::<f64>() {
                if f.is_finite() {
                    Value::from(f.trunc() as i64)
                } else {
                    Value::String(s)
                }
            } else {
                Value::String(s)
            }
        }
        Value::Bool(b) => Value::from(b as i64),
        other => other,
    }
}

fn coerce_float(value: Value) -> Value {
    match value {
        Value::String(s) => match s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Value::Number(n),
            None => Value::String(s),
        },
        Value::Bool(b) => Value::from(if b { 1.0 } else { 0.0 }),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_display() {
        assert_eq!(<Vec<Vec<i64>>>::kind().to_string(), "seq<seq<int>>");
        assert_eq!(<HashMap<String, u8>>::kind().to_string(), "map<str, uint>");
        assert_eq!(<Option<String>>::kind().to_string(), "optional<str>");
        assert_eq!(Value::kind().to_string(), "any");
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce(json!(2.9), &Kind::Int), json!(2));
        assert_eq!(coerce(json!(-2.9), &Kind::Int), json!(-2));
        assert_eq!(coerce(json!(" 42 "), &Kind::Int), json!(42));
        assert_eq!(coerce(json!("7.5"), &Kind::UInt), json!(7));
        assert_eq!(coerce(json!(true), &Kind::Int), json!(1));
        // Unparseable text is left for the typed conversion to reject
        assert_eq!(coerce(json!("abc"), &Kind::Int), json!("abc"));
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(coerce(json!("1.25"), &Kind::Float), json!(1.25));
        assert_eq!(coerce(json!(12), &Kind::Str), json!("12"));
        assert_eq!(coerce(json!(false), &Kind::Str), json!("false"));
        assert_eq!(coerce(json!("TRUE"), &Kind::Bool), json!(true));
        assert_eq!(coerce(json!(0), &Kind::Bool), json!(false));
    }

    #[test]
    fn test_coerce_nested() {
        let kind = <Vec<Option<i32>>>::kind();
        assert_eq!(coerce(json!(["1", null, 3.7]), &kind), json!([1, null, 3]));

        let kind = <BTreeMap<String, String>>::kind();
        assert_eq!(
            coerce(json!({"a": 1, "b": "x"}), &kind),
            json!({"a": "1", "b": "x"})
        );
    }

    #[test]
    fn test_std_type_kinds() {
        assert_eq!(<(i64, String)>::kind().to_string(), "tuple<int, str>");
        assert_eq!(<[u8; 3]>::kind(), Kind::Seq(Box::new(Kind::UInt)));
        assert_eq!(<HashSet<i32>>::kind().to_string(), "seq<int>");
        assert_eq!(<VecDeque<char>>::kind().to_string(), "seq<char>");
        assert_eq!(<Box<f64>>::kind(), Kind::Float);
        assert_eq!(i128::kind(), Kind::Int);
    }

    #[derive(serde::Deserialize, Default)]
    struct Point {
        x: i64,
        y: i64,
    }

    crate::param!(Point);

    #[test]
    fn test_registered_user_type() {
        assert_eq!(Point::kind(), Kind::Named("Point"));
        assert_eq!(Point::kind().to_string(), "Point");
        let v = json!({"x": 1, "y": "2"});
        assert_eq!(coerce(v.clone(), &Point::kind()), v);
        let p: Point = serde_json::from_value(json!({"x": 1, "y": 2})).unwrap();
        assert_eq!((p.x, p.y), (1, 2));
    }

    #[test]
    fn test_coerce_tuple_per_position() {
        let kind = <(i64, String, bool)>::kind();
        assert_eq!(
            coerce(json!(["4", 5, "true", "extra"]), &kind),
            json!([4, "5", true, "extra"])
        );
        assert_eq!(coerce(json!(7), &Kind::Char), json!("7"));
    }

    #[test]
    fn test_any_passes_through() {
        let v = json!({"deep": [1, "two", {"three": 3.0}]});
        assert_eq!(coerce(v.clone(), &Kind::Any), v);
    }
}
