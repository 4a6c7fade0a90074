//! Return type descriptors.
//!
//! Call adapters are selected by the declared return type of a service
//! method. Rust has no runtime generics, so each return type describes itself
//! through [`DescribeType`] as a [`TypeDescriptor`] such as `Call<Int>` or
//! `List<Hero>`.

use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// Structural description of a declared type: a name plus type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: Cow<'static, str>,
    arguments: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Creates a descriptor for a non-generic type.
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Creates a descriptor for a generic type such as `Call<Int>`.
    #[must_use]
    pub fn parameterized(
        name: impl Into<Cow<'static, str>>,
        arguments: impl IntoIterator<Item = TypeDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into_iter().collect(),
        }
    }

    /// Returns the raw (outer) type name, e.g. `Call` for `Call<Int>`.
    #[must_use]
    pub fn raw_name(&self) -> &str {
        &self.name
    }

    /// Returns the type arguments.
    #[must_use]
    pub fn arguments(&self) -> &[TypeDescriptor] {
        &self.arguments
    }

    /// Returns whether the raw name matches and exactly one argument is present.
    #[must_use]
    pub fn is_wrapper(&self, raw_name: &str) -> bool {
        self.name == raw_name && self.arguments.len() == 1
    }

    /// Returns the single type argument of a wrapper type.
    #[must_use]
    pub fn inner(&self) -> Option<&TypeDescriptor> {
        match self.arguments.as_slice() {
            [inner] => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some((first, rest)) = self.arguments.split_first() {
            write!(f, "<{first}")?;
            for arg in rest {
                write!(f, ", {arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Types that can describe themselves as a [`TypeDescriptor`].
///
/// User-defined result types opt in with an empty impl, which describes the
/// type by its unqualified Rust name:
///
/// ```
/// use retroapollo::{DescribeType, TypeDescriptor};
///
/// struct Hero;
/// impl DescribeType for Hero {}
///
/// assert_eq!(Hero::describe(), TypeDescriptor::named("Hero"));
/// ```
pub trait DescribeType {
    /// Returns the descriptor for this type.
    fn describe() -> TypeDescriptor {
        TypeDescriptor::named(short_type_name(std::any::type_name::<Self>()))
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

macro_rules! describe_scalar {
    ($graphql:literal => $($ty:ty),+ $(,)?) => {
        $(
            impl DescribeType for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::named($graphql)
                }
            }
        )+
    };
}

describe_scalar!("Int" => i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);
describe_scalar!("Float" => f32, f64);
describe_scalar!("Boolean" => bool);
describe_scalar!("String" => String, &str);
describe_scalar!("JSON" => serde_json::Value);
describe_scalar!("Unit" => ());

impl<T: DescribeType> DescribeType for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("Option", [T::describe()])
    }
}

impl<T: DescribeType> DescribeType for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("List", [T::describe()])
    }
}

/// Raw name of the wrapper claimed by the built-in call adapter.
pub const CALL_TYPE_NAME: &str = "Call";

/// Result wrapper handled by the built-in call adapter.
///
/// Declaring a method as returning `Call<T>` routes it through the default
/// adapter, which executes the operation synchronously and hands back the
/// raw result decoded as `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Call<T>(pub T);

impl<T> Call<T> {
    /// Unwraps the response.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Call<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Call<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: DescribeType> DescribeType for Call<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized(CALL_TYPE_NAME, [T::describe()])
    }
}
