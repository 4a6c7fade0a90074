//! The `graphql_service!` macro.

/// Declares a typed GraphQL service facade.
///
/// Each method is declared with its operation keyword (`query` or
/// `mutation`), its parameters (each bound to the GraphQL variable of the same
/// name), its return type and the operation document. The macro generates a
/// struct wrapping a [`ServiceProxy`](crate::ServiceProxy), one inherent
/// method per operation returning [`Result<T>`](crate::Result), and a
/// [`GraphQLService`](crate::GraphQLService) impl describing the interface.
///
/// ```
/// use retroapollo::{Call, DescribeType, graphql_service};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// pub struct Hero {
///     pub name: String,
/// }
///
/// impl DescribeType for Hero {}
///
/// graphql_service! {
///     /// Star Wars API.
///     pub struct StarWarsApi {
///         /// Fetches the hero of an episode.
///         query fn hero(episode: String) -> Call<Hero> =
///             "query Hero($episode: Episode) { hero(episode: $episode) { name } }";
///
///         mutation fn rate(stars: i32) -> i32 =
///             "mutation Rate($stars: Int!) { rate(stars: $stars) }";
///     }
/// }
/// ```
#[macro_export]
macro_rules! graphql_service {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$attr:meta])*
                $kind:ident fn $method:ident($($arg:ident : $arg_ty:ty),* $(,)?) -> $ret:ty = $document:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        $vis struct $name {
            proxy: $crate::ServiceProxy,
        }

        impl $name {
            $(
                $(#[$attr])*
                pub fn $method(&self, $($arg: $arg_ty),*) -> $crate::Result<$ret> {
                    let args: ::std::vec::Vec<$crate::__private::serde_json::Value> =
                        ::std::vec![$($crate::__private::serde_json::to_value(&$arg)?),*];
                    self.proxy.call(::std::stringify!($method), args)
                }
            )*
        }

        impl $crate::GraphQLService for $name {
            fn descriptor() -> $crate::ServiceDescriptor {
                $crate::ServiceDescriptor::new(::std::stringify!($name))
                    .with_path(::std::concat!(::std::module_path!(), "::", ::std::stringify!($name)))
                $(
                    .method(
                        $crate::MethodDescriptor::new(
                            ::std::stringify!($method),
                            <$ret as $crate::DescribeType>::describe(),
                        )
                        $(.param($crate::ParamDescriptor::of::<$arg_ty>(::std::stringify!($arg))))*
                        .operation($crate::OperationMeta::new(::std::stringify!($kind), $document)),
                    )
                )*
            }

            fn from_proxy(proxy: $crate::ServiceProxy) -> Self {
                Self { proxy }
            }

            fn proxy(&self) -> &$crate::ServiceProxy {
                &self.proxy
            }
        }
    };
}
