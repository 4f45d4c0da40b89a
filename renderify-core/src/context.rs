use std::{
    any::{type_name, TypeId},
    marker::PhantomData,
};

/// Allows accessing a context value
pub struct ContextKey<T> {
    id: TypeId,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> PartialEq for ContextKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ContextKey<T> {}

impl<T> std::fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

impl<T: 'static> ContextKey<T> {
    #[doc(hidden)]
    pub fn from_raw(id: TypeId, name: &'static str) -> Self {
        Self {
            id,
            name,
            _marker: PhantomData,
        }
    }

    /// A key identified by the value type itself.
    ///
    /// Used where the key must be generic, such as the completion published by an interaction
    /// host.
    pub fn of_type() -> Self {
        Self::from_raw(TypeId::of::<T>(), type_name::<T>())
    }

    pub(crate) fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Helper macro to declare a new statically typed context
#[macro_export]
macro_rules! context {
    ($($(#[$outer:meta])* $vis: vis $name: ident: $ty: ty,)*) => {
        $(
            $(#[$outer])*
            $vis fn $name() -> $crate::context::ContextKey<$ty> {
                struct Marker;
                $crate::context::ContextKey::from_raw(
                    ::std::any::TypeId::of::<Marker>(),
                    stringify!($name),
                )
            }
        )*
    };
}

#[cfg(test)]
mod test {
    use super::*;

    context! {
        pub foo: String,
        pub(crate) bar: i32,
        baz: String,
    }

    #[test]
    fn context_key() {
        let foo = foo();
        let bar = bar();

        assert_ne!(foo.id(), bar.id());
        assert_eq!(foo.name(), "foo");
        assert_eq!(foo, self::foo());
        assert_eq!(bar.name(), "bar");

        // Same value type, distinct keys
        assert_ne!(foo, baz());
    }

    #[test]
    fn type_keys() {
        assert_eq!(ContextKey::<u8>::of_type(), ContextKey::<u8>::of_type());
        assert_ne!(ContextKey::<u8>::of_type().id(), ContextKey::<u16>::of_type().id());
    }
}
