use super::core::TypeDescriptor;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

static DESCRIPTOR_CACHE: Lazy<RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Types that can describe their own structure.
///
/// Implementations should be cheap but are not required to cache: callers go
/// through [`descriptor_of`], which memoizes the built descriptor per type.
pub trait Describe: 'static {
    fn describe() -> Arc<TypeDescriptor>;
}

/// Descriptor for `T`, built once and cached for the lifetime of the process.
pub fn descriptor_of<T: Describe>() -> Arc<TypeDescriptor> {
    let key = TypeId::of::<T>();

    let cache = DESCRIPTOR_CACHE
        .read()
        .unwrap_or_else(|e| e.into_inner());
    if let Some(found) = cache.get(&key) {
        return Arc::clone(found);
    }
    drop(cache);

    let built = T::describe();
    let mut cache = DESCRIPTOR_CACHE
        .write()
        .unwrap_or_else(|e| e.into_inner());
    Arc::clone(cache.entry(key).or_insert(built))
}

impl Describe for String {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::string()
    }
}

impl Describe for bool {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::boolean()
    }
}

macro_rules! describe_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl Describe for $ty {
            fn describe() -> Arc<TypeDescriptor> {
                Arc::new(TypeDescriptor::Primitive(super::core::Primitive::$kind))
            }
        })*
    };
}

describe_primitive! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl Describe for serde_json::Value {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::any()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::list(T::describe())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::pointer(T::describe())
    }
}

impl<T: Describe> Describe for Box<T> {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::pointer(T::describe())
    }
}

impl<T: Describe> Describe for HashMap<String, T> {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::map(T::describe())
    }
}

impl<T: Describe> Describe for BTreeMap<String, T> {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::map(T::describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{classify, TypeClass};

    #[test]
    fn cached_descriptor_is_shared() {
        let a = descriptor_of::<Vec<i32>>();
        let b = descriptor_of::<Vec<i32>>();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn vec_u8_describes_as_binary() {
        let d = descriptor_of::<Vec<u8>>();
        assert!(matches!(classify(&d), TypeClass::Binary));
    }

    #[test]
    fn option_describes_as_pointer() {
        let d = descriptor_of::<Option<String>>();
        assert!(matches!(&*d, TypeDescriptor::Pointer(_)));
    }
}
