use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Boxed error returned by factories
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Bound for every product a key can resolve to
///
/// Products may be handed to any thread holding the container and can outlive
/// the resolution that built them.
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type erased product of a factory
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<Product: Injectable>(product: Product) -> Self {
        Self::from_arc(Arc::new(product))
    }

    pub(crate) fn from_arc<Product: Injectable>(product: Arc<Product>) -> Self {
        Instance {
            info: TypeInfo::of::<Product>(),
            instance: product,
        }
    }

    /// Downcasts into the concrete product
    ///
    /// Returns the name of the actual type on failure
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Whether this describes `T`
    pub fn is<T: 'static + ?Sized>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}
