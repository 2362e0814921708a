use std::{
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Identity of an [InjectionKey]
///
/// Two keys are the same dependency iff their ids are equal, regardless of the
/// type parameter they were declared with.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyId(&'static str);

impl KeyId {
    pub const fn new(name: &'static str) -> Self {
        KeyId(name)
    }

    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Typed identifier used to register and resolve a dependency
///
/// The type parameter ties the factory registered under this key to what
/// resolution returns. Keys are meant to be declared once as constants:
///
/// ```rust
/// use keyed_di::InjectionKey;
///
/// struct LoginScreen;
///
/// const LOGIN_SCREEN: InjectionKey<LoginScreen> = InjectionKey::new("login_screen");
/// assert_eq!(LOGIN_SCREEN.name(), "login_screen");
/// ```
pub struct InjectionKey<T: ?Sized> {
    id: KeyId,
    // fn() -> T keeps the key Send + Sync and covariant without owning a T
    _product: PhantomData<fn() -> T>,
}

impl<T: ?Sized> InjectionKey<T> {
    pub const fn new(name: &'static str) -> Self {
        InjectionKey {
            id: KeyId::new(name),
            _product: PhantomData,
        }
    }

    pub const fn id(&self) -> KeyId {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.id.name()
    }
}

// Manual impls - derives would require T to implement the traits as well
impl<T: ?Sized> Clone for InjectionKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: ?Sized> Copy for InjectionKey<T> {}

impl<T: ?Sized> PartialEq for InjectionKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: ?Sized> Eq for InjectionKey<T> {}

impl<T: ?Sized> Hash for InjectionKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: ?Sized> Debug for InjectionKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionKey")
            .field("name", &self.id.name())
            .field("product", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: ?Sized> Display for InjectionKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.id, f)
    }
}
