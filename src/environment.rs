use crate::key::Key;
use crate::signature::{Cons, Contains, Lookup, Nil, Replace, Signature};
use log::trace;
use std::{
    any::type_name,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// An immutable, statically typed set of named services.
///
/// `S` is the signature: a type-level list of every key bound so far and
/// the type of its value. Every operation that adds or replaces a binding
/// returns a new environment and leaves `self` as it was; the new one shares
/// all of the old one's entries.
///
/// ```
/// use regenv::Environment;
///
/// regenv::key! {
///     Port = "port";
///     Address = "address";
/// }
///
/// let env = Environment::new()
///     .bind(Port, 8080u16)
///     .bind_with(Address, |env| format!("127.0.0.1:{}", env.get(Port)));
///
/// assert_eq!(env.get(Address), "127.0.0.1:8080");
/// assert_eq!(env.keys(), vec!["port", "address"]);
/// ```
pub struct Environment<S = Nil> {
    signature: Arc<S>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            signature: Arc::new(Nil),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl<S> Clone for Environment<S> {
    fn clone(&self) -> Self {
        Environment {
            signature: Arc::clone(&self.signature),
        }
    }
}

impl<S: Signature> Environment<S> {
    /// Binds `value` under a key that is not yet part of this environment.
    ///
    /// Binding a key twice is rejected when the program is compiled; use
    /// [`rebind`](Environment::rebind) to replace an existing entry.
    ///
    /// ```compile_fail
    /// regenv::key!(Port = "port");
    ///
    /// let env = regenv::Environment::new().bind(Port, 80u16).bind(Port, 443u16);
    /// ```
    pub fn bind<K: Key, V>(&self, _key: K, value: V) -> Environment<Cons<K, V, S>>
    where
        S: Contains<K>,
    {
        const {
            assert!(
                !<S as Contains<K>>::FOUND,
                "key is already bound in this environment, use `rebind` to replace it"
            )
        };

        trace!("bind `{}`: {}", K::NAME, type_name::<V>());
        Environment {
            signature: Arc::new(Cons::new(Arc::new(value), Arc::clone(&self.signature))),
        }
    }

    /// Binds the value `constructor` builds from this environment.
    ///
    /// The constructor runs once, immediately, and sees the environment as it
    /// is before `key` is added.
    pub fn bind_with<K: Key, V, F>(&self, key: K, constructor: F) -> Environment<Cons<K, V, S>>
    where
        S: Contains<K>,
        F: FnOnce(&Self) -> V,
    {
        let value = constructor(self);
        self.bind(key, value)
    }

    /// Like [`bind_with`](Environment::bind_with) for constructors that can
    /// fail. Their error is handed back untouched.
    pub fn try_bind_with<K: Key, V, E, F>(
        &self,
        key: K,
        constructor: F,
    ) -> Result<Environment<Cons<K, V, S>>, E>
    where
        S: Contains<K>,
        F: FnOnce(&Self) -> Result<V, E>,
    {
        let value = constructor(self)?;
        Ok(self.bind(key, value))
    }

    /// Replaces the entry for a key that is already bound. The key keeps its
    /// place, but its value and its declared type are both overridden.
    pub fn rebind<K: Key, V, I>(&self, _key: K, value: V) -> Environment<S::Output>
    where
        S: Replace<K, V, I>,
    {
        trace!("rebind `{}`: {}", K::NAME, type_name::<V>());
        Environment {
            signature: Arc::new(Replace::<K, V, I>::replace(
                &*self.signature,
                Arc::new(value),
            )),
        }
    }

    /// Replaces an existing entry with what `constructor` builds. The
    /// constructor still sees the value being replaced, so it can wrap it.
    pub fn rebind_with<K: Key, V, I, F>(&self, key: K, constructor: F) -> Environment<S::Output>
    where
        S: Replace<K, V, I>,
        F: FnOnce(&Self) -> V,
    {
        let value = constructor(self);
        self.rebind(key, value)
    }

    /// Builds a value from this environment and returns a fresh environment
    /// holding nothing but that value under `key`.
    ///
    /// ```compile_fail
    /// regenv::key! {
    ///     A = "a";
    ///     B = "b";
    /// }
    ///
    /// let env = regenv::Environment::new().bind(A, 1);
    /// let reduced = env.reduce_with(B, |env| *env.get(A) * 2);
    /// reduced.get(A);
    /// ```
    pub fn reduce_with<K: Key, V, F>(&self, key: K, constructor: F) -> Environment<Cons<K, V, Nil>>
    where
        F: FnOnce(&Self) -> V,
    {
        let value = constructor(self);
        trace!("reduce {:?} to `{}`", self.keys(), K::NAME);
        Environment::new().bind(key, value)
    }

    /// Like [`reduce_with`](Environment::reduce_with) for constructors that
    /// can fail.
    pub fn try_reduce_with<K: Key, V, E, F>(
        &self,
        key: K,
        constructor: F,
    ) -> Result<Environment<Cons<K, V, Nil>>, E>
    where
        F: FnOnce(&Self) -> Result<V, E>,
    {
        let value = constructor(self)?;
        trace!("reduce {:?} to `{}`", self.keys(), K::NAME);
        Ok(Environment::new().bind(key, value))
    }

    /// The value bound to `key`. Only keys in the signature can be asked for.
    ///
    /// ```compile_fail
    /// regenv::key! {
    ///     A = "a";
    ///     Missing = "missing";
    /// }
    ///
    /// let env = regenv::Environment::new().bind(A, 1);
    /// env.get(Missing);
    /// ```
    pub fn get<K: Key, I>(&self, _key: K) -> &<S as Lookup<K, I>>::Value
    where
        S: Lookup<K, I>,
    {
        Lookup::<K, I>::lookup(&*self.signature)
    }

    /// A shared handle to the value bound to `key`.
    pub fn share<K: Key, I>(&self, _key: K) -> Arc<<S as Lookup<K, I>>::Value>
    where
        S: Lookup<K, I>,
    {
        Arc::clone(Lookup::<K, I>::lookup(&*self.signature))
    }

    /// Names of the bound keys, oldest binding first.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::with_capacity(S::LEN);
        S::push_keys(&mut keys);
        keys
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.keys().contains(&name)
    }

    pub fn len(&self) -> usize {
        S::LEN
    }

    pub fn is_empty(&self) -> bool {
        S::LEN == 0
    }
}

impl<S: Signature> Debug for Environment<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Names the environment type produced by binding the listed keys in order.
///
/// ```
/// use regenv::{Env, Environment};
///
/// regenv::key! {
///     Name = "name";
///     Retries = "retries";
/// }
///
/// fn settings() -> Env![Name => String, Retries => u32] {
///     Environment::new().bind(Name, "worker".to_string()).bind(Retries, 3)
/// }
///
/// assert_eq!(*settings().get(Retries), 3);
/// ```
#[macro_export]
macro_rules! Env {
    (@signature [$($acc:tt)*]) => {
        $crate::Environment<$($acc)*>
    };
    (@signature [$($acc:tt)*] $key:ty => $value:ty $(, $($rest:tt)*)?) => {
        $crate::Env!(@signature [$crate::signature::Cons<$key, $value, $($acc)*>] $($($rest)*)?)
    };
    ($($bindings:tt)*) => {
        $crate::Env!(@signature [$crate::signature::Nil] $($bindings)*)
    };
}
