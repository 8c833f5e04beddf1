use crate::key::{names_match, Key};
use std::{marker::PhantomData, sync::Arc};

/// The empty signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nil;

/// Key `K` bound to a `V` on top of the older bindings in `T`.
///
/// Links are reference counted, so a signature built on top of another one
/// shares every node below its own head.
pub struct Cons<K, V, T> {
    value: Arc<V>,
    tail: Arc<T>,
    key: PhantomData<fn() -> K>,
}

impl<K, V, T> Cons<K, V, T> {
    pub(crate) fn new(value: Arc<V>, tail: Arc<T>) -> Self {
        Cons {
            value,
            tail,
            key: PhantomData,
        }
    }
}

impl<K, V, T> Clone for Cons<K, V, T> {
    fn clone(&self) -> Self {
        Cons::new(Arc::clone(&self.value), Arc::clone(&self.tail))
    }
}

/// Position of a key in a signature: at the head...
pub struct Here;

/// ...or somewhere below it.
pub struct There<I>(PhantomData<I>);

pub trait Signature {
    const LEN: usize;

    /// Appends the key names, oldest binding first.
    fn push_keys(keys: &mut Vec<&'static str>);
}

impl Signature for Nil {
    const LEN: usize = 0;

    fn push_keys(_keys: &mut Vec<&'static str>) {}
}

impl<K: Key, V, T: Signature> Signature for Cons<K, V, T> {
    const LEN: usize = T::LEN + 1;

    fn push_keys(keys: &mut Vec<&'static str>) {
        T::push_keys(keys);
        keys.push(K::NAME);
    }
}

/// Whether a key with the same name as `K` is already bound.
pub trait Contains<K: Key> {
    const FOUND: bool;
}

impl<K: Key> Contains<K> for Nil {
    const FOUND: bool = false;
}

impl<K: Key, K0: Key, V, T: Contains<K>> Contains<K> for Cons<K0, V, T> {
    const FOUND: bool = names_match(K::NAME, K0::NAME) || T::FOUND;
}

/// Resolves key `K` to its entry. `I` is inferred by the compiler and only
/// exists for signatures that actually bind `K`.
pub trait Lookup<K, I> {
    type Value;

    fn lookup(&self) -> &Arc<Self::Value>;
}

impl<K, V, T> Lookup<K, Here> for Cons<K, V, T> {
    type Value = V;

    fn lookup(&self) -> &Arc<V> {
        &self.value
    }
}

impl<K, K0, V, T, I> Lookup<K, There<I>> for Cons<K0, V, T>
where
    T: Lookup<K, I>,
{
    type Value = T::Value;

    fn lookup(&self) -> &Arc<T::Value> {
        self.tail.lookup()
    }
}

/// Replaces the entry for `K` with a `V`, whatever type it held before.
pub trait Replace<K, V, I> {
    type Output;

    fn replace(&self, value: Arc<V>) -> Self::Output;
}

impl<K, V0, V, T> Replace<K, V, Here> for Cons<K, V0, T> {
    type Output = Cons<K, V, T>;

    fn replace(&self, value: Arc<V>) -> Self::Output {
        Cons::new(value, Arc::clone(&self.tail))
    }
}

impl<K, K0, V0, V, T, I> Replace<K, V, There<I>> for Cons<K0, V0, T>
where
    T: Replace<K, V, I>,
{
    type Output = Cons<K0, V0, T::Output>;

    fn replace(&self, value: Arc<V>) -> Self::Output {
        Cons::new(Arc::clone(&self.value), Arc::new(self.tail.replace(value)))
    }
}
