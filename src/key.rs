/// A compile-time identifier for one slot of an [`Environment`](crate::Environment).
///
/// Keys are zero-sized marker types; the literal name is what the registry
/// reports back through introspection and what duplicate detection compares.
/// Declare them with [`key!`](crate::key!) rather than by hand.
pub trait Key: 'static {
    const NAME: &'static str;
}

/// Declares one or more key types.
///
/// ```
/// regenv::key! {
///     pub Database = "database";
///     /// Shared HTTP client.
///     pub Client = "client";
/// }
///
/// use regenv::Key;
/// assert_eq!(Database::NAME, "database");
/// assert_eq!(Client::NAME, "client");
/// ```
#[macro_export]
macro_rules! key {
    ($($(#[$meta:meta])* $vis:vis $name:ident = $literal:literal);+ $(;)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            $vis struct $name;

            impl $crate::Key for $name {
                const NAME: &'static str = $literal;
            }
        )+
    };
}

/// Byte-wise name comparison usable in constant evaluation.
pub const fn names_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::key! {
        Alpha = "alpha";
        pub(crate) Beta = "beta";
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("", ""));
        assert!(names_match("database", "database"));

        assert!(!names_match("database", "databases"));
        assert!(!names_match("db", "dc"));
        assert!(!names_match("a", ""));
    }

    #[test]
    fn test_names_match_in_const_context() {
        const SAME: bool = names_match(Alpha::NAME, "alpha");
        const DIFFERENT: bool = names_match(Alpha::NAME, Beta::NAME);

        assert!(SAME);
        assert!(!DIFFERENT);
    }

    #[test]
    fn test_declared_keys() {
        assert_eq!(Alpha::NAME, "alpha");
        assert_eq!(Beta::NAME, "beta");
        assert_eq!(format!("{:?}", Beta), "Beta");
        assert_eq!(Alpha, Alpha::default());
    }
}
