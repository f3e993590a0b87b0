use std::{any::type_name, fmt};

/// Crates whose types count as predefined, the same way primitives do.
const BUILTIN_CRATES: [&str; 3] = ["core", "alloc", "std"];

/// The structural type of a receiver or payload, read from its compiled type path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    path: &'static str,
}

impl Shape {
    pub fn of<T: ?Sized>() -> Self {
        Self {
            path: type_name::<T>(),
        }
    }

    /// Full type path, e.g. `my_crate::math::AddRequest`.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Last path segment with generic arguments stripped.
    ///
    /// Unnamed types (tuples, arrays, references, closures) yield something
    /// that is not an identifier, which [`Shape::is_named`] rejects.
    pub fn name(&self) -> &'static str {
        short_name(self.path)
    }

    pub fn is_named(&self) -> bool {
        is_ident(self.name())
    }

    pub fn is_exported(&self) -> bool {
        is_exported_ident(self.name())
    }

    /// Unnamed types, primitives, and types from the standard library.
    pub fn is_builtin(&self) -> bool {
        if !self.is_named() {
            return true;
        }
        let base = strip_generics(self.path);
        match base.split_once("::") {
            None => true,
            Some((root, _)) => BUILTIN_CRATES.contains(&root),
        }
    }

    pub fn is_exported_or_builtin(&self) -> bool {
        self.is_exported() || self.is_builtin()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.path)
    }
}

/// An identifier whose first character is uppercase.
pub fn is_exported_ident(name: &str) -> bool {
    is_ident(name) && name.chars().next().is_some_and(char::is_uppercase)
}

pub(crate) fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn strip_generics(path: &str) -> &str {
    path.split_once('<').map_or(path, |(base, _)| base)
}

fn short_name(path: &str) -> &str {
    // Tuples, arrays, references and pointers carry other paths inside them.
    if !path.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        return path;
    }
    let base = strip_generics(path);
    base.rsplit_once("::").map_or(base, |(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    pub struct AddRequest;

    #[allow(non_camel_case_types)]
    struct hidden;

    #[test]
    fn names_strip_paths_and_generics() {
        assert_eq!(Shape::of::<AddRequest>().name(), "AddRequest");
        assert_eq!(Shape::of::<Vec<AddRequest>>().name(), "Vec");
        assert_eq!(Shape::of::<BTreeMap<String, i64>>().name(), "BTreeMap");
        assert_eq!(Shape::of::<i64>().name(), "i64");
        assert_eq!(Shape::of::<(i64, AddRequest)>().name(), Shape::of::<(i64, AddRequest)>().path());
    }

    #[test]
    fn exported_types() {
        assert!(Shape::of::<AddRequest>().is_exported());
        assert!(!Shape::of::<AddRequest>().is_builtin());
        assert!(!Shape::of::<hidden>().is_exported());
        assert!(!Shape::of::<hidden>().is_exported_or_builtin());
    }

    #[test]
    fn builtin_types() {
        assert!(Shape::of::<i64>().is_builtin());
        assert!(Shape::of::<String>().is_builtin());
        assert!(Shape::of::<Vec<u8>>().is_builtin());
        assert!(Shape::of::<()>().is_builtin());
        assert!(Shape::of::<(i64, i64)>().is_builtin());
        assert!(!Shape::of::<(i64, i64)>().is_named());
    }

    #[test]
    fn closures_are_unnamed() {
        fn shape_of<T>(_: &T) -> Shape {
            Shape::of::<T>()
        }
        let closure = || ();
        assert!(!shape_of(&closure).is_named());
    }

    #[test]
    fn exported_idents() {
        assert!(is_exported_ident("Add"));
        assert!(is_exported_ident("Äpfel"));
        assert!(!is_exported_ident("add"));
        assert!(!is_exported_ident("_Add"));
        assert!(!is_exported_ident(""));
        assert!(!is_exported_ident("Add Two"));
    }
}
