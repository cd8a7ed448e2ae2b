use std::fmt;

/// The tag of a [Value](crate::Value), also used to declare column types.
///
/// The discriminants are the type ids written in persisted table files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A 64-bit signed integer.
    Int = 0,
    /// An owned UTF-8 string.
    Str = 1,
    /// A boolean value (true or false).
    Bool = 2,
    /// The absence of a value.
    Null = 3,
}

impl DataType {
    /// Returns the type id used by the on-disk format.
    pub fn type_id(self) -> u8 {
        self as u8
    }

    /// Maps an on-disk type id back to its [DataType].
    pub fn from_type_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Int),
            1 => Some(Self::Str),
            2 => Some(Self::Bool),
            3 => Some(Self::Null),
            _ => None,
        }
    }

    /// Parses a column type name as written in `CREATE TABLE`.
    ///
    /// Matching is case-insensitive. `NULL` is not a declarable column type.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "INT" | "INTEGER" => Some(Self::Int),
            "STRING" | "TEXT" => Some(Self::Str),
            "BOOL" | "BOOLEAN" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Lowercase name with its article, used in accessor errors ("an int").
    pub(crate) fn with_article(self) -> &'static str {
        match self {
            Self::Int => "an int",
            Self::Str => "a string",
            Self::Bool => "a bool",
            Self::Null => "a null",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "INT",
            Self::Str => "STRING",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids_are_stable() {
        assert_eq!(DataType::Int.type_id(), 0);
        assert_eq!(DataType::Str.type_id(), 1);
        assert_eq!(DataType::Bool.type_id(), 2);
        assert_eq!(DataType::Null.type_id(), 3);

        for id in 0..4 {
            assert_eq!(DataType::from_type_id(id).unwrap().type_id(), id);
        }
        assert_eq!(DataType::from_type_id(4), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(DataType::from_type_name("int"), Some(DataType::Int));
        assert_eq!(DataType::from_type_name("Text"), Some(DataType::Str));
        assert_eq!(DataType::from_type_name("BOOLEAN"), Some(DataType::Bool));
        assert_eq!(DataType::from_type_name("null"), None);
        assert_eq!(DataType::from_type_name("age"), None);
    }
}
