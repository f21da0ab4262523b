//! Schema resolution
//!
//! A record type describes its columns with an explicit list of [`FieldSpec`]s, one per
//! member in declaration order. Each `FieldSpec` carries a column tag plus a getter and setter,
//! so binding happens without any runtime type introspection.
//!
//! # Tags
//!
//! A tag is either `name` (same column name for read and write) or `readName,writeName`.
//! An empty segment or `-` excludes the member from that direction:
//!
//! | tag             | read       | write      |
//! |-----------------|------------|------------|
//! | `id`            | `id`       | `id`       |
//! | `birth,born_on` | `birth`    | `born_on`  |
//! | `-,errors`      | excluded   | `errors`   |
//! | `notes,`        | `notes`    | excluded   |
//! | `a,b,c`         | `a`        | `b`        |
//!
//! Resolution turns the tags into a name→field map for one direction and fails fast with
//! [`SchemaError::DuplicateFieldName`] if two members claim the same name.

use crate::types::{ConversionError, FieldKind, FieldValue, SchemaError, Value};
use std::collections::HashMap;
use std::fmt;

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), ConversionError> + Send + Sync>;

/// Stream direction a column map is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => f.write_str("read"),
            Direction::Write => f.write_str("write"),
        }
    }
}

/// A record type whose members can be bound to CSV columns
///
/// # Examples
///
/// ```
/// use csvdoc::{FieldSpec, Record};
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: i64,
///     name: String,
///     nickname: Option<String>,
/// }
///
/// impl Record for User {
///     fn fields() -> Vec<FieldSpec<Self>> {
///         vec![
///             FieldSpec::new("id", |u: &User| &u.id, |u: &mut User| &mut u.id),
///             FieldSpec::new("name", |u: &User| &u.name, |u: &mut User| &mut u.name),
///             FieldSpec::new("nick,nickname", |u: &User| &u.nickname, |u: &mut User| &mut u.nickname),
///         ]
///     }
/// }
/// ```
pub trait Record: Default + 'static {
    /// Member bindings in declaration order
    fn fields() -> Vec<FieldSpec<Self>>;
}

/// Binding of one record member: its column tag, declared kind and accessors
pub struct FieldSpec<T> {
    tag: Option<String>,
    kind: FieldKind,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T: 'static> FieldSpec<T> {
    /// Bind a member to the columns named by `tag`
    ///
    /// The declared kind comes from the member's [`FieldValue`] implementation.
    pub fn new<F, G, M>(tag: &str, get: G, get_mut: M) -> Self
    where
        F: FieldValue + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        let mut spec = Self::untagged(get, get_mut);
        spec.tag = Some(tag.to_string());
        spec
    }

    /// Register a member without a column tag
    ///
    /// The member keeps its declaration index but is never bound to a column.
    pub fn untagged<F, G, M>(get: G, get_mut: M) -> Self
    where
        F: FieldValue + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        FieldSpec {
            tag: None,
            kind: F::KIND,
            get: Box::new(move |record| get(record).to_value()),
            set: Box::new(move |record, value| {
                *get_mut(record) = F::from_value(value)?;
                Ok(())
            }),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

impl<T> fmt::Debug for FieldSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Read and write column names of one member, derived from its tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub read_name: Option<String>,
    pub write_name: Option<String>,
    /// Declaration index of the member
    pub index: usize,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    fn from_tag(tag: Option<&str>, index: usize, kind: FieldKind) -> Self {
        let (read_name, write_name) = match tag {
            Some(tag) => {
                // segments past the second are ignored
                let mut segments = tag.split(',');
                let read = segments.next().and_then(column_name);
                match segments.next() {
                    Some(write) => (read, column_name(write)),
                    None => (read.clone(), read),
                }
            }
            None => (None, None),
        };
        FieldDescriptor {
            read_name,
            write_name,
            index,
            kind,
        }
    }

    /// Column name used in `direction`, if the member takes part in it
    pub fn name(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Read => self.read_name.as_deref(),
            Direction::Write => self.write_name.as_deref(),
        }
    }
}

fn column_name(segment: &str) -> Option<String> {
    match segment {
        "" | "-" => None,
        name => Some(name.to_string()),
    }
}

/// A column name resolved to a record member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    /// Declaration index of the member
    pub field: usize,
    pub kind: FieldKind,
}

/// Name→member map for one direction, keeping declaration order
///
/// Position in [`ResolvedNames::entries`] is the column's slot; converters and header
/// bindings refer to columns by slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    direction: Direction,
    entries: Vec<ResolvedName>,
    slots: HashMap<String, usize>,
}

impl ResolvedNames {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Resolved columns in declaration order
    pub fn entries(&self) -> &[ResolvedName] {
        &self.entries
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedName> {
        self.slot_of(name).map(|slot| &self.entries[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

/// The column bindings of a record type
pub struct Schema<T> {
    fields: Vec<FieldSpec<T>>,
    descriptors: Vec<FieldDescriptor>,
}

impl<T: Record> Schema<T> {
    /// Build the schema from the record type's field list
    pub fn of() -> Self {
        Self::from_fields(T::fields())
    }
}

impl<T> Schema<T> {
    pub fn from_fields(fields: Vec<FieldSpec<T>>) -> Self {
        let descriptors = fields
            .iter()
            .enumerate()
            .map(|(index, spec)| FieldDescriptor::from_tag(spec.tag.as_deref(), index, spec.kind))
            .collect();
        Schema {
            fields,
            descriptors,
        }
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    /// Resolve the name→member map for one direction
    ///
    /// Members without a tag, or excluded from `direction`, are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateFieldName`] on the first name claimed by two members.
    /// No partial map is returned.
    pub fn resolve(&self, direction: Direction) -> Result<ResolvedNames, SchemaError> {
        let mut entries = Vec::with_capacity(self.descriptors.len());
        let mut slots = HashMap::with_capacity(self.descriptors.len());

        for descriptor in &self.descriptors {
            let Some(name) = descriptor.name(direction) else {
                continue;
            };
            if slots.contains_key(name) {
                return Err(SchemaError::DuplicateFieldName {
                    name: name.to_string(),
                    direction,
                    index: descriptor.index,
                });
            }
            slots.insert(name.to_string(), entries.len());
            entries.push(ResolvedName {
                name: name.to_string(),
                field: descriptor.index,
                kind: descriptor.kind,
            });
        }

        Ok(ResolvedNames {
            direction,
            entries,
            slots,
        })
    }

    /// Read member `field` of `record` as a [`Value`]
    pub(crate) fn get(&self, field: usize, record: &T) -> Value {
        (self.fields[field].get)(record)
    }

    /// Store `value` into member `field` of `record`
    pub(crate) fn set(
        &self,
        field: usize,
        record: &mut T,
        value: Value,
    ) -> Result<(), ConversionError> {
        (self.fields[field].set)(record, value)
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("descriptors", &self.descriptors)
            .finish()
    }
}
