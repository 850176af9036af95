//! Typed field handles.
//!
//! A [`Field`] names one member of a mapped struct and knows how to read and
//! write it. Expression nodes only carry the field's [`FieldId`]; the schema
//! resolves that identity back to a column name at serialization time.

use std::any::TypeId;
use std::fmt;

/// Stable identity of a mapped field: owning type plus member symbol.
///
/// Two references resolve to the same column iff their ids are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId {
    /// Owning struct type.
    pub owner: TypeId,
    /// Short name of the owning struct, for error messages.
    pub owner_name: &'static str,
    /// Member symbol (field name, getter name or setter name).
    pub member: &'static str,
}

impl FieldId {
    /// Creates the identity of `member` on `O`.
    #[must_use]
    pub fn of<O: 'static>(member: &'static str) -> Self {
        Self {
            owner: TypeId::of::<O>(),
            owner_name: short_type_name::<O>(),
            member,
        }
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner_name, self.member)
    }
}

/// Returns the last path segment of a type's name.
#[must_use]
pub fn short_type_name<O: ?Sized>() -> &'static str {
    let full = std::any::type_name::<O>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// How a column reads and writes its field on an instance.
pub enum Accessor<O, T> {
    /// Direct member access.
    Member {
        /// Borrow the member.
        get: fn(&O) -> &T,
        /// Mutably borrow the member.
        get_mut: fn(&mut O) -> &mut T,
    },
    /// A getter/setter pair operating on the same field type.
    GetterSetter {
        /// Read the value.
        getter: fn(&O) -> T,
        /// Write the value.
        setter: fn(&mut O, T),
        /// Member symbol of the setter.
        setter_name: &'static str,
    },
}

impl<O, T> Clone for Accessor<O, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, T> Copy for Accessor<O, T> {}

/// A typed reference to one member of a mapped struct.
pub struct Field<O, T> {
    id: FieldId,
    accessor: Accessor<O, T>,
}

impl<O, T> Clone for Field<O, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, T> Copy for Field<O, T> {}

impl<O, T> fmt::Debug for Field<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.id).finish()
    }
}

impl<O: 'static, T> Field<O, T> {
    /// A field backed by direct member access.
    #[must_use]
    pub fn member(member: &'static str, get: fn(&O) -> &T, get_mut: fn(&mut O) -> &mut T) -> Self {
        Self {
            id: FieldId::of::<O>(member),
            accessor: Accessor::Member { get, get_mut },
        }
    }

    /// A field backed by a getter/setter pair.
    ///
    /// The resulting column answers to both `getter_name` and
    /// `setter_name`; see [`Field::via_setter`].
    #[must_use]
    pub fn getter_setter(
        getter_name: &'static str,
        getter: fn(&O) -> T,
        setter_name: &'static str,
        setter: fn(&mut O, T),
    ) -> Self {
        Self {
            id: FieldId::of::<O>(getter_name),
            accessor: Accessor::GetterSetter {
                getter,
                setter,
                setter_name,
            },
        }
    }
}

impl<O, T> Field<O, T> {
    /// Identity used by expressions.
    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// The accessor.
    #[must_use]
    pub const fn accessor(&self) -> Accessor<O, T> {
        self.accessor
    }

    /// Member symbols this field answers to.
    #[must_use]
    pub fn symbols(&self) -> Vec<&'static str> {
        match self.accessor {
            Accessor::Member { .. } => vec![self.id.member],
            Accessor::GetterSetter { setter_name, .. } => vec![self.id.member, setter_name],
        }
    }

    /// The same field referenced through its setter symbol.
    ///
    /// For member fields this is the field itself.
    #[must_use]
    pub fn via_setter(self) -> Self {
        match self.accessor {
            Accessor::Member { .. } => self,
            Accessor::GetterSetter { setter_name, .. } => Self {
                id: FieldId {
                    member: setter_name,
                    ..self.id
                },
                accessor: self.accessor,
            },
        }
    }

    /// Reads the field from `obj`.
    pub fn get(&self, obj: &O) -> T
    where
        T: Clone,
    {
        match self.accessor {
            Accessor::Member { get, .. } => get(obj).clone(),
            Accessor::GetterSetter { getter, .. } => getter(obj),
        }
    }

    /// Writes `value` into `obj`.
    pub fn set(&self, obj: &mut O, value: T) {
        match self.accessor {
            Accessor::Member { get_mut, .. } => *get_mut(obj) = value,
            Accessor::GetterSetter { setter, .. } => setter(obj, value),
        }
    }
}

impl<O, T> From<Field<O, T>> for FieldId {
    fn from(field: Field<O, T>) -> Self {
        field.id
    }
}

/// A list of field references, used for key and index column lists.
pub trait FieldList {
    /// Returns the field ids in order.
    fn field_ids(self) -> Vec<FieldId>;
}

impl FieldList for FieldId {
    fn field_ids(self) -> Vec<FieldId> {
        vec![self]
    }
}

impl<O, T> FieldList for Field<O, T> {
    fn field_ids(self) -> Vec<FieldId> {
        vec![self.id]
    }
}

impl FieldList for Vec<FieldId> {
    fn field_ids(self) -> Vec<FieldId> {
        self
    }
}

macro_rules! impl_field_list_tuple {
    ($($name:ident),+) => {
        impl<$($name: FieldList),+> FieldList for ($($name,)+) {
            #[allow(non_snake_case)]
            fn field_ids(self) -> Vec<FieldId> {
                let ($($name,)+) = self;
                let mut ids = Vec::new();
                $(ids.extend($name.field_ids());)+
                ids
            }
        }
    };
}

impl_field_list_tuple!(A);
impl_field_list_tuple!(A, B);
impl_field_list_tuple!(A, B, C);
impl_field_list_tuple!(A, B, C, D);
impl_field_list_tuple!(A, B, C, D, E);
impl_field_list_tuple!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Account {
        id: i64,
        label: String,
    }

    impl Account {
        fn label(&self) -> String {
            self.label.clone()
        }

        fn set_label(&mut self, label: String) {
            self.label = label;
        }
    }

    fn account_id(a: &Account) -> &i64 {
        &a.id
    }

    fn account_id_mut(a: &mut Account) -> &mut i64 {
        &mut a.id
    }

    #[test]
    fn test_member_field_reads_and_writes() {
        let id = Field::member("id", account_id, account_id_mut);
        let mut account = Account::default();
        id.set(&mut account, 9);
        assert_eq!(id.get(&account), 9);
        assert_eq!(id.id().owner_name, "Account");
        assert_eq!(id.symbols(), vec!["id"]);
    }

    #[test]
    fn test_getter_setter_answers_to_both_symbols() {
        let label = Field::getter_setter("label", Account::label, "set_label", Account::set_label);
        assert_eq!(label.symbols(), vec!["label", "set_label"]);
        assert_eq!(label.via_setter().id().member, "set_label");

        let mut account = Account::default();
        label.set(&mut account, String::from("x"));
        assert_eq!(label.get(&account), "x");
    }

    #[test]
    fn test_field_identity_is_per_member() {
        let id = Field::member("id", account_id, account_id_mut);
        let label = Field::getter_setter("label", Account::label, "set_label", Account::set_label);
        assert_ne!(id.id(), label.id());
        assert_eq!(id.id(), FieldId::of::<Account>("id"));
    }

    #[test]
    fn test_field_list_tuple_keeps_order() {
        let id = Field::member("id", account_id, account_id_mut);
        let label = Field::getter_setter("label", Account::label, "set_label", Account::set_label);
        let ids = (label, id).field_ids();
        assert_eq!(ids[0].member, "label");
        assert_eq!(ids[1].member, "id");
    }
}
