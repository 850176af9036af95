//! Table descriptors and schema diffing.
//!
//! [`Schema::table_info`] describes a declared table in the shape SQLite's
//! `PRAGMA table_info` reports a live one, so the two can be compared
//! column by column with [`diff_table`]. Types are compared by affinity,
//! not by keyword: `INT8` and `INTEGER` are the same column.

use std::future::Future;

use crate::error::Result;
use crate::schema::{Schema, TableConstraint, TableDef};
use crate::serializer::default_text;

/// `cid` of a descriptor built from a declaration rather than read from a
/// live database.
pub const UNASSIGNED_CID: i64 = -1;

/// One column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnInfo {
    /// Ordinal in the live table, or [`UNASSIGNED_CID`].
    pub cid: i64,
    /// Column name.
    pub name: String,
    /// Declared type keyword.
    pub data_type: String,
    /// `NOT NULL` flag.
    pub not_null: bool,
    /// Text of the `DEFAULT` clause.
    pub default_value: Option<String>,
    /// 1-based position in the primary key; 0 when not a key column.
    pub pk: i64,
}

impl ColumnInfo {
    /// Column type affinity.
    #[must_use]
    pub fn affinity(&self) -> Affinity {
        Affinity::of(&self.data_type)
    }

    /// Returns `true` if both descriptors describe the same column.
    ///
    /// Names, affinities, nullability, key rank and the presence of a
    /// default must agree. The default text itself is not compared.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.name == other.name
            && self.affinity() == other.affinity()
            && self.not_null == other.not_null
            && self.default_value.is_some() == other.default_value.is_some()
            && self.pk == other.pk
    }
}

/// SQLite type affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl Affinity {
    /// Affinity of a declared type, by SQLite's substring rules.
    #[must_use]
    pub fn of(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            Self::Integer
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|k| upper.contains(k)) {
            Self::Text
        } else if upper.contains("BLOB") || upper.trim().is_empty() {
            Self::Blob
        } else if ["REAL", "FLOA", "DOUB"].iter().any(|k| upper.contains(k)) {
            Self::Real
        } else {
            Self::Numeric
        }
    }
}

impl Schema {
    /// Descriptors for `table`'s columns, in declaration order.
    ///
    /// Per-column primary keys get rank 1; a table-level composite key
    /// then overwrites the rank of each of its columns with the column's
    /// 1-based position in the key.
    pub fn table_info(&self, table: &TableDef) -> Result<Vec<ColumnInfo>> {
        let ctx = self.context();
        let mut infos = Vec::with_capacity(table.columns().len());
        for column in table.columns() {
            let default_value = column
                .default_value()
                .map(|default| default_text(default, &ctx))
                .transpose()?;
            infos.push(ColumnInfo {
                cid: UNASSIGNED_CID,
                name: column.name().to_string(),
                data_type: column.data_type().as_str().to_string(),
                not_null: !column.is_nullable(),
                default_value,
                pk: i64::from(column.is_primary_key()),
            });
        }

        for constraint in table.constraints() {
            let TableConstraint::PrimaryKey(fields) = constraint else {
                continue;
            };
            for (rank, field) in (1..).zip(fields) {
                let Some(name) = table.find_column_name(field) else {
                    continue;
                };
                if let Some(info) = infos.iter_mut().find(|info| info.name == name) {
                    info.pk = rank;
                }
            }
        }
        Ok(infos)
    }
}

/// Column-level difference between a declared and a live table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableDiff {
    /// Declared columns missing from the live table.
    pub added: Vec<ColumnInfo>,
    /// Live columns no longer declared.
    pub removed: Vec<ColumnInfo>,
    /// Columns present on both sides that differ: `(declared, live)`.
    pub changed: Vec<(ColumnInfo, ColumnInfo)>,
}

impl TableDiff {
    /// Returns `true` if the tables match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// How an existing table has to change to match its declaration.
    ///
    /// A column can only be appended in place when it accepts NULL or has
    /// a default and is not part of the key; anything else needs the table
    /// rebuilt.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        let appendable = self
            .added
            .iter()
            .all(|c| (!c.not_null || c.default_value.is_some()) && c.pk == 0);
        if !self.changed.is_empty() || !appendable {
            return SyncStatus::DroppedAndRecreated;
        }
        match (self.added.is_empty(), self.removed.is_empty()) {
            (true, true) => SyncStatus::AlreadyInSync,
            (false, true) => SyncStatus::NewColumnsAdded,
            (true, false) => SyncStatus::OldColumnsRemoved,
            (false, false) => SyncStatus::NewColumnsAddedAndOldColumnsRemoved,
        }
    }
}

/// Compares declared descriptors against live ones, matching by name.
#[must_use]
pub fn diff_table(expected: &[ColumnInfo], live: &[ColumnInfo]) -> TableDiff {
    let mut diff = TableDiff::default();
    for declared in expected {
        match live.iter().find(|c| c.name == declared.name) {
            None => diff.added.push(declared.clone()),
            Some(found) if !declared.is_equivalent(found) => {
                diff.changed.push((declared.clone(), found.clone()));
            }
            Some(_) => {}
        }
    }
    diff.removed = live
        .iter()
        .filter(|c| !expected.iter().any(|d| d.name == c.name))
        .cloned()
        .collect();
    diff
}

/// Outcome of comparing one declared table with the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncStatus {
    AlreadyInSync,
    NewTable,
    NewColumnsAdded,
    OldColumnsRemoved,
    NewColumnsAddedAndOldColumnsRemoved,
    DroppedAndRecreated,
}

/// Classifies a declared table against the live one, `None` meaning the
/// table does not exist yet.
#[must_use]
pub fn sync_status(expected: &[ColumnInfo], live: Option<&[ColumnInfo]>) -> SyncStatus {
    live.map_or(SyncStatus::NewTable, |live| {
        diff_table(expected, live).status()
    })
}

/// A source of live table descriptors.
pub trait Introspect {
    /// Failure reading the live schema.
    type Error;

    /// Columns of the live table `table`, or `None` if it does not exist.
    fn table_info(
        &self,
        table: &str,
    ) -> impl Future<Output = std::result::Result<Option<Vec<ColumnInfo>>, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, data_type: &str, not_null: bool, pk: i64) -> ColumnInfo {
        ColumnInfo {
            cid: UNASSIGNED_CID,
            name: name.into(),
            data_type: data_type.into(),
            not_null,
            default_value: None,
            pk,
        }
    }

    #[test]
    fn test_affinity_rules() {
        assert_eq!(Affinity::of("INTEGER"), Affinity::Integer);
        assert_eq!(Affinity::of("int8"), Affinity::Integer);
        assert_eq!(Affinity::of("VARCHAR(255)"), Affinity::Text);
        assert_eq!(Affinity::of("BLOB"), Affinity::Blob);
        assert_eq!(Affinity::of(""), Affinity::Blob);
        assert_eq!(Affinity::of("DOUBLE PRECISION"), Affinity::Real);
        assert_eq!(Affinity::of("DECIMAL(10,5)"), Affinity::Numeric);
        // "POINT" contains "INT".
        assert_eq!(Affinity::of("FLOATING POINT"), Affinity::Integer);
    }

    #[test]
    fn test_equivalence_ignores_default_text() {
        let mut a = info("id", "INTEGER", true, 1);
        let mut b = info("id", "INT", true, 1);
        assert!(a.is_equivalent(&b));
        a.default_value = Some("1".into());
        assert!(!a.is_equivalent(&b));
        b.default_value = Some("2".into());
        assert!(a.is_equivalent(&b));
        b.pk = 0;
        assert!(!a.is_equivalent(&b));
    }

    #[test]
    fn test_sync_status() {
        let expected = vec![
            info("id", "INTEGER", true, 1),
            info("name", "TEXT", true, 0),
            info("note", "TEXT", false, 0),
        ];
        assert_eq!(sync_status(&expected, None), SyncStatus::NewTable);
        assert_eq!(
            sync_status(&expected, Some(expected.as_slice())),
            SyncStatus::AlreadyInSync
        );

        let live = vec![expected[0].clone(), expected[1].clone()];
        assert_eq!(
            sync_status(&expected, Some(live.as_slice())),
            SyncStatus::NewColumnsAdded
        );

        let mut live = expected.clone();
        live.push(info("legacy", "BLOB", false, 0));
        assert_eq!(
            sync_status(&expected, Some(live.as_slice())),
            SyncStatus::OldColumnsRemoved
        );

        let live = vec![
            expected[0].clone(),
            expected[1].clone(),
            info("legacy", "BLOB", false, 0),
        ];
        let diff = diff_table(&expected, &live);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.removed[0].name, "legacy");
        assert_eq!(
            diff.status(),
            SyncStatus::NewColumnsAddedAndOldColumnsRemoved
        );
    }

    #[test]
    fn test_rebuild_when_column_cannot_be_appended() {
        let expected = vec![info("id", "INTEGER", true, 1), info("name", "TEXT", true, 0)];
        let live = vec![info("id", "INTEGER", true, 1)];
        assert_eq!(
            sync_status(&expected, Some(live.as_slice())),
            SyncStatus::DroppedAndRecreated
        );

        let live = vec![info("id", "TEXT", true, 1), info("name", "TEXT", true, 0)];
        let diff = diff_table(&expected, &live);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.status(), SyncStatus::DroppedAndRecreated);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_diff_serializes_to_json() {
        let diff = diff_table(&[info("id", "INTEGER", true, 1)], &[]);
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["added"][0]["name"], "id");
        assert_eq!(json["added"][0]["pk"], 1);
        let back: TableDiff = serde_json::from_value(json).unwrap();
        assert_eq!(back, diff);
    }
}
