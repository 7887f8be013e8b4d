use crate::{Context, Record, Result, RowLabeled, Value};
use std::{
    any::{self, TypeId},
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// Column name index of a record type.
#[derive(Debug)]
pub struct FieldIndex {
    names: &'static [&'static str],
    positions: HashMap<&'static str, usize>,
}

impl FieldIndex {
    fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            positions: names.iter().enumerate().map(|(i, v)| (*v, i)).collect(),
        }
    }
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }
    pub fn len(&self) -> usize {
        self.names.len()
    }
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Read mostly cache of [`FieldIndex`] per record type, used to copy column
/// values between records and rows by name.
///
/// There is no global instance: whoever merges fields owns one (a `Collection`
/// creates its own unless one is injected) and may share it through an `Arc`.
#[derive(Debug, Default)]
pub struct FieldMapper {
    cache: RwLock<HashMap<TypeId, Arc<FieldIndex>>>,
}

impl FieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index of `R`, built on first use.
    pub fn index<R: Record + 'static>(&self) -> Arc<FieldIndex> {
        let type_id = TypeId::of::<R>();
        if let Ok(cache) = self.cache.read() {
            if let Some(index) = cache.get(&type_id) {
                return index.clone();
            }
        }
        let index = Arc::new(FieldIndex::new(R::field_names()));
        match self.cache.write() {
            Ok(mut cache) => cache.entry(type_id).or_insert(index).clone(),
            // Poisoned by a panicking writer, keep working uncached
            Err(..) => index,
        }
    }

    /// Number of record types indexed so far.
    pub fn cached_types(&self) -> usize {
        self.cache.read().map(|v| v.len()).unwrap_or_default()
    }

    /// The fields of `record` that map to a column.
    pub fn valid_field_map<R: Record + 'static>(&self, record: &R) -> Vec<(&'static str, Value)> {
        let index = self.index::<R>();
        record
            .describe_fields()
            .into_iter()
            .filter(|(name, _)| index.contains(name))
            .collect()
    }

    /// Overwrites every field of `target` with the value of the same field in `source`.
    ///
    /// Either all fields are copied or, on error, `target` is left as it was.
    pub fn merge<R: Record + 'static>(&self, target: &mut R, source: &R) -> Result<()> {
        let fields = self.valid_field_map(source);
        let snapshot = target.describe_fields();
        for (name, value) in fields {
            if let Err(error) = target.set_field(name, value) {
                for (name, value) in snapshot {
                    if let Err(e) = target.set_field(name, value) {
                        log::error!("Could not restore field `{}`: {:#}", name, e);
                    }
                }
                let error = error.context(format!(
                    "While merging field `{}` into {}",
                    name,
                    any::type_name::<R>()
                ));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(())
    }

    /// Assigns the row values to the fields with the same name, other columns are skipped.
    pub fn assign_row<R: Record + 'static>(&self, target: &mut R, row: RowLabeled) -> Result<()> {
        let index = self.index::<R>();
        for (name, value) in row.labels.iter().zip(row.values.into_vec()) {
            if index.contains(name) {
                target.set_field(name, value).with_context(|| {
                    format!(
                        "While decoding column `{}` into {}",
                        name,
                        any::type_name::<R>()
                    )
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FieldMapper;
    use crate::{AsValue, Error, Record, Result, RowLabeled, Value};
    use std::sync::Arc;

    #[derive(Default, Debug, PartialEq)]
    struct Book {
        id: Option<i64>,
        title: String,
        pages: i32,
    }

    impl Record for Book {
        fn field_names() -> &'static [&'static str] {
            &["id", "title", "pages"]
        }
        fn describe_fields(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", self.id.as_value()),
                ("title", self.title.clone().as_value()),
                ("pages", self.pages.as_value()),
            ]
        }
        fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
            match name {
                "id" => self.id = AsValue::try_from_value(value)?,
                "title" => self.title = AsValue::try_from_value(value)?,
                "pages" => self.pages = AsValue::try_from_value(value)?,
                _ => return Err(Error::msg(format!("Book has no field `{}`", name))),
            }
            Ok(())
        }
    }

    #[test]
    fn index_is_cached() {
        let mapper = FieldMapper::new();
        assert_eq!(mapper.cached_types(), 0);
        let first = mapper.index::<Book>();
        let second = mapper.index::<Book>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(mapper.cached_types(), 1);
        assert_eq!(first.position("pages"), Some(2));
        assert!(!first.contains("author"));
    }

    #[test]
    fn merge_overwrites_every_field() {
        let mapper = FieldMapper::new();
        let mut target = Book {
            id: None,
            title: "Draft".into(),
            pages: 0,
        };
        let source = Book {
            id: Some(3),
            title: "Dune".into(),
            pages: 412,
        };
        mapper.merge(&mut target, &source).unwrap();
        assert_eq!(target, source);
    }

    #[derive(Default, Debug, PartialEq)]
    struct Coupon {
        label: String,
        code: String,
    }

    impl Record for Coupon {
        fn field_names() -> &'static [&'static str] {
            &["label", "code"]
        }
        fn describe_fields(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("label", self.label.clone().as_value()),
                ("code", self.code.clone().as_value()),
            ]
        }
        fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
            let value = String::try_from_value(value)?;
            match name {
                "label" => self.label = value,
                "code" if value.is_empty() => return Err(Error::msg("Empty coupon code")),
                "code" => self.code = value,
                _ => return Err(Error::msg(format!("Coupon has no field `{}`", name))),
            }
            Ok(())
        }
    }

    #[test]
    fn merge_is_all_or_nothing() {
        let mapper = FieldMapper::new();
        let mut target = Coupon {
            label: "Spring".into(),
            code: "SPRING10".into(),
        };
        let source = Coupon {
            label: "Summer".into(),
            code: "".into(),
        };
        assert!(mapper.merge(&mut target, &source).is_err());
        assert_eq!(target.label, "Spring");
        assert_eq!(target.code, "SPRING10");
    }

    #[test]
    fn assign_row_skips_unknown_columns() {
        let mapper = FieldMapper::new();
        let mut book = Book::default();
        let row = RowLabeled::new(
            ["id", "title", "isbn"].map(String::from).into(),
            [
                Value::Int64(Some(9)),
                Value::Varchar(Some("Emma".into())),
                Value::Varchar(Some("978-0".into())),
            ]
            .into(),
        );
        mapper.assign_row(&mut book, row).unwrap();
        assert_eq!(book.id, Some(9));
        assert_eq!(book.title, "Emma");
        assert_eq!(book.pages, 0);
    }

    #[test]
    fn assign_row_reports_bad_values() {
        let mapper = FieldMapper::new();
        let mut book = Book::default();
        let row = RowLabeled::new(
            ["pages"].map(String::from).into(),
            [Value::Varchar(Some("many".into()))].into(),
        );
        assert!(mapper.assign_row(&mut book, row).is_err());
    }
}
