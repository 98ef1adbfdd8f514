use crate::{
    DEL_PROP,
    index::{IndexDescriptor, IndexProp},
    key::{Key, KeyBuilder, KeyError, KeySet},
    text::TextProvider,
    value::Value,
};

const WILDCARD: &str = "*";

///
/// IndexDelta
///
/// Key changes one record update causes in one index.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexDelta {
    pub insert: KeySet,
    pub remove: KeySet,
}

impl IndexDelta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.remove.is_empty()
    }
}

impl IndexDescriptor {
    /// Every key this index holds for `record`.
    ///
    /// A record flagged deleted has no keys unless the index is
    /// delete-inclusive. Missing props take the prop default, or null.
    pub fn keys_for(&self, record: &Value, text: &dyn TextProvider) -> Result<KeySet, KeyError> {
        let deleted = record.get(DEL_PROP).and_then(Value::as_bool) == Some(true);
        if deleted && !self.include_deleted {
            return Ok(KeySet::new());
        }

        let mut builder = KeyBuilder::new();
        builder.push_key(self.id.prefix_key());
        for prop in &self.props {
            builder.push(&prop_keys(prop, record, text)?);
        }

        Ok(builder.into_keys())
    }

    /// Keys to insert and remove when `old` becomes `new`; `None` is absence.
    pub fn delta(
        &self,
        old: Option<&Value>,
        new: Option<&Value>,
        text: &dyn TextProvider,
    ) -> Result<IndexDelta, KeyError> {
        let old_keys = old.map_or_else(|| Ok(KeySet::new()), |r| self.keys_for(r, text))?;
        let new_keys = new.map_or_else(|| Ok(KeySet::new()), |r| self.keys_for(r, text))?;

        Ok(IndexDelta {
            insert: new_keys.difference(&old_keys).cloned().collect(),
            remove: old_keys.difference(&new_keys).cloned().collect(),
        })
    }
}

// Candidate key components of one prop.
fn prop_keys(
    prop: &IndexProp,
    record: &Value,
    text: &dyn TextProvider,
) -> Result<KeySet, KeyError> {
    let collator = prop
        .collation
        .map(|strength| text.make_collator(text.locale(), strength));
    let collator = collator.as_deref();

    let path: Vec<&str> = prop.name.split('.').collect();
    let mut leaves = Vec::new();
    collect_leaves(record, &path, prop.default.as_ref(), &mut leaves);

    let mut keys = KeySet::new();
    for leaf in leaves {
        match leaf {
            Value::String(s) if prop.tokenize => {
                keys.extend(text.tokenizer(text.locale()).tokenize(s, collator)?);
            }
            Value::Array(_) | Value::Object(_) => {}
            scalar => {
                keys.insert(Key::from_value(scalar, collator)?);
            }
        }
    }

    Ok(keys)
}

// Walk `path` below `value`, fanning out over arrays and wildcards.
fn collect_leaves<'a>(
    value: &'a Value,
    path: &[&str],
    default: Option<&'a Value>,
    out: &mut Vec<&'a Value>,
) {
    static NULL: Value = Value::Null;

    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let Some(map) = value.as_object() else {
        return;
    };

    let children: Vec<&Value> = if *head == WILDCARD {
        map.values().collect()
    } else {
        match map.get(*head) {
            Some(child) => vec![child],
            None => {
                out.push(default.unwrap_or(&NULL));
                return;
            }
        }
    };

    for child in children {
        let elements: Vec<&Value> = match child {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for element in elements {
            if rest.is_empty() {
                out.push(element);
            } else {
                collect_leaves(element, rest, default, out);
            }
        }
    }
}
