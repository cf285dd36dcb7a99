//! Projecting values onto a split and merging them back.

use super::{Placement, Separated, Shape, branch_for};
use crate::error::MergeError;
use serde_json::{Map, Value};

impl Separated {
    /// Projects a value conforming to the unsplit schema onto both sides.
    ///
    /// A side without a schema gets `None`.
    pub fn split_value(&self, value: &Value) -> (Option<Value>, Option<Value>) {
        let (llm, human) = self.split(value, &self.root);
        (
            llm.filter(|_| self.llm.is_some()),
            human.filter(|_| self.human.is_some()),
        )
    }

    fn split(&self, value: &Value, placement: &Placement) -> (Option<Value>, Option<Value>) {
        let shape = match placement {
            Placement::Llm => return (Some(value.clone()), None),
            Placement::Human => return (None, Some(value.clone())),
            Placement::Split(shape) => shape,
        };
        match (shape, value) {
            (Shape::Reference(name), _) => match self.defs.get(name) {
                Some(placement) => self.split(value, placement),
                None => (Some(value.clone()), None),
            },
            (Shape::Object(shape), Value::Object(map)) => {
                let mut llm = Map::new();
                let mut human = Map::new();
                for (key, value) in map {
                    let (l, h) = self.split(value, shape.placement(key));
                    if let Some(l) = l {
                        llm.insert(key.clone(), l);
                    }
                    if let Some(h) = h {
                        human.insert(key.clone(), h);
                    }
                }
                (Some(Value::Object(llm)), Some(Value::Object(human)))
            }
            (Shape::Array(items), Value::Array(values)) => {
                let (llm, human): (Vec<_>, Vec<_>) = values
                    .iter()
                    .map(|value| {
                        let (l, h) = self.split(value, items);
                        (l.unwrap_or(Value::Null), h.unwrap_or(Value::Null))
                    })
                    .unzip();
                (Some(Value::Array(llm)), Some(Value::Array(human)))
            }
            (Shape::Union(branches), value) if !value.is_null() => {
                match branch_for(branches, value) {
                    Some(branch) => self.split(value, &branch.placement),
                    None => (Some(value.clone()), None),
                }
            }
            // Null, or a value of the wrong shape: both sides see it.
            _ => (Some(value.clone()), Some(value.clone())),
        }
    }

    /// Merges the model's and the caller's values.
    ///
    /// Objects merge key-wise; on a leaf both sides filled in, the caller's
    /// value wins. Arrays whose items were split merge element-wise when both
    /// sides have the same length. A value for a side with no schema is
    /// ignored.
    pub fn merge(&self, llm: Option<Value>, human: Option<Value>) -> Value {
        let llm = llm.filter(|_| self.llm.is_some());
        let human = human.filter(|_| self.human.is_some());
        match (llm, human) {
            (Some(llm), Some(human)) => self.merge_at(llm, human, &self.root),
            (Some(value), None) | (None, Some(value)) => value,
            (None, None) => Value::Null,
        }
    }

    fn merge_at(&self, llm: Value, human: Value, placement: &Placement) -> Value {
        let Placement::Split(shape) = placement else {
            return merge_values(llm, human);
        };
        match (shape, llm, human) {
            (Shape::Reference(name), llm, human) => match self.defs.get(name) {
                Some(placement) => self.merge_at(llm, human, placement),
                None => merge_values(llm, human),
            },
            (Shape::Object(shape), Value::Object(mut llm), Value::Object(human)) => {
                for (key, h) in human {
                    let merged = match llm.remove(&key) {
                        Some(l) => self.merge_at(l, h, shape.placement(&key)),
                        None => h,
                    };
                    llm.insert(key, merged);
                }
                Value::Object(llm)
            }
            (Shape::Array(items), Value::Array(llm), Value::Array(human))
                if llm.len() == human.len() =>
            {
                Value::Array(
                    llm.into_iter()
                        .zip(human)
                        .map(|(l, h)| self.merge_at(l, h, items))
                        .collect(),
                )
            }
            (Shape::Union(branches), llm, human) => {
                // The side that did not get this branch holds a null placeholder;
                // otherwise both halves together identify the branch.
                let whole = match (&llm, &human) {
                    (llm, Value::Null) => llm.clone(),
                    (Value::Null, human) => human.clone(),
                    (llm, human) => merge_values(llm.clone(), human.clone()),
                };
                match branch_for(branches, &whole).map(|branch| &branch.placement) {
                    Some(Placement::Llm) => llm,
                    Some(Placement::Human) => human,
                    Some(placement) => self.merge_at(llm, human, placement),
                    None => merge_values(llm, human),
                }
            }
            (_, llm, human) => merge_values(llm, human),
        }
    }
}

/// Unguided merge: objects key-wise, everything else replaced by `human`.
pub fn merge_values(llm: Value, human: Value) -> Value {
    match (llm, human) {
        (Value::Object(mut llm), Value::Object(human)) => {
            for (key, h) in human {
                let merged = match llm.remove(&key) {
                    Some(l) => merge_values(l, h),
                    None => h,
                };
                llm.insert(key, merged);
            }
            Value::Object(llm)
        }
        (_, human) => human,
    }
}

/// Merges positional arguments, one record per parameter.
pub fn merge_positional(
    records: &[Separated],
    llm: Vec<Value>,
    human: Vec<Value>,
) -> Result<Vec<Value>, MergeError> {
    if llm.len() != records.len() || human.len() != records.len() {
        return Err(MergeError::LengthMismatch {
            expected: records.len(),
            llm: llm.len(),
            human: human.len(),
        });
    }
    Ok(records
        .iter()
        .zip(llm.into_iter().zip(human))
        .map(|(record, (llm, human))| record.merge(Some(llm), Some(human)))
        .collect())
}
