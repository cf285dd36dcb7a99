//! Structural type covering.
//!
//! `covers(sup, sub)` holds when every value matching `sub` also matches `sup`.
//! The check is conservative: `false` means "not provably covered".

use serde_json::Value;
use toolschema_ir::{
    AdditionalProperties, ArraySchema, Bound, Components, NumberSchema, ObjectSchema, Schema,
    SchemaKind, StringSchema, TupleSchema,
};

/// Format pairs `(wider, narrower)` beyond exact equality.
const FORMAT_WIDENINGS: &[(&str, &str)] = &[
    ("iri", "uri"),
    ("idn-email", "email"),
    ("idn-hostname", "hostname"),
    ("uri", "url"),
    ("iri", "url"),
];

pub fn covers(sup: &Schema, sub: &Schema, components: &Components) -> bool {
    Checker {
        components,
        assumed: Vec::new(),
    }
    .covers(sup, sub)
}

/// Identity of a node on the checking path: references by name, inline nodes by address.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Named(String),
    Inline(usize),
}

impl Node {
    fn of(schema: &Schema) -> Self {
        match &schema.kind {
            SchemaKind::Reference(name) => Node::Named(name.clone()),
            _ => Node::Inline(schema as *const Schema as usize),
        }
    }
}

struct Checker<'a> {
    components: &'a Components,
    /// Pairs on the current path; meeting one again is taken as covered.
    /// Entries are popped on return, so nothing outlives the check that assumed it.
    assumed: Vec<(Node, Node)>,
}

impl Checker<'_> {
    fn covers(&mut self, sup: &Schema, sub: &Schema) -> bool {
        let key = (Node::of(sup), Node::of(sub));
        let Some(sup) = self.components.resolve(sup) else {
            return false;
        };
        if matches!(sup.kind, SchemaKind::Unknown) {
            return true;
        }
        let Some(sub) = self.components.resolve(sub) else {
            return false;
        };

        if self.assumed.contains(&key) {
            return true;
        }
        self.assumed.push(key);
        let covered = self.resolved(sup, sub);
        self.assumed.pop();
        covered
    }

    fn resolved(&mut self, sup: &Schema, sub: &Schema) -> bool {
        if let SchemaKind::OneOf(union) = &sub.kind {
            return union.branches.iter().all(|branch| self.covers(sup, branch));
        }
        if let SchemaKind::OneOf(union) = &sup.kind {
            return union.branches.iter().any(|branch| self.covers(branch, sub));
        }

        match (&sup.kind, &sub.kind) {
            (_, SchemaKind::Unknown) => false,
            (SchemaKind::Constant(a), SchemaKind::Constant(b)) => a == b,
            (_, SchemaKind::Constant(value)) => self.conforms(sup, value),

            (SchemaKind::Null, SchemaKind::Null) | (SchemaKind::Boolean, SchemaKind::Boolean) => {
                true
            }
            (SchemaKind::Constant(Value::Null), SchemaKind::Null) => true,

            (SchemaKind::Number(a), SchemaKind::Number(b)) => numbers(a, b, false),
            (SchemaKind::Number(a) | SchemaKind::Integer(a), SchemaKind::Integer(b)) => {
                numbers(a, b, true)
            }
            (SchemaKind::String(a), SchemaKind::String(b)) => strings(a, b),

            (SchemaKind::Array(a), SchemaKind::Array(b)) => {
                (!a.unique_items || b.unique_items)
                    && counts(a.min_items, a.max_items, b.min_items, b.max_items)
                    && self.covers(&a.items, &b.items)
            }
            (SchemaKind::Array(a), SchemaKind::Tuple(b)) => self.array_tuple(a, b),
            (SchemaKind::Tuple(a), SchemaKind::Tuple(b)) => self.tuples(a, b),
            (SchemaKind::Tuple(a), SchemaKind::Array(b)) => self.tuple_array(a, b),
            (SchemaKind::Object(a), SchemaKind::Object(b)) => self.objects(a, b),

            _ => false,
        }
    }

    fn array_tuple(&mut self, array: &ArraySchema, tuple: &TupleSchema) -> bool {
        let (min, max) = tuple_counts(tuple);
        !array.unique_items
            && counts(array.min_items, array.max_items, Some(min), max)
            && tuple
                .prefix_items
                .iter()
                .chain(tuple.rest.as_deref())
                .all(|item| self.covers(&array.items, item))
    }

    fn tuples(&mut self, sup: &TupleSchema, sub: &TupleSchema) -> bool {
        let (sup_min, sup_max) = tuple_counts(sup);
        let (sub_min, sub_max) = tuple_counts(sub);
        if !counts(Some(sup_min), sup_max, Some(sub_min), sub_max) {
            return false;
        }
        let positions = sup.prefix_items.len().max(sub.prefix_items.len());
        for index in 0..positions {
            match (sup.position(index), sub.position(index)) {
                (Some(a), Some(b)) => {
                    if !self.covers(a, b) {
                        return false;
                    }
                }
                (None, Some(_)) => return false,
                (_, None) => {}
            }
        }
        match (sup.rest.as_deref(), sub.rest.as_deref()) {
            (_, None) => true,
            (Some(a), Some(b)) => self.covers(a, b),
            (None, Some(_)) => false,
        }
    }

    fn tuple_array(&mut self, tuple: &TupleSchema, array: &ArraySchema) -> bool {
        let (min, max) = tuple_counts(tuple);
        if !counts(Some(min), max, array.min_items, array.max_items) {
            return false;
        }
        tuple
            .prefix_items
            .iter()
            .chain(tuple.rest.as_deref())
            .all(|item| self.covers(item, &array.items))
    }

    fn objects(&mut self, sup: &ObjectSchema, sub: &ObjectSchema) -> bool {
        if !sup.required.is_subset(&sub.required) {
            return false;
        }
        let unknown = Schema::unknown();
        let sub_extra = match &sub.additional_properties {
            AdditionalProperties::Forbidden => None,
            AdditionalProperties::Schema(schema) => Some(schema.as_ref()),
            AdditionalProperties::Absent | AdditionalProperties::Allowed => Some(&unknown),
        };

        for (name, sup_property) in &sup.properties {
            let covered = match (sub.properties.get(name), sub_extra) {
                (Some(sub_property), _) => self.covers(sup_property, sub_property),
                (None, Some(extra)) => self.covers(sup_property, extra),
                (None, None) => true,
            };
            if !covered {
                return false;
            }
        }

        for (name, sub_property) in &sub.properties {
            if sup.properties.contains_key(name) {
                continue;
            }
            if !self.admits_extra(&sup.additional_properties, sub_property) {
                return false;
            }
        }

        match sub_extra {
            Some(extra) => self.admits_extra(&sup.additional_properties, extra),
            None => true,
        }
    }

    fn admits_extra(&mut self, additional: &AdditionalProperties, value: &Schema) -> bool {
        match additional {
            AdditionalProperties::Forbidden => false,
            AdditionalProperties::Absent | AdditionalProperties::Allowed => true,
            AdditionalProperties::Schema(schema) => self.covers(schema, value),
        }
    }

    /// Whether a single value matches `schema`.
    fn conforms(&self, schema: &Schema, value: &Value) -> bool {
        let Some(schema) = self.components.resolve(schema) else {
            return false;
        };
        match (&schema.kind, value) {
            (SchemaKind::Unknown, _) => true,
            (SchemaKind::Null, Value::Null) => true,
            (SchemaKind::Boolean, Value::Bool(_)) => true,
            (SchemaKind::Constant(expected), _) => expected == value,
            (SchemaKind::Integer(number), Value::Number(n)) => n
                .as_f64()
                .is_some_and(|v| v.fract() == 0.0 && number_conforms(number, v)),
            (SchemaKind::Number(number), Value::Number(n)) => {
                n.as_f64().is_some_and(|v| number_conforms(number, v))
            }
            (SchemaKind::String(string), Value::String(s)) => {
                let length = s.chars().count() as u64;
                string.pattern.is_none()
                    && string.format.is_none()
                    && string.content_media_type.is_none()
                    && string.min_length.is_none_or(|min| length >= min)
                    && string.max_length.is_none_or(|max| length <= max)
            }
            (SchemaKind::Array(array), Value::Array(values)) => {
                let length = values.len() as u64;
                array.min_items.is_none_or(|min| length >= min)
                    && array.max_items.is_none_or(|max| length <= max)
                    && (!array.unique_items || all_distinct(values))
                    && values.iter().all(|v| self.conforms(&array.items, v))
            }
            (SchemaKind::Tuple(tuple), Value::Array(values)) => {
                let length = values.len() as u64;
                let (min, max) = tuple_counts(tuple);
                length >= min
                    && max.is_none_or(|max| length <= max)
                    && values.iter().enumerate().all(|(index, v)| {
                        tuple
                            .position(index)
                            .is_some_and(|item| self.conforms(item, v))
                    })
            }
            (SchemaKind::Object(object), Value::Object(map)) => {
                object.required.iter().all(|name| map.contains_key(name))
                    && map.iter().all(|(key, v)| match object.properties.get(key) {
                        Some(property) => self.conforms(property, v),
                        None => match &object.additional_properties {
                            AdditionalProperties::Forbidden => false,
                            AdditionalProperties::Schema(extra) => self.conforms(extra, v),
                            _ => true,
                        },
                    })
            }
            (SchemaKind::OneOf(union), _) => {
                union.branches.iter().any(|branch| self.conforms(branch, value))
            }
            _ => false,
        }
    }
}

/// Item counts a tuple can have.
fn tuple_counts(tuple: &TupleSchema) -> (u64, Option<u64>) {
    let length = tuple.prefix_items.len() as u64;
    let min = tuple.min_items.unwrap_or(length).max(length);
    let max = match (&tuple.rest, tuple.max_items) {
        (None, max) => Some(max.map_or(length, |max| max.min(length))),
        (Some(_), max) => max,
    };
    (min, max)
}

fn counts(sup_min: Option<u64>, sup_max: Option<u64>, sub_min: Option<u64>, sub_max: Option<u64>) -> bool {
    let lower = sup_min.unwrap_or(0) <= sub_min.unwrap_or(0);
    let upper = match (sup_max, sub_max) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => a >= b,
    };
    lower && upper
}

fn numbers(sup: &NumberSchema, sub: &NumberSchema, sub_integer: bool) -> bool {
    let lower = match (sup.minimum, sub.minimum) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => bound_covers(a, b, |x, y| x < y),
    };
    let upper = match (sup.maximum, sub.maximum) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => bound_covers(a, b, |x, y| x > y),
    };
    let multiple = match (sup.multiple_of, sub.multiple_of) {
        (None, _) => true,
        (Some(a), Some(b)) => is_integer_multiple(b, a),
        (Some(a), None) => sub_integer && is_integer_multiple(1.0, a),
    };
    lower && upper && multiple
}

/// `looser(a, b)` holds when `a` is strictly looser than `b`.
fn bound_covers(sup: Bound, sub: Bound, looser: impl Fn(f64, f64) -> bool) -> bool {
    if sup.exclusive && !sub.exclusive {
        looser(sup.value, sub.value)
    } else {
        sup.value == sub.value || looser(sup.value, sub.value)
    }
}

fn is_integer_multiple(value: f64, of: f64) -> bool {
    if of <= 0.0 {
        return false;
    }
    let quotient = value / of;
    quotient.round() != 0.0 && (quotient - quotient.round()).abs() < 1e-9
}

fn number_conforms(number: &NumberSchema, value: f64) -> bool {
    let lower = number.minimum.is_none_or(|bound| {
        if bound.exclusive {
            value > bound.value
        } else {
            value >= bound.value
        }
    });
    let upper = number.maximum.is_none_or(|bound| {
        if bound.exclusive {
            value < bound.value
        } else {
            value <= bound.value
        }
    });
    let multiple = number
        .multiple_of
        .is_none_or(|of| value == 0.0 || is_integer_multiple(value, of));
    lower && upper && multiple
}

fn strings(sup: &StringSchema, sub: &StringSchema) -> bool {
    let lower = sup.min_length.unwrap_or(0) <= sub.min_length.unwrap_or(0);
    let upper = match (sup.max_length, sub.max_length) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => a >= b,
    };
    let pattern = sup.pattern.is_none() || sup.pattern == sub.pattern;
    let format = match (&sup.format, &sub.format) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => {
            a == b
                || FORMAT_WIDENINGS
                    .iter()
                    .any(|(wide, narrow)| a == wide && b == narrow)
        }
    };
    let media_type =
        sup.content_media_type.is_none() || sup.content_media_type == sub.content_media_type;
    lower && upper && pattern && format && media_type
}

fn all_distinct(values: &[Value]) -> bool {
    values
        .iter()
        .enumerate()
        .all(|(index, value)| !values[..index].contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolschema_ir::{NumberSchema, ObjectSchema};

    fn check(sup: &Schema, sub: &Schema) -> bool {
        covers(sup, sub, &Components::new())
    }

    fn integer(minimum: Option<Bound>, multiple_of: Option<f64>) -> Schema {
        Schema::new(SchemaKind::Integer(NumberSchema {
            minimum,
            maximum: None,
            multiple_of,
        }))
    }

    fn string_format(format: &str) -> Schema {
        Schema::new(SchemaKind::String(StringSchema {
            format: Some(format.to_string()),
            ..Default::default()
        }))
    }

    #[test]
    fn any_covers_everything_and_only_any_covers_any() {
        assert!(check(&Schema::unknown(), &Schema::string()));
        assert!(check(&Schema::unknown(), &Schema::unknown()));
        assert!(!check(&Schema::string(), &Schema::unknown()));
    }

    #[test]
    fn integer_is_a_number() {
        assert!(check(&Schema::number(), &Schema::integer()));
        assert!(!check(&Schema::integer(), &Schema::number()));
    }

    #[test]
    fn exclusive_bounds() {
        let inclusive_zero = integer(Some(Bound::inclusive(0.0)), None);
        let exclusive_zero = integer(Some(Bound::exclusive(0.0)), None);
        let exclusive_minus = integer(Some(Bound::exclusive(-1.0)), None);

        assert!(check(&inclusive_zero, &exclusive_zero));
        assert!(!check(&exclusive_zero, &inclusive_zero));
        assert!(check(&exclusive_minus, &inclusive_zero));
        assert!(!check(&inclusive_zero, &Schema::integer()));
    }

    #[test]
    fn multiple_of() {
        assert!(check(&integer(None, Some(2.0)), &integer(None, Some(6.0))));
        assert!(!check(&integer(None, Some(4.0)), &integer(None, Some(6.0))));
        assert!(check(&integer(None, Some(1.0)), &Schema::integer()));
        assert!(!check(
            &Schema::new(SchemaKind::Number(NumberSchema {
                multiple_of: Some(1.0),
                ..Default::default()
            })),
            &Schema::number()
        ));
    }

    #[test]
    fn format_whitelist_is_not_reflexive_in_reverse() {
        assert!(check(&string_format("iri"), &string_format("uri")));
        assert!(check(&string_format("uri"), &string_format("url")));
        assert!(check(&string_format("idn-email"), &string_format("email")));
        assert!(!check(&string_format("uri"), &string_format("iri")));
        assert!(!check(&string_format("email"), &Schema::string()));
        assert!(check(&Schema::string(), &string_format("email")));
    }

    #[test]
    fn nullable_covers_base_not_vice_versa() {
        let base = Schema::object(ObjectSchema::new().property("x", Schema::number(), true));
        let nullable = base.clone().nullable();
        assert!(check(&nullable, &base));
        assert!(!check(&base, &nullable));
    }

    #[test]
    fn enums_by_value_set() {
        let abc = Schema::one_of(vec![
            Schema::constant("a"),
            Schema::constant("b"),
            Schema::constant("c"),
        ]);
        let ab = Schema::one_of(vec![Schema::constant("a"), Schema::constant("b")]);
        assert!(check(&abc, &ab));
        assert!(!check(&ab, &abc));
        assert!(check(&Schema::string(), &abc));
    }

    #[test]
    fn objects_required_and_extra_properties() {
        let mut closed = ObjectSchema::new().property("id", Schema::string(), true);
        closed.additional_properties = AdditionalProperties::Forbidden;
        let closed = Schema::object(closed);

        let wider = Schema::object(
            ObjectSchema::new()
                .property("id", Schema::string(), true)
                .property("name", Schema::string(), false),
        );
        let open = Schema::object(ObjectSchema::new().property("id", Schema::string(), true));

        // A closed sub never carries "name"; an open one might carry anything.
        assert!(check(&wider, &closed));
        assert!(!check(&wider, &open));
        assert!(!check(&closed, &wider));
        assert!(check(&open, &wider));
    }

    #[test]
    fn array_covers_tuple_of_its_items() {
        let tuple = Schema::tuple(vec![Schema::integer(), Schema::number()]);
        assert!(check(&Schema::array(Schema::number()), &tuple));
        assert!(!check(&Schema::array(Schema::integer()), &tuple));
    }

    #[test]
    fn recursive_references_are_coinductive() {
        let list = |next: &str| {
            Schema::object(
                ObjectSchema::new()
                    .property("value", Schema::integer(), true)
                    .property("next", Schema::reference(next).nullable(), false),
            )
        };
        let components = Components::new()
            .with("IList", list("IList"))
            .with("IIntList", list("IIntList"));
        assert!(covers(
            &Schema::reference("IList"),
            &Schema::reference("IIntList"),
            &components
        ));
    }

    #[test]
    fn failed_branch_leaves_no_assumption_behind() {
        let components = Components::new()
            .with(
                "X",
                Schema::object(
                    ObjectSchema::new()
                        .property("a", Schema::reference("X2"), true)
                        .property("z", Schema::string(), true),
                ),
            )
            .with(
                "X2",
                Schema::object(ObjectSchema::new().property("a", Schema::reference("X"), true)),
            )
            .with(
                "Y",
                Schema::object(
                    ObjectSchema::new()
                        .property("a", Schema::reference("Y2"), true)
                        .property("z", Schema::number(), true),
                ),
            )
            .with(
                "Y2",
                Schema::object(ObjectSchema::new().property("a", Schema::reference("Y"), true)),
            )
            .with(
                "Z",
                Schema::one_of(vec![Schema::reference("X"), Schema::unknown()]),
            );
        let x2 = Schema::reference("X2");
        let y2 = Schema::reference("Y2");
        assert!(!covers(&x2, &y2, &components));

        // Trying `X` inside `Z` assumes (X2, Y2) before failing on `z`.
        let sup = Schema::object(
            ObjectSchema::new()
                .property("a", Schema::reference("Z"), true)
                .property("b", x2.clone(), true),
        );
        let sub = Schema::object(
            ObjectSchema::new()
                .property("a", Schema::reference("Y"), true)
                .property("b", y2.clone(), true),
        );
        assert!(!covers(&sup, &sub, &components));
    }

    #[test]
    fn same_definitions_reached_from_different_places() {
        let list = |next: &str| {
            Schema::object(
                ObjectSchema::new()
                    .property("value", Schema::integer(), true)
                    .property("next", Schema::reference(next).nullable(), false),
            )
        };
        let components = Components::new()
            .with("IList", list("IList"))
            .with("IIntList", list("IIntList"));
        // Inline copies of the definitions, not the stored entries.
        assert!(covers(&list("IList"), &list("IIntList"), &components));
    }

    #[test]
    fn dangling_references_cover_nothing() {
        let dangling = Schema::reference("IMissing");
        assert!(!check(&dangling, &Schema::string()));
        assert!(!check(&Schema::string(), &dangling));
        assert!(check(&Schema::unknown(), &dangling));
    }
}
