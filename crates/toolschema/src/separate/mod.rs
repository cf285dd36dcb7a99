//! Splitting a converted tool schema between the model and the caller.
//!
//! A predicate picks the nodes the caller fills in (the human side); the rest
//! is left for the model (the llm side). The split is recorded so values can
//! later be projected onto both halves and merged back.

mod merge;

pub use merge::{merge_positional, merge_values};

use crate::dialect::{Defs, DialectDocument, DialectKind, DialectSchema};
use serde_json::Value;
use std::collections::BTreeMap;
use toolschema_ir::{AdditionalProperties, ObjectSchema, OneOfSchema};

/// Both halves of a separated schema plus the record of how it was split.
#[derive(Debug, Clone, PartialEq)]
pub struct Separated {
    pub llm: Option<DialectDocument>,
    pub human: Option<DialectDocument>,
    root: Placement,
    defs: BTreeMap<String, Placement>,
}

/// Any string node carrying `contentMediaType`.
pub fn has_content_media_type(schema: &DialectSchema) -> bool {
    matches!(&schema.kind, DialectKind::String(string) if string.content_media_type.is_some())
}

/// String nodes whose `contentMediaType` is one of `media_types`.
pub fn content_media_type_in(media_types: &[String]) -> impl Fn(&DialectSchema) -> bool + '_ {
    move |schema| {
        matches!(
            &schema.kind,
            DialectKind::String(string)
                if string.content_media_type.as_ref().is_some_and(|m| media_types.contains(m))
        )
    }
}

pub fn separate(document: &DialectDocument, predicate: impl Fn(&DialectSchema) -> bool) -> Separated {
    let separator = Separator {
        document,
        predicate: &predicate,
    };
    let defs = separator.place_defs();
    let root = separator.place(&document.schema, &defs);
    let llm = separator.side(&root, &defs, Side::Llm);
    let human = separator.side(&root, &defs, Side::Human);
    tracing::debug!(
        llm = llm.is_some(),
        human = human.is_some(),
        split_defs = defs.values().filter(|p| matches!(p, Placement::Split(_))).count(),
        "separated schema"
    );
    Separated {
        llm,
        human,
        root,
        defs,
    }
}

/// [`separate`] for each parameter of a positional signature.
pub fn separate_positional(
    documents: &[DialectDocument],
    predicate: impl Fn(&DialectSchema) -> bool,
) -> Vec<Separated> {
    documents
        .iter()
        .map(|document| separate(document, &predicate))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Llm,
    Human,
}

impl Side {
    fn suffix(self) -> &'static str {
        match self {
            Side::Llm => "Llm",
            Side::Human => "Human",
        }
    }
}

/// Where a node ends up.
#[derive(Debug, Clone, PartialEq)]
enum Placement {
    Llm,
    Human,
    /// Present on both sides, each with its own part.
    Split(Shape),
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Object(ObjectShape),
    Array(Box<Placement>),
    Union(Vec<Branch>),
    /// Placement of the named definition.
    Reference(String),
}

#[derive(Debug, Clone, PartialEq)]
struct ObjectShape {
    properties: BTreeMap<String, Placement>,
    /// Placement of `additionalProperties` when it is a schema.
    additional: Option<Box<Placement>>,
}

impl ObjectShape {
    /// Placement of the value under `key`; undeclared keys follow `additionalProperties`.
    fn placement(&self, key: &str) -> &Placement {
        self.properties
            .get(key)
            .or(self.additional.as_deref())
            .unwrap_or(&Placement::Llm)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Branch {
    null: bool,
    types: Vec<ValueType>,
    /// Set when the branch resolves to an object.
    object: Option<ObjectKeys>,
    placement: Placement,
}

impl Branch {
    fn admits(&self, value: &Value) -> bool {
        self.types.iter().any(|t| t.admits(value))
    }

    /// Whether an object value carries this branch's required keys and tags.
    fn fits(&self, value: &Value) -> bool {
        match (&self.object, value) {
            (Some(keys), Value::Object(map)) => {
                keys.required.iter().all(|key| map.contains_key(key))
                    && keys
                        .tags
                        .iter()
                        .all(|(key, tag)| map.get(key).is_none_or(|v| v == tag))
                    && (!keys.closed || map.keys().all(|key| keys.properties.contains(key)))
            }
            _ => false,
        }
    }
}

/// What tells one object branch of a union from another.
#[derive(Debug, Clone, PartialEq)]
struct ObjectKeys {
    required: Vec<String>,
    properties: Vec<String>,
    /// Properties fixed to a single value.
    tags: BTreeMap<String, Value>,
    closed: bool,
}

/// JSON value types a union branch admits; picks the branch for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Any,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueType {
    fn admits(self, value: &Value) -> bool {
        match self {
            ValueType::Any => true,
            ValueType::Null => value.is_null(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Number => value.is_number(),
            ValueType::String => value.is_string(),
            ValueType::Array => value.is_array(),
            ValueType::Object => value.is_object(),
        }
    }

    fn of(value: &Value) -> ValueType {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }
}

/// Non-null branch for `value`: the first object branch it fits, else the
/// first branch admitting its JSON type.
fn branch_for<'b>(branches: &'b [Branch], value: &Value) -> Option<&'b Branch> {
    let mut candidates = branches
        .iter()
        .filter(|branch| !branch.null && branch.admits(value));
    let first = candidates.clone().next();
    candidates.find(|branch| branch.fits(value)).or(first)
}

/// `Some` when every part lands on the same side. No parts is a leaf.
fn collapse<'p>(parts: impl IntoIterator<Item = &'p Placement>) -> Option<Placement> {
    let (mut llm, mut human) = (false, false);
    for part in parts {
        match part {
            Placement::Llm => llm = true,
            Placement::Human => human = true,
            Placement::Split(_) => return None,
        }
    }
    match (llm, human) {
        (true, true) => None,
        (false, true) => Some(Placement::Human),
        _ => Some(Placement::Llm),
    }
}

struct Separator<'a> {
    document: &'a DialectDocument,
    predicate: &'a dyn Fn(&DialectSchema) -> bool,
}

impl Separator<'_> {
    /// Definition placements, iterated to a fixpoint so recursive definitions
    /// see their own split.
    fn place_defs(&self) -> BTreeMap<String, Placement> {
        let mut placements: BTreeMap<String, Placement> = self
            .document
            .defs
            .keys()
            .map(|name| (name.clone(), Placement::Llm))
            .collect();
        // A definition only moves from llm to split to human.
        for _ in 0..2 * self.document.defs.len() + 2 {
            let next: BTreeMap<String, Placement> = self
                .document
                .defs
                .iter()
                .map(|(name, schema)| (name.clone(), self.place(schema, &placements)))
                .collect();
            if next == placements {
                break;
            }
            placements = next;
        }
        placements
    }

    fn place(&self, schema: &DialectSchema, defs: &BTreeMap<String, Placement>) -> Placement {
        if (self.predicate)(schema) {
            return Placement::Human;
        }
        match &schema.kind {
            DialectKind::Reference(name) => match defs.get(name) {
                Some(Placement::Split(_)) => Placement::Split(Shape::Reference(name.clone())),
                Some(Placement::Human) => Placement::Human,
                _ => Placement::Llm,
            },
            DialectKind::Object(object) => {
                let properties: BTreeMap<String, Placement> = object
                    .properties
                    .iter()
                    .map(|(name, property)| (name.clone(), self.place(property, defs)))
                    .collect();
                let additional = match &object.additional_properties {
                    AdditionalProperties::Schema(additional) => {
                        Some(Box::new(self.place(additional, defs)))
                    }
                    _ => None,
                };
                collapse(properties.values().chain(additional.as_deref())).unwrap_or(
                    Placement::Split(Shape::Object(ObjectShape {
                        properties,
                        additional,
                    })),
                )
            }
            DialectKind::Array(array) => match self.place(&array.items, defs) {
                Placement::Split(shape) => {
                    Placement::Split(Shape::Array(Box::new(Placement::Split(shape))))
                }
                whole => whole,
            },
            DialectKind::Tuple(tuple) => {
                let human = tuple
                    .prefix_items
                    .iter()
                    .chain(tuple.rest.as_deref())
                    .any(|item| self.place(item, defs) != Placement::Llm);
                if human {
                    Placement::Human
                } else {
                    Placement::Llm
                }
            }
            DialectKind::Union(union) => {
                let branches: Vec<Branch> = union
                    .branches
                    .iter()
                    .map(|branch| Branch {
                        null: branch.is_null(),
                        types: self.value_types(branch, 0),
                        object: self.object_keys(branch),
                        placement: if branch.is_null() {
                            Placement::Llm
                        } else {
                            self.place(branch, defs)
                        },
                    })
                    .collect();
                collapse(
                    branches
                        .iter()
                        .filter(|branch| !branch.null)
                        .map(|branch| &branch.placement),
                )
                .unwrap_or(Placement::Split(Shape::Union(branches)))
            }
            _ => Placement::Llm,
        }
    }

    fn object_keys(&self, schema: &DialectSchema) -> Option<ObjectKeys> {
        let DialectKind::Object(object) = &self.document.resolve(schema)?.kind else {
            return None;
        };
        let tags = object
            .properties
            .iter()
            .filter_map(|(name, property)| {
                let value = match &self.document.resolve(property)?.kind {
                    DialectKind::Constant(value) => value,
                    DialectKind::Enum(e) if e.values.len() == 1 => &e.values[0],
                    _ => return None,
                };
                Some((name.clone(), value.clone()))
            })
            .collect();
        Some(ObjectKeys {
            required: object.required.iter().cloned().collect(),
            properties: object.properties.keys().cloned().collect(),
            tags,
            closed: matches!(object.additional_properties, AdditionalProperties::Forbidden),
        })
    }

    fn value_types(&self, schema: &DialectSchema, depth: usize) -> Vec<ValueType> {
        let Some(resolved) = self.document.resolve(schema).filter(|_| depth < 8) else {
            return vec![ValueType::Any];
        };
        let mut types = match &resolved.kind {
            DialectKind::Unknown => vec![ValueType::Any],
            DialectKind::Null => vec![ValueType::Null],
            DialectKind::Boolean => vec![ValueType::Boolean],
            DialectKind::Integer(_) | DialectKind::Number(_) => vec![ValueType::Number],
            DialectKind::String(_) => vec![ValueType::String],
            DialectKind::Enum(e) => e.values.iter().map(ValueType::of).collect(),
            DialectKind::Constant(value) => vec![ValueType::of(value)],
            DialectKind::Array(_) | DialectKind::Tuple(_) => vec![ValueType::Array],
            DialectKind::Object(_) => vec![ValueType::Object],
            DialectKind::Union(union) => union
                .branches
                .iter()
                .flat_map(|branch| self.value_types(branch, depth + 1))
                .collect(),
            DialectKind::Reference(_) => vec![ValueType::Any],
        };
        if schema.nullable || resolved.nullable {
            types.push(ValueType::Null);
        }
        types
    }

    fn side(
        &self,
        root: &Placement,
        placements: &BTreeMap<String, Placement>,
        side: Side,
    ) -> Option<DialectDocument> {
        let mut projection = Projection {
            side,
            split_names: BTreeMap::new(),
        };
        let schema = projection.project(&self.document.schema, root)?;

        let mut defs = Defs::new();
        let mut pending = Vec::new();
        references(&schema, &mut pending);
        while let Some(name) = pending.pop() {
            if defs.contains_key(&name) {
                continue;
            }
            let definition = match projection.split_names.get(&name).cloned() {
                Some(base) => match (self.document.defs.get(&base), placements.get(&base)) {
                    (Some(source), Some(placement)) => projection.project(source, placement),
                    _ => None,
                },
                None => self.document.defs.get(&name).cloned(),
            };
            if let Some(definition) = definition {
                references(&definition, &mut pending);
                defs.insert(name, definition);
            }
        }
        Some(DialectDocument::new(schema, defs))
    }
}

/// Builds one side of the split.
struct Projection {
    side: Side,
    /// `Name.Llm` / `Name.Human` back to `Name`.
    split_names: BTreeMap<String, String>,
}

impl Projection {
    fn project(&mut self, schema: &DialectSchema, placement: &Placement) -> Option<DialectSchema> {
        match (placement, self.side) {
            (Placement::Llm, Side::Llm) | (Placement::Human, Side::Human) => Some(schema.clone()),
            (Placement::Split(shape), _) => Some(self.split(schema, shape)),
            _ => None,
        }
    }

    fn split(&mut self, schema: &DialectSchema, shape: &Shape) -> DialectSchema {
        let kind = match (&schema.kind, shape) {
            (DialectKind::Object(object), Shape::Object(shape)) => {
                let mut projected = ObjectSchema::<DialectSchema>::new();
                for (name, property) in &object.properties {
                    if let Some(property) = self.project(property, shape.placement(name)) {
                        if object.is_required(name) {
                            projected.required.insert(name.clone());
                        }
                        projected.properties.insert(name.clone(), property);
                    }
                }
                projected.additional_properties = match (
                    self.side,
                    &object.additional_properties,
                    shape.additional.as_deref(),
                ) {
                    (_, AdditionalProperties::Schema(additional), Some(placement)) => {
                        match self.project(additional, placement) {
                            Some(additional) => AdditionalProperties::Schema(Box::new(additional)),
                            None => AdditionalProperties::Forbidden,
                        }
                    }
                    (Side::Llm, additional, _) => additional.clone(),
                    (Side::Human, AdditionalProperties::Forbidden, _) => {
                        AdditionalProperties::Forbidden
                    }
                    (Side::Human, _, _) => AdditionalProperties::Absent,
                };
                DialectKind::Object(projected)
            }
            (DialectKind::Array(array), Shape::Array(items)) => {
                let projected = self
                    .project(&array.items, items)
                    .unwrap_or_else(|| DialectSchema::new(DialectKind::Unknown));
                DialectKind::Array(array.with_items(projected))
            }
            (DialectKind::Union(union), Shape::Union(branches)) => {
                let mut kept: Vec<DialectSchema> = union
                    .branches
                    .iter()
                    .zip(branches)
                    .filter_map(|(schema, branch)| {
                        if branch.null {
                            Some(schema.clone())
                        } else {
                            self.project(schema, &branch.placement)
                        }
                    })
                    .collect();
                if kept.len() == 1 {
                    if let Some(mut only) = kept.pop() {
                        only.meta = schema.meta.clone().or(&only.meta);
                        only.nullable |= schema.nullable;
                        return only;
                    }
                }
                DialectKind::Union(OneOfSchema::new(kept))
            }
            (DialectKind::Reference(name), Shape::Reference(_)) => {
                let split = format!("{name}.{}", self.side.suffix());
                self.split_names.insert(split.clone(), name.clone());
                DialectKind::Reference(split)
            }
            (kind, _) => kind.clone(),
        };
        DialectSchema {
            meta: schema.meta.clone(),
            nullable: schema.nullable,
            kind,
        }
    }
}

/// Collects every reference name under `schema`.
fn references(schema: &DialectSchema, names: &mut Vec<String>) {
    match &schema.kind {
        DialectKind::Reference(name) => names.push(name.clone()),
        DialectKind::Array(array) => references(&array.items, names),
        DialectKind::Tuple(tuple) => {
            for item in tuple.prefix_items.iter().chain(tuple.rest.as_deref()) {
                references(item, names);
            }
        }
        DialectKind::Object(object) => {
            for property in object.properties.values() {
                references(property, names);
            }
            if let AdditionalProperties::Schema(additional) = &object.additional_properties {
                references(additional, names);
            }
        }
        DialectKind::Union(union) => {
            for branch in &union.branches {
                references(branch, names);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert;
    use crate::dialect::{CLAUDE, OPENAPI_3_0};
    use crate::options::ConvertOptions;
    use serde_json::json;
    use toolschema_ir::{Components, ObjectSchema, Schema, SchemaKind, StringSchema};

    fn file() -> Schema {
        Schema::new(SchemaKind::String(StringSchema {
            content_media_type: Some("image/png".into()),
            ..Default::default()
        }))
    }

    fn converted(schema: &Schema, components: &Components) -> DialectDocument {
        convert(schema, components, &CLAUDE, &ConvertOptions::default()).unwrap()
    }

    #[test]
    fn properties_are_split_by_predicate() {
        let schema = Schema::object(
            ObjectSchema::new()
                .property("prompt", Schema::string(), true)
                .property("image", file(), true),
        );
        let separated = separate(&converted(&schema, &Components::new()), has_content_media_type);

        let llm = separated.llm.unwrap().to_json(&CLAUDE);
        let human = separated.human.unwrap().to_json(&CLAUDE);
        assert_eq!(llm["properties"], json!({"prompt": {"type": "string"}}));
        assert_eq!(llm["required"], json!(["prompt"]));
        assert_eq!(human["required"], json!(["image"]));
        assert_eq!(
            human["properties"]["image"],
            json!({"type": "string", "contentMediaType": "image/png"})
        );
    }

    #[test]
    fn nothing_matching_stays_on_llm_side() {
        let schema = Schema::object(ObjectSchema::new().property("q", Schema::string(), true));
        let document = converted(&schema, &Components::new());
        let separated = separate(&document, has_content_media_type);
        assert_eq!(separated.llm, Some(document));
        assert_eq!(separated.human, None);
    }

    #[test]
    fn zero_property_object_is_a_leaf() {
        let document = converted(&Schema::object(ObjectSchema::new()), &Components::new());
        let separated = separate(&document, has_content_media_type);
        assert!(separated.llm.is_some());
        assert!(separated.human.is_none());
    }

    #[test]
    fn split_definitions_get_side_names() {
        let components = Components::new()
            .with(
                "IAttachment",
                Schema::object(
                    ObjectSchema::new()
                        .property("caption", Schema::string(), true)
                        .property("data", file(), true),
                ),
            )
            .with(
                "IAuthor",
                Schema::object(ObjectSchema::new().property("name", Schema::string(), true)),
            );
        let schema = Schema::object(
            ObjectSchema::new()
                .property("attachment", Schema::reference("IAttachment"), true)
                .property("author", Schema::reference("IAuthor"), true),
        );
        let separated = separate(&converted(&schema, &components), has_content_media_type);

        let llm = separated.llm.unwrap();
        let human = separated.human.unwrap();
        assert_eq!(
            llm.defs.keys().collect::<Vec<_>>(),
            ["IAttachment.Llm", "IAuthor"]
        );
        assert_eq!(human.defs.keys().collect::<Vec<_>>(), ["IAttachment.Human"]);
        assert_eq!(
            human.to_json(&CLAUDE)["properties"],
            json!({"attachment": {"$ref": "#/$defs/IAttachment.Human"}})
        );
    }

    #[test]
    fn tuples_move_wholesale() {
        let schema = Schema::object(ObjectSchema::new().property(
            "pair",
            Schema::tuple(vec![Schema::string(), file()]),
            true,
        ));
        let document = convert(
            &schema,
            &Components::new(),
            &crate::dialect::OPENAPI_3_1,
            &ConvertOptions::default(),
        )
        .unwrap();
        let separated = separate(&document, has_content_media_type);
        assert!(separated.llm.is_none());
        assert!(separated.human.is_some());
    }

    #[test]
    fn null_branches_follow_to_both_sides() {
        let schema = Schema::object(ObjectSchema::new().property(
            "input",
            Schema::one_of(vec![Schema::string(), file().nullable()]),
            true,
        ));
        let document = convert(
            &schema,
            &Components::new(),
            &crate::dialect::OPENAPI_3_1,
            &ConvertOptions::default(),
        )
        .unwrap();
        let separated = separate(&document, has_content_media_type);
        let llm = separated.llm.unwrap().to_json(&crate::dialect::OPENAPI_3_1);
        let human = separated.human.unwrap().to_json(&crate::dialect::OPENAPI_3_1);
        assert_eq!(
            llm["schema"]["properties"]["input"],
            json!({"oneOf": [{"type": "null"}, {"type": "string"}]})
        );
        assert_eq!(
            human["schema"]["properties"]["input"],
            json!({"oneOf": [{"type": "null"}, {"type": "string", "contentMediaType": "image/png"}]})
        );
    }

    #[test]
    fn additional_properties_are_placed_like_properties() {
        let mut object = ObjectSchema::new().property("prompt", Schema::string(), true);
        object.additional_properties = AdditionalProperties::Schema(Box::new(file()));
        let separated = separate(
            &converted(&Schema::object(object), &Components::new()),
            has_content_media_type,
        );

        let llm = separated.llm.as_ref().unwrap().to_json(&CLAUDE);
        let human = separated.human.as_ref().unwrap().to_json(&CLAUDE);
        assert_eq!(llm["properties"], json!({"prompt": {"type": "string"}}));
        assert_eq!(llm["additionalProperties"], json!(false));
        assert_eq!(
            human["additionalProperties"],
            json!({"type": "string", "contentMediaType": "image/png"})
        );

        let value = json!({"prompt": "compare", "left.png": "iVBOR", "right.png": "iVBOq"});
        let (llm, human) = separated.split_value(&value);
        assert_eq!(llm, Some(json!({"prompt": "compare"})));
        assert_eq!(human, Some(json!({"left.png": "iVBOR", "right.png": "iVBOq"})));
        assert_eq!(separated.merge(llm, human), value);
    }

    #[test]
    fn map_of_files_goes_to_caller() {
        let mut object = ObjectSchema::new();
        object.additional_properties = AdditionalProperties::Schema(Box::new(file()));
        let separated = separate(
            &converted(&Schema::object(object), &Components::new()),
            has_content_media_type,
        );
        assert!(separated.llm.is_none());
        assert!(separated.human.is_some());
    }

    #[test]
    fn object_branches_are_told_apart_by_tags() {
        let text = Schema::object(
            ObjectSchema::new()
                .property("kind", Schema::constant("text"), true)
                .property("body", Schema::string(), true),
        );
        let image = Schema::object(
            ObjectSchema::new()
                .property("kind", Schema::constant("image"), true)
                .property("data", file(), true),
        );
        let schema = Schema::object(ObjectSchema::new().property(
            "content",
            Schema::one_of(vec![text, image]),
            true,
        ));
        let separated = separate(&converted(&schema, &Components::new()), has_content_media_type);

        let value = json!({"content": {"kind": "image", "data": "iVBOR"}});
        let (llm, human) = separated.split_value(&value);
        assert_eq!(llm, Some(json!({"content": {"kind": "image"}})));
        assert_eq!(human, Some(json!({"content": {"data": "iVBOR"}})));
        assert_eq!(separated.merge(llm, human), value);

        let value = json!({"content": {"kind": "text", "body": "hello"}});
        let (llm, human) = separated.split_value(&value);
        assert_eq!(llm, Some(value.clone()));
        assert_eq!(human, Some(json!({})));
        assert_eq!(separated.merge(llm, human), value);
    }

    #[test]
    fn listed_media_types_only() {
        let media_types = vec!["application/pdf".to_string()];
        let predicate = content_media_type_in(&media_types);
        let schema = Schema::object(ObjectSchema::new().property("image", file(), true));
        let document = convert(&schema, &Components::new(), &OPENAPI_3_0, &ConvertOptions::default())
            .unwrap();
        let separated = separate(&document, predicate);
        assert!(separated.human.is_none());
    }
}
