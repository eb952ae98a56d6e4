// Validation engine

use crate::collector::{MatchingSchema, SchemaCollector};
use crate::result::{stringify_value, stringify_values, Diagnostic, ErrorCode, ProblemKind, Severity, ValidationResult};
use crate::schema::{Dependency, Exclusive, Items, Schema, SchemaObject, TypeSpec};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use trellis_ast::{Node, NodeId, NodeKind, SyntaxTree};

/// Ceiling on AST depth plus schema combinator depth. Exceeding it stops
/// the walk; the façade reports it as a single diagnostic at the root.
pub(crate) const MAX_DEPTH: usize = 512;

static TRUE_SCHEMA: Schema = Schema::Bool(true);

static COLOR_HEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^#([0-9A-Fa-f]{3,4}|([0-9A-Fa-f]{2}){3,4})$").ok());

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .ok()
});

// RFC 3986 appendix B reference splitter; group 2 is the scheme.
static URI_SPLIT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(([^:/?#]+?):)?(//([^/?#]*))?([^?#]*)(\?([^#]*))?(#(.*))?$").ok());

/// State for one validation walk over a tree.
pub(crate) struct ValidationRun<'t> {
    tree: &'t SyntaxTree,
    severity: Severity,
    depth_exceeded: bool,
}

impl<'t> ValidationRun<'t> {
    pub fn new(tree: &'t SyntaxTree, severity: Severity) -> Self {
        Self {
            tree,
            severity,
            depth_exceeded: false,
        }
    }

    pub fn depth_exceeded(&self) -> bool {
        self.depth_exceeded
    }

    fn problem(
        &self,
        offset: usize,
        length: usize,
        code: Option<ErrorCode>,
        kind: ProblemKind,
        message: String,
    ) -> Diagnostic {
        Diagnostic {
            offset,
            length,
            severity: self.severity,
            message,
            code,
            kind,
        }
    }

    /// Validate `node` against `schema`, accumulating problems and scores
    /// into `result` and applicable-schema records into `collector`.
    pub fn validate<'s>(
        &mut self,
        node: NodeId,
        schema: &'s Schema,
        result: &mut ValidationResult,
        collector: &mut SchemaCollector<'s>,
        depth: usize,
    ) {
        if depth > MAX_DEPTH {
            if !self.depth_exceeded {
                self.depth_exceeded = true;
                tracing::debug!("validation depth limit reached, truncating the walk");
            }
            return;
        }
        let tree = self.tree;
        let n = tree.get(node);
        if !collector.include(node, n) {
            return;
        }

        // Property nodes carry no schema matches themselves; the schema
        // applies to their value.
        if let NodeKind::Property { value, .. } = n.kind() {
            if let Some(value) = value {
                self.validate(*value, schema, result, collector, depth + 1);
            }
            return;
        }

        let object = match schema {
            Schema::Bool(true) => {
                collector.add(MatchingSchema {
                    node,
                    schema,
                    inverted: false,
                });
                return;
            }
            Schema::Bool(false) => {
                // `false` behaves as `{ not: true }`.
                let mut sub_result = ValidationResult::new();
                let mut sub_collector = collector.new_sub();
                self.validate(node, &TRUE_SCHEMA, &mut sub_result, &mut sub_collector, depth + 1);
                if !sub_result.has_problems() {
                    result.problems.push(self.problem(
                        n.offset(),
                        n.length(),
                        None,
                        ProblemKind::General,
                        "Matches a schema that is not allowed.".to_string(),
                    ));
                }
                for mut record in sub_collector.into_schemas() {
                    record.inverted = !record.inverted;
                    collector.add(record);
                }
                collector.add(MatchingSchema {
                    node,
                    schema,
                    inverted: false,
                });
                return;
            }
            Schema::Object(object) => object,
        };

        match n.kind() {
            NodeKind::Object { .. } => self.validate_object(node, object, result, collector, depth),
            NodeKind::Array { .. } => self.validate_array(node, object, result, collector, depth),
            NodeKind::String(_) => self.validate_string(node, object, result),
            NodeKind::Number { .. } => self.validate_number(node, object, result),
            _ => {}
        }

        self.validate_shared(node, object, result, collector, depth);

        collector.add(MatchingSchema {
            node,
            schema,
            inverted: false,
        });
    }

    /// The keyword checks every node runs through, in fixed order:
    /// `type`, `allOf`, `not`, `anyOf`, `oneOf`, `if`/`then`/`else`,
    /// `enum`, `const`, `deprecationMessage`.
    fn validate_shared<'s>(
        &mut self,
        node: NodeId,
        schema: &'s SchemaObject,
        result: &mut ValidationResult,
        collector: &mut SchemaCollector<'s>,
        depth: usize,
    ) {
        let tree = self.tree;
        let n = tree.get(node);

        match &schema.types {
            Some(TypeSpec::Multiple(names)) => {
                if !names.iter().any(|t| matches_type(n, t)) {
                    let message = schema.error_message.clone().unwrap_or_else(|| {
                        format!("Incorrect type. Expected one of {}.", names.join(", "))
                    });
                    result.problems.push(self.problem(
                        n.offset(),
                        n.length(),
                        None,
                        ProblemKind::TypeMismatch,
                        message,
                    ));
                }
            }
            Some(TypeSpec::Single(name)) => {
                if !matches_type(n, name) {
                    let message = schema
                        .error_message
                        .clone()
                        .unwrap_or_else(|| format!("Incorrect type. Expected \"{name}\"."));
                    result.problems.push(self.problem(
                        n.offset(),
                        n.length(),
                        None,
                        ProblemKind::TypeMismatch,
                        message,
                    ));
                }
            }
            None => {}
        }

        if let Some(all_of) = &schema.all_of {
            for sub_schema in all_of {
                self.validate(node, sub_schema, result, collector, depth + 1);
            }
        }

        if let Some(not_schema) = &schema.not {
            let mut sub_result = ValidationResult::new();
            let mut sub_collector = collector.new_sub();
            self.validate(node, not_schema, &mut sub_result, &mut sub_collector, depth + 1);
            if !sub_result.has_problems() {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    "Matches a schema that is not allowed.".to_string(),
                ));
            }
            // Branch records cross the `not` boundary whatever the outcome.
            for mut record in sub_collector.into_schemas() {
                record.inverted = !record.inverted;
                collector.add(record);
            }
        }

        if let Some(any_of) = &schema.any_of {
            self.validate_alternatives(node, any_of, false, result, collector, depth);
        }
        if let Some(one_of) = &schema.one_of {
            self.validate_alternatives(node, one_of, true, result, collector, depth);
        }

        if let Some(if_schema) = &schema.if_schema {
            self.validate_condition(
                node,
                if_schema,
                schema.then_schema.as_deref(),
                schema.else_schema.as_deref(),
                result,
                collector,
                depth,
            );
        }

        if let Some(enum_values) = &schema.enum_values {
            let value = node_value(tree, node);
            let matched = enum_values.iter().any(|e| value_equals(&value, e));
            result.enum_values = Some(enum_values.clone());
            result.enum_value_match = matched;
            if !matched {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    Some(ErrorCode::EnumValueMismatch),
                    ProblemKind::General,
                    format!(
                        "Value is not accepted. Valid values: {}.",
                        stringify_values(enum_values)
                    ),
                ));
            }
        }

        if let Some(const_value) = &schema.const_value {
            let value = node_value(tree, node);
            if value_equals(&value, const_value) {
                result.enum_value_match = true;
            } else {
                result.enum_value_match = false;
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    Some(ErrorCode::EnumValueMismatch),
                    ProblemKind::General,
                    format!("Value must be {}.", stringify_value(const_value)),
                ));
            }
            result.enum_values = Some(vec![const_value.clone()]);
        }

        if let Some(message) = &schema.deprecation_message {
            // Report deprecation on the enclosing property, if any.
            if let Some(parent) = n.parent() {
                let p = tree.get(parent);
                result.problems.push(self.problem(
                    p.offset(),
                    p.length(),
                    None,
                    ProblemKind::General,
                    message.clone(),
                ));
            }
        }
    }

    /// `anyOf` / `oneOf`: run every branch against a fresh sub-result and
    /// sub-collector, keep the best-ranked branch, and promote only its
    /// problems and records. Losing branches would mislead both error
    /// reporting and matching-schema queries.
    fn validate_alternatives<'s>(
        &mut self,
        node: NodeId,
        alternatives: &'s [Schema],
        max_one_match: bool,
        result: &mut ValidationResult,
        collector: &mut SchemaCollector<'s>,
        depth: usize,
    ) {
        let n = self.tree.get(node);
        let mut matches = 0usize;
        let mut best: Option<(ValidationResult, SchemaCollector<'s>)> = None;

        for sub_schema in alternatives {
            let mut sub_result = ValidationResult::new();
            let mut sub_collector = collector.new_sub();
            self.validate(node, sub_schema, &mut sub_result, &mut sub_collector, depth + 1);
            if !sub_result.has_problems() {
                matches += 1;
            }
            best = Some(match best.take() {
                None => (sub_result, sub_collector),
                Some((mut best_result, mut best_collector)) => {
                    if !max_one_match
                        && !sub_result.has_problems()
                        && !best_result.has_problems()
                    {
                        // Equally good clean matches under anyOf combine.
                        best_collector.merge(sub_collector);
                        best_result.properties_matches += sub_result.properties_matches;
                        best_result.properties_value_matches +=
                            sub_result.properties_value_matches;
                        (best_result, best_collector)
                    } else {
                        match sub_result.compare(&best_result) {
                            Ordering::Greater => (sub_result, sub_collector),
                            Ordering::Equal => {
                                best_collector.merge(sub_collector);
                                best_result.merge_enum_values(&sub_result);
                                (best_result, best_collector)
                            }
                            Ordering::Less => (best_result, best_collector),
                        }
                    }
                }
            });
        }

        if matches > 1 && max_one_match {
            result.problems.push(self.problem(
                n.offset(),
                1,
                None,
                ProblemKind::General,
                "Matches multiple schemas when only one must validate.".to_string(),
            ));
        }
        if let Some((best_result, best_collector)) = best {
            let properties_matches = best_result.properties_matches;
            let properties_value_matches = best_result.properties_value_matches;
            result.merge(best_result);
            result.properties_matches += properties_matches;
            result.properties_value_matches += properties_value_matches;
            collector.merge(best_collector);
        }
    }

    fn validate_condition<'s>(
        &mut self,
        node: NodeId,
        if_schema: &'s Schema,
        then_schema: Option<&'s Schema>,
        else_schema: Option<&'s Schema>,
        result: &mut ValidationResult,
        collector: &mut SchemaCollector<'s>,
        depth: usize,
    ) {
        let mut if_result = ValidationResult::new();
        let mut if_collector = collector.new_sub();
        self.validate(node, if_schema, &mut if_result, &mut if_collector, depth + 1);
        collector.merge(if_collector);

        let branch = if if_result.has_problems() {
            else_schema
        } else {
            then_schema
        };
        if let Some(branch) = branch {
            let mut branch_result = ValidationResult::new();
            let mut branch_collector = collector.new_sub();
            self.validate(node, branch, &mut branch_result, &mut branch_collector, depth + 1);
            let properties_matches = branch_result.properties_matches;
            let properties_value_matches = branch_result.properties_value_matches;
            result.merge(branch_result);
            result.properties_matches += properties_matches;
            result.properties_value_matches += properties_value_matches;
            collector.merge(branch_collector);
        }
    }

    fn validate_object<'s>(
        &mut self,
        node: NodeId,
        schema: &'s SchemaObject,
        result: &mut ValidationResult,
        collector: &mut SchemaCollector<'s>,
        depth: usize,
    ) {
        let tree = self.tree;
        let n = tree.get(node);
        let NodeKind::Object { properties } = n.kind() else {
            return;
        };

        // `seen_keys` is last-wins; `unprocessed` lists every occurrence,
        // so a duplicated unknown key is reported once per occurrence.
        let mut seen_keys: HashMap<&'t str, Option<NodeId>> = HashMap::new();
        let mut unprocessed: Vec<&'t str> = Vec::new();
        for &prop_id in properties {
            let NodeKind::Property { key, value, .. } = tree.get(prop_id).kind() else {
                continue;
            };
            let Some(key_str) = tree.get(*key).as_str() else {
                continue;
            };
            if key_str == "<<" {
                // YAML merge key: splice the right-hand side's properties
                // in; the `<<` entry itself is not a property of this
                // object.
                if let Some(value) = value {
                    adopt_merged_properties(tree, *value, &mut seen_keys, &mut unprocessed);
                }
            } else {
                seen_keys.insert(key_str, *value);
                unprocessed.push(key_str);
            }
        }

        if let Some(required) = &schema.required {
            for name in required {
                if !matches!(seen_keys.get(name.as_str()), Some(Some(_))) {
                    let (offset, length) = missing_property_span(tree, node);
                    result.problems.push(self.problem(
                        offset,
                        length,
                        None,
                        ProblemKind::General,
                        format!("Missing property \"{name}\"."),
                    ));
                }
            }
        }

        if let Some(property_schemas) = &schema.properties {
            for (name, property_schema) in property_schemas {
                unprocessed.retain(|key| *key != name.as_str());
                let Some(Some(child)) = seen_keys.get(name.as_str()) else {
                    continue;
                };
                self.validate_known_property(
                    *child,
                    property_schema,
                    schema,
                    result,
                    collector,
                    depth,
                );
            }
        }

        if let Some(pattern_schemas) = &schema.pattern_properties {
            for (pattern, property_schema) in pattern_schemas {
                let Ok(regex) = Regex::new(pattern) else {
                    continue;
                };
                for key in unprocessed.clone() {
                    if !regex.is_match(key) {
                        continue;
                    }
                    unprocessed.retain(|k| *k != key);
                    let Some(Some(child)) = seen_keys.get(key) else {
                        continue;
                    };
                    self.validate_known_property(
                        *child,
                        property_schema,
                        schema,
                        result,
                        collector,
                        depth,
                    );
                }
            }
        }

        match schema.additional_properties.as_deref() {
            Some(additional @ Schema::Object(_)) => {
                for key in &unprocessed {
                    if let Some(Some(child)) = seen_keys.get(key) {
                        let mut property_result = ValidationResult::new();
                        self.validate(*child, additional, &mut property_result, collector, depth + 1);
                        result.merge_property_match(property_result);
                    }
                }
            }
            Some(Schema::Bool(false)) => {
                for key in &unprocessed {
                    if let Some(Some(child)) = seen_keys.get(key) {
                        let (offset, length) = key_span(tree, *child);
                        let message = schema
                            .error_message
                            .clone()
                            .unwrap_or_else(|| format!("Property {key} is not allowed."));
                        result.problems.push(self.problem(
                            offset,
                            length,
                            None,
                            ProblemKind::General,
                            message,
                        ));
                    }
                }
            }
            _ => {}
        }

        // Property-count limits look at the source property count, before
        // merge-key expansion.
        if let Some(min_properties) = schema.min_properties {
            if properties.len() < min_properties {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!(
                        "Object has fewer properties than the required number of {min_properties}"
                    ),
                ));
            }
        }
        if let Some(max_properties) = schema.max_properties {
            if properties.len() > max_properties {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("Object has more properties than limit of {max_properties}."),
                ));
            }
        }

        if let Some(dependencies) = &schema.dependencies {
            for (key, dependency) in dependencies {
                if !matches!(seen_keys.get(key.as_str()), Some(Some(_))) {
                    continue;
                }
                match dependency {
                    Dependency::Required(names) => {
                        for name in names {
                            if matches!(seen_keys.get(name.as_str()), Some(Some(_))) {
                                result.properties_value_matches += 1;
                            } else {
                                result.problems.push(self.problem(
                                    n.offset(),
                                    n.length(),
                                    None,
                                    ProblemKind::General,
                                    format!(
                                        "Object is missing property {name} required by property {key}."
                                    ),
                                ));
                            }
                        }
                    }
                    Dependency::Schema(dependency_schema) => {
                        let mut dependency_result = ValidationResult::new();
                        self.validate(
                            node,
                            dependency_schema,
                            &mut dependency_result,
                            collector,
                            depth + 1,
                        );
                        result.merge_property_match(dependency_result);
                    }
                }
            }
        }

        if let Some(property_names) = &schema.property_names {
            // Key matches are not applicable-schema records.
            for &prop_id in properties {
                if let NodeKind::Property { key, .. } = tree.get(prop_id).kind() {
                    let mut noop = SchemaCollector::noop();
                    self.validate(*key, property_names, result, &mut noop, depth + 1);
                }
            }
        }
    }

    /// Shared handling for `properties` and `patternProperties` values.
    fn validate_known_property<'s>(
        &mut self,
        child: NodeId,
        property_schema: &'s Schema,
        schema: &SchemaObject,
        result: &mut ValidationResult,
        collector: &mut SchemaCollector<'s>,
        depth: usize,
    ) {
        match property_schema {
            Schema::Bool(false) => {
                let (offset, length) = key_span(self.tree, child);
                let name = property_key_name(self.tree, child).unwrap_or_default();
                let message = schema
                    .error_message
                    .clone()
                    .unwrap_or_else(|| format!("Property {name} is not allowed."));
                result
                    .problems
                    .push(self.problem(offset, length, None, ProblemKind::General, message));
            }
            Schema::Bool(true) => {
                result.properties_matches += 1;
                result.properties_value_matches += 1;
            }
            Schema::Object(_) => {
                let mut property_result = ValidationResult::new();
                self.validate(child, property_schema, &mut property_result, collector, depth + 1);
                result.merge_property_match(property_result);
            }
        }
    }

    fn validate_array<'s>(
        &mut self,
        node: NodeId,
        schema: &'s SchemaObject,
        result: &mut ValidationResult,
        collector: &mut SchemaCollector<'s>,
        depth: usize,
    ) {
        let tree = self.tree;
        let n = tree.get(node);
        let NodeKind::Array { items } = n.kind() else {
            return;
        };

        match &schema.items {
            Some(Items::Tuple(subschemas)) => {
                for (index, sub_schema) in subschemas.iter().enumerate() {
                    match items.get(index) {
                        Some(&item) => {
                            let mut item_result = ValidationResult::new();
                            self.validate(item, sub_schema, &mut item_result, collector, depth + 1);
                            result.merge_property_match(item_result);
                        }
                        None if items.len() >= subschemas.len() => {
                            result.properties_value_matches += 1;
                        }
                        None => {}
                    }
                }
                if items.len() > subschemas.len() {
                    match schema.additional_items.as_deref() {
                        Some(additional @ Schema::Object(_)) => {
                            for &item in &items[subschemas.len()..] {
                                let mut item_result = ValidationResult::new();
                                self.validate(
                                    item,
                                    additional,
                                    &mut item_result,
                                    collector,
                                    depth + 1,
                                );
                                result.merge_property_match(item_result);
                            }
                        }
                        Some(Schema::Bool(false)) => {
                            result.problems.push(self.problem(
                                n.offset(),
                                n.length(),
                                None,
                                ProblemKind::General,
                                format!(
                                    "Array has too many items according to schema. Expected {} or fewer.",
                                    subschemas.len()
                                ),
                            ));
                        }
                        _ => {}
                    }
                }
            }
            Some(Items::Single(sub_schema)) => {
                for &item in items {
                    let mut item_result = ValidationResult::new();
                    self.validate(item, sub_schema, &mut item_result, collector, depth + 1);
                    result.merge_property_match(item_result);
                }
            }
            None => {}
        }

        if let Some(contains) = &schema.contains {
            let found = items.iter().any(|&item| {
                let mut item_result = ValidationResult::new();
                let mut noop = SchemaCollector::noop();
                self.validate(item, contains, &mut item_result, &mut noop, depth + 1);
                !item_result.has_problems()
            });
            if !found {
                let message = schema
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Array does not contain required item.".to_string());
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    message,
                ));
            }
        }

        if let Some(min_items) = schema.min_items {
            if items.len() < min_items {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("Array has too few items. Expected {min_items} or more."),
                ));
            }
        }
        if let Some(max_items) = schema.max_items {
            if items.len() > max_items {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("Array has too many items. Expected {max_items} or fewer."),
                ));
            }
        }

        if schema.unique_items {
            let values: Vec<Value> = items.iter().map(|&item| node_value(tree, item)).collect();
            let has_duplicates = values.iter().enumerate().any(|(index, value)| {
                values[index + 1..].iter().any(|other| value_equals(value, other))
            });
            if has_duplicates {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    "Array has duplicate items.".to_string(),
                ));
            }
        }
    }

    fn validate_string(&mut self, node: NodeId, schema: &SchemaObject, result: &mut ValidationResult) {
        let n = self.tree.get(node);
        let NodeKind::String(value) = n.kind() else {
            return;
        };

        // Length limits count Unicode code points.
        if let Some(min_length) = schema.min_length {
            if value.chars().count() < min_length {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("String is shorter than the minimum length of {min_length}."),
                ));
            }
        }
        if let Some(max_length) = schema.max_length {
            if value.chars().count() > max_length {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("String is longer than the maximum length of {max_length}."),
                ));
            }
        }

        if let Some(pattern) = &schema.pattern {
            // An invalid pattern disables the check.
            if let Ok(regex) = Regex::new(pattern) {
                if !regex.is_match(value) {
                    let message = schema
                        .pattern_error_message
                        .clone()
                        .or_else(|| schema.error_message.clone())
                        .unwrap_or_else(|| {
                            format!("String does not match the pattern of \"{pattern}\".")
                        });
                    result.problems.push(self.problem(
                        n.offset(),
                        n.length(),
                        None,
                        ProblemKind::General,
                        message,
                    ));
                }
            }
        }

        match schema.format.as_deref() {
            Some(format @ ("uri" | "uri-reference")) => {
                if let Some(detail) = uri_error(value, format == "uri") {
                    let message = schema
                        .pattern_error_message
                        .clone()
                        .or_else(|| schema.error_message.clone())
                        .unwrap_or_else(|| format!("String is not a URI: {detail}"));
                    result.problems.push(self.problem(
                        n.offset(),
                        n.length(),
                        None,
                        ProblemKind::General,
                        message,
                    ));
                }
            }
            Some("color-hex") => {
                self.check_format(
                    n,
                    value,
                    &COLOR_HEX,
                    "Invalid color format. Use #RGB, #RGBA, #RRGGBB or #RRGGBBAA.",
                    schema,
                    result,
                );
            }
            Some("email") => {
                self.check_format(
                    n,
                    value,
                    &EMAIL,
                    "String is not an e-mail address.",
                    schema,
                    result,
                );
            }
            // Unknown format names impose nothing.
            _ => {}
        }
    }

    fn check_format(
        &self,
        n: &Node,
        value: &str,
        pattern: &Lazy<Option<Regex>>,
        default_message: &str,
        schema: &SchemaObject,
        result: &mut ValidationResult,
    ) {
        let Some(regex) = pattern.as_ref() else {
            return;
        };
        if !regex.is_match(value) {
            let message = schema
                .pattern_error_message
                .clone()
                .or_else(|| schema.error_message.clone())
                .unwrap_or_else(|| default_message.to_string());
            result.problems.push(self.problem(
                n.offset(),
                n.length(),
                None,
                ProblemKind::General,
                message,
            ));
        }
    }

    fn validate_number(&mut self, node: NodeId, schema: &SchemaObject, result: &mut ValidationResult) {
        let n = self.tree.get(node);
        let NodeKind::Number { value, .. } = *n.kind() else {
            return;
        };

        if let Some(multiple_of) = schema.multiple_of {
            // Plain f64 remainder; values with float dust fail, as in the
            // reference implementation.
            if value % multiple_of != 0.0 {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("Value is not divisible by {multiple_of}."),
                ));
            }
        }

        if let Some(bound) = exclusive_bound(schema.minimum, schema.exclusive_minimum) {
            if value <= bound {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("Value is below the exclusive minimum of {bound}."),
                ));
            }
        }
        if let Some(bound) = exclusive_bound(schema.maximum, schema.exclusive_maximum) {
            if value >= bound {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("Value is above the exclusive maximum of {bound}."),
                ));
            }
        }
        if let Some(bound) = inclusive_bound(schema.minimum, schema.exclusive_minimum) {
            if value < bound {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("Value is below the minimum of {bound}."),
                ));
            }
        }
        if let Some(bound) = inclusive_bound(schema.maximum, schema.exclusive_maximum) {
            if value > bound {
                result.problems.push(self.problem(
                    n.offset(),
                    n.length(),
                    None,
                    ProblemKind::General,
                    format!("Value is above the maximum of {bound}."),
                ));
            }
        }
    }
}

fn matches_type(node: &Node, name: &str) -> bool {
    if name == "integer" {
        return matches!(node.kind(), NodeKind::Number { is_integer: true, .. });
    }
    node.type_name() == name
}

/// A boolean exclusive flag repurposes the adjacent bound; a numeric one
/// stands alone.
fn exclusive_bound(limit: Option<f64>, exclusive: Option<Exclusive>) -> Option<f64> {
    match exclusive {
        Some(Exclusive::Bound(bound)) => Some(bound),
        Some(Exclusive::Flag(true)) => limit,
        _ => None,
    }
}

fn inclusive_bound(limit: Option<f64>, exclusive: Option<Exclusive>) -> Option<f64> {
    match exclusive {
        Some(Exclusive::Flag(true)) => None,
        _ => limit,
    }
}

fn uri_error(value: &str, require_scheme: bool) -> Option<String> {
    if value.is_empty() {
        return Some("URI expected.".to_string());
    }
    let regex = URI_SPLIT.as_ref()?;
    match regex.captures(value) {
        None => Some("URI is expected.".to_string()),
        Some(captures) => {
            if require_scheme && captures.get(2).is_none() {
                Some("URI with a scheme is expected.".to_string())
            } else {
                None
            }
        }
    }
}

/// Splice a merge-key (`<<`) value's properties into the enclosing
/// object's key maps: objects contribute their properties, arrays
/// contribute each object element's properties, anything else is ignored.
fn adopt_merged_properties<'t>(
    tree: &'t SyntaxTree,
    value: NodeId,
    seen_keys: &mut HashMap<&'t str, Option<NodeId>>,
    unprocessed: &mut Vec<&'t str>,
) {
    match tree.get(value).kind() {
        NodeKind::Object { properties } => {
            for &prop in properties {
                adopt_property(tree, prop, seen_keys, unprocessed);
            }
        }
        NodeKind::Array { items } => {
            for &item in items {
                if let NodeKind::Object { properties } = tree.get(item).kind() {
                    for &prop in properties {
                        adopt_property(tree, prop, seen_keys, unprocessed);
                    }
                }
            }
        }
        _ => {}
    }
}

fn adopt_property<'t>(
    tree: &'t SyntaxTree,
    prop: NodeId,
    seen_keys: &mut HashMap<&'t str, Option<NodeId>>,
    unprocessed: &mut Vec<&'t str>,
) {
    if let NodeKind::Property { key, value, .. } = tree.get(prop).kind() {
        if let Some(key_str) = tree.get(*key).as_str() {
            seen_keys.insert(key_str, *value);
            unprocessed.push(key_str);
        }
    }
}

/// Span for a missing-property diagnostic: the enclosing property's key
/// if the object is itself a property value, else one character at the
/// object's start.
fn missing_property_span(tree: &SyntaxTree, node: NodeId) -> (usize, usize) {
    if let Some(parent) = tree.get(node).parent() {
        if let NodeKind::Property { key, .. } = tree.get(parent).kind() {
            let key_node = tree.get(*key);
            return (key_node.offset(), key_node.length());
        }
    }
    (tree.get(node).offset(), 1)
}

/// The key span of the property owning `value_node`.
fn key_span(tree: &SyntaxTree, value_node: NodeId) -> (usize, usize) {
    if let Some(parent) = tree.get(value_node).parent() {
        if let NodeKind::Property { key, .. } = tree.get(parent).kind() {
            let key_node = tree.get(*key);
            return (key_node.offset(), key_node.length());
        }
    }
    let node = tree.get(value_node);
    (node.offset(), node.length())
}

fn property_key_name(tree: &SyntaxTree, value_node: NodeId) -> Option<String> {
    let parent = tree.get(value_node).parent()?;
    if let NodeKind::Property { key, .. } = tree.get(parent).kind() {
        tree.get(*key).as_str().map(str::to_string)
    } else {
        None
    }
}

/// Materialize a node as a plain JSON value for enum/const/uniqueness
/// comparisons. Duplicate object keys collapse last-wins; non-finite
/// numbers (unreachable from real documents) normalize to null.
pub(crate) fn node_value(tree: &SyntaxTree, node: NodeId) -> Value {
    match tree.get(node).kind() {
        NodeKind::Null => Value::Null,
        NodeKind::Boolean(b) => Value::Bool(*b),
        NodeKind::Number { value, is_integer } => {
            if *is_integer
                && value.fract() == 0.0
                && *value >= i64::MIN as f64
                && *value <= i64::MAX as f64
            {
                Value::Number((*value as i64).into())
            } else {
                serde_json::Number::from_f64(*value)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        NodeKind::String(s) => Value::String(s.clone()),
        NodeKind::Array { items } => {
            Value::Array(items.iter().map(|&item| node_value(tree, item)).collect())
        }
        NodeKind::Object { properties } => {
            let mut map = serde_json::Map::new();
            for &prop in properties {
                if let NodeKind::Property {
                    key,
                    value: Some(value),
                    ..
                } = tree.get(prop).kind()
                {
                    if let Some(key_str) = tree.get(*key).as_str() {
                        map.insert(key_str.to_string(), node_value(tree, *value));
                    }
                }
            }
            Value::Object(map)
        }
        NodeKind::Property { .. } => Value::Null,
    }
}

/// Order-sensitive structural equality over the JSON value space.
/// Numbers compare as `f64`, so `1` equals `1.0`.
pub(crate) fn value_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| value_equals(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| value_equals(v, w)))
        }
        _ => false,
    }
}
