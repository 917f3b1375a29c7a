//! Declarative payload validation.
//!
//! A [`Schema`] lists the fields a JSON object may carry and the constraints
//! of each. Validation is all-or-nothing: every violated constraint is
//! collected and reported in one [`EngineError::Validation`] message, joined
//! by `", "`.

use serde_json::{Map, Value};

use crate::{EngineError, ResultEngine, categories::CategoryConfig};

pub const TRANSACTION_KINDS: [&str; 3] = ["expense", "income", "transfer"];
pub const MAX_DESCRIPTION_LEN: usize = 255;
/// Upper bound for amounts and monthly limits, in minor units.
pub const MAX_AMOUNT_MINOR: i64 = 1_000_000_000_000;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
        one_of: Option<Vec<String>>,
    },
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldRule {
    fn string(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            kind: FieldKind::String {
                min_len: None,
                max_len: None,
                one_of: None,
            },
        }
    }

    fn integer(name: &'static str, minimum: i64) -> Self {
        Self {
            name,
            required: false,
            kind: FieldKind::Integer {
                minimum: Some(minimum),
                maximum: None,
            },
        }
    }

    fn maximum(mut self, value: i64) -> Self {
        if let FieldKind::Integer { maximum, .. } = &mut self.kind {
            *maximum = Some(value);
        }
        self
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn min_len(mut self, len: usize) -> Self {
        if let FieldKind::String { min_len, .. } = &mut self.kind {
            *min_len = Some(len);
        }
        self
    }

    fn max_len(mut self, len: usize) -> Self {
        if let FieldKind::String { max_len, .. } = &mut self.kind {
            *max_len = Some(len);
        }
        self
    }

    fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FieldKind::String { one_of, .. } = &mut self.kind {
            *one_of = Some(values.into_iter().map(Into::into).collect());
        }
        self
    }

    fn check(&self, value: &Value, violations: &mut Vec<String>) {
        let name = self.name;
        match &self.kind {
            FieldKind::String {
                min_len,
                max_len,
                one_of,
            } => {
                let Some(text) = value.as_str() else {
                    violations.push(format!("/{name} must be string"));
                    return;
                };
                let len = text.chars().count();
                if let Some(min) = min_len
                    && len < *min
                {
                    violations.push(format!(
                        "/{name} must NOT have fewer than {min} characters"
                    ));
                }
                if let Some(max) = max_len
                    && len > *max
                {
                    violations.push(format!("/{name} must NOT have more than {max} characters"));
                }
                if let Some(allowed) = one_of
                    && !allowed.iter().any(|a| a == text)
                {
                    violations.push(format!("/{name} must be equal to one of the allowed values"));
                }
            }
            FieldKind::Integer { minimum, maximum } => {
                let Some(number) = value.as_i64() else {
                    violations.push(format!("/{name} must be integer"));
                    return;
                };
                if let Some(min) = minimum
                    && number < *min
                {
                    violations.push(format!("/{name} must be >= {min}"));
                }
                if let Some(max) = maximum
                    && number > *max
                {
                    violations.push(format!("/{name} must be <= {max}"));
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub fields: Vec<FieldRule>,
    pub additional_properties: bool,
}

impl Schema {
    pub fn validate(&self, payload: &Value) -> ResultEngine<()> {
        let Some(object) = payload.as_object() else {
            return Err(EngineError::Validation("must be object".to_string()));
        };

        let violations = self.violations(object);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(violations.join(", ")))
        }
    }

    fn violations(&self, object: &Map<String, Value>) -> Vec<String> {
        let mut violations = Vec::new();

        for rule in self.fields.iter().filter(|r| r.required) {
            if !object.contains_key(rule.name) {
                violations.push(format!("must have required property '{}'", rule.name));
            }
        }

        for rule in &self.fields {
            if let Some(value) = object.get(rule.name) {
                rule.check(value, &mut violations);
            }
        }

        if !self.additional_properties {
            for key in object.keys() {
                if !self.fields.iter().any(|r| r.name == key) {
                    violations.push(format!("must NOT have additional properties ('{key}')"));
                }
            }
        }

        violations
    }
}

/// The request schemas, built once from the category configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Schemas {
    pub transaction_new: Schema,
    pub transaction_patch: Schema,
    pub budget_new: Schema,
    pub budget_update: Schema,
}

impl Schemas {
    pub fn new(categories: &CategoryConfig) -> Self {
        let all_categories = categories.transaction_names();
        let expense_categories = categories.expense_names();

        let transaction_fields = |required: bool| {
            let maybe_required = |rule: FieldRule| if required { rule.required() } else { rule };
            vec![
                FieldRule::string("user_id").required().min_len(1),
                maybe_required(FieldRule::integer("amount_minor", 1).maximum(MAX_AMOUNT_MINOR)),
                maybe_required(FieldRule::string("type").one_of(TRANSACTION_KINDS)),
                maybe_required(FieldRule::string("category").one_of(all_categories.clone())),
                maybe_required(FieldRule::string("description").max_len(MAX_DESCRIPTION_LEN)),
                FieldRule::string("source_account").min_len(1),
                FieldRule::string("destination_account").min_len(1),
            ]
        };

        let mut patch_fields = transaction_fields(false);
        patch_fields.insert(1, FieldRule::string("transaction_id").required().min_len(1));

        Self {
            transaction_new: Schema {
                fields: transaction_fields(true),
                additional_properties: false,
            },
            transaction_patch: Schema {
                fields: patch_fields,
                additional_properties: false,
            },
            budget_new: Schema {
                fields: vec![
                    FieldRule::string("user_id").required().min_len(1),
                    FieldRule::integer("monthly_limit_minor", 1)
                        .required()
                        .maximum(MAX_AMOUNT_MINOR),
                    FieldRule::string("category")
                        .required()
                        .one_of(expense_categories.clone()),
                    FieldRule::string("description").max_len(MAX_DESCRIPTION_LEN),
                ],
                additional_properties: false,
            },
            budget_update: Schema {
                fields: vec![
                    FieldRule::string("user_id").required().min_len(1),
                    FieldRule::string("category")
                        .required()
                        .one_of(expense_categories),
                    FieldRule::integer("monthly_limit_minor", 1)
                        .required()
                        .maximum(MAX_AMOUNT_MINOR),
                ],
                additional_properties: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas() -> Schemas {
        Schemas::new(&CategoryConfig::default())
    }

    #[test]
    fn accepts_valid_transaction() {
        let payload = json!({
            "user_id": "u1",
            "amount_minor": 1250,
            "type": "expense",
            "category": "Food",
            "description": "Lunch",
        });
        assert!(schemas().transaction_new.validate(&payload).is_ok());
    }

    #[test]
    fn reports_every_violation_at_once() {
        let payload = json!({
            "user_id": "u1",
            "amount_minor": 0,
            "type": "gift",
            "category": "Food",
            "extra": true,
        });
        let err = schemas().transaction_new.validate(&payload).unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(
                "must have required property 'description', \
                 /amount_minor must be >= 1, \
                 /type must be equal to one of the allowed values, \
                 must NOT have additional properties ('extra')"
                    .to_string()
            )
        );
    }

    #[test]
    fn enforces_types_and_lengths() {
        let payload = json!({
            "user_id": "",
            "amount_minor": 12.5,
            "type": "income",
            "category": "Salary",
            "description": "x".repeat(256),
            "source_account": "",
        });
        let EngineError::Validation(message) =
            schemas().transaction_new.validate(&payload).unwrap_err()
        else {
            panic!("expected validation error");
        };
        assert!(message.contains("/user_id must NOT have fewer than 1 characters"));
        assert!(message.contains("/amount_minor must be integer"));
        assert!(message.contains("/description must NOT have more than 255 characters"));
        assert!(message.contains("/source_account must NOT have fewer than 1 characters"));
    }

    #[test]
    fn amounts_and_limits_are_bounded() {
        let payload = json!({
            "user_id": "u1",
            "amount_minor": i64::MAX,
            "type": "expense",
            "category": "Food",
            "description": "typo",
        });
        assert_eq!(
            schemas().transaction_new.validate(&payload).unwrap_err(),
            EngineError::Validation(format!("/amount_minor must be <= {MAX_AMOUNT_MINOR}"))
        );

        let payload = json!({
            "user_id": "u1",
            "transaction_id": "txn-1",
            "amount_minor": MAX_AMOUNT_MINOR,
        });
        assert!(schemas().transaction_patch.validate(&payload).is_ok());

        let payload = json!({
            "user_id": "u1",
            "category": "Food",
            "monthly_limit_minor": MAX_AMOUNT_MINOR + 1,
        });
        assert!(schemas().budget_update.validate(&payload).is_err());
        assert!(schemas().budget_new.validate(&payload).is_err());
    }

    #[test]
    fn budget_categories_are_expense_only() {
        let payload = json!({
            "user_id": "u1",
            "monthly_limit_minor": 20000,
            "category": "Salary",
        });
        assert!(schemas().budget_new.validate(&payload).is_err());

        let payload = json!({
            "user_id": "u1",
            "monthly_limit_minor": 20000,
            "category": "Food",
            "description": "groceries",
        });
        assert!(schemas().budget_new.validate(&payload).is_ok());
    }

    #[test]
    fn patch_rejects_immutable_and_unknown_fields() {
        let payload = json!({
            "user_id": "u1",
            "transaction_id": "txn-1",
            "created_at": "2020-01-01T00:00:00.000Z",
        });
        let err = schemas().transaction_patch.validate(&payload).unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("must NOT have additional properties ('created_at')".to_string())
        );
    }

    #[test]
    fn patch_accepts_keys_only() {
        let payload = json!({"user_id": "u1", "transaction_id": "txn-1"});
        assert!(schemas().transaction_patch.validate(&payload).is_ok());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            schemas().budget_update.validate(&json!([1, 2])).unwrap_err(),
            EngineError::Validation("must be object".to_string())
        );
    }
}
