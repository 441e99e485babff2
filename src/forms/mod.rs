//! One generic, schema-driven CRUD form instead of a hand-written form per
//! entity. A `FormSchema` names the fields, labels, and per-field rules; a
//! `ResourceForm` runs the submit lifecycle against the API: client-side
//! validation mirroring the server's first-failure-wins rules, POST for new
//! records and PATCH for existing ones, a double-submit guard while a request
//! is in flight, and confirmation-gated delete.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::client::{ApiClient, ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty free text
    Text,
    /// Positive decimal amount
    Price,
    /// Non-negative integer
    Quantity,
    /// Id of a row in another catalog
    Reference,
    /// Non-empty list of `{url}` objects
    ImageList,
    /// Optional boolean flag
    Toggle,
}

#[derive(Debug)]
pub struct FieldSpec {
    /// JSON body key (camelCase, as the API expects)
    pub name: &'static str,
    /// Human label used in validation messages
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Debug)]
pub struct FormSchema {
    /// Capitalized singular ("Gender")
    pub entity: &'static str,
    /// URL collection segment ("genders")
    pub collection: &'static str,
    /// Whether the collection lives under a store (everything except stores)
    pub parented: bool,
    /// Toast shown when delete fails, typically a foreign-key dependency hint
    pub delete_hint: &'static str,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0}")]
    Invalid(String),

    /// A request is already in flight for this form instance
    #[error("A request is already in flight")]
    InFlight,

    #[error("Deletion requires confirmation")]
    NotConfirmed,

    /// Submit failures collapse to the generic toast
    #[error("Something went wrong.")]
    Request(#[source] ClientError),

    /// Delete failures get the schema's dependency hint instead
    #[error("{hint}")]
    DeleteBlocked {
        hint: &'static str,
        #[source]
        source: ClientError,
    },
}

impl FormSchema {
    /// Validate form values field by field, in declared order. The first
    /// failing field produces the error; nothing is aggregated.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), FormError> {
        for field in self.fields {
            let value = values.get(field.name);
            match field.kind {
                FieldKind::Text | FieldKind::Reference => {
                    let present = matches!(value, Some(Value::String(s)) if !s.trim().is_empty());
                    if !present && field.required {
                        return Err(FormError::Required(field.label));
                    }
                }
                FieldKind::Price => {
                    let price = match value {
                        Some(Value::Number(n)) => Decimal::try_from(n.as_f64().unwrap_or(0.0)).ok(),
                        Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
                        _ => None,
                    };
                    match price {
                        Some(p) if p > Decimal::ZERO => {}
                        _ => return Err(FormError::Required(field.label)),
                    }
                }
                FieldKind::Quantity => match value.and_then(Value::as_i64) {
                    Some(q) if q >= 0 => {}
                    Some(_) => {
                        return Err(FormError::Invalid(format!(
                            "{} must be a non-negative integer",
                            field.label
                        )))
                    }
                    None => return Err(FormError::Required(field.label)),
                },
                FieldKind::ImageList => {
                    let ok = match value {
                        Some(Value::Array(items)) if !items.is_empty() => items.iter().all(|item| {
                            matches!(
                                item.get("url"),
                                Some(Value::String(url)) if !url.trim().is_empty()
                            )
                        }),
                        _ => false,
                    };
                    if !ok {
                        return Err(FormError::Required(field.label));
                    }
                }
                FieldKind::Toggle => {
                    if let Some(v) = value {
                        if !v.is_boolean() {
                            return Err(FormError::Invalid(format!(
                                "{} must be true or false",
                                field.label
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn collection_path(&self, store_id: Option<Uuid>) -> Result<String, FormError> {
        if !self.parented {
            return Ok(format!("api/{}", self.collection));
        }
        match store_id {
            Some(store_id) => Ok(format!("api/{}/{}", store_id, self.collection)),
            None => Err(FormError::Required("Store id")),
        }
    }

    pub fn record_path(&self, store_id: Option<Uuid>, id: Uuid) -> Result<String, FormError> {
        Ok(format!("{}/{}", self.collection_path(store_id)?, id))
    }

    /// Where the client navigates after a successful submit
    fn collection_view(&self, store_id: Option<Uuid>) -> String {
        match (self.parented, store_id) {
            (true, Some(store_id)) => format!("/{}/{}", store_id, self.collection),
            _ => format!("/{}", self.collection),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

/// Result of a successful submit or delete: the toast message, where to
/// navigate, and the server's response body.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub message: String,
    pub navigate_to: String,
    pub record: Value,
}

/// One form instance. Created either blank (submits POST) or over an
/// existing record id (submits PATCH). The instance ends when the caller
/// navigates away; state always returns to Idle after a round trip.
#[derive(Debug)]
pub struct ResourceForm {
    schema: &'static FormSchema,
    initial_id: Option<Uuid>,
    state: FormState,
}

impl ResourceForm {
    pub fn create(schema: &'static FormSchema) -> Self {
        Self {
            schema,
            initial_id: None,
            state: FormState::Idle,
        }
    }

    pub fn edit(schema: &'static FormSchema, id: Uuid) -> Self {
        Self {
            schema,
            initial_id: Some(id),
            state: FormState::Idle,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state == FormState::Submitting
    }

    fn begin(&mut self) -> Result<(), FormError> {
        if self.is_submitting() {
            return Err(FormError::InFlight);
        }
        self.state = FormState::Submitting;
        Ok(())
    }

    /// Validate and submit. POST when the form has no initial record, PATCH
    /// otherwise. Success yields the toast and navigation target; failure
    /// collapses to the generic message.
    pub async fn submit(
        &mut self,
        client: &ApiClient,
        store_id: Option<Uuid>,
        values: Map<String, Value>,
    ) -> Result<SubmitOutcome, FormError> {
        self.schema.validate(&values)?;
        self.begin()?;

        let body = Value::Object(values);
        let result = match self.initial_id {
            None => {
                let path = self.schema.collection_path(store_id)?;
                client.post_json(&path, &body).await
            }
            Some(id) => {
                let path = self.schema.record_path(store_id, id)?;
                client.patch_json(&path, &body).await
            }
        };
        self.state = FormState::Idle;

        match result {
            Ok(record) => {
                let action = if self.initial_id.is_none() { "created" } else { "updated" };
                Ok(SubmitOutcome {
                    message: format!("{} {}.", self.schema.entity, action),
                    navigate_to: self.schema.collection_view(store_id),
                    record,
                })
            }
            Err(source) => Err(FormError::Request(source)),
        }
    }

    /// Delete the record behind the form. Gated on explicit confirmation;
    /// failure surfaces the schema's dependency hint.
    pub async fn delete(
        &mut self,
        client: &ApiClient,
        store_id: Option<Uuid>,
        id: Uuid,
        confirmed: bool,
    ) -> Result<SubmitOutcome, FormError> {
        if !confirmed {
            return Err(FormError::NotConfirmed);
        }
        self.begin()?;

        let result = match self.schema.record_path(store_id, id) {
            Ok(path) => client.delete_json(&path).await.map_err(|source| {
                FormError::DeleteBlocked {
                    hint: self.schema.delete_hint,
                    source,
                }
            }),
            Err(e) => Err(e),
        };
        self.state = FormState::Idle;

        let record = result?;
        Ok(SubmitOutcome {
            message: format!("{} deleted.", self.schema.entity),
            navigate_to: self.schema.collection_view(store_id),
            record,
        })
    }
}

const NAME_FIELD: FieldSpec = FieldSpec {
    name: "name",
    label: "Name",
    kind: FieldKind::Text,
    required: true,
};

const VALUE_FIELD: FieldSpec = FieldSpec {
    name: "value",
    label: "Value",
    kind: FieldKind::Text,
    required: true,
};

pub static STORE_FORM: FormSchema = FormSchema {
    entity: "Store",
    collection: "stores",
    parented: false,
    delete_hint: "Make sure you removed all products and categories first.",
    fields: &[NAME_FIELD],
};

pub static CATEGORY_FORM: FormSchema = FormSchema {
    entity: "Category",
    collection: "categories",
    parented: true,
    delete_hint: "Make sure you removed all products using this category first.",
    fields: &[NAME_FIELD],
};

pub static SIZE_FORM: FormSchema = FormSchema {
    entity: "Size",
    collection: "sizes",
    parented: true,
    delete_hint: "Make sure you removed all products using this size first.",
    fields: &[NAME_FIELD, VALUE_FIELD],
};

pub static COLOR_FORM: FormSchema = FormSchema {
    entity: "Color",
    collection: "colors",
    parented: true,
    delete_hint: "Make sure you removed all products using this color first.",
    fields: &[NAME_FIELD, VALUE_FIELD],
};

pub static GENDER_FORM: FormSchema = FormSchema {
    entity: "Gender",
    collection: "genders",
    parented: true,
    delete_hint: "Make sure you removed all products using this gender first.",
    fields: &[NAME_FIELD, VALUE_FIELD],
};

pub static PRODUCT_FORM: FormSchema = FormSchema {
    entity: "Product",
    collection: "products",
    parented: true,
    delete_hint: "Something went wrong.",
    fields: &[
        NAME_FIELD,
        FieldSpec {
            name: "price",
            label: "Price",
            kind: FieldKind::Price,
            required: true,
        },
        FieldSpec {
            name: "quantity",
            label: "Quantity",
            kind: FieldKind::Quantity,
            required: true,
        },
        FieldSpec {
            name: "categoryId",
            label: "Category id",
            kind: FieldKind::Reference,
            required: true,
        },
        FieldSpec {
            name: "colorId",
            label: "Color id",
            kind: FieldKind::Reference,
            required: true,
        },
        FieldSpec {
            name: "sizeId",
            label: "Size id",
            kind: FieldKind::Reference,
            required: true,
        },
        FieldSpec {
            name: "genderId",
            label: "Gender id",
            kind: FieldKind::Reference,
            required: true,
        },
        FieldSpec {
            name: "images",
            label: "Images",
            kind: FieldKind::ImageList,
            required: true,
        },
        FieldSpec {
            name: "isFeatured",
            label: "Featured",
            kind: FieldKind::Toggle,
            required: false,
        },
        FieldSpec {
            name: "isArchived",
            label: "Archived",
            kind: FieldKind::Toggle,
            required: false,
        },
    ],
};
