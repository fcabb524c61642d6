use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use validator::{Validate, ValidationError, ValidationErrors};

/// JSON body that has already passed its `validator` rules.
pub struct SimpleValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for SimpleValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, axum::Json<Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let payload = json!({
                    "status": "error",
                    "message": format!("Invalid JSON: {}", rejection.body_text()),
                });
                (rejection.status(), axum::Json(payload))
            })?;

        value.validate().map_err(|errors| {
            let payload = json!({
                "status": "error",
                "message": summarize(&errors),
                "details": details(&errors),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload))
        })?;

        Ok(Self(value))
    }
}

fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "email" => "Invalid email format".to_string(),
        "length" => "Invalid length".to_string(),
        "range" => "Value out of range".to_string(),
        "must_match" => "Values do not match".to_string(),
        _ => format!("Invalid {field}"),
    }
}

fn summarize(errors: &ValidationErrors) -> String {
    let messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors
                .iter()
                .map(move |e| format!("{field}: {}", describe(&field, e)))
        })
        .collect();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

fn details(errors: &ValidationErrors) -> Value {
    let map: Map<String, Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages: Vec<String> = field_errors.iter().map(|e| describe(&field, e)).collect();
            (field.to_string(), json!(messages))
        })
        .collect();

    Value::Object(map)
}
