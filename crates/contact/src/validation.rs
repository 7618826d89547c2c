use std::{collections::BTreeMap, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{ContactSubmission, Field};

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MIN_COMMENT_LENGTH: usize = 10;
pub const MAX_COMMENT_LENGTH: usize = 1000;

static RE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").unwrap());
static RE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?56)?[\s-]?[1-9][\s-]?[0-9]{4}[\s-]?[0-9]{4}$").unwrap());
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// First rule violated by `value`, if any. Rules run in a fixed order per
/// field and stop at the first failure.
fn first_violation(field: Field, value: &str) -> Option<(&'static str, String)> {
    match field {
        Field::Nombre => {
            let trimmed = value.trim();
            let len = trimmed.chars().count();
            if len < MIN_NAME_LENGTH {
                Some((
                    "nombre_min",
                    format!("El nombre debe tener al menos {MIN_NAME_LENGTH} caracteres"),
                ))
            } else if len > MAX_NAME_LENGTH {
                Some((
                    "nombre_max",
                    format!("El nombre no puede exceder {MAX_NAME_LENGTH} caracteres"),
                ))
            } else if !RE_NAME.is_match(trimmed) {
                Some((
                    "nombre_chars",
                    "El nombre solo puede contener letras y espacios".to_owned(),
                ))
            } else {
                None
            }
        }
        Field::Telefono => {
            let compact = value
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>();
            if value.is_empty() || !RE_PHONE.is_match(&compact) {
                Some((
                    "telefono",
                    "Ingrese un número de teléfono válido (ej: +56 9 1234 5678)".to_owned(),
                ))
            } else {
                None
            }
        }
        Field::Email => {
            if value.is_empty() || !RE_EMAIL.is_match(value.trim()) {
                Some(("email", "Ingrese un email válido".to_owned()))
            } else {
                None
            }
        }
        Field::Comentario => {
            let len = value.trim().chars().count();
            if len < MIN_COMMENT_LENGTH {
                Some((
                    "comentario_min",
                    format!("El comentario debe tener al menos {MIN_COMMENT_LENGTH} caracteres"),
                ))
            } else if len > MAX_COMMENT_LENGTH {
                Some((
                    "comentario_max",
                    format!("El comentario no puede exceder {MAX_COMMENT_LENGTH} caracteres"),
                ))
            } else {
                None
            }
        }
        Field::Servicio => None,
    }
}

/// At most one message per field, iterated in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrorSet(BTreeMap<Field, String>);

impl ValidationErrorSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Union with `other`; an existing message for a field is kept.
    pub fn merge(&mut self, other: ValidationErrorSet) {
        for (field, message) in other.0 {
            self.0.entry(field).or_insert(message);
        }
    }

    /// `Label: message` lines, as shown above the form.
    pub fn labeled(&self) -> Vec<String> {
        self.iter()
            .map(|(field, message)| format!("{}: {}", field.label(), message))
            .collect()
    }
}

impl fmt::Display for ValidationErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labeled().join("\n"))
    }
}

impl From<&ValidationErrors> for ValidationErrorSet {
    fn from(errors: &ValidationErrors) -> Self {
        let mut set = ValidationErrorSet::default();
        for (name, field_errors) in errors.field_errors() {
            let Ok(field) = Field::from_str(&name) else {
                continue;
            };
            if let Some(message) = field_errors.first().and_then(|e| e.message.as_ref()) {
                set.0.entry(field).or_insert_with(|| message.to_string());
            }
        }

        set
    }
}

/// Check a single field.
pub fn validate(field: Field, value: &str) -> ValidationErrorSet {
    let mut set = ValidationErrorSet::default();
    if let Some((_, message)) = first_violation(field, value) {
        set.0.insert(field, message);
    }

    set
}

/// Check every validated field of `submission`. Empty means it can be sent.
pub fn validate_all(submission: &ContactSubmission) -> ValidationErrorSet {
    match submission.validate() {
        Ok(()) => ValidationErrorSet::default(),
        Err(errors) => ValidationErrorSet::from(&errors),
    }
}

fn check(field: Field, value: &str) -> Result<(), ValidationError> {
    let Some((code, message)) = first_violation(field, value) else {
        return Ok(());
    };
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());

    Err(error)
}

pub(crate) fn check_nombre(value: &str) -> Result<(), ValidationError> {
    check(Field::Nombre, value)
}

pub(crate) fn check_telefono(value: &str) -> Result<(), ValidationError> {
    check(Field::Telefono, value)
}

pub(crate) fn check_email(value: &str) -> Result<(), ValidationError> {
    check(Field::Email, value)
}

pub(crate) fn check_comentario(value: &str) -> Result<(), ValidationError> {
    check(Field::Comentario, value)
}
