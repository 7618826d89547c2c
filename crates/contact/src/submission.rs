use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use validator::Validate;

/// Contact form fields, in the order the form renders them.
#[derive(
    EnumString,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Nombre,
    Telefono,
    Email,
    Servicio,
    Comentario,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Nombre => "Nombre",
            Field::Telefono => "Teléfono",
            Field::Email => "Email",
            Field::Servicio => "Servicio",
            Field::Comentario => "Comentario",
        }
    }
}

/// Payload posted by the contact form. `servicio` is free-form and never
/// checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContactSubmission {
    #[validate(custom(function = "crate::validation::check_nombre"))]
    pub nombre: String,
    #[validate(custom(function = "crate::validation::check_email"))]
    pub email: String,
    #[validate(custom(function = "crate::validation::check_telefono"))]
    pub telefono: String,
    pub servicio: String,
    #[validate(custom(function = "crate::validation::check_comentario"))]
    pub comentario: String,
}

impl ContactSubmission {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Nombre => &self.nombre,
            Field::Telefono => &self.telefono,
            Field::Email => &self.email,
            Field::Servicio => &self.servicio,
            Field::Comentario => &self.comentario,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Nombre => self.nombre = value,
            Field::Telefono => self.telefono = value,
            Field::Email => self.email = value,
            Field::Servicio => self.servicio = value,
            Field::Comentario => self.comentario = value,
        }
    }
}
