use askama::Template;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::Error as _,
    ser::SerializeMap,
};
use serde_json::{Map, Value};

/// Keys injected into every stored document. They win over submitted keys
/// of the same name.
const TO_KEY: &str = "to";
const MESSAGE_KEY: &str = "message";

/// Rendered in place of a field the payload did not carry.
const MISSING_FIELD: &str = "undefined";

#[derive(Template)]
#[template(
    source = r#"
<h1>Nuevo contacto desde la web 🚀</h1>
<ul>
  <li><strong>Nombre:</strong> {{ nombre }}</li>
  <li><strong>Email:</strong> {{ email }}</li>
  <li><strong>Teléfono:</strong> {{ telefono }}</li>
  <li><strong>Servicio de interés:</strong> {{ servicio }}</li>
  <li><strong>Comentario:</strong> {{ comentario }}</li>
</ul>
"#,
    ext = "html",
    escape = "none"
)]
struct NotificationHtml {
    nombre: String,
    email: String,
    telefono: String,
    servicio: String,
    comentario: String,
}

/// Email the notification dispatcher sends for a stored lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub subject: String,
    pub html: String,
}

impl NotificationMessage {
    /// Render subject and body from the submitted fields, verbatim.
    pub fn render(fields: &Map<String, Value>) -> Result<Self, askama::Error> {
        let html = NotificationHtml {
            nombre: field_text(fields, "nombre"),
            email: field_text(fields, "email"),
            telefono: field_text(fields, "telefono"),
            servicio: field_text(fields, "servicio"),
            comentario: field_text(fields, "comentario"),
        }
        .render()?;

        Ok(Self {
            subject: format!("Nuevo prospecto: {}", field_text(fields, "nombre")),
            html,
        })
    }
}

fn field_text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None => MISSING_FIELD.to_owned(),
        Some(Value::String(value)) => value.to_owned(),
        Some(other) => other.to_string(),
    }
}

/// One entry of the `contactos` collection: every submitted key as received
/// plus the `to` recipients and the notification `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredContactDocument {
    pub fields: Map<String, Value>,
    pub to: Vec<String>,
    pub message: NotificationMessage,
}

impl StoredContactDocument {
    pub fn build(
        fields: Map<String, Value>,
        recipient: impl Into<String>,
    ) -> Result<Self, askama::Error> {
        let message = NotificationMessage::render(&fields)?;

        Ok(Self {
            fields,
            to: vec![recipient.into()],
            message,
        })
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            TO_KEY | MESSAGE_KEY => None,
            _ => self.fields.get(key),
        }
    }
}

impl Serialize for StoredContactDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let submitted = self
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != TO_KEY && key.as_str() != MESSAGE_KEY)
            .collect::<Vec<_>>();

        let mut map = serializer.serialize_map(Some(submitted.len() + 2))?;
        for (key, value) in submitted {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(TO_KEY, &self.to)?;
        map.serialize_entry(MESSAGE_KEY, &self.message)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for StoredContactDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        let to = fields
            .remove(TO_KEY)
            .ok_or_else(|| D::Error::missing_field(TO_KEY))?;
        let message = fields
            .remove(MESSAGE_KEY)
            .ok_or_else(|| D::Error::missing_field(MESSAGE_KEY))?;

        Ok(Self {
            fields,
            to: serde_json::from_value(to).map_err(D::Error::custom)?,
            message: serde_json::from_value(message).map_err(D::Error::custom)?,
        })
    }
}
