use sea_query::Iden;

/// Append-only lead collection. `document` holds the stored JSON object.
#[derive(Iden, Clone)]
pub enum Contactos {
    Table,
    Id,
    Document,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum ContactosDelivery {
    Table,
    DocumentId,
    State,
    Attempts,
    Error,
    UpdatedAt,
}
