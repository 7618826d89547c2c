mod contactos;
mod contactos_delivery;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "consultoria",
    "m0001",
    vec_box![],
    vec_box![
        contactos::CreateTable,
        contactos::CreateIdx1,
        contactos_delivery::CreateTable,
        contactos_delivery::CreateIdx1
    ]
);
