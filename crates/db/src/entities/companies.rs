//! `SeaORM` Entity for companies table (singleton firm settings).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub name_ar: Option<String>,
    pub cr_number: Option<String>,
    pub vat_number: Option<String>,
    pub iban: Option<String>,
    pub address: Option<String>,
    pub address_ar: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_filename: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
