//! `SeaORM` Entity for zakat_calculations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FilingStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "zakat_calculations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Declaration period label, e.g. "1447H".
    pub hijri_year: String,
    pub cash_and_deposits: Decimal,
    pub trade_goods: Decimal,
    pub receivables: Decimal,
    pub investments: Decimal,
    pub total_assets: Decimal,
    pub liabilities: Decimal,
    pub net_wealth: Decimal,
    pub zakat_due: Decimal,
    /// Threshold in force when the declaration was computed.
    pub nisab_threshold: Decimal,
    pub status: FilingStatus,
    pub notes: Option<String>,
    pub client_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
