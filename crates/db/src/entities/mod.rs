//! `SeaORM` entity definitions.

pub mod client_documents;
pub mod clients;
pub mod companies;
pub mod invoice_attachments;
pub mod invoice_items;
pub mod invoices;
pub mod sea_orm_active_enums;
pub mod tasks;
pub mod users;
pub mod vat_calculations;
pub mod zakat_calculations;
