//! Repository abstractions for data access.

mod client;
mod company;
mod filing;
mod invoice;
mod task;
mod user;

pub use client::{ClientError, ClientInput, ClientRepository, DocumentInput};
pub use company::{CompanyError, CompanyInput, CompanyRepository};
pub use filing::{CreateVatInput, CreateZakatInput, FilingError, FilingRepository};
pub use invoice::{
    AttachmentInput, InvoiceError, InvoiceFilter, InvoiceInput, InvoiceRepository, ItemInput,
};
pub use task::{TaskError, TaskFilter, TaskInput, TaskRepository};
pub use user::{CreateUserInput, UserError, UserRepository};
