pub mod batch;
pub mod contact;
pub mod etl;
pub mod http;
pub mod phone;
pub mod pipeline;
pub mod whatsapp;
pub mod workbook;

pub use crate::domain::model::{FieldValue, Harvest, Record, SheetLayout};
pub use crate::domain::ports::{ExhibitorSource, Pipeline, Storage};
pub use crate::utils::error::Result;
