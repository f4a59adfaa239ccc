pub mod contact;
pub mod demo;
pub mod events;
pub mod generate;
pub mod live;
pub mod pages;
pub mod uploads;

use atelier_core::form::FieldErrors;
use atelier_api::ApiError;

use crate::error::Error;

pub(super) fn invalid(errors: FieldErrors) -> Error { Error::Api(ApiError::Validation(errors)) }
