//! Certification path development and validation

pub mod cert_path;
pub mod extension_policy;
pub mod extension_validators;
pub mod name_constraints_set;
mod path_builder;
pub mod path_settings;
pub mod pdv_certificate;
pub mod pdv_extension;
pub mod policy;
pub mod policy_builder;
pub mod subject;
pub mod verifier;

pub use crate::{
    validator::cert_path::*, validator::extension_policy::*, validator::name_constraints_set::*,
    validator::path_settings::*, validator::pdv_certificate::*, validator::pdv_extension::*,
    validator::policy::*, validator::policy_builder::*, validator::subject::*,
    validator::verifier::*,
};
