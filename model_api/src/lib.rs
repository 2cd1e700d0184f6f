//! Client side of the model editor: the data model, the http client, the
//! action dispatcher and the server-authoritative model store.

pub mod actions;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod data;
pub mod error;
pub mod models;
pub mod reorder;
pub mod store;

pub use actions::{ModelAction, ParameterValue, Subject, dispatch};
pub use catalog::Catalog;
pub use client::{ApiClient, ApiRequest, ApiResponse, HttpTransport, Method, Transport};
pub use data::{
    ActivatorTarget, Function, LayerType, Model, ModelActivator, ModelLayer, Parameter,
    ParameterData, User, Value,
};
pub use error::{ApiError, ErrorBody, Result};
pub use store::{ModelStore, Notice, NoticeLevel};
