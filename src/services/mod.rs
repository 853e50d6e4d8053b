//! Service layer modules for external integrations.
//!
//! Contains the hosted-inference gateway and the optional cloud media store.

pub mod media_store;
pub mod model_gateway;

pub use media_store::MediaStore;
pub use model_gateway::ModelGateway;
