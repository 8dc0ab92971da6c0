pub mod error;
pub mod http;
pub mod traits;

pub use error::GatewayError;
pub use http::HttpGateway;
pub use traits::{AuthContext, AuthUser, CatalogGateway, HealthStatus, NewReview};
