use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("no clothing items are available to build a recommendation")]
    EmptyInventory,
    #[error("{entity} `{id}` was not found")]
    NotFound { entity: &'static str, id: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("unprocessable: {message}")]
    Unprocessable { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested resource does not exist.",
            Self::Conflict { .. } => {
                "The request conflicts with the current state of the wardrobe."
            }
            Self::Unprocessable { .. } => {
                "Your wardrobe is empty. Add some clothing items first."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Unprocessable { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::Unprocessable { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::Unprocessable { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error @ DomainError::InvalidInput(_)) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::Domain(error @ DomainError::NotFound { .. }) => {
                Self::NotFound { message: error.to_string(), correlation_id }
            }
            ApplicationError::Domain(error @ DomainError::InvalidOperation(_)) => {
                Self::Conflict { message: error.to_string(), correlation_id }
            }
            ApplicationError::Domain(error @ DomainError::EmptyInventory) => {
                Self::Unprocessable { message: error.to_string(), correlation_id }
            }
            ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn invalid_input_maps_to_bad_request_interface_error() {
        let interface =
            ApplicationError::from(DomainError::InvalidInput("weather `tornado`".to_owned()))
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn empty_inventory_is_a_user_facing_condition() {
        let interface =
            ApplicationError::from(DomainError::EmptyInventory).into_interface("req-2");

        assert!(matches!(interface, InterfaceError::Unprocessable { .. }));
        assert_eq!(
            interface.user_message(),
            "Your wardrobe is empty. Add some clothing items first."
        );
    }

    #[test]
    fn blocked_delete_maps_to_conflict() {
        let interface = ApplicationError::from(DomainError::InvalidOperation(
            "category has active children".to_owned(),
        ))
        .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Conflict { .. }));
        assert!(interface.message().contains("active children"));
    }

    #[test]
    fn not_found_keeps_entity_and_id_in_message() {
        let interface =
            ApplicationError::from(DomainError::not_found("clothing item", "item-9"))
                .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::NotFound { .. }));
        assert_eq!(interface.message(), "clothing item `item-9` was not found");
        assert_eq!(interface.correlation_id(), "req-4");
    }

    #[test]
    fn persistence_error_maps_to_service_unavailable() {
        let interface = ApplicationError::Persistence("database lock timeout".to_owned())
            .into_interface("req-5");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface = ApplicationError::Configuration("invalid material factor".to_owned())
            .into_interface("req-6");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
