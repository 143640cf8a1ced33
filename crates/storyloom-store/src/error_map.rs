//! sqlx → domain error mapping.

use storyloom_core::error::DomainError;

const FOREIGN_KEY_VIOLATION: &str = "23503";
const SERIALIZATION_FAILURE: &str = "40001";

/// Maps a sqlx error onto the domain taxonomy.
///
/// Foreign-key violations become [`DomainError::ReferentialIntegrity`],
/// transaction serialization failures become
/// [`DomainError::ClusterConflict`] (retry the enclosing detection),
/// everything else is infrastructure.
pub(crate) fn map_db_error(error: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &error {
        match db.code().as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => {
                return DomainError::ReferentialIntegrity(db.message().to_owned());
            }
            Some(SERIALIZATION_FAILURE) => {
                return DomainError::ClusterConflict(db.message().to_owned());
            }
            _ => {}
        }
    }
    DomainError::Infrastructure(error.to_string())
}
