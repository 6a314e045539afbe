use cinema_core::error::ReservationError;

/// Failure of a transactional ledger or inventory mutation.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A domain rule rejected the mutation. Nothing was written.
    #[error(transparent)]
    Rejected(#[from] ReservationError),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl LedgerError {
    /// Classify a database error.
    ///
    /// Serialization failures, deadlocks and unique violations on the
    /// active-ticket indexes mean a concurrent request won the race; they
    /// surface as [`ReservationError::ConflictRetryable`].
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code();
            match code.as_deref() {
                Some("40001") | Some("40P01") => {
                    return Self::Rejected(ReservationError::ConflictRetryable);
                }
                Some("23505")
                    if db_err
                        .constraint()
                        .is_some_and(|c| c.starts_with("uq_tickets_")) =>
                {
                    return Self::Rejected(ReservationError::ConflictRetryable);
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        Self::from_sqlx(err)
    }
}
