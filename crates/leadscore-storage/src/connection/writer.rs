//! Write helpers: BEGIN IMMEDIATE transactions and savepoints.

use leadscore_core::errors::StorageError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// The write lock is taken at transaction start, so a long job never
/// upgrades a read lock halfway through and hits SQLITE_BUSY.
/// Rolls back when `f` fails.
pub fn with_immediate_transaction<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<StorageError>,
{
    // Issues the BEGIN IMMEDIATE itself. A failed BEGIN leaves nothing
    // open; dropping `tx` without commit rolls back.
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| StorageError::sqlite(format!("failed to begin immediate transaction: {e}")))?;

    let result = f(&tx)?;

    tx.commit()
        .map_err(|e| StorageError::sqlite(format!("failed to commit: {e}")))?;

    Ok(result)
}

/// Run `f` inside the caller's transaction when one is open, otherwise in a
/// fresh immediate transaction.
pub fn within_unit_of_work<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<StorageError>,
{
    if conn.is_autocommit() {
        with_immediate_transaction(conn, |tx| f(tx))
    } else {
        f(conn)
    }
}

/// Execute `f` inside a named savepoint of an already open transaction.
/// On failure only the savepoint's work is rolled back.
pub fn with_savepoint<F, T, E>(conn: &Connection, name: &str, f: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<StorageError>,
{
    conn.execute_batch(&format!("SAVEPOINT {name}"))
        .map_err(|e| StorageError::sqlite(format!("failed to open savepoint {name}: {e}")))?;

    match f(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE SAVEPOINT {name}"))
                .map_err(|e| StorageError::sqlite(format!("failed to release savepoint {name}: {e}")))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(e) =
                conn.execute_batch(&format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}"))
            {
                tracing::error!(savepoint = name, error = %e, "savepoint rollback failed");
            }
            Err(err)
        }
    }
}
