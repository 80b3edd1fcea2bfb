//! Application-level natural-key checks.
//!
//! These run before a write so the client gets a clear `E_ALREADY_EXISTS`.
//! They are not atomic with the write; the storage unique constraints remain
//! the guarantee and map to the same error.

use crate::database::Store;
use crate::error::ApiError;

/// Natural key to check for a write. On create every field is supplied. On
/// update, `None` means the payload touches none of the fields and the check
/// is skipped; otherwise each omitted field falls back to its current value.
pub fn composite<'a, const N: usize>(incoming: [Option<&'a str>; N], current: [&'a str; N]) -> Option<[&'a str; N]> {
    if incoming.iter().all(Option::is_none) {
        return None;
    }
    let mut merged = current;
    for (slot, value) in merged.iter_mut().zip(incoming) {
        if let Some(value) = value {
            *slot = value;
        }
    }
    Some(merged)
}

/// Fail when a sibling other than `except` already holds the key.
fn ensure_free(existing_id: Option<i64>, except: Option<i64>, message: &str) -> Result<(), ApiError> {
    match existing_id {
        Some(id) if Some(id) != except => Err(ApiError::already_exists(message)),
        _ => Ok(()),
    }
}

pub async fn collection_code(
    store: &dyn Store,
    project_id: i64,
    code: &str,
    except: Option<i64>,
) -> Result<(), ApiError> {
    let existing = store.find_collection_by_code(project_id, code).await?;
    ensure_free(existing.map(|c| c.id), except, "Collection code already exists")
}

pub async fn key_name(store: &dyn Store, collection_id: i64, key: &str, except: Option<i64>) -> Result<(), ApiError> {
    let existing = store.find_key_by_name(collection_id, key).await?;
    ensure_free(existing.map(|k| k.id), except, "Key already exists")
}

pub async fn key_value_language(
    store: &dyn Store,
    key_id: i64,
    language: &str,
    except: Option<i64>,
) -> Result<(), ApiError> {
    let existing = store.find_key_value_by_language(key_id, language).await?;
    ensure_free(existing.map(|v| v.id), except, "Language already exists")
}

pub async fn user_email(store: &dyn Store, email: &str) -> Result<(), ApiError> {
    let existing = store.find_user_by_email(email).await?;
    ensure_free(existing.map(|u| u.id), None, "Email already exists")
}
