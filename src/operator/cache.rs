use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::OperatorError;
use super::{build_operator, LaplacianOperator, OperatorRepr};

static OPERATOR_CACHE: Lazy<Mutex<HashMap<(usize, OperatorRepr), Arc<LaplacianOperator>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns the operator for `(n, repr)`, building it on first use.
///
/// Operators are immutable, so the returned `Arc` can be shared freely across
/// steppers and threads working on grids of the same size. The cache lock is
/// released while an operator is being built; if two callers race on the same
/// key, both get whichever `Arc` was inserted first.
pub fn cached_operator(
    n: usize,
    repr: OperatorRepr,
) -> Result<Arc<LaplacianOperator>, OperatorError> {
    if let Some(op) = lock_cache().get(&(n, repr)) {
        return Ok(Arc::clone(op));
    }

    let built = Arc::new(build_operator(n, repr)?);
    let op = Arc::clone(lock_cache().entry((n, repr)).or_insert(built));
    debug!(n, ?repr, "Cached Laplacian operator");
    Ok(op)
}

fn lock_cache() -> MutexGuard<'static, HashMap<(usize, OperatorRepr), Arc<LaplacianOperator>>> {
    OPERATOR_CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn clear_operator_cache() {
    lock_cache().clear();
}
