pub mod linter;
pub mod type_checker;

pub use linter::RuleLinter;
pub use type_checker::RuleTypeChecker;

use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
