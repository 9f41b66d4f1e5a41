use crate::error::DsLockError;

pub fn get_exit_code(error: &DsLockError) -> i32 {
    match error {
        DsLockError::InvalidDatastore(_)
        | DsLockError::InvalidRetryCount(_)
        | DsLockError::InvalidConfig(_)
        | DsLockError::ConfigError(_) => 2,

        DsLockError::Rpc(_) | DsLockError::Aggregate { .. } if error.is_lock_denied() => 75,

        DsLockError::Rpc(_) | DsLockError::Aggregate { .. } => 69,

        DsLockError::Transport(_) => 74,

        DsLockError::Io(_) | DsLockError::Json(_) => 1,
    }
}
