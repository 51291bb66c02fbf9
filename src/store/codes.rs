//! Display-code generation (`EMP4K2Q9Z`, `LVE7Q2M0A`).

use rand::Rng;

use crate::error::{HrmsError, HrmsResult};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of random characters after the prefix.
pub const CODE_SUFFIX_LEN: usize = 6;

/// How many colliding codes are tolerated before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 16;

/// Returns `prefix` followed by [`CODE_SUFFIX_LEN`] random `[A-Z0-9]` characters.
pub fn random_code<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let mut code = String::with_capacity(prefix.len() + CODE_SUFFIX_LEN);
    code.push_str(prefix);
    for _ in 0..CODE_SUFFIX_LEN {
        let index = rng.gen_range(0..CODE_ALPHABET.len());
        code.push(CODE_ALPHABET[index] as char);
    }
    code
}

/// Calls `insert` with fresh codes until it stops reporting a conflict.
///
/// The store's unique insert is the collision check. Any error other than
/// [`HrmsError::Conflict`] is returned immediately.
///
/// # Errors
///
/// Returns a storage error after [`MAX_CODE_ATTEMPTS`] collisions.
pub fn with_unique_code<T, F>(prefix: &str, mut insert: F) -> HrmsResult<T>
where
    F: FnMut(String) -> HrmsResult<T>,
{
    let mut rng = rand::thread_rng();
    for _ in 0..MAX_CODE_ATTEMPTS {
        match insert(random_code(prefix, &mut rng)) {
            Err(HrmsError::Conflict { .. }) => continue,
            other => return other,
        }
    }
    Err(HrmsError::Storage {
        message: format!(
            "could not allocate a unique {} code after {} attempts",
            prefix, MAX_CODE_ATTEMPTS
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_code_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = random_code("EMP", &mut rng);
        assert_eq!(code.len(), 9);
        assert!(code.starts_with("EMP"));
        assert!(
            code[3..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_retries_past_collisions() {
        let mut attempts = 0;
        let code = with_unique_code("LVE", |code| {
            attempts += 1;
            if attempts < 3 {
                Err(HrmsError::Conflict {
                    message: "taken".to_string(),
                })
            } else {
                Ok(code)
            }
        })
        .unwrap();
        assert_eq!(attempts, 3);
        assert!(code.starts_with("LVE"));
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let mut attempts = 0;
        let result: HrmsResult<String> = with_unique_code("EMP", |_| {
            attempts += 1;
            Err(HrmsError::Conflict {
                message: "taken".to_string(),
            })
        });
        assert!(matches!(result, Err(HrmsError::Storage { .. })));
        assert_eq!(attempts, MAX_CODE_ATTEMPTS);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let mut attempts = 0;
        let result: HrmsResult<String> = with_unique_code("EMP", |_| {
            attempts += 1;
            Err(HrmsError::validation("email", "missing"))
        });
        assert!(matches!(result, Err(HrmsError::Validation { .. })));
        assert_eq!(attempts, 1);
    }
}
