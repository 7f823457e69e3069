use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound (inclusive) of synthetic user ids
pub const MAX_USER_ID: u32 = 10_000;

/// Source of the enrichment values stamped onto every dataset
pub trait IdentitySource: Send {
    /// Synthetic user id in `1..=MAX_USER_ID`
    fn user_id(&mut self) -> u32;

    /// National-id-like string (a Brazilian CPF)
    fn national_id(&mut self) -> String;

    fn now(&self) -> DateTime<Utc>;
}

/// Whether national ids should be added to the gated datasets of a batch.
///
/// The gate is a freshly generated national id; any non-empty value opens it.
pub fn national_id_gate(identity: &mut dyn IdentitySource) -> bool {
    !identity.national_id().is_empty()
}

/// Random identities backed by the system clock
pub struct Identity {
    rng: StdRng,
}

impl Identity {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySource for Identity {
    fn user_id(&mut self) -> u32 {
        self.rng.gen_range(1..=MAX_USER_ID)
    }

    fn national_id(&mut self) -> String {
        let mut base = [0u8; 9];
        for digit in base.iter_mut() {
            *digit = self.rng.gen_range(0..10);
        }
        format_cpf(&base)
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Compute both CPF check digits for a nine digit base.
pub fn cpf_check_digits(base: &[u8; 9]) -> (u8, u8) {
    let first = check_digit(base.iter().copied(), 10);
    let second = check_digit(base.iter().copied().chain(std::iter::once(first)), 11);
    (first, second)
}

fn check_digit(digits: impl Iterator<Item = u8>, start_weight: u32) -> u8 {
    let sum: u32 = digits
        .zip((2..=start_weight).rev())
        .map(|(d, w)| u32::from(d) * w)
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        r => r as u8,
    }
}

/// Render a CPF as `###.###.###-##`
pub fn format_cpf(base: &[u8; 9]) -> String {
    let (first, second) = cpf_check_digits(base);
    let d: Vec<char> = base
        .iter()
        .chain([first, second].iter())
        .map(|d| char::from(b'0' + d))
        .collect();

    format!(
        "{}{}{}.{}{}{}.{}{}{}-{}{}",
        d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7], d[8], d[9], d[10]
    )
}

/// Check the layout and check digits of a formatted CPF
pub fn is_valid_cpf(cpf: &str) -> bool {
    let bytes = cpf.as_bytes();
    if bytes.len() != 14 || bytes[3] != b'.' || bytes[7] != b'.' || bytes[11] != b'-' {
        return false;
    }

    let digits: Vec<u8> = cpf
        .chars()
        .filter(|c| c.is_ascii_digit())
        .map(|c| c as u8 - b'0')
        .collect();
    if digits.len() != 11 {
        return false;
    }

    let mut base = [0u8; 9];
    base.copy_from_slice(&digits[..9]);
    cpf_check_digits(&base) == (digits[9], digits[10])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_cpf_check_digits() {
        // 529.982.247-25 is the canonical documentation example
        assert_eq!(cpf_check_digits(&[5, 2, 9, 9, 8, 2, 2, 4, 7]), (2, 5));
        assert_eq!(format_cpf(&[5, 2, 9, 9, 8, 2, 2, 4, 7]), "529.982.247-25");
    }

    #[test]
    fn test_generated_cpfs_are_valid() {
        let mut identity = Identity::with_seed(42);
        for _ in 0..200 {
            let cpf = identity.national_id();
            assert!(is_valid_cpf(&cpf), "{cpf}");
        }
    }

    #[test]
    fn test_invalid_cpf_rejected() {
        assert!(!is_valid_cpf("529.982.247-26"));
        assert!(!is_valid_cpf("52998224725"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn test_user_id_range() {
        let mut identity = Identity::with_seed(9);
        for _ in 0..1000 {
            let id = identity.user_id();
            assert!((1..=MAX_USER_ID).contains(&id));
        }
    }

    #[test]
    fn test_default_gate_is_open() {
        let mut identity = Identity::with_seed(5);
        assert!(national_id_gate(&mut identity));
    }
}
