// utils/reference.rs
use rand::distr::Alphanumeric;
use rand::{rng, Rng};

/// Human-readable booking reference, e.g. HH-4K7QX2NA.
pub fn generate_booking_reference() -> String {
    let mut rng = rng();
    let code: String = (0..8).map(|_| rng.sample(Alphanumeric) as char).collect();
    format!("HH-{}", code.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shape() {
        let reference = generate_booking_reference();
        assert!(reference.starts_with("HH-"));
        assert_eq!(reference.len(), 11);
        assert!(reference[3..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_references_are_not_repeated() {
        let first = generate_booking_reference();
        let second = generate_booking_reference();
        assert_ne!(first, second);
    }
}
