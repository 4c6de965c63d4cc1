use rand::Rng;

/// Six digit numeric one-time code, uniform over 100000..=999999.
pub fn generate_otp_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(100000..=999999u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_code() {
        for _ in 0..1000 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));

            let code_num: u32 = code.parse().unwrap();
            assert!((100000..=999999).contains(&code_num));
        }
    }

    #[test]
    fn test_codes_spread_over_range() {
        // Leading digit covers 1..=9 given enough samples
        let mut seen = [false; 10];
        for _ in 0..5000 {
            let first = generate_otp_code().as_bytes()[0] - b'0';
            seen[first as usize] = true;
        }
        assert!(!seen[0]);
        assert!(seen[1..].iter().all(|s| *s));
    }
}
