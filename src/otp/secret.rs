//! Shared secret normalization.
//!
//! Authenticator setup screens hand out base-32 secrets in many shapes:
//! lowercase, grouped with spaces, or with the trailing `=` padding dropped.
//! [`normalize`] turns any of these into raw key bytes.

use crate::otp::error::OtpError;

/// Length every un-padded secret in the repair range is padded up to.
const REPAIR_LENGTH: usize = 32;

/// Secrets strictly shorter than this are never repadded.
const REPAIR_MIN: usize = 16;

/// Number of characters in one base-32 quantum.
const QUANTUM: usize = 8;

/// Normalizes a user-supplied base-32 secret into raw key bytes.
///
/// ASCII letters are uppercased and spaces are stripped; any other character
/// is kept as is and rejected during decoding. Secrets longer than 16 and
/// shorter than 32 characters are right-padded with `=` to 32 characters,
/// which repairs the common case of a secret copied without its padding. The
/// result is decoded as standard RFC 4648 base-32.
///
/// # Errors
///
/// Returns [`OtpError::DecodeError`] when the secret contains characters
/// outside the base-32 alphabet or its padding or length is invalid.
///
/// # Example
///
/// ```rust
/// use otpbase::otp::normalize;
///
/// let key = normalize("jbsw y3dp")?;
/// assert_eq!(key, b"Hello");
/// # Ok::<(), otpbase::OtpError>(())
/// ```
pub fn normalize(secret: &str) -> Result<Vec<u8>, OtpError> {
    let mut secret: String = secret
        .to_ascii_uppercase()
        .chars()
        .filter(|c| *c != ' ')
        .collect();

    if secret.len() > REPAIR_MIN && secret.len() < REPAIR_LENGTH {
        let missing = REPAIR_LENGTH - secret.len();
        secret.extend(std::iter::repeat_n('=', missing));
    }

    let data = validate_padded(&secret)?;

    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, data)
        .ok_or_else(|| OtpError::DecodeError("not valid base-32".to_string()))
}

/// Checks alphabet and padding rules, returning the unpadded data part.
fn validate_padded(secret: &str) -> Result<&str, OtpError> {
    let (data, padding) = match secret.find('=') {
        Some(idx) => secret.split_at(idx),
        None => (secret, ""),
    };

    if let Some(bad) = data.chars().find(|c| !is_base32_char(*c)) {
        return Err(OtpError::DecodeError(format!(
            "illegal base-32 character {bad:?}"
        )));
    }
    if padding.chars().any(|c| c != '=') {
        return Err(OtpError::DecodeError(
            "data found after padding".to_string(),
        ));
    }

    let partial = data.len() % QUANTUM;
    if padding.is_empty() {
        if partial != 0 {
            return Err(OtpError::DecodeError(format!(
                "unpadded length {} is not a multiple of {QUANTUM}",
                data.len()
            )));
        }
        return Ok(data);
    }

    // 1, 3 and 6 leftover characters cannot encode a whole byte.
    let required_padding = match partial {
        0 => QUANTUM,
        2 | 4 | 5 | 7 => QUANTUM - partial,
        _ => {
            return Err(OtpError::DecodeError(format!(
                "invalid final quantum of {partial} characters"
            )));
        }
    };
    if padding.len() < required_padding {
        return Err(OtpError::DecodeError("incomplete padding".to_string()));
    }

    Ok(data)
}

fn is_base32_char(c: char) -> bool {
    c.is_ascii_uppercase() || ('2'..='7').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_space_insensitive() {
        let spaced = normalize("jbsw y3dp").unwrap();
        let plain = normalize("JBSWY3DP").unwrap();
        assert_eq!(spaced, plain);
        assert_eq!(plain, b"Hello");
    }

    #[test]
    fn test_sixteen_characters_not_repadded() {
        let key = normalize("JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(key, b"Hello!\xde\xad\xbe\xef");
    }

    #[test]
    fn test_twenty_characters_repadded() {
        let key = normalize("JBSWY3DPEHPK3PXPJBSW").unwrap();
        assert_eq!(key, b"Hello!\xde\xad\xbe\xefHe");
    }

    #[test]
    fn test_twenty_six_characters_repadded() {
        let key = normalize("jbsw y3dp ehpk 3pxp jbsw y3dp eh").unwrap();
        assert_eq!(key, b"Hello!\xde\xad\xbe\xefHello!");
    }

    #[test]
    fn test_already_padded_secret() {
        let key = normalize("JBSWY3DPEHPK3PXPJBSW====").unwrap();
        assert_eq!(key, b"Hello!\xde\xad\xbe\xefHe");
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            normalize("JBSWY3DP0000001!"),
            Err(OtpError::DecodeError(_))
        ));
        // 0, 1, 8 and 9 are outside the RFC 4648 alphabet
        assert!(matches!(
            normalize("JBSWY3D1"),
            Err(OtpError::DecodeError(_))
        ));
    }

    #[test]
    fn test_non_ascii_characters_rejected() {
        // 'ß' must not be case-folded into "SS" and decoded as alphabet characters
        assert!(matches!(
            normalize("jbswy3ß"),
            Err(OtpError::DecodeError(_))
        ));
        assert!(matches!(
            normalize("ｊｂｓｗｙ３ｄｐ"),
            Err(OtpError::DecodeError(_))
        ));
    }

    #[test]
    fn test_invalid_length() {
        // Too short to be repadded and not a whole quantum
        assert!(matches!(normalize("JBSWY3D"), Err(OtpError::DecodeError(_))));
        // Longer than 32 and not a whole quantum
        assert!(matches!(
            normalize("JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXPJ"),
            Err(OtpError::DecodeError(_))
        ));
    }

    #[test]
    fn test_invalid_padding() {
        // Data after padding
        assert!(matches!(
            normalize("JBSW==Y3"),
            Err(OtpError::DecodeError(_))
        ));
        // Three leftover characters never encode a whole byte
        assert!(matches!(
            normalize("JBSWY3DPEHP====="),
            Err(OtpError::DecodeError(_))
        ));
        // Padding that does not complete the quantum
        assert!(matches!(
            normalize("JBSWY3DPEH=="),
            Err(OtpError::DecodeError(_))
        ));
    }

    #[test]
    fn test_empty_secret_decodes_to_empty_key() {
        assert!(normalize("").unwrap().is_empty());
        assert!(normalize("   ").unwrap().is_empty());
    }
}
