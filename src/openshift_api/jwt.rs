use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde_json::Value;
use std::fmt;

/// Claims that must be present in each JWT segment.
///
/// Service-account tokens issued by the cluster always carry these; a
/// secret that lacks them was pasted from the wrong place.
const JWT_SEGMENTS: [(&str, &[&str]); 2] = [
    ("header", &["alg", "typ"]),
    (
        "payload",
        &[
            "iss",
            "kubernetes.io/serviceaccount/namespace",
            "kubernetes.io/serviceaccount/secret.name",
            "kubernetes.io/serviceaccount/service-account.name",
            "kubernetes.io/serviceaccount/service-account.uid",
            "sub",
        ],
    ),
];

/// Standard-alphabet engine that tolerates absent padding.
///
/// JWT segments are conventionally stored without `=` padding; canonical
/// re-encoding is checked separately against the original segment.
const STANDARD_PAD_OPTIONAL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A structural problem found in a JSON Web Token
///
/// These are advisory findings for operators configuring a secret; they
/// are accumulated and returned as data, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// The secret splits into fewer than three dot-separated segments
    MissingParts,
    /// A segment is not valid standard base64; `suggested` holds the
    /// encoding of the segment text itself as a hint
    NotBase64 {
        /// Which segment: "header" or "payload"
        part: &'static str,
        /// The correctly-encoded form of the offending segment
        suggested: String,
    },
    /// A required claim is absent from the decoded segment
    MissingClaim {
        /// Which segment: "header" or "payload"
        part: &'static str,
        /// The claim name that was not found
        claim: &'static str,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwtValidationError::MissingParts => write!(
                f,
                "The secret is not a JSON Web Token - make sure all three parts are included."
            ),
            JwtValidationError::NotBase64 { part, suggested } => write!(
                f,
                "The JWT {} does not appear to be base64 encoded, perhaps use '{}'?",
                part, suggested
            ),
            JwtValidationError::MissingClaim { part, claim } => {
                write!(f, "The JWT {} is missing the {} property.", part, claim)
            }
        }
    }
}

/// Validates a JSON Web Token as much as possible without the key
///
/// Checks that the header and payload segments are canonical standard
/// base64 and that each decodes to JSON carrying the claims a cluster
/// service-account token always has. The signature segment is never
/// inspected; this is a structural check, not a cryptographic one.
///
/// An empty secret yields no errors, as does a secret that is a plain
/// base64 blob (those are legacy non-JWT secrets, not malformed JWTs).
///
/// # Example
///
/// ```
/// use openshift_sdk::validate_jwt;
///
/// let errors = validate_jwt("not.a.token");
/// for error in &errors {
///     eprintln!("{}", error);
/// }
/// ```
pub fn validate_jwt(secret: &str) -> Vec<JwtValidationError> {
    let mut errors = Vec::new();
    if secret.is_empty() || is_plain_base64(secret) {
        return errors;
    }

    let segments: Vec<&str> = secret.split('.').collect();
    if segments.len() < 3 {
        errors.push(JwtValidationError::MissingParts);
        return errors;
    }

    for (index, &(part, claims)) in JWT_SEGMENTS.iter().enumerate() {
        let segment = segments[index];
        let decoded = match STANDARD_PAD_OPTIONAL.decode(segment) {
            Ok(decoded) if STANDARD.encode(&decoded).trim_end_matches('=') == segment => decoded,
            _ => {
                errors.push(JwtValidationError::NotBase64 {
                    part,
                    suggested: STANDARD.encode(segment.as_bytes()),
                });
                continue;
            }
        };

        // An undecodable segment reports every claim as missing; a claim
        // that is present but explicitly null counts as missing too.
        let data: Option<Value> = serde_json::from_slice(&decoded).ok();
        for &claim in claims {
            let present = data
                .as_ref()
                .and_then(|d| d.get(claim))
                .map(|v| !v.is_null())
                .unwrap_or(false);
            if !present {
                errors.push(JwtValidationError::MissingClaim { part, claim });
            }
        }
    }

    errors
}

/// Whether the secret is a plain base64 blob rather than a JWT.
///
/// Matches strings of standard base64 alphabet characters (newlines
/// allowed) with at most two trailing `=`. A JWT never matches: its dot
/// separators are outside the alphabet.
fn is_plain_base64(secret: &str) -> bool {
    let body = secret.trim_end_matches('=');
    if secret.len() - body.len() > 2 {
        return false;
    }
    body.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '+' | '\r' | '\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_segment(json: &str) -> String {
        STANDARD.encode(json).trim_end_matches('=').to_string()
    }

    #[test]
    fn test_empty_secret_passes() {
        assert!(validate_jwt("").is_empty());
    }

    #[test]
    fn test_plain_base64_blob_is_skipped() {
        // A legacy secret that is just a base64 blob is not treated as a JWT
        assert!(validate_jwt("dGhpcyBpcyBub3QgYSBqd3Q=").is_empty());
        assert!(validate_jwt("YWJjZGVm\r\nZ2hpamts").is_empty());
    }

    #[test]
    fn test_two_segments_reports_missing_parts_only() {
        let errors = validate_jwt("part-one.part-two");
        assert_eq!(errors, vec![JwtValidationError::MissingParts]);
    }

    #[test]
    fn test_well_formed_token_passes() {
        let header = encode_segment(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = encode_segment(
            r#"{"iss":"kubernetes/serviceaccount","kubernetes.io/serviceaccount/namespace":"myproject","kubernetes.io/serviceaccount/secret.name":"builder-token","kubernetes.io/serviceaccount/service-account.name":"builder","kubernetes.io/serviceaccount/service-account.uid":"abc-123","sub":"system:serviceaccount:myproject:builder"}"#,
        );
        let token = format!("{}.{}.signature-is-never-checked", header, payload);
        assert!(validate_jwt(&token).is_empty());
    }

    #[test]
    fn test_missing_claim_is_reported() {
        let header = encode_segment(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = encode_segment(
            r#"{"iss":"kubernetes/serviceaccount","kubernetes.io/serviceaccount/namespace":"myproject","kubernetes.io/serviceaccount/secret.name":"builder-token","kubernetes.io/serviceaccount/service-account.name":"builder","kubernetes.io/serviceaccount/service-account.uid":"abc-123"}"#,
        );
        let token = format!("{}.{}.sig", header, payload);
        let errors = validate_jwt(&token);
        assert_eq!(
            errors,
            vec![JwtValidationError::MissingClaim {
                part: "payload",
                claim: "sub",
            }]
        );
    }

    #[test]
    fn test_non_base64_segment_suggests_encoding() {
        let payload = encode_segment(
            r#"{"iss":"i","kubernetes.io/serviceaccount/namespace":"n","kubernetes.io/serviceaccount/secret.name":"s","kubernetes.io/serviceaccount/service-account.name":"a","kubernetes.io/serviceaccount/service-account.uid":"u","sub":"x"}"#,
        );
        let token = format!("{}.{}.sig", "not_base64!", payload);
        let errors = validate_jwt(&token);
        assert_eq!(
            errors,
            vec![JwtValidationError::NotBase64 {
                part: "header",
                suggested: STANDARD.encode("not_base64!"),
            }]
        );
    }

    #[test]
    fn test_null_claim_counts_as_missing() {
        let header = encode_segment(r#"{"alg":null,"typ":"JWT"}"#);
        let payload = encode_segment(
            r#"{"iss":"i","kubernetes.io/serviceaccount/namespace":"n","kubernetes.io/serviceaccount/secret.name":"s","kubernetes.io/serviceaccount/service-account.name":"a","kubernetes.io/serviceaccount/service-account.uid":"u","sub":"x"}"#,
        );
        let token = format!("{}.{}.sig", header, payload);
        let errors = validate_jwt(&token);
        assert_eq!(
            errors,
            vec![JwtValidationError::MissingClaim {
                part: "header",
                claim: "alg",
            }]
        );
    }
}
