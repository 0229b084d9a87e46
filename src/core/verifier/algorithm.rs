//! The closed set of signature algorithms, parsed once from `alg`.

use std::fmt;

/// Digest used by an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlg {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    /// Display label such as `SHA-256`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Bit size suffix used in algorithm names.
    pub fn bits(self) -> u16 {
        match self {
            Self::Sha256 => 256,
            Self::Sha384 => 384,
            Self::Sha512 => 512,
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        usize::from(self.bits() / 8)
    }
}

/// NIST curve required by an ECDSA algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Curve {
    pub fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Digest paired with the curve in JOSE.
    pub fn hash(self) -> HashAlg {
        match self {
            Self::P256 => HashAlg::Sha256,
            Self::P384 => HashAlg::Sha384,
            Self::P521 => HashAlg::Sha512,
        }
    }

    /// Length of a JOSE `R || S` signature.
    pub fn signature_len(self) -> usize {
        match self {
            Self::P256 => 64,
            Self::P384 => 96,
            Self::P521 => 132,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A header `alg` value, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Algorithm {
    Hmac(HashAlg),
    Rsa(HashAlg),
    Ecdsa(Curve),
    None,
    /// Anything else, including a missing `alg`.
    Unsupported(Option<String>),
}

/// Algorithms this verifier can check.
pub const SUPPORTED: &str = "HS256, HS384, HS512, RS256, RS384, RS512, ES256, ES384, ES512";

impl Algorithm {
    pub fn from_header(alg: Option<&str>) -> Self {
        let Some(alg) = alg else {
            return Self::Unsupported(None);
        };
        match alg {
            "HS256" => Self::Hmac(HashAlg::Sha256),
            "HS384" => Self::Hmac(HashAlg::Sha384),
            "HS512" => Self::Hmac(HashAlg::Sha512),
            "RS256" => Self::Rsa(HashAlg::Sha256),
            "RS384" => Self::Rsa(HashAlg::Sha384),
            "RS512" => Self::Rsa(HashAlg::Sha512),
            "ES256" => Self::Ecdsa(Curve::P256),
            "ES384" => Self::Ecdsa(Curve::P384),
            "ES512" => Self::Ecdsa(Curve::P521),
            a if a.eq_ignore_ascii_case("none") => Self::None,
            other => Self::Unsupported(Some(other.to_string())),
        }
    }

    /// The canonical `alg` name, or `None` when the header had none.
    pub fn name(&self) -> Option<String> {
        match self {
            Self::Hmac(h) => Some(format!("HS{}", h.bits())),
            Self::Rsa(h) => Some(format!("RS{}", h.bits())),
            Self::Ecdsa(c) => Some(format!("ES{}", c.hash().bits())),
            Self::None => Some("none".to_string()),
            Self::Unsupported(name) => name.clone(),
        }
    }
}
