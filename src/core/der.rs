//! Minimal DER encoder for RSA `SubjectPublicKeyInfo`.
//!
//! Keys fetched from a JWKS arrive as raw modulus and exponent bytes. This
//! module builds the ASN.1 tree around them and renders it as a PEM block.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_NULL: u8 = 0x05;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;

/// `1.2.840.113549.1.1.1` (rsaEncryption), content octets only.
const RSA_ENCRYPTION_OID: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

const PEM_LINE_WIDTH: usize = 64;

/// A tag-length-value node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tlv {
    /// Primitive value with raw content octets.
    Primitive { tag: u8, content: Vec<u8> },
    /// Constructed value whose content is the concatenation of its children.
    Constructed { tag: u8, children: Vec<Tlv> },
}

impl Tlv {
    /// Unsigned big-endian integer. Leading zero octets are dropped and a
    /// `0x00` is prepended when the high bit is set, so the value stays
    /// positive under DER's two's-complement rule.
    pub fn unsigned_integer(bytes: &[u8]) -> Self {
        let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        let trimmed = &bytes[first_nonzero..];

        let mut content = Vec::with_capacity(trimmed.len() + 1);
        match trimmed.first() {
            None => content.push(0),
            Some(&high) if high & 0x80 != 0 => {
                content.push(0);
                content.extend_from_slice(trimmed);
            }
            Some(_) => content.extend_from_slice(trimmed),
        }
        Self::Primitive {
            tag: TAG_INTEGER,
            content,
        }
    }

    pub fn sequence(children: Vec<Tlv>) -> Self {
        Self::Constructed {
            tag: TAG_SEQUENCE,
            children,
        }
    }

    /// BIT STRING with zero unused bits wrapping an encoded node.
    pub fn bit_string(inner: &Tlv) -> Self {
        let mut content = vec![0];
        content.extend(inner.to_der());
        Self::Primitive {
            tag: TAG_BIT_STRING,
            content,
        }
    }

    pub fn null() -> Self {
        Self::Primitive {
            tag: TAG_NULL,
            content: Vec::new(),
        }
    }

    pub fn oid(encoded: &[u8]) -> Self {
        Self::Primitive {
            tag: TAG_OID,
            content: encoded.to_vec(),
        }
    }

    /// Encode this node and everything beneath it.
    pub fn to_der(&self) -> Vec<u8> {
        let (tag, content) = match self {
            Self::Primitive { tag, content } => (*tag, content.clone()),
            Self::Constructed { tag, children } => {
                (*tag, children.iter().flat_map(Tlv::to_der).collect())
            }
        };

        let mut out = Vec::with_capacity(content.len() + 6);
        out.push(tag);
        out.extend(encode_length(content.len()));
        out.extend(content);
        out
    }
}

/// DER length octets: short form below 128, long form otherwise.
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        // Short form: a single octet.
        return vec![len as u8];
    }
    let be = len.to_be_bytes();
    let skip = be.iter().take_while(|&&b| b == 0).count();
    let significant = &be[skip..];

    let mut out = Vec::with_capacity(significant.len() + 1);
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// DER `SubjectPublicKeyInfo` for an RSA key given its raw modulus and
/// exponent bytes.
pub fn rsa_spki(modulus: &[u8], exponent: &[u8]) -> Vec<u8> {
    let rsa_public_key = Tlv::sequence(vec![
        Tlv::unsigned_integer(modulus),
        Tlv::unsigned_integer(exponent),
    ]);
    let algorithm = Tlv::sequence(vec![Tlv::oid(RSA_ENCRYPTION_OID), Tlv::null()]);

    Tlv::sequence(vec![algorithm, Tlv::bit_string(&rsa_public_key)]).to_der()
}

/// Armor DER bytes as PEM with 64-column base64 lines.
pub fn to_pem(label: &str, der: &[u8]) -> String {
    let body = STANDARD.encode(der);
    let mut pem = format!("-----BEGIN {label}-----\n");
    let mut rest = body.as_str();
    while !rest.is_empty() {
        // Base64 output is ASCII, so every index is a char boundary.
        let (line, tail) = rest.split_at(rest.len().min(PEM_LINE_WIDTH));
        pem.push_str(line);
        pem.push('\n');
        rest = tail;
    }
    pem.push_str(&format!("-----END {label}-----\n"));
    pem
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::EncodePublicKey;
    use rsa::traits::PublicKeyParts;

    const RSA_PUBLIC: &str = include_str!("../../tests/fixtures/rsa_public.pem");

    #[test]
    fn test_short_form_length() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(127), vec![0x7f]);
    }

    #[test]
    fn test_long_form_length() {
        assert_eq!(encode_length(128), vec![0x81, 0x80]);
        assert_eq!(encode_length(255), vec![0x81, 0xff]);
        assert_eq!(encode_length(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode_length(270), vec![0x82, 0x01, 0x0e]);
        assert_eq!(encode_length(65_536), vec![0x83, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_integer_gets_sign_octet_when_high_bit_set() {
        assert_eq!(Tlv::unsigned_integer(&[0x80]).to_der(), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(Tlv::unsigned_integer(&[0x7f]).to_der(), vec![0x02, 0x01, 0x7f]);
    }

    #[test]
    fn test_integer_drops_redundant_leading_zeros() {
        assert_eq!(
            Tlv::unsigned_integer(&[0x00, 0x00, 0x01, 0x00, 0x01]).to_der(),
            vec![0x02, 0x03, 0x01, 0x00, 0x01]
        );
        assert_eq!(Tlv::unsigned_integer(&[]).to_der(), vec![0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_bit_string_prefixes_unused_bits_octet() {
        let inner = Tlv::null();
        assert_eq!(Tlv::bit_string(&inner).to_der(), vec![0x03, 0x03, 0x00, 0x05, 0x00]);
    }

    #[test]
    fn test_rsa_algorithm_identifier_bytes() {
        let algorithm = Tlv::sequence(vec![Tlv::oid(RSA_ENCRYPTION_OID), Tlv::null()]);
        assert_eq!(
            algorithm.to_der(),
            vec![
                0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01, 0x05,
                0x00
            ]
        );
    }

    #[test]
    fn test_rsa_spki_matches_reference_encoder() {
        use rsa::pkcs8::DecodePublicKey;

        let key = rsa::RsaPublicKey::from_public_key_pem(RSA_PUBLIC).unwrap();
        let ours = rsa_spki(&key.n().to_bytes_be(), &key.e().to_bytes_be());
        let reference = key.to_public_key_der().unwrap();
        assert_eq!(ours, reference.as_bytes());
    }

    #[test]
    fn test_pem_is_byte_identical_to_fixture() {
        use rsa::pkcs8::DecodePublicKey;

        let key = rsa::RsaPublicKey::from_public_key_pem(RSA_PUBLIC).unwrap();
        let der = rsa_spki(&key.n().to_bytes_be(), &key.e().to_bytes_be());
        assert_eq!(to_pem("PUBLIC KEY", &der), RSA_PUBLIC);
    }

    #[test]
    fn test_pem_lines_are_64_columns() {
        let pem = to_pem("PUBLIC KEY", &[0xab; 200]);
        let body: Vec<&str> = pem
            .lines()
            .filter(|l| !l.starts_with("-----"))
            .collect();
        assert!(body[..body.len() - 1].iter().all(|l| l.len() == 64));
        assert!(body.last().unwrap().len() <= 64);
    }

    #[test]
    fn test_pem_body_splits_on_exact_line_width() {
        // 48 bytes encode to exactly 64 base64 characters.
        let one_line = to_pem("PUBLIC KEY", &[0x5a; 48]);
        assert_eq!(one_line.lines().count(), 3);

        let two_lines = to_pem("PUBLIC KEY", &[0x5a; 96]);
        let body: Vec<&str> = two_lines.lines().skip(1).take(2).collect();
        assert_eq!(body.iter().map(|l| l.len()).collect::<Vec<_>>(), vec![64, 64]);
        assert!(two_lines.ends_with("-----END PUBLIC KEY-----\n"));

        assert_eq!(
            to_pem("PUBLIC KEY", &[]),
            "-----BEGIN PUBLIC KEY-----\n-----END PUBLIC KEY-----\n"
        );
    }
}
