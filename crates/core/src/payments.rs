//! Payments
//!
//! The payment gateway confirms a captured payment by signing `order_id|payment_id` with the
//! merchant's key secret (HMAC-SHA256, hex-encoded). A payment counts as paid only once that
//! signature verifies.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroize;

pub use crate::money::to_minor_units;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of an HMAC-SHA256 tag.
pub const SIGNATURE_BYTES: usize = 32;

/// Configuration problems that prevent signature verification.
///
/// These are distinct from a signature that simply fails to verify, which is `Ok(false)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentConfigError {
    /// No gateway key secret is configured.
    #[error("payment gateway key secret is not configured")]
    MissingSecret,

    /// The configured key secret is empty.
    #[error("payment gateway key secret is empty")]
    EmptySecret,

    /// The key secret was rejected by the MAC.
    #[error("payment gateway key secret is invalid")]
    InvalidSecret,
}

/// Gateway key secret used to verify payment signatures.
#[derive(Clone)]
pub struct PaymentSecret {
    secret: String,
}

impl PaymentSecret {
    /// Wrap a key secret.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentConfigError::EmptySecret`] if `secret` is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, PaymentConfigError> {
        let secret = secret.into();

        if secret.is_empty() {
            return Err(PaymentConfigError::EmptySecret);
        }

        Ok(Self { secret })
    }

    /// Return the raw secret, e.g. for authenticating against the gateway.
    pub fn expose_secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for PaymentSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PaymentSecret(**redacted**)")?;
        Ok(())
    }
}

impl Drop for PaymentSecret {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// Verify the gateway's signature for a captured payment.
///
/// Returns `Ok(false)` for any signature that does not verify, including signatures that are not
/// valid hex or have the wrong length. Hex digits may be upper or lower case. The comparison is
/// constant-time.
///
/// # Errors
///
/// - [`PaymentConfigError::MissingSecret`]: `secret` is `None`.
/// - [`PaymentConfigError::InvalidSecret`]: the secret cannot key the MAC.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    provided_signature: &str,
    secret: Option<&PaymentSecret>,
) -> Result<bool, PaymentConfigError> {
    let secret = secret.ok_or(PaymentConfigError::MissingSecret)?;

    let Some(provided) = decode_signature_hex(provided_signature.trim()) else {
        return Ok(false);
    };

    let mac = payment_mac(order_id, payment_id, secret)?;

    Ok(mac.verify_slice(&provided).is_ok())
}

/// Sign a payment the way the gateway does, producing lower-case hex.
///
/// # Errors
///
/// Returns [`PaymentConfigError::InvalidSecret`] if the secret cannot key the MAC.
pub fn sign_payment(
    order_id: &str,
    payment_id: &str,
    secret: &PaymentSecret,
) -> Result<String, PaymentConfigError> {
    let tag = payment_mac(order_id, payment_id, secret)?
        .finalize()
        .into_bytes();

    Ok(encode_signature_hex(&tag))
}

fn payment_mac(
    order_id: &str,
    payment_id: &str,
    secret: &PaymentSecret,
) -> Result<HmacSha256, PaymentConfigError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_err| PaymentConfigError::InvalidSecret)?;

    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    Ok(mac)
}

fn encode_signature_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);

    for byte in bytes {
        for nibble in [byte >> 4, byte & 0x0f] {
            if let Some(digit) = char::from_digit(u32::from(nibble), 16) {
                encoded.push(digit);
            }
        }
    }

    encoded
}

fn decode_signature_hex(signature_hex: &str) -> Option<[u8; SIGNATURE_BYTES]> {
    if signature_hex.len() != SIGNATURE_BYTES * 2 {
        return None;
    }

    let mut signature = [0_u8; SIGNATURE_BYTES];

    for (byte, pair) in signature
        .iter_mut()
        .zip(signature_hex.as_bytes().chunks_exact(2))
    {
        let [hi, lo] = pair else {
            return None;
        };

        *byte = (decode_hex_nibble(*hi)? << 4) | decode_hex_nibble(*lo)?;
    }

    Some(signature)
}

fn decode_hex_nibble(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}
