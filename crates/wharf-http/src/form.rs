//! `application/x-www-form-urlencoded` decoding.
//!
//! Splits `name=value&name=value` byte sequences into a [`Params`]
//! multimap. Percent-decoding is deliberately not performed; values
//! keep their raw encoded bytes and decoding is the caller's concern.

use crate::token::is_control;
use wharf_core::Params;

/// Maximum form field name length in bytes: 1 KB.
pub const FORM_NAME_MAX: usize = 1024;
/// Maximum form field value length in bytes: 1 MB.
pub const FORM_VALUE_MAX: usize = 1024 * 1024;

/// Form decoding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    /// A pair with an empty name (`=v` or a leading `&`).
    EmptyName,
    /// A control byte in a name or value.
    InvalidByte,
    /// Field name exceeds its cap.
    NameTooLong,
    /// Field value exceeds its cap.
    ValueTooLong,
    /// Name or value is not valid UTF-8.
    InvalidUtf8,
    /// The encoding is recognized but not implemented.
    Unsupported,
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "empty field name"),
            Self::InvalidByte => write!(f, "control byte in form data"),
            Self::NameTooLong => write!(f, "field name too long"),
            Self::ValueTooLong => write!(f, "field value too long"),
            Self::InvalidUtf8 => write!(f, "form data is not valid UTF-8"),
            Self::Unsupported => write!(f, "encoding not supported"),
        }
    }
}

impl std::error::Error for FormError {}

/// Sub-state of the decoder: reading a name or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Name,
    Value,
}

/// Decode a form-encoded byte sequence, appending each pair to `params`.
///
/// `=` ends the name and starts the value; `&` ends the pair. A
/// trailing pair with a non-empty name is emitted even without a
/// terminating `&` (its value may be empty). Pairs decoded before a
/// failure remain in `params`.
///
/// # Errors
///
/// Fails on an empty name, a control byte, an exceeded cap, or
/// non-UTF-8 content.
pub fn decode_form(params: &mut Params, input: &[u8]) -> Result<(), FormError> {
    let mut state = DecodeState::Name;
    let mut name: Vec<u8> = Vec::new();
    let mut value: Vec<u8> = Vec::new();

    for &byte in input {
        match state {
            DecodeState::Name => {
                if byte == b'=' {
                    if name.is_empty() {
                        return Err(FormError::EmptyName);
                    }
                    state = DecodeState::Value;
                } else if byte == b'&' {
                    // value is empty (OK)
                    if name.is_empty() {
                        return Err(FormError::EmptyName);
                    }
                    emit(params, &mut name, &mut value)?;
                } else if is_control(byte) {
                    return Err(FormError::InvalidByte);
                } else if name.len() >= FORM_NAME_MAX {
                    return Err(FormError::NameTooLong);
                } else {
                    name.push(byte);
                }
            }

            DecodeState::Value => {
                if byte == b'&' {
                    emit(params, &mut name, &mut value)?;
                    state = DecodeState::Name;
                } else if is_control(byte) {
                    return Err(FormError::InvalidByte);
                } else if value.len() >= FORM_VALUE_MAX {
                    return Err(FormError::ValueTooLong);
                } else {
                    value.push(byte);
                }
            }
        }
    }

    // handle the last pair in the input
    if !name.is_empty() {
        emit(params, &mut name, &mut value)?;
    }

    Ok(())
}

fn emit(params: &mut Params, name: &mut Vec<u8>, value: &mut Vec<u8>) -> Result<(), FormError> {
    let name = String::from_utf8(std::mem::take(name)).map_err(|_| FormError::InvalidUtf8)?;
    let value = String::from_utf8(std::mem::take(value)).map_err(|_| FormError::InvalidUtf8)?;
    params.append(name, value);
    Ok(())
}

/// Decode a `Cookie` header into parameters.
///
/// Cookie decoding is not implemented.
///
/// # Errors
///
/// Always returns [`FormError::Unsupported`].
pub fn decode_cookies(_params: &mut Params, _input: &[u8]) -> Result<(), FormError> {
    Err(FormError::Unsupported)
}

/// Decode a `multipart/form-data` body into parameters.
///
/// Multipart decoding is not implemented.
///
/// # Errors
///
/// Always returns [`FormError::Unsupported`].
pub fn decode_multipart(_params: &mut Params, _input: &[u8]) -> Result<(), FormError> {
    Err(FormError::Unsupported)
}
