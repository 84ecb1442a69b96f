use crate::StreamError;

/// Push-based token sink.
///
/// Inside an object every value must be preceded by [`TokenWriter::name`].
pub trait TokenWriter {
    /// Emit `[`.
    fn begin_array(&mut self) -> Result<(), StreamError>;

    /// Emit `]`.
    fn end_array(&mut self) -> Result<(), StreamError>;

    /// Emit `{`.
    fn begin_object(&mut self) -> Result<(), StreamError>;

    /// Emit `}`.
    fn end_object(&mut self) -> Result<(), StreamError>;

    /// Name the next object member.
    fn name(&mut self, name: &str) -> Result<(), StreamError>;

    /// Emit `null`.
    fn null_value(&mut self) -> Result<(), StreamError>;

    /// Emit a boolean.
    fn bool_value(&mut self, value: bool) -> Result<(), StreamError>;

    /// Emit a string.
    fn string_value(&mut self, value: &str) -> Result<(), StreamError>;

    /// Emit a number given as its literal text.
    ///
    /// The literal must satisfy [`is_json_number`].
    fn number_value(&mut self, literal: &str) -> Result<(), StreamError>;

    /// Emit a signed integer.
    fn i64_value(&mut self, value: i64) -> Result<(), StreamError> {
        self.number_value(itoa::Buffer::new().format(value))
    }

    /// Emit an unsigned integer.
    fn u64_value(&mut self, value: u64) -> Result<(), StreamError> {
        self.number_value(itoa::Buffer::new().format(value))
    }

    /// Emit a 128-bit signed integer.
    fn i128_value(&mut self, value: i128) -> Result<(), StreamError> {
        self.number_value(itoa::Buffer::new().format(value))
    }

    /// Emit a 128-bit unsigned integer.
    fn u128_value(&mut self, value: u128) -> Result<(), StreamError> {
        self.number_value(itoa::Buffer::new().format(value))
    }

    /// Emit a float in its shortest round-tripping form. Integral values
    /// are written without a fraction (`1`, not `1.0`).
    ///
    /// NaN and infinities have no representation and are rejected.
    fn f64_value(&mut self, value: f64) -> Result<(), StreamError> {
        if !value.is_finite() {
            return Err(StreamError::InvalidNumber {
                literal: value.to_string(),
            });
        }
        self.number_value(ryu_js::Buffer::new().format_finite(value))
    }
}

/// Whether `text` is a number literal per the JSON grammar.
pub fn is_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let start = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let start = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}
