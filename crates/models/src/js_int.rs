use serde::{Serialize, Serializer};

/// An integer read leniently out of a form field.
///
/// Takes leading whitespace, an optional sign and the leading run of ASCII
/// digits; anything after that run is ignored. A `0x`/`0X` prefix switches
/// the run to hex digits. No digits at all gives [`JsInt::NaN`], which is
/// still sent and serializes as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsInt {
    Int(i64),
    NaN,
}

impl JsInt {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim_start();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (radix, rest) = match rest.get(..2) {
            Some("0x") | Some("0X") => (16, &rest[2..]),
            _ => (10, rest),
        };
        let end = rest.bytes().take_while(|b| (*b as char).is_digit(radix)).count();
        if end == 0 {
            return JsInt::NaN;
        }
        match i64::from_str_radix(&rest[..end], radix) {
            Ok(v) if negative => JsInt::Int(-v),
            Ok(v) => JsInt::Int(v),
            Err(_) => JsInt::NaN,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            JsInt::Int(v) => Some(v),
            JsInt::NaN => None,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, JsInt::NaN)
    }
}

impl Serialize for JsInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsInt::Int(v) => serializer.serialize_i64(*v),
            JsInt::NaN => serializer.serialize_none(),
        }
    }
}
