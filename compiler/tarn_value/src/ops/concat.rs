//! The `.` operator: text and byte concatenation.
//!
//! One raw-byte operand anywhere switches the whole chain to byte
//! concatenation; every operand is then rendered with [`to_bytes`]
//! instead of [`to_text`]. The mode is decided over the flattened chain
//! before any operand converts, which matters because the two renderers
//! disagree (an array is the text `Array` but the bytes `array`).
//! Nulls contribute nothing in either mode.

use crate::convert::{to_bytes, to_text};
use crate::value::GuestValue;

/// Concatenates two operands. Equivalent to [`concat`] over a
/// two-element chain.
pub fn concat2(x: &GuestValue, y: &GuestValue) -> GuestValue {
    if matches!(x, GuestValue::Bytes(_)) || matches!(y, GuestValue::Bytes(_)) {
        let mut buffer = to_bytes(x);
        buffer.extend_from_slice(&to_bytes(y));
        GuestValue::bytes(buffer)
    } else {
        let mut buffer = to_text(x);
        buffer.push_str(&to_text(y));
        GuestValue::str(buffer)
    }
}

/// Concatenates a whole chain at once. The empty chain is empty text.
pub fn concat(operands: &[GuestValue]) -> GuestValue {
    let byte_mode = operands
        .iter()
        .any(|operand| matches!(operand, GuestValue::Bytes(_)));

    if byte_mode {
        let mut buffer = Vec::new();
        for operand in operands {
            buffer.extend_from_slice(&to_bytes(operand));
        }
        GuestValue::bytes(buffer)
    } else {
        let mut buffer = String::new();
        for operand in operands {
            buffer.push_str(&to_text(operand));
        }
        GuestValue::str(buffer)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::array::GuestArray;

    #[test]
    fn text_mode_renders_every_operand_as_text() {
        let chain = [
            GuestValue::str("x="),
            GuestValue::Int(2),
            GuestValue::Null,
            GuestValue::Double(0.5),
            GuestValue::Bool(true),
        ];
        assert_eq!(concat(&chain), GuestValue::str("x=20.51"));
    }

    #[test]
    fn one_byte_operand_switches_the_whole_chain() {
        let chain = [
            GuestValue::str("n "),
            GuestValue::Int(7),
            GuestValue::bytes(vec![0xFF]),
        ];
        let mut expected = b"n 7".to_vec();
        expected.push(0xFF);
        assert_eq!(concat(&chain), GuestValue::bytes(expected));
    }

    #[test]
    fn the_mode_is_chain_wide_not_pairwise() {
        let chain = [
            GuestValue::str("x"),
            GuestValue::array(GuestArray::new()),
            GuestValue::bytes(*b"!"),
        ];
        // chain-wide: the array renders in byte mode as "array"
        assert_eq!(concat(&chain), GuestValue::bytes(*b"xarray!"));

        // pairwise folding would have rendered it as text first
        let pairwise = concat2(&concat2(&chain[0], &chain[1]), &chain[2]);
        assert_eq!(pairwise, GuestValue::bytes(*b"xArray!"));
    }

    #[test]
    fn empty_chain_is_empty_text() {
        assert_eq!(concat(&[]), GuestValue::str(""));
        assert_eq!(
            concat2(&GuestValue::Null, &GuestValue::Null),
            GuestValue::str("")
        );
    }
}
