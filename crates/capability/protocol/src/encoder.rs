//! 命令载荷编码
//!
//! 纯函数，无 I/O：同一定义每次得到相同字节。

use crate::error::EncodingError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use domain::{CommandDefinition, CommandEncoding};

/// 将命令定义编码为待写入 socket 的字节。
pub fn encode(definition: &CommandDefinition) -> Result<Vec<u8>, EncodingError> {
    let encoding = definition
        .encoding
        .parse::<CommandEncoding>()
        .map_err(|err| EncodingError::UnsupportedEncoding(err.0))?;

    let mut data = match encoding {
        CommandEncoding::Ascii => encode_ascii(&definition.payload)?,
        CommandEncoding::Hex => decode_hex(&definition.payload)?,
        CommandEncoding::Base64 => BASE64_STANDARD
            .decode(definition.payload.as_bytes())
            .map_err(|err| EncodingError::InvalidBase64(err.to_string()))?,
    };

    if definition.append_cr {
        data.push(b'\r');
    }
    if definition.append_lf {
        data.push(b'\n');
    }
    if definition.append_null {
        data.push(0x00);
    }
    Ok(data)
}

fn encode_ascii(payload: &str) -> Result<Vec<u8>, EncodingError> {
    if let Some((position, character)) = payload.char_indices().find(|(_, ch)| !ch.is_ascii()) {
        return Err(EncodingError::NonAscii {
            position,
            character,
        });
    }
    Ok(payload.as_bytes().to_vec())
}

/// 允许 `"01 03 00 00"` 与 `"01030000"` 两种写法。
fn decode_hex(payload: &str) -> Result<Vec<u8>, EncodingError> {
    let compact: String = payload.chars().filter(|ch| *ch != ' ').collect();
    hex::decode(&compact).map_err(|err| EncodingError::InvalidHex(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(payload: &str, encoding: CommandEncoding) -> CommandDefinition {
        CommandDefinition::new(1, "TEST", payload, encoding)
    }

    #[test]
    fn ascii_payload_is_copied_verbatim() {
        let bytes = encode(&definition("~N", CommandEncoding::Ascii)).expect("encode");
        assert_eq!(bytes, b"~N");
    }

    #[test]
    fn ascii_rejects_non_ascii_without_substitution() {
        let err = encode(&definition("SEÑAL", CommandEncoding::Ascii)).expect_err("non-ascii");
        assert_eq!(
            err,
            EncodingError::NonAscii {
                position: 2,
                character: 'Ñ',
            }
        );
    }

    #[test]
    fn hex_ignores_space_separators() {
        let spaced = encode(&definition("01 03 00 00 00 02", CommandEncoding::Hex)).expect("encode");
        let compact = encode(&definition("010300000002", CommandEncoding::Hex)).expect("encode");
        assert_eq!(spaced, vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x02]);
        assert_eq!(spaced, compact);
    }

    #[test]
    fn hex_rejects_odd_length_and_bad_digits() {
        assert!(matches!(
            encode(&definition("0 1 3", CommandEncoding::Hex)),
            Err(EncodingError::InvalidHex(_))
        ));
        assert!(matches!(
            encode(&definition("ZZ", CommandEncoding::Hex)),
            Err(EncodingError::InvalidHex(_))
        ));
    }

    #[test]
    fn base64_decodes_standard_alphabet() {
        let bytes = encode(&definition("AQMAAA==", CommandEncoding::Base64)).expect("encode");
        assert_eq!(bytes, vec![0x01, 0x03, 0x00, 0x00]);
        assert!(matches!(
            encode(&definition("AQMAAA=", CommandEncoding::Base64)),
            Err(EncodingError::InvalidBase64(_))
        ));
        assert!(matches!(
            encode(&definition("A*MA", CommandEncoding::Base64)),
            Err(EncodingError::InvalidBase64(_))
        ));
    }

    #[test]
    fn terminators_follow_cr_lf_nul_order() {
        let mut command = definition("A", CommandEncoding::Ascii);
        command.append_null = true;
        command.append_lf = true;
        command.append_cr = true;
        assert_eq!(encode(&command).expect("encode"), b"A\r\n\0");

        command.append_cr = false;
        assert_eq!(encode(&command).expect("encode"), b"A\n\0");
    }

    #[test]
    fn unsupported_encoding_names_the_value() {
        let mut command = definition("A", CommandEncoding::Ascii);
        command.encoding = "utf16".to_string();
        let err = encode(&command).expect_err("unsupported");
        assert_eq!(err, EncodingError::UnsupportedEncoding("utf16".to_string()));
        assert_eq!(err.to_string(), "unsupported encoding: utf16");
    }

    #[test]
    fn encode_is_deterministic() {
        let mut command = definition("7E 4C", CommandEncoding::Hex);
        command.append_cr = true;
        let first = encode(&command).expect("encode");
        let second = encode(&command).expect("encode");
        assert_eq!(first, second);
    }
}
