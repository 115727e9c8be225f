// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Hand-written UTF-8 transcoding between bytes and UTF-16 code units.
//!
//! Used when the host cannot rely on built-in transcoders. Handles 1 to 4 byte
//! sequences; code points above the BMP are split into and rebuilt from
//! surrogate pairs. Malformed input decodes to U+FFFD and lone surrogates
//! encode as U+FFFD, so both directions are total.

const REPLACEMENT: u32 = 0xFFFD;

const HIGH_SURROGATE_START: u16 = 0xD800;
const LOW_SURROGATE_START: u16 = 0xDC00;
const SURROGATE_END: u16 = 0xDFFF;

/// Encodes UTF-16 code units as UTF-8 bytes.
pub fn encode_utf16(units: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let unit = units[i];
        let code_point = if is_high_surrogate(unit) {
            match units.get(i + 1) {
                Some(&low) if is_low_surrogate(low) => {
                    i += 1;
                    0x10000 + (((unit as u32 & 0x3FF) << 10) | (low as u32 & 0x3FF))
                }
                _ => REPLACEMENT,
            }
        } else if is_low_surrogate(unit) {
            REPLACEMENT
        } else {
            unit as u32
        };
        push_code_point(&mut out, code_point);
        i += 1;
    }
    out
}

fn push_code_point(out: &mut Vec<u8>, code_point: u32) {
    if code_point < 0x80 {
        out.push(code_point as u8);
    } else if code_point < 0x800 {
        out.push(0xC0 | (code_point >> 6) as u8);
        out.push(0x80 | (code_point & 0x3F) as u8);
    } else if code_point < 0x10000 {
        out.push(0xE0 | (code_point >> 12) as u8);
        out.push(0x80 | ((code_point >> 6) & 0x3F) as u8);
        out.push(0x80 | (code_point & 0x3F) as u8);
    } else {
        out.push(0xF0 | (code_point >> 18) as u8);
        out.push(0x80 | ((code_point >> 12) & 0x3F) as u8);
        out.push(0x80 | ((code_point >> 6) & 0x3F) as u8);
        out.push(0x80 | (code_point & 0x3F) as u8);
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Start,
    /// Inside a multi-byte sequence.
    Continuation {
        code_point: u32,
        remaining: u8,
        minimum: u32,
    },
}

/// Decodes UTF-8 bytes into UTF-16 code units.
pub fn decode_to_utf16(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut state = State::Start;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        match state {
            State::Start => {
                state = match byte {
                    0x00..=0x7F => {
                        out.push(byte as u16);
                        State::Start
                    }
                    0xC2..=0xDF => State::Continuation {
                        code_point: (byte & 0x1F) as u32,
                        remaining: 1,
                        minimum: 0x80,
                    },
                    0xE0..=0xEF => State::Continuation {
                        code_point: (byte & 0x0F) as u32,
                        remaining: 2,
                        minimum: 0x800,
                    },
                    0xF0..=0xF4 => State::Continuation {
                        code_point: (byte & 0x07) as u32,
                        remaining: 3,
                        minimum: 0x10000,
                    },
                    // stray continuation byte or invalid lead byte
                    _ => {
                        push_utf16(&mut out, REPLACEMENT);
                        State::Start
                    }
                };
                i += 1;
            }
            State::Continuation {
                code_point,
                remaining,
                minimum,
            } => {
                if byte & 0xC0 != 0x80 {
                    // truncated sequence: emit a replacement and rescan this byte
                    push_utf16(&mut out, REPLACEMENT);
                    state = State::Start;
                    continue;
                }
                let code_point = (code_point << 6) | (byte & 0x3F) as u32;
                state = if remaining == 1 {
                    let valid = code_point >= minimum
                        && code_point <= 0x10FFFF
                        && !(0xD800..=0xDFFF).contains(&code_point);
                    push_utf16(&mut out, if valid { code_point } else { REPLACEMENT });
                    State::Start
                } else {
                    State::Continuation {
                        code_point,
                        remaining: remaining - 1,
                        minimum,
                    }
                };
                i += 1;
            }
        }
    }

    if let State::Continuation { .. } = state {
        push_utf16(&mut out, REPLACEMENT);
    }
    out
}

fn push_utf16(out: &mut Vec<u16>, code_point: u32) {
    if code_point < 0x10000 {
        out.push(code_point as u16);
    } else {
        let offset = code_point - 0x10000;
        out.push(HIGH_SURROGATE_START | (offset >> 10) as u16);
        out.push(LOW_SURROGATE_START | (offset & 0x3FF) as u16);
    }
}

#[inline]
fn is_high_surrogate(unit: u16) -> bool {
    (HIGH_SURROGATE_START..LOW_SURROGATE_START).contains(&unit)
}

#[inline]
fn is_low_surrogate(unit: u16) -> bool {
    (LOW_SURROGATE_START..=SURROGATE_END).contains(&unit)
}

/// Encodes `text` through the UTF-16 path.
pub fn encode(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    encode_utf16(&units)
}

/// Decodes `bytes` through the UTF-16 path.
pub fn decode(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&decode_to_utf16(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_std_for_all_widths() {
        for text in ["plain", "é", "ünïcödé", "€ and ∑", "🦀 crab", "a𐍈b", "日本語"] {
            assert_eq!(encode(text), text.as_bytes(), "encoding {:?}", text);
        }
    }

    #[test]
    fn test_decode_roundtrips_non_ascii() {
        let samples = [
            "\u{7F}\u{80}\u{7FF}\u{800}\u{FFFF}\u{10000}\u{10FFFF}",
            "state(\"ゲーム.exe\") {}",
            "emoji 😀👍🏽 mixed",
        ];
        for text in samples {
            assert_eq!(decode(&encode(text)), text);
        }
    }

    #[test]
    fn test_surrogate_pair_reconstruction() {
        let units = decode_to_utf16("😀".as_bytes());
        assert_eq!(units, vec![0xD83D, 0xDE00]);
        assert_eq!(encode_utf16(&units), "😀".as_bytes());
    }

    #[test]
    fn test_lone_surrogates_encode_as_replacement() {
        assert_eq!(encode_utf16(&[0xD800]), "\u{FFFD}".as_bytes());
        assert_eq!(encode_utf16(&[0xDC00, 0x41]), "\u{FFFD}A".as_bytes());
    }

    #[test]
    fn test_malformed_bytes_decode_as_replacement() {
        // truncated 3-byte sequence followed by ASCII
        assert_eq!(decode(&[0xE2, 0x82, b'x']), "\u{FFFD}x");
        // stray continuation byte
        assert_eq!(decode(&[0x80, b'a']), "\u{FFFD}a");
        // overlong encoding of '/'
        assert_eq!(decode(&[0xE0, 0x80, 0xAF]), "\u{FFFD}");
        // encoded surrogate
        assert_eq!(decode(&[0xED, 0xA0, 0x80]), "\u{FFFD}");
        // sequence cut off at end of input
        assert_eq!(decode(&[b'a', 0xF0, 0x9F]), "a\u{FFFD}");
    }
}
