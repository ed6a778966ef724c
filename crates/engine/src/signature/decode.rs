//! URL 퍼센트 디코딩
//!
//! 공격 패턴 매칭 전에 한 번만 디코딩합니다. 이중 인코딩(`%2527`)은
//! `%27`로 한 단계만 풀리며, 이 형태는 SQLi 패턴이 직접 잡습니다.

use std::borrow::Cow;

/// `%XX` 시퀀스를 바이트로 디코딩합니다.
///
/// 잘못된 시퀀스는 그대로 두고, 디코딩 결과가 UTF-8이 아니면 손실 변환합니다.
/// `+`는 공백으로 바꾸지 않습니다.
pub(crate) fn percent_decode(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                decoded.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
