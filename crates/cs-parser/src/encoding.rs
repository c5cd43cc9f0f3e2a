//! Encoding detection and the legacy-encoding fallback chain.
//!
//! Detection is statistical (chardetng over the first ~10KB); a
//! low-confidence guess falls back to the configured default. A decode
//! failure is an expected outcome, not an exception: each candidate in
//! the fallback chain is tried in order before giving up.

use chardetng::EncodingDetector;
use cs_core::config::FileProcessingConfig;
use cs_core::{CsError, Result};
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

const SNIFF_LEN: usize = 10_000;

/// Legacy encodings retried after the detected/default one fails.
const FALLBACK_LABELS: [&str; 3] = ["utf-8", "gbk", "windows-1252"];

/// Guess the encoding of `bytes`. Returns the configured default when
/// detection is disabled or the guess is low-confidence.
pub fn detect_encoding(bytes: &[u8], config: &FileProcessingConfig) -> &'static Encoding {
    let default = Encoding::for_label(config.default_encoding.as_bytes()).unwrap_or(UTF_8);
    if !config.encoding_detection {
        return default;
    }

    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let mut detector = EncodingDetector::new();
    detector.feed(head, bytes.len() <= SNIFF_LEN);
    let (guess, high_confidence) = detector.guess_assess(None, true);
    if high_confidence {
        debug!(encoding = guess.name(), "detected encoding");
        guess
    } else {
        warn!(
            default = default.name(),
            "low-confidence encoding guess, using default"
        );
        default
    }
}

/// Decode `bytes` with the detected encoding, retrying the fallback
/// chain on malformed input.
pub fn decode_bytes(bytes: &[u8], config: &FileProcessingConfig) -> Result<String> {
    let encoding = detect_encoding(bytes, config);
    let (text, _, malformed) = encoding.decode(bytes);
    if !malformed {
        return Ok(text.into_owned());
    }

    warn!(
        encoding = encoding.name(),
        "decode produced replacement characters, trying fallback encodings"
    );
    for label in FALLBACK_LABELS {
        let Some(candidate) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };
        if candidate == encoding {
            continue;
        }
        let (text, _, malformed) = candidate.decode(bytes);
        if !malformed {
            debug!(encoding = candidate.name(), "fallback decode succeeded");
            return Ok(text.into_owned());
        }
    }

    Err(CsError::Encoding(
        "unable to decode input with any candidate encoding".into(),
    ))
}
