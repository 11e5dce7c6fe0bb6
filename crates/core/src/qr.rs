//! QR blob synthesis for issued tickets.
//!
//! Each ticket stores an opaque base64-encoded PNG blob derived from its
//! identity payload. Real QR symbology is an external concern; this module
//! produces a deterministic QR-styled module grid (finder squares plus a
//! payload-seeded data field) so every ticket carries a stable, visually
//! scannable-looking image without pulling a symbology encoder into the
//! domain crate.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::types::DbId;

/// Modules per side of the synthesized grid.
const GRID_MODULES: u32 = 29;

/// Pixels per module.
const MODULE_SIZE: u32 = 10;

/// Quiet-zone width in modules.
const BORDER_MODULES: u32 = 4;

/// Side length of a finder square in modules.
const FINDER_MODULES: u32 = 7;

/// Identity payload embedded in a ticket's QR blob.
#[derive(Debug, Clone, Serialize)]
pub struct QrPayload<'a> {
    pub ticket_number: &'a str,
    pub concert_id: DbId,
}

/// Serialize the identity payload for a ticket.
pub fn payload_json(ticket_number: &str, concert_id: DbId) -> String {
    let payload = QrPayload {
        ticket_number,
        concert_id,
    };
    // Serialization of a two-field struct with no map keys cannot fail.
    serde_json::to_string(&payload).unwrap_or_default()
}

/// Synthesize the base64-encoded PNG blob stored on a ticket.
pub fn encode_qr_blob(ticket_number: &str, concert_id: DbId) -> Result<String, CoreError> {
    let payload = payload_json(ticket_number, concert_id);
    let png = synthesize_png(&payload)?;
    Ok(BASE64.encode(png))
}

/// Decode a stored blob back to PNG bytes (for image downloads).
pub fn decode_qr_blob(blob: &str) -> Result<Vec<u8>, CoreError> {
    BASE64
        .decode(blob)
        .map_err(|e| CoreError::Validation(format!("Stored QR blob is not valid base64: {e}")))
}

/// Render the payload-seeded module grid as a PNG.
fn synthesize_png(payload: &str) -> Result<Vec<u8>, CoreError> {
    let bits = payload_bits(payload);
    let total = GRID_MODULES + 2 * BORDER_MODULES;
    let side = total * MODULE_SIZE;

    let img = image::GrayImage::from_fn(side, side, |x, y| {
        let mx = x / MODULE_SIZE;
        let my = y / MODULE_SIZE;
        if module_is_dark(mx, my, &bits) {
            image::Luma([0u8])
        } else {
            image::Luma([255u8])
        }
    });

    let mut png = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut png),
        image::ImageFormat::Png,
    )
    .map_err(|e| CoreError::Internal(format!("QR image encoding failed: {e}")))?;
    Ok(png)
}

/// Expand the payload into one bit per grid module via a SHA-256 chain.
fn payload_bits(payload: &str) -> Vec<bool> {
    let needed = (GRID_MODULES * GRID_MODULES) as usize;
    let mut bits = Vec::with_capacity(needed);
    let mut block = Sha256::digest(payload.as_bytes());
    while bits.len() < needed {
        for byte in block.iter() {
            for shift in 0..8 {
                bits.push(byte >> shift & 1 == 1);
                if bits.len() == needed {
                    return bits;
                }
            }
        }
        block = Sha256::digest(block);
    }
    bits
}

/// Decide the color of the module at grid position `(mx, my)` including the
/// quiet-zone border.
fn module_is_dark(mx: u32, my: u32, bits: &[bool]) -> bool {
    let total = GRID_MODULES + 2 * BORDER_MODULES;
    debug_assert!(mx < total && my < total);

    // Quiet zone.
    if mx < BORDER_MODULES
        || my < BORDER_MODULES
        || mx >= BORDER_MODULES + GRID_MODULES
        || my >= BORDER_MODULES + GRID_MODULES
    {
        return false;
    }

    let gx = mx - BORDER_MODULES;
    let gy = my - BORDER_MODULES;

    if let Some(dark) = finder_module(gx, gy) {
        return dark;
    }

    bits[(gy * GRID_MODULES + gx) as usize]
}

/// Finder squares in the top-left, top-right, and bottom-left corners.
///
/// Returns `None` outside the three finder regions.
fn finder_module(gx: u32, gy: u32) -> Option<bool> {
    let anchors = [
        (0, 0),
        (GRID_MODULES - FINDER_MODULES, 0),
        (0, GRID_MODULES - FINDER_MODULES),
    ];
    for (ax, ay) in anchors {
        if (ax..ax + FINDER_MODULES).contains(&gx) && (ay..ay + FINDER_MODULES).contains(&gy) {
            let dx = gx - ax;
            let dy = gy - ay;
            // Concentric ring pattern: dark border, light ring, dark core.
            let ring = dx.min(dy).min(FINDER_MODULES - 1 - dx).min(FINDER_MODULES - 1 - dy);
            return Some(ring != 1);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];

    #[test]
    fn payload_json_contains_identity_fields() {
        let json = payload_json("AB12CD34EF56", 42);
        assert!(json.contains("\"ticket_number\":\"AB12CD34EF56\""));
        assert!(json.contains("\"concert_id\":42"));
    }

    #[test]
    fn blob_decodes_to_a_png() {
        let blob = encode_qr_blob("AB12CD34EF56", 1).expect("synthesis should succeed");
        let png = decode_qr_blob(&blob).expect("blob must be valid base64");
        assert_eq!(&png[..4], &PNG_SIGNATURE);
    }

    #[test]
    fn blob_is_deterministic_per_ticket() {
        let a = encode_qr_blob("AB12CD34EF56", 1).unwrap();
        let b = encode_qr_blob("AB12CD34EF56", 1).unwrap();
        let c = encode_qr_blob("AB12CD34EF57", 1).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn garbage_blob_fails_to_decode() {
        let err = decode_qr_blob("not-base64!!").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
