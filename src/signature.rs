// src/signature.rs
//
// Bot web-app init-data verification, gating the message preview endpoint.
// The init data is a query string carrying `hash=<hex>` and `auth_date=<unix
// seconds>` among other fields. The hash is HMAC-SHA256 over the other fields
// sorted and joined by '\n', keyed with HMAC-SHA256("WebAppData", bot token).

use hmac::{Hmac, Mac};
use log::debug;
use percent_encoding::percent_decode_str;
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY: &[u8] = b"WebAppData";

/// Init data older (or newer) than this is refused.
pub const MAX_AGE_SECS: u64 = 300;

fn mac_for(key: &[u8]) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(key).map_err(|e| Error::Signature(e.to_string()))
}

/// Check `init_data` against `bot_token` at unix time `now`. `Ok(false)` for
/// a wrong, missing or stale signature; `Err` when the data is malformed.
pub fn verify_init_data(init_data: &str, bot_token: &str, now: u64) -> Result<bool> {
    let decoded = percent_decode_str(init_data)
        .decode_utf8()
        .map_err(|e| Error::Signature(e.to_string()))?;

    let mut signature = None;
    let mut auth_date = 0u64;
    let mut fields = Vec::new();
    for field in decoded.split('&') {
        if let Some(hash) = field.strip_prefix("hash=") {
            signature = Some(hash);
            continue;
        }
        if let Some(ts) = field.strip_prefix("auth_date=") {
            auth_date = ts
                .parse()
                .map_err(|_| Error::Signature(format!("bad auth_date {ts:?}")))?;
        }
        fields.push(field);
    }

    let Some(signature) = signature else {
        debug!("init data without hash");
        return Ok(false);
    };
    if now.abs_diff(auth_date) > MAX_AGE_SECS {
        debug!("init data expired (auth_date {auth_date}, now {now})");
        return Ok(false);
    }
    let expected = hex::decode(signature).map_err(|e| Error::Signature(e.to_string()))?;

    fields.sort_unstable();
    let check_string = fields.join("\n");

    let mut secret = mac_for(SECRET_KEY)?;
    secret.update(bot_token.as_bytes());
    let mut mac = mac_for(&secret.finalize().into_bytes())?;
    mac.update(check_string.as_bytes());
    Ok(mac.verify_slice(&expected).is_ok())
}
