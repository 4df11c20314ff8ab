//! Older link formats, kept so links that were already handed out can still be read.
//!
//! Neither format keeps assignments secret. The manifest link carries every pairing
//! of the event, so anyone holding one link can decode the whole draw. The raw link
//! names giver and recipient in plain query params and can be edited by hand.
//! New events only use the keyed links in [`crate::links`].
#![allow(deprecated)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use thiserror::Error;
use url::Url;

use crate::links::{LinkBuilder, LinkError};
use crate::{Assignment, Pairing};

pub const DATA_PARAM: &str = "data";
pub const GIVER_PARAM: &str = "giver";
pub const FROM_PARAM: &str = "from";
pub const TO_PARAM: &str = "to";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("could not encode manifest: {0}")]
    Encode(String),
    #[error("manifest is not valid base64: {0}")]
    Base64(String),
    #[error("manifest payload is malformed: {0}")]
    Payload(String),
}

impl From<ManifestError> for LinkError {
    fn from(err: ManifestError) -> Self {
        LinkError::Unresolvable(err.to_string())
    }
}

/// Serializes the ordered pairings as JSON and encodes the UTF-8 bytes as URL-safe base64.
#[deprecated(note = "exposes every pairing to any link holder; use keyed links")]
pub fn encode_manifest(pairs: &[Pairing]) -> Result<String, ManifestError> {
    let json = serde_json::to_vec(pairs).map_err(|e| ManifestError::Encode(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

#[deprecated(note = "exposes every pairing to any link holder; use keyed links")]
pub fn decode_manifest(data: &str) -> Result<Vec<Pairing>, ManifestError> {
    let raw = URL_SAFE_NO_PAD
        .decode(data.trim())
        .map_err(|e| ManifestError::Base64(e.to_string()))?;
    serde_json::from_slice(&raw).map_err(|e| ManifestError::Payload(e.to_string()))
}

/// Shared results page carrying the full manifest.
#[deprecated(note = "exposes every pairing to any link holder; use keyed links")]
pub fn manifest_link(links: &LinkBuilder, pairs: &[Pairing]) -> Result<Url, ManifestError> {
    let data = encode_manifest(pairs)?;
    let mut url = links.base().clone();
    url.set_path(&format!("{}results.html", links.base().path()));
    url.query_pairs_mut().append_pair(DATA_PARAM, &data);
    Ok(url)
}

/// Manifest link narrowed to one giver. The manifest itself is still complete.
#[deprecated(note = "exposes every pairing to any link holder; use keyed links")]
pub fn manifest_giver_link(
    links: &LinkBuilder,
    pairs: &[Pairing],
    giver: &str,
) -> Result<Url, ManifestError> {
    let mut url = manifest_link(links, pairs)?;
    url.query_pairs_mut().append_pair(GIVER_PARAM, giver);
    Ok(url)
}

#[deprecated(note = "exposes every pairing to any link holder; use keyed links")]
pub fn resolve_manifest(data: &str, giver: &str) -> Result<Assignment, LinkError> {
    decode_manifest(data)?
        .into_iter()
        .find(|p| p.from == giver)
        .map(Assignment::from)
        .ok_or_else(|| LinkError::Unresolvable(format!("no pairing for giver {giver}")))
}

#[deprecated(note = "exposes every pairing to any link holder; use keyed links")]
pub fn resolve_manifest_link(link: &str) -> Result<Assignment, LinkError> {
    let url = Url::parse(link).map_err(|e| LinkError::Unresolvable(e.to_string()))?;
    let data = query_value(&url, DATA_PARAM)?;
    let giver = query_value(&url, GIVER_PARAM)?;
    resolve_manifest(&data, &giver)
}

#[deprecated(note = "giver and recipient are readable and editable in the url; use keyed links")]
pub fn raw_link(links: &LinkBuilder, giver: &str, recipient: &str) -> Url {
    let mut url = links.base().clone();
    url.query_pairs_mut()
        .append_pair(FROM_PARAM, giver)
        .append_pair(TO_PARAM, recipient);
    url
}

#[deprecated(note = "giver and recipient are readable and editable in the url; use keyed links")]
pub fn resolve_raw_link(link: &str) -> Result<Assignment, LinkError> {
    let url = Url::parse(link).map_err(|e| LinkError::Unresolvable(e.to_string()))?;
    Ok(Assignment {
        giver: query_value(&url, FROM_PARAM)?,
        recipient: query_value(&url, TO_PARAM)?,
    })
}

fn query_value(url: &Url, name: &str) -> Result<String, LinkError> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LinkError::Unresolvable(format!("missing {name} parameter")))
}
