//! Shareable links for the server-keyed token scheme.
//!
//! A participant link carries only the event id and that participant's access token.
//! Nothing about the assignment is in the URL; it has to be looked up in the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{AccessToken, EventId, KeyedPairing, ParticipantName};

pub const EVENT_PARAM: &str = "event";
pub const KEY_PARAM: &str = "key";
const RESULTS_PAGE: &str = "results.html";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("invalid base url: {0}")]
    InvalidBase(String),
    #[error("link cannot be resolved: {0}")]
    Unresolvable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareLink {
    pub giver: ParticipantName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub url: String,
}

/// What the organizer gets back after generating an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharePage {
    pub event_id: EventId,
    pub results_url: String,
    pub links: Vec<ShareLink>,
}

#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: Url,
}

impl LinkBuilder {
    /// `base` is the public page participants open. A trailing `index.html` is
    /// dropped so links point at the directory.
    pub fn new(base: &str) -> Result<Self, LinkError> {
        let mut base = Url::parse(base).map_err(|e| LinkError::InvalidBase(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(LinkError::InvalidBase(format!("{base} cannot be a base")));
        }
        base.set_query(None);
        base.set_fragment(None);

        let path = base.path().to_string();
        let lower = path.to_ascii_lowercase();
        let trimmed = ["index.html", "index.htm"]
            .iter()
            .find(|suffix| lower.ends_with(*suffix))
            .map(|suffix| &path[..path.len() - suffix.len()])
            .unwrap_or(path.as_str());
        let dir = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        base.set_path(&dir);

        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Organizer-facing link; carries only the event id.
    pub fn results_url(&self, event_id: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("{}{RESULTS_PAGE}", self.base.path()));
        url.query_pairs_mut().append_pair(EVENT_PARAM, event_id);
        url
    }

    pub fn participant_url(&self, event_id: &str, token: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair(EVENT_PARAM, event_id)
            .append_pair(KEY_PARAM, token);
        url
    }

    /// One link per giver, sorted by giver name (plain byte order).
    pub fn share_page(&self, event_id: &str, pairs: &[KeyedPairing]) -> SharePage {
        let mut links = pairs
            .iter()
            .map(|keyed| ShareLink {
                giver: keyed.pairing.from.clone(),
                email: None,
                url: self.participant_url(event_id, &keyed.token).to_string(),
            })
            .collect::<Vec<_>>();
        links.sort_by(|a, b| a.giver.cmp(&b.giver));

        SharePage {
            event_id: event_id.to_string(),
            results_url: self.results_url(event_id).to_string(),
            links,
        }
    }
}

/// The (event, token) reference carried by a participant link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantLink {
    pub event_id: EventId,
    pub token: AccessToken,
}

impl ParticipantLink {
    pub fn parse(link: &str) -> Result<Self, LinkError> {
        let url = Url::parse(link).map_err(|e| LinkError::Unresolvable(e.to_string()))?;
        Self::from_query(url.query().unwrap_or(""))
    }

    pub fn from_query(query: &str) -> Result<Self, LinkError> {
        let mut event_id = None;
        let mut token = None;
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                EVENT_PARAM => event_id = Some(value.into_owned()),
                KEY_PARAM => token = Some(value.into_owned()),
                _ => {}
            }
        }

        match (event_id, token) {
            (Some(event_id), Some(token)) if !event_id.is_empty() && !token.is_empty() => {
                Ok(Self { event_id, token })
            }
            _ => Err(LinkError::Unresolvable(
                "participant link needs both event and key".into(),
            )),
        }
    }
}
