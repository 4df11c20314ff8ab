use serde::{Deserialize, Serialize};

pub mod ids;
pub mod legacy;
pub mod links;
pub mod pairing;
pub mod roster;
pub mod wishlist;

pub use ids::{mint_access_token, mint_event_id, ACCESS_TOKEN_LEN, EVENT_ID_LEN};
pub use links::{LinkBuilder, LinkError, ParticipantLink, ShareLink, SharePage};
pub use pairing::{
    generate_pairing, generate_pairing_random, generate_pairing_seeded, PairingError,
    MAX_PAIRING_ATTEMPTS,
};
pub use roster::{parse_roster, RosterFormat, ValidationError};
pub use wishlist::{cap_wishlist, MAX_WISHLIST_ITEMS};

pub type ParticipantName = String;
pub type EventId = String;
pub type AccessToken = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub name: ParticipantName,
    pub email: Option<String>,
}

impl Participant {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }
}

/// One giver → recipient assignment inside an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pairing {
    pub from: ParticipantName,
    pub to: ParticipantName,
}

/// A resolved assignment as seen by a single participant.
///
/// Every resolution path yields both sides or fails; there is no way to build one
/// with only a giver or only a recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub giver: ParticipantName,
    pub recipient: ParticipantName,
}

impl From<Pairing> for Assignment {
    fn from(pairing: Pairing) -> Self {
        Self {
            giver: pairing.from,
            recipient: pairing.to,
        }
    }
}

/// A pairing together with the access token minted for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyedPairing {
    pub pairing: Pairing,
    pub token: AccessToken,
}

/// Returns true when `pairs` is a derangement of `names`: each name gives once,
/// receives once, and nobody draws themselves.
pub fn is_derangement(names: &[ParticipantName], pairs: &[Pairing]) -> bool {
    if pairs.len() != names.len() {
        return false;
    }
    if pairs.iter().any(|p| p.from == p.to) {
        return false;
    }

    let mut expected = names.to_vec();
    expected.sort();
    let mut givers = pairs.iter().map(|p| p.from.clone()).collect::<Vec<_>>();
    givers.sort();
    let mut recipients = pairs.iter().map(|p| p.to.clone()).collect::<Vec<_>>();
    recipients.sort();

    givers == expected && recipients == expected
}
