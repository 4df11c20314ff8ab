use std::sync::Arc;

use futures::future::try_join_all;
use santa_core::{
    cap_wishlist, generate_pairing_random, generate_pairing_seeded, mint_access_token,
    mint_event_id, parse_roster, AccessToken, Assignment, EventId, KeyedPairing, LinkBuilder,
    ParticipantLink, ParticipantName, RosterFormat, SharePage,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppError;
use crate::store::SantaStore;

/// Context built when a personal link is opened. Wishlist calls take it instead of
/// trusting a participant name sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSession {
    pub event_id: EventId,
    pub token: AccessToken,
    pub giver: ParticipantName,
    pub recipient: ParticipantName,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentView {
    pub giver: ParticipantName,
    pub recipient: ParticipantName,
    pub wishlist: Vec<String>,
    pub recipient_wishlist: Vec<String>,
}

#[derive(Clone)]
pub struct SantaService {
    store: Arc<dyn SantaStore>,
    links: LinkBuilder,
}

impl SantaService {
    pub fn new(store: Arc<dyn SantaStore>, links: LinkBuilder) -> Self {
        Self { store, links }
    }

    pub fn store(&self) -> &Arc<dyn SantaStore> {
        &self.store
    }

    /// Validates the roster, draws pairings, stores one token per pairing and returns
    /// the organizer's share page. Nothing is returned unless every token was stored.
    pub async fn create_event(
        &self,
        roster: &str,
        format: RosterFormat,
        seed: Option<u64>,
    ) -> Result<SharePage, AppError> {
        let participants = parse_roster(roster, format)?;
        let names = participants
            .iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>();

        let pairs = match seed {
            Some(seed) => generate_pairing_seeded(&names, seed)?,
            None => generate_pairing_random(&names)?,
        };

        let event_id = mint_event_id();
        let keyed = pairs
            .into_iter()
            .map(|pairing| KeyedPairing {
                pairing,
                token: mint_access_token(),
            })
            .collect::<Vec<_>>();
        let assignments = keyed
            .iter()
            .map(|k| Assignment::from(k.pairing.clone()))
            .collect::<Vec<_>>();

        try_join_all(
            keyed
                .iter()
                .zip(&assignments)
                .map(|(k, assignment)| self.store.create_pair_token(&event_id, &k.token, assignment)),
        )
        .await
        .map_err(AppError::PublishFailed)?;

        info!(event_id = %event_id, participants = keyed.len(), "event published");

        let mut page = self.links.share_page(&event_id, &keyed);
        for link in &mut page.links {
            link.email = participants
                .iter()
                .find(|p| p.name == link.giver)
                .and_then(|p| p.email.clone());
        }
        Ok(page)
    }

    pub async fn open_assignment(
        &self,
        event_id: &str,
        token: &str,
    ) -> Result<ParticipantSession, AppError> {
        let assignment = self
            .store
            .resolve_pair_token(event_id, token)
            .await
            .map_err(AppError::from_lookup)?;

        Ok(ParticipantSession {
            event_id: event_id.to_string(),
            token: token.to_string(),
            giver: assignment.giver,
            recipient: assignment.recipient,
        })
    }

    /// Same as [`Self::open_assignment`], starting from the full personal link.
    pub async fn open_link(&self, link: &str) -> Result<ParticipantSession, AppError> {
        let link = ParticipantLink::parse(link)?;
        self.open_assignment(&link.event_id, &link.token).await
    }

    pub async fn assignment_view(&self, session: &ParticipantSession) -> AssignmentView {
        let (wishlist, recipient_wishlist) = futures::join!(
            self.load_wishlist(&session.event_id, &session.giver),
            self.load_wishlist(&session.event_id, &session.recipient),
        );
        AssignmentView {
            giver: session.giver.clone(),
            recipient: session.recipient.clone(),
            wishlist,
            recipient_wishlist,
        }
    }

    /// Never fails: a store problem reads as an empty wishlist.
    pub async fn load_wishlist(&self, event_id: &str, participant: &str) -> Vec<String> {
        match self.store.load_wishlist(event_id, participant).await {
            Ok(items) => cap_wishlist(items),
            Err(err) => {
                warn!(event_id, %err, "wishlist load failed");
                Vec::new()
            }
        }
    }

    /// Saves the session giver's own wishlist.
    pub async fn save_wishlist(
        &self,
        session: &ParticipantSession,
        items: &[String],
    ) -> Result<Vec<String>, AppError> {
        let items = cap_wishlist(items);
        self.store
            .save_wishlist(&session.event_id, &session.giver, &items)
            .await
            .map_err(AppError::WishlistSaveFailed)
    }
}
