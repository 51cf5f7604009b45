//! Pending PVP invitations

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use skirmish_battle::Party;

use crate::error::ServerError;

#[derive(Debug, Clone)]
pub struct Invite {
    pub from: u64,
    pub to: u64,

    /// The inviter's party, fixed at invite time
    pub party: Party,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn new(from: u64, to: u64, party: Party, created_at: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            party,
            created_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }
}

/// Invites keyed by `(from, to)`; a repeat invite replaces the earlier one
#[derive(Debug, Default)]
pub struct InviteBook {
    invites: HashMap<(u64, u64), Invite>,
}

impl InviteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.invites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invites.is_empty()
    }

    pub fn issue(&mut self, invite: Invite) {
        self.invites.insert((invite.from, invite.to), invite);
    }

    pub fn contains(&self, from: u64, to: u64) -> bool {
        self.invites.contains_key(&(from, to))
    }

    /// Remove and return a live invite. An expired one counts as missing.
    pub fn take(
        &mut self,
        from: u64,
        to: u64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Invite, ServerError> {
        match self.invites.remove(&(from, to)) {
            Some(invite) if !invite.is_expired(now, ttl) => Ok(invite),
            _ => Err(ServerError::InviteNotFound { from, to }),
        }
    }

    /// Every invite sent or received by `user`
    pub fn withdraw_user(&mut self, user: u64) -> Vec<Invite> {
        let keys: Vec<_> = self
            .invites
            .keys()
            .filter(|(from, to)| *from == user || *to == user)
            .copied()
            .collect();
        keys.into_iter()
            .filter_map(|key| self.invites.remove(&key))
            .collect()
    }

    /// Drop invites past their TTL
    pub fn sweep(&mut self, now: DateTime<Utc>, ttl: Duration) -> Vec<Invite> {
        let expired: Vec<_> = self
            .invites
            .iter()
            .filter(|(_, invite)| invite.is_expired(now, ttl))
            .map(|(key, _)| *key)
            .collect();
        expired
            .into_iter()
            .filter_map(|key| self.invites.remove(&key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use skirmish_battle::formula::CoreStats;
    use skirmish_battle::{Combatant, Element};

    use super::*;

    fn party() -> Party {
        let stats = CoreStats {
            max_hp: 50,
            atk: 10,
            def: 10,
            sp_atk: 10,
            sp_def: 10,
            speed: 10,
        };
        Party::single(Combatant::new(1, 5, Element::Normal, stats))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_take_live_invite() {
        let mut book = InviteBook::new();
        book.issue(Invite::new(1, 2, party(), at(0)));
        assert!(book.take(1, 2, at(30), Duration::seconds(60)).is_ok());
        assert!(book.is_empty());
    }

    #[test]
    fn test_expired_invite_is_not_found() {
        let mut book = InviteBook::new();
        book.issue(Invite::new(1, 2, party(), at(0)));
        assert_eq!(
            book.take(1, 2, at(60), Duration::seconds(60)).unwrap_err(),
            ServerError::InviteNotFound { from: 1, to: 2 }
        );
    }

    #[test]
    fn test_sweep_is_a_hard_ttl() {
        let mut book = InviteBook::new();
        book.issue(Invite::new(1, 2, party(), at(0)));
        book.issue(Invite::new(3, 4, party(), at(30)));

        let expired = book.sweep(at(61), Duration::seconds(60));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].from, 1);
        assert!(book.contains(3, 4));
    }

    #[test]
    fn test_withdraw_user_both_directions() {
        let mut book = InviteBook::new();
        book.issue(Invite::new(1, 2, party(), at(0)));
        book.issue(Invite::new(3, 1, party(), at(0)));
        book.issue(Invite::new(3, 4, party(), at(0)));

        assert_eq!(book.withdraw_user(1).len(), 2);
        assert_eq!(book.len(), 1);
    }
}
