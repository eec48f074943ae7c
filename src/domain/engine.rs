//! Command handlers for the `Match` aggregate.
//!
//! Every handler validates the full command against the current state
//! before touching anything, so a rejection is always a no-op and an
//! acceptance always applies completely. Handlers return the derived
//! events; persistence and broadcast are the caller's concern.

use time::{Duration, OffsetDateTime};

use crate::domain::bidding::{Bid, BidValue, Contract};
use crate::domain::cards::{relative_strength, Card, Suit};
use crate::domain::commands::{Command, CommandKind, EndReason, Event};
use crate::domain::dealing::deal_next;
use crate::domain::rules::{
    can_declare_belote, can_declare_rebelote, is_legal_bid, is_legal_play, legal_bid_values,
    legal_plays, trick_points, trick_winner, settle_contract, ANNOUNCEMENT_BONUS,
    LAST_TRICK_BONUS,
};
use crate::domain::state::{
    next_seat, Announcement, AnnouncementKind, Match, MatchStatus, PauseReason, Phase, Player,
    Seat, SeatedCard, Team, TrickRecord, SEATS,
};
use crate::errors::domain::DomainError;

pub const TRICKS_PER_ROUND: usize = 8;

impl Match {
    /// Apply one command, returning the derived events.
    ///
    /// The sole mutation entry point: bot moves, timer expiries and
    /// transport commands all funnel through here and are validated alike.
    pub fn apply(&mut self, cmd: &Command, now: OffsetDateTime) -> Result<Vec<Event>, DomainError> {
        let mut events = Vec::new();
        match &cmd.kind {
            CommandKind::AddPlayer {
                display_name,
                is_bot,
            } => self.add_player(&cmd.actor_id, display_name, *is_bot, now, &mut events)?,
            CommandKind::PlaceBid { value, suit } => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.place_bid(seat, *value, *suit, now, &mut events)?;
            }
            CommandKind::Pass => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.pass(seat, now, &mut events)?;
            }
            CommandKind::Coinche => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.coinche(seat, now, &mut events)?;
            }
            CommandKind::Surcoinche => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.surcoinche(seat, &mut events)?;
            }
            CommandKind::DeclareAnnouncement { kind } => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.declare_announcement(seat, *kind, now, &mut events)?;
            }
            CommandKind::PlayCard { card } => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.play_card(seat, *card, now, &mut events)?;
            }
            CommandKind::Disconnect => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.set_connected(seat, false, &mut events);
            }
            CommandKind::Reconnect => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.set_connected(seat, true, &mut events);
            }
            CommandKind::Abandon => {
                let seat = self.require_seat(&cmd.actor_id)?;
                self.abandon(seat, &mut events)?;
            }
            CommandKind::Tick => {
                let fired = self.tick(now, &mut events)?;
                if !fired {
                    // Deadline not reached: pure no-op, do not bump the
                    // version marker.
                    return Ok(events);
                }
            }
        }
        self.last_saved += 1;
        Ok(events)
    }

    // ---- queries -------------------------------------------------------

    /// Legal cards for `seat` in the current trick; empty outside Playing.
    pub fn legal_plays_for(&self, seat: Seat) -> Vec<Card> {
        let (Phase::Playing, Some(trump)) = (self.phase, self.trump_suit) else {
            return Vec::new();
        };
        let Some(player) = self.player_at(seat) else {
            return Vec::new();
        };
        let trick: Vec<Card> = self.current_trick.iter().map(|sc| sc.card).collect();
        legal_plays(&player.hand, &trick, trump)
    }

    /// Bid values currently accepted over the standing contract.
    pub fn legal_bids(&self) -> Vec<BidValue> {
        if self.phase != Phase::Bidding {
            return Vec::new();
        }
        legal_bid_values(self.contract.map(|c| c.value))
    }

    fn require_seat(&self, actor_id: &str) -> Result<Seat, DomainError> {
        self.seat_of(actor_id)
            .ok_or_else(|| DomainError::not_found(format!("no player with id {actor_id}")))
    }

    fn require_turn(&self, seat: Seat) -> Result<(), DomainError> {
        if self.active_seat != seat {
            return Err(DomainError::turn(self.active_seat, seat));
        }
        Ok(())
    }

    fn arm_deadline(&mut self, now: OffsetDateTime) {
        self.turn_deadline = Some(now + Duration::seconds(self.config.turn_secs as i64));
    }

    // ---- handlers ------------------------------------------------------

    fn add_player(
        &mut self,
        actor_id: &str,
        display_name: &str,
        is_bot: bool,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), DomainError> {
        if self.phase != Phase::Waiting {
            return Err(DomainError::phase("players can only join while waiting"));
        }
        if self.players.len() >= SEATS {
            return Err(DomainError::capacity("all four seats are taken"));
        }
        if self.seat_of(actor_id).is_some() {
            return Err(DomainError::illegal(format!(
                "player {actor_id} is already seated"
            )));
        }

        let seat = self.players.len() as Seat;
        self.players.push(Player {
            id: actor_id.to_string(),
            display_name: display_name.to_string(),
            seat,
            team: Team::of(seat),
            hand: Vec::new(),
            connected: true,
            is_bot,
            has_abandoned: false,
            announcements: Vec::new(),
        });
        events.push(Event::PlayerJoined {
            seat,
            player_id: actor_id.to_string(),
            is_bot,
        });

        if self.players.len() == SEATS {
            // Cannot fail: four players, fresh 32-card deck.
            deal_next(self)?;
            self.phase = Phase::Bidding;
            self.active_seat = self.round_opener;
            self.arm_deadline(now);
            events.push(Event::GameStarted {
                first_bidder: self.active_seat,
            });
        }
        Ok(())
    }

    fn place_bid(
        &mut self,
        seat: Seat,
        value: BidValue,
        suit: Suit,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), DomainError> {
        if self.phase != Phase::Bidding {
            return Err(DomainError::phase("bids are only accepted while bidding"));
        }
        self.require_turn(seat)?;
        if !is_legal_bid(value, self.contract.map(|c| c.value)) {
            return Err(DomainError::illegal(format!(
                "bid {value:?} does not beat the standing contract"
            )));
        }

        self.bids.push(Bid { value, suit, seat });
        self.contract = Some(Contract::new(value, suit, Team::of(seat)));
        self.consecutive_passes = 0;
        self.active_seat = next_seat(seat);
        self.arm_deadline(now);
        events.push(Event::BidPlaced { seat, value, suit });
        Ok(())
    }

    fn pass(
        &mut self,
        seat: Seat,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), DomainError> {
        if self.phase != Phase::Bidding {
            return Err(DomainError::phase("passing is only possible while bidding"));
        }
        self.require_turn(seat)?;

        self.consecutive_passes += 1;
        self.active_seat = next_seat(seat);
        events.push(Event::Passed { seat });

        match (self.consecutive_passes, self.contract) {
            (3.., Some(contract)) => {
                // Contract locked; the holder happens to be the active seat
                // again after three passes and leads the first trick.
                self.phase = Phase::Playing;
                self.trump_suit = Some(contract.suit);
                events.push(Event::ContractLocked {
                    contract,
                    trump: contract.suit,
                });
            }
            (4.., None) => {
                self.bids.clear();
                self.consecutive_passes = 0;
                deal_next(self)?;
                events.push(Event::Redealt);
            }
            _ => {}
        }
        self.arm_deadline(now);
        Ok(())
    }

    fn coinche(
        &mut self,
        seat: Seat,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), DomainError> {
        let first_card_played = !self.tricks.is_empty() || !self.current_trick.is_empty();
        if !(self.phase == Phase::Bidding || (self.phase == Phase::Playing && !first_card_played)) {
            return Err(DomainError::phase(
                "coinche is only possible before the first card",
            ));
        }
        let Some(contract) = self.contract else {
            return Err(DomainError::illegal("no contract to coinche"));
        };
        if Team::of(seat) == contract.team {
            return Err(DomainError::illegal(
                "only the defending team may coinche",
            ));
        }
        if contract.coinched {
            return Err(DomainError::illegal("contract is already coinched"));
        }

        // Coinche closes bidding: the contract stands and play begins.
        if let Some(c) = self.contract.as_mut() {
            c.coinched = true;
        }
        if self.phase == Phase::Bidding {
            self.phase = Phase::Playing;
            self.trump_suit = Some(contract.suit);
        }
        self.arm_deadline(now);
        events.push(Event::Coinched { seat });
        Ok(())
    }

    fn surcoinche(&mut self, seat: Seat, events: &mut Vec<Event>) -> Result<(), DomainError> {
        let first_card_played = !self.tricks.is_empty() || !self.current_trick.is_empty();
        if first_card_played || self.phase == Phase::Ended {
            return Err(DomainError::phase(
                "surcoinche is only possible before the first card",
            ));
        }
        let Some(contract) = self.contract else {
            return Err(DomainError::illegal("no contract to surcoinche"));
        };
        if !contract.coinched {
            return Err(DomainError::illegal("contract is not coinched"));
        }
        if contract.surcoinched {
            return Err(DomainError::illegal("contract is already surcoinched"));
        }
        if Team::of(seat) != contract.team {
            return Err(DomainError::illegal(
                "only the contracting team may surcoinche",
            ));
        }

        if let Some(c) = self.contract.as_mut() {
            c.surcoinched = true;
        }
        events.push(Event::Surcoinched { seat });
        Ok(())
    }

    fn declare_announcement(
        &mut self,
        seat: Seat,
        kind: AnnouncementKind,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), DomainError> {
        if self.phase != Phase::Playing {
            return Err(DomainError::phase(
                "announcements are only possible during play",
            ));
        }
        let trump = self
            .trump_suit
            .ok_or_else(|| DomainError::phase("no trump suit set"))?;
        let player = self
            .player_at(seat)
            .ok_or_else(|| DomainError::not_found(format!("no player at seat {seat}")))?;

        let allowed = match kind {
            AnnouncementKind::Belote => can_declare_belote(player, trump),
            AnnouncementKind::Rebelote => can_declare_rebelote(player, trump),
        };
        if !allowed {
            return Err(DomainError::illegal(format!(
                "seat {seat} may not declare {kind:?}"
            )));
        }

        let announcement = Announcement {
            kind,
            seat,
            at: now,
        };
        if let Some(p) = self.player_at_mut(seat) {
            p.announcements.push(announcement.clone());
        }
        self.last_announcement = Some(announcement);
        events.push(Event::AnnouncementMade { seat, kind });
        Ok(())
    }

    fn play_card(
        &mut self,
        seat: Seat,
        card: Card,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), DomainError> {
        if self.phase != Phase::Playing {
            return Err(DomainError::phase("cards are only accepted during play"));
        }
        self.require_turn(seat)?;
        let trump = self
            .trump_suit
            .ok_or_else(|| DomainError::phase("no trump suit set"))?;
        let player = self
            .player_at(seat)
            .ok_or_else(|| DomainError::not_found(format!("no player at seat {seat}")))?;
        let Some(pos) = player.hand.iter().position(|&c| c == card) else {
            return Err(DomainError::illegal(format!(
                "card {card:?} is not in seat {seat}'s hand"
            )));
        };
        let trick: Vec<Card> = self.current_trick.iter().map(|sc| sc.card).collect();
        if !is_legal_play(card, &player.hand, &trick, trump) {
            return Err(DomainError::illegal("must follow the lead suit"));
        }

        if let Some(p) = self.player_at_mut(seat) {
            p.hand.remove(pos);
        }
        self.current_trick.push(SeatedCard { seat, card });
        self.active_seat = next_seat(seat);
        self.arm_deadline(now);
        events.push(Event::CardPlayed { seat, card });

        if self.current_trick.len() == SEATS {
            self.resolve_trick(trump, now, events)?;
        }
        Ok(())
    }

    fn resolve_trick(
        &mut self,
        trump: Suit,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), DomainError> {
        let seated: [SeatedCard; 4] = self
            .current_trick
            .as_slice()
            .try_into()
            .map_err(|_| DomainError::illegal("trick must hold exactly 4 cards"))?;
        let cards = seated.map(|sc| sc.card);
        let winner_idx = trick_winner(&cards, trump);
        let winner_seat = seated[winner_idx].seat;
        let winning_team = Team::of(winner_seat);
        let points = trick_points(&cards, trump, 0);

        self.tricks.push(TrickRecord {
            cards: seated,
            winner_seat,
            winning_team,
            points,
        });
        self.current_trick.clear();
        self.active_seat = winner_seat;
        self.arm_deadline(now);
        events.push(Event::TrickWon {
            trick_no: self.tricks.len() as u8,
            winner_seat,
            winning_team,
            points,
        });

        if self.tricks.len() == TRICKS_PER_ROUND {
            self.settle_round(now, events)?;
        }
        Ok(())
    }

    /// Round settlement: contract arithmetic, score update, then either a
    /// terminal transition or a fresh deal back into bidding.
    fn settle_round(
        &mut self,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), DomainError> {
        let contract = self
            .contract
            .ok_or_else(|| DomainError::phase("cannot settle a round without a contract"))?;

        let card_points: u16 = self
            .tricks
            .iter()
            .filter(|t| t.winning_team == contract.team)
            .map(|t| t.points)
            .sum();
        let last_trick_bonus = match self.tricks.last() {
            Some(t) if t.winning_team == contract.team => LAST_TRICK_BONUS,
            _ => 0,
        };
        let announcement_bonus: u16 = self
            .players
            .iter()
            .filter(|p| p.team == contract.team)
            .map(|p| p.announcements.len() as u16 * ANNOUNCEMENT_BONUS)
            .sum();
        let trick_points_won = card_points + last_trick_bonus + announcement_bonus;

        let target = contract.value.target_points();
        let made = trick_points_won >= target;
        let delta = settle_contract(trick_points_won, target, contract.multiplier());
        self.scores.add(contract.team, delta);
        events.push(Event::RoundSettled {
            contract_team: contract.team,
            trick_points: trick_points_won,
            delta,
            made,
            scores: self.scores,
        });

        if let Some(target_score) = self.config.target_score {
            if self.scores.team_a >= target_score || self.scores.team_b >= target_score {
                self.phase = Phase::Ended;
                self.turn_deadline = None;
                let winner = match self.scores.team_a.cmp(&self.scores.team_b) {
                    std::cmp::Ordering::Greater => Some(Team::A),
                    std::cmp::Ordering::Less => Some(Team::B),
                    std::cmp::Ordering::Equal => None,
                };
                events.push(Event::MatchEnded {
                    winner,
                    reason: EndReason::TargetScoreReached,
                    scores: self.scores,
                });
                return Ok(());
            }
        }

        // Next round: clear round-scoped state and redeal.
        self.contract = None;
        self.trump_suit = None;
        self.bids.clear();
        self.consecutive_passes = 0;
        self.tricks.clear();
        self.last_announcement = None;
        self.round_opener = next_seat(self.round_opener);
        self.active_seat = self.round_opener;
        deal_next(self)?;
        self.phase = Phase::Bidding;
        self.arm_deadline(now);
        Ok(())
    }

    /// Timer check. Returns whether a default action was forced.
    fn tick(
        &mut self,
        now: OffsetDateTime,
        events: &mut Vec<Event>,
    ) -> Result<bool, DomainError> {
        if self.status != MatchStatus::Active
            || !matches!(self.phase, Phase::Bidding | Phase::Playing)
        {
            return Ok(false);
        }
        let Some(deadline) = self.turn_deadline else {
            return Ok(false);
        };
        if now < deadline {
            return Ok(false);
        }

        let seat = self.active_seat;
        events.push(Event::TurnTimedOut { seat, deadline });
        match self.phase {
            Phase::Bidding => {
                // Passing is always legal for the active seat.
                self.pass(seat, now, events)?;
            }
            Phase::Playing => {
                // The legal set is non-empty whenever it is a seat's turn,
                // so the forced default cannot fail validation.
                let trump = self
                    .trump_suit
                    .ok_or_else(|| DomainError::phase("no trump suit set"))?;
                let card = self
                    .legal_plays_for(seat)
                    .into_iter()
                    .min_by_key(|&c| relative_strength(c, trump))
                    .ok_or_else(|| {
                        DomainError::illegal(format!("seat {seat} has no legal card to force"))
                    })?;
                self.play_card(seat, card, now, events)?;
            }
            Phase::Waiting | Phase::Ended => return Ok(false),
        }
        Ok(true)
    }

    fn set_connected(&mut self, seat: Seat, connected: bool, events: &mut Vec<Event>) {
        if let Some(player) = self.player_at_mut(seat) {
            player.connected = connected;
        }
        if self.status == MatchStatus::Abandoned || self.phase == Phase::Ended {
            return;
        }

        let disconnected: Vec<Seat> = self
            .players
            .iter()
            .filter(|p| !p.connected && !p.is_bot && !p.has_abandoned)
            .map(|p| p.seat)
            .collect();
        match (self.status, disconnected.is_empty()) {
            (MatchStatus::Active, false) => {
                self.status = MatchStatus::Paused;
                let reason = PauseReason::Disconnection {
                    seats: disconnected,
                };
                self.pause_reason = Some(reason.clone());
                events.push(Event::GamePaused { reason });
            }
            (MatchStatus::Paused, true) => {
                self.status = MatchStatus::Active;
                self.pause_reason = None;
                events.push(Event::GameResumed);
            }
            (MatchStatus::Paused, false) => {
                // Still paused; refresh the seat list.
                self.pause_reason = Some(PauseReason::Disconnection {
                    seats: disconnected,
                });
            }
            _ => {}
        }
    }

    fn abandon(&mut self, seat: Seat, events: &mut Vec<Event>) -> Result<(), DomainError> {
        if self.phase == Phase::Ended {
            return Err(DomainError::phase("match has already ended"));
        }
        let player = self
            .player_at_mut(seat)
            .ok_or_else(|| DomainError::not_found(format!("no player at seat {seat}")))?;
        player.has_abandoned = true;
        self.phase = Phase::Ended;
        self.status = MatchStatus::Abandoned;
        self.turn_deadline = None;
        events.push(Event::MatchEnded {
            winner: Some(Team::of(seat).opponent()),
            reason: EndReason::Abandoned { seat },
            scores: self.scores,
        });
        Ok(())
    }
}
